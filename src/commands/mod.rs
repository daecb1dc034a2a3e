pub mod bootstrap;

pub use bootstrap::{BootstrapArgs, BootstrapCommand};
