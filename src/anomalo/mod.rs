//! Anomalo public API access: credentials, client and response models.

pub mod client;
pub mod credentials;
pub mod models;

pub use client::{AnomaloApi, AnomaloClient};
pub use credentials::{CredentialArgs, CredentialSource, resolve_credentials, verify_connection};
pub use models::{Check, TableInformation};

#[cfg(test)]
pub use client::{MockAnomaloClient, MockHttpClient};
