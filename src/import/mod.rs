pub mod ansi;
pub mod plan;

pub use ansi::strip_color_codes;
pub use plan::TableImportPlan;
