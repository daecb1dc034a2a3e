use anyhow::Result;
use clap::ValueEnum;

/// Provisioning tool flavour; both speak the same CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExecutorKind {
    #[default]
    Terraform,
    #[value(name = "tofu", alias = "opentofu")]
    OpenTofu,
}

impl ExecutorKind {
    pub fn binary(&self) -> &'static str {
        match self {
            ExecutorKind::Terraform => "terraform",
            ExecutorKind::OpenTofu => "tofu",
        }
    }
}

/// Trait for Infrastructure as Code executors (Terraform, OpenTofu)
pub trait Executor {
    /// Check if the executor is installed and available
    /// Runs the version command to verify
    fn check_installed(&self) -> Result<bool>;

    /// Import the live resource `import_id` into state at `address`
    /// Returns the command's captured stdout
    fn import(&self, address: &str, import_id: &str) -> Result<String>;

    /// Render the state of `address` as HCL (colourised by the tool)
    fn state_show(&self, address: &str) -> Result<String>;

    /// Get the name of this executor (e.g., "terraform", "tofu")
    fn get_name(&self) -> &str;
}
