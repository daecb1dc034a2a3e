use super::executor::{Executor, ExecutorKind};
use crate::error::BootstrapError;
use crate::traits::CommandExecutor;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Terraform/OpenTofu executor implementation
pub struct TerraformExecutor {
    kind: ExecutorKind,
    command: Arc<dyn CommandExecutor>,
    working_dir: PathBuf,
}

impl TerraformExecutor {
    pub fn new(
        kind: ExecutorKind,
        command: Arc<dyn CommandExecutor>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kind,
            command,
            working_dir: working_dir.into(),
        }
    }

    /// Run the tool and return stdout.
    ///
    /// stderr is logged whatever the outcome; a non-zero exit is an error.
    fn run(&self, args: &[&str]) -> Result<String> {
        let binary = self.kind.binary();
        let command_line = format!("{} {}", binary, args.join(" "));
        log::debug!("Running {}", command_line);

        let output = self.command.execute(binary, args, &self.working_dir)?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !stderr.trim().is_empty() {
            log::warn!("{}: {}", command_line, stderr.trim());
        }

        if !output.status.success() {
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };

            return Err(BootstrapError::ExecutorFailed {
                command: command_line,
                message,
                exit_code: output.status.code(),
            }
            .into());
        }

        Ok(stdout)
    }
}

impl Executor for TerraformExecutor {
    fn check_installed(&self) -> Result<bool> {
        let result = self
            .command
            .execute(self.kind.binary(), &["version"], &self.working_dir);

        match result {
            Ok(output) => Ok(output.status.success()),
            Err(_) => Ok(false), // Command not found or failed to execute
        }
    }

    fn import(&self, address: &str, import_id: &str) -> Result<String> {
        self.run(&["import", "-no-color", address, import_id])
    }

    fn state_show(&self, address: &str) -> Result<String> {
        // `state show` has no -no-color flag; callers strip the escape codes
        self.run(&["state", "show", address])
    }

    fn get_name(&self) -> &str {
        self.kind.binary()
    }
}
