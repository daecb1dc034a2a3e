use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Trait for executing system commands, allowing for mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments and capture its output
    fn execute(&self, command: &str, args: &[&str], working_dir: &Path) -> Result<Output>;
}

/// Real command executor using std::process::Command
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, command: &str, args: &[&str], working_dir: &Path) -> Result<Output> {
        let output = Command::new(command)
            .args(args)
            .current_dir(working_dir)
            .output()
            .with_context(|| format!("Failed to execute {} {}", command, args.join(" ")))?;

        Ok(output)
    }
}

/// Mock command executor for testing
///
/// Results are matched against the full command line (`"terraform state show x"`)
/// and consumed on first use. Unmatched commands succeed with empty output.
#[cfg(test)]
pub struct MockCommandExecutor {
    outputs: std::sync::Mutex<Vec<MockCommandResult>>,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
#[derive(Clone, Debug)]
pub struct MockCommandResult {
    pub command_line: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Simulate a spawn failure (binary not found) instead of returning output
    pub spawn_error: bool,
}

#[cfg(test)]
impl MockCommandResult {
    pub fn ok(command_line: &str, stdout: &str) -> Self {
        Self {
            command_line: command_line.to_string(),
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
            spawn_error: false,
        }
    }

    pub fn failed(command_line: &str, exit_code: i32, stderr: &str) -> Self {
        Self {
            command_line: command_line.to_string(),
            exit_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
            spawn_error: false,
        }
    }

    pub fn not_found(command_line: &str) -> Self {
        Self {
            command_line: command_line.to_string(),
            exit_code: -1,
            stdout: String::new(),
            stderr: String::new(),
            spawn_error: true,
        }
    }
}

#[cfg(test)]
impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::with_outputs(Vec::new())
    }

    pub fn with_outputs(outputs: Vec<MockCommandResult>) -> Self {
        Self {
            outputs: std::sync::Mutex::new(outputs),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Command lines executed so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Default for MockCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &str, args: &[&str], _working_dir: &Path) -> Result<Output> {
        let command_line = std::iter::once(command)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(command_line.clone());

        let mut outputs = self.outputs.lock().unwrap();
        let Some(position) = outputs.iter().position(|r| r.command_line == command_line) else {
            return Ok(Output {
                status: create_exit_status(0),
                stdout: Vec::new(),
                stderr: Vec::new(),
            });
        };

        let result = outputs.remove(position);
        if result.spawn_error {
            anyhow::bail!("Failed to execute {}: No such file or directory", command_line);
        }

        Ok(Output {
            status: create_exit_status(result.exit_code),
            stdout: result.stdout.into_bytes(),
            stderr: result.stderr.into_bytes(),
        })
    }
}

#[cfg(test)]
fn create_exit_status(code: i32) -> std::process::ExitStatus {
    // ExitStatus can't be constructed directly; build it from a raw wait status
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    }
}
