use std::fmt;

/// Error types for the bootstrap run
#[derive(Debug)]
pub enum BootstrapError {
    /// Host or token missing after resolution
    InvalidCredentials {
        host: Option<String>,
        token: Option<String>,
    },

    /// `/ping` answered, but not with `{"ping": "pong"}`
    InvalidPing(String),

    /// Secret file could not be parsed
    ConfigParse(String),

    /// Provisioning tool binary could not be run
    ExecutorNotInstalled { binary: String },

    /// Provisioning tool command exited unsuccessfully
    ExecutorFailed {
        command: String,
        message: String,
        exit_code: Option<i32>,
    },
}

/// Show only enough of a token to recognise it
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "*".repeat(token.chars().count())
    } else {
        format!("{}****", visible)
    }
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::InvalidCredentials { host, token } => {
                write!(
                    f,
                    "Invalid anomalo secrets. Got host {:?} and token {:?}",
                    host.as_deref().unwrap_or(""),
                    token.as_deref().map(mask_token).unwrap_or_default()
                )
            }
            BootstrapError::InvalidPing(response) => {
                write!(
                    f,
                    "Did not get a valid anomalo response from /ping. Got: {}",
                    response
                )
            }
            BootstrapError::ConfigParse(msg) => {
                write!(f, "Failed to parse configuration: {}", msg)
            }
            BootstrapError::ExecutorNotInstalled { binary } => {
                write!(
                    f,
                    "'{}' is not installed or not on PATH. Install it or pick another --executor",
                    binary
                )
            }
            BootstrapError::ExecutorFailed {
                command,
                message,
                exit_code,
            } => {
                write!(f, "Executor command '{}' failed", command)?;

                if let Some(code) = exit_code {
                    write!(f, " (exit code {})", code)?;
                }

                write!(f, ": {}", message)
            }
        }
    }
}

impl std::error::Error for BootstrapError {}
