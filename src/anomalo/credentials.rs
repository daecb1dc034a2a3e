use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::client::AnomaloApi;
use crate::error::BootstrapError;
use crate::traits::{FileSystem, Output};

pub const HOST_ENV_VAR: &str = "ANOMALO_INSTANCE_HOST";
pub const TOKEN_ENV_VAR: &str = "ANOMALO_API_SECRET_TOKEN";

/// Constructor arguments for the Anomalo client.
///
/// A secret file is this struct serialized as JSON; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub host: String,
    pub api_token: String,
}

/// Credential inputs from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialArgs<'a> {
    pub secret_file: Option<&'a Path>,
    pub host: Option<&'a str>,
    pub token: Option<&'a str>,
}

/// Where the credentials came from, for the connection banner
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialSource {
    Arguments,
    SecretFile(String),
    Environment,
}

/// Resolve credentials: explicit host+token, then secret file, then environment.
///
/// `env` is the environment lookup, injected so tests don't touch process state.
pub fn resolve_credentials(
    fs: &dyn FileSystem,
    args: CredentialArgs<'_>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(Credentials, CredentialSource)> {
    if let (Some(host), Some(token)) = (args.host, args.token) {
        let credentials = validated(Some(host.to_string()), Some(token.to_string()))?;
        return Ok((credentials, CredentialSource::Arguments));
    }

    if let Some(path) = args.secret_file {
        let credentials = read_secret_file(fs, path)?;
        return Ok((
            credentials,
            CredentialSource::SecretFile(path.display().to_string()),
        ));
    }

    let credentials = validated(env(HOST_ENV_VAR), env(TOKEN_ENV_VAR))?;
    Ok((credentials, CredentialSource::Environment))
}

/// Parse a secret file; its contents become the client arguments unchanged
pub fn read_secret_file(fs: &dyn FileSystem, path: &Path) -> Result<Credentials> {
    let content = fs.read_to_string(path)?;

    let credentials: Credentials = serde_json::from_str(&content).map_err(|e| {
        BootstrapError::ConfigParse(format!("secret file {}: {}", path.display(), e))
    })?;

    Ok(credentials)
}

fn validated(host: Option<String>, token: Option<String>) -> Result<Credentials> {
    match (host, token) {
        (Some(host), Some(token)) if !host.is_empty() && !token.is_empty() => Ok(Credentials {
            host,
            api_token: token,
        }),
        (host, token) => Err(BootstrapError::InvalidCredentials { host, token }.into()),
    }
}

/// Liveness check against `/ping`
pub fn verify_connection(client: &dyn AnomaloApi, output: &dyn Output) -> Result<()> {
    let pong = client.ping()?;

    if !pong.is_pong() {
        let got = serde_json::to_string(&pong).unwrap_or_else(|_| format!("{:?}", pong));
        return Err(BootstrapError::InvalidPing(got).into());
    }

    output.success("Successfully connected to Anomalo");
    Ok(())
}
