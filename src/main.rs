mod anomalo;
mod commands;
mod context;
mod error;
mod executor;
mod import;
mod output;
mod traits;

use anyhow::Result;
use clap::Parser;
use commands::{BootstrapArgs, BootstrapCommand};
use context::Context;

#[derive(Parser)]
#[command(name = "anomalo-bootstrap")]
#[command(about = "Bootstrap Terraform definitions for Anomalo tables and checks from live state", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    args: BootstrapArgs,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let ctx = Context::new();

    // Per-table failures are reported in the summary, not through the exit code
    BootstrapCommand::execute(&ctx, &cli.args)?;

    Ok(())
}
