use anyhow::{Context as AnyhowContext, Result, bail};
use clap::Args;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::anomalo::{
    AnomaloApi, AnomaloClient, CredentialArgs, CredentialSource, resolve_credentials,
    verify_connection,
};
use crate::context::Context;
use crate::error::BootstrapError;
use crate::executor::{Executor, ExecutorKind, TerraformExecutor};
use crate::import::{TableImportPlan, strip_color_codes};

/// Import Anomalo tables and checks into Terraform state and write their definitions
#[derive(Debug, Args)]
pub struct BootstrapArgs {
    /// File with one table name per line
    #[arg(long)]
    pub table_file: PathBuf,

    /// Directory the generated .tf files are written to
    #[arg(long, default_value = "./")]
    pub out_dir: PathBuf,

    /// JSON file with `host` and `api_token`
    #[arg(long)]
    pub anomalo_secret_file: Option<PathBuf>,

    /// Anomalo host, used together with --anomalo-token
    #[arg(long)]
    pub anomalo_host: Option<String>,

    /// Anomalo API token, used together with --anomalo-host
    #[arg(long)]
    pub anomalo_token: Option<String>,

    /// Provisioning tool to run imports with
    #[arg(long, value_enum, default_value_t = ExecutorKind::Terraform)]
    pub executor: ExecutorKind,

    /// Directory the provisioning tool runs in (holds the provider configuration)
    #[arg(long, default_value = ".")]
    pub working_dir: PathBuf,
}

/// Why a table was skipped
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    TableNotFound,
    ChecksNotFound,
    OutputExists(PathBuf),
    WriteFailed(PathBuf),
    ExecutorFailed,
}

/// A table that could not be imported
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFailure {
    pub table: String,
    pub reason: SkipReason,
}

impl fmt::Display for ImportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = &self.table;
        match &self.reason {
            SkipReason::TableNotFound => {
                write!(f, "Unable to fetch table {} from anomalo. Skipping.", table)
            }
            SkipReason::ChecksNotFound => write!(
                f,
                "Unable to fetch checks for table {} from anomalo. Skipping.",
                table
            ),
            SkipReason::OutputExists(path) => write!(
                f,
                "File {} already exists. Skipping for table {}.",
                path.display(),
                table
            ),
            SkipReason::WriteFailed(path) => write!(
                f,
                "Unable to write {} for table {}. Skipping.",
                path.display(),
                table
            ),
            SkipReason::ExecutorFailed => write!(
                f,
                "Unable to execute terraform commands for table {}. Skipping",
                table
            ),
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<PathBuf>,
    /// Append-only, in table order
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every failure as `(table, reason)`
    pub fn failure_pairs(&self) -> Vec<(String, String)> {
        self.failures
            .iter()
            .map(|failure| (failure.table.clone(), failure.to_string()))
            .collect()
    }
}

pub struct BootstrapCommand;

impl BootstrapCommand {
    /// Execute the bootstrap run end to end
    pub fn execute(ctx: &Context, args: &BootstrapArgs) -> Result<ImportReport> {
        ctx.output.section("Anomalo Terraform Bootstrap");

        ensure_working_dir(ctx, &args.working_dir)?;

        let credential_args = CredentialArgs {
            secret_file: args.anomalo_secret_file.as_deref(),
            host: args.anomalo_host.as_deref(),
            token: args.anomalo_token.as_deref(),
        };
        let (credentials, source) =
            resolve_credentials(&*ctx.fs, credential_args, |key| std::env::var(key).ok())?;

        ctx.output.key_value("Host", &credentials.host);
        ctx.output.key_value(
            "Credentials",
            &match source {
                CredentialSource::Arguments => "command line".to_string(),
                CredentialSource::SecretFile(path) => format!("secret file {}", path),
                CredentialSource::Environment => "environment".to_string(),
            },
        );

        let client = AnomaloClient::new(&credentials)?;
        verify_connection(&client, &*ctx.output)?;

        let executor =
            TerraformExecutor::new(args.executor, ctx.command.clone(), &args.working_dir);
        Self::ensure_executor(&executor)?;

        let tables = load_table_list(ctx, &args.table_file)?;

        if !ctx.fs.exists(&args.out_dir) {
            ctx.fs.create_dir_all(&args.out_dir)?;
        }

        let report = import_tables(ctx, &client, &executor, &tables, &args.out_dir);
        report_summary(ctx, &report);

        Ok(report)
    }

    fn ensure_executor(executor: &dyn Executor) -> Result<()> {
        if !executor.check_installed()? {
            return Err(BootstrapError::ExecutorNotInstalled {
                binary: executor.get_name().to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// The provisioning tool is spawned in `working_dir`, so it has to exist up front
pub fn ensure_working_dir(ctx: &Context, working_dir: &Path) -> Result<()> {
    if !ctx.fs.exists(working_dir) {
        bail!("Working directory does not exist: {}", working_dir.display());
    }
    Ok(())
}

/// Non-empty trimmed lines of `path`, in order
pub fn load_table_list(ctx: &Context, path: &Path) -> Result<Vec<String>> {
    let content = ctx
        .fs
        .read_to_string(path)
        .with_context(|| format!("Failed to load table list from {}", path.display()))?;

    let tables: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    ctx.output.info(&format!(
        "Loaded {} tables from {}",
        tables.len(),
        path.display()
    ));

    Ok(tables)
}

/// Import every table in order; failures are recorded and the loop moves on
pub fn import_tables(
    ctx: &Context,
    api: &dyn AnomaloApi,
    executor: &dyn Executor,
    tables: &[String],
    out_dir: &Path,
) -> ImportReport {
    let mut report = ImportReport::default();

    for table in tables {
        match import_table(ctx, api, executor, table, out_dir) {
            Ok(path) => report.imported.push(path),
            Err(reason) => {
                let failure = ImportFailure {
                    table: table.clone(),
                    reason,
                };
                ctx.output.error(&failure.to_string());
                report.failures.push(failure);
            }
        }
    }

    report
}

/// Import one table and its checks, returning the written file
pub fn import_table(
    ctx: &Context,
    api: &dyn AnomaloApi,
    executor: &dyn Executor,
    table: &str,
    out_dir: &Path,
) -> std::result::Result<PathBuf, SkipReason> {
    ctx.output.subsection(&format!("Downloading table {}", table));

    let metadata = api.get_table_information(table).map_err(|e| {
        log::error!("get_table_information({}) failed: {:#}", table, e);
        SkipReason::TableNotFound
    })?;
    let plan = TableImportPlan::for_table(&metadata).ok_or(SkipReason::TableNotFound)?;
    ctx.output.info(&format!(
        "Fetched table {} from anomalo ({})",
        table, plan.qualified_name
    ));

    let (checks, malformed) = api
        .get_checks_for_table(plan.table_id)
        .map_err(|e| {
            log::error!("get_checks_for_table({}) failed: {:#}", plan.table_id, e);
            SkipReason::ChecksNotFound
        })?
        .parse_checks()
        .ok_or(SkipReason::ChecksNotFound)?;
    if malformed > 0 {
        ctx.output.warning(&format!(
            "Ignoring {} malformed checks for table {}",
            malformed, table
        ));
    }
    let plan = plan.with_checks(&checks);
    ctx.output.info(&format!(
        "Fetched {} checks for table {}",
        plan.checks.len(),
        table
    ));
    for (state_reference, import_id) in plan.check_import_mapping() {
        log::debug!("{} <- {}", state_reference, import_id);
    }

    let out_path = out_dir.join(plan.file_name());
    if ctx.fs.exists(&out_path) {
        return Err(SkipReason::OutputExists(out_path));
    }

    let boilerplate = plan.boilerplate();
    write_file(ctx, &out_path, &boilerplate)?;
    ctx.output.dimmed(&boilerplate);

    let states = run_imports(ctx, executor, &plan).map_err(|e| {
        log::error!("{:#}", e);
        SkipReason::ExecutorFailed
    })?;

    let joined = states.join("\n");
    let final_content = strip_color_codes(&joined);
    write_file(ctx, &out_path, &final_content)?;
    ctx.output.success(&format!(
        "Imported {} resources for {} into {}",
        states.len(),
        table,
        out_path.display()
    ));

    Ok(out_path)
}

/// `import` then `state show` for the table and each check; returns the state dumps
fn run_imports(ctx: &Context, executor: &dyn Executor, plan: &TableImportPlan) -> Result<Vec<String>> {
    let mut states = Vec::new();

    for resource in plan.imports() {
        let import_output = executor.import(&resource.state_reference, &resource.import_id)?;
        ctx.output.plain(&import_output);

        let state = executor.state_show(&resource.state_reference)?;
        ctx.output.plain(&state);
        states.push(state);
    }

    Ok(states)
}

fn write_file(ctx: &Context, path: &Path, contents: &str) -> std::result::Result<(), SkipReason> {
    ctx.fs.write(path, contents).map_err(|e| {
        log::error!("{:#}", e);
        SkipReason::WriteFailed(path.to_path_buf())
    })
}

/// Log the aggregated failures, or success when there were none
pub fn report_summary(ctx: &Context, report: &ImportReport) {
    ctx.output.section("Summary");
    ctx.output
        .key_value("Imported", &report.imported.len().to_string());
    ctx.output
        .key_value("Failed", &report.failures.len().to_string());

    if report.is_success() {
        log::info!("Successfully imported all tables.");
        ctx.output.success("Successfully imported all tables.");
        return;
    }

    log::error!(
        "Failed import the following tables: {:?}",
        report.failure_pairs()
    );
    for failure in &report.failures {
        ctx.output.error(&format!("{}: {}", failure.table, failure));
    }
}
