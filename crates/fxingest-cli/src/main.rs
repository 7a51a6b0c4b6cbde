mod cli;
mod commands;
mod config;
mod error;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use fxingest_core::{HttpClient, ReqwestHttpClient};

use crate::cli::Cli;
use crate::config::Settings;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let common = cli.command.common();
    let settings = Settings::from_env()?
        .with_overrides(common.db_path.clone(), common.log_level.clone());
    settings.ensure_runtime_paths()?;
    let _log_guard = logging::init(&settings.log_level, &settings.log_file)?;

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let report = commands::run(&cli.command, &settings, http).await?;
    tracing::info!(
        run_id = %report.run_id,
        rows = report.rows,
        "{} finished",
        cli.command.name()
    );
    Ok(())
}
