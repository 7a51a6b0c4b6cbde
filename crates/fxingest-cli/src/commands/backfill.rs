use std::sync::Arc;

use fxingest_core::HttpClient;

use crate::cli::BackfillArgs;
use crate::config::Settings;
use crate::error::CliError;

use super::{execute, FetchWindow, IngestJob, IngestReport};

pub async fn run(
    args: &BackfillArgs,
    settings: &Settings,
    http: Arc<dyn HttpClient>,
) -> Result<IngestReport, CliError> {
    let job = IngestJob {
        command: "backfill",
        window: FetchWindow::Range {
            start: args.start,
            end: args.end,
        },
        base: &args.common.base,
        symbols: args.common.symbols.as_slice(),
        cache_mode: args.common.cache_mode(),
    };
    execute(job, settings, http).await
}
