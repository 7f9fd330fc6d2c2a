mod cli;
mod config;
mod error;
mod logging;
mod output;

use std::io::{stdout, BufWriter};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use taxjar_core::{ReqwestHttpClient, TransactionsExtractor};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::cli::Cli;
use crate::config::TapConfig;
use crate::error::CliError;
use crate::output::MessageWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup_logging(cli.log_level.into());

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.discover {
        output::write_catalog(stdout().lock())?;
        return Ok(());
    }

    let config = TapConfig::resolve(cli)?;
    let window = config.window()?;
    let extractor = TransactionsExtractor::new(
        config.extractor_config(cli),
        Arc::new(ReqwestHttpClient::new()?),
    )?;

    let mut sink = MessageWriter::new(BufWriter::new(stdout().lock()));
    sink.write_schema()?;

    let timer = Instant::now();
    let span = info_span!("extraction", run_id = %Uuid::new_v4());
    let report = extractor.run(&window, &mut sink).instrument(span).await?;

    info!(
        days = report.days.len(),
        listed = report.listed(),
        emitted = report.emitted(),
        skipped = report.skipped(),
        written = sink.records_written(),
        elapsed = ?timer.elapsed(),
        "run complete"
    );

    Ok(())
}
