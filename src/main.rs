mod batch;

use std::process::ExitCode;

use log::info;
use metric_tsp_core::{CancelToken, Error, Result, RunOptions, TspEngine, logging};

use crate::batch::BatchSummary;

fn main() -> ExitCode {
    match run() {
        Ok(summary) if summary.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<BatchSummary> {
    let options = RunOptions::from_args()?;
    logging::init_logger(&options)?;
    info!("options: {options}");

    let engine = TspEngine::new(options.engine_config())?;
    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || on_interrupt.cancel())
        .map_err(|e| Error::other(format!("failed to install Ctrl-C handler: {e}")))?;

    batch::run_batch(&options, &engine, &cancel)
}
