use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use netsink::config::{self, Args};
use netsink::lifecycle::startup;
use netsink::observability::{logging, TracingEvents};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // No subscriber yet: the log file is part of what is being resolved.
    let settings = match config::resolve(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("netsink: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&settings.logging) {
        eprintln!("netsink: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?settings.mode(),
        "netsink starting"
    );

    match startup::run(settings, Arc::new(TracingEvents)).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
