//! debundle - Webpack bootstrap detection and entry-point recovery.
//!
//! CLI entry point.

use clap::Parser;
use debundle::output::ConsoleOutput;
use debundle::{Config, Options, Unpacker};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = Config::parse();

    // Set up logging
    let filter = if config.verbose {
        EnvFilter::new("debundle=debug,info")
    } else {
        EnvFilter::new("debundle=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let unpacker = Unpacker::new(Options::from(&config));
    let console = ConsoleOutput::new(config.verbose, config.json, config.quiet);

    let reports = unpacker.unpack_files(&config.inputs);

    for report in &reports {
        console.print_report(report);
    }

    if let Some(ref output_path) = config.output {
        if let Err(e) = console.write_json(&reports, output_path) {
            error!("Failed to write output file: {}", e);
            return ExitCode::FAILURE;
        }
        info!("Results written to: {:?}", output_path);
    }

    if let Err(e) = console.print_summary(&reports) {
        error!("Failed to print results: {}", e);
        return ExitCode::FAILURE;
    }

    if reports.iter().any(|r| !r.is_ok()) {
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
