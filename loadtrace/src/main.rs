//! # loadtrace - Main Entry Point
//!
//! Parses arguments, traces the target program and reports the outcome:
//! - the trace goes to `--output` (or stderr with `-E`)
//! - a failing program still leaves a complete trace, then exits with an error

use anyhow::{Context, Result};
use clap::Parser;

use loadtrace::cli::Args;
use loadtrace::domain::{ConfigError, TraceError};
use loadtrace::output::Destination;
use loadtrace::tracer::trace_program;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<TraceError>() {
        Some(TraceError::Config(ConfigError::ProgramNotFound(_))) => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;
    let config = args.into_config();

    if !quiet {
        println!("loadtrace v{}", env!("CARGO_PKG_VERSION"));
        println!("program: {}", config.program.display());
        match &config.destination {
            Destination::File(path) => println!("output: {}", path.display()),
            Destination::Stderr => println!("output: stderr"),
        }
    }

    let report = trace_program(&config)?;

    if !quiet {
        println!(
            "traced {} loads ({} failed), {} records written",
            report.stats.loads, report.stats.failed, report.records_written
        );
        if let Some(ref export_path) = config.export {
            println!("saved: {}", export_path.display());
        }
    }

    report.outcome.with_context(|| format!("{} failed", config.program.display()))
}
