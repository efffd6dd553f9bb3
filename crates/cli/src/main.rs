//! XA harness CLI.
//!
//! Two subcommands:
//! - **run**: `xa-harness run -T memory -R db=xa` runs the scenario suite
//! - **init-config**: `xa-harness init-config` writes `xa-harness.toml`
//!
//! Exits 1 when any assertion failed or the run could not start.
//! Log verbosity follows `RUST_LOG` (default `xa=info`).

mod commands;
mod format;
mod harness;

use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;
use xa_driver::{HarnessConfig, CONFIG_FILE_NAME};

use commands::build_cli;
use format::{format_error, format_outcome, OutputMode};
use harness::{resolve_config, run_harness};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xa=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();
    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let exit_code = match matches.subcommand() {
        Some(("run", sub)) => run(sub, mode),
        Some(("init-config", sub)) => init_config(sub, mode),
        _ => {
            eprintln!("(error) unknown command");
            1
        }
    };
    process::exit(exit_code);
}

fn run(matches: &clap::ArgMatches, mode: OutputMode) -> i32 {
    let outcome = resolve_config(matches).and_then(run_harness);
    match outcome {
        Ok(outcome) => {
            tracing::debug!(target: "xa::cli", passed = outcome.passed(), "harness finished");
            println!("{}", format_outcome(&outcome, mode));
            if outcome.passed() {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    }
}

fn init_config(matches: &clap::ArgMatches, mode: OutputMode) -> i32 {
    let path = matches
        .get_one::<String>("path")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    match HarnessConfig::write_default_if_missing(&path) {
        Ok(true) => {
            eprintln!("Wrote {}", path.display());
            0
        }
        Ok(false) => {
            eprintln!("{} already exists, leaving it unchanged", path.display());
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e.into(), mode));
            1
        }
    }
}
