//! Scenario driver for the XA harness
//!
//! The client role: sets up the test table, runs the fixed scenario suite
//! through a transaction manager and reports assertion counts.
//!
//! - `scenario`: scenarios as data and the standard seven-step suite
//! - `driver`: per-scenario phase machine and the run loop
//! - `environment`: test table setup and teardown
//! - `config`: `xa-harness.toml` and the run mode

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod driver;
pub mod environment;
pub mod scenario;

pub use config::{HarnessConfig, RunMode, CONFIG_FILE_NAME};
pub use driver::{RunReport, ScenarioDriver, ScenarioOutcome, ScenarioPhase, ScenarioRun};
pub use environment::TestEnvironment;
pub use scenario::{Operation, Resolution, Scenario};
