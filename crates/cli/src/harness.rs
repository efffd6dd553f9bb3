//! Wires both roles together in one process.
//!
//! One `MemoryStorage` serves as the resource manager and as the plain
//! connection the driver uses for table setup. The operation server
//! advertises its services on a registry and the driver reaches them through
//! `LocalTransactionManager`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::ArgMatches;
use serde::Serialize;

use xa_concurrency::{LocalTransactionManager, ServiceRegistry};
use xa_core::{
    AssertionLedger, ConnectionParams, ErrorReporter, RunSummary, TracingReporter,
    CONNECTION_USAGE,
};
use xa_driver::{HarnessConfig, RunMode, RunReport, ScenarioDriver, CONFIG_FILE_NAME};
use xa_service::OperationServer;
use xa_storage::MemoryStorage;

/// Both roles' results.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessOutcome {
    /// Scenario driver report.
    pub client: RunReport,
    /// Operation server's own assertion counts.
    pub server: RunSummary,
}

impl HarnessOutcome {
    /// True when neither role recorded a failed assertion.
    pub fn passed(&self) -> bool {
        self.client.passed() && self.server.passed()
    }
}

/// Build the effective configuration: defaults, then file, then flags.
pub fn resolve_config(matches: &ArgMatches) -> anyhow::Result<HarnessConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => HarnessConfig::from_file(Path::new(path))?,
        None if Path::new(CONFIG_FILE_NAME).exists() => {
            HarnessConfig::from_file(Path::new(CONFIG_FILE_NAME))?
        }
        None => HarnessConfig::default(),
    };

    if let Some(mode) = matches.get_one::<String>("mode") {
        config.mode = mode.parse::<RunMode>()?;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.transaction_timeout_secs = *timeout;
    }

    let flag = |id: &str| matches.get_one::<String>(id).cloned().unwrap_or_default();
    config.connection.merge(&ConnectionParams {
        server_type: flag("server-type"),
        server_name: flag("server-name"),
        user: flag("user"),
        password: flag("password"),
        database: flag("database"),
        properties: flag("properties"),
    });
    Ok(config)
}

/// Server command line carrying `params` after the `--` token.
fn server_args(params: &ConnectionParams) -> Vec<String> {
    let mut args = vec!["xa-server".to_string(), "--".to_string()];
    for (switch, value) in [
        ("-T", &params.server_type),
        ("-S", &params.server_name),
        ("-U", &params.user),
        ("-P", &params.password),
        ("-B", &params.database),
        ("-R", &params.properties),
    ] {
        if !value.is_empty() {
            args.push(switch.to_string());
            args.push(value.clone());
        }
    }
    args
}

/// Start the server, run the suite, shut the server down.
pub fn run_harness(config: HarnessConfig) -> anyhow::Result<HarnessOutcome> {
    if !config.connection.is_complete() {
        bail!("missing connection parameters. {}", CONNECTION_USAGE);
    }

    let reporter: Arc<dyn ErrorReporter> = Arc::new(TracingReporter);
    let store = Arc::new(MemoryStorage::new());

    let args = server_args(&config.connection);
    let server = OperationServer::init(
        args.as_slice(),
        store.clone(),
        store.clone(),
        reporter.clone(),
    )
    .context("operation server failed to start")?;
    let registry = Arc::new(ServiceRegistry::new());
    server.advertise(&registry);

    let tm = Arc::new(LocalTransactionManager::new(store.clone(), registry));
    let ledger = Arc::new(AssertionLedger::new(reporter));
    let driver = ScenarioDriver::new(tm, store, ledger, config);

    let client = driver.run();
    let server = server.shutdown();
    let client = client.context("test environment setup failed")?;

    Ok(HarnessOutcome { client, server })
}
