//! Server lifecycle
//!
//! `OperationServer::init` opens the resource manager, reads the connection
//! parameters that follow a `--` token on the command line and builds the
//! operation service. `shutdown` closes the resource manager and returns the
//! server's own assertion counts.

use std::sync::Arc;

use xa_concurrency::ServiceRegistry;
use xa_core::{
    AssertionLedger, ConnectionParams, ErrorReporter, ResourceManager, RunSummary, StorageEngine,
    XaError, XaResult, CONNECTION_USAGE,
};

use crate::handlers::register_services;
use crate::operations::OperationService;

/// Server arguments after parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerArgs {
    /// Connection parameters found after `--`
    pub params: ConnectionParams,
    /// Problems found while parsing; reported and otherwise ignored
    pub warnings: Vec<String>,
}

impl ServerArgs {
    /// Parse the switches that follow the first `--` in `args`
    ///
    /// Everything up to and including `--` belongs to the hosting runtime.
    /// Each switch takes the next argument as its value. A stray value or an
    /// unknown switch is recorded as a warning and skipped; after an unknown
    /// switch the next argument is read as a switch again.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        let mut parsed = ServerArgs::default();
        let Some(start) = args.iter().position(|a| a.as_ref() == "--") else {
            return parsed;
        };

        let mut i = start + 1;
        while i < args.len() {
            let switch = args[i].as_ref();
            if !switch.starts_with('-') {
                parsed
                    .warnings
                    .push(format!("Unexpected value encountered: {}", switch));
                i += 1;
                continue;
            }
            let Some(value) = args.get(i + 1) else {
                parsed
                    .warnings
                    .push(format!("Missing argument value for: {}", switch));
                break;
            };
            match switch.chars().nth(1).and_then(|c| parsed.params.slot_mut(c)) {
                Some(slot) => {
                    *slot = value.as_ref().to_string();
                    i += 2;
                }
                None => {
                    parsed
                        .warnings
                        .push(format!("Unexpected option encountered: {}", switch));
                    i += 1;
                }
            }
        }
        parsed
    }
}

/// A running operation server
pub struct OperationServer {
    resource: Arc<dyn ResourceManager>,
    ops: Arc<OperationService>,
    params: ConnectionParams,
    ledger: Arc<AssertionLedger>,
}

impl OperationServer {
    /// Start the server
    ///
    /// # Errors
    ///
    /// `SetupFailed` if the resource manager cannot be opened or the
    /// required `-T` / `-R` parameters are missing. The resource manager is
    /// closed again in the latter case.
    pub fn init<S: AsRef<str>>(
        args: &[S],
        resource: Arc<dyn ResourceManager>,
        storage: Arc<dyn StorageEngine>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> XaResult<Self> {
        let ledger = Arc::new(AssertionLedger::new(reporter));

        ledger
            .assert_ok("tpsvrinit: failed to open database", resource.open())
            .map_err(|e| XaError::setup(format!("failed to open resource manager: {}", e)))?;

        let ServerArgs { params, warnings } = ServerArgs::parse(args);
        for warning in &warnings {
            tracing::warn!(target: "xa::service", "{}", warning);
        }
        tracing::info!(
            target: "xa::service",
            "---- Database Parameters for XA connection ----\n{}",
            params
        );

        if !ledger.assert_true(
            "Server Initialization Arguments Not Passed.",
            params.is_complete(),
        ) {
            let closed = ledger.warn_ok("tpsvrdone: failed to close database", resource.close());
            if closed.is_err() {
                tracing::warn!(target: "xa::service", "resource manager left open");
            }
            return Err(XaError::setup(CONNECTION_USAGE));
        }

        let ops = Arc::new(OperationService::new(storage, ledger.clone()));
        Ok(Self {
            resource,
            ops,
            params,
            ledger,
        })
    }

    /// Advertise the four services on `registry`
    pub fn advertise(&self, registry: &ServiceRegistry) {
        register_services(registry, self.ops.clone());
    }

    /// Operations backing the services
    pub fn operations(&self) -> &Arc<OperationService> {
        &self.ops
    }

    /// Connection parameters the server was started with
    pub fn connection(&self) -> &ConnectionParams {
        &self.params
    }

    /// Assertion counts so far
    pub fn summary(&self) -> RunSummary {
        self.ledger.summary()
    }

    /// Close the resource manager and return the final counts
    pub fn shutdown(self) -> RunSummary {
        let closed = self
            .ledger
            .assert_ok("tpsvrdone: failed to close database", self.resource.close())
            .is_ok();
        let summary = self.ledger.summary();
        tracing::info!(target: "xa::service", %summary, closed, "server shut down");
        summary
    }
}

impl std::fmt::Debug for OperationServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationServer")
            .field("summary", &self.summary())
            .finish()
    }
}
