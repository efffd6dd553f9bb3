//! Shared stack wiring for the comprehensive suite.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

pub use xaharness::{
    AssertionLedger, HarnessConfig, LocalTransactionManager, MemoryStorage, OperationServer,
    RecordingReporter, RequestMessage, RunMode, Scenario, ScenarioDriver, ServiceName,
    ServiceRegistry, StorageEngine, TableSchema, TmError, TmErrorCode, TransactionManager, RECORD_ID,
    TABLE_NAME,
};

/// One server, one manager, one store
pub struct Harness {
    pub store: Arc<MemoryStorage>,
    pub tm: Arc<LocalTransactionManager>,
    pub server: OperationServer,
    pub server_log: Arc<RecordingReporter>,
    pub client_log: Arc<RecordingReporter>,
    pub ledger: Arc<AssertionLedger>,
}

impl Harness {
    /// Start the server and advertise its services; no table yet
    pub fn start() -> Self {
        let store = Arc::new(MemoryStorage::new());
        let server_log = Arc::new(RecordingReporter::new());
        let server = OperationServer::init(
            &["xa-server", "--", "-T", "memory", "-R", "db=xa"],
            store.clone(),
            store.clone(),
            server_log.clone(),
        )
        .expect("server init");
        let registry = Arc::new(ServiceRegistry::new());
        server.advertise(&registry);
        let tm = Arc::new(LocalTransactionManager::new(store.clone(), registry));
        let client_log = Arc::new(RecordingReporter::new());
        let ledger = Arc::new(AssertionLedger::new(client_log.clone()));
        Self {
            store,
            tm,
            server,
            server_log,
            client_log,
            ledger,
        }
    }

    /// Start and create the test table
    pub fn with_table() -> Self {
        let harness = Self::start();
        harness
            .store
            .create_table(&TableSchema::test_table())
            .expect("create table");
        harness
    }

    /// Call a service with an encoded request
    pub fn call(&self, service: ServiceName, key: i32, payload: &str) -> Result<Vec<u8>, TmError> {
        let request = RequestMessage::new(key, payload);
        self.tm.call(service.as_str(), &request.to_bytes())
    }

    /// `SERV_CHK_DATA` in whatever transaction is current
    pub fn check(&self, expected: &str) -> bool {
        self.call(ServiceName::CheckData, 0, expected).is_ok()
    }

    pub fn begin(&self) {
        self.tm.begin(Duration::from_secs(60)).expect("tpbegin");
    }

    pub fn driver(&self, mode: RunMode, scenarios: Vec<Scenario>) -> ScenarioDriver {
        let config = HarnessConfig {
            mode,
            ..HarnessConfig::default()
        };
        ScenarioDriver::new(self.tm.clone(), self.store.clone(), self.ledger.clone(), config)
            .with_scenarios(scenarios)
    }
}
