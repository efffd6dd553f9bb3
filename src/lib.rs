//! XA harness - scenario suite for distributed transaction support
//!
//! Two roles exercise a transaction manager against one relational resource
//! manager:
//!
//! - the **operation server** advertises `SERV_INS_DATA`, `SERV_UPD_DATA`,
//!   `SERV_DEL_DATA` and `SERV_CHK_DATA`, each running one data operation inside
//!   the caller's transaction branch
//! - the **scenario driver** sets up the test table, runs the fixed
//!   seven-step suite of begin / call / commit-or-abort / verify scenarios
//!   and counts assertions
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use xaharness::{
//!     AssertionLedger, HarnessConfig, LocalTransactionManager, MemoryStorage,
//!     OperationServer, ScenarioDriver, ServiceRegistry, TracingReporter,
//! };
//!
//! let store = Arc::new(MemoryStorage::new());
//! let server = OperationServer::init(
//!     &["--", "-T", "memory", "-R", "db=xa"],
//!     store.clone(),
//!     store.clone(),
//!     Arc::new(TracingReporter),
//! )?;
//! let registry = Arc::new(ServiceRegistry::new());
//! server.advertise(&registry);
//!
//! let tm = Arc::new(LocalTransactionManager::new(store.clone(), registry));
//! let ledger = Arc::new(AssertionLedger::new(Arc::new(TracingReporter)));
//! let report = ScenarioDriver::new(tm, store, ledger, HarnessConfig::default()).run()?;
//! assert!(report.passed());
//! ```
//!
//! # Architecture
//!
//! The transaction manager, resource manager and storage engine are traits in
//! `xa-core`. The workspace ships in-process implementations of each
//! (`LocalTransactionManager`, `MemoryStorage`) so the whole suite runs in
//! one process; bindings to real middleware plug in behind the same traits.

pub use xa_concurrency::*;
pub use xa_core::*;
pub use xa_driver::*;
pub use xa_service::*;
pub use xa_storage::*;
