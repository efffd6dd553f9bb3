//! Core types and traits for the XA harness
//!
//! This crate defines the foundational types used by both roles:
//! - RequestMessage: `<key>:<payload>` wire format
//! - XaError: Error kind hierarchy
//! - TmErrorCode / TmError: Transaction-manager error codes and their table
//! - Record, TableSchema, Scope, Predicate: The test table
//! - Traits: TransactionManager, ResourceManager, StorageEngine, ServiceHandler
//! - AssertionLedger / ErrorReporter: Assertion counting and diagnostics
//! - ConnectionParams: `-T -S -U -P -B -R` database parameters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connection;
pub mod error;
pub mod message;
pub mod report;
pub mod tm_error;
pub mod traits;
pub mod types;

pub use connection::{ConnectionParams, CONNECTION_USAGE};
pub use error::{XaError, XaResult};
pub use message::RequestMessage;
pub use report::{
    AssertionLedger, Diagnostic, ErrorReporter, RecordingReporter, RunSummary, Severity,
    TracingReporter,
};
pub use tm_error::{TmError, TmErrorCode, TmErrorInfo, TM_ERROR_TABLE};
pub use traits::{
    ResourceManager, RowReader, ServiceHandler, ServiceRequest, StorageEngine, TransactionManager,
};
pub use types::{
    BranchId, Predicate, Record, Scope, ServiceName, ServiceReply, ServiceStatus, TableSchema,
    Xid, PAYLOAD_WIDTH, RECORD_ID, TABLE_NAME,
};
