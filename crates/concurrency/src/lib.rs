//! Transaction management for the XA harness
//!
//! This crate provides the in-process transaction manager:
//! - GlobalTransaction: Xid, branch and lifecycle status
//! - ServiceRegistry: advertised service names and their handlers
//! - LocalTransactionManager: begin/commit/abort/call over one resource manager
//!
//! A single resource manager participates in every transaction, so commit
//! is one-phase.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dispatch;
pub mod manager;
pub mod transaction;

pub use dispatch::ServiceRegistry;
pub use manager::{LocalTransactionManager, TransactionStats};
pub use transaction::{GlobalTransaction, TransactionStatus};
