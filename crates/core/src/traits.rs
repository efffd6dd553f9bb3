//! Core traits for the collaborators the harness talks to
//!
//! The transaction manager, the resource manager and the storage engine are
//! external systems. Both roles reach them only through these traits, so the
//! in-process implementations in this workspace can be swapped for bindings
//! to real middleware without touching the driver or the service.
//!
//! Thread safety: all traits require `Send + Sync`.

use std::time::Duration;

use crate::error::XaResult;
use crate::tm_error::TmError;
use crate::types::{BranchId, Predicate, Record, Scope, ServiceReply, TableSchema, Xid};

/// Transaction demarcation and service routing
///
/// One implementation instance holds at most one transaction association at
/// a time, the way a middleware client context does.
pub trait TransactionManager: Send + Sync {
    /// Start a global transaction
    ///
    /// A zero `timeout` means the transaction never times out.
    ///
    /// # Errors
    ///
    /// `TPEPROTO` if a transaction is already active, `TPETRAN` if the
    /// resource manager refuses the branch.
    fn begin(&self, timeout: Duration) -> Result<Xid, TmError>;

    /// Commit the active transaction
    ///
    /// The association is released whether or not the commit succeeds.
    ///
    /// # Errors
    ///
    /// `TPEPROTO` without an active transaction, `TPEABORT` if the
    /// transaction was rolled back instead, `TPEHAZARD` if the resource
    /// manager failed mid-commit.
    fn commit(&self) -> Result<(), TmError>;

    /// Roll back the active transaction
    ///
    /// # Errors
    ///
    /// `TPEPROTO` without an active transaction, `TPEHAZARD` if the
    /// resource manager failed to roll back.
    fn abort(&self) -> Result<(), TmError>;

    /// Call a named service with a request buffer
    ///
    /// Inside a transaction the service runs in the transaction's branch.
    ///
    /// # Errors
    ///
    /// `TPENOENT` for an unknown service, `TPESVCFAIL` if the service
    /// replied with failure, `TPETIME` if the transaction timed out.
    fn call(&self, service: &str, request: &[u8]) -> Result<Vec<u8>, TmError>;

    /// The active transaction, if any
    fn current(&self) -> Option<Xid>;
}

/// A transactional data store registered with the transaction manager
pub trait ResourceManager: Send + Sync {
    /// Open the resource manager for this process
    fn open(&self) -> XaResult<()>;

    /// Close the resource manager
    fn close(&self) -> XaResult<()>;

    /// Start a branch of `xid`
    fn start(&self, xid: Xid) -> XaResult<BranchId>;

    /// Make the branch's writes durable and visible
    fn commit(&self, branch: BranchId) -> XaResult<()>;

    /// Discard the branch's writes
    fn rollback(&self, branch: BranchId) -> XaResult<()>;
}

/// Single-table row storage
///
/// Update and delete take one equality predicate; reads go through a
/// forward-only [`RowReader`].
pub trait StorageEngine: Send + Sync {
    /// Does `table` exist
    fn table_exists(&self, table: &str) -> XaResult<bool>;

    /// Create a table
    ///
    /// # Errors
    ///
    /// Returns a storage error if the table already exists.
    fn create_table(&self, schema: &TableSchema) -> XaResult<()>;

    /// Drop a table and its rows
    ///
    /// # Errors
    ///
    /// Returns a storage error if the table does not exist.
    fn drop_table(&self, table: &str) -> XaResult<()>;

    /// Insert one row
    ///
    /// # Errors
    ///
    /// Returns a storage error if the table is missing or the row violates
    /// the schema.
    fn insert(&self, scope: Scope, table: &str, record: Record) -> XaResult<()>;

    /// Set the payload of every row matching `predicate`; returns the count
    fn update_where(
        &self,
        scope: Scope,
        table: &str,
        predicate: Predicate,
        payload: &str,
    ) -> XaResult<usize>;

    /// Delete every row matching `predicate`; returns the count
    fn delete_where(&self, scope: Scope, table: &str, predicate: Predicate) -> XaResult<usize>;

    /// Open a reader over the rows visible in `scope`
    fn reader(&self, scope: Scope, table: &str) -> XaResult<RowReader>;
}

/// Forward-only cursor over table rows
#[derive(Debug)]
pub struct RowReader {
    rows: std::vec::IntoIter<Record>,
}

impl RowReader {
    /// Reader over an already materialized row set
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl Iterator for RowReader {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.rows.next()
    }
}

/// An inbound service invocation
#[derive(Debug, Clone, Copy)]
pub struct ServiceRequest<'a> {
    /// Name the caller addressed
    pub service: &'a str,
    /// Request buffer
    pub data: &'a [u8],
    /// Global transaction the call belongs to
    pub xid: Option<Xid>,
    /// Branch on the resource manager for that transaction
    pub branch: Option<BranchId>,
}

impl ServiceRequest<'_> {
    /// Storage scope the service should use
    pub fn scope(&self) -> Scope {
        Scope::from(self.branch)
    }
}

/// Server-side logic dispatched by name
pub trait ServiceHandler: Send + Sync {
    /// Handle one request
    fn invoke(&self, request: &ServiceRequest<'_>) -> ServiceReply;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_reader_is_forward_only() {
        let mut reader = RowReader::new(vec![Record::new(1, "a"), Record::new(2, "b")]);
        assert_eq!(reader.next().unwrap().key, 1);
        assert_eq!(reader.next().unwrap().key, 2);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_service_request_scope() {
        let req = ServiceRequest {
            service: "SERV_CHK_DATA",
            data: b"0:",
            xid: None,
            branch: None,
        };
        assert_eq!(req.scope(), Scope::Autocommit);

        let branch = BranchId::new(3);
        let req = ServiceRequest {
            branch: Some(branch),
            xid: Some(Xid::new()),
            ..req
        };
        assert_eq!(req.scope(), Scope::Branch(branch));
    }
}
