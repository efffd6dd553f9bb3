//! Data operations against the test table
//!
//! Every operation first checks that the test table exists, then runs one
//! storage call in the caller's scope. Each check is counted in the
//! service's [`AssertionLedger`].

use std::sync::Arc;

use xa_core::{
    AssertionLedger, Predicate, Record, RequestMessage, Scope, StorageEngine, XaError, XaResult,
    RECORD_ID, TABLE_NAME,
};

const TABLE_MISSING: &str = "Test table not found.";

/// The four operations the services expose
pub struct OperationService {
    storage: Arc<dyn StorageEngine>,
    ledger: Arc<AssertionLedger>,
}

impl OperationService {
    /// Operations over `storage`, counting checks in `ledger`
    pub fn new(storage: Arc<dyn StorageEngine>, ledger: Arc<AssertionLedger>) -> Self {
        Self { storage, ledger }
    }

    /// Ledger the operations count into
    pub fn ledger(&self) -> &Arc<AssertionLedger> {
        &self.ledger
    }

    /// Decode a request buffer into key and payload
    pub fn decode(&self, data: &[u8]) -> XaResult<RequestMessage> {
        self.ledger
            .assert_ok("Malformed request message.", RequestMessage::decode_bytes(data))
    }

    /// Insert `key`/`payload` as a new row
    ///
    /// # Errors
    ///
    /// `AssertionFailed` if the table is missing, `Storage` if the insert
    /// is rejected.
    pub fn insert(&self, scope: Scope, key: i32, payload: &str) -> XaResult<()> {
        tracing::debug!(target: "xa::service", ?scope, key, payload, "insertData");
        self.require_table("insertData")?;
        self.ledger.assert_ok(
            "Error inserting data into test table.",
            self.storage
                .insert(scope, TABLE_NAME, Record::new(key, payload)),
        )
    }

    /// Set the payload of rows with `key`; no matching row is a no-op
    pub fn update(&self, scope: Scope, key: i32, payload: &str) -> XaResult<usize> {
        tracing::debug!(target: "xa::service", ?scope, key, payload, "updateData");
        self.require_table("updateData")?;
        self.ledger.assert_ok(
            "Error updating data in test table.",
            self.storage
                .update_where(scope, TABLE_NAME, Predicate::KeyEquals(key), payload),
        )
    }

    /// Delete rows with `key`; no matching row is a no-op
    pub fn delete(&self, scope: Scope, key: i32) -> XaResult<usize> {
        tracing::debug!(target: "xa::service", ?scope, key, "deleteData");
        self.require_table("deleteData")?;
        self.ledger.assert_ok(
            "Error deleting data in test table.",
            self.storage
                .delete_where(scope, TABLE_NAME, Predicate::KeyEquals(key)),
        )
    }

    /// Verify the rows stored under [`RECORD_ID`]
    ///
    /// Passes when `expected` is empty and there is no such row, or when
    /// `expected` is non-empty and there is exactly one row holding it.
    pub fn check(&self, scope: Scope, expected: &str) -> bool {
        tracing::debug!(target: "xa::service", ?scope, expected, "checkData");
        if self.require_table("checkData").is_err() {
            return false;
        }
        let reader = match self.ledger.assert_ok(
            "Error reading test table.",
            self.storage.reader(scope, TABLE_NAME),
        ) {
            Ok(reader) => reader,
            Err(_) => return false,
        };

        let rows: Vec<Record> = reader.filter(|r| r.key == RECORD_ID).collect();
        let wanted = usize::from(!expected.is_empty());

        if let [row] = rows.as_slice() {
            if !expected.is_empty() {
                let tag = format!(
                    "Wrong data in test table: found {}, expected {}",
                    row.payload, expected
                );
                if !self.ledger.assert_true(&tag, row.payload == expected) {
                    return false;
                }
            }
        }

        let tag = format!(
            "Wrong number of rows in test table: found {}, expected {}",
            rows.len(),
            wanted
        );
        self.ledger.assert_true(&tag, rows.len() == wanted)
    }

    /// One assertion that the test table exists; the detail names `operation`
    #[track_caller]
    fn require_table(&self, operation: &str) -> XaResult<()> {
        let present = match self.storage.table_exists(TABLE_NAME) {
            Ok(true) => Ok(()),
            Ok(false) => Err(XaError::storage(format!(
                "{}: table {} does not exist",
                operation, TABLE_NAME
            ))),
            Err(e) => Err(XaError::storage(format!("{}: {}", operation, e))),
        };
        self.ledger.assert_ok(TABLE_MISSING, present)
    }
}

impl std::fmt::Debug for OperationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationService")
            .field("ledger", &self.ledger)
            .finish()
    }
}
