//! Test table lifecycle
//!
//! The table is created through a plain, non-transactional connection before
//! any scenario runs and dropped when the environment goes out of scope, on
//! every exit path.

use std::sync::Arc;

use xa_core::{AssertionLedger, StorageEngine, TableSchema, XaError, XaResult};

/// Owns the test table for the duration of a run
pub struct TestEnvironment {
    storage: Arc<dyn StorageEngine>,
    ledger: Arc<AssertionLedger>,
    schema: TableSchema,
    torn_down: bool,
}

impl TestEnvironment {
    /// Create the test table, dropping a leftover one first
    ///
    /// # Errors
    ///
    /// `SetupFailed` if the leftover table cannot be dropped or the new one
    /// cannot be created. Both are counted as failed assertions.
    pub fn setup(storage: Arc<dyn StorageEngine>, ledger: Arc<AssertionLedger>) -> XaResult<Self> {
        Self::setup_with(storage, ledger, TableSchema::test_table())
    }

    /// [`TestEnvironment::setup`] for an explicit schema
    pub fn setup_with(
        storage: Arc<dyn StorageEngine>,
        ledger: Arc<AssertionLedger>,
        schema: TableSchema,
    ) -> XaResult<Self> {
        tracing::info!(target: "xa::driver", table = %schema.name, "Creating test table...");

        let leftover = storage.table_exists(&schema.name);
        if let Ok(true) = leftover {
            let tag = format!(
                "Table `{}` already exists.  Dropping existing test table failed.",
                schema.name
            );
            setup_step(&ledger, &tag, drop_verified(storage.as_ref(), &schema.name))?;
        }

        let tag = format!("Unable to create table `{}`.", schema.name);
        let created = leftover.and_then(|_| create_verified(storage.as_ref(), &schema));
        setup_step(&ledger, &tag, created)?;

        tracing::info!(target: "xa::driver", "...Done");
        Ok(Self {
            storage,
            ledger,
            schema,
            torn_down: false,
        })
    }

    /// Schema of the managed table
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Drop the test table; failures are warnings
    ///
    /// Idempotent. Also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        tracing::info!(target: "xa::driver", table = %self.schema.name, "Dropping test table...");

        let exists = self.storage.table_exists(&self.schema.name);
        if !self
            .ledger
            .warn_true("Test table not found.", !matches!(exists, Ok(false)))
        {
            return;
        }
        let dropped =
            exists.and_then(|_| drop_verified(self.storage.as_ref(), &self.schema.name));
        if self
            .ledger
            .warn_ok("Unable to drop test table.", dropped)
            .is_ok()
        {
            tracing::info!(target: "xa::driver", "...Done");
        }
    }
}

/// Count one setup assertion; a failure becomes `SetupFailed`
#[track_caller]
fn setup_step(ledger: &AssertionLedger, tag: &str, result: XaResult<()>) -> XaResult<()> {
    ledger
        .assert_ok(tag, result)
        .map_err(|e| XaError::setup(format!("{} {}", tag, e)))
}

fn drop_verified(storage: &dyn StorageEngine, table: &str) -> XaResult<()> {
    storage.drop_table(table)?;
    if storage.table_exists(table)? {
        return Err(XaError::storage(format!("table {} still exists after drop", table)));
    }
    Ok(())
}

fn create_verified(storage: &dyn StorageEngine, schema: &TableSchema) -> XaResult<()> {
    storage.create_table(schema)?;
    if !storage.table_exists(&schema.name)? {
        return Err(XaError::storage(format!(
            "table {} missing after create",
            schema.name
        )));
    }
    Ok(())
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for TestEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestEnvironment")
            .field("table", &self.schema.name)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}
