//! MemoryStorage: in-memory table store and resource manager
//!
//! This module implements `StorageEngine` and `ResourceManager` using:
//! - `FxHashMap<String, Table>` behind a `parking_lot::RwLock` for committed rows
//! - Per-branch write sets behind a `parking_lot::Mutex`
//! - `AtomicU64` for branch handle allocation
//!
//! # Design Notes
//!
//! - **Buffered branches**: branch writes are kept as an ordered list of
//!   operations and replayed over committed rows for reads (read-your-writes)
//! - **Atomic apply**: commit stages every operation against a copy of the
//!   touched tables and swaps them in under one write lock, so no reader
//!   observes a partially applied branch
//! - **DDL is not transactional**: create/drop take effect immediately

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use xa_core::{
    BranchId, Predicate, Record, ResourceManager, RowReader, Scope, StorageEngine, TableSchema,
    XaError, XaResult, Xid,
};

use crate::branch::{BranchWriteSet, WriteOp};

/// A table: schema plus committed rows in insertion order
#[derive(Debug, Clone)]
struct Table {
    schema: TableSchema,
    rows: Vec<Record>,
}

impl Table {
    fn check_payload(&self, payload: &str) -> XaResult<()> {
        let width = payload.chars().count();
        if width > self.schema.payload_width {
            return Err(XaError::storage(format!(
                "value too long for column {}.{}: {} > {}",
                self.schema.name, self.schema.payload_column, width, self.schema.payload_width
            )));
        }
        Ok(())
    }
}

/// In-memory storage backend
///
/// Thread-safe through `parking_lot` locks. One instance serves both the
/// non-transactional setup connection and every transaction branch.
#[derive(Debug)]
pub struct MemoryStorage {
    tables: RwLock<FxHashMap<String, Table>>,
    branches: Mutex<FxHashMap<BranchId, BranchWriteSet>>,
    next_branch: AtomicU64,
    open: AtomicBool,
}

impl MemoryStorage {
    /// Create an empty store
    ///
    /// The resource manager starts closed; call [`ResourceManager::open`]
    /// before starting branches.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(FxHashMap::default()),
            branches: Mutex::new(FxHashMap::default()),
            next_branch: AtomicU64::new(1),
            open: AtomicBool::new(false),
        }
    }

    /// Number of branches started but not yet committed or rolled back
    pub fn active_branches(&self) -> usize {
        self.branches.lock().len()
    }

    /// Committed rows of `table`, for inspection
    pub fn committed_rows(&self, table: &str) -> XaResult<Vec<Record>> {
        let tables = self.tables.read();
        lookup(&tables, table).map(|t| t.rows.clone())
    }

    /// Rows visible in `scope`: committed rows, plus the branch's buffered
    /// writes when scoped to a branch
    fn visible_rows(&self, scope: Scope, table: &str) -> XaResult<Vec<Record>> {
        let mut rows = self.committed_rows(table)?;
        if let Scope::Branch(branch) = scope {
            let branches = self.branches.lock();
            let set = branches
                .get(&branch)
                .ok_or_else(|| unknown_branch(branch))?;
            for op in set.ops_for(table) {
                op.apply(&mut rows);
            }
        }
        Ok(rows)
    }

    /// Apply `op` now (autocommit) or buffer it in the branch
    fn write(&self, scope: Scope, op: WriteOp) -> XaResult<()> {
        match scope {
            Scope::Autocommit => {
                let mut tables = self.tables.write();
                let table = lookup_mut(&mut tables, op.table())?;
                op.apply(&mut table.rows);
                Ok(())
            }
            Scope::Branch(branch) => {
                let mut branches = self.branches.lock();
                let set = branches
                    .get_mut(&branch)
                    .ok_or_else(|| unknown_branch(branch))?;
                set.push(op);
                Ok(())
            }
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<'a>(tables: &'a FxHashMap<String, Table>, name: &str) -> XaResult<&'a Table> {
    tables
        .get(name)
        .ok_or_else(|| XaError::storage(format!("table {} does not exist", name)))
}

fn lookup_mut<'a>(
    tables: &'a mut FxHashMap<String, Table>,
    name: &str,
) -> XaResult<&'a mut Table> {
    tables
        .get_mut(name)
        .ok_or_else(|| XaError::storage(format!("table {} does not exist", name)))
}

fn unknown_branch(branch: BranchId) -> XaError {
    XaError::storage(format!("unknown transaction {}", branch))
}

impl StorageEngine for MemoryStorage {
    fn table_exists(&self, table: &str) -> XaResult<bool> {
        Ok(self.tables.read().contains_key(table))
    }

    fn create_table(&self, schema: &TableSchema) -> XaResult<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(&schema.name) {
            return Err(XaError::storage(format!(
                "table {} already exists",
                schema.name
            )));
        }
        tables.insert(
            schema.name.clone(),
            Table {
                schema: schema.clone(),
                rows: Vec::new(),
            },
        );
        tracing::debug!(target: "xa::storage", table = %schema.name, "created table");
        Ok(())
    }

    fn drop_table(&self, table: &str) -> XaResult<()> {
        if self.tables.write().remove(table).is_none() {
            return Err(XaError::storage(format!("table {} does not exist", table)));
        }
        tracing::debug!(target: "xa::storage", table, "dropped table");
        Ok(())
    }

    fn insert(&self, scope: Scope, table: &str, record: Record) -> XaResult<()> {
        {
            let tables = self.tables.read();
            lookup(&tables, table)?.check_payload(&record.payload)?;
        }
        self.write(
            scope,
            WriteOp::Insert {
                table: table.to_string(),
                record,
            },
        )
    }

    fn update_where(
        &self,
        scope: Scope,
        table: &str,
        predicate: Predicate,
        payload: &str,
    ) -> XaResult<usize> {
        {
            let tables = self.tables.read();
            lookup(&tables, table)?.check_payload(payload)?;
        }
        let matched = self
            .visible_rows(scope, table)?
            .iter()
            .filter(|r| predicate.matches(r))
            .count();
        self.write(
            scope,
            WriteOp::Update {
                table: table.to_string(),
                predicate,
                payload: payload.to_string(),
            },
        )?;
        Ok(matched)
    }

    fn delete_where(&self, scope: Scope, table: &str, predicate: Predicate) -> XaResult<usize> {
        let matched = self
            .visible_rows(scope, table)?
            .iter()
            .filter(|r| predicate.matches(r))
            .count();
        self.write(
            scope,
            WriteOp::Delete {
                table: table.to_string(),
                predicate,
            },
        )?;
        Ok(matched)
    }

    fn reader(&self, scope: Scope, table: &str) -> XaResult<RowReader> {
        self.visible_rows(scope, table).map(RowReader::new)
    }
}

impl ResourceManager for MemoryStorage {
    fn open(&self) -> XaResult<()> {
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> XaResult<()> {
        self.open.store(false, Ordering::SeqCst);
        let mut branches = self.branches.lock();
        if !branches.is_empty() {
            tracing::warn!(
                target: "xa::storage",
                discarded = branches.len(),
                "resource manager closed with active branches; rolling them back"
            );
            branches.clear();
        }
        Ok(())
    }

    fn start(&self, xid: Xid) -> XaResult<BranchId> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(XaError::storage("resource manager is not open"));
        }
        let branch = BranchId::new(self.next_branch.fetch_add(1, Ordering::SeqCst));
        self.branches.lock().insert(branch, BranchWriteSet::new(xid));
        tracing::debug!(target: "xa::storage", %xid, %branch, "started branch");
        Ok(branch)
    }

    fn commit(&self, branch: BranchId) -> XaResult<()> {
        let set = self
            .branches
            .lock()
            .remove(&branch)
            .ok_or_else(|| unknown_branch(branch))?;

        let mut tables = self.tables.write();

        // Stage against copies so a failure leaves committed rows untouched
        let mut staged: FxHashMap<String, Vec<Record>> = FxHashMap::default();
        for op in set.ops() {
            if !staged.contains_key(op.table()) {
                let rows = lookup(&tables, op.table())?.rows.clone();
                staged.insert(op.table().to_string(), rows);
            }
            if let Some(rows) = staged.get_mut(op.table()) {
                op.apply(rows);
            }
        }

        let applied = set.len();
        for (name, rows) in staged {
            if let Some(table) = tables.get_mut(&name) {
                table.rows = rows;
            }
        }
        tracing::debug!(
            target: "xa::storage",
            xid = %set.xid(),
            %branch,
            applied,
            "committed branch"
        );
        Ok(())
    }

    fn rollback(&self, branch: BranchId) -> XaResult<()> {
        let set = self
            .branches
            .lock()
            .remove(&branch)
            .ok_or_else(|| unknown_branch(branch))?;
        tracing::debug!(
            target: "xa::storage",
            xid = %set.xid(),
            %branch,
            discarded = set.len(),
            "rolled back branch"
        );
        Ok(())
    }
}
