//! Buffered writes of one transaction branch

use xa_core::{Predicate, Record, Xid};

/// One buffered write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Append a row
    Insert {
        /// Target table
        table: String,
        /// Row to append
        record: Record,
    },
    /// Set the payload of matching rows
    Update {
        /// Target table
        table: String,
        /// Row filter
        predicate: Predicate,
        /// New payload
        payload: String,
    },
    /// Remove matching rows
    Delete {
        /// Target table
        table: String,
        /// Row filter
        predicate: Predicate,
    },
}

impl WriteOp {
    /// Table this operation targets
    pub fn table(&self) -> &str {
        match self {
            WriteOp::Insert { table, .. }
            | WriteOp::Update { table, .. }
            | WriteOp::Delete { table, .. } => table,
        }
    }

    /// Apply to a row set in place
    pub fn apply(&self, rows: &mut Vec<Record>) {
        match self {
            WriteOp::Insert { record, .. } => rows.push(record.clone()),
            WriteOp::Update {
                predicate, payload, ..
            } => {
                for row in rows.iter_mut().filter(|r| predicate.matches(r)) {
                    row.payload = payload.clone();
                }
            }
            WriteOp::Delete { predicate, .. } => rows.retain(|r| !predicate.matches(r)),
        }
    }
}

/// Ordered write set of a branch
#[derive(Debug, Clone)]
pub struct BranchWriteSet {
    xid: Xid,
    ops: Vec<WriteOp>,
}

impl BranchWriteSet {
    /// Empty write set for a branch of `xid`
    pub fn new(xid: Xid) -> Self {
        Self {
            xid,
            ops: Vec::new(),
        }
    }

    /// Global transaction this branch belongs to
    pub fn xid(&self) -> Xid {
        self.xid
    }

    /// Buffer one write
    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    /// All writes, in order
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Writes against `table`, in order
    pub fn ops_for<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a WriteOp> + 'a {
        self.ops.iter().filter(move |op| op.table() == table)
    }

    /// Number of buffered writes
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
