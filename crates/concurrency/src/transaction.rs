//! Global transaction state
//!
//! A `GlobalTransaction` ties an Xid to the single branch it owns on the
//! resource manager and tracks where it is in its lifecycle.

use std::time::{Duration, Instant};

use xa_core::{BranchId, TmError, TmErrorCode, Xid};

/// Status of a global transaction
///
/// State transitions:
/// - `Active` → `RollbackOnly` (service failure or timeout)
/// - `Active` → `Committed` (commit)
/// - `Active` → `Aborted` (explicit abort)
/// - `RollbackOnly` → `Aborted` (commit or abort)
///
/// Terminal states (no transitions allowed):
/// - `Committed`
/// - `Aborted`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Transaction is open, services may run in it
    Active,
    /// Transaction can only be rolled back
    RollbackOnly {
        /// Why the transaction was marked
        reason: String,
    },
    /// Transaction committed
    Committed,
    /// Transaction rolled back
    Aborted {
        /// Why the transaction was rolled back
        reason: String,
    },
}

impl TransactionStatus {
    /// True for `Committed` and `Aborted`
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Committed | TransactionStatus::Aborted { .. }
        )
    }
}

/// A global transaction and its branch
#[derive(Debug, Clone)]
pub struct GlobalTransaction {
    /// Global identifier
    pub xid: Xid,
    /// Branch on the resource manager
    pub branch: BranchId,
    status: TransactionStatus,
    started: Instant,
    deadline: Option<Instant>,
}

impl GlobalTransaction {
    /// New active transaction; a zero `timeout` never expires
    pub fn new(xid: Xid, branch: BranchId, timeout: Duration) -> Self {
        let started = Instant::now();
        let deadline = if timeout.is_zero() {
            None
        } else {
            started.checked_add(timeout)
        };
        Self {
            xid,
            branch,
            status: TransactionStatus::Active,
            started,
            deadline,
        }
    }

    /// Current status
    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    /// Time since `begin`
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Has the timeout passed at `now`
    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.map_or(false, |d| now >= d)
    }

    /// True while the transaction may still commit
    pub fn can_commit(&self) -> bool {
        self.status == TransactionStatus::Active && !self.is_expired(Instant::now())
    }

    /// Mark the transaction rollback-only
    ///
    /// The first reason wins; marking twice is not an error.
    pub fn mark_rollback_only(&mut self, reason: impl Into<String>) -> Result<(), TmError> {
        match self.status {
            TransactionStatus::Active => {
                self.status = TransactionStatus::RollbackOnly {
                    reason: reason.into(),
                };
                Ok(())
            }
            TransactionStatus::RollbackOnly { .. } => Ok(()),
            _ => Err(self.improper("mark_rollback_only")),
        }
    }

    /// Transition to `Committed`
    pub fn mark_committed(&mut self) -> Result<(), TmError> {
        if self.status != TransactionStatus::Active {
            return Err(self.improper("tpcommit"));
        }
        self.status = TransactionStatus::Committed;
        Ok(())
    }

    /// Transition to `Aborted`
    pub fn mark_aborted(&mut self, reason: impl Into<String>) -> Result<(), TmError> {
        if self.status.is_terminal() {
            return Err(self.improper("tpabort"));
        }
        self.status = TransactionStatus::Aborted {
            reason: reason.into(),
        };
        Ok(())
    }

    /// Reason the transaction must roll back, if any
    pub fn rollback_reason(&self) -> Option<String> {
        match &self.status {
            TransactionStatus::RollbackOnly { reason } => Some(reason.clone()),
            TransactionStatus::Active if self.is_expired(Instant::now()) => {
                Some("transaction timed out".to_string())
            }
            _ => None,
        }
    }

    fn improper(&self, method: &str) -> TmError {
        TmError::new(TmErrorCode::Proto, method)
    }
}
