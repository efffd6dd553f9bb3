//! In-process transaction manager
//!
//! Demarcates global transactions over a single resource manager and routes
//! named-service calls to the registry, passing the active branch along.
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. take the association (it is released on every exit path)
//! 2. IF rollback-only or timed out: rollback branch, return TPEABORT
//! 3. commit branch on the resource manager
//! 4. IF the resource manager failed: return TPEHAZARD
//! 5. mark committed, return Ok
//! ```
//!
//! There is one participant, so commit is one-phase.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use xa_core::{
    ResourceManager, ServiceRequest, TmError, TmErrorCode, TransactionManager, Xid,
};

use crate::dispatch::ServiceRegistry;
use crate::transaction::GlobalTransaction;

/// Counts of transaction outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    /// Transactions begun
    pub begun: u64,
    /// Transactions committed
    pub committed: u64,
    /// Transactions rolled back, explicitly or by commit
    pub aborted: u64,
}

/// Transaction manager with one client association
pub struct LocalTransactionManager {
    resource: Arc<dyn ResourceManager>,
    services: Arc<ServiceRegistry>,
    current: Mutex<Option<GlobalTransaction>>,
    begun: AtomicU64,
    committed: AtomicU64,
    aborted: AtomicU64,
}

impl LocalTransactionManager {
    /// Manager coordinating `resource` and routing to `services`
    pub fn new(resource: Arc<dyn ResourceManager>, services: Arc<ServiceRegistry>) -> Self {
        Self {
            resource,
            services,
            current: Mutex::new(None),
            begun: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
        }
    }

    /// The registry calls are routed to
    pub fn services(&self) -> &Arc<ServiceRegistry> {
        &self.services
    }

    /// Outcome counters
    pub fn stats(&self) -> TransactionStats {
        TransactionStats {
            begun: self.begun.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
        }
    }

    /// Roll back `txn`'s branch; a failure is `TPEHAZARD` reported by `method`
    fn rollback_branch(
        &self,
        txn: &mut GlobalTransaction,
        reason: &str,
        method: &str,
    ) -> Result<(), TmError> {
        self.aborted.fetch_add(1, Ordering::Relaxed);
        let _ = txn.mark_aborted(reason);
        self.resource.rollback(txn.branch).map_err(|e| {
            tracing::error!(
                target: "xa::tm",
                xid = %txn.xid,
                error = %e,
                "resource manager failed to roll back branch"
            );
            TmError::new(TmErrorCode::Hazard, method)
        })
    }
}

impl TransactionManager for LocalTransactionManager {
    fn begin(&self, timeout: Duration) -> Result<Xid, TmError> {
        let mut current = self.current.lock();
        if current.is_some() {
            return Err(TmError::new(TmErrorCode::Proto, "tpbegin"));
        }

        let xid = Xid::new();
        let branch = self.resource.start(xid).map_err(|e| {
            tracing::warn!(target: "xa::tm", %xid, error = %e, "branch start refused");
            TmError::new(TmErrorCode::Tran, "tpbegin")
        })?;

        *current = Some(GlobalTransaction::new(xid, branch, timeout));
        self.begun.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            target: "xa::tm",
            %xid,
            %branch,
            timeout_secs = timeout.as_secs(),
            "began transaction"
        );
        Ok(xid)
    }

    fn commit(&self) -> Result<(), TmError> {
        let mut txn = self
            .current
            .lock()
            .take()
            .ok_or_else(|| TmError::new(TmErrorCode::Proto, "tpcommit"))?;

        if let Some(reason) = txn.rollback_reason() {
            tracing::info!(target: "xa::tm", xid = %txn.xid, %reason, "commit turned into rollback");
            // The caller asked for a commit, so the rollback outcome is TPEABORT
            // even when the rollback itself went through.
            self.rollback_branch(&mut txn, &reason, "tpcommit")?;
            return Err(TmError::new(TmErrorCode::Abort, "tpcommit"));
        }

        if let Err(e) = self.resource.commit(txn.branch) {
            tracing::error!(
                target: "xa::tm",
                xid = %txn.xid,
                error = %e,
                "resource manager failed to commit branch"
            );
            self.aborted.fetch_add(1, Ordering::Relaxed);
            let _ = txn.mark_aborted(e.to_string());
            return Err(TmError::new(TmErrorCode::Hazard, "tpcommit"));
        }

        txn.mark_committed()?;
        self.committed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            target: "xa::tm",
            xid = %txn.xid,
            elapsed_ms = txn.elapsed().as_millis() as u64,
            "committed transaction"
        );
        Ok(())
    }

    fn abort(&self) -> Result<(), TmError> {
        let mut txn = self
            .current
            .lock()
            .take()
            .ok_or_else(|| TmError::new(TmErrorCode::Proto, "tpabort"))?;
        self.rollback_branch(&mut txn, "aborted by caller", "tpabort")?;
        tracing::debug!(target: "xa::tm", xid = %txn.xid, "aborted transaction");
        Ok(())
    }

    fn call(&self, service: &str, request: &[u8]) -> Result<Vec<u8>, TmError> {
        let handler = self
            .services
            .get(service)
            .ok_or_else(|| TmError::new(TmErrorCode::NoEnt, service))?;

        let (xid, branch) = {
            let mut current = self.current.lock();
            match current.as_mut() {
                Some(txn) => {
                    if txn.is_expired(Instant::now()) {
                        let _ = txn.mark_rollback_only("transaction timed out");
                        return Err(TmError::new(TmErrorCode::Time, service));
                    }
                    (Some(txn.xid), Some(txn.branch))
                }
                None => (None, None),
            }
        };

        let reply = handler.invoke(&ServiceRequest {
            service,
            data: request,
            xid,
            branch,
        });

        if reply.is_success() {
            return Ok(reply.data);
        }

        if let Some(txn) = self.current.lock().as_mut() {
            let _ = txn.mark_rollback_only(format!("{} failed", service));
        }
        Err(TmError::new(TmErrorCode::SvcFail, service))
    }

    fn current(&self) -> Option<Xid> {
        self.current.lock().as_ref().map(|txn| txn.xid)
    }
}

impl std::fmt::Debug for LocalTransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTransactionManager")
            .field("current", &self.current())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xa_core::{Record, ServiceHandler, ServiceReply, StorageEngine, TableSchema, TABLE_NAME};
    use xa_storage::MemoryStorage;

    /// Inserts `1:<request>` into the test table in the caller's scope
    struct Put(Arc<MemoryStorage>);

    impl ServiceHandler for Put {
        fn invoke(&self, request: &ServiceRequest<'_>) -> ServiceReply {
            let payload = String::from_utf8_lossy(request.data).into_owned();
            ServiceReply::from_flag(
                self.0
                    .insert(request.scope(), TABLE_NAME, Record::new(1, payload))
                    .is_ok(),
            )
        }
    }

    struct Refuse;

    impl ServiceHandler for Refuse {
        fn invoke(&self, _request: &ServiceRequest<'_>) -> ServiceReply {
            ServiceReply::fail()
        }
    }

    fn setup() -> (Arc<MemoryStorage>, LocalTransactionManager) {
        let store = Arc::new(MemoryStorage::new());
        store.create_table(&TableSchema::test_table()).unwrap();
        store.open().unwrap();
        let registry = Arc::new(ServiceRegistry::new());
        registry.advertise("PUT", Arc::new(Put(store.clone())));
        registry.advertise("REFUSE", Arc::new(Refuse));
        let tm = LocalTransactionManager::new(store.clone(), registry);
        (store, tm)
    }

    fn committed(store: &MemoryStorage) -> Vec<Record> {
        store.committed_rows(TABLE_NAME).unwrap()
    }

    #[test]
    fn test_commit_makes_branch_writes_durable() {
        let (store, tm) = setup();
        let xid = tm.begin(Duration::from_secs(60)).unwrap();
        assert_eq!(tm.current(), Some(xid));

        tm.call("PUT", b"AAAA").unwrap();
        assert!(committed(&store).is_empty());

        tm.commit().unwrap();
        assert_eq!(committed(&store), vec![Record::new(1, "AAAA")]);
        assert_eq!(tm.current(), None);
        assert_eq!(store.active_branches(), 0);
        assert_eq!(tm.stats().committed, 1);
    }

    #[test]
    fn test_abort_discards_branch_writes() {
        let (store, tm) = setup();
        tm.begin(Duration::from_secs(60)).unwrap();
        tm.call("PUT", b"BBBB").unwrap();
        tm.abort().unwrap();
        assert!(committed(&store).is_empty());
        assert_eq!(tm.stats().aborted, 1);
    }

    #[test]
    fn test_call_outside_transaction_autocommits() {
        let (store, tm) = setup();
        tm.call("PUT", b"CCCC").unwrap();
        assert_eq!(committed(&store).len(), 1);
    }

    #[test]
    fn test_nested_begin_is_protocol_error() {
        let (_store, tm) = setup();
        tm.begin(Duration::ZERO).unwrap();
        let err = tm.begin(Duration::ZERO).unwrap_err();
        assert_eq!(err.code, TmErrorCode::Proto);
        assert_eq!(err.method, "tpbegin");
    }

    #[test]
    fn test_commit_and_abort_without_transaction() {
        let (_store, tm) = setup();
        assert_eq!(tm.commit().unwrap_err().code, TmErrorCode::Proto);
        assert_eq!(tm.abort().unwrap_err().code, TmErrorCode::Proto);
    }

    #[test]
    fn test_unknown_service() {
        let (_store, tm) = setup();
        let err = tm.call("SERV_MISSING", b"").unwrap_err();
        assert_eq!(err.code, TmErrorCode::NoEnt);
        assert_eq!(err.method, "SERV_MISSING");
    }

    #[test]
    fn test_service_failure_forces_rollback() {
        let (store, tm) = setup();
        tm.begin(Duration::ZERO).unwrap();
        tm.call("PUT", b"AAAA").unwrap();
        assert_eq!(
            tm.call("REFUSE", b"").unwrap_err().code,
            TmErrorCode::SvcFail
        );

        let err = tm.commit().unwrap_err();
        assert_eq!(err.code, TmErrorCode::Abort);
        assert!(committed(&store).is_empty());
        assert_eq!(tm.current(), None);
    }

    #[test]
    fn test_timed_out_transaction_cannot_commit() {
        let (store, tm) = setup();
        tm.begin(Duration::from_millis(1)).unwrap();
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(tm.call("PUT", b"late").unwrap_err().code, TmErrorCode::Time);
        assert_eq!(tm.commit().unwrap_err().code, TmErrorCode::Abort);
        assert!(committed(&store).is_empty());
        assert_eq!(store.active_branches(), 0);
    }

    #[test]
    fn test_begin_refused_by_closed_resource_manager() {
        let (store, tm) = setup();
        store.close().unwrap();
        assert_eq!(
            tm.begin(Duration::ZERO).unwrap_err().code,
            TmErrorCode::Tran
        );
        assert_eq!(tm.current(), None);
    }

    #[test]
    fn test_hazard_when_branch_vanishes() {
        let (store, tm) = setup();
        tm.begin(Duration::ZERO).unwrap();
        tm.call("PUT", b"AAAA").unwrap();
        // Closing the resource manager discards the branch under the manager
        store.close().unwrap();
        assert_eq!(tm.commit().unwrap_err().code, TmErrorCode::Hazard);
        assert_eq!(tm.current(), None);
    }

    #[test]
    fn test_failed_rollback_is_hazard_of_the_calling_primitive() {
        let (store, tm) = setup();
        tm.begin(Duration::ZERO).unwrap();
        tm.call("REFUSE", b"").unwrap_err();
        store.close().unwrap();
        let err = tm.commit().unwrap_err();
        assert_eq!(err.code, TmErrorCode::Hazard);
        assert_eq!(err.method, "tpcommit");

        store.open().unwrap();
        tm.begin(Duration::ZERO).unwrap();
        store.close().unwrap();
        let err = tm.abort().unwrap_err();
        assert_eq!(err.code, TmErrorCode::Hazard);
        assert_eq!(err.method, "tpabort");
        assert_eq!(tm.current(), None);
    }
}
