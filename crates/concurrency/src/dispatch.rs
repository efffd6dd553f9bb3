//! Service registry
//!
//! Maps advertised service names to handlers. The transaction manager looks
//! handlers up here when routing a call.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use xa_core::ServiceHandler;

/// Name → handler table
#[derive(Default)]
pub struct ServiceRegistry {
    handlers: RwLock<FxHashMap<String, Arc<dyn ServiceHandler>>>,
}

impl ServiceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise `handler` under `name`
    ///
    /// Returns true if an earlier handler for `name` was replaced.
    pub fn advertise(&self, name: impl Into<String>, handler: Arc<dyn ServiceHandler>) -> bool {
        let name = name.into();
        tracing::debug!(target: "xa::tm", service = %name, "advertised service");
        self.handlers.write().insert(name, handler).is_some()
    }

    /// Withdraw `name`; returns true if it was advertised
    pub fn unadvertise(&self, name: &str) -> bool {
        self.handlers.write().remove(name).is_some()
    }

    /// Handler for `name`
    pub fn get(&self, name: &str) -> Option<Arc<dyn ServiceHandler>> {
        self.handlers.read().get(name).cloned()
    }

    /// Advertised names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.names())
            .finish()
    }
}
