//! Named service entry points
//!
//! Each advertised name maps to a [`DataService`] that decodes the request
//! buffer, runs one operation in the caller's branch and replies success or
//! failure. A malformed request is a failure reply.

use std::sync::Arc;

use xa_concurrency::ServiceRegistry;
use xa_core::{ServiceHandler, ServiceName, ServiceReply, ServiceRequest};

use crate::operations::OperationService;

/// Handler for one of the four services
#[derive(Debug, Clone)]
pub struct DataService {
    name: ServiceName,
    ops: Arc<OperationService>,
}

impl DataService {
    /// Handler for `name` backed by `ops`
    pub fn new(name: ServiceName, ops: Arc<OperationService>) -> Self {
        Self { name, ops }
    }

    /// Service this handler implements
    pub fn name(&self) -> ServiceName {
        self.name
    }
}

impl ServiceHandler for DataService {
    fn invoke(&self, request: &ServiceRequest<'_>) -> ServiceReply {
        let message = match self.ops.decode(request.data) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(target: "xa::service", service = %self.name, error = %e, "rejected request");
                return ServiceReply::fail();
            }
        };
        let scope = request.scope();

        let ok = match self.name {
            ServiceName::InsertData => self.ops.insert(scope, message.key, &message.payload).is_ok(),
            ServiceName::UpdateData => self
                .ops
                .update(scope, message.key, &message.payload)
                .is_ok(),
            ServiceName::DeleteData => self.ops.delete(scope, message.key).is_ok(),
            ServiceName::CheckData => self.ops.check(scope, &message.payload),
        };

        tracing::debug!(
            target: "xa::service",
            service = %self.name,
            xid = ?request.xid,
            ok,
            "service returned"
        );
        ServiceReply::from_flag(ok)
    }
}

/// Advertise all four services on `registry`
pub fn register_services(registry: &ServiceRegistry, ops: Arc<OperationService>) {
    for name in ServiceName::ALL {
        registry.advertise(name.as_str(), Arc::new(DataService::new(name, ops.clone())));
    }
}
