//! Harness Comprehensive Test Suite
//!
//! Exercises the whole in-process stack through the `xaharness` facade:
//! the operation server, the local transaction manager, the memory
//! resource manager and the scenario driver.
//!
//! - `wire_protocol` - raw request buffers through `TransactionManager::call`
//! - `transaction_semantics` - branch isolation and rollback-only handling
//! - `tm_error_codes` - failure paths surface the documented `TPE*` codes
//! - `suite_model` - random scenario sequences checked against a model

mod common;

mod suite_model;
mod tm_error_codes;
mod transaction_semantics;
mod wire_protocol;
