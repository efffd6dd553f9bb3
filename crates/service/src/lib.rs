//! Operation service for the XA harness
//!
//! The server role: four named services that decode a `<key>:<payload>`
//! request and run one data operation against the test table inside the
//! caller's transaction branch.
//!
//! - `operations`: insert / update / delete / check with assertion counting
//! - `handlers`: `SERV_*` entry points and `register_services`
//! - `server`: `--` argument parsing, resource manager open and close

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod handlers;
pub mod operations;
pub mod server;

pub use handlers::{register_services, DataService};
pub use operations::OperationService;
pub use server::{OperationServer, ServerArgs};
