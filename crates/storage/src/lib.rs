//! Storage layer for the XA harness
//!
//! This crate implements the in-memory storage backend with:
//! - MemoryStorage: table store implementing `StorageEngine`
//! - Branch write sets buffered until commit (`ResourceManager`)
//! - Single-predicate update/delete and forward-only readers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod branch;
pub mod memory;

pub use branch::{BranchWriteSet, WriteOp};
pub use memory::MemoryStorage;
