//! Core types for the XA harness
//!
//! This module defines the foundational types:
//! - Xid: Global transaction identifier
//! - BranchId: Handle for one transaction branch on a resource manager
//! - Record / TableSchema: The single test table and its rows
//! - Scope / Predicate: How storage operations are scoped and filtered
//! - ServiceName / ServiceReply: Named services and their status replies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Key of the test record the whole suite operates on
pub const RECORD_ID: i32 = 1000;

/// Name of the test table
pub const TABLE_NAME: &str = "rwdbtuxtesttable";

/// Maximum payload width of the `data` column
pub const PAYLOAD_WIDTH: usize = 10;

/// Global transaction identifier
///
/// An Xid is a wrapper around a UUID v4, allocated by the transaction
/// manager when a transaction begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Xid(Uuid);

impl Xid {
    /// Create a new random Xid using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an Xid from a string representation
    ///
    /// # Errors
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for Xid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle for one branch of a global transaction on a resource manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchId(u64);

impl BranchId {
    /// Wrap a raw branch number
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw branch number
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch-{}", self.0)
    }
}

/// One row of the test table: `value` (int) and `data` (string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Integer key (`value` column)
    pub key: i32,
    /// Short string payload (`data` column)
    pub payload: String,
}

impl Record {
    /// Create a new record
    pub fn new(key: i32, payload: impl Into<String>) -> Self {
        Self {
            key,
            payload: payload.into(),
        }
    }
}

/// Schema of a two-column key/payload table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Name of the integer key column
    pub key_column: String,
    /// Name of the string payload column
    pub payload_column: String,
    /// Maximum payload width in characters
    pub payload_width: usize,
}

impl TableSchema {
    /// Schema of the test table: `value int, data string(10)`
    pub fn test_table() -> Self {
        Self {
            name: TABLE_NAME.to_string(),
            key_column: "value".to_string(),
            payload_column: "data".to_string(),
            payload_width: PAYLOAD_WIDTH,
        }
    }
}

/// Where a storage operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Outside any transaction branch; writes are applied immediately
    Autocommit,
    /// Inside a branch; writes are buffered until the branch commits
    Branch(BranchId),
}

impl From<Option<BranchId>> for Scope {
    fn from(branch: Option<BranchId>) -> Self {
        match branch {
            Some(b) => Scope::Branch(b),
            None => Scope::Autocommit,
        }
    }
}

/// Row filter for update/delete
///
/// The service only ever issues single-column equality predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// `key_column == value`
    KeyEquals(i32),
}

impl Predicate {
    /// Does `record` satisfy the predicate
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::KeyEquals(key) => record.key == *key,
        }
    }
}

/// Services advertised by the operation server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceName {
    /// Insert a key/payload row
    InsertData,
    /// Update the payload of rows matching a key
    UpdateData,
    /// Delete rows matching a key
    DeleteData,
    /// Verify the test record's payload
    CheckData,
}

impl ServiceName {
    /// All services, in advertisement order
    pub const ALL: [ServiceName; 4] = [
        ServiceName::InsertData,
        ServiceName::UpdateData,
        ServiceName::DeleteData,
        ServiceName::CheckData,
    ];

    /// Advertised service name
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::InsertData => "SERV_INS_DATA",
            ServiceName::UpdateData => "SERV_UPD_DATA",
            ServiceName::DeleteData => "SERV_DEL_DATA",
            ServiceName::CheckData => "SERV_CHK_DATA",
        }
    }

    /// True for services that write to the table
    pub fn is_mutation(&self) -> bool {
        !matches!(self, ServiceName::CheckData)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown service '{}'", s))
    }
}

/// Status returned by a service handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    /// The service completed its work
    Success,
    /// The service failed; inside a transaction, the transaction must roll back
    Fail,
}

/// Reply from a service: a status and an optional payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReply {
    /// Status code
    pub status: ServiceStatus,
    /// Reply bytes (empty for every harness service)
    pub data: Vec<u8>,
}

impl ServiceReply {
    /// Successful reply with no payload
    pub fn success() -> Self {
        Self {
            status: ServiceStatus::Success,
            data: Vec::new(),
        }
    }

    /// Failed reply with no payload
    pub fn fail() -> Self {
        Self {
            status: ServiceStatus::Fail,
            data: Vec::new(),
        }
    }

    /// Reply for a success flag
    pub fn from_flag(ok: bool) -> Self {
        if ok {
            Self::success()
        } else {
            Self::fail()
        }
    }

    /// True if the status is `Success`
    pub fn is_success(&self) -> bool {
        self.status == ServiceStatus::Success
    }
}
