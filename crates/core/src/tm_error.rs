//! Transaction-manager error codes
//!
//! The transaction manager reports failures as a numeric code. The code to
//! name/description mapping is pure data and lives in [`TM_ERROR_TABLE`];
//! nothing else in the workspace matches on raw numbers.

use std::fmt;
use thiserror::Error;

/// Error codes reported by the transaction manager
///
/// Discriminants are the ATMI `tperrno` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TmErrorCode {
    /// Service returned failure inside a transaction, transaction rolled back
    Abort = 1,
    /// Invalid call descriptor
    BadDesc = 2,
    /// Blocking condition found
    Block = 3,
    /// Invalid argument
    Inval = 4,
    /// Resource limit reached
    Limit = 5,
    /// No such service
    NoEnt = 6,
    /// Operating system error
    Os = 7,
    /// Authentication failure
    Perm = 8,
    /// Called in improper context
    Proto = 9,
    /// Service routine error
    SvcErr = 10,
    /// Service returned failure
    SvcFail = 11,
    /// Transaction manager internal error
    System = 12,
    /// Timeout
    Time = 13,
    /// Transaction could not be started or is unsupported
    Tran = 14,
    /// Signal received
    GotSig = 15,
    /// Resource manager error
    RmErr = 16,
    /// Invalid send buffer type
    IType = 17,
    /// Invalid receive buffer type
    OType = 18,
    /// Hazard: outcome of the transaction is unknown
    Hazard = 20,
    /// Heuristic decision: transaction partially committed
    Heuristic = 21,
}

/// One row of the static error table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TmErrorInfo {
    /// Error code
    pub code: TmErrorCode,
    /// Symbolic name, e.g. `TPEABORT`
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

/// Code → name/description table
///
/// `TPEBADDESC`, `TPELIMIT` and `TPERMERR` carry no description; messages
/// for them render as undocumented.
pub static TM_ERROR_TABLE: &[TmErrorInfo] = &[
    TmErrorInfo {
        code: TmErrorCode::Inval,
        name: "TPEINVAL",
        description: "invalid arguement(s) passed",
    },
    TmErrorInfo {
        code: TmErrorCode::Abort,
        name: "TPEABORT",
        description: "service returned failure",
    },
    TmErrorInfo {
        code: TmErrorCode::Block,
        name: "TPEBLOCK",
        description: "blocking condition found",
    },
    TmErrorInfo {
        code: TmErrorCode::NoEnt,
        name: "TPENOENT",
        description: "call failed due to space limitations or service name not found",
    },
    TmErrorInfo {
        code: TmErrorCode::Os,
        name: "TPEOS",
        description: "operating System error",
    },
    TmErrorInfo {
        code: TmErrorCode::Perm,
        name: "TPEPERM",
        description: "authentication failure",
    },
    TmErrorInfo {
        code: TmErrorCode::Proto,
        name: "TPEPROTO",
        description: "called in improper context",
    },
    TmErrorInfo {
        code: TmErrorCode::SvcErr,
        name: "TPESVCERR",
        description: "service routine encountered an error",
    },
    TmErrorInfo {
        code: TmErrorCode::SvcFail,
        name: "TPESVCFAIL",
        description: "service returned \"FAILED\"",
    },
    TmErrorInfo {
        code: TmErrorCode::System,
        name: "TPESYSTEM",
        description: "tuxedo System error",
    },
    TmErrorInfo {
        code: TmErrorCode::Time,
        name: "TPETIME",
        description: "timeout occurred",
    },
    TmErrorInfo {
        code: TmErrorCode::Tran,
        name: "TPETRAN",
        description: "service does not support transaction or error starting transaction",
    },
    TmErrorInfo {
        code: TmErrorCode::GotSig,
        name: "TPGOTSIG",
        description: "received signal",
    },
    TmErrorInfo {
        code: TmErrorCode::IType,
        name: "TPEITYPE",
        description: "send buffer of invalid type",
    },
    TmErrorInfo {
        code: TmErrorCode::OType,
        name: "TPEOTYPE",
        description: "receive buffer of invalid type",
    },
    TmErrorInfo {
        code: TmErrorCode::Hazard,
        name: "TPEHAZARD",
        description: "transaction failure",
    },
    TmErrorInfo {
        code: TmErrorCode::Heuristic,
        name: "TPEHEURISTIC",
        description: "transaction partially committed",
    },
];

impl TmErrorCode {
    /// Raw `tperrno` value
    pub fn raw(self) -> i32 {
        self as i32
    }

    /// Look up a code's table entry by raw value
    pub fn lookup(raw: i32) -> Option<&'static TmErrorInfo> {
        TM_ERROR_TABLE.iter().find(|info| info.code.raw() == raw)
    }

    /// Table entry for this code, if documented
    pub fn info(self) -> Option<&'static TmErrorInfo> {
        Self::lookup(self.raw())
    }
}

/// A failed transaction-manager primitive
///
/// `method` names the primitive or service that failed (`tpbegin`,
/// `tpcommit`, `SERV_INS_DATA`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct TmError {
    /// Error code
    pub code: TmErrorCode,
    /// Failing primitive or service name
    pub method: String,
}

impl TmError {
    /// Create a new error for `method`
    pub fn new(code: TmErrorCode, method: impl Into<String>) -> Self {
        Self {
            code,
            method: method.into(),
        }
    }

    /// Symbolic name, if the code is in the table
    pub fn name(&self) -> Option<&'static str> {
        self.code.info().map(|info| info.name)
    }
}

impl fmt::Display for TmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code.info() {
            Some(info) => write!(f, "{}: {} - {}", self.method, info.name, info.description),
            None => write!(
                f,
                "UNDOCUMENTED ERROR: {} returned {}",
                self.method,
                self.code.raw()
            ),
        }
    }
}
