//! Assertion counting and diagnostic reporting
//!
//! Components receive an [`ErrorReporter`] at construction instead of
//! registering a process-wide error callback. An [`AssertionLedger`] wraps a
//! reporter and keeps the run-level counts: every check is one assertion,
//! every failed check is one failure plus one diagnostic carrying the
//! caller's file and line.

use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::XaResult;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Counted as a failed assertion
    Failure,
    /// Reported but not counted as a failure
    Warning,
}

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Failure or warning
    pub severity: Severity,
    /// Assertion tag naming the check
    pub tag: String,
    /// Source file of the check
    pub file: &'static str,
    /// Source line of the check
    pub line: u32,
    /// Decoded error, if the check wrapped one
    pub detail: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.tag, self.file, self.line)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

/// Sink for diagnostics
pub trait ErrorReporter: Send + Sync {
    /// Report one failed check
    fn report(&self, diagnostic: &Diagnostic);
}

/// Reporter that emits `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, d: &Diagnostic) {
        match d.severity {
            Severity::Failure => tracing::error!(
                target: "xa::assert",
                file = d.file,
                line = d.line,
                detail = d.detail.as_deref().unwrap_or(""),
                "{}",
                d.tag
            ),
            Severity::Warning => tracing::warn!(
                target: "xa::assert",
                file = d.file,
                line = d.line,
                detail = d.detail.as_deref().unwrap_or(""),
                "{}",
                d.tag
            ),
        }
    }
}

/// Reporter that keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl RecordingReporter {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the diagnostics reported so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Tags of the failure diagnostics, in report order
    pub fn failure_tags(&self) -> Vec<String> {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.severity == Severity::Failure)
            .map(|d| d.tag.clone())
            .collect()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        self.diagnostics.lock().push(diagnostic.clone());
    }
}

/// Run-level counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Assertions checked
    pub assertions: u64,
    /// Assertions that failed
    pub failures: u64,
    /// Warnings raised
    pub warnings: u64,
}

impl RunSummary {
    /// True when no assertion failed
    pub fn passed(&self) -> bool {
        self.failures == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "assertions = {}, failures = {}, warnings = {}",
            self.assertions, self.failures, self.warnings
        )
    }
}

/// Assertion counter bound to a reporter
pub struct AssertionLedger {
    assertions: AtomicU64,
    failures: AtomicU64,
    warnings: AtomicU64,
    reporter: Arc<dyn ErrorReporter>,
}

impl AssertionLedger {
    /// Create a ledger reporting to `reporter`
    pub fn new(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            assertions: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            warnings: AtomicU64::new(0),
            reporter,
        }
    }

    /// The reporter diagnostics go to
    pub fn reporter(&self) -> &Arc<dyn ErrorReporter> {
        &self.reporter
    }

    /// Count one assertion; report a failure if `condition` is false
    #[track_caller]
    pub fn assert_true(&self, tag: &str, condition: bool) -> bool {
        self.assertions.fetch_add(1, Ordering::Relaxed);
        if !condition {
            self.fail(tag, None);
        }
        condition
    }

    /// Count one assertion over a result; report the error if it is `Err`
    ///
    /// The result is passed through unchanged.
    #[track_caller]
    pub fn assert_ok<T>(&self, tag: &str, result: XaResult<T>) -> XaResult<T> {
        self.assertions.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = &result {
            self.fail(tag, Some(e.to_string()));
        }
        result
    }

    /// Report a warning if `condition` is false
    #[track_caller]
    pub fn warn_true(&self, tag: &str, condition: bool) -> bool {
        if !condition {
            self.warn(tag, None);
        }
        condition
    }

    /// Report a warning if `result` is `Err`
    #[track_caller]
    pub fn warn_ok<T>(&self, tag: &str, result: XaResult<T>) -> XaResult<T> {
        if let Err(e) = &result {
            self.warn(tag, Some(e.to_string()));
        }
        result
    }

    /// Current counts
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            assertions: self.assertions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
        }
    }

    #[track_caller]
    fn fail(&self, tag: &str, detail: Option<String>) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.emit(Severity::Failure, tag, detail, Location::caller());
    }

    #[track_caller]
    fn warn(&self, tag: &str, detail: Option<String>) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        self.emit(Severity::Warning, tag, detail, Location::caller());
    }

    fn emit(
        &self,
        severity: Severity,
        tag: &str,
        detail: Option<String>,
        location: &'static Location<'static>,
    ) {
        self.reporter.report(&Diagnostic {
            severity,
            tag: tag.to_string(),
            file: location.file(),
            line: location.line(),
            detail,
        });
    }
}

impl fmt::Debug for AssertionLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionLedger")
            .field("summary", &self.summary())
            .finish()
    }
}
