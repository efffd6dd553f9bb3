//! Scenario driver
//!
//! Runs each scenario through the transaction manager and counts every
//! transaction-manager call as an assertion.
//!
//! ## Scenario Sequence
//!
//! ```text
//! 1. begin(timeout)                               Idle → TransactionOpen
//! 2. call the operation's service
//! 3. IF the call succeeded AND commit requested:
//!        commit                                   → Committed
//!    ELSE:
//!        abort                                    → Aborted
//!        IF commit was requested: scenario fails
//! 4. call SERV_CHK_DATA with "0:<expected>"       → Verified
//! ```
//!
//! A bare check scenario skips steps 1-3. In fail-fast mode the first failed
//! scenario stops the run; in best-effort mode every scenario is attempted.

use std::sync::Arc;

use serde::Serialize;

use xa_core::{
    AssertionLedger, RequestMessage, RunSummary, ServiceName, StorageEngine, TmError,
    TmErrorCode, TransactionManager, XaError, XaResult,
};

use crate::config::{HarnessConfig, RunMode};
use crate::environment::TestEnvironment;
use crate::scenario::{Resolution, Scenario};

/// Where a scenario is in its lifecycle
///
/// State transitions:
/// - `Idle` → `TransactionOpen` (begin)
/// - `Idle` → `Verified` (bare check)
/// - `TransactionOpen` → `Committed` (commit)
/// - `TransactionOpen` → `Aborted` (abort)
/// - `Committed` | `Aborted` → `Verified` (check)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPhase {
    /// No transaction yet
    Idle,
    /// A transaction is open; mutations are allowed
    TransactionOpen,
    /// The transaction committed
    Committed,
    /// The transaction rolled back
    Aborted,
    /// The post-state was checked
    Verified,
}

impl ScenarioPhase {
    /// Is `self` → `next` a legal transition
    pub fn can_transition(self, next: ScenarioPhase) -> bool {
        use ScenarioPhase::*;
        matches!(
            (self, next),
            (Idle, TransactionOpen)
                | (Idle, Verified)
                | (TransactionOpen, Committed)
                | (TransactionOpen, Aborted)
                | (Committed, Verified)
                | (Aborted, Verified)
        )
    }
}

/// Phase tracker for one scenario
#[derive(Debug)]
pub struct ScenarioRun {
    phase: ScenarioPhase,
}

impl Default for ScenarioRun {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioRun {
    /// Tracker in `Idle`
    pub fn new() -> Self {
        Self {
            phase: ScenarioPhase::Idle,
        }
    }

    /// Current phase
    pub fn phase(&self) -> ScenarioPhase {
        self.phase
    }

    /// Move to `next`
    ///
    /// # Errors
    ///
    /// `TPEPROTO` attributed to `method` if the transition is illegal.
    pub fn advance(&mut self, next: ScenarioPhase, method: &str) -> Result<(), TmError> {
        self.step(next, method, || Ok(()))
    }

    /// Run `action` and move to `next` if it succeeds
    ///
    /// The transition is checked before `action` runs; a failed action
    /// leaves the phase unchanged.
    pub fn step<T>(
        &mut self,
        next: ScenarioPhase,
        method: &str,
        action: impl FnOnce() -> Result<T, TmError>,
    ) -> Result<T, TmError> {
        if !self.phase.can_transition(next) {
            return Err(TmError::new(TmErrorCode::Proto, method));
        }
        let value = action()?;
        self.phase = next;
        Ok(value)
    }

    /// Require an open transaction before a mutation
    pub fn require_open(&self, method: &str) -> Result<(), TmError> {
        if self.phase == ScenarioPhase::TransactionOpen {
            Ok(())
        } else {
            Err(TmError::new(TmErrorCode::Proto, method))
        }
    }
}

/// How one scenario ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    /// True if every step passed
    pub passed: bool,
    /// False if fail-fast stopped the run before this scenario
    pub attempted: bool,
    /// Phase reached
    pub phase: ScenarioPhase,
    /// First error, decoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a full run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Mode the run used
    pub mode: RunMode,
    /// Assertion counts
    pub summary: RunSummary,
    /// One entry per scenario, in order
    pub scenarios: Vec<ScenarioOutcome>,
}

impl RunReport {
    /// True when no assertion failed
    pub fn passed(&self) -> bool {
        self.summary.passed()
    }
}

/// Drives scenarios through a transaction manager
pub struct ScenarioDriver {
    tm: Arc<dyn TransactionManager>,
    storage: Arc<dyn StorageEngine>,
    ledger: Arc<AssertionLedger>,
    config: HarnessConfig,
    scenarios: Vec<Scenario>,
}

impl ScenarioDriver {
    /// Driver for the standard suite
    ///
    /// `storage` is the plain connection used to create and drop the test
    /// table; scenarios reach the data only through `tm`.
    pub fn new(
        tm: Arc<dyn TransactionManager>,
        storage: Arc<dyn StorageEngine>,
        ledger: Arc<AssertionLedger>,
        config: HarnessConfig,
    ) -> Self {
        Self {
            tm,
            storage,
            ledger,
            config,
            scenarios: Scenario::standard_suite(),
        }
    }

    /// Replace the scenario list
    pub fn with_scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = scenarios;
        self
    }

    /// Scenarios this driver runs
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Ledger the driver counts into
    pub fn ledger(&self) -> &Arc<AssertionLedger> {
        &self.ledger
    }

    /// Set up the table, run every scenario, tear the table down
    ///
    /// # Errors
    ///
    /// `SetupFailed` if the test table cannot be created; no scenario runs.
    pub fn run(&self) -> XaResult<RunReport> {
        tracing::info!(
            target: "xa::driver",
            mode = %self.config.mode,
            "---- Database Parameters for connection ----\n{}",
            self.config.connection
        );

        let env = TestEnvironment::setup(self.storage.clone(), self.ledger.clone())?;

        let mut outcomes = Vec::with_capacity(self.scenarios.len());
        let mut stopped = false;
        for scenario in &self.scenarios {
            if stopped {
                outcomes.push(ScenarioOutcome {
                    name: scenario.name.clone(),
                    passed: false,
                    attempted: false,
                    phase: ScenarioPhase::Idle,
                    error: None,
                });
                continue;
            }

            let mut run = ScenarioRun::new();
            let result = self.run_scenario(scenario, &mut run);
            if let Err(e) = &result {
                tracing::warn!(target: "xa::driver", scenario = %scenario, error = %e, "scenario failed");
                if self.config.mode == RunMode::FailFast {
                    stopped = true;
                }
            }
            outcomes.push(ScenarioOutcome {
                name: scenario.name.clone(),
                passed: result.is_ok(),
                attempted: true,
                phase: run.phase(),
                error: result.err().map(|e| e.to_string()),
            });
        }

        drop(env);

        let summary = self.ledger.summary();
        tracing::info!(target: "xa::driver", %summary, "run finished");
        Ok(RunReport {
            mode: self.config.mode,
            summary,
            scenarios: outcomes,
        })
    }

    /// Run one scenario
    ///
    /// # Errors
    ///
    /// The first failed step, already counted in the ledger.
    pub fn run_scenario(&self, scenario: &Scenario, run: &mut ScenarioRun) -> XaResult<()> {
        tracing::info!(target: "xa::driver", "Testing {}...", scenario);

        let Some(resolution) = scenario.resolution else {
            return self.verify(scenario, run);
        };

        self.begin(run)?;
        let service = scenario.operation.service();
        let operation = self.mutate(run, service, &scenario.request);

        if operation.is_ok() && resolution == Resolution::Commit {
            self.commit(run)?;
        } else {
            self.abort(run)?;
            if resolution == Resolution::Commit {
                return operation;
            }
        }

        self.verify(scenario, run)
    }

    #[track_caller]
    fn assert_tm<T>(&self, tag: &str, result: Result<T, TmError>) -> XaResult<T> {
        self.ledger.assert_ok(tag, result.map_err(XaError::from))
    }

    fn begin(&self, run: &mut ScenarioRun) -> XaResult<()> {
        tracing::debug!(target: "xa::driver", "beginXATransaction");
        let result = run.step(ScenarioPhase::TransactionOpen, "tpbegin", || {
            self.tm.begin(self.config.transaction_timeout())
        });
        let xid = self.assert_tm("Error starting transaction.", result)?;
        tracing::debug!(target: "xa::driver", %xid, "transaction open");
        Ok(())
    }

    fn mutate(
        &self,
        run: &ScenarioRun,
        service: ServiceName,
        request: &RequestMessage,
    ) -> XaResult<()> {
        tracing::debug!(target: "xa::driver", %service, %request, "calling service");
        let result = run
            .require_open(service.as_str())
            .and_then(|_| self.tm.call(service.as_str(), &request.to_bytes()));
        self.assert_tm(&format!("Error calling {} service.", service), result)
            .map(|_| ())
    }

    fn commit(&self, run: &mut ScenarioRun) -> XaResult<()> {
        tracing::debug!(target: "xa::driver", "commitXATransaction");
        let result = run.step(ScenarioPhase::Committed, "tpcommit", || self.tm.commit());
        self.assert_tm("Error committing transaction.", result)
    }

    fn abort(&self, run: &mut ScenarioRun) -> XaResult<()> {
        tracing::debug!(target: "xa::driver", "abortXATransaction");
        let result = run.step(ScenarioPhase::Aborted, "tpabort", || self.tm.abort());
        self.assert_tm("Error aborting transaction.", result)
    }

    fn verify(&self, scenario: &Scenario, run: &mut ScenarioRun) -> XaResult<()> {
        let service = ServiceName::CheckData;
        let request = scenario.check_request();
        tracing::debug!(target: "xa::driver", %request, "checkData");
        let result = run.step(ScenarioPhase::Verified, service.as_str(), || {
            self.tm.call(service.as_str(), &request.to_bytes())
        });
        self.assert_tm(&format!("Error calling {} service.", service), result)
            .map(|_| ())
    }
}

impl std::fmt::Debug for ScenarioDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioDriver")
            .field("mode", &self.config.mode)
            .field("scenarios", &self.scenarios.len())
            .field("ledger", &self.ledger)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        use ScenarioPhase::*;
        assert!(Idle.can_transition(TransactionOpen));
        assert!(Idle.can_transition(Verified));
        assert!(TransactionOpen.can_transition(Committed));
        assert!(Aborted.can_transition(Verified));
        assert!(!Idle.can_transition(Committed));
        assert!(!Verified.can_transition(TransactionOpen));
        assert!(!Committed.can_transition(Aborted));
    }

    #[test]
    fn test_mutation_outside_transaction_is_protocol_error() {
        let run = ScenarioRun::new();
        let err = run.require_open("SERV_INS_DATA").unwrap_err();
        assert_eq!(err.code, TmErrorCode::Proto);
        assert_eq!(err.method, "SERV_INS_DATA");
    }

    #[test]
    fn test_failed_step_keeps_phase() {
        let mut run = ScenarioRun::new();
        let err = run
            .step(ScenarioPhase::TransactionOpen, "tpbegin", || {
                Err::<(), _>(TmError::new(TmErrorCode::Tran, "tpbegin"))
            })
            .unwrap_err();
        assert_eq!(err.code, TmErrorCode::Tran);
        assert_eq!(run.phase(), ScenarioPhase::Idle);
    }

    #[test]
    fn test_illegal_advance_keeps_phase() {
        let mut run = ScenarioRun::new();
        assert!(run.advance(ScenarioPhase::Committed, "tpcommit").is_err());
        assert_eq!(run.phase(), ScenarioPhase::Idle);
        run.advance(ScenarioPhase::TransactionOpen, "tpbegin").unwrap();
        assert!(run.require_open("SERV_UPD_DATA").is_ok());
        run.advance(ScenarioPhase::Aborted, "tpabort").unwrap();
        assert!(run.require_open("SERV_UPD_DATA").is_err());
    }
}
