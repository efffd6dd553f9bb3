//! Random scenario sequences against a model of the test record
//!
//! The model tracks the committed payload of `RECORD_ID`. Each generated
//! step expects whatever the model holds after the step's resolution, so
//! every run must pass.

use proptest::prelude::*;

use crate::common::*;
use xaharness::{Operation, Resolution};

#[derive(Debug, Clone)]
struct Step {
    operation: Operation,
    payload: String,
    resolution: Resolution,
}

fn step() -> impl Strategy<Value = Step> {
    (
        prop_oneof![
            Just(Operation::Insert),
            Just(Operation::Update),
            Just(Operation::Delete),
        ],
        "[A-Z]{1,10}",
        prop_oneof![Just(Resolution::Commit), Just(Resolution::Abort)],
    )
        .prop_map(|(operation, payload, resolution)| Step {
            operation,
            payload,
            resolution,
        })
}

/// Scenarios for `steps`, plus the final expected payload
fn scenarios(steps: &[Step]) -> (Vec<Scenario>, Option<String>) {
    let mut committed: Option<String> = None;
    let mut out = vec![Scenario::check("")];

    for step in steps {
        // the table has no unique key, so a second insert becomes an update
        let operation = match (step.operation, &committed) {
            (Operation::Insert, Some(_)) => Operation::Update,
            (op, _) => op,
        };
        let after = match operation {
            Operation::Insert => Some(step.payload.clone()),
            Operation::Update => committed.as_ref().map(|_| step.payload.clone()),
            _ => None,
        };
        if step.resolution == Resolution::Commit {
            committed = after;
        }
        let payload = if operation == Operation::Delete {
            String::new()
        } else {
            step.payload.clone()
        };
        out.push(Scenario::mutation(
            operation,
            RequestMessage::new(RECORD_ID, payload),
            step.resolution,
            committed.clone().unwrap_or_default(),
        ));
    }
    (out, committed)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_suites_pass(steps in prop::collection::vec(step(), 1..12)) {
        let h = Harness::start();
        let (suite, _) = scenarios(&steps);
        let count = suite.len();

        let report = h.driver(RunMode::FailFast, suite).run().unwrap();

        prop_assert!(report.passed(), "{:?}", h.client_log.diagnostics());
        prop_assert_eq!(report.scenarios.len(), count);
        prop_assert!(h.server.summary().passed());
        prop_assert!(!h.store.table_exists(TABLE_NAME).unwrap());
        prop_assert_eq!(h.tm.stats().begun, steps.len() as u64);
    }

    #[test]
    fn wrong_final_expectation_fails(steps in prop::collection::vec(step(), 1..8)) {
        let h = Harness::start();
        let (mut suite, committed) = scenarios(&steps);
        suite.push(Scenario::check(match committed {
            Some(_) => "",
            None => "MISSING",
        }));

        let report = h.driver(RunMode::BestEffort, suite).run().unwrap();

        prop_assert!(!report.passed());
        let last = report.scenarios.last().unwrap();
        prop_assert!(last.attempted);
        prop_assert!(!last.passed);
    }
}
