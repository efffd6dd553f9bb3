//! Test scenarios as data
//!
//! A scenario names one mutation, the request it sends, whether the
//! transaction is committed or aborted afterwards, and the payload the test
//! record must hold once the transaction is resolved.

use serde::Serialize;
use std::fmt;

use xa_core::{RequestMessage, ServiceName, RECORD_ID};

/// Kind of operation a scenario performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Insert a row
    Insert,
    /// Update the row's payload
    Update,
    /// Delete the row
    Delete,
    /// Only verify, no transaction
    Check,
}

impl Operation {
    /// Service that implements the operation
    pub fn service(&self) -> ServiceName {
        match self {
            Operation::Insert => ServiceName::InsertData,
            Operation::Update => ServiceName::UpdateData,
            Operation::Delete => ServiceName::DeleteData,
            Operation::Check => ServiceName::CheckData,
        }
    }
}

/// How the scenario's transaction ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Commit if the operation succeeded
    Commit,
    /// Always roll back
    Abort,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Commit => f.write_str("commit"),
            Resolution::Abort => f.write_str("abort"),
        }
    }
}

/// One test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Human-readable name, used in logs and reports
    pub name: String,
    /// What the scenario does
    pub operation: Operation,
    /// Request sent to the operation's service
    pub request: RequestMessage,
    /// `None` for a bare check outside any transaction
    pub resolution: Option<Resolution>,
    /// Payload expected afterwards; empty means no row
    pub expected: String,
}

impl Scenario {
    /// A transactional mutation
    pub fn mutation(
        operation: Operation,
        request: RequestMessage,
        resolution: Resolution,
        expected: impl Into<String>,
    ) -> Self {
        let verb = match operation {
            Operation::Insert => "insertion",
            Operation::Update => "update",
            Operation::Delete => "deletion",
            Operation::Check => "query",
        };
        Self {
            name: format!("data {} with {}", verb, resolution),
            operation,
            request,
            resolution: Some(resolution),
            expected: expected.into(),
        }
    }

    /// A bare check that the record holds `expected`
    pub fn check(expected: impl Into<String>) -> Self {
        let expected = expected.into();
        Self {
            name: if expected.is_empty() {
                "data query on empty table".to_string()
            } else {
                format!("data query expecting {}", expected)
            },
            operation: Operation::Check,
            request: RequestMessage::new(0, expected.clone()),
            resolution: None,
            expected,
        }
    }

    /// Verification request: `0:<expected>`
    pub fn check_request(&self) -> RequestMessage {
        RequestMessage::new(0, self.expected.clone())
    }

    /// The fixed seven-step suite
    ///
    /// Each step starts from the state the previous one left behind.
    pub fn standard_suite() -> Vec<Scenario> {
        use Operation::*;
        use Resolution::*;

        vec![
            Scenario::check(""),
            Scenario::mutation(Insert, RequestMessage::new(RECORD_ID, "AAAA"), Commit, "AAAA"),
            Scenario::mutation(Insert, RequestMessage::new(2000, "BBBB"), Abort, "AAAA"),
            Scenario::mutation(Update, RequestMessage::new(RECORD_ID, "ABCD"), Commit, "ABCD"),
            Scenario::mutation(Update, RequestMessage::new(RECORD_ID, "EFGH"), Abort, "ABCD"),
            Scenario::mutation(Delete, RequestMessage::new(RECORD_ID, ""), Abort, "ABCD"),
            Scenario::mutation(Delete, RequestMessage::new(RECORD_ID, ""), Commit, ""),
        ]
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_suite_order() {
        let suite = Scenario::standard_suite();
        let requests: Vec<String> = suite.iter().map(|s| s.request.encode()).collect();
        assert_eq!(
            requests,
            vec!["0:", "1000:AAAA", "2000:BBBB", "1000:ABCD", "1000:EFGH", "1000:", "1000:"]
        );
        let expected: Vec<&str> = suite.iter().map(|s| s.expected.as_str()).collect();
        assert_eq!(expected, vec!["", "AAAA", "AAAA", "ABCD", "ABCD", "ABCD", ""]);
        let resolutions: Vec<_> = suite.iter().map(|s| s.resolution).collect();
        assert_eq!(
            resolutions,
            vec![
                None,
                Some(Resolution::Commit),
                Some(Resolution::Abort),
                Some(Resolution::Commit),
                Some(Resolution::Abort),
                Some(Resolution::Abort),
                Some(Resolution::Commit),
            ]
        );
    }

    #[test]
    fn test_names() {
        let suite = Scenario::standard_suite();
        assert_eq!(suite[0].name, "data query on empty table");
        assert_eq!(suite[1].name, "data insertion with commit");
        assert_eq!(suite[5].name, "data deletion with abort");
    }

    #[test]
    fn test_check_request() {
        let s = Scenario::standard_suite().remove(3);
        assert_eq!(s.check_request().encode(), "0:ABCD");
        assert_eq!(s.operation.service(), ServiceName::UpdateData);
    }
}
