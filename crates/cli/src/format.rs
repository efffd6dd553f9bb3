//! Outcome → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): one line per scenario plus the assertion counts
//! - **JSON** (`--json`): `serde_json::to_string_pretty`

use xa_driver::ScenarioOutcome;

use crate::harness::HarnessOutcome;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format a finished run.
pub fn format_outcome(outcome: &HarnessOutcome, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(outcome)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e)),
        OutputMode::Human => format_human(outcome),
    }
}

/// Format an error.
pub fn format_error(err: &anyhow::Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "error": format!("{:#}", err)
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Human => format!("(error) {:#}", err),
    }
}

fn format_scenario(s: &ScenarioOutcome) -> String {
    let status = match (s.attempted, s.passed) {
        (false, _) => "SKIP",
        (true, true) => "PASS",
        (true, false) => "FAIL",
    };
    match &s.error {
        Some(e) => format!("[{}] {}: {}", status, s.name, e),
        None => format!("[{}] {}", status, s.name),
    }
}

fn format_human(outcome: &HarnessOutcome) -> String {
    let mut lines: Vec<String> = outcome.client.scenarios.iter().map(format_scenario).collect();
    lines.push(String::new());
    lines.push(format!("mode   : {}", outcome.client.mode));
    lines.push(format!("client : {}", outcome.client.summary));
    lines.push(format!("server : {}", outcome.server));
    lines.push(if outcome.passed() { "PASSED" } else { "FAILED" }.to_string());
    lines.join("\n")
}
