//! Downstream publishers
//!
//! Both destinations follow the same shape: map the canonical status onto the
//! destination vocabulary, then issue a sequence of dependent REST calls where
//! each call fails independently and only shows up in the final tally.

pub mod qtest;
pub mod transport;
pub mod xray;

pub use qtest::{QTestPublisher, QTestReport};
pub use transport::{Auth, HttpTransport, MockTransport, RecordedCall, Transport, TransportError};
pub use xray::{DefectPriority, XrayPublisher, XrayReport};

use serde_json::Value;
use std::fmt;
use tosca_report::{ExecutionSummary, TestStatus};

/// Final tally of a publish run
pub trait PublishReport: fmt::Display {
    /// Whether the run counts as successful for the process exit code
    fn is_success(&self) -> bool;
}

/// A destination for an execution summary
pub trait Publisher {
    type Report: PublishReport;

    /// Human-readable destination name
    fn destination(&self) -> &'static str;

    /// Destination vocabulary for a canonical status
    fn map_status(&self, status: TestStatus) -> &'static str;

    /// Push the summary. Never panics on remote failures; they are logged and
    /// reflected in the report.
    fn publish(&self, summary: &ExecutionSummary) -> Self::Report;
}

/// Publish and print the tally to stdout
pub fn run_publisher<P: Publisher>(publisher: &P, summary: &ExecutionSummary) -> P::Report {
    let rule = "=".repeat(60);
    println!("\n{rule}\n  Publishing Results to {}\n{rule}", publisher.destination());

    let report = publisher.publish(summary);

    println!("\n{rule}\n  SUMMARY\n{rule}\n{report}\n{rule}\n");
    report
}

/// Identifier field from a create response; numbers and strings are accepted
pub(crate) fn response_id(response: &Value, field: &str) -> Result<String, TransportError> {
    match response.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(TransportError::MissingField(field.to_string())),
    }
}

/// Identifier as JSON, numeric when it looks numeric
pub(crate) fn json_id(id: &str) -> Value {
    id.trim()
        .parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(id))
}

/// Strip a trailing slash from a base URL
pub(crate) fn base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
