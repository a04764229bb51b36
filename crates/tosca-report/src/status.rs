//! Canonical test status and the source vocabularies that map onto it

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single test case.
///
/// Every record carries exactly one of these; records whose outcome cannot
/// be determined are classified as `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    Blocked,
}

impl TestStatus {
    /// Map a structured result indicator (e.g. `<Result Status="...">`).
    ///
    /// Case-insensitive. Returns `None` for values outside the known vocabulary.
    pub fn from_result_indicator(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "passed" | "success" => Some(TestStatus::Passed),
            "failed" | "failure" => Some(TestStatus::Failed),
            "skipped" | "notexecuted" => Some(TestStatus::Skipped),
            "blocked" => Some(TestStatus::Blocked),
            _ => None,
        }
    }

    /// Map free-form verification text by substring (`pass` before `fail`).
    pub fn from_verification_text(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        if text.contains("pass") {
            Some(TestStatus::Passed)
        } else if text.contains("fail") {
            Some(TestStatus::Failed)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "Passed",
            TestStatus::Failed => "Failed",
            TestStatus::Skipped => "Skipped",
            TestStatus::Blocked => "Blocked",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_indicator_vocabulary() {
        assert_eq!(TestStatus::from_result_indicator("success"), Some(TestStatus::Passed));
        assert_eq!(TestStatus::from_result_indicator("Passed"), Some(TestStatus::Passed));
        assert_eq!(TestStatus::from_result_indicator("FAILURE"), Some(TestStatus::Failed));
        assert_eq!(TestStatus::from_result_indicator("FaiLeD"), Some(TestStatus::Failed));
        assert_eq!(TestStatus::from_result_indicator("NotExecuted"), Some(TestStatus::Skipped));
        assert_eq!(TestStatus::from_result_indicator("blocked"), Some(TestStatus::Blocked));
    }

    #[test]
    fn test_unknown_indicator_is_unresolved() {
        assert_eq!(TestStatus::from_result_indicator(""), None);
        assert_eq!(TestStatus::from_result_indicator("Error"), None);
        assert_eq!(TestStatus::from_result_indicator("pass"), None);
    }

    #[test]
    fn test_verification_text() {
        assert_eq!(
            TestStatus::from_verification_text("Verification PASSED"),
            Some(TestStatus::Passed)
        );
        assert_eq!(
            TestStatus::from_verification_text("step failed at 3"),
            Some(TestStatus::Failed)
        );
        assert_eq!(TestStatus::from_verification_text("inconclusive"), None);
    }

    #[test]
    fn test_serde_uses_variant_names() {
        let json = serde_json::to_string(&TestStatus::Blocked).unwrap();
        assert_eq!(json, r#""Blocked""#);

        let parsed: TestStatus = serde_json::from_str(r#""Skipped""#).unwrap();
        assert_eq!(parsed, TestStatus::Skipped);
    }
}
