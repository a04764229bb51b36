//! A single executed test case

use serde::{Deserialize, Serialize};

use super::status::TestStatus;

/// Placeholder for absent module/suite/execution-time values
pub const NOT_AVAILABLE: &str = "N/A";

/// Name used when a test case carries no name at all
pub const UNKNOWN_TEST: &str = "Unknown Test";

/// One executed test, normalized from its source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_status")]
    pub status: TestStatus,

    /// Raw execution-time attribute as found in the source
    #[serde(default = "not_available")]
    pub execution_time: String,

    #[serde(default)]
    pub start_time: Option<String>,

    #[serde(default)]
    pub end_time: Option<String>,

    /// Execution time in whole seconds
    #[serde(default, rename = "duration")]
    pub execution_time_seconds: u64,

    #[serde(default)]
    pub error_message: String,

    #[serde(default, rename = "screenshots")]
    pub screenshot_paths: Vec<String>,

    #[serde(default = "not_available")]
    pub module: String,

    #[serde(default = "not_available")]
    pub suite: String,

    /// qTest test case identifier; empty when unmapped
    #[serde(default)]
    pub test_case_id: String,

    /// Xray test issue key; empty when unmapped
    #[serde(default)]
    pub xray_test_key: String,

    #[serde(default)]
    pub critical: bool,
}

fn default_name() -> String {
    UNKNOWN_TEST.to_string()
}

fn default_status() -> TestStatus {
    TestStatus::Failed
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

impl TestRecord {
    /// Create a record with the given name and status and every other field defaulted
    pub fn new(name: impl Into<String>, status: TestStatus) -> Self {
        Self {
            name: name.into(),
            status,
            execution_time: not_available(),
            start_time: None,
            end_time: None,
            execution_time_seconds: 0,
            error_message: String::new(),
            screenshot_paths: Vec::new(),
            module: not_available(),
            suite: not_available(),
            test_case_id: String::new(),
            xray_test_key: String::new(),
            critical: false,
        }
    }

    /// Xray key if this record is mapped to an Xray test
    pub fn xray_key(&self) -> Option<&str> {
        Some(self.xray_test_key.trim()).filter(|k| !k.is_empty())
    }

    /// qTest test case id if this record is mapped to a qTest case
    pub fn qtest_case_id(&self) -> Option<&str> {
        Some(self.test_case_id.trim()).filter(|k| !k.is_empty())
    }
}
