//! Execution summary (the results JSON file) and its aggregation

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use super::duration::format_hms;
use super::record::TestRecord;
use super::status::TestStatus;

/// Aggregated outcome of one execution run.
///
/// Built once per run and not modified afterwards. `total` always equals the
/// sum of the four status counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    /// When the summary was produced. Offset-less timestamps are read as UTC;
    /// a missing value defaults to the load time.
    #[serde(default = "Utc::now", deserialize_with = "execution_date")]
    pub execution_date: DateTime<Utc>,

    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub passed: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub skipped: usize,
    #[serde(default)]
    pub blocked: usize,

    /// Percentage of passed tests, rounded to 2 decimals
    #[serde(default, rename = "passRate")]
    pub pass_rate: f64,

    /// Sum of document-level durations as `H:MM:SS`
    #[serde(default = "zero_duration")]
    pub duration: String,

    /// Environment label carried through to publishers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default)]
    pub test_results: Vec<TestRecord>,
}

fn zero_duration() -> String {
    format_hms(0)
}

fn execution_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(Utc::now());
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.and_utc())
        .map_err(|e| de::Error::custom(format!("invalid execution_date '{}': {}", raw, e)))
}

/// `passed / total * 100` rounded to 2 decimals; `0.0` for an empty run
pub fn pass_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = passed as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

impl ExecutionSummary {
    /// Fold records into counters.
    ///
    /// `total_duration_seconds` is the accumulated document-level duration and
    /// is independent of the per-record execution times.
    pub fn from_records(records: Vec<TestRecord>, total_duration_seconds: u64) -> Self {
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;
        let mut blocked = 0;

        for record in &records {
            match record.status {
                TestStatus::Passed => passed += 1,
                TestStatus::Failed => failed += 1,
                TestStatus::Skipped => skipped += 1,
                TestStatus::Blocked => blocked += 1,
            }
        }

        let total = passed + failed + skipped + blocked;

        Self {
            execution_date: Utc::now(),
            total,
            passed,
            failed,
            skipped,
            blocked,
            pass_rate: pass_rate(passed, total),
            duration: format_hms(total_duration_seconds),
            environment: None,
            test_results: records,
        }
    }

    /// Summary of a run with no results
    pub fn empty() -> Self {
        Self::from_records(Vec::new(), 0)
    }

    /// Attach an environment label
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Records with the given status, in original order
    pub fn records_with_status(&self, status: TestStatus) -> impl Iterator<Item = &TestRecord> {
        self.test_results.iter().filter(move |r| r.status == status)
    }

    /// Console block printed after parsing
    pub fn to_human(&self) -> String {
        let rule = "=".repeat(60);
        format!(
            "{rule}\n  TOSCA EXECUTION SUMMARY\n{rule}\n\
             Total Tests:   {}\n\
             Passed:        {} ({}%)\n\
             Failed:        {}\n\
             Skipped:       {}\n\
             Blocked:       {}\n\
             Duration:      {}\n\
             {rule}",
            self.total,
            self.passed,
            self.pass_rate,
            self.failed,
            self.skipped,
            self.blocked,
            self.duration,
        )
    }

    /// Serialize to JSON (2-space indentation)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write to file, creating parent directories as needed
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e))
        })?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, json)
    }

    /// Load from file
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e)))
    }
}
