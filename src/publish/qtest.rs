//! qTest Manager publisher
//!
//! Creates one test cycle, then a test run plus an automation log per mapped
//! test case. The cycle is a hard dependency: without it nothing else is sent.

use chrono::{Local, Utc};
use serde_json::json;
use std::fmt;
use std::path::Path;
use tosca_report::{ExecutionSummary, TestRecord, TestStatus};

use super::transport::{Transport, TransportError};
use super::{base_url, json_id, response_id, PublishReport, Publisher};

/// Note attached to runs that carry no error message
pub const DEFAULT_SUCCESS_NOTE: &str = "Test executed successfully";

/// Tally of a qTest publish run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QTestReport {
    /// Identifier of the created test cycle; `None` aborts the run
    pub cycle_id: Option<String>,
    /// Records in the summary
    pub total: usize,
    /// Records with a mapped test case that were attempted
    pub processed: usize,
    /// Records without a test case mapping
    pub unmapped: usize,
    /// Records whose status was pushed successfully
    pub updated: usize,
    pub attachments_uploaded: usize,
}

impl QTestReport {
    /// Percentage of attempted records that were updated; `None` when nothing was attempted
    pub fn success_rate(&self) -> Option<f64> {
        if self.processed == 0 {
            return None;
        }
        Some(self.updated as f64 / self.processed as f64 * 100.0)
    }
}

impl PublishReport for QTestReport {
    fn is_success(&self) -> bool {
        self.cycle_id.is_some() && self.updated == self.processed
    }
}

impl fmt::Display for QTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(cycle_id) = &self.cycle_id else {
            return write!(f, "Test Cycle: Not created\nTotal Tests: {}", self.total);
        };
        writeln!(f, "Test Cycle: {}", cycle_id)?;
        writeln!(f, "Total Tests: {}", self.total)?;
        writeln!(f, "Successfully Updated: {}", self.updated)?;
        writeln!(f, "Failed: {}", self.processed - self.updated)?;
        writeln!(f, "Skipped (unmapped): {}", self.unmapped)?;
        match self.success_rate() {
            Some(rate) => write!(f, "Success Rate: {:.1}%", rate),
            None => write!(f, "Success Rate: N/A"),
        }
    }
}

/// Publishes an execution summary to qTest Manager
pub struct QTestPublisher<T: Transport> {
    transport: T,
    api_url: String,
    project_id: String,
    cycle_name: String,
}

impl<T: Transport> QTestPublisher<T> {
    pub fn new(
        transport: T,
        api_url: &str,
        project_id: impl Into<String>,
        cycle_name: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            api_url: base_url(api_url),
            project_id: project_id.into(),
            cycle_name: cycle_name.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn project_url(&self, path: &str) -> String {
        format!("{}/projects/{}/{}", self.api_url, self.project_id, path)
    }

    /// Create the test cycle and return its id
    pub fn create_test_cycle(&self) -> Result<String, TransportError> {
        let now = Utc::now().to_rfc3339();
        let payload = json!({
            "name": self.cycle_name,
            "description": format!(
                "Automated execution via Tosca CI/CD - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
            "start_date": now,
            "end_date": now,
        });

        let response = self
            .transport
            .post_json(&self.project_url("test-cycles"), &payload)?;
        response_id(&response, "id")
    }

    /// Create a run for a test case inside the cycle and return its id
    pub fn create_test_run(
        &self,
        cycle_id: &str,
        test_case_id: &str,
        test_name: &str,
    ) -> Result<String, TransportError> {
        let payload = json!({
            "name": test_name,
            "test_case": {"id": json_id(test_case_id)},
            "test_cycle": {"id": json_id(cycle_id)},
        });

        let response = self
            .transport
            .post_json(&self.project_url("test-runs"), &payload)?;
        response_id(&response, "id")
    }

    /// Push the execution result of a run
    pub fn update_test_run_status(&self, run_id: &str, record: &TestRecord) -> Result<(), TransportError> {
        let now = Utc::now().to_rfc3339();
        let note = if record.error_message.is_empty() {
            DEFAULT_SUCCESS_NOTE
        } else {
            record.error_message.as_str()
        };
        let payload = json!({
            "exe_start_date": now,
            "exe_end_date": now,
            "status": self.map_status(record.status),
            "note": note,
            "execution_time": record.execution_time_seconds,
        });

        self.transport.post_json(
            &self.project_url(&format!("test-runs/{}/auto-test-logs", run_id)),
            &payload,
        )?;
        Ok(())
    }

    /// Upload screenshots to a run. Failures are logged; returns the number uploaded.
    pub fn upload_attachments(&self, run_id: &str, paths: &[String]) -> usize {
        let url = self.project_url(&format!("test-runs/{}/attachments", run_id));
        let mut uploaded = 0;

        for path in paths {
            let path = Path::new(path);
            if !path.exists() {
                tracing::warn!("Attachment not found, skipping: {}", path.display());
                continue;
            }
            match self.transport.upload_file(&url, path, &[]) {
                Ok(()) => {
                    tracing::info!("Uploaded attachment: {}", path.display());
                    uploaded += 1;
                }
                Err(e) => tracing::warn!("Failed to upload {}: {}", path.display(), e),
            }
        }

        uploaded
    }

    fn publish_record(&self, cycle_id: &str, record: &TestRecord, report: &mut QTestReport) {
        let Some(test_case_id) = record.qtest_case_id() else {
            tracing::info!("No qTest test case ID mapped for {}, skipping", record.name);
            report.unmapped += 1;
            return;
        };
        report.processed += 1;

        let run_id = match self.create_test_run(cycle_id, test_case_id, &record.name) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Failed to create test run for {}: {}", record.name, e);
                return;
            }
        };

        if let Err(e) = self.update_test_run_status(&run_id, record) {
            tracing::warn!("Failed to update test run {}: {}", run_id, e);
            return;
        }
        report.updated += 1;
        tracing::info!("Updated test run {} (status: {})", run_id, record.status);

        if record.status == TestStatus::Failed {
            report.attachments_uploaded += self.upload_attachments(&run_id, &record.screenshot_paths);
        }
    }
}

impl<T: Transport> Publisher for QTestPublisher<T> {
    type Report = QTestReport;

    fn destination(&self) -> &'static str {
        "qTest"
    }

    fn map_status(&self, status: TestStatus) -> &'static str {
        match status {
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILED",
            TestStatus::Skipped => "INCOMPLETE",
            TestStatus::Blocked => "BLOCKED",
        }
    }

    fn publish(&self, summary: &ExecutionSummary) -> QTestReport {
        let mut report = QTestReport {
            total: summary.test_results.len(),
            ..QTestReport::default()
        };

        let cycle_id = match self.create_test_cycle() {
            Ok(id) => {
                tracing::info!("Created test cycle: {} (ID: {})", self.cycle_name, id);
                id
            }
            Err(e) => {
                tracing::error!("Failed to create test cycle: {}", e);
                tracing::error!("Cannot proceed without a test cycle");
                return report;
            }
        };
        report.cycle_id = Some(cycle_id.clone());

        tracing::info!("Processing {} test result(s)", report.total);
        for (index, record) in summary.test_results.iter().enumerate() {
            tracing::info!("[{}/{}] {}", index + 1, report.total, record.name);
            self.publish_record(&cycle_id, record, &mut report);
        }

        report
    }
}
