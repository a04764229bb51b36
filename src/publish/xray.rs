//! Jira/Xray publisher
//!
//! Creates a Test Execution issue for the run, a Bug for every failed test,
//! and pushes per-test statuses into the execution.

use chrono::Local;
use serde_json::json;
use std::fmt;
use std::path::Path;
use tosca_report::{ExecutionSummary, TestRecord, TestStatus};

use super::transport::{Transport, TransportError};
use super::{base_url, response_id, PublishReport, Publisher};
use crate::config::BridgeConfig;

/// Header Jira requires on attachment uploads
const ATLASSIAN_TOKEN_HEADER: (&str, &str) = ("X-Atlassian-Token", "no-check");

/// Jira priority for an auto-created defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefectPriority {
    Critical,
    High,
    Medium,
}

impl DefectPriority {
    /// `Critical` for critical tests, `High` for smoke/critical suites, else `Medium`
    pub fn for_record(record: &TestRecord) -> Self {
        if record.critical {
            return DefectPriority::Critical;
        }
        let suite = record.suite.to_lowercase();
        if suite.contains("smoke") || suite.contains("critical") {
            DefectPriority::High
        } else {
            DefectPriority::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DefectPriority::Critical => "Critical",
            DefectPriority::High => "High",
            DefectPriority::Medium => "Medium",
        }
    }
}

/// Tally of an Xray publish run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XrayReport {
    /// Key of the Test Execution issue, if it was created
    pub execution_key: Option<String>,
    pub failed_tests: usize,
    pub defects_created: usize,
    pub status_updates: usize,
    pub status_update_failures: usize,
}

impl PublishReport for XrayReport {
    /// Execution and defect failures are reported, not fatal
    fn is_success(&self) -> bool {
        true
    }
}

impl fmt::Display for XrayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Test Execution: {}",
            self.execution_key.as_deref().unwrap_or("Not created")
        )?;
        writeln!(f, "Defects Created: {}/{}", self.defects_created, self.failed_tests)?;
        write!(f, "Tests Updated in Xray: {}", self.status_updates)?;
        if self.status_update_failures > 0 {
            write!(f, " ({} failed)", self.status_update_failures)?;
        }
        Ok(())
    }
}

/// Publishes an execution summary to Jira with the Xray plugin
pub struct XrayPublisher<T: Transport> {
    transport: T,
    jira_url: String,
    project_key: String,
    build_number: String,
    config: BridgeConfig,
}

impl<T: Transport> XrayPublisher<T> {
    pub fn new(
        transport: T,
        jira_url: &str,
        project_key: impl Into<String>,
        build_number: impl Into<String>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            transport,
            jira_url: base_url(jira_url),
            project_key: project_key.into(),
            build_number: build_number.into(),
            config,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn issue_url(&self) -> String {
        format!("{}/rest/api/2/issue", self.jira_url)
    }

    fn labels(&self, extra: &[&str]) -> Vec<String> {
        self.config
            .labels
            .iter()
            .cloned()
            .chain(extra.iter().map(|l| l.to_string()))
            .chain(std::iter::once(format!("Build-{}", self.build_number)))
            .collect()
    }

    fn environment<'a>(&'a self, summary: &'a ExecutionSummary) -> &'a str {
        summary
            .environment
            .as_deref()
            .unwrap_or(self.config.environment.as_str())
    }

    /// Create the Test Execution issue and return its key
    pub fn create_test_execution(&self, summary: &ExecutionSummary) -> Result<String, TransportError> {
        let payload = json!({
            "fields": {
                "project": {"key": self.project_key},
                "summary": format!("Tosca Test Execution - Build {}", self.build_number),
                "description": self.execution_description(summary),
                "issuetype": {"name": "Test Execution"},
                "labels": self.labels(&[]),
            }
        });

        let response = self.transport.post_json(&self.issue_url(), &payload)?;
        response_id(&response, "key")
    }

    /// Create a Bug for a failed test and attach its screenshots
    pub fn create_defect(
        &self,
        record: &TestRecord,
        environment: &str,
    ) -> Result<String, TransportError> {
        let priority = DefectPriority::for_record(record);
        let payload = json!({
            "fields": {
                "project": {"key": self.project_key},
                "summary": format!("[Automation] {} - Failed", record.name),
                "description": self.defect_description(record, environment),
                "issuetype": {"name": "Bug"},
                "priority": {"name": priority.as_str()},
                "labels": self.labels(&["TestFailure"]),
                "components": [{"name": self.config.component}],
            }
        });

        let response = self.transport.post_json(&self.issue_url(), &payload)?;
        let defect_key = response_id(&response, "key")?;
        tracing::info!("Created defect {} for {}", defect_key, record.name);

        if !record.screenshot_paths.is_empty() {
            self.attach_files(&defect_key, &record.screenshot_paths);
        }

        Ok(defect_key)
    }

    /// Upload files to an issue; each upload is independent. Returns the number attached.
    pub fn attach_files(&self, issue_key: &str, paths: &[String]) -> usize {
        let url = format!("{}/rest/api/2/issue/{}/attachments", self.jira_url, issue_key);
        let mut attached = 0;

        for path in paths {
            match self
                .transport
                .upload_file(&url, Path::new(path), &[ATLASSIAN_TOKEN_HEADER])
            {
                Ok(()) => {
                    tracing::info!("Attached {} to {}", path, issue_key);
                    attached += 1;
                }
                Err(e) => tracing::warn!("Failed to attach {}: {}", path, e),
            }
        }

        attached
    }

    /// Set a test's status inside the Test Execution
    pub fn update_test_status(
        &self,
        execution_key: &str,
        test_key: &str,
        status: TestStatus,
    ) -> Result<(), TransportError> {
        let url = format!(
            "{}/rest/raven/1.0/api/testexec/{}/test",
            self.jira_url, execution_key
        );
        let payload = json!({
            "testKey": test_key,
            "status": self.map_status(status),
        });
        self.transport.post_json(&url, &payload)?;
        Ok(())
    }

    fn push_status(&self, execution_key: &str, record: &TestRecord, report: &mut XrayReport) {
        let Some(test_key) = record.xray_key() else {
            return;
        };
        match self.update_test_status(execution_key, test_key, record.status) {
            Ok(()) => report.status_updates += 1,
            Err(e) => {
                tracing::warn!("Failed to update status for {}: {}", test_key, e);
                report.status_update_failures += 1;
            }
        }
    }

    fn execution_description(&self, summary: &ExecutionSummary) -> String {
        format!(
            "\nh2. Test Execution Summary\n\n\
             *Total Tests:* {}\n\
             *Passed:* {} ({}%)\n\
             *Failed:* {}\n\
             *Skipped:* {}\n\
             *Blocked:* {}\n\n\
             *Execution Time:* {}\n\
             *Environment:* {}\n\
             *Executed:* {}\n\n\
             ----\n\
             _This execution was automated via Tosca CI/CD pipeline_\n",
            summary.total,
            summary.passed,
            summary.pass_rate,
            summary.failed,
            summary.skipped,
            summary.blocked,
            summary.duration,
            self.environment(summary),
            Local::now().format("%Y-%m-%d %H:%M:%S"),
        )
    }

    fn defect_description(&self, record: &TestRecord, environment: &str) -> String {
        let error = if record.error_message.is_empty() {
            "No error details available"
        } else {
            record.error_message.as_str()
        };

        format!(
            "\nh2. Test Failure Details\n\n\
             *Test Name:* {}\n\
             *Build Number:* {}\n\
             *Execution Time:* {}\n\
             *Environment:* {}\n\n\
             h3. Error Message\n\
             {{code}}\n{}\n{{code}}\n\n\
             h3. Steps to Reproduce\n\
             See attached test case details\n\n\
             h3. Expected Result\n\
             Test should pass\n\n\
             h3. Actual Result\n\
             Test failed with the error shown above\n\n\
             h3. Additional Information\n\
             * Browser: {}\n\
             * Test Suite: {}\n\
             * Module: {}\n\n\
             ----\n\
             _This defect was automatically created by Tosca automation_\n",
            record.name,
            self.build_number,
            record.execution_time,
            environment,
            error,
            self.config.browser,
            record.suite,
            record.module,
        )
    }
}

impl<T: Transport> Publisher for XrayPublisher<T> {
    type Report = XrayReport;

    fn destination(&self) -> &'static str {
        "JIRA/Xray"
    }

    fn map_status(&self, status: TestStatus) -> &'static str {
        match status {
            TestStatus::Passed => "PASS",
            TestStatus::Failed => "FAIL",
            TestStatus::Skipped => "TODO",
            TestStatus::Blocked => "ABORTED",
        }
    }

    fn publish(&self, summary: &ExecutionSummary) -> XrayReport {
        let mut report = XrayReport::default();

        report.execution_key = match self.create_test_execution(summary) {
            Ok(key) => {
                tracing::info!("Created Test Execution: {}", key);
                Some(key)
            }
            Err(e) => {
                tracing::error!("Failed to create test execution: {}", e);
                tracing::warn!("Continuing without test execution");
                None
            }
        };

        let failed: Vec<&TestRecord> = summary.records_with_status(TestStatus::Failed).collect();
        report.failed_tests = failed.len();
        tracing::info!("Creating defects for {} failed test(s)", failed.len());

        for record in failed {
            match self.create_defect(record, self.environment(summary)) {
                Ok(_) => report.defects_created += 1,
                Err(e) => tracing::warn!("Failed to create defect for {}: {}", record.name, e),
            }

            if let Some(execution_key) = report.execution_key.clone() {
                self.push_status(&execution_key, record, &mut report);
            }
        }

        if let Some(execution_key) = report.execution_key.clone() {
            let passed: Vec<&TestRecord> =
                summary.records_with_status(TestStatus::Passed).collect();
            tracing::info!("Updating {} passed test(s) in Xray", passed.len());
            for record in passed {
                self.push_status(&execution_key, record, &mut report);
            }
        }

        report
    }
}
