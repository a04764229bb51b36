//! Shared fixtures for the integration tests
//!
//! - Sample Tosca result documents under `tests/fixtures/results`
//! - Canned summaries for the publisher tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tosca_bridge::{ExecutionSummary, TestRecord, TestStatus};

/// Root of the sample result documents
pub fn results_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/results")
}

/// A record with both downstream keys set
pub fn mapped_record(name: &str, status: TestStatus, case_id: &str, xray_key: &str) -> TestRecord {
    let mut record = TestRecord::new(name, status);
    record.test_case_id = case_id.to_string();
    record.xray_test_key = xray_key.to_string();
    record
}

/// Two passed, one failed, one skipped; every record mapped
pub fn mixed_summary() -> ExecutionSummary {
    let mut failed = mapped_record("Checkout", TestStatus::Failed, "12", "SHOP-12");
    failed.error_message = "Pay button not found".to_string();

    ExecutionSummary::from_records(
        vec![
            mapped_record("Login", TestStatus::Passed, "10", "SHOP-10"),
            mapped_record("Search", TestStatus::Passed, "11", "SHOP-11"),
            failed,
            mapped_record("Wishlist", TestStatus::Skipped, "13", "SHOP-13"),
        ],
        95,
    )
}
