//! Extraction Integration Tests
//!
//! Runs the extractor against the sample result tree and against scratch
//! directories, then checks the JSON summary file produced from it.

mod fixtures;

use std::fs;
use tempfile::TempDir;
use tosca_bridge::{ExecutionSummary, ResultExtractor, TestStatus};

const ALL_XML: &[&str] = &["**/*.xml"];

// =============================================================================
// Sample tree
// =============================================================================

#[test]
fn test_sample_tree_counts() {
    let extraction = ResultExtractor::new(fixtures::results_root(), ALL_XML)
        .unwrap()
        .extract();

    assert_eq!(extraction.documents_found, 2);
    assert_eq!(extraction.documents_parsed, 2);
    assert_eq!(extraction.documents_skipped, 0);
    assert_eq!(extraction.records_skipped, 1);
    assert_eq!(extraction.total_duration_seconds(), 135);

    let summary = extraction.into_summary();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.blocked, 1);
    assert_eq!(summary.pass_rate, 40.0);
    assert_eq!(summary.duration, "0:02:15");
    assert!(summary.has_failures());
}

#[test]
fn test_sample_tree_record_details() {
    let summary = ResultExtractor::new(fixtures::results_root(), ALL_XML)
        .unwrap()
        .extract()
        .into_summary();

    let names: Vec<&str> = summary.test_results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Export order history",
            "Search by SKU",
            "Login with valid user",
            "Checkout with saved card",
            "Wishlist sync",
        ]
    );

    let export = &summary.test_results[0];
    assert_eq!(export.status, TestStatus::Blocked);
    assert_eq!(export.execution_time_seconds, 125);
    assert_eq!(export.qtest_case_id(), Some("3001"));

    let search = &summary.test_results[1];
    assert_eq!(search.status, TestStatus::Passed);
    assert_eq!(search.execution_time_seconds, 7);
    assert_eq!(search.qtest_case_id(), None);

    let login = &summary.test_results[2];
    assert_eq!(login.execution_time_seconds, 20);
    assert_eq!(login.xray_key(), Some("SHOP-101"));

    let checkout = &summary.test_results[3];
    assert_eq!(checkout.status, TestStatus::Failed);
    assert_eq!(checkout.error_message, "Element 'Pay now' was not visible after 30s");
    assert_eq!(checkout.screenshot_paths, vec!["screenshots/checkout_failure.png"]);
    assert!(checkout.critical);

    let wishlist = &summary.test_results[4];
    assert_eq!(wishlist.status, TestStatus::Skipped);
    assert_eq!(wishlist.execution_time, "N/A");
    assert_eq!(wishlist.execution_time_seconds, 0);
}

#[test]
fn test_patterns_narrow_discovery() {
    let extraction = ResultExtractor::new(fixtures::results_root(), &["smoke/*.xml"])
        .unwrap()
        .extract();

    assert_eq!(extraction.documents_found, 1);
    assert_eq!(extraction.records.len(), 3);
    assert_eq!(extraction.total_duration_seconds(), 90);
}

#[test]
fn test_invalid_pattern_rejected() {
    assert!(ResultExtractor::new(fixtures::results_root(), &["results/[.xml"]).is_err());
}

// =============================================================================
// Scratch directories
// =============================================================================

#[test]
fn test_empty_directory_summary() {
    let temp = TempDir::new().unwrap();
    let summary = ResultExtractor::new(temp.path(), ALL_XML)
        .unwrap()
        .extract()
        .into_summary();

    assert_eq!(summary.total, 0);
    assert_eq!(summary.pass_rate, 0.0);
    assert_eq!(summary.duration, "0:00:00");
    assert!(summary.test_results.is_empty());
    assert!(!summary.has_failures());
}

#[test]
fn test_missing_directory_is_empty() {
    let temp = TempDir::new().unwrap();
    let extraction = ResultExtractor::new(temp.path().join("does-not-exist"), ALL_XML)
        .unwrap()
        .extract();

    assert_eq!(extraction.documents_found, 0);
    assert!(extraction.records.is_empty());
}

#[test]
fn test_malformed_document_skipped() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.xml"), "<ExecutionLog><TestCase Name=\"x\">").unwrap();
    fs::write(
        temp.path().join("b.xml"),
        r#"<ExecutionLog><Duration>0:00:10</Duration><TestCase Name="ok"><Result Status="Passed"/></TestCase></ExecutionLog>"#,
    )
    .unwrap();
    fs::write(temp.path().join("c.log"), "not a result").unwrap();

    let extraction = ResultExtractor::new(temp.path(), ALL_XML).unwrap().extract();
    assert_eq!(extraction.documents_found, 2);
    assert_eq!(extraction.documents_skipped, 1);

    let summary = extraction.into_summary();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.pass_rate, 100.0);
    assert_eq!(summary.duration, "0:00:10");
}

#[test]
fn test_unparseable_document_duration_counts_zero() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("run.xml"),
        r#"<Run><Duration>about a minute</Duration><TestCase Name="t"><Result Status="Failed"/></TestCase></Run>"#,
    )
    .unwrap();

    let summary = ResultExtractor::new(temp.path(), ALL_XML)
        .unwrap()
        .extract()
        .into_summary();
    assert_eq!(summary.duration, "0:00:00");
    assert_eq!(summary.failed, 1);
}

// =============================================================================
// Results file
// =============================================================================

#[test]
fn test_results_file_round_trip() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out/nested/results.json");

    let summary = ResultExtractor::new(fixtures::results_root(), ALL_XML)
        .unwrap()
        .extract()
        .into_summary()
        .with_environment("Staging");
    summary.write_to_file(&output).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(raw["total"], 5);
    assert_eq!(raw["passRate"], 40.0);
    assert_eq!(raw["duration"], "0:02:15");
    assert_eq!(raw["environment"], "Staging");
    assert_eq!(raw["test_results"].as_array().unwrap().len(), 5);
    assert!(raw["execution_date"].is_string());

    let loaded = ExecutionSummary::from_file(&output).unwrap();
    assert_eq!(loaded.total, summary.total);
    assert_eq!(loaded.test_results, summary.test_results);
    assert_eq!(loaded.environment.as_deref(), Some("Staging"));
}

#[test]
fn test_results_file_invalid_json() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("results.json");
    fs::write(&path, "{ not json").unwrap();

    let err = ExecutionSummary::from_file(&path).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}
