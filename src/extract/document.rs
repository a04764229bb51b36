//! Parsing of a single Tosca result document
//!
//! The schema differs between Tosca versions, so every lookup is a
//! descendant search and every field has a fallback.

use chrono::Duration;
use roxmltree::{Document, Node};
use tosca_report::{TestRecord, NOT_AVAILABLE, UNKNOWN_TEST};

use super::status::resolve_status;
use super::timing::{parse_document_duration, test_duration_seconds};

/// Elements whose text may carry the failure message, in priority order
pub const ERROR_MESSAGE_ELEMENTS: &[&str] =
    &["ErrorMessage", "Error", "FailureReason", "ExceptionMessage"];

/// Custom field holding the Xray test key
pub const XRAY_KEY_FIELD: &str = "JIRA_Test_Key";

/// Message used when a failed verification carries none
pub const DEFAULT_VERIFICATION_MESSAGE: &str = "Verification failed";

/// A record that could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("TestCase #{index} has a blank Name attribute")]
    BlankName { index: usize },
}

/// Outcome of parsing one document
#[derive(Debug, Default)]
pub struct ParsedDocument {
    /// Records that parsed successfully, in document order
    pub records: Vec<TestRecord>,
    /// Records that were skipped
    pub skipped: Vec<RecordError>,
    /// Document-level duration, if present and parseable
    pub duration: Option<Duration>,
}

/// Parse the text of a result document
pub fn parse_document(xml: &str) -> Result<ParsedDocument, roxmltree::Error> {
    let doc = Document::parse(xml)?;
    let mut parsed = ParsedDocument::default();

    let test_cases = doc
        .descendants()
        .filter(|n| n.is_element() && n.has_tag_name("TestCase"));

    for (index, test_case) in test_cases.enumerate() {
        match parse_test_case(test_case, index) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                tracing::warn!("Skipping test case: {}", e);
                parsed.skipped.push(e);
            }
        }
    }

    parsed.duration = doc
        .descendants()
        .find(|n| n.is_element() && n.has_tag_name("Duration"))
        .and_then(|n| n.text())
        .and_then(parse_document_duration);

    Ok(parsed)
}

/// Normalize one `TestCase` element
pub fn parse_test_case(test_case: Node<'_, '_>, index: usize) -> Result<TestRecord, RecordError> {
    let name = match test_case.attribute("Name") {
        Some(name) if name.trim().is_empty() => return Err(RecordError::BlankName { index }),
        Some(name) => name.to_string(),
        None => UNKNOWN_TEST.to_string(),
    };

    let start_time = non_empty_attribute(test_case, "StartTime");
    let end_time = non_empty_attribute(test_case, "EndTime");
    let execution_time = test_case.attribute("ExecutionTime");

    Ok(TestRecord {
        name,
        status: resolve_status(test_case),
        execution_time: execution_time.unwrap_or(NOT_AVAILABLE).to_string(),
        execution_time_seconds: test_duration_seconds(
            start_time.as_deref(),
            end_time.as_deref(),
            execution_time,
        ),
        start_time,
        end_time,
        error_message: error_message(test_case),
        screenshot_paths: screenshot_paths(test_case),
        module: attribute_or(test_case, "Module", NOT_AVAILABLE),
        suite: attribute_or(test_case, "Suite", NOT_AVAILABLE),
        test_case_id: attribute_or(test_case, "ID", ""),
        xray_test_key: custom_field(test_case, XRAY_KEY_FIELD).unwrap_or_default(),
        critical: is_critical(test_case),
    })
}

/// First element below `node` (excluding `node` itself) with the given tag
pub(crate) fn first_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.has_tag_name(tag))
}

fn attribute_or(node: Node<'_, '_>, name: &str, default: &str) -> String {
    node.attribute(name).unwrap_or(default).to_string()
}

fn non_empty_attribute(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name)
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// First non-empty candidate message, else the failed verification's message
pub fn error_message(test_case: Node<'_, '_>) -> String {
    for tag in ERROR_MESSAGE_ELEMENTS {
        if let Some(text) = first_descendant(test_case, tag).and_then(|n| n.text()) {
            let text = text.trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }

    match first_descendant(test_case, "VerificationResult") {
        Some(verification) if verification.attribute("Status") == Some("Failed") => verification
            .attribute("Message")
            .unwrap_or(DEFAULT_VERIFICATION_MESSAGE)
            .to_string(),
        _ => String::new(),
    }
}

fn screenshot_paths(test_case: Node<'_, '_>) -> Vec<String> {
    test_case
        .descendants()
        .skip(1)
        .filter(|n| n.is_element() && n.has_tag_name("Screenshot"))
        .filter_map(|n| n.attribute("Path"))
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

/// Value of `<CustomFields><Field Name=".." Value=".."/></CustomFields>`
pub fn custom_field(test_case: Node<'_, '_>, field_name: &str) -> Option<String> {
    let fields = first_descendant(test_case, "CustomFields")?;
    fields
        .descendants()
        .skip(1)
        .filter(|n| n.is_element() && n.has_tag_name("Field"))
        .find(|n| n.attribute("Name") == Some(field_name))
        .map(|n| n.attribute("Value").unwrap_or_default().to_string())
}

/// Critical when Priority or Tags mention "critical", or Tags mention "smoke"
pub fn is_critical(test_case: Node<'_, '_>) -> bool {
    let priority = test_case.attribute("Priority").unwrap_or_default().to_lowercase();
    let tags = test_case.attribute("Tags").unwrap_or_default().to_lowercase();

    priority.contains("critical") || tags.contains("critical") || tags.contains("smoke")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tosca_report::TestStatus;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ExecutionLog>
  <Summary><Duration>0:10:05</Duration></Summary>
  <TestCases>
    <TestCase Name="Login works" ID="1001" Module="Auth" Suite="Smoke Suite"
              StartTime="2024-03-01T10:00:00Z" EndTime="2024-03-01T10:00:42Z"
              ExecutionTime="40.2" Priority="High" Tags="regression">
      <Result Status="Passed"/>
      <CustomFields>
        <Field Name="Owner" Value="qa-team"/>
        <Field Name="JIRA_Test_Key" Value="SHOP-101"/>
      </CustomFields>
    </TestCase>
    <TestCase Name="Checkout" Tags="Smoke" ExecutionTime="12">
      <Result Status="Failure"/>
      <Details>
        <ErrorMessage>   </ErrorMessage>
        <Error>
          Button 'Pay' not found
        </Error>
      </Details>
      <Screenshot Path="shots/checkout_1.png"/>
      <Screenshot Path=""/>
      <Screenshot Path="shots/checkout_2.png"/>
    </TestCase>
    <TestCase>
      <VerificationResult Status="Failed"/>
    </TestCase>
  </TestCases>
</ExecutionLog>"#;

    #[test]
    fn test_parse_sample_document() {
        let parsed = parse_document(SAMPLE).unwrap();

        assert_eq!(parsed.records.len(), 3);
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.duration, Some(Duration::seconds(605)));
    }

    #[test]
    fn test_fully_populated_record() {
        let parsed = parse_document(SAMPLE).unwrap();
        let login = &parsed.records[0];

        assert_eq!(login.name, "Login works");
        assert_eq!(login.status, TestStatus::Passed);
        assert_eq!(login.execution_time, "40.2");
        assert_eq!(login.execution_time_seconds, 42);
        assert_eq!(login.start_time.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(login.module, "Auth");
        assert_eq!(login.suite, "Smoke Suite");
        assert_eq!(login.test_case_id, "1001");
        assert_eq!(login.xray_test_key, "SHOP-101");
        assert_eq!(login.error_message, "");
        assert!(!login.critical);
    }

    #[test]
    fn test_failed_record_details() {
        let parsed = parse_document(SAMPLE).unwrap();
        let checkout = &parsed.records[1];

        assert_eq!(checkout.status, TestStatus::Failed);
        assert_eq!(checkout.error_message, "Button 'Pay' not found");
        assert_eq!(
            checkout.screenshot_paths,
            vec!["shots/checkout_1.png", "shots/checkout_2.png"]
        );
        assert_eq!(checkout.execution_time_seconds, 12);
        assert_eq!(checkout.module, "N/A");
        assert!(checkout.critical);
        assert!(checkout.xray_test_key.is_empty());
    }

    #[test]
    fn test_bare_record_defaults() {
        let parsed = parse_document(SAMPLE).unwrap();
        let bare = &parsed.records[2];

        assert_eq!(bare.name, "Unknown Test");
        assert_eq!(bare.status, TestStatus::Failed);
        assert_eq!(bare.error_message, "Verification failed");
        assert_eq!(bare.execution_time, "N/A");
        assert_eq!(bare.execution_time_seconds, 0);
        assert!(bare.start_time.is_none());
        assert!(bare.test_case_id.is_empty());
    }

    #[test]
    fn test_verification_message() {
        let doc = Document::parse(
            r#"<TestCase><VerificationResult Status="Failed" Message="Expected 3 rows"/></TestCase>"#,
        )
        .unwrap();
        assert_eq!(error_message(doc.root_element()), "Expected 3 rows");

        let doc = Document::parse(
            r#"<TestCase><VerificationResult Status="Passed" Message="ok"/></TestCase>"#,
        )
        .unwrap();
        assert_eq!(error_message(doc.root_element()), "");
    }

    #[test]
    fn test_error_candidates_in_order() {
        let doc = Document::parse(
            r#"<TestCase><ExceptionMessage>late</ExceptionMessage><FailureReason> early </FailureReason></TestCase>"#,
        )
        .unwrap();
        assert_eq!(error_message(doc.root_element()), "early");
    }

    #[test]
    fn test_no_error_candidates() {
        let doc = Document::parse(r#"<TestCase><Result Status="Passed"/></TestCase>"#).unwrap();
        assert_eq!(error_message(doc.root_element()), "");
    }

    #[test]
    fn test_critical_flags() {
        let critical = |xml: &str| {
            let doc = Document::parse(xml).unwrap();
            is_critical(doc.root_element())
        };

        assert!(critical(r#"<TestCase Priority="CRITICAL"/>"#));
        assert!(critical(r#"<TestCase Tags="ui, Critical-path"/>"#));
        assert!(critical(r#"<TestCase Tags="SMOKE"/>"#));
        assert!(!critical(r#"<TestCase Priority="smoke" Tags="regression"/>"#));
        assert!(!critical(r#"<TestCase/>"#));
    }

    #[test]
    fn test_custom_field_without_value() {
        let doc = Document::parse(
            r#"<TestCase><CustomFields><Field Name="JIRA_Test_Key"/></CustomFields></TestCase>"#,
        )
        .unwrap();
        assert_eq!(custom_field(doc.root_element(), XRAY_KEY_FIELD), Some(String::new()));
        assert_eq!(custom_field(doc.root_element(), "Missing"), None);
    }

    #[test]
    fn test_blank_name_is_skipped() {
        let parsed = parse_document(
            r#"<Run><TestCase Name="  "/><TestCase Name="kept"><Result Status="Passed"/></TestCase></Run>"#,
        )
        .unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].name, "kept");
        assert_eq!(parsed.skipped, vec![RecordError::BlankName { index: 0 }]);
    }

    #[test]
    fn test_malformed_document() {
        assert!(parse_document("<Run><TestCase></Run>").is_err());
    }

    #[test]
    fn test_unparseable_duration_is_ignored() {
        let parsed = parse_document(r#"<Run><Duration>soon</Duration></Run>"#).unwrap();
        assert!(parsed.duration.is_none());
        assert!(parsed.records.is_empty());
    }
}
