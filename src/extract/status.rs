//! Status classification for `TestCase` elements
//!
//! Resolvers are tried in order; the first one that recognizes the record
//! decides its status. A record nobody recognizes is `Failed`.

use roxmltree::Node;
use tosca_report::TestStatus;

use super::document::first_descendant;

/// One classification strategy; `None` defers to the next resolver
pub type StatusResolver = for<'a, 'input> fn(Node<'a, 'input>) -> Option<TestStatus>;

/// Default resolver chain
pub const STATUS_RESOLVERS: &[StatusResolver] = &[structured_result, verification_status];

/// Classify a test case with the default resolver chain
pub fn resolve_status(test_case: Node<'_, '_>) -> TestStatus {
    resolve_with(STATUS_RESOLVERS, test_case)
}

/// Classify with an explicit resolver chain, falling back to `Failed`
pub fn resolve_with(resolvers: &[StatusResolver], test_case: Node<'_, '_>) -> TestStatus {
    resolvers
        .iter()
        .find_map(|resolve| resolve(test_case))
        .unwrap_or(TestStatus::Failed)
}

/// `<Result Status="...">` on the first `Result` element
pub fn structured_result(test_case: Node<'_, '_>) -> Option<TestStatus> {
    first_descendant(test_case, "Result")
        .and_then(|result| result.attribute("Status"))
        .and_then(TestStatus::from_result_indicator)
}

/// Free text of the first `VerificationStatus` element
pub fn verification_status(test_case: Node<'_, '_>) -> Option<TestStatus> {
    first_descendant(test_case, "VerificationStatus")
        .and_then(|verification| verification.text())
        .and_then(TestStatus::from_verification_text)
}
