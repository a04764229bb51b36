//! Canonical test-execution report model.
//!
//! Shared between the result extractor and the downstream publishers:
//! - [`TestStatus`]: the fixed four-value status set and its source vocabularies
//! - [`TestRecord`]: one executed test case
//! - [`ExecutionSummary`]: aggregated counters plus the records, as written to
//!   the summary JSON file

mod duration;
mod record;
mod status;
mod summary;

pub use duration::format_hms;
pub use record::{TestRecord, NOT_AVAILABLE, UNKNOWN_TEST};
pub use status::TestStatus;
pub use summary::{pass_rate, ExecutionSummary};
