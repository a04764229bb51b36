//! Result extraction
//!
//! Finds Tosca result documents below a root directory, normalizes every
//! `TestCase` into a [`TestRecord`] and accumulates document durations.
//! A broken document or record is logged and skipped; extraction of the
//! remaining work always continues.

mod discover;
mod document;
mod status;
mod timing;

pub use discover::DocumentMatcher;
pub use document::{
    custom_field, error_message, is_critical, parse_document, parse_test_case, ParsedDocument,
    RecordError, DEFAULT_VERIFICATION_MESSAGE, ERROR_MESSAGE_ELEMENTS, XRAY_KEY_FIELD,
};
pub use status::{
    resolve_status, resolve_with, structured_result, verification_status, StatusResolver,
    STATUS_RESOLVERS,
};
pub use timing::{parse_document_duration, test_duration_seconds, Timestamp};

use chrono::Duration;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tosca_report::{ExecutionSummary, TestRecord};

/// Per-document failures. None of these abort an extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid document pattern: {0}")]
    Pattern(#[from] globset::Error),
}

/// Everything extracted from one results root
#[derive(Debug)]
pub struct Extraction {
    /// Records from every parsed document, in discovery order
    pub records: Vec<TestRecord>,
    /// Sum of document-level durations
    pub total_duration: Duration,
    pub documents_found: usize,
    pub documents_parsed: usize,
    pub documents_skipped: usize,
    pub records_skipped: usize,
}

impl Default for Extraction {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total_duration: Duration::zero(),
            documents_found: 0,
            documents_parsed: 0,
            documents_skipped: 0,
            records_skipped: 0,
        }
    }
}

impl Extraction {
    /// Accumulated duration in whole seconds
    pub fn total_duration_seconds(&self) -> u64 {
        self.total_duration.num_seconds().max(0) as u64
    }

    /// Aggregate into the run summary
    pub fn into_summary(self) -> ExecutionSummary {
        let seconds = self.total_duration_seconds();
        ExecutionSummary::from_records(self.records, seconds)
    }
}

/// Extracts test records from a results directory
#[derive(Debug, Clone)]
pub struct ResultExtractor {
    root: PathBuf,
    matcher: DocumentMatcher,
}

impl ResultExtractor {
    /// Create an extractor selecting documents with the given glob patterns
    pub fn new<S: AsRef<str>>(root: impl Into<PathBuf>, patterns: &[S]) -> Result<Self, ExtractError> {
        Ok(Self {
            root: root.into(),
            matcher: DocumentMatcher::new(patterns)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discover and parse every result document.
    ///
    /// Finding no documents is not an error; the extraction is simply empty.
    pub fn extract(&self) -> Extraction {
        let documents = self.matcher.discover(&self.root);
        let mut extraction = Extraction {
            documents_found: documents.len(),
            ..Extraction::default()
        };

        if documents.is_empty() {
            tracing::warn!("No XML result files found in {}", self.root.display());
            return extraction;
        }

        tracing::info!("Found {} XML result file(s)", documents.len());

        for path in &documents {
            match Self::extract_document(path) {
                Ok(parsed) => {
                    tracing::debug!(
                        "Parsed {}: {} record(s), {} skipped",
                        path.display(),
                        parsed.records.len(),
                        parsed.skipped.len()
                    );
                    extraction.documents_parsed += 1;
                    extraction.records_skipped += parsed.skipped.len();
                    extraction.records.extend(parsed.records);
                    if let Some(duration) = parsed.duration {
                        match extraction.total_duration.checked_add(&duration) {
                            Some(total) => extraction.total_duration = total,
                            None => tracing::warn!(
                                "Duration of {} overflows the run total, ignoring it",
                                path.display()
                            ),
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    extraction.documents_skipped += 1;
                }
            }
        }

        extraction
    }

    fn extract_document(path: &Path) -> Result<ParsedDocument, ExtractError> {
        let xml = fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_document(&xml).map_err(|source| ExtractError::Xml {
            path: path.to_path_buf(),
            source,
        })
    }
}
