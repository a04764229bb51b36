//! Tosca Bridge - Tosca results normalization and publishing
//!
//! Reads Tosca XML execution results, normalizes them into a canonical
//! execution summary and publishes that summary to Jira/Xray and qTest.

pub mod config;
pub mod extract;
pub mod publish;

pub use config::{BridgeConfig, ConfigError};
pub use extract::{ExtractError, Extraction, RecordError, ResultExtractor};
pub use publish::{
    Auth, HttpTransport, MockTransport, PublishReport, Publisher, QTestPublisher, Transport,
    TransportError, XrayPublisher,
};
pub use tosca_report::{format_hms, pass_rate, ExecutionSummary, TestRecord, TestStatus};
