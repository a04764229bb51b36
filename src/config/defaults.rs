//! Built-in defaults

/// Config file consulted when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = ".tosca/bridge.toml";

pub const DEFAULT_ENVIRONMENT: &str = "QA";

pub const DEFAULT_COMPONENT: &str = "General";

pub const DEFAULT_BROWSER: &str = "Chrome";

pub const DEFAULT_LABELS: &[&str] = &["Automation", "Tosca"];

/// Every XML file below the results root
pub const DEFAULT_DOCUMENT_PATTERN: &str = "**/*.xml";
