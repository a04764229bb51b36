//! Bridge configuration
//!
//! Optional TOML file (default `.tosca/bridge.toml`) layered over built-in
//! defaults. Connection settings and credentials always come from CLI flags;
//! this file only carries labelling and discovery settings.

mod defaults;

pub use defaults::{
    DEFAULT_BROWSER, DEFAULT_COMPONENT, DEFAULT_CONFIG_PATH, DEFAULT_DOCUMENT_PATTERN,
    DEFAULT_ENVIRONMENT, DEFAULT_LABELS,
};

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Settings shared by the parse and publish commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Environment label written into Jira descriptions (e.g. "QA")
    pub environment: String,

    /// Jira component assigned to created defects
    pub component: String,

    /// Browser reported in defect descriptions
    pub browser: String,

    /// Labels applied to every created Jira issue (build label is appended)
    pub labels: Vec<String>,

    /// Glob patterns, relative to the results root, selecting result documents
    pub document_patterns: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            component: DEFAULT_COMPONENT.to_string(),
            browser: DEFAULT_BROWSER.to_string(),
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            document_patterns: vec![DEFAULT_DOCUMENT_PATTERN.to_string()],
        }
    }
}

impl BridgeConfig {
    /// Resolve configuration for a command.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present, otherwise built-in defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and parse config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    /// Parse config from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document_patterns.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one pattern must be defined in 'document_patterns'".to_string(),
            ));
        }
        if self.environment.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "'environment' must not be empty".to_string(),
            ));
        }
        if self.labels.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "'labels' must not contain empty entries".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.environment, "QA");
        assert_eq!(config.component, "General");
        assert_eq!(config.browser, "Chrome");
        assert_eq!(config.labels, vec!["Automation", "Tosca"]);
        assert_eq!(config.document_patterns, vec!["**/*.xml"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = BridgeConfig::from_str(
            r#"
environment = "UAT"
labels = ["Automation", "Nightly"]
"#,
        )
        .unwrap();

        assert_eq!(config.environment, "UAT");
        assert_eq!(config.labels, vec!["Automation", "Nightly"]);
        assert_eq!(config.component, "General");
        assert_eq!(config.document_patterns, vec!["**/*.xml"]);
    }

    #[test]
    fn test_empty_patterns_rejected() {
        let err = BridgeConfig::from_str("document_patterns = []").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = BridgeConfig::from_str("environment = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_explicit_missing_path() {
        let err = BridgeConfig::load(Some(Path::new("/nonexistent/bridge.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("bridge.toml");
        fs::write(&path, "component = \"Checkout\"\n").unwrap();

        let config = BridgeConfig::load(Some(&path)).unwrap();
        assert_eq!(config.component, "Checkout");
    }
}
