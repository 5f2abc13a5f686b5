//! Configuration types and structures.

use crate::enums::{ArrayMode, LogLevel};
use serde::{Deserialize, Serialize};

/// Merge engine configuration.
///
/// ```
/// use deepassign_types::{ArrayMode, EngineConfig};
///
/// let config: EngineConfig = serde_json::from_str(r#"{"arrayMode": "concat"}"#).unwrap();
/// assert_eq!(config.array_mode, ArrayMode::Concat);
///
/// let err = serde_json::from_str::<EngineConfig>(r#"{"arrayMode": "bogus"}"#).unwrap_err();
/// assert!(err.to_string().contains("invalid array mode"));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Sequence reconciliation policy
    #[serde(default)]
    pub array_mode: ArrayMode,
}

/// Path accessor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathConfig {
    /// Segment delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Whether path failures are raised as errors instead of yielding absence
    #[serde(default)]
    pub strict: bool,
    /// Whether `delete` removes parents left empty by the removal
    #[serde(default = "default_clean_empty_parents")]
    pub clean_empty_parents: bool,
}

fn default_delimiter() -> String {
    ".".to_string()
}

fn default_clean_empty_parents() -> bool {
    true
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            strict: false,
            clean_empty_parents: default_clean_empty_parents(),
        }
    }
}

/// Log configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level for this output
    #[serde(default)]
    pub level: LogLevel,
    /// Log format (pretty, json, compact)
    #[serde(default)]
    pub format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors
    Pretty,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    #[default]
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_config_defaults() {
        let config: PathConfig = serde_yaml::from_str("strict: true\n").unwrap();
        assert_eq!(config.delimiter, ".");
        assert!(config.strict);
        assert!(config.clean_empty_parents);
        assert_eq!(PathConfig::default().delimiter, ".");
    }

    #[test]
    fn test_engine_config_from_yaml() {
        let config: EngineConfig = serde_yaml::from_str("arrayMode: overwrite\n").unwrap();
        assert_eq!(config.array_mode, ArrayMode::Overwrite);
        let config: EngineConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.array_mode, ArrayMode::Merge);
    }

    #[test]
    fn test_log_config() {
        let config: LogConfig = serde_yaml::from_str("level: DEBUG\nformat: json\n").unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
    }
}
