//! Common enumerations used throughout DeepAssign.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{DeepAssignError, Result};

/// Policy for reconciling two sequences during a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "String")]
pub enum ArrayMode {
    /// Recursively merge elements position by position, extending with extra target items
    #[default]
    Merge,
    /// Like `Merge`, but target elements replace source elements outright
    ShallowMerge,
    /// Append target elements after source elements
    Concat,
    /// The target sequence fully replaces the source sequence
    Overwrite,
}

impl ArrayMode {
    /// All modes, in declaration order.
    pub const ALL: [ArrayMode; 4] = [
        ArrayMode::Merge,
        ArrayMode::ShallowMerge,
        ArrayMode::Concat,
        ArrayMode::Overwrite,
    ];

    /// The canonical configuration spelling of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrayMode::Merge => "merge",
            ArrayMode::ShallowMerge => "shallowMerge",
            ArrayMode::Concat => "concat",
            ArrayMode::Overwrite => "overwrite",
        }
    }
}

impl FromStr for ArrayMode {
    type Err = DeepAssignError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "merge" => Ok(ArrayMode::Merge),
            "shallowMerge" | "shallow-merge" | "shallow_merge" => Ok(ArrayMode::ShallowMerge),
            "concat" => Ok(ArrayMode::Concat),
            "overwrite" => Ok(ArrayMode::Overwrite),
            _ => Err(DeepAssignError::Configuration(format!(
                "invalid array mode '{}' (expected one of: merge, shallowMerge, concat, overwrite)",
                s
            ))),
        }
    }
}

impl TryFrom<String> for ArrayMode {
    type Error = DeepAssignError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for ArrayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of a structural value, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Null leaf
    Null,
    /// Boolean leaf
    Bool,
    /// Numeric leaf
    Number,
    /// String leaf
    String,
    /// Opaque host object leaf
    Opaque,
    /// Associative record
    Record,
    /// Ordered sequence
    Sequence,
}

impl ValueKind {
    /// Whether values of this kind participate in recursive merging.
    pub fn is_structural(&self) -> bool {
        matches!(self, ValueKind::Record | ValueKind::Sequence)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Null => write!(f, "null"),
            ValueKind::Bool => write!(f, "boolean"),
            ValueKind::Number => write!(f, "number"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Opaque => write!(f, "opaque"),
            ValueKind::Record => write!(f, "record"),
            ValueKind::Sequence => write!(f, "sequence"),
        }
    }
}

/// Log level enumeration for the logging system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Warnings and errors
    #[default]
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Detailed trace messages
    Trace,
}

impl LogLevel {
    /// The `tracing` filter directive for this level.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::None => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = DeepAssignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "NONE" | "OFF" => Ok(LogLevel::None),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "TRACE" => Ok(LogLevel::Trace),
            _ => Err(DeepAssignError::Configuration(format!("Invalid log level: {}", s))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_directive().to_uppercase())
    }
}
