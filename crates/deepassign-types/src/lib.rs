//! # DeepAssign Types
//!
//! Core types shared across all DeepAssign crates.
//!
//! This crate provides the fundamental building blocks for the merge engine
//! and the path accessor, including:
//!
//! - The closed structural value model (`Value`, `Record`, `Key`, `Symbol`, `Opaque`)
//! - Enums for array reconciliation modes, value kinds, and log levels
//! - Serde-loadable configuration structures
//! - Error types and result aliases
//!
//! ## Example
//!
//! ```
//! use deepassign_types::{ArrayMode, Key, Value};
//!
//! let mode: ArrayMode = "concat".parse().unwrap();
//! assert_eq!(mode, ArrayMode::Concat);
//!
//! let value = Value::from(serde_json::json!({"server": {"port": 8080}}));
//! assert!(value.is_record());
//! assert_eq!(value.child("server").and_then(|s| s.child("port")), Some(&Value::from(8080)));
//! assert_eq!(Key::from("server").to_string(), "server");
//!
//! assert!("bogus".parse::<ArrayMode>().is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod key;
pub mod enums;
pub mod value;
pub mod config;

// Re-export common types for convenience
pub use errors::{DeepAssignError, Result};
pub use key::{Key, Symbol};
pub use enums::{ArrayMode, LogLevel, ValueKind};
pub use value::{Opaque, Record, Value};
pub use config::{EngineConfig, LogConfig, LogFormat, PathConfig};
