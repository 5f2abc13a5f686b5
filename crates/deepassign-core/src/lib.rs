//! # DeepAssign Core
//!
//! The structural merge and path-addressing engine.
//!
//! This crate provides:
//!
//! - **Merging**: `MergeEngine` deep-merges any number of records and
//!   sequences into a fresh value, with a configurable array reconciliation mode
//! - **Path access**: `PathAccessor` reads, writes, deletes, and extracts
//!   nested fields addressed by delimited string paths, never mutating its input
//! - **Flattening**: `flat`/`unflat` convert between nested records and
//!   single-level records keyed by full paths
//! - **Logging**: `tracing` subscriber setup
//!
//! ## Example
//!
//! ```
//! use deepassign_core::{merge, path, MergeEngine};
//! use deepassign_types::Value;
//! use serde_json::json;
//!
//! let base = Value::from(json!({"server": {"port": 80, "tls": false}, "tags": ["a"]}));
//! let overlay = Value::from(json!({"server": {"port": 443}, "tags": ["b"]}));
//!
//! let merged = MergeEngine::concat().assign([&base, &overlay]);
//! assert_eq!(merged, Value::from(json!({"server": {"port": 443, "tls": false}, "tags": ["a", "b"]})));
//!
//! let updated = path::set(&merged, "server.tls", Value::from(true)).unwrap();
//! assert_eq!(path::get(&updated, "server.tls"), Some(&Value::from(true)));
//! assert_eq!(path::get(&merged, "server.tls"), Some(&Value::from(false)));
//!
//! assert_eq!(merge::copy(&base), base);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod merge;
pub mod path;
pub mod flat;
pub mod log;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used items
pub use merge::{copy, merge, MergeEngine};
pub use flat::{flat, unflat};
pub use path::{Extraction, PathAccessor};
pub use deepassign_types::{ArrayMode, DeepAssignError, Result, Value};
