//! # DeepAssign Profiles
//!
//! Consumers of the merge engine:
//!
//! - **Profiles**: layered configuration (defaults, loaded file, extensions,
//!   programmatic overrides) with dotted-path reads and writes
//! - **Registry**: named profiles that inherit from each other via `extends`
//! - **Options**: merging caller overrides onto typed defaults
//!
//! ## Example
//!
//! ```
//! use deepassign_profile::Profile;
//! use deepassign_types::Value;
//! use serde_json::json;
//!
//! let mut profile = Profile::new("dev")
//!     .with_defaults(Value::from(json!({"server": {"port": 80, "host": "localhost"}})));
//! profile.extend(&Value::from(json!({"server": {"port": 8080}})));
//! profile.set("server.debug", true).unwrap();
//!
//! assert_eq!(profile.get::<u16>("server.port"), Some(8080));
//! assert_eq!(profile.get::<String>("server.host").as_deref(), Some("localhost"));
//! assert_eq!(profile.get::<bool>("server.debug"), Some(true));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod profile;
pub mod registry;
pub mod options;

// Re-export main types
pub use profile::{Profile, ProfileLayer};
pub use registry::ProfileRegistry;
pub use options::{normalize, normalize_value};
