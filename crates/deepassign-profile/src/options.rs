//! Options normalization: caller overrides merged onto typed defaults.

use deepassign_core::MergeEngine;
use deepassign_types::{Result, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

/// Merge `overrides` onto `defaults` and deserialize the result back into `T`.
///
/// A `Null` override leaves the defaults as they are.
///
/// # Errors
///
/// Returns a `Json` error when the defaults don't serialize or the merged
/// value doesn't fit `T`.
///
/// # Example
///
/// ```
/// use deepassign_core::MergeEngine;
/// use deepassign_profile::normalize;
/// use deepassign_types::Value;
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Retry {
///     attempts: u32,
///     backoff: Vec<u64>,
/// }
///
/// let defaults = Retry { attempts: 3, backoff: vec![100, 200, 400] };
/// let normalized: Retry =
///     normalize(&defaults, &Value::from(json!({"backoff": [50]})), &MergeEngine::overwrite()).unwrap();
/// assert_eq!(normalized, Retry { attempts: 3, backoff: vec![50] });
/// ```
pub fn normalize<T>(defaults: &T, overrides: &Value, engine: &MergeEngine) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let base = Value::from(serde_json::to_value(defaults)?);
    let merged = merge_overrides(&base, overrides, engine);
    trace!("Normalized options: {}", merged);
    Ok(serde_json::from_value(merged.to_json()?)?)
}

/// Untyped [`normalize`] with the default engine.
pub fn normalize_value(defaults: &Value, overrides: &Value) -> Value {
    merge_overrides(defaults, overrides, &MergeEngine::default())
}

fn merge_overrides(defaults: &Value, overrides: &Value, engine: &MergeEngine) -> Value {
    if overrides.is_null() {
        return engine.copy(defaults);
    }
    engine.assign([defaults, overrides])
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepassign_types::DeepAssignError;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
    struct ServerOptions {
        host: String,
        port: u16,
        tags: Vec<String>,
        tls: TlsOptions,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
    struct TlsOptions {
        enabled: bool,
        cert: Option<String>,
    }

    fn defaults() -> ServerOptions {
        ServerOptions {
            host: "localhost".to_string(),
            port: 80,
            tags: vec!["web".to_string()],
            tls: TlsOptions { enabled: false, cert: None },
        }
    }

    #[test]
    fn test_normalize_nested_override() {
        let overrides = Value::from(json!({"port": 443, "tls": {"enabled": true, "cert": "server.pem"}}));
        let normalized = normalize(&defaults(), &overrides, &MergeEngine::default()).unwrap();

        assert_eq!(normalized.host, "localhost");
        assert_eq!(normalized.port, 443);
        assert_eq!(normalized.tls, TlsOptions { enabled: true, cert: Some("server.pem".to_string()) });
    }

    #[test]
    fn test_normalize_array_modes() {
        let overrides = Value::from(json!({"tags": ["api"]}));

        let concat = normalize(&defaults(), &overrides, &MergeEngine::concat()).unwrap();
        assert_eq!(concat.tags, vec!["web", "api"]);

        let overwrite = normalize(&defaults(), &overrides, &MergeEngine::overwrite()).unwrap();
        assert_eq!(overwrite.tags, vec!["api"]);
    }

    #[test]
    fn test_normalize_null_overrides() {
        let normalized = normalize(&defaults(), &Value::Null, &MergeEngine::default()).unwrap();
        assert_eq!(normalized, defaults());
    }

    #[test]
    fn test_normalize_type_mismatch() {
        let overrides = Value::from(json!({"port": "not a port"}));
        let err = normalize(&defaults(), &overrides, &MergeEngine::default()).unwrap_err();
        assert!(matches!(err, DeepAssignError::Json(_)));
    }

    #[test]
    fn test_normalize_value() {
        let defaults = Value::from(json!({"a": {"b": 1, "c": [1, 2]}}));
        let normalized = normalize_value(&defaults, &Value::from(json!({"a": {"c": [9]}})));
        assert_eq!(normalized, Value::from(json!({"a": {"b": 1, "c": [9, 2]}})));
        assert_eq!(normalize_value(&defaults, &Value::Null), defaults);
    }
}
