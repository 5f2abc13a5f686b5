//! Deep merge engine.
//!
//! Records are merged key by key, sequences are reconciled according to the
//! engine's [`ArrayMode`], and anything else is a leaf that the later value
//! replaces wholesale. Every merge produces a fresh value; inputs are only
//! ever borrowed.

use deepassign_types::{ArrayMode, DeepAssignError, EngineConfig, Key, Record, Result, Value};
use tracing::{debug, trace};

/// Option key read by [`MergeEngine::from_options`].
pub const ARRAY_MODE_OPTION: &str = "arrayMode";

/// A merge engine pinned to one array reconciliation mode.
///
/// Engines are plain values; build one per policy and pass it to whatever
/// needs it.
///
/// # Example
///
/// ```
/// use deepassign_core::MergeEngine;
/// use deepassign_types::{ArrayMode, Value};
/// use serde_json::json;
///
/// let a = Value::from(json!([1, 2]));
/// let b = Value::from(json!([3]));
///
/// assert_eq!(MergeEngine::default().assign([&a, &b]), Value::from(json!([3, 2])));
/// assert_eq!(MergeEngine::concat().assign([&a, &b]), Value::from(json!([1, 2, 3])));
/// assert_eq!(MergeEngine::overwrite().assign([&a, &b]), Value::from(json!([3])));
/// assert_eq!(MergeEngine::concat().array_mode(), ArrayMode::Concat);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeEngine {
    mode: ArrayMode,
}

impl MergeEngine {
    /// Create an engine with the given array mode.
    pub fn new(mode: ArrayMode) -> Self {
        Self { mode }
    }

    /// Engine whose sequences are replaced position by position without recursion.
    pub fn shallow() -> Self {
        Self::new(ArrayMode::ShallowMerge)
    }

    /// Engine whose sequences are concatenated.
    pub fn concat() -> Self {
        Self::new(ArrayMode::Concat)
    }

    /// Engine whose later sequences replace earlier ones.
    pub fn overwrite() -> Self {
        Self::new(ArrayMode::Overwrite)
    }

    /// Create an engine from a loaded configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.array_mode)
    }

    /// Create an engine from an array mode name.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `mode` is not a known array mode.
    pub fn from_mode_str(mode: &str) -> Result<Self> {
        mode.parse().map(Self::new)
    }

    /// Create an engine from an options record such as `{"arrayMode": "concat"}`.
    ///
    /// A missing or null `arrayMode` selects the default mode. Other keys are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the options are not a record, or if
    /// `arrayMode` is not a known mode name.
    pub fn from_options(options: &Value) -> Result<Self> {
        let map = match options {
            Value::Null => return Ok(Self::default()),
            Value::Record(map) => map,
            other => {
                return Err(DeepAssignError::Configuration(format!(
                    "engine options must be a record, found a {} value",
                    other.kind()
                )))
            }
        };

        match map.get(&Key::from(ARRAY_MODE_OPTION)) {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::String(mode)) => Self::from_mode_str(mode).map_err(|e| {
                debug!("Rejected merge engine options: {}", e);
                e
            }),
            Some(other) => Err(DeepAssignError::Configuration(format!(
                "invalid array mode: expected a string, found a {} value",
                other.kind()
            ))),
        }
    }

    /// The array reconciliation mode of this engine.
    pub fn array_mode(&self) -> ArrayMode {
        self.mode
    }

    /// Deep-merge `values` left to right into a new value.
    ///
    /// Leaves passed at the top level are ignored. With no records or
    /// sequences to merge, the result is an empty record. The configured
    /// array mode applies at every depth, including the top level.
    pub fn assign<'a, I>(&self, values: I) -> Value
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut merged: Option<Value> = None;
        let mut count = 0usize;

        for value in values.into_iter().filter(|v| v.is_structural()) {
            count += 1;
            merged = Some(match merged {
                None => value.clone(),
                Some(source) => self.reconcile(source, value),
            });
        }

        trace!("Assigned {} structural values with array mode {}", count, self.mode);
        merged.unwrap_or_else(Value::empty_record)
    }

    /// Deep copy of `value`; shorthand for assigning it alone.
    ///
    /// A leaf copies to an empty record.
    pub fn copy(&self, value: &Value) -> Value {
        self.assign([value])
    }

    /// Merge a single pair, `target` taking precedence over `source`.
    ///
    /// An absent side yields a copy of the other; two absent sides stay absent.
    pub fn resolve(&self, source: Option<&Value>, target: Option<&Value>) -> Option<Value> {
        match (source, target) {
            (None, None) => None,
            (Some(source), None) => Some(source.clone()),
            (None, Some(target)) => Some(target.clone()),
            (Some(source), Some(target)) => Some(self.reconcile(source.clone(), target)),
        }
    }

    /// Merge `target` into an owned `source`.
    fn reconcile(&self, source: Value, target: &Value) -> Value {
        match (source, target) {
            (Value::Record(source), Value::Record(target)) => {
                Value::Record(self.reconcile_records(source, target))
            }
            (Value::Sequence(source), Value::Sequence(target)) => {
                Value::Sequence(self.reconcile_sequences(source, target))
            }
            (_, target) => target.clone(),
        }
    }

    fn reconcile_records(&self, mut source: Record, target: &Record) -> Record {
        for (key, value) in target {
            match source.get_mut(key) {
                Some(slot) => {
                    let existing = std::mem::take(slot);
                    *slot = self.reconcile(existing, value);
                }
                None => {
                    source.insert(key.clone(), value.clone());
                }
            }
        }
        source
    }

    fn reconcile_sequences(&self, mut source: Vec<Value>, target: &[Value]) -> Vec<Value> {
        let shared = source.len().min(target.len());

        match self.mode {
            ArrayMode::Merge => {
                for (slot, value) in source.iter_mut().zip(target) {
                    let existing = std::mem::take(slot);
                    *slot = self.reconcile(existing, value);
                }
                source.extend_from_slice(&target[shared..]);
            }
            ArrayMode::ShallowMerge => {
                source[..shared].clone_from_slice(&target[..shared]);
                source.extend_from_slice(&target[shared..]);
            }
            ArrayMode::Concat => source.extend_from_slice(target),
            ArrayMode::Overwrite => source = target.to_vec(),
        }

        source
    }
}

/// Deep-merge `values` with the default engine.
pub fn merge<'a, I>(values: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    MergeEngine::default().assign(values)
}

/// Deep copy of `value` with the default engine.
pub fn copy(value: &Value) -> Value {
    MergeEngine::default().copy(value)
}
