//! Flattening nested records into single-level path-keyed records, and back.

use crate::path::PathAccessor;
use deepassign_types::{Key, Record, Value};
use std::convert::Infallible;
use tracing::debug;

impl PathAccessor {
    /// Flatten `record` into a single-level record keyed by full paths.
    ///
    /// Nested records are walked; sequences and empty records are kept whole
    /// as values. A non-empty `prefix` is joined in front of every key.
    /// Symbol-keyed entries have no path and are left out.
    pub fn flat(&self, record: &Value, prefix: &str) -> Value {
        match self.flat_with(record, prefix, |_, value, _| Ok::<bool, Infallible>(value.is_record())) {
            Ok(flat) => flat,
            Err(never) => match never {},
        }
    }

    /// Flatten `record`, asking `should_flatten` before descending into each
    /// nested record or sequence.
    ///
    /// The predicate receives the candidate's own key (a record key, or a
    /// sequence index), its value, and its full path. When it answers `false`
    /// the candidate is kept whole. Errors from the
    /// predicate are returned unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use deepassign_core::PathAccessor;
    /// use deepassign_types::Value;
    /// use serde_json::json;
    ///
    /// let record = Value::from(json!({"db": {"hosts": ["a", "b"], "opts": {"ssl": true}}}));
    /// let flat = PathAccessor::new()
    ///     .flat_with(&record, "", |key, _, _| Ok::<_, String>(key != "opts"))
    ///     .unwrap();
    /// assert_eq!(flat, Value::from(json!({
    ///     "db.hosts.0": "a",
    ///     "db.hosts.1": "b",
    ///     "db.opts": {"ssl": true},
    /// })));
    /// ```
    pub fn flat_with<F, E>(&self, record: &Value, prefix: &str, mut should_flatten: F) -> Result<Value, E>
    where
        F: FnMut(&str, &Value, &str) -> Result<bool, E>,
    {
        let mut out = Record::new();
        self.flatten_into(record, prefix, &mut out, &mut should_flatten)?;
        Ok(Value::Record(out))
    }

    fn flatten_into<F, E>(
        &self,
        node: &Value,
        prefix: &str,
        out: &mut Record,
        should_flatten: &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(&str, &Value, &str) -> Result<bool, E>,
    {
        let children: Vec<(String, &Value)> = match node {
            Value::Record(map) => map
                .iter()
                .filter_map(|(key, value)| key.as_name().map(|name| (name.to_string(), value)))
                .collect(),
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), value))
                .collect(),
            _ => return Ok(()),
        };

        for (key, value) in children {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, self.delimiter(), key)
            };

            if value.is_structural() && !value.is_empty_structure() && should_flatten(&key, value, &path)? {
                self.flatten_into(value, &path, out, should_flatten)?;
            } else {
                out.insert(Key::Name(path), value.clone());
            }
        }

        Ok(())
    }

    /// Rebuild a nested record from a flat one by setting each key as a path.
    ///
    /// Keys are applied in order. A key that conflicts with an earlier one
    /// (e.g. `a` holding a leaf, then `a.b`) is skipped, or reported when
    /// strict. Symbol keys are copied across unchanged.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `PathConflict` for the first conflicting key.
    pub fn unflat(&self, flat: &Value) -> deepassign_types::Result<Value> {
        let mut result = Value::empty_record();
        let Some(entries) = flat.as_record() else {
            return Ok(result);
        };

        for (key, value) in entries {
            match key {
                Key::Name(path) => {
                    if !self.set_in_place(&mut result, path, value.clone())? {
                        debug!("Skipped conflicting flat key '{}'", path);
                    }
                }
                Key::Symbol(_) => {
                    if let Some(map) = result.as_record_mut() {
                        map.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        Ok(result)
    }
}

/// Flatten `record` with the default accessor.
pub fn flat(record: &Value) -> Value {
    PathAccessor::default().flat(record, "")
}

/// Unflatten `flat` with the default accessor, skipping conflicting keys.
pub fn unflat(flat: &Value) -> Value {
    PathAccessor::default()
        .unflat(flat)
        .unwrap_or_else(|_| Value::empty_record())
}
