//! Object-path access over structural values.
//!
//! Paths are strings of segments joined by a delimiter (`.` by default). A
//! segment names a record key, or a sequence index written as a decimal
//! number. Writes always operate on a deep copy of the input.
//!
//! In non-strict mode (the default) a path that cannot be followed yields an
//! absent result; in strict mode it is reported as
//! [`DeepAssignError::PathNotFound`] or [`DeepAssignError::PathConflict`].

use crate::merge::copy;
use deepassign_types::{DeepAssignError, Key, PathConfig, Result, Value, ValueKind};
use tracing::{debug, trace};

/// A path accessor pinned to a delimiter and failure policy.
///
/// # Example
///
/// ```
/// use deepassign_core::PathAccessor;
/// use deepassign_types::{DeepAssignError, Value};
/// use serde_json::json;
///
/// let record = Value::from(json!({"a": "leaf"}));
///
/// let lenient = PathAccessor::new();
/// assert_eq!(lenient.set(&record, "a.b", Value::from(1)).unwrap(), None);
///
/// let strict = PathAccessor::new().strict(true);
/// let err = strict.set(&record, "a.b", Value::from(1)).unwrap_err();
/// assert!(matches!(err, DeepAssignError::PathConflict { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAccessor {
    delimiter: String,
    strict: bool,
    clean_empty_parents: bool,
}

impl PathAccessor {
    /// Create an accessor with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accessor from a loaded configuration.
    pub fn from_config(config: &PathConfig) -> Self {
        Self {
            delimiter: config.delimiter.clone(),
            strict: config.strict,
            clean_empty_parents: config.clean_empty_parents,
        }
    }

    /// Use a different segment delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Raise path failures as errors instead of yielding absence.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether `delete` removes parent records left empty by the removal.
    pub fn clean_empty_parents(mut self, clean: bool) -> Self {
        self.clean_empty_parents = clean;
        self
    }

    /// The segment delimiter.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Whether this accessor is strict.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Split a path into segments. An empty delimiter never splits.
    pub(crate) fn segments<'p>(&self, path: &'p str) -> Vec<&'p str> {
        if self.delimiter.is_empty() {
            vec![path]
        } else {
            path.split(self.delimiter.as_str()).collect()
        }
    }

    pub(crate) fn join(&self, segments: &[&str]) -> String {
        segments.join(&self.delimiter)
    }

    /// Read the value at `path`.
    ///
    /// The returned value is borrowed from `record`, not copied.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `PathNotFound` naming the deepest prefix of
    /// `path` that resolved.
    pub fn get<'a>(&self, record: &'a Value, path: &str) -> Result<Option<&'a Value>> {
        let segments = self.segments(path);
        let mut current = record;

        for (depth, segment) in segments.iter().enumerate() {
            match current.child(segment) {
                Some(next) => current = next,
                None => {
                    self.not_found(path, &segments[..depth])?;
                    return Ok(None);
                }
            }
        }

        Ok(Some(current))
    }

    /// Whether `path` resolves in `record`. Never fails, even when strict.
    pub fn contains(&self, record: &Value, path: &str) -> bool {
        matches!(self.clone().strict(false).get(record, path), Ok(Some(_)))
    }

    /// Return a copy of `record` with `value` stored at `path`.
    ///
    /// Missing intermediate segments are created as empty records. A leaf in
    /// the way is a conflict: the result is `None`, or an error when strict.
    /// Writing past the end of a sequence pads it with `Null`; an index more
    /// than [`MAX_SEQUENCE_GAP`] past the end is a conflict too.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `PathConflict` naming the blocking prefix and
    /// the kind of value found there.
    pub fn set(&self, record: &Value, path: &str, value: Value) -> Result<Option<Value>> {
        let mut updated = copy(record);
        Ok(self.set_in_place(&mut updated, path, value)?.then_some(updated))
    }

    /// Store `value` at `path` inside `target`.
    ///
    /// Returns `false` on a non-strict conflict. Conflicts are detected before
    /// anything is created, so a failed write leaves `target` untouched.
    pub(crate) fn set_in_place(&self, target: &mut Value, path: &str, value: Value) -> Result<bool> {
        let segments = self.segments(path);
        let Some((last, parents)) = segments.split_last() else {
            return Ok(false);
        };

        let mut current = target;
        for (depth, segment) in parents.iter().enumerate() {
            let next = match current {
                Value::Record(map) => map
                    .entry(Key::from(*segment))
                    .or_insert_with(Value::empty_record),
                Value::Sequence(items) => match writable_index(segment, items.len()) {
                    Some(index) => sequence_slot(items, index),
                    None => return self.conflict(&segments[..depth], ValueKind::Sequence),
                },
                other => return self.conflict(&segments[..depth], other.kind()),
            };
            if !next.is_structural() {
                return self.conflict(&segments[..=depth], next.kind());
            }
            current = next;
        }

        match current {
            Value::Record(map) => {
                map.insert(Key::from(*last), value);
            }
            Value::Sequence(items) => match writable_index(last, items.len()) {
                Some(index) if index < items.len() => items[index] = value,
                Some(index) => {
                    items.resize(index, Value::Null);
                    items.push(value);
                }
                None => return self.conflict(parents, ValueKind::Sequence),
            },
            other => return self.conflict(parents, other.kind()),
        }

        Ok(true)
    }

    /// Return a copy of `record` with the value at `path` removed.
    ///
    /// When parent cleanup is on, a parent record left empty is removed from
    /// its own parent, repeatedly, up to (not including) the top level.
    /// Removing a sequence index shifts the later elements down.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `PathNotFound` if `path` does not resolve.
    pub fn delete(&self, record: &Value, path: &str) -> Result<Value> {
        let mut updated = copy(record);
        let segments = self.segments(path);
        self.remove(&mut updated, path, &segments, 0)?;
        Ok(updated)
    }

    fn remove(&self, node: &mut Value, path: &str, segments: &[&str], depth: usize) -> Result<bool> {
        let segment = segments[depth];

        if depth + 1 == segments.len() {
            let removed = remove_child(node, segment);
            if !removed {
                self.not_found(path, &segments[..depth])?;
            }
            return Ok(removed);
        }

        let Some(child) = node.child_mut(segment) else {
            self.not_found(path, &segments[..depth])?;
            return Ok(false);
        };

        let removed = self.remove(child, path, segments, depth + 1)?;
        if removed && self.clean_empty_parents && child.is_record() && child.is_empty_structure() {
            trace!("Removing emptied parent '{}'", self.join(&segments[..=depth]));
            remove_child(node, segment);
        }

        Ok(removed)
    }

    /// Build a new record from selected paths of `record`.
    ///
    /// A plain path copies its value under the path string itself as a
    /// top-level key; a renamed extraction writes it at the destination path.
    /// Paths that do not resolve are skipped. In strict mode any failure
    /// aborts the whole extraction and yields `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use deepassign_core::{Extraction, PathAccessor};
    /// use deepassign_types::Value;
    /// use serde_json::json;
    ///
    /// let record = Value::from(json!({"person": {"name": "x", "age": 3}}));
    /// let picked = PathAccessor::new()
    ///     .extract(&record, [Extraction::renamed("name", "person.name"), "person.age".into()])
    ///     .unwrap();
    /// assert_eq!(picked, Value::from(json!({"name": "x", "person.age": 3})));
    /// ```
    pub fn extract<I>(&self, record: &Value, requests: I) -> Option<Value>
    where
        I: IntoIterator,
        I::Item: Into<Extraction>,
    {
        let mut result = Value::empty_record();

        for request in requests {
            let request = request.into();
            let found = match self.get(record, request.source()) {
                Ok(Some(found)) => found.clone(),
                Ok(None) => continue,
                Err(e) => {
                    debug!("Extraction aborted: {}", e);
                    return None;
                }
            };

            match request {
                Extraction::Path(path) => {
                    if let Some(map) = result.as_record_mut() {
                        map.insert(Key::from(path), found);
                    }
                }
                Extraction::Renamed { destination, .. } => {
                    match self.set_in_place(&mut result, &destination, found) {
                        Ok(true) => {}
                        Ok(false) => debug!("Skipped extraction into '{}'", destination),
                        Err(e) => {
                            debug!("Extraction aborted: {}", e);
                            return None;
                        }
                    }
                }
            }
        }

        Some(result)
    }

    fn not_found(&self, path: &str, resolved: &[&str]) -> Result<()> {
        if self.strict {
            return Err(DeepAssignError::PathNotFound {
                path: path.to_string(),
                resolved: self.join(resolved),
            });
        }
        trace!("Path '{}' not found", path);
        Ok(())
    }

    fn conflict(&self, prefix: &[&str], found: ValueKind) -> Result<bool> {
        let path = self.join(prefix);
        if self.strict {
            return Err(DeepAssignError::PathConflict { path, found });
        }
        debug!("Cannot descend into {} value at '{}'", found, path);
        Ok(false)
    }
}

impl Default for PathAccessor {
    fn default() -> Self {
        Self::from_config(&PathConfig::default())
    }
}

/// Largest number of `Null` slots a single write may pad a sequence with.
pub const MAX_SEQUENCE_GAP: usize = 1024;

/// Parse a sequence index for writing. Indices more than [`MAX_SEQUENCE_GAP`]
/// past the end are rejected.
fn writable_index(segment: &str, len: usize) -> Option<usize> {
    segment
        .parse::<usize>()
        .ok()
        .filter(|index| index.saturating_sub(len) <= MAX_SEQUENCE_GAP)
}

/// Slot for an intermediate sequence segment, creating an empty record past the end.
fn sequence_slot(items: &mut Vec<Value>, index: usize) -> &mut Value {
    if index >= items.len() {
        items.resize(index, Value::Null);
        items.push(Value::empty_record());
    }
    &mut items[index]
}

fn remove_child(node: &mut Value, segment: &str) -> bool {
    match node {
        Value::Record(map) => map.shift_remove(&Key::from(segment)).is_some(),
        Value::Sequence(items) => match segment.parse::<usize>() {
            Ok(index) if index < items.len() => {
                items.remove(index);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

/// One entry of an extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Copy the value at this path under the path string as a top-level key
    Path(String),
    /// Copy the value at `source` to the nested `destination` path
    Renamed {
        /// Where the value is written in the result
        destination: String,
        /// Where the value is read from
        source: String,
    },
}

impl Extraction {
    /// A renamed extraction.
    pub fn renamed(destination: impl Into<String>, source: impl Into<String>) -> Self {
        Extraction::Renamed {
            destination: destination.into(),
            source: source.into(),
        }
    }

    /// The path this extraction reads from.
    pub fn source(&self) -> &str {
        match self {
            Extraction::Path(path) => path,
            Extraction::Renamed { source, .. } => source,
        }
    }

    /// Parse an extraction request written as data.
    ///
    /// Accepts a path string, a single-key `{destination: source}` record, or
    /// a sequence mixing both.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for any other shape.
    pub fn list_from_value(spec: &Value) -> Result<Vec<Extraction>> {
        match spec {
            Value::Sequence(items) => items.iter().map(Extraction::try_from).collect(),
            other => Ok(vec![Extraction::try_from(other)?]),
        }
    }
}

impl From<&str> for Extraction {
    fn from(path: &str) -> Self {
        Extraction::Path(path.to_string())
    }
}

impl From<String> for Extraction {
    fn from(path: String) -> Self {
        Extraction::Path(path)
    }
}

impl From<(&str, &str)> for Extraction {
    fn from((destination, source): (&str, &str)) -> Self {
        Extraction::renamed(destination, source)
    }
}

impl TryFrom<&Value> for Extraction {
    type Error = DeepAssignError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(path) => Ok(Extraction::Path(path.clone())),
            Value::Record(map) if map.len() == 1 => match map.iter().next() {
                Some((Key::Name(destination), Value::String(source))) => {
                    Ok(Extraction::renamed(destination.as_str(), source.as_str()))
                }
                _ => Err(DeepAssignError::Configuration(
                    "extraction mapping must map a destination name to a source path".to_string(),
                )),
            },
            other => Err(DeepAssignError::Configuration(format!(
                "extraction entries must be a path or a single-key mapping, found a {} value",
                other.kind()
            ))),
        }
    }
}

/// Read the value at `path` with the default accessor.
pub fn get<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    PathAccessor::default().get(record, path).ok().flatten()
}

/// Copy `record` with `value` stored at `path`, or `None` on a conflict.
pub fn set(record: &Value, path: &str, value: Value) -> Option<Value> {
    PathAccessor::default().set(record, path, value).ok().flatten()
}

/// Copy `record` without the value at `path`, cleaning up emptied parents.
pub fn delete(record: &Value, path: &str) -> Value {
    PathAccessor::default()
        .delete(record, path)
        .unwrap_or_else(|_| copy(record))
}

/// Extract paths from `record` with the default accessor.
pub fn extract<I>(record: &Value, requests: I) -> Option<Value>
where
    I: IntoIterator,
    I::Item: Into<Extraction>,
{
    PathAccessor::default().extract(record, requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_get_nested() {
        let record = v(json!({"a": {"b": [10, {"c": "deep"}]}}));
        assert_eq!(get(&record, "a.b.1.c"), Some(&v(json!("deep"))));
        assert_eq!(get(&record, "a.b.0"), Some(&v(json!(10))));
        assert_eq!(get(&record, "a.x.c"), None);
        assert_eq!(get(&record, "a.b.9"), None);
        assert_eq!(get(&record, "a.b.0.z"), None);
    }

    #[test]
    fn test_get_strict_names_resolved_prefix() {
        let record = v(json!({"a": {"b": {}}}));
        let err = PathAccessor::new().strict(true).get(&record, "a.b.c.d").unwrap_err();
        match err {
            DeepAssignError::PathNotFound { path, resolved } => {
                assert_eq!(path, "a.b.c.d");
                assert_eq!(resolved, "a.b");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = PathAccessor::new().strict(true).get(&record, "zz").unwrap_err();
        assert!(matches!(err, DeepAssignError::PathNotFound { resolved, .. } if resolved.is_empty()));
    }

    #[test]
    fn test_get_custom_delimiter() {
        let record = v(json!({"a": {"b.c": 1, "b": {"c": 2}}}));
        let slash = PathAccessor::new().with_delimiter("/");
        assert_eq!(slash.get(&record, "a/b.c").unwrap(), Some(&v(json!(1))));
        assert_eq!(get(&record, "a.b.c"), Some(&v(json!(2))));
    }

    #[test]
    fn test_contains() {
        let record = v(json!({"a": {"b": null}}));
        let strict = PathAccessor::new().strict(true);
        assert!(strict.contains(&record, "a.b"));
        assert!(!strict.contains(&record, "a.c"));
    }

    #[test]
    fn test_get_set_round_trip() {
        let updated = set(&Value::empty_record(), "a.b.c", v(json!(5))).unwrap();
        assert_eq!(get(&updated, "a.b.c"), Some(&v(json!(5))));
        assert_eq!(updated, v(json!({"a": {"b": {"c": 5}}})));
    }

    #[test]
    fn test_set_does_not_mutate_input() {
        let record = v(json!({"a": {"b": 1}}));
        let updated = set(&record, "a.c", v(json!(2))).unwrap();
        assert_eq!(record, v(json!({"a": {"b": 1}})));
        assert_eq!(updated, v(json!({"a": {"b": 1, "c": 2}})));
    }

    #[test]
    fn test_set_top_level_and_replace() {
        let record = v(json!({"a": {"b": 1}}));
        assert_eq!(set(&record, "x", v(json!(true))).unwrap(), v(json!({"a": {"b": 1}, "x": true})));
        assert_eq!(set(&record, "a", v(json!(0))).unwrap(), v(json!({"a": 0})));
    }

    #[test]
    fn test_set_conflict_non_strict() {
        assert_eq!(set(&v(json!({"a": "leaf"})), "a.b", v(json!(1))), None);
        assert_eq!(set(&v(json!({"a": null})), "a.b", v(json!(1))), None);
    }

    #[test]
    fn test_set_conflict_strict() {
        let strict = PathAccessor::new().strict(true);
        let err = strict.set(&v(json!({"a": {"b": "leaf"}})), "a.b.c.d", v(json!(1))).unwrap_err();
        match err {
            DeepAssignError::PathConflict { path, found } => {
                assert_eq!(path, "a.b");
                assert_eq!(found, ValueKind::String);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_set_into_sequences() {
        let record = v(json!({"list": [1, {"x": 1}]}));
        assert_eq!(set(&record, "list.0", v(json!(9))).unwrap(), v(json!({"list": [9, {"x": 1}]})));
        assert_eq!(set(&record, "list.1.y", v(json!(2))).unwrap(), v(json!({"list": [1, {"x": 1, "y": 2}]})));
        assert_eq!(set(&record, "list.3", v(json!(7))).unwrap(), v(json!({"list": [1, {"x": 1}, null, 7]})));
        assert_eq!(set(&record, "list.2.z", v(json!(1))).unwrap(), v(json!({"list": [1, {"x": 1}, {"z": 1}]})));
        assert_eq!(set(&record, "list.0.z", v(json!(1))), None);
        assert_eq!(set(&record, "list.name", v(json!(1))), None);
    }

    #[test]
    fn test_set_on_leaf_root_copies_to_record() {
        assert_eq!(set(&v(json!("leaf")), "a", v(json!(1))).unwrap(), v(json!({"a": 1})));
    }

    #[test]
    fn test_delete_with_cleanup() {
        let record = v(json!({"a": {"b": 1}}));
        assert_eq!(delete(&record, "a.b"), Value::empty_record());

        let keep = PathAccessor::new().clean_empty_parents(false);
        assert_eq!(keep.delete(&record, "a.b").unwrap(), v(json!({"a": {}})));
        assert_eq!(record, v(json!({"a": {"b": 1}})));
    }

    #[test]
    fn test_delete_cleanup_stops_at_non_empty_ancestor() {
        let record = v(json!({"a": {"keep": true, "b": {"c": {"d": 1}}}}));
        assert_eq!(delete(&record, "a.b.c.d"), v(json!({"a": {"keep": true}})));
    }

    #[test]
    fn test_delete_missing() {
        let record = v(json!({"a": {"b": 1}}));
        assert_eq!(delete(&record, "a.x"), record);
        assert_eq!(delete(&record, "x.y.z"), record);

        let strict = PathAccessor::new().strict(true);
        let err = strict.delete(&record, "a.x").unwrap_err();
        assert!(matches!(err, DeepAssignError::PathNotFound { resolved, .. } if resolved == "a"));
        assert!(strict.delete(&record, "x.y").is_err());

        // Nothing removed, so an already-empty parent stays.
        let hollow = v(json!({"a": {}}));
        assert_eq!(delete(&hollow, "a.b"), hollow);
    }

    #[test]
    fn test_set_rejects_distant_sequence_index() {
        let record = v(json!({"list": []}));
        assert_eq!(set(&record, "list.18446744073709551615", v(json!(1))), None);
        assert_eq!(set(&record, "list.4000000000.x", v(json!(1))), None);

        let edge = set(&record, &format!("list.{}", MAX_SEQUENCE_GAP), v(json!(1))).unwrap();
        assert_eq!(edge.child("list").and_then(Value::as_sequence).map(<[Value]>::len), Some(MAX_SEQUENCE_GAP + 1));

        let strict = PathAccessor::new().strict(true);
        let err = strict.set(&record, "list.18446744073709551615", v(json!(1))).unwrap_err();
        assert!(matches!(err, DeepAssignError::PathConflict { path, found: ValueKind::Sequence } if path == "list"));
    }

    #[test]
    fn test_delete_sequence_index() {
        let record = v(json!({"list": [1, 2, 3]}));
        assert_eq!(delete(&record, "list.1"), v(json!({"list": [1, 3]})));
    }

    #[test]
    fn test_extract_with_rename() {
        let record = v(json!({"person": {"name": "x"}}));
        let picked = extract(&record, [Extraction::renamed("name", "person.name")]).unwrap();
        assert_eq!(picked, v(json!({"name": "x"})));
    }

    #[test]
    fn test_extract_mixed() {
        let record = v(json!({"person": {"name": "x", "address": {"city": "y"}}, "id": 7}));
        let picked = extract(
            &record,
            vec![
                Extraction::from("id"),
                Extraction::from(("location.city", "person.address.city")),
                Extraction::from("missing.path"),
            ],
        )
        .unwrap();
        assert_eq!(picked, v(json!({"id": 7, "location": {"city": "y"}})));
        assert_eq!(record.child("id"), Some(&v(json!(7))));
    }

    #[test]
    fn test_extract_strict_aborts() {
        let record = v(json!({"a": 1}));
        let strict = PathAccessor::new().strict(true);
        assert_eq!(strict.extract(&record, ["a", "b"]), None);
        assert_eq!(strict.extract(&record, ["a"]), Some(v(json!({"a": 1}))));

        // Destination conflict.
        assert_eq!(strict.extract(&record, [("x", "a"), ("x.y", "a")]), None);
        assert_eq!(extract(&record, [("x", "a"), ("x.y", "a")]), Some(v(json!({"x": 1}))));
    }

    #[test]
    fn test_extraction_from_value() {
        let spec = v(json!(["id", {"name": "person.name"}]));
        let list = Extraction::list_from_value(&spec).unwrap();
        assert_eq!(list, vec![Extraction::from("id"), Extraction::renamed("name", "person.name")]);

        assert_eq!(Extraction::list_from_value(&v(json!("a.b"))).unwrap(), vec![Extraction::from("a.b")]);
        assert!(Extraction::list_from_value(&v(json!({"a": "b", "c": "d"}))).is_err());
        assert!(Extraction::list_from_value(&v(json!([1]))).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = PathConfig {
            delimiter: ":".to_string(),
            strict: true,
            clean_empty_parents: false,
        };
        let accessor = PathAccessor::from_config(&config);
        assert_eq!(accessor.delimiter(), ":");
        assert!(accessor.is_strict());
        assert_eq!(
            accessor.delete(&v(json!({"a": {"b": 1}})), "a:b").unwrap(),
            v(json!({"a": {}}))
        );
    }
}
