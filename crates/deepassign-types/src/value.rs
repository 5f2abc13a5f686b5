//! The structural value model.
//!
//! Every value is decided at construction time to be a leaf, a [`Record`], or
//! a sequence. Only records and sequences carry mergeable structure; leaves
//! (including [`Opaque`] host objects) are replaced wholesale and shared by
//! reference when copied.

use crate::enums::ValueKind;
use crate::errors::{DeepAssignError, Result};
use crate::key::Key;
use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Number;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An associative record. Iteration follows insertion order; equality does not.
pub type Record = IndexMap<Key, Value>;

/// An opaque host object carried as a leaf.
///
/// Cloning an `Opaque` shares the underlying object, so copies produced by the
/// merge engine point at the same instance as the input.
#[derive(Clone)]
pub struct Opaque {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Opaque {
    /// Wrap a host object.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Borrow the wrapped object if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// The Rust type name of the wrapped object.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both handles point at the same object.
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.inner) as *const (),
            Arc::as_ptr(&other.inner) as *const (),
        )
    }

    /// Number of handles sharing the wrapped object.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque<{}>", self.type_name)
    }
}

/// A structural value: a leaf, a record, or a sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Null leaf
    #[default]
    Null,
    /// Boolean leaf
    Bool(bool),
    /// Numeric leaf
    Number(Number),
    /// String leaf
    String(String),
    /// Opaque host object leaf
    Opaque(Opaque),
    /// Associative record
    Record(Record),
    /// Ordered sequence
    Sequence(Vec<Value>),
}

impl Value {
    /// A new empty record.
    pub fn empty_record() -> Self {
        Value::Record(Record::new())
    }

    /// A new empty sequence.
    pub fn empty_sequence() -> Self {
        Value::Sequence(Vec::new())
    }

    /// Build a record from key/value pairs.
    pub fn record<K, V, I>(entries: I) -> Self
    where
        K: Into<Key>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Record(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Wrap a host object as an opaque leaf.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Value::Opaque(Opaque::new(value))
    }

    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Opaque(_) => ValueKind::Opaque,
            Value::Record(_) => ValueKind::Record,
            Value::Sequence(_) => ValueKind::Sequence,
        }
    }

    /// Whether this value is a record or a sequence.
    pub fn is_structural(&self) -> bool {
        self.kind().is_structural()
    }

    /// Whether this value is a record.
    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// Whether this value is a sequence.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    /// Whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value is a record or sequence with no entries.
    pub fn is_empty_structure(&self) -> bool {
        match self {
            Value::Record(map) => map.is_empty(),
            Value::Sequence(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Borrow as a record.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(map) => Some(map),
            _ => None,
        }
    }

    /// Mutably borrow as a record.
    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow as a sequence.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as a signed integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Get as a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Borrow as an opaque host object.
    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Value::Opaque(o) => Some(o),
            _ => None,
        }
    }

    /// Look up a single path segment: a record key, or a sequence index.
    pub fn child(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Record(map) => map.get(&Key::from(segment)),
            Value::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Mutable variant of [`Value::child`].
    pub fn child_mut(&mut self, segment: &str) -> Option<&mut Value> {
        match self {
            Value::Record(map) => map.get_mut(&Key::from(segment)),
            Value::Sequence(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(move |i| items.get_mut(i)),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value`.
    ///
    /// Symbol-keyed entries are skipped. Opaque leaves have no JSON form and
    /// fail the conversion.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Opaque(o) => {
                return Err(DeepAssignError::Serialization(format!(
                    "opaque {} value has no JSON representation",
                    o.type_name()
                )))
            }
            Value::Sequence(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Result<Vec<_>>>()?,
            ),
            Value::Record(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    if let Key::Name(name) = key {
                        object.insert(name.clone(), value.to_json()?);
                    }
                }
                serde_json::Value::Object(object)
            }
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Record(
                map.into_iter()
                    .map(|(key, value)| (Key::Name(key), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no numeric representation and become null.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<Record> for Value {
    fn from(map: Record) -> Self {
        Value::Record(map)
    }
}

impl From<Opaque> for Value {
    fn from(opaque: Opaque) -> Self {
        Value::Opaque(opaque)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Sequence(iter.into_iter().collect())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Opaque(o) => Err(S::Error::custom(format!(
                "opaque {} value cannot be serialized",
                o.type_name()
            ))),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(map) => {
                let named: Vec<(&str, &Value)> = map
                    .iter()
                    .filter_map(|(key, value)| key.as_name().map(|name| (name, value)))
                    .collect();
                let mut out = serializer.serialize_map(Some(named.len()))?;
                for (name, value) in named {
                    out.serialize_entry(name, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Symbol;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({"a": [1, "two", null], "b": {"c": true}}));
        let record = value.as_record().unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(value.child("a").and_then(|a| a.child("1")), Some(&Value::from("two")));
        assert_eq!(value.child("b").and_then(|b| b.child("c")), Some(&Value::Bool(true)));
        assert_eq!(value.child("a").and_then(|a| a.child("x")), None);
        assert_eq!(value.child("missing"), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(Value::from(1.5).kind(), ValueKind::Number);
        assert_eq!(Value::from(f64::NAN), Value::Null);
        assert!(Value::empty_record().is_empty_structure());
        assert!(!Value::from("x").is_structural());
        assert!(Value::empty_sequence().is_structural());
    }

    #[test]
    fn test_record_equality_ignores_order() {
        let a = Value::record([("x", 1), ("y", 2)]);
        let b = Value::record([("y", 2), ("x", 1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_opaque_shared_on_clone() {
        let value = Value::opaque(vec![1u8, 2, 3]);
        let copy = value.clone();
        let (a, b) = (value.as_opaque().unwrap(), copy.as_opaque().unwrap());
        assert!(a.ptr_eq(b));
        assert_eq!(a.handle_count(), 2);
        assert_eq!(b.downcast_ref::<Vec<u8>>(), Some(&vec![1u8, 2, 3]));

        assert_ne!(Value::opaque(1u8), Value::opaque(1u8));
    }

    #[test]
    fn test_serialize_skips_symbols() {
        let mut record = Record::new();
        record.insert(Key::from("visible"), Value::from(1));
        record.insert(Key::from(Symbol::new("hidden")), Value::from(2));
        let value = Value::Record(record);

        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"visible": 1}));
        assert_eq!(value.to_json().unwrap(), json!({"visible": 1}));
    }

    #[test]
    fn test_opaque_not_serializable() {
        let value = Value::record([("handle", Value::opaque(42u32))]);
        assert!(serde_json::to_string(&value).is_err());
        assert!(matches!(value.to_json(), Err(DeepAssignError::Serialization(_))));
    }

    #[test]
    fn test_deserialize_yaml() {
        let value: Value = serde_yaml::from_str("server:\n  port: 8080\n  hosts: [a, b]\n").unwrap();
        assert_eq!(value, Value::from(json!({"server": {"port": 8080, "hosts": ["a", "b"]}})));
    }

    #[test]
    fn test_child_mut() {
        let mut value = Value::from(json!({"list": [1, 2]}));
        *value.child_mut("list").and_then(|l| l.child_mut("0")).unwrap() = Value::from(9);
        assert_eq!(value, Value::from(json!({"list": [9, 2]})));
    }

    fn arb_json() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::from),
            any::<i64>().prop_map(serde_json::Value::from),
            any::<f64>()
                .prop_filter("finite", |f| f.is_finite())
                .prop_map(serde_json::Value::from),
            "[a-z ]{0,8}".prop_map(serde_json::Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                    .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_json_round_trip(json in arb_json()) {
            let value = Value::from(json.clone());
            prop_assert_eq!(value.to_json().unwrap(), json.clone());
            prop_assert_eq!(serde_json::to_value(&value).unwrap(), json);
        }

        #[test]
        fn prop_deserialize_matches_from_json(json in arb_json()) {
            let text = serde_json::to_string(&json).unwrap();
            let parsed: Value = serde_json::from_str(&text).unwrap();
            let reparsed: serde_json::Value = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(parsed, Value::from(reparsed));
        }
    }
}
