//! Proptest strategies for structural values.

use deepassign_types::{Key, Value};
use proptest::prelude::*;

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
    ]
}

fn record_from(entries: Vec<(String, Value)>) -> Value {
    Value::Record(entries.into_iter().map(|(k, v)| (Key::from(k), v)).collect())
}

/// Arbitrary values nested a few levels deep. Record keys never contain `.`.
pub(crate) fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Sequence),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..5).prop_map(record_from),
        ]
    })
}

/// Arbitrary records.
pub(crate) fn arb_record() -> impl Strategy<Value = Value> {
    prop::collection::vec(("[a-z]{1,6}", arb_value()), 0..6).prop_map(record_from)
}

/// Arbitrary records or sequences.
pub(crate) fn arb_structure() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_record(),
        prop::collection::vec(arb_value(), 0..6).prop_map(Value::Sequence),
    ]
}
