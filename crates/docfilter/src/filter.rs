use crate::operator::{Operator, Symbol};
use chrono::{DateTime, Utc};
use derive_more::{Deref, DerefMut};
use serde::Serialize;
use std::collections::BTreeMap;

///
/// Value
///
/// A typed filter operand. `Primitive` wraps a driver-constructed value
/// (compiled regex, object identifier); everything else serializes to its
/// natural JSON shape.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value<V> {
    Bool(bool),
    Int(i64),
    Double(f64),
    Date(DateTime<Utc>),
    String(String),
    Primitive(V),
    Array(Vec<Value<V>>),
}

///
/// FieldEntry
///
/// What a single field compiles to: either a bare scalar (plain equality) or
/// a nested operator document keyed by database symbols.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldEntry<V> {
    Scalar(Value<V>),
    Operators(BTreeMap<Symbol, Value<V>>),
}

///
/// Filter
///

#[derive(Clone, Debug, Deref, DerefMut, PartialEq, Serialize)]
pub struct Filter<V>(BTreeMap<String, FieldEntry<V>>);

impl<V> Filter<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Folds one converted operand into the document.
    ///
    /// Bare equality overwrites a bare scalar; any other operator promotes an
    /// existing scalar under `$eq` first. When two operators land on the same
    /// symbol their values merge into one flat array in first-seen order, so
    /// `co` and `sw` contributions (both compile to `$eq`) accumulate instead
    /// of clobbering each other.
    pub fn add(&mut self, field: impl Into<String>, op: Operator, value: Value<V>) {
        let field = field.into();
        let symbol = op.symbol();

        let mut operators = match self.0.remove(&field) {
            Some(FieldEntry::Operators(operators)) => operators,
            Some(FieldEntry::Scalar(existing)) => {
                if op == Operator::Eq {
                    self.0.insert(field, FieldEntry::Scalar(value));
                    return;
                }
                let mut operators = BTreeMap::new();
                operators.insert(Symbol::Eq, existing);
                operators
            }
            None => {
                if op == Operator::Eq {
                    self.0.insert(field, FieldEntry::Scalar(value));
                    return;
                }
                BTreeMap::new()
            }
        };

        let merged = match operators.remove(&symbol) {
            Some(existing) => append_array(existing, value),
            None => value,
        };
        operators.insert(symbol, merged);

        self.0.insert(field, FieldEntry::Operators(operators));
    }
}

impl<V> Default for Filter<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Flattens both sides into a single array, keeping first-seen order.
fn append_array<V>(existing: Value<V>, incoming: Value<V>) -> Value<V> {
    let mut items = match existing {
        Value::Array(items) => items,
        scalar => vec![scalar],
    };

    match incoming {
        Value::Array(more) => items.extend(more),
        scalar => items.push(scalar),
    }

    Value::Array(items)
}

///
/// TESTS
///
