//! Decoded field values.

use serde::Serialize;

/// A scalar or an arbitrarily nested list of scalars.
///
/// Serializes the way `ndarray.tolist()` does: numbers stay numbers and each
/// array axis becomes one level of JSON list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Build a nested value of `shape` from row-major items.
    ///
    /// An empty shape yields the next item itself. Missing items collapse to
    /// empty lists; callers check the item count against the shape first.
    pub fn nest<I>(items: &mut I, shape: &[usize]) -> FieldValue
    where
        I: Iterator<Item = FieldValue>,
    {
        match shape.split_first() {
            None => items.next().unwrap_or(FieldValue::List(Vec::new())),
            Some((&len, rest)) => FieldValue::List((0..len).map(|_| Self::nest(items, rest)).collect()),
        }
    }

    /// First element along the outermost axis; scalars are returned as-is and
    /// an empty list stays an empty list.
    pub fn into_first(self) -> FieldValue {
        match self {
            FieldValue::List(items) => {
                items.into_iter().next().unwrap_or(FieldValue::List(Vec::new()))
            }
            scalar => scalar,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<Vec<f64>> for FieldValue {
    fn from(values: Vec<f64>) -> Self {
        FieldValue::List(values.into_iter().map(FieldValue::Float).collect())
    }
}
