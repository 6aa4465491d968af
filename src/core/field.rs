//! Field values, semantic kinds, and the record representation

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A polymorphic field value that can hold different types
///
/// Records hand their fields to the query layer as `FieldValue`s; the
/// serializer and the in-memory predicate evaluator both dispatch on the
/// variant rather than on runtime reflection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float, widening integers and decimals
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Decimal(d) => {
                use rust_decimal::prelude::ToPrimitive;
                d.to_f64()
            }
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

/// The declared semantic kind of a field
///
/// Schemas map every field name to a kind; the serializer and predicate
/// compiler consume the declaration instead of introspecting column types
/// at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    /// Fixed-precision numeric, serialized as a float for transport
    Decimal,
    Boolean,
    /// Calendar date, no time component
    Date,
    /// Date and time, wall-clock in the configured offset
    Timestamp,
    /// Foreign key to another domain type
    Reference,
}

/// A domain record as seen by the query layer: an ordered field map
///
/// Records are request-scoped. Field order follows insertion order, which
/// by convention is the schema's declared order.
pub type Record = IndexMap<String, FieldValue>;
