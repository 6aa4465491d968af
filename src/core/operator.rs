//! Filter operator whitelist and predicate compilation
//!
//! Operators arrive from clients as raw strings inside filter triples.
//! Instead of a dynamic string-to-closure dispatch table, the whitelist is a
//! closed enum validated at parse time; anything outside it fails with
//! [`QueryError::InvalidOperator`] carrying the exact offending string.

use crate::core::error::QueryError;
use crate::core::field::FieldValue;
use crate::core::schema::Schema;
use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The fixed whitelist of filter operators
///
/// Wire spellings are the serde renames. `like`/`ilike` implicitly wrap the
/// value as `%value%`, so they reduce to substring matching (`ilike`
/// case-insensitive). The `~` prefix negates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "~contains")]
    NotContains,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "~like")]
    NotLike,
    #[serde(rename = "ilike")]
    ILike,
    #[serde(rename = "~ilike")]
    NotILike,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "~in")]
    NotIn,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
}

impl FilterOp {
    /// Parse a wire spelling, rejecting anything outside the whitelist
    pub fn parse(op: &str) -> Result<Self, QueryError> {
        let parsed = match op {
            "contains" => FilterOp::Contains,
            "~contains" => FilterOp::NotContains,
            "like" => FilterOp::Like,
            "~like" => FilterOp::NotLike,
            "ilike" => FilterOp::ILike,
            "~ilike" => FilterOp::NotILike,
            "in" => FilterOp::In,
            "~in" => FilterOp::NotIn,
            "==" => FilterOp::Eq,
            "!=" => FilterOp::Ne,
            ">" => FilterOp::Gt,
            ">=" => FilterOp::Ge,
            "<" => FilterOp::Lt,
            "<=" => FilterOp::Le,
            _ => {
                return Err(QueryError::InvalidOperator { op: op.to_string() });
            }
        };
        Ok(parsed)
    }

    /// The wire spelling of this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Contains => "contains",
            FilterOp::NotContains => "~contains",
            FilterOp::Like => "like",
            FilterOp::NotLike => "~like",
            FilterOp::ILike => "ilike",
            FilterOp::NotILike => "~ilike",
            FilterOp::In => "in",
            FilterOp::NotIn => "~in",
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOp::parse(s)
    }
}

/// A compiled filter predicate: one field, one operator, one value
///
/// The in-memory backend evaluates predicates directly via [`Predicate::matches`];
/// database-backed collections instead translate the triple into their native
/// query language.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Predicate {
    /// Compile a `(field, op, value)` triple against a schema
    ///
    /// The field must be declared by the schema; the operator has already
    /// been validated at parse time. Value types are not coerced here — a
    /// mismatch surfaces later as a storage-layer error.
    pub fn compile(
        schema: &Schema,
        field: &str,
        op: FilterOp,
        value: Value,
    ) -> Result<Self, QueryError> {
        if schema.kind_of(field).is_none() {
            return Err(QueryError::UnknownField {
                field: field.to_string(),
            });
        }
        Ok(Predicate {
            field: field.to_string(),
            op,
            value,
        })
    }

    /// Evaluate this predicate against a record
    ///
    /// A field absent from the record evaluates as null. Type mismatches
    /// between the stored value and the filter value are storage-layer
    /// errors, not query-validation errors.
    pub fn matches(&self, record: &crate::core::field::Record) -> Result<bool> {
        let field_value = record.get(&self.field).unwrap_or(&FieldValue::Null);
        self.op.matches(field_value, &self.value)
    }
}

impl FilterOp {
    /// Evaluate this operator over a field value and a filter value
    pub fn matches(&self, field: &FieldValue, value: &Value) -> Result<bool> {
        use FilterOp::*;

        // Null filter values follow SQL `IS NULL` / `IS NOT NULL` semantics.
        if value.is_null() {
            return match self {
                Eq => Ok(field.is_null()),
                Ne => Ok(!field.is_null()),
                _ => Err(anyhow!("operator '{}' does not accept a null value", self)),
            };
        }
        // A null field never matches a non-null comparison.
        if field.is_null() {
            return Ok(false);
        }

        match self {
            Contains | Like => substring(field, value, false),
            NotContains | NotLike => Ok(!substring(field, value, false)?),
            ILike => substring(field, value, true),
            NotILike => Ok(!substring(field, value, true)?),
            In => in_set(field, value),
            NotIn => Ok(!in_set(field, value)?),
            Eq => value_eq(field, value),
            Ne => Ok(!value_eq(field, value)?),
            Gt => Ok(ordering(field, value)? == Ordering::Greater),
            Ge => Ok(ordering(field, value)? != Ordering::Less),
            Lt => Ok(ordering(field, value)? == Ordering::Less),
            Le => Ok(ordering(field, value)? != Ordering::Greater),
        }
    }
}

fn substring(field: &FieldValue, value: &Value, case_insensitive: bool) -> Result<bool> {
    let haystack = field
        .as_str()
        .ok_or_else(|| anyhow!("substring match on non-string field value {:?}", field))?;
    let needle = value
        .as_str()
        .ok_or_else(|| anyhow!("substring match with non-string value {}", value))?;
    if case_insensitive {
        Ok(haystack.to_lowercase().contains(&needle.to_lowercase()))
    } else {
        Ok(haystack.contains(needle))
    }
}

fn in_set(field: &FieldValue, value: &Value) -> Result<bool> {
    let set = value
        .as_array()
        .ok_or_else(|| anyhow!("'in' requires an array value, got {}", value))?;
    for candidate in set {
        if value_eq(field, candidate)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn value_eq(field: &FieldValue, value: &Value) -> Result<bool> {
    match field {
        FieldValue::Boolean(b) => {
            let v = value
                .as_bool()
                .ok_or_else(|| anyhow!("cannot compare boolean field with {}", value))?;
            Ok(*b == v)
        }
        FieldValue::String(s) => {
            let v = value
                .as_str()
                .ok_or_else(|| anyhow!("cannot compare string field with {}", value))?;
            Ok(s == v)
        }
        _ => Ok(ordering(field, value)? == Ordering::Equal),
    }
}

/// Compare a field value with a JSON filter value of a compatible type
fn ordering(field: &FieldValue, value: &Value) -> Result<Ordering> {
    match field {
        FieldValue::Integer(_) | FieldValue::Float(_) | FieldValue::Decimal(_) => {
            let lhs = field.as_f64().expect("numeric variants widen to f64");
            let rhs = value
                .as_f64()
                .ok_or_else(|| anyhow!("cannot compare numeric field with {}", value))?;
            lhs.partial_cmp(&rhs)
                .ok_or_else(|| anyhow!("numeric comparison with NaN"))
        }
        FieldValue::String(s) => {
            let rhs = value
                .as_str()
                .ok_or_else(|| anyhow!("cannot compare string field with {}", value))?;
            Ok(s.as_str().cmp(rhs))
        }
        FieldValue::Date(d) => {
            let raw = value
                .as_str()
                .ok_or_else(|| anyhow!("cannot compare date field with {}", value))?;
            let rhs = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| anyhow!("bad date value '{}': {}", raw, e))?;
            Ok(d.cmp(&rhs))
        }
        FieldValue::Timestamp(t) => {
            let raw = value
                .as_str()
                .ok_or_else(|| anyhow!("cannot compare timestamp field with {}", value))?;
            let rhs = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map_err(|e| anyhow!("bad timestamp value '{}': {}", raw, e))?;
            Ok(t.cmp(&rhs))
        }
        FieldValue::Boolean(_) | FieldValue::Null => {
            Err(anyhow!("field value {:?} is not orderable", field))
        }
    }
}
