//! In-memory implementation of `Collection` for testing and development
//!
//! Predicates are evaluated directly against records; a database-backed
//! collection would instead push the triples down into its query language.
//! Uses RwLock for thread-safe access.

use crate::core::collection::Collection;
use crate::core::descriptor::{SortClause, SortDirection};
use crate::core::field::{FieldValue, Record};
use crate::core::operator::Predicate;
use anyhow::{Result, anyhow};
use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

/// In-memory record collection
#[derive(Clone, Default)]
pub struct InMemoryCollection {
    rows: Arc<RwLock<Vec<Record>>>,
}

impl InMemoryCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection seeded with rows
    pub fn with_rows(rows: Vec<Record>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    /// Append a record
    pub fn insert(&self, record: Record) {
        self.rows
            .write()
            .expect("collection lock poisoned")
            .push(record);
    }

    fn matching(&self, predicates: &[Predicate]) -> Result<Vec<Record>> {
        let rows = self
            .rows
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut matches = Vec::new();
        for row in rows.iter() {
            if matches_all(row, predicates)? {
                matches.push(row.clone());
            }
        }
        Ok(matches)
    }
}

fn matches_all(row: &Record, predicates: &[Predicate]) -> Result<bool> {
    for predicate in predicates {
        if !predicate.matches(row)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Total order over field values for sorting
///
/// Nulls sort first; numeric kinds compare numerically across variants;
/// incomparable kinds keep their input order (the sort is stable).
fn compare(a: &FieldValue, b: &FieldValue) -> Ordering {
    use FieldValue::*;
    match (a, b) {
        (Null, Null) => Ordering::Equal,
        (Null, _) => Ordering::Less,
        (_, Null) => Ordering::Greater,
        (String(x), String(y)) => x.cmp(y),
        (Boolean(x), Boolean(y)) => x.cmp(y),
        (Date(x), Date(y)) => x.cmp(y),
        (Timestamp(x), Timestamp(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

impl Collection for InMemoryCollection {
    fn count(&self, predicates: &[Predicate]) -> Result<u64> {
        let rows = self
            .rows
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut total = 0;
        for row in rows.iter() {
            if matches_all(row, predicates)? {
                total += 1;
            }
        }
        Ok(total)
    }

    fn fetch(
        &self,
        predicates: &[Predicate],
        sort: &[SortClause],
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<Record>> {
        let mut matches = self.matching(predicates)?;

        // Vec::sort_by is stable, so clause order gives multi-key ordering
        // with the first clause as the primary key.
        matches.sort_by(|a, b| {
            for clause in sort {
                let av = a.get(&clause.field).unwrap_or(&FieldValue::Null);
                let bv = b.get(&clause.field).unwrap_or(&FieldValue::Null);
                let ord = match clause.direction {
                    SortDirection::Asc => compare(av, bv),
                    SortDirection::Desc => compare(av, bv).reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        let iter = matches.into_iter().skip(offset as usize);
        Ok(match limit {
            Some(limit) => iter.take(limit as usize).collect(),
            None => iter.collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operator::FilterOp;
    use serde_json::json;

    fn row(id: i64, name: &str, status: &str) -> Record {
        let mut r = Record::new();
        r.insert("id".to_string(), FieldValue::Integer(id));
        r.insert("name".to_string(), FieldValue::from(name));
        r.insert("status".to_string(), FieldValue::from(status));
        r
    }

    fn collection() -> InMemoryCollection {
        InMemoryCollection::with_rows(vec![
            row(1, "alpha", "active"),
            row(2, "beta", "paused"),
            row(3, "gamma", "active"),
            row(4, "delta", "paused"),
            row(5, "epsilon", "active"),
        ])
    }

    fn predicate(field: &str, op: FilterOp, value: serde_json::Value) -> Predicate {
        Predicate {
            field: field.to_string(),
            op,
            value,
        }
    }

    fn sort(field: &str, direction: SortDirection) -> SortClause {
        SortClause {
            field: field.to_string(),
            direction,
        }
    }

    fn ids(rows: &[Record]) -> Vec<i64> {
        rows.iter().map(|r| r["id"].as_integer().unwrap()).collect()
    }

    #[test]
    fn test_count_is_pagination_independent() {
        let c = collection();
        assert_eq!(c.count(&[]).unwrap(), 5);
        assert_eq!(
            c.count(&[predicate("status", FilterOp::Eq, json!("active"))])
                .unwrap(),
            3
        );
    }

    #[test]
    fn test_fetch_applies_and_combination() {
        let c = collection();
        let rows = c
            .fetch(
                &[
                    predicate("status", FilterOp::Eq, json!("active")),
                    predicate("id", FilterOp::Gt, json!(1)),
                ],
                &[sort("id", SortDirection::Asc)],
                0,
                None,
            )
            .unwrap();
        assert_eq!(ids(&rows), vec![3, 5]);
    }

    #[test]
    fn test_fetch_sort_offset_limit() {
        let c = collection();
        let rows = c
            .fetch(&[], &[sort("id", SortDirection::Desc)], 1, Some(2))
            .unwrap();
        assert_eq!(ids(&rows), vec![4, 3]);
    }

    #[test]
    fn test_fetch_without_limit_returns_remainder() {
        let c = collection();
        let rows = c
            .fetch(&[], &[sort("id", SortDirection::Asc)], 2, None)
            .unwrap();
        assert_eq!(ids(&rows), vec![3, 4, 5]);
    }

    #[test]
    fn test_multi_key_sort_is_stable() {
        let c = InMemoryCollection::with_rows(vec![
            row(1, "x", "active"),
            row(2, "x", "paused"),
            row(3, "x", "active"),
            row(4, "y", "active"),
        ]);
        // Primary key: name asc; secondary: id desc.
        let rows = c
            .fetch(
                &[],
                &[
                    sort("name", SortDirection::Asc),
                    sort("id", SortDirection::Desc),
                ],
                0,
                None,
            )
            .unwrap();
        assert_eq!(ids(&rows), vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_evaluation_type_mismatch_surfaces_as_error() {
        let c = collection();
        let err = c
            .count(&[predicate("id", FilterOp::Gt, json!("ten"))])
            .unwrap_err();
        assert!(err.to_string().contains("numeric"));
    }

    #[test]
    fn test_nulls_sort_first() {
        let mut null_row = Record::new();
        null_row.insert("id".to_string(), FieldValue::Integer(9));
        null_row.insert("name".to_string(), FieldValue::Null);
        let c = InMemoryCollection::with_rows(vec![row(1, "alpha", "active"), null_row]);

        let rows = c
            .fetch(&[], &[sort("name", SortDirection::Asc)], 0, None)
            .unwrap();
        assert_eq!(ids(&rows), vec![9, 1]);
    }
}
