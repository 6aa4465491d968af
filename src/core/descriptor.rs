//! Query descriptors: the validated form of a client-supplied list query
//!
//! The wire contract is a single JSON string (conventionally the `q` query
//! parameter):
//!
//! ```json
//! {"page": 1, "perpage": 20,
//!  "filters": [["status", "==", "active"]],
//!  "sort": [["id", "desc"]]}
//! ```
//!
//! All keys are optional. Defaults: `page=1`, `perpage` from configuration,
//! `filters` from the schema default (or empty), `sort` from the schema
//! default (or primary key descending).

use crate::config::QueryConfig;
use crate::core::error::QueryError;
use crate::core::operator::FilterOp;
use crate::core::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// One client-supplied filter directive
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Sort direction for a sort clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn parse(raw: &str) -> Result<Self, QueryError> {
        match raw {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(QueryError::Malformed {
                message: format!("sort direction must be 'asc' or 'desc', got '{}'", other),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One client-supplied sort directive
#[derive(Debug, Clone, PartialEq)]
pub struct SortClause {
    pub field: String,
    pub direction: SortDirection,
}

/// Raw wire shape, before operator/direction validation
#[derive(Debug, Default, Deserialize)]
struct RawQuery {
    page: Option<u64>,
    perpage: Option<i64>,
    filters: Option<Vec<(String, String, Value)>>,
    sort: Option<Vec<(String, String)>>,
}

/// A validated, request-scoped query description
///
/// Immutable once built, except for the explicit replace-operations callers
/// use to inject mandatory defaults (tenant scoping and the like) before
/// execution.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    page: u64,
    perpage: i64,
    filters: Vec<FilterClause>,
    sort: Vec<SortClause>,
}

impl QueryDescriptor {
    /// Parse and validate a raw query JSON string against a schema
    ///
    /// Fails with `Malformed` on bad JSON or shape and with
    /// `InvalidOperator` on any operator outside the whitelist. Field names
    /// are checked later, when the processor compiles the descriptor.
    pub fn build(raw: &str, schema: &Schema, config: &QueryConfig) -> Result<Self, QueryError> {
        let parsed: RawQuery = serde_json::from_str(raw)?;

        let page = parsed.page.unwrap_or(1).max(1);
        let perpage = parsed.perpage.unwrap_or(config.default_perpage);

        let filters = match parsed.filters {
            Some(triples) if !triples.is_empty() => {
                let mut clauses = Vec::with_capacity(triples.len());
                for (field, op, value) in triples {
                    clauses.push(FilterClause {
                        field,
                        op: FilterOp::parse(&op)?,
                        value,
                    });
                }
                clauses
            }
            _ => schema.default_filters().to_vec(),
        };

        let sort = match parsed.sort {
            Some(pairs) if !pairs.is_empty() => {
                let mut clauses = Vec::with_capacity(pairs.len());
                for (field, direction) in pairs {
                    clauses.push(SortClause {
                        field,
                        direction: SortDirection::parse(&direction)?,
                    });
                }
                clauses
            }
            _ => schema.effective_default_sort(),
        };

        Ok(Self {
            page,
            perpage,
            filters,
            sort,
        })
    }

    /// Build a descriptor directly, bypassing the wire contract (tests,
    /// internal callers)
    pub fn new(page: u64, perpage: i64, filters: Vec<FilterClause>, sort: Vec<SortClause>) -> Self {
        Self {
            page: page.max(1),
            perpage,
            filters,
            sort,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn perpage(&self) -> i64 {
        self.perpage
    }

    pub fn filters(&self) -> &[FilterClause] {
        &self.filters
    }

    pub fn sort(&self) -> &[SortClause] {
        &self.sort
    }

    /// Record offset implied by the page: `perpage * (page - 1)`
    ///
    /// Zero under the no-limit sentinel, where pages have no meaning.
    pub fn offset(&self) -> u64 {
        if self.perpage > 0 {
            // Page numbers are client-supplied; saturate instead of wrapping
            // so an absurd page still trips the overflow check.
            (self.perpage as u64).saturating_mul(self.page - 1)
        } else {
            0
        }
    }

    /// Fetch limit: `None` under the no-limit sentinel (`perpage <= 0`),
    /// used sparingly for exports
    pub fn limit(&self) -> Option<u64> {
        if self.perpage > 0 {
            Some(self.perpage as u64)
        } else {
            None
        }
    }

    /// Replace the filter clauses through a callback
    ///
    /// This is how callers inject mandatory scoping before execution.
    pub fn update_filters(&mut self, f: impl FnOnce(Vec<FilterClause>) -> Vec<FilterClause>) {
        self.filters = f(std::mem::take(&mut self.filters));
    }

    /// Replace the sort clauses through a callback
    pub fn update_sort(&mut self, f: impl FnOnce(Vec<SortClause>) -> Vec<SortClause>) {
        self.sort = f(std::mem::take(&mut self.sort));
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters: Vec<Value> = self
            .filters
            .iter()
            .map(|c| json!([c.field, c.op.as_str(), c.value]))
            .collect();
        let sort: Vec<Value> = self
            .sort
            .iter()
            .map(|c| json!([c.field, c.direction.as_str()]))
            .collect();
        write!(
            f,
            "<QueryDescriptor(page={}, perpage={}, filters={}, sort={})>",
            self.page,
            self.perpage,
            Value::Array(filters),
            Value::Array(sort)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldKind;

    fn schema() -> Schema {
        Schema::new("campaign")
            .field("id", FieldKind::Integer)
            .field("name", FieldKind::String)
            .field("status", FieldKind::String)
    }

    fn config() -> QueryConfig {
        QueryConfig::default()
    }

    #[test]
    fn test_build_empty_query_uses_defaults() {
        let d = QueryDescriptor::build("{}", &schema(), &config()).unwrap();
        assert_eq!(d.page(), 1);
        assert_eq!(d.perpage(), config().default_perpage);
        assert!(d.filters().is_empty());
        // Falls back to primary key descending
        assert_eq!(d.sort().len(), 1);
        assert_eq!(d.sort()[0].field, "id");
        assert_eq!(d.sort()[0].direction, SortDirection::Desc);
    }

    #[test]
    fn test_build_full_query() {
        let raw = r#"{"page": 3, "perpage": 2,
                      "filters": [["status", "==", "active"]],
                      "sort": [["name", "asc"]]}"#;
        let d = QueryDescriptor::build(raw, &schema(), &config()).unwrap();
        assert_eq!(d.page(), 3);
        assert_eq!(d.perpage(), 2);
        assert_eq!(d.offset(), 4);
        assert_eq!(d.limit(), Some(2));
        assert_eq!(d.filters().len(), 1);
        assert_eq!(d.filters()[0].op, FilterOp::Eq);
        assert_eq!(d.sort()[0].direction, SortDirection::Asc);
    }

    #[test]
    fn test_build_rejects_bad_json() {
        let err = QueryDescriptor::build("not json", &schema(), &config()).unwrap_err();
        assert!(matches!(err, QueryError::Malformed { .. }));
    }

    #[test]
    fn test_build_rejects_bad_shape() {
        // filters must be triples
        let err = QueryDescriptor::build(
            r#"{"filters": [["status", "=="]]}"#,
            &schema(),
            &config(),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::Malformed { .. }));
    }

    #[test]
    fn test_build_rejects_unknown_operator() {
        let err = QueryDescriptor::build(
            r#"{"filters": [["status", "???", "active"]]}"#,
            &schema(),
            &config(),
        )
        .unwrap_err();
        match err {
            QueryError::InvalidOperator { op } => assert_eq!(op, "???"),
            other => panic!("expected InvalidOperator, got {:?}", other),
        }
    }

    #[test]
    fn test_build_rejects_bad_direction() {
        let err = QueryDescriptor::build(
            r#"{"sort": [["id", "down"]]}"#,
            &schema(),
            &config(),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::Malformed { .. }));
    }

    #[test]
    fn test_no_limit_sentinel() {
        let d = QueryDescriptor::build(r#"{"perpage": 0}"#, &schema(), &config()).unwrap();
        assert_eq!(d.limit(), None);
        assert_eq!(d.offset(), 0);

        let d = QueryDescriptor::build(r#"{"perpage": -1, "page": 3}"#, &schema(), &config())
            .unwrap();
        assert_eq!(d.limit(), None);
        assert_eq!(d.offset(), 0);
    }

    #[test]
    fn test_offset_saturates_on_huge_page_numbers() {
        let raw = format!(r#"{{"page": {}, "perpage": 2}}"#, u64::MAX);
        let d = QueryDescriptor::build(&raw, &schema(), &config()).unwrap();
        assert_eq!(d.offset(), u64::MAX);

        let d = QueryDescriptor::new(u64::MAX / 2, 3, vec![], vec![]);
        assert_eq!(d.offset(), u64::MAX);
    }

    #[test]
    fn test_schema_defaults_apply_when_clauses_absent() {
        let schema = schema()
            .default_filter(FilterClause {
                field: "status".to_string(),
                op: FilterOp::Ne,
                value: serde_json::json!("archived"),
            })
            .default_sort("name", SortDirection::Asc);

        let d = QueryDescriptor::build("{}", &schema, &config()).unwrap();
        assert_eq!(d.filters().len(), 1);
        assert_eq!(d.filters()[0].field, "status");
        assert_eq!(d.sort()[0].field, "name");

        // Explicit clauses win over schema defaults
        let d = QueryDescriptor::build(
            r#"{"filters": [["id", ">", 2]], "sort": [["id", "asc"]]}"#,
            &schema,
            &config(),
        )
        .unwrap();
        assert_eq!(d.filters()[0].field, "id");
        assert_eq!(d.sort()[0].field, "id");
    }

    #[test]
    fn test_update_filters_injects_scoping() {
        let mut d = QueryDescriptor::build(
            r#"{"filters": [["status", "==", "active"]]}"#,
            &schema(),
            &config(),
        )
        .unwrap();

        d.update_filters(|mut filters| {
            filters.push(FilterClause {
                field: "id".to_string(),
                op: FilterOp::Gt,
                value: serde_json::json!(0),
            });
            filters
        });
        assert_eq!(d.filters().len(), 2);
    }

    #[test]
    fn test_display_carries_query_args() {
        let d = QueryDescriptor::build(
            r#"{"page": 4, "perpage": 2, "filters": [["status", "==", "active"]]}"#,
            &schema(),
            &config(),
        )
        .unwrap();
        let s = d.to_string();
        assert!(s.contains("page=4"));
        assert!(s.contains("perpage=2"));
        assert!(s.contains("status"));
    }
}
