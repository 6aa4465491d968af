//! Statically declared field schemas for domain types
//!
//! A schema is the query layer's whole knowledge of a domain type: which
//! fields exist, their semantic kinds, which field is the primary key, which
//! fields are storage-managed audit columns, and the default filters/sort a
//! list endpoint applies when the client supplies none. Schemas are built
//! once at process start and shared immutably.

use crate::core::descriptor::{FilterClause, SortClause, SortDirection};
use crate::core::field::FieldKind;
use indexmap::IndexMap;

/// Declared field set and query defaults for one domain type
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: IndexMap<String, FieldKind>,
    primary_key: String,
    audit_fields: Vec<String>,
    default_filters: Vec<FilterClause>,
    default_sort: Vec<SortClause>,
}

impl Schema {
    /// Start a schema for the named domain type
    ///
    /// Primary key defaults to `id`, audit fields to `created_at` and
    /// `updated_at`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            primary_key: "id".to_string(),
            audit_fields: vec!["created_at".to_string(), "updated_at".to_string()],
            default_filters: Vec::new(),
            default_sort: Vec::new(),
        }
    }

    /// Declare a field with its semantic kind
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    /// Override the primary key field name
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    /// Override the audit field names
    pub fn audit_fields(mut self, names: &[&str]) -> Self {
        self.audit_fields = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Add a default filter clause, applied when the client supplies none
    pub fn default_filter(mut self, clause: FilterClause) -> Self {
        self.default_filters.push(clause);
        self
    }

    /// Add a default sort clause, applied when the client supplies none
    pub fn default_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.default_sort.push(SortClause {
            field: field.into(),
            direction,
        });
        self
    }

    /// The domain type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the declared kind of a field
    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.fields.get(field).copied()
    }

    /// Iterate declared fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.fields.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// The primary key field name
    pub fn primary_key_field(&self) -> &str {
        &self.primary_key
    }

    /// Whether a field is the primary key or an audit column
    ///
    /// These are the fields record duplication skips so storage can assign
    /// fresh identity.
    pub fn is_identity_or_audit(&self, field: &str) -> bool {
        field == self.primary_key || self.audit_fields.iter().any(|a| a == field)
    }

    /// Default filters for this type (may be empty)
    pub fn default_filters(&self) -> &[FilterClause] {
        &self.default_filters
    }

    /// Effective default sort: declared default, falling back to primary key
    /// descending
    pub fn effective_default_sort(&self) -> Vec<SortClause> {
        if !self.default_sort.is_empty() {
            return self.default_sort.clone();
        }
        vec![SortClause {
            field: self.primary_key.clone(),
            direction: SortDirection::Desc,
        }]
    }
}
