//! # listquery
//!
//! The generic query/pagination/serialization layer of an administrative web
//! backend. It turns an untrusted, client-supplied JSON query description
//! into a validated predicate set over an abstract record collection,
//! handles pagination boundaries exactly, and converts domain records into a
//! transport-stable representation.
//!
//! ## Features
//!
//! - **Operator whitelist**: filter triples are validated against a closed
//!   enum at parse time; anything else is rejected with the offending string
//! - **Boundary-exact pagination**: the total is counted before offset/limit,
//!   so a page beyond the last one fails with a recoverable overflow error
//!   carrying enough context to recompute a valid page
//! - **Type-aware serialization**: fixed-precision numerics flatten to
//!   floats, date/timestamp fields are emitted both as canonical strings and
//!   UTC-adjusted epochs
//! - **Pluggable storage**: a backend only implements the `Collection` trait
//!   and predicate translation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use listquery::prelude::*;
//!
//! let schema = Schema::new("campaign")
//!     .field("id", FieldKind::Integer)
//!     .field("name", FieldKind::String)
//!     .field("status", FieldKind::String);
//! let config = QueryConfig::default();
//!
//! // q={"page":1,"perpage":2,"filters":[["status","==","active"]]}
//! let descriptor = QueryDescriptor::build(raw_q, &schema, &config)?;
//! let processor = QueryProcessor::new(descriptor, &schema, &config);
//! let outcome = processor.get_result(&collection);
//!
//! Envelope::render(outcome, &RequestContext::new("campaigns", "GET"), &metrics)
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        collection::Collection,
        descriptor::{FilterClause, QueryDescriptor, SortClause, SortDirection},
        error::QueryError,
        field::{FieldKind, FieldValue, Record},
        memo::Memoized,
        operator::{FilterOp, Predicate},
        processor::{FetchPlan, QueryProcessor, QueryResult},
        schema::Schema,
        serialize::{Serializer, duplicate},
    };

    // === Config ===
    pub use crate::config::QueryConfig;

    // === Server ===
    pub use crate::server::{Envelope, InMemoryMetrics, MetricsSink, NoopMetrics, RequestContext};

    // === Storage ===
    pub use crate::storage::InMemoryCollection;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use chrono::{NaiveDate, NaiveDateTime};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
}
