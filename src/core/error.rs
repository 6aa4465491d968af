//! Typed error handling for the query layer
//!
//! Every error produced here is request-scoped and recoverable: it maps to a
//! 4xx response rendered by the envelope, never to a process abort. Storage
//! failures are not caught by the query layer; they pass through as the
//! `Storage` variant and render with a 5xx status.
//!
//! # Example
//!
//! ```rust,ignore
//! use listquery::prelude::*;
//!
//! match processor.get_result(&collection) {
//!     Ok(result) => println!("{} matches", result.total),
//!     Err(QueryError::PageOverflow { offset, total, .. }) => {
//!         println!("page out of range: offset {} >= total {}", offset, total);
//!     }
//!     Err(e) => eprintln!("query failed: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

/// The error type for query building, compilation, and execution
#[derive(Debug)]
pub enum QueryError {
    /// The raw query string was not valid JSON or had the wrong shape
    Malformed { message: String },

    /// A filter clause used an operator outside the whitelist
    InvalidOperator { op: String },

    /// A filter or sort clause named a field the schema does not declare
    UnknownField { field: String },

    /// The requested page lies beyond the last page of matches
    ///
    /// Carries enough context for the client to recompute a valid page.
    PageOverflow {
        query_args: String,
        offset: u64,
        total: u64,
    },

    /// Uncaught storage-layer failure (connection loss, type mismatch in a
    /// pushed-down predicate, ...)
    Storage(anyhow::Error),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Malformed { message } => {
                write!(f, "Malformed query: {}", message)
            }
            QueryError::InvalidOperator { op } => {
                write!(f, "Invalid query operator: '{}'", op)
            }
            QueryError::UnknownField { field } => {
                write!(f, "Unknown field: '{}'", field)
            }
            QueryError::PageOverflow {
                query_args,
                offset,
                total,
            } => {
                write!(
                    f,
                    "Requested page is out of range: offset {} >= total {} ({})",
                    offset, total, query_args
                )
            }
            QueryError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Storage(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl QueryError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::Malformed { .. } => StatusCode::BAD_REQUEST,
            QueryError::InvalidOperator { .. } => StatusCode::BAD_REQUEST,
            QueryError::UnknownField { .. } => StatusCode::BAD_REQUEST,
            QueryError::PageOverflow { .. } => StatusCode::BAD_REQUEST,
            QueryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::Malformed { .. } => "MALFORMED_QUERY",
            QueryError::InvalidOperator { .. } => "INVALID_OPERATOR",
            QueryError::UnknownField { .. } => "UNKNOWN_FIELD",
            QueryError::PageOverflow { .. } => "PAGE_OVERFLOW",
            QueryError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Build the transport body for this error
    ///
    /// Page overflow keeps its structured payload so clients can recompute
    /// a valid page; every other variant renders as a bare message.
    pub fn body(&self) -> serde_json::Value {
        match self {
            QueryError::PageOverflow {
                query_args,
                offset,
                total,
            } => json!({
                "message": self.to_string(),
                "query_args": query_args,
                "offset": offset,
                "total": total,
            }),
            _ => json!({ "message": self.to_string() }),
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Malformed {
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for QueryError {
    fn from(err: anyhow::Error) -> Self {
        QueryError::Storage(err)
    }
}
