//! The uniform transport envelope for query outcomes
//!
//! Exactly one of (result, domain error) goes in; a JSON response comes out:
//!
//! - success: `{"total": .., "objects": [..]}`, status 200
//! - page overflow: `{"message", "query_args", "offset", "total"}`, status 400
//! - any other domain error: `{"message": ..}` with its associated status
//!
//! Every response with status >= 400 is counted against the
//! `(status, endpoint, method)` metrics dimensions. Access-control errors
//! raised by collaborators pass through the same shape; this layer never
//! produces them.

use crate::core::error::QueryError;
use crate::core::processor::QueryResult;
use crate::server::metrics::MetricsSink;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::{debug, warn};

/// Dimensions of the request being answered
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub endpoint: String,
    pub method: String,
}

impl RequestContext {
    pub fn new(endpoint: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
        }
    }
}

/// Renders query outcomes into transport responses
pub struct Envelope;

impl Envelope {
    /// Status and JSON body for an outcome, with error accounting
    ///
    /// Split from [`Envelope::render`] so the transport-independent part is
    /// directly testable.
    pub fn render_parts(
        result: Result<QueryResult, QueryError>,
        ctx: &RequestContext,
        metrics: &dyn MetricsSink,
    ) -> (StatusCode, Value) {
        match result {
            Ok(result) => {
                debug!(
                    endpoint = %ctx.endpoint,
                    method = %ctx.method,
                    total = result.total,
                    objects = result.objects.len(),
                    "query succeeded"
                );
                let body = serde_json::to_value(&result)
                    .expect("query result serializes to JSON");
                (StatusCode::OK, body)
            }
            Err(error) => {
                let status = error.status_code();
                warn!(
                    endpoint = %ctx.endpoint,
                    method = %ctx.method,
                    status = status.as_u16(),
                    code = error.error_code(),
                    %error,
                    "query failed"
                );
                metrics.incr_response_status(status.as_u16(), &ctx.endpoint, &ctx.method);
                (status, error.body())
            }
        }
    }

    /// Render an outcome into an axum response
    pub fn render(
        result: Result<QueryResult, QueryError>,
        ctx: &RequestContext,
        metrics: &dyn MetricsSink,
    ) -> Response {
        let (status, body) = Self::render_parts(result, ctx, metrics);
        (status, Json(body)).into_response()
    }
}
