//! The queryable-collection abstraction
//!
//! The processor drives any store through this trait: AND-combined predicate
//! application, stable multi-key ordering, offset, limit, and counting. A
//! different storage backend plugs in by reimplementing only this trait and
//! the predicate translation; the processor and serializer stay untouched.

use crate::core::descriptor::SortClause;
use crate::core::field::Record;
use crate::core::operator::Predicate;
use anyhow::Result;

/// A queryable collection of records for one domain type
///
/// Access is blocking I/O; the processor performs at most two calls per
/// request (count, then fetch) and never retries. Transient storage errors
/// propagate to the caller as-is.
pub trait Collection: Send + Sync {
    /// Count records matching all predicates, independent of pagination
    fn count(&self, predicates: &[Predicate]) -> Result<u64>;

    /// Fetch matching records: filter by all predicates, apply the sort
    /// clauses in order as a stable multi-key ordering, then offset and
    /// (if given) limit
    fn fetch(
        &self,
        predicates: &[Predicate],
        sort: &[SortClause],
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<Record>>;
}
