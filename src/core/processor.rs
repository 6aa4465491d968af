//! The query processor: compile, count, boundary-check, fetch, serialize
//!
//! The pipeline is deterministic and short-circuits on the first error:
//!
//! 1. compile every filter clause, AND-combined
//! 2. count all matches (total is independent of pagination)
//! 3. overflow check: `total > 0 && offset >= total` fails with
//!    [`QueryError::PageOverflow`]; an empty total proceeds to an empty
//!    result
//! 4. sort, offset, limit
//! 5. materialize and serialize
//!
//! Total is computed before offset/limit so boundary errors and page counts
//! are correct without a second counting query. The no-limit sentinel
//! (`perpage <= 0`) only lifts the limit; total is still computed.

use crate::config::QueryConfig;
use crate::core::collection::Collection;
use crate::core::descriptor::{QueryDescriptor, SortClause};
use crate::core::error::QueryError;
use crate::core::operator::Predicate;
use crate::core::schema::Schema;
use crate::core::serialize::Serializer;
use serde::Serialize;
use serde_json::{Map, Value};

/// A page of serialized matches plus the pagination-independent total
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryResult {
    pub total: u64,
    pub objects: Vec<Map<String, Value>>,
}

/// The storage-facing half of a resolved query
///
/// Everything a collection needs for the fetch round-trip, produced after
/// compilation and the overflow check have passed.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub predicates: Vec<Predicate>,
    pub sort: Vec<SortClause>,
    pub offset: u64,
    pub limit: Option<u64>,
}

/// Executes one descriptor against one collection
///
/// Request-scoped; owns no shared mutable state. The schema and
/// configuration it borrows are fixed at process start.
pub struct QueryProcessor<'a> {
    descriptor: QueryDescriptor,
    schema: &'a Schema,
    serializer: Serializer,
}

impl<'a> QueryProcessor<'a> {
    pub fn new(descriptor: QueryDescriptor, schema: &'a Schema, config: &QueryConfig) -> Self {
        Self {
            descriptor,
            schema,
            serializer: Serializer::new(config.utc_offset()),
        }
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Compile filter clauses into predicates and validate sort fields
    ///
    /// Unknown fields fail here, at compile time, never at execution.
    fn compile(&self) -> Result<(Vec<Predicate>, Vec<SortClause>), QueryError> {
        let mut predicates = Vec::with_capacity(self.descriptor.filters().len());
        for clause in self.descriptor.filters() {
            predicates.push(Predicate::compile(
                self.schema,
                &clause.field,
                clause.op,
                clause.value.clone(),
            )?);
        }

        let sort = self.descriptor.sort().to_vec();
        for clause in &sort {
            if self.schema.kind_of(&clause.field).is_none() {
                return Err(QueryError::UnknownField {
                    field: clause.field.clone(),
                });
            }
        }

        Ok((predicates, sort))
    }

    /// Resolve the descriptor: compile, count, and boundary-check
    ///
    /// Returns the total match count and the plan for the fetch round-trip.
    /// This is the first of at most two storage calls.
    pub fn resolve(&self, collection: &dyn Collection) -> Result<(u64, FetchPlan), QueryError> {
        let (predicates, sort) = self.compile()?;

        let total = collection.count(&predicates)?;
        let offset = self.descriptor.offset();
        if total > 0 && offset >= total {
            return Err(QueryError::PageOverflow {
                query_args: self.descriptor.to_string(),
                offset,
                total,
            });
        }

        Ok((
            total,
            FetchPlan {
                predicates,
                sort,
                offset,
                limit: self.descriptor.limit(),
            },
        ))
    }

    /// Execute the full pipeline and serialize the matching page
    pub fn get_result(&self, collection: &dyn Collection) -> Result<QueryResult, QueryError> {
        let (total, plan) = self.resolve(collection)?;
        let records = collection.fetch(&plan.predicates, &plan.sort, plan.offset, plan.limit)?;
        let objects = records
            .iter()
            .map(|record| self.serializer.to_object(record))
            .collect();
        Ok(QueryResult { total, objects })
    }
}
