//! Core module containing the query layer's fundamental types and traits

pub mod collection;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod memo;
pub mod operator;
pub mod processor;
pub mod schema;
pub mod serialize;

pub use collection::Collection;
pub use descriptor::{FilterClause, QueryDescriptor, SortClause, SortDirection};
pub use error::QueryError;
pub use field::{FieldKind, FieldValue, Record};
pub use memo::Memoized;
pub use operator::{FilterOp, Predicate};
pub use processor::{FetchPlan, QueryProcessor, QueryResult};
pub use schema::Schema;
pub use serialize::{Serializer, duplicate};
