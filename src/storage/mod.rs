//! Collection backends
//!
//! Only the in-memory backend lives in-tree. Database-backed collections
//! implement [`crate::core::Collection`] by translating predicates into
//! their native query language.

pub mod in_memory;

pub use in_memory::InMemoryCollection;
