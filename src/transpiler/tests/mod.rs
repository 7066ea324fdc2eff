//! Transpiler test modules.
//!
//! Tests are organized by category:
//! - `core`: SELECT assembly, filters, literals and parameter mode (PostgreSQL)
//! - `dialects`: dialect-specific quoting, pagination and operator hooks
//! - `nosql`: MongoDB, Elasticsearch, Cassandra, Neo4j and OrientDB output

mod core;
mod dialects;
