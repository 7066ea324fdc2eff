//! Query transpilers.
//!
//! Converts a [`Query`] into SQL for five relational dialects and into the
//! native query forms of MongoDB, Elasticsearch, Cassandra, Neo4j and
//! OrientDB.

pub mod conditions;
pub mod dialect;
pub mod dml;
pub mod sql;
pub mod traits;

// NoSQL transpilers (organized in nosql/ subdirectory)
pub mod nosql;
pub use nosql::cassandra::{CqlOptions, ToCassandra};
pub use nosql::elastic::{ElasticOptions, ElasticQueryBuilder, ToElastic};
pub use nosql::mongo::{MongoFind, ToMongo};
pub use nosql::neo4j::ToNeo4j;
pub use nosql::orientdb::ToOrientDb;

#[cfg(test)]
mod tests;

use serde_json::Value;

use crate::ast::Query;
use crate::error::UqlResult;
pub use conditions::{ParamContext, SqlConditionVisitor};
pub use dialect::Dialect;
pub use traits::SqlGenerator;

/// Trait for converting queries to SQL.
pub trait ToSql {
    /// Convert to SQL using the default dialect (PostgreSQL).
    fn to_sql(&self) -> UqlResult<String> {
        self.to_sql_with_dialect(Dialect::default())
    }

    /// Convert to SQL with a specific dialect, values inlined as literals.
    fn to_sql_with_dialect(&self, dialect: Dialect) -> UqlResult<String>;

    /// Convert to SQL with placeholders; returns the SQL and the bound
    /// values in placeholder order.
    fn to_sql_parameterized(&self, dialect: Dialect) -> UqlResult<(String, Vec<Value>)>;
}

impl ToSql for Query {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> UqlResult<String> {
        dml::select::build_select(self, dialect)
    }

    fn to_sql_parameterized(&self, dialect: Dialect) -> UqlResult<(String, Vec<Value>)> {
        dml::select::build_select_parameterized(self, dialect)
    }
}
