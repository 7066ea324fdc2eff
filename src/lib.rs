//! # UQL — Unified Query Language
//!
//! Write a filter once; run it on SQL, document, search, wide-column and
//! graph stores.
//!
//! ## Quick Example
//!
//! ```
//! use uql::prelude::*;
//!
//! let query = Query::new("users")
//!     .select(["id", "name"])
//!     .must(Where::field("age").gt(30)?)
//!     .must_not(Where::field("status").eq("inactive")?);
//!
//! assert_eq!(
//!     query.to_sql()?,
//!     r#"SELECT "id", "name" FROM "users" WHERE ("age" > 30) AND (NOT ("status" = 'inactive'));"#
//! );
//! assert_eq!(
//!     query.to_cypher()?,
//!     "MATCH (n:users) WHERE (n.age > 30) AND (NOT (n.status = 'inactive')) RETURN n.id, n.name;"
//! );
//! # Ok::<(), uql::UqlError>(())
//! ```
//!
//! ## Targets
//!
//! | Target        | Output                          |
//! |---------------|---------------------------------|
//! | PostgreSQL    | SQL, `$n` placeholders          |
//! | MySQL/MariaDB | SQL, `?` placeholders           |
//! | SQL Server    | SQL, `@pN` placeholders         |
//! | Oracle        | SQL, `:N` placeholders          |
//! | MongoDB       | `find` command or pipeline      |
//! | Elasticsearch | search body                     |
//! | Cassandra     | CQL                             |
//! | Neo4j         | Cypher                          |
//! | OrientDB      | `MATCH`                         |

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod transpiler;
pub mod validator;

pub use engine::{Output, Target, TranslateOptions, translate};
pub use error::{UqlError, UqlResult};

pub mod prelude {
    pub use crate::ast::builders::Where;
    pub use crate::ast::*;
    pub use crate::engine::{Output, Target, TranslateOptions, translate};
    pub use crate::error::*;
    pub use crate::normalize::{FilterInput, normalize, normalize_input};
    pub use crate::transpiler::{
        CqlOptions, Dialect, ElasticOptions, ElasticQueryBuilder, MongoFind, ToCassandra,
        ToElastic, ToMongo, ToNeo4j, ToOrientDb, ToSql,
    };
}

/// Parse a JSON query document.
///
/// # Example
///
/// ```
/// let q = uql::parse_query(r#"{"from": "users", "where": {"age": {"gt": 30}}}"#).unwrap();
/// assert_eq!(q.from, "users");
/// assert!(q.has_filter());
/// ```
pub fn parse_query(input: &str) -> UqlResult<ast::Query> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    ast::Query::from_json(&value)
}
