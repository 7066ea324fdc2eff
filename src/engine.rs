//! Target dispatch.
//!
//! One entry point, [`translate`], that routes a [`Query`] to whichever
//! backend the caller names at runtime and wraps the result in an
//! [`Output`] that knows how to print itself.

use std::fmt;
use std::str::FromStr;

use serde_json::{Value, json};
use tracing::{debug, info};

use crate::ast::Query;
use crate::error::{UqlError, UqlResult};
use crate::transpiler::{
    CqlOptions, Dialect, MongoFind, ToCassandra, ToElastic, ToMongo, ToNeo4j, ToOrientDb, ToSql,
};

/// Every backend a query can be translated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Target {
    #[default]
    Postgres,
    MySQL,
    MariaDB,
    SqlServer,
    Oracle,
    Mongo,
    MongoPipeline,
    Elastic,
    Cassandra,
    Neo4j,
    OrientDb,
}

impl Target {
    pub const ALL: [Target; 11] = [
        Target::Postgres,
        Target::MySQL,
        Target::MariaDB,
        Target::SqlServer,
        Target::Oracle,
        Target::Mongo,
        Target::MongoPipeline,
        Target::Elastic,
        Target::Cassandra,
        Target::Neo4j,
        Target::OrientDb,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Target::Postgres => "postgres",
            Target::MySQL => "mysql",
            Target::MariaDB => "mariadb",
            Target::SqlServer => "sqlserver",
            Target::Oracle => "oracle",
            Target::Mongo => "mongo",
            Target::MongoPipeline => "mongo-pipeline",
            Target::Elastic => "elastic",
            Target::Cassandra => "cassandra",
            Target::Neo4j => "neo4j",
            Target::OrientDb => "orientdb",
        }
    }

    /// One-line description for `uql targets`.
    pub fn description(&self) -> &'static str {
        match self {
            Target::Postgres => "PostgreSQL SELECT",
            Target::MySQL => "MySQL SELECT",
            Target::MariaDB => "MariaDB SELECT",
            Target::SqlServer => "SQL Server SELECT (OFFSET/FETCH)",
            Target::Oracle => "Oracle 12c+ SELECT (FETCH FIRST)",
            Target::Mongo => "MongoDB find command",
            Target::MongoPipeline => "MongoDB aggregation pipeline",
            Target::Elastic => "Elasticsearch search body",
            Target::Cassandra => "Cassandra CQL",
            Target::Neo4j => "Neo4j Cypher",
            Target::OrientDb => "OrientDB MATCH",
        }
    }

    /// The SQL dialect behind a relational target.
    pub fn dialect(&self) -> Option<Dialect> {
        match self {
            Target::Postgres => Some(Dialect::Postgres),
            Target::MySQL => Some(Dialect::MySQL),
            Target::MariaDB => Some(Dialect::MariaDB),
            Target::SqlServer => Some(Dialect::SqlServer),
            Target::Oracle => Some(Dialect::Oracle),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Target {
    type Err = UqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase();
        if let Ok(dialect) = key.parse::<Dialect>() {
            return Ok(Target::from(dialect));
        }
        match key.as_str() {
            "mongo" | "mongodb" => Ok(Target::Mongo),
            "mongo-pipeline" | "pipeline" => Ok(Target::MongoPipeline),
            "elastic" | "elasticsearch" | "es" => Ok(Target::Elastic),
            "cassandra" | "cql" => Ok(Target::Cassandra),
            "neo4j" | "cypher" => Ok(Target::Neo4j),
            "orientdb" | "orient" => Ok(Target::OrientDb),
            other => Err(UqlError::Validation(format!(
                "unknown target '{other}' (see `uql targets`)"
            ))),
        }
    }
}

impl From<Dialect> for Target {
    fn from(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Postgres => Target::Postgres,
            Dialect::MySQL => Target::MySQL,
            Dialect::MariaDB => Target::MariaDB,
            Dialect::SqlServer => Target::SqlServer,
            Dialect::Oracle => Target::Oracle,
        }
    }
}

/// Per-call switches. Each only affects the targets it names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    /// SQL targets: placeholders plus a separate value list.
    pub parameterized: bool,
    /// Cassandra: append `ALLOW FILTERING`.
    pub allow_filtering: bool,
}

/// A translated query.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Sql(String),
    Parameterized { sql: String, params: Vec<Value> },
    MongoFind { collection: String, find: MongoFind },
    MongoPipeline { collection: String, stages: Vec<Value> },
    Elastic { index: String, body: Value },
    /// CQL, Cypher and OrientDB text.
    Statement(String),
}

impl Output {
    /// True when the natural form of this output is a JSON document.
    pub fn is_json(&self) -> bool {
        !matches!(self, Output::Sql(_) | Output::Statement(_))
    }

    pub fn to_json(&self) -> UqlResult<Value> {
        Ok(match self {
            Output::Sql(sql) | Output::Statement(sql) => json!({ "query": sql }),
            Output::Parameterized { sql, params } => json!({ "query": sql, "params": params }),
            Output::MongoFind { collection, find } => {
                json!({ "collection": collection, "find": serde_json::to_value(find)? })
            }
            Output::MongoPipeline { collection, stages } => {
                json!({ "collection": collection, "pipeline": stages })
            }
            Output::Elastic { index, body } => json!({ "index": index, "body": body }),
        })
    }

    /// Text for a terminal: statements as-is, documents as JSON.
    pub fn render(&self, pretty: bool) -> UqlResult<String> {
        match self {
            Output::Sql(sql) | Output::Statement(sql) => Ok(sql.clone()),
            Output::Parameterized { sql, params } => {
                Ok(format!("{}\n-- params: {}", sql, serde_json::to_string(params)?))
            }
            _ => {
                let doc = self.to_json()?;
                Ok(if pretty {
                    serde_json::to_string_pretty(&doc)?
                } else {
                    serde_json::to_string(&doc)?
                })
            }
        }
    }
}

/// Validate `query` and translate it for `target`.
///
/// Nothing is produced when any part of the query cannot be expressed.
pub fn translate(query: &Query, target: Target, options: &TranslateOptions) -> UqlResult<Output> {
    query.validate()?;
    debug!(%target, from = %query.from, ?options, "translating");

    let output = match (target.dialect(), target) {
        (Some(dialect), _) if options.parameterized => {
            let (sql, params) = query.to_sql_parameterized(dialect)?;
            Output::Parameterized { sql, params }
        }
        (Some(dialect), _) => Output::Sql(query.to_sql_with_dialect(dialect)?),
        (None, Target::Mongo) => Output::MongoFind {
            collection: query.from.clone(),
            find: query.to_mongo()?,
        },
        (None, Target::MongoPipeline) => Output::MongoPipeline {
            collection: query.from.clone(),
            stages: query.to_mongo_pipeline()?,
        },
        (None, Target::Elastic) => Output::Elastic {
            index: query.from.clone(),
            body: query.to_elastic()?,
        },
        (None, Target::Cassandra) => {
            let cql = CqlOptions {
                allow_filtering: options.allow_filtering,
            };
            Output::Statement(query.to_cql_with(&cql)?)
        }
        (None, Target::Neo4j) => Output::Statement(query.to_cypher()?),
        (None, Target::OrientDb) => Output::Statement(query.to_orientdb()?),
        (None, other) => {
            return Err(UqlError::Validation(format!("target '{other}' has no translator")));
        }
    };

    info!(%target, "translated");
    Ok(output)
}
