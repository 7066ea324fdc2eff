use std::fmt;
use std::str::FromStr;

use crate::error::UqlError;
use crate::transpiler::sql::mariadb::MariaDbGenerator;
use crate::transpiler::sql::mysql::MysqlGenerator;
use crate::transpiler::sql::oracle::OracleGenerator;
use crate::transpiler::sql::postgres::PostgresGenerator;
use crate::transpiler::sql::sqlserver::SqlServerGenerator;
use crate::transpiler::traits::SqlGenerator;

/// Supported SQL Dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    MySQL,
    MariaDB,
    SqlServer,
    Oracle,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::Postgres,
        Dialect::MySQL,
        Dialect::MariaDB,
        Dialect::SqlServer,
        Dialect::Oracle,
    ];

    pub fn generator(&self) -> Box<dyn SqlGenerator> {
        match self {
            Dialect::Postgres => Box::new(PostgresGenerator),
            Dialect::MySQL => Box::new(MysqlGenerator),
            Dialect::MariaDB => Box::new(MariaDbGenerator),
            Dialect::SqlServer => Box::new(SqlServerGenerator),
            Dialect::Oracle => Box::new(OracleGenerator),
        }
    }

    /// Short lowercase key, as accepted by `FromStr`.
    pub fn key(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySQL => "mysql",
            Dialect::MariaDB => "mariadb",
            Dialect::SqlServer => "sqlserver",
            Dialect::Oracle => "oracle",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dialect {
    type Err = UqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySQL),
            "mariadb" => Ok(Dialect::MariaDB),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "oracle" => Ok(Dialect::Oracle),
            other => Err(UqlError::Validation(format!("unknown SQL dialect '{other}'"))),
        }
    }
}
