//! SQL dialect support

use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect};
use std::str::FromStr;

/// Dialects the DDL parser can be driven with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlDialect {
    #[default]
    MySQL,
    PostgreSQL,
}

impl SqlDialect {
    /// Get the sqlparser dialect for parsing
    pub fn parser_dialect(&self) -> Box<dyn Dialect> {
        match self {
            SqlDialect::MySQL => Box::new(MySqlDialect {}),
            SqlDialect::PostgreSQL => Box::new(PostgreSqlDialect {}),
        }
    }

    /// Whether `#` starts a line comment in this dialect
    pub fn hash_comments(&self) -> bool {
        matches!(self, SqlDialect::MySQL)
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mysql8" => Ok(SqlDialect::MySQL),
            "postgresql" | "postgres" | "pg" => Ok(SqlDialect::PostgreSQL),
            _ => Err(format!(
                "Unknown dialect: '{}'. Supported dialects: mysql, postgresql.",
                s
            )),
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlDialect::MySQL => write!(f, "mysql"),
            SqlDialect::PostgreSQL => write!(f, "postgresql"),
        }
    }
}
