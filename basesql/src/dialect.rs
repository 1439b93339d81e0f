//! SQL dialect implementations for MySQL, Postgres and SQL Server.
//!
//! Each dialect handles the specific syntax differences between databases:
//! the pagination clause and case-insensitive pattern matching. Everything
//! else in a predicate fragment is shared and lives in the trait's provided
//! methods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::search::SearchOperator;

/// SQL dialect trait for database-specific syntax.
///
/// This is the search-column resolver interface: one implementation per
/// database, selected once when the engine is built.
pub trait Dialect: Clone + Copy {
    /// The tag this dialect answers to.
    fn database_type(&self) -> DatabaseType;

    /// Format the pagination clause for a non-empty page window.
    ///
    /// Callers go through [`Paginator`](crate::Paginator), which short-circuits
    /// `page == 0` / `per_page == 0` before reaching the dialect.
    fn pagination_clause(&self, limit: u64, offset: u64) -> String;

    /// Format a case-insensitive pattern match against a named placeholder.
    fn i_like_clause(&self, column: &str, name: &str) -> String;

    /// Format a case-sensitive pattern match against a named placeholder.
    #[inline]
    fn like_clause(&self, column: &str, name: &str) -> String {
        format!("{column} LIKE :{name}")
    }

    /// Build the predicate fragment for one column/operator pair.
    ///
    /// `name` is the placeholder name without the leading colon. The match is
    /// exhaustive over the operator catalog.
    fn search_fragment(&self, column: &str, op: SearchOperator, name: &str) -> String {
        use SearchOperator as Op;

        match op {
            Op::Eq | Op::True | Op::False => format!("{column} = :{name}"),
            Op::NotEq => format!("{column} <> :{name}"),
            Op::Lt => format!("{column} < :{name}"),
            Op::Lteq => format!("{column} <= :{name}"),
            Op::Gt => format!("{column} > :{name}"),
            Op::Gteq => format!("{column} >= :{name}"),

            Op::Like | Op::Matches | Op::Cont | Op::Start | Op::End => {
                self.like_clause(column, name)
            },
            Op::ILike | Op::ICont => self.i_like_clause(column, name),
            Op::NotCont | Op::NotStart | Op::NotEnd => {
                format!("NOT ({})", self.like_clause(column, name))
            },
            Op::NotICont => format!("NOT ({})", self.i_like_clause(column, name)),

            Op::In => format!("{column} IN (:{name})"),
            Op::NotIn => format!("NOT ({column} IN (:{name}))"),

            Op::Null => format!("{column} IS NULL"),
            Op::NotNull => format!("{column} IS NOT NULL"),
            Op::Blank | Op::Empty => format!("({column} IS NULL OR {column} = ' ')"),
            Op::NotEmpty | Op::Present => format!("({column} IS NOT NULL OR {column} <> ' ')"),
        }
    }
}

/// MySQL / MariaDB dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    #[inline]
    fn database_type(&self) -> DatabaseType {
        DatabaseType::MySql
    }

    #[inline]
    fn pagination_clause(&self, limit: u64, offset: u64) -> String {
        format!("LIMIT {limit} OFFSET {offset}")
    }

    #[inline]
    fn i_like_clause(&self, column: &str, name: &str) -> String {
        // Column collation may be case-sensitive (utf8mb4_bin), so fold both sides.
        format!("LOWER({column}) LIKE LOWER(:{name})")
    }
}

/// Postgres dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    #[inline]
    fn pagination_clause(&self, limit: u64, offset: u64) -> String {
        format!("LIMIT {limit} OFFSET {offset}")
    }

    #[inline]
    fn i_like_clause(&self, column: &str, name: &str) -> String {
        format!("{column} ILIKE :{name}")
    }
}

/// SQL Server dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsSql;

/// Case- and accent-insensitive collation applied to `i_` operators.
const MSSQL_CI_COLLATION: &str = "Latin1_General_CI_AI";

impl Dialect for MsSql {
    #[inline]
    fn database_type(&self) -> DatabaseType {
        DatabaseType::MsSql
    }

    #[inline]
    fn pagination_clause(&self, limit: u64, offset: u64) -> String {
        // T-SQL requires an ORDER BY for OFFSET/FETCH; the caller supplies it.
        format!("OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY")
    }

    #[inline]
    fn i_like_clause(&self, column: &str, name: &str) -> String {
        format!("{column} COLLATE {MSSQL_CI_COLLATION} LIKE :{name}")
    }
}

/// Closed set of supported database families.
///
/// The tag is chosen once per engine and dispatches to the matching
/// [`Dialect`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum DatabaseType {
    /// MySQL and MariaDB.
    MySql,
    /// PostgreSQL.
    Postgres,
    /// Microsoft SQL Server.
    MsSql,
}

impl DatabaseType {
    /// Canonical lowercase tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::MsSql => "mssql",
        }
    }
}

impl FromStr for DatabaseType {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mssql" | "sqlserver" | "sql_server" => Ok(Self::MsSql),
            _ => Err(Error::UnsupportedDatabase(tag.to_string())),
        }
    }
}

impl TryFrom<String> for DatabaseType {
    type Error = Error;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl From<DatabaseType> for &'static str {
    fn from(db: DatabaseType) -> Self {
        db.as_str()
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Dialect for DatabaseType {
    #[inline]
    fn database_type(&self) -> DatabaseType {
        *self
    }

    fn pagination_clause(&self, limit: u64, offset: u64) -> String {
        match self {
            Self::MySql => MySql.pagination_clause(limit, offset),
            Self::Postgres => Postgres.pagination_clause(limit, offset),
            Self::MsSql => MsSql.pagination_clause(limit, offset),
        }
    }

    fn i_like_clause(&self, column: &str, name: &str) -> String {
        match self {
            Self::MySql => MySql.i_like_clause(column, name),
            Self::Postgres => Postgres.i_like_clause(column, name),
            Self::MsSql => MsSql.i_like_clause(column, name),
        }
    }

    fn like_clause(&self, column: &str, name: &str) -> String {
        match self {
            Self::MySql => MySql.like_clause(column, name),
            Self::Postgres => Postgres.like_clause(column, name),
            Self::MsSql => MsSql.like_clause(column, name),
        }
    }

    fn search_fragment(&self, column: &str, op: SearchOperator, name: &str) -> String {
        match self {
            Self::MySql => MySql.search_fragment(column, op, name),
            Self::Postgres => Postgres.search_fragment(column, op, name),
            Self::MsSql => MsSql.search_fragment(column, op, name),
        }
    }
}
