// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // SQL keywords in docs
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self
#![allow(clippy::must_use_candidate)] // Fluent API doesn't need must_use
#![allow(clippy::match_same_arms)] // Operator families share fragments on purpose
#![allow(clippy::cast_possible_truncation)] // Lenient numeric coercion truncates
#![allow(clippy::cast_precision_loss)] // Integer ids widened to float columns
#![allow(clippy::cast_sign_loss)] // Counts checked non-negative before casting
#![allow(clippy::indexing_slicing)] // Byte scanners check bounds before indexing

//! # basesql - Dialect-aware SQL query assembly
//!
//! Turns an abstract query description (base statement, search term and
//! searchable columns, structured filters, grouping, ordering, pagination)
//! into a parameterized statement, a matching row-count statement and the
//! bound parameter map, for MySQL, Postgres and SQL Server.
//!
//! ## Quick Start
//!
//! ```
//! # use basesql::prelude::*;
//! let engine = SqlEngine::from_tag("mssql").unwrap();
//!
//! let request = QueryRequest::new("SELECT id, name FROM users")
//!     .filter("age", FilterCondition::new(SearchOperator::Gteq, "18").with_type(SearchColumnType::Number))
//!     .filter("deleted_at", FilterCondition::check(SearchOperator::Null))
//!     .order_by("name", SortDir::Asc)
//!     .paginate(3, 20);
//!
//! let query = engine.assemble(&request).unwrap();
//! assert_eq!(
//!     query.statement,
//!     "SELECT id, name FROM users WHERE age >= :age_gteq AND deleted_at IS NULL \
//!      ORDER BY name ASC OFFSET 40 ROWS FETCH NEXT 20 ROWS ONLY"
//! );
//! assert_eq!(query.parameters["age_gteq"], Value::Int(18));
//! assert_eq!(query.metadata(125).total_pages, 7);
//! ```
//!
//! ## Dialects
//!
//! | Tag | Case-insensitive match | Pagination |
//! |-----|------------------------|------------|
//! | `mysql` | `LOWER(col) LIKE LOWER(:p)` | `LIMIT n OFFSET o` |
//! | `postgres` | `col ILIKE :p` | `LIMIT n OFFSET o` |
//! | `mssql` | `col COLLATE Latin1_General_CI_AI LIKE :p` | `OFFSET o ROWS FETCH NEXT n ROWS ONLY` |
//!
//! ## Operators
//!
//! | Operator | SQL | Bound value |
//! |----------|-----|-------------|
//! | `eq` `not_eq` `lt` `lteq` `gt` `gteq` | `col = :p` ... | coerced per column type |
//! | `like` `matches` `i_like` | `col LIKE :p` | caller pattern |
//! | `cont` `start` `end` `i_cont` | `col LIKE :p` | `%v%` `v%` `%v` |
//! | `not_cont` `not_start` `not_end` `not_i_cont` | `NOT (col LIKE :p)` | same wrapping |
//! | `in` `not_in` | `col IN (:p)` | list, split on commas |
//! | `null` `not_null` | `col IS NULL` | none |
//! | `blank` `empty` `not_empty` `present` | `(col IS NULL OR col = ' ')` ... | none |
//! | `true` `false` | `col = :p` | boolean |
//!
//! ## Parameter Styles
//!
//! Statements use `:name` placeholders. Drivers that bind `$1` or `?` get a
//! rewritten statement from [`convert_parameter_style`]; [`SqlEngine::run`]
//! does this automatically from [`QueryExecutor::parameter_style`].

mod builder;
mod config;
mod dialect;
mod error;
mod executor;
mod pagination;
mod params;
mod request;
mod search;
mod validate;
mod value;

pub use builder::{AssembledQuery, SqlEngine};
pub use config::EngineConfig;
pub use dialect::{DatabaseType, Dialect, MsSql, MySql, Postgres};
pub use error::{Error, Result};
pub use executor::{ListOfRecords, QueryExecutor, Row};
pub use pagination::{PaginationMetadata, Paginator};
pub use params::{
    Bindings, ConvertedStatement, ParameterStyle, convert_parameter_style, placeholder_names,
};
pub use request::{
    DEFAULT_PER_PAGE, FilterCondition, FilterConditions, Identifier, PrimaryKey, QueryDefinition,
    QueryOverrides, QueryRequest, SortDir, identifier_filter, normalize_statement,
};
pub use search::{
    Predicate, SearchColumn, SearchColumnFactory, SearchColumnType, SearchOperator, format_value,
    parameter_name, resolve,
};
pub use validate::{check_column, is_valid_column_reference, is_valid_sql_identifier};
pub use value::{Params, Value};

/// Prelude module for convenient imports.
///
/// ```
/// use basesql::prelude::*;
/// let engine = SqlEngine::new(DatabaseType::Postgres);
/// assert_eq!(engine.paginator().clause(2, 50), "LIMIT 50 OFFSET 50");
/// ```
pub mod prelude {
    pub use crate::{
        AssembledQuery, Bindings, DatabaseType, Dialect, EngineConfig, Error, FilterCondition,
        FilterConditions, Identifier, ListOfRecords, PaginationMetadata, ParameterStyle, Params,
        PrimaryKey, QueryDefinition, QueryExecutor, QueryOverrides, QueryRequest, Result, Row,
        SearchColumnType, SearchOperator, SortDir, SqlEngine, Value, convert_parameter_style,
    };
}
