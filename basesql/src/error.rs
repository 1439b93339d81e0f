//! Error types for query assembly and execution.

use thiserror::Error;

use crate::dialect::DatabaseType;

/// Errors raised while configuring the engine, assembling a query or running it.
///
/// Configuration and argument errors abort the call immediately; nothing in
/// this crate retries. Database failures are surfaced through
/// [`Error::Executor`] untouched.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The dialect tag does not name a supported database.
    #[error("Not supported database '{0}'")]
    UnsupportedDatabase(String),

    /// An operator name outside the fixed search operator catalog.
    #[error("Unknown search operator '{0}'")]
    UnknownOperator(String),

    /// A composite identifier does not cover every primary key field.
    #[error(
        "The filter for a primary key should have an equal number of fields as the key itself \
         (expected {expected}, got {actual})"
    )]
    PrimaryKeyMismatch {
        /// Number of declared primary key fields.
        expected: usize,
        /// Number of supplied values that matched a declared field.
        actual: usize,
    },

    /// A caller-supplied column reference failed the safety check.
    #[error("Invalid {context} column '{column}'")]
    InvalidColumn {
        /// The rejected column text.
        column: String,
        /// Where the column was used (`filter`, `order`).
        context: &'static str,
    },

    /// The statement references a placeholder that has no bound value.
    #[error("Parameter ':{0}' has no bound value")]
    MissingParameter(String),

    /// The executor targets a different dialect than the engine.
    #[error("Executor dialect {executor} does not match engine dialect {engine}")]
    DialectMismatch {
        /// Dialect the engine was built for.
        engine: DatabaseType,
        /// Dialect reported by the executor.
        executor: DatabaseType,
    },

    /// The count statement produced no usable `TOTALROWS` value.
    #[error("Count statement returned no TOTALROWS value")]
    MissingRowCount,

    /// Failure reported by the executor collaborator.
    #[error("Executor error: {0}")]
    Executor(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The engine configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The engine configuration could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap an executor failure.
    pub fn executor<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Executor(Box::new(err))
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
