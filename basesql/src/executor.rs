//! Executor collaborator interface and the `run` orchestration.
//!
//! The engine never touches a connection. An adapter over a concrete
//! database client implements [`QueryExecutor`]; [`SqlEngine::run`] converts
//! both assembled statements to the adapter's parameter style, issues them
//! concurrently and folds the row count into [`PaginationMetadata`].

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::builder::SqlEngine;
use crate::dialect::DatabaseType;
use crate::error::{Error, Result};
use crate::pagination::PaginationMetadata;
use crate::params::{Bindings, ParameterStyle, convert_parameter_style};
use crate::request::QueryRequest;
use crate::value::Value;

/// One result row, columns in select order.
pub type Row = IndexMap<String, Value>;

/// Column alias the count statement reports the total under.
const TOTAL_ROWS_COLUMN: &str = "TOTALROWS";

/// Adapter over a database client.
///
/// Retries, timeouts and connection handling belong to the implementation.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Driver error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Dialect of the connected database.
    fn database_type(&self) -> DatabaseType;

    /// Placeholder style the driver binds.
    fn parameter_style(&self) -> ParameterStyle {
        ParameterStyle::Named
    }

    /// Run a read statement and return every row.
    async fn query(&self, sql: &str, bindings: &Bindings) -> Result<Vec<Row>, Self::Error>;

    /// Run a read statement and return the first row, if any.
    async fn query_one(&self, sql: &str, bindings: &Bindings) -> Result<Option<Row>, Self::Error> {
        Ok(self.query(sql, bindings).await?.into_iter().next())
    }
}

/// A page of records with its pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ListOfRecords {
    /// Page information derived from the count statement.
    pub meta: PaginationMetadata,
    /// Rows of the requested page.
    pub records: Vec<Row>,
}

/// Read `TOTALROWS` from a count row, whatever case the driver reports it in.
fn total_rows(row: Option<&Row>) -> Result<u64> {
    row.and_then(|row| {
        row.iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(TOTAL_ROWS_COLUMN))
    })
    .and_then(|(_, value)| value.as_count())
    .ok_or(Error::MissingRowCount)
}

impl SqlEngine {
    /// Assemble a request, run the data and count statements, and return
    /// the page with its metadata.
    pub async fn run<E>(&self, executor: &E, request: &QueryRequest) -> Result<ListOfRecords>
    where
        E: QueryExecutor + ?Sized,
    {
        let executor_dialect = executor.database_type();
        if executor_dialect != self.database_type() {
            return Err(Error::DialectMismatch {
                engine: self.database_type(),
                executor: executor_dialect,
            });
        }

        let query = self.assemble(request)?;
        let style = executor.parameter_style();
        let data = convert_parameter_style(&query.statement, &query.parameters, style)?;
        let count = convert_parameter_style(&query.count_statement, &query.parameters, style)?;

        let (records, count_row) = futures::try_join!(
            executor.query(&data.sql, &data.bindings),
            executor.query_one(&count.sql, &count.bindings),
        )
        .map_err(Error::executor)?;

        let meta = query.metadata(total_rows(count_row.as_ref())?);

        tracing::debug!(
            rows = records.len(),
            total_rows = meta.total_rows,
            total_pages = meta.total_pages,
            "query run complete"
        );

        Ok(ListOfRecords { meta, records })
    }
}
