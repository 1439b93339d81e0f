//! Offset pagination: the dialect-specific page clause and the metadata
//! derived from a total row count.
//!
//! | Dialect | Clause for `page = 3, per_page = 20` |
//! |---------|--------------------------------------|
//! | MySQL / Postgres | `LIMIT 20 OFFSET 40` |
//! | SQL Server | `OFFSET 40 ROWS FETCH NEXT 20 ROWS ONLY` |
//!
//! A zero page or zero page size turns pagination off: the clause is empty
//! and [`PaginationMetadata`] reports a single page.

mod metadata;

pub use metadata::PaginationMetadata;

use crate::dialect::{DatabaseType, Dialect};
use crate::error::Result;

/// Builds pagination clauses for the dialect chosen at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    dialect: DatabaseType,
}

impl Paginator {
    /// Create a paginator for a known dialect.
    pub const fn new(dialect: DatabaseType) -> Self {
        Self { dialect }
    }

    /// Create a paginator from a dialect tag such as `"mssql"`.
    pub fn from_tag(tag: &str) -> Result<Self> {
        Ok(Self::new(tag.parse()?))
    }

    /// The dialect this paginator renders for.
    pub const fn dialect(&self) -> DatabaseType {
        self.dialect
    }

    /// Pagination clause for a 1-based page.
    ///
    /// Returns an empty string without consulting the dialect when either
    /// argument is zero.
    pub fn clause(&self, page: u32, per_page: u32) -> String {
        if page == 0 || per_page == 0 {
            return String::new();
        }
        let limit = u64::from(per_page);
        let offset = u64::from(page - 1) * limit;
        self.dialect.pagination_clause(limit, offset)
    }
}
