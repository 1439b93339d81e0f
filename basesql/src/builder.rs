//! Clause assembly: base statement plus WHERE, GROUP BY, ORDER BY and
//! pagination, with the matching row-count statement.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::dialect::DatabaseType;
use crate::error::Result;
use crate::pagination::{PaginationMetadata, Paginator};
use crate::params::skip_span;
use crate::request::{
    FilterConditions, QueryDefinition, QueryOverrides, QueryRequest, SortDir, identifier_filter,
    normalize_statement,
};
use crate::search::{Predicate, SearchColumnFactory};
use crate::validate::check_column;
use crate::value::{Params, Value};

/// Output of [`SqlEngine::assemble`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
#[must_use = "AssembledQuery must be used to execute the query"]
pub struct AssembledQuery {
    /// Data statement with `:name` placeholders.
    pub statement: String,
    /// `SELECT COUNT(*) TOTALROWS FROM (...) TABCOUNT` over the same predicates.
    pub count_statement: String,
    /// Bound values for both statements.
    pub parameters: Params,
    /// Effective page (0 when pagination is off).
    pub page: u32,
    /// Effective page size (0 when pagination is off).
    pub per_page: u32,
}

impl AssembledQuery {
    /// Pagination metadata for this query given the count result.
    pub const fn metadata(&self, total_rows: u64) -> PaginationMetadata {
        PaginationMetadata::new(self.page, self.per_page, total_rows)
    }
}

/// Stateless query assembly engine for one dialect.
///
/// Cheap to copy and safe to share across threads; the dialect is fixed at
/// construction.
///
/// # Example
///
/// ```
/// use basesql::{FilterCondition, QueryRequest, SearchColumnType, SearchOperator, SqlEngine, Value};
///
/// let engine = SqlEngine::from_tag("postgres").unwrap();
/// let request = QueryRequest::new("SELECT * FROM users")
///     .filter("status", FilterCondition::eq("A"))
///     .search_column("name", SearchOperator::Cont, SearchColumnType::String)
///     .search("foo");
///
/// let query = engine.assemble(&request).unwrap();
/// assert_eq!(
///     query.statement,
///     "SELECT * FROM users WHERE status = :status_eq AND (name LIKE :name_cont) LIMIT 50 OFFSET 0"
/// );
/// assert_eq!(query.parameters["name_cont"], Value::from("%foo%"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlEngine {
    dialect: DatabaseType,
}

impl SqlEngine {
    /// Create an engine for a known dialect.
    pub const fn new(dialect: DatabaseType) -> Self {
        Self { dialect }
    }

    /// Create an engine from a dialect tag. Unsupported tags fail here.
    pub fn from_tag(tag: &str) -> Result<Self> {
        Ok(Self::new(tag.parse()?))
    }

    /// Create an engine for a loaded configuration.
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.database)
    }

    /// The dialect this engine assembles for.
    pub const fn database_type(&self) -> DatabaseType {
        self.dialect
    }

    /// Search-column factory bound to this engine's dialect.
    pub const fn search_columns(&self) -> SearchColumnFactory {
        SearchColumnFactory::new(self.dialect)
    }

    /// Paginator bound to this engine's dialect.
    pub const fn paginator(&self) -> Paginator {
        Paginator::new(self.dialect)
    }

    /// Pagination metadata for a page window and total row count.
    pub const fn metadata(&self, page: u32, per_page: u32, total_rows: u64) -> PaginationMetadata {
        PaginationMetadata::new(page, per_page, total_rows)
    }

    /// Merge caller overrides onto an entity definition, then assemble.
    pub fn assemble_with(
        &self,
        definition: &QueryDefinition,
        overrides: QueryOverrides,
    ) -> Result<AssembledQuery> {
        self.assemble(&definition.request(overrides))
    }

    /// Assemble the data statement, count statement and parameter map.
    ///
    /// An identifier shorthand replaces the filter with primary-key
    /// equality, drops the search group and turns pagination off.
    pub fn assemble(&self, request: &QueryRequest) -> Result<AssembledQuery> {
        let statement = normalize_statement(&request.statement);

        let (filter, search_term, page, per_page) = match request.identifier() {
            Some(id) => (
                Cow::Owned(identifier_filter(&request.primary_key, id)?),
                "",
                0,
                0,
            ),
            None => (
                Cow::Borrowed(&request.filter),
                request.search_term.as_str(),
                request.page,
                request.per_page,
            ),
        };

        for field in filter.keys() {
            check_column(field, "filter")?;
        }
        for column in request.order.keys() {
            check_column(column, "order")?;
        }

        let mut parameters = Params::new();

        let filter_group = self.filter_group(&filter, &mut parameters);
        let search_group = self.search_group(request, search_term, &mut parameters);

        let conditions: Vec<String> = [filter_group, search_group]
            .into_iter()
            .flatten()
            .collect();
        let where_clause = if conditions.is_empty() {
            String::new()
        } else if has_top_level_where(&statement) {
            format!("AND {}", conditions.join(" AND "))
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let group_clause = if request.group_by.is_empty() {
            String::new()
        } else {
            format!("GROUP BY {}", request.group_by.join(", "))
        };

        let filtered = join_clauses(&[&statement, &where_clause, &group_clause]);
        let count_statement = format!("SELECT COUNT(*) TOTALROWS FROM ({filtered}) TABCOUNT");

        let order_clause = order_clause(&request.order);
        let pagination_clause = self.paginator().clause(page, per_page);
        let statement = join_clauses(&[&filtered, &order_clause, &pagination_clause]);

        for (name, value) in &request.params {
            if parameters.insert(name.clone(), value.clone()).is_some() {
                tracing::warn!(
                    name = %name,
                    "static parameter overrides a predicate binding"
                );
            }
        }

        tracing::debug!(
            dialect = %self.dialect,
            statement = %statement,
            count_statement = %count_statement,
            parameters = parameters.len(),
            "assembled query"
        );

        Ok(AssembledQuery {
            statement,
            count_statement,
            parameters,
            page,
            per_page,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // PREDICATE GROUPS
    // ═══════════════════════════════════════════════════════════════════════

    /// AND-join every filter condition, or `None` when there are none.
    fn filter_group(
        &self,
        filter: &IndexMap<String, FilterConditions>,
        parameters: &mut Params,
    ) -> Option<String> {
        let factory = self.search_columns();
        let fragments: Vec<String> = filter
            .iter()
            .flat_map(|(field, conditions)| {
                conditions
                    .as_slice()
                    .iter()
                    .map(move |condition| (field, condition))
            })
            .map(|(field, condition)| {
                let predicate = factory.resolve(field, condition.ty, condition.op, &condition.value);
                bind(parameters, predicate)
            })
            .collect();

        (!fragments.is_empty()).then(|| fragments.join(" AND "))
    }

    /// OR-join the search columns against the term, wrapped in parentheses.
    fn search_group(
        &self,
        request: &QueryRequest,
        term: &str,
        parameters: &mut Params,
    ) -> Option<String> {
        if term.is_empty() || request.search_columns.is_empty() {
            return None;
        }

        let factory = self.search_columns();
        let value = Value::from(term);
        let fragments: Vec<String> = request
            .search_columns
            .iter()
            .map(|(column, declared)| {
                bind(
                    parameters,
                    factory.resolve(column, declared.ty, declared.op, &value),
                )
            })
            .collect();

        Some(format!("({})", fragments.join(" OR ")))
    }
}

/// Record a predicate's binding and hand back its SQL.
fn bind(parameters: &mut Params, predicate: Predicate) -> String {
    let Predicate { sql, name, value } = predicate;
    if let Some(value) = value
        && parameters.insert(name.clone(), value).is_some()
    {
        tracing::warn!(name = %name, "duplicate parameter name, last value wins");
    }
    sql
}

fn order_clause(order: &IndexMap<String, SortDir>) -> String {
    if order.is_empty() {
        return String::new();
    }
    let columns: Vec<String> = order
        .iter()
        .map(|(column, dir)| format!("{column} {}", dir.as_sql()))
        .collect();
    format!("ORDER BY {}", columns.join(", "))
}

/// Join non-empty clauses with single spaces.
fn join_clauses(clauses: &[&str]) -> String {
    clauses
        .iter()
        .filter(|clause| !clause.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the statement has a `WHERE` outside parentheses, quotes and
/// comments.
fn has_top_level_where(sql: &str) -> bool {
    let bytes = sql.as_bytes();
    let mut depth: usize = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(end) = skip_span(bytes, i) {
            i = end;
            continue;
        }

        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b'w' | b'W' if depth == 0 && is_keyword_at(bytes, i, b"where") => return true,
            _ => {},
        }
        i += 1;
    }

    false
}

fn is_keyword_at(bytes: &[u8], at: usize, keyword: &[u8]) -> bool {
    let end = at + keyword.len();
    let Some(candidate) = bytes.get(at..end) else {
        return false;
    };
    let is_word = |b: &u8| b.is_ascii_alphanumeric() || *b == b'_';
    candidate.eq_ignore_ascii_case(keyword)
        && (at == 0 || !is_word(&bytes[at - 1]))
        && !bytes.get(end).is_some_and(is_word)
}
