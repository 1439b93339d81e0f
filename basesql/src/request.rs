//! Query requests, entity definitions and the default/override merge.
//!
//! A [`QueryDefinition`] holds what an entity always supplies (base
//! statement, primary key, searchable columns, default order and page size).
//! Callers send [`QueryOverrides`]; [`QueryDefinition::request`] merges the
//! two into the effective [`QueryRequest`] the engine assembles.
//!
//! # Merge precedence
//!
//! Every field set in the overrides replaces the definition's value
//! wholesale. Fields left unset keep the definition's value, or the request
//! default when the definition has none (`page = 1`, `per_page = 50`, empty
//! search term, empty filter).

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::search::{SearchColumn, SearchColumnType, SearchOperator};
use crate::value::{Params, Value};

/// Page size used when neither the definition nor the caller sets one.
pub const DEFAULT_PER_PAGE: u32 = 50;

const fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

// ═══════════════════════════════════════════════════════════════════════════
// FILTERS AND ORDERING
// ═══════════════════════════════════════════════════════════════════════════

/// One condition attached to a filter field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Comparison operator.
    pub op: SearchOperator,
    /// Raw value, formatted per operator and type at assembly.
    #[serde(default)]
    pub value: Value,
    /// Declared column type, `string` when omitted.
    #[serde(rename = "type", default)]
    pub ty: SearchColumnType,
}

impl FilterCondition {
    /// Create a condition with the default `string` column type.
    pub fn new(op: SearchOperator, value: impl Into<Value>) -> Self {
        Self {
            op,
            value: value.into(),
            ty: SearchColumnType::default(),
        }
    }

    /// Equality condition.
    pub fn eq(value: impl Into<Value>) -> Self {
        Self::new(SearchOperator::Eq, value)
    }

    /// Condition for an operator that binds no value (`null`, `blank`, ...).
    pub fn check(op: SearchOperator) -> Self {
        Self::new(op, Value::Null)
    }

    /// Set the declared column type.
    pub const fn with_type(mut self, ty: SearchColumnType) -> Self {
        self.ty = ty;
        self
    }
}

/// A single condition or an ordered list of conditions for one field.
///
/// Every condition becomes its own predicate, ANDed with the rest of the
/// filter group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterConditions {
    /// `{"op": "eq", "value": 1}`
    One(FilterCondition),
    /// `[{"op": "gteq", ...}, {"op": "lt", ...}]`
    Many(Vec<FilterCondition>),
}

impl FilterConditions {
    /// The conditions in declaration order.
    pub fn as_slice(&self) -> &[FilterCondition] {
        match self {
            Self::One(condition) => std::slice::from_ref(condition),
            Self::Many(conditions) => conditions,
        }
    }
}

impl From<FilterCondition> for FilterConditions {
    fn from(condition: FilterCondition) -> Self {
        Self::One(condition)
    }
}

impl From<Vec<FilterCondition>> for FilterConditions {
    fn from(conditions: Vec<FilterCondition>) -> Self {
        Self::Many(conditions)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    /// Ascending order.
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    /// Descending order.
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDir {
    /// SQL keyword for this direction.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// IDENTIFIER SHORTHAND
// ═══════════════════════════════════════════════════════════════════════════

/// Primary key declaration: one field or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    /// `primary_key = "id"`
    Single(String),
    /// `primary_key = ["tenant_id", "id"]`
    Composite(Vec<String>),
}

impl PrimaryKey {
    /// Field names in declaration order.
    pub fn fields(&self) -> Vec<String> {
        match self {
            Self::Single(field) => vec![field.clone()],
            Self::Composite(fields) => fields.clone(),
        }
    }
}

impl Default for PrimaryKey {
    fn default() -> Self {
        Self::Single("id".to_string())
    }
}

/// Identifier shorthand: a scalar id or a primary-key field to value map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Field to value map for composite keys.
    Composite(IndexMap<String, Value>),
    /// Single value for a one-field key.
    Scalar(Value),
}

impl Identifier {
    /// A `Null` or empty-string scalar counts as no identifier at all.
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Scalar(value) => value.is_blank(),
            Self::Composite(_) => false,
        }
    }
}

impl From<Value> for Identifier {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Self::Scalar(Value::Int(id))
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self::Scalar(Value::from(id))
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self::Scalar(Value::String(id))
    }
}

impl From<IndexMap<String, Value>> for Identifier {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Self::Composite(fields)
    }
}

/// Column type implied by an identifier value.
fn identifier_type(value: &Value) -> SearchColumnType {
    match value {
        Value::Int(_) => SearchColumnType::Number,
        Value::Float(_) => SearchColumnType::Float,
        _ => SearchColumnType::String,
    }
}

fn identifier_condition(value: &Value) -> FilterConditions {
    FilterCondition::eq(value.clone())
        .with_type(identifier_type(value))
        .into()
}

/// Derive primary-key equality filters from an identifier.
///
/// Every declared key field must be matched exactly once; anything else,
/// including an empty key, is a [`Error::PrimaryKeyMismatch`].
pub fn identifier_filter(
    primary_key: &[String],
    id: &Identifier,
) -> Result<IndexMap<String, FilterConditions>> {
    match id {
        Identifier::Scalar(value) => match primary_key {
            [field] => Ok(IndexMap::from([(field.clone(), identifier_condition(value))])),
            _ => Err(Error::PrimaryKeyMismatch {
                expected: primary_key.len(),
                actual: 1,
            }),
        },
        Identifier::Composite(fields) => {
            let filter: IndexMap<_, _> = primary_key
                .iter()
                .filter_map(|field| {
                    fields
                        .get(field)
                        .map(|value| (field.clone(), identifier_condition(value)))
                })
                .collect();

            if !primary_key.is_empty() && filter.len() == primary_key.len() {
                Ok(filter)
            } else {
                Err(Error::PrimaryKeyMismatch {
                    expected: primary_key.len(),
                    actual: filter.len(),
                })
            }
        },
    }
}

/// Replace newlines, carriage returns and tabs with spaces and trim.
///
/// The result is a single line, so a `--` comment in a base statement would
/// swallow every clause appended after it; use `/* */` there instead.
pub fn normalize_statement(statement: &str) -> String {
    statement
        .chars()
        .map(|c| if matches!(c, '\r' | '\n' | '\t') { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

// ═══════════════════════════════════════════════════════════════════════════
// QUERY REQUEST
// ═══════════════════════════════════════════════════════════════════════════

/// The effective request handed to the engine.
///
/// Built either directly with the fluent methods or by merging
/// [`QueryOverrides`] onto a [`QueryDefinition`].
///
/// # Example
///
/// ```
/// use basesql::{FilterCondition, QueryRequest, SearchColumnType, SearchOperator, SortDir};
///
/// let request = QueryRequest::new("SELECT * FROM users")
///     .filter("status", FilterCondition::eq("A"))
///     .search_column("name", SearchOperator::Cont, SearchColumnType::String)
///     .search("foo")
///     .order_by("name", SortDir::Asc)
///     .paginate(2, 20);
///
/// assert_eq!(request.page, 2);
/// assert_eq!(request.per_page, 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct QueryRequest {
    /// Base statement template.
    pub statement: String,
    /// Primary key fields used by the identifier shorthand.
    pub primary_key: Vec<String>,
    /// Columns matched against the search term.
    pub search_columns: IndexMap<String, SearchColumn>,
    /// Free-text search term; empty disables the search group.
    pub search_term: String,
    /// Field conditions, ANDed together.
    pub filter: IndexMap<String, FilterConditions>,
    /// Sort columns in priority order.
    pub order: IndexMap<String, SortDir>,
    /// Group-by expressions.
    pub group_by: Vec<String>,
    /// Static parameters, layered over predicate bindings.
    pub params: Params,
    /// 1-based page, 0 disables pagination.
    pub page: u32,
    /// Page size, 0 disables pagination.
    pub per_page: u32,
    /// Identifier shorthand.
    pub id: Option<Identifier>,
}

impl QueryRequest {
    /// Create a request over a base statement with default paging.
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            primary_key: vec!["id".to_string()],
            search_columns: IndexMap::new(),
            search_term: String::new(),
            filter: IndexMap::new(),
            order: IndexMap::new(),
            group_by: Vec::new(),
            params: Params::new(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            id: None,
        }
    }

    /// Set the primary key fields.
    pub fn primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Declare a column matched against the search term.
    pub fn search_column(
        mut self,
        column: impl Into<String>,
        op: SearchOperator,
        ty: SearchColumnType,
    ) -> Self {
        self.search_columns
            .insert(column.into(), SearchColumn::new(op, ty));
        self
    }

    /// Set the free-text search term.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Add a condition on a field. Repeated calls for the same field
    /// accumulate conditions.
    pub fn filter(mut self, field: impl Into<String>, condition: FilterCondition) -> Self {
        match self.filter.entry(field.into()) {
            Entry::Vacant(slot) => {
                slot.insert(FilterConditions::One(condition));
            },
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                *existing = match std::mem::replace(existing, FilterConditions::Many(Vec::new())) {
                    FilterConditions::One(first) => FilterConditions::Many(vec![first, condition]),
                    FilterConditions::Many(mut all) => {
                        all.push(condition);
                        FilterConditions::Many(all)
                    },
                };
            },
        }
        self
    }

    /// Add a sort column.
    pub fn order_by(mut self, column: impl Into<String>, dir: SortDir) -> Self {
        self.order.insert(column.into(), dir);
        self
    }

    /// Add a group-by expression.
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// Bind a static parameter referenced by the base statement.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set page and page size.
    pub const fn paginate(mut self, page: u32, per_page: u32) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    /// Turn pagination off.
    pub const fn unpaginated(self) -> Self {
        self.paginate(0, 0)
    }

    /// Look up a single row by primary key.
    pub fn id(mut self, id: impl Into<Identifier>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The identifier shorthand, unless absent or blank.
    ///
    /// Ignored when no primary key is declared, so the request's own
    /// filter, search and paging stay in effect.
    pub fn identifier(&self) -> Option<&Identifier> {
        if self.primary_key.is_empty() {
            return None;
        }
        self.id.as_ref().filter(|id| !id.is_absent())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DEFINITIONS AND OVERRIDES
// ═══════════════════════════════════════════════════════════════════════════

/// Caller input: every field optional, camelCase on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryOverrides {
    /// Replaces the base statement.
    pub statement: Option<String>,
    /// Replaces the searchable columns.
    pub search_columns: Option<IndexMap<String, SearchColumn>>,
    /// Free-text search term.
    pub search_term: Option<String>,
    /// Field conditions.
    pub filter: Option<IndexMap<String, FilterConditions>>,
    /// Replaces the default order.
    pub order: Option<IndexMap<String, SortDir>>,
    /// Replaces the default group-by.
    pub group_by: Option<Vec<String>>,
    /// Replaces the static parameters.
    pub params: Option<Params>,
    /// 1-based page.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
    /// Identifier shorthand.
    pub id: Option<Identifier>,
}

/// Per-entity query defaults, usually loaded from configuration.
///
/// # Example
///
/// ```
/// use basesql::{QueryDefinition, QueryOverrides, SortDir};
///
/// let definition = QueryDefinition::new("SELECT * FROM users").order_by("name", SortDir::Asc);
/// let overrides = QueryOverrides {
///     page: Some(3),
///     ..QueryOverrides::default()
/// };
///
/// let request = definition.request(overrides);
/// assert_eq!(request.page, 3);
/// assert_eq!(request.per_page, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDefinition {
    /// Base statement template.
    pub statement: String,
    /// Primary key field or fields, `id` when omitted.
    #[serde(default)]
    pub primary_key: PrimaryKey,
    /// Columns matched against the search term.
    #[serde(default)]
    pub search_columns: IndexMap<String, SearchColumn>,
    /// Static parameters for the base statement.
    #[serde(default)]
    pub params: Params,
    /// Default group-by expressions.
    #[serde(default)]
    pub group_by: Vec<String>,
    /// Default sort columns.
    #[serde(default)]
    pub order: IndexMap<String, SortDir>,
    /// Default page size.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl QueryDefinition {
    /// Create a definition with default key (`id`) and page size.
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            primary_key: PrimaryKey::default(),
            search_columns: IndexMap::new(),
            params: Params::new(),
            group_by: Vec::new(),
            order: IndexMap::new(),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Set the primary key.
    pub fn primary_key(mut self, key: PrimaryKey) -> Self {
        self.primary_key = key;
        self
    }

    /// Declare a searchable column.
    pub fn search_column(
        mut self,
        column: impl Into<String>,
        op: SearchOperator,
        ty: SearchColumnType,
    ) -> Self {
        self.search_columns
            .insert(column.into(), SearchColumn::new(op, ty));
        self
    }

    /// Add a default sort column.
    pub fn order_by(mut self, column: impl Into<String>, dir: SortDir) -> Self {
        self.order.insert(column.into(), dir);
        self
    }

    /// Add a default group-by expression.
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// Bind a static parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the default page size.
    pub const fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Merge caller overrides onto these defaults. Overrides win.
    pub fn request(&self, overrides: QueryOverrides) -> QueryRequest {
        QueryRequest {
            statement: overrides
                .statement
                .unwrap_or_else(|| self.statement.clone()),
            primary_key: self.primary_key.fields(),
            search_columns: overrides
                .search_columns
                .unwrap_or_else(|| self.search_columns.clone()),
            search_term: overrides.search_term.unwrap_or_default(),
            filter: overrides.filter.unwrap_or_default(),
            order: overrides.order.unwrap_or_else(|| self.order.clone()),
            group_by: overrides
                .group_by
                .unwrap_or_else(|| self.group_by.clone()),
            params: overrides.params.unwrap_or_else(|| self.params.clone()),
            page: overrides.page.unwrap_or(1),
            per_page: overrides.per_page.unwrap_or(self.per_page),
            id: overrides.id,
        }
    }
}
