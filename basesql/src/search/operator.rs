//! The fixed search operator catalog and column value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Search comparison operators.
///
/// Names follow the snake_case catalog used in filter payloads
/// (`"eq"`, `"not_i_cont"`, `"in"`, `"true"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOperator {
    /// Equal: `col = :p`
    Eq,
    /// Not equal: `col <> :p`
    NotEq,
    /// Less than: `col < :p`
    Lt,
    /// Less than or equal: `col <= :p`
    Lteq,
    /// Greater than: `col > :p`
    Gt,
    /// Greater than or equal: `col >= :p`
    Gteq,
    /// Pattern match with a caller-supplied pattern.
    Like,
    /// Alias of `like`.
    Matches,
    /// Case-insensitive pattern match with a caller-supplied pattern.
    ILike,
    /// Substring match: `%v%`
    Cont,
    /// Case-insensitive substring match.
    ICont,
    /// Prefix match: `v%`
    Start,
    /// Suffix match: `%v`
    End,
    /// Negated substring match.
    NotCont,
    /// Negated case-insensitive substring match.
    NotICont,
    /// Negated prefix match.
    NotStart,
    /// Negated suffix match.
    NotEnd,
    /// Set membership: `col IN (:p)`
    In,
    /// Negated set membership.
    NotIn,
    /// `col IS NULL`
    Null,
    /// `col IS NOT NULL`
    NotNull,
    /// Null or a single blank.
    Blank,
    /// Same predicate as `blank`.
    Empty,
    /// Neither null nor blank.
    NotEmpty,
    /// Same predicate as `not_empty`.
    Present,
    /// Equality against boolean `true`.
    True,
    /// Equality against boolean `false`.
    False,
}

impl SearchOperator {
    /// Every operator in the catalog.
    pub const ALL: [Self; 27] = [
        Self::Eq,
        Self::NotEq,
        Self::Lt,
        Self::Lteq,
        Self::Gt,
        Self::Gteq,
        Self::Like,
        Self::Matches,
        Self::ILike,
        Self::Cont,
        Self::ICont,
        Self::Start,
        Self::End,
        Self::NotCont,
        Self::NotICont,
        Self::NotStart,
        Self::NotEnd,
        Self::In,
        Self::NotIn,
        Self::Null,
        Self::NotNull,
        Self::Blank,
        Self::Empty,
        Self::NotEmpty,
        Self::Present,
        Self::True,
        Self::False,
    ];

    /// Catalog name, also used as the parameter-name suffix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::NotEq => "not_eq",
            Self::Lt => "lt",
            Self::Lteq => "lteq",
            Self::Gt => "gt",
            Self::Gteq => "gteq",
            Self::Like => "like",
            Self::Matches => "matches",
            Self::ILike => "i_like",
            Self::Cont => "cont",
            Self::ICont => "i_cont",
            Self::Start => "start",
            Self::End => "end",
            Self::NotCont => "not_cont",
            Self::NotICont => "not_i_cont",
            Self::NotStart => "not_start",
            Self::NotEnd => "not_end",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Null => "null",
            Self::NotNull => "not_null",
            Self::Blank => "blank",
            Self::Empty => "empty",
            Self::NotEmpty => "not_empty",
            Self::Present => "present",
            Self::True => "true",
            Self::False => "false",
        }
    }

    /// Whether the operator binds a parameter value.
    ///
    /// The null/blank family only contributes SQL text and never appears in
    /// the parameter map.
    pub const fn binds_value(self) -> bool {
        !matches!(
            self,
            Self::Null
                | Self::NotNull
                | Self::Blank
                | Self::Empty
                | Self::NotEmpty
                | Self::Present
        )
    }
}

impl FromStr for SearchOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| Error::UnknownOperator(s.to_string()))
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared column type, driving value coercion for operators that do not
/// imply a type themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchColumnType {
    /// Dates pass through as given.
    Date,
    /// Leading float prefix, `0.0` when there is none.
    Float,
    /// Passed through as given.
    #[default]
    String,
    /// Leading integer prefix, `0` when there is none.
    Number,
}
