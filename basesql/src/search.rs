//! Search-column resolution: one `(column, type, operator, value)` tuple in,
//! one predicate fragment and its bound value out.
//!
//! # Fragment rules
//!
//! | Operator | SQL | Bound value |
//! |----------|-----|-------------|
//! | `eq` / `true` / `false` | `col = :p` | `true`/`false` bind a boolean |
//! | `not_eq` | `col <> :p` | coerced per column type |
//! | `lt` `lteq` `gt` `gteq` | `col < :p` ... | coerced per column type |
//! | `cont` / `start` / `end` | `col LIKE :p` | `%v%` / `v%` / `%v` |
//! | `i_cont` / `i_like` | dialect case-insensitive match | `%v%` / as given |
//! | `not_cont` ... | `NOT (<positive form>)` | same wrapping |
//! | `in` / `not_in` | `col IN (:p)` | always a sequence |
//! | `null` `not_null` `blank` `empty` `not_empty` `present` | no placeholder | none |

mod operator;

pub use operator::{SearchColumnType, SearchOperator};

use serde::{Deserialize, Serialize};

use crate::dialect::{DatabaseType, Dialect};
use crate::error::Result;
use crate::value::Value;

/// A searchable column declaration: which operator and type to apply when
/// the free-text search term is matched against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchColumn {
    /// Operator applied to the search term.
    pub op: SearchOperator,
    /// Declared column type, `string` when omitted.
    #[serde(rename = "type", default)]
    pub ty: SearchColumnType,
}

impl SearchColumn {
    /// Create a search column declaration.
    pub const fn new(op: SearchOperator, ty: SearchColumnType) -> Self {
        Self { op, ty }
    }
}

/// A resolved predicate fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// SQL boolean expression referencing `:name` (unless the operator binds nothing).
    pub sql: String,
    /// Placeholder name derived from column and operator.
    pub name: String,
    /// Formatted value, `None` for the null/blank operator family.
    pub value: Option<Value>,
}

/// Derive the placeholder name for a column/operator pair.
///
/// Dots and parentheses in the column become underscores, then the
/// operator's catalog name is appended: `u.name` + `cont` gives `u_name_cont`.
pub fn parameter_name(column: &str, op: SearchOperator) -> String {
    let base: String = column
        .chars()
        .map(|c| if matches!(c, '.' | '(' | ')') { '_' } else { c })
        .collect();
    format!("{base}_{}", op.name())
}

/// Format the bound value for an operator/type pair.
///
/// Returns `None` for operators that bind nothing.
pub fn format_value(op: SearchOperator, ty: SearchColumnType, value: &Value) -> Option<Value> {
    use SearchOperator as Op;

    if !op.binds_value() {
        return None;
    }

    let formatted = match op {
        Op::Cont | Op::ICont | Op::NotCont | Op::NotICont => {
            Value::String(format!("%{}%", value.to_text()))
        },
        Op::End | Op::NotEnd => Value::String(format!("%{}", value.to_text())),
        Op::Start | Op::NotStart => Value::String(format!("{}%", value.to_text())),
        Op::True => Value::Bool(true),
        Op::False => Value::Bool(false),
        Op::In | Op::NotIn => as_sequence(value),
        // Comparisons and caller-supplied patterns.
        _ => coerce(ty, value),
    };

    Some(formatted)
}

/// Comma-separated strings are split, arrays kept, scalars wrapped.
fn as_sequence(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::Array(
            s.split(',')
                .map(|part| Value::String(part.to_string()))
                .collect(),
        ),
        Value::Array(_) => value.clone(),
        other => Value::Array(vec![other.clone()]),
    }
}

/// Lenient numeric coercion: the longest numeric prefix wins, and input
/// without one becomes zero instead of failing (`"25 years"` binds 25).
fn coerce(ty: SearchColumnType, value: &Value) -> Value {
    match ty {
        SearchColumnType::Number => Value::Int(match value {
            Value::Int(i) => *i,
            Value::Float(f) if f.is_finite() => f.trunc() as i64,
            Value::String(s) => parse_int(s),
            _ => 0,
        }),
        SearchColumnType::Float => Value::Float(match value {
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::String(s) => parse_float(s),
            _ => 0.0,
        }),
        SearchColumnType::String | SearchColumnType::Date => value.clone(),
    }
}

/// Length of the run of ASCII digits starting at `at`.
fn digits_from(bytes: &[u8], at: usize) -> usize {
    bytes
        .get(at..)
        .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
}

/// Length of the optional sign at the start of `bytes`.
fn sign_len(bytes: &[u8]) -> usize {
    usize::from(matches!(bytes.first(), Some(b'+' | b'-')))
}

/// Leading `[+-]digits`, or `None` when there are no digits.
fn int_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let sign = sign_len(bytes);
    let digits = digits_from(bytes, sign);
    (digits > 0).then(|| &s[..sign + digits])
}

/// Leading `[+-]digits[.digits][e[+-]digits]`, or `None` when the mantissa
/// has no digits.
fn float_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = sign_len(bytes);

    let whole = digits_from(bytes, end);
    end += whole;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(bytes, end + 1);
        if whole > 0 || fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole == 0 && fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_start = end + 1;
        let exp_sign = bytes.get(exp_start..).map_or(0, sign_len);
        let exp_digits = digits_from(bytes, exp_start + exp_sign);
        if exp_digits > 0 {
            end = exp_start + exp_sign + exp_digits;
        }
    }

    Some(&s[..end])
}

fn parse_int(s: &str) -> i64 {
    int_prefix(s.trim()).map_or(0, |prefix| {
        prefix.parse::<i64>().unwrap_or_else(|_| {
            // Out of range: saturate toward the sign.
            if prefix.starts_with('-') { i64::MIN } else { i64::MAX }
        })
    })
}

fn parse_float(s: &str) -> f64 {
    float_prefix(s.trim())
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Resolve a single column condition with the given dialect.
pub fn resolve<D: Dialect>(
    dialect: &D,
    column: &str,
    ty: SearchColumnType,
    op: SearchOperator,
    value: &Value,
) -> Predicate {
    let name = parameter_name(column, op);
    let sql = dialect.search_fragment(column, op, &name);
    let value = format_value(op, ty, value);
    tracing::trace!(column, op = op.name(), sql = %sql, "resolved search predicate");
    Predicate { sql, name, value }
}

/// Resolves search columns for the dialect chosen at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchColumnFactory {
    dialect: DatabaseType,
}

impl SearchColumnFactory {
    /// Create a factory for a known dialect.
    pub const fn new(dialect: DatabaseType) -> Self {
        Self { dialect }
    }

    /// Create a factory from a dialect tag such as `"postgres"`.
    ///
    /// Unsupported tags fail here rather than on first use.
    pub fn from_tag(tag: &str) -> Result<Self> {
        Ok(Self::new(tag.parse()?))
    }

    /// The dialect this factory resolves for.
    pub const fn dialect(&self) -> DatabaseType {
        self.dialect
    }

    /// Resolve a column condition into a predicate fragment and bound value.
    pub fn resolve(
        &self,
        column: &str,
        ty: SearchColumnType,
        op: SearchOperator,
        value: &Value,
    ) -> Predicate {
        resolve(&self.dialect, column, ty, op, value)
    }
}
