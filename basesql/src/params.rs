//! Parameter-style conversion for executors that cannot bind named
//! placeholders.
//!
//! Assembled statements always use `:name` placeholders. Drivers differ:
//!
//! | Style | Placeholder | Arguments |
//! |-------|-------------|-----------|
//! | [`ParameterStyle::Named`] | `:name` | the map, unchanged |
//! | [`ParameterStyle::Positional`] | `$1`, `$2` | one per distinct name, first-appearance order |
//! | [`ParameterStyle::Question`] | `?` | one per occurrence, textual order |
//!
//! Positional placeholders can be reused, so a repeated name keeps its
//! number; question marks cannot, so a repeated name repeats its argument.
//!
//! Placeholders inside quoted literals, backtick identifiers, comments and
//! Postgres `::type` casts are left alone.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::{Params, Value};

/// Placeholder syntax an executor binds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterStyle {
    /// `:name` (Sequelize-style replacements).
    #[default]
    Named,
    /// `$1`, `$2`, ... (Postgres wire protocol).
    Positional,
    /// `?` (MySQL, ODBC, `SQLite`).
    Question,
}

/// Bound arguments after conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Bindings {
    /// Name to value map.
    Named(Params),
    /// Arguments in placeholder order.
    Positional(Vec<Value>),
}

/// A statement rewritten for a parameter style.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "ConvertedStatement must be used to execute the query"]
pub struct ConvertedStatement {
    /// Statement text with placeholders rewritten.
    pub sql: String,
    /// Arguments to bind alongside `sql`.
    pub bindings: Bindings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

#[inline]
const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// End of the quoted literal or comment opening at `at`, if one opens there.
///
/// Quotes are `'`, `"` and `` ` ``; a doubled quote simply closes and
/// reopens. Comments are `-- ...` to end of line and `/* ... */`. An
/// unterminated span runs to the end of the statement.
pub(crate) fn skip_span(bytes: &[u8], at: usize) -> Option<usize> {
    let rest = bytes.get(at..)?;
    let end_after = |offset: usize, found: Option<usize>, close_len: usize| {
        found.map_or(bytes.len(), |p| at + offset + p + close_len)
    };

    match rest {
        [q @ (b'\'' | b'"' | b'`'), tail @ ..] => {
            Some(end_after(1, tail.iter().position(|b| b == q), 1))
        },
        [b'-', b'-', tail @ ..] => Some(end_after(2, tail.iter().position(|b| *b == b'\n'), 1)),
        [b'/', b'*', tail @ ..] => Some(end_after(2, tail.windows(2).position(|w| w == b"*/"), 2)),
        _ => None,
    }
}

/// Split a statement into literal text and `:name` placeholders.
fn scan(sql: &str) -> Vec<Segment<'_>> {
    let bytes = sql.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(end) = skip_span(bytes, i) {
            i = end;
            continue;
        }

        match bytes[i] {
            b':' if bytes.get(i + 1) == Some(&b':') => {
                // `::type` cast
                i += 2;
            },
            b':' if bytes.get(i + 1).copied().is_some_and(is_name_byte) => {
                let name_start = i + 1;
                let mut end = name_start;
                while end < bytes.len() && is_name_byte(bytes[end]) {
                    end += 1;
                }
                if text_start < i {
                    segments.push(Segment::Text(&sql[text_start..i]));
                }
                segments.push(Segment::Placeholder(&sql[name_start..end]));
                text_start = end;
                i = end;
            },
            _ => i += 1,
        }
    }

    if text_start < sql.len() {
        segments.push(Segment::Text(&sql[text_start..]));
    }

    segments
}

/// Placeholder names in textual order, repeats included.
pub fn placeholder_names(sql: &str) -> Vec<&str> {
    scan(sql)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name),
            Segment::Text(_) => None,
        })
        .collect()
}

fn lookup(params: &Params, name: &str) -> Result<Value> {
    params
        .get(name)
        .cloned()
        .ok_or_else(|| Error::MissingParameter(name.to_string()))
}

/// Rewrite a named-placeholder statement for the target style.
///
/// # Example
///
/// ```
/// use basesql::{Bindings, ParameterStyle, Params, Value, convert_parameter_style};
///
/// let mut params = Params::new();
/// params.insert("x".into(), Value::Int(1));
/// params.insert("y".into(), Value::Int(2));
///
/// let sql = "a = :x OR b = :y OR c = :x";
/// let positional = convert_parameter_style(sql, &params, ParameterStyle::Positional).unwrap();
/// assert_eq!(positional.sql, "a = $1 OR b = $2 OR c = $1");
/// assert_eq!(positional.bindings, Bindings::Positional(vec![Value::Int(1), Value::Int(2)]));
///
/// let question = convert_parameter_style(sql, &params, ParameterStyle::Question).unwrap();
/// assert_eq!(question.sql, "a = ? OR b = ? OR c = ?");
/// assert_eq!(
///     question.bindings,
///     Bindings::Positional(vec![Value::Int(1), Value::Int(2), Value::Int(1)])
/// );
/// ```
pub fn convert_parameter_style(
    sql: &str,
    params: &Params,
    style: ParameterStyle,
) -> Result<ConvertedStatement> {
    match style {
        ParameterStyle::Named => Ok(ConvertedStatement {
            sql: sql.to_string(),
            bindings: Bindings::Named(params.clone()),
        }),
        ParameterStyle::Positional => to_positional(sql, params),
        ParameterStyle::Question => to_question(sql, params),
    }
}

fn to_positional(sql: &str, params: &Params) -> Result<ConvertedStatement> {
    let mut order: Vec<&str> = Vec::new();
    let mut args = Vec::new();
    let mut out = String::with_capacity(sql.len());

    for segment in scan(sql) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(name) => {
                let position = match order.iter().position(|seen| *seen == name) {
                    Some(idx) => idx + 1,
                    None => {
                        args.push(lookup(params, name)?);
                        order.push(name);
                        order.len()
                    },
                };
                out.push('$');
                out.push_str(&position.to_string());
            },
        }
    }

    Ok(ConvertedStatement {
        sql: out,
        bindings: Bindings::Positional(args),
    })
}

fn to_question(sql: &str, params: &Params) -> Result<ConvertedStatement> {
    let mut args = Vec::new();
    let mut out = String::with_capacity(sql.len());

    for segment in scan(sql) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(name) => {
                args.push(lookup(params, name)?);
                out.push('?');
            },
        }
    }

    Ok(ConvertedStatement {
        sql: out,
        bindings: Bindings::Positional(args),
    })
}
