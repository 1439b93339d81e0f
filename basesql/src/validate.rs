//! Safety checks for caller-supplied column references.
//!
//! Filter field names and order columns arrive from request payloads and are
//! spliced into SQL text (only values are bound), so they are checked before
//! assembly. Entity-definition text (base statement, search columns,
//! group-by) is trusted.
//!
//! Accepted shapes:
//!
//! | Input | Accepted |
//! |-------|----------|
//! | `status` | yes |
//! | `u.created_at` | yes |
//! | `LOWER(u.name)` | yes |
//! | `name; DROP TABLE users` | no |
//! | `name -- comment` | no |
//! | `SLEEP(5)` | no |

use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// SQL IDENTIFIER VALIDATION
// ═══════════════════════════════════════════════════════════════════════════

/// Maximum length for SQL identifiers (`PostgreSQL` limit is 63).
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Maximum length for a whole column reference.
const MAX_REFERENCE_LENGTH: usize = 256;

/// Keywords and functions never allowed in a column reference.
const DANGEROUS_KEYWORDS: &[&str] = &[
    "select",
    "insert",
    "update",
    "delete",
    "drop",
    "truncate",
    "alter",
    "create",
    "grant",
    "revoke",
    "exec",
    "execute",
    "union",
    "sleep",
    "benchmark",
    "waitfor",
    "pg_sleep",
    "dbms_lock",
    "load_file",
    "xp_cmdshell",
];

/// Validate that a string is a safe SQL identifier.
///
/// A valid identifier starts with an ASCII letter or underscore, continues
/// with letters, digits or underscores, and is 1-63 characters long.
///
/// # Examples
///
/// ```
/// use basesql::is_valid_sql_identifier;
///
/// assert!(is_valid_sql_identifier("users"));
/// assert!(is_valid_sql_identifier("_private"));
///
/// assert!(!is_valid_sql_identifier(""));
/// assert!(!is_valid_sql_identifier("123abc"));
/// assert!(!is_valid_sql_identifier("user.id"));
/// ```
#[inline]
#[must_use]
pub fn is_valid_sql_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_IDENTIFIER_LENGTH {
        return false;
    }

    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a column reference: a dotted identifier, optionally wrapped in
/// function calls.
///
/// # Examples
///
/// ```
/// use basesql::is_valid_column_reference;
///
/// assert!(is_valid_column_reference("u.name"));
/// assert!(is_valid_column_reference("LOWER(u.name)"));
///
/// assert!(!is_valid_column_reference("name; DROP TABLE users"));
/// assert!(!is_valid_column_reference("LOWER(name"));
/// assert!(!is_valid_column_reference("pg_sleep(id)"));
/// ```
#[must_use]
pub fn is_valid_column_reference(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_REFERENCE_LENGTH {
        return false;
    }

    if !s
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'(' | b')'))
    {
        return false;
    }

    let mut depth: usize = 0;
    for b in s.bytes() {
        match b {
            b'(' => depth += 1,
            b')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {},
        }
    }
    if depth != 0 {
        return false;
    }

    let segments_ok = s
        .split(['(', ')'])
        .filter(|segment| !segment.is_empty())
        .all(|segment| segment.split('.').all(is_valid_sql_identifier));
    if !segments_ok {
        return false;
    }

    let lower = s.to_ascii_lowercase();
    !DANGEROUS_KEYWORDS
        .iter()
        .any(|keyword| contains_sql_keyword(&lower, keyword))
}

/// Check if a string contains a SQL keyword as a whole word.
///
/// This prevents false positives like "update" in "`last_updated`".
#[inline]
fn contains_sql_keyword(haystack: &str, keyword: &str) -> bool {
    let bytes = haystack.as_bytes();
    let kw_bytes = keyword.as_bytes();
    let kw_len = kw_bytes.len();

    if kw_len == 0 || bytes.len() < kw_len {
        return false;
    }

    for i in 0..=(bytes.len() - kw_len) {
        if &bytes[i..i + kw_len] == kw_bytes {
            let before_ok =
                i == 0 || (!bytes[i - 1].is_ascii_alphanumeric() && bytes[i - 1] != b'_');
            let after_ok = i + kw_len == bytes.len()
                || (!bytes[i + kw_len].is_ascii_alphanumeric() && bytes[i + kw_len] != b'_');

            if before_ok && after_ok {
                return true;
            }
        }
    }

    false
}

/// Reject a caller-supplied column reference.
///
/// `context` names where the column was used (`"filter"`, `"order"`) and
/// ends up in the error message.
pub fn check_column(column: &str, context: &'static str) -> Result<()> {
    if is_valid_column_reference(column) {
        Ok(())
    } else {
        tracing::warn!(column, context, "rejected column reference");
        Err(Error::InvalidColumn {
            column: column.to_string(),
            context,
        })
    }
}
