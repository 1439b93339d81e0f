//! PaginationMetadata struct for paginated responses.

use serde::{Deserialize, Serialize};

/// Page information derived from the total row count.
///
/// # Example
///
/// ```
/// # use basesql::PaginationMetadata;
/// let meta = PaginationMetadata::new(2, 50, 125);
///
/// assert_eq!(meta.total_pages, 3);
/// assert_eq!(meta.total_rows, 125);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct PaginationMetadata {
    /// Current page, 1-based (0 when pagination is off).
    pub page: u32,
    /// Rows per page (0 when pagination is off).
    pub per_page: u32,
    /// Number of pages needed to show every row.
    pub total_pages: u64,
    /// Total rows matching the predicate set.
    pub total_rows: u64,
}

impl PaginationMetadata {
    /// Compute metadata for a page request.
    ///
    /// If `page` or `per_page` is zero, pagination is off: the result is a
    /// single page holding every row, whatever `total_rows` is.
    #[must_use]
    pub const fn new(page: u32, per_page: u32, total_rows: u64) -> Self {
        if page == 0 || per_page == 0 {
            return Self::unpaginated(total_rows);
        }

        let per_page_rows = per_page as u64;
        let full_pages = total_rows / per_page_rows;
        let partial = if total_rows % per_page_rows > 0 { 1 } else { 0 };

        Self {
            page,
            per_page,
            total_pages: full_pages + partial,
            total_rows,
        }
    }

    /// Metadata for an unpaginated result.
    #[must_use]
    pub const fn unpaginated(total_rows: u64) -> Self {
        Self {
            page: 0,
            per_page: 0,
            total_pages: 1,
            total_rows,
        }
    }

    /// Whether a page after this one exists.
    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages && self.per_page > 0
    }

    /// Whether a page before this one exists.
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }
}
