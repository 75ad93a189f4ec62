//! Pagination primitives for list queries.

use serde::Serialize;

use crate::domain::User;

/// Hard cap on the page size a client may request.
pub const LIST_LIMIT_CAP: i64 = 100;
/// Page size applied when the client does not supply one.
pub const LIST_DEFAULT_LIMIT: i64 = 100;

/// Clamped limit/offset pair for a list query.
///
/// Construction clamps rather than rejects: the response echoes the values
/// that were actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    limit: i64,
    offset: i64,
}

impl PageRequest {
    /// Build a page request from raw client input, applying defaults and caps.
    #[must_use]
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(LIST_DEFAULT_LIMIT).clamp(0, LIST_LIMIT_CAP),
            offset: offset.unwrap_or(0).max(0),
        }
    }

    /// Maximum number of records the query returns.
    #[must_use]
    pub fn limit(self) -> i64 {
        self.limit
    }

    /// Number of records the query skips.
    #[must_use]
    pub fn offset(self) -> i64 {
        self.offset
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of users together with the unfiltered row count.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPage {
    /// Records for this page, newest id first.
    pub users: Vec<User>,
    /// Total number of rows in the table.
    pub total: i64,
}
