//! Limit/offset pagination primitives shared by Fundline list endpoints.
//!
//! Endpoints accept an optional `limit` and `offset` pair. Out-of-range
//! values are clamped rather than rejected so that a caller asking for too
//! large a page degrades to the maximum page size instead of an error. The
//! [`Page`] envelope reports the total number of matching rows and whether
//! further rows exist beyond the returned window.

use serde::{Deserialize, Serialize};

/// Default page size applied when the caller does not send a `limit`.
pub const DEFAULT_LIMIT: u32 = 50;

/// Upper bound on the page size; larger requests are clamped down to this.
pub const MAX_LIMIT: u32 = 100;

/// Validated paging window for a list query.
///
/// ## Invariants
/// - `limit` is always within `1..=MAX_LIMIT`.
/// - `offset` counts rows to skip from the start of the result set.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let page = PageRequest::new(Some(500), Some(20));
/// assert_eq!(page.limit(), 100);
/// assert_eq!(page.offset(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

impl PageRequest {
    /// Build a page request from raw caller input, clamping `limit` into
    /// `1..=MAX_LIMIT` and defaulting missing values.
    pub fn new(limit: Option<u32>, offset: Option<u64>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Self {
            limit,
            offset: offset.unwrap_or(0),
        }
    }

    /// Effective page size.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows skipped before the first returned row.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Index range selecting this page out of a result set of `total` rows.
    ///
    /// The range is empty when `offset` lies at or past the end.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let page = PageRequest::new(Some(10), Some(5));
    /// assert_eq!(page.window(8), 5..8);
    /// assert_eq!(page.window(3), 3..3);
    /// ```
    pub fn window(&self, total: usize) -> std::ops::Range<usize> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(total);
        let end = start.saturating_add(self.limit as usize).min(total);
        start..end
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the bookkeeping callers need to continue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows within the requested window, in query order.
    pub items: Vec<T>,
    /// Total rows matching the query, ignoring the window.
    pub total: u64,
    /// Effective page size after clamping.
    pub limit: u32,
    /// Rows skipped before `items`.
    pub offset: u64,
    /// Whether rows exist beyond this page (`offset + limit < total`).
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Assemble a page envelope for `items` cut out of `total` matches.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest};
    ///
    /// let page = Page::new(vec!["a", "b"], 10, PageRequest::new(Some(2), None));
    /// assert!(page.has_more);
    /// assert_eq!(page.total, 10);
    /// ```
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            limit: request.limit(),
            offset: request.offset(),
            has_more: request.offset() + u64::from(request.limit()) < total,
        }
    }

    /// Map the item type while keeping the envelope intact.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
            has_more: self.has_more,
        }
    }
}
