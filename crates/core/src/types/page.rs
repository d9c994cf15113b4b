//! Pagination window for list endpoints.

/// A page request: how many rows to return and how many to skip.
///
/// Out-of-range input is clamped rather than rejected:
/// - `count` outside `1..=10` becomes 10
/// - a negative `start` becomes 0
///
/// ```
/// use franklin_core::Page;
///
/// assert_eq!(Page::new(0, -5), Page::new(10, 0));
/// assert_eq!(Page::new(3, 4).count(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    count: i64,
    start: i64,
}

impl Page {
    /// Largest page a caller may request.
    pub const MAX_COUNT: i64 = 10;

    /// Build a page, clamping out-of-range values.
    #[must_use]
    pub const fn new(count: i64, start: i64) -> Self {
        let count = if count < 1 || count > Self::MAX_COUNT {
            Self::MAX_COUNT
        } else {
            count
        };
        let start = if start < 0 { 0 } else { start };

        Self { count, start }
    }

    /// Build a page from raw query-string values.
    ///
    /// Missing or unparsable values are treated as zero before clamping.
    #[must_use]
    pub fn from_query(count: Option<&str>, start: Option<&str>) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0);
        Self::new(parse(count), parse(start))
    }

    /// Number of rows to return (`LIMIT`).
    #[must_use]
    pub const fn count(&self) -> i64 {
        self.count
    }

    /// Number of rows to skip (`OFFSET`).
    #[must_use]
    pub const fn start(&self) -> i64 {
        self.start
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Self::MAX_COUNT, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_values_are_kept() {
        let page = Page::new(5, 20);
        assert_eq!(page.count(), 5);
        assert_eq!(page.start(), 20);
    }

    #[test]
    fn test_count_out_of_range_becomes_max() {
        assert_eq!(Page::new(0, 0).count(), 10);
        assert_eq!(Page::new(-3, 0).count(), 10);
        assert_eq!(Page::new(11, 0).count(), 10);
        assert_eq!(Page::new(1, 0).count(), 1);
        assert_eq!(Page::new(10, 0).count(), 10);
    }

    #[test]
    fn test_negative_start_becomes_zero() {
        assert_eq!(Page::new(5, -1).start(), 0);
    }

    #[test]
    fn test_from_query_handles_garbage() {
        let page = Page::from_query(Some("lots"), Some("-"));
        assert_eq!(page, Page::new(10, 0));

        let page = Page::from_query(None, None);
        assert_eq!(page, Page::default());

        let page = Page::from_query(Some(" 2 "), Some("4"));
        assert_eq!(page, Page::new(2, 4));
    }
}
