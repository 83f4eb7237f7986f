//! Page parameters and the page envelope returned by list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

const fn default_page() -> u32 {
    DEFAULT_PAGE
}

const fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page number, starting at 1.
    #[serde(default = "default_page")]
    #[param(default = 1, minimum = 1)]
    #[validate(range(min = 1, message = "page must be greater than or equal to 1"))]
    pub page: u32,
    /// Items per page.
    #[serde(default = "default_size")]
    #[param(default = 50, minimum = 1, maximum = 100)]
    #[validate(range(min = 1, max = 100, message = "size must be between 1 and 100"))]
    pub size: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// SQL `LIMIT` for this page.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// SQL `OFFSET` for this page. Page 0 is treated like page 1.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.size)
    }
}

/// A slice of a larger result set plus the metadata needed to walk it.
#[derive(Debug, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, params: PageParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            size: params.size,
            pages: page_count(total, params.size),
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
            pages: self.pages,
        }
    }
}

fn page_count(total: u64, size: u32) -> u32 {
    if size == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(size))).unwrap_or(u32::MAX)
}

/// Converts a `COUNT(*)` result into the envelope's `total`.
#[must_use]
pub fn total_from_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let params = PageParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.size, 50);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit(), 50);
    }

    #[test]
    fn offset_advances_by_page_size() {
        let params = PageParams::new(3, 20);
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn out_of_range_params_fail_validation() {
        assert!(PageParams::new(0, 10).validate().is_err());
        assert!(PageParams::new(1, 0).validate().is_err());
        assert!(PageParams::new(1, MAX_PAGE_SIZE + 1).validate().is_err());
        assert!(PageParams::new(1, MAX_PAGE_SIZE).validate().is_ok());
    }

    #[test]
    fn pages_round_up() {
        let page = Page::new(vec![1, 2], 5, PageParams::new(1, 2));
        assert_eq!(page.pages, 3);
        assert_eq!(page.total, 5);

        let empty: Page<u8> = Page::new(Vec::new(), 0, PageParams::default());
        assert_eq!(empty.pages, 0);
    }

    #[test]
    fn map_keeps_metadata() {
        let page = Page::new(vec![1, 2], 2, PageParams::new(1, 10)).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.pages, 1);
        assert_eq!(page.size, 10);
    }

    #[test]
    fn query_defaults_apply_when_missing() {
        let params: Result<PageParams, _> = serde_json::from_str("{}");
        assert_eq!(params.ok(), Some(PageParams::default()));
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        assert_eq!(total_from_count(-1), 0);
        assert_eq!(total_from_count(7), 7);
    }
}
