//! Response shapes shared by the store and the HTTP layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        let pages = total.div_ceil(u64::from(limit));
        Self {
            page: page.max(1),
            limit,
            total,
            total_pages: u32::try_from(pages).unwrap_or(u32::MAX),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Slice an already-materialized list. Pages are 1-based.
    #[must_use]
    pub fn from_vec(all: Vec<T>, page: u32, limit: u32) -> Self {
        let total = all.len() as u64;
        let pagination = Pagination::new(page, limit, total);
        let skip = (pagination.page as usize - 1).saturating_mul(pagination.limit as usize);
        let items = all
            .into_iter()
            .skip(skip)
            .take(pagination.limit as usize)
            .collect();
        Self { items, pagination }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_slices_requested_page() {
        let page = Page::from_vec((1..=7).collect::<Vec<_>>(), 2, 3);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.pagination.total, 7);
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = Page::from_vec(vec!["a", "b"], 5, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[test]
    fn zero_page_and_limit_are_clamped() {
        let p = Pagination::new(0, 0, 0);
        assert_eq!((p.page, p.limit, p.total_pages), (1, 1, 0));
    }
}
