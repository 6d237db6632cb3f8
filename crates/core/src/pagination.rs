//! Page-number pagination used by the question listings.

use serde::Serialize;

/// Questions shown per page on the home and user pages.
pub const QUESTIONS_PER_PAGE: i64 = 10;

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Build a request from an optional `?page=` value. Values below 1 clamp to 1.
    pub fn new(page: Option<i64>, per_page: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.max(1),
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// One page of results plus the totals needed to render pagination links.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + request.per_page - 1) / request.per_page
        };
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamps() {
        assert_eq!(PageRequest::new(None, 10).page, 1);
        assert_eq!(PageRequest::new(Some(0), 10).page, 1);
        assert_eq!(PageRequest::new(Some(-4), 10).page, 1);
        assert_eq!(PageRequest::new(Some(3), 10).offset(), 20);
    }

    #[test]
    fn page_count_rounds_up() {
        let req = PageRequest::new(Some(1), 10);
        assert_eq!(Page::<()>::new(vec![], req, 0).pages, 0);
        assert_eq!(Page::<()>::new(vec![], req, 10).pages, 1);
        assert_eq!(Page::<()>::new(vec![], req, 11).pages, 2);
    }
}
