//! Shared query parameter types for API handlers.

use askbox_core::pagination::{PageRequest, QUESTIONS_PER_PAGE};
use serde::Deserialize;

/// Page-number pagination (`?page=`), 1-based.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
}

impl PageParams {
    /// Page request for question listings, fixed at [`QUESTIONS_PER_PAGE`].
    pub fn questions(&self) -> PageRequest {
        PageRequest::new(self.page, QUESTIONS_PER_PAGE)
    }
}
