//! Domain types shared across the askbox workspace.
//!
//! This crate has no internal dependencies so it can be used by the store,
//! the search indexer, the export worker and the HTTP layer alike.

pub mod error;
pub mod export;
pub mod pagination;
pub mod types;
pub mod validation;
