//! Answer entity model and DTOs.

use askbox_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `answers` table joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Answer {
    pub id: DbId,
    pub body: String,
    pub author_id: DbId,
    pub author_username: String,
    pub question_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for inserting an answer.
#[derive(Debug, Clone)]
pub struct CreateAnswer {
    pub body: String,
    pub author_id: DbId,
    pub question_id: DbId,
}
