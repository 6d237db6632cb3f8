//! Question entity model and DTOs.

use askbox_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `questions` table joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub author_id: DbId,
    pub author_username: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a question.
#[derive(Debug, Clone)]
pub struct CreateQuestion {
    pub title: String,
    pub content: String,
    pub author_id: DbId,
}

/// DTO for editing a question. Both fields are replaced.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuestion {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// The `(id, title)` pair the search index is rebuilt from.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct QuestionTitle {
    pub id: DbId,
    pub title: String,
}
