//! Repository for the `questions` table.
//!
//! Every read joins `users` so rows carry the author's username. Listings
//! are ordered newest first with `id` as the tie-breaker, which is the order
//! the export job relies on.

use askbox_core::types::DbId;
use sqlx::PgPool;

use crate::models::question::{CreateQuestion, Question, QuestionTitle, UpdateQuestion};

/// Column list for `questions q JOIN users u` queries.
const COLUMNS: &str = "q.id, q.title, q.content, q.author_id, u.username AS author_username, \
                       q.created_at, q.updated_at";

/// Newest-first ordering shared by every listing.
const ORDER_NEWEST: &str = "ORDER BY q.created_at DESC, q.id DESC";

/// Provides CRUD operations for questions.
pub struct QuestionRepo;

impl QuestionRepo {
    /// Insert a new question, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateQuestion) -> Result<Question, sqlx::Error> {
        let query = format!(
            "WITH q AS ( \
                 INSERT INTO questions (title, content, author_id) \
                 VALUES ($1, $2, $3) \
                 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM q JOIN users u ON u.id = q.author_id"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.author_id)
            .fetch_one(pool)
            .await
    }

    /// Find a question by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM questions q JOIN users u ON u.id = q.author_id WHERE q.id = $1"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace a question's title and content.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateQuestion,
    ) -> Result<Option<Question>, sqlx::Error> {
        let query = format!(
            "WITH q AS ( \
                 UPDATE questions SET title = $2, content = $3 \
                 WHERE id = $1 \
                 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM q JOIN users u ON u.id = q.author_id"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    /// Delete a question. Its answers are removed by `ON DELETE CASCADE`.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of all questions, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM questions q JOIN users u ON u.id = q.author_id \
             {ORDER_NEWEST} LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of questions.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
            .fetch_one(pool)
            .await
    }

    /// One page of a user's questions, newest first.
    pub async fn list_by_author(
        pool: &PgPool,
        author_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM questions q JOIN users u ON u.id = q.author_id \
             WHERE q.author_id = $1 {ORDER_NEWEST} LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(author_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Number of questions written by a user.
    pub async fn count_by_author(pool: &PgPool, author_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(pool)
            .await
    }

    /// Every question written by a user, newest first.
    pub async fn list_all_by_author(
        pool: &PgPool,
        author_id: DbId,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM questions q JOIN users u ON u.id = q.author_id \
             WHERE q.author_id = $1 {ORDER_NEWEST}"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(author_id)
            .fetch_all(pool)
            .await
    }

    /// `(id, title)` of every question, ascending by id.
    pub async fn list_titles(pool: &PgPool) -> Result<Vec<QuestionTitle>, sqlx::Error> {
        sqlx::query_as::<_, QuestionTitle>("SELECT id, title FROM questions ORDER BY id")
            .fetch_all(pool)
            .await
    }
}
