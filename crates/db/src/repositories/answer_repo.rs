//! Repository for the `answers` table.

use askbox_core::types::DbId;
use sqlx::PgPool;

use crate::models::answer::{Answer, CreateAnswer};

/// Column list for `answers a JOIN users u` queries.
const COLUMNS: &str =
    "a.id, a.body, a.author_id, u.username AS author_username, a.question_id, a.created_at";

/// Provides CRUD operations for answers.
pub struct AnswerRepo;

impl AnswerRepo {
    /// Insert a new answer, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAnswer) -> Result<Answer, sqlx::Error> {
        let query = format!(
            "WITH a AS ( \
                 INSERT INTO answers (body, author_id, question_id) \
                 VALUES ($1, $2, $3) \
                 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM a JOIN users u ON u.id = a.author_id"
        );
        sqlx::query_as::<_, Answer>(&query)
            .bind(&input.body)
            .bind(input.author_id)
            .bind(input.question_id)
            .fetch_one(pool)
            .await
    }

    /// All answers to a question, oldest first.
    pub async fn list_by_question(
        pool: &PgPool,
        question_id: DbId,
    ) -> Result<Vec<Answer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM answers a JOIN users u ON u.id = a.author_id \
             WHERE a.question_id = $1 ORDER BY a.created_at ASC, a.id ASC"
        );
        sqlx::query_as::<_, Answer>(&query)
            .bind(question_id)
            .fetch_all(pool)
            .await
    }
}
