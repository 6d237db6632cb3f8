//! The content store seam.
//!
//! [`ContentStore`] is the interface the HTTP layer, the export worker and
//! the search reconciliation pass program against. [`PgContentStore`] backs
//! it with the repositories; [`crate::memory::MemoryContentStore`] keeps
//! everything in process.

use askbox_core::pagination::{Page, PageRequest};
use askbox_core::types::DbId;
use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::answer::{Answer, CreateAnswer};
use crate::models::question::{CreateQuestion, Question, QuestionTitle, UpdateQuestion};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::repositories::{AnswerRepo, QuestionRepo, UserRepo};
use crate::DbPool;

/// Relational persistence for users, questions and answers.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Report whether the backing store is reachable.
    async fn ping(&self) -> StoreResult<()>;

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;
    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn update_user(&self, id: DbId, input: &UpdateUser) -> StoreResult<Option<User>>;

    async fn create_question(&self, input: &CreateQuestion) -> StoreResult<Question>;
    async fn get_question(&self, id: DbId) -> StoreResult<Option<Question>>;
    async fn update_question(
        &self,
        id: DbId,
        input: &UpdateQuestion,
    ) -> StoreResult<Option<Question>>;
    /// Delete a question and its answers. Returns `false` if it did not exist.
    async fn delete_question(&self, id: DbId) -> StoreResult<bool>;
    /// All questions, newest first.
    async fn list_recent_questions(&self, page: PageRequest) -> StoreResult<Page<Question>>;
    /// One author's questions, newest first.
    async fn list_questions_by_author(
        &self,
        author_id: DbId,
        page: PageRequest,
    ) -> StoreResult<Page<Question>>;
    /// Every question by one author, newest first (ties by descending id).
    async fn all_questions_by_author(&self, author_id: DbId) -> StoreResult<Vec<Question>>;
    /// `(id, title)` of every question, for rebuilding the search index.
    async fn all_question_titles(&self) -> StoreResult<Vec<QuestionTitle>>;

    async fn create_answer(&self, input: &CreateAnswer) -> StoreResult<Answer>;
    /// Answers to a question, oldest first.
    async fn list_answers_by_question(&self, question_id: DbId) -> StoreResult<Vec<Answer>>;
}

/// [`ContentStore`] over PostgreSQL.
#[derive(Clone)]
pub struct PgContentStore {
    pool: DbPool,
}

impl PgContentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_username(&self.pool, username).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn update_user(&self, id: DbId, input: &UpdateUser) -> StoreResult<Option<User>> {
        Ok(UserRepo::update(&self.pool, id, input).await?)
    }

    async fn create_question(&self, input: &CreateQuestion) -> StoreResult<Question> {
        Ok(QuestionRepo::create(&self.pool, input).await?)
    }

    async fn get_question(&self, id: DbId) -> StoreResult<Option<Question>> {
        Ok(QuestionRepo::find_by_id(&self.pool, id).await?)
    }

    async fn update_question(
        &self,
        id: DbId,
        input: &UpdateQuestion,
    ) -> StoreResult<Option<Question>> {
        Ok(QuestionRepo::update(&self.pool, id, input).await?)
    }

    async fn delete_question(&self, id: DbId) -> StoreResult<bool> {
        Ok(QuestionRepo::delete(&self.pool, id).await?)
    }

    async fn list_recent_questions(&self, page: PageRequest) -> StoreResult<Page<Question>> {
        let items = QuestionRepo::list_recent(&self.pool, page.limit(), page.offset()).await?;
        let total = QuestionRepo::count_all(&self.pool).await?;
        Ok(Page::new(items, page, total))
    }

    async fn list_questions_by_author(
        &self,
        author_id: DbId,
        page: PageRequest,
    ) -> StoreResult<Page<Question>> {
        let items =
            QuestionRepo::list_by_author(&self.pool, author_id, page.limit(), page.offset())
                .await?;
        let total = QuestionRepo::count_by_author(&self.pool, author_id).await?;
        Ok(Page::new(items, page, total))
    }

    async fn all_questions_by_author(&self, author_id: DbId) -> StoreResult<Vec<Question>> {
        Ok(QuestionRepo::list_all_by_author(&self.pool, author_id).await?)
    }

    async fn all_question_titles(&self) -> StoreResult<Vec<QuestionTitle>> {
        Ok(QuestionRepo::list_titles(&self.pool).await?)
    }

    async fn create_answer(&self, input: &CreateAnswer) -> StoreResult<Answer> {
        Ok(AnswerRepo::create(&self.pool, input).await?)
    }

    async fn list_answers_by_question(&self, question_id: DbId) -> StoreResult<Vec<Answer>> {
        Ok(AnswerRepo::list_by_question(&self.pool, question_id).await?)
    }
}
