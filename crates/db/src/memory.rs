//! In-process [`ContentStore`] and [`JobQueue`] implementations.
//!
//! Used by the single-process development mode (`STORE_BACKEND=memory`) and
//! by tests. They enforce the same constraints as the PostgreSQL schema:
//! unique usernames and emails, foreign keys from questions and answers to
//! users, and cascading answer deletion.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use askbox_core::pagination::{Page, PageRequest};
use askbox_core::types::{DbId, JobId, Timestamp};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::answer::{Answer, CreateAnswer};
use crate::models::export_job::{ExportJob, SubmitExportJob};
use crate::models::question::{CreateQuestion, Question, QuestionTitle, UpdateQuestion};
use crate::models::status::ExportJobStatus;
use crate::models::user::{CreateUser, UpdateUser, User, DEFAULT_IMAGE_FILE};
use crate::queue::JobQueue;
use crate::store::ContentStore;

#[derive(Debug, Clone)]
struct QuestionRow {
    id: DbId,
    title: String,
    content: String,
    author_id: DbId,
    created_at: Timestamp,
    updated_at: Timestamp,
}

#[derive(Debug, Clone)]
struct AnswerRow {
    id: DbId,
    body: String,
    author_id: DbId,
    question_id: DbId,
    created_at: Timestamp,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<DbId, User>,
    questions: BTreeMap<DbId, QuestionRow>,
    answers: BTreeMap<DbId, AnswerRow>,
    next_user_id: DbId,
    next_question_id: DbId,
    next_answer_id: DbId,
}

impl Tables {
    fn next_id(counter: &mut DbId) -> DbId {
        *counter += 1;
        *counter
    }

    fn check_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        skip: Option<DbId>,
    ) -> StoreResult<()> {
        for user in self.users.values().filter(|u| Some(u.id) != skip) {
            if username == Some(user.username.as_str()) {
                return Err(StoreError::Duplicate("uq_users_username"));
            }
            if email == Some(user.email.as_str()) {
                return Err(StoreError::Duplicate("uq_users_email"));
            }
        }
        Ok(())
    }

    fn author_name(&self, author_id: DbId) -> String {
        self.users
            .get(&author_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn question(&self, row: &QuestionRow) -> Question {
        Question {
            id: row.id,
            title: row.title.clone(),
            content: row.content.clone(),
            author_id: row.author_id,
            author_username: self.author_name(row.author_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn answer(&self, row: &AnswerRow) -> Answer {
        Answer {
            id: row.id,
            body: row.body.clone(),
            author_id: row.author_id,
            author_username: self.author_name(row.author_id),
            question_id: row.question_id,
            created_at: row.created_at,
        }
    }

    /// Questions matching `filter`, newest first.
    fn sorted_questions(&self, filter: impl Fn(&QuestionRow) -> bool) -> Vec<Question> {
        let mut rows: Vec<&QuestionRow> = self.questions.values().filter(|q| filter(q)).collect();
        rows.sort_by(|a, b| newest_first((a.created_at, a.id), (b.created_at, b.id)));
        rows.into_iter().map(|row| self.question(row)).collect()
    }
}

/// Newest-first ordering on `(created_at, id)`, matching `ORDER BY created_at DESC, id DESC`.
fn newest_first(a: (Timestamp, DbId), b: (Timestamp, DbId)) -> Ordering {
    b.cmp(&a)
}

fn paginate(all: Vec<Question>, page: PageRequest) -> Page<Question> {
    let total = all.len() as i64;
    let items = all
        .into_iter()
        .skip(page.offset().max(0) as usize)
        .take(page.limit() as usize)
        .collect();
    Page::new(items, page, total)
}

/// [`ContentStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    tables: RwLock<Tables>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        t.check_unique(Some(&input.username), Some(&input.email), None)?;
        let now = Utc::now();
        let user = User {
            id: Tables::next_id(&mut t.next_user_id),
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            image_file: DEFAULT_IMAGE_FILE.to_string(),
            created_at: now,
            updated_at: now,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: DbId, input: &UpdateUser) -> StoreResult<Option<User>> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&id) {
            return Ok(None);
        }
        t.check_unique(input.username.as_deref(), input.email.as_deref(), Some(id))?;
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = &input.username {
            user.username = username.clone();
        }
        if let Some(email) = &input.email {
            user.email = email.clone();
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn create_question(&self, input: &CreateQuestion) -> StoreResult<Question> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&input.author_id) {
            return Err(StoreError::MissingReference("user"));
        }
        let now = Utc::now();
        let row = QuestionRow {
            id: Tables::next_id(&mut t.next_question_id),
            title: input.title.clone(),
            content: input.content.clone(),
            author_id: input.author_id,
            created_at: now,
            updated_at: now,
        };
        let question = t.question(&row);
        t.questions.insert(row.id, row);
        Ok(question)
    }

    async fn get_question(&self, id: DbId) -> StoreResult<Option<Question>> {
        let t = self.tables.read().await;
        Ok(t.questions.get(&id).map(|row| t.question(row)))
    }

    async fn update_question(
        &self,
        id: DbId,
        input: &UpdateQuestion,
    ) -> StoreResult<Option<Question>> {
        let mut t = self.tables.write().await;
        let Some(row) = t.questions.get_mut(&id) else {
            return Ok(None);
        };
        row.title = input.title.clone();
        row.content = input.content.clone();
        row.updated_at = Utc::now();
        let row = row.clone();
        Ok(Some(t.question(&row)))
    }

    async fn delete_question(&self, id: DbId) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if t.questions.remove(&id).is_none() {
            return Ok(false);
        }
        t.answers.retain(|_, a| a.question_id != id);
        Ok(true)
    }

    async fn list_recent_questions(&self, page: PageRequest) -> StoreResult<Page<Question>> {
        let t = self.tables.read().await;
        Ok(paginate(t.sorted_questions(|_| true), page))
    }

    async fn list_questions_by_author(
        &self,
        author_id: DbId,
        page: PageRequest,
    ) -> StoreResult<Page<Question>> {
        let t = self.tables.read().await;
        Ok(paginate(t.sorted_questions(|q| q.author_id == author_id), page))
    }

    async fn all_questions_by_author(&self, author_id: DbId) -> StoreResult<Vec<Question>> {
        let t = self.tables.read().await;
        Ok(t.sorted_questions(|q| q.author_id == author_id))
    }

    async fn all_question_titles(&self) -> StoreResult<Vec<QuestionTitle>> {
        let t = self.tables.read().await;
        Ok(t.questions
            .values()
            .map(|q| QuestionTitle {
                id: q.id,
                title: q.title.clone(),
            })
            .collect())
    }

    async fn create_answer(&self, input: &CreateAnswer) -> StoreResult<Answer> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&input.author_id) {
            return Err(StoreError::MissingReference("user"));
        }
        if !t.questions.contains_key(&input.question_id) {
            return Err(StoreError::MissingReference("question"));
        }
        let row = AnswerRow {
            id: Tables::next_id(&mut t.next_answer_id),
            body: input.body.clone(),
            author_id: input.author_id,
            question_id: input.question_id,
            created_at: Utc::now(),
        };
        let answer = t.answer(&row);
        t.answers.insert(row.id, row);
        Ok(answer)
    }

    async fn list_answers_by_question(&self, question_id: DbId) -> StoreResult<Vec<Answer>> {
        let t = self.tables.read().await;
        let mut rows: Vec<&AnswerRow> = t
            .answers
            .values()
            .filter(|a| a.question_id == question_id)
            .collect();
        rows.sort_by_key(|a| (a.created_at, a.id));
        Ok(rows.into_iter().map(|row| t.answer(row)).collect())
    }
}

/// [`JobQueue`] held entirely in memory. Jobs are claimed in submission order.
#[derive(Debug, Default)]
pub struct MemoryJobQueue {
    jobs: RwLock<Vec<ExportJob>>,
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

fn running_mut(jobs: &mut [ExportJob], id: JobId) -> Option<&mut ExportJob> {
    jobs.iter_mut()
        .find(|j| j.id == id && j.status_id == ExportJobStatus::Running.id())
}

fn fail_job(job: &mut ExportJob, error: &str) {
    job.status_id = ExportJobStatus::Failed.id();
    job.error_message = Some(error.to_string());
    job.completed_at = Some(Utc::now());
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn submit(&self, input: &SubmitExportJob) -> StoreResult<ExportJob> {
        let job = ExportJob {
            id: uuid::Uuid::new_v4(),
            user_id: input.user_id,
            username: input.username.clone(),
            requested_by: input.requested_by,
            status_id: ExportJobStatus::Pending.id(),
            result: None,
            artifact_path: None,
            error_message: None,
            submitted_at: Utc::now(),
            claimed_at: None,
            started_at: None,
            completed_at: None,
        };
        self.jobs.write().await.push(job.clone());
        Ok(job)
    }

    async fn find(&self, id: JobId) -> StoreResult<Option<ExportJob>> {
        Ok(self.jobs.read().await.iter().find(|j| j.id == id).cloned())
    }

    async fn claim_next(&self) -> StoreResult<Option<ExportJob>> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs
            .iter_mut()
            .find(|j| j.status_id == ExportJobStatus::Pending.id())
        else {
            return Ok(None);
        };
        let now = Utc::now();
        job.status_id = ExportJobStatus::Running.id();
        job.claimed_at = Some(now);
        job.started_at = Some(now);
        Ok(Some(job.clone()))
    }

    async fn complete(
        &self,
        id: JobId,
        result: &serde_json::Value,
        artifact_path: &str,
    ) -> StoreResult<bool> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = running_mut(&mut jobs, id) else {
            return Ok(false);
        };
        job.status_id = ExportJobStatus::Ready.id();
        job.result = Some(result.clone());
        job.artifact_path = Some(artifact_path.to_string());
        job.completed_at = Some(Utc::now());
        Ok(true)
    }

    async fn fail(&self, id: JobId, error: &str) -> StoreResult<bool> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = running_mut(&mut jobs, id) else {
            return Ok(false);
        };
        fail_job(job, error);
        Ok(true)
    }

    async fn fail_abandoned(&self, cutoff: Timestamp, error: &str) -> StoreResult<Vec<ExportJob>> {
        let mut jobs = self.jobs.write().await;
        let mut reaped = Vec::new();
        for job in jobs.iter_mut().filter(|j| {
            j.status_id == ExportJobStatus::Running.id()
                && j.started_at.is_some_and(|at| at < cutoff)
        }) {
            fail_job(job, error);
            reaped.push(job.clone());
        }
        Ok(reaped)
    }

    async fn purge_finished_before(&self, cutoff: Timestamp) -> StoreResult<Vec<ExportJob>> {
        let mut jobs = self.jobs.write().await;
        let (expired, kept): (Vec<ExportJob>, Vec<ExportJob>) = jobs
            .drain(..)
            .partition(|j| j.completed_at.is_some_and(|at| at < cutoff));
        *jobs = kept;
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    async fn user(store: &MemoryContentStore, name: &str) -> User {
        store
            .create_user(&CreateUser {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password_hash: "hash".to_string(),
            })
            .await
            .expect("user creation should succeed")
    }

    async fn question(store: &MemoryContentStore, author: &User, title: &str) -> Question {
        store
            .create_question(&CreateQuestion {
                title: title.to_string(),
                content: format!("{title} body"),
                author_id: author.id,
            })
            .await
            .expect("question creation should succeed")
    }

    #[test]
    fn newest_first_orders_by_time_then_id() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 5, 0).unwrap();
        let mut rows = vec![(t1, 1), (t2, 2), (t1, 3)];
        rows.sort_by(|a, b| newest_first(*a, *b));
        assert_eq!(rows, vec![(t2, 2), (t1, 3), (t1, 1)]);
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_rejected() {
        let store = MemoryContentStore::new();
        user(&store, "alice").await;

        let dup_name = store
            .create_user(&CreateUser {
                username: "alice".into(),
                email: "other@example.com".into(),
                password_hash: "h".into(),
            })
            .await;
        assert_matches!(dup_name, Err(StoreError::Duplicate("uq_users_username")));

        let dup_email = store
            .create_user(&CreateUser {
                username: "alice2".into(),
                email: "alice@example.com".into(),
                password_hash: "h".into(),
            })
            .await;
        assert_matches!(dup_email, Err(StoreError::Duplicate("uq_users_email")));
    }

    #[tokio::test]
    async fn update_user_allows_keeping_own_values() {
        let store = MemoryContentStore::new();
        let alice = user(&store, "alice").await;
        user(&store, "bob").await;

        let same = store
            .update_user(
                alice.id,
                &UpdateUser {
                    username: Some("alice".into()),
                    email: Some("alice@example.com".into()),
                },
            )
            .await
            .unwrap();
        assert!(same.is_some());

        let taken = store
            .update_user(
                alice.id,
                &UpdateUser {
                    username: Some("bob".into()),
                    email: None,
                },
            )
            .await;
        assert_matches!(taken, Err(StoreError::Duplicate("uq_users_username")));
    }

    #[tokio::test]
    async fn questions_list_newest_first_with_pagination() {
        let store = MemoryContentStore::new();
        let alice = user(&store, "alice").await;
        for i in 1..=12 {
            question(&store, &alice, &format!("Q{i}")).await;
        }

        let first = store
            .list_recent_questions(PageRequest::new(Some(1), 10))
            .await
            .unwrap();
        assert_eq!(first.total, 12);
        assert_eq!(first.pages, 2);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.items[0].title, "Q12");
        assert_eq!(first.items[0].author_username, "alice");

        let second = store
            .list_recent_questions(PageRequest::new(Some(2), 10))
            .await
            .unwrap();
        let titles: Vec<_> = second.items.iter().map(|q| q.title.as_str()).collect();
        assert_eq!(titles, vec!["Q2", "Q1"]);
    }

    #[tokio::test]
    async fn delete_question_removes_its_answers() {
        let store = MemoryContentStore::new();
        let alice = user(&store, "alice").await;
        let q = question(&store, &alice, "Q1").await;
        store
            .create_answer(&CreateAnswer {
                body: "A1".into(),
                author_id: alice.id,
                question_id: q.id,
            })
            .await
            .unwrap();

        assert!(store.delete_question(q.id).await.unwrap());
        assert!(store.list_answers_by_question(q.id).await.unwrap().is_empty());
        assert!(!store.delete_question(q.id).await.unwrap());
    }

    #[tokio::test]
    async fn answers_require_existing_question() {
        let store = MemoryContentStore::new();
        let alice = user(&store, "alice").await;
        let result = store
            .create_answer(&CreateAnswer {
                body: "A".into(),
                author_id: alice.id,
                question_id: 99,
            })
            .await;
        assert_matches!(result, Err(StoreError::MissingReference("question")));
    }

    fn job_for(user_id: DbId, username: &str) -> SubmitExportJob {
        SubmitExportJob {
            user_id,
            username: username.to_string(),
            requested_by: 1,
        }
    }

    #[tokio::test]
    async fn queue_claims_in_submission_order_once() {
        let queue = MemoryJobQueue::new();
        let first = queue.submit(&job_for(1, "a")).await.unwrap();
        let second = queue.submit(&job_for(2, "b")).await.unwrap();

        let claimed = queue.claim_next().await.unwrap().unwrap();
        assert_eq!(claimed.id, first.id);
        assert_eq!(claimed.status(), ExportJobStatus::Running);

        let claimed = queue.claim_next().await.unwrap().unwrap();
        assert_eq!(claimed.id, second.id);
        assert!(queue.claim_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_only_removes_finished_jobs_past_cutoff() {
        let queue = MemoryJobQueue::new();
        let done = queue.submit(&job_for(1, "a")).await.unwrap();
        queue.claim_next().await.unwrap();
        let pending = queue.submit(&job_for(2, "b")).await.unwrap();
        assert!(queue.fail(done.id, "boom").await.unwrap());

        let purged = queue
            .purge_finished_before(Utc::now() + chrono::Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(purged.len(), 1);
        assert_eq!(purged[0].id, done.id);
        assert!(queue.find(pending.id).await.unwrap().is_some());
        assert!(queue.find(done.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn abandoned_running_jobs_fail_and_become_purgeable() {
        let queue = MemoryJobQueue::new();
        let stuck = queue.submit(&job_for(1, "a")).await.unwrap();
        queue.claim_next().await.unwrap();
        let waiting = queue.submit(&job_for(2, "b")).await.unwrap();

        let cutoff = Utc::now() + chrono::Duration::seconds(1);
        let reaped = queue.fail_abandoned(cutoff, "worker went away").await.unwrap();

        assert_eq!(reaped.len(), 1);
        assert_eq!(reaped[0].id, stuck.id);
        let stuck = queue.find(stuck.id).await.unwrap().unwrap();
        assert_eq!(stuck.status(), ExportJobStatus::Failed);
        assert_eq!(stuck.error_message.as_deref(), Some("worker went away"));
        let waiting = queue.find(waiting.id).await.unwrap().unwrap();
        assert_eq!(waiting.status(), ExportJobStatus::Pending);

        let purged = queue.purge_finished_before(cutoff).await.unwrap();
        assert_eq!(purged.len(), 1);
    }

    #[tokio::test]
    async fn late_completion_does_not_overwrite_reaped_job() {
        let queue = MemoryJobQueue::new();
        let job = queue.submit(&job_for(1, "a")).await.unwrap();
        queue.claim_next().await.unwrap();
        queue
            .fail_abandoned(Utc::now() + chrono::Duration::seconds(1), "timed out")
            .await
            .unwrap();

        let applied = queue
            .complete(job.id, &serde_json::json!([]), "/tmp/a.json")
            .await
            .unwrap();

        assert!(!applied);
        let job = queue.find(job.id).await.unwrap().unwrap();
        assert_eq!(job.status(), ExportJobStatus::Failed);
        assert!(job.result.is_none());
    }
}
