//! Persistence contracts. Every lookup is keyed by id and owner, so a record
//! owned by someone else is indistinguishable from a missing one.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use crate::{
    error::AppError,
    models::{
        document::{Document, DocumentContent, NewDocument},
        study_plan::{NewStudyPlan, StudyPlan},
        user::User,
    },
};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn update_profile(
        &self,
        id: i64,
        name: &str,
        learning_preference: &str,
    ) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores upload metadata. The document starts unprocessed.
    async fn insert_document(&self, document: NewDocument) -> Result<Document, AppError>;

    /// Writes the AI-derived fields and flips `processed`. A document is
    /// processed at most once; a second attempt is a `Conflict`.
    async fn save_document_content(
        &self,
        id: i64,
        owner_id: i64,
        content: &DocumentContent,
    ) -> Result<Document, AppError>;

    async fn get_document(&self, id: i64, owner_id: i64) -> Result<Option<Document>, AppError>;

    /// Returns the owner's documents among `ids`, in `ids` order. Unknown or
    /// foreign ids are skipped.
    async fn get_documents(&self, ids: &[i64], owner_id: i64) -> Result<Vec<Document>, AppError>;

    /// Newest upload first.
    async fn list_documents(&self, owner_id: i64) -> Result<Vec<Document>, AppError>;

    async fn count_documents(&self, owner_id: i64) -> Result<i64, AppError>;
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn insert_plan(&self, plan: NewStudyPlan) -> Result<StudyPlan, AppError>;

    async fn get_plan(&self, id: i64, owner_id: i64) -> Result<Option<StudyPlan>, AppError>;

    /// Newest plan first.
    async fn list_plans(&self, owner_id: i64) -> Result<Vec<StudyPlan>, AppError>;

    async fn count_plans(&self, owner_id: i64) -> Result<i64, AppError>;

    /// Persists topics, schedule and overall progress. Last write wins.
    async fn save_plan(&self, plan: &StudyPlan) -> Result<(), AppError>;
}

/// Keeps the requested order and drops ids that did not resolve.
pub(crate) fn order_by_ids(ids: &[i64], mut documents: Vec<Document>) -> Vec<Document> {
    let mut ordered = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(pos) = documents.iter().position(|d| d.id == *id) {
            ordered.push(documents.swap_remove(pos));
        }
    }
    ordered
}
