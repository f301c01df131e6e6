use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;

use super::{DocumentStore, PlanStore, UserStore, order_by_ids};
use crate::{
    error::AppError,
    models::{
        document::{Document, DocumentContent, NewDocument},
        study_plan::{NewStudyPlan, StudyPlan},
        user::User,
    },
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    documents: BTreeMap<i64, Document>,
    plans: BTreeMap<i64, StudyPlan>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of every store trait, for tests and local prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict(format!("User '{}' already exists", email)));
        }
        let id = tables.allocate_id();
        let user = User {
            id,
            email: email.to_string(),
            password: password_hash.to_string(),
            name: String::new(),
            learning_preference: "visual".to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: i64,
        name: &str,
        learning_preference: &str,
    ) -> Result<Option<User>, AppError> {
        let mut tables = self.lock()?;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.name = name.to_string();
            user.learning_preference = learning_preference.to_string();
            user.clone()
        }))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_document(&self, document: NewDocument) -> Result<Document, AppError> {
        let mut tables = self.lock()?;
        let id = tables.allocate_id();
        let stored = Document {
            id,
            owner_id: document.owner_id,
            title: document.title,
            storage_ref: document.storage_ref,
            mime_type: document.mime_type,
            size_bytes: document.size_bytes,
            document_type: document.document_type,
            subject: document.subject,
            uploaded_at: Utc::now(),
            summary: String::new(),
            key_terms: Json(Vec::new()),
            quiz: Json(Vec::new()),
            processed: false,
        };
        tables.documents.insert(id, stored.clone());
        Ok(stored)
    }

    async fn save_document_content(
        &self,
        id: i64,
        owner_id: i64,
        content: &DocumentContent,
    ) -> Result<Document, AppError> {
        let mut tables = self.lock()?;
        let document = tables
            .documents
            .get_mut(&id)
            .filter(|d| d.owner_id == owner_id && !d.processed)
            .ok_or(AppError::Conflict("Document is already processed".to_string()))?;
        document.summary = content.summary.clone();
        document.key_terms = Json(content.key_terms.clone());
        document.quiz = Json(content.quiz.clone());
        document.processed = true;
        Ok(document.clone())
    }

    async fn get_document(&self, id: i64, owner_id: i64) -> Result<Option<Document>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .documents
            .get(&id)
            .filter(|d| d.owner_id == owner_id)
            .cloned())
    }

    async fn get_documents(&self, ids: &[i64], owner_id: i64) -> Result<Vec<Document>, AppError> {
        let tables = self.lock()?;
        let found = tables
            .documents
            .values()
            .filter(|d| d.owner_id == owner_id && ids.contains(&d.id))
            .cloned()
            .collect();
        Ok(order_by_ids(ids, found))
    }

    async fn list_documents(&self, owner_id: i64) -> Result<Vec<Document>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .documents
            .values()
            .rev()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn count_documents(&self, owner_id: i64) -> Result<i64, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .documents
            .values()
            .filter(|d| d.owner_id == owner_id)
            .count() as i64)
    }
}

#[async_trait]
impl PlanStore for InMemoryStore {
    async fn insert_plan(&self, plan: NewStudyPlan) -> Result<StudyPlan, AppError> {
        let mut tables = self.lock()?;
        let id = tables.allocate_id();
        let stored = StudyPlan {
            id,
            owner_id: plan.owner_id,
            title: plan.title,
            exam_date: plan.exam_date,
            study_hours_per_week: plan.study_hours_per_week,
            difficulty: plan.difficulty,
            notes: plan.notes,
            document_ids: plan.document_ids,
            topics: plan.topics,
            schedule: plan.schedule,
            overall_progress: plan.overall_progress,
            created_at: Utc::now(),
        };
        tables.plans.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_plan(&self, id: i64, owner_id: i64) -> Result<Option<StudyPlan>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .plans
            .get(&id)
            .filter(|p| p.owner_id == owner_id)
            .cloned())
    }

    async fn list_plans(&self, owner_id: i64) -> Result<Vec<StudyPlan>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .plans
            .values()
            .rev()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn count_plans(&self, owner_id: i64) -> Result<i64, AppError> {
        let tables = self.lock()?;
        Ok(tables.plans.values().filter(|p| p.owner_id == owner_id).count() as i64)
    }

    async fn save_plan(&self, plan: &StudyPlan) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        let stored = tables
            .plans
            .get_mut(&plan.id)
            .filter(|p| p.owner_id == plan.owner_id)
            .ok_or(AppError::NotFound("Study plan not found".to_string()))?;
        stored.topics = plan.topics.clone();
        stored.schedule = plan.schedule.clone();
        stored.overall_progress = plan.overall_progress;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{KeyTerm, QuizQuestion};

    fn upload(owner_id: i64, title: &str) -> NewDocument {
        NewDocument {
            owner_id,
            title: title.to_string(),
            storage_ref: format!("https://storage.example.com/{}", title),
            mime_type: "text/plain".to_string(),
            size_bytes: 10,
            document_type: "notes".to_string(),
            subject: String::new(),
        }
    }

    fn content() -> DocumentContent {
        DocumentContent {
            summary: "Summary".to_string(),
            key_terms: vec![KeyTerm {
                term: "Force".to_string(),
                definition: "Push".to_string(),
            }],
            quiz: vec![QuizQuestion {
                question: "Q".to_string(),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                answer: "a".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = InMemoryStore::new();
        store.create_user("a@example.com", "hash").await.unwrap();
        let err = store.create_user("a@example.com", "hash").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn documents_are_scoped_to_owner() {
        let store = InMemoryStore::new();
        let doc = store.insert_document(upload(1, "a.txt")).await.unwrap();
        assert!(store.get_document(doc.id, 1).await.unwrap().is_some());
        assert!(store.get_document(doc.id, 2).await.unwrap().is_none());
        assert!(store.get_documents(&[doc.id], 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn documents_are_processed_once() {
        let store = InMemoryStore::new();
        let doc = store.insert_document(upload(1, "a.txt")).await.unwrap();
        assert!(!doc.processed);

        let saved = store.save_document_content(doc.id, 1, &content()).await.unwrap();
        assert!(saved.processed);
        assert_eq!(saved.key_terms.0.len(), 1);

        let err = store.save_document_content(doc.id, 1, &content()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn get_documents_keeps_requested_order() {
        let store = InMemoryStore::new();
        let a = store.insert_document(upload(1, "a.txt")).await.unwrap();
        let b = store.insert_document(upload(1, "b.txt")).await.unwrap();
        let docs = store.get_documents(&[b.id, 999, a.id], 1).await.unwrap();
        let ids: Vec<i64> = docs.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);

        let listed = store.list_documents(1).await.unwrap();
        assert_eq!(listed[0].id, b.id);
    }

    #[tokio::test]
    async fn counts_are_scoped_to_owner() {
        let store = InMemoryStore::new();
        store.insert_document(upload(1, "a.txt")).await.unwrap();
        store.insert_document(upload(1, "b.txt")).await.unwrap();
        store.insert_document(upload(2, "c.txt")).await.unwrap();

        assert_eq!(store.count_documents(1).await.unwrap(), 2);
        assert_eq!(store.count_documents(2).await.unwrap(), 1);
        assert_eq!(store.count_plans(1).await.unwrap(), 0);
    }
}
