use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, types::Json};

use super::{DocumentStore, PlanStore, UserStore, order_by_ids};
use crate::{
    error::AppError,
    models::{
        document::{Document, DocumentContent, NewDocument},
        study_plan::{NewStudyPlan, ScheduleDay, StudyPlan, Topic},
        user::User,
    },
};

const USER_COLUMNS: &str = "id, email, password, name, learning_preference, created_at";

const DOCUMENT_COLUMNS: &str = "id, owner_id, title, storage_ref, mime_type, size_bytes, \
     document_type, subject, uploaded_at, summary, key_terms, quiz, processed";

const PLAN_COLUMNS: &str = "id, owner_id, title, exam_date, study_hours_per_week, difficulty, \
     notes, document_ids, topics, schedule, overall_progress, created_at";

/// PostgreSQL-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("User '{}' already exists", email))
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: i64,
        name: &str,
        learning_preference: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $1, learning_preference = $2 WHERE id = $3 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(name)
        .bind(learning_preference)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert_document(&self, document: NewDocument) -> Result<Document, AppError> {
        let inserted = sqlx::query_as::<_, Document>(&format!(
            r#"
            INSERT INTO documents
                (owner_id, title, storage_ref, mime_type, size_bytes, document_type, subject)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(document.owner_id)
        .bind(document.title)
        .bind(document.storage_ref)
        .bind(document.mime_type)
        .bind(document.size_bytes)
        .bind(document.document_type)
        .bind(document.subject)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert document: {:?}", e);
            AppError::from(e)
        })?;
        Ok(inserted)
    }

    async fn save_document_content(
        &self,
        id: i64,
        owner_id: i64,
        content: &DocumentContent,
    ) -> Result<Document, AppError> {
        sqlx::query_as::<_, Document>(&format!(
            r#"
            UPDATE documents
            SET summary = $1, key_terms = $2, quiz = $3, processed = TRUE
            WHERE id = $4 AND owner_id = $5 AND processed = FALSE
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(&content.summary)
        .bind(Json(content.key_terms.clone()))
        .bind(Json(content.quiz.clone()))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::Conflict("Document is already processed".to_string()))
    }

    async fn get_document(&self, id: i64, owner_id: i64) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<_, Document>(&format!(
            "SELECT {} FROM documents WHERE id = $1 AND owner_id = $2",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(document)
    }

    async fn get_documents(&self, ids: &[i64], owner_id: i64) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<_, Document>(&format!(
            "SELECT {} FROM documents WHERE id = ANY($1) AND owner_id = $2",
            DOCUMENT_COLUMNS
        ))
        .bind(ids)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(order_by_ids(ids, documents))
    }

    async fn list_documents(&self, owner_id: i64) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<_, Document>(&format!(
            "SELECT {} FROM documents WHERE owner_id = $1 ORDER BY uploaded_at DESC, id DESC",
            DOCUMENT_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(documents)
    }

    async fn count_documents(&self, owner_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Row shape of 'study_plans'; converted into the domain `StudyPlan`.
#[derive(FromRow)]
struct PlanRow {
    id: i64,
    owner_id: i64,
    title: String,
    exam_date: NaiveDate,
    study_hours_per_week: i32,
    difficulty: String,
    notes: String,
    document_ids: Vec<i64>,
    topics: Json<Vec<Topic>>,
    schedule: Json<Vec<ScheduleDay>>,
    overall_progress: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for StudyPlan {
    type Error = AppError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let difficulty = row
            .difficulty
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("bad difficulty in plan {}", row.id)))?;
        let overall_progress = u8::try_from(row.overall_progress)
            .map_err(|_| AppError::InternalServerError(format!("bad progress in plan {}", row.id)))?;
        Ok(StudyPlan {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            exam_date: row.exam_date,
            study_hours_per_week: row.study_hours_per_week,
            difficulty,
            notes: row.notes,
            document_ids: row.document_ids,
            topics: row.topics.0,
            schedule: row.schedule.0,
            overall_progress,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl PlanStore for PgStore {
    async fn insert_plan(&self, plan: NewStudyPlan) -> Result<StudyPlan, AppError> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            INSERT INTO study_plans
                (owner_id, title, exam_date, study_hours_per_week, difficulty, notes,
                 document_ids, topics, schedule, overall_progress)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            PLAN_COLUMNS
        ))
        .bind(plan.owner_id)
        .bind(plan.title)
        .bind(plan.exam_date)
        .bind(plan.study_hours_per_week)
        .bind(plan.difficulty.as_str())
        .bind(plan.notes)
        .bind(plan.document_ids)
        .bind(Json(plan.topics))
        .bind(Json(plan.schedule))
        .bind(i32::from(plan.overall_progress))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert study plan: {:?}", e);
            AppError::from(e)
        })?;
        StudyPlan::try_from(row)
    }

    async fn get_plan(&self, id: i64, owner_id: i64) -> Result<Option<StudyPlan>, AppError> {
        sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {} FROM study_plans WHERE id = $1 AND owner_id = $2",
            PLAN_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .map(StudyPlan::try_from)
        .transpose()
    }

    async fn list_plans(&self, owner_id: i64) -> Result<Vec<StudyPlan>, AppError> {
        sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {} FROM study_plans WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
            PLAN_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(StudyPlan::try_from)
        .collect()
    }

    async fn count_plans(&self, owner_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM study_plans WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn save_plan(&self, plan: &StudyPlan) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE study_plans
            SET topics = $1, schedule = $2, overall_progress = $3
            WHERE id = $4 AND owner_id = $5
            "#,
        )
        .bind(Json(plan.topics.clone()))
        .bind(Json(plan.schedule.clone()))
        .bind(i32::from(plan.overall_progress))
        .bind(plan.id)
        .bind(plan.owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save study plan {}: {:?}", plan.id, e);
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Study plan not found".to_string()));
        }
        Ok(())
    }
}
