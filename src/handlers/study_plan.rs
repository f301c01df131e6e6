// src/handlers/study_plan.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::study_plan::{
        CreatePlanRequest, PlanDetailResponse, StudyPlan, UpdateSubtopicRequest,
    },
    services::{
        planner::{PlanParameters, build_plan},
        progress,
    },
    state::AppState,
    utils::{html::clean_html, jwt::Claims},
};

async fn load_plan(state: &AppState, id: i64, owner_id: i64) -> Result<StudyPlan, AppError> {
    state
        .plans
        .get_plan(id, owner_id)
        .await?
        .ok_or(AppError::NotFound("Study plan not found".to_string()))
}

/// Creates a study plan from already processed documents.
///
/// Topics and schedule are generated before anything is written, so a
/// generation failure leaves no partial plan behind.
pub async fn create_plan(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = claims.user_id()?;

    // Decode by hand so a missing date or non-numeric hours is a 400, not a 422.
    let req: CreatePlanRequest = serde_json::from_value(payload)?;
    req.validate()?;

    let mut document_ids = req.document_ids.clone();
    let mut seen = std::collections::HashSet::new();
    document_ids.retain(|id| seen.insert(*id));

    let documents = state.documents.get_documents(&document_ids, owner_id).await?;
    if documents.len() != document_ids.len() {
        return Err(AppError::NotFound("Document not found".to_string()));
    }

    let title = clean_html(&req.title);
    if title.is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }

    let params = PlanParameters {
        owner_id,
        title,
        exam_date: req.exam_date,
        study_hours_per_week: req.study_hours_per_week,
        difficulty: req.difficulty,
        notes: clean_html(&req.notes),
    };

    let today = Utc::now().date_naive();
    let new_plan = build_plan(state.generator.as_ref(), &documents, params, today).await?;
    let plan = state.plans.insert_plan(new_plan).await?;
    tracing::info!("Created study plan {} for user {}", plan.id, owner_id);

    Ok((StatusCode::CREATED, Json(plan)))
}

/// Lists the current user's plans, newest first.
pub async fn list_plans(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = claims.user_id()?;
    let plans = state.plans.list_plans(owner_id).await?;
    Ok(Json(plans))
}

/// Retrieves a plan together with its source documents.
pub async fn get_plan(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = claims.user_id()?;
    let plan = load_plan(&state, id, owner_id).await?;
    let documents = state
        .documents
        .get_documents(&plan.document_ids, owner_id)
        .await?;

    Ok(Json(PlanDetailResponse { plan, documents }))
}

/// Sets a subtopic's status and returns the plan with recomputed progress.
pub async fn update_subtopic_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, topic_id, subtopic_id)): Path<(i64, String, String)>,
    Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = claims.user_id()?;
    let payload: UpdateSubtopicRequest = serde_json::from_value(payload)?;
    let plan = load_plan(&state, id, owner_id).await?;

    let plan = progress::update_subtopic_status(plan, &topic_id, &subtopic_id, payload.status)?;
    state.plans.save_plan(&plan).await?;

    Ok(Json(plan))
}

/// Marks a scheduled session as completed. Repeating the call is harmless.
pub async fn complete_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, day_id, session_id)): Path<(i64, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = claims.user_id()?;
    let plan = load_plan(&state, id, owner_id).await?;

    let plan = progress::mark_session_completed(plan, &day_id, &session_id)?;
    state.plans.save_plan(&plan).await?;

    Ok(Json(plan))
}
