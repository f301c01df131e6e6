use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{MeResponse, UpdateProfileRequest},
    state::AppState,
    utils::{html::clean_html, jwt::Claims},
};

/// Get current user's profile and statistics.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = state
        .users
        .find_user(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let documents_count = state.documents.count_documents(user_id).await?;
    let plans_count = state.plans.count_plans(user_id).await?;

    Ok(Json(MeResponse {
        user,
        documents_count,
        plans_count,
    }))
}

/// Update display name and learning preference.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let payload: UpdateProfileRequest = serde_json::from_value(payload)?;
    payload.validate()?;

    let user = state
        .users
        .update_profile(user_id, &clean_html(&payload.name), &payload.learning_preference)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
