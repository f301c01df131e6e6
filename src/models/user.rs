// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique login email.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// Display name, empty until the user sets one.
    pub name: String,

    /// One of 'visual', 'auditory', 'reading', 'kinesthetic'.
    pub learning_preference: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Aggregated profile data for the current user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub documents_count: i64,
    pub plans_count: i64,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for updating the current user's profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub name: String,
    #[validate(custom(function = validate_learning_preference))]
    pub learning_preference: String,
}

pub const LEARNING_PREFERENCES: [&str; 4] = ["visual", "auditory", "reading", "kinesthetic"];

fn validate_learning_preference(value: &str) -> Result<(), validator::ValidationError> {
    if !LEARNING_PREFERENCES.contains(&value) {
        return Err(validator::ValidationError::new("invalid_learning_preference"));
    }
    Ok(())
}
