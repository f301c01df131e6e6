// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Upper bound for a single uploaded file (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Extra request body allowance for multipart boundaries and the text fields.
pub const MULTIPART_HEADROOM_BYTES: usize = 64 * 1024;

/// Number of (term, definition) pairs extracted per document.
pub const KEY_TERM_COUNT: usize = 5;

/// Number of quiz questions generated per document.
pub const QUIZ_QUESTION_COUNT: usize = 3;

/// Number of options every quiz question carries.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// Length of the rolling schedule window (today + 6 days).
pub const SCHEDULE_DAYS: usize = 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub ai_base_url: String,
    /// Generation is disabled when no key is configured.
    pub ai_api_key: Option<String>,
    pub ai_model: String,
    pub ai_timeout_secs: u64,
    pub storage_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60 * 60 * 24 * 7);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let ai_base_url = env::var("AI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let ai_api_key = env::var("AI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let ai_model = env::var("AI_MODEL")
            .unwrap_or_else(|_| "gpt-4o".to_string());

        let ai_timeout_secs = env::var("AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let storage_base_url = env::var("STORAGE_BASE_URL")
            .unwrap_or_else(|_| "https://storage.example.com/".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            ai_base_url,
            ai_api_key,
            ai_model,
            ai_timeout_secs,
            storage_base_url,
        }
    }
}
