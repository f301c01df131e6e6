use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use url::Url;

use crate::error::AppError;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid file name regex"));

/// Reduces an uploaded file name to characters that are safe in a URL path segment.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Object storage location for an upload: `{base}/{unix millis}-{file name}`.
pub fn storage_ref(base_url: &str, file_name: &str, now: DateTime<Utc>) -> Result<String, AppError> {
    let mut base = Url::parse(base_url)
        .map_err(|e| AppError::InternalServerError(format!("invalid STORAGE_BASE_URL: {}", e)))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let key = format!("{}-{}", now.timestamp_millis(), sanitize_file_name(file_name));
    base.join(&key)
        .map(String::from)
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}
