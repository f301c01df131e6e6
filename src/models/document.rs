// src/models/document.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'documents' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,

    /// Location of the uploaded bytes in object storage.
    pub storage_ref: String,
    pub mime_type: String,
    pub size_bytes: i64,

    /// One of 'syllabus', 'notes', 'textbook', 'assignment', 'other'.
    pub document_type: String,
    pub subject: String,

    pub uploaded_at: chrono::DateTime<chrono::Utc>,

    /// AI-derived fields, empty until `processed` is set.
    pub summary: String,
    pub key_terms: Json<Vec<KeyTerm>>,
    pub quiz: Json<Vec<QuizQuestion>>,
    pub processed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTerm {
    pub term: String,
    pub definition: String,
}

/// A multiple-choice question. `answer` holds the text of the correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// Output of the content extractor for a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContent {
    pub summary: String,
    pub key_terms: Vec<KeyTerm>,
    pub quiz: Vec<QuizQuestion>,
}

/// Metadata captured at upload time, before any AI processing.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub owner_id: i64,
    pub title: String,
    pub storage_ref: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub document_type: String,
    pub subject: String,
}

pub const DOCUMENT_TYPES: [&str; 5] = ["syllabus", "notes", "textbook", "assignment", "other"];

/// Maps a user-supplied document type onto the known set.
pub fn parse_document_type(value: Option<&str>) -> Result<String, crate::error::AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok("other".to_string()),
        Some(v) if DOCUMENT_TYPES.contains(&v) => Ok(v.to_string()),
        Some(v) => Err(crate::error::AppError::BadRequest(format!(
            "Invalid document type '{}'",
            v
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_type_defaults_to_other() {
        assert_eq!(parse_document_type(None).unwrap(), "other");
        assert_eq!(parse_document_type(Some("  ")).unwrap(), "other");
        assert_eq!(parse_document_type(Some("syllabus")).unwrap(), "syllabus");
        assert!(parse_document_type(Some("poster")).is_err());
    }
}
