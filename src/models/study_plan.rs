// src/models/study_plan.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{error::AppError, models::document::Document};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(AppError::BadRequest(format!("Invalid difficulty '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtopicStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtopic {
    pub id: String,
    pub name: String,
    pub status: SubtopicStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    /// Percentage of completed subtopics. Derived by the progress tracker.
    pub progress: u8,
    pub subtopics: Vec<Subtopic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// "HH:MM"
    pub start_time: String,
    pub end_time: String,
    /// Display labels only; sessions are tracked independently of subtopics.
    pub topic: String,
    pub subtopic: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub id: String,
    pub date: NaiveDate,
    pub sessions: Vec<Session>,
}

/// Represents the 'study_plans' table in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub exam_date: NaiveDate,
    pub study_hours_per_week: i32,
    pub difficulty: Difficulty,
    pub notes: String,
    pub document_ids: Vec<i64>,
    pub topics: Vec<Topic>,
    pub schedule: Vec<ScheduleDay>,
    pub overall_progress: u8,
    pub created_at: DateTime<Utc>,
}

/// A fully built plan that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudyPlan {
    pub owner_id: i64,
    pub title: String,
    pub exam_date: NaiveDate,
    pub study_hours_per_week: i32,
    pub difficulty: Difficulty,
    pub notes: String,
    pub document_ids: Vec<i64>,
    pub topics: Vec<Topic>,
    pub schedule: Vec<ScheduleDay>,
    pub overall_progress: u8,
}

/// DTO for creating a study plan.
///
/// Deserialized from a raw JSON value so that a missing exam date or a
/// non-numeric hour count surfaces as a 400 through `AppError`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, max = 100, message = "Title length must be between 1 and 100 chars"))]
    pub title: String,

    /// "YYYY-MM-DD". Past dates are accepted.
    pub exam_date: NaiveDate,

    #[validate(range(min = 1, message = "Study hours per week must be a positive integer"))]
    pub study_hours_per_week: i32,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub notes: String,

    #[validate(length(min = 1, message = "At least one document is required"))]
    pub document_ids: Vec<i64>,
}

/// DTO for changing a subtopic's status.
#[derive(Debug, Deserialize)]
pub struct UpdateSubtopicRequest {
    pub status: SubtopicStatus,
}

/// A plan together with the documents it was built from.
#[derive(Debug, Serialize)]
pub struct PlanDetailResponse {
    #[serde(flatten)]
    pub plan: StudyPlan,
    pub documents: Vec<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtopic_status_uses_kebab_case() {
        let json = serde_json::to_string(&SubtopicStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not-started\"");
        let parsed: SubtopicStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(parsed, SubtopicStatus::InProgress);
    }

    #[test]
    fn create_plan_request_requires_exam_date() {
        let payload = serde_json::json!({
            "title": "Finals",
            "study_hours_per_week": 10,
            "document_ids": [1]
        });
        assert!(serde_json::from_value::<CreatePlanRequest>(payload).is_err());
    }

    #[test]
    fn create_plan_request_rejects_non_numeric_hours() {
        let payload = serde_json::json!({
            "title": "Finals",
            "exam_date": "2026-12-01",
            "study_hours_per_week": "lots",
            "document_ids": [1]
        });
        assert!(serde_json::from_value::<CreatePlanRequest>(payload).is_err());
    }

    #[test]
    fn create_plan_request_validates_hours_and_documents() {
        let payload = serde_json::json!({
            "title": "Finals",
            "exam_date": "2026-12-01",
            "study_hours_per_week": 0,
            "document_ids": []
        });
        let req: CreatePlanRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(req.difficulty, Difficulty::Medium);
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("study_hours_per_week"));
        assert!(fields.contains_key("document_ids"));
    }
}
