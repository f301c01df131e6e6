// src/services/planner.rs

//! Study plan builder: processed documents + user parameters in,
//! topics and an initial schedule out.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    ai::{
        TextGenerator,
        parse::{self, DayOutline, TopicOutline},
        prompts::{self, ScheduleParams},
    },
    error::AppError,
    models::{
        document::Document,
        study_plan::{
            Difficulty, NewStudyPlan, ScheduleDay, Session, Subtopic, SubtopicStatus, Topic,
        },
    },
};

/// User-supplied inputs that shape the plan.
#[derive(Debug, Clone)]
pub struct PlanParameters {
    pub owner_id: i64,
    pub title: String,
    pub exam_date: NaiveDate,
    pub study_hours_per_week: i32,
    pub difficulty: Difficulty,
    pub notes: String,
}

/// Summaries in document order, separated by a blank line.
pub fn combine_summaries(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| d.summary.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Calendar days from `today` to the exam. Negative once the exam has passed.
pub fn days_until_exam(exam_date: NaiveDate, today: NaiveDate) -> i64 {
    (exam_date - today).num_days()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Attaches ids and the initial not-started state to generated topics.
pub fn topics_from_outline(outline: Vec<TopicOutline>) -> Vec<Topic> {
    outline
        .into_iter()
        .map(|t| Topic {
            id: new_id(),
            name: t.name,
            progress: 0,
            subtopics: t
                .subtopics
                .into_iter()
                .map(|s| Subtopic {
                    id: new_id(),
                    name: s.name,
                    status: SubtopicStatus::NotStarted,
                })
                .collect(),
        })
        .collect()
}

/// Attaches ids to generated days and sessions; nothing starts completed.
pub fn schedule_from_outline(outline: Vec<DayOutline>) -> Vec<ScheduleDay> {
    outline
        .into_iter()
        .map(|d| ScheduleDay {
            id: new_id(),
            date: d.date,
            sessions: d
                .sessions
                .into_iter()
                .map(|s| Session {
                    id: new_id(),
                    start_time: s.start_time,
                    end_time: s.end_time,
                    topic: s.topic,
                    subtopic: s.subtopic,
                    completed: false,
                })
                .collect(),
        })
        .collect()
}

#[derive(Serialize)]
struct TopicPromptView<'a> {
    name: &'a str,
    subtopics: Vec<&'a str>,
}

fn topics_json(topics: &[Topic]) -> Result<String, AppError> {
    let view: Vec<TopicPromptView<'_>> = topics
        .iter()
        .map(|t| TopicPromptView {
            name: &t.name,
            subtopics: t.subtopics.iter().map(|s| s.name.as_str()).collect(),
        })
        .collect();
    serde_json::to_string(&view).map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Builds a complete, unsaved plan.
///
/// The generator is asked twice: once for the topic breakdown of the combined
/// summaries, once for a 7-day schedule starting `today`. Either call failing
/// or returning malformed structure fails the whole build.
pub async fn build_plan(
    generator: &dyn TextGenerator,
    documents: &[Document],
    params: PlanParameters,
    today: NaiveDate,
) -> Result<NewStudyPlan, AppError> {
    if documents.is_empty() {
        return Err(AppError::BadRequest(
            "At least one document is required".to_string(),
        ));
    }
    if params.study_hours_per_week < 1 {
        return Err(AppError::BadRequest(
            "Study hours per week must be a positive integer".to_string(),
        ));
    }
    if let Some(doc) = documents
        .iter()
        .find(|d| !d.processed || d.summary.trim().is_empty())
    {
        return Err(AppError::BadRequest(format!(
            "Document '{}' has not been processed yet",
            doc.title
        )));
    }

    let combined = combine_summaries(documents);

    let topics_text = generator.generate(&prompts::topics(&combined)).await?;
    let topics = parse::parse_topics(&topics_text)
        .map(topics_from_outline)
        .map_err(|e| AppError::GenerationFailure(format!("topics: {}", e)))?;

    let topics_json = topics_json(&topics)?;
    let schedule_prompt = prompts::schedule(&ScheduleParams {
        topics_json: &topics_json,
        start: today,
        days_until_exam: days_until_exam(params.exam_date, today),
        study_hours_per_week: params.study_hours_per_week,
        difficulty: params.difficulty,
    });
    let schedule_text = generator.generate(&schedule_prompt).await?;
    let schedule = parse::parse_schedule(&schedule_text)
        .map(schedule_from_outline)
        .map_err(|e| AppError::GenerationFailure(format!("schedule: {}", e)))?;

    tracing::info!(
        "Built plan '{}' with {} topics over {} days",
        params.title,
        topics.len(),
        schedule.len()
    );

    Ok(NewStudyPlan {
        owner_id: params.owner_id,
        title: params.title,
        exam_date: params.exam_date,
        study_hours_per_week: params.study_hours_per_week,
        difficulty: params.difficulty,
        notes: params.notes,
        document_ids: documents.iter().map(|d| d.id).collect(),
        topics,
        schedule,
        overall_progress: 0,
    })
}
