use chrono::NaiveDate;

use crate::{
    config::{KEY_TERM_COUNT, QUIZ_OPTION_COUNT, QUIZ_QUESTION_COUNT, SCHEDULE_DAYS},
    models::study_plan::Difficulty,
};

const JSON_ONLY: &str = "Respond with JSON only, without commentary or Markdown.";

pub fn summary(content: &str) -> String {
    format!(
        "Summarize the following document content in a concise way:\n\n{}",
        content
    )
}

pub fn key_terms(content: &str) -> String {
    format!(
        "Extract {} key terms and their definitions from the following document content. \
         Format as a JSON array of objects with \"term\" and \"definition\" properties. {}\n\n{}",
        KEY_TERM_COUNT, JSON_ONLY, content
    )
}

pub fn quiz(content: &str) -> String {
    format!(
        "Create {} multiple-choice quiz questions based on the following document content. \
         Format as a JSON array of objects with \"question\", \"options\" (array of {} choices) \
         and \"answer\" (the exact text of the correct option) properties. {}\n\n{}",
        QUIZ_QUESTION_COUNT, QUIZ_OPTION_COUNT, JSON_ONLY, content
    )
}

pub fn topics(combined_summaries: &str) -> String {
    format!(
        "Based on the following content, identify the main topics and subtopics for a study plan. \
         Format as a JSON array of objects with \"name\" (topic name) and \"subtopics\" \
         (array of objects with a \"name\" property). {}\n\n{}",
        JSON_ONLY, combined_summaries
    )
}

pub struct ScheduleParams<'a> {
    /// JSON rendering of the topic list.
    pub topics_json: &'a str,
    pub start: NaiveDate,
    pub days_until_exam: i64,
    pub study_hours_per_week: i32,
    pub difficulty: Difficulty,
}

pub fn schedule(params: &ScheduleParams<'_>) -> String {
    let last = params.start + chrono::Days::new(SCHEDULE_DAYS as u64 - 1);
    format!(
        "Create a study schedule for the next {days} days, from {start} to {last}, \
         based on the following parameters:\n\
         - Topics: {topics}\n\
         - Days until exam: {until}\n\
         - Study hours per week: {hours}\n\
         - Difficulty: {difficulty}\n\n\
         Format as a JSON array of objects with \"date\" (YYYY-MM-DD format) and \"sessions\" \
         (array of objects with \"startTime\" and \"endTime\" in HH:MM 24-hour format, \
         \"topic\" and \"subtopic\" properties). {json_only}",
        days = SCHEDULE_DAYS,
        start = params.start,
        last = last,
        topics = params.topics_json,
        until = params.days_until_exam,
        hours = params.study_hours_per_week,
        difficulty = params.difficulty,
        json_only = JSON_ONLY,
    )
}
