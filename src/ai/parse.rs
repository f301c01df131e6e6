//! Strict, schema-validating parsers for structured generation output.
//!
//! The generator is asked for bare JSON, but models frequently wrap it in a
//! Markdown fence, so one surrounding fence is stripped before decoding.
//! Anything that does not match the expected shape is a [`ParseError`].

use std::{collections::HashSet, sync::LazyLock};

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    config::{KEY_TERM_COUNT, QUIZ_OPTION_COUNT, QUIZ_QUESTION_COUNT, SCHEDULE_DAYS},
    models::document::{KeyTerm, QuizQuestion},
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected shape: {0}")]
    Shape(String),
}

fn shape(msg: impl Into<String>) -> ParseError {
    ParseError::Shape(msg.into())
}

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("valid fence regex")
});

fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ParseError> {
    Ok(serde_json::from_str(strip_code_fence(text))?)
}

fn non_blank(value: &str, what: &str) -> Result<String, ParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(shape(format!("{} is empty", what)));
    }
    Ok(trimmed.to_string())
}

pub fn parse_key_terms(text: &str) -> Result<Vec<KeyTerm>, ParseError> {
    let terms: Vec<KeyTerm> = decode(text)?;
    if terms.len() != KEY_TERM_COUNT {
        return Err(shape(format!(
            "expected {} key terms, got {}",
            KEY_TERM_COUNT,
            terms.len()
        )));
    }
    terms
        .into_iter()
        .map(|t| {
            Ok(KeyTerm {
                term: non_blank(&t.term, "term")?,
                definition: non_blank(&t.definition, "definition")?,
            })
        })
        .collect()
}

pub fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>, ParseError> {
    let questions: Vec<QuizQuestion> = decode(text)?;
    if questions.len() != QUIZ_QUESTION_COUNT {
        return Err(shape(format!(
            "expected {} quiz questions, got {}",
            QUIZ_QUESTION_COUNT,
            questions.len()
        )));
    }
    questions
        .into_iter()
        .map(|q| {
            if q.options.len() != QUIZ_OPTION_COUNT {
                return Err(shape(format!(
                    "expected {} options, got {}",
                    QUIZ_OPTION_COUNT,
                    q.options.len()
                )));
            }
            let options = q
                .options
                .iter()
                .map(|o| non_blank(o, "option"))
                .collect::<Result<Vec<_>, _>>()?;
            let answer = non_blank(&q.answer, "answer")?;
            if !options.contains(&answer) {
                return Err(shape(format!("answer '{}' is not one of the options", answer)));
            }
            Ok(QuizQuestion {
                question: non_blank(&q.question, "question")?,
                options,
                answer,
            })
        })
        .collect()
}

/// A topic as proposed by the generator, before ids and state are attached.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicOutline {
    pub name: String,
    pub subtopics: Vec<SubtopicOutline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubtopicOutline {
    pub name: String,
}

pub fn parse_topics(text: &str) -> Result<Vec<TopicOutline>, ParseError> {
    let topics: Vec<TopicOutline> = decode(text)?;
    if topics.is_empty() {
        return Err(shape("no topics"));
    }
    topics
        .into_iter()
        .map(|t| {
            let subtopics = t
                .subtopics
                .iter()
                .map(|s| {
                    Ok(SubtopicOutline {
                        name: non_blank(&s.name, "subtopic name")?,
                    })
                })
                .collect::<Result<Vec<_>, ParseError>>()?;
            Ok(TopicOutline {
                name: non_blank(&t.name, "topic name")?,
                subtopics,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawDay {
    date: String,
    sessions: Vec<RawSession>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSession {
    start_time: String,
    end_time: String,
    topic: String,
    subtopic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOutline {
    pub date: NaiveDate,
    pub sessions: Vec<SessionOutline>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutline {
    pub start_time: String,
    pub end_time: String,
    pub topic: String,
    pub subtopic: String,
}

fn parse_time(value: &str) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| shape(format!("'{}' is not an HH:MM time", value)))
}

pub fn parse_schedule(text: &str) -> Result<Vec<DayOutline>, ParseError> {
    let days: Vec<RawDay> = decode(text)?;
    if days.is_empty() || days.len() > SCHEDULE_DAYS {
        return Err(shape(format!(
            "expected 1 to {} days, got {}",
            SCHEDULE_DAYS,
            days.len()
        )));
    }

    let mut seen = HashSet::new();
    days.into_iter()
        .map(|day| {
            let date = NaiveDate::parse_from_str(day.date.trim(), "%Y-%m-%d")
                .map_err(|_| shape(format!("'{}' is not a YYYY-MM-DD date", day.date)))?;
            if !seen.insert(date) {
                return Err(shape(format!("date {} appears twice", date)));
            }
            let sessions = day
                .sessions
                .into_iter()
                .map(|s| {
                    let start = parse_time(&s.start_time)?;
                    let end = parse_time(&s.end_time)?;
                    if start >= end {
                        return Err(shape(format!(
                            "session {}-{} ends before it starts",
                            s.start_time, s.end_time
                        )));
                    }
                    Ok(SessionOutline {
                        start_time: start.format("%H:%M").to_string(),
                        end_time: end.format("%H:%M").to_string(),
                        topic: non_blank(&s.topic, "session topic")?,
                        subtopic: non_blank(&s.subtopic, "session subtopic")?,
                    })
                })
                .collect::<Result<Vec<_>, ParseError>>()?;
            Ok(DayOutline { date, sessions })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_TERMS: &str = r#"[
        {"term": "Force", "definition": "A push or pull"},
        {"term": "Mass", "definition": "Amount of matter"},
        {"term": "Velocity", "definition": "Speed with direction"},
        {"term": "Inertia", "definition": "Resistance to change in motion"},
        {"term": "Lens", "definition": "Refracting optical element"}
    ]"#;

    #[test]
    fn strips_markdown_fence() {
        let fenced = format!("```json\n{}\n```", KEY_TERMS);
        let terms = parse_key_terms(&fenced).unwrap();
        assert_eq!(terms.len(), 5);
        assert_eq!(terms[0].term, "Force");
    }

    #[test]
    fn key_terms_must_be_exactly_five() {
        let four = r#"[
            {"term": "a", "definition": "b"},
            {"term": "c", "definition": "d"},
            {"term": "e", "definition": "f"},
            {"term": "g", "definition": "h"}
        ]"#;
        assert!(matches!(parse_key_terms(four), Err(ParseError::Shape(_))));
    }

    #[test]
    fn prose_is_a_json_error() {
        let err = parse_key_terms("Sure! Here are your key terms: Force, Mass").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn quiz_answer_must_be_an_option() {
        let quiz = r#"[
            {"question": "Q1", "options": ["a", "b", "c", "d"], "answer": "a"},
            {"question": "Q2", "options": ["a", "b", "c", "d"], "answer": "b"},
            {"question": "Q3", "options": ["a", "b", "c", "d"], "answer": "e"}
        ]"#;
        assert!(matches!(parse_quiz(quiz), Err(ParseError::Shape(_))));
    }

    #[test]
    fn quiz_requires_four_options() {
        let quiz = r#"[
            {"question": "Q1", "options": ["a", "b", "c", "d"], "answer": "a"},
            {"question": "Q2", "options": ["a", "b", "c"], "answer": "b"},
            {"question": "Q3", "options": ["a", "b", "c", "d"], "answer": "c"}
        ]"#;
        assert!(parse_quiz(quiz).is_err());
    }

    #[test]
    fn topics_keep_order_and_trim_names() {
        let topics = parse_topics(
            r#"[{"name": " Mechanics ", "subtopics": [{"name": "Kinematics"}, {"name": "Dynamics"}]},
                {"name": "Optics", "subtopics": [{"name": "Refraction"}]}]"#,
        )
        .unwrap();
        assert_eq!(topics[0].name, "Mechanics");
        assert_eq!(topics[0].subtopics[1].name, "Dynamics");
        assert_eq!(topics[1].name, "Optics");
    }

    #[test]
    fn topics_missing_subtopics_field_is_rejected() {
        assert!(parse_topics(r#"[{"name": "Mechanics"}]"#).is_err());
        assert!(parse_topics("[]").is_err());
    }

    #[test]
    fn schedule_normalizes_times() {
        let days = parse_schedule(
            r#"[{"date": "2026-10-19", "sessions": [
                {"startTime": "9:00", "endTime": "10:30", "topic": "Mechanics", "subtopic": "Kinematics"}
            ]}]"#,
        )
        .unwrap();
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(days[0].sessions[0].start_time, "09:00");
        assert_eq!(days[0].sessions[0].end_time, "10:30");
    }

    #[test]
    fn schedule_rejects_bad_dates_and_inverted_sessions() {
        assert!(parse_schedule(r#"[{"date": "next monday", "sessions": []}]"#).is_err());
        assert!(
            parse_schedule(
                r#"[{"date": "2026-10-19", "sessions": [
                    {"startTime": "11:00", "endTime": "10:00", "topic": "A", "subtopic": "B"}
                ]}]"#
            )
            .is_err()
        );
        assert!(
            parse_schedule(
                r#"[{"date": "2026-10-19", "sessions": []}, {"date": "2026-10-19", "sessions": []}]"#
            )
            .is_err()
        );
    }

    #[test]
    fn schedule_rejects_more_than_a_week() {
        let days: Vec<String> = (10..18)
            .map(|d| format!(r#"{{"date": "2026-10-{}", "sessions": []}}"#, d))
            .collect();
        let text = format!("[{}]", days.join(","));
        assert!(parse_schedule(&text).is_err());
    }
}
