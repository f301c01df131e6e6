// src/services/progress.rs

//! Progress tracking over a [`StudyPlan`] value.
//!
//! Both operations take the plan by value and hand back the updated plan, so
//! a failed lookup drops the working copy and nothing reaches the store.

use crate::{
    error::AppError,
    models::study_plan::{StudyPlan, SubtopicStatus, Topic},
};

/// round(100 * completed / total), half-up. Zero when there is nothing to complete.
fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((200 * completed + total) / (2 * total)) as u8
}

fn completed_count(topic: &Topic) -> usize {
    topic
        .subtopics
        .iter()
        .filter(|s| s.status == SubtopicStatus::Completed)
        .count()
}

pub fn topic_progress(topic: &Topic) -> u8 {
    percent(completed_count(topic), topic.subtopics.len())
}

pub fn overall_progress(topics: &[Topic]) -> u8 {
    let total: usize = topics.iter().map(|t| t.subtopics.len()).sum();
    let completed: usize = topics.iter().map(completed_count).sum();
    percent(completed, total)
}

/// Sets a subtopic's status, then recomputes that topic's progress and the
/// plan's overall progress. Any transition is allowed.
pub fn update_subtopic_status(
    mut plan: StudyPlan,
    topic_id: &str,
    subtopic_id: &str,
    status: SubtopicStatus,
) -> Result<StudyPlan, AppError> {
    let topic = plan
        .topics
        .iter_mut()
        .find(|t| t.id == topic_id)
        .ok_or(AppError::NotFound("Topic not found".to_string()))?;

    let subtopic = topic
        .subtopics
        .iter_mut()
        .find(|s| s.id == subtopic_id)
        .ok_or(AppError::NotFound("Subtopic not found".to_string()))?;

    subtopic.status = status;
    topic.progress = topic_progress(topic);
    plan.overall_progress = overall_progress(&plan.topics);

    Ok(plan)
}

/// Marks a scheduled session as done. Idempotent; subtopic progress is untouched.
pub fn mark_session_completed(
    mut plan: StudyPlan,
    day_id: &str,
    session_id: &str,
) -> Result<StudyPlan, AppError> {
    let day = plan
        .schedule
        .iter_mut()
        .find(|d| d.id == day_id)
        .ok_or(AppError::NotFound("Schedule day not found".to_string()))?;

    let session = day
        .sessions
        .iter_mut()
        .find(|s| s.id == session_id)
        .ok_or(AppError::NotFound("Session not found".to_string()))?;

    session.completed = true;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::models::study_plan::{Difficulty, ScheduleDay, Session, Subtopic};

    fn topic(id: &str, name: &str, total: usize, completed: usize) -> Topic {
        let subtopics = (0..total)
            .map(|i| Subtopic {
                id: format!("{}-{}", id, i),
                name: format!("{} part {}", name, i),
                status: if i < completed {
                    SubtopicStatus::Completed
                } else {
                    SubtopicStatus::NotStarted
                },
            })
            .collect();
        let mut t = Topic {
            id: id.to_string(),
            name: name.to_string(),
            progress: 0,
            subtopics,
        };
        t.progress = topic_progress(&t);
        t
    }

    fn plan(topics: Vec<Topic>) -> StudyPlan {
        let overall = overall_progress(&topics);
        StudyPlan {
            id: 1,
            owner_id: 7,
            title: "Physics final".to_string(),
            exam_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            study_hours_per_week: 10,
            difficulty: Difficulty::Medium,
            notes: String::new(),
            document_ids: vec![1],
            topics,
            schedule: vec![ScheduleDay {
                id: "day-1".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
                sessions: vec![Session {
                    id: "session-1".to_string(),
                    start_time: "09:00".to_string(),
                    end_time: "10:00".to_string(),
                    topic: "Mechanics".to_string(),
                    subtopic: "Mechanics part 3".to_string(),
                    completed: false,
                }],
            }],
            overall_progress: overall,
            created_at: Utc::now(),
        }
    }

    fn physics() -> StudyPlan {
        plan(vec![topic("mech", "Mechanics", 4, 3), topic("opt", "Optics", 2, 0)])
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn mixed_plan_reports_expected_figures() {
        let p = physics();
        assert_eq!(p.topics[0].progress, 75);
        assert_eq!(p.topics[1].progress, 0);
        assert_eq!(p.overall_progress, 50);
    }

    #[test]
    fn completing_last_mechanics_subtopic() {
        let p = update_subtopic_status(physics(), "mech", "mech-3", SubtopicStatus::Completed)
            .unwrap();
        assert_eq!(p.topics[0].progress, 100);
        assert_eq!(p.topics[1].progress, 0);
        assert_eq!(p.overall_progress, 67);
    }

    #[test]
    fn unchanged_status_does_not_drift() {
        let before = physics();
        let after =
            update_subtopic_status(before.clone(), "mech", "mech-0", SubtopicStatus::Completed)
                .unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn completed_can_go_back_to_not_started() {
        let p = update_subtopic_status(physics(), "mech", "mech-0", SubtopicStatus::NotStarted)
            .unwrap();
        assert_eq!(p.topics[0].progress, 50);
        assert_eq!(p.overall_progress, 33);
    }

    #[test]
    fn in_progress_does_not_count_as_completed() {
        let p = update_subtopic_status(physics(), "opt", "opt-0", SubtopicStatus::InProgress)
            .unwrap();
        assert_eq!(p.topics[1].progress, 0);
        assert_eq!(p.topics[1].subtopics[0].status, SubtopicStatus::InProgress);
        assert_eq!(p.overall_progress, 50);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let err = update_subtopic_status(physics(), "chem", "mech-0", SubtopicStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // A subtopic id that exists, but under a different topic.
        let err = update_subtopic_status(physics(), "mech", "opt-0", SubtopicStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn plan_without_subtopics_has_zero_progress() {
        let p = plan(vec![topic("empty", "Empty", 0, 0)]);
        assert_eq!(p.topics[0].progress, 0);
        assert_eq!(p.overall_progress, 0);
        assert_eq!(overall_progress(&[]), 0);
    }

    #[test]
    fn marking_a_session_is_idempotent() {
        let once = mark_session_completed(physics(), "day-1", "session-1").unwrap();
        let twice = mark_session_completed(once.clone(), "day-1", "session-1").unwrap();
        assert!(once.schedule[0].sessions[0].completed);
        assert_eq!(once, twice);
    }

    #[test]
    fn marking_a_session_leaves_subtopics_alone() {
        let before = physics();
        let after = mark_session_completed(before.clone(), "day-1", "session-1").unwrap();
        assert_eq!(before.topics, after.topics);
        assert_eq!(before.overall_progress, after.overall_progress);
    }

    #[test]
    fn unknown_session_is_not_found() {
        assert!(matches!(
            mark_session_completed(physics(), "day-2", "session-1"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            mark_session_completed(physics(), "day-1", "session-9"),
            Err(AppError::NotFound(_))
        ));
    }
}
