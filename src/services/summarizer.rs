// src/services/summarizer.rs

use crate::{
    ai::{TextGenerator, parse, prompts},
    error::AppError,
    models::document::DocumentContent,
};

/// Produces the summary, key terms and quiz for one document's text.
///
/// Issues three generation calls, one attempt each. Any failure, including
/// output that does not parse into the expected shape, aborts the whole
/// extraction so a document is never half-processed.
pub async fn summarize_document(
    generator: &dyn TextGenerator,
    text: &str,
) -> Result<DocumentContent, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Document contains no text".to_string()));
    }

    let summary = generator.generate(&prompts::summary(text)).await?;
    let summary = summary.trim().to_string();
    if summary.is_empty() {
        return Err(AppError::GenerationFailure("empty summary".to_string()));
    }

    let key_terms_text = generator.generate(&prompts::key_terms(text)).await?;
    let key_terms = parse::parse_key_terms(&key_terms_text)
        .map_err(|e| AppError::GenerationFailure(format!("key terms: {}", e)))?;

    let quiz_text = generator.generate(&prompts::quiz(text)).await?;
    let quiz = parse::parse_quiz(&quiz_text)
        .map_err(|e| AppError::GenerationFailure(format!("quiz: {}", e)))?;

    Ok(DocumentContent {
        summary,
        key_terms,
        quiz,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::ai::GenerationError;

    /// Replays canned responses in order and records the prompts it saw.
    struct Replay {
        responses: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Replay {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Replay {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or(GenerationError::EmptyResponse)
        }
    }

    const KEY_TERMS: &str = r#"[
        {"term": "Force", "definition": "A push or pull"},
        {"term": "Mass", "definition": "Amount of matter"},
        {"term": "Velocity", "definition": "Speed with direction"},
        {"term": "Inertia", "definition": "Resistance to change"},
        {"term": "Lens", "definition": "Refracting element"}
    ]"#;

    const QUIZ: &str = r#"[
        {"question": "Unit of force?", "options": ["Newton", "Joule", "Watt", "Pascal"], "answer": "Newton"},
        {"question": "F = ?", "options": ["ma", "mv", "mgh", "pv"], "answer": "ma"},
        {"question": "Light bends in?", "options": ["Refraction", "Reflection", "Diffusion", "Decay"], "answer": "Refraction"}
    ]"#;

    #[tokio::test]
    async fn extracts_all_three_parts() {
        let generator = Replay::new(&["  Newtonian mechanics.  ", KEY_TERMS, QUIZ]);
        let content = summarize_document(&generator, "Chapter 1: forces").await.unwrap();

        assert_eq!(content.summary, "Newtonian mechanics.");
        assert_eq!(content.key_terms.len(), 5);
        assert_eq!(content.quiz.len(), 3);
        assert_eq!(content.quiz[1].answer, "ma");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.iter().all(|p| p.contains("Chapter 1: forces")));
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_generation() {
        let generator = Replay::new(&[]);
        let err = summarize_document(&generator, "   \n").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_quiz_is_fatal() {
        let generator = Replay::new(&["Summary", KEY_TERMS, "I could not write a quiz."]);
        let err = summarize_document(&generator, "text").await.unwrap_err();
        assert!(matches!(err, AppError::GenerationFailure(_)));
    }

    #[tokio::test]
    async fn generator_error_is_fatal() {
        let generator = Replay::new(&["Summary"]);
        let err = summarize_document(&generator, "text").await.unwrap_err();
        assert!(matches!(err, AppError::GenerationFailure(_)));
    }
}
