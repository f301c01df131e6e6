//! Text extraction collaborator: (file bytes, mime type) -> plain text.

use crate::error::AppError;

pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<String, AppError>;
}

/// Handles UTF-8 text formats only. Binary formats such as PDF or DOCX need an
/// external extraction service plugged in behind [`TextExtractor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

const TEXT_APPLICATION_TYPES: [&str; 3] = ["application/json", "application/xml", "application/x-yaml"];

fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<String, AppError> {
        let essence = essence(mime_type);
        if !essence.starts_with("text/") && !TEXT_APPLICATION_TYPES.contains(&essence.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Unsupported file type '{}'",
                mime_type
            )));
        }

        let text = std::str::from_utf8(bytes)
            .map_err(|_| AppError::BadRequest("File is not valid UTF-8 text".to_string()))?;
        let text = text.trim_start_matches('\u{feff}').trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("Document contains no text".to_string()));
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_text_with_charset_parameter() {
        let text = PlainTextExtractor
            .extract("\u{feff}Chapter 1\n".as_bytes(), "text/plain; charset=utf-8")
            .unwrap();
        assert_eq!(text, "Chapter 1");
    }

    #[test]
    fn rejects_binary_types_and_empty_files() {
        assert!(PlainTextExtractor.extract(b"%PDF-1.7", "application/pdf").is_err());
        assert!(PlainTextExtractor.extract(b"   ", "text/markdown").is_err());
        assert!(PlainTextExtractor.extract(&[0xff, 0xfe, 0x00], "text/plain").is_err());
    }
}
