// src/handlers/document.rs

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    config::MAX_UPLOAD_BYTES,
    error::AppError,
    models::document::{NewDocument, parse_document_type},
    services::summarizer::summarize_document,
    state::AppState,
    utils::{html::clean_html, jwt::Claims, storage::storage_ref},
};

/// The uploaded file part of a multipart request.
struct UploadedFile {
    file_name: String,
    mime_type: String,
    bytes: Bytes,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid upload: {}", e))
}

/// Uploads a document and runs AI processing on it.
///
/// Multipart fields: `file` (required), `title`, `document_type`, `subject`.
/// The record is created first and stays unprocessed if generation fails,
/// in which case the failure is returned to the caller.
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = claims.user_id()?;

    let mut file: Option<UploadedFile> = None;
    let mut title: Option<String> = None;
    let mut document_type: Option<String> = None;
    let mut subject: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.len() > MAX_UPLOAD_BYTES {
                    return Err(AppError::BadRequest(format!(
                        "File exceeds the {} MiB upload limit",
                        MAX_UPLOAD_BYTES / (1024 * 1024)
                    )));
                }
                file = Some(UploadedFile {
                    file_name,
                    mime_type,
                    bytes,
                });
            }
            Some("title") => title = Some(field.text().await.map_err(multipart_error)?),
            Some("document_type") => {
                document_type = Some(field.text().await.map_err(multipart_error)?)
            }
            Some("subject") => subject = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    let file = file.ok_or(AppError::BadRequest("Missing 'file' field".to_string()))?;
    let document_type = parse_document_type(document_type.as_deref())?;
    let text = state.extractor.extract(&file.bytes, &file.mime_type)?;

    let title = title
        .map(|t| clean_html(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| clean_html(&file.file_name));
    if title.is_empty() || title.chars().count() > 200 {
        return Err(AppError::BadRequest(
            "Title length must be between 1 and 200 chars".to_string(),
        ));
    }

    let document = state
        .documents
        .insert_document(NewDocument {
            owner_id,
            title,
            storage_ref: storage_ref(&state.config.storage_base_url, &file.file_name, Utc::now())?,
            mime_type: file.mime_type,
            size_bytes: file.bytes.len() as i64,
            document_type,
            subject: subject.map(|s| clean_html(&s)).unwrap_or_default(),
        })
        .await?;

    let content = match summarize_document(state.generator.as_ref(), &text).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Document {} left unprocessed: {}", document.id, e);
            return Err(e);
        }
    };

    let processed = state
        .documents
        .save_document_content(document.id, owner_id, &content)
        .await?;
    tracing::info!("Processed document {} for user {}", processed.id, owner_id);

    Ok((StatusCode::CREATED, Json(processed)))
}

/// Lists the current user's documents, newest upload first.
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = claims.user_id()?;
    let documents = state.documents.list_documents(owner_id).await?;
    Ok(Json(documents))
}

/// Retrieves a single document owned by the current user.
pub async fn get_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = claims.user_id()?;
    let document = state
        .documents
        .get_document(id, owner_id)
        .await?
        .ok_or(AppError::NotFound("Document not found".to_string()))?;
    Ok(Json(document))
}
