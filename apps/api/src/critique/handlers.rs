//! Axum route handlers for the critique API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extract_document;
use crate::models::critique::{CritiqueRequest, CritiqueResult};
use crate::state::AppState;

/// POST /analyze
///
/// Multipart form: `file` (required) and `job_description` (optional).
/// Upload problems are errors; every critique outcome, degraded or not, is a 200.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CritiqueResult>, AppError> {
    let request_id = Uuid::new_v4();
    analyze(state, multipart)
        .instrument(info_span!("analyze", %request_id))
        .await
}

async fn analyze(
    state: AppState,
    mut multipart: Multipart,
) -> Result<Json<CritiqueResult>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut job_description: Option<String> = None;

    // Multipart errors convert with their own status, so an over-limit body is a 413.
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string).ok_or_else(|| {
                    AppError::Validation("file must have a file name".to_string())
                })?;
                let data = field.bytes().await?;
                upload = Some((file_name, data.to_vec()));
            }
            Some("job_description") => {
                job_description = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    info!("Receiving file: {file_name} ({} bytes)", data.len());

    let ocr = state.ocr.clone();
    let document =
        tokio::task::spawn_blocking(move || extract_document(&data, &file_name, ocr.as_deref()))
            .await
            .map_err(|e| AppError::Internal(e.into()))??;

    let request = CritiqueRequest::new(document, job_description);
    let result = state.critic.critique(&request).await;

    Ok(Json(result))
}
