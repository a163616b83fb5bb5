use axum::{
    extract::{Multipart, Query, State},
    http::HeaderMap,
    Json,
};

use crate::backend::models::ResumeFile;
use crate::candidate::jobs::{filter_jobs, JobQuery};
use crate::candidate::resume::{process_resume, validate_resume, ResumeUpload, MISSING_FILE_MESSAGE};
use crate::errors::AppError;
use crate::state::AppState;
use crate::store::models::JobRow;
use crate::user::{require_role, Role};

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<JobQuery>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    require_role(&headers, Role::Student)?;
    let jobs = state.repository.list_jobs().await?;
    Ok(Json(filter_jobs(jobs, &query)))
}

/// POST /api/v1/resumes/parse
///
/// Multipart with a single `file` part.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ResumeUpload>, AppError> {
    require_role(&headers, Role::Student)?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        file = Some(ResumeFile {
            file_name,
            content_type,
            bytes,
        });
        break;
    }

    let file = file.ok_or_else(|| AppError::Validation(MISSING_FILE_MESSAGE.to_string()))?;
    validate_resume(&file).map_err(|msg| AppError::Validation(msg.to_string()))?;

    let upload = process_resume(state.backend.as_ref(), state.resumes.as_ref(), file).await;
    Ok(Json(upload))
}
