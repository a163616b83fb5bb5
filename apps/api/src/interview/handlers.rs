use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::candidate::resume::CandidateForm;
use crate::errors::AppError;
use crate::interview::machine::{CandidateEvent, ResumeAttachment, SessionView};
use crate::interview::recovery::RecoveryDecision;
use crate::state::AppState;
use crate::user::{require_role, Role};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub job_id: Uuid,
    pub candidate: CandidateForm,
    #[serde(default)]
    pub resume: Option<ResumeAttachment>,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    require_role(&headers, Role::Student)?;

    let resume_url = req.resume.as_ref().and_then(|r| r.url.clone());
    let candidate = req
        .candidate
        .validate(resume_url)
        .map_err(|msg| AppError::Validation(msg.to_string()))?;

    let job = state
        .repository
        .get_job(req.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", req.job_id)))?;

    let view = state
        .sessions
        .create(job.summary(), candidate, req.resume)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    require_role(&headers, Role::Student)?;
    Ok(Json(state.sessions.view(id).await?))
}

/// POST /api/v1/sessions/:id/events
pub async fn handle_session_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(event): Json<CandidateEvent>,
) -> Result<Json<SessionView>, AppError> {
    require_role(&headers, Role::Student)?;
    Ok(Json(state.sessions.dispatch(id, event).await?))
}

/// GET /api/v1/sessions/:id/recovery
pub async fn handle_session_recovery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<RecoveryDecision>, AppError> {
    require_role(&headers, Role::Student)?;
    Ok(Json(state.sessions.recovery(id).await?))
}

/// POST /api/v1/sessions/:id/resume
pub async fn handle_resume_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    require_role(&headers, Role::Student)?;
    Ok(Json(state.sessions.resume(id).await?))
}

/// POST /api/v1/sessions/:id/restart
pub async fn handle_restart_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&headers, Role::Student)?;
    state.sessions.restart(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
