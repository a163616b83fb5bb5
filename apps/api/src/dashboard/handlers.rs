use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::dashboard::{
    apply_decision, compute_stats, filter_candidates, job_overview, CandidateFilter,
    DashboardStats, Decision, DecisionOutcome, JobOverview,
};
use crate::errors::AppError;
use crate::state::AppState;
use crate::store::models::{CandidateRow, JobRow, NewJob};
use crate::user::{require_role, Role};

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut job): Json<NewJob>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    require_role(&headers, Role::Interviewer)?;

    job.title = job.title.trim().to_string();
    if job.title.is_empty() {
        return Err(AppError::Validation("Job title is required".to_string()));
    }
    job.custom_questions.retain(|q| !q.trim().is_empty());

    let row = state.repository.create_job(&job).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/dashboard/jobs
/// Every posting with the number of interviews recorded against it.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<JobOverview>>, AppError> {
    require_role(&headers, Role::Interviewer)?;
    let jobs = state.repository.list_jobs().await?;
    let candidates = state.repository.list_candidates(None).await?;
    Ok(Json(job_overview(jobs, &candidates)))
}

/// GET /api/v1/dashboard/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<CandidateFilter>,
) -> Result<Json<Vec<CandidateRow>>, AppError> {
    require_role(&headers, Role::Interviewer)?;
    let rows = state.repository.list_candidates(filter.job_id).await?;
    Ok(Json(filter_candidates(rows, &filter)))
}

/// GET /api/v1/dashboard/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, AppError> {
    require_role(&headers, Role::Interviewer)?;
    let jobs = state.repository.list_jobs().await?;
    let candidates = state.repository.list_candidates(None).await?;
    Ok(Json(compute_stats(jobs.len(), &candidates)))
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

/// POST /api/v1/dashboard/interviews/:id/decision
pub async fn handle_decision(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<DecisionOutcome>, AppError> {
    require_role(&headers, Role::Interviewer)?;
    let outcome = apply_decision(
        state.repository.as_ref(),
        state.backend.as_ref(),
        id,
        req.decision,
    )
    .await?;
    Ok(Json(outcome))
}
