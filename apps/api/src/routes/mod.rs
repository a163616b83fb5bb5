pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::candidate::handlers as candidate;
use crate::candidate::resume::MAX_RESUME_BYTES;
use crate::dashboard::handlers as dashboard;
use crate::interview::handlers as interview;
use crate::state::AppState;

/// Multipart framing on top of the largest accepted file.
const UPLOAD_BODY_LIMIT: usize = MAX_RESUME_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Candidate
        .route(
            "/api/v1/jobs",
            get(candidate::handle_list_jobs).post(dashboard::handle_create_job),
        )
        .route(
            "/api/v1/resumes/parse",
            post(candidate::handle_parse_resume).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/v1/sessions", post(interview::handle_create_session))
        .route("/api/v1/sessions/:id", get(interview::handle_get_session))
        .route(
            "/api/v1/sessions/:id/events",
            post(interview::handle_session_event),
        )
        .route(
            "/api/v1/sessions/:id/recovery",
            get(interview::handle_session_recovery),
        )
        .route(
            "/api/v1/sessions/:id/resume",
            post(interview::handle_resume_session),
        )
        .route(
            "/api/v1/sessions/:id/restart",
            post(interview::handle_restart_session),
        )
        // Interviewer
        .route("/api/v1/dashboard/jobs", get(dashboard::handle_list_jobs))
        .route(
            "/api/v1/dashboard/candidates",
            get(dashboard::handle_list_candidates),
        )
        .route("/api/v1/dashboard/stats", get(dashboard::handle_stats))
        .route(
            "/api/v1/dashboard/interviews/:id/decision",
            post(dashboard::handle_decision),
        )
        .with_state(state)
}
