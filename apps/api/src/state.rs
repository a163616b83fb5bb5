use std::sync::Arc;

use crate::backend::ScoringBackend;
use crate::interview::registry::SessionRegistry;
use crate::store::{InterviewRepository, ResumeStorage};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn InterviewRepository>,
    pub resumes: Arc<dyn ResumeStorage>,
    pub backend: Arc<dyn ScoringBackend>,
    /// Live interview sessions; snapshots live in Redis behind the registry.
    pub sessions: SessionRegistry,
}
