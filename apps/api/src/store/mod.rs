//! Persistence ports: relational records, session snapshots and resume blobs.

pub mod models;
pub mod postgres;
pub mod resumes;
pub mod snapshots;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::interview::machine::SessionSnapshot;
use crate::store::models::{
    CandidateRow, InterviewProgress, InterviewRow, InterviewStatus, JobRow, NewJob, NewStudent,
    StudentRow,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Object storage error: {0}")]
    ObjectStorage(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Students, jobs and interviews.
#[async_trait]
pub trait InterviewRepository: Send + Sync {
    async fn find_student_by_email(&self, email: &str) -> Result<Option<StudentRow>, StoreError>;

    async fn create_student(&self, student: &NewStudent) -> Result<StudentRow, StoreError>;

    /// Newest first.
    async fn list_jobs(&self) -> Result<Vec<JobRow>, StoreError>;

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobRow>, StoreError>;

    async fn create_job(&self, job: &NewJob) -> Result<JobRow, StoreError>;

    /// Updates the interview for (job, student) if one exists, otherwise inserts it.
    async fn save_interview_progress(
        &self,
        progress: &InterviewProgress,
    ) -> Result<InterviewRow, StoreError>;

    async fn update_interview_status(
        &self,
        interview_id: Uuid,
        status: InterviewStatus,
    ) -> Result<Option<InterviewRow>, StoreError>;

    /// All interviews joined with student and job, highest score first.
    async fn list_candidates(&self, job_id: Option<Uuid>) -> Result<Vec<CandidateRow>, StoreError>;

    async fn get_candidate(&self, interview_id: Uuid) -> Result<Option<CandidateRow>, StoreError>;
}

/// Durable copy of live session state.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError>;

    async fn load(&self, session_id: Uuid) -> Result<Option<SessionSnapshot>, StoreError>;

    async fn clear(&self, session_id: Uuid) -> Result<(), StoreError>;
}

/// Resume blob storage. Returns the public URL of the stored object.
#[async_trait]
pub trait ResumeStorage: Send + Sync {
    async fn upload(
        &self,
        owner: &str,
        file_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StoreError>;
}
