use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::store::models::{
    CandidateRow, InterviewProgress, InterviewRow, InterviewStatus, JobRow, NewJob, NewStudent,
    StudentRow,
};
use crate::store::{InterviewRepository, StoreError};

const CANDIDATE_SELECT: &str = r#"
    SELECT i.id AS interview_id,
           i.job_id,
           j.title AS job_title,
           s.id AS student_id,
           s.name,
           s.email,
           s.phone,
           s.resume_url,
           COALESCE(i.final_score, 0)::float8 AS final_score,
           COALESCE(i.summary, '') AS summary,
           i.status,
           i.answers,
           i.scores,
           i.completed_at
    FROM interviews i
    JOIN students s ON s.id = i.student_id
    JOIN jobs j ON j.id = i.job_id
"#;

/// Postgres-backed repository over the `students`, `jobs` and `interviews` tables.
#[derive(Clone)]
pub struct PgInterviewRepository {
    pool: PgPool,
}

impl PgInterviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewRepository for PgInterviewRepository {
    async fn find_student_by_email(&self, email: &str) -> Result<Option<StudentRow>, StoreError> {
        Ok(sqlx::query_as::<_, StudentRow>(
            "SELECT id, name, email, phone, resume_url FROM students WHERE email = $1 LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_student(&self, student: &NewStudent) -> Result<StudentRow, StoreError> {
        let row = sqlx::query_as::<_, StudentRow>(
            r#"
            INSERT INTO students (name, email, phone, resume_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, resume_url
            "#,
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.resume_url)
        .fetch_one(&self.pool)
        .await?;

        info!("Created student {} ({})", row.id, row.email);
        Ok(row)
    }

    async fn list_jobs(&self) -> Result<Vec<JobRow>, StoreError> {
        Ok(sqlx::query_as::<_, JobRow>(
            "SELECT id, title, description, custom_questions, created_at FROM jobs ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobRow>, StoreError> {
        Ok(sqlx::query_as::<_, JobRow>(
            "SELECT id, title, description, custom_questions, created_at FROM jobs WHERE id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_job(&self, job: &NewJob) -> Result<JobRow, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (title, description, custom_questions)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, custom_questions, created_at
            "#,
        )
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.custom_questions)
        .fetch_one(&self.pool)
        .await?;

        info!("Created job {} '{}'", row.id, row.title);
        Ok(row)
    }

    async fn save_interview_progress(
        &self,
        progress: &InterviewProgress,
    ) -> Result<InterviewRow, StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM interviews WHERE job_id = $1 AND student_id = $2 LIMIT 1",
        )
        .bind(progress.job_id)
        .bind(progress.student_id)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match existing {
            Some(interview_id) => {
                sqlx::query_as::<_, InterviewRow>(
                    r#"
                    UPDATE interviews
                    SET answers = $2,
                        scores = $3,
                        final_score = $4,
                        status = $5,
                        completed_at = $6,
                        summary = COALESCE($7, summary)
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(interview_id)
                .bind(&progress.answers)
                .bind(&progress.scores)
                .bind(progress.final_score)
                .bind(progress.status.as_str())
                .bind(progress.completed_at)
                .bind(&progress.summary)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, InterviewRow>(
                    r#"
                    INSERT INTO interviews
                        (job_id, student_id, answers, scores, final_score, status, completed_at, summary)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    RETURNING *
                    "#,
                )
                .bind(progress.job_id)
                .bind(progress.student_id)
                .bind(&progress.answers)
                .bind(&progress.scores)
                .bind(progress.final_score)
                .bind(progress.status.as_str())
                .bind(progress.completed_at)
                .bind(&progress.summary)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        info!(
            "Saved interview {} (job {}, student {}, status {}, score {:.2})",
            row.id, row.job_id, row.student_id, row.status, progress.final_score
        );
        Ok(row)
    }

    async fn update_interview_status(
        &self,
        interview_id: Uuid,
        status: InterviewStatus,
    ) -> Result<Option<InterviewRow>, StoreError> {
        Ok(sqlx::query_as::<_, InterviewRow>(
            "UPDATE interviews SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(interview_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_candidates(&self, job_id: Option<Uuid>) -> Result<Vec<CandidateRow>, StoreError> {
        let sql = format!(
            "{CANDIDATE_SELECT} WHERE ($1::uuid IS NULL OR i.job_id = $1) ORDER BY final_score DESC"
        );
        Ok(sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_candidate(&self, interview_id: Uuid) -> Result<Option<CandidateRow>, StoreError> {
        let sql = format!("{CANDIDATE_SELECT} WHERE i.id = $1");
        Ok(sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(interview_id)
            .fetch_optional(&self.pool)
            .await?)
    }
}
