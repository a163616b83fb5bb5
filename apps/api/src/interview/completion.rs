//! Results persistence once an interview has been scored.

use tracing::{info, warn};
use uuid::Uuid;

use crate::interview::machine::SaveStatus;
use crate::interview::models::{CandidateInfo, JobSummary, Question};
use crate::store::models::{InterviewProgress, NewStudent};
use crate::store::{InterviewRepository, StoreError};

/// Ensures the student exists, then upserts the completed interview.
///
/// The job must still exist: a missing job fails the save rather than
/// attaching the answers to anything else.
pub async fn save_results(
    repository: &dyn InterviewRepository,
    job: &JobSummary,
    candidate: &CandidateInfo,
    questions: &[Question],
    summary: &str,
) -> Result<Uuid, StoreError> {
    if repository.get_job(job.id).await?.is_none() {
        return Err(StoreError::NotFound(format!(
            "Job {} ('{}') no longer exists",
            job.id, job.title
        )));
    }

    let student = match repository.find_student_by_email(&candidate.email).await? {
        Some(student) => student,
        None => {
            repository
                .create_student(&NewStudent {
                    name: candidate.name.clone(),
                    email: candidate.email.clone(),
                    phone: candidate.phone.clone(),
                    resume_url: candidate.resume_url.clone(),
                })
                .await?
        }
    };

    let progress = InterviewProgress::from_questions(
        job.id,
        student.id,
        questions,
        true,
        Some(summary.to_string()),
    );
    let row = repository.save_interview_progress(&progress).await?;
    info!("Interview results saved as {}", row.id);
    Ok(row.id)
}

/// `save_results` folded into the status shown on the results view.
pub async fn save_status(
    repository: &dyn InterviewRepository,
    job: &JobSummary,
    candidate: &CandidateInfo,
    questions: &[Question],
    summary: &str,
) -> SaveStatus {
    match save_results(repository, job, candidate, questions, summary).await {
        Ok(interview_id) => SaveStatus::Saved { interview_id },
        Err(e) => {
            warn!("Failed to save interview results: {e}");
            SaveStatus::Failed {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::InterviewStatus;
    use crate::testing::{answered_questions, sample_candidate, InMemoryRepository};

    #[tokio::test]
    async fn test_creates_student_and_upserts_interview() {
        let repository = InMemoryRepository::default();
        let job = repository.seed_job("Backend Developer", "Rust services");
        let mut questions = answered_questions(&[20, 20]);
        questions[0].score = Some(4.0);
        questions[1].score = Some(8.0);

        let first = save_results(&repository, &job, &sample_candidate(), &questions, "Good")
            .await
            .unwrap();
        let second = save_results(&repository, &job, &sample_candidate(), &questions, "Better")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(repository.students().len(), 1);
        let interviews = repository.interviews();
        assert_eq!(interviews.len(), 1);
        assert_eq!(interviews[0].final_score, Some(6.0));
        assert_eq!(interviews[0].summary.as_deref(), Some("Better"));
        assert_eq!(interviews[0].status, InterviewStatus::Completed.as_str());
    }

    #[tokio::test]
    async fn test_missing_job_is_surfaced() {
        let repository = InMemoryRepository::default();
        let job = JobSummary {
            id: Uuid::new_v4(),
            title: "Ghost".to_string(),
            description: String::new(),
        };

        let status = save_status(
            &repository,
            &job,
            &sample_candidate(),
            &answered_questions(&[20]),
            "Summary",
        )
        .await;

        assert!(matches!(status, SaveStatus::Failed { ref message } if message.contains("no longer exists")));
        assert!(repository.interviews().is_empty());
        assert!(repository.students().is_empty());
    }
}
