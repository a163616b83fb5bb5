//! Interviewer dashboard: candidate listing, aggregate stats and the
//! shortlist/reject decision.

pub mod handlers;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::models::{EmailRequest, EmailTemplate};
use crate::backend::ScoringBackend;
use crate::store::models::{CandidateRow, InterviewStatus, JobRow};
use crate::store::{InterviewRepository, StoreError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateFilter {
    #[serde(default)]
    pub job_id: Option<Uuid>,
    /// `all` or absent disables the filter.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Applies status and free-text filters, then orders by final score, highest first.
pub fn filter_candidates(rows: Vec<CandidateRow>, filter: &CandidateFilter) -> Vec<CandidateRow> {
    let needle = filter
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let status = filter
        .status
        .as_deref()
        .filter(|s| !s.is_empty() && *s != "all");

    let mut rows: Vec<CandidateRow> = rows
        .into_iter()
        .filter(|row| filter.job_id.map_or(true, |id| row.job_id == id))
        .filter(|row| status.map_or(true, |s| row.status == s))
        .filter(|row| match &needle {
            Some(needle) => {
                row.name.to_lowercase().contains(needle)
                    || row.email.to_lowercase().contains(needle)
                    || row.job_title.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect();

    rows.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    rows
}

/// A posting as the interviewer sees it.
#[derive(Debug, Clone, Serialize)]
pub struct JobOverview {
    #[serde(flatten)]
    pub job: JobRow,
    pub candidate_count: usize,
}

pub fn job_overview(jobs: Vec<JobRow>, candidates: &[CandidateRow]) -> Vec<JobOverview> {
    jobs.into_iter()
        .map(|job| {
            let candidate_count = candidates.iter().filter(|c| c.job_id == job.id).count();
            JobOverview {
                job,
                candidate_count,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_jobs: usize,
    pub total_candidates: usize,
    /// Finished interviews, whatever the decision on them.
    pub completed: usize,
    pub shortlisted: usize,
    pub average_score: f64,
}

pub fn compute_stats(total_jobs: usize, candidates: &[CandidateRow]) -> DashboardStats {
    let average_score = if candidates.is_empty() {
        0.0
    } else {
        let total: f64 = candidates.iter().map(|c| c.final_score).sum();
        (total / candidates.len() as f64 * 10.0).round() / 10.0
    };

    DashboardStats {
        total_jobs,
        total_candidates: candidates.len(),
        completed: candidates
            .iter()
            .filter(|c| c.status() != InterviewStatus::InProgress)
            .count(),
        shortlisted: candidates
            .iter()
            .filter(|c| c.status() == InterviewStatus::Shortlisted)
            .count(),
        average_score,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Shortlist,
    Reject,
}

impl Decision {
    pub fn status(&self) -> InterviewStatus {
        match self {
            Decision::Shortlist => InterviewStatus::Shortlisted,
            Decision::Reject => InterviewStatus::Rejected,
        }
    }

    pub fn template(&self) -> EmailTemplate {
        match self {
            Decision::Shortlist => EmailTemplate::Shortlist,
            Decision::Reject => EmailTemplate::Reject,
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            Decision::Shortlist => "Congratulations! You have been shortlisted",
            Decision::Reject => "Interview Results Update",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    pub interview_id: Uuid,
    pub status: InterviewStatus,
    pub email_sent: bool,
}

/// Records the decision, then notifies the candidate. The status change
/// stands even when the email cannot be sent.
pub async fn apply_decision(
    repository: &dyn InterviewRepository,
    backend: &dyn ScoringBackend,
    interview_id: Uuid,
    decision: Decision,
) -> Result<DecisionOutcome, StoreError> {
    let candidate = repository
        .get_candidate(interview_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Interview {interview_id} not found")))?;

    let status = decision.status();
    repository
        .update_interview_status(interview_id, status)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Interview {interview_id} not found")))?;
    info!("Interview {interview_id} marked {}", status.as_str());

    let email = EmailRequest {
        to: candidate.email.clone(),
        subject: decision.subject().to_string(),
        template: decision.template(),
        candidate_name: candidate.name.clone(),
        job_title: candidate.job_title.clone(),
    };
    let email_sent = match backend.send_email(&email).await {
        Ok(sent) => sent,
        Err(e) => {
            warn!("Failed to send {} email to {}: {e}", status.as_str(), candidate.email);
            false
        }
    };

    Ok(DecisionOutcome {
        interview_id,
        status,
        email_sent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryRepository, MockBackend};

    fn seeded() -> (InMemoryRepository, Uuid, Uuid) {
        let repository = InMemoryRepository::default();
        let backend_job = repository.seed_job("Backend Developer", "Rust");
        let data_job = repository.seed_job("Data Analyst", "SQL");
        repository.seed_candidate(&backend_job, "Asha Verma", "asha@example.com", 6.2);
        let ravi = repository.seed_candidate(&backend_job, "Ravi Kumar", "ravi@example.com", 8.4);
        repository.seed_candidate(&data_job, "Meera Iyer", "meera@example.com", 7.1);
        (repository, backend_job.id, ravi)
    }

    #[tokio::test]
    async fn test_job_overview_counts_candidates_per_job() {
        let (repository, backend_job, _) = seeded();
        repository.seed_job("Designer", "Figma");
        let jobs = repository.list_jobs().await.unwrap();
        let candidates = repository.list_candidates(None).await.unwrap();

        let overview = job_overview(jobs, &candidates);

        assert_eq!(overview.len(), 3);
        let count = |title: &str| {
            overview
                .iter()
                .find(|o| o.job.title == title)
                .map(|o| o.candidate_count)
        };
        assert_eq!(count("Backend Developer"), Some(2));
        assert_eq!(count("Data Analyst"), Some(1));
        assert_eq!(count("Designer"), Some(0));
        assert!(overview.iter().any(|o| o.job.id == backend_job));
    }

    #[tokio::test]
    async fn test_filter_by_job_and_search_sorted_by_score() {
        let (repository, backend_job, _) = seeded();
        let rows = repository.list_candidates(None).await.unwrap();

        let filter = CandidateFilter {
            job_id: Some(backend_job),
            ..Default::default()
        };
        let names: Vec<String> = filter_candidates(rows.clone(), &filter)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Ravi Kumar", "Asha Verma"]);

        let filter = CandidateFilter {
            search: Some("ANALYST".to_string()),
            status: Some("all".to_string()),
            ..Default::default()
        };
        let names: Vec<String> = filter_candidates(rows, &filter)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Meera Iyer"]);
    }

    #[tokio::test]
    async fn test_shortlist_updates_status_and_reports_email() {
        let (repository, _, ravi) = seeded();

        let outcome = apply_decision(&repository, &MockBackend::default(), ravi, Decision::Shortlist)
            .await
            .unwrap();
        assert!(outcome.email_sent);
        assert_eq!(outcome.status, InterviewStatus::Shortlisted);

        let rows = repository.list_candidates(None).await.unwrap();
        let stats = compute_stats(2, &rows);
        assert_eq!(stats.total_candidates, 3);
        assert_eq!(stats.shortlisted, 1);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.average_score, 7.2);

        let filter = CandidateFilter {
            status: Some("shortlisted".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_candidates(rows, &filter).len(), 1);
    }

    #[tokio::test]
    async fn test_email_failure_keeps_decision() {
        let (repository, _, ravi) = seeded();

        let outcome = apply_decision(&repository, &MockBackend::unreachable(), ravi, Decision::Reject)
            .await
            .unwrap();
        assert!(!outcome.email_sent);

        let row = repository.get_candidate(ravi).await.unwrap().unwrap();
        assert_eq!(row.status(), InterviewStatus::Rejected);
    }

    #[tokio::test]
    async fn test_unknown_interview_is_not_found() {
        let (repository, _, _) = seeded();
        let result = apply_decision(
            &repository,
            &MockBackend::default(),
            Uuid::new_v4(),
            Decision::Shortlist,
        )
        .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_empty_stats() {
        let stats = compute_stats(0, &[]);
        assert_eq!(stats.average_score, 0.0);
        assert_eq!(stats.total_candidates, 0);
    }
}
