use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::interview::models::{JobSummary, Question};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub custom_questions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl JobRow {
    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub student_id: Uuid,
    pub answers: Value,
    pub scores: Value,
    pub final_score: Option<f64>,
    pub summary: Option<String>,
    /// in_progress | completed | shortlisted | rejected
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    InProgress,
    Completed,
    Shortlisted,
    Rejected,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::InProgress => "in_progress",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Shortlisted => "shortlisted",
            InterviewStatus::Rejected => "rejected",
        }
    }

    /// Unknown values read back as `InProgress`.
    pub fn parse(value: &str) -> Self {
        match value {
            "completed" => InterviewStatus::Completed,
            "shortlisted" => InterviewStatus::Shortlisted,
            "rejected" => InterviewStatus::Rejected,
            _ => InterviewStatus::InProgress,
        }
    }
}

/// Interview joined with its student and job, as shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub interview_id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub student_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_url: Option<String>,
    pub final_score: f64,
    pub summary: String,
    pub status: String,
    pub answers: Value,
    pub scores: Value,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CandidateRow {
    pub fn status(&self) -> InterviewStatus {
        InterviewStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub custom_questions: Vec<String>,
}

/// One upsert of interview progress for a (job, student) pair.
#[derive(Debug, Clone)]
pub struct InterviewProgress {
    pub job_id: Uuid,
    pub student_id: Uuid,
    pub answers: Value,
    pub scores: Value,
    pub final_score: f64,
    pub status: InterviewStatus,
    pub summary: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl InterviewProgress {
    pub fn from_questions(
        job_id: Uuid,
        student_id: Uuid,
        questions: &[Question],
        completed: bool,
        summary: Option<String>,
    ) -> Self {
        let answers = questions
            .iter()
            .map(|q| {
                json!({
                    "question": q.question,
                    "answer": q.answer.clone().unwrap_or_default(),
                    "difficulty": q.difficulty,
                    "timeLimit": q.time_limit,
                })
            })
            .collect();

        let scores = questions
            .iter()
            .map(|q| {
                json!({
                    "question": q.question,
                    "score": q.score.unwrap_or(0.0),
                    "reason": q.reason.clone().unwrap_or_default(),
                    "idealAnswer": q.ideal_answer.clone().unwrap_or_default(),
                })
            })
            .collect();

        Self {
            job_id,
            student_id,
            answers: Value::Array(answers),
            scores: Value::Array(scores),
            final_score: crate::interview::models::average_score(questions),
            status: if completed {
                InterviewStatus::Completed
            } else {
                InterviewStatus::InProgress
            },
            summary,
            completed_at: completed.then(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::answered_questions;

    #[test]
    fn test_progress_payload_shape() {
        let mut questions = answered_questions(&[20, 60]);
        questions[0].score = Some(6.0);
        questions[1].score = Some(9.0);

        let progress = InterviewProgress::from_questions(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &questions,
            true,
            Some("Good".to_string()),
        );

        assert_eq!(progress.final_score, 7.5);
        assert_eq!(progress.status, InterviewStatus::Completed);
        assert!(progress.completed_at.is_some());
        assert_eq!(progress.answers[1]["timeLimit"], 60);
        assert_eq!(progress.answers[0]["difficulty"], "easy");
        assert_eq!(progress.scores[1]["score"], 9.0);
    }

    #[test]
    fn test_in_progress_has_no_completion_time() {
        let progress = InterviewProgress::from_questions(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &answered_questions(&[20]),
            false,
            None,
        );
        assert_eq!(progress.status, InterviewStatus::InProgress);
        assert!(progress.completed_at.is_none());
    }

    #[test]
    fn test_status_round_trip_and_unknown() {
        assert_eq!(InterviewStatus::parse("shortlisted"), InterviewStatus::Shortlisted);
        assert_eq!(InterviewStatus::Rejected.as_str(), "rejected");
        assert_eq!(InterviewStatus::parse("archived"), InterviewStatus::InProgress);
    }
}
