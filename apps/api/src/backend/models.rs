//! Wire types for the scoring/generation backend.

use serde::{Deserialize, Serialize};

use crate::interview::models::Difficulty;

/// Body of `POST /generate`, discriminated by `action`.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GenerateRequest<'a> {
    GenerateBatch {
        job_context: &'a str,
        job_description: &'a str,
        difficulties: &'a [Difficulty],
    },
    GenerateQuestion {
        difficulty: Difficulty,
        job_context: &'a str,
    },
    GenerateIdeal {
        question: &'a str,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    #[serde(default)]
    pub ideal_answer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchResponse {
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionResponse {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct IdealResponse {
    pub ideal: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerForEvaluation {
    pub question: String,
    pub ideal_answer: String,
    pub candidate_answer: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluateAnswersRequest {
    pub questions: Vec<AnswerForEvaluation>,
    pub job_title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerEvaluation {
    pub score: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateAnswersResponse {
    pub evaluations: Vec<AnswerEvaluation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredAnswer {
    pub question: String,
    pub candidate_answer: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryCandidate {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryJob {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryRequest {
    pub answers: Vec<ScoredAnswer>,
    pub candidate: SummaryCandidate,
    pub job: SummaryJob,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    pub final_score: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailTemplate {
    Shortlist,
    Reject,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    pub template: EmailTemplate,
    pub candidate_name: String,
    pub job_title: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParseResumeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub extracted_info: Option<ExtractedInfo>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedResume {
    pub text: String,
    pub extracted: ExtractedInfo,
}

/// A file handed to `POST /parse-resume`.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: bytes::Bytes,
}
