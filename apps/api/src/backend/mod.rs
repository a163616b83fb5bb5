/// Backend client: the single point of entry for calls to the external
/// scoring/generation service (question generation, answer evaluation,
/// summaries, notification email and resume parsing).
///
/// One request, one response. There is no retry: callers own the fallback.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

pub mod models;

use crate::backend::models::{
    AnswerEvaluation, BatchResponse, EmailRequest, EmailResponse, EvaluateAnswersRequest,
    EvaluateAnswersResponse, GenerateRequest, GeneratedQuestion, IdealResponse,
    ParseResumeResponse, ParsedResume, QuestionResponse, ResumeFile, SummaryRequest,
    SummaryResponse,
};
use crate::interview::models::Difficulty;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("backend rejected request: {0}")]
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Operations consumed from the scoring/generation backend.
///
/// Carried as `Arc<dyn ScoringBackend>` so flows can run against an
/// in-memory double.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    async fn generate_batch(
        &self,
        job_context: &str,
        job_description: &str,
        difficulties: &[Difficulty],
    ) -> Result<Vec<GeneratedQuestion>, BackendError>;

    async fn generate_question(
        &self,
        difficulty: Difficulty,
        job_context: &str,
    ) -> Result<String, BackendError>;

    async fn generate_ideal(&self, question: &str) -> Result<String, BackendError>;

    async fn evaluate_answers(
        &self,
        request: &EvaluateAnswersRequest,
    ) -> Result<Vec<AnswerEvaluation>, BackendError>;

    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse, BackendError>;

    /// Returns whether the backend reports the email as delivered.
    async fn send_email(&self, request: &EmailRequest) -> Result<bool, BackendError>;

    async fn parse_resume(&self, file: ResumeFile) -> Result<ParsedResume, BackendError>;
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        info!("API Request: POST {path}");
        let response = self.client.post(self.url(path)).json(body).send().await;
        self.decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        path: &str,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, BackendError> {
        let response = response.map_err(|e| {
            error!("API Response Error: {path}: {e}");
            BackendError::Http(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            error!("API Response Error: {} {path}: {message}", status.as_u16());
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        info!("API Response: {} {path}", status.as_u16());
        serde_json::from_str(&body).map_err(BackendError::Parse)
    }
}

#[async_trait]
impl ScoringBackend for BackendClient {
    async fn generate_batch(
        &self,
        job_context: &str,
        job_description: &str,
        difficulties: &[Difficulty],
    ) -> Result<Vec<GeneratedQuestion>, BackendError> {
        let request = GenerateRequest::GenerateBatch {
            job_context,
            job_description,
            difficulties,
        };
        let response: BatchResponse = self.post_json("/generate", &request).await?;
        Ok(response.questions)
    }

    async fn generate_question(
        &self,
        difficulty: Difficulty,
        job_context: &str,
    ) -> Result<String, BackendError> {
        let request = GenerateRequest::GenerateQuestion {
            difficulty,
            job_context,
        };
        let response: QuestionResponse = self.post_json("/generate", &request).await?;
        Ok(response.question)
    }

    async fn generate_ideal(&self, question: &str) -> Result<String, BackendError> {
        let request = GenerateRequest::GenerateIdeal { question };
        let response: IdealResponse = self.post_json("/generate", &request).await?;
        Ok(response.ideal)
    }

    async fn evaluate_answers(
        &self,
        request: &EvaluateAnswersRequest,
    ) -> Result<Vec<AnswerEvaluation>, BackendError> {
        let response: EvaluateAnswersResponse =
            self.post_json("/evaluate-answers", request).await?;
        Ok(response.evaluations)
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse, BackendError> {
        self.post_json("/summary", request).await
    }

    async fn send_email(&self, request: &EmailRequest) -> Result<bool, BackendError> {
        let response: EmailResponse = self.post_json("/send-email", request).await?;
        Ok(response.status == "success")
    }

    async fn parse_resume(&self, file: ResumeFile) -> Result<ParsedResume, BackendError> {
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let form = multipart::Form::new().part("file", part);

        info!("API Request: POST /parse-resume");
        let response = self
            .client
            .post(self.url("/parse-resume"))
            .multipart(form)
            .send()
            .await;
        let parsed: ParseResumeResponse = self.decode("/parse-resume", response).await?;

        if !parsed.success {
            return Err(BackendError::Rejected(
                parsed
                    .error
                    .unwrap_or_else(|| "resume could not be parsed".to_string()),
            ));
        }

        Ok(ParsedResume {
            text: parsed.text.unwrap_or_default(),
            extracted: parsed.extracted_info.unwrap_or_default(),
        })
    }
}
