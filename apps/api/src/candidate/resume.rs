use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::models::{ExtractedInfo, ResumeFile};
use crate::backend::ScoringBackend;
use crate::interview::models::CandidateInfo;
use crate::store::ResumeStorage;

pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const UNSUPPORTED_TYPE_MESSAGE: &str = "You can only upload PDF or DOCX files!";
pub const TOO_LARGE_MESSAGE: &str = "File must be smaller than 10MB!";
pub const MISSING_FILE_MESSAGE: &str = "Please select a file first!";
pub const PARSE_FAILED_MESSAGE: &str = "Failed to process resume. Please try again.";
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields!";

fn is_supported(content_type: &str, file_name: &str) -> bool {
    match content_type {
        PDF_CONTENT_TYPE | DOCX_CONTENT_TYPE => true,
        // Some browsers send no type for DOCX; fall back to the extension.
        "" | "application/octet-stream" => {
            let name = file_name.to_ascii_lowercase();
            name.ends_with(".pdf") || name.ends_with(".docx")
        }
        _ => false,
    }
}

/// Type and size gate applied before anything is stored.
pub fn validate_resume(file: &ResumeFile) -> Result<(), &'static str> {
    if !is_supported(&file.content_type, &file.file_name) {
        return Err(UNSUPPORTED_TYPE_MESSAGE);
    }
    if file.bytes.len() >= MAX_RESUME_BYTES {
        return Err(TOO_LARGE_MESSAGE);
    }
    Ok(())
}

/// Result of an upload: the stored URL (if storage worked) and whatever the
/// backend could extract to pre-fill the candidate form.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeUpload {
    pub parsed: bool,
    pub resume_url: Option<String>,
    pub text: Option<String>,
    pub extracted: ExtractedInfo,
    pub error: Option<String>,
}

/// Stores the blob, then asks the backend to parse it. Neither failure is an
/// error for the caller: the candidate can still fill the form by hand.
pub async fn process_resume(
    backend: &dyn ScoringBackend,
    storage: &dyn ResumeStorage,
    file: ResumeFile,
) -> ResumeUpload {
    let owner = format!("upload-{}", Uuid::new_v4().simple());
    let resume_url = match storage
        .upload(&owner, &file.file_name, &file.content_type, file.bytes.clone())
        .await
    {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Resume storage failed for '{}': {e}", file.file_name);
            None
        }
    };

    let file_name = file.file_name.clone();
    match backend.parse_resume(file).await {
        Ok(parsed) => {
            info!("Parsed resume '{file_name}'");
            ResumeUpload {
                parsed: true,
                resume_url,
                text: Some(parsed.text),
                extracted: parsed.extracted,
                error: None,
            }
        }
        Err(e) => {
            warn!("Resume parsing failed for '{file_name}': {e}");
            ResumeUpload {
                parsed: false,
                resume_url,
                text: None,
                extracted: ExtractedInfo::default(),
                error: Some(PARSE_FAILED_MESSAGE.to_string()),
            }
        }
    }
}

/// Candidate details as submitted with the interview form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl CandidateForm {
    pub fn validate(self, resume_url: Option<String>) -> Result<CandidateInfo, &'static str> {
        let name = self.name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();
        if name.is_empty() || email.is_empty() || phone.is_empty() {
            return Err(REQUIRED_FIELDS_MESSAGE);
        }
        Ok(CandidateInfo {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            resume_url,
        })
    }
}
