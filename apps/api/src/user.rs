use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;

/// Header carrying the caller's role. Authentication happens upstream.
pub const ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Interviewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Interviewer => "interviewer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "interviewer" => Some(Role::Interviewer),
            _ => None,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Role::parse)
    }
}

/// Rejects the request with 403 unless it carries `role`.
pub fn require_role(headers: &HeaderMap, role: Role) -> Result<(), AppError> {
    match Role::from_headers(headers) {
        Some(found) if found == role => Ok(()),
        found => {
            debug!(
                "Rejected {:?} caller on a {} route",
                found.map(|r| r.as_str()),
                role.as_str()
            );
            Err(AppError::Forbidden)
        }
    }
}
