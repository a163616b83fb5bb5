//! Candidate-facing pre-interview flow: browsing open jobs, uploading a
//! resume and validating the contact form.

pub mod handlers;
pub mod jobs;
pub mod resume;
