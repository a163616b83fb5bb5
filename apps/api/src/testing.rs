//! In-memory doubles and fixtures shared by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::backend::models::{
    AnswerEvaluation, EmailRequest, EvaluateAnswersRequest, ExtractedInfo, GeneratedQuestion,
    ParsedResume, ResumeFile, SummaryRequest, SummaryResponse,
};
use crate::backend::{BackendError, ScoringBackend};
use crate::interview::machine::{SessionSnapshot, SessionView};
use crate::interview::models::{CandidateInfo, Difficulty, JobSummary, Question};
use crate::interview::questions::DIFFICULTY_LADDER;
use crate::interview::runner::{SessionDeps, SessionHandle};
use crate::narration::voices::VoiceCatalog;
use crate::narration::{NarrationError, Narrator, PlaybackControl, Utterance};
use crate::store::models::{
    CandidateRow, InterviewProgress, InterviewRow, InterviewStatus, JobRow, NewJob, NewStudent,
    StudentRow,
};
use crate::store::{InterviewRepository, ResumeStorage, SnapshotStore, StoreError};

pub fn sample_job() -> JobSummary {
    JobSummary {
        id: Uuid::new_v4(),
        title: "Backend Developer".to_string(),
        description: "Rust services".to_string(),
    }
}

pub fn sample_candidate() -> CandidateInfo {
    CandidateInfo {
        name: "Asha Verma".to_string(),
        email: "asha@example.com".to_string(),
        phone: "+91 98765 43210".to_string(),
        resume_url: None,
    }
}

/// Unanswered questions with the given time limits, difficulties following the ladder.
pub fn sample_questions(limits: &[u32]) -> Vec<Question> {
    limits
        .iter()
        .enumerate()
        .map(|(i, limit)| Question {
            id: format!("q-{}", i + 1),
            question: format!("Explain React component state, part {}", i + 1),
            difficulty: DIFFICULTY_LADDER[i % DIFFICULTY_LADDER.len()],
            time_limit: *limit,
            answer: None,
            score: None,
            ideal_answer: Some(format!("Ideal answer {}", i + 1)),
            reason: None,
        })
        .collect()
}

pub fn answered_questions(limits: &[u32]) -> Vec<Question> {
    let mut questions = sample_questions(limits);
    for (i, q) in questions.iter_mut().enumerate() {
        q.answer = Some(format!(
            "Answer {}: state lives in the component and changes trigger a re-render.",
            i + 1
        ));
    }
    questions
}

// ── backend ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    pub fail_batch: bool,
    pub fail_question: bool,
    pub fail_ideal: bool,
    pub fail_evaluate: bool,
    pub fail_summary: bool,
    pub fail_email: bool,
    pub fail_parse: bool,
    /// Overrides the default of one score-7 evaluation per question.
    pub evaluations: Option<Vec<AnswerEvaluation>>,
}

impl MockBackend {
    pub fn unreachable() -> Self {
        Self {
            fail_batch: true,
            fail_question: true,
            fail_ideal: true,
            fail_evaluate: true,
            fail_summary: true,
            fail_email: true,
            fail_parse: true,
            evaluations: None,
        }
    }
}

fn outage() -> BackendError {
    BackendError::Api {
        status: 503,
        message: "backend unavailable".to_string(),
    }
}

#[async_trait]
impl ScoringBackend for MockBackend {
    async fn generate_batch(
        &self,
        _job_context: &str,
        _job_description: &str,
        difficulties: &[Difficulty],
    ) -> Result<Vec<GeneratedQuestion>, BackendError> {
        if self.fail_batch {
            return Err(outage());
        }
        Ok((1..=difficulties.len())
            .map(|i| GeneratedQuestion {
                question: format!("Batch question {i}"),
                ideal_answer: Some(format!("Ideal answer {i}")),
            })
            .collect())
    }

    async fn generate_question(
        &self,
        difficulty: Difficulty,
        _job_context: &str,
    ) -> Result<String, BackendError> {
        if self.fail_question {
            return Err(outage());
        }
        Ok(format!("Single {} question", difficulty.as_str()))
    }

    async fn generate_ideal(&self, question: &str) -> Result<String, BackendError> {
        if self.fail_ideal {
            return Err(outage());
        }
        Ok(format!("Ideal for {question}"))
    }

    async fn evaluate_answers(
        &self,
        request: &EvaluateAnswersRequest,
    ) -> Result<Vec<AnswerEvaluation>, BackendError> {
        if self.fail_evaluate {
            return Err(outage());
        }
        if let Some(evaluations) = &self.evaluations {
            return Ok(evaluations.clone());
        }
        Ok(request
            .questions
            .iter()
            .map(|q| AnswerEvaluation {
                score: 7.0,
                reason: Some(format!("Reasonable answer to '{}'", q.question)),
            })
            .collect())
    }

    async fn summarize(&self, _request: &SummaryRequest) -> Result<SummaryResponse, BackendError> {
        if self.fail_summary {
            return Err(outage());
        }
        Ok(SummaryResponse {
            final_score: 7.5,
            summary: "Strong candidate.".to_string(),
        })
    }

    async fn send_email(&self, _request: &EmailRequest) -> Result<bool, BackendError> {
        if self.fail_email {
            return Err(outage());
        }
        Ok(true)
    }

    async fn parse_resume(&self, _file: ResumeFile) -> Result<ParsedResume, BackendError> {
        if self.fail_parse {
            return Err(BackendError::Rejected("resume could not be parsed".to_string()));
        }
        Ok(ParsedResume {
            text: "Asha Verma\nasha@example.com\n+91 98765 43210\nRust, Postgres".to_string(),
            extracted: ExtractedInfo {
                name: Some("Asha Verma".to_string()),
                email: Some("asha@example.com".to_string()),
                phone: Some("+91 98765 43210".to_string()),
            },
        })
    }
}

// ── repository ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tables {
    students: Vec<StudentRow>,
    jobs: Vec<JobRow>,
    interviews: Vec<InterviewRow>,
}

#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    pub fn seed_job(&self, title: &str, description: &str) -> JobSummary {
        let row = JobRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            custom_questions: vec![],
            created_at: Utc::now(),
        };
        let summary = row.summary();
        self.tables.lock().unwrap().jobs.push(row);
        summary
    }

    /// Inserts a completed interview for a fresh student and returns its id.
    pub fn seed_candidate(&self, job: &JobSummary, name: &str, email: &str, score: f64) -> Uuid {
        let mut tables = self.tables.lock().unwrap();
        let student = StudentRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
            resume_url: None,
        };
        let interview = InterviewRow {
            id: Uuid::new_v4(),
            job_id: job.id,
            student_id: student.id,
            answers: serde_json::json!([]),
            scores: serde_json::json!([]),
            final_score: Some(score),
            summary: Some(format!("{name} interviewed.")),
            status: InterviewStatus::Completed.as_str().to_string(),
            started_at: Some(Utc::now()),
            completed_at: Some(Utc::now()),
        };
        let id = interview.id;
        tables.students.push(student);
        tables.interviews.push(interview);
        id
    }

    pub fn students(&self) -> Vec<StudentRow> {
        self.tables.lock().unwrap().students.clone()
    }

    pub fn interviews(&self) -> Vec<InterviewRow> {
        self.tables.lock().unwrap().interviews.clone()
    }

    fn candidate_row(tables: &Tables, interview: &InterviewRow) -> Option<CandidateRow> {
        let student = tables.students.iter().find(|s| s.id == interview.student_id)?;
        let job = tables.jobs.iter().find(|j| j.id == interview.job_id)?;
        Some(CandidateRow {
            interview_id: interview.id,
            job_id: job.id,
            job_title: job.title.clone(),
            student_id: student.id,
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            resume_url: student.resume_url.clone(),
            final_score: interview.final_score.unwrap_or(0.0),
            summary: interview.summary.clone().unwrap_or_default(),
            status: interview.status.clone(),
            answers: interview.answers.clone(),
            scores: interview.scores.clone(),
            completed_at: interview.completed_at,
        })
    }
}

#[async_trait]
impl InterviewRepository for InMemoryRepository {
    async fn find_student_by_email(&self, email: &str) -> Result<Option<StudentRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.students.iter().find(|s| s.email == email).cloned())
    }

    async fn create_student(&self, student: &NewStudent) -> Result<StudentRow, StoreError> {
        let row = StudentRow {
            id: Uuid::new_v4(),
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            resume_url: student.resume_url.clone(),
        };
        self.tables.lock().unwrap().students.push(row.clone());
        Ok(row)
    }

    async fn list_jobs(&self) -> Result<Vec<JobRow>, StoreError> {
        let mut jobs = self.tables.lock().unwrap().jobs.clone();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.jobs.iter().find(|j| j.id == job_id).cloned())
    }

    async fn create_job(&self, job: &NewJob) -> Result<JobRow, StoreError> {
        let row = JobRow {
            id: Uuid::new_v4(),
            title: job.title.clone(),
            description: job.description.clone(),
            custom_questions: job.custom_questions.clone(),
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().jobs.push(row.clone());
        Ok(row)
    }

    async fn save_interview_progress(
        &self,
        progress: &InterviewProgress,
    ) -> Result<InterviewRow, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let existing = tables
            .interviews
            .iter()
            .position(|i| i.job_id == progress.job_id && i.student_id == progress.student_id);

        match existing {
            Some(index) => {
                let row = &mut tables.interviews[index];
                row.answers = progress.answers.clone();
                row.scores = progress.scores.clone();
                row.final_score = Some(progress.final_score);
                row.status = progress.status.as_str().to_string();
                row.completed_at = progress.completed_at;
                if let Some(summary) = &progress.summary {
                    row.summary = Some(summary.clone());
                }
                Ok(row.clone())
            }
            None => {
                let row = InterviewRow {
                    id: Uuid::new_v4(),
                    job_id: progress.job_id,
                    student_id: progress.student_id,
                    answers: progress.answers.clone(),
                    scores: progress.scores.clone(),
                    final_score: Some(progress.final_score),
                    summary: progress.summary.clone(),
                    status: progress.status.as_str().to_string(),
                    started_at: Some(Utc::now()),
                    completed_at: progress.completed_at,
                };
                tables.interviews.push(row.clone());
                Ok(row)
            }
        }
    }

    async fn update_interview_status(
        &self,
        interview_id: Uuid,
        status: InterviewStatus,
    ) -> Result<Option<InterviewRow>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .interviews
            .iter_mut()
            .find(|i| i.id == interview_id)
            .map(|row| {
                row.status = status.as_str().to_string();
                row.clone()
            }))
    }

    async fn list_candidates(&self, job_id: Option<Uuid>) -> Result<Vec<CandidateRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<CandidateRow> = tables
            .interviews
            .iter()
            .filter(|i| job_id.map_or(true, |id| i.job_id == id))
            .filter_map(|i| Self::candidate_row(&tables, i))
            .collect();
        rows.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        Ok(rows)
    }

    async fn get_candidate(&self, interview_id: Uuid) -> Result<Option<CandidateRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .interviews
            .iter()
            .find(|i| i.id == interview_id)
            .and_then(|i| Self::candidate_row(&tables, i)))
    }
}

// ── snapshots and resumes ──────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemorySnapshots {
    entries: Arc<Mutex<HashMap<Uuid, SessionSnapshot>>>,
}

#[async_trait]
impl SnapshotStore for InMemorySnapshots {
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(snapshot.session_id, snapshot.clone());
        Ok(())
    }

    async fn load(&self, session_id: Uuid) -> Result<Option<SessionSnapshot>, StoreError> {
        Ok(self.entries.lock().unwrap().get(&session_id).cloned())
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), StoreError> {
        self.entries.lock().unwrap().remove(&session_id);
        Ok(())
    }
}

/// Snapshot store whose writes take `delay` to land.
#[derive(Clone, Default)]
pub struct SlowSnapshots {
    pub inner: InMemorySnapshots,
    pub delay: Duration,
}

#[async_trait]
impl SnapshotStore for SlowSnapshots {
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.save(snapshot).await
    }

    async fn load(&self, session_id: Uuid) -> Result<Option<SessionSnapshot>, StoreError> {
        self.inner.load(session_id).await
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), StoreError> {
        self.inner.clear(session_id).await
    }
}

#[derive(Clone, Default)]
pub struct InMemoryResumes {
    pub fail: bool,
    uploads: Arc<Mutex<Vec<String>>>,
}

impl InMemoryResumes {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResumeStorage for InMemoryResumes {
    async fn upload(
        &self,
        owner: &str,
        file_name: &str,
        _content_type: &str,
        _bytes: Bytes,
    ) -> Result<String, StoreError> {
        if self.fail {
            return Err(StoreError::ObjectStorage("bucket unavailable".to_string()));
        }
        let url = format!(
            "https://resumes.test/{}",
            crate::store::resumes::resume_key(owner, file_name, 0)
        );
        self.uploads.lock().unwrap().push(url.clone());
        Ok(url)
    }
}

// ── narration ──────────────────────────────────────────────────────────────

/// Finishes every utterance immediately.
pub struct InstantNarrator;

#[async_trait]
impl Narrator for InstantNarrator {
    async fn speak(
        &self,
        _utterance: Utterance,
        control: PlaybackControl,
    ) -> Result<(), NarrationError> {
        if control.cancel.is_cancelled() {
            return Err(NarrationError::Interrupted);
        }
        Ok(())
    }
}

pub struct FailingNarrator;

#[async_trait]
impl Narrator for FailingNarrator {
    async fn speak(
        &self,
        _utterance: Utterance,
        _control: PlaybackControl,
    ) -> Result<(), NarrationError> {
        Err(NarrationError::Synthesis("no voices available".to_string()))
    }
}

// ── sessions ───────────────────────────────────────────────────────────────

pub fn test_deps(backend: MockBackend, repository: InMemoryRepository) -> SessionDeps {
    SessionDeps {
        backend: Arc::new(backend),
        narrator: Arc::new(InstantNarrator),
        voices: Arc::new(VoiceCatalog::builtin()),
        snapshots: Arc::new(InMemorySnapshots::default()),
        repository: Arc::new(repository),
        tick: Duration::from_secs(1),
        submit_delay: Duration::from_millis(500),
        idle_timeout: Duration::from_secs(24 * 3600),
    }
}

/// Waits until the session publishes a view matching `predicate`.
pub async fn wait_for<F>(handle: &SessionHandle, predicate: F) -> SessionView
where
    F: Fn(&SessionView) -> bool,
{
    let mut views = handle.subscribe();
    tokio::time::timeout(Duration::from_secs(3600), async {
        loop {
            {
                let view = views.borrow_and_update();
                if predicate(&view) {
                    return view.clone();
                }
            }
            views.changed().await.expect("session ended");
        }
    })
    .await
    .expect("timed out waiting for session view")
}
