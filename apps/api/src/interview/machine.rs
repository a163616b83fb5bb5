//! Interview progression state machine.
//!
//! `NotStarted → Greeting → Narrating(i) → Answering(i) → Submitting(i) →
//! (Narrating(i+1) | Completed)`.
//!
//! `SessionMachine::handle` is synchronous and performs no I/O. Each accepted
//! event yields the `Command`s the session actor must carry out. Timers,
//! narration and the post-submit delay are identified by tickets; an event
//! carrying a ticket that is no longer current is dropped without effect.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::interview::evaluation::InterviewOutcome;
use crate::interview::fallback::TIME_EXPIRED_ANSWER;
use crate::interview::models::{CandidateInfo, InterviewState, JobSummary, Question};
use crate::interview::reducer::{reduce, InterviewAction};
use crate::narration::{greeting_script, question_script, Language, NarrationRate, NarrationScript};
use crate::store::StoreError;

pub type Ticket = u64;

pub const EMPTY_ANSWER_MESSAGE: &str = "Please enter your answer before submitting!";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {event} while {phase}")]
    InvalidTransition {
        phase: &'static str,
        event: &'static str,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Session {0} not found")]
    NotFound(Uuid),

    #[error("Session is closed")]
    Closed,

    #[error("Snapshot store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    Greeting,
    Narrating { index: usize, paused: bool },
    Answering { index: usize },
    Submitting { index: usize },
    Completed,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::NotStarted => "not_started",
            Phase::Greeting => "greeting",
            Phase::Narrating { .. } => "narrating",
            Phase::Answering { .. } => "answering",
            Phase::Submitting { .. } => "submitting",
            Phase::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    Windowed,
    Fullscreen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveStatus {
    Pending,
    Saved { interview_id: Uuid },
    Failed { message: String },
}

/// Input from the candidate's browser.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CandidateEvent {
    ChangeLanguage {
        language: Language,
    },
    BeginInterview {
        #[serde(default)]
        language: Option<Language>,
    },
    PauseNarration,
    ResumeNarration,
    SkipNarration,
    ReplayQuestion,
    SetNarrationSpeed {
        rate: f32,
    },
    UpdateAnswer {
        text: String,
    },
    SubmitAnswer,
}

impl CandidateEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CandidateEvent::ChangeLanguage { .. } => "change language",
            CandidateEvent::BeginInterview { .. } => "begin interview",
            CandidateEvent::PauseNarration => "pause narration",
            CandidateEvent::ResumeNarration => "resume narration",
            CandidateEvent::SkipNarration => "skip narration",
            CandidateEvent::ReplayQuestion => "replay question",
            CandidateEvent::SetNarrationSpeed { .. } => "set narration speed",
            CandidateEvent::UpdateAnswer { .. } => "update answer",
            CandidateEvent::SubmitAnswer => "submit answer",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    Candidate(CandidateEvent),
    /// Session created; questions still to be generated.
    Open,
    QuestionsReady(Vec<Question>),
    /// Candidate chose to continue a persisted interview.
    Resume,
    NarrationFinished { ticket: Ticket },
    NarrationFailed { ticket: Ticket, reason: String },
    TimerTick { ticket: Ticket },
    AdvanceDue { ticket: Ticket },
    EvaluationFinished(InterviewOutcome),
    ResultsSaved(SaveStatus),
}

#[derive(Debug, Clone)]
pub enum Command {
    GenerateQuestions {
        job: JobSummary,
    },
    Narrate {
        ticket: Ticket,
        script: NarrationScript,
    },
    PauseNarration,
    ResumeNarration,
    StopNarration,
    StartTimer {
        ticket: Ticket,
    },
    StopTimer,
    ScheduleAdvance {
        ticket: Ticket,
        after: Duration,
    },
    Present(Presentation),
    Evaluate {
        job_title: String,
        candidate: CandidateInfo,
        questions: Vec<Question>,
    },
    SaveResults {
        job: JobSummary,
        candidate: CandidateInfo,
        questions: Vec<Question>,
        summary: String,
    },
    PersistSnapshot(SessionSnapshot),
}

/// Everything needed to rebuild a session after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub job: JobSummary,
    pub state: InterviewState,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub narration_rate: NarrationRate,
    #[serde(default)]
    pub draft_answer: String,
    #[serde(default)]
    pub save_status: Option<SaveStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NarrationView {
    pub text: String,
    pub language: &'static str,
    pub rate: f32,
    pub paused: bool,
}

/// What the browser renders.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: Phase,
    pub job: JobSummary,
    pub interview: InterviewState,
    pub draft_answer: String,
    pub language: Language,
    pub narration_rate: NarrationRate,
    pub narration: Option<NarrationView>,
    pub presentation: Presentation,
    pub answer_enabled: bool,
    pub save_status: Option<SaveStatus>,
}

#[derive(Debug, Clone)]
struct ActiveNarration {
    ticket: Ticket,
    script: NarrationScript,
}

/// Resume details captured with the candidate form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeAttachment {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

pub struct SessionMachine {
    id: Uuid,
    job: JobSummary,
    state: InterviewState,
    phase: Phase,
    language: Language,
    rate: NarrationRate,
    draft: String,
    presentation: Presentation,
    narration: Option<ActiveNarration>,
    timer_ticket: Option<Ticket>,
    advance_ticket: Option<Ticket>,
    next_ticket: Ticket,
    generating: bool,
    save_status: Option<SaveStatus>,
    submit_delay: Duration,
}

impl SessionMachine {
    pub fn new(
        id: Uuid,
        job: JobSummary,
        candidate: CandidateInfo,
        resume: Option<ResumeAttachment>,
        submit_delay: Duration,
    ) -> Self {
        let mut state = InterviewState::default();
        reduce(&mut state, InterviewAction::SetCandidateInfo(candidate));
        if let Some(resume) = resume {
            reduce(
                &mut state,
                InterviewAction::SetResumeUploaded {
                    uploaded: resume.url.is_some() || resume.text.is_some(),
                    text: resume.text,
                    url: resume.url,
                },
            );
        }
        Self::with_state(id, job, state, submit_delay)
    }

    /// Rebuilds a session from a snapshot. Nothing is running afterwards: an
    /// in-progress interview waits in `NotStarted` for `Event::Resume`.
    pub fn restore(snapshot: SessionSnapshot, submit_delay: Duration) -> Self {
        let mut state = snapshot.state;
        reduce(&mut state, InterviewAction::SetTimerActive(false));

        let mut machine = Self::with_state(snapshot.session_id, snapshot.job, state, submit_delay);
        machine.language = snapshot.language;
        machine.rate = snapshot.narration_rate;
        machine.draft = snapshot.draft_answer;
        machine.save_status = snapshot.save_status;
        if machine.state.is_interview_completed {
            machine.phase = Phase::Completed;
        }
        machine
    }

    fn with_state(id: Uuid, job: JobSummary, state: InterviewState, submit_delay: Duration) -> Self {
        Self {
            id,
            job,
            state,
            phase: Phase::NotStarted,
            language: Language::default(),
            rate: NarrationRate::default(),
            draft: String::new(),
            presentation: Presentation::Windowed,
            narration: None,
            timer_ticket: None,
            advance_ticket: None,
            next_ticket: 1,
            generating: false,
            save_status: None,
            submit_delay,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &InterviewState {
        &self.state
    }

    /// Completed with a final save outcome. Nothing further can happen.
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Completed
            && matches!(
                self.save_status,
                Some(SaveStatus::Saved { .. } | SaveStatus::Failed { .. })
            )
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            job: self.job.clone(),
            state: self.state.clone(),
            language: self.language,
            narration_rate: self.rate,
            draft_answer: self.draft.clone(),
            save_status: self.save_status.clone(),
        }
    }

    pub fn view(&self) -> SessionView {
        let narration = self.narration.as_ref().map(|n| NarrationView {
            text: n.script.text.clone(),
            language: n.script.language.tag(),
            rate: n.script.rate.value(),
            paused: matches!(self.phase, Phase::Narrating { paused: true, .. }),
        });

        SessionView {
            session_id: self.id,
            phase: self.phase,
            job: self.job.clone(),
            interview: self.state.clone(),
            draft_answer: self.draft.clone(),
            language: self.language,
            narration_rate: self.rate,
            narration,
            presentation: self.presentation,
            answer_enabled: matches!(self.phase, Phase::Answering { .. }),
            save_status: self.save_status.clone(),
        }
    }

    pub fn handle(&mut self, event: Event) -> Result<Vec<Command>, SessionError> {
        let before = self.snapshot();
        let mut commands = self.transition(event)?;
        let after = self.snapshot();
        if after != before {
            commands.push(Command::PersistSnapshot(after));
        }
        Ok(commands)
    }

    fn transition(&mut self, event: Event) -> Result<Vec<Command>, SessionError> {
        match event {
            Event::Candidate(event) => self.on_candidate(event),
            Event::Open => self.open(),
            Event::QuestionsReady(questions) => Ok(self.questions_ready(questions)),
            Event::Resume => self.resume(),
            Event::NarrationFinished { ticket } => Ok(self.narration_ended(ticket)),
            Event::NarrationFailed { ticket, reason } => {
                if self.is_current_narration(ticket) {
                    warn!("Narration failed, starting timer anyway: {reason}");
                }
                Ok(self.narration_ended(ticket))
            }
            Event::TimerTick { ticket } => Ok(self.tick(ticket)),
            Event::AdvanceDue { ticket } => Ok(self.advance(ticket)),
            Event::EvaluationFinished(outcome) => Ok(self.evaluation_finished(outcome)),
            Event::ResultsSaved(status) => {
                if self.phase == Phase::Completed {
                    self.save_status = Some(status);
                }
                Ok(vec![])
            }
        }
    }

    fn invalid(&self, event: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            phase: self.phase.name(),
            event,
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    fn is_current_narration(&self, ticket: Ticket) -> bool {
        self.narration.as_ref().map(|n| n.ticket) == Some(ticket)
    }

    // ── candidate input ────────────────────────────────────────────────────

    fn on_candidate(&mut self, event: CandidateEvent) -> Result<Vec<Command>, SessionError> {
        let name = event.name();
        match (event, self.phase) {
            (CandidateEvent::SetNarrationSpeed { rate }, _) => {
                self.rate = NarrationRate::new(rate);
                Ok(vec![])
            }
            (CandidateEvent::ChangeLanguage { language }, Phase::Greeting) => {
                self.language = language;
                Ok(self.narrate_greeting())
            }
            (CandidateEvent::ChangeLanguage { language }, Phase::NotStarted) => {
                self.language = language;
                Ok(vec![])
            }
            (CandidateEvent::BeginInterview { language }, Phase::Greeting) => {
                if let Some(language) = language {
                    self.language = language;
                }
                let mut commands = self.stop_narration();
                commands.extend(self.present(Presentation::Fullscreen));
                commands.extend(self.enter_narrating(0));
                Ok(commands)
            }
            (CandidateEvent::PauseNarration, Phase::Narrating { index, paused }) => {
                if paused {
                    return Ok(vec![]);
                }
                self.phase = Phase::Narrating {
                    index,
                    paused: true,
                };
                Ok(vec![Command::PauseNarration])
            }
            (CandidateEvent::ResumeNarration, Phase::Narrating { index, paused }) => {
                if !paused {
                    return Ok(vec![]);
                }
                self.phase = Phase::Narrating {
                    index,
                    paused: false,
                };
                Ok(vec![Command::ResumeNarration])
            }
            (CandidateEvent::SkipNarration, Phase::Narrating { index, .. }) => {
                let mut commands = self.stop_narration();
                commands.extend(self.start_answering(index));
                Ok(commands)
            }
            // Already skipped.
            (CandidateEvent::SkipNarration, Phase::Answering { .. }) => Ok(vec![]),
            (CandidateEvent::ReplayQuestion, Phase::Answering { index }) => {
                Ok(self.enter_narrating(index))
            }
            (CandidateEvent::UpdateAnswer { text }, Phase::Answering { .. }) => {
                self.draft = text;
                Ok(vec![])
            }
            (CandidateEvent::SubmitAnswer, Phase::Answering { index }) => {
                if self.draft.trim().is_empty() {
                    return Err(SessionError::Validation(EMPTY_ANSWER_MESSAGE.to_string()));
                }
                let answer = self.draft.clone();
                Ok(self.submit(index, answer))
            }
            _ => Err(self.invalid(name)),
        }
    }

    // ── lifecycle ──────────────────────────────────────────────────────────

    fn open(&mut self) -> Result<Vec<Command>, SessionError> {
        if self.phase != Phase::NotStarted || !self.state.questions.is_empty() || self.generating {
            return Err(self.invalid("open"));
        }
        self.generating = true;
        Ok(vec![Command::GenerateQuestions {
            job: self.job.clone(),
        }])
    }

    fn questions_ready(&mut self, questions: Vec<Question>) -> Vec<Command> {
        if self.phase != Phase::NotStarted || !self.generating || questions.is_empty() {
            debug!("Ignoring question set for session {}", self.id);
            return vec![];
        }
        self.generating = false;
        reduce(&mut self.state, InterviewAction::SetQuestions(questions));
        reduce(&mut self.state, InterviewAction::StartInterview);
        self.phase = Phase::Greeting;
        self.narrate_greeting()
    }

    fn resume(&mut self) -> Result<Vec<Command>, SessionError> {
        if self.phase == Phase::Completed {
            if self.state.final_score.is_none() {
                return Ok(vec![self.evaluate_command()]);
            }
            return Ok(vec![]);
        }
        if !self.state.is_in_progress() {
            return Err(self.invalid("resume"));
        }

        self.advance_ticket = None;
        let index = self.state.current_question_index;
        let mut commands = self.stop_narration();
        commands.extend(self.present(Presentation::Fullscreen));
        commands.extend(self.enter_narrating(index));
        Ok(commands)
    }

    // ── narration ──────────────────────────────────────────────────────────

    fn narrate_greeting(&mut self) -> Vec<Command> {
        let name = self
            .state
            .candidate_info
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let script = greeting_script(
            &name,
            &self.job.title,
            self.state.questions.len(),
            self.language,
        );
        self.start_narration(script)
    }

    fn start_narration(&mut self, script: NarrationScript) -> Vec<Command> {
        let mut commands = self.stop_narration();
        let ticket = self.issue_ticket();
        self.narration = Some(ActiveNarration {
            ticket,
            script: script.clone(),
        });
        commands.push(Command::Narrate { ticket, script });
        commands
    }

    fn stop_narration(&mut self) -> Vec<Command> {
        match self.narration.take() {
            Some(_) => vec![Command::StopNarration],
            None => vec![],
        }
    }

    fn narration_ended(&mut self, ticket: Ticket) -> Vec<Command> {
        if !self.is_current_narration(ticket) {
            debug!("Dropping stale narration ticket {ticket}");
            return vec![];
        }
        self.narration = None;
        match self.phase {
            Phase::Narrating { index, .. } => self.start_answering(index),
            _ => vec![],
        }
    }

    fn enter_narrating(&mut self, index: usize) -> Vec<Command> {
        let mut commands = self.stop_timer();
        reduce(&mut self.state, InterviewAction::SetTimerActive(false));

        let total = self.state.questions.len();
        let Some(question) = self.state.questions.get(index) else {
            commands.extend(self.enter_completed());
            return commands;
        };
        let script = question_script(
            &question.question,
            index + 1,
            total,
            self.language,
            self.rate,
        );

        self.phase = Phase::Narrating {
            index,
            paused: false,
        };
        commands.extend(self.start_narration(script));
        commands
    }

    // ── timer and submission ───────────────────────────────────────────────

    fn start_answering(&mut self, index: usize) -> Vec<Command> {
        self.phase = Phase::Answering { index };
        if self.state.time_remaining == 0 {
            return self.auto_submit(index);
        }
        reduce(&mut self.state, InterviewAction::SetTimerActive(true));
        let mut commands = self.stop_timer();
        let ticket = self.issue_ticket();
        self.timer_ticket = Some(ticket);
        commands.push(Command::StartTimer { ticket });
        commands
    }

    fn stop_timer(&mut self) -> Vec<Command> {
        match self.timer_ticket.take() {
            Some(_) => vec![Command::StopTimer],
            None => vec![],
        }
    }

    fn tick(&mut self, ticket: Ticket) -> Vec<Command> {
        let Phase::Answering { index } = self.phase else {
            return vec![];
        };
        if self.timer_ticket != Some(ticket) {
            debug!("Dropping stale timer ticket {ticket}");
            return vec![];
        }

        let remaining = self.state.time_remaining.saturating_sub(1);
        reduce(&mut self.state, InterviewAction::UpdateTimer(remaining));
        if remaining > 0 {
            return vec![];
        }
        self.auto_submit(index)
    }

    fn auto_submit(&mut self, index: usize) -> Vec<Command> {
        let answer = if self.draft.trim().is_empty() {
            TIME_EXPIRED_ANSWER.to_string()
        } else {
            self.draft.clone()
        };
        self.submit(index, answer)
    }

    fn submit(&mut self, index: usize, answer: String) -> Vec<Command> {
        let mut commands = self.stop_timer();
        commands.extend(self.stop_narration());
        reduce(
            &mut self.state,
            InterviewAction::SubmitAnswer {
                question_index: index,
                answer,
            },
        );
        reduce(&mut self.state, InterviewAction::SetTimerActive(false));
        self.phase = Phase::Submitting { index };

        let ticket = self.issue_ticket();
        self.advance_ticket = Some(ticket);
        commands.push(Command::ScheduleAdvance {
            ticket,
            after: self.submit_delay,
        });
        commands
    }

    fn advance(&mut self, ticket: Ticket) -> Vec<Command> {
        if !matches!(self.phase, Phase::Submitting { .. }) || self.advance_ticket != Some(ticket) {
            debug!("Dropping stale advance ticket {ticket}");
            return vec![];
        }
        self.advance_ticket = None;
        self.draft.clear();
        reduce(&mut self.state, InterviewAction::NextQuestion);

        if self.state.is_interview_completed {
            self.enter_completed()
        } else {
            self.enter_narrating(self.state.current_question_index)
        }
    }

    // ── completion ─────────────────────────────────────────────────────────

    fn present(&mut self, presentation: Presentation) -> Vec<Command> {
        if self.presentation == presentation {
            return vec![];
        }
        self.presentation = presentation;
        vec![Command::Present(presentation)]
    }

    fn enter_completed(&mut self) -> Vec<Command> {
        let mut commands = self.stop_timer();
        commands.extend(self.stop_narration());
        self.phase = Phase::Completed;
        commands.extend(self.present(Presentation::Windowed));
        commands.push(self.evaluate_command());
        commands
    }

    fn evaluate_command(&self) -> Command {
        Command::Evaluate {
            job_title: self.job.title.clone(),
            candidate: self.state.candidate_info.clone().unwrap_or_default(),
            questions: self.state.questions.clone(),
        }
    }

    fn evaluation_finished(&mut self, outcome: InterviewOutcome) -> Vec<Command> {
        if self.phase != Phase::Completed || self.state.final_score.is_some() {
            debug!("Ignoring evaluation result for session {}", self.id);
            return vec![];
        }
        reduce(
            &mut self.state,
            InterviewAction::ApplyEvaluations(outcome.evaluations),
        );
        reduce(
            &mut self.state,
            InterviewAction::CompleteInterview {
                final_score: outcome.final_score,
                summary: outcome.summary.clone(),
            },
        );
        self.save_status = Some(SaveStatus::Pending);

        vec![Command::SaveResults {
            job: self.job.clone(),
            candidate: self.state.candidate_info.clone().unwrap_or_default(),
            questions: self.state.questions.clone(),
            summary: outcome.summary,
        }]
    }
}
