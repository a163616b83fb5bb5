//! The session actor: sole owner of one `SessionMachine`.
//!
//! HTTP handlers and effect tasks both talk to it through its inbox. The
//! actor applies events one at a time, executes the resulting commands and
//! publishes the new view on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backend::ScoringBackend;
use crate::interview::completion::save_status;
use crate::interview::evaluation::{finalize, InterviewOutcome};
use crate::interview::machine::{Command, Event, SessionError, SessionMachine, SessionView};
use crate::interview::questions::generate_interview_questions;
use crate::narration::voices::VoiceCatalog;
use crate::narration::{playback_channel, NarrationError, Narrator, PlaybackHandle, Utterance};
use crate::store::{InterviewRepository, SnapshotStore};

const INBOX_CAPACITY: usize = 64;

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct SessionDeps {
    pub backend: Arc<dyn ScoringBackend>,
    pub narrator: Arc<dyn Narrator>,
    pub voices: Arc<VoiceCatalog>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub repository: Arc<dyn InterviewRepository>,
    /// Countdown period, one second in production.
    pub tick: Duration,
    pub submit_delay: Duration,
    /// An actor with no candidate input for this long shuts down. Its
    /// snapshot stays, so the session can still be restored.
    pub idle_timeout: Duration,
}

struct Envelope {
    event: Event,
    reply: Option<oneshot::Sender<Result<SessionView, SessionError>>>,
}

impl Envelope {
    fn effect(event: Event) -> Self {
        Self { event, reply: None }
    }
}

#[derive(Clone)]
pub struct SessionHandle {
    id: Uuid,
    inbox: mpsc::Sender<Envelope>,
    view: watch::Receiver<SessionView>,
    shutdown: CancellationToken,
    stopped: CancellationToken,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn dispatch(&self, event: Event) -> Result<SessionView, SessionError> {
        let (reply, response) = oneshot::channel();
        self.inbox
            .send(Envelope {
                event,
                reply: Some(reply),
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)?
    }

    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    /// Cancels the actor together with its timer, narration and pending delays.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    /// Closes the session and waits until the actor has finished its last
    /// event. No snapshot write can land after this returns.
    pub async fn stop(&self) {
        self.close();
        self.stopped.cancelled().await;
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled() || self.inbox.is_closed()
    }
}

pub fn spawn_session(machine: SessionMachine, deps: SessionDeps) -> SessionHandle {
    let id = machine.id();
    let (inbox, receiver) = mpsc::channel(INBOX_CAPACITY);
    let (view_tx, view_rx) = watch::channel(machine.view());
    let shutdown = CancellationToken::new();
    let stopped = CancellationToken::new();

    let actor = SessionActor {
        machine,
        deps,
        inbox: inbox.clone(),
        view: view_tx,
        shutdown: shutdown.clone(),
        narration: None,
        timer: None,
    };
    let done = stopped.clone();
    tokio::spawn(async move {
        actor.run(receiver).await;
        done.cancel();
    });

    SessionHandle {
        id,
        inbox,
        view: view_rx,
        shutdown,
        stopped,
    }
}

struct SessionActor {
    machine: SessionMachine,
    deps: SessionDeps,
    inbox: mpsc::Sender<Envelope>,
    view: watch::Sender<SessionView>,
    shutdown: CancellationToken,
    narration: Option<PlaybackHandle>,
    timer: Option<CancellationToken>,
}

impl SessionActor {
    async fn run(mut self, mut receiver: mpsc::Receiver<Envelope>) {
        let id = self.machine.id();
        debug!("Session {id} started");
        let idle = tokio::time::sleep(self.deps.idle_timeout);
        tokio::pin!(idle);
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = &mut idle => {
                    info!("Session {id} idle, closing");
                    break;
                }
                envelope = receiver.recv() => match envelope {
                    Some(envelope) => {
                        if matches!(envelope.event, Event::Candidate(_)) {
                            idle.as_mut().reset(Instant::now() + self.deps.idle_timeout);
                        }
                        self.process(envelope).await;
                        if self.machine.is_finished() {
                            info!("Session {id} finished, closing");
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        self.teardown();
        debug!("Session {id} stopped");
    }

    async fn process(&mut self, envelope: Envelope) {
        let outcome = match self.machine.handle(envelope.event) {
            Ok(commands) => {
                for command in commands {
                    self.execute(command).await;
                }
                let view = self.machine.view();
                self.view.send_replace(view.clone());
                Ok(view)
            }
            Err(e) => {
                debug!("Session {} rejected event: {e}", self.machine.id());
                Err(e)
            }
        };

        if let Some(reply) = envelope.reply {
            let _ = reply.send(outcome);
        }
    }

    fn teardown(&mut self) {
        self.stop_narration();
        self.stop_timer();
        self.shutdown.cancel();
    }

    fn stop_narration(&mut self) {
        if let Some(handle) = self.narration.take() {
            handle.stop();
        }
    }

    fn stop_timer(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }

    async fn execute(&mut self, command: Command) {
        match command {
            Command::GenerateQuestions { job } => {
                let backend = self.deps.backend.clone();
                let inbox = self.inbox.clone();
                tokio::spawn(async move {
                    let questions = generate_interview_questions(backend.as_ref(), &job).await;
                    let _ = inbox
                        .send(Envelope::effect(Event::QuestionsReady(questions)))
                        .await;
                });
            }
            Command::Narrate { ticket, script } => {
                self.stop_narration();
                let utterance = Utterance::prepare(&script, &self.deps.voices);
                let (handle, control) = playback_channel();
                self.narration = Some(handle);

                let narrator = self.deps.narrator.clone();
                let inbox = self.inbox.clone();
                tokio::spawn(async move {
                    let event = match narrator.speak(utterance, control).await {
                        Ok(()) => Event::NarrationFinished { ticket },
                        // Stopped by the session itself; the ticket is already stale.
                        Err(NarrationError::Interrupted) => return,
                        Err(e) => Event::NarrationFailed {
                            ticket,
                            reason: e.to_string(),
                        },
                    };
                    let _ = inbox.send(Envelope::effect(event)).await;
                });
            }
            Command::PauseNarration => {
                if let Some(handle) = &self.narration {
                    handle.pause();
                }
            }
            Command::ResumeNarration => {
                if let Some(handle) = &self.narration {
                    handle.resume();
                }
            }
            Command::StopNarration => self.stop_narration(),
            Command::StartTimer { ticket } => {
                self.stop_timer();
                let token = self.shutdown.child_token();
                self.timer = Some(token.clone());

                let period = self.deps.tick;
                let inbox = self.inbox.clone();
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                    loop {
                        tokio::select! {
                            _ = token.cancelled() => break,
                            _ = interval.tick() => {
                                let tick = Envelope::effect(Event::TimerTick { ticket });
                                if inbox.send(tick).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                });
            }
            Command::StopTimer => self.stop_timer(),
            Command::ScheduleAdvance { ticket, after } => {
                let token = self.shutdown.child_token();
                let inbox = self.inbox.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = tokio::time::sleep(after) => {
                            let _ = inbox.send(Envelope::effect(Event::AdvanceDue { ticket })).await;
                        }
                    }
                });
            }
            Command::Present(presentation) => {
                info!(
                    "Session {} presentation: {:?}",
                    self.machine.id(),
                    presentation
                );
            }
            Command::Evaluate {
                job_title,
                candidate,
                questions,
            } => {
                let backend = self.deps.backend.clone();
                let inbox = self.inbox.clone();
                let count = questions.len();
                tokio::spawn(async move {
                    let evaluation = tokio::spawn(async move {
                        finalize(backend.as_ref(), &questions, &candidate, &job_title).await
                    });
                    let outcome = match evaluation.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            error!("Evaluation task failed: {e}");
                            InterviewOutcome::placeholder(count)
                        }
                    };
                    let _ = inbox
                        .send(Envelope::effect(Event::EvaluationFinished(outcome)))
                        .await;
                });
            }
            Command::SaveResults {
                job,
                candidate,
                questions,
                summary,
            } => {
                let repository = self.deps.repository.clone();
                let inbox = self.inbox.clone();
                tokio::spawn(async move {
                    let status =
                        save_status(repository.as_ref(), &job, &candidate, &questions, &summary)
                            .await;
                    let _ = inbox.send(Envelope::effect(Event::ResultsSaved(status))).await;
                });
            }
            Command::PersistSnapshot(snapshot) => {
                if self.shutdown.is_cancelled() {
                    debug!("Session {} closed, snapshot dropped", snapshot.session_id);
                    return;
                }
                if let Err(e) = self.deps.snapshots.save(&snapshot).await {
                    warn!(
                        "Failed to persist snapshot for session {}: {e}",
                        snapshot.session_id
                    );
                }
            }
        }
    }
}
