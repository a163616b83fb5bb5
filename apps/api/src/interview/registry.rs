use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::interview::machine::{
    CandidateEvent, Event, Phase, ResumeAttachment, SessionError, SessionMachine, SessionView,
};
use crate::interview::models::{CandidateInfo, JobSummary};
use crate::interview::recovery::{assess, RecoveryDecision};
use crate::interview::runner::{spawn_session, SessionDeps, SessionHandle};

/// Live sessions by id. Sessions missing here are rebuilt from their snapshot
/// on demand.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
    deps: SessionDeps,
}

impl SessionRegistry {
    pub fn new(deps: SessionDeps) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            deps,
        }
    }

    pub async fn create(
        &self,
        job: JobSummary,
        candidate: CandidateInfo,
        resume: Option<ResumeAttachment>,
    ) -> Result<SessionView, SessionError> {
        let id = Uuid::new_v4();
        let machine = SessionMachine::new(id, job, candidate, resume, self.deps.submit_delay);
        let handle = spawn_session(machine, self.deps.clone());
        {
            let mut sessions = self.sessions.write().await;
            sessions.retain(|_, h| !h.is_closed());
            sessions.insert(id, handle.clone());
        }

        info!("Opened interview session {id}");
        handle.dispatch(Event::Open).await
    }

    async fn live(&self, id: Uuid) -> Option<SessionHandle> {
        let handle = self.sessions.read().await.get(&id).cloned()?;
        if handle.is_closed() {
            self.sessions.write().await.remove(&id);
            return None;
        }
        Some(handle)
    }

    /// Live handle, or a fresh actor restored from the snapshot store.
    async fn hydrate(&self, id: Uuid) -> Result<SessionHandle, SessionError> {
        if let Some(handle) = self.live(id).await {
            return Ok(handle);
        }

        let snapshot = self
            .deps
            .snapshots
            .load(id)
            .await?
            .ok_or(SessionError::NotFound(id))?;

        let mut sessions = self.sessions.write().await;
        if let Some(handle) = sessions.get(&id).filter(|h| !h.is_closed()) {
            return Ok(handle.clone());
        }
        let machine = SessionMachine::restore(snapshot, self.deps.submit_delay);
        let handle = spawn_session(machine, self.deps.clone());
        sessions.insert(id, handle.clone());

        info!("Restored interview session {id} from snapshot");
        Ok(handle)
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView, SessionError> {
        if let Some(handle) = self.live(id).await {
            return Ok(handle.view());
        }
        match self.deps.snapshots.load(id).await? {
            Some(snapshot) => Ok(SessionMachine::restore(snapshot, self.deps.submit_delay).view()),
            None => Err(SessionError::NotFound(id)),
        }
    }

    pub async fn dispatch(
        &self,
        id: Uuid,
        event: CandidateEvent,
    ) -> Result<SessionView, SessionError> {
        let handle = self.hydrate(id).await?;
        handle.dispatch(Event::Candidate(event)).await
    }

    pub async fn recovery(&self, id: Uuid) -> Result<RecoveryDecision, SessionError> {
        if let Some(handle) = self.live(id).await {
            let view = handle.view();
            // A running session that is mid-question has nothing to recover.
            if !view.interview.is_interview_completed && view.phase != Phase::NotStarted {
                return Ok(RecoveryDecision::StartFresh);
            }
        }
        let snapshot = self.deps.snapshots.load(id).await?;
        Ok(assess(snapshot.as_ref()))
    }

    /// Continues a persisted interview at its current question.
    pub async fn resume(&self, id: Uuid) -> Result<SessionView, SessionError> {
        let handle = self.hydrate(id).await?;
        handle.dispatch(Event::Resume).await
    }

    /// Drops the session and its snapshot.
    pub async fn restart(&self, id: Uuid) -> Result<(), SessionError> {
        let removed = self.sessions.write().await.remove(&id);
        if let Some(handle) = removed {
            handle.stop().await;
        }
        if let Err(e) = self.deps.snapshots.clear(id).await {
            warn!("Failed to clear snapshot for session {id}: {e}");
            return Err(e.into());
        }
        info!("Discarded interview session {id}");
        Ok(())
    }

    pub async fn live_count(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|h| !h.is_closed())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::interview::machine::SaveStatus;
    use crate::testing::{
        sample_candidate, test_deps, wait_for, InMemoryRepository, MockBackend, SlowSnapshots,
    };

    fn registry() -> (SessionRegistry, InMemoryRepository) {
        let repository = InMemoryRepository::default();
        let deps = test_deps(MockBackend::default(), repository.clone());
        (SessionRegistry::new(deps), repository)
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_generates_questions_and_greets() {
        let (registry, repository) = registry();
        let job = repository.seed_job("Backend Developer", "Rust services");

        let view = registry.create(job, sample_candidate(), None).await.unwrap();
        let handle = registry.live(view.session_id).await.unwrap();
        let view = wait_for(&handle, |v| v.phase == Phase::Greeting).await;

        assert_eq!(view.interview.questions.len(), 6);
        assert!(view.interview.is_interview_started);
        assert_eq!(registry.live_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restored_session_resumes_at_current_question() {
        let (registry, repository) = registry();
        let job = repository.seed_job("Backend Developer", "Rust services");

        let view = registry.create(job, sample_candidate(), None).await.unwrap();
        let id = view.session_id;
        let handle = registry.live(id).await.unwrap();
        wait_for(&handle, |v| v.phase == Phase::Greeting).await;
        registry
            .dispatch(id, CandidateEvent::BeginInterview { language: None })
            .await
            .unwrap();

        for i in 0..2 {
            wait_for(&handle, |v| v.phase == Phase::Answering { index: i }).await;
            registry
                .dispatch(id, CandidateEvent::UpdateAnswer { text: format!("answer {i}") })
                .await
                .unwrap();
            registry.dispatch(id, CandidateEvent::SubmitAnswer).await.unwrap();
        }
        wait_for(&handle, |v| v.phase == Phase::Answering { index: 2 }).await;

        // Simulate a process restart: the live actor is gone, the snapshot stays.
        handle.close();
        registry.sessions.write().await.clear();

        match registry.recovery(id).await.unwrap() {
            RecoveryDecision::OfferResume {
                current_question_index,
                total_questions,
                ..
            } => {
                assert_eq!(current_question_index, 2);
                assert_eq!(total_questions, 6);
            }
            other => panic!("expected resume offer, got {other:?}"),
        }

        let view = registry.resume(id).await.unwrap();
        assert_eq!(view.phase, Phase::Narrating { index: 2, paused: false });
        assert_eq!(view.interview.questions[0].answer.as_deref(), Some("answer 0"));
        assert_eq!(view.interview.questions[1].answer.as_deref(), Some("answer 1"));
        assert!(view.interview.questions[2].answer.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_discards_session() {
        let (registry, repository) = registry();
        let job = repository.seed_job("Backend Developer", "Rust services");
        let view = registry.create(job, sample_candidate(), None).await.unwrap();
        let id = view.session_id;

        registry.restart(id).await.unwrap();

        assert!(matches!(
            registry.view(id).await,
            Err(SessionError::NotFound(_))
        ));
        assert_eq!(registry.recovery(id).await.unwrap(), RecoveryDecision::StartFresh);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_outlasts_in_flight_snapshot_write() {
        let repository = InMemoryRepository::default();
        let mut deps = test_deps(MockBackend::default(), repository.clone());
        deps.snapshots = Arc::new(SlowSnapshots {
            delay: Duration::from_secs(2),
            ..Default::default()
        });
        let registry = SessionRegistry::new(deps);
        let job = repository.seed_job("Backend Developer", "Rust services");

        let view = registry.create(job, sample_candidate(), None).await.unwrap();
        let id = view.session_id;
        tokio::time::sleep(Duration::from_millis(100)).await;

        registry.restart(id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(registry.recovery(id).await.unwrap(), RecoveryDecision::StartFresh);
        assert!(matches!(
            registry.view(id).await,
            Err(SessionError::NotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_session_releases_its_actor() {
        let (registry, repository) = registry();
        let job = repository.seed_job("Backend Developer", "Rust services");

        let view = registry.create(job, sample_candidate(), None).await.unwrap();
        let id = view.session_id;
        let handle = registry.live(id).await.unwrap();
        wait_for(&handle, |v| v.phase == Phase::Greeting).await;
        registry
            .dispatch(id, CandidateEvent::BeginInterview { language: None })
            .await
            .unwrap();

        for i in 0..6 {
            wait_for(&handle, |v| v.phase == Phase::Answering { index: i }).await;
            registry
                .dispatch(id, CandidateEvent::UpdateAnswer { text: format!("answer {i}") })
                .await
                .unwrap();
            registry.dispatch(id, CandidateEvent::SubmitAnswer).await.unwrap();
        }
        wait_for(&handle, |v| {
            matches!(v.save_status, Some(SaveStatus::Saved { .. }))
        })
        .await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(handle.is_closed());
        assert_eq!(registry.live_count().await, 0);

        let view = registry.view(id).await.unwrap();
        assert_eq!(view.phase, Phase::Completed);
        assert!(matches!(view.save_status, Some(SaveStatus::Saved { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_closes_but_stays_resumable() {
        let repository = InMemoryRepository::default();
        let mut deps = test_deps(MockBackend::default(), repository.clone());
        deps.idle_timeout = Duration::from_secs(60);
        let registry = SessionRegistry::new(deps);
        let job = repository.seed_job("Backend Developer", "Rust services");

        let view = registry.create(job, sample_candidate(), None).await.unwrap();
        let id = view.session_id;
        let handle = registry.live(id).await.unwrap();
        wait_for(&handle, |v| v.phase == Phase::Greeting).await;

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(handle.is_closed());
        assert_eq!(registry.live_count().await, 0);
        let view = registry.view(id).await.unwrap();
        assert_eq!(view.interview.questions.len(), 6);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (registry, _) = registry();
        let id = Uuid::new_v4();
        assert!(matches!(
            registry.resume(id).await,
            Err(SessionError::NotFound(found)) if found == id
        ));
    }
}
