use serde::Serialize;

use crate::interview::machine::SessionSnapshot;

/// What to offer a candidate who comes back to a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RecoveryDecision {
    OfferResume {
        current_question_index: usize,
        total_questions: usize,
        candidate_name: String,
        job_title: String,
    },
    ShowResults {
        final_score: Option<f64>,
    },
    StartFresh,
}

pub fn assess(snapshot: Option<&SessionSnapshot>) -> RecoveryDecision {
    let Some(snapshot) = snapshot else {
        return RecoveryDecision::StartFresh;
    };
    let state = &snapshot.state;

    if state.is_interview_completed {
        return RecoveryDecision::ShowResults {
            final_score: state.final_score,
        };
    }

    match &state.candidate_info {
        Some(candidate) if state.is_in_progress() => RecoveryDecision::OfferResume {
            current_question_index: state.current_question_index,
            total_questions: state.questions.len(),
            candidate_name: candidate.name.clone(),
            job_title: snapshot.job.title.clone(),
        },
        _ => RecoveryDecision::StartFresh,
    }
}
