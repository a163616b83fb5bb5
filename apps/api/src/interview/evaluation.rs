//! Post-interview scoring: one batch evaluation, then one summary call.
//! Each call degrades to the local heuristic when the backend fails.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backend::models::{
    AnswerForEvaluation, EvaluateAnswersRequest, ScoredAnswer, SummaryCandidate, SummaryJob,
    SummaryRequest,
};
use crate::backend::ScoringBackend;
use crate::interview::fallback::{fallback_summary, heuristic_evaluations};
use crate::interview::models::{average_score, CandidateInfo, Question, QuestionEvaluation};

pub const MISSING_EVALUATION_REASON: &str = "No evaluation available";
pub const PENDING_SUMMARY: &str = "Interview completed. Evaluation in progress.";

/// Evaluated questions plus aggregate score and summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewOutcome {
    pub evaluations: Vec<QuestionEvaluation>,
    pub final_score: f64,
    pub summary: String,
}

impl InterviewOutcome {
    /// Used when evaluation could not run at all.
    pub fn placeholder(question_count: usize) -> Self {
        Self {
            evaluations: (0..question_count)
                .map(|_| QuestionEvaluation {
                    score: 0.0,
                    reason: MISSING_EVALUATION_REASON.to_string(),
                })
                .collect(),
            final_score: 0.0,
            summary: PENDING_SUMMARY.to_string(),
        }
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 10.0)
    } else {
        0.0
    }
}

/// Scores every answered question, in order. Missing trailing entries are
/// zero-filled. A backend failure switches to the heuristic for all of them.
pub async fn evaluate_all(
    backend: &dyn ScoringBackend,
    questions: &[Question],
    job_title: &str,
) -> Vec<QuestionEvaluation> {
    let request = EvaluateAnswersRequest {
        questions: questions
            .iter()
            .map(|q| AnswerForEvaluation {
                question: q.question.clone(),
                ideal_answer: q.ideal_answer.clone().unwrap_or_default(),
                candidate_answer: q.answer.clone().unwrap_or_default(),
                difficulty: q.difficulty,
            })
            .collect(),
        job_title: job_title.to_string(),
    };

    match backend.evaluate_answers(&request).await {
        Ok(evaluations) => {
            let mut evaluations = evaluations.into_iter();
            questions
                .iter()
                .map(|_| match evaluations.next() {
                    Some(e) => QuestionEvaluation {
                        score: clamp_score(e.score),
                        reason: e
                            .reason
                            .filter(|r| !r.trim().is_empty())
                            .unwrap_or_else(|| MISSING_EVALUATION_REASON.to_string()),
                    },
                    None => QuestionEvaluation {
                        score: 0.0,
                        reason: MISSING_EVALUATION_REASON.to_string(),
                    },
                })
                .collect()
        }
        Err(e) => {
            warn!("Failed to evaluate answers, using heuristic scores: {e}");
            heuristic_evaluations(questions)
        }
    }
}

/// Aggregate score and free-text summary for already-scored questions.
pub async fn summarize(
    backend: &dyn ScoringBackend,
    questions: &[Question],
    candidate: &CandidateInfo,
    job_title: &str,
) -> (f64, String) {
    let request = SummaryRequest {
        answers: questions
            .iter()
            .map(|q| ScoredAnswer {
                question: q.question.clone(),
                candidate_answer: q.answer.clone().unwrap_or_default(),
                score: q.score.unwrap_or(0.0),
            })
            .collect(),
        candidate: SummaryCandidate {
            name: candidate.name.clone(),
            email: candidate.email.clone(),
        },
        job: SummaryJob {
            title: job_title.to_string(),
        },
    };

    match backend.summarize(&request).await {
        Ok(response) => {
            let summary = if response.summary.trim().is_empty() {
                "Interview completed successfully.".to_string()
            } else {
                response.summary
            };
            (clamp_score(response.final_score), summary)
        }
        Err(e) => {
            warn!("Failed to generate summary, using template: {e}");
            let scores: Vec<f64> = questions.iter().map(|q| q.score.unwrap_or(0.0)).collect();
            fallback_summary(&candidate.name, &scores)
        }
    }
}

/// Evaluates then summarizes. `questions` are the session's answered questions.
pub async fn finalize(
    backend: &dyn ScoringBackend,
    questions: &[Question],
    candidate: &CandidateInfo,
    job_title: &str,
) -> InterviewOutcome {
    let evaluations = evaluate_all(backend, questions, job_title).await;

    let scored: Vec<Question> = questions
        .iter()
        .zip(&evaluations)
        .map(|(q, e)| Question {
            score: Some(e.score),
            reason: Some(e.reason.clone()),
            ..q.clone()
        })
        .collect();

    info!(
        "Evaluated {} answers, average {:.2}",
        scored.len(),
        average_score(&scored)
    );

    let (final_score, summary) = summarize(backend, &scored, candidate, job_title).await;

    InterviewOutcome {
        evaluations,
        final_score,
        summary,
    }
}
