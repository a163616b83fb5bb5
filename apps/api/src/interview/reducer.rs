//! Tagged actions over `InterviewState`.
//!
//! `reduce` is the only code path that writes interview progress. It is pure:
//! no clocks, no I/O, no logging.

use crate::interview::models::{CandidateInfo, InterviewState, Question, QuestionEvaluation};

#[derive(Debug, Clone, PartialEq)]
pub enum InterviewAction {
    SetCandidateInfo(CandidateInfo),
    SetResumeUploaded {
        uploaded: bool,
        text: Option<String>,
        url: Option<String>,
    },
    SetQuestions(Vec<Question>),
    StartInterview,
    SubmitAnswer {
        question_index: usize,
        answer: String,
    },
    NextQuestion,
    UpdateTimer(u32),
    SetTimerActive(bool),
    ApplyEvaluations(Vec<QuestionEvaluation>),
    CompleteInterview {
        final_score: f64,
        summary: String,
    },
}

pub fn reduce(state: &mut InterviewState, action: InterviewAction) {
    match action {
        InterviewAction::SetCandidateInfo(info) => {
            state.candidate_info = Some(info);
        }
        InterviewAction::SetResumeUploaded {
            uploaded,
            text,
            url,
        } => {
            state.resume_uploaded = uploaded;
            state.resume_text = text;
            if let Some(candidate) = state.candidate_info.as_mut() {
                candidate.resume_url = url;
            }
        }
        InterviewAction::SetQuestions(questions) => {
            state.questions = questions;
        }
        InterviewAction::StartInterview => {
            state.is_interview_started = true;
            state.current_question_index = 0;
            state.time_remaining = state.questions.first().map(|q| q.time_limit).unwrap_or(0);
            // The countdown starts once the first question has been narrated.
            state.is_timer_active = false;
        }
        InterviewAction::SubmitAnswer {
            question_index,
            answer,
        } => {
            if let Some(question) = state.questions.get_mut(question_index) {
                question.answer = Some(answer);
            }
        }
        InterviewAction::NextQuestion => {
            if state.is_interview_completed {
                return;
            }
            if state.current_question_index + 1 < state.questions.len() {
                state.current_question_index += 1;
                state.time_remaining = state.questions[state.current_question_index].time_limit;
                state.is_timer_active = false;
            } else {
                state.is_interview_completed = true;
                state.is_timer_active = false;
            }
        }
        InterviewAction::UpdateTimer(seconds) => {
            state.time_remaining = seconds;
            if seconds == 0 {
                state.is_timer_active = false;
            }
        }
        InterviewAction::SetTimerActive(active) => {
            state.is_timer_active = active && state.time_remaining > 0;
        }
        InterviewAction::ApplyEvaluations(evaluations) => {
            for (question, evaluation) in state.questions.iter_mut().zip(evaluations) {
                question.score = Some(evaluation.score);
                question.reason = Some(evaluation.reason);
            }
        }
        InterviewAction::CompleteInterview {
            final_score,
            summary,
        } => {
            state.is_interview_completed = true;
            state.final_score = Some(final_score);
            state.summary = Some(summary);
            state.is_timer_active = false;
        }
    }
}
