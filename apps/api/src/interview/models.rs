use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A single interview question and everything recorded against it.
///
/// `answer` is filled at submit time. `score` and `reason` stay empty until the
/// batch evaluation that runs once every question has been answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub difficulty: Difficulty,
    /// Seconds allowed for answering.
    pub time_limit: u32,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub ideal_answer: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub resume_url: Option<String>,
}

/// The job a session was opened for. Captured at session creation so the
/// results step never has to guess which job the answers belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

/// Score and reason produced for one question by the evaluation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionEvaluation {
    pub score: f64,
    pub reason: String,
}

/// Serializable interview progress. Only the reducer mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewState {
    pub candidate_info: Option<CandidateInfo>,
    pub questions: Vec<Question>,
    pub current_question_index: usize,
    pub is_interview_started: bool,
    pub is_interview_completed: bool,
    pub final_score: Option<f64>,
    pub summary: Option<String>,
    pub time_remaining: u32,
    pub is_timer_active: bool,
    pub resume_uploaded: bool,
    #[serde(default)]
    pub resume_text: Option<String>,
}

impl InterviewState {
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_question_index + 1 >= self.questions.len()
    }

    /// Started, not finished, and there is something to resume into.
    pub fn is_in_progress(&self) -> bool {
        self.is_interview_started && !self.is_interview_completed && !self.questions.is_empty()
    }

    /// Mean of the per-question scores, unscored questions counting as zero.
    pub fn average_score(&self) -> f64 {
        average_score(&self.questions)
    }
}

pub fn average_score(questions: &[Question]) -> f64 {
    if questions.is_empty() {
        return 0.0;
    }
    let total: f64 = questions.iter().map(|q| q.score.unwrap_or(0.0)).sum();
    total / questions.len() as f64
}
