//! Deterministic stand-ins used when the scoring backend is unavailable.
//!
//! Scores depend only on answer length and topic keyword match. The reason
//! string is picked at random from a fixed pool.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::interview::models::{Question, QuestionEvaluation};

pub const TIME_EXPIRED_ANSWER: &str = "No answer provided - time expired";
pub const NO_ANSWER_REASON: &str = "No answer provided.";

const BASE_SCORE: f64 = 5.0;
const MAX_SCORE: f64 = 10.0;

const REASONS: [&str; 5] = [
    "Good understanding of the concept.",
    "Demonstrates practical knowledge.",
    "Well-structured response.",
    "Shows depth of understanding.",
    "Comprehensive answer with examples.",
];

/// Topic → words that count as a keyword hit. The first topic named in the
/// question decides which list the answer is checked against.
const TOPIC_KEYWORDS: [(&str, &[&str]); 6] = [
    ("react", &["react", "component", "jsx", "virtual dom"]),
    ("state", &["state", "usestate", "setstate", "mutable"]),
    ("effect", &["useeffect", "side effect", "lifecycle"]),
    ("component", &["component", "props", "render"]),
    (
        "performance",
        &["performance", "optimization", "memo", "callback"],
    ),
    (
        "architecture",
        &["architecture", "pattern", "structure", "design"],
    ),
];

// ────────────────────────────────────────────────────────────────────────────
// Per-answer heuristic
// ────────────────────────────────────────────────────────────────────────────

pub fn has_topic_keywords(question: &str, answer: &str) -> bool {
    let question = question.to_lowercase();
    let answer = answer.to_lowercase();

    TOPIC_KEYWORDS
        .iter()
        .find(|(topic, _)| question.contains(topic))
        .map(|(_, words)| words.iter().any(|w| answer.contains(w)))
        .unwrap_or(false)
}

/// Numeric part of the heuristic. Blank and time-expired answers score zero.
pub fn heuristic_points(question: &str, answer: &str) -> f64 {
    let trimmed = answer.trim();
    if trimmed.is_empty() || trimmed == TIME_EXPIRED_ANSWER {
        return 0.0;
    }

    let length = trimmed.chars().count();
    let mut score = BASE_SCORE;
    if length > 50 {
        score += 1.0;
    }
    if length > 100 {
        score += 1.0;
    }
    if has_topic_keywords(question, trimmed) {
        score += 2.0;
    }
    if length > 200 {
        score += 1.0;
    }
    score.clamp(0.0, MAX_SCORE)
}

pub fn heuristic_score_with<R: Rng + ?Sized>(
    question: &str,
    answer: &str,
    rng: &mut R,
) -> QuestionEvaluation {
    let score = heuristic_points(question, answer);
    let reason = if score == 0.0 {
        NO_ANSWER_REASON.to_string()
    } else {
        REASONS
            .choose(rng)
            .copied()
            .unwrap_or(REASONS[0])
            .to_string()
    };
    QuestionEvaluation { score, reason }
}

pub fn heuristic_score(question: &str, answer: &str) -> QuestionEvaluation {
    heuristic_score_with(question, answer, &mut rand::thread_rng())
}

pub fn heuristic_evaluations(questions: &[Question]) -> Vec<QuestionEvaluation> {
    let mut rng = rand::thread_rng();
    questions
        .iter()
        .map(|q| heuristic_score_with(&q.question, q.answer.as_deref().unwrap_or(""), &mut rng))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Summary template
// ────────────────────────────────────────────────────────────────────────────

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Average of `scores` rounded to one decimal, with a templated sentence.
pub fn fallback_summary(candidate_name: &str, scores: &[f64]) -> (f64, String) {
    let average = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    let (level, outlook) = if average >= 8.0 {
        ("excellent", "strong potential")
    } else if average >= 6.0 {
        ("good", "good potential")
    } else {
        ("fair", "room for improvement")
    };

    let summary = format!(
        "{candidate_name} demonstrated {level} technical knowledge during the interview. \
         The candidate showed understanding of the core concepts and provided thoughtful \
         responses to both basic and advanced questions. Overall performance indicates \
         {outlook} for the role."
    );

    (round_one_decimal(average), summary)
}
