//! Interview question generation.
//!
//! One batch call for all six questions. If that fails, each question is
//! generated on its own, and a question that still cannot be generated is
//! replaced from a canned bank for its difficulty. Generation never fails.

use tracing::{info, warn};

use crate::backend::ScoringBackend;
use crate::interview::models::{Difficulty, JobSummary, Question};

pub const DIFFICULTY_LADDER: [Difficulty; 6] = [
    Difficulty::Easy,
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Medium,
    Difficulty::Hard,
    Difficulty::Hard,
];

pub const TIME_LIMITS: [u32; 6] = [20, 20, 60, 60, 120, 120];

const DEFAULT_JOB_CONTEXT: &str = "Software Development";

const GENERIC_IDEAL_ANSWER: &str = "This is a comprehensive answer that demonstrates understanding of the concept and provides practical examples.";

const EASY_BANK: [&str; 4] = [
    "What is React and how does it differ from vanilla JavaScript?",
    "Explain the concept of state in React applications.",
    "What are React components and how do you create them?",
    "What is JSX and why is it used in React?",
];

const MEDIUM_BANK: [&str; 4] = [
    "How do you handle side effects in React? Explain useEffect hook.",
    "What is the difference between controlled and uncontrolled components?",
    "Explain React hooks and their benefits over class components.",
    "How do you optimize React application performance?",
];

const HARD_BANK: [&str; 4] = [
    "Design a scalable state management solution for a large React application.",
    "Explain the React reconciliation process and how it affects performance.",
    "How would you implement a custom hook for data fetching with caching?",
    "Design a component architecture for a real-time collaborative application.",
];

const CANNED_IDEALS: [(&str, &str); 6] = [
    (
        "What is React and how does it differ from vanilla JavaScript?",
        "React is a JavaScript library for building user interfaces. Unlike vanilla JavaScript, which manipulates the DOM directly, React uses a virtual DOM for efficient updates and a component-based architecture for reusable UI elements.",
    ),
    (
        "Explain the concept of state in React applications.",
        "State is an object that represents the current condition of a component. Updating it triggers a re-render. It is local to the component and is managed with the useState hook in functional components.",
    ),
    (
        "How do you handle side effects in React? Explain useEffect hook.",
        "Side effects are handled with useEffect, which runs after render for work such as data fetching or subscriptions. Its dependency array controls when the effect re-runs.",
    ),
    (
        "What is the difference between controlled and uncontrolled components?",
        "Controlled components keep form data in React state, which is the single source of truth. Uncontrolled components keep it in the DOM and read it through refs.",
    ),
    (
        "Design a scalable state management solution for a large React application.",
        "Use a dedicated store for server state, context for local cross-cutting state and custom hooks for component logic. Normalize state, derive values through selectors and split code with lazy loading.",
    ),
    (
        "Explain the React reconciliation process and how it affects performance.",
        "Reconciliation compares the new virtual DOM tree with the previous one and applies only the differences to the real DOM. Elements are matched by type and key, so stable keys keep DOM work to a minimum.",
    ),
];

fn bank(difficulty: Difficulty) -> &'static [&'static str; 4] {
    match difficulty {
        Difficulty::Easy => &EASY_BANK,
        Difficulty::Medium => &MEDIUM_BANK,
        Difficulty::Hard => &HARD_BANK,
    }
}

pub fn canned_ideal_answer(question: &str) -> String {
    CANNED_IDEALS
        .iter()
        .find(|(q, _)| *q == question)
        .map(|(_, ideal)| ideal.to_string())
        .unwrap_or_else(|| GENERIC_IDEAL_ANSWER.to_string())
}

pub fn canned_question(index: usize, difficulty: Difficulty, time_limit: u32) -> Question {
    let questions = bank(difficulty);
    let text = questions[index % questions.len()];
    build_question(index, text.to_string(), difficulty, time_limit, Some(canned_ideal_answer(text)))
}

fn build_question(
    index: usize,
    text: String,
    difficulty: Difficulty,
    time_limit: u32,
    ideal_answer: Option<String>,
) -> Question {
    Question {
        id: format!("q-{}", index + 1),
        question: text,
        difficulty,
        time_limit,
        answer: None,
        score: None,
        ideal_answer,
        reason: None,
    }
}

pub async fn generate_interview_questions(
    backend: &dyn ScoringBackend,
    job: &JobSummary,
) -> Vec<Question> {
    let job_context = if job.title.trim().is_empty() {
        DEFAULT_JOB_CONTEXT
    } else {
        job.title.as_str()
    };
    info!("Generating questions for: {job_context}");

    match backend
        .generate_batch(job_context, &job.description, &DIFFICULTY_LADDER)
        .await
    {
        Ok(generated) if generated.len() >= DIFFICULTY_LADDER.len() => {
            let questions: Vec<Question> = generated
                .into_iter()
                .take(DIFFICULTY_LADDER.len())
                .enumerate()
                .map(|(i, g)| {
                    build_question(
                        i,
                        g.question,
                        DIFFICULTY_LADDER[i],
                        TIME_LIMITS[i],
                        g.ideal_answer,
                    )
                })
                .collect();
            info!("Successfully generated {} questions", questions.len());
            questions
        }
        Ok(generated) => {
            warn!(
                "Batch generation returned {} questions, falling back to individual calls",
                generated.len()
            );
            generate_individually(backend, job_context).await
        }
        Err(e) => {
            warn!("Failed to generate batch questions, falling back to individual calls: {e}");
            generate_individually(backend, job_context).await
        }
    }
}

async fn generate_individually(backend: &dyn ScoringBackend, job_context: &str) -> Vec<Question> {
    let mut questions = Vec::with_capacity(DIFFICULTY_LADDER.len());

    for (i, (difficulty, time_limit)) in DIFFICULTY_LADDER.iter().zip(TIME_LIMITS).enumerate() {
        match backend.generate_question(*difficulty, job_context).await {
            Ok(text) => {
                let ideal = match backend.generate_ideal(&text).await {
                    Ok(ideal) => ideal,
                    Err(e) => {
                        warn!("Failed to generate ideal answer: {e}");
                        canned_ideal_answer(&text)
                    }
                };
                questions.push(build_question(i, text, *difficulty, time_limit, Some(ideal)));
            }
            Err(e) => {
                warn!("Failed to generate {} question: {e}", difficulty.as_str());
                questions.push(canned_question(i, *difficulty, time_limit));
            }
        }
    }

    questions
}
