//! Narration — spoken delivery of the greeting and each question.
//!
//! The session actor owns at most one active utterance. It talks to the
//! synthesizer through the `Narrator` trait and steers playback with a
//! `PlaybackHandle` (pause / resume / stop). Finishing, failing and being
//! stopped all resolve the `speak` future, so nothing waits forever on audio.

pub mod chunking;
pub mod paced;
pub mod voices;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::narration::chunking::{split_into_chunks, MAX_CHUNK_CHARS};
use crate::narration::voices::{Voice, VoiceCatalog};

pub const MIN_RATE: f32 = 0.5;
pub const MAX_RATE: f32 = 2.0;
pub const DEFAULT_RATE: f32 = 1.0;
/// Greetings are always read slightly slower than normal speech.
pub const GREETING_RATE: f32 = 0.9;

#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("narration interrupted")]
    Interrupted,

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// Two-letter code used for voice matching.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// BCP-47 tag handed to the synthesizer.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Hi => "hi-IN",
        }
    }
}

/// Playback speed multiplier, clamped to 0.5–2.0 in 0.1 steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NarrationRate(f32);

impl NarrationRate {
    pub fn new(rate: f32) -> Self {
        if !rate.is_finite() {
            return Self::default();
        }
        let clamped = rate.clamp(MIN_RATE, MAX_RATE);
        Self((clamped * 10.0).round() / 10.0)
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for NarrationRate {
    fn default() -> Self {
        Self(DEFAULT_RATE)
    }
}

/// What the session wants spoken. Voice and chunking are resolved later,
/// when the runner turns the script into an `Utterance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationScript {
    pub text: String,
    pub language: Language,
    pub rate: NarrationRate,
}

pub fn greeting_script(
    candidate_name: &str,
    job_title: &str,
    total_questions: usize,
    language: Language,
) -> NarrationScript {
    let text = match language {
        Language::En => format!(
            "Hello {candidate_name}, welcome to the {job_title} interview. You will be given {total_questions} questions to answer. Each question has a specific time limit. The timer will start after I finish reading the question. Please listen carefully and answer to the best of your ability. Good luck!"
        ),
        Language::Hi => format!(
            "नमस्ते {candidate_name}, {job_title} इंटरव्यू में आपका स्वागत है। आपको {total_questions} प्रश्न दिए जाएंगे। प्रत्येक प्रश्न की एक निश्चित समय सीमा है। मेरे प्रश्न पढ़ने के बाद टाइमर शुरू होगा। कृपया ध्यान से सुनें और अपनी पूरी क्षमता से उत्तर दें। शुभकामनाएं!"
        ),
    };
    NarrationScript {
        text,
        language,
        rate: NarrationRate::new(GREETING_RATE),
    }
}

/// "Question 3 of 6. <text>", localized. `number` is one-based.
pub fn question_script(
    question: &str,
    number: usize,
    total: usize,
    language: Language,
    rate: NarrationRate,
) -> NarrationScript {
    let text = match language {
        Language::En => format!("Question {number} of {total}. {question}"),
        Language::Hi => format!("प्रश्न {number} का {total}। {question}"),
    };
    NarrationScript {
        text,
        language,
        rate,
    }
}

/// A script ready for the synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub chunks: Vec<String>,
    pub lang: &'static str,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Utterance {
    pub fn prepare(script: &NarrationScript, voices: &VoiceCatalog) -> Self {
        let chunks = if script.language == Language::Hi
            && script.text.chars().count() > MAX_CHUNK_CHARS
        {
            split_into_chunks(&script.text, MAX_CHUNK_CHARS)
        } else {
            vec![script.text.clone()]
        };

        Self {
            chunks,
            lang: script.language.tag(),
            voice: voices.select(script.language).cloned(),
            rate: script.rate.value(),
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Playing,
    Paused,
}

/// Runner-side half of a playback channel.
#[derive(Debug)]
pub struct PlaybackHandle {
    state: watch::Sender<Playback>,
    cancel: CancellationToken,
}

impl PlaybackHandle {
    pub fn pause(&self) {
        self.state.send_replace(Playback::Paused);
    }

    pub fn resume(&self) {
        self.state.send_replace(Playback::Playing);
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Narrator-side half of a playback channel.
#[derive(Debug, Clone)]
pub struct PlaybackControl {
    pub state: watch::Receiver<Playback>,
    pub cancel: CancellationToken,
}

impl PlaybackControl {
    pub fn is_paused(&self) -> bool {
        *self.state.borrow() == Playback::Paused
    }
}

pub fn playback_channel() -> (PlaybackHandle, PlaybackControl) {
    let (tx, rx) = watch::channel(Playback::Playing);
    let cancel = CancellationToken::new();
    (
        PlaybackHandle {
            state: tx,
            cancel: cancel.clone(),
        },
        PlaybackControl { state: rx, cancel },
    )
}

/// The speech-synthesis capability.
///
/// `speak` resolves `Ok(())` once every chunk has been delivered, and
/// `Err(NarrationError::Interrupted)` as soon as the control is cancelled.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn speak(
        &self,
        utterance: Utterance,
        control: PlaybackControl,
    ) -> Result<(), NarrationError>;
}
