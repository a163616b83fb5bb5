use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use crate::narration::{NarrationError, Narrator, PlaybackControl, Utterance};

const MIN_CHUNK_DURATION: Duration = Duration::from_millis(300);

/// Server-side stand-in for the browser's speech engine: holds each chunk
/// for as long as it would take to read aloud at the configured pace.
/// The client performs the actual audio from the session view.
pub struct PacedNarrator {
    words_per_minute: u32,
}

impl PacedNarrator {
    pub fn new(words_per_minute: u32) -> Self {
        Self {
            words_per_minute: words_per_minute.max(1),
        }
    }

    pub fn chunk_duration(&self, chunk: &str, rate: f32) -> Duration {
        let words = chunk.split_whitespace().count().max(1) as f64;
        let per_minute = self.words_per_minute as f64 * rate.max(0.1) as f64;
        Duration::from_secs_f64(words * 60.0 / per_minute).max(MIN_CHUNK_DURATION)
    }
}

#[async_trait]
impl Narrator for PacedNarrator {
    async fn speak(
        &self,
        utterance: Utterance,
        mut control: PlaybackControl,
    ) -> Result<(), NarrationError> {
        for (index, chunk) in utterance.chunks.iter().enumerate() {
            let mut remaining = self.chunk_duration(chunk, utterance.rate);
            debug!(
                "Narrating chunk {} ({}, {:?})",
                index + 1,
                utterance.lang,
                remaining
            );

            loop {
                if control.is_paused() {
                    tokio::select! {
                        _ = control.cancel.cancelled() => return Err(NarrationError::Interrupted),
                        changed = control.state.changed() => {
                            if changed.is_err() {
                                return Err(NarrationError::Interrupted);
                            }
                            continue;
                        }
                    }
                }

                let started = Instant::now();
                tokio::select! {
                    _ = control.cancel.cancelled() => return Err(NarrationError::Interrupted),
                    _ = tokio::time::sleep(remaining) => break,
                    changed = control.state.changed() => {
                        if changed.is_err() {
                            return Err(NarrationError::Interrupted);
                        }
                        remaining = remaining.saturating_sub(started.elapsed());
                    }
                }
            }
        }
        Ok(())
    }
}
