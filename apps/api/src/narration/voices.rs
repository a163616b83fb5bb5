use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::narration::Language;

/// A synthesizer voice as advertised by the speech capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

impl Voice {
    pub fn new(name: &str, lang: &str) -> Self {
        Self {
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }
}

const PREFERRED_EN: [&str; 6] = [
    "Google US English",
    "Microsoft Zira",
    "Samantha",
    "Karen",
    "Daniel",
    "Google UK English Female",
];

const PREFERRED_HI: [&str; 4] = ["Google हिन्दी", "Microsoft Hemant", "Lekha", "Google Hindi"];

#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    /// Parses a `name|lang` comma-separated list. Malformed entries are skipped.
    pub fn parse(spec: &str) -> Self {
        let voices = spec
            .split(',')
            .filter_map(|entry| {
                let (name, lang) = entry.split_once('|')?;
                let (name, lang) = (name.trim(), lang.trim());
                if name.is_empty() || lang.is_empty() {
                    warn!("Ignoring malformed voice entry '{entry}'");
                    return None;
                }
                Some(Voice::new(name, lang))
            })
            .collect();
        Self { voices }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            Voice::new("Google US English", "en-US"),
            Voice::new("Google UK English Female", "en-GB"),
            Voice::new("Google हिन्दी", "hi-IN"),
        ])
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    /// Named preferred voice first, then any voice whose language code matches,
    /// then whatever comes first in the catalogue.
    pub fn select(&self, language: Language) -> Option<&Voice> {
        let preferred: &[&str] = match language {
            Language::En => &PREFERRED_EN,
            Language::Hi => &PREFERRED_HI,
        };

        for name in preferred {
            if let Some(voice) = self.voices.iter().find(|v| v.name.contains(name)) {
                debug!("Selected voice: {}", voice.name);
                return Some(voice);
            }
        }

        if let Some(voice) = self
            .voices
            .iter()
            .find(|v| v.lang.starts_with(language.code()))
        {
            debug!("Using fallback voice: {}", voice.name);
            return Some(voice);
        }

        let fallback = self.voices.first();
        if fallback.is_some() {
            warn!("No matching voice for {}, using default", language.tag());
        }
        fallback
    }
}
