//! Speech capabilities as injected providers.
//!
//! The controller never reaches for a platform singleton; it is handed a
//! [`Capability`] per engine, which is either a working implementation or a
//! marker that this host has none.

use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::SpeechError;

pub const FINNISH: &str = "fi-FI";

#[derive(Debug)]
pub enum Capability<T> {
    Available(T),
    Unavailable,
}

impl<T> Capability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    pub fn get_mut(&mut self) -> Result<&mut T, SpeechError> {
        match self {
            Capability::Available(inner) => Ok(inner),
            Capability::Unavailable => Err(SpeechError::Unavailable),
        }
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => Capability::Available(inner),
            None => Capability::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Voice { name: name.into(), lang: lang.into() }
    }
}

/// One unit of synthesized speech. `voice: None` means the engine default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub voice: Option<Voice>,
}

pub trait SpeechSynthesizer {
    fn voices(&self) -> Vec<Voice>;

    /// Stops whatever is currently being spoken. Safe to call when idle.
    fn cancel(&mut self);

    /// Starts speaking without waiting for playback to finish.
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError>;
}

/// Exact `fi-FI` first, then any tag starting with `fi` (case-insensitive).
pub fn select_voice(voices: &[Voice]) -> Option<&Voice> {
    voices
        .iter()
        .find(|v| v.lang == FINNISH)
        .or_else(|| voices.iter().find(|v| v.lang.to_lowercase().starts_with("fi")))
}

/// Builds a Finnish utterance; the language tag is forced to `fi-FI` even when
/// no Finnish voice exists.
pub fn finnish_utterance(text: &str, voices: &[Voice]) -> Utterance {
    Utterance {
        text: text.to_string(),
        lang: FINNISH.to_string(),
        voice: select_voice(voices).cloned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    pub lang: String,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        RecognitionConfig {
            lang: FINNISH.to_string(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

/// How a single-shot recognition session finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    Transcript(String),
    Error(String),
    /// The engine stopped without producing a result.
    Ended,
}

/// A started recognition session whose outcome has not been consumed yet.
#[derive(Debug)]
pub struct PendingRecognition {
    rx: oneshot::Receiver<RecognitionOutcome>,
}

impl PendingRecognition {
    pub fn new(rx: oneshot::Receiver<RecognitionOutcome>) -> Self {
        PendingRecognition { rx }
    }

    /// A dropped session (engine gone, superseded by a newer one) reads as
    /// `Ended`.
    pub async fn outcome(self) -> RecognitionOutcome {
        self.rx.await.unwrap_or(RecognitionOutcome::Ended)
    }
}

pub trait SpeechRecognizer {
    fn start(&mut self, config: RecognitionConfig) -> Result<PendingRecognition, SpeechError>;
}

/// Recognizer fed from outside through a [`RecognitionFeed`].
///
/// Terminal hosts deliver a typed transcript through it; tests script outcomes
/// with it. Starting a new session drops the sender of the previous one.
#[derive(Debug, Default)]
pub struct ChannelRecognizer {
    pending: Arc<Mutex<Option<oneshot::Sender<RecognitionOutcome>>>>,
    last_config: Arc<Mutex<Option<RecognitionConfig>>>,
}

#[derive(Debug, Clone)]
pub struct RecognitionFeed {
    pending: Arc<Mutex<Option<oneshot::Sender<RecognitionOutcome>>>>,
    last_config: Arc<Mutex<Option<RecognitionConfig>>>,
}

impl ChannelRecognizer {
    pub fn new() -> (Self, RecognitionFeed) {
        let recognizer = ChannelRecognizer::default();
        let feed = RecognitionFeed {
            pending: Arc::clone(&recognizer.pending),
            last_config: Arc::clone(&recognizer.last_config),
        };
        (recognizer, feed)
    }
}

impl SpeechRecognizer for ChannelRecognizer {
    fn start(&mut self, config: RecognitionConfig) -> Result<PendingRecognition, SpeechError> {
        let (tx, rx) = oneshot::channel();
        debug!(lang = %config.lang, "recognition session started");

        let mut pending = self
            .pending
            .lock()
            .map_err(|_| SpeechError::Recognition("recognizer state poisoned".to_string()))?;
        *pending = Some(tx);

        if let Ok(mut last) = self.last_config.lock() {
            *last = Some(config);
        }
        Ok(PendingRecognition::new(rx))
    }
}

impl RecognitionFeed {
    pub fn is_listening(&self) -> bool {
        self.pending.lock().map(|p| p.is_some()).unwrap_or(false)
    }

    pub fn last_config(&self) -> Option<RecognitionConfig> {
        self.last_config.lock().ok().and_then(|c| c.clone())
    }

    /// Completes the current session. Returns `false` when nothing is listening.
    pub fn deliver(&self, outcome: RecognitionOutcome) -> bool {
        let sender = match self.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(_) => None,
        };
        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_finnish_voice_wins() {
        let voices = vec![
            Voice::new("Generic", "fi"),
            Voice::new("English", "en-US"),
            Voice::new("Satu", "fi-FI"),
        ];
        assert_eq!(select_voice(&voices).unwrap().name, "Satu");
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        let voices = vec![Voice::new("English", "en-GB"), Voice::new("Onni", "FI-fi")];
        assert_eq!(select_voice(&voices).unwrap().name, "Onni");
    }

    #[test]
    fn no_finnish_voice_keeps_default_but_forces_language() {
        let voices = vec![Voice::new("English", "en-US")];
        assert!(select_voice(&voices).is_none());

        let utterance = finnish_utterance("Hei", &voices);
        assert_eq!(utterance.voice, None);
        assert_eq!(utterance.lang, "fi-FI");
    }

    #[test]
    fn recognition_defaults_are_single_shot_finnish() {
        let config = RecognitionConfig::default();
        assert_eq!(config.lang, "fi-FI");
        assert!(!config.interim_results);
        assert_eq!(config.max_alternatives, 1);
    }

    #[test]
    fn unavailable_capability_reports_error() {
        let mut capability: Capability<ChannelRecognizer> = None.into();
        assert!(!capability.is_available());
        assert!(matches!(capability.get_mut(), Err(SpeechError::Unavailable)));
    }

    #[tokio::test]
    async fn feed_delivers_outcome_to_pending_session() {
        let (mut recognizer, feed) = ChannelRecognizer::new();
        assert!(!feed.is_listening());

        let pending = recognizer.start(RecognitionConfig::default()).unwrap();
        assert!(feed.is_listening());
        assert_eq!(feed.last_config(), Some(RecognitionConfig::default()));

        assert!(feed.deliver(RecognitionOutcome::Transcript("hei".into())));
        assert_eq!(pending.outcome().await, RecognitionOutcome::Transcript("hei".into()));
        assert!(!feed.deliver(RecognitionOutcome::Ended));
    }

    #[tokio::test]
    async fn superseded_session_reads_as_ended() {
        let (mut recognizer, feed) = ChannelRecognizer::new();
        let first = recognizer.start(RecognitionConfig::default()).unwrap();
        let second = recognizer.start(RecognitionConfig::default()).unwrap();

        assert_eq!(first.outcome().await, RecognitionOutcome::Ended);
        feed.deliver(RecognitionOutcome::Error("no-speech".into()));
        assert_eq!(second.outcome().await, RecognitionOutcome::Error("no-speech".into()));
    }
}
