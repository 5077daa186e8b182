//! Speech backends.
//!
//! A provider turns one `SpeechRequest` into audible speech and resolves
//! when the utterance ends. `cancel` must silence the current utterance
//! immediately; the pending `speak` then resolves with `Cancelled`.

mod cloud;
mod command;

pub use cloud::CloudSpeechProvider;
pub use command::CommandSpeechProvider;

use crate::config::VoiceConfig;
use crate::error::VoiceAlertResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One utterance to render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Text to speak
    pub text: String,
    /// Engine voice id or name; empty for the provider default
    pub voice: String,
    /// Language tag
    pub language: String,
    /// Speaking rate (1.0 = normal)
    pub rate: f32,
    /// Pitch (1.0 = normal)
    pub pitch: f32,
    /// Volume (0.0 to 1.0)
    pub volume: f32,
    /// Ramp the audio in
    pub fade_in: bool,
    /// Ramp the audio out
    pub fade_out: bool,
}

impl SpeechRequest {
    /// Request with neutral prosody
    #[must_use]
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            voice: String::new(),
            language: "en-US".to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            fade_in: false,
            fade_out: false,
        }
    }
}

/// A speech backend
#[async_trait]
pub trait SpeechProvider: Send + Sync + std::fmt::Debug {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Speak and resolve when the utterance ends
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` after `cancel`, or the backend's failure.
    async fn speak(&self, request: &SpeechRequest) -> VoiceAlertResult<()>;

    /// Silence the current utterance; a no-op when idle
    fn cancel(&self);

    /// Pick up a new configuration
    fn configure(&self, _config: &VoiceConfig) {}
}
