//! # Dispatch Voice Core
//!
//! Spoken alerts for emergency dispatch consoles.
//!
//! ## Features
//!
//! - Priority-ordered announcement queue with critical preemption
//! - Tone cues per alert category, rendered in-process
//! - Local speech through an external synthesizer, cloud speech through
//!   Google Cloud, Azure and ElevenLabs
//! - Department voice profiles, presets, analytics and keyboard shortcuts
//! - A named-event bridge for callers without a handle on the engine
//! - Speaker output through cpal with the `native-audio` feature
//!
//! ## Example
//!
//! ```rust,no_run
//! use dispatch_voice_core::{AlertTriggers, ConfigStore, VoiceAlertEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = VoiceAlertEngine::builder()
//!         .store(ConfigStore::in_memory())
//!         .build();
//!     let triggers = AlertTriggers::new(engine.clone());
//!
//!     triggers.announce_new_call("24-1001", "Structure fire", "CRITICAL", "400 Elm St", None);
//!     engine.wait_until_idle().await;
//!     engine.shutdown().await;
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod alert;
pub mod analytics;
pub mod audio_device;
pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
#[cfg(feature = "native-audio")]
pub mod native_audio;
pub mod preset;
pub mod provider;
pub mod queue;
pub mod shortcuts;
pub mod store;
pub mod templates;
pub mod tone;
pub mod triggers;
pub mod voice_manager;

// Re-export main types for convenience
pub use alert::{AlertType, AnalyticsEntry, Department, Priority, SpeakOptions, VoiceAlert};
pub use analytics::{AnalyticsLog, AnalyticsSummary};
pub use audio_device::{AudioContext, AudioData, AudioDevice, AudioSink, PlaybackState};
pub use bridge::{BridgeEvent, EventBridge, Subscription};
pub use config::{AlertSwitch, VoiceConfig, VoiceConfigUpdate, VoiceProvider};
pub use engine::{VoiceAlertEngine, VoiceAlertEngineBuilder};
pub use error::{VoiceAlertError, VoiceAlertResult};
#[cfg(feature = "native-audio")]
pub use native_audio::NativeAudioSink;
pub use preset::{PresetLibrary, VoicePreset};
pub use provider::{CloudSpeechProvider, CommandSpeechProvider, SpeechProvider, SpeechRequest};
pub use queue::AlertQueue;
pub use shortcuts::{KeyChord, ShortcutAction, ShortcutTable};
pub use store::{ConfigStore, FileStore, KeyValueStore, MemoryStore};
pub use tone::{Tone, TonePattern, ToneSynthesizer, Waveform};
pub use triggers::AlertTriggers;
pub use voice_manager::{Gender, Voice, VoiceCatalog, VoiceManager};

/// Version information for the dispatch-voice-core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default sample rate for audio processing (24 kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(DEFAULT_SAMPLE_RATE, 24_000);
    }
}
