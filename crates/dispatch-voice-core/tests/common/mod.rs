//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dispatch_voice_core::{
    AudioContext, AudioDevice, AudioSink, ConfigStore, SpeechProvider, SpeechRequest,
    VoiceAlertEngine, VoiceAlertError, VoiceAlertResult, VoiceConfigUpdate,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Ordered log of tone and speech events shared by the fixtures
#[derive(Debug, Clone, Default)]
pub struct Timeline(Arc<Mutex<Vec<String>>>);

impl Timeline {
    pub fn push<S: Into<String>>(&self, event: S) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Audio sink that logs each tone to a timeline, playing on a simulated device
#[derive(Debug)]
pub struct TimelineSink {
    device: AudioDevice,
    timeline: Timeline,
}

impl TimelineSink {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            device: AudioDevice::new(),
            timeline,
        }
    }
}

#[async_trait]
impl AudioSink for TimelineSink {
    async fn play(&self, samples: &[f32], sample_rate: u32, volume: f32) -> VoiceAlertResult<()> {
        self.timeline.push("tone");
        self.device.play(samples, sample_rate, volume).await?;
        self.timeline.push("tone-end");
        Ok(())
    }

    fn stop(&self) {
        self.device.stop();
    }
}

/// Speech provider that records requests and takes a fixed time per utterance
#[derive(Debug)]
pub struct RecordingProvider {
    utterance: Duration,
    fail: bool,
    timeline: Timeline,
    spoken: Mutex<Vec<SpeechRequest>>,
    completed: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    cancel_signal: Notify,
}

struct InFlight {
    counter: Arc<AtomicUsize>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RecordingProvider {
    pub fn new(utterance: Duration) -> Arc<Self> {
        Self::build(utterance, false)
    }

    /// Provider whose every utterance fails
    pub fn failing() -> Arc<Self> {
        Self::build(Duration::ZERO, true)
    }

    fn build(utterance: Duration, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            utterance,
            fail,
            timeline: Timeline::default(),
            spoken: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            cancel_signal: Notify::new(),
        })
    }

    /// Requests in the order speech started
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.spoken.lock().clone()
    }

    /// Texts in the order speech started
    pub fn texts(&self) -> Vec<String> {
        self.spoken.lock().iter().map(|r| r.text.clone()).collect()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Timeline this provider logs `speak:<text>` and `done:<text>` to
    pub fn timeline(&self) -> Timeline {
        self.timeline.clone()
    }
}

#[async_trait]
impl SpeechProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn speak(&self, request: &SpeechRequest) -> VoiceAlertResult<()> {
        let cancelled = self.cancel_signal.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();

        self.spoken.lock().push(request.clone());
        if self.fail {
            return Err(VoiceAlertError::synthesis("Voice engine crashed"));
        }
        self.timeline.push(format!("speak:{}", request.text));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight {
            counter: Arc::clone(&self.in_flight),
        };

        tokio::select! {
            () = tokio::time::sleep(self.utterance) => {
                self.completed.fetch_add(1, Ordering::SeqCst);
                self.timeline.push(format!("done:{}", request.text));
                Ok(())
            }
            () = &mut cancelled => Err(VoiceAlertError::cancelled("Recording cancelled")),
        }
    }

    fn cancel(&self) {
        self.cancel_signal.notify_waiters();
    }
}

/// Engine speaking through `provider` with tone cues off
pub fn engine_with(provider: &Arc<RecordingProvider>) -> VoiceAlertEngine {
    engine_with_store(provider, ConfigStore::in_memory())
}

pub fn engine_with_store(provider: &Arc<RecordingProvider>, store: ConfigStore) -> VoiceAlertEngine {
    let local: Arc<dyn SpeechProvider> = provider.clone();
    let engine = VoiceAlertEngine::builder()
        .store(store)
        .audio_context(Arc::new(AudioContext::with_sink(Arc::new(AudioDevice::new()))))
        .local_provider(local)
        .build();

    let mut effects = engine.config().sound_effects;
    effects.enabled = false;
    engine
        .update_config(&VoiceConfigUpdate {
            sound_effects: Some(effects),
            ..VoiceConfigUpdate::default()
        })
        .unwrap();
    engine
}

/// Engine with tone cues on, logging tones and speech to the provider's timeline
pub fn engine_with_tones(provider: &Arc<RecordingProvider>) -> VoiceAlertEngine {
    let local: Arc<dyn SpeechProvider> = provider.clone();
    let sink = Arc::new(TimelineSink::new(provider.timeline()));
    VoiceAlertEngine::builder()
        .store(ConfigStore::in_memory())
        .audio_context(Arc::new(AudioContext::with_sink(sink)))
        .local_provider(local)
        .build()
}

/// Let the driver pick up work; time is paused in these tests
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
