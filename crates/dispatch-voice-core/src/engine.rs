//! The voice alert engine.
//!
//! One engine owns the active configuration, the pending queue, the
//! utterance being spoken and the analytics history. A single driver task
//! consumes the queue: it takes the head, plays the alert's tone, speaks the
//! text and records the outcome, so at most one utterance is ever audible.
//!
//! All state lives behind short synchronous locks. Anything read before a
//! suspension point is checked again afterwards; in particular an alert
//! that was skipped or stopped while its tone played is never spoken.

use crate::alert::{AnalyticsEntry, Priority, SpeakOptions, VoiceAlert};
use crate::analytics::{AnalyticsLog, AnalyticsSummary};
use crate::audio_device::AudioContext;
use crate::config::{AlertSwitch, VoiceConfig, VoiceConfigUpdate};
use crate::error::{VoiceAlertError, VoiceAlertResult};
use crate::preset::{PresetLibrary, VoicePreset};
use crate::provider::{CloudSpeechProvider, CommandSpeechProvider, SpeechProvider, SpeechRequest};
use crate::queue::AlertQueue;
use crate::shortcuts::{ShortcutAction, ShortcutTable};
use crate::store::ConfigStore;
use crate::tone::{TonePattern, ToneSynthesizer};
use crate::voice_manager::{preferred_voice_name, resolve_voice, VoiceCatalog, VoiceManager};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Sentence spoken by `test_voice`
pub const TEST_SENTENCE: &str =
    "This is a test of the dispatch voice alert system. Voice alerts are working.";

#[derive(Debug)]
struct ActiveUtterance {
    alert: VoiceAlert,
    cancel: Arc<Notify>,
    started: Instant,
}

#[derive(Debug, Default)]
struct EngineState {
    queue: AlertQueue,
    active: Option<ActiveUtterance>,
    analytics: AnalyticsLog,
    closed: bool,
}

impl EngineState {
    /// End the active utterance early; the driver's own completion is then
    /// ignored
    fn cancel_active(&mut self, record: bool) -> Option<VoiceAlert> {
        let active = self.active.take()?;
        active.cancel.notify_one();
        if record {
            self.analytics.record(entry_for(&active, false));
        }
        Some(active.alert)
    }
}

fn entry_for(active: &ActiveUtterance, acknowledged: bool) -> AnalyticsEntry {
    let elapsed = active.started.elapsed();
    AnalyticsEntry {
        timestamp: Utc::now(),
        alert_type: active.alert.alert_type,
        duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        acknowledged,
    }
}

#[derive(Debug)]
enum Outcome {
    Completed,
    Cancelled,
    Failed(VoiceAlertError),
}

impl From<VoiceAlertResult<()>> for Outcome {
    fn from(result: VoiceAlertResult<()>) -> Self {
        match result {
            Ok(()) => Self::Completed,
            Err(e) if e.is_cancellation() => Self::Cancelled,
            Err(e) => Self::Failed(e),
        }
    }
}

#[derive(Debug)]
struct Inner {
    config: RwLock<VoiceConfig>,
    state: Mutex<EngineState>,
    presets: Mutex<PresetLibrary>,
    wake: Notify,
    idle: Notify,
    store: ConfigStore,
    audio: Arc<AudioContext>,
    tones: ToneSynthesizer,
    local: Arc<dyn SpeechProvider>,
    cloud: Arc<dyn SpeechProvider>,
    catalog: Arc<dyn VoiceCatalog>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

/// Builder for `VoiceAlertEngine`
#[derive(Debug, Default)]
pub struct VoiceAlertEngineBuilder {
    store: Option<ConfigStore>,
    audio: Option<Arc<AudioContext>>,
    local: Option<Arc<dyn SpeechProvider>>,
    cloud: Option<Arc<dyn SpeechProvider>>,
    catalog: Option<Arc<dyn VoiceCatalog>>,
}

impl VoiceAlertEngineBuilder {
    /// Persist config and presets in `store` (default: in memory)
    #[must_use]
    pub fn store(mut self, store: ConfigStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Shared audio output (default: the built-in device)
    #[must_use]
    pub fn audio_context(mut self, audio: Arc<AudioContext>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Local speech backend (default: `espeak-ng`)
    #[must_use]
    pub fn local_provider(mut self, provider: Arc<dyn SpeechProvider>) -> Self {
        self.local = Some(provider);
        self
    }

    /// Cloud speech backend (default: `CloudSpeechProvider`)
    #[must_use]
    pub fn cloud_provider(mut self, provider: Arc<dyn SpeechProvider>) -> Self {
        self.cloud = Some(provider);
        self
    }

    /// Voice catalog (default: the built-in voices)
    #[must_use]
    pub fn voice_catalog(mut self, catalog: Arc<dyn VoiceCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Load persisted state and start the driver task
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn build(self) -> VoiceAlertEngine {
        let store = self.store.unwrap_or_else(ConfigStore::in_memory);
        let audio = self
            .audio
            .unwrap_or_else(|| Arc::new(AudioContext::with_default_device()));
        let local = self
            .local
            .unwrap_or_else(|| Arc::new(CommandSpeechProvider::espeak()));
        let cloud = self
            .cloud
            .unwrap_or_else(|| Arc::new(CloudSpeechProvider::new(Arc::clone(&audio))));
        let catalog = self.catalog.unwrap_or_else(|| Arc::new(VoiceManager::new()));

        let config = store.load_config();
        let presets = store.load_presets();
        local.configure(&config);
        cloud.configure(&config);

        info!(
            "Starting voice alert engine: provider {}, {} presets",
            config.provider,
            presets.len()
        );

        let inner = Arc::new(Inner {
            tones: ToneSynthesizer::new(Arc::clone(&audio), config.sound_effects.clone()),
            config: RwLock::new(config),
            state: Mutex::new(EngineState::default()),
            presets: Mutex::new(PresetLibrary::new(presets)),
            wake: Notify::new(),
            idle: Notify::new(),
            store,
            audio,
            local,
            cloud,
            catalog,
            driver: Mutex::new(None),
        });

        let handle = tokio::spawn(run_driver(Arc::clone(&inner)));
        *inner.driver.lock() = Some(handle);

        VoiceAlertEngine { inner }
    }
}

/// Handle to a running engine; clones share the same engine
#[derive(Debug, Clone)]
pub struct VoiceAlertEngine {
    inner: Arc<Inner>,
}

impl VoiceAlertEngine {
    /// Start configuring an engine
    #[must_use]
    pub fn builder() -> VoiceAlertEngineBuilder {
        VoiceAlertEngineBuilder::default()
    }

    /// Queue an announcement
    ///
    /// Returns the alert id, or `None` when the alert was dropped: blank
    /// text, a muted engine the alert may not bypass, or a shut down engine.
    /// A critical alert interrupts the current utterance, including another
    /// critical one, unless that utterance is a supervisor override.
    pub fn speak<S: Into<String>>(&self, text: S, options: SpeakOptions) -> Option<Uuid> {
        let text = text.into();
        if text.trim().is_empty() {
            debug!("Ignoring blank announcement");
            return None;
        }

        let record = {
            let config = self.inner.config.read();
            if !config.enabled
                && !(options.supervisor_override && config.supervisor_override.bypass_mute)
            {
                debug!("Voice alerts disabled, dropping announcement");
                return None;
            }
            config.analytics.enabled
        };

        let alert = VoiceAlert::new(text, options);
        let id = alert.id;
        let priority = alert.priority;
        {
            let mut state = self.inner.state.lock();
            if state.closed {
                debug!("Engine shut down, dropping announcement");
                return None;
            }

            let position = state.queue.push(alert);
            debug!("Queued {} alert {} at position {}", priority, id, position);

            let interrupt = priority == Priority::Critical
                && state.active.as_ref().is_some_and(|a| a.alert.skippable);
            if interrupt {
                if let Some(cut) = state.cancel_active(record) {
                    info!("Critical alert {} interrupts alert {}", id, cut.id);
                    self.inner.silence();
                }
            }
        }

        self.inner.wake.notify_one();
        Some(id)
    }

    /// Cancel the current utterance if it is skippable
    ///
    /// Returns whether anything was skipped.
    pub fn skip_current(&self) -> bool {
        let record = self.inner.config.read().analytics.enabled;
        let mut state = self.inner.state.lock();
        if !state.active.as_ref().is_some_and(|a| a.alert.skippable) {
            return false;
        }
        if let Some(alert) = state.cancel_active(record) {
            debug!("Skipped alert {}", alert.id);
            self.inner.silence();
        }
        true
    }

    /// Drop every pending alert; the current utterance continues
    ///
    /// Returns how many alerts were dropped.
    pub fn clear_queue(&self) -> usize {
        let dropped = self.inner.state.lock().queue.clear();
        if dropped > 0 {
            debug!("Cleared {} pending alerts", dropped);
        }
        dropped
    }

    /// Clear the queue and silence the current utterance, skippable or not
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Flip the master switch; turning it off stops speech
    ///
    /// Returns the new state.
    pub fn toggle(&self) -> bool {
        let enabled = {
            let mut config = self.inner.config.write();
            config.enabled = !config.enabled;
            config.enabled
        };
        info!("Voice alerts {}", if enabled { "enabled" } else { "disabled" });
        if !enabled {
            self.inner.stop();
        }
        self.inner.sync_config();
        enabled
    }

    /// Speak the diagnostic sentence
    pub fn test_voice(&self) -> Option<Uuid> {
        self.speak(TEST_SENTENCE, SpeakOptions::default())
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> VoiceConfig {
        self.inner.config.read().clone()
    }

    /// Whether a per-alert-type switch is on
    #[must_use]
    pub fn alert_type_enabled(&self, switch: AlertSwitch) -> bool {
        self.inner.config.read().alert_types.is_enabled(switch)
    }

    /// Apply a partial update, validate, activate and persist it
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for out-of-range values; the active config is
    /// left untouched. A failed save is logged, not returned.
    pub fn update_config(&self, update: &VoiceConfigUpdate) -> VoiceAlertResult<VoiceConfig> {
        let (was_enabled, updated) = {
            let mut config = self.inner.config.write();
            let mut candidate = config.clone();
            update.apply_to(&mut candidate);
            candidate.validate()?;
            let was_enabled = config.enabled;
            *config = candidate.clone();
            (was_enabled, candidate)
        };

        if was_enabled && !updated.enabled {
            self.inner.stop();
        }
        self.inner.sync_config();
        Ok(updated)
    }

    /// Pending alerts in play order
    #[must_use]
    pub fn queue_snapshot(&self) -> Vec<VoiceAlert> {
        self.inner.state.lock().queue.snapshot()
    }

    /// Number of pending alerts
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Whether an utterance is in progress
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.inner.state.lock().active.is_some()
    }

    /// The alert being spoken
    #[must_use]
    pub fn current_alert(&self) -> Option<VoiceAlert> {
        self.inner
            .state
            .lock()
            .active
            .as_ref()
            .map(|a| a.alert.clone())
    }

    /// Resolve once nothing is queued or speaking
    pub async fn wait_until_idle(&self) {
        loop {
            let idle = self.inner.idle.notified();
            tokio::pin!(idle);
            idle.as_mut().enable();
            {
                let state = self.inner.state.lock();
                if state.closed || (state.queue.is_empty() && state.active.is_none()) {
                    return;
                }
            }
            idle.await;
        }
    }

    /// Save the active config as a named preset
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank name.
    pub fn save_preset(&self, name: &str) -> VoiceAlertResult<VoicePreset> {
        let preset = VoicePreset::capture(name.trim(), &self.config());
        let mut presets = self.inner.presets.lock();
        presets.insert(preset.clone())?;
        self.inner.persist_presets(presets.all());
        info!("Saved voice preset '{}'", preset.name);
        Ok(preset)
    }

    /// Apply a preset's settings over the active config
    ///
    /// # Errors
    ///
    /// Returns `PresetNotFound` for an unknown id, or `InvalidInput` if the
    /// preset holds out-of-range values.
    pub fn load_preset(&self, id: &str) -> VoiceAlertResult<VoiceConfig> {
        let update = self.inner.presets.lock().get(id)?.config.clone();
        let config = self.update_config(&update)?;
        info!("Loaded voice preset {}", id);
        Ok(config)
    }

    /// Saved presets, oldest first
    #[must_use]
    pub fn presets(&self) -> Vec<VoicePreset> {
        self.inner.presets.lock().all().to_vec()
    }

    /// Delete a preset
    ///
    /// # Errors
    ///
    /// Returns `PresetNotFound` for an unknown id.
    pub fn delete_preset(&self, id: &str) -> VoiceAlertResult<()> {
        let mut presets = self.inner.presets.lock();
        let removed = presets.remove(id)?;
        self.inner.persist_presets(presets.all());
        info!("Deleted voice preset '{}'", removed.name);
        Ok(())
    }

    /// Retained analytics entries, oldest first
    #[must_use]
    pub fn analytics(&self) -> Vec<AnalyticsEntry> {
        self.inner.state.lock().analytics.entries()
    }

    /// Aggregates over the retained analytics
    #[must_use]
    pub fn analytics_summary(&self) -> AnalyticsSummary {
        self.inner.state.lock().analytics.summary()
    }

    /// Run the action bound to `chord`, if shortcuts are on
    pub fn handle_shortcut(&self, chord: &str) -> Option<ShortcutAction> {
        let table = {
            let config = self.inner.config.read();
            if !config.keyboard_shortcuts.enabled {
                return None;
            }
            ShortcutTable::from_config(&config.keyboard_shortcuts)
        };

        let action = table.resolve(chord)?;
        debug!("Shortcut {} -> {:?}", chord, action);
        match action {
            ShortcutAction::ToggleMute => {
                self.toggle();
            }
            ShortcutAction::SkipCurrent => {
                self.skip_current();
            }
            ShortcutAction::TestVoice => {
                self.test_voice();
            }
            ShortcutAction::ClearQueue => {
                self.clear_queue();
            }
        }
        Some(action)
    }

    /// Stop audio, clear the queue and end the driver task
    pub async fn shutdown(&self) {
        self.inner.stop();
        self.inner.state.lock().closed = true;
        self.inner.wake.notify_one();

        let handle = self.inner.driver.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Voice alert driver ended abnormally: {e}");
            }
            info!("Voice alert engine shut down");
        }
    }
}

impl Inner {
    /// Silence every audio primitive; called with the state lock held
    fn silence(&self) {
        self.local.cancel();
        self.cloud.cancel();
        self.audio.stop();
    }

    fn stop(&self) {
        let analytics = self.config.read().analytics.clone();
        let mut state = self.state.lock();
        let dropped = state.queue.clear();
        if state.cancel_active(analytics.enabled).is_some() {
            self.silence();
        }
        if !analytics.retain_history {
            state.analytics.clear();
        }
        debug!("Stopped voice alerts, dropped {} pending", dropped);
    }

    /// Push the active config to collaborators and storage
    fn sync_config(&self) {
        let config = self.config.read().clone();
        self.local.configure(&config);
        self.cloud.configure(&config);
        self.tones.set_settings(config.sound_effects.clone());
        if let Err(e) = self.store.save_config(&config) {
            warn!("Failed to persist voice config: {e}");
        }
    }

    fn persist_presets(&self, presets: &[VoicePreset]) {
        if let Err(e) = self.store.save_presets(presets) {
            warn!("Failed to persist voice presets: {e}");
        }
    }

    fn is_active(&self, id: Uuid) -> bool {
        self.state
            .lock()
            .active
            .as_ref()
            .is_some_and(|a| a.alert.id == id)
    }

    /// Tone then speech for one alert
    async fn render(&self, alert: &VoiceAlert) -> VoiceAlertResult<()> {
        let config = self.config.read().clone();

        if config.sound_effects.enabled && alert.sound_effect {
            self.tones
                .play(TonePattern::for_alert(alert.alert_type, alert.priority))
                .await;
            if !self.is_active(alert.id) {
                return Err(VoiceAlertError::cancelled("Alert ended during its tone"));
            }
        }

        let provider = if config.provider.is_cloud() {
            if config.cloud.api_key(config.provider).is_none() {
                return Err(VoiceAlertError::configuration(format!(
                    "No API key configured for {}",
                    config.provider
                )));
            }
            &self.cloud
        } else {
            &self.local
        };

        let request = speech_request(&config, alert, self.catalog.as_ref());
        debug!(
            "Speaking alert {} via {} with voice '{}'",
            alert.id,
            provider.name(),
            request.voice
        );
        provider.speak(&request).await
    }

    /// Record the end of an utterance unless it was already cancelled
    fn finish(&self, id: Uuid, outcome: Outcome) {
        let analytics_enabled = self.config.read().analytics.enabled;
        let mut state = self.state.lock();
        let active = match state.active.take() {
            Some(active) if active.alert.id == id => active,
            other => {
                state.active = other;
                debug!("Alert {} already ended", id);
                return;
            }
        };

        match outcome {
            Outcome::Completed => {
                debug!("Alert {} completed", id);
                if analytics_enabled {
                    state.analytics.record(entry_for(&active, true));
                }
            }
            Outcome::Cancelled => {
                debug!("Alert {} cancelled", id);
                if analytics_enabled {
                    state.analytics.record(entry_for(&active, false));
                }
            }
            Outcome::Failed(e @ VoiceAlertError::ConfigurationError { .. }) => {
                warn!("Skipping alert {}: {e}", id);
            }
            Outcome::Failed(e) => {
                error!("Alert {} failed ({}): {e}", id, e.category());
            }
        }
    }
}

/// Prosody and voice for one alert
fn speech_request(
    config: &VoiceConfig,
    alert: &VoiceAlert,
    catalog: &dyn VoiceCatalog,
) -> SpeechRequest {
    let department = alert
        .department
        .and_then(|d| config.department_overrides.get(d));

    let rate = department.and_then(|o| o.rate).unwrap_or(config.rate);
    let pitch = department.and_then(|o| o.pitch).unwrap_or(config.pitch);
    let base_volume = department.and_then(|o| o.volume).unwrap_or(config.volume);
    let volume = if alert.supervisor_override && config.supervisor_override.force_volume {
        1.0
    } else {
        (base_volume * config.smart_volume.priority_factor(alert.priority)).clamp(0.0, 1.0)
    };

    let preferred = preferred_voice_name(config, alert.department);
    let voice = if config.provider.is_cloud() {
        preferred
    } else {
        resolve_voice(&catalog.list_available_voices(), &preferred, &config.language)
            .map(|v| v.id)
            .unwrap_or_default()
    };

    SpeechRequest {
        text: alert.text.clone(),
        voice,
        language: config.language.clone(),
        rate,
        pitch,
        volume,
        fade_in: config.smart_volume.fade_in,
        fade_out: config.smart_volume.fade_out,
    }
}

async fn run_driver(inner: Arc<Inner>) {
    debug!("Voice alert driver started");
    loop {
        let next = {
            let mut state = inner.state.lock();
            if state.closed {
                break;
            }
            match state.queue.pop_front() {
                Some(alert) => {
                    let cancel = Arc::new(Notify::new());
                    state.active = Some(ActiveUtterance {
                        alert: alert.clone(),
                        cancel: Arc::clone(&cancel),
                        started: Instant::now(),
                    });
                    Some((alert, cancel))
                }
                None => None,
            }
        };

        let Some((alert, cancel)) = next else {
            inner.idle.notify_waiters();
            inner.wake.notified().await;
            continue;
        };

        debug!("Speaking {} {} alert {}", alert.priority, alert.alert_type, alert.id);
        let outcome = tokio::select! {
            biased;
            () = cancel.notified() => Outcome::Cancelled,
            result = inner.render(&alert) => Outcome::from(result),
        };
        inner.finish(alert.id, outcome);
    }
    inner.idle.notify_waiters();
    debug!("Voice alert driver stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertType, Department};
    use crate::config::{DepartmentOverride, VoiceProvider};
    use crate::voice_manager::{Gender, Voice};

    fn alert(options: SpeakOptions) -> VoiceAlert {
        VoiceAlert::new("Unit 4 on scene", options)
    }

    #[test]
    fn test_request_uses_priority_volume_factor() {
        let config = VoiceConfig::default();
        let catalog = VoiceManager::new();

        let low = alert(SpeakOptions::new(Priority::Low, AlertType::Status));
        let high = alert(SpeakOptions::new(Priority::High, AlertType::Call));
        let low = speech_request(&config, &low, &catalog);
        let high = speech_request(&config, &high, &catalog);
        assert!((low.volume - 0.8 * 0.7).abs() < 1e-6);
        assert!((high.volume - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_request_supervisor_forces_full_volume() {
        let config = VoiceConfig::default();
        let request = speech_request(
            &config,
            &alert(SpeakOptions::new(Priority::Low, AlertType::Admin).with_supervisor_override()),
            &VoiceManager::new(),
        );
        assert_eq!(request.volume, 1.0);
    }

    #[test]
    fn test_request_applies_department_override() {
        let mut config = VoiceConfig::default();
        config.department_overrides.ems = Some(DepartmentOverride {
            voice: Some("Sarah".to_string()),
            rate: Some(1.4),
            pitch: None,
            volume: Some(0.5),
        });

        let options =
            SpeakOptions::new(Priority::High, AlertType::Call).with_department(Department::Ems);
        let request = speech_request(&config, &alert(options), &VoiceManager::new());
        assert_eq!(request.rate, 1.4);
        assert_eq!(request.pitch, 1.0);
        assert!((request.volume - 0.5).abs() < 1e-6);
        assert_eq!(request.voice, "en-us+f2");
    }

    #[test]
    fn test_request_resolves_local_voice_and_passes_cloud_name() {
        let mut config = VoiceConfig::default();
        config.voice = "Nobody".to_string();
        config.language = "en-GB".to_string();
        let catalog = VoiceManager::with_voices(vec![
            Voice::new("us", "Alex", "en-US", Gender::Male),
            Voice::new("gb", "Kate", "en-GB", Gender::Female),
        ]);

        let options = SpeakOptions::default();
        assert_eq!(speech_request(&config, &alert(options.clone()), &catalog).voice, "us");

        config.provider = VoiceProvider::Azure;
        assert_eq!(speech_request(&config, &alert(options), &catalog).voice, "Nobody");
    }

    #[tokio::test]
    async fn test_muted_engine_drops_alerts_unless_override() {
        let engine = VoiceAlertEngine::builder().build();
        engine
            .update_config(&VoiceConfigUpdate::enabled(false))
            .unwrap();

        assert!(engine.speak("routine", SpeakOptions::default()).is_none());
        assert!(engine
            .speak("hold all traffic", SpeakOptions::default().with_supervisor_override())
            .is_some());
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_blank_text_and_shutdown_drop() {
        let engine = VoiceAlertEngine::builder().build();
        assert!(engine.speak("   ", SpeakOptions::default()).is_none());

        engine.shutdown().await;
        assert!(engine.speak("late", SpeakOptions::default()).is_none());
        engine.wait_until_idle().await;
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_config() {
        let engine = VoiceAlertEngine::builder().build();
        let err = engine.update_config(&VoiceConfigUpdate::volume(3.0)).unwrap_err();
        assert!(err.is_user_error());
        assert_eq!(engine.config().volume, VoiceConfig::default().volume);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_toggle_flips_and_persists() {
        let store = ConfigStore::in_memory();
        let engine = VoiceAlertEngine::builder().store(store.clone()).build();

        assert!(!engine.toggle());
        assert!(!store.load_config().enabled);
        assert!(engine.toggle());
        assert!(store.load_config().enabled);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_shortcuts_respect_enabled_flag() {
        let engine = VoiceAlertEngine::builder().build();
        assert_eq!(
            engine.handle_shortcut("ctrl+shift+m"),
            Some(ShortcutAction::ToggleMute)
        );
        assert!(!engine.config().enabled);

        let mut shortcuts = engine.config().keyboard_shortcuts;
        shortcuts.enabled = false;
        engine
            .update_config(&VoiceConfigUpdate {
                keyboard_shortcuts: Some(shortcuts),
                ..VoiceConfigUpdate::default()
            })
            .unwrap();
        assert_eq!(engine.handle_shortcut("ctrl+shift+m"), None);
        assert!(!engine.config().enabled);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_preset_lifecycle() {
        let store = ConfigStore::in_memory();
        let engine = VoiceAlertEngine::builder().store(store.clone()).build();

        engine.update_config(&VoiceConfigUpdate::volume(0.4)).unwrap();
        let preset = engine.save_preset("Quiet").unwrap();
        engine.update_config(&VoiceConfigUpdate::volume(0.9)).unwrap();

        assert_eq!(engine.presets()[0].config.volume, Some(0.4));
        assert_eq!(store.load_presets().len(), 1);

        let config = engine.load_preset(&preset.id).unwrap();
        assert_eq!(config.volume, 0.4);

        engine.delete_preset(&preset.id).unwrap();
        assert!(engine.presets().is_empty());
        assert!(store.load_presets().is_empty());
        assert!(matches!(
            engine.load_preset(&preset.id),
            Err(VoiceAlertError::PresetNotFound { .. })
        ));
        assert!(engine.save_preset(" ").is_err());
        engine.shutdown().await;
    }
}
