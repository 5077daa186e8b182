//! Tone synthesizer for the short cues played before announcements.
//!
//! Cues are rendered from an oscillator and a gain envelope: a 10 ms linear
//! attack followed by an exponential decay that reaches near silence at the
//! end of the tone. Failures never reach the caller; a cue that cannot play
//! is logged and treated as finished.

use crate::alert::{AlertType, Priority};
use crate::audio_device::{AudioContext, AudioData};
use crate::config::SoundEffectsConfig;
use crate::error::VoiceAlertResult;
use parking_lot::RwLock;
use std::f32::consts::PI;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Attack time of every tone
pub const ATTACK: Duration = Duration::from_millis(10);

/// Gain the decay reaches at the end of a tone
pub const DECAY_FLOOR: f32 = 0.01;

/// Oscillator shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Pure sine
    #[default]
    Sine,
    /// Square wave
    Square,
    /// Rising sawtooth
    Sawtooth,
    /// Triangle wave
    Triangle,
}

impl Waveform {
    /// Oscillator value at `phase` cycles (fractional part used)
    #[must_use]
    pub fn sample(self, phase: f32) -> f32 {
        let p = phase.fract();
        match self {
            Self::Sine => (2.0 * PI * p).sin(),
            Self::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Self::Sawtooth => 2.0 * p - 1.0,
            Self::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
        }
    }
}

/// One step of a tone sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Frequency in Hz
    pub frequency: f32,
    /// Tone length
    pub duration: Duration,
    /// Silence before the tone starts
    pub delay_before: Duration,
    /// Oscillator shape
    pub waveform: Waveform,
}

impl Tone {
    /// Sine tone with no leading delay
    #[must_use]
    pub const fn new(frequency: f32, duration_ms: u64) -> Self {
        Self {
            frequency,
            duration: Duration::from_millis(duration_ms),
            delay_before: Duration::ZERO,
            waveform: Waveform::Sine,
        }
    }

    /// Wait `delay_ms` before this tone
    #[must_use]
    pub const fn after(mut self, delay_ms: u64) -> Self {
        self.delay_before = Duration::from_millis(delay_ms);
        self
    }

    /// Use a different oscillator shape
    #[must_use]
    pub const fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }
}

/// Named cue patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TonePattern {
    /// Single tone
    Info,
    /// Two descending tones
    Warning,
    /// Three alternating tones
    Critical,
    /// Three ascending tones
    Success,
    /// Two descending low tones
    Error,
    /// Two identical short beeps
    Notification,
    /// Four alternating high tones
    Bolo,
    /// Five rapid alternating tones, highest pitch
    Panic,
}

impl TonePattern {
    /// All patterns
    pub const ALL: [Self; 8] = [
        Self::Info,
        Self::Warning,
        Self::Critical,
        Self::Success,
        Self::Error,
        Self::Notification,
        Self::Bolo,
        Self::Panic,
    ];

    /// Pattern by name; unknown names fall back to `Info`
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "warning" => Self::Warning,
            "critical" => Self::Critical,
            "success" => Self::Success,
            "error" => Self::Error,
            "notification" => Self::Notification,
            "bolo" | "bolo-hit" => Self::Bolo,
            "panic" => Self::Panic,
            _ => Self::Info,
        }
    }

    /// Cue played before an alert
    #[must_use]
    pub const fn for_alert(alert_type: AlertType, priority: Priority) -> Self {
        match (alert_type, priority) {
            (AlertType::Panic, _) => Self::Panic,
            (AlertType::Bolo, _) => Self::Bolo,
            (_, Priority::Critical) => Self::Critical,
            (_, Priority::High) => Self::Warning,
            _ => Self::Notification,
        }
    }

    /// Tone sequence for this pattern
    #[must_use]
    pub fn tones(self) -> Vec<Tone> {
        match self {
            Self::Info => vec![Tone::new(800.0, 200)],
            Self::Warning => vec![Tone::new(1000.0, 150), Tone::new(800.0, 150).after(50)],
            Self::Critical => vec![
                Tone::new(1200.0, 150),
                Tone::new(900.0, 150).after(50),
                Tone::new(1200.0, 150).after(50),
            ],
            Self::Success => vec![
                Tone::new(523.25, 100),
                Tone::new(659.25, 100).after(30),
                Tone::new(783.99, 150).after(30),
            ],
            Self::Error => vec![Tone::new(400.0, 200), Tone::new(300.0, 300).after(50)],
            Self::Notification => vec![Tone::new(880.0, 100), Tone::new(880.0, 100).after(100)],
            Self::Bolo => vec![
                Tone::new(1500.0, 120),
                Tone::new(1100.0, 120).after(40),
                Tone::new(1500.0, 120).after(40),
                Tone::new(1100.0, 120).after(40),
            ],
            Self::Panic => {
                let hi = Tone::new(1800.0, 80).with_waveform(Waveform::Square);
                let lo = Tone::new(1400.0, 80).with_waveform(Waveform::Square);
                vec![hi, lo.after(20), hi.after(20), lo.after(20), hi.after(20)]
            }
        }
    }

    /// Total time the pattern occupies, delays included
    #[must_use]
    pub fn total_duration(self) -> Duration {
        self.tones()
            .iter()
            .map(|t| t.delay_before + t.duration)
            .sum()
    }
}

/// Envelope gain at `t` seconds into a tone of `duration` seconds
fn envelope(t: f32, duration: f32) -> f32 {
    let attack = ATTACK.as_secs_f32().min(duration);
    if t < attack {
        return t / attack;
    }
    let decay = (duration - attack).max(f32::EPSILON);
    let progress = ((t - attack) / decay).clamp(0.0, 1.0);
    // Exponential ramp from 1.0 down to DECAY_FLOOR
    DECAY_FLOOR.powf(progress)
}

/// Render one tone at unit amplitude
#[must_use]
pub fn render_tone(
    frequency: f32,
    duration: Duration,
    waveform: Waveform,
    sample_rate: u32,
) -> AudioData {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let frames = (duration.as_secs_f64() * f64::from(sample_rate)).round() as usize;
    #[allow(clippy::cast_precision_loss)]
    let rate = sample_rate as f32;
    let total = duration.as_secs_f32();

    (0..frames)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f32 / rate;
            waveform.sample(frequency * t) * envelope(t, total)
        })
        .collect()
}

/// Plays cues through the shared audio context
#[derive(Debug)]
pub struct ToneSynthesizer {
    context: Arc<AudioContext>,
    settings: RwLock<SoundEffectsConfig>,
    sample_rate: u32,
}

impl ToneSynthesizer {
    /// Synthesizer drawing on `context`
    #[must_use]
    pub fn new(context: Arc<AudioContext>, settings: SoundEffectsConfig) -> Self {
        Self {
            context,
            settings: RwLock::new(settings),
            sample_rate: crate::DEFAULT_SAMPLE_RATE,
        }
    }

    /// Replace the `{enabled, volume}` gate
    pub fn set_settings(&self, settings: SoundEffectsConfig) {
        *self.settings.write() = settings;
    }

    /// Current gate
    #[must_use]
    pub fn settings(&self) -> SoundEffectsConfig {
        self.settings.read().clone()
    }

    /// Play one tone; resolves when it ends
    pub async fn play_tone(&self, frequency: f32, duration: Duration, waveform: Waveform) {
        let settings = self.settings();
        if !settings.enabled {
            return;
        }
        if let Err(e) = self.render_and_play(frequency, duration, waveform, settings.volume).await {
            if e.is_cancellation() {
                debug!("Tone cancelled");
            } else {
                warn!("Tone playback failed: {e}");
            }
        }
    }

    /// Play tones in order, honouring each leading delay
    pub async fn play_sequence(&self, tones: &[Tone]) {
        for tone in tones {
            let settings = self.settings();
            if !settings.enabled {
                return;
            }
            if !tone.delay_before.is_zero() {
                tokio::time::sleep(tone.delay_before).await;
            }
            match self
                .render_and_play(tone.frequency, tone.duration, tone.waveform, settings.volume)
                .await
            {
                Ok(()) => {}
                Err(e) if e.is_cancellation() => {
                    debug!("Tone sequence cancelled");
                    return;
                }
                Err(e) => warn!("Tone playback failed, continuing sequence: {e}"),
            }
        }
    }

    /// Play a named pattern
    pub async fn play(&self, pattern: TonePattern) {
        debug!("Playing {:?} cue", pattern);
        self.play_sequence(&pattern.tones()).await;
    }

    /// Play a pattern by name, falling back to `Info`
    pub async fn play_named(&self, name: &str) {
        self.play(TonePattern::from_name(name)).await;
    }

    /// Silence the current cue
    pub fn stop(&self) {
        self.context.stop();
    }

    async fn render_and_play(
        &self,
        frequency: f32,
        duration: Duration,
        waveform: Waveform,
        volume: f32,
    ) -> VoiceAlertResult<()> {
        let sink = self.context.sink()?;
        let samples = render_tone(frequency, duration, waveform, self.sample_rate);
        if samples.is_empty() {
            return Ok(());
        }
        sink.play(&samples, self.sample_rate, volume).await
    }
}
