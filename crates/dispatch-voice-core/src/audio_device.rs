//! Audio output: the sink abstraction, the default output device and the
//! lazily created shared audio context.

use crate::error::{VoiceAlertError, VoiceAlertResult};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info};

/// Audio data type - 32-bit floating point samples
pub type AudioData = Vec<f32>;

/// Length of the smart-volume fade ramps
pub const FADE_DURATION: Duration = Duration::from_millis(20);

/// Playback state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Audio is stopped
    Stopped,
    /// Audio is currently playing
    Playing,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => write!(f, "Stopped"),
            Self::Playing => write!(f, "Playing"),
        }
    }
}

/// Destination for rendered audio
#[async_trait]
pub trait AudioSink: Send + Sync + std::fmt::Debug {
    /// Play mono samples and resolve when playback ends
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` when `stop` interrupts playback, or a device
    /// error.
    async fn play(&self, samples: &[f32], sample_rate: u32, volume: f32) -> VoiceAlertResult<()>;

    /// Stop whatever is playing, immediately
    fn stop(&self);
}

/// Simulated output device.
///
/// Occupies real time for the duration of each buffer and tracks playback
/// state without producing sound. Builds with the `native-audio` feature
/// play through the speakers with `NativeAudioSink` instead.
#[derive(Debug)]
pub struct AudioDevice {
    state: Arc<RwLock<PlaybackState>>,
    stop_signal: Arc<Notify>,
    frames_played: Arc<AtomicU64>,
}

impl AudioDevice {
    /// Create a simulated device
    #[must_use]
    pub fn new() -> Self {
        debug!("Opening simulated audio device");

        Self {
            state: Arc::new(RwLock::new(PlaybackState::Stopped)),
            stop_signal: Arc::new(Notify::new()),
            frames_played: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get current playback state
    #[must_use]
    pub fn get_state(&self) -> PlaybackState {
        *self.state.read()
    }

    /// Check if audio is currently playing
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.get_state() == PlaybackState::Playing
    }

    /// Frames played to completion since the device was opened
    #[must_use]
    pub fn frames_played(&self) -> u64 {
        self.frames_played.load(Ordering::Relaxed)
    }
}

impl Default for AudioDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSink for AudioDevice {
    async fn play(&self, samples: &[f32], sample_rate: u32, volume: f32) -> VoiceAlertResult<()> {
        if samples.is_empty() {
            return Err(VoiceAlertError::invalid_input("Audio data cannot be empty"));
        }
        if sample_rate == 0 {
            return Err(VoiceAlertError::invalid_input("Sample rate must be greater than 0"));
        }

        debug!("Playing {} samples at {} Hz, volume {:.2}", samples.len(), sample_rate, volume);

        // Register interest before flipping state so a racing stop() is seen
        let stopped = self.stop_signal.notified();
        tokio::pin!(stopped);
        stopped.as_mut().enable();
        *self.state.write() = PlaybackState::Playing;

        #[allow(clippy::cast_precision_loss)]
        let duration = Duration::from_secs_f64(samples.len() as f64 / f64::from(sample_rate));

        let result = tokio::select! {
            () = tokio::time::sleep(duration) => {
                self.frames_played.fetch_add(samples.len() as u64, Ordering::Relaxed);
                Ok(())
            }
            () = &mut stopped => Err(VoiceAlertError::cancelled("Audio playback stopped")),
        };

        *self.state.write() = PlaybackState::Stopped;
        result
    }

    fn stop(&self) {
        self.stop_signal.notify_waiters();
        *self.state.write() = PlaybackState::Stopped;
    }
}

/// Builds the shared sink on first use
pub type SinkFactory = Arc<dyn Fn() -> VoiceAlertResult<Arc<dyn AudioSink>> + Send + Sync>;

/// Process-wide audio output, created lazily.
///
/// Nothing is opened until the first cue or cloud clip needs it. A failed
/// construction is retried on the next use.
pub struct AudioContext {
    factory: SinkFactory,
    sink: OnceCell<Arc<dyn AudioSink>>,
}

impl AudioContext {
    /// Context that builds its sink with `factory`
    #[must_use]
    pub fn new(factory: SinkFactory) -> Self {
        Self {
            factory,
            sink: OnceCell::new(),
        }
    }

    /// Context backed by the default `AudioDevice`
    #[must_use]
    pub fn with_default_device() -> Self {
        Self::new(Arc::new(|| Ok(Arc::new(AudioDevice::new()) as Arc<dyn AudioSink>)))
    }

    /// Context that opens the speakers on first use
    ///
    /// `device_name` selects an output device by name; `None` uses the
    /// system default.
    #[cfg(feature = "native-audio")]
    #[must_use]
    pub fn with_native_output(device_name: Option<String>) -> Self {
        Self::new(Arc::new(move || {
            crate::native_audio::NativeAudioSink::open(device_name.as_deref())
                .map(|sink| Arc::new(sink) as Arc<dyn AudioSink>)
        }))
    }

    /// Context around an existing sink
    #[must_use]
    pub fn with_sink(sink: Arc<dyn AudioSink>) -> Self {
        Self::new(Arc::new(move || Ok(Arc::clone(&sink))))
    }

    /// The shared sink, creating it on first call
    ///
    /// # Errors
    ///
    /// Returns the factory's error; the next call tries again.
    pub fn sink(&self) -> VoiceAlertResult<Arc<dyn AudioSink>> {
        self.sink
            .get_or_try_init(|| {
                info!("Initializing shared audio context");
                (self.factory)()
            })
            .cloned()
    }

    /// Whether the sink has been created
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.sink.get().is_some()
    }

    /// Stop the sink if it exists; never creates it
    pub fn stop(&self) {
        if let Some(sink) = self.sink.get() {
            sink.stop();
        }
    }
}

impl std::fmt::Debug for AudioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioContext")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

/// Apply linear fade-in and fade-out ramps in place
pub fn apply_fades(samples: &mut [f32], sample_rate: u32, fade_in: bool, fade_out: bool) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let ramp = ((f64::from(sample_rate) * FADE_DURATION.as_secs_f64()) as usize)
        .min(samples.len() / 2)
        .max(1);

    #[allow(clippy::cast_precision_loss)]
    let gain = |i: usize| i as f32 / ramp as f32;

    if fade_in {
        for (i, sample) in samples.iter_mut().take(ramp).enumerate() {
            *sample *= gain(i);
        }
    }
    if fade_out {
        for (i, sample) in samples.iter_mut().rev().take(ramp).enumerate() {
            *sample *= gain(i);
        }
    }
}

/// Decode a RIFF/WAV buffer to mono samples and its sample rate
///
/// Multi-channel audio is averaged down to one channel.
///
/// # Errors
///
/// Returns a provider error for malformed or empty WAV data.
#[allow(clippy::cast_precision_loss)]
pub fn decode_wav(bytes: &[u8]) -> VoiceAlertResult<(AudioData, u32)> {
    let reader = hound::WavReader::new(std::io::Cursor::new(bytes))?;
    let spec = reader.spec();
    debug!(
        "Decoding WAV: {} Hz, {} channels, {} bit {:?}",
        spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
    );

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << spec.bits_per_sample.saturating_sub(1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let mono: AudioData = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    if mono.is_empty() {
        return Err(VoiceAlertError::provider("WAV data contains no samples"));
    }
    Ok((mono, spec.sample_rate))
}

/// Decode raw little-endian signed 16-bit mono PCM
///
/// A trailing odd byte is ignored.
#[must_use]
pub fn decode_pcm16(bytes: &[u8]) -> AudioData {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32_768.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn wav_bytes(channels: u16, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_wav_mono() {
        let bytes = wav_bytes(1, &[0, 16_384, -32_768]);
        let (samples, rate) = decode_wav(&bytes).unwrap();
        assert_eq!(rate, 16_000);
        assert_eq!(samples, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn test_decode_wav_downmixes_stereo() {
        let bytes = wav_bytes(2, &[16_384, 0, -16_384, -16_384]);
        let (samples, _) = decode_wav(&bytes).unwrap();
        assert_eq!(samples, vec![0.25, -0.5]);
    }

    #[test]
    fn test_decode_wav_rejects_garbage() {
        assert!(decode_wav(b"not a wav file").is_err());
        assert!(decode_wav(&wav_bytes(1, &[])).is_err());
    }

    #[test]
    fn test_decode_pcm16() {
        let bytes = [0x00, 0x40, 0x00, 0x80, 0xff];
        assert_eq!(decode_pcm16(&bytes), vec![0.5, -1.0]);
    }

    #[test]
    fn test_playback_state_display() {
        assert_eq!(PlaybackState::Stopped.to_string(), "Stopped");
        assert_eq!(PlaybackState::Playing.to_string(), "Playing");
    }

    #[tokio::test(start_paused = true)]
    async fn test_audio_device_play() {
        let device = AudioDevice::new();
        let samples = vec![0.1; 2400];

        device.play(&samples, 24_000, 1.0).await.expect("Should play");
        assert_eq!(device.frames_played(), 2400);
        assert!(!device.is_playing());
    }

    #[tokio::test]
    async fn test_audio_device_play_empty() {
        let device = AudioDevice::new();
        assert!(device.play(&[], 24_000, 1.0).await.is_err());
        assert!(device.play(&[0.1], 0, 1.0).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_audio_device_stop_interrupts() {
        let device = Arc::new(AudioDevice::new());
        let samples = vec![0.0; 24_000 * 10];

        let playing = {
            let device = Arc::clone(&device);
            tokio::spawn(async move { device.play(&samples, 24_000, 1.0).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(device.is_playing());

        device.stop();
        let result = playing.await.unwrap();
        assert!(matches!(result, Err(VoiceAlertError::Cancelled { .. })));
        assert_eq!(device.get_state(), PlaybackState::Stopped);
        assert_eq!(device.frames_played(), 0);
    }

    #[test]
    fn test_context_is_lazy() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let context = AudioContext::new(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(AudioDevice::new()) as Arc<dyn AudioSink>)
        }));

        context.stop();
        assert!(!context.is_initialized());
        assert_eq!(created.load(Ordering::SeqCst), 0);

        context.sink().unwrap();
        context.sink().unwrap();
        assert!(context.is_initialized());
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_context_retries_failed_init() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let context = AudioContext::new(Arc::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(VoiceAlertError::audio_device("no output"))
            } else {
                Ok(Arc::new(AudioDevice::new()) as Arc<dyn AudioSink>)
            }
        }));

        assert!(context.sink().is_err());
        assert!(!context.is_initialized());
        assert!(context.sink().is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[cfg(feature = "native-audio")]
    #[test]
    fn test_native_output_opens_lazily() {
        let context = AudioContext::with_native_output(Some("no-such-output-device".to_string()));
        context.stop();
        assert!(!context.is_initialized());

        assert!(matches!(context.sink(), Err(VoiceAlertError::AudioDeviceError { .. })));
        assert!(!context.is_initialized());
    }

    #[test]
    fn test_apply_fades() {
        let mut samples = vec![1.0; 4800];
        apply_fades(&mut samples, 24_000, true, true);

        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[4799], 0.0);
        assert_eq!(samples[2400], 1.0);
        assert!(samples[240] > 0.4 && samples[240] < 0.6);
    }

    #[test]
    fn test_apply_fades_disabled() {
        let mut samples = vec![1.0; 100];
        apply_fades(&mut samples, 24_000, false, false);
        assert!(samples.iter().all(|&s| s == 1.0));
    }
}
