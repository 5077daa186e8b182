//! Speaker output through cpal.
//!
//! cpal streams cannot leave the thread that built them, so a dedicated
//! audio thread owns the device and plays one buffer at a time. Buffers are
//! resampled to the device rate and copied to every output channel.

use crate::audio_device::AudioSink;
use crate::error::{VoiceAlertError, VoiceAlertResult};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig,
    SupportedStreamConfig,
};
use parking_lot::Mutex;
use rubato::{FftFixedIn, Resampler};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const RESAMPLE_CHUNK: usize = 1024;

struct PlaybackJob {
    samples: Vec<f32>,
    sample_rate: u32,
    volume: f32,
    generation: u64,
    done: oneshot::Sender<VoiceAlertResult<()>>,
}

/// `AudioSink` that plays through an output device
#[derive(Debug)]
pub struct NativeAudioSink {
    jobs: Mutex<mpsc::Sender<PlaybackJob>>,
    // Bumped by stop(); jobs from an older generation end at once
    generation: Arc<AtomicU64>,
}

impl NativeAudioSink {
    /// Open the system default output device
    ///
    /// # Errors
    ///
    /// Returns `AudioDeviceError` when there is no usable output device.
    pub fn open_default() -> VoiceAlertResult<Self> {
        Self::open(None)
    }

    /// Open the output device whose name contains `device_name`, or the
    /// default device when `None`
    ///
    /// # Errors
    ///
    /// Returns `AudioDeviceError` when the device is missing or cannot
    /// report an output configuration.
    pub fn open(device_name: Option<&str>) -> VoiceAlertResult<Self> {
        let (job_tx, job_rx) = mpsc::channel::<PlaybackJob>();
        let (ready_tx, ready_rx) = mpsc::channel::<VoiceAlertResult<()>>();
        let generation = Arc::new(AtomicU64::new(0));
        let worker_generation = Arc::clone(&generation);
        let device_name = device_name.map(str::to_owned);

        std::thread::Builder::new()
            .name("dispatch-voice-audio".to_string())
            .spawn(move || match OutputDevice::open(device_name.as_deref()) {
                Ok(output) => {
                    let _ = ready_tx.send(Ok(()));
                    output.run(&job_rx, &worker_generation);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })?;

        ready_rx
            .recv()
            .map_err(|_| VoiceAlertError::audio_device("Audio thread exited during startup"))??;

        Ok(Self {
            jobs: Mutex::new(job_tx),
            generation,
        })
    }
}

#[async_trait]
impl AudioSink for NativeAudioSink {
    async fn play(&self, samples: &[f32], sample_rate: u32, volume: f32) -> VoiceAlertResult<()> {
        if samples.is_empty() {
            return Err(VoiceAlertError::invalid_input("Audio data cannot be empty"));
        }
        if sample_rate == 0 {
            return Err(VoiceAlertError::invalid_input("Sample rate must be greater than 0"));
        }

        let (done, finished) = oneshot::channel();
        let job = PlaybackJob {
            samples: samples.to_vec(),
            sample_rate,
            volume,
            generation: self.generation.load(Ordering::SeqCst),
            done,
        };
        self.jobs
            .lock()
            .send(job)
            .map_err(|_| VoiceAlertError::audio_device("Audio thread has stopped"))?;

        finished
            .await
            .map_err(|_| VoiceAlertError::audio_device("Audio thread dropped a playback"))?
    }

    fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

struct OutputDevice {
    device: Device,
    config: SupportedStreamConfig,
}

impl OutputDevice {
    fn open(device_name: Option<&str>) -> VoiceAlertResult<Self> {
        let host = cpal::default_host();
        let device = match device_name {
            None => host.default_output_device(),
            Some(wanted) => host
                .output_devices()
                .map_err(|e| VoiceAlertError::audio_device(format!("Cannot list output devices: {e}")))?
                .find(|d| d.name().is_ok_and(|name| name.contains(wanted))),
        }
        .ok_or_else(|| VoiceAlertError::audio_device("No output device available"))?;

        let config = device
            .default_output_config()
            .map_err(|e| VoiceAlertError::audio_device(format!("Failed to read output config: {e}")))?;

        info!(
            "Opened output device '{}' at {} Hz, {} channels",
            device.name().unwrap_or_default(),
            config.sample_rate().0,
            config.channels()
        );
        Ok(Self { device, config })
    }

    fn run(&self, jobs: &mpsc::Receiver<PlaybackJob>, generation: &AtomicU64) {
        while let Ok(job) = jobs.recv() {
            let result = if generation.load(Ordering::SeqCst) == job.generation {
                self.play(&job, generation)
            } else {
                Err(VoiceAlertError::cancelled("Audio playback stopped"))
            };
            if job.done.send(result).is_err() {
                debug!("Playback ended after its caller went away");
            }
        }
        debug!("Audio thread exiting");
    }

    fn play(&self, job: &PlaybackJob, generation: &AtomicU64) -> VoiceAlertResult<()> {
        let native_rate = self.config.sample_rate().0;
        let channels = usize::from(self.config.channels());

        let mut samples = resample(&job.samples, job.sample_rate, native_rate)?;
        for sample in &mut samples {
            *sample *= job.volume;
        }
        let samples = Arc::new(expand_to_channels(&samples, channels));
        let finished = Arc::new(AtomicBool::new(false));

        let config: StreamConfig = self.config.clone().into();
        let stream = match self.config.sample_format() {
            SampleFormat::F32 => self.build_stream::<f32>(&config, samples, Arc::clone(&finished)),
            SampleFormat::I16 => self.build_stream::<i16>(&config, samples, Arc::clone(&finished)),
            SampleFormat::U16 => self.build_stream::<u16>(&config, samples, Arc::clone(&finished)),
            format => Err(VoiceAlertError::audio_device(format!(
                "Unsupported sample format {format:?}"
            ))),
        }?;
        stream
            .play()
            .map_err(|e| VoiceAlertError::audio_device(format!("Failed to start playback: {e}")))?;

        // Dropping the stream on return silences the device
        while !finished.load(Ordering::SeqCst) {
            if generation.load(Ordering::SeqCst) != job.generation {
                return Err(VoiceAlertError::cancelled("Audio playback stopped"));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        Ok(())
    }

    fn build_stream<T>(
        &self,
        config: &StreamConfig,
        samples: Arc<Vec<f32>>,
        finished: Arc<AtomicBool>,
    ) -> VoiceAlertResult<Stream>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let position = AtomicUsize::new(0);
        self.device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let pos = position.load(Ordering::SeqCst);
                    let remaining = samples.len().saturating_sub(pos);
                    if remaining == 0 {
                        data.fill(T::EQUILIBRIUM);
                        finished.store(true, Ordering::SeqCst);
                        return;
                    }

                    let to_copy = remaining.min(data.len());
                    for (out, &sample) in data.iter_mut().zip(&samples[pos..pos + to_copy]) {
                        *out = T::from_sample(sample);
                    }
                    data[to_copy..].fill(T::EQUILIBRIUM);
                    position.store(pos + to_copy, Ordering::SeqCst);
                },
                |err| error!("Output stream error: {err}"),
                None,
            )
            .map_err(|e| VoiceAlertError::audio_device(format!("Failed to build output stream: {e}")))
    }
}

fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> VoiceAlertResult<Vec<f32>> {
    if source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        RESAMPLE_CHUNK,
        2,
        1,
    )
    .map_err(|e| VoiceAlertError::audio_device(format!("Failed to create resampler: {e}")))?;

    let mut output = Vec::new();
    let mut pos = 0;
    while pos < samples.len() {
        let frames_needed = resampler.input_frames_next();
        let end = (pos + frames_needed).min(samples.len());

        let mut chunk = samples[pos..end].to_vec();
        chunk.resize(frames_needed, 0.0);
        let resampled = resampler
            .process(std::slice::from_ref(&chunk), None)
            .map_err(|e| VoiceAlertError::audio_device(format!("Resampling failed: {e}")))?;
        if let Some(channel) = resampled.into_iter().next() {
            output.extend(channel);
        }
        pos = end;
    }
    Ok(output)
}

fn expand_to_channels(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .iter()
        .flat_map(|&sample| std::iter::repeat(sample).take(channels))
        .collect()
}
