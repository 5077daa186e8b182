//! Cloud text-to-speech: Google Cloud, Azure Speech and ElevenLabs.
//!
//! Audio comes back whole and is played through the shared audio context.

use super::{SpeechProvider, SpeechRequest};
use crate::audio_device::{apply_fades, decode_pcm16, decode_wav, AudioContext, AudioData};
use crate::config::{CloudConfig, VoiceConfig, VoiceProvider};
use crate::error::{VoiceAlertError, VoiceAlertResult};
use async_trait::async_trait;
use base64::Engine as _;
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info};

const GOOGLE_BASE_URL: &str = "https://texttospeech.googleapis.com";
const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
const AZURE_DEFAULT_VOICE: &str = "en-US-JennyNeural";
const ELEVENLABS_DEFAULT_VOICE: &str = "21m00Tcm4TlvDq8ikWAM";

/// Sample rate requested from ElevenLabs
const ELEVENLABS_SAMPLE_RATE: u32 = 24_000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleRequest<'a> {
    input: GoogleInput<'a>,
    voice: GoogleVoice<'a>,
    audio_config: GoogleAudioConfig,
}

#[derive(Serialize)]
struct GoogleInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleVoice<'a> {
    language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleAudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
    pitch: f32,
    sample_rate_hertz: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleResponse {
    audio_content: String,
}

#[derive(Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[derive(Debug, Clone, Default)]
struct CloudSettings {
    backend: VoiceProvider,
    cloud: CloudConfig,
}

/// Speaks through one of the cloud TTS services.
///
/// The backend and credentials come from the last `configure` call.
#[derive(Debug)]
pub struct CloudSpeechProvider {
    client: Client,
    context: Arc<AudioContext>,
    settings: RwLock<CloudSettings>,
    cancel_signal: Notify,
}

impl CloudSpeechProvider {
    /// Provider playing through `context`
    #[must_use]
    pub fn new(context: Arc<AudioContext>) -> Self {
        Self {
            client: Client::new(),
            context,
            settings: RwLock::new(CloudSettings::default()),
            cancel_signal: Notify::new(),
        }
    }

    /// Provider already configured for `backend`
    #[must_use]
    pub fn with_backend(
        context: Arc<AudioContext>,
        backend: VoiceProvider,
        cloud: CloudConfig,
    ) -> Self {
        let provider = Self::new(context);
        *provider.settings.write() = CloudSettings { backend, cloud };
        provider
    }

    /// Backend currently selected
    #[must_use]
    pub fn backend(&self) -> VoiceProvider {
        self.settings.read().backend
    }

    /// Fetch audio for `request` without playing it
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the backend is local or has no API key,
    /// otherwise network, timeout or provider errors.
    pub async fn synthesize(&self, request: &SpeechRequest) -> VoiceAlertResult<(AudioData, u32)> {
        let settings = self.settings.read().clone();
        let key = settings
            .cloud
            .api_key(settings.backend)
            .ok_or_else(|| {
                VoiceAlertError::configuration(format!(
                    "No API key configured for {}",
                    settings.backend
                ))
            })?
            .to_string();
        let timeout = Duration::from_secs(settings.cloud.timeout_secs.max(1));

        debug!(
            "Requesting {} chars of speech from {}",
            request.text.len(),
            settings.backend
        );

        match settings.backend {
            VoiceProvider::Local => Err(VoiceAlertError::configuration(
                "Cloud provider used with the local backend selected",
            )),
            VoiceProvider::GoogleCloud => self.google(&settings.cloud, &key, timeout, request).await,
            VoiceProvider::Azure => self.azure(&settings.cloud, &key, timeout, request).await,
            VoiceProvider::ElevenLabs => {
                self.elevenlabs(&settings.cloud, &key, timeout, request).await
            }
        }
    }

    async fn google(
        &self,
        cloud: &CloudConfig,
        key: &str,
        timeout: Duration,
        request: &SpeechRequest,
    ) -> VoiceAlertResult<(AudioData, u32)> {
        let base = cloud.endpoint.as_deref().unwrap_or(GOOGLE_BASE_URL);
        let url = format!("{}/v1/text:synthesize", base.trim_end_matches('/'));
        let body = GoogleRequest {
            input: GoogleInput {
                text: &request.text,
            },
            voice: GoogleVoice {
                language_code: &request.language,
                name: Some(request.voice.as_str()).filter(|v| !v.is_empty()),
            },
            audio_config: GoogleAudioConfig {
                audio_encoding: "LINEAR16",
                speaking_rate: request.rate.clamp(0.25, 4.0),
                // Semitones, -20 to 20, centred on pitch 1.0
                pitch: ((request.pitch - 1.0) * 20.0).clamp(-20.0, 20.0),
                sample_rate_hertz: crate::DEFAULT_SAMPLE_RATE,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;
        let response = check_status("Google Cloud TTS", response).await?;
        let payload: GoogleResponse = response.json().await?;
        let wav = base64::engine::general_purpose::STANDARD.decode(payload.audio_content)?;
        decode_wav(&wav)
    }

    async fn azure(
        &self,
        cloud: &CloudConfig,
        key: &str,
        timeout: Duration,
        request: &SpeechRequest,
    ) -> VoiceAlertResult<(AudioData, u32)> {
        let url = match cloud.endpoint.as_deref() {
            Some(base) => format!("{}/cognitiveservices/v1", base.trim_end_matches('/')),
            None => format!(
                "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
                cloud.azure_region
            ),
        };

        let response = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", "riff-24khz-16bit-mono-pcm")
            .header("User-Agent", "dispatch-voice")
            .timeout(timeout)
            .body(azure_ssml(request))
            .send()
            .await?;
        let response = check_status("Azure Speech", response).await?;
        let bytes = response.bytes().await?;
        decode_wav(&bytes)
    }

    async fn elevenlabs(
        &self,
        cloud: &CloudConfig,
        key: &str,
        timeout: Duration,
        request: &SpeechRequest,
    ) -> VoiceAlertResult<(AudioData, u32)> {
        let base = cloud.endpoint.as_deref().unwrap_or(ELEVENLABS_BASE_URL);
        let voice = if request.voice.is_empty() {
            ELEVENLABS_DEFAULT_VOICE
        } else {
            request.voice.as_str()
        };
        let url = format!(
            "{}/v1/text-to-speech/{voice}/stream?output_format=pcm_{ELEVENLABS_SAMPLE_RATE}",
            base.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", key)
            .timeout(timeout)
            .json(&ElevenLabsRequest {
                text: &request.text,
                model_id: &cloud.elevenlabs_model,
            })
            .send()
            .await?;
        let response = check_status("ElevenLabs", response).await?;
        let bytes = response.bytes().await?;

        let samples = decode_pcm16(&bytes);
        if samples.is_empty() {
            return Err(VoiceAlertError::provider("ElevenLabs returned no audio"));
        }
        Ok((samples, ELEVENLABS_SAMPLE_RATE))
    }
}

#[async_trait]
impl SpeechProvider for CloudSpeechProvider {
    fn name(&self) -> &'static str {
        "cloud"
    }

    async fn speak(&self, request: &SpeechRequest) -> VoiceAlertResult<()> {
        let cancelled = self.cancel_signal.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();

        let (mut samples, sample_rate) = tokio::select! {
            audio = self.synthesize(request) => audio?,
            () = &mut cancelled => return Err(VoiceAlertError::cancelled("Cloud request cancelled")),
        };

        apply_fades(&mut samples, sample_rate, request.fade_in, request.fade_out);
        let sink = self.context.sink()?;
        sink.play(&samples, sample_rate, request.volume).await
    }

    fn cancel(&self) {
        self.cancel_signal.notify_waiters();
        self.context.stop();
    }

    fn configure(&self, config: &VoiceConfig) {
        let mut settings = self.settings.write();
        if settings.backend != config.provider {
            info!("Speech backend set to {}", config.provider);
        }
        *settings = CloudSettings {
            backend: config.provider,
            cloud: config.cloud.clone(),
        };
    }
}

async fn check_status(
    service: &str,
    response: reqwest::Response,
) -> VoiceAlertResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(VoiceAlertError::provider(format!("{service} returned {status}: {body}")))
}

fn azure_ssml(request: &SpeechRequest) -> String {
    let voice = if request.voice.is_empty() {
        AZURE_DEFAULT_VOICE
    } else {
        request.voice.as_str()
    };
    #[allow(clippy::cast_possible_truncation)]
    let rate = ((request.rate - 1.0) * 100.0).round() as i32;
    #[allow(clippy::cast_possible_truncation)]
    let pitch = ((request.pitch - 1.0) * 50.0).round() as i32;

    format!(
        "<speak version='1.0' xml:lang='{lang}'><voice name='{voice}'>\
         <prosody rate='{rate:+}%' pitch='{pitch:+}%'>{text}</prosody></voice></speak>",
        lang = escape_xml(&request.language),
        voice = escape_xml(voice),
        text = escape_xml(&request.text),
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
