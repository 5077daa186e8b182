//! Local speech through an `espeak-ng` compatible command.

use super::{SpeechProvider, SpeechRequest};
use crate::error::{VoiceAlertError, VoiceAlertResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Words per minute at rate 1.0
const BASE_WPM: f32 = 175.0;

/// Speaks by running a speech synthesizer command per utterance.
///
/// The text goes to the child's stdin; voice, speed, pitch and amplitude are
/// passed as `-v`, `-s`, `-p` and `-a` flags.
#[derive(Debug)]
pub struct CommandSpeechProvider {
    program: String,
    base_args: Vec<String>,
    cancel_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl CommandSpeechProvider {
    /// Provider running `program`
    #[must_use]
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            cancel_tx: Mutex::new(None),
        }
    }

    /// Provider running `espeak-ng` from `PATH`
    #[must_use]
    pub fn espeak() -> Self {
        Self::new("espeak-ng")
    }

    /// Arguments placed before the generated flags
    #[must_use]
    pub fn with_base_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Program this provider runs
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Flags derived from a request, without the base arguments
    #[must_use]
    pub fn speech_args(request: &SpeechRequest) -> Vec<String> {
        #[allow(clippy::cast_possible_truncation)]
        let wpm = (BASE_WPM * request.rate).round().clamp(80.0, 450.0) as i32;
        #[allow(clippy::cast_possible_truncation)]
        let pitch = (request.pitch * 50.0).round().clamp(0.0, 99.0) as i32;
        #[allow(clippy::cast_possible_truncation)]
        let amplitude = (request.volume * 100.0).round().clamp(0.0, 200.0) as i32;

        let mut args = Vec::with_capacity(9);
        if !request.voice.is_empty() {
            args.push("-v".to_string());
            args.push(request.voice.clone());
        }
        args.extend([
            "-s".to_string(),
            wpm.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
            "--stdin".to_string(),
        ]);
        args
    }
}

impl Default for CommandSpeechProvider {
    fn default() -> Self {
        Self::espeak()
    }
}

#[async_trait]
impl SpeechProvider for CommandSpeechProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn speak(&self, request: &SpeechRequest) -> VoiceAlertResult<()> {
        let mut child = Command::new(&self.program)
            .args(&self.base_args)
            .args(Self::speech_args(request))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                VoiceAlertError::synthesis(format!("Failed to start {}: {e}", self.program))
            })?;

        let (tx, rx) = oneshot::channel();
        *self.cancel_tx.lock() = Some(tx);

        if let Some(mut stdin) = child.stdin.take() {
            // A child that exits without reading its input is not an error here
            if let Err(e) = stdin.write_all(request.text.as_bytes()).await {
                debug!("Speech command closed stdin early: {e}");
            }
        }

        let outcome = tokio::select! {
            status = child.wait() => Some(status),
            _ = rx => None,
        };
        self.cancel_tx.lock().take();

        match outcome {
            Some(Ok(status)) if status.success() => Ok(()),
            Some(Ok(status)) => Err(VoiceAlertError::synthesis(format!(
                "{} exited with {status}",
                self.program
            ))),
            Some(Err(e)) => Err(VoiceAlertError::synthesis(format!(
                "Failed to wait for {}: {e}",
                self.program
            ))),
            None => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill speech command: {e}");
                }
                Err(VoiceAlertError::cancelled("Speech cancelled"))
            }
        }
    }

    fn cancel(&self) {
        if let Some(tx) = self.cancel_tx.lock().take() {
            let _ = tx.send(());
        }
    }
}
