//! Error types for the dispatch voice alert engine.

/// Result type alias for voice alert operations
pub type VoiceAlertResult<T> = Result<T, VoiceAlertError>;

/// Main error type for voice alert operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceAlertError {
    /// Speech synthesis failed
    #[error("Speech synthesis failed: {message}")]
    SynthesisError {
        /// Error message describing the failure
        message: String,
    },

    /// Audio output error
    #[error("Audio device error: {message}")]
    AudioDeviceError {
        /// Error message describing the device issue
        message: String,
    },

    /// A speech provider rejected or failed the request
    #[error("Speech provider error: {message}")]
    ProviderError {
        /// Error message describing the provider failure
        message: String,
    },

    /// Network error talking to a cloud provider
    #[error("Network error: {message}")]
    NetworkError {
        /// Error message describing the network issue
        message: String,
    },

    /// Persistent storage error
    #[error("Storage error: {message}")]
    StorageError {
        /// Error message describing the storage failure
        message: String,
    },

    /// Configuration error (missing API key, bad provider setup)
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Invalid input error
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Error message describing the invalid input
        message: String,
    },

    /// Custom template key not found
    #[error("Template '{key}' not found")]
    TemplateNotFound {
        /// The template key that was requested
        key: String,
    },

    /// Preset not found
    #[error("Preset '{id}' not found")]
    PresetNotFound {
        /// The preset id that was requested
        id: String,
    },

    /// The utterance was cancelled before it finished
    #[error("Cancelled: {message}")]
    Cancelled {
        /// What was cancelled
        message: String,
    },

    /// Timeout error
    #[error("Operation timed out: {message}")]
    TimeoutError {
        /// Error message describing the timeout
        message: String,
    },
}

impl VoiceAlertError {
    /// Create a new synthesis error
    #[must_use]
    pub fn synthesis<S: Into<String>>(message: S) -> Self {
        Self::SynthesisError {
            message: message.into(),
        }
    }

    /// Create a new audio device error
    #[must_use]
    pub fn audio_device<S: Into<String>>(message: S) -> Self {
        Self::AudioDeviceError {
            message: message.into(),
        }
    }

    /// Create a new provider error
    #[must_use]
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::ProviderError {
            message: message.into(),
        }
    }

    /// Create a new network error
    #[must_use]
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Create a new storage error
    #[must_use]
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::StorageError {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a new invalid input error
    #[must_use]
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new template not found error
    #[must_use]
    pub fn template_not_found<S: Into<String>>(key: S) -> Self {
        Self::TemplateNotFound { key: key.into() }
    }

    /// Create a new preset not found error
    #[must_use]
    pub fn preset_not_found<S: Into<String>>(id: S) -> Self {
        Self::PresetNotFound { id: id.into() }
    }

    /// Create a new cancellation error
    #[must_use]
    pub fn cancelled<S: Into<String>>(message: S) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    #[must_use]
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::TimeoutError {
            message: message.into(),
        }
    }

    /// Check if this error is retriable
    ///
    /// The speech driver never retries an alert; this is for collaborators
    /// that call providers directly.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::NetworkError { .. } | Self::TimeoutError { .. })
    }

    /// Check if this error is due to invalid caller input
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::TemplateNotFound { .. }
                | Self::PresetNotFound { .. }
                | Self::ConfigurationError { .. }
        )
    }

    /// Check if this error only reports a cancellation
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Get the error category for logging
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::SynthesisError { .. } => "synthesis",
            Self::AudioDeviceError { .. } => "audio_device",
            Self::ProviderError { .. } => "provider",
            Self::NetworkError { .. } => "network",
            Self::StorageError { .. } => "storage",
            Self::ConfigurationError { .. } => "configuration",
            Self::InvalidInput { .. } => "input",
            Self::TemplateNotFound { .. } => "template",
            Self::PresetNotFound { .. } => "preset",
            Self::Cancelled { .. } => "cancelled",
            Self::TimeoutError { .. } => "timeout",
        }
    }
}

// Convert from common error types
impl From<std::io::Error> for VoiceAlertError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for VoiceAlertError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Self::timeout(format!("Operation timed out: {err}"))
    }
}

impl From<serde_json::Error> for VoiceAlertError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(format!("JSON serialization error: {err}"))
    }
}

impl From<reqwest::Error> for VoiceAlertError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<base64::DecodeError> for VoiceAlertError {
    fn from(err: base64::DecodeError) -> Self {
        Self::provider(format!("Invalid base64 audio: {err}"))
    }
}

impl From<hound::Error> for VoiceAlertError {
    fn from(err: hound::Error) -> Self {
        Self::provider(format!("Invalid WAV audio: {err}"))
    }
}
