//! Alert data model: priorities, alert types, departments and the
//! announcements that flow through the queue.

use crate::error::{VoiceAlertError, VoiceAlertResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Announcement priority, totally ordered with `Critical` highest
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Routine information
    Low,
    /// Default priority
    #[default]
    Normal,
    /// Needs attention soon
    High,
    /// Life safety; jumps the queue and interrupts speech
    Critical,
}

impl Priority {
    /// All priorities from lowest to highest
    pub const ALL: [Self; 4] = [Self::Low, Self::Normal, Self::High, Self::Critical];

    /// Lowercase name used in logs and storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = VoiceAlertError;

    fn from_str(s: &str) -> VoiceAlertResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" | "medium" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(VoiceAlertError::invalid_input(format!(
                "Unknown priority '{other}'"
            ))),
        }
    }
}

/// Category of an announcement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    /// Calls for service
    Call,
    /// Be-on-the-lookout hits
    Bolo,
    /// Officer panic buttons
    Panic,
    /// Unit status changes
    Status,
    /// Administrative notices
    Admin,
    /// Everything else
    #[default]
    Notification,
}

impl AlertType {
    /// All alert types
    pub const ALL: [Self; 6] = [
        Self::Call,
        Self::Bolo,
        Self::Panic,
        Self::Status,
        Self::Admin,
        Self::Notification,
    ];

    /// Lowercase name used in logs and storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Bolo => "bolo",
            Self::Panic => "panic",
            Self::Status => "status",
            Self::Admin => "admin",
            Self::Notification => "notification",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = VoiceAlertError;

    fn from_str(s: &str) -> VoiceAlertResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VoiceAlertError::invalid_input(format!("Unknown alert type '{s}'")))
    }
}

/// Department tag used for voice profile selection
///
/// Deserializes with the same rules as `FromStr`, so `"police"` and `"LEO"`
/// are accepted alongside `"POLICE"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Department {
    /// Law enforcement
    Police,
    /// Fire and rescue
    Fire,
    /// Emergency medical services
    Ems,
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Police => write!(f, "POLICE"),
            Self::Fire => write!(f, "FIRE"),
            Self::Ems => write!(f, "EMS"),
        }
    }
}

impl FromStr for Department {
    type Err = VoiceAlertError;

    fn from_str(s: &str) -> VoiceAlertResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POLICE" | "LEO" => Ok(Self::Police),
            "FIRE" => Ok(Self::Fire),
            "EMS" | "MEDICAL" => Ok(Self::Ems),
            other => Err(VoiceAlertError::invalid_input(format!(
                "Unknown department '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for Department {
    type Error = VoiceAlertError;

    fn try_from(value: String) -> VoiceAlertResult<Self> {
        value.parse()
    }
}

/// Options accepted by `speak`
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakOptions {
    /// Queue priority
    pub priority: Priority,
    /// Alert category, drives the tone pattern
    pub alert_type: AlertType,
    /// Play the tone pattern before speaking
    pub sound_effect: bool,
    /// Department tag for voice profile selection
    pub department: Option<Department>,
    /// Free-form metadata carried with the alert
    pub metadata: Option<serde_json::Value>,
    /// Bypass mute and queue ordering
    pub supervisor_override: bool,
    /// Incident correlation id
    pub incident_id: Option<String>,
}

impl Default for SpeakOptions {
    fn default() -> Self {
        Self {
            priority: Priority::Normal,
            alert_type: AlertType::Notification,
            sound_effect: true,
            department: None,
            metadata: None,
            supervisor_override: false,
            incident_id: None,
        }
    }
}

impl SpeakOptions {
    /// Options with the given priority and type
    #[must_use]
    pub fn new(priority: Priority, alert_type: AlertType) -> Self {
        Self {
            priority,
            alert_type,
            ..Self::default()
        }
    }

    /// Set the department tag
    #[must_use]
    pub fn with_department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    /// Attach metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach an incident correlation id
    #[must_use]
    pub fn with_incident<S: Into<String>>(mut self, incident_id: S) -> Self {
        self.incident_id = Some(incident_id.into());
        self
    }

    /// Mark as a supervisor override
    #[must_use]
    pub fn with_supervisor_override(mut self) -> Self {
        self.supervisor_override = true;
        self
    }

    /// Enable or disable the tone before speech
    #[must_use]
    pub fn with_sound_effect(mut self, enabled: bool) -> Self {
        self.sound_effect = enabled;
        self
    }
}

/// One announcement waiting in, or consumed from, the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceAlert {
    /// Unique identifier
    pub id: Uuid,
    /// Text to speak
    pub text: String,
    /// Alert category
    pub alert_type: AlertType,
    /// Queue priority
    pub priority: Priority,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Department tag
    pub department: Option<Department>,
    /// Free-form metadata
    pub metadata: Option<serde_json::Value>,
    /// Incident correlation id
    pub incident_id: Option<String>,
    /// Supervisor override flag
    pub supervisor_override: bool,
    /// Whether skip and critical preemption may cut this alert off
    pub skippable: bool,
    /// Play the tone pattern before speaking
    pub sound_effect: bool,
}

impl VoiceAlert {
    /// Build an alert from text and options
    #[must_use]
    pub fn new<S: Into<String>>(text: S, options: SpeakOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            alert_type: options.alert_type,
            priority: options.priority,
            created_at: Utc::now(),
            department: options.department,
            metadata: options.metadata,
            incident_id: options.incident_id,
            supervisor_override: options.supervisor_override,
            skippable: !options.supervisor_override,
            sound_effect: options.sound_effect,
        }
    }
}

/// Record of one consumed announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEntry {
    /// When the announcement finished
    pub timestamp: DateTime<Utc>,
    /// Alert category
    pub alert_type: AlertType,
    /// Wall-clock time from dequeue to end of speech
    pub duration_ms: u64,
    /// True when the announcement played to the end
    pub acknowledged: bool,
}
