//! Voice alert configuration.
//!
//! `VoiceConfig` is the single active configuration of an engine. Every
//! struct here is `#[serde(default)]` so stored configurations written by
//! older or newer builds still load: missing keys take their defaults and
//! unknown keys are ignored.

use crate::alert::{Department, Priority};
use crate::error::{VoiceAlertError, VoiceAlertResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Valid speaking rate range
pub const RATE_RANGE: std::ops::RangeInclusive<f32> = 0.1..=10.0;

/// Valid pitch range
pub const PITCH_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// Valid volume range
pub const VOLUME_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;

/// Speech backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceProvider {
    /// Local speech engine
    #[default]
    Local,
    /// Google Cloud Text-to-Speech
    GoogleCloud,
    /// Azure Cognitive Services Speech
    Azure,
    /// ElevenLabs
    ElevenLabs,
}

impl VoiceProvider {
    /// Whether this provider goes over the network
    #[must_use]
    pub const fn is_cloud(self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl std::fmt::Display for VoiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::GoogleCloud => write!(f, "google_cloud"),
            Self::Azure => write!(f, "azure"),
            Self::ElevenLabs => write!(f, "eleven_labs"),
        }
    }
}

impl std::str::FromStr for VoiceProvider {
    type Err = VoiceAlertError;

    fn from_str(s: &str) -> VoiceAlertResult<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "local" | "browser" | "system" => Ok(Self::Local),
            "google" | "google_cloud" => Ok(Self::GoogleCloud),
            "azure" => Ok(Self::Azure),
            "elevenlabs" | "eleven_labs" => Ok(Self::ElevenLabs),
            other => Err(VoiceAlertError::invalid_input(format!(
                "Unknown provider '{other}'"
            ))),
        }
    }
}

/// Named per-alert-type switches checked by the trigger facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertSwitch {
    /// New calls for service and emergency calls
    NewCalls,
    /// BOLO and stolen vehicle hits
    BoloHits,
    /// Panic buttons
    PanicAlerts,
    /// Unit assignment and movement
    UnitStatus,
    /// Call priority upgrades
    PriorityUpgrades,
    /// Backup requests
    BackupRequests,
    /// Administrative notices
    AdminAlerts,
    /// Generic availability changes
    StatusChanges,
    /// Shift reminders
    ShiftReminders,
}

/// Alert-type enablement map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertTypeToggles {
    /// New calls for service
    pub new_calls: bool,
    /// BOLO hits
    pub bolo_hits: bool,
    /// Panic buttons
    pub panic_alerts: bool,
    /// Unit status
    pub unit_status: bool,
    /// Priority upgrades
    pub priority_upgrades: bool,
    /// Backup requests
    pub backup_requests: bool,
    /// Administrative alerts
    pub admin_alerts: bool,
    /// Generic status changes
    pub status_changes: bool,
    /// Shift reminders
    pub shift_reminders: bool,
}

impl Default for AlertTypeToggles {
    fn default() -> Self {
        Self {
            new_calls: true,
            bolo_hits: true,
            panic_alerts: true,
            unit_status: true,
            priority_upgrades: true,
            backup_requests: true,
            admin_alerts: true,
            status_changes: false,
            shift_reminders: true,
        }
    }
}

impl AlertTypeToggles {
    /// Look up a switch
    #[must_use]
    pub const fn is_enabled(&self, switch: AlertSwitch) -> bool {
        match switch {
            AlertSwitch::NewCalls => self.new_calls,
            AlertSwitch::BoloHits => self.bolo_hits,
            AlertSwitch::PanicAlerts => self.panic_alerts,
            AlertSwitch::UnitStatus => self.unit_status,
            AlertSwitch::PriorityUpgrades => self.priority_upgrades,
            AlertSwitch::BackupRequests => self.backup_requests,
            AlertSwitch::AdminAlerts => self.admin_alerts,
            AlertSwitch::StatusChanges => self.status_changes,
            AlertSwitch::ShiftReminders => self.shift_reminders,
        }
    }

    /// Set a switch
    pub fn set(&mut self, switch: AlertSwitch, enabled: bool) {
        let slot = match switch {
            AlertSwitch::NewCalls => &mut self.new_calls,
            AlertSwitch::BoloHits => &mut self.bolo_hits,
            AlertSwitch::PanicAlerts => &mut self.panic_alerts,
            AlertSwitch::UnitStatus => &mut self.unit_status,
            AlertSwitch::PriorityUpgrades => &mut self.priority_upgrades,
            AlertSwitch::BackupRequests => &mut self.backup_requests,
            AlertSwitch::AdminAlerts => &mut self.admin_alerts,
            AlertSwitch::StatusChanges => &mut self.status_changes,
            AlertSwitch::ShiftReminders => &mut self.shift_reminders,
        };
        *slot = enabled;
    }
}

/// Tone cue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundEffectsConfig {
    /// Play tones before speech
    pub enabled: bool,
    /// Tone volume (0.0 to 1.0)
    pub volume: f32,
}

impl Default for SoundEffectsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.5,
        }
    }
}

/// Context-specific voices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceProfilesConfig {
    /// Use department-specific voices
    pub enabled: bool,
    /// Voice for police and fire calls
    pub call_voice: String,
    /// Voice for EMS
    pub medical_voice: String,
    /// Voice for everything else
    pub admin_voice: String,
}

impl Default for VoiceProfilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            call_voice: "David".to_string(),
            medical_voice: "Sarah".to_string(),
            admin_voice: "Bella".to_string(),
        }
    }
}

/// Analytics capture settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Record an entry per consumed alert
    pub enabled: bool,
    /// Keep entries across `stop` and shutdown
    pub retain_history: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retain_history: true,
        }
    }
}

/// Partial voice settings applied to alerts of one department
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartmentOverride {
    /// Voice name
    pub voice: Option<String>,
    /// Speaking rate
    pub rate: Option<f32>,
    /// Pitch
    pub pitch: Option<f32>,
    /// Volume
    pub volume: Option<f32>,
}

/// Override slots per department
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartmentOverrides {
    /// Police override
    pub police: Option<DepartmentOverride>,
    /// Fire override
    pub fire: Option<DepartmentOverride>,
    /// EMS override
    pub ems: Option<DepartmentOverride>,
}

impl DepartmentOverrides {
    /// Override for a department, if configured
    #[must_use]
    pub const fn get(&self, department: Department) -> Option<&DepartmentOverride> {
        match department {
            Department::Police => self.police.as_ref(),
            Department::Fire => self.fire.as_ref(),
            Department::Ems => self.ems.as_ref(),
        }
    }
}

/// Volume shaping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartVolumeConfig {
    /// Ramp audio in
    pub fade_in: bool,
    /// Ramp audio out
    pub fade_out: bool,
    /// Scale volume by priority
    pub priority_based: bool,
}

impl Default for SmartVolumeConfig {
    fn default() -> Self {
        Self {
            fade_in: false,
            fade_out: false,
            priority_based: true,
        }
    }
}

impl SmartVolumeConfig {
    /// Multiplier applied to the configured volume
    #[must_use]
    pub const fn priority_factor(&self, priority: Priority) -> f32 {
        if !self.priority_based {
            return 1.0;
        }
        match priority {
            Priority::Low => 0.7,
            Priority::Normal => 0.85,
            Priority::High | Priority::Critical => 1.0,
        }
    }
}

/// Chord bindings for operator shortcuts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardShortcuts {
    /// Shortcuts active
    pub enabled: bool,
    /// Toggle mute
    pub toggle_mute: String,
    /// Skip the current announcement
    pub skip_current: String,
    /// Speak the test sentence
    pub test_voice: String,
    /// Drop all pending announcements
    pub clear_queue: String,
}

impl Default for KeyboardShortcuts {
    fn default() -> Self {
        Self {
            enabled: true,
            toggle_mute: "Ctrl+Shift+M".to_string(),
            skip_current: "Ctrl+Shift+S".to_string(),
            test_voice: "Ctrl+Shift+T".to_string(),
            clear_queue: "Ctrl+Shift+C".to_string(),
        }
    }
}

/// Supervisor override behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorOverrideConfig {
    /// Override alerts play even while muted
    pub bypass_mute: bool,
    /// Override alerts play at full volume
    pub force_volume: bool,
}

impl Default for SupervisorOverrideConfig {
    fn default() -> Self {
        Self {
            bypass_mute: true,
            force_volume: true,
        }
    }
}

/// Cloud provider credentials and transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Google Cloud TTS API key
    pub google_api_key: Option<String>,
    /// Azure Speech subscription key
    pub azure_api_key: Option<String>,
    /// Azure region
    pub azure_region: String,
    /// ElevenLabs API key
    pub elevenlabs_api_key: Option<String>,
    /// ElevenLabs model id
    pub elevenlabs_model: String,
    /// Base URL override for all providers
    pub endpoint: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            azure_api_key: None,
            azure_region: "eastus".to_string(),
            elevenlabs_api_key: None,
            elevenlabs_model: "eleven_multilingual_v2".to_string(),
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

impl CloudConfig {
    /// API key for a cloud provider, ignoring blank strings
    #[must_use]
    pub fn api_key(&self, provider: VoiceProvider) -> Option<&str> {
        let key = match provider {
            VoiceProvider::Local => None,
            VoiceProvider::GoogleCloud => self.google_api_key.as_deref(),
            VoiceProvider::Azure => self.azure_api_key.as_deref(),
            VoiceProvider::ElevenLabs => self.elevenlabs_api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }
}

/// The active voice alert configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Master switch
    pub enabled: bool,
    /// Speech backend
    pub provider: VoiceProvider,
    /// Default voice name or id
    pub voice: String,
    /// Preferred language, used for voice fallback
    pub language: String,
    /// Speaking rate (0.1 to 10.0)
    pub rate: f32,
    /// Pitch (0.0 to 2.0)
    pub pitch: f32,
    /// Volume (0.0 to 1.0)
    pub volume: f32,
    /// Per-alert-type switches
    pub alert_types: AlertTypeToggles,
    /// Tone cues
    pub sound_effects: SoundEffectsConfig,
    /// Department voices
    pub voice_profiles: VoiceProfilesConfig,
    /// User templates with `{variable}` placeholders
    pub custom_templates: BTreeMap<String, String>,
    /// Analytics capture
    pub analytics: AnalyticsConfig,
    /// Per-department overrides
    pub department_overrides: DepartmentOverrides,
    /// Volume shaping
    pub smart_volume: SmartVolumeConfig,
    /// Operator shortcuts
    pub keyboard_shortcuts: KeyboardShortcuts,
    /// Supervisor override behaviour
    pub supervisor_override: SupervisorOverrideConfig,
    /// Cloud providers
    pub cloud: CloudConfig,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: VoiceProvider::Local,
            voice: String::new(),
            language: "en-US".to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 0.8,
            alert_types: AlertTypeToggles::default(),
            sound_effects: SoundEffectsConfig::default(),
            voice_profiles: VoiceProfilesConfig::default(),
            custom_templates: BTreeMap::new(),
            analytics: AnalyticsConfig::default(),
            department_overrides: DepartmentOverrides::default(),
            smart_volume: SmartVolumeConfig::default(),
            keyboard_shortcuts: KeyboardShortcuts::default(),
            supervisor_override: SupervisorOverrideConfig::default(),
            cloud: CloudConfig::default(),
        }
    }
}

fn check_range(
    name: &str,
    value: f32,
    range: &std::ops::RangeInclusive<f32>,
) -> VoiceAlertResult<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(VoiceAlertError::invalid_input(format!(
            "{name} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

impl VoiceConfig {
    /// Validate scalar ranges
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first out-of-range value.
    pub fn validate(&self) -> VoiceAlertResult<()> {
        check_range("Rate", self.rate, &RATE_RANGE)?;
        check_range("Pitch", self.pitch, &PITCH_RANGE)?;
        check_range("Volume", self.volume, &VOLUME_RANGE)?;
        check_range("Sound effect volume", self.sound_effects.volume, &VOLUME_RANGE)?;

        let overrides = [
            ("POLICE", &self.department_overrides.police),
            ("FIRE", &self.department_overrides.fire),
            ("EMS", &self.department_overrides.ems),
        ];
        for (department, slot) in overrides {
            let Some(o) = slot else { continue };
            if let Some(rate) = o.rate {
                check_range(&format!("{department} rate"), rate, &RATE_RANGE)?;
            }
            if let Some(pitch) = o.pitch {
                check_range(&format!("{department} pitch"), pitch, &PITCH_RANGE)?;
            }
            if let Some(volume) = o.volume {
                check_range(&format!("{department} volume"), volume, &VOLUME_RANGE)?;
            }
        }

        if self.cloud.timeout_secs == 0 {
            return Err(VoiceAlertError::invalid_input(
                "Cloud timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Partial configuration; each present field replaces the active one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfigUpdate {
    /// Master switch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Speech backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<VoiceProvider>,
    /// Default voice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Preferred language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Speaking rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f32>,
    /// Pitch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    /// Volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    /// Alert-type switches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_types: Option<AlertTypeToggles>,
    /// Tone cues
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_effects: Option<SoundEffectsConfig>,
    /// Department voices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_profiles: Option<VoiceProfilesConfig>,
    /// User templates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_templates: Option<BTreeMap<String, String>>,
    /// Analytics capture
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<AnalyticsConfig>,
    /// Per-department overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_overrides: Option<DepartmentOverrides>,
    /// Volume shaping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smart_volume: Option<SmartVolumeConfig>,
    /// Operator shortcuts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard_shortcuts: Option<KeyboardShortcuts>,
    /// Supervisor override behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor_override: Option<SupervisorOverrideConfig>,
    /// Cloud providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud: Option<CloudConfig>,
}

impl VoiceConfigUpdate {
    /// Update that only changes the volume
    #[must_use]
    pub fn volume(volume: f32) -> Self {
        Self {
            volume: Some(volume),
            ..Self::default()
        }
    }

    /// Update that only flips the master switch
    #[must_use]
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    /// Whether no field is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow-merge into `config`, replacing exactly the present fields
    pub fn apply_to(&self, config: &mut VoiceConfig) {
        let update = self.clone();
        if let Some(v) = update.enabled {
            config.enabled = v;
        }
        if let Some(v) = update.provider {
            config.provider = v;
        }
        if let Some(v) = update.voice {
            config.voice = v;
        }
        if let Some(v) = update.language {
            config.language = v;
        }
        if let Some(v) = update.rate {
            config.rate = v;
        }
        if let Some(v) = update.pitch {
            config.pitch = v;
        }
        if let Some(v) = update.volume {
            config.volume = v;
        }
        if let Some(v) = update.alert_types {
            config.alert_types = v;
        }
        if let Some(v) = update.sound_effects {
            config.sound_effects = v;
        }
        if let Some(v) = update.voice_profiles {
            config.voice_profiles = v;
        }
        if let Some(v) = update.custom_templates {
            config.custom_templates = v;
        }
        if let Some(v) = update.analytics {
            config.analytics = v;
        }
        if let Some(v) = update.department_overrides {
            config.department_overrides = v;
        }
        if let Some(v) = update.smart_volume {
            config.smart_volume = v;
        }
        if let Some(v) = update.keyboard_shortcuts {
            config.keyboard_shortcuts = v;
        }
        if let Some(v) = update.supervisor_override {
            config.supervisor_override = v;
        }
        if let Some(v) = update.cloud {
            config.cloud = v;
        }
    }
}

impl From<&VoiceConfig> for VoiceConfigUpdate {
    /// Full snapshot of a config, every field present
    fn from(config: &VoiceConfig) -> Self {
        let config = config.clone();
        Self {
            enabled: Some(config.enabled),
            provider: Some(config.provider),
            voice: Some(config.voice),
            language: Some(config.language),
            rate: Some(config.rate),
            pitch: Some(config.pitch),
            volume: Some(config.volume),
            alert_types: Some(config.alert_types),
            sound_effects: Some(config.sound_effects),
            voice_profiles: Some(config.voice_profiles),
            custom_templates: Some(config.custom_templates),
            analytics: Some(config.analytics),
            department_overrides: Some(config.department_overrides),
            smart_volume: Some(config.smart_volume),
            keyboard_shortcuts: Some(config.keyboard_shortcuts),
            supervisor_override: Some(config.supervisor_override),
            cloud: Some(config.cloud),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = VoiceConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.enabled);
        assert_eq!(config.provider, VoiceProvider::Local);
        assert_eq!(config.language, "en-US");
    }

    #[test]
    fn test_validation_ranges() {
        let mut config = VoiceConfig::default();
        config.rate = 0.05;
        assert!(config.validate().is_err());

        let mut config = VoiceConfig::default();
        config.rate = 10.0;
        assert!(config.validate().is_ok());

        let mut config = VoiceConfig::default();
        config.volume = 1.5;
        assert!(config.validate().is_err());

        let mut config = VoiceConfig::default();
        config.pitch = -0.1;
        assert!(config.validate().is_err());

        let mut config = VoiceConfig::default();
        config.sound_effects.volume = 2.0;
        assert!(config.validate().is_err());

        let mut config = VoiceConfig::default();
        config.department_overrides.ems = Some(DepartmentOverride {
            rate: Some(20.0),
            ..DepartmentOverride::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("EMS rate"));
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config: VoiceConfig =
            serde_json::from_str(r#"{"volume": 0.3, "future_field": 12}"#).unwrap();
        assert_eq!(config.volume, 0.3);
        assert_eq!(config.rate, 1.0);
        assert_eq!(config.alert_types, AlertTypeToggles::default());
    }

    #[test]
    fn test_update_replaces_only_present_fields() {
        let mut config = VoiceConfig::default();
        let update = VoiceConfigUpdate {
            rate: Some(1.5),
            voice: Some("Emma".to_string()),
            ..VoiceConfigUpdate::default()
        };
        update.apply_to(&mut config);

        assert_eq!(config.rate, 1.5);
        assert_eq!(config.voice, "Emma");
        assert_eq!(config.volume, VoiceConfig::default().volume);
    }

    #[test]
    fn test_snapshot_update_restores_config() {
        let mut original = VoiceConfig::default();
        original.volume = 0.4;
        original.alert_types.status_changes = true;
        let snapshot = VoiceConfigUpdate::from(&original);

        let mut config = VoiceConfig::default();
        snapshot.apply_to(&mut config);
        assert_eq!(config, original);
    }

    #[test]
    fn test_update_serializes_only_present_fields() {
        let json = serde_json::to_value(VoiceConfigUpdate::volume(0.3)).unwrap();
        assert_eq!(json, serde_json::json!({"volume": 0.3}));
        assert!(VoiceConfigUpdate::default().is_empty());
    }

    #[test]
    fn test_alert_switches() {
        let mut toggles = AlertTypeToggles::default();
        assert!(toggles.is_enabled(AlertSwitch::NewCalls));
        toggles.set(AlertSwitch::NewCalls, false);
        assert!(!toggles.is_enabled(AlertSwitch::NewCalls));
        assert!(!toggles.new_calls);
    }

    #[test]
    fn test_priority_volume_factor() {
        let smart = SmartVolumeConfig::default();
        assert_eq!(smart.priority_factor(Priority::Low), 0.7);
        assert_eq!(smart.priority_factor(Priority::Critical), 1.0);

        let flat = SmartVolumeConfig {
            priority_based: false,
            ..SmartVolumeConfig::default()
        };
        assert_eq!(flat.priority_factor(Priority::Low), 1.0);
    }

    #[test]
    fn test_cloud_api_key_lookup() {
        let mut cloud = CloudConfig::default();
        assert!(cloud.api_key(VoiceProvider::GoogleCloud).is_none());
        cloud.google_api_key = Some("   ".to_string());
        assert!(cloud.api_key(VoiceProvider::GoogleCloud).is_none());
        cloud.google_api_key = Some("key".to_string());
        assert_eq!(cloud.api_key(VoiceProvider::GoogleCloud), Some("key"));
        assert!(cloud.api_key(VoiceProvider::Local).is_none());
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("google".parse::<VoiceProvider>().unwrap(), VoiceProvider::GoogleCloud);
        assert_eq!("ElevenLabs".parse::<VoiceProvider>().unwrap(), VoiceProvider::ElevenLabs);
        assert_eq!("browser".parse::<VoiceProvider>().unwrap(), VoiceProvider::Local);
        assert!("polly".parse::<VoiceProvider>().is_err());
        assert!(VoiceProvider::Azure.is_cloud());
        assert!(!VoiceProvider::Local.is_cloud());
    }
}
