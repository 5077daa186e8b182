//! Voice catalog and voice resolution for announcements.

use crate::alert::Department;
use crate::config::VoiceConfig;
use crate::error::{VoiceAlertError, VoiceAlertResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name fragments of voices known to sound better than the platform default
pub const QUALITY_MARKERS: [&str; 6] =
    ["Google", "Microsoft", "Natural", "Neural", "Premium", "Enhanced"];

/// Gender classification for voices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male voice
    Male,
    /// Female voice
    Female,
    /// Non-binary or neutral voice
    Neutral,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// A voice the speech engine can use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Engine identifier, passed to the provider
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Language tag (e.g., "en-US")
    pub language: String,
    /// Voice gender
    pub gender: Gender,
    /// Whether this voice is available for use
    pub available: bool,
}

impl Voice {
    /// Create an available voice
    #[must_use]
    pub fn new<S: Into<String>>(id: S, name: S, language: S, gender: Gender) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
            gender,
            available: true,
        }
    }

    /// Set availability status
    #[must_use]
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Check if voice supports the given language
    ///
    /// Matches the full tag or its primary subtag, case-insensitively.
    #[must_use]
    pub fn supports_language(&self, language: &str) -> bool {
        let primary = |tag: &str| tag.split(['-', '_']).next().unwrap_or("").to_ascii_lowercase();
        self.language.eq_ignore_ascii_case(language)
            || (!language.is_empty() && primary(&self.language) == primary(language))
    }

    /// Whether the name carries a quality marker
    #[must_use]
    pub fn is_high_quality(&self) -> bool {
        QUALITY_MARKERS.iter().any(|m| self.name.contains(m))
    }

    /// Whether `name` refers to this voice by name or id
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.id.eq_ignore_ascii_case(name)
    }
}

/// Source of the voices installed on this host
pub trait VoiceCatalog: Send + Sync + std::fmt::Debug {
    /// Voices usable right now, in preference order
    fn list_available_voices(&self) -> Vec<Voice>;
}

/// Fixed voice catalog
#[derive(Debug, Clone)]
pub struct VoiceManager {
    voices: Arc<Vec<Voice>>,
}

impl VoiceManager {
    /// Catalog of the built-in local voices
    #[must_use]
    pub fn new() -> Self {
        Self::with_voices(vec![
            Voice::new("en-us+m3", "David", "en-US", Gender::Male),
            Voice::new("en-us+f2", "Sarah", "en-US", Gender::Female),
            Voice::new("en-us+f3", "Bella", "en-US", Gender::Female),
            Voice::new("en-gb+f4", "Emma", "en-GB", Gender::Female),
            Voice::new("en-gb+m1", "James", "en-GB", Gender::Male),
            Voice::new("es+m1", "Diego", "es-ES", Gender::Male),
        ])
    }

    /// Catalog with custom voices
    #[must_use]
    pub fn with_voices(voices: Vec<Voice>) -> Self {
        Self {
            voices: Arc::new(voices),
        }
    }

    /// Get a specific voice by id or name
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when no voice matches.
    pub fn get_voice(&self, voice: &str) -> VoiceAlertResult<Voice> {
        self.voices
            .iter()
            .find(|v| v.matches(voice))
            .cloned()
            .ok_or_else(|| VoiceAlertError::invalid_input(format!("Voice '{voice}' not found")))
    }

    /// Get voices filtered by language
    #[must_use]
    pub fn get_voices_by_language(&self, language: &str) -> Vec<Voice> {
        self.voices
            .iter()
            .filter(|voice| voice.available && voice.supports_language(language))
            .cloned()
            .collect()
    }

    /// Get voice count
    #[must_use]
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Get supported languages
    #[must_use]
    pub fn get_supported_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self
            .voices
            .iter()
            .filter(|voice| voice.available)
            .map(|voice| voice.language.clone())
            .collect();
        languages.sort();
        languages.dedup();
        languages
    }
}

impl Default for VoiceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceCatalog for VoiceManager {
    fn list_available_voices(&self) -> Vec<Voice> {
        self.voices.iter().filter(|v| v.available).cloned().collect()
    }
}

/// Voice name an alert asks for, before fallback
///
/// With voice profiles on, a department tag picks the profile voice. Otherwise
/// a department override voice wins, then the configured default; untagged
/// alerts always use the default.
#[must_use]
pub fn preferred_voice_name(config: &VoiceConfig, department: Option<Department>) -> String {
    let Some(department) = department else {
        return config.voice.clone();
    };

    if config.voice_profiles.enabled {
        let profiles = &config.voice_profiles;
        return match department {
            Department::Police | Department::Fire => profiles.call_voice.clone(),
            Department::Ems => profiles.medical_voice.clone(),
        };
    }

    config
        .department_overrides
        .get(department)
        .and_then(|o| o.voice.clone())
        .unwrap_or_else(|| config.voice.clone())
}

/// Pick a voice from `voices`
///
/// Order: exact name or id match, then the first voice for `language`, then
/// the first voice with a quality marker, then the first voice. `None` only
/// for an empty list.
#[must_use]
pub fn resolve_voice(voices: &[Voice], preferred: &str, language: &str) -> Option<Voice> {
    let preferred = preferred.trim();
    if !preferred.is_empty() {
        if let Some(voice) = voices.iter().find(|v| v.matches(preferred)) {
            return Some(voice.clone());
        }
    }

    voices
        .iter()
        .find(|v| v.supports_language(language))
        .or_else(|| voices.iter().find(|v| v.is_high_quality()))
        .or_else(|| voices.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DepartmentOverride;

    fn catalog() -> Vec<Voice> {
        vec![
            Voice::new("fr-1", "Amelie", "fr-FR", Gender::Female),
            Voice::new("de-1", "Microsoft Katja", "de-DE", Gender::Female),
            Voice::new("en-1", "Alex", "en-US", Gender::Male),
            Voice::new("en-2", "Google UK English", "en-GB", Gender::Female),
        ]
    }

    #[test]
    fn test_gender_display() {
        assert_eq!(Gender::Male.to_string(), "Male");
        assert_eq!(Gender::Female.to_string(), "Female");
        assert_eq!(Gender::Neutral.to_string(), "Neutral");
    }

    #[test]
    fn test_voice_supports_language() {
        let voice = Voice::new("test", "Test", "en-US", Gender::Male);

        assert!(voice.supports_language("en-US"));
        assert!(voice.supports_language("en"));
        assert!(voice.supports_language("EN-gb"));
        assert!(!voice.supports_language("es"));
        assert!(!voice.supports_language(""));
    }

    #[test]
    fn test_resolve_exact_name_then_id() {
        let voices = catalog();
        assert_eq!(resolve_voice(&voices, "alex", "fr-FR").unwrap().id, "en-1");
        assert_eq!(resolve_voice(&voices, "de-1", "en-US").unwrap().id, "de-1");
    }

    #[test]
    fn test_resolve_language_prefix() {
        let voices = catalog();
        assert_eq!(resolve_voice(&voices, "Nobody", "en-AU").unwrap().id, "en-1");
        assert_eq!(resolve_voice(&voices, "", "fr").unwrap().id, "fr-1");
    }

    #[test]
    fn test_resolve_quality_marker_then_first() {
        let voices = catalog();
        assert_eq!(resolve_voice(&voices, "Nobody", "ja-JP").unwrap().id, "de-1");

        let plain = vec![
            Voice::new("a", "Plain A", "ja-JP", Gender::Male),
            Voice::new("b", "Plain B", "ko-KR", Gender::Male),
        ];
        assert_eq!(resolve_voice(&plain, "Nobody", "en-US").unwrap().id, "a");
        assert!(resolve_voice(&[], "Nobody", "en-US").is_none());
    }

    #[test]
    fn test_preferred_voice_profiles() {
        let mut config = VoiceConfig::default();
        config.voice = "Alex".to_string();
        assert_eq!(preferred_voice_name(&config, Some(Department::Ems)), "Alex");

        config.voice_profiles.enabled = true;
        assert_eq!(preferred_voice_name(&config, Some(Department::Police)), "David");
        assert_eq!(preferred_voice_name(&config, Some(Department::Fire)), "David");
        assert_eq!(preferred_voice_name(&config, Some(Department::Ems)), "Sarah");
        assert_eq!(preferred_voice_name(&config, None), "Alex");
    }

    #[test]
    fn test_preferred_voice_department_override() {
        let mut config = VoiceConfig::default();
        config.voice = "Alex".to_string();
        config.department_overrides.fire = Some(DepartmentOverride {
            voice: Some("Emma".to_string()),
            ..DepartmentOverride::default()
        });

        assert_eq!(preferred_voice_name(&config, Some(Department::Fire)), "Emma");
        assert_eq!(preferred_voice_name(&config, Some(Department::Police)), "Alex");
    }

    #[test]
    fn test_voice_manager_lists_available_only() {
        let manager = VoiceManager::with_voices(vec![
            Voice::new("a", "A", "en-US", Gender::Male),
            Voice::new("b", "B", "en-US", Gender::Female).with_availability(false),
        ]);
        assert_eq!(manager.voice_count(), 2);
        let listed = manager.list_available_voices();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "a");
    }

    #[test]
    fn test_voice_manager_lookup() {
        let manager = VoiceManager::new();
        assert_eq!(manager.get_voice("David").unwrap().id, "en-us+m3");
        assert!(manager.get_voice("nonexistent").is_err());
        assert!(!manager.get_voices_by_language("en").is_empty());
        assert!(manager.get_supported_languages().contains(&"en-GB".to_string()));
    }

    #[test]
    fn test_voice_serialization() {
        let voice = Voice::new("a", "A", "en-US", Gender::Neutral);
        let json = serde_json::to_string(&voice).expect("Should serialize");
        let deserialized: Voice = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(voice, deserialized);
    }
}
