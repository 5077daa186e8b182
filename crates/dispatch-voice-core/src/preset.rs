//! Named configuration snapshots.

use crate::config::{VoiceConfig, VoiceConfigUpdate};
use crate::error::{VoiceAlertError, VoiceAlertResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved, partial configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicePreset {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Fields captured by the preset
    pub config: VoiceConfigUpdate,
    /// When the preset was saved
    pub created_at: DateTime<Utc>,
}

impl VoicePreset {
    /// Snapshot `config` under `name`
    ///
    /// The snapshot owns its data; later changes to `config` do not reach it.
    #[must_use]
    pub fn capture<S: Into<String>>(name: S, config: &VoiceConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            config: VoiceConfigUpdate::from(config),
            created_at: Utc::now(),
        }
    }
}

/// Ordered collection of presets, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetLibrary {
    presets: Vec<VoicePreset>,
}

impl PresetLibrary {
    /// Library holding `presets`
    #[must_use]
    pub fn new(presets: Vec<VoicePreset>) -> Self {
        Self { presets }
    }

    /// Add a preset
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank name.
    pub fn insert(&mut self, preset: VoicePreset) -> VoiceAlertResult<()> {
        if preset.name.trim().is_empty() {
            return Err(VoiceAlertError::invalid_input("Preset name cannot be empty"));
        }
        self.presets.push(preset);
        Ok(())
    }

    /// Find a preset by id
    ///
    /// # Errors
    ///
    /// Returns `PresetNotFound` when no preset has this id.
    pub fn get(&self, id: &str) -> VoiceAlertResult<&VoicePreset> {
        self.presets
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| VoiceAlertError::preset_not_found(id))
    }

    /// Remove a preset, returning it
    ///
    /// # Errors
    ///
    /// Returns `PresetNotFound` when no preset has this id.
    pub fn remove(&mut self, id: &str) -> VoiceAlertResult<VoicePreset> {
        let index = self
            .presets
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| VoiceAlertError::preset_not_found(id))?;
        Ok(self.presets.remove(index))
    }

    /// All presets
    #[must_use]
    pub fn all(&self) -> &[VoicePreset] {
        &self.presets
    }

    /// Number of presets
    #[must_use]
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether the library is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
