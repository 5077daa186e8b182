//! Persistence of the voice configuration and presets.
//!
//! State is kept as JSON documents under two well-known keys in a
//! key-value store. `FileStore` keeps one file per key in the platform
//! config directory; `MemoryStore` is for tests and embedding.

use crate::config::VoiceConfig;
use crate::error::{VoiceAlertError, VoiceAlertResult};
use crate::preset::VoicePreset;
use directories::ProjectDirs;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Key holding the serialized `VoiceConfig`
pub const CONFIG_KEY: &str = "dispatch-voice.config";

/// Key holding the serialized preset list
pub const PRESETS_KEY: &str = "dispatch-voice.presets";

/// String key-value storage
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read a value
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> VoiceAlertResult<Option<String>>;

    /// Write a value
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> VoiceAlertResult<()>;

    /// Delete a value; missing keys are not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be modified.
    fn remove(&self, key: &str) -> VoiceAlertResult<()>;
}

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> VoiceAlertResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> VoiceAlertResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> VoiceAlertResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// One JSON file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`; the directory is created on first write
    #[must_use]
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Store in the platform config directory
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new_with_default_dir() -> VoiceAlertResult<Self> {
        let dirs = ProjectDirs::from("org", "DispatchVoice", "dispatch-voice").ok_or_else(|| {
            VoiceAlertError::storage("Failed to determine project directories")
        })?;
        Ok(Self::new(dirs.config_dir()))
    }

    /// Root directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> VoiceAlertResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VoiceAlertError::storage(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> VoiceAlertResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Readers never observe a partially written document
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> VoiceAlertResult<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Typed access to the config and preset documents
#[derive(Debug, Clone)]
pub struct ConfigStore {
    store: Arc<dyn KeyValueStore>,
}

impl ConfigStore {
    /// Wrap a key-value store
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// In-memory config store
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load the config, shallow-merging the stored document over defaults
    ///
    /// Never fails: unreadable or corrupt documents yield the defaults and a
    /// single warning.
    #[must_use]
    pub fn load_config(&self) -> VoiceConfig {
        let raw = match self.store.get(CONFIG_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return VoiceConfig::default(),
            Err(e) => {
                warn!("Failed to read stored voice config, using defaults: {e}");
                return VoiceConfig::default();
            }
        };

        match merge_over_defaults(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("Stored voice config is corrupt, using defaults: {e}");
                VoiceConfig::default()
            }
        }
    }

    /// Persist the config
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_config(&self, config: &VoiceConfig) -> VoiceAlertResult<()> {
        let json = serde_json::to_string_pretty(config)?;
        self.store.set(CONFIG_KEY, &json)
    }

    /// Load the preset list; corrupt documents yield an empty list
    #[must_use]
    pub fn load_presets(&self) -> Vec<VoicePreset> {
        let raw = match self.store.get(PRESETS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read stored voice presets: {e}");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Stored voice presets are corrupt, ignoring them: {e}");
            Vec::new()
        })
    }

    /// Persist the preset list
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_presets(&self, presets: &[VoicePreset]) -> VoiceAlertResult<()> {
        let json = serde_json::to_string_pretty(presets)?;
        self.store.set(PRESETS_KEY, &json)
    }
}

/// Top-level keys of the stored document replace the defaults wholesale
fn merge_over_defaults(raw: &str) -> VoiceAlertResult<VoiceConfig> {
    let stored: serde_json::Value = serde_json::from_str(raw)?;
    let serde_json::Value::Object(stored) = stored else {
        return Err(VoiceAlertError::storage("Stored config is not a JSON object"));
    };

    let mut merged = serde_json::to_value(VoiceConfig::default())?;
    if let serde_json::Value::Object(defaults) = &mut merged {
        for (key, value) in stored {
            if defaults.contains_key(&key) {
                defaults.insert(key, value);
            }
        }
    }

    let config: VoiceConfig = serde_json::from_value(merged)?;
    config.validate()?;
    Ok(config)
}
