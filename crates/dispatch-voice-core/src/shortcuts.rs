//! Keyboard chords bound to operator actions.

use crate::config::KeyboardShortcuts;
use crate::error::{VoiceAlertError, VoiceAlertResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Action a shortcut runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutAction {
    /// Flip the master switch
    ToggleMute,
    /// Skip the current announcement
    SkipCurrent,
    /// Speak the test sentence
    TestVoice,
    /// Drop pending announcements
    ClearQueue,
}

/// A key plus modifiers, compared without regard to case or order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    /// Control
    pub ctrl: bool,
    /// Alt / Option
    pub alt: bool,
    /// Shift
    pub shift: bool,
    /// Meta / Command / Super
    pub meta: bool,
    /// The non-modifier key, uppercased
    pub key: String,
}

impl KeyChord {
    /// Parse a chord such as `"Ctrl+Shift+M"`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless the chord names exactly one
    /// non-modifier key.
    pub fn parse(chord: &str) -> VoiceAlertResult<Self> {
        let mut parsed = Self {
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
            key: String::new(),
        };

        for part in chord.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => parsed.ctrl = true,
                "alt" | "option" => parsed.alt = true,
                "shift" => parsed.shift = true,
                "meta" | "cmd" | "command" | "super" | "win" => parsed.meta = true,
                "" => {
                    return Err(VoiceAlertError::invalid_input(format!(
                        "Empty key in shortcut '{chord}'"
                    )))
                }
                _ if !parsed.key.is_empty() => {
                    return Err(VoiceAlertError::invalid_input(format!(
                        "Shortcut '{chord}' names more than one key"
                    )))
                }
                _ => parsed.key = part.to_ascii_uppercase(),
            }
        }

        if parsed.key.is_empty() {
            return Err(VoiceAlertError::invalid_input(format!(
                "Shortcut '{chord}' has no key"
            )));
        }
        Ok(parsed)
    }
}

impl std::fmt::Display for KeyChord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let modifiers = [
            (self.ctrl, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Meta"),
        ];
        for (_, name) in modifiers.iter().filter(|(on, _)| *on) {
            write!(f, "{name}+")?;
        }
        f.write_str(&self.key)
    }
}

impl std::str::FromStr for KeyChord {
    type Err = VoiceAlertError;

    fn from_str(s: &str) -> VoiceAlertResult<Self> {
        Self::parse(s)
    }
}

/// Chord to action lookup
#[derive(Debug, Clone, Default)]
pub struct ShortcutTable {
    bindings: Vec<(KeyChord, ShortcutAction)>,
}

impl ShortcutTable {
    /// Table from configured bindings; unparseable chords are skipped
    #[must_use]
    pub fn from_config(config: &KeyboardShortcuts) -> Self {
        let configured = [
            (&config.toggle_mute, ShortcutAction::ToggleMute),
            (&config.skip_current, ShortcutAction::SkipCurrent),
            (&config.test_voice, ShortcutAction::TestVoice),
            (&config.clear_queue, ShortcutAction::ClearQueue),
        ];

        let bindings = configured
            .into_iter()
            .filter_map(|(chord, action)| match KeyChord::parse(chord) {
                Ok(parsed) => Some((parsed, action)),
                Err(e) => {
                    warn!("Ignoring shortcut for {:?}: {e}", action);
                    None
                }
            })
            .collect();

        Self { bindings }
    }

    /// Action bound to `chord`
    #[must_use]
    pub fn resolve(&self, chord: &str) -> Option<ShortcutAction> {
        let chord = KeyChord::parse(chord).ok()?;
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == chord)
            .map(|(_, action)| *action)
    }

    /// Bound chords and their actions
    #[must_use]
    pub fn bindings(&self) -> &[(KeyChord, ShortcutAction)] {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_order_and_case_insensitive() {
        let a = KeyChord::parse("Ctrl+Shift+M").unwrap();
        let b = KeyChord::parse("shift + control + m").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Ctrl+Shift+M");
    }

    #[test]
    fn test_parse_rejects_bad_chords() {
        assert!(KeyChord::parse("Ctrl+Shift").is_err());
        assert!(KeyChord::parse("Ctrl+A+B").is_err());
        assert!(KeyChord::parse("Ctrl++").is_err());
        assert!(KeyChord::parse("").is_err());
    }

    #[test]
    fn test_default_table() {
        let table = ShortcutTable::from_config(&KeyboardShortcuts::default());
        assert_eq!(table.bindings().len(), 4);
        assert_eq!(table.resolve("ctrl+shift+m"), Some(ShortcutAction::ToggleMute));
        assert_eq!(table.resolve("Shift+Ctrl+S"), Some(ShortcutAction::SkipCurrent));
        assert_eq!(table.resolve("Ctrl+Shift+T"), Some(ShortcutAction::TestVoice));
        assert_eq!(table.resolve("Ctrl+Shift+C"), Some(ShortcutAction::ClearQueue));
        assert_eq!(table.resolve("Ctrl+M"), None);
        assert_eq!(table.resolve("garbage++"), None);
    }

    #[test]
    fn test_invalid_binding_skipped() {
        let config = KeyboardShortcuts {
            toggle_mute: "Ctrl+".to_string(),
            ..KeyboardShortcuts::default()
        };
        let table = ShortcutTable::from_config(&config);
        assert_eq!(table.bindings().len(), 3);
    }
}
