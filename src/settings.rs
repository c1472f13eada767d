//! Player preferences
//!
//! Persisted separately from progress, through the same key-value store.

use serde::{Deserialize, Serialize};

use crate::platform::KeyValueStore;

/// How tone digits are drawn on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ToneLabels {
    #[default]
    Numbers,
    /// Contour glyphs: ─ ╱ ∨ ╲
    Symbols,
}

impl ToneLabels {
    /// Read the `numbers` query parameter. Only `numbers=0` switches to symbols.
    pub fn from_query(search: &str) -> Self {
        let symbols = search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, value)| key == "numbers" && value == "0");
        if symbols {
            ToneLabels::Symbols
        } else {
            ToneLabels::Numbers
        }
    }

    /// Label for a single tone digit
    pub fn digit(&self, digit: char) -> char {
        match self {
            ToneLabels::Numbers => digit,
            ToneLabels::Symbols => match digit {
                '1' => '─',
                '2' => '╱',
                '3' => '∨',
                '4' => '╲',
                other => other,
            },
        }
    }

    /// Label for a whole tone pattern
    pub fn format(&self, tones: &str) -> String {
        tones.chars().map(|d| self.digit(d)).collect()
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tone_labels: ToneLabels,
    /// Speak each word as it spawns
    pub speech: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tone_labels: ToneLabels::Numbers,
            speech: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "toneRaindropSettings";

    /// Load settings, falling back to defaults
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        if let Some(json) = storage.get(Self::STORAGE_KEY) {
            if let Ok(settings) = serde_json::from_str(&json) {
                log::info!("Loaded settings");
                return settings;
            }
            log::warn!("Stored settings unreadable, using defaults");
        }
        Self::default()
    }

    /// Save settings (best-effort)
    pub fn save(&self, storage: &mut dyn KeyValueStore) {
        if let Ok(json) = serde_json::to_string(self) {
            match storage.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(err) => log::warn!("Settings not saved: {err}"),
            }
        }
    }
}
