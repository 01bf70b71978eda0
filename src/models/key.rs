//! Key assignment data structures.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A key assignment as it appears in the persisted config.
///
/// ```json
/// { "key": "LSHIFT", "label": "Shift" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedKey {
    /// Firmware key name
    pub key: String,
    /// Display label, regenerated from the key-name table on export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Fields this layer does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Editable key assignment resolved against a key-name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// Firmware key name (e.g., "A", "LSHIFT", "LAYER_SHIFT1")
    pub key: String,
    /// Display label in the active locale
    pub label: String,
    /// Placeholder for a key name the table could not resolve
    pub unknown: bool,
    /// Pass-through fields from the persisted entry
    pub extra: Map<String, Value>,
}

impl Key {
    /// Creates a resolved key.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            unknown: false,
            extra: Map::new(),
        }
    }

    /// Creates the placeholder used for unresolvable key names.
    ///
    /// The placeholder keeps the original key name so exporting it writes the
    /// same code back.
    pub fn placeholder(key: impl Into<String>, label: Option<String>) -> Self {
        let key = key.into();
        let label = label.unwrap_or_else(|| key.clone());
        Self {
            key,
            label,
            unknown: true,
            extra: Map::new(),
        }
    }

    /// Attaches pass-through fields.
    #[must_use]
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    /// Converts back into the persisted shape.
    pub fn to_persisted(&self) -> PersistedKey {
        PersistedKey {
            key: self.key.clone(),
            label: Some(self.label.clone()),
            extra: self.extra.clone(),
        }
    }
}
