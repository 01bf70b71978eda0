//! Error types for the configuration model.

use crate::state::StateKey;
use thiserror::Error;

/// Kind of entity a lookup was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Matrix item (physical key position)
    MatrixItem,
    /// Define triple
    Define,
    /// Named animation
    Animation,
    /// Macro within a layer
    Macro,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MatrixItem => "matrix item",
            Self::Define => "define",
            Self::Animation => "animation",
            Self::Macro => "macro",
        };
        f.write_str(name)
    }
}

/// Errors produced by the normalizer, the store and the mutation operations.
#[derive(Debug, Error)]
pub enum ConfigureError {
    /// A firmware key name has no entry in the active key-name table.
    ///
    /// The normalizer recovers from this locally with a placeholder key.
    #[error("Unknown key code: {0}")]
    UnknownKeyCode(String),

    /// The referenced entity is absent from its collection.
    #[error("No {kind} with id '{id}'")]
    TargetNotFound {
        /// What was looked up
        kind: TargetKind,
        /// The id, name or handle that was looked up
        id: String,
    },

    /// A mutation was attempted before a config was loaded.
    #[error("Configuration field '{0}' is not loaded")]
    NotLoaded(StateKey),

    /// `add_macro` on a layer that has no macro list.
    #[error("Layer {0} has no macro list")]
    MissingMacroLayer(String),

    /// A persisted field is present but has the wrong shape.
    #[error("Invalid '{field}' in persisted config: {source}")]
    InvalidConfig {
        /// Persisted field name
        field: &'static str,
        /// Underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// An editable field could not be written back as JSON.
    #[error("Failed to export '{field}': {source}")]
    Export {
        /// Persisted field name
        field: &'static str,
        /// Underlying serialization error
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias for configuration operations.
pub type ConfigureResult<T> = Result<T, ConfigureError>;
