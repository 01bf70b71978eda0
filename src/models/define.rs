//! Named constants used in generated firmware source.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Define as stored in the persisted config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedDefine {
    /// Id from an earlier editing session, if the document carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Define name
    pub name: String,
    /// Define value
    pub value: String,
    /// Fields this layer does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Editable define.
///
/// `id` is unique across the defines collection and never changes;
/// `name` and `value` may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    /// Stable id
    pub id: String,
    /// Define name
    pub name: String,
    /// Define value
    pub value: String,
    /// The id was read from the document and is written back on export
    pub persisted_id: bool,
    /// Pass-through fields from the persisted entry
    pub extra: Map<String, Value>,
}

impl Define {
    /// Creates a define whose id is local to this session.
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value: value.into(),
            persisted_id: false,
            extra: Map::new(),
        }
    }

    /// Returns a copy with a new name and value; id and pass-through fields
    /// are kept.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..self.clone()
        }
    }

    /// Converts back into the persisted shape. Session-local ids are not
    /// written.
    pub fn to_persisted(&self) -> PersistedDefine {
        PersistedDefine {
            id: self.persisted_id.then(|| self.id.clone()),
            name: self.name.clone(),
            value: self.value.clone(),
            extra: self.extra.clone(),
        }
    }
}
