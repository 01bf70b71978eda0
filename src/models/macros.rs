//! Layer-scoped macros.

use crate::models::Key;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default name given to a macro created in the editor.
pub const NEW_MACRO_NAME: &str = "New Macro";

/// Macro as stored in the persisted config. Trigger and output are sequences
/// of combos, each combo a list of firmware key names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedMacro {
    /// Id from an earlier editing session, if the document carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Macro name
    #[serde(default)]
    pub name: String,
    /// Key sequence that fires the macro
    #[serde(default)]
    pub trigger: Vec<Vec<String>>,
    /// Key sequence the macro emits
    #[serde(default)]
    pub output: Vec<Vec<String>>,
    /// Fields this layer does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Editable macro with resolved keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    /// Stable id, assigned once and never reused
    pub id: String,
    /// Macro name
    pub name: String,
    /// Key sequence that fires the macro
    pub trigger: Vec<Vec<Key>>,
    /// Key sequence the macro emits
    pub output: Vec<Vec<Key>>,
    /// The id was read from the document and is written back on export
    pub persisted_id: bool,
    /// Pass-through fields from the persisted entry
    pub extra: Map<String, Value>,
}

impl Macro {
    /// Creates an empty macro: default name, one empty combo for trigger and
    /// output.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: NEW_MACRO_NAME.to_string(),
            trigger: vec![Vec::new()],
            output: vec![Vec::new()],
            persisted_id: false,
            extra: Map::new(),
        }
    }

    /// Converts back into the persisted shape. Session-local ids are not
    /// written.
    pub fn to_persisted(&self) -> PersistedMacro {
        fn codes(seq: &[Vec<Key>]) -> Vec<Vec<String>> {
            seq.iter()
                .map(|combo| combo.iter().map(|k| k.key.clone()).collect())
                .collect()
        }

        PersistedMacro {
            id: self.persisted_id.then(|| self.id.clone()),
            name: self.name.clone(),
            trigger: codes(&self.trigger),
            output: codes(&self.output),
            extra: self.extra.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_macro_defaults() {
        let m = Macro::new("m-1");
        assert_eq!(m.name, "New Macro");
        assert_eq!(m.trigger, vec![Vec::<Key>::new()]);
        assert_eq!(m.output, vec![Vec::<Key>::new()]);
    }

    #[test]
    fn test_to_persisted_writes_key_names() {
        let mut m = Macro::new("m-1");
        m.trigger = vec![vec![Key::new("LSHIFT", "Shift"), Key::new("A", "A")]];
        m.output = vec![vec![Key::new("B", "B")], vec![Key::placeholder("0x77", None)]];

        let persisted = m.to_persisted();
        assert_eq!(persisted.trigger, vec![vec!["LSHIFT", "A"]]);
        assert_eq!(persisted.output, vec![vec!["B"], vec!["0x77"]]);
        assert_eq!(persisted.id, None);
    }

    #[test]
    fn test_to_persisted_writes_document_id_and_extra() {
        let mut m = Macro::new("mk");
        m.persisted_id = true;
        m.extra.insert("enabled".to_string(), serde_json::json!(true));

        let persisted = m.to_persisted();
        assert_eq!(persisted.id.as_deref(), Some("mk"));
        assert_eq!(persisted.extra["enabled"], true);
    }
}
