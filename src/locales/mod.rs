//! Locale key-name tables.
//!
//! Each table maps firmware key names (e.g., "A", "LSHIFT", "LAYER_SHIFT1")
//! to display data for one keyboard locale. Tables are embedded in the
//! binary and parsed once by [`Locales::load`].

use crate::error::{ConfigureError, ConfigureResult};
use crate::models::Key;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Locale used when none is configured.
pub const DEFAULT_LOCALE: &str = "en-us";

/// Embedded tables as (locale id, JSON source).
const EMBEDDED_TABLES: &[(&str, &str)] = &[
    ("en-us", include_str!("en-us.json")),
    ("de-de", include_str!("de-de.json")),
];

/// Group of key names, used to organize a key picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGroup {
    /// Group ID (e.g., "letters", "layers")
    pub id: String,
    /// Display name
    pub name: String,
    /// What keys are in this group
    #[serde(default)]
    pub description: String,
}

/// Display data for one firmware key name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyName {
    /// Firmware key name
    pub code: String,
    /// Label shown on the key cap in this locale
    pub label: String,
    /// Group ID
    pub group: String,
    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,
    /// Alternative firmware names for the same key
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// How a key name matched a search query; earlier variants rank higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRank {
    /// Label equals the query
    Label,
    /// Code or an alias equals the query
    Code,
    /// Label starts with the query
    LabelPrefix,
    /// Code or an alias starts with the query
    CodePrefix,
    /// Label, code or an alias contains the query
    Contains,
    /// Description contains the query
    Description,
}

impl MatchRank {
    /// Ranks `key` against a lowercased query, or `None` if nothing matches.
    fn of(key: &KeyName, query: &str) -> Option<Self> {
        let label = key.label.to_lowercase();
        let codes: Vec<String> = std::iter::once(&key.code)
            .chain(&key.aliases)
            .map(|code| code.to_lowercase())
            .collect();

        if label == query {
            Some(Self::Label)
        } else if codes.iter().any(|c| c == query) {
            Some(Self::Code)
        } else if label.starts_with(query) {
            Some(Self::LabelPrefix)
        } else if codes.iter().any(|c| c.starts_with(query)) {
            Some(Self::CodePrefix)
        } else if label.contains(query) || codes.iter().any(|c| c.contains(query)) {
            Some(Self::Contains)
        } else if key
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(query))
        {
            Some(Self::Description)
        } else {
            None
        }
    }
}

/// Table file schema.
#[derive(Debug, Clone, Deserialize)]
struct KeyNameTableFile {
    locale: String,
    name: String,
    groups: Vec<KeyGroup>,
    keys: Vec<KeyName>,
}

/// Key-name table for one locale, with O(1) lookup by code or alias.
#[derive(Debug, Clone)]
pub struct KeyNameTable {
    locale: String,
    name: String,
    groups: Vec<KeyGroup>,
    keys: Vec<KeyName>,
    lookup: HashMap<String, usize>,
}

impl KeyNameTable {
    /// Parses a table from its JSON source.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: KeyNameTableFile =
            serde_json::from_str(json).context("Failed to parse key-name table")?;

        let mut lookup = HashMap::new();
        for (idx, key) in file.keys.iter().enumerate() {
            lookup.insert(key.code.clone(), idx);
            for alias in &key.aliases {
                lookup.insert(alias.clone(), idx);
            }
        }

        Ok(Self {
            locale: file.locale,
            name: file.name,
            groups: file.groups,
            keys: file.keys,
            lookup,
        })
    }

    /// Locale id (e.g., "en-us").
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Human-readable locale name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the entry for a code or alias.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&KeyName> {
        let idx = self.lookup.get(code)?;
        self.keys.get(*idx)
    }

    /// Resolves a firmware key name into an editable [`Key`].
    ///
    /// The returned key keeps `code` as written, even when it matched an
    /// alias, so exporting writes back the same name.
    pub fn resolve(&self, code: &str) -> ConfigureResult<Key> {
        self.get(code)
            .map(|entry| Key::new(code, entry.label.clone()))
            .ok_or_else(|| ConfigureError::UnknownKeyCode(code.to_string()))
    }

    /// Searches labels, codes, aliases and descriptions (case-insensitive).
    ///
    /// A picker shows the locale label, so label matches outrank code
    /// matches at each [`MatchRank`] tier. Keys tied on rank keep table
    /// order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&KeyName> {
        if query.is_empty() {
            return self.keys.iter().collect();
        }

        let query = query.to_lowercase();
        let mut results: Vec<(MatchRank, &KeyName)> = self
            .keys
            .iter()
            .filter_map(|key| Some((MatchRank::of(key, &query)?, key)))
            .collect();
        results.sort_by_key(|(rank, _)| *rank);
        results.into_iter().map(|(_, key)| key).collect()
    }

    /// All keys in a group, in table order.
    #[must_use]
    pub fn keys_in_group(&self, group_id: &str) -> Vec<&KeyName> {
        self.keys.iter().filter(|k| k.group == group_id).collect()
    }

    /// All groups.
    #[must_use]
    pub fn groups(&self) -> &[KeyGroup] {
        &self.groups
    }

    /// Number of keys (aliases not counted).
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

/// Registry of key-name tables by locale id.
#[derive(Debug, Clone, Default)]
pub struct Locales {
    tables: HashMap<String, KeyNameTable>,
}

impl Locales {
    /// Loads every embedded table.
    pub fn load() -> Result<Self> {
        let mut locales = Self::default();
        for (id, json) in EMBEDDED_TABLES {
            let table = KeyNameTable::from_json(json)
                .with_context(|| format!("Failed to load embedded locale '{id}'"))?;
            locales.insert(table);
        }
        Ok(locales)
    }

    /// Adds or replaces a table under its own locale id.
    pub fn insert(&mut self, table: KeyNameTable) {
        self.tables.insert(table.locale.clone(), table);
    }

    /// Gets the table for `locale`, if registered.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&KeyNameTable> {
        self.tables.get(locale)
    }

    /// Registered locale ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en_us() -> KeyNameTable {
        Locales::load()
            .expect("Failed to load locales")
            .get("en-us")
            .cloned()
            .expect("en-us table missing")
    }

    #[test]
    fn test_load_embedded_locales() {
        let locales = Locales::load().unwrap();
        assert_eq!(locales.ids(), vec!["de-de", "en-us"]);
        assert!(locales.get("fr-fr").is_none());
    }

    #[test]
    fn test_resolve_known_key() {
        let table = en_us();
        let key = table.resolve("LSHIFT").unwrap();
        assert_eq!(key.key, "LSHIFT");
        assert_eq!(key.label, "Shift");
        assert!(!key.unknown);
    }

    #[test]
    fn test_resolve_alias_keeps_written_code() {
        let table = en_us();
        let key = table.resolve("RETURN").unwrap();
        assert_eq!(key.key, "RETURN");
        assert_eq!(key.label, "Enter");
    }

    #[test]
    fn test_resolve_unknown_key() {
        let table = en_us();
        let err = table.resolve("NOT_A_KEY").unwrap_err();
        assert!(matches!(err, ConfigureError::UnknownKeyCode(code) if code == "NOT_A_KEY"));
    }

    #[test]
    fn test_locale_labels_differ() {
        let locales = Locales::load().unwrap();
        let de = locales.get("de-de").unwrap();
        assert_eq!(de.resolve("Y").unwrap().label, "Z");
        assert_eq!(en_us().resolve("Y").unwrap().label, "Y");
    }

    #[test]
    fn test_search_ranks_exact_first() {
        let table = en_us();
        let results = table.search("f1");
        assert_eq!(results[0].code, "F1");
        assert!(results.iter().any(|k| k.code == "F12"));
    }

    #[test]
    fn test_search_prefers_locale_label() {
        let locales = Locales::load().unwrap();
        let de = locales.get("de-de").unwrap();
        let results = de.search("z");
        assert_eq!(results[0].code, "Y");
        assert_eq!(results[1].code, "Z");
    }

    #[test]
    fn test_search_matches_aliases() {
        let table = en_us();
        let results = table.search("return");
        assert_eq!(results[0].code, "ENTER");
    }

    #[test]
    fn test_search_description() {
        let table = en_us();
        let results = table.search("volume");
        assert!(results.iter().any(|k| k.code == "VOLUMEUP"));
    }

    #[test]
    fn test_search_empty_returns_all() {
        let table = en_us();
        assert_eq!(table.search("").len(), table.key_count());
    }

    #[test]
    fn test_keys_in_group() {
        let table = en_us();
        let layers = table.keys_in_group("layers");
        assert!(!layers.is_empty());
        assert!(layers.iter().all(|k| k.group == "layers"));
        assert!(table.groups().iter().any(|g| g.id == "layers"));
    }
}
