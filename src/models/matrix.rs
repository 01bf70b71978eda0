//! Matrix items: physical key positions and their per-layer assignments.

use crate::models::Key;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Stable handle for a matrix item.
///
/// Assigned by the normalizer from the item's position in the persisted
/// matrix and carried over when the item is rebuilt by an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatrixItemId(pub u32);

impl fmt::Display for MatrixItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Converts a layer number into the string key used by layer-indexed maps.
#[must_use]
pub fn layer_key(layer: u32) -> String {
    layer.to_string()
}

/// One physical key position.
///
/// `layers` maps a layer key ("0", "1", ...) to the key assigned on that
/// layer. Geometry and scan code live in `extra` and pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixItem {
    /// Stable handle
    pub id: MatrixItemId,
    /// Key assignment per layer key
    pub layers: BTreeMap<String, Key>,
    /// Persisted fields this layer does not interpret (code, x, y, w, h, ...)
    pub extra: Map<String, Value>,
}

/// Matrix collection. Entries are shared so an edit only rebuilds the item it
/// touches.
pub type Matrix = Vec<Arc<MatrixItem>>;

impl MatrixItem {
    /// Creates an item with no layer assignments.
    #[must_use]
    pub fn new(id: MatrixItemId) -> Self {
        Self {
            id,
            layers: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// Gets the key assigned on `layer`.
    #[must_use]
    pub fn key_on(&self, layer: u32) -> Option<&Key> {
        self.layers.get(&layer_key(layer))
    }

    /// Returns a copy with `key` assigned on `layer`.
    ///
    /// An existing entry is replaced, not merged.
    #[must_use]
    pub fn with_key(&self, layer: u32, key: Key) -> Self {
        let mut updated = self.clone();
        updated.layers.insert(layer_key(layer), key);
        updated
    }

    /// Scan code from the persisted `code` field, if any.
    #[must_use]
    pub fn scan_code(&self) -> Option<&str> {
        self.extra.get("code").and_then(Value::as_str)
    }
}
