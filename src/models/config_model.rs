//! The editable configuration model as a whole.

use crate::models::{Animation, Define, Led, Macro, Matrix};
use std::collections::BTreeMap;

/// Header name to value.
pub type Headers = BTreeMap<String, String>;
/// Layer key to custom KLL text.
pub type CustomKll = BTreeMap<String, String>;
/// Animation name to animation.
pub type Animations = BTreeMap<String, Animation>;
/// Layer key to that layer's macros, in order.
pub type Macros = BTreeMap<String, Vec<Macro>>;

/// Editable fields extracted from a persisted config.
///
/// Each field is `None` when the persisted config does not carry it; the
/// mangler omits `None` fields so they are left as the raw document has them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigModel {
    /// Header entries (name, author, layout, ...)
    pub header: Option<Headers>,
    /// Physical key positions with per-layer assignments
    pub matrix: Option<Matrix>,
    /// Firmware defines
    pub defines: Option<Vec<Define>>,
    /// LED definitions
    pub leds: Option<Vec<Led>>,
    /// Custom KLL per layer
    pub custom: Option<CustomKll>,
    /// Animations by name
    pub animations: Option<Animations>,
    /// Macros per layer
    pub macros: Option<Macros>,
}
