//! LED definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One LED. Only the id is interpreted; position and channel data pass
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Led {
    /// LED index, if the config numbers its LEDs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Remaining persisted fields (x, y, scanCode, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
