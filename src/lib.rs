//! Editable keyboard configuration model for KLL firmware configurators.
//!
//! This library holds a normalized, editable view of a keyboard config
//! (header, matrix, defines, LEDs, custom KLL, animations and macros),
//! converts it to and from the firmware-facing JSON document, and provides
//! the editing operations that keep it consistent.
//!
//! ```
//! use kllconf::locales::Locales;
//! use kllconf::models::{Key, MatrixItemId};
//! use kllconf::services::Configurator;
//! use serde_json::json;
//!
//! let mut session = Configurator::new(Locales::load().unwrap());
//! session
//!     .update_config(
//!         json!({ "matrix": [{ "code": "0x01", "layers": { "0": { "key": "A", "label": "A" } } }] }),
//!         "en-us",
//!     )
//!     .unwrap();
//! session.update_keymap(MatrixItemId(0), Key::new("B", "B")).unwrap();
//!
//! let exported = session.current_config().unwrap();
//! assert_eq!(exported["matrix"][0]["layers"]["0"]["key"], "B");
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod ids;
pub mod locales;
pub mod models;
pub mod parser;
pub mod services;
pub mod state;

pub use error::{ConfigureError, ConfigureResult};
