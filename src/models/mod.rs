//! Data models for the editable keyboard configuration.
//!
//! Each persisted shape has a `Persisted*` serde type next to the editable
//! type it normalizes into. Models are independent of the store and of the
//! mutation operations.

pub mod animation;
pub mod config_model;
pub mod define;
pub mod key;
pub mod led;
pub mod macros;
pub mod matrix;

pub use animation::{Animation, AnimationPatch, PersistedAnimation, PersistedFrames};
pub use config_model::{Animations, ConfigModel, CustomKll, Headers, Macros};
pub use define::{Define, PersistedDefine};
pub use key::{Key, PersistedKey};
pub use led::Led;
pub use macros::{Macro, PersistedMacro, NEW_MACRO_NAME};
pub use matrix::{layer_key, Matrix, MatrixItem, MatrixItemId};
