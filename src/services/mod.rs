//! Service layer for editing operations.
//!
//! This module contains the editing session that coordinates the store, the
//! normalizer/mangler and the key-name tables.

pub mod configure;

pub use configure::Configurator;
