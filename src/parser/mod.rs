//! Conversion between the persisted config and the editable model.
//!
//! [`normalize`] reads the firmware-facing JSON document into a
//! [`ConfigModel`](crate::models::ConfigModel); [`mangle`] writes the model
//! back as document fields, and [`merge_over`] lays those over the original
//! document so fields this crate does not interpret survive an export.

pub mod mangle;
pub mod normalize;

pub use mangle::{mangle, merge_over};
pub use normalize::normalize;
