//! `lc-layer` - Diagnostic layer abstraction and implementations for label-check.
//!
//! This crate provides:
//! - The `Layer` trait (setup, shape inference, forward evaluation)
//! - A structured parameter block (`LayerParams`) layers are configured from
//! - A process-wide `LayerRegistry` mapping type names to constructors
//! - The `CheckLabel` layer: per-position top-k label correctness
//!
//! Layers hold no state across forward calls beyond their validated
//! configuration and the counts cached by the last shape inference.

pub mod check_label;
pub mod error;
pub mod layer;
pub mod params;
pub mod registry;

pub use check_label::{CheckLabelConfig, CheckLabelLayer};
pub use error::{LayerError, Result};
pub use layer::{BackwardMode, Layer};
pub use params::{LayerParams, ParamValue};
pub use registry::{global_registry, register_builtin_layers, LayerRegistry};
