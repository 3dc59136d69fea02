use lc_tensor::{Shape, Tensor};

use crate::error::{LayerError, Result};
use crate::params::LayerParams;

/// Gradient capability of a layer.
///
/// A layer declares up front whether it participates in gradient
/// computation, so the host graph engine can skip gradient routing for
/// diagnostic layers instead of dispatching into an empty backward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackwardMode {
    /// The layer propagates a learning signal and expects backward calls.
    Differentiable,
    /// The layer produces diagnostics only; no backward pass exists.
    NonDifferentiable,
}

/// Trait for layers the host framework instantiates and drives.
///
/// The driving contract is: `setup` once with the parameter block, then
/// `reshape` whenever input shapes change, then `forward` any number of
/// times. Implementations hold no state across forward calls beyond
/// their configuration and the counts cached by the last `reshape`.
pub trait Layer: Send + Sync {
    /// Type name this layer registers under (e.g. "CheckLabel").
    fn type_name(&self) -> &'static str;

    /// Minimum number of input tensors the layer requires.
    fn min_inputs(&self) -> usize {
        1
    }

    /// Exact number of output tensors the layer produces.
    fn exact_outputs(&self) -> usize {
        1
    }

    /// Validate the parameter block and store the layer's configuration.
    ///
    /// No side effects beyond internal state assignment.
    fn setup(&mut self, params: &LayerParams) -> Result<()>;

    /// Infer the output shape from the input shapes.
    ///
    /// Must run whenever input shapes change, before any `forward`.
    /// Returns the shape the caller must allocate the output with.
    fn reshape(&mut self, input_shapes: &[&Shape]) -> Result<Shape>;

    /// Evaluate the layer, fully overwriting `output`.
    ///
    /// Inputs are immutable for the duration of the call; the output is
    /// written once per position with no accumulation across calls.
    fn forward(&self, inputs: &[&Tensor], output: &mut Tensor) -> Result<()>;

    /// Gradient capability of this layer.
    fn backward_mode(&self) -> BackwardMode {
        BackwardMode::NonDifferentiable
    }
}

/// Check a layer's input arity against the number of inputs supplied.
pub fn check_input_arity(layer: &dyn Layer, num_inputs: usize) -> Result<()> {
    if num_inputs < layer.min_inputs() {
        return Err(LayerError::ShapeMismatch(format!(
            "layer '{}' requires at least {} inputs, got {}",
            layer.type_name(),
            layer.min_inputs(),
            num_inputs
        )));
    }
    Ok(())
}
