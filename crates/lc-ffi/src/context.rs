use lc_layer::{Layer, LayerParams};
use lc_tensor::Shape;

/// Opaque parameter-block handle the host fills before creating a layer.
pub struct LcParams {
    pub params: LayerParams,
}

impl Default for LcParams {
    fn default() -> Self {
        Self::new()
    }
}

impl LcParams {
    pub fn new() -> Self {
        Self {
            params: LayerParams::new(),
        }
    }
}

/// Opaque layer handle that owns the layer instance and the shapes
/// cached by the last successful reshape.
pub struct LcLayer {
    pub layer: Box<dyn Layer>,
    pub pred_shape: Option<Shape>,
    pub label_shape: Option<Shape>,
    pub output_shape: Option<Shape>,
}

impl LcLayer {
    pub fn new(layer: Box<dyn Layer>) -> Self {
        Self {
            layer,
            pred_shape: None,
            label_shape: None,
            output_shape: None,
        }
    }
}
