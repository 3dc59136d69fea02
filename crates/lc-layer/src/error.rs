use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayerError {
    #[error("missing parameter: {0}")]
    MissingParam(String),
    #[error("type mismatch for parameter '{key}': expected {expected}, got {got}")]
    ParamType {
        key: String,
        expected: String,
        got: String,
    },
    #[error("invalid parameter '{key}': {reason}")]
    InvalidParam { key: String, reason: String },
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("label value {label} out of range [0, {num_classes})")]
    LabelOutOfRange { label: i64, num_classes: usize },
    #[error("unknown layer type: {0}")]
    UnknownLayer(String),
    #[error("layer type '{0}' is already registered")]
    DuplicateLayer(String),
    #[error("tensor error: {0}")]
    Tensor(#[from] lc_tensor::TensorError),
}

pub type Result<T> = std::result::Result<T, LayerError>;
