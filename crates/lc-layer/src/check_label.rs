use std::cmp::Ordering;

use lc_tensor::{DType, Shape, Tensor};
use log::debug;

use crate::error::{LayerError, Result};
use crate::layer::{check_input_arity, Layer};
use crate::params::LayerParams;

/// Static configuration for the CheckLabel layer.
#[derive(Debug, Clone)]
pub struct CheckLabelConfig {
    /// Number of highest-scoring classes considered "correct".
    pub top_k: usize,
    /// Axis of the prediction tensor enumerating classes. Supports
    /// negative indexing.
    pub axis: i64,
    /// Label value whose positions are excluded from the check.
    pub ignore_label: Option<i64>,
    /// Value written to the output at ignored positions.
    pub ignore_correct_label: f32,
}

impl Default for CheckLabelConfig {
    fn default() -> Self {
        Self {
            top_k: 1,
            axis: 1,
            ignore_label: None,
            ignore_correct_label: -1.0,
        }
    }
}

impl CheckLabelConfig {
    /// Parse the configuration from a layer parameter block.
    ///
    /// Recognized keys: `top_k`, `axis`, `has_ignore_label`,
    /// `ignore_label`, `ignore_correct_label`. Ignore checking is
    /// enabled by the presence of `ignore_label` unless
    /// `has_ignore_label` says otherwise.
    pub fn from_params(params: &LayerParams) -> Result<Self> {
        let defaults = CheckLabelConfig::default();

        let top_k = params.get_i64_or("top_k", defaults.top_k as i64)?;
        if top_k < 1 {
            return Err(LayerError::InvalidParam {
                key: "top_k".to_string(),
                reason: format!("must be a positive integer, got {}", top_k),
            });
        }

        let axis = params.get_i64_or("axis", defaults.axis)?;

        let has_ignore_label =
            params.get_bool_or("has_ignore_label", params.contains("ignore_label"))?;
        let ignore_label = if has_ignore_label {
            Some(params.get_i64("ignore_label")?)
        } else {
            None
        };

        let ignore_correct_label =
            params.get_f64_or("ignore_correct_label", defaults.ignore_correct_label as f64)? as f32;

        Ok(Self {
            top_k: top_k as usize,
            axis,
            ignore_label,
            ignore_correct_label,
        })
    }
}

/// Checks whether the true label ranks among the top-k scoring classes.
///
/// Inputs: predictions shaped `outer x num_classes x inner` around the
/// configured class axis, and integer-valued labels with one entry per
/// `(outer, inner)` position. The output has the label tensor's shape
/// and holds `1.0` where the label is in the top-k, `0.0` where it is
/// not, and the configured substitute value at ignored positions.
///
/// Produces diagnostics only; no gradient is propagated.
pub struct CheckLabelLayer {
    config: CheckLabelConfig,
    outer_num: usize,
    inner_num: usize,
    num_classes: usize,
}

impl CheckLabelLayer {
    pub fn new() -> Self {
        Self {
            config: CheckLabelConfig::default(),
            outer_num: 0,
            inner_num: 0,
            // Zero until the first successful reshape; forward rejects
            // evaluation while this is unset.
            num_classes: 0,
        }
    }

    pub fn config(&self) -> &CheckLabelConfig {
        &self.config
    }

    /// True if the label is among the `top_k` largest scores.
    ///
    /// Ordering is by descending score; equal scores break ties by
    /// ascending class index, so the selection is deterministic whether
    /// or not the label sits inside a tied group.
    fn top_k_hit(&self, scratch: &mut [(f32, usize)], label: usize) -> bool {
        scratch.sort_unstable_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        scratch[..self.config.top_k].iter().any(|&(_, k)| k == label)
    }
}

impl Default for CheckLabelLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for CheckLabelLayer {
    fn type_name(&self) -> &'static str {
        "CheckLabel"
    }

    fn min_inputs(&self) -> usize {
        2
    }

    fn setup(&mut self, params: &LayerParams) -> Result<()> {
        self.config = CheckLabelConfig::from_params(params)?;
        debug!(
            "CheckLabel setup: top_k={}, axis={}, ignore_label={:?}",
            self.config.top_k, self.config.axis, self.config.ignore_label
        );
        Ok(())
    }

    fn reshape(&mut self, input_shapes: &[&Shape]) -> Result<Shape> {
        check_input_arity(&*self, input_shapes.len())?;
        let preds = input_shapes[0];
        let labels = input_shapes[1];

        let label_axis = preds.canonical_axis(self.config.axis)?;
        let num_classes = preds.dim(label_axis);
        if self.config.top_k > num_classes {
            return Err(LayerError::InvalidParam {
                key: "top_k".to_string(),
                reason: format!(
                    "top_k {} exceeds the {} classes on axis {}",
                    self.config.top_k, num_classes, label_axis
                ),
            });
        }

        let outer_num = preds.count_range(0, label_axis);
        let inner_num = preds.count_from(label_axis + 1);
        if outer_num * inner_num != labels.numel() {
            return Err(LayerError::ShapeMismatch(format!(
                "label count {} does not match the {}x{} prediction positions \
                 (predictions {}, labels {})",
                labels.numel(),
                outer_num,
                inner_num,
                preds,
                labels
            )));
        }

        self.outer_num = outer_num;
        self.inner_num = inner_num;
        self.num_classes = num_classes;
        Ok(labels.clone())
    }

    fn forward(&self, inputs: &[&Tensor], output: &mut Tensor) -> Result<()> {
        check_input_arity(self, inputs.len())?;
        let preds = inputs[0];
        let labels = inputs[1];

        if self.num_classes == 0 {
            return Err(LayerError::ShapeMismatch(
                "forward called before a successful reshape".to_string(),
            ));
        }
        if output.shape() != labels.shape() {
            return Err(LayerError::ShapeMismatch(format!(
                "output shape {} does not match label shape {}",
                output.shape(),
                labels.shape()
            )));
        }
        if labels.numel() != self.outer_num * self.inner_num
            || preds.numel() != self.outer_num * self.num_classes * self.inner_num
        {
            return Err(LayerError::ShapeMismatch(
                "input shapes changed since the last reshape".to_string(),
            ));
        }

        // Widened copies kept alive for the duration of the scan.
        let preds_w;
        let pred_data = match preds.dtype() {
            DType::F32 => preds.data_f32()?,
            DType::F16 => {
                preds_w = preds.to_f32();
                preds_w.data_f32()?
            }
        };
        let labels_w;
        let label_data = match labels.dtype() {
            DType::F32 => labels.data_f32()?,
            DType::F16 => {
                labels_w = labels.to_f32();
                labels_w.data_f32()?
            }
        };
        let out_data = output.data_f32_mut()?;

        let inner = self.inner_num;
        let dim = self.num_classes * inner;
        let mut scratch: Vec<(f32, usize)> = Vec::with_capacity(self.num_classes);

        for i in 0..self.outer_num {
            for j in 0..inner {
                let slot = i * inner + j;
                let label_value = label_data[slot] as i64;

                if self.config.ignore_label == Some(label_value) {
                    out_data[slot] = self.config.ignore_correct_label;
                    continue;
                }
                if label_value < 0 || label_value as usize >= self.num_classes {
                    return Err(LayerError::LabelOutOfRange {
                        label: label_value,
                        num_classes: self.num_classes,
                    });
                }

                scratch.clear();
                for k in 0..self.num_classes {
                    scratch.push((pred_data[i * dim + k * inner + j], k));
                }
                let hit = self.top_k_hit(&mut scratch, label_value as usize);
                out_data[slot] = if hit { 1.0 } else { 0.0 };
            }
        }
        Ok(())
    }
}
