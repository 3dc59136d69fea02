//! C FFI boundary for label-check.
//!
//! The host framework drives layers through opaque handles: fill an
//! `LcParams` block, create a layer by its registered type name, run
//! shape inference whenever input shapes change, then evaluate forward
//! over raw buffers. All functions return `LcStatus`; details of the
//! most recent failure are available via `lc_last_error`.

mod context;
mod error;
mod types;

pub use context::*;
pub use error::*;
pub use types::*;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use lc_layer::{global_registry, LayerError, LayerParams};
use lc_tensor::{Shape, Tensor};

/// Execute a closure that returns an `LcStatus`, catching any panics
/// and converting them into `LcStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> LcStatus>(f: F) -> LcStatus {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            LcStatus::ErrorInternal
        }
    }
}

/// Map a layer error onto the coarse FFI status classification.
fn status_for(err: &LayerError) -> LcStatus {
    match err {
        LayerError::MissingParam(_)
        | LayerError::ParamType { .. }
        | LayerError::InvalidParam { .. }
        | LayerError::UnknownLayer(_)
        | LayerError::DuplicateLayer(_) => LcStatus::ErrorConfig,
        LayerError::ShapeMismatch(_) | LayerError::Tensor(_) => LcStatus::ErrorShape,
        LayerError::LabelOutOfRange { .. } => LcStatus::ErrorForward,
    }
}

/// Parse a required C string argument.
fn cstr_arg<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, LcStatus> {
    if ptr.is_null() {
        set_last_error(format!("{} is null", what));
        return Err(LcStatus::ErrorInvalidArgument);
    }
    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(s) => Ok(s),
        Err(e) => {
            set_last_error(format!("invalid {}: {}", what, e));
            Err(LcStatus::ErrorInvalidArgument)
        }
    }
}

/// Create a new, empty parameter block.
///
/// On success, writes a heap-allocated `LcParams` pointer into
/// `*params_out` and returns `LcStatus::Ok`. The caller must later call
/// `lc_params_destroy` to free the block.
#[no_mangle]
pub extern "C" fn lc_params_create(params_out: *mut *mut LcParams) -> LcStatus {
    catch_panic(|| {
        if params_out.is_null() {
            set_last_error("params_out is null".to_string());
            return LcStatus::ErrorInvalidArgument;
        }
        let params = Box::new(LcParams::new());
        unsafe {
            *params_out = Box::into_raw(params);
        }
        LcStatus::Ok
    })
}

/// Destroy a parameter block previously created by `lc_params_create`.
///
/// Passing a null pointer is a no-op and returns `LcStatus::Ok`.
#[no_mangle]
pub unsafe extern "C" fn lc_params_destroy(params: *mut LcParams) -> LcStatus {
    if params.is_null() {
        return LcStatus::Ok;
    }
    drop(Box::from_raw(params));
    LcStatus::Ok
}

/// Set an integer parameter.
#[no_mangle]
pub unsafe extern "C" fn lc_params_set_int(
    params: *mut LcParams,
    key: *const c_char,
    value: i64,
) -> LcStatus {
    catch_panic(|| {
        if params.is_null() {
            set_last_error("params is null".to_string());
            return LcStatus::ErrorInvalidArgument;
        }
        let key = match cstr_arg(key, "key") {
            Ok(k) => k,
            Err(status) => return status,
        };
        let params = unsafe { &mut *params };
        params.params.set(key, value);
        LcStatus::Ok
    })
}

/// Set a floating-point parameter.
#[no_mangle]
pub unsafe extern "C" fn lc_params_set_double(
    params: *mut LcParams,
    key: *const c_char,
    value: f64,
) -> LcStatus {
    catch_panic(|| {
        if params.is_null() {
            set_last_error("params is null".to_string());
            return LcStatus::ErrorInvalidArgument;
        }
        let key = match cstr_arg(key, "key") {
            Ok(k) => k,
            Err(status) => return status,
        };
        let params = unsafe { &mut *params };
        params.params.set(key, value);
        LcStatus::Ok
    })
}

/// Set a boolean parameter.
#[no_mangle]
pub unsafe extern "C" fn lc_params_set_bool(
    params: *mut LcParams,
    key: *const c_char,
    value: bool,
) -> LcStatus {
    catch_panic(|| {
        if params.is_null() {
            set_last_error("params is null".to_string());
            return LcStatus::ErrorInvalidArgument;
        }
        let key = match cstr_arg(key, "key") {
            Ok(k) => k,
            Err(status) => return status,
        };
        let params = unsafe { &mut *params };
        params.params.set(key, value);
        LcStatus::Ok
    })
}

/// Set a string parameter.
#[no_mangle]
pub unsafe extern "C" fn lc_params_set_str(
    params: *mut LcParams,
    key: *const c_char,
    value: *const c_char,
) -> LcStatus {
    catch_panic(|| {
        if params.is_null() {
            set_last_error("params is null".to_string());
            return LcStatus::ErrorInvalidArgument;
        }
        let key = match cstr_arg(key, "key") {
            Ok(k) => k,
            Err(status) => return status,
        };
        let value = match cstr_arg(value, "value") {
            Ok(v) => v,
            Err(status) => return status,
        };
        let params = unsafe { &mut *params };
        params.params.set(key, value);
        LcStatus::Ok
    })
}

/// Instantiate a layer by its registered type name.
///
/// The layer is constructed through the process-wide registry and set up
/// against `params`; a null `params` means "all defaults". On success,
/// writes a heap-allocated `LcLayer` pointer into `*layer_out`. The
/// caller must later call `lc_layer_destroy` to free the handle.
#[no_mangle]
pub unsafe extern "C" fn lc_layer_create(
    type_name: *const c_char,
    params: *const LcParams,
    layer_out: *mut *mut LcLayer,
) -> LcStatus {
    catch_panic(|| {
        if layer_out.is_null() {
            set_last_error("layer_out is null".to_string());
            return LcStatus::ErrorInvalidArgument;
        }
        let type_name = match cstr_arg(type_name, "type_name") {
            Ok(n) => n,
            Err(status) => return status,
        };

        let defaults = LayerParams::new();
        let block = if params.is_null() {
            &defaults
        } else {
            unsafe { &(*params).params }
        };

        let layer = match global_registry().create(type_name, block) {
            Ok(l) => l,
            Err(e) => {
                let status = status_for(&e);
                set_last_error(format!("failed to create layer: {}", e));
                return status;
            }
        };

        let handle = Box::new(LcLayer::new(layer));
        unsafe {
            *layer_out = Box::into_raw(handle);
        }
        LcStatus::Ok
    })
}

/// Destroy a layer previously created by `lc_layer_create`.
///
/// Passing a null pointer is a no-op and returns `LcStatus::Ok`.
#[no_mangle]
pub unsafe extern "C" fn lc_layer_destroy(layer: *mut LcLayer) -> LcStatus {
    if layer.is_null() {
        return LcStatus::Ok;
    }
    drop(Box::from_raw(layer));
    LcStatus::Ok
}

/// Returns true if the layer participates in gradient computation.
///
/// The host graph engine uses this to skip gradient routing entirely for
/// diagnostic layers. Returns false for a null handle.
#[no_mangle]
pub unsafe extern "C" fn lc_layer_is_differentiable(layer: *const LcLayer) -> bool {
    if layer.is_null() {
        return false;
    }
    let layer = &*layer;
    layer.layer.backward_mode() == lc_layer::BackwardMode::Differentiable
}

/// Run shape inference against new input shapes.
///
/// `pred_dims`/`label_dims` describe the prediction and label tensors.
/// On success the inferred output shape is written into the caller's
/// `out_dims` buffer (capacity `out_dims_cap` entries) with its rank in
/// `*out_ndim`, and the shapes are cached in the handle for subsequent
/// `lc_layer_forward` calls.
#[no_mangle]
pub unsafe extern "C" fn lc_layer_reshape(
    layer: *mut LcLayer,
    pred_dims: *const usize,
    pred_ndim: usize,
    label_dims: *const usize,
    label_ndim: usize,
    out_dims: *mut usize,
    out_dims_cap: usize,
    out_ndim: *mut usize,
) -> LcStatus {
    catch_panic(|| {
        if layer.is_null()
            || (pred_ndim > 0 && pred_dims.is_null())
            || (label_ndim > 0 && label_dims.is_null())
            || out_ndim.is_null()
        {
            set_last_error("null argument".to_string());
            return LcStatus::ErrorInvalidArgument;
        }
        let handle = unsafe { &mut *layer };

        let pred_shape = Shape::from_slice(if pred_ndim == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(pred_dims, pred_ndim) }
        });
        let label_shape = Shape::from_slice(if label_ndim == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(label_dims, label_ndim) }
        });

        let output_shape = match handle.layer.reshape(&[&pred_shape, &label_shape]) {
            Ok(s) => s,
            Err(e) => {
                let status = status_for(&e);
                set_last_error(format!("reshape failed: {}", e));
                return status;
            }
        };

        if output_shape.ndim() > out_dims_cap || (output_shape.ndim() > 0 && out_dims.is_null()) {
            set_last_error(format!(
                "output dims buffer holds {} entries but the output has rank {}",
                out_dims_cap,
                output_shape.ndim()
            ));
            return LcStatus::ErrorInvalidArgument;
        }
        unsafe {
            for (i, &d) in output_shape.dims().iter().enumerate() {
                *out_dims.add(i) = d;
            }
            *out_ndim = output_shape.ndim();
        }

        handle.pred_shape = Some(pred_shape);
        handle.label_shape = Some(label_shape);
        handle.output_shape = Some(output_shape);
        LcStatus::Ok
    })
}

/// Evaluate the layer forward over raw f32 buffers.
///
/// Buffer lengths must match the shapes cached by the last successful
/// `lc_layer_reshape`; calling before any reshape is an error. `out` is
/// fully overwritten.
#[no_mangle]
pub unsafe extern "C" fn lc_layer_forward(
    layer: *mut LcLayer,
    preds: *const f32,
    preds_len: usize,
    labels: *const f32,
    labels_len: usize,
    out: *mut f32,
    out_len: usize,
) -> LcStatus {
    catch_panic(|| {
        if layer.is_null() || preds.is_null() || labels.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return LcStatus::ErrorInvalidArgument;
        }
        let handle = unsafe { &mut *layer };

        let (pred_shape, label_shape, output_shape) = match (
            handle.pred_shape.as_ref(),
            handle.label_shape.as_ref(),
            handle.output_shape.as_ref(),
        ) {
            (Some(p), Some(l), Some(o)) => (p, l, o),
            _ => {
                set_last_error("lc_layer_reshape has not been run".to_string());
                return LcStatus::ErrorShape;
            }
        };

        if preds_len != pred_shape.numel()
            || labels_len != label_shape.numel()
            || out_len != output_shape.numel()
        {
            set_last_error(format!(
                "buffer lengths {}/{}/{} do not match shapes {}/{}/{}",
                preds_len,
                labels_len,
                out_len,
                pred_shape,
                label_shape,
                output_shape
            ));
            return LcStatus::ErrorInvalidArgument;
        }

        let pred_tensor = Tensor::new(
            unsafe { std::slice::from_raw_parts(preds, preds_len) }.to_vec(),
            pred_shape.clone(),
        );
        let label_tensor = Tensor::new(
            unsafe { std::slice::from_raw_parts(labels, labels_len) }.to_vec(),
            label_shape.clone(),
        );
        let mut out_tensor = Tensor::zeros(output_shape.clone());

        if let Err(e) = handle
            .layer
            .forward(&[&pred_tensor, &label_tensor], &mut out_tensor)
        {
            let status = status_for(&e);
            set_last_error(format!("forward failed: {}", e));
            return status;
        }

        let result = match out_tensor.data_f32() {
            Ok(r) => r,
            Err(e) => {
                set_last_error(format!("output read failed: {}", e));
                return LcStatus::ErrorInternal;
            }
        };
        unsafe {
            std::ptr::copy_nonoverlapping(result.as_ptr(), out, out_len);
        }
        LcStatus::Ok
    })
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned
/// string with `lc_free_string`.
#[no_mangle]
pub extern "C" fn lc_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `lc_last_error`.
#[no_mangle]
pub unsafe extern "C" fn lc_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::ptr;

    fn make_layer(top_k: i64) -> *mut LcLayer {
        let mut params: *mut LcParams = ptr::null_mut();
        assert_eq!(lc_params_create(&mut params), LcStatus::Ok);
        let key = CString::new("top_k").unwrap();
        unsafe {
            assert_eq!(
                lc_params_set_int(params, key.as_ptr(), top_k),
                LcStatus::Ok
            );
        }

        let name = CString::new("CheckLabel").unwrap();
        let mut layer: *mut LcLayer = ptr::null_mut();
        unsafe {
            assert_eq!(
                lc_layer_create(name.as_ptr(), params, &mut layer),
                LcStatus::Ok
            );
            lc_params_destroy(params);
        }
        layer
    }

    #[test]
    fn test_full_evaluation_roundtrip() {
        let layer = make_layer(1);

        let pred_dims = [2usize, 3];
        let label_dims = [2usize];
        let mut out_dims = [0usize; 4];
        let mut out_ndim = 0usize;
        unsafe {
            assert_eq!(
                lc_layer_reshape(
                    layer,
                    pred_dims.as_ptr(),
                    pred_dims.len(),
                    label_dims.as_ptr(),
                    label_dims.len(),
                    out_dims.as_mut_ptr(),
                    out_dims.len(),
                    &mut out_ndim,
                ),
                LcStatus::Ok
            );
        }
        assert_eq!(out_ndim, 1);
        assert_eq!(out_dims[0], 2);

        let preds = [0.1f32, 0.9, 0.3, 0.8, 0.1, 0.1];
        let labels = [1.0f32, 2.0];
        let mut out = [0.0f32; 2];
        unsafe {
            assert_eq!(
                lc_layer_forward(
                    layer,
                    preds.as_ptr(),
                    preds.len(),
                    labels.as_ptr(),
                    labels.len(),
                    out.as_mut_ptr(),
                    out.len(),
                ),
                LcStatus::Ok
            );
            lc_layer_destroy(layer);
        }
        assert_eq!(out, [1.0, 0.0]);
    }

    #[test]
    fn test_forward_before_reshape_is_shape_error() {
        let layer = make_layer(1);
        let preds = [0.0f32; 3];
        let labels = [0.0f32];
        let mut out = [0.0f32];
        unsafe {
            assert_eq!(
                lc_layer_forward(
                    layer,
                    preds.as_ptr(),
                    preds.len(),
                    labels.as_ptr(),
                    labels.len(),
                    out.as_mut_ptr(),
                    out.len(),
                ),
                LcStatus::ErrorShape
            );
            lc_layer_destroy(layer);
        }
        let msg = lc_last_error();
        assert!(!msg.is_null());
        unsafe { lc_free_string(msg as *mut c_char) };
    }

    #[test]
    fn test_unknown_layer_type() {
        let name = CString::new("NoSuchLayer").unwrap();
        let mut layer: *mut LcLayer = ptr::null_mut();
        unsafe {
            assert_eq!(
                lc_layer_create(name.as_ptr(), ptr::null(), &mut layer),
                LcStatus::ErrorConfig
            );
        }
        assert!(layer.is_null());
    }

    #[test]
    fn test_non_differentiable_capability() {
        let layer = make_layer(1);
        unsafe {
            assert!(!lc_layer_is_differentiable(layer));
            lc_layer_destroy(layer);
        }
    }

    #[test]
    fn test_bad_top_k_is_config_error() {
        let mut params: *mut LcParams = ptr::null_mut();
        assert_eq!(lc_params_create(&mut params), LcStatus::Ok);
        let key = CString::new("top_k").unwrap();
        let name = CString::new("CheckLabel").unwrap();
        let mut layer: *mut LcLayer = ptr::null_mut();
        unsafe {
            assert_eq!(lc_params_set_int(params, key.as_ptr(), 0), LcStatus::Ok);
            assert_eq!(
                lc_layer_create(name.as_ptr(), params, &mut layer),
                LcStatus::ErrorConfig
            );
            lc_params_destroy(params);
        }
    }
}
