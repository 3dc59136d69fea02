/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LcStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorConfig = 2,
    ErrorShape = 3,
    ErrorForward = 4,
    ErrorInternal = 5,
}
