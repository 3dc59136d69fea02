use std::collections::HashMap;

use crate::error::{LayerError, Result};

/// A single layer parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    I64(i64),
    F64(f64),
    Bool(bool),
    Str(String),
}

impl ParamValue {
    /// Returns a human-readable name for the variant (used in error messages).
    fn type_name(&self) -> &'static str {
        match self {
            ParamValue::I64(_) => "I64",
            ParamValue::F64(_) => "F64",
            ParamValue::Bool(_) => "Bool",
            ParamValue::Str(_) => "Str",
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::I64(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::F64(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

/// Structured parameter block a layer is configured from.
///
/// The host framework fills one of these per layer instance; layers read
/// it once during setup. Absent keys fall back to layer defaults via the
/// `_or` getters, while present keys of the wrong type are always an
/// error.
#[derive(Debug, Clone, Default)]
pub struct LayerParams {
    entries: HashMap<String, ParamValue>,
}

impl LayerParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter value under `key`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.entries.insert(key.to_string(), value.into());
    }

    /// Builder-style `set`.
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Retrieve an i64 value by key.
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        match self.entries.get(key) {
            Some(ParamValue::I64(v)) => Ok(*v),
            Some(other) => Err(LayerError::ParamType {
                key: key.to_string(),
                expected: "I64".to_string(),
                got: other.type_name().to_string(),
            }),
            None => Err(LayerError::MissingParam(key.to_string())),
        }
    }

    /// Retrieve an i64 value by key, or `default` when the key is absent.
    pub fn get_i64_or(&self, key: &str, default: i64) -> Result<i64> {
        if self.contains(key) {
            self.get_i64(key)
        } else {
            Ok(default)
        }
    }

    /// Retrieve an f64 value by key.
    pub fn get_f64(&self, key: &str) -> Result<f64> {
        match self.entries.get(key) {
            Some(ParamValue::F64(v)) => Ok(*v),
            Some(other) => Err(LayerError::ParamType {
                key: key.to_string(),
                expected: "F64".to_string(),
                got: other.type_name().to_string(),
            }),
            None => Err(LayerError::MissingParam(key.to_string())),
        }
    }

    /// Retrieve an f64 value by key, or `default` when the key is absent.
    pub fn get_f64_or(&self, key: &str, default: f64) -> Result<f64> {
        if self.contains(key) {
            self.get_f64(key)
        } else {
            Ok(default)
        }
    }

    /// Retrieve a bool value by key.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.entries.get(key) {
            Some(ParamValue::Bool(v)) => Ok(*v),
            Some(other) => Err(LayerError::ParamType {
                key: key.to_string(),
                expected: "Bool".to_string(),
                got: other.type_name().to_string(),
            }),
            None => Err(LayerError::MissingParam(key.to_string())),
        }
    }

    /// Retrieve a bool value by key, or `default` when the key is absent.
    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool> {
        if self.contains(key) {
            self.get_bool(key)
        } else {
            Ok(default)
        }
    }

    /// Retrieve a string value by key.
    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.entries.get(key) {
            Some(ParamValue::Str(s)) => Ok(s.as_str()),
            Some(other) => Err(LayerError::ParamType {
                key: key.to_string(),
                expected: "Str".to_string(),
                got: other.type_name().to_string(),
            }),
            None => Err(LayerError::MissingParam(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get() {
        let params = LayerParams::new()
            .with("top_k", 3i64)
            .with("threshold", 0.5f64)
            .with("strict", true)
            .with("name", "check");
        assert_eq!(params.get_i64("top_k").unwrap(), 3);
        assert_eq!(params.get_f64("threshold").unwrap(), 0.5);
        assert!(params.get_bool("strict").unwrap());
        assert_eq!(params.get_str("name").unwrap(), "check");
    }

    #[test]
    fn test_missing_key() {
        let params = LayerParams::new();
        assert!(matches!(
            params.get_i64("top_k"),
            Err(LayerError::MissingParam(_))
        ));
    }

    #[test]
    fn test_defaults_apply_only_when_absent() {
        let params = LayerParams::new().with("axis", 2i64);
        assert_eq!(params.get_i64_or("axis", 1).unwrap(), 2);
        assert_eq!(params.get_i64_or("top_k", 1).unwrap(), 1);

        // A present key of the wrong type is an error even with a default.
        let bad = LayerParams::new().with("top_k", true);
        assert!(matches!(
            bad.get_i64_or("top_k", 1),
            Err(LayerError::ParamType { .. })
        ));
    }

    #[test]
    fn test_contains() {
        let params = LayerParams::new().with("ignore_label", 255i64);
        assert!(params.contains("ignore_label"));
        assert!(!params.contains("axis"));
    }
}
