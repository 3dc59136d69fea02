use crate::error::{Result, TensorError};
use std::fmt;

/// A tensor shape, wrapping a vector of dimension sizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Create a new shape from a vector of dimensions.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Create a shape from a slice of dimensions.
    pub fn from_slice(dims: &[usize]) -> Self {
        Shape {
            dims: dims.to_vec(),
        }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements (product of all dimension sizes).
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the size of dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn dim(&self, i: usize) -> usize {
        self.dims[i]
    }

    /// Returns a reference to the underlying dimension sizes.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Resolve a possibly negative axis index into `[0, ndim)`.
    ///
    /// Negative values index from the end, so `-1` addresses the last
    /// dimension. Out-of-range axes are an error.
    pub fn canonical_axis(&self, axis: i64) -> Result<usize> {
        let ndim = self.ndim() as i64;
        let resolved = if axis < 0 { ndim + axis } else { axis };
        if resolved < 0 || resolved >= ndim {
            return Err(TensorError::InvalidAxis {
                axis,
                ndim: self.ndim(),
            });
        }
        Ok(resolved as usize)
    }

    /// Product of the dimension sizes in `[start, end)`.
    ///
    /// An empty range yields 1.
    ///
    /// # Panics
    /// Panics if `start > end` or `end > ndim()`.
    pub fn count_range(&self, start: usize, end: usize) -> usize {
        self.dims[start..end].iter().product()
    }

    /// Product of the dimension sizes from `start` to the end.
    ///
    /// # Panics
    /// Panics if `start > ndim()`.
    pub fn count_from(&self, start: usize) -> usize {
        self.dims[start..].iter().product()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::from_slice(dims)
    }
}
