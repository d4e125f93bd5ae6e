//! N-dimensional float vectors.
//!
//! Used to normalize the displacement between two cells when deciding
//! which way a bug faces. Arithmetic between vectors of different lengths
//! is a precondition violation and returns
//! [`VectorError::DimensionMismatch`] instead of truncating.

use serde::{Deserialize, Serialize};

/// Errors raised by vector arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VectorError {
    /// The two operands have different dimensions.
    #[error("vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch {
        /// Dimension of the left operand.
        left: usize,
        /// Dimension of the right operand.
        right: usize,
    },
}

/// A vector of `f64` components with an arbitrary dimension.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VecN {
    components: Vec<f64>,
}

impl VecN {
    /// Create a vector from its components.
    pub const fn new(components: Vec<f64>) -> Self {
        Self { components }
    }

    /// Number of components.
    pub fn dimension(&self) -> usize {
        self.components.len()
    }

    /// Borrow the components.
    pub fn components(&self) -> &[f64] {
        &self.components
    }

    /// Component at `index`, if present.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.components.get(index).copied()
    }

    fn check_dimension(&self, other: &Self) -> Result<(), VectorError> {
        if self.dimension() == other.dimension() {
            Ok(())
        } else {
            Err(VectorError::DimensionMismatch {
                left: self.dimension(),
                right: other.dimension(),
            })
        }
    }

    /// Component-wise sum.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::DimensionMismatch`] if the dimensions differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self, VectorError> {
        self.check_dimension(other)?;
        Ok(Self::new(
            self.components
                .iter()
                .zip(&other.components)
                .map(|(a, b)| a + b)
                .collect(),
        ))
    }

    /// Component-wise difference `self - other`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::DimensionMismatch`] if the dimensions differ.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, VectorError> {
        self.check_dimension(other)?;
        Ok(Self::new(
            self.components
                .iter()
                .zip(&other.components)
                .map(|(a, b)| a - b)
                .collect(),
        ))
    }

    /// Dot product.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::DimensionMismatch`] if the dimensions differ.
    pub fn dot(&self, other: &Self) -> Result<f64, VectorError> {
        self.check_dimension(other)?;
        Ok(self
            .components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| a * b)
            .sum())
    }

    /// Multiply every component by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.components.iter().map(|c| c * factor).collect())
    }

    /// Euclidean length.
    pub fn magnitude(&self) -> f64 {
        self.components.iter().map(|c| c * c).sum::<f64>().sqrt()
    }

    /// Unit vector in the same direction. The zero vector normalizes to
    /// itself.
    pub fn normalized(&self) -> Self {
        let magnitude = self.magnitude();
        if magnitude > 0.0 {
            self.scale(magnitude.recip())
        } else {
            self.clone()
        }
    }
}
