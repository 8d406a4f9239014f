//! Fast Walsh-Hadamard transform.
//!
//! Multiplies a vector by the (implicit) $n \times n$ Hadamard matrix $H_n$
//! in $O(n \log n)$ using the iterative butterfly network:
//!
//! ```text
//! for h in 1, 2, 4, ... < n:
//!     for each block of 2h elements:
//!         (x[j], x[j+h]) <- (x[j] + x[j+h], x[j] - x[j+h])   for j in first half
//! ```
//!
//! $H_n H_n = n I$, so applying the transform twice and scaling by
//! $1/\sqrt{n}$ after each pass recovers the input. [`normalize_fwht`] does
//! that scaling; [`HadamardTransform::apply_normalized`] does both steps.
//!
//! The transform spreads energy evenly across coordinates, which makes
//! per-coordinate quantizers and sign hashes behave much better on
//! embeddings whose variance is concentrated in a few dimensions.

use crate::error::{PrepError, Result};
use crate::simd;

/// Check that `len` is a power of two and at least 2.
#[inline]
fn check_len(len: usize) -> Result<()> {
    if len < 2 || !len.is_power_of_two() {
        return Err(PrepError::NotPowerOfTwo { len });
    }
    Ok(())
}

/// Unnormalized in-place Walsh-Hadamard transform.
///
/// The length is validated before any element is touched, so on error the
/// input is left exactly as it was.
///
/// # Errors
///
/// [`PrepError::NotPowerOfTwo`] if `x.len()` is not a power of two `>= 2`.
pub fn fwht(x: &mut [f32]) -> Result<()> {
    check_len(x.len())?;
    butterfly(x);
    Ok(())
}

/// Divide every element by `sqrt(x.len())`. No-op on an empty slice.
pub fn normalize_fwht(x: &mut [f32]) {
    if x.is_empty() {
        return;
    }
    simd::scale(1.0 / (x.len() as f32).sqrt(), x);
}

// Preconditions: `x.len()` is a power of two and at least 2.
fn butterfly(x: &mut [f32]) {
    let n = x.len();
    debug_assert!(n.is_power_of_two() && n >= 2);

    let mut h = 1;
    while h < n {
        for block in x.chunks_exact_mut(h << 1) {
            let (left, right) = block.split_at_mut(h);
            for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                let a = *l;
                let b = *r;
                *l = a + b;
                *r = a - b;
            }
        }
        h <<= 1;
    }
}

/// A Hadamard transform bound to a fixed, validated dimension.
///
/// Construction rejects bad dimensions up front so a batch of vectors can be
/// transformed without re-validating each call's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HadamardTransform {
    dim: usize,
}

impl HadamardTransform {
    /// Create a transform for vectors of length `dim`.
    ///
    /// # Errors
    ///
    /// [`PrepError::NotPowerOfTwo`] unless `dim` is a power of two `>= 2`.
    pub fn new(dim: usize) -> Result<Self> {
        check_len(dim)?;
        Ok(Self { dim })
    }

    /// Vector length this transform accepts.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Unnormalized transform, in place.
    pub fn apply(&self, x: &mut [f32]) -> Result<()> {
        self.check_dim(x)?;
        butterfly(x);
        Ok(())
    }

    /// Orthonormal transform ($H x / \sqrt{n}$), in place. Self-inverse.
    pub fn apply_normalized(&self, x: &mut [f32]) -> Result<()> {
        self.apply(x)?;
        normalize_fwht(x);
        Ok(())
    }

    fn check_dim(&self, x: &[f32]) -> Result<()> {
        if x.len() != self.dim {
            return Err(PrepError::DimensionMismatch {
                expected: self.dim,
                actual: x.len(),
            });
        }
        Ok(())
    }
}
