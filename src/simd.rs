//! Vector kernels.
//!
//! With the `innr` feature (default) the distance kernels come from the
//! `innr` crate, which dispatches to SIMD at runtime. Without it a portable
//! fallback is used, written over `chunks_exact(4)` with independent
//! accumulators so LLVM can auto-vectorize it.
//!
//! ```rust
//! use vecprep::simd::{dot, norm, l2_distance};
//!
//! let a = [3.0_f32, 4.0];
//! let b = [0.0_f32, 0.0];
//!
//! assert_eq!(dot(&a, &a), 25.0);
//! assert_eq!(norm(&a), 5.0);
//! assert_eq!(l2_distance(&a, &b), 5.0);
//! ```
//!
//! Callers pass equal-length slices. Checked wrappers live in
//! [`crate::distance`].

#[cfg(feature = "innr")]
pub use innr::{cosine, dot, l2_distance, l2_distance_squared, norm};

#[cfg(not(feature = "innr"))]
mod fallback {
    //! Portable kernels used when `innr` is disabled.

    const LANES: usize = 4;
    const NORM_EPSILON: f32 = 1e-9;

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(a: &[f32], b: &[f32]) -> f32 {
        let n = a.len().min(b.len());
        let (a, b) = (&a[..n], &b[..n]);

        let mut acc = [0.0f32; LANES];
        let a_chunks = a.chunks_exact(LANES);
        let b_chunks = b.chunks_exact(LANES);
        let tail: f32 = a_chunks
            .remainder()
            .iter()
            .zip(b_chunks.remainder())
            .map(|(x, y)| x * y)
            .sum();

        for (ca, cb) in a_chunks.zip(b_chunks) {
            for l in 0..LANES {
                acc[l] += ca[l] * cb[l];
            }
        }

        acc.iter().sum::<f32>() + tail
    }

    /// L2 norm of a vector.
    #[inline]
    #[must_use]
    pub fn norm(v: &[f32]) -> f32 {
        dot(v, v).sqrt()
    }

    /// Cosine similarity. Zero when either vector has (near) zero norm.
    #[inline]
    #[must_use]
    pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let na = norm(a);
        let nb = norm(b);
        if na > NORM_EPSILON && nb > NORM_EPSILON {
            dot(a, b) / (na * nb)
        } else {
            0.0
        }
    }

    /// Squared L2 distance (cheaper when only ordering matters).
    #[inline]
    #[must_use]
    pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
        let n = a.len().min(b.len());
        let (a, b) = (&a[..n], &b[..n]);

        let mut acc = [0.0f32; LANES];
        let a_chunks = a.chunks_exact(LANES);
        let b_chunks = b.chunks_exact(LANES);
        let tail: f32 = a_chunks
            .remainder()
            .iter()
            .zip(b_chunks.remainder())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();

        for (ca, cb) in a_chunks.zip(b_chunks) {
            for l in 0..LANES {
                let d = ca[l] - cb[l];
                acc[l] += d * d;
            }
        }

        acc.iter().sum::<f32>() + tail
    }

    /// L2 (Euclidean) distance.
    #[inline]
    #[must_use]
    pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
        l2_distance_squared(a, b).sqrt()
    }

}

#[cfg(not(feature = "innr"))]
pub use fallback::*;

// Dense updates (always local, innr doesn't provide these)

/// `y += alpha * x`, element-wise.
#[inline]
pub fn axpy(alpha: f32, x: &[f32], y: &mut [f32]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// `v *= alpha`, element-wise.
#[inline]
pub fn scale(alpha: f32, v: &mut [f32]) {
    v.iter_mut().for_each(|x| *x *= alpha);
}
