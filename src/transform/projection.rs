//! Gaussian random projection (Johnson-Lindenstrauss).
//!
//! A [`RandomProjector`] holds one $D \times k$ matrix $R$ with i.i.d.
//! $\mathcal{N}(0, 1)$ entries and maps $v \mapsto vR$.
//!
//! # Why the matrix must be shared
//!
//! The JL guarantee is a statement about a *single* random subspace: for a
//! fixed $R$, pairwise distances are preserved up to a common factor of
//! roughly $\sqrt{k}$ with distortion shrinking like $O(1/\sqrt{k})$. Two
//! vectors projected with different matrices live in unrelated spaces and
//! their distance means nothing. Build the projector once per `(D, k)` and
//! reuse it (it is `Send + Sync` and read-only after construction).
//!
//! Entries are not scaled by $1/\sqrt{k}$, so absolute distances grow; ratios
//! between distances are what carry over.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::debug;

use crate::error::{PrepError, Result};
use crate::simd;

/// Fixed Gaussian projection from `original_dim` down to `projected_dim`.
#[derive(Debug, Clone)]
pub struct RandomProjector {
    original_dim: usize,
    projected_dim: usize,
    seed: u64,
    /// Row-major `original_dim x projected_dim`.
    matrix: Vec<f32>,
}

impl RandomProjector {
    /// Build a projector with a freshly drawn seed.
    ///
    /// # Errors
    ///
    /// [`PrepError::InvalidParameter`] unless `0 < projected_dim < original_dim`.
    pub fn new(original_dim: usize, projected_dim: usize) -> Result<Self> {
        let seed: u64 = rand::rng().random();
        Self::with_seed(original_dim, projected_dim, seed)
    }

    /// Build a reproducible projector: the same `(D, k, seed)` always yields
    /// the same matrix.
    pub fn with_seed(original_dim: usize, projected_dim: usize, seed: u64) -> Result<Self> {
        if projected_dim == 0 {
            return Err(PrepError::InvalidParameter(
                "projected dimension must be > 0".into(),
            ));
        }
        if projected_dim >= original_dim {
            return Err(PrepError::InvalidParameter(format!(
                "projected dimension {projected_dim} must be smaller than original dimension {original_dim}"
            )));
        }

        let entries = original_dim.checked_mul(projected_dim).ok_or_else(|| {
            PrepError::InvalidParameter(format!(
                "projection matrix {original_dim} x {projected_dim} overflows usize"
            ))
        })?;

        let mut rng = StdRng::seed_from_u64(seed);
        let matrix: Vec<f32> = (0..entries)
            .map(|_| rng.sample::<f32, _>(StandardNormal))
            .collect();

        debug!(original_dim, projected_dim, seed, "built random projection matrix");

        Ok(Self {
            original_dim,
            projected_dim,
            seed,
            matrix,
        })
    }

    /// Input dimension `D`.
    #[inline]
    pub fn original_dim(&self) -> usize {
        self.original_dim
    }

    /// Output dimension `k`.
    #[inline]
    pub fn projected_dim(&self) -> usize {
        self.projected_dim
    }

    /// Seed the matrix was drawn from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Row-major matrix entries.
    #[inline]
    pub fn matrix(&self) -> &[f32] {
        &self.matrix
    }

    /// Project `v` (length `D`) to a new vector of length `k`.
    ///
    /// The input is not modified.
    pub fn project(&self, v: &[f32]) -> Result<Vec<f32>> {
        let mut out = vec![0.0f32; self.projected_dim];
        self.project_into(v, &mut out)?;
        Ok(out)
    }

    /// Project `v` into a caller-provided buffer of length `k`.
    pub fn project_into(&self, v: &[f32], out: &mut [f32]) -> Result<()> {
        if v.len() != self.original_dim {
            return Err(PrepError::DimensionMismatch {
                expected: self.original_dim,
                actual: v.len(),
            });
        }
        if out.len() != self.projected_dim {
            return Err(PrepError::DimensionMismatch {
                expected: self.projected_dim,
                actual: out.len(),
            });
        }

        out.fill(0.0);
        // vR accumulated row by row: out += v[i] * R[i, :]
        for (&vi, row) in v.iter().zip(self.matrix.chunks_exact(self.projected_dim)) {
            if vi != 0.0 {
                simd::axpy(vi, row, out);
            }
        }
        Ok(())
    }

    /// Project every vector in `vectors`, failing on the first mismatch.
    pub fn project_batch(&self, vectors: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        vectors.iter().map(|v| self.project(v)).collect()
    }
}
