//! The preprocessing pipeline: raw vector -> index-ready vector.
//!
//! ```text
//! raw ──> [Hadamard (orthonormal)] ──> [random projection] ──> [L2 normalize] ──> index
//! ```
//!
//! Each stage is optional and configured by [`PreprocessConfig`]. Shapes
//! are validated once, in [`Preprocessor::new`]; per-vector calls only check
//! the input length.
//!
//! Queries must go through the *same* `Preprocessor` instance as the
//! indexed vectors: the projection matrix is drawn at construction, and a
//! second instance without a fixed seed draws a different one.

use tracing::debug;

use crate::config::{IndexStrategy, PreprocessConfig};
use crate::error::{PrepError, Result};
use crate::transform::{HadamardTransform, RandomProjector};
use crate::vector_ops;

/// Configured, reusable preprocessing pipeline.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    input_dim: usize,
    hadamard: Option<HadamardTransform>,
    projector: Option<RandomProjector>,
    normalize: bool,
    index_strategy: IndexStrategy,
}

impl Preprocessor {
    /// Validate `config` against `input_dim` and build every stage.
    ///
    /// # Errors
    ///
    /// - [`PrepError::NotPowerOfTwo`] if the Hadamard stage is enabled and
    ///   `input_dim` is not a power of two.
    /// - [`PrepError::DimensionMismatch`] if the projection's
    ///   `original_dim` differs from `input_dim`.
    /// - [`PrepError::InvalidParameter`] for a non-reducing projection.
    pub fn new(input_dim: usize, config: &PreprocessConfig) -> Result<Self> {
        if input_dim == 0 {
            return Err(PrepError::InvalidParameter("input dimension must be > 0".into()));
        }

        let hadamard = config
            .hadamard
            .then(|| HadamardTransform::new(input_dim))
            .transpose()?;

        let projector = match config.projection {
            Some(p) if p.original_dim != input_dim => {
                return Err(PrepError::DimensionMismatch {
                    expected: input_dim,
                    actual: p.original_dim,
                });
            }
            Some(p) => Some(match p.seed {
                Some(seed) => RandomProjector::with_seed(p.original_dim, p.projected_dim, seed)?,
                None => RandomProjector::new(p.original_dim, p.projected_dim)?,
            }),
            None => None,
        };

        let pre = Self {
            input_dim,
            hadamard,
            projector,
            normalize: config.normalize,
            index_strategy: config.index_strategy,
        };
        debug!(
            input_dim,
            output_dim = pre.output_dim(),
            hadamard = pre.hadamard.is_some(),
            projection = pre.projector.is_some(),
            normalize = pre.normalize,
            index_strategy = %pre.index_strategy,
            "built preprocessor"
        );
        Ok(pre)
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Dimension of processed vectors.
    pub fn output_dim(&self) -> usize {
        self.projector
            .as_ref()
            .map_or(self.input_dim, RandomProjector::projected_dim)
    }

    pub fn index_strategy(&self) -> IndexStrategy {
        self.index_strategy
    }

    pub fn projector(&self) -> Option<&RandomProjector> {
        self.projector.as_ref()
    }

    /// Run every configured stage on `vector`, returning a new vector of
    /// length [`Self::output_dim`].
    pub fn process(&self, vector: &[f32]) -> Result<Vec<f32>> {
        if vector.len() != self.input_dim {
            return Err(PrepError::DimensionMismatch {
                expected: self.input_dim,
                actual: vector.len(),
            });
        }

        let mut v = vector.to_vec();
        if let Some(h) = &self.hadamard {
            h.apply_normalized(&mut v)?;
        }
        if let Some(p) = &self.projector {
            v = p.project(&v)?;
        }
        if self.normalize {
            vector_ops::normalize(&mut v);
        }
        Ok(v)
    }

    /// [`Self::process`] over a batch; fails on the first bad vector.
    pub fn process_batch(&self, vectors: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        vectors.iter().map(|v| self.process(v)).collect()
    }

    /// Mean-pool token embeddings, then run the pipeline on the result.
    pub fn process_tokens(&self, batch: &vector_ops::TokenEmbeddingBatch) -> Result<Vec<f32>> {
        self.process(&batch.mean_pooling())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectionConfig;

    #[test]
    fn default_config_only_normalizes() {
        let p = Preprocessor::new(2, &PreprocessConfig::default()).unwrap();
        let out = p.process(&[3.0, 4.0]).unwrap();
        assert!((out[0] - 0.6).abs() < 1e-6 && (out[1] - 0.8).abs() < 1e-6);
        assert_eq!(p.output_dim(), 2);
    }

    #[test]
    fn hadamard_requires_power_of_two() {
        assert!(matches!(
            Preprocessor::new(100, &PreprocessConfig::rotated()),
            Err(PrepError::NotPowerOfTwo { len: 100 })
        ));
        assert!(Preprocessor::new(128, &PreprocessConfig::rotated()).is_ok());
    }

    #[test]
    fn rotation_preserves_norm_before_normalizing() {
        let config = PreprocessConfig {
            normalize: false,
            ..PreprocessConfig::rotated()
        };
        let p = Preprocessor::new(4, &config).unwrap();
        let out = p.process(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 30.0_f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn projection_dims_must_line_up() {
        let bad = PreprocessConfig::projected(64, 16, Some(1));
        assert!(matches!(
            Preprocessor::new(32, &bad),
            Err(PrepError::DimensionMismatch {
                expected: 32,
                actual: 64
            })
        ));
        let non_reducing = PreprocessConfig::projected(32, 32, Some(1));
        assert!(matches!(
            Preprocessor::new(32, &non_reducing),
            Err(PrepError::InvalidParameter(_))
        ));
    }

    #[test]
    fn full_pipeline_shapes_and_normalizes() {
        let config = PreprocessConfig {
            hadamard: true,
            projection: Some(ProjectionConfig {
                original_dim: 64,
                projected_dim: 16,
                seed: Some(9),
            }),
            normalize: true,
            index_strategy: IndexStrategy::Ann,
        };
        let p = Preprocessor::new(64, &config).unwrap();
        let batch: Vec<Vec<f32>> = (0..3)
            .map(|i| (0..64).map(|j| ((i * 64 + j) as f32).sin()).collect())
            .collect();
        let out = p.process_batch(&batch).unwrap();
        assert_eq!(out.len(), 3);
        for v in &out {
            assert_eq!(v.len(), 16);
            assert!((vector_ops::l2_norm(v) - 1.0).abs() < 1e-5);
        }
        assert!(p.process(&[1.0; 63]).is_err());
    }

    #[test]
    fn seeded_pipelines_agree() {
        let config = PreprocessConfig::projected(32, 8, Some(77));
        let a = Preprocessor::new(32, &config).unwrap();
        let b = Preprocessor::new(32, &config).unwrap();
        let v: Vec<f32> = (0..32).map(|i| i as f32).collect();
        assert_eq!(a.process(&v).unwrap(), b.process(&v).unwrap());
    }

    #[test]
    fn tokens_are_pooled_first() {
        let p = Preprocessor::new(2, &PreprocessConfig::default()).unwrap();
        let batch =
            vector_ops::TokenEmbeddingBatch::new(vec![vec![6.0, 0.0], vec![0.0, 8.0]], vec![1, 1])
                .unwrap();
        let out = p.process_tokens(&batch).unwrap();
        assert!((out[0] - 0.6).abs() < 1e-6 && (out[1] - 0.8).abs() < 1e-6);
    }
}
