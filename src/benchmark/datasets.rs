//! Benchmark datasets: loaded from TEXMEX files or generated synthetically.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::debug;

use super::sift::{read_fvecs, read_ivecs};
use crate::error::{PrepError, Result};
use crate::simd;

/// Base vectors, query vectors, and (optionally) ground-truth neighbors.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Database vectors to index.
    pub base: Vec<Vec<f32>>,
    /// Query vectors.
    pub queries: Vec<Vec<f32>>,
    /// Per-query neighbor ids, nearest first.
    pub ground_truth: Option<Vec<Vec<u32>>>,
    /// Shared dimensionality of `base` and `queries`.
    pub dimension: usize,
}

impl Dataset {
    /// Build a dataset, checking that every vector has the same dimension
    /// and that ground truth (if any) has one list per query.
    pub fn new(
        base: Vec<Vec<f32>>,
        queries: Vec<Vec<f32>>,
        ground_truth: Option<Vec<Vec<u32>>>,
    ) -> Result<Self> {
        let dimension = base
            .first()
            .map(Vec::len)
            .ok_or(PrepError::EmptyInput("base vectors"))?;

        if let Some(bad) = base.iter().chain(&queries).find(|v| v.len() != dimension) {
            return Err(PrepError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }
        if let Some(gt) = &ground_truth {
            if gt.len() != queries.len() {
                return Err(PrepError::InvalidParameter(format!(
                    "ground truth has {} lists for {} queries",
                    gt.len(),
                    queries.len()
                )));
            }
        }

        Ok(Self {
            base,
            queries,
            ground_truth,
            dimension,
        })
    }

    /// Load a SIFT-style triple (`*_base.fvecs`, `*_query.fvecs`,
    /// `*_groundtruth.ivecs`).
    pub fn load(
        base: impl AsRef<Path>,
        queries: impl AsRef<Path>,
        ground_truth: Option<&Path>,
    ) -> Result<Self> {
        let base = read_fvecs(base)?;
        let queries = read_fvecs(queries)?;
        let ground_truth = ground_truth.map(|p| read_ivecs(p)).transpose()?;
        let ds = Self::new(base, queries, ground_truth)?;
        debug!(
            n_base = ds.n_base(),
            n_queries = ds.n_queries(),
            dimension = ds.dimension,
            "loaded dataset"
        );
        Ok(ds)
    }

    pub fn n_base(&self) -> usize {
        self.base.len()
    }

    pub fn n_queries(&self) -> usize {
        self.queries.len()
    }

    /// Raw float storage of base + queries, in bytes.
    pub fn memory_bytes(&self) -> usize {
        (self.base.len() + self.queries.len()) * self.dimension * std::mem::size_of::<f32>()
    }

    /// Fill in brute-force ground truth (`k` nearest by L2) if absent.
    pub fn with_computed_ground_truth(mut self, k: usize) -> Self {
        if self.ground_truth.is_none() {
            self.ground_truth = Some(
                self.queries
                    .iter()
                    .map(|q| compute_ground_truth(q, &self.base, k))
                    .collect(),
            );
        }
        self
    }
}

/// Uniform vectors in `[0, 1]^d`.
///
/// A structureless baseline; real embeddings cluster.
pub fn create_uniform_dataset(
    n_base: usize,
    n_queries: usize,
    dimension: usize,
    seed: u64,
) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut draw = |n: usize| -> Vec<Vec<f32>> {
        (0..n)
            .map(|_| (0..dimension).map(|_| rng.random::<f32>()).collect())
            .collect()
    };
    let base = draw(n_base);
    let queries = draw(n_queries);

    Dataset {
        base,
        queries,
        ground_truth: None,
        dimension,
    }
}

/// Gaussian blobs around `n_clusters` uniform centers.
pub fn create_clustered_dataset(
    n_base: usize,
    n_queries: usize,
    dimension: usize,
    n_clusters: usize,
    cluster_std: f32,
    seed: u64,
) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_clusters = n_clusters.max(1);

    let centers: Vec<Vec<f32>> = (0..n_clusters)
        .map(|_| (0..dimension).map(|_| rng.random::<f32>()).collect())
        .collect();

    let mut sample = |n: usize| -> Vec<Vec<f32>> {
        (0..n)
            .map(|_| {
                let center = &centers[rng.random_range(0..n_clusters)];
                center
                    .iter()
                    .map(|&c| c + cluster_std * rng.sample::<f32, _>(StandardNormal))
                    .collect()
            })
            .collect()
    };
    let base = sample(n_base);
    let queries = sample(n_queries);

    Dataset {
        base,
        queries,
        ground_truth: None,
        dimension,
    }
}

/// Exact `k` nearest neighbors of `query` by L2 distance, nearest first.
///
/// Ids are row positions in `database`. Rows whose dimension differs from
/// `query` are never neighbors, and only the first `u32::MAX + 1` rows are
/// addressable.
pub fn compute_ground_truth(query: &[f32], database: &[Vec<f32>], k: usize) -> Vec<u32> {
    let mut scored: Vec<(u32, f32)> = (0..=u32::MAX)
        .zip(database)
        .filter(|(_, v)| v.len() == query.len())
        .map(|(id, v)| (id, simd::l2_distance_squared(query, v)))
        .collect();

    let k = k.min(scored.len());
    if k == 0 {
        return Vec::new();
    }
    // Ties broken by id so the result is deterministic.
    let by_distance = |a: &(u32, f32), b: &(u32, f32)| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0));
    scored.select_nth_unstable_by(k - 1, by_distance);
    scored.truncate(k);
    scored.sort_unstable_by(by_distance);
    scored.into_iter().map(|(id, _)| id).collect()
}
