//! Retrieval quality metrics.
//!
//! - Recall@k against loaded or computed ground truth
//! - Neighborhood preservation: how many of a vector's k nearest neighbors
//!   survive a transform (projection, rotation, normalization)

use std::collections::HashSet;

use super::datasets::compute_ground_truth;

/// recall@k = |retrieved[..k] ∩ ground_truth[..k]| / min(k, |ground_truth|)
///
/// Returns a value in `[0, 1]`; `0` when `k == 0` or the ground truth is empty.
pub fn recall_at_k(ground_truth: &[u32], retrieved: &[u32], k: usize) -> f32 {
    let denom = k.min(ground_truth.len());
    if denom == 0 {
        return 0.0;
    }

    let gt: HashSet<u32> = ground_truth.iter().take(k).copied().collect();
    let found: HashSet<u32> = retrieved.iter().take(k).copied().collect();
    let hits = found.intersection(&gt).count();
    hits as f32 / denom as f32
}

/// Mean recall@k over paired query results. Extra entries on either side
/// are ignored.
pub fn mean_recall(ground_truths: &[Vec<u32>], retrievals: &[Vec<u32>], k: usize) -> f32 {
    let n = ground_truths.len().min(retrievals.len());
    if n == 0 {
        return 0.0;
    }
    let total: f32 = ground_truths
        .iter()
        .zip(retrievals)
        .map(|(gt, ret)| recall_at_k(gt, ret, k))
        .sum();
    total / n as f32
}

/// Recall at several cutoffs, e.g. `[1, 10, 100]`.
pub fn recall_curve(
    ground_truth: &[u32],
    retrieved: &[u32],
    k_values: &[usize],
) -> Vec<(usize, f32)> {
    k_values
        .iter()
        .map(|&k| (k, recall_at_k(ground_truth, retrieved, k)))
        .collect()
}

/// Average fraction of each query's `k` nearest neighbors (by L2) in
/// `original` space that are still among its `k` nearest in `transformed`
/// space.
///
/// `original` and `transformed` must be aligned (row `i` is the same item);
/// queries are the first `n_queries` rows, searched against all rows.
pub fn neighborhood_preservation(
    original: &[Vec<f32>],
    transformed: &[Vec<f32>],
    n_queries: usize,
    k: usize,
) -> f32 {
    let n = original.len().min(transformed.len()).min(n_queries);
    if n == 0 || k == 0 {
        return 0.0;
    }

    let total: f32 = (0..n)
        .map(|q| {
            let before = compute_ground_truth(&original[q], original, k);
            let after = compute_ground_truth(&transformed[q], transformed, k);
            recall_at_k(&before, &after, k)
        })
        .sum();
    total / n as f32
}
