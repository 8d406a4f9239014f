//! Similarity functions for dense vectors.
//!
//! Scores follow the "higher is more similar" convention used by graph
//! indexes that rank candidates with a max-heap:
//!
//! | Function     | Score                      |
//! |--------------|----------------------------|
//! | `Euclidean`  | $1 / (1 + \lVert a-b \rVert^2)$ |
//! | `DotProduct` | $(1 + \langle a,b\rangle) / 2$  |
//! | `Cosine`     | $(1 + \cos(a,b)) / 2$           |
//!
//! ## Important nuance
//!
//! `DotProduct` only lands in `[0, 1]` for **L2-normalized** inputs. Run
//! vectors through [`crate::vector_ops::normalize`] first if the index expects
//! bounded scores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::simd;

/// Similarity function used to score a query against stored vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityFunction {
    /// Inverse squared Euclidean distance.
    Euclidean,
    /// Shifted inner product (for normalized vectors / MIPS).
    DotProduct,
    /// Shifted cosine similarity.
    Cosine,
}

impl SimilarityFunction {
    /// Similarity between `a` and `b`; higher is more similar.
    ///
    /// This is the per-candidate hot path, so lengths are the caller's
    /// responsibility: validate the query once (as
    /// [`crate::scoring::IndexView::reranker_for`] implementations do) or use
    /// [`Self::checked_compare`]. A mismatched pair scores
    /// `f32::NEG_INFINITY` and never ranks above a real candidate.
    #[inline]
    #[must_use]
    pub fn compare(self, a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return f32::NEG_INFINITY;
        }
        match self {
            SimilarityFunction::Euclidean => 1.0 / (1.0 + simd::l2_distance_squared(a, b)),
            SimilarityFunction::DotProduct => (1.0 + simd::dot(a, b)) / 2.0,
            SimilarityFunction::Cosine => (1.0 + simd::cosine(a, b).clamp(-1.0, 1.0)) / 2.0,
        }
    }

    /// [`Self::compare`] that reports mismatched lengths as an error.
    pub fn checked_compare(self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(PrepError::DimensionMismatch {
                expected: a.len(),
                actual: b.len(),
            });
        }
        Ok(self.compare(a, b))
    }
}

impl fmt::Display for SimilarityFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimilarityFunction::Euclidean => "euclidean",
            SimilarityFunction::DotProduct => "dot_product",
            SimilarityFunction::Cosine => "cosine",
        };
        f.write_str(name)
    }
}

impl FromStr for SimilarityFunction {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(SimilarityFunction::Euclidean),
            "dot_product" | "dot" | "inner_product" => Ok(SimilarityFunction::DotProduct),
            "cosine" => Ok(SimilarityFunction::Cosine),
            other => Err(PrepError::InvalidParameter(format!(
                "unknown similarity function: {other}"
            ))),
        }
    }
}

/// Euclidean distance between two equal-length vectors.
///
/// Unlike [`simd::l2_distance`], mismatched lengths are an error rather than
/// a silent comparison of the shorter prefix.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(PrepError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(simd::l2_distance(a, b))
}
