//! Score functions and the two-phase search score provider.
//!
//! A graph search scores every candidate it visits. With a compressed
//! (e.g. product-quantized) copy of the vectors, those scores can come from
//! a cheap lossy lookup, but then the final top-k must be re-scored against
//! full-precision vectors before results leave the index. This module
//! models the pieces as capabilities:
//!
//! - [`IndexView`]: the index side, which can always hand out an exact
//!   [`ExactScoreFunction`] (reranker) for a query.
//! - [`CompressedVectors`]: the optional quantized store, which hands out an
//!   [`ApproximateScoreFunction`] with per-query precomputed tables.
//! - [`SearchScoreProvider`]: what the search routine consumes; built by
//!   [`create_score_provider`] or [`ScoreProviderBuilder`].
//!
//! # Example
//!
//! ```rust
//! use vecprep::scoring::{create_score_provider, FlatVectors};
//! use vecprep::SimilarityFunction;
//!
//! let index = FlatVectors::from_vectors(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
//! let provider =
//!     create_score_provider(&index, None, &[1.0, 0.0], SimilarityFunction::Cosine).unwrap();
//!
//! assert!(!provider.is_two_phase());
//! assert!(provider.score(0) > provider.score(1));
//! ```

mod flat;
mod provider;

pub use flat::{FlatReranker, FlatVectors};
pub use provider::{create_score_provider, ScoreProviderBuilder, SearchScoreProvider};

use crate::distance::SimilarityFunction;
use crate::error::Result;

/// Lossy score of a candidate against a fixed query (e.g. PQ table lookup).
pub trait ApproximateScoreFunction {
    /// Similarity of the query to `node`; higher is more similar.
    fn similarity_to(&self, node: u32) -> f32;
}

/// Full-precision score of a candidate against a fixed query.
pub trait ExactScoreFunction {
    /// Similarity of the query to `node`; higher is more similar.
    fn similarity_to(&self, node: u32) -> f32;
}

impl<F: Fn(u32) -> f32> ApproximateScoreFunction for F {
    fn similarity_to(&self, node: u32) -> f32 {
        self(node)
    }
}

impl<F: Fn(u32) -> f32> ExactScoreFunction for F {
    fn similarity_to(&self, node: u32) -> f32 {
        self(node)
    }
}

/// Index-side capability: produce an exact reranker for a query.
pub trait IndexView {
    /// Dimension of the vectors the index holds.
    fn dimension(&self) -> usize;

    /// Exact scorer for `query` under `similarity`.
    ///
    /// Implementations copy whatever they need from `query`.
    ///
    /// # Errors
    ///
    /// [`crate::PrepError::CapabilityUnavailable`] if this index cannot score
    /// with `similarity`.
    fn reranker_for<'a>(
        &'a self,
        query: &[f32],
        similarity: SimilarityFunction,
    ) -> Result<Box<dyn ExactScoreFunction + 'a>>;
}

/// Compressed-store capability: produce an approximate scorer for a query.
pub trait CompressedVectors {
    /// Approximate scorer for `query` under `similarity`, with any per-query
    /// tables precomputed.
    fn precomputed_score_function_for<'a>(
        &'a self,
        query: &[f32],
        similarity: SimilarityFunction,
    ) -> Result<Box<dyn ApproximateScoreFunction + 'a>>;
}
