//! vecprep: vector preprocessing and scoring primitives for ANN indexes.
//!
//! The crate sits in front of an externally supplied approximate nearest
//! neighbor index:
//!
//! - `transform/`: fast Walsh-Hadamard transform, Gaussian random projection
//! - `vector_ops`: attention-masked mean pooling, L2 normalization
//! - `pipeline`: the configured chain of the above
//! - `benchmark/`: `.fvecs` / `.ivecs` I/O, ground truth, recall
//! - `scoring/`: two-phase (approximate, then exact) score providers
//!
//! The index itself, quantization, and graph traversal are out of scope;
//! they plug in through the [`scoring::IndexView`] and
//! [`scoring::CompressedVectors`] traits.
//!
//! # Critical Nuances
//!
//! ## One projection matrix per vector space
//!
//! Johnson-Lindenstrauss preserves distances only between vectors projected
//! with the *same* matrix. Build a [`RandomProjector`] (or
//! [`pipeline::Preprocessor`]) once and push both the corpus and every
//! query through it. Use a fixed seed if the corpus is re-embedded in a
//! different process.
//!
//! ## Hadamard needs a power-of-two dimension
//!
//! Common embedding sizes (384, 768, 1536) are not powers of two. The
//! transform refuses them instead of truncating or padding silently.
//!
//! ## Approximate scores are never final
//!
//! A two-phase [`scoring::SearchScoreProvider`] only exists when an exact
//! reranker is available, so results leaving the index always carry exact
//! scores.

pub mod benchmark;
pub mod config;
pub mod distance;
pub mod error;
pub mod pipeline;
pub mod scoring;
pub mod simd;
pub mod transform;
pub mod vector_ops;

// Re-exports
pub use config::{IndexStrategy, PreprocessConfig, ProjectionConfig};
pub use distance::{euclidean_distance, SimilarityFunction};
pub use error::{PrepError, Result};
pub use pipeline::Preprocessor;
pub use scoring::{create_score_provider, SearchScoreProvider};
pub use transform::{fwht, normalize_fwht, HadamardTransform, RandomProjector};
pub use vector_ops::{mean_pooling, normalize, TokenEmbeddingBatch};
