//! Configuration types.
//!
//! Plain parameter structs with `Default` and serde support, so they can be
//! embedded in whatever configuration format the host application uses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Whether a collection is served by an ANN index or by exhaustive scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IndexStrategy {
    /// Brute-force scoring over every vector.
    NoIndex,
    /// Graph ANN index (optionally two-phase with compressed vectors).
    #[default]
    Ann,
}

impl FromStr for IndexStrategy {
    type Err = PrepError;

    /// Case-insensitive: `no`, `no_index`, `no-index`, or `ann`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if ["no", "no_index", "no-index"]
            .iter()
            .any(|v| s.eq_ignore_ascii_case(v))
        {
            return Ok(IndexStrategy::NoIndex);
        }
        if s.eq_ignore_ascii_case("ann") {
            return Ok(IndexStrategy::Ann);
        }
        Err(PrepError::InvalidParameter(format!(
            "unexpected value to construct index strategy: {s}"
        )))
    }
}

impl TryFrom<String> for IndexStrategy {
    type Error = PrepError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<IndexStrategy> for String {
    fn from(s: IndexStrategy) -> Self {
        s.to_string()
    }
}

impl fmt::Display for IndexStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexStrategy::NoIndex => f.write_str("no_index"),
            IndexStrategy::Ann => f.write_str("ann"),
        }
    }
}

/// Random projection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Input dimension `D`.
    pub original_dim: usize,
    /// Output dimension `k` (must be `< D`).
    pub projected_dim: usize,
    /// Fixed seed for a reproducible matrix; `None` draws a fresh one.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Preprocessing steps applied, in order, before vectors reach the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Orthonormal Hadamard transform (input dimension must be a power of two).
    pub hadamard: bool,
    /// Random projection, applied after the Hadamard transform.
    pub projection: Option<ProjectionConfig>,
    /// L2-normalize the final vector.
    pub normalize: bool,
    /// How the processed vectors will be searched.
    pub index_strategy: IndexStrategy,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            hadamard: false,
            projection: None,
            normalize: true,
            index_strategy: IndexStrategy::Ann,
        }
    }
}

impl PreprocessConfig {
    /// Normalize only: the usual setting for cosine/dot-product embeddings.
    pub fn normalize_only() -> Self {
        Self::default()
    }

    /// Hadamard + normalize: spreads variance before quantization.
    pub fn rotated() -> Self {
        Self {
            hadamard: true,
            ..Self::default()
        }
    }

    /// Project `original_dim -> projected_dim`, then normalize.
    pub fn projected(original_dim: usize, projected_dim: usize, seed: Option<u64>) -> Self {
        Self {
            projection: Some(ProjectionConfig {
                original_dim,
                projected_dim,
                seed,
            }),
            ..Self::default()
        }
    }
}
