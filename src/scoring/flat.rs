//! Full-precision in-memory vectors.

use super::{ExactScoreFunction, IndexView};
use crate::distance::SimilarityFunction;
use crate::error::{PrepError, Result};

/// Contiguous full-precision vectors addressed by insertion order.
///
/// Serves as the exact side of a two-phase search (or as a brute-force
/// index on its own).
#[derive(Debug, Clone, PartialEq)]
pub struct FlatVectors {
    dimension: usize,
    // SoA: vector i occupies data[i * dimension..(i + 1) * dimension]
    data: Vec<f32>,
}

impl FlatVectors {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(PrepError::InvalidParameter("dimension must be > 0".into()));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    /// Build from owned vectors, all of which must share one dimension.
    pub fn from_vectors(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = vectors
            .first()
            .map(Vec::len)
            .ok_or(PrepError::EmptyInput("vectors"))?;
        let mut flat = Self::new(dimension)?;
        flat.data.reserve(vectors.len() * dimension);
        for v in &vectors {
            flat.push(v)?;
        }
        Ok(flat)
    }

    /// Append a vector and return its node id.
    pub fn push(&mut self, vector: &[f32]) -> Result<u32> {
        if vector.len() != self.dimension {
            return Err(PrepError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        let id = u32::try_from(self.len())
            .map_err(|_| PrepError::InvalidParameter("node id space exhausted".into()))?;
        self.data.extend_from_slice(vector);
        Ok(id)
    }

    pub fn get(&self, node: u32) -> Option<&[f32]> {
        let start = (node as usize).checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension)
    }
}

impl IndexView for FlatVectors {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn reranker_for<'a>(
        &'a self,
        query: &[f32],
        similarity: SimilarityFunction,
    ) -> Result<Box<dyn ExactScoreFunction + 'a>> {
        if query.len() != self.dimension {
            return Err(PrepError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        Ok(Box::new(FlatReranker {
            vectors: self,
            query: query.to_vec(),
            similarity,
        }))
    }
}

/// Exact scorer over [`FlatVectors`]. Unknown node ids score
/// `f32::NEG_INFINITY`.
#[derive(Debug, Clone)]
pub struct FlatReranker<'a> {
    vectors: &'a FlatVectors,
    query: Vec<f32>,
    similarity: SimilarityFunction,
}

impl ExactScoreFunction for FlatReranker<'_> {
    fn similarity_to(&self, node: u32) -> f32 {
        match self.vectors.get(node) {
            Some(v) => self.similarity.compare(&self.query, v),
            None => f32::NEG_INFINITY,
        }
    }
}
