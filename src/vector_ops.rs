//! Embedding post-processing: attention-masked mean pooling and L2
//! normalization.
//!
//! Transformer encoders emit one vector per token. Sentence embeddings are
//! usually the mean over the tokens the attention mask marks as real
//! (`1`), ignoring padding (`0`), followed by L2 normalization so that dot
//! product equals cosine similarity downstream.

use crate::error::{PrepError, Result};
use crate::simd;

/// Token embeddings for one sequence plus its attention mask.
///
/// Invariants (checked by [`TokenEmbeddingBatch::new`]): at least one token,
/// all token vectors share one non-zero dimension, and the mask has one
/// entry per token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenEmbeddingBatch {
    embeddings: Vec<Vec<f32>>,
    attention_mask: Vec<i64>,
    dimension: usize,
}

impl TokenEmbeddingBatch {
    pub fn new(embeddings: Vec<Vec<f32>>, attention_mask: Vec<i64>) -> Result<Self> {
        let dimension = validate(&embeddings, &attention_mask)?;
        Ok(Self {
            embeddings,
            attention_mask,
            dimension,
        })
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    pub fn attention_mask(&self) -> &[i64] {
        &self.attention_mask
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of tokens with mask value `1`.
    pub fn active_tokens(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }

    /// Mean of the active token vectors. See [`mean_pooling`].
    pub fn mean_pooling(&self) -> Vec<f32> {
        pool(&self.embeddings, &self.attention_mask, self.dimension)
    }
}

fn validate(embeddings: &[Vec<f32>], attention_mask: &[i64]) -> Result<usize> {
    let first = embeddings
        .first()
        .ok_or(PrepError::EmptyInput("token embeddings"))?;
    let dimension = first.len();
    if dimension == 0 {
        return Err(PrepError::EmptyInput("token embedding vector"));
    }
    if attention_mask.len() != embeddings.len() {
        return Err(PrepError::DimensionMismatch {
            expected: embeddings.len(),
            actual: attention_mask.len(),
        });
    }
    if let Some(ragged) = embeddings.iter().find(|e| e.len() != dimension) {
        return Err(PrepError::DimensionMismatch {
            expected: dimension,
            actual: ragged.len(),
        });
    }
    Ok(dimension)
}

fn pool(embeddings: &[Vec<f32>], attention_mask: &[i64], dimension: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; dimension];
    let mut active = 0usize;

    for (token, _) in embeddings
        .iter()
        .zip(attention_mask)
        .filter(|&(_, &m)| m == 1)
    {
        simd::axpy(1.0, token, &mut sum);
        active += 1;
    }

    // No attended tokens: the neutral (all-zero) embedding.
    if active > 0 {
        simd::scale(1.0 / active as f32, &mut sum);
    }
    sum
}

/// Mean over the token vectors whose attention-mask entry is `1`.
///
/// If no token is active the result is the zero vector of the embedding
/// dimension, not an error.
///
/// # Errors
///
/// [`PrepError::EmptyInput`] for an empty batch, and
/// [`PrepError::DimensionMismatch`] for a ragged batch or a mask whose
/// length differs from the token count.
pub fn mean_pooling(token_embeddings: &[Vec<f32>], attention_mask: &[i64]) -> Result<Vec<f32>> {
    let dimension = validate(token_embeddings, attention_mask)?;
    Ok(pool(token_embeddings, attention_mask, dimension))
}

/// Euclidean norm.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    simd::norm(v)
}

/// In-place L2 normalization. A zero vector is left unchanged.
pub fn normalize(v: &mut [f32]) {
    let n = simd::norm(v);
    if n > 0.0 {
        simd::scale(1.0 / n, v);
    }
}

/// Copying variant of [`normalize`].
#[must_use]
pub fn normalized(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    normalize(&mut out);
    out
}
