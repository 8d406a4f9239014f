//! Assembly of the per-query [`SearchScoreProvider`].

use std::fmt;

use tracing::debug;

use super::{ApproximateScoreFunction, CompressedVectors, ExactScoreFunction, IndexView};
use crate::distance::SimilarityFunction;
use crate::error::{PrepError, Result};

/// Scoring strategy for one query.
///
/// Two shapes:
///
/// - **Two-phase**: candidates are ranked with an approximate scorer during
///   traversal and the best of them are re-scored exactly ([`Self::reranker`]
///   is `Some`).
/// - **Exact-only**: the exact scorer is used throughout ([`Self::reranker`]
///   is `None`).
///
/// Built fresh per query and dropped when the query completes.
pub struct SearchScoreProvider<'a> {
    approximate: Option<Box<dyn ApproximateScoreFunction + 'a>>,
    exact: Box<dyn ExactScoreFunction + 'a>,
    similarity: SimilarityFunction,
}

impl<'a> SearchScoreProvider<'a> {
    /// Approximate traversal with exact reranking.
    pub fn two_phase(
        approximate: Box<dyn ApproximateScoreFunction + 'a>,
        reranker: Box<dyn ExactScoreFunction + 'a>,
        similarity: SimilarityFunction,
    ) -> Self {
        Self {
            approximate: Some(approximate),
            exact: reranker,
            similarity,
        }
    }

    /// Exact scoring only.
    pub fn exact(exact: Box<dyn ExactScoreFunction + 'a>, similarity: SimilarityFunction) -> Self {
        Self {
            approximate: None,
            exact,
            similarity,
        }
    }

    /// Whether a separate approximate phase is in use.
    #[inline]
    pub fn is_two_phase(&self) -> bool {
        self.approximate.is_some()
    }

    #[inline]
    pub fn similarity(&self) -> SimilarityFunction {
        self.similarity
    }

    /// Traversal score for `node`: approximate when two-phase, exact
    /// otherwise.
    #[inline]
    pub fn score(&self, node: u32) -> f32 {
        match &self.approximate {
            Some(approximate) => approximate.similarity_to(node),
            None => self.exact.similarity_to(node),
        }
    }

    /// Full-precision score for `node`, regardless of shape.
    #[inline]
    pub fn exact_score(&self, node: u32) -> f32 {
        self.exact.similarity_to(node)
    }

    /// The exact reranker, present only for two-phase providers.
    pub fn reranker(&self) -> Option<&(dyn ExactScoreFunction + 'a)> {
        self.approximate.as_ref().map(|_| self.exact.as_ref())
    }

    /// Rank `candidates` and return the best `k` as `(node, score)`, most
    /// similar first.
    ///
    /// Every candidate is scored with [`Self::score`]; when two-phase, the
    /// surviving `k` are then re-scored exactly and re-sorted, so returned
    /// scores are always exact.
    pub fn rerank(&self, candidates: &[u32], k: usize) -> Vec<(u32, f32)> {
        let mut ranked: Vec<(u32, f32)> = candidates.iter().map(|&n| (n, self.score(n))).collect();
        top_k(&mut ranked, k);

        if self.is_two_phase() {
            for (node, score) in ranked.iter_mut() {
                *score = self.exact.similarity_to(*node);
            }
            sort_descending(&mut ranked);
        }
        ranked
    }
}

impl fmt::Debug for SearchScoreProvider<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchScoreProvider")
            .field("two_phase", &self.is_two_phase())
            .field("similarity", &self.similarity)
            .finish()
    }
}

fn sort_descending(ranked: &mut [(u32, f32)]) {
    ranked.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
}

fn top_k(ranked: &mut Vec<(u32, f32)>, k: usize) {
    if k == 0 {
        ranked.clear();
        return;
    }
    if ranked.len() > k {
        ranked.select_nth_unstable_by(k - 1, |a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);
    }
    sort_descending(ranked);
}

/// Build the score provider for one query.
///
/// With `compressed` present the result is two-phase (approximate scorer
/// from `compressed`, exact reranker from `index`); without it the result
/// is exact-only.
///
/// # Errors
///
/// All failures surface here, before a provider exists:
///
/// - [`PrepError::EmptyInput`] for an empty query.
/// - [`PrepError::DimensionMismatch`] if the query and index disagree.
/// - [`PrepError::CapabilityUnavailable`] (from either collaborator) if a
///   scorer for `similarity` cannot be produced.
pub fn create_score_provider<'a>(
    index: &'a dyn IndexView,
    compressed: Option<&'a dyn CompressedVectors>,
    query: &[f32],
    similarity: SimilarityFunction,
) -> Result<SearchScoreProvider<'a>> {
    if query.is_empty() {
        return Err(PrepError::EmptyInput("query vector"));
    }
    if query.len() != index.dimension() {
        return Err(PrepError::DimensionMismatch {
            expected: index.dimension(),
            actual: query.len(),
        });
    }

    let provider = match compressed {
        Some(store) => {
            let approximate = store.precomputed_score_function_for(query, similarity)?;
            let reranker = index.reranker_for(query, similarity)?;
            SearchScoreProvider::two_phase(approximate, reranker, similarity)
        }
        None => SearchScoreProvider::exact(index.reranker_for(query, similarity)?, similarity),
    };

    debug!(
        two_phase = provider.is_two_phase(),
        %similarity,
        dimension = query.len(),
        "built search score provider"
    );
    Ok(provider)
}

/// Step-by-step construction of a [`SearchScoreProvider`], for callers that
/// gather the inputs separately. Anything required and left unset is an
/// error from [`Self::build`].
#[derive(Default)]
pub struct ScoreProviderBuilder<'a> {
    index: Option<&'a dyn IndexView>,
    compressed: Option<&'a dyn CompressedVectors>,
    query: Option<&'a [f32]>,
    similarity: Option<SimilarityFunction>,
}

impl<'a> ScoreProviderBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, index: &'a dyn IndexView) -> Self {
        self.index = Some(index);
        self
    }

    /// Enable the approximate phase.
    pub fn compressed(mut self, compressed: &'a dyn CompressedVectors) -> Self {
        self.compressed = Some(compressed);
        self
    }

    pub fn query(mut self, query: &'a [f32]) -> Self {
        self.query = Some(query);
        self
    }

    pub fn similarity(mut self, similarity: SimilarityFunction) -> Self {
        self.similarity = Some(similarity);
        self
    }

    pub fn build(self) -> Result<SearchScoreProvider<'a>> {
        let index = self.index.ok_or(PrepError::EmptyInput("index view"))?;
        let query = self.query.ok_or(PrepError::EmptyInput("query vector"))?;
        let similarity = self.similarity.ok_or_else(|| {
            PrepError::InvalidParameter("similarity function not set".into())
        })?;
        create_score_provider(index, self.compressed, query, similarity)
    }
}
