//! Score provider assembly against recording collaborators.

use std::cell::RefCell;

use vecprep::scoring::{
    ApproximateScoreFunction, CompressedVectors, ExactScoreFunction, FlatVectors, IndexView,
    ScoreProviderBuilder,
};
use vecprep::{create_score_provider, PrepError, Result, SimilarityFunction};

/// Index double: exact score is `-node`, every call is logged.
struct RecordingIndex {
    dimension: usize,
    supports: Vec<SimilarityFunction>,
    log: RefCell<Vec<&'static str>>,
}

impl RecordingIndex {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            supports: vec![
                SimilarityFunction::Euclidean,
                SimilarityFunction::DotProduct,
                SimilarityFunction::Cosine,
            ],
            log: RefCell::new(Vec::new()),
        }
    }
}

impl IndexView for RecordingIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn reranker_for<'a>(
        &'a self,
        _query: &[f32],
        similarity: SimilarityFunction,
    ) -> Result<Box<dyn ExactScoreFunction + 'a>> {
        self.log.borrow_mut().push("build exact");
        if !self.supports.contains(&similarity) {
            return Err(PrepError::CapabilityUnavailable(format!(
                "index cannot rerank with {similarity}"
            )));
        }
        Ok(Box::new(move |node: u32| {
            self.log.borrow_mut().push("exact");
            -(node as f32)
        }))
    }
}

/// Compressed-store double: approximate score is `node`, every call is
/// logged into the shared log.
struct RecordingStore<'l> {
    log: &'l RefCell<Vec<&'static str>>,
    available: bool,
}

impl CompressedVectors for RecordingStore<'_> {
    fn precomputed_score_function_for<'a>(
        &'a self,
        _query: &[f32],
        _similarity: SimilarityFunction,
    ) -> Result<Box<dyn ApproximateScoreFunction + 'a>> {
        self.log.borrow_mut().push("build approximate");
        if !self.available {
            return Err(PrepError::CapabilityUnavailable("no codebook trained".into()));
        }
        Ok(Box::new(move |node: u32| {
            self.log.borrow_mut().push("approximate");
            node as f32
        }))
    }
}

#[test]
fn with_store_scores_approximately_and_reranks_exactly() {
    let index = RecordingIndex::new(3);
    let store = RecordingStore {
        log: &index.log,
        available: true,
    };
    let query = [1.0, 2.0, 3.0];

    let provider =
        create_score_provider(&index, Some(&store), &query, SimilarityFunction::Cosine).unwrap();
    assert!(provider.is_two_phase());
    assert_eq!(*index.log.borrow(), vec!["build approximate", "build exact"]);

    index.log.borrow_mut().clear();
    assert_eq!(provider.score(4), 4.0);
    assert_eq!(*index.log.borrow(), vec!["approximate"]);

    index.log.borrow_mut().clear();
    let reranker = provider.reranker().unwrap();
    assert_eq!(reranker.similarity_to(4), -4.0);
    assert_eq!(*index.log.borrow(), vec!["exact"]);
}

#[test]
fn without_store_every_score_is_exact() {
    let index = RecordingIndex::new(2);
    let provider =
        create_score_provider(&index, None, &[0.5, 0.5], SimilarityFunction::Euclidean).unwrap();

    assert!(!provider.is_two_phase());
    assert!(provider.reranker().is_none());

    index.log.borrow_mut().clear();
    for node in 0..5 {
        assert_eq!(provider.score(node), -(node as f32));
    }
    assert!(index.log.borrow().iter().all(|&e| e == "exact"));
    assert_eq!(index.log.borrow().len(), 5);
}

#[test]
fn unsupported_similarity_fails_construction() {
    let mut index = RecordingIndex::new(2);
    index.supports = vec![SimilarityFunction::Euclidean];

    let err = create_score_provider(&index, None, &[1.0, 0.0], SimilarityFunction::DotProduct)
        .unwrap_err();
    assert!(matches!(err, PrepError::CapabilityUnavailable(_)));
}

#[test]
fn unavailable_store_fails_construction() {
    let index = RecordingIndex::new(2);
    let store = RecordingStore {
        log: &index.log,
        available: false,
    };
    let err = create_score_provider(&index, Some(&store), &[1.0, 0.0], SimilarityFunction::Cosine)
        .unwrap_err();
    assert!(matches!(err, PrepError::CapabilityUnavailable(_)));
    assert!(!index.log.borrow().contains(&"build exact"));
}

#[test]
fn empty_or_mismatched_query_fails() {
    let index = RecordingIndex::new(2);
    assert!(matches!(
        create_score_provider(&index, None, &[], SimilarityFunction::Cosine),
        Err(PrepError::EmptyInput(_))
    ));
    assert!(matches!(
        create_score_provider(&index, None, &[1.0, 2.0, 3.0], SimilarityFunction::Cosine),
        Err(PrepError::DimensionMismatch { expected: 2, actual: 3 })
    ));
    assert!(index.log.borrow().is_empty());
}

#[test]
fn builder_requires_similarity() {
    let index = RecordingIndex::new(2);
    let query = [1.0, 0.0];
    let err = ScoreProviderBuilder::new()
        .index(&index)
        .query(&query)
        .build()
        .unwrap_err();
    assert!(matches!(err, PrepError::InvalidParameter(_)));

    let provider = ScoreProviderBuilder::new()
        .index(&index)
        .query(&query)
        .similarity(SimilarityFunction::DotProduct)
        .build()
        .unwrap();
    assert_eq!(provider.similarity(), SimilarityFunction::DotProduct);
}

/// Lossy store over [`FlatVectors`]: components rounded to the nearest
/// integer before scoring.
struct RoundedStore {
    rounded: FlatVectors,
}

impl RoundedStore {
    fn new(flat: &FlatVectors) -> Self {
        let rounded = flat
            .iter()
            .map(|v| v.iter().map(|x| x.round()).collect())
            .collect();
        Self {
            rounded: FlatVectors::from_vectors(rounded).unwrap(),
        }
    }
}

impl CompressedVectors for RoundedStore {
    fn precomputed_score_function_for<'a>(
        &'a self,
        query: &[f32],
        similarity: SimilarityFunction,
    ) -> Result<Box<dyn ApproximateScoreFunction + 'a>> {
        let query = query.to_vec();
        Ok(Box::new(move |node: u32| match self.rounded.get(node) {
            Some(v) => similarity.compare(&query, v),
            None => f32::NEG_INFINITY,
        }))
    }
}

#[test]
fn lossy_store_results_are_reranked_with_exact_scores() {
    let flat = FlatVectors::from_vectors(vec![
        vec![0.0, 0.0],
        vec![0.4, 0.0],
        vec![0.6, 0.0],
        vec![3.0, 3.0],
    ])
    .unwrap();
    let store = RoundedStore::new(&flat);
    let query = [0.45_f32, 0.0];

    let provider =
        create_score_provider(&flat, Some(&store), &query, SimilarityFunction::Euclidean).unwrap();
    let top = provider.rerank(&[0, 1, 2, 3], 2);

    // Rounding collapses nodes 0 and 1 onto the origin, so the approximate
    // top two are {0, 1}; exact rescoring puts node 1 first.
    let ids: Vec<u32> = top.iter().map(|&(n, _)| n).collect();
    assert_eq!(ids, vec![1, 0]);
    for (node, score) in top {
        let exact = SimilarityFunction::Euclidean.compare(&query, flat.get(node).unwrap());
        assert_eq!(score, exact);
    }
}

#[test]
fn flat_index_exact_only_ranking() {
    let flat =
        FlatVectors::from_vectors(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]]).unwrap();
    let provider =
        create_score_provider(&flat, None, &[1.0, 0.1], SimilarityFunction::Cosine).unwrap();
    let top = provider.rerank(&[0, 1, 2], 3);
    let ids: Vec<u32> = top.iter().map(|&(n, _)| n).collect();
    assert_eq!(ids, vec![0, 2, 1]);
}
