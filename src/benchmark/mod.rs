//! Benchmark data plumbing.
//!
//! - [`sift`]: `.fvecs` / `.ivecs` readers and writers
//! - [`datasets`]: dataset container, synthetic generators, brute-force
//!   ground truth
//! - [`metrics`]: recall@k and neighborhood preservation
//!
//! # Standard Datasets
//!
//! | Dataset  | Base | Queries | Dim | Files |
//! |----------|------|---------|-----|-------|
//! | SIFT-10K | 10K  | 100     | 128 | `siftsmall_{base,query}.fvecs`, `siftsmall_groundtruth.ivecs` |
//! | SIFT-1M  | 1M   | 10K     | 128 | `sift_{base,query}.fvecs`, `sift_groundtruth.ivecs` |
//! | GIST-1M  | 1M   | 1K      | 960 | `gist_{base,query}.fvecs`, `gist_groundtruth.ivecs` |
//!
//! Reference: <http://corpus-texmex.irisa.fr/>

pub mod datasets;
pub mod metrics;
pub mod sift;

pub use datasets::{
    compute_ground_truth, create_clustered_dataset, create_uniform_dataset, Dataset,
};
pub use metrics::{mean_recall, neighborhood_preservation, recall_at_k, recall_curve};
pub use sift::{
    read_fvecs, read_ivecs, write_fvecs, write_ivecs, write_vecs, FvecsReader, IvecsReader,
    VecsElement, VecsReader,
};
