//! Error types for vecprep.

use thiserror::Error;

/// Errors that can occur while transforming, loading, or scoring vectors.
///
/// Every variant is a precondition violation or malformed input, so none of
/// them are worth retrying.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Invalid parameter value (e.g. projected dimension not below the original).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Hadamard input length is not a power of two (or is shorter than 2).
    #[error("length {len} is not a power of two >= 2")]
    NotPowerOfTwo { len: usize },

    /// Dimension mismatch between an input vector and the configured shape.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A required input was empty or missing.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Malformed dataset record.
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// A collaborator cannot produce the requested scorer.
    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// I/O error while opening or reading a dataset file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PrepError>;
