//! Vector transforms applied before indexing.
//!
//! - [`hadamard`]: length-preserving orthogonal transform (FWHT), used to
//!   spread variance evenly across coordinates before quantization.
//! - [`projection`]: Gaussian random projection for dimensionality reduction
//!   with Johnson-Lindenstrauss distance preservation.
//!
//! Both are pure numeric code with no I/O.

pub mod hadamard;
pub mod projection;

pub use hadamard::{fwht, normalize_fwht, HadamardTransform};
pub use projection::RandomProjector;
