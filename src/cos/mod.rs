/// Correlation core: dense matrices and the 2DCOS transforms.
///
/// Architecture:
/// ```text
///   data Matrix (positions × samples)
///        │
///        ▼
///   ┌──────────────┐
///   │ correlation   │  Hilbert–Noda matrix, Φ and Ψ
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  peaks    │  global / local extrema of a map
///   └──────────┘
/// ```
///
/// Everything here is a pure function of its inputs.

pub mod correlation;
pub mod error;
pub mod matrix;
pub mod peaks;

pub use correlation::{analyze, asynchronous, hilbert_noda_matrix, synchronous, CorrelationSpectra};
pub use error::CosError;
pub use matrix::Matrix;
