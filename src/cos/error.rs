use thiserror::Error;

/// Errors raised by the matrix and correlation core.
///
/// All of them are contract violations by the caller; nothing here is
/// transient, so nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CosError {
    /// Non-rectangular input or incompatible operand shapes.
    #[error("shape error: {0}")]
    Shape(String),

    /// Coordinate or row/column index outside the matrix.
    #[error("range error: {0}")]
    Range(String),

    /// Invalid transform parameter.
    #[error("argument error: {0}")]
    Argument(String),
}

impl CosError {
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::Range(message.into())
    }

    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CosError>;
