use thiserror::Error;

/// Errors returned by the fallible operations of the crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Two operands of a vector or matrix operation do not have compatible lengths.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Length required by the left operand.
        expected: usize,
        /// Length of the offending operand.
        found: usize,
    },

    /// A grid or simulation was requested with a dimensionality other than 2 or 3.
    #[error("unsupported dimensionality {0}, only 2 and 3 are supported")]
    UnsupportedDimension(usize),

    /// A construction-time parameter was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A computed bucket coordinate falls outside of the grid.
    #[error("zone {zone:?} is outside of a grid of {counts:?} buckets")]
    ZoneOutOfRange {
        /// Unclipped bucket coordinate per axis.
        zone: Vec<i64>,
        /// Bucket count per axis.
        counts: Vec<usize>,
    },
}

/// Result type of the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    #[inline]
    pub(crate) fn mismatch(expected: usize, found: usize) -> Self {
        Self::DimensionMismatch { expected, found }
    }

    #[inline]
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
