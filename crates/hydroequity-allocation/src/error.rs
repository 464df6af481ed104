//! Error types for the `hydroequity-allocation` crate.

/// Errors raised when allocation inputs violate their preconditions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    /// Two vectors that must be positionally aligned have different lengths.
    #[error("length mismatch: expected {expected} entries, found {found}")]
    LengthMismatch {
        /// Required length.
        expected: usize,
        /// Supplied length.
        found: usize,
    },

    /// A demand entry is negative, infinite, or `NaN`.
    #[error("demand at index {index} is invalid: {value}")]
    InvalidDemand {
        /// 0-based sector position.
        index: usize,
        /// The rejected value.
        value: f64,
    },

    /// The supply total is negative, infinite, or `NaN`.
    #[error("total available supply is invalid: {0}")]
    InvalidTotal(f64),

    /// A weight vector entry is infinite or `NaN`.
    #[error("weight at index {index} is not finite: {value}")]
    InvalidWeight {
        /// 0-based sector position.
        index: usize,
        /// The rejected value.
        value: f64,
    },
}
