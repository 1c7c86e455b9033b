use thiserror::Error;

/// Errors reported by tree operations.
///
/// Missing keys are not errors: lookups and deletions return `Option`.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[non_exhaustive]
pub enum TreeError {
    /// The operation exists in the common interface but this structure does not support it.
    #[error("{operation} is not supported by the {structure}")]
    Unsupported {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Name of the structure that rejected it.
        structure: &'static str,
    },

    /// Two trees passed to a join have interleaving key ranges.
    #[error("every key of the left tree must be less than every key of the right tree")]
    OverlappingRanges,

    /// The boundary key passed to a join is not the smallest key of the right tree.
    #[error("the boundary key must equal the smallest key of the right tree")]
    BoundaryMismatch,

    /// Weight-balance parameters outside of the range where rebalancing is guaranteed to work.
    #[error("invalid weight balance parameters: alpha = {alpha}, epsilon = {epsilon}")]
    InvalidBalance {
        /// Requested minimum child weight fraction.
        alpha: f64,
        /// Requested single/double rotation threshold.
        epsilon: f64,
    },

    /// An interval whose lower end is greater than its upper end.
    #[error("interval lower end is greater than its upper end")]
    InvertedInterval,
}
