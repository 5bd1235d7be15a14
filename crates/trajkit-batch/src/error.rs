//! Error types for batch construction, velocity derivation, and metrics.

use crate::shape::BatchShape;

/// Errors from trajectory batch validation and batch operations.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Returned when the flat buffer length does not match the requested shape.
    #[error("buffer holds {actual} values but shape requires {expected}")]
    DataLength {
        /// Number of values implied by the shape.
        expected: usize,
        /// Number of values actually supplied.
        actual: usize,
    },

    /// Returned when a batch contains NaN, infinity, or negative infinity.
    #[error("batch contains non-finite value at flat index {index}")]
    NonFiniteValue {
        /// Flat position of the first non-finite value found.
        index: usize,
    },

    /// Returned when nested point lists do not all share the same length.
    #[error("trajectory {index} has {actual} steps, expected {expected}")]
    RaggedTrajectory {
        /// Index of the first trajectory with a different length.
        index: usize,
        /// Step count of the first trajectory.
        expected: usize,
        /// Step count of the offending trajectory.
        actual: usize,
    },

    /// Returned when an operation requires a specific channel count.
    #[error("expected {expected} channels per point, got {actual}")]
    ChannelMismatch {
        /// Channel count the operation works on.
        expected: usize,
        /// Channel count of the supplied batch.
        actual: usize,
    },

    /// Returned when a batch has too few time steps for the operation.
    #[error("operation needs at least {min} time steps, got {actual}")]
    TooFewSteps {
        /// Minimum number of steps required.
        min: usize,
        /// Number of steps in the supplied batch.
        actual: usize,
    },

    /// Returned when two paired batches must have identical shapes but do not.
    #[error("shape mismatch: {left} vs {right}")]
    ShapeMismatch {
        /// Shape of the first batch.
        left: BatchShape,
        /// Shape of the second batch.
        right: BatchShape,
    },

    /// Returned when two paired batches disagree on trajectory count.
    #[error("trajectory count mismatch: {left} vs {right}")]
    TrajectoryCountMismatch {
        /// Trajectory count of the first batch.
        left: usize,
        /// Trajectory count of the second batch.
        right: usize,
    },

    /// Returned when a trajectory index is outside the batch.
    #[error("trajectory index {index} out of range for batch of {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of trajectories in the batch.
        len: usize,
    },
}
