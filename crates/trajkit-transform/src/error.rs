//! Error types for augmentation and normalization.

use trajkit_batch::BatchError;

/// Errors from trajectory augmentation and normalization.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Returned when only some of `shift_x`, `shift_y`, `scale` are supplied.
    #[error(
        "normalization parameters must be all given or all omitted \
         (shift_x: {shift_x}, shift_y: {shift_y}, scale: {scale})"
    )]
    PartialNormParams {
        /// Whether `shift_x` was supplied.
        shift_x: bool,
        /// Whether `shift_y` was supplied.
        shift_y: bool,
        /// Whether `scale` was supplied.
        scale: bool,
    },

    /// Returned when a normalization scale is zero, negative, or non-finite.
    #[error("scale must be finite and positive, got {scale}")]
    InvalidScale {
        /// The invalid scale value provided.
        scale: f64,
    },

    /// Returned when a normalization shift is NaN or infinite.
    #[error("shift must be finite, got ({shift_x}, {shift_y})")]
    NonFiniteShift {
        /// The x component of the shift.
        shift_x: f64,
        /// The y component of the shift.
        shift_y: f64,
    },

    /// Returned when the turning threshold is negative or non-finite.
    #[error("turning threshold must be finite and non-negative, got {threshold}")]
    InvalidThreshold {
        /// The invalid threshold value provided.
        threshold: f64,
    },

    /// Returned when the augmented proportion is negative or non-finite.
    #[error("proportion must be finite and non-negative, got {proportion}")]
    InvalidProportion {
        /// The invalid proportion value provided.
        proportion: f64,
    },

    /// Returned when the jitter offset is NaN or infinite.
    #[error("jitter offset must be finite, got {offset}")]
    InvalidOffset {
        /// The invalid offset value provided.
        offset: f64,
    },

    /// Wraps a batch shape or value error.
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),
}
