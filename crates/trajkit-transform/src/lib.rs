//! Geometric augmentation and coordinate normalization for trajectory batches.
//!
//! Pure math library with zero I/O. Augmentations (reversal, random rotation,
//! axis swap, turning-trajectory jitter) and the normalization transforms all
//! borrow a [`TrajectoryBatch`](trajkit_batch::TrajectoryBatch) and return new
//! batches. Randomness is always drawn from a caller-supplied generator, and
//! normalization parameters travel as plain [`NormParams`] values.

mod augment;
mod error;
mod normalize;
mod turning;

pub use augment::{random_rotate, reverse, swap_xy};
pub use error::TransformError;
pub use normalize::{nabs_process, normalize, unnormalize, NormParams};
pub use turning::TurningAugment;
