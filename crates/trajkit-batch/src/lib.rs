//! Trajectory batch tensor, velocity derivation, and displacement metrics.
//!
//! Pure math library with zero I/O. A [`TrajectoryBatch`] is a dense
//! `[n_trajectories, n_steps, n_channels]` tensor of finite `f64` values;
//! position batches carry two channels (x, y). Velocity features and the
//! ADE/FDE evaluation metrics operate on borrowed batches and always return
//! newly allocated results.

mod batch;
mod displacement;
mod error;
mod metrics;
mod shape;
mod velocity;

pub use batch::{TrajectoryBatch, XY};
pub use displacement::Displacement;
pub use error::BatchError;
pub use metrics::{ade, ade_per_trajectory, fde, fde_per_trajectory};
pub use shape::BatchShape;
pub use velocity::{process_velocity, velocity, VELOCITY_FEATURES};
