//! Average and final displacement error (ADE / FDE).

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::batch::{TrajectoryBatch, XY};
use crate::displacement::Displacement;
use crate::error::BatchError;

fn check_pair(predicted: &TrajectoryBatch, ground_truth: &TrajectoryBatch) -> Result<(), BatchError> {
    if predicted.shape() != ground_truth.shape() {
        return Err(BatchError::ShapeMismatch {
            left: predicted.shape(),
            right: ground_truth.shape(),
        });
    }
    predicted.require_channels(XY)
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

fn mean(values: &[f64]) -> Displacement {
    if values.is_empty() {
        return Displacement::ZERO;
    }
    Displacement::new(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean Euclidean distance over the steps of each trajectory.
///
/// Returns one value per trajectory, in batch order. Trajectories with zero steps
/// score `0.0`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`BatchError::ShapeMismatch`] | `predicted` and `ground_truth` shapes differ |
/// | [`BatchError::ChannelMismatch`] | Batches are not two-channel |
pub fn ade_per_trajectory(
    predicted: &TrajectoryBatch,
    ground_truth: &TrajectoryBatch,
) -> Result<Vec<f64>, BatchError> {
    check_pair(predicted, ground_truth)?;
    let n_steps = predicted.n_steps();
    let errors = (0..predicted.n_trajectories())
        .into_par_iter()
        .map(|i| {
            if n_steps == 0 {
                return 0.0;
            }
            let total: f64 = predicted
                .trajectory(i)
                .chunks_exact(XY)
                .zip(ground_truth.trajectory(i).chunks_exact(XY))
                .map(|(p, g)| euclidean(p, g))
                .sum();
            total / n_steps as f64
        })
        .collect();
    Ok(errors)
}

/// Euclidean distance at the final step of each trajectory.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`BatchError::ShapeMismatch`] | `predicted` and `ground_truth` shapes differ |
/// | [`BatchError::ChannelMismatch`] | Batches are not two-channel |
/// | [`BatchError::TooFewSteps`] | Batches are non-empty with zero steps |
pub fn fde_per_trajectory(
    predicted: &TrajectoryBatch,
    ground_truth: &TrajectoryBatch,
) -> Result<Vec<f64>, BatchError> {
    check_pair(predicted, ground_truth)?;
    predicted.require_steps(1)?;
    let last = predicted.n_steps().saturating_sub(1);
    let errors = (0..predicted.n_trajectories())
        .into_par_iter()
        .map(|i| euclidean(predicted.point(i, last), ground_truth.point(i, last)))
        .collect();
    Ok(errors)
}

/// Average displacement error: mean Euclidean distance between corresponding
/// points over every trajectory and every step.
///
/// Symmetric in its arguments. Empty batches score [`Displacement::ZERO`].
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`BatchError::ShapeMismatch`] | `predicted` and `ground_truth` shapes differ |
/// | [`BatchError::ChannelMismatch`] | Batches are not two-channel |
#[instrument(skip(predicted, ground_truth), fields(shape = %predicted.shape()))]
pub fn ade(
    predicted: &TrajectoryBatch,
    ground_truth: &TrajectoryBatch,
) -> Result<Displacement, BatchError> {
    // Rectangular batches: the mean of per-trajectory means equals the mean over all points.
    let per_trajectory = ade_per_trajectory(predicted, ground_truth)?;
    let ade = mean(&per_trajectory);
    debug!(%ade, "ADE computed");
    Ok(ade)
}

/// Final displacement error: mean Euclidean distance between the last predicted
/// and last ground-truth point of each trajectory.
///
/// Symmetric in its arguments. Empty batches score [`Displacement::ZERO`].
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`BatchError::ShapeMismatch`] | `predicted` and `ground_truth` shapes differ |
/// | [`BatchError::ChannelMismatch`] | Batches are not two-channel |
/// | [`BatchError::TooFewSteps`] | Batches are non-empty with zero steps |
#[instrument(skip(predicted, ground_truth), fields(shape = %predicted.shape()))]
pub fn fde(
    predicted: &TrajectoryBatch,
    ground_truth: &TrajectoryBatch,
) -> Result<Displacement, BatchError> {
    let per_trajectory = fde_per_trajectory(predicted, ground_truth)?;
    let fde = mean(&per_trajectory);
    debug!(%fde, "FDE computed");
    Ok(fde)
}
