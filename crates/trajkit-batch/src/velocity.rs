//! Finite-difference velocity and velocity feature concatenation.

use tracing::{debug, instrument};

use crate::batch::{TrajectoryBatch, XY};
use crate::error::BatchError;

/// Channel count of the observation features produced by [`process_velocity`]:
/// x, y, vx, vy.
pub const VELOCITY_FEATURES: usize = 2 * XY;

/// Compute the per-step velocity of every trajectory.
///
/// `v[t] = x[t] - x[t-1]` for `t >= 1`, and `v[0] = v[1]`: the first step
/// duplicates the second step's velocity instead of reporting zero. Works on any
/// channel count; the output has the same shape as the input. An empty batch
/// yields an empty batch.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`BatchError::TooFewSteps`] | Batch is non-empty with fewer than 2 steps |
#[instrument(skip(batch), fields(shape = %batch.shape()))]
pub fn velocity(batch: &TrajectoryBatch) -> Result<TrajectoryBatch, BatchError> {
    batch.require_steps(2)?;
    let shape = batch.shape();
    if shape.volume() == 0 {
        return Ok(batch.clone());
    }

    let c = shape.n_channels;
    let mut data = Vec::with_capacity(shape.volume());
    for traj in batch.trajectories() {
        let start = data.len();
        // v[0] duplicates v[1]
        data.extend(traj[c..2 * c].iter().zip(&traj[..c]).map(|(b, a)| b - a));
        for (next, prev) in traj[c..].chunks_exact(c).zip(traj.chunks_exact(c)) {
            data.extend(next.iter().zip(prev).map(|(b, a)| b - a));
        }
        debug_assert_eq!(data.len() - start, shape.trajectory_stride());
    }

    // Differences of finite values are finite unless they overflow.
    TrajectoryBatch::with_channels(data, shape.n_trajectories, shape.n_steps, c)
}

/// Append velocity features to the observed segment of each trajectory.
///
/// `obs` and `pred` are joined along the time axis and [`velocity`] is taken over
/// the full sequence, so the last observed step's velocity is the same one a
/// model would see at the observation/prediction boundary. Returns:
///
/// - a `[n, obs_len, 4]` batch whose points are `(x, y, vx, vy)`, using the
///   velocities of the observed steps only;
/// - `pred`, unchanged, as the target batch.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`BatchError::ChannelMismatch`] | `obs` or `pred` is not two-channel |
/// | [`BatchError::TrajectoryCountMismatch`] | `obs` and `pred` differ in trajectory count |
/// | [`BatchError::TooFewSteps`] | Combined sequence has fewer than 2 steps |
#[instrument(skip(obs, pred), fields(obs = %obs.shape(), pred = %pred.shape()))]
pub fn process_velocity(
    obs: &TrajectoryBatch,
    pred: &TrajectoryBatch,
) -> Result<(TrajectoryBatch, TrajectoryBatch), BatchError> {
    obs.require_channels(XY)?;
    pred.require_channels(XY)?;
    let full = obs.concat_steps(pred)?;
    let vel = velocity(&full)?;

    let obs_len = obs.n_steps();
    let mut data = Vec::with_capacity(obs.n_trajectories() * obs_len * VELOCITY_FEATURES);
    for (i, traj) in obs.trajectories().enumerate() {
        let v = &vel.trajectory(i)[..obs_len * XY];
        for (pos, dv) in traj.chunks_exact(XY).zip(v.chunks_exact(XY)) {
            data.extend_from_slice(pos);
            data.extend_from_slice(dv);
        }
    }
    debug!(n = obs.n_trajectories(), obs_len, "velocity features assembled");

    let features = TrajectoryBatch::with_channels(
        data,
        obs.n_trajectories(),
        obs_len,
        VELOCITY_FEATURES,
    )?;
    Ok((features, pred.clone()))
}
