//! Jitter augmentation for turning (strongly non-linear) trajectories.

use rand::seq::index;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, instrument};

use trajkit_batch::{TrajectoryBatch, XY};

use crate::error::TransformError;

/// Unit shift directions applied to each selected trajectory, in output order:
/// left, right, up, down.
const DIRECTIONS: [[f64; 2]; 4] = [[-1.0, 0.0], [1.0, 0.0], [0.0, -1.0], [0.0, 1.0]];

/// Configuration for turning-trajectory augmentation.
///
/// A trajectory is turning when its start-to-end distance `d1` is less than
/// `threshold * d2`, where `d2` is its path length (sum of step distances). Every
/// selected turning trajectory is emitted four times, shifted by `offset` to the
/// left, right, up, and down. The output holds only the new copies and is meant to
/// be concatenated onto the training batch by the caller.
///
/// Construct via [`TurningAugment::new`] (or [`Default`]), then chain `with_*`
/// methods to override defaults.
///
/// # Defaults
///
/// | Parameter    | Default |
/// |--------------|---------|
/// | `threshold`  | 0.5     |
/// | `proportion` | 1.0     |
/// | `offset`     | 0.1     |
#[derive(Debug, Clone)]
pub struct TurningAugment {
    threshold: f64,
    proportion: f64,
    offset: f64,
}

impl Default for TurningAugment {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            proportion: 1.0,
            offset: 0.1,
        }
    }
}

impl TurningAugment {
    /// Create a configuration with the given turning threshold `p`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TransformError::InvalidThreshold`] | `threshold` is negative, NaN, or infinite |
    pub fn new(threshold: f64) -> Result<Self, TransformError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(TransformError::InvalidThreshold { threshold });
        }
        Ok(Self {
            threshold,
            ..Self::default()
        })
    }

    /// Set the fraction of turning trajectories to augment. Values below 1.0
    /// randomly downsample the turning set; 1.0 and above keep all of it.
    #[must_use]
    pub fn with_proportion(mut self, proportion: f64) -> Self {
        self.proportion = proportion;
        self
    }

    /// Set the jitter distance applied in each of the four directions.
    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Return the turning threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Return the fraction of turning trajectories augmented.
    #[must_use]
    pub fn proportion(&self) -> f64 {
        self.proportion
    }

    /// Return the jitter distance.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Flag each trajectory of `batch` as turning or not.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TransformError::Batch`] | Batch is not two-channel, or non-empty with fewer than 2 steps |
    pub fn turning_mask(&self, batch: &TrajectoryBatch) -> Result<Vec<bool>, TransformError> {
        batch.require_channels(XY)?;
        batch.require_steps(2)?;
        let n_steps = batch.n_steps();
        let mask = (0..batch.n_trajectories())
            .into_par_iter()
            .map(|i| {
                let traj = batch.trajectory(i);
                let first = &traj[..XY];
                let last = &traj[(n_steps - 1) * XY..];
                let d1 = (last[0] - first[0]).hypot(last[1] - first[1]);
                let d2: f64 = traj[XY..]
                    .chunks_exact(XY)
                    .zip(traj.chunks_exact(XY))
                    .map(|(b, a)| (b[0] - a[0]).hypot(b[1] - a[1]))
                    .sum();
                d1 < self.threshold * d2
            })
            .collect();
        Ok(mask)
    }

    /// Produce four jittered copies of each selected turning trajectory.
    ///
    /// With `proportion < 1.0`, `round(n_turning * proportion)` turning trajectories
    /// are drawn from `rng` without replacement and kept in batch order. The output
    /// has `4 * selected` trajectories laid out with stride 4 (left, right, up,
    /// down per source trajectory). No turning trajectories yields an empty batch
    /// with the input's step count.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TransformError::InvalidProportion`] | `proportion` is negative, NaN, or infinite |
    /// | [`TransformError::InvalidOffset`] | `offset` is NaN or infinite |
    /// | [`TransformError::Batch`] | Batch is not two-channel, or non-empty with fewer than 2 steps |
    #[instrument(skip(self, batch, rng), fields(shape = %batch.shape(), threshold = self.threshold))]
    pub fn apply<R>(
        &self,
        batch: &TrajectoryBatch,
        rng: &mut R,
    ) -> Result<TrajectoryBatch, TransformError>
    where
        R: Rng + ?Sized,
    {
        if !self.proportion.is_finite() || self.proportion < 0.0 {
            return Err(TransformError::InvalidProportion {
                proportion: self.proportion,
            });
        }
        if !self.offset.is_finite() {
            return Err(TransformError::InvalidOffset {
                offset: self.offset,
            });
        }

        let turning: Vec<usize> = self
            .turning_mask(batch)?
            .into_iter()
            .enumerate()
            .filter_map(|(i, is_turning)| is_turning.then_some(i))
            .collect();

        let selected = if self.proportion < 1.0 {
            let amount = ((turning.len() as f64 * self.proportion).round() as usize)
                .min(turning.len());
            let mut picks = index::sample(rng, turning.len(), amount).into_vec();
            picks.sort_unstable();
            debug!(n_turning = turning.len(), amount, "turning set downsampled");
            picks.into_iter().map(|k| turning[k]).collect()
        } else {
            turning
        };

        if selected.is_empty() {
            debug!("no turning trajectories selected");
            return Ok(TrajectoryBatch::empty(batch.n_steps(), XY));
        }

        let stride = batch.shape().trajectory_stride();
        let mut data = Vec::with_capacity(selected.len() * DIRECTIONS.len() * stride);
        for &i in &selected {
            let traj = batch.trajectory(i);
            for [ux, uy] in DIRECTIONS {
                let (dx, dy) = (ux * self.offset, uy * self.offset);
                for p in traj.chunks_exact(XY) {
                    data.push(p[0] + dx);
                    data.push(p[1] + dy);
                }
            }
        }
        debug!(n_selected = selected.len(), "turning trajectories jittered");

        Ok(TrajectoryBatch::new(
            data,
            selected.len() * DIRECTIONS.len(),
            batch.n_steps(),
        )?)
    }
}
