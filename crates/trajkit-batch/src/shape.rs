use std::fmt;

use serde::Serialize;

/// Dimensions of a [`TrajectoryBatch`](crate::TrajectoryBatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BatchShape {
    /// Number of trajectories (outer axis).
    pub n_trajectories: usize,
    /// Number of time steps per trajectory.
    pub n_steps: usize,
    /// Number of values per point (2 for x, y).
    pub n_channels: usize,
}

impl BatchShape {
    /// Create a shape from its three dimensions.
    #[must_use]
    pub fn new(n_trajectories: usize, n_steps: usize, n_channels: usize) -> Self {
        Self {
            n_trajectories,
            n_steps,
            n_channels,
        }
    }

    /// Number of scalar values a batch of this shape holds.
    #[must_use]
    pub fn volume(&self) -> usize {
        self.n_trajectories * self.n_steps * self.n_channels
    }

    /// Number of scalar values in a single trajectory.
    #[must_use]
    pub fn trajectory_stride(&self) -> usize {
        self.n_steps * self.n_channels
    }
}

impl fmt::Display for BatchShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}]",
            self.n_trajectories, self.n_steps, self.n_channels
        )
    }
}
