//! Dense trajectory batch tensor with validation guarantees.

use crate::error::BatchError;
use crate::shape::BatchShape;

/// Channel count of a position batch: one x and one y value per point.
pub const XY: usize = 2;

/// Owned, validated `[n_trajectories, n_steps, n_channels]` tensor stored row-major.
///
/// Guaranteed rectangular, with a buffer length matching its shape and all values
/// finite. Every operation in this workspace borrows a batch and returns a new one;
/// no method mutates a batch in place.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryBatch {
    data: Vec<f64>,
    shape: BatchShape,
}

impl TrajectoryBatch {
    /// Create a two-channel (x, y) batch from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::DataLength`] | `data.len() != n_trajectories * n_steps * 2` |
    /// | [`BatchError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(data: Vec<f64>, n_trajectories: usize, n_steps: usize) -> Result<Self, BatchError> {
        Self::with_channels(data, n_trajectories, n_steps, XY)
    }

    /// Create a batch with an arbitrary channel count from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::DataLength`] | `data.len()` does not match the shape volume |
    /// | [`BatchError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn with_channels(
        data: Vec<f64>,
        n_trajectories: usize,
        n_steps: usize,
        n_channels: usize,
    ) -> Result<Self, BatchError> {
        let shape = BatchShape::new(n_trajectories, n_steps, n_channels);
        if data.len() != shape.volume() {
            return Err(BatchError::DataLength {
                expected: shape.volume(),
                actual: data.len(),
            });
        }
        if let Some(index) = data.iter().position(|v| !v.is_finite()) {
            return Err(BatchError::NonFiniteValue { index });
        }
        Ok(Self { data, shape })
    }

    /// Create a two-channel batch from per-trajectory point lists.
    ///
    /// An empty slice produces an empty `[0, 0, 2]` batch.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::RaggedTrajectory`] | Trajectories differ in length |
    /// | [`BatchError::NonFiniteValue`] | Any coordinate is NaN or infinite |
    pub fn from_points(trajectories: &[Vec<[f64; 2]>]) -> Result<Self, BatchError> {
        let n_steps = trajectories.first().map_or(0, Vec::len);
        if let Some((index, t)) = trajectories
            .iter()
            .enumerate()
            .find(|(_, t)| t.len() != n_steps)
        {
            return Err(BatchError::RaggedTrajectory {
                index,
                expected: n_steps,
                actual: t.len(),
            });
        }
        let data: Vec<f64> = trajectories.iter().flatten().flatten().copied().collect();
        Self::new(data, trajectories.len(), n_steps)
    }

    /// Create a two-channel batch filled with zeros.
    #[must_use]
    pub fn zeros(n_trajectories: usize, n_steps: usize) -> Self {
        let shape = BatchShape::new(n_trajectories, n_steps, XY);
        Self {
            data: vec![0.0; shape.volume()],
            shape,
        }
    }

    /// Create a two-channel batch with every coordinate set to `value`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::NonFiniteValue`] | `value` is NaN or infinite and the batch is non-empty |
    pub fn filled(n_trajectories: usize, n_steps: usize, value: f64) -> Result<Self, BatchError> {
        let shape = BatchShape::new(n_trajectories, n_steps, XY);
        Self::new(vec![value; shape.volume()], n_trajectories, n_steps)
    }

    /// Create an empty batch with zero trajectories and the given step/channel layout.
    #[must_use]
    pub fn empty(n_steps: usize, n_channels: usize) -> Self {
        Self {
            data: Vec::new(),
            shape: BatchShape::new(0, n_steps, n_channels),
        }
    }

    /// Return the batch dimensions.
    #[must_use]
    pub fn shape(&self) -> BatchShape {
        self.shape
    }

    /// Return the number of trajectories.
    #[must_use]
    pub fn n_trajectories(&self) -> usize {
        self.shape.n_trajectories
    }

    /// Return the number of time steps per trajectory.
    #[must_use]
    pub fn n_steps(&self) -> usize {
        self.shape.n_steps
    }

    /// Return the number of values per point.
    #[must_use]
    pub fn n_channels(&self) -> usize {
        self.shape.n_channels
    }

    /// Return the number of trajectories. Alias of [`n_trajectories`][Self::n_trajectories].
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape.n_trajectories
    }

    /// Return true if the batch holds no trajectories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shape.n_trajectories == 0
    }

    /// Borrow the flat row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Consume and return the flat row-major buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }

    /// Borrow trajectory `index` as a flat `n_steps * n_channels` slice.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.n_trajectories()`.
    #[must_use]
    pub fn trajectory(&self, index: usize) -> &[f64] {
        let stride = self.shape.trajectory_stride();
        &self.data[index * stride..(index + 1) * stride]
    }

    /// Iterate over trajectories as flat slices, in batch order.
    pub fn trajectories(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        (0..self.shape.n_trajectories).map(move |i| self.trajectory(i))
    }

    /// Borrow the channel values of one point.
    ///
    /// # Panics
    ///
    /// Panics if `trajectory` or `step` is out of range.
    #[must_use]
    pub fn point(&self, trajectory: usize, step: usize) -> &[f64] {
        assert!(step < self.shape.n_steps, "step {step} out of range");
        let c = self.shape.n_channels;
        let start = trajectory * self.shape.trajectory_stride() + step * c;
        &self.data[start..start + c]
    }

    /// Return the (x, y) coordinates of one point of a two-channel batch.
    ///
    /// # Panics
    ///
    /// Panics if the batch does not have exactly two channels or the point is
    /// out of range.
    #[must_use]
    pub fn xy(&self, trajectory: usize, step: usize) -> [f64; 2] {
        assert_eq!(self.shape.n_channels, XY, "xy() requires a two-channel batch");
        let p = self.point(trajectory, step);
        [p[0], p[1]]
    }

    /// Fail with [`BatchError::ChannelMismatch`] unless the batch has `expected` channels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::ChannelMismatch`] | `n_channels != expected` |
    pub fn require_channels(&self, expected: usize) -> Result<(), BatchError> {
        if self.shape.n_channels != expected {
            return Err(BatchError::ChannelMismatch {
                expected,
                actual: self.shape.n_channels,
            });
        }
        Ok(())
    }

    /// Fail with [`BatchError::TooFewSteps`] unless a non-empty batch has at least
    /// `min` steps. Empty batches always pass.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::TooFewSteps`] | Batch is non-empty and `n_steps < min` |
    pub fn require_steps(&self, min: usize) -> Result<(), BatchError> {
        if !self.is_empty() && self.shape.n_steps < min {
            return Err(BatchError::TooFewSteps {
                min,
                actual: self.shape.n_steps,
            });
        }
        Ok(())
    }

    /// Apply `f` to every (x, y) point, producing a new two-channel batch.
    ///
    /// `f` receives the trajectory index and the point. Used for all affine point
    /// transforms (shift, scale, rotation, axis swap).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::ChannelMismatch`] | Batch is not two-channel |
    /// | [`BatchError::NonFiniteValue`] | `f` produced NaN or infinity |
    pub fn map_xy<F>(&self, mut f: F) -> Result<Self, BatchError>
    where
        F: FnMut(usize, [f64; 2]) -> [f64; 2],
    {
        self.require_channels(XY)?;
        let stride = self.shape.trajectory_stride();
        let mut data = Vec::with_capacity(self.data.len());
        for (i, point) in self.data.chunks_exact(XY).enumerate() {
            let traj = if stride == 0 { 0 } else { (i * XY) / stride };
            data.extend_from_slice(&f(traj, [point[0], point[1]]));
        }
        if let Some(index) = data.iter().position(|v| !v.is_finite()) {
            return Err(BatchError::NonFiniteValue { index });
        }
        Ok(Self {
            data,
            shape: self.shape,
        })
    }

    /// Concatenate `other` after `self` along the trajectory axis.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::ShapeMismatch`] | Step or channel counts differ |
    pub fn concat(&self, other: &Self) -> Result<Self, BatchError> {
        if self.shape.n_steps != other.shape.n_steps
            || self.shape.n_channels != other.shape.n_channels
        {
            return Err(BatchError::ShapeMismatch {
                left: self.shape,
                right: other.shape,
            });
        }
        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data);
        Ok(Self {
            data,
            shape: BatchShape::new(
                self.shape.n_trajectories + other.shape.n_trajectories,
                self.shape.n_steps,
                self.shape.n_channels,
            ),
        })
    }

    /// Concatenate `other` after `self` along the time axis, trajectory by trajectory.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::TrajectoryCountMismatch`] | Trajectory counts differ |
    /// | [`BatchError::ChannelMismatch`] | Channel counts differ |
    pub fn concat_steps(&self, other: &Self) -> Result<Self, BatchError> {
        if self.shape.n_trajectories != other.shape.n_trajectories {
            return Err(BatchError::TrajectoryCountMismatch {
                left: self.shape.n_trajectories,
                right: other.shape.n_trajectories,
            });
        }
        other.require_channels(self.shape.n_channels)?;
        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        for (a, b) in self.trajectories().zip(other.trajectories()) {
            data.extend_from_slice(a);
            data.extend_from_slice(b);
        }
        Ok(Self {
            data,
            shape: BatchShape::new(
                self.shape.n_trajectories,
                self.shape.n_steps + other.shape.n_steps,
                self.shape.n_channels,
            ),
        })
    }

    /// Split every trajectory at step `at`, returning steps `..at` and `at..`.
    ///
    /// Inverse of [`concat_steps`][Self::concat_steps]; used to cut full sequences
    /// into observation and prediction windows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::TooFewSteps`] | `at > n_steps` |
    pub fn split_steps(&self, at: usize) -> Result<(Self, Self), BatchError> {
        if at > self.shape.n_steps {
            return Err(BatchError::TooFewSteps {
                min: at,
                actual: self.shape.n_steps,
            });
        }
        let cut = at * self.shape.n_channels;
        let mut head = Vec::with_capacity(self.shape.n_trajectories * cut);
        let mut tail = Vec::with_capacity(self.data.len() - self.shape.n_trajectories * cut);
        for traj in self.trajectories() {
            head.extend_from_slice(&traj[..cut]);
            tail.extend_from_slice(&traj[cut..]);
        }
        let n = self.shape.n_trajectories;
        let c = self.shape.n_channels;
        Ok((
            Self {
                data: head,
                shape: BatchShape::new(n, at, c),
            },
            Self {
                data: tail,
                shape: BatchShape::new(n, self.shape.n_steps - at, c),
            },
        ))
    }

    /// Gather the trajectories at `indices` (in the given order) into a new batch.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::IndexOutOfRange`] | Any index is `>= n_trajectories` |
    pub fn select(&self, indices: &[usize]) -> Result<Self, BatchError> {
        let len = self.shape.n_trajectories;
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(BatchError::IndexOutOfRange { index, len });
        }
        let mut data = Vec::with_capacity(indices.len() * self.shape.trajectory_stride());
        for &i in indices {
            data.extend_from_slice(self.trajectory(i));
        }
        Ok(Self {
            data,
            shape: BatchShape::new(indices.len(), self.shape.n_steps, self.shape.n_channels),
        })
    }
}

impl TryFrom<&[Vec<[f64; 2]>]> for TrajectoryBatch {
    type Error = BatchError;

    fn try_from(trajectories: &[Vec<[f64; 2]>]) -> Result<Self, Self::Error> {
        Self::from_points(trajectories)
    }
}

impl AsRef<[f64]> for TrajectoryBatch {
    fn as_ref(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_three() -> TrajectoryBatch {
        TrajectoryBatch::from_points(&[
            vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]],
            vec![[10.0, 0.0], [11.0, 0.0], [12.0, 0.0]],
        ])
        .unwrap()
    }

    #[test]
    fn rejects_wrong_length() {
        let result = TrajectoryBatch::new(vec![0.0; 5], 1, 3);
        assert!(matches!(
            result,
            Err(BatchError::DataLength { expected: 6, actual: 5 })
        ));
    }

    #[test]
    fn rejects_nan() {
        let result = TrajectoryBatch::new(vec![0.0, 1.0, f64::NAN, 3.0], 1, 2);
        assert!(matches!(result, Err(BatchError::NonFiniteValue { index: 2 })));
    }

    #[test]
    fn rejects_ragged_points() {
        let result = TrajectoryBatch::from_points(&[
            vec![[0.0, 0.0], [1.0, 1.0]],
            vec![[0.0, 0.0]],
        ]);
        assert!(matches!(
            result,
            Err(BatchError::RaggedTrajectory { index: 1, expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn from_points_layout_is_row_major() {
        let batch = two_by_three();
        assert_eq!(batch.shape(), BatchShape::new(2, 3, 2));
        assert_eq!(batch.trajectory(1), &[10.0, 0.0, 11.0, 0.0, 12.0, 0.0]);
        assert_eq!(batch.xy(0, 2), [2.0, 2.0]);
    }

    #[test]
    fn empty_from_points() {
        let batch = TrajectoryBatch::from_points(&[]).unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.shape(), BatchShape::new(0, 0, 2));
    }

    #[test]
    fn map_xy_passes_trajectory_index() {
        let batch = two_by_three();
        let mapped = batch.map_xy(|i, [x, y]| [x + i as f64, y]).unwrap();
        assert_eq!(mapped.xy(0, 1), [1.0, 1.0]);
        assert_eq!(mapped.xy(1, 1), [12.0, 0.0]);
    }

    #[test]
    fn map_xy_rejects_four_channels() {
        let batch = TrajectoryBatch::with_channels(vec![0.0; 8], 1, 2, 4).unwrap();
        let result = batch.map_xy(|_, p| p);
        assert!(matches!(
            result,
            Err(BatchError::ChannelMismatch { expected: 2, actual: 4 })
        ));
    }

    #[test]
    fn filled_sets_every_coordinate() {
        let batch = TrajectoryBatch::filled(2, 3, -1.5).unwrap();
        assert_eq!(batch.shape(), BatchShape::new(2, 3, 2));
        assert!(batch.as_slice().iter().all(|&v| v == -1.5));
    }

    #[test]
    fn filled_rejects_non_finite_value() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                TrajectoryBatch::filled(2, 3, value),
                Err(BatchError::NonFiniteValue { index: 0 })
            ));
        }
        // nothing to store, nothing to reject
        assert!(TrajectoryBatch::filled(0, 3, f64::NAN).unwrap().is_empty());
    }

    #[test]
    fn map_xy_reports_overflow() {
        let batch = TrajectoryBatch::filled(1, 1, f64::MAX).unwrap();
        let result = batch.map_xy(|_, [x, y]| [x * 2.0, y]);
        assert!(matches!(result, Err(BatchError::NonFiniteValue { index: 0 })));
    }

    #[test]
    fn concat_stacks_trajectories() {
        let a = two_by_three();
        let b = TrajectoryBatch::zeros(1, 3);
        let joined = a.concat(&b).unwrap();
        assert_eq!(joined.n_trajectories(), 3);
        assert_eq!(joined.trajectory(2), &[0.0; 6]);
    }

    #[test]
    fn concat_rejects_step_mismatch() {
        let a = two_by_three();
        let b = TrajectoryBatch::zeros(1, 4);
        assert!(matches!(a.concat(&b), Err(BatchError::ShapeMismatch { .. })));
    }

    #[test]
    fn concat_steps_joins_time_axis() {
        let obs = TrajectoryBatch::from_points(&[vec![[0.0, 0.0]], vec![[5.0, 5.0]]]).unwrap();
        let pred = TrajectoryBatch::from_points(&[
            vec![[1.0, 1.0], [2.0, 2.0]],
            vec![[6.0, 6.0], [7.0, 7.0]],
        ])
        .unwrap();
        let joined = obs.concat_steps(&pred).unwrap();
        assert_eq!(joined.shape(), BatchShape::new(2, 3, 2));
        assert_eq!(joined.trajectory(1), &[5.0, 5.0, 6.0, 6.0, 7.0, 7.0]);
    }

    #[test]
    fn concat_steps_rejects_count_mismatch() {
        let a = TrajectoryBatch::zeros(2, 3);
        let b = TrajectoryBatch::zeros(3, 3);
        assert!(matches!(
            a.concat_steps(&b),
            Err(BatchError::TrajectoryCountMismatch { left: 2, right: 3 })
        ));
    }

    #[test]
    fn split_steps_inverts_concat_steps() {
        let batch = two_by_three();
        let (head, tail) = batch.split_steps(1).unwrap();
        assert_eq!(head.shape(), BatchShape::new(2, 1, 2));
        assert_eq!(tail.shape(), BatchShape::new(2, 2, 2));
        assert_eq!(tail.xy(1, 0), [11.0, 0.0]);
        assert_eq!(head.concat_steps(&tail).unwrap(), batch);
    }

    #[test]
    fn split_steps_rejects_cut_past_end() {
        assert!(matches!(
            two_by_three().split_steps(4),
            Err(BatchError::TooFewSteps { min: 4, actual: 3 })
        ));
    }

    #[test]
    fn select_gathers_in_order() {
        let batch = two_by_three();
        let picked = batch.select(&[1, 1, 0]).unwrap();
        assert_eq!(picked.n_trajectories(), 3);
        assert_eq!(picked.xy(0, 0), [10.0, 0.0]);
        assert_eq!(picked.xy(2, 0), [0.0, 0.0]);
    }

    #[test]
    fn select_rejects_out_of_range() {
        let batch = two_by_three();
        assert!(matches!(
            batch.select(&[0, 2]),
            Err(BatchError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn require_steps_skips_empty_batches() {
        assert!(TrajectoryBatch::empty(0, 2).require_steps(2).is_ok());
        assert!(matches!(
            TrajectoryBatch::zeros(1, 1).require_steps(2),
            Err(BatchError::TooFewSteps { min: 2, actual: 1 })
        ));
    }
}
