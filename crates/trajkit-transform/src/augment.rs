//! Shape-preserving geometric augmentations: time reversal, random rotation, axis swap.

use std::f64::consts::TAU;

use rand::Rng;
use tracing::{debug, instrument};

use trajkit_batch::{TrajectoryBatch, XY};

use crate::error::TransformError;

/// Reverse the step order of every trajectory.
///
/// With `concatenate`, the result is the reversed batch followed by the original
/// batch, doubling the trajectory count. Works on any channel count.
#[must_use]
#[instrument(skip(batch), fields(shape = %batch.shape()))]
pub fn reverse(batch: &TrajectoryBatch, concatenate: bool) -> TrajectoryBatch {
    let shape = batch.shape();
    let c = shape.n_channels;
    let mut data = Vec::with_capacity(shape.volume());
    if c > 0 {
        for traj in batch.trajectories() {
            for point in traj.chunks_exact(c).rev() {
                data.extend_from_slice(point);
            }
        }
    }
    let reversed =
        TrajectoryBatch::with_channels(data, shape.n_trajectories, shape.n_steps, c)
            .expect("reversal permutes already validated values");

    if concatenate {
        return reversed
            .concat(batch)
            .expect("reversed batch has the same step and channel counts");
    }
    reversed
}

/// Swap the x and y coordinates of every point.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TransformError::Batch`] | Batch is not two-channel |
pub fn swap_xy(batch: &TrajectoryBatch) -> Result<TrajectoryBatch, TransformError> {
    Ok(batch.map_xy(|_, [x, y]| [y, x])?)
}

/// Rotate each trajectory by its own uniformly random angle in `[0, 2π)`.
///
/// Each point `p` becomes `R · (p - origin)`, with `origin` defaulting to `(0, 0)`,
/// so the output is centred on the coordinate origin rather than on `origin`.
/// Angles are drawn from `rng` in trajectory order, one per trajectory, so a
/// seeded generator reproduces the same rotations. The rotation is only
/// meaningful for batches already centred near `origin` (for example after
/// [`normalize`](crate::normalize)).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TransformError::Batch`] | Batch is not two-channel, or the result overflows |
#[instrument(skip(batch, rng), fields(shape = %batch.shape()))]
pub fn random_rotate<R>(
    batch: &TrajectoryBatch,
    origin: Option<[f64; 2]>,
    rng: &mut R,
) -> Result<TrajectoryBatch, TransformError>
where
    R: Rng + ?Sized,
{
    batch.require_channels(XY)?;
    let [ox, oy] = origin.unwrap_or([0.0, 0.0]);

    let rotations: Vec<(f64, f64)> = (0..batch.n_trajectories())
        .map(|_| {
            let angle: f64 = rng.gen_range(0.0..TAU);
            angle.sin_cos()
        })
        .collect();
    debug!(n = rotations.len(), ox, oy, "rotation angles drawn");

    let rotated = batch.map_xy(|i, [x, y]| {
        let (sin, cos) = rotations[i];
        let (dx, dy) = (x - ox, y - oy);
        [cos * dx - sin * dy, sin * dx + cos * dy]
    })?;
    Ok(rotated)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use trajkit_batch::{BatchError, BatchShape};

    use super::*;

    fn sample() -> TrajectoryBatch {
        TrajectoryBatch::from_points(&[
            vec![[0.0, 0.0], [1.0, 0.5], [2.0, 1.5]],
            vec![[-1.0, 2.0], [-1.5, 2.5], [-3.0, 2.0]],
        ])
        .unwrap()
    }

    #[test]
    fn reverse_flips_steps() {
        let reversed = reverse(&sample(), false);
        assert_eq!(reversed.xy(0, 0), [2.0, 1.5]);
        assert_eq!(reversed.xy(0, 2), [0.0, 0.0]);
        assert_eq!(reversed.xy(1, 1), [-1.5, 2.5]);
    }

    #[test]
    fn reverse_twice_is_identity() {
        let batch = sample();
        assert_eq!(reverse(&reverse(&batch, false), false), batch);
    }

    #[test]
    fn reverse_concatenated_puts_reversed_first() {
        let batch = sample();
        let doubled = reverse(&batch, true);
        assert_eq!(doubled.n_trajectories(), 4);
        let reversed = reverse(&batch, false);
        assert_eq!(doubled.select(&[0, 1]).unwrap(), reversed);
        assert_eq!(doubled.select(&[2, 3]).unwrap(), batch);
    }

    #[test]
    fn reverse_handles_feature_batches() {
        let batch =
            TrajectoryBatch::with_channels((0..8).map(|v| v as f64).collect(), 1, 2, 4).unwrap();
        let reversed = reverse(&batch, false);
        assert_eq!(reversed.as_slice(), &[4.0, 5.0, 6.0, 7.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn reverse_empty_batch() {
        let reversed = reverse(&TrajectoryBatch::empty(12, 2), true);
        assert_eq!(reversed.shape(), BatchShape::new(0, 12, 2));
    }

    #[test]
    fn swap_xy_swaps_channels() {
        let swapped = swap_xy(&sample()).unwrap();
        assert_eq!(swapped.xy(0, 1), [0.5, 1.0]);
        assert_eq!(swapped.xy(1, 2), [2.0, -3.0]);
    }

    #[test]
    fn swap_xy_twice_is_identity() {
        let batch = sample();
        assert_eq!(swap_xy(&swap_xy(&batch).unwrap()).unwrap(), batch);
    }

    #[test]
    fn swap_xy_rejects_feature_batches() {
        let batch = TrajectoryBatch::with_channels(vec![0.0; 4], 1, 1, 4).unwrap();
        assert!(matches!(
            swap_xy(&batch),
            Err(TransformError::Batch(BatchError::ChannelMismatch { expected: 2, actual: 4 }))
        ));
    }

    #[test]
    fn rotation_preserves_distance_to_origin() {
        let batch = sample();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let rotated = random_rotate(&batch, None, &mut rng).unwrap();
        for i in 0..2 {
            for t in 0..3 {
                let [x, y] = batch.xy(i, t);
                let [rx, ry] = rotated.xy(i, t);
                assert!((x.hypot(y) - rx.hypot(ry)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn rotation_about_custom_origin_recentres_on_zero() {
        let batch =
            TrajectoryBatch::from_points(&[vec![[3.0, -2.0], [4.0, -2.0], [3.0, 0.0]]]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let rotated = random_rotate(&batch, Some([3.0, -2.0]), &mut rng).unwrap();
        assert_eq!(rotated.xy(0, 0), [0.0, 0.0]);
        let [x, y] = rotated.xy(0, 1);
        assert!((x.hypot(y) - 1.0).abs() < 1e-12);
        let [x, y] = rotated.xy(0, 2);
        assert!((x.hypot(y) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rotation_about_origin_matches_shift_then_rotate() {
        let batch = sample();
        let origin = [0.5, -1.0];
        let shifted = batch.map_xy(|_, [x, y]| [x - origin[0], y - origin[1]]).unwrap();
        let a = random_rotate(&batch, Some(origin), &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        let b = random_rotate(&shifted, None, &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        for (u, v) in a.as_slice().iter().zip(b.as_slice()) {
            assert!((u - v).abs() < 1e-12, "{u} != {v}");
        }
    }

    #[test]
    fn rotation_angle_differs_per_trajectory() {
        let batch = TrajectoryBatch::from_points(&[vec![[1.0, 0.0]], vec![[1.0, 0.0]]]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let rotated = random_rotate(&batch, None, &mut rng).unwrap();
        assert_ne!(rotated.xy(0, 0), rotated.xy(1, 0));
    }

    #[test]
    fn rotation_deterministic_with_same_seed() {
        let batch = sample();
        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = ChaCha8Rng::seed_from_u64(42);
        let a = random_rotate(&batch, None, &mut rng1).unwrap();
        let b = random_rotate(&batch, None, &mut rng2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rotation_of_empty_batch_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let rotated = random_rotate(&TrajectoryBatch::empty(8, 2), None, &mut rng).unwrap();
        assert!(rotated.is_empty());
    }
}
