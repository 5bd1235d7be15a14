//! Coordinate normalization: forward/inverse affine transform and the
//! last-observed-point shift used at evaluation time.

use serde::Serialize;
use tracing::{debug, instrument};

use trajkit_batch::{TrajectoryBatch, XY};

use crate::error::TransformError;

/// Shift and uniform scale of a normalization: `normalized = (raw - shift) / scale`.
///
/// Parameters are plain values: compute them once (for example on a training
/// split) and pass them to [`normalize`] and [`unnormalize`] for every other
/// split that must share the same coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormParams {
    shift_x: f64,
    shift_y: f64,
    scale: f64,
}

impl NormParams {
    /// Create normalization parameters.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TransformError::NonFiniteShift`] | `shift_x` or `shift_y` is NaN or infinite |
    /// | [`TransformError::InvalidScale`] | `scale` is not finite and positive |
    pub fn new(shift_x: f64, shift_y: f64, scale: f64) -> Result<Self, TransformError> {
        if !shift_x.is_finite() || !shift_y.is_finite() {
            return Err(TransformError::NonFiniteShift { shift_x, shift_y });
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(TransformError::InvalidScale { scale });
        }
        Ok(Self {
            shift_x,
            shift_y,
            scale,
        })
    }

    /// Build parameters from individually optional parts.
    ///
    /// Returns `Ok(None)` when all three are omitted (compute mode) and
    /// `Ok(Some(_))` when all three are given (apply mode).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TransformError::PartialNormParams`] | Some but not all parts are given |
    /// | [`TransformError::NonFiniteShift`] | A given shift is NaN or infinite |
    /// | [`TransformError::InvalidScale`] | A given scale is not finite and positive |
    pub fn from_optional(
        shift_x: Option<f64>,
        shift_y: Option<f64>,
        scale: Option<f64>,
    ) -> Result<Option<Self>, TransformError> {
        match (shift_x, shift_y, scale) {
            (Some(x), Some(y), Some(s)) => Self::new(x, y, s).map(Some),
            (None, None, None) => Ok(None),
            (x, y, s) => Err(TransformError::PartialNormParams {
                shift_x: x.is_some(),
                shift_y: y.is_some(),
                scale: s.is_some(),
            }),
        }
    }

    /// Parameters that leave coordinates unchanged.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            shift_x: 0.0,
            shift_y: 0.0,
            scale: 1.0,
        }
    }

    /// Compute parameters that map `batch` into a square of side 2 around the origin.
    ///
    /// The shift is the per-axis mean over every point of every trajectory. The
    /// scale is half the larger of the x and y coordinate ranges, so the widest
    /// axis spans exactly 2 after normalization; data symmetric about its mean
    /// lands in `[-1, 1]`. Empty batches get the identity and a batch whose points
    /// all coincide gets `scale = 1.0`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TransformError::Batch`] | Batch is not two-channel |
    /// | [`TransformError::NonFiniteShift`] | The coordinate sums overflow |
    pub fn fit(batch: &TrajectoryBatch) -> Result<Self, TransformError> {
        batch.require_channels(XY)?;
        let points = batch.as_slice().chunks_exact(XY);
        let n_points = points.len();
        if n_points == 0 {
            debug!("empty batch, using identity normalization");
            return Ok(Self::identity());
        }

        let (sum_x, sum_y) = points
            .clone()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
        let shift_x = sum_x / n_points as f64;
        let shift_y = sum_y / n_points as f64;

        let (min, max) = points.fold(
            ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]),
            |(lo, hi), p| {
                let (x, y) = (p[0] - shift_x, p[1] - shift_y);
                ([lo[0].min(x), lo[1].min(y)], [hi[0].max(x), hi[1].max(y)])
            },
        );
        let half_range = (max[0] - min[0]).max(max[1] - min[1]) / 2.0;
        let scale = if half_range > 0.0 {
            half_range
        } else {
            debug!("all points coincide, using unit scale");
            1.0
        };
        Self::new(shift_x, shift_y, scale)
    }

    /// Return the x shift.
    #[must_use]
    pub fn shift_x(&self) -> f64 {
        self.shift_x
    }

    /// Return the y shift.
    #[must_use]
    pub fn shift_y(&self) -> f64 {
        self.shift_y
    }

    /// Return the shift as an `[x, y]` pair.
    #[must_use]
    pub fn shift(&self) -> [f64; 2] {
        [self.shift_x, self.shift_y]
    }

    /// Return the scale factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Normalize `batch` with `(batch - shift) / scale`.
///
/// With `params = None` the parameters are computed from `batch` itself
/// (see [`NormParams::fit`]); with `Some(params)` the given parameters are applied
/// unchanged, which is how held-out data is brought into a training split's frame.
/// Returns the normalized batch together with the parameters used.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TransformError::Batch`] | Batch is not two-channel, or the result overflows |
/// | [`TransformError::NonFiniteShift`] | Computed shift overflows |
#[instrument(skip(batch, params), fields(shape = %batch.shape(), fitted = params.is_none()))]
pub fn normalize(
    batch: &TrajectoryBatch,
    params: Option<&NormParams>,
) -> Result<(TrajectoryBatch, NormParams), TransformError> {
    let params = match params {
        Some(p) => *p,
        None => NormParams::fit(batch)?,
    };
    let [sx, sy] = params.shift();
    let k = params.scale;
    let normalized = batch.map_xy(|_, [x, y]| [(x - sx) / k, (y - sy) / k])?;
    debug!(sx, sy, scale = k, "batch normalized");
    Ok((normalized, params))
}

/// Invert [`normalize`]: `batch * scale + shift`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TransformError::Batch`] | Batch is not two-channel, or the result overflows |
#[instrument(skip(batch, params), fields(shape = %batch.shape()))]
pub fn unnormalize(
    batch: &TrajectoryBatch,
    params: &NormParams,
) -> Result<TrajectoryBatch, TransformError> {
    let [sx, sy] = params.shift();
    let k = params.scale;
    Ok(batch.map_xy(|_, [x, y]| [x * k + sx, y * k + sy])?)
}

/// Recentre each trajectory on its last observed point.
///
/// The final point of every `obs` trajectory is subtracted from all points of that
/// trajectory in both `obs` and `pred`, so observations end at the origin. Meant
/// for test-time preprocessing only. Step counts of `obs` and `pred` may differ.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TransformError::Batch`] | Either batch is not two-channel, trajectory counts differ, or `obs` is non-empty with zero steps |
#[instrument(skip(obs, pred), fields(obs = %obs.shape(), pred = %pred.shape()))]
pub fn nabs_process(
    obs: &TrajectoryBatch,
    pred: &TrajectoryBatch,
) -> Result<(TrajectoryBatch, TrajectoryBatch), TransformError> {
    obs.require_channels(XY)?;
    pred.require_channels(XY)?;
    if obs.n_trajectories() != pred.n_trajectories() {
        return Err(trajkit_batch::BatchError::TrajectoryCountMismatch {
            left: obs.n_trajectories(),
            right: pred.n_trajectories(),
        }
        .into());
    }
    obs.require_steps(1)?;

    let last_step = obs.n_steps().saturating_sub(1);
    let anchors: Vec<[f64; 2]> = (0..obs.n_trajectories())
        .map(|i| obs.xy(i, last_step))
        .collect();

    let shift = |i: usize, [x, y]: [f64; 2]| {
        let [ax, ay] = anchors[i];
        [x - ax, y - ay]
    };
    Ok((obs.map_xy(shift)?, pred.map_xy(shift)?))
}
