//! Displacement error newtype wrapper.

use std::cmp::Ordering;
use std::fmt;

/// A non-negative mean displacement error (ADE or FDE), in batch coordinate units.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Displacement(f64);

impl Displacement {
    /// Zero error, returned for identical or empty batches.
    pub const ZERO: Self = Self(0.0);

    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw error value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Displacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
