//! Join configuration.

use serde::{Deserialize, Serialize};

use crate::error::{JoinError, Result};

/// Minimum fraction of a block's area an intersection must cover to be kept.
pub const DEFAULT_MIN_AREA_RATIO: f64 = 0.01;

/// Default R-tree node capacity used when bulk loading the block index.
pub const DEFAULT_FANOUT: usize = 10;

/// Runtime options for a join run.
///
/// Index fan-out is not part of this struct: rstar fixes node capacity at
/// compile time, so it is chosen when the index is built. Use
/// [`BlockIndex::build_with_fanout`](crate::BlockIndex::build_with_fanout)
/// with a [`SpatialJoin`](crate::SpatialJoin) to change it from the default
/// of [`DEFAULT_FANOUT`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    /// Intersections with `area / block.area` below this value are dropped.
    /// A ratio exactly equal to the threshold is accepted.
    pub min_area_ratio: f64,

    /// Process submissions on the rayon thread pool.
    pub parallel: bool,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: DEFAULT_MIN_AREA_RATIO,
            parallel: false,
        }
    }
}

impl JoinConfig {
    /// Set the area-ratio acceptance threshold.
    pub fn with_min_area_ratio(mut self, ratio: f64) -> Self {
        self.min_area_ratio = ratio;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that the threshold is a finite fraction in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !self.min_area_ratio.is_finite() || !(0.0..=1.0).contains(&self.min_area_ratio) {
            return Err(JoinError::Config(format!(
                "min_area_ratio must be within [0, 1], got {}",
                self.min_area_ratio
            )));
        }
        Ok(())
    }
}
