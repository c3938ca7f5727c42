//! Storage-tier quantization.
//!
//! Risk tables are indexed by discrete storage tiers. A continuous storage
//! fraction is rounded *up* to the nearest tier so a lookup never consults a
//! riskier (lower) tier than actual storage warrants. The ladder operates on
//! integer bin indices internally; tier fractions are derived, never
//! compared.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance for fractions that land a hair above an exact bin boundary
/// through float noise (e.g. `0.30000000000000004`).
const BOUNDARY_EPSILON: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum TierError {
    #[error("storage fraction {0} outside [0, 1]")]
    OutOfRange(f64),
    #[error("bin width {0} does not evenly partition [0, 1]")]
    InvalidWidth(f64),
}

/// Equal-width tier ladder over `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLadder {
    bins: usize,
}

impl TierLadder {
    /// Build a ladder from a bin width. The width must evenly partition
    /// `[0, 1]` (e.g. 0.05 -> 20 bins, 21 tier values).
    pub fn new(bin_width: f64) -> Result<Self, TierError> {
        if !bin_width.is_finite() || bin_width <= 0.0 || bin_width > 1.0 {
            return Err(TierError::InvalidWidth(bin_width));
        }
        let bins = (1.0 / bin_width).round();
        if bins < 1.0 || (bins * bin_width - 1.0).abs() > BOUNDARY_EPSILON {
            return Err(TierError::InvalidWidth(bin_width));
        }
        Ok(Self {
            bins: bins as usize,
        })
    }

    pub fn bin_width(&self) -> f64 {
        1.0 / self.bins as f64
    }

    /// Number of tier values, including both endpoints of `[0, 1]`.
    pub fn len(&self) -> usize {
        self.bins + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Round a storage fraction up to its tier index.
    ///
    /// Fractions outside `[0, 1]` are an error, never clamped: a clamped
    /// lookup would silently misreport risk.
    pub fn tier_index(&self, fraction: f64) -> Result<usize, TierError> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(TierError::OutOfRange(fraction));
        }
        let scaled = fraction * self.bins as f64;
        let nearest = scaled.round();
        let index = if (scaled - nearest).abs() <= BOUNDARY_EPSILON {
            nearest as usize
        } else {
            scaled.ceil() as usize
        };
        Ok(index.min(self.bins))
    }

    /// Tier fraction for a tier index.
    pub fn fraction_for(&self, index: usize) -> f64 {
        index as f64 / self.bins as f64
    }

    /// All tier fractions in ascending order.
    pub fn values(&self) -> Vec<f64> {
        (0..=self.bins).map(|i| self.fraction_for(i)).collect()
    }
}
