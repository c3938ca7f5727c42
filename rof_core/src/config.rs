//! Scenario configuration.
//!
//! Every tunable of the pipeline lives here, passed explicitly into each
//! component. Nothing in the engine reads ambient state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::BlockPolicy;
use crate::tier::{TierError, TierLadder};

/// Inclusive sweep over restriction-trigger thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaSweep {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl AlphaSweep {
    /// Materialize the swept threshold values. The end point is included
    /// when it lands on a step within float tolerance.
    pub fn values(&self) -> Vec<f64> {
        let mut values = Vec::new();
        let mut k = 0usize;
        loop {
            let alpha = self.start + k as f64 * self.step;
            if alpha > self.end + self.step * 1e-9 {
                break;
            }
            values.push(alpha);
            k += 1;
        }
        values
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reservoir capacity must be positive and finite, got {0}")]
    Capacity(f64),
    #[error("{field} must be a fraction in [0, 1], got {value}")]
    Fraction { field: &'static str, value: f64 },
    #[error("demand reduction factor must be in (0, 1], got {0}")]
    DemandReduction(f64),
    #[error("restriction duration cap must be at least one week")]
    DurationCap,
    #[error("historical ensemble size must be at least 1")]
    EnsembleSize,
    #[error("alpha sweep step must be positive and finite, got {0}")]
    AlphaStep(f64),
    #[error("alpha sweep range is empty: start {start}, end {end}")]
    AlphaRange { start: f64, end: f64 },
    #[error(transparent)]
    Tier(#[from] TierError),
    #[error("SSI window lengths must be at least 1")]
    SsiWindow,
}

/// Full parameter set for one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Physical reservoir capacity, in the same volume unit as the input
    /// matrices.
    pub reservoir_capacity: f64,
    /// Storage fraction below which a week counts as failure.
    pub failure_fraction: f64,
    /// Storage fraction at trajectory week 0.
    pub starting_fraction: f64,
    /// Tier bin width for risk-table rows.
    pub tier_width: f64,
    /// Maximum length of one restriction spell, in weeks.
    pub restriction_duration_cap: usize,
    /// Fraction of nominal demand delivered while restricted.
    pub demand_reduction: f64,
    /// Historical ensemble size H for the risk tables.
    pub ensemble_size: usize,
    pub alpha_sweep: AlphaSweep,
    /// Rolling-mean window for the standardized streamflow index.
    pub ssi_accumulation_window: usize,
    /// Contiguous window length for drought-episode detection.
    pub ssi_episode_window: usize,
    /// How 52-week hydrology blocks are drawn for ensemble replay.
    pub block_policy: BlockPolicy,
    /// Seed for the resampling block policy.
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            reservoir_capacity: 14_900.0,
            failure_fraction: 0.20,
            starting_fraction: 0.40,
            tier_width: 0.05,
            restriction_duration_cap: 4,
            demand_reduction: 0.90,
            ensemble_size: 50,
            alpha_sweep: AlphaSweep {
                start: 0.0,
                end: 1.0,
                step: 0.05,
            },
            ssi_accumulation_window: 24,
            ssi_episode_window: 12,
            block_policy: BlockPolicy::Sequential,
            seed: 0,
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.reservoir_capacity.is_finite() || self.reservoir_capacity <= 0.0 {
            return Err(ConfigError::Capacity(self.reservoir_capacity));
        }
        for (field, value) in [
            ("failure_fraction", self.failure_fraction),
            ("starting_fraction", self.starting_fraction),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Fraction { field, value });
            }
        }
        if !self.demand_reduction.is_finite()
            || self.demand_reduction <= 0.0
            || self.demand_reduction > 1.0
        {
            return Err(ConfigError::DemandReduction(self.demand_reduction));
        }
        if self.restriction_duration_cap == 0 {
            return Err(ConfigError::DurationCap);
        }
        if self.ensemble_size == 0 {
            return Err(ConfigError::EnsembleSize);
        }
        if !self.alpha_sweep.step.is_finite() || self.alpha_sweep.step <= 0.0 {
            return Err(ConfigError::AlphaStep(self.alpha_sweep.step));
        }
        if self.alpha_sweep.end < self.alpha_sweep.start {
            return Err(ConfigError::AlphaRange {
                start: self.alpha_sweep.start,
                end: self.alpha_sweep.end,
            });
        }
        if self.ssi_accumulation_window == 0 || self.ssi_episode_window == 0 {
            return Err(ConfigError::SsiWindow);
        }
        // Surfaces InvalidWidth through the Tier variant.
        TierLadder::new(self.tier_width)?;
        Ok(())
    }

    /// Tier ladder for this configuration. `validate` must have passed.
    pub fn tier_ladder(&self) -> Result<TierLadder, ConfigError> {
        Ok(TierLadder::new(self.tier_width)?)
    }
}
