//! Risk-of-failure table construction.
//!
//! For every (storage tier, forecast week) cell, the builder replays H
//! historical 52-week hydrology blocks against the synthetic demand window
//! ending at that week and counts how many members breach the failure
//! threshold. The inner walk stops at the first breach: a cell reports
//! "does the scenario ever fail within the horizon", not a time-to-failure
//! distribution.

use crossbeam_channel::Sender;
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hydro_data::{HydrologyEnsemble, WEEKS_PER_YEAR};

use crate::config::{ConfigError, ScenarioConfig};
use crate::progress::{AbortFlag, TableProgress};
use crate::storage;
use crate::tier::TierLadder;

/// How the H replay blocks are drawn from the historical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockPolicy {
    /// H contiguous, non-overlapping year blocks ending at the aligned
    /// forecast week. Requires the record to extend H years before the
    /// demand window.
    Sequential,
    /// H whole-year block starts drawn with replacement, seeded from the
    /// scenario seed and the realization index.
    Resample,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(
        "risk lookup out of bounds: tier {tier} of {tiers}, week {week} of {weeks}"
    )]
    Lookup {
        tier: usize,
        week: usize,
        tiers: usize,
        weeks: usize,
    },
    #[error(
        "hydrology record cannot cover the ensemble replay: the sequential \
         policy needs {required} weeks of history before the demand window, \
         the alignment offset provides {offset}"
    )]
    Bounds { required: usize, offset: usize },
    #[error("unknown realization {index} (ensemble has {count})")]
    Realization { index: usize, count: usize },
}

/// Immutable (tier x forecast week) failure-probability table for one
/// realization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RofTable {
    tiers: usize,
    weeks: usize,
    risk: Vec<f64>,
}

impl RofTable {
    pub fn tiers(&self) -> usize {
        self.tiers
    }

    pub fn weeks(&self) -> usize {
        self.weeks
    }

    /// Checked lookup. An index outside the table is a hard error, never a
    /// clamp: a clamped lookup would misreport risk.
    pub fn risk(&self, tier: usize, week: usize) -> Result<f64, TableError> {
        if tier >= self.tiers || week >= self.weeks {
            return Err(TableError::Lookup {
                tier,
                week,
                tiers: self.tiers,
                weeks: self.weeks,
            });
        }
        Ok(self.risk[tier * self.weeks + week])
    }

    /// Risk row for one tier, across all forecast weeks.
    pub fn tier_row(&self, tier: usize) -> Option<&[f64]> {
        if tier < self.tiers {
            Some(&self.risk[tier * self.weeks..(tier + 1) * self.weeks])
        } else {
            None
        }
    }
}

/// Outcome of a parallel build across all realizations. Slots are `None`
/// only when the build was aborted before reaching them.
#[derive(Debug)]
pub struct TableSet {
    pub tables: Vec<Option<RofTable>>,
    pub aborted: bool,
}

impl TableSet {
    pub fn completed(&self) -> usize {
        self.tables.iter().filter(|slot| slot.is_some()).count()
    }

    /// All tables, if the build ran to completion.
    pub fn into_complete(self) -> Option<Vec<RofTable>> {
        self.tables.into_iter().collect()
    }
}

/// Builds per-realization ROF tables from a shared read-only ensemble.
#[derive(Debug)]
pub struct TableBuilder<'a> {
    ensemble: &'a HydrologyEnsemble,
    ladder: TierLadder,
    capacity: f64,
    failure_fraction: f64,
    ensemble_size: usize,
    policy: BlockPolicy,
    seed: u64,
    forecast_weeks: usize,
}

impl<'a> TableBuilder<'a> {
    /// Validate the configuration and every slice bound the build will
    /// touch. Bounds problems surface here, before any simulation.
    pub fn new(
        ensemble: &'a HydrologyEnsemble,
        config: &ScenarioConfig,
    ) -> Result<Self, TableError> {
        config.validate()?;
        let ladder = config.tier_ladder()?;
        let replay_span = config.ensemble_size * WEEKS_PER_YEAR;
        if config.block_policy == BlockPolicy::Sequential
            && ensemble.history_offset() < replay_span
        {
            return Err(TableError::Bounds {
                required: replay_span,
                offset: ensemble.history_offset(),
            });
        }
        Ok(Self {
            ensemble,
            ladder,
            capacity: config.reservoir_capacity,
            failure_fraction: config.failure_fraction,
            ensemble_size: config.ensemble_size,
            policy: config.block_policy,
            seed: config.seed,
            forecast_weeks: ensemble.demand_weeks() - WEEKS_PER_YEAR,
        })
    }

    pub fn ladder(&self) -> TierLadder {
        self.ladder
    }

    /// Block starts for one realization under the resampling policy.
    /// Seeded per realization so the result is independent of scheduling.
    fn resampled_starts(&self, realization: usize) -> Vec<usize> {
        let stream = self
            .seed
            .wrapping_add((realization as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let mut rng = ChaCha8Rng::seed_from_u64(stream);
        let years = self.ensemble.history_weeks() / WEEKS_PER_YEAR;
        let year = Uniform::from(0..years);
        (0..self.ensemble_size)
            .map(|_| year.sample(&mut rng) * WEEKS_PER_YEAR)
            .collect()
    }

    /// Build the table for one realization.
    pub fn build_for(&self, realization: usize) -> Result<RofTable, TableError> {
        let view = self
            .ensemble
            .realization(realization)
            .ok_or(TableError::Realization {
                index: realization,
                count: self.ensemble.realizations(),
            })?;
        let offset = self.ensemble.history_offset();
        let replay_span = self.ensemble_size * WEEKS_PER_YEAR;
        let tier_values = self.ladder.values();
        let resampled = match self.policy {
            BlockPolicy::Sequential => Vec::new(),
            BlockPolicy::Resample => self.resampled_starts(realization),
        };

        let mut risk = vec![0.0; tier_values.len() * self.forecast_weeks];
        for (t, tier_value) in tier_values.iter().enumerate() {
            let initial = tier_value * self.capacity;
            for week in 0..self.forecast_weeks {
                let demand_year = &view.demand[week..week + WEEKS_PER_YEAR];
                let mut failures = 0usize;
                for member in 0..self.ensemble_size {
                    let start = match self.policy {
                        BlockPolicy::Sequential => {
                            offset + week - replay_span + member * WEEKS_PER_YEAR
                        }
                        BlockPolicy::Resample => resampled[member],
                    };
                    let evap_year = &view.evaporation[start..start + WEEKS_PER_YEAR];
                    let inflow_year = &view.inflow[start..start + WEEKS_PER_YEAR];
                    let mut level = initial;
                    for d in 0..WEEKS_PER_YEAR {
                        let next = storage::next_storage(
                            level,
                            evap_year[d],
                            inflow_year[d],
                            demand_year[d],
                            self.capacity,
                        );
                        if storage::breaches_threshold(next, self.capacity, self.failure_fraction)
                        {
                            failures += 1;
                            break;
                        }
                        level = next;
                    }
                }
                risk[t * self.forecast_weeks + week] =
                    failures as f64 / self.ensemble_size as f64;
            }
        }

        tracing::debug!(
            target: "rof::table",
            realization,
            tiers = tier_values.len(),
            weeks = self.forecast_weeks,
            "rof_table.built"
        );
        Ok(RofTable {
            tiers: tier_values.len(),
            weeks: self.forecast_weeks,
            risk,
        })
    }

    /// Build tables for every realization in parallel, scattering into
    /// per-realization slots. The abort flag is honored between
    /// realizations; progress events are fire-and-forget.
    pub fn build_all(
        &self,
        abort: &AbortFlag,
        progress: Option<&Sender<TableProgress>>,
    ) -> TableSet {
        let count = self.ensemble.realizations();
        let tables: Vec<Option<RofTable>> = (0..count)
            .into_par_iter()
            .map(|realization| {
                if abort.is_aborted() {
                    return None;
                }
                match self.build_for(realization) {
                    Ok(table) => {
                        if let Some(sender) = progress {
                            let _ = sender.send(TableProgress {
                                realization,
                                tiers: table.tiers(),
                                weeks: table.weeks(),
                            });
                        }
                        Some(table)
                    }
                    Err(error) => {
                        tracing::warn!(
                            target: "rof::table",
                            realization,
                            error = %error,
                            "rof_table.build_failed"
                        );
                        None
                    }
                }
            })
            .collect();
        let aborted = abort.is_aborted();
        let set = TableSet { tables, aborted };
        tracing::info!(
            target: "rof::table",
            realizations = count,
            completed = set.completed(),
            aborted,
            "rof_table.build_all"
        );
        set
    }
}
