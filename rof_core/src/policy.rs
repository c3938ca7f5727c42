//! Restriction trigger and policy state machine.
//!
//! Week by week, the machine reads the previous week's storage, consults
//! the realization's risk table, and decides whether to open a restriction
//! spell. A spell runs for a bounded number of weeks at reduced demand and
//! is not re-evaluated or extended mid-spell; the trigger is next consulted
//! on the first week after the spell ends.

use serde::Serialize;
use thiserror::Error;

use hydro_data::{HydrologyEnsemble, WEEKS_PER_YEAR};

use crate::config::ScenarioConfig;
use crate::storage;
use crate::table::{RofTable, TableError};
use crate::tier::{TierError, TierLadder};

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Tier(#[from] TierError),
    #[error("unknown realization {index} (ensemble has {count})")]
    Realization { index: usize, count: usize },
    #[error(
        "risk table covers {table} weeks but the simulation window has {window}"
    )]
    WindowMismatch { table: usize, window: usize },
}

/// Outcome of one trigger evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerDecision {
    pub restrict: bool,
    pub risk: f64,
}

/// Quantize storage, look up the risk table, compare against alpha.
/// Strict inequality: risk exactly equal to the threshold does not
/// trigger. Read-only.
pub fn evaluate_trigger(
    table: &RofTable,
    ladder: &TierLadder,
    storage_fraction: f64,
    week: usize,
    alpha: f64,
) -> Result<TriggerDecision, PolicyError> {
    let tier = ladder.tier_index(storage_fraction)?;
    let risk = table.risk(tier, week)?;
    Ok(TriggerDecision {
        restrict: risk > alpha,
        risk,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpellState {
    Normal,
    Restricted { remaining: usize },
}

/// Demand-restriction policy parameters for one sweep point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestrictionPolicy {
    pub duration_cap: usize,
    pub demand_reduction: f64,
    pub alpha: f64,
}

impl RestrictionPolicy {
    pub fn from_config(config: &ScenarioConfig, alpha: f64) -> Self {
        Self {
            duration_cap: config.restriction_duration_cap,
            demand_reduction: config.demand_reduction,
            alpha,
        }
    }

    /// Run the state machine over one realization's simulation window.
    pub fn run(
        &self,
        ensemble: &HydrologyEnsemble,
        table: &RofTable,
        ladder: &TierLadder,
        config: &ScenarioConfig,
        realization: usize,
    ) -> Result<PolicyTrace, PolicyError> {
        let view = ensemble
            .realization(realization)
            .ok_or(PolicyError::Realization {
                index: realization,
                count: ensemble.realizations(),
            })?;
        let offset = ensemble.history_offset();
        let window = ensemble.demand_weeks() - WEEKS_PER_YEAR;
        if table.weeks() != window {
            return Err(PolicyError::WindowMismatch {
                table: table.weeks(),
                window,
            });
        }

        let capacity = config.reservoir_capacity;
        // Simulated weeks consume the demand series after the one-year
        // warm-up and the hydrology record from the alignment offset.
        let demand = &view.demand[WEEKS_PER_YEAR..];
        let inflow = &view.inflow[offset..offset + window];
        let evaporation = &view.evaporation[offset..offset + window];

        let mut trace = PolicyTrace::with_capacity(window);
        let mut state = SpellState::Normal;

        let initial = config.starting_fraction * capacity;
        let first_risk = evaluate_trigger(table, ladder, initial / capacity, 0, self.alpha)?.risk;
        trace.push(initial, demand[0], false, first_risk);

        for week in 1..window {
            if state == SpellState::Normal {
                // Decide with the risk recorded for the previous week.
                if trace.risk[week - 1] > self.alpha {
                    let remaining = self.duration_cap.min(window - week);
                    state = SpellState::Restricted { remaining };
                    trace.spells += 1;
                }
            }
            let (restricted, delivered) = match state {
                SpellState::Restricted { .. } => (true, self.demand_reduction * demand[week]),
                SpellState::Normal => (false, demand[week]),
            };
            let level = storage::next_storage(
                trace.storage[week - 1],
                evaporation[week - 1],
                inflow[week - 1],
                trace.delivered_demand[week - 1],
                capacity,
            );
            // Clamped storage keeps the fraction inside [0, 1], so the
            // tier lookup cannot go out of range here.
            let risk = evaluate_trigger(table, ladder, level / capacity, week, self.alpha)?.risk;
            trace.push(level, delivered, restricted, risk);

            if let SpellState::Restricted { remaining } = &mut state {
                *remaining -= 1;
                if *remaining == 0 {
                    state = SpellState::Normal;
                }
            }
        }

        tracing::debug!(
            target: "rof::policy",
            realization,
            alpha = self.alpha,
            restricted_weeks = trace.restricted_weeks(),
            spells = trace.spells,
            "policy.trace_complete"
        );
        Ok(trace)
    }
}

/// Four parallel equal-length series produced by one policy run, plus
/// derived counters. Immutable after the run; statistics are reductions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyTrace {
    pub storage: Vec<f64>,
    pub delivered_demand: Vec<f64>,
    pub restricted: Vec<bool>,
    pub risk: Vec<f64>,
    pub spells: usize,
}

impl PolicyTrace {
    fn with_capacity(window: usize) -> Self {
        Self {
            storage: Vec::with_capacity(window),
            delivered_demand: Vec::with_capacity(window),
            restricted: Vec::with_capacity(window),
            risk: Vec::with_capacity(window),
            spells: 0,
        }
    }

    fn push(&mut self, storage: f64, delivered: f64, restricted: bool, risk: f64) {
        self.storage.push(storage);
        self.delivered_demand.push(delivered);
        self.restricted.push(restricted);
        self.risk.push(risk);
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn restricted_weeks(&self) -> usize {
        self.restricted.iter().filter(|&&flag| flag).count()
    }

    pub fn first_restriction_week(&self) -> Option<usize> {
        self.restricted.iter().position(|&flag| flag)
    }

    /// True if storage ever drops strictly below `level`.
    pub fn ever_below(&self, level: f64) -> bool {
        self.storage.iter().any(|&s| s < level)
    }

    pub fn min_storage(&self) -> f64 {
        self.storage.iter().copied().fold(f64::INFINITY, f64::min)
    }
}
