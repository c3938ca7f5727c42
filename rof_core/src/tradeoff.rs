//! Reliability vs restriction-frequency sweep.
//!
//! For each threshold alpha, every realization is simulated under the
//! restriction policy against its own prebuilt risk table. Alphas are
//! independent and run in parallel; a failure in one (realization, alpha)
//! unit is recorded and skipped without aborting the sweep.

use crossbeam_channel::Sender;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use hydro_data::HydrologyEnsemble;

use crate::config::{ConfigError, ScenarioConfig};
use crate::policy::RestrictionPolicy;
use crate::progress::{AbortFlag, SweepProgress};
use crate::table::RofTable;
use crate::tier::TierLadder;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{tables} risk tables provided for {realizations} realizations")]
    TableCount { tables: usize, realizations: usize },
}

/// One point of the tradeoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeoffPoint {
    pub alpha: f64,
    /// 1 - (realizations whose trajectory ever breaches the failure
    /// threshold) / (realizations evaluated).
    pub reliability: f64,
    /// Mean restricted weeks per realization.
    pub mean_restriction_weeks: f64,
    /// Earliest first-restriction week across realizations, if any
    /// restriction fired at this alpha.
    pub earliest_restriction_week: Option<usize>,
}

/// A (realization, alpha) unit that could not be simulated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitDiagnostic {
    pub alpha: f64,
    pub realization: usize,
    pub error: String,
}

/// Paired reliability / restriction-frequency sequences over the alpha
/// sweep, with per-unit diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeoffCurve {
    pub points: Vec<TradeoffPoint>,
    pub diagnostics: Vec<UnitDiagnostic>,
    pub aborted: bool,
}

impl TradeoffCurve {
    pub fn reliability_series(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.reliability).collect()
    }

    pub fn restriction_series(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.mean_restriction_weeks).collect()
    }
}

struct AlphaOutcome {
    point: Option<TradeoffPoint>,
    diagnostics: Vec<UnitDiagnostic>,
}

fn evaluate_alpha(
    ensemble: &HydrologyEnsemble,
    tables: &[RofTable],
    ladder: &TierLadder,
    config: &ScenarioConfig,
    alpha: f64,
) -> AlphaOutcome {
    let policy = RestrictionPolicy::from_config(config, alpha);
    let failure_level = config.failure_fraction * config.reservoir_capacity;
    let mut failures = 0usize;
    let mut restricted_weeks = 0usize;
    let mut evaluated = 0usize;
    let mut earliest: Option<usize> = None;
    let mut diagnostics = Vec::new();

    for (realization, table) in tables.iter().enumerate() {
        match policy.run(ensemble, table, ladder, config, realization) {
            Ok(trace) => {
                evaluated += 1;
                restricted_weeks += trace.restricted_weeks();
                if trace.ever_below(failure_level) {
                    failures += 1;
                }
                if let Some(week) = trace.first_restriction_week() {
                    earliest = Some(earliest.map_or(week, |e| e.min(week)));
                }
            }
            Err(error) => {
                tracing::warn!(
                    target: "rof::sweep",
                    alpha,
                    realization,
                    error = %error,
                    "sweep.unit_failed"
                );
                diagnostics.push(UnitDiagnostic {
                    alpha,
                    realization,
                    error: error.to_string(),
                });
            }
        }
    }

    let point = (evaluated > 0).then(|| TradeoffPoint {
        alpha,
        reliability: 1.0 - failures as f64 / evaluated as f64,
        mean_restriction_weeks: restricted_weeks as f64 / evaluated as f64,
        earliest_restriction_week: earliest,
    });
    AlphaOutcome { point, diagnostics }
}

/// Sweep the configured alpha range across all realizations.
///
/// `tables` must hold one prebuilt table per realization, in realization
/// order.
pub fn evaluate_tradeoff(
    ensemble: &HydrologyEnsemble,
    tables: &[RofTable],
    config: &ScenarioConfig,
    abort: &AbortFlag,
    progress: Option<&Sender<SweepProgress>>,
) -> Result<TradeoffCurve, SweepError> {
    config.validate()?;
    if tables.len() != ensemble.realizations() {
        return Err(SweepError::TableCount {
            tables: tables.len(),
            realizations: ensemble.realizations(),
        });
    }
    let ladder = config.tier_ladder()?;
    let alphas = config.alpha_sweep.values();

    let outcomes: Vec<Option<AlphaOutcome>> = alphas
        .par_iter()
        .map(|&alpha| {
            if abort.is_aborted() {
                return None;
            }
            let outcome = evaluate_alpha(ensemble, tables, &ladder, config, alpha);
            if let (Some(sender), Some(point)) = (progress, outcome.point.as_ref()) {
                let _ = sender.send(SweepProgress {
                    alpha,
                    reliability: point.reliability,
                });
            }
            Some(outcome)
        })
        .collect();

    let mut points = Vec::new();
    let mut diagnostics = Vec::new();
    for outcome in outcomes.into_iter().flatten() {
        points.extend(outcome.point);
        diagnostics.extend(outcome.diagnostics);
    }
    let curve = TradeoffCurve {
        points,
        diagnostics,
        aborted: abort.is_aborted(),
    };
    tracing::info!(
        target: "rof::sweep",
        alphas = alphas.len(),
        points = curve.points.len(),
        failed_units = curve.diagnostics.len(),
        aborted = curve.aborted,
        "sweep.completed"
    );
    Ok(curve)
}
