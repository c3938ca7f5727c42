use std::sync::Once;

use anyhow::{Context, Result};

use hydro_data::{HydrologyEnsemble, WeeklyMatrix};
use rof_core::{AbortFlag, RofTable, ScenarioConfig, TableBuilder};

static INIT: Once = Once::new();

/// Route engine tracing through a subscriber once per test binary.
pub fn init_logging() {
    INIT.call_once(rof_core::init_tracing);
}

/// Ensemble where every realization sees the same constant weekly values.
pub fn constant_ensemble(
    realizations: usize,
    demand_weeks: usize,
    history_weeks: usize,
    demand: f64,
    inflow: f64,
    evaporation: f64,
) -> Result<HydrologyEnsemble> {
    let demand = WeeklyMatrix::new(
        realizations,
        demand_weeks,
        vec![demand; realizations * demand_weeks],
    )?;
    let inflow = WeeklyMatrix::new(
        realizations,
        history_weeks,
        vec![inflow; realizations * history_weeks],
    )?;
    let evaporation = WeeklyMatrix::new(
        realizations,
        history_weeks,
        vec![evaporation; realizations * history_weeks],
    )?;
    HydrologyEnsemble::new(evaporation, inflow, demand).context("assembling ensemble")
}

/// History length that satisfies the sequential replay precondition for a
/// given demand window and ensemble size.
pub fn history_for(demand_weeks: usize, ensemble_size: usize) -> usize {
    demand_weeks - 52 + ensemble_size * 52
}

pub fn build_tables(
    ensemble: &HydrologyEnsemble,
    config: &ScenarioConfig,
) -> Result<Vec<RofTable>> {
    TableBuilder::new(ensemble, config)
        .context("constructing table builder")?
        .build_all(&AbortFlag::new(), None)
        .into_complete()
        .context("table build did not run to completion")
}
