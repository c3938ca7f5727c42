use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{matrix::MatrixError, WeeklyMatrix, WEEKS_PER_YEAR};

/// Multipliers applied to the raw input matrices at ingest. Scaled test
/// cases (doubled evaporation, throttled inflow) are configuration, not
/// separate data files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioScaling {
    pub evaporation: f64,
    pub inflow: f64,
    pub demand: f64,
}

impl Default for ScenarioScaling {
    fn default() -> Self {
        Self {
            evaporation: 1.0,
            inflow: 1.0,
            demand: 1.0,
        }
    }
}

/// Borrowed weekly traces for one realization.
#[derive(Debug, Clone, Copy)]
pub struct RealizationView<'a> {
    pub demand: &'a [f64],
    pub inflow: &'a [f64],
    pub evaporation: &'a [f64],
}

#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error(
        "realization count mismatch: evaporation has {evaporation} rows, \
         inflow {inflow}, demand {demand}"
    )]
    RowMismatch {
        evaporation: usize,
        inflow: usize,
        demand: usize,
    },
    #[error(
        "inflow and evaporation must cover the same record: inflow has \
         {inflow} weeks, evaporation {evaporation}"
    )]
    HistoryMismatch { inflow: usize, evaporation: usize },
    #[error("demand series must span at least {min} weeks, got {got}")]
    DemandTooShort { min: usize, got: usize },
    #[error(
        "hydrology record ({history} weeks) is shorter than the demand \
         series ({demand} weeks); alignment offset would be negative"
    )]
    HistoryTooShort { history: usize, demand: usize },
}

/// One coherent set of evaporation, inflow, and demand matrices.
///
/// The demand series defines the simulation window; the hydrology record
/// may extend further back in time. `history_offset` maps demand week 52
/// (the first simulated week) onto the hydrology record, per the alignment
/// rule `inflow.cols - demand.cols + 52`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrologyEnsemble {
    evaporation: WeeklyMatrix,
    inflow: WeeklyMatrix,
    demand: WeeklyMatrix,
}

impl HydrologyEnsemble {
    pub fn new(
        evaporation: WeeklyMatrix,
        inflow: WeeklyMatrix,
        demand: WeeklyMatrix,
    ) -> Result<Self, EnsembleError> {
        if evaporation.rows() != inflow.rows() || inflow.rows() != demand.rows() {
            return Err(EnsembleError::RowMismatch {
                evaporation: evaporation.rows(),
                inflow: inflow.rows(),
                demand: demand.rows(),
            });
        }
        if inflow.cols() != evaporation.cols() {
            return Err(EnsembleError::HistoryMismatch {
                inflow: inflow.cols(),
                evaporation: evaporation.cols(),
            });
        }
        // One warm-up year plus at least one simulated year.
        let min_demand = 2 * WEEKS_PER_YEAR;
        if demand.cols() < min_demand {
            return Err(EnsembleError::DemandTooShort {
                min: min_demand,
                got: demand.cols(),
            });
        }
        if inflow.cols() + WEEKS_PER_YEAR < demand.cols() {
            return Err(EnsembleError::HistoryTooShort {
                history: inflow.cols(),
                demand: demand.cols(),
            });
        }
        Ok(Self {
            evaporation,
            inflow,
            demand,
        })
    }

    /// Construct with ingest-time scaling applied to each matrix.
    pub fn with_scaling(
        evaporation: WeeklyMatrix,
        inflow: WeeklyMatrix,
        demand: WeeklyMatrix,
        scaling: ScenarioScaling,
    ) -> Result<Self, EnsembleError> {
        Self::new(
            evaporation.scaled(scaling.evaporation),
            inflow.scaled(scaling.inflow),
            demand.scaled(scaling.demand),
        )
    }

    pub fn realizations(&self) -> usize {
        self.demand.rows()
    }

    pub fn demand_weeks(&self) -> usize {
        self.demand.cols()
    }

    pub fn history_weeks(&self) -> usize {
        self.inflow.cols()
    }

    /// Index into the hydrology record corresponding to demand week 52.
    /// Non-negative by construction.
    pub fn history_offset(&self) -> usize {
        self.inflow.cols() + WEEKS_PER_YEAR - self.demand.cols()
    }

    pub fn realization(&self, r: usize) -> Option<RealizationView<'_>> {
        Some(RealizationView {
            demand: self.demand.row(r)?,
            inflow: self.inflow.row(r)?,
            evaporation: self.evaporation.row(r)?,
        })
    }
}
