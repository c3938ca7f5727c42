//! Shared data model for the reservoir risk-of-failure pipeline.
//!
//! Holds the weekly matrices supplied by the hydrology/demand ensemble and
//! the alignment rules that tie a demand simulation window to a longer
//! historical hydrology record. No simulation logic lives here.

mod ensemble;
mod matrix;

pub use ensemble::{EnsembleError, HydrologyEnsemble, RealizationView, ScenarioScaling};
pub use matrix::{MatrixError, WeeklyMatrix};

/// Weeks per simulated year; every windowing rule in the pipeline is built
/// on this granularity.
pub const WEEKS_PER_YEAR: usize = 52;
