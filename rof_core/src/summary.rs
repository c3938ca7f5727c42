//! Run-level accounting for a full pipeline invocation.

use std::time::Duration;

use serde::Serialize;

/// Milestone counts and phase timings for one scenario run. Callers fill
/// it in as phases complete and log it once at the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub realizations: usize,
    pub tables_built: usize,
    pub alphas_evaluated: usize,
    pub units_failed: usize,
    pub aborted: bool,
    pub table_build_time: Option<Duration>,
    pub sweep_time: Option<Duration>,
}

impl RunSummary {
    pub fn log(&self) {
        tracing::info!(
            target: "rof::summary",
            realizations = self.realizations,
            tables_built = self.tables_built,
            alphas_evaluated = self.alphas_evaluated,
            units_failed = self.units_failed,
            aborted = self.aborted,
            table_build_ms = self.table_build_time.map(|d| d.as_millis() as u64),
            sweep_ms = self.sweep_time.map(|d| d.as_millis() as u64),
            "run.summary"
        );
    }
}
