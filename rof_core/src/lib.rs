//! Risk-of-failure simulation engine for a water-supply reservoir.
//!
//! Estimates the probability that storage drops below a critical threshold
//! within a 52-week lookahead, and uses that risk to drive a demand
//! restriction policy whose reliability / restriction-frequency tradeoff is
//! evaluated across a threshold sweep. Inputs are the weekly ensemble
//! matrices of [`hydro_data`]; all outputs are in-memory tables and traces
//! for downstream reporting.

pub mod config;
pub mod policy;
pub mod progress;
pub mod ssi;
pub mod storage;
pub mod summary;
pub mod table;
pub mod tier;
pub mod tradeoff;

pub use config::{AlphaSweep, ConfigError, ScenarioConfig};
pub use policy::{
    evaluate_trigger, PolicyError, PolicyTrace, RestrictionPolicy, TriggerDecision,
};
pub use progress::{AbortFlag, SweepProgress, TableProgress};
pub use ssi::{DroughtEpisode, SsiAnalysis, SsiConfig, SsiError};
pub use storage::{breaches_threshold, next_storage, next_storage_unclamped};
pub use summary::RunSummary;
pub use table::{BlockPolicy, RofTable, TableBuilder, TableError, TableSet};
pub use tier::{TierError, TierLadder};
pub use tradeoff::{
    evaluate_tradeoff, SweepError, TradeoffCurve, TradeoffPoint, UnitDiagnostic,
};

/// Install the default stdout subscriber, honoring `RUST_LOG`. Embedders
/// may install their own subscriber instead; repeated calls are a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
