//! Water-balance arithmetic shared by every simulation loop.

/// Raw weekly mass balance. The result may leave physical range; callers
/// that read the level back must use [`next_storage`].
pub fn next_storage_unclamped(prev: f64, evaporation: f64, inflow: f64, demand: f64) -> f64 {
    prev - evaporation + inflow - demand
}

/// Weekly mass balance clipped to `[0, capacity]`. Spill above capacity is
/// discarded; deficit below empty is not carried forward.
pub fn next_storage(prev: f64, evaporation: f64, inflow: f64, demand: f64, capacity: f64) -> f64 {
    next_storage_unclamped(prev, evaporation, inflow, demand).clamp(0.0, capacity)
}

/// Failure test: storage strictly below `failure_fraction` of capacity.
pub fn breaches_threshold(storage: f64, capacity: f64, failure_fraction: f64) -> bool {
    storage / capacity < failure_fraction
}
