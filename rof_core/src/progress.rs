//! Cooperative abort and progress events for the parallel phases.
//!
//! Long sweeps are interruptible between independent units of work only:
//! an abort can skip a realization or an alpha value, never tear a
//! half-built table or trajectory. Progress events are fire-and-forget; a
//! dropped receiver never stalls a worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort signal, checked between units of work.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Emitted once per completed realization during table building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableProgress {
    pub realization: usize,
    pub tiers: usize,
    pub weeks: usize,
}

/// Emitted once per completed alpha value during the tradeoff sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepProgress {
    pub alpha: f64,
    pub reliability: f64,
}
