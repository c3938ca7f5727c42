//! Standardized streamflow index (SSI6) and drought-episode extraction.
//!
//! The index is built from log-inflow standardized over the whole series,
//! then smoothed with a 24-week rolling mean (6 months). Drought episodes
//! are contiguous 12-week windows that stay at or below zero and touch -1
//! at least once. Overlapping qualifying windows are all reported; merging
//! is left to downstream consumers.

use serde::Serialize;
use thiserror::Error;

use hydro_data::HydrologyEnsemble;

#[derive(Debug, Error, PartialEq)]
pub enum SsiError {
    #[error("inflow series is empty")]
    Empty,
    #[error("unknown realization {index} (ensemble has {count})")]
    Realization { index: usize, count: usize },
    #[error("window lengths must be at least 1")]
    Window,
    #[error("inflow series has no valid (positive, finite) value")]
    AllInvalid,
    #[error("inflow series starts with {count} invalid values and nothing to fill them from")]
    LeadingInvalid { count: usize },
    #[error("standardization undefined: log-inflow series has zero variance")]
    DegenerateSeries,
}

/// SSI window configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsiConfig {
    /// Rolling-mean accumulation window, in weeks.
    pub accumulation_window: usize,
    /// Episode-detection window, in weeks.
    pub episode_window: usize,
}

impl Default for SsiConfig {
    fn default() -> Self {
        Self {
            accumulation_window: 24,
            episode_window: 12,
        }
    }
}

/// One qualifying drought window over the index series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DroughtEpisode {
    pub start: usize,
    pub end: usize,
    pub severity: f64,
}

/// Index series plus the episodes extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SsiAnalysis {
    pub index: Vec<f64>,
    pub episodes: Vec<DroughtEpisode>,
}

/// Compute the standardized, smoothed index for one inflow series.
pub fn standardized_index(inflow: &[f64], config: &SsiConfig) -> Result<Vec<f64>, SsiError> {
    if inflow.is_empty() {
        return Err(SsiError::Empty);
    }
    if config.accumulation_window == 0 {
        return Err(SsiError::Window);
    }

    // Log-transform; non-positive or non-finite inflow yields an invalid
    // entry that is forward-filled from the most recent valid value.
    // Backward fill is never applied: a leading invalid run is a data
    // defect and is reported instead.
    let mut log_series = Vec::with_capacity(inflow.len());
    let mut last_valid: Option<f64> = None;
    let mut leading_invalid = 0usize;
    for &value in inflow {
        let log_value = value.ln();
        if log_value.is_finite() {
            last_valid = Some(log_value);
            log_series.push(log_value);
        } else {
            match last_valid {
                Some(previous) => log_series.push(previous),
                None => {
                    leading_invalid += 1;
                    log_series.push(f64::NAN);
                }
            }
        }
    }
    if last_valid.is_none() {
        return Err(SsiError::AllInvalid);
    }
    if leading_invalid > 0 {
        return Err(SsiError::LeadingInvalid {
            count: leading_invalid,
        });
    }

    let n = log_series.len() as f64;
    let mean = log_series.iter().sum::<f64>() / n;
    if log_series.len() < 2 {
        return Err(SsiError::DegenerateSeries);
    }
    // Sample standard deviation (n - 1 denominator).
    let variance = log_series
        .iter()
        .map(|&v| (v - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    let std_dev = variance.sqrt();
    if !(std_dev > 0.0) || !std_dev.is_finite() {
        return Err(SsiError::DegenerateSeries);
    }

    let standardized: Vec<f64> = log_series.iter().map(|&v| (v - mean) / std_dev).collect();

    // Rolling mean with min_periods = 1: early values average whatever is
    // available.
    let window = config.accumulation_window;
    let mut index = Vec::with_capacity(standardized.len());
    let mut running = 0.0;
    for i in 0..standardized.len() {
        running += standardized[i];
        if i >= window {
            running -= standardized[i - window];
        }
        let span = (i + 1).min(window) as f64;
        index.push(running / span);
    }
    Ok(index)
}

/// True when every value in the window is at or below zero and at least one
/// reaches -1.
fn qualifies(window: &[f64]) -> bool {
    window.iter().all(|&v| v <= 0.0) && window.iter().any(|&v| v <= -1.0)
}

/// Slide the episode window across the index (step 1), recording every
/// qualifying window independently.
pub fn find_droughts(index: &[f64], window: usize) -> Vec<DroughtEpisode> {
    if window == 0 || index.len() < window {
        return Vec::new();
    }
    let mut episodes = Vec::new();
    for start in 0..=index.len() - window {
        let slice = &index[start..start + window];
        if qualifies(slice) {
            episodes.push(DroughtEpisode {
                start,
                end: start + window - 1,
                severity: slice.iter().sum(),
            });
        }
    }
    episodes
}

/// Full analysis of one realization's inflow series.
pub fn analyze(inflow: &[f64], config: &SsiConfig) -> Result<SsiAnalysis, SsiError> {
    if config.episode_window == 0 {
        return Err(SsiError::Window);
    }
    let index = standardized_index(inflow, config)?;
    let episodes = find_droughts(&index, config.episode_window);
    tracing::debug!(
        target: "rof::ssi",
        weeks = index.len(),
        episodes = episodes.len(),
        "ssi.analyzed"
    );
    Ok(SsiAnalysis { index, episodes })
}

/// Analyze one realization of an ensemble, using the inflow record from
/// the alignment offset onward so the index lines up with the simulated
/// storage window.
pub fn analyze_realization(
    ensemble: &HydrologyEnsemble,
    realization: usize,
    config: &SsiConfig,
) -> Result<SsiAnalysis, SsiError> {
    let view = ensemble
        .realization(realization)
        .ok_or(SsiError::Realization {
            index: realization,
            count: ensemble.realizations(),
        })?;
    analyze(&view.inflow[ensemble.history_offset()..], config)
}
