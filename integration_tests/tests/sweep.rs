mod common;

use anyhow::Result;

use rof_core::{evaluate_tradeoff, AbortFlag, ScenarioConfig};

/// Marginal scenario: a restriction flips the weekly balance from a slow
/// draft to a slow refill, so stricter triggering can only help.
fn marginal_setup() -> Result<(hydro_data::HydrologyEnsemble, ScenarioConfig)> {
    let config = ScenarioConfig {
        reservoir_capacity: 1000.0,
        ensemble_size: 4,
        ..ScenarioConfig::default()
    };
    let demand_weeks = 156;
    let history_weeks = common::history_for(demand_weeks, config.ensemble_size);
    let ensemble = common::constant_ensemble(3, demand_weeks, history_weeks, 100.0, 95.0, 0.0)?;
    Ok((ensemble, config))
}

#[test]
fn more_aggressive_triggering_never_reduces_reliability() -> Result<()> {
    common::init_logging();
    let (ensemble, config) = marginal_setup()?;
    let tables = common::build_tables(&ensemble, &config)?;
    let curve = evaluate_tradeoff(&ensemble, &tables, &config, &AbortFlag::new(), None)?;

    assert_eq!(curve.points.len(), 21);
    // Alphas ascend; restrictions thin out as alpha grows, so reliability
    // may only fall or hold along the sweep.
    for pair in curve.points.windows(2) {
        assert!(pair[1].alpha > pair[0].alpha);
        assert!(
            pair[1].reliability <= pair[0].reliability + 1e-12,
            "reliability rose from {} to {} between alpha {} and {}",
            pair[0].reliability,
            pair[1].reliability,
            pair[0].alpha,
            pair[1].alpha
        );
    }
    // The extremes bracket the behavior: always-restricted survives, never
    // restricted drains below the failure line.
    assert_eq!(curve.points.first().unwrap().reliability, 1.0);
    assert_eq!(curve.points.last().unwrap().reliability, 0.0);
    assert_eq!(curve.points.first().unwrap().earliest_restriction_week, Some(1));
    assert_eq!(curve.points.last().unwrap().earliest_restriction_week, None);

    // Restriction frequency moves the other way on the tradeoff curve.
    let restriction = curve.restriction_series();
    assert!(restriction.first().unwrap() > restriction.last().unwrap());

    let summary = rof_core::RunSummary {
        realizations: ensemble.realizations(),
        tables_built: tables.len(),
        alphas_evaluated: curve.points.len(),
        units_failed: curve.diagnostics.len(),
        aborted: curve.aborted,
        ..Default::default()
    };
    summary.log();
    Ok(())
}

#[test]
fn sweep_progress_reports_every_alpha() -> Result<()> {
    let (ensemble, config) = marginal_setup()?;
    let tables = common::build_tables(&ensemble, &config)?;
    let (sender, receiver) = crossbeam_channel::unbounded();
    let curve = evaluate_tradeoff(&ensemble, &tables, &config, &AbortFlag::new(), Some(&sender))?;
    drop(sender);
    assert!(!curve.aborted);
    assert_eq!(receiver.iter().count(), curve.points.len());
    Ok(())
}

#[test]
fn aborted_sweep_is_flagged_and_empty() -> Result<()> {
    let (ensemble, config) = marginal_setup()?;
    let tables = common::build_tables(&ensemble, &config)?;
    let abort = AbortFlag::new();
    abort.abort();
    let curve = evaluate_tradeoff(&ensemble, &tables, &config, &abort, None)?;
    assert!(curve.aborted);
    assert!(curve.points.is_empty());
    Ok(())
}

#[test]
fn tradeoff_curve_serializes_for_reporting() -> Result<()> {
    let (ensemble, config) = marginal_setup()?;
    let tables = common::build_tables(&ensemble, &config)?;
    let curve = evaluate_tradeoff(&ensemble, &tables, &config, &AbortFlag::new(), None)?;
    let json = serde_json::to_value(&curve)?;
    assert_eq!(json["points"].as_array().unwrap().len(), 21);
    assert!(json["points"][0]["reliability"].is_number());
    assert!(json["diagnostics"].as_array().unwrap().is_empty());
    Ok(())
}
