use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hydro_data::{HydrologyEnsemble, WeeklyMatrix};
use rof_core::{AbortFlag, ScenarioConfig, TableBuilder};

fn bench_ensemble(realizations: usize, sim_years: usize, hist_years: usize) -> HydrologyEnsemble {
    let demand_weeks = sim_years * 52;
    let history_weeks = hist_years * 52;
    let demand = WeeklyMatrix::from_rows(
        (0..realizations)
            .map(|r| {
                (0..demand_weeks)
                    .map(|w| 95.0 + 10.0 * (((r * 13 + w * 7) % 11) as f64 / 10.0))
                    .collect()
            })
            .collect(),
    )
    .expect("demand matrix");
    let inflow = WeeklyMatrix::from_rows(
        (0..realizations)
            .map(|r| {
                (0..history_weeks)
                    .map(|w| 85.0 + 30.0 * (((r * 5 + w * 3) % 13) as f64 / 12.0))
                    .collect()
            })
            .collect(),
    )
    .expect("inflow matrix");
    let evap = WeeklyMatrix::from_rows(
        (0..realizations)
            .map(|_| (0..history_weeks).map(|w| 1.0 + ((w % 4) as f64) * 0.5).collect())
            .collect(),
    )
    .expect("evaporation matrix");
    HydrologyEnsemble::new(evap, inflow, demand).expect("ensemble")
}

fn table_build_benchmark(c: &mut Criterion) {
    let ensemble = bench_ensemble(4, 3, 13);
    let config = ScenarioConfig {
        reservoir_capacity: 14_900.0,
        ensemble_size: 10,
        ..ScenarioConfig::default()
    };
    let builder = TableBuilder::new(&ensemble, &config).expect("builder");

    c.bench_function("rof_table_single_realization", |b| {
        b.iter(|| black_box(builder.build_for(0).expect("table")));
    });

    c.bench_function("rof_table_all_realizations", |b| {
        b.iter(|| {
            let set = builder.build_all(&AbortFlag::new(), None);
            black_box(set.completed())
        });
    });
}

criterion_group!(benches, table_build_benchmark);
criterion_main!(benches);
