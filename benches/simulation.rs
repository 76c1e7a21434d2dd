use criterion::{black_box, criterion_group, criterion_main, Criterion};
use edoxaban::experiments::studies::Chen2017b;
use edoxaban::prelude::*;

fn oral_dose(hours: f64) -> TimecourseSim {
    TimecourseSim::new(vec![Timecourse::new(
        0.0,
        hours * 60.0,
        500,
        Changes::new().with("PODOSE_edo", Quantity::new(60.0, "mg")),
    )])
}

/// Single oral dose of 60 mg over 50 hr
fn benchmark_timecourse(c: &mut Criterion) {
    let simulator = Simulator::default();
    let sim = oral_dose(50.0);
    c.bench_function("timecourse_po_60mg", |b| {
        b.iter(|| simulator.run_timecourse(black_box(&sim)));
    });
}

/// Scan over ten renal functions
fn benchmark_scan(c: &mut Criterion) {
    let simulator = Simulator::default();
    let values = (1..=10)
        .map(|i| Quantity::dimensionless(i as f64 / 10.0))
        .collect();
    let scan = ScanSim::new(
        oral_dose(50.0),
        vec![ScanDimension::new("dim_renal", "KI__f_renal_function", values)],
    );
    c.bench_function("scan_renal_function", |b| {
        b.iter(|| simulator.run_scan(black_box(&scan)));
    });
}

/// All tasks of a study with three doses
fn benchmark_experiment(c: &mut Criterion) {
    let simulator = Simulator::default();
    c.bench_function("experiment_chen2017b", |b| {
        b.iter(|| run_experiment(black_box(&Chen2017b), None, &simulator));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(20);
    targets = benchmark_timecourse, benchmark_scan, benchmark_experiment
}
criterion_main!(benches);
