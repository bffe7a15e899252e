//! # Reference Interpolation Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use mpc_lib::{
    curve::{CurvePose, ReedsSheppCurve},
    horizon::HorizonWindow,
    loc::Pose,
    path::ReferencePath,
    ref_interp::ReferenceInterpolator,
};

fn ref_interp_benchmark(c: &mut Criterion) {
    // ---- Build a winding global path ----

    let path: ReferencePath = (0..400)
        .map(|i| {
            let x = i as f64 * 0.1;
            let y = (x * 0.5).sin();
            let yaw = (0.5 * (x * 0.5).cos()).atan();
            Pose::from_xy_yaw(x, y, yaw)
        })
        .collect::<Vec<_>>()
        .into();

    let current = Pose::from_xy_yaw(12.3, 0.2, 0.1);

    let interpolator = ReferenceInterpolator::new(ReedsSheppCurve::new(1.0), 10, 1.0);

    c.bench_function("HorizonWindow::from_distance", |b| {
        b.iter(|| HorizonWindow::from_distance(&path, &current, 2.5).unwrap())
    });

    let window = HorizonWindow::from_distance(&path, &current, 2.5).unwrap();

    c.bench_function("ReferenceInterpolator::interpolate", |b| {
        b.iter(|| interpolator.interpolate(&path, &current, &window).unwrap())
    });

    // Reverse parking style manoeuvre, which needs the longer words
    let curve = ReedsSheppCurve::new(1.0);
    let start = CurvePose::new(0.0, 0.0, 0.0);
    let goal = CurvePose::new(-0.5, 1.5, 3.0);

    c.bench_function("ReedsSheppCurve::shortest_path", |b| {
        b.iter(|| curve.shortest_path(&start, &goal))
    });
}

criterion_group!(benches, ref_interp_benchmark);
criterion_main!(benches);
