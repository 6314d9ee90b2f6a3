use conway_engine::{ConwayStep, Grid, StepEngine};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_conway_step(c: &mut Criterion) {
    const N: usize = 1 << 8;
    let life = Grid::random(N, N, Some(42), 0.3).unwrap();
    c.bench_function("conway_step", |b| b.iter(|| ConwayStep.step(&life).unwrap()));
}

fn bench_default_field(c: &mut Criterion) {
    let life = Grid::random(25, 20, Some(42), 0.3).unwrap();
    c.bench_function("conway_step_25x20", |b| {
        b.iter(|| ConwayStep.step(&life).unwrap())
    });
}

criterion_group!(benches, bench_conway_step, bench_default_field);
criterion_main!(benches);
