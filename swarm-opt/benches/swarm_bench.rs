//! Criterion benchmarks for the swarm generation loop.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use swarm_opt::benchmarks::{sphere, CategoricalBenchmark};
use swarm_opt::prelude::*;

fn template(dimensions: usize) -> Vec<Parameter> {
    (0..dimensions)
        .map(|_| Parameter::continuous(-5.0, 5.0).expect("valid bounds"))
        .collect()
}

fn bench_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("sphere");
    let cost = |params: &[Parameter]| {
        let x: Vec<f64> = params.iter().map(Parameter::value).collect();
        ThresholdOutput::new(sphere(&x), f64::NEG_INFINITY)
    };

    for dimensions in [2, 8, 32] {
        group.bench_with_input(
            BenchmarkId::new("dimensions", dimensions),
            &dimensions,
            |b, &dimensions| {
                b.iter(|| {
                    swarm_opt::builder()
                        .particles(30)
                        .max_generations(100)
                        .seed(42)
                        .optimize(black_box(template(dimensions)), &cost)
                        .expect("should run")
                });
            },
        );
    }

    group.finish();
}

fn bench_categorical(c: &mut Criterion) {
    let benchmark = CategoricalBenchmark::default();

    c.bench_function("categorical_benchmark", |b| {
        b.iter(|| {
            swarm_opt::builder()
                .particles(30)
                .max_generations(100)
                .seed(42)
                .optimize(
                    CategoricalBenchmark::template().expect("valid template"),
                    black_box(&benchmark),
                )
                .expect("should run")
        });
    });
}

criterion_group!(benches, bench_sphere, bench_categorical);
criterion_main!(benches);
