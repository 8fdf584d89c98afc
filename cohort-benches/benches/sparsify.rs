//! Effective-resistance sparsification benchmarks.
//!
//! The pseudoinverse dominates, so node count drives the cost far more than
//! `epsilon` does.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};

use cohort_benches::{
    error::BenchSetupError,
    fixture::{bench_rng, planted_graph},
    params::{ModelBenchParams, SparsifyBenchParams},
};
use cohort_core::SpectralSparsifier;

/// Seed used for all fixture generation in this benchmark.
const SEED: u64 = 42;

/// Sparsification inputs to benchmark.
const CASES: &[SparsifyBenchParams] = &[
    SparsifyBenchParams {
        model: ModelBenchParams::balanced(25, 2),
        epsilon: 0.5,
    },
    SparsifyBenchParams {
        model: ModelBenchParams::balanced(25, 4),
        epsilon: 0.5,
    },
    SparsifyBenchParams {
        model: ModelBenchParams::balanced(25, 4),
        epsilon: 0.9,
    },
];

fn spectral_sparsify_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("spectral_sparsify");
    group.sample_size(20);

    for params in CASES {
        let graph = planted_graph(&params.model, SEED)?.into_parts().0;
        let sparsifier = SpectralSparsifier::new(params.epsilon)?;

        group.bench_with_input(
            BenchmarkId::from_parameter(params),
            &graph,
            |b, graph| {
                let mut rng = bench_rng(SEED);
                b.iter_batched(
                    || graph.clone(),
                    |mut working| sparsifier.sparsify(&mut working, &mut rng),
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
    Ok(())
}

fn spectral_sparsify(c: &mut Criterion) {
    if let Err(err) = spectral_sparsify_impl(c) {
        panic!("spectral_sparsify benchmark setup failed: {err}");
    }
}

criterion_group!(benches, spectral_sparsify);
criterion_main!(benches);
