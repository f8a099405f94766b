use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::SmallRng, SeedableRng};
use tabrs_api::Solver;
use tabrs_benches::random_feasible_lp;
use tabrs_core::math::Scalar;
use tabrs_core::options::SolveOptions;

fn solve_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplex_lp_solve");
    let mut rng = SmallRng::seed_from_u64(42);
    for &(m, n) in &[(10, 10), (50, 30), (120, 80)] {
        group.bench_function(format!("m={m}_n={n}"), |b| {
            b.iter_batched(
                || random_feasible_lp(m, n, &mut rng).unwrap(),
                |problem| {
                    let mut solver = Solver::<Scalar>::new().options(SolveOptions::default());
                    let _ = solver.solve_lp(&problem).unwrap();
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, solve_benchmark);
criterion_main!(benches);
