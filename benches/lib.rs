use criterion::{criterion_group, criterion_main};

mod model;

criterion_group!(benches_fit, fit::bench_guess_and_check, fit::bench_simplex, fit::bench_mcmc);
criterion_group!(benches_model, model::bench_batman, model::bench_trapezoid);
criterion_main!(benches_fit, benches_model);
