use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use ews_bench::statistics::block_bootstrap;
use ews_bench::{
    indicator_table, simulate_ricker, AnalysisContext, BootstrapKind, DetrendMethod, RickerParams,
    SuiteConfig,
};

fn prepared_context() -> AnalysisContext {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
    let simulation = simulate_ricker(&RickerParams::default(), &mut rng).unwrap();
    let series = simulation.series.with_transition(Some(860));
    let mut ctx = AnalysisContext::new(series).unwrap();
    ctx.detrend(DetrendMethod::Lowess, 0.2).unwrap();
    ctx.compute_spectrum(0.5, 40).unwrap();
    ctx
}

fn bench_preprocessing(c: &mut Criterion) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
    let simulation = simulate_ricker(&RickerParams::default(), &mut rng).unwrap();

    let mut group = c.benchmark_group("preprocessing");
    group.sample_size(20);
    for method in [DetrendMethod::Lowess, DetrendMethod::Gaussian] {
        group.bench_function(format!("detrend_{method:?}").to_lowercase(), |b| {
            b.iter(|| {
                let series = simulation.series.clone().with_transition(Some(860));
                let mut ctx = AnalysisContext::new(series).unwrap();
                ctx.detrend(method, 0.2).unwrap();
                black_box(ctx)
            });
        });
    }
    group.finish();
}

fn bench_indicators(c: &mut Criterion) {
    let ctx = prepared_context();
    let suite = SuiteConfig::default();
    let table = indicator_table(&ctx, &suite).unwrap();

    let mut group = c.benchmark_group("indicators");
    group.bench_function("rolling_variance", |b| b.iter(|| black_box(ctx.compute_var(0.5).unwrap())));
    group.bench_function("coefficient_of_variation", |b| b.iter(|| black_box(ctx.compute_cv(0.25).unwrap())));
    group.bench_function("skewness", |b| b.iter(|| black_box(ctx.compute_skew(0.5).unwrap())));
    group.bench_function("kurtosis", |b| b.iter(|| black_box(ctx.compute_kurt(0.25).unwrap())));
    group.bench_function("lag1_autocorrelation", |b| b.iter(|| black_box(ctx.compute_auto(0.5, 1).unwrap())));
    group.bench_function("spectral_max", |b| b.iter(|| black_box(ctx.compute_smax().unwrap())));
    group.bench_function("kendall_tau", |b| {
        b.iter(|| black_box(ctx.compute_ktau(&table, None, None).unwrap()))
    });

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    group.bench_function("block_bootstrap", |b| {
        b.iter(|| {
            black_box(block_bootstrap(ctx.residuals(), 1, BootstrapKind::Stationary, 10, &mut rng).unwrap())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_preprocessing, bench_indicators);
criterion_main!(benches);
