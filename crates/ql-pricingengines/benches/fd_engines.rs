use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ql_instruments::{CashDividend, OptionType, VanillaOption};
use ql_pricingengines::{
    BlackScholesInputs, FdAmericanEngine, FdBermudanEngine, FdDividendAmericanEngine,
    FdEngineSettings, FdEuropeanEngine,
};
use std::hint::black_box;

fn market() -> BlackScholesInputs {
    BlackScholesInputs::new(100.0, 0.05, 0.0, 0.2)
}

fn bench_european_grid_sizes(c: &mut Criterion) {
    let option = VanillaOption::european(OptionType::Call, 100.0, 1.0);
    let mut group = c.benchmark_group("fd_european_call");
    for points in [51usize, 101, 201, 401] {
        let engine = FdEuropeanEngine::new(
            market(),
            FdEngineSettings::default()
                .with_grid_points(points)
                .with_time_steps(points),
        );
        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |b, _| {
            b.iter(|| {
                let px = option
                    .price(black_box(&engine))
                    .expect("pricing should succeed")
                    .npv;
                black_box(px)
            })
        });
    }
    group.finish();
}

fn bench_early_exercise(c: &mut Criterion) {
    let settings = FdEngineSettings::default().with_grid_points(201).with_time_steps(200);

    let american = VanillaOption::american(OptionType::Put, 100.0, 1.0);
    let american_engine = FdAmericanEngine::new(market(), settings);
    c.bench_function("fd_american_put", |b| {
        b.iter(|| black_box(american.price(&american_engine).expect("pricing should succeed")))
    });

    let bermudan = VanillaOption::bermudan(OptionType::Put, 100.0, vec![0.25, 0.5, 0.75, 1.0]);
    let bermudan_engine = FdBermudanEngine::new(market(), settings);
    c.bench_function("fd_bermudan_put_quarterly", |b| {
        b.iter(|| black_box(bermudan.price(&bermudan_engine).expect("pricing should succeed")))
    });

    let dividend = VanillaOption::american(OptionType::Call, 100.0, 1.0)
        .with_dividends(vec![CashDividend::new(0.25, 1.0), CashDividend::new(0.75, 1.0)]);
    let dividend_engine = FdDividendAmericanEngine::new(market(), settings);
    c.bench_function("fd_dividend_american_call", |b| {
        b.iter(|| black_box(dividend.price(&dividend_engine).expect("pricing should succeed")))
    });
}

criterion_group!(benches, bench_european_grid_sizes, bench_early_exercise);
criterion_main!(benches);
