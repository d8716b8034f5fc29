//! Criterion benchmarks for BarLab hot paths.
//!
//! Benchmarks:
//! 1. Full event loop (MA crossover over two aligned symbols)
//! 2. Multi-symbol alignment with forward-fill
//! 3. Commission schedule lookup

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;

use barlab_core::data::{align_symbols, HistoricBarHandler};
use barlab_core::domain::{Bar, Direction};
use barlab_core::engine::Backtest;
use barlab_core::execution::{
    ChinaMarketCommission, CommissionModel, FixedPercentSlippage, SimulatedExecutionHandler,
};
use barlab_core::portfolio::{NaivePortfolio, OrderSizing};
use barlab_core::strategy::MovingAverageCross;

// ── Helpers ──────────────────────────────────────────────────────────

fn base() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2015, 1, 5)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn make_bars(symbol: &str, n: usize, phase: f64, skip_every: usize) -> Vec<Bar> {
    (0..n)
        .filter(|i| skip_every == 0 || i % skip_every != skip_every - 1)
        .map(|i| {
            let close = 20.0 + (i as f64 * 0.1 + phase).sin() * 5.0;
            Bar::new(
                symbol,
                base() + chrono::Duration::days(i as i64),
                close - 0.1,
                close + 0.3,
                close - 0.3,
                close,
                1_000_000.0,
            )
        })
        .collect()
}

fn symbols() -> Vec<String> {
    vec!["600008".to_string(), "000001".to_string()]
}

fn series(n: usize) -> HashMap<String, Vec<Bar>> {
    let mut series = HashMap::new();
    series.insert("600008".to_string(), make_bars("600008", n, 0.0, 0));
    series.insert("000001".to_string(), make_bars("000001", n, 1.3, 7));
    series
}

// ── 1. Event loop ────────────────────────────────────────────────────

fn bench_event_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_loop");
    for n in [250usize, 1_000, 5_000] {
        let data = HistoricBarHandler::new(&symbols(), series(n)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| {
                let portfolio =
                    NaivePortfolio::new(&symbols(), base(), 100_000.0, OrderSizing::FixedLot)
                        .unwrap();
                let execution = SimulatedExecutionHandler::new(
                    Box::new(FixedPercentSlippage::default()),
                    Box::new(ChinaMarketCommission::default()),
                );
                let mut backtest = Backtest::new(
                    Box::new(data.clone()),
                    Box::new(MovingAverageCross::default()),
                    Box::new(portfolio),
                    Box::new(execution),
                );
                black_box(backtest.run().unwrap())
            })
        });
    }
    group.finish();
}

// ── 2. Alignment ─────────────────────────────────────────────────────

fn bench_alignment(c: &mut Criterion) {
    let input = series(5_000);
    c.bench_function("align_5000_bars_two_symbols", |b| {
        b.iter(|| black_box(align_symbols(&symbols(), input.clone()).unwrap()))
    });
}

// ── 3. Commission ────────────────────────────────────────────────────

fn bench_commission(c: &mut Criterion) {
    let model = ChinaMarketCommission::default();
    let symbols = ["600008", "000001", "IF1512", "RB1601", "ZZ9999"];
    c.bench_function("commission_schedule", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for symbol in symbols {
                total += model.compute(black_box(symbol), Direction::Sell, 1_000, 12.34);
            }
            black_box(total)
        })
    });
}

criterion_group!(benches, bench_event_loop, bench_alignment, bench_commission);
criterion_main!(benches);
