//! Criterion benchmarks for FilterLab hot paths.
//!
//! Benchmarks:
//! 1. Adaptive smoothers (JMA, MAMA, KAMA, VIDYA)
//! 2. Fixed filters (SuperSmoother, Hilbert trendline)
//! 3. Stop engines (PSAR, Supertrend, Chandelier, ATR trailing)
//! 4. Signal machines (runs, xsignals)
//! 5. Full frame from a config

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use filterlab_core::domain::Bar;
use filterlab_core::filters::{ht_trendline, ssf, SsfParams, TrendlineParams};
use filterlab_core::signals::{long_run, xsignals, Threshold, XsignalsParams};
use filterlab_core::smoothers::{
    jma, kama, mama, vidya, JmaParams, KamaParams, MamaParams, VidyaParams,
};
use filterlab_core::stops::{
    atr_trailing_stop, chandelier_exit, psar, supertrend, AtrTrailingParams, ChandelierParams,
    PsarParams, SupertrendParams,
};
use filterlab_core::volatility::atr;
use filterlab_core::{compute_frame, Capabilities, FilterlabConfig};

// ── Helpers ──────────────────────────────────────────────────────────

const SIZES: [usize; 3] = [252, 2520, 25_200];

fn make_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0 + (i as f64 * 0.013).cos() * 5.0)
        .collect()
}

fn make_hlc(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let close = make_closes(n);
    let high = close.iter().map(|c| c + 1.5).collect();
    let low = close.iter().map(|c| c - 1.5).collect();
    (high, low, close)
}

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    make_closes(n)
        .into_iter()
        .enumerate()
        .map(|(i, close)| Bar {
            timestamp: base + chrono::Duration::days(i as i64),
            open: close - 0.3,
            high: close + 1.5,
            low: close - 1.5,
            close,
            volume: 1_000_000.0,
        })
        .collect()
}

// ── 1. Adaptive smoothers ────────────────────────────────────────────

fn bench_smoothers(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_smoothers");
    for &n in &SIZES {
        let closes = make_closes(n);
        group.bench_with_input(BenchmarkId::new("jma", n), &closes, |b, x| {
            b.iter(|| jma(black_box(x), &JmaParams::default()))
        });
        group.bench_with_input(BenchmarkId::new("mama", n), &closes, |b, x| {
            b.iter(|| mama(black_box(x), &MamaParams::default()))
        });
        group.bench_with_input(BenchmarkId::new("kama", n), &closes, |b, x| {
            b.iter(|| kama(black_box(x), &KamaParams::default()))
        });
        group.bench_with_input(BenchmarkId::new("vidya", n), &closes, |b, x| {
            b.iter(|| vidya(black_box(x), &VidyaParams::default()))
        });
    }
    group.finish();
}

// ── 2. Fixed filters ─────────────────────────────────────────────────

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_filters");
    for &n in &SIZES {
        let closes = make_closes(n);
        group.bench_with_input(BenchmarkId::new("ssf", n), &closes, |b, x| {
            b.iter(|| ssf(black_box(x), &SsfParams::default()))
        });
        group.bench_with_input(BenchmarkId::new("ht_trendline", n), &closes, |b, x| {
            b.iter(|| ht_trendline(black_box(x), &TrendlineParams::default()))
        });
    }
    group.finish();
}

// ── 3. Stop engines ──────────────────────────────────────────────────

fn bench_stops(c: &mut Criterion) {
    let mut group = c.benchmark_group("stop_engines");
    for &n in &SIZES {
        let (high, low, close) = make_hlc(n);
        let vol = atr(&high, &low, &close, 14).unwrap();
        group.bench_function(BenchmarkId::new("psar", n), |b| {
            b.iter(|| psar(black_box(&high), black_box(&low), None, &PsarParams::default()))
        });
        group.bench_function(BenchmarkId::new("supertrend", n), |b| {
            b.iter(|| {
                supertrend(
                    black_box(&high),
                    black_box(&low),
                    black_box(&close),
                    &vol,
                    &SupertrendParams::default(),
                )
            })
        });
        group.bench_function(BenchmarkId::new("chandelier", n), |b| {
            b.iter(|| {
                chandelier_exit(
                    black_box(&high),
                    black_box(&low),
                    black_box(&close),
                    &vol,
                    &ChandelierParams::default(),
                )
            })
        });
        group.bench_function(BenchmarkId::new("atr_trailing", n), |b| {
            b.iter(|| atr_trailing_stop(black_box(&close), &vol, &AtrTrailingParams::default()))
        });
    }
    group.finish();
}

// ── 4. Signal machines ───────────────────────────────────────────────

fn bench_signals(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_machines");
    for &n in &SIZES {
        let fast = make_closes(n);
        let slow: Vec<f64> = fast.iter().rev().copied().collect();
        group.bench_function(BenchmarkId::new("long_run", n), |b| {
            b.iter(|| long_run(black_box(&fast), black_box(&slow), 2))
        });
        group.bench_function(BenchmarkId::new("xsignals", n), |b| {
            b.iter(|| {
                xsignals(
                    black_box(&fast),
                    Threshold::Level(95.0),
                    Threshold::Level(105.0),
                    &XsignalsParams::default(),
                )
            })
        });
    }
    group.finish();
}

// ── 5. Full frame ────────────────────────────────────────────────────

fn bench_frame(c: &mut Criterion) {
    let config = FilterlabConfig::from_toml(
        r#"
[[indicator]]
kind = "jma"
[[indicator]]
kind = "mama"
[[indicator]]
kind = "supertrend"
[[indicator]]
kind = "psar"
[[indicator]]
kind = "runs"
"#,
    )
    .unwrap();
    let plan = config.plan().unwrap();
    let bars = make_bars(2520);
    let caps = Capabilities::native();
    c.bench_function("compute_frame_2520", |b| {
        b.iter(|| compute_frame(black_box(&bars), &plan, &caps))
    });
}

criterion_group!(
    benches,
    bench_smoothers,
    bench_filters,
    bench_stops,
    bench_signals,
    bench_frame,
);
criterion_main!(benches);
