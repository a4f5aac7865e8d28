use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quota_trend::chart::{self, ChartSeries, ChartText, Layout};
use quota_trend::config::Config;
use quota_trend::delta;
use quota_trend::history::{History, Snapshot};
use quota_trend::pipeline;

/// A history with steady usage and a refill every `refill_every` days.
fn history(days: u64, refill_every: u64) -> History {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let mut remaining = 10_000u64;
    History::from_snapshots((0..days).map(|i| {
        if i > 0 && i % refill_every == 0 {
            remaining += 5_000;
        } else {
            remaining = remaining.saturating_sub(37 + (i * 13) % 90);
        }
        Snapshot::new(start + Days::new(i), remaining)
    }))
}

fn bench_derive(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive");
    for days in [30u64, 365, 3650] {
        let h = history(days, 45);
        group.bench_with_input(BenchmarkId::from_parameter(days), &h, |b, h| {
            b.iter(|| delta::derive(black_box(h)))
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let text = ChartText {
        title: "Usage over the last 14 days".to_string(),
        unit_label: "points".to_string(),
    };
    let layout = Layout::default();

    let mut group = c.benchmark_group("render_chart");
    for window in [7usize, 14, 31] {
        let points = chart::series(&history(60, 20), ChartSeries::Consumed, window);
        group.bench_with_input(BenchmarkId::from_parameter(window), &points, |b, points| {
            b.iter(|| chart::render(black_box(points), &layout, &text))
        });
    }
    group.finish();
}

fn bench_artifacts(c: &mut Criterion) {
    let config = Config::default();
    let h = history(30, 100);
    c.bench_function("build_artifacts_30_days", |b| {
        b.iter(|| pipeline::build_artifacts(black_box(&h), &config))
    });
}

criterion_group!(benches, bench_derive, bench_render, bench_artifacts);
criterion_main!(benches);
