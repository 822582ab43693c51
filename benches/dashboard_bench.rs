//! Benchmarks for the Firemap dashboard
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use firemap::dashboard::{Dashboard, MapSettings, Selection, SelectionEvent, SelectionManager};
use firemap::dataset::{
    default_locations, points_from_str, Dataset, FireDetectionRecord, Month, StateMonthAggregate,
};
use std::fmt::Write;
use std::sync::Arc;

fn create_test_points(count: usize) -> Vec<FireDetectionRecord> {
    (0..count)
        .map(|i| {
            FireDetectionRecord::new(
                36.0 + (i % 1000) as f64 * 0.01,
                -124.0 + (i % 700) as f64 * 0.01,
                (i % 2500) as u64,
                Month::ALL[i % 12],
            )
        })
        .collect()
}

fn create_test_aggregates() -> Vec<StateMonthAggregate> {
    let mut rows = Vec::new();
    for state in ["Washington", "Oregon", "California"] {
        for month in Month::ALL {
            rows.push(StateMonthAggregate::new(state, month, month.number() as u64 * 97));
        }
    }
    rows
}

fn create_dashboard(points: usize) -> Dashboard {
    let dataset = Dataset::new(
        create_test_points(points),
        create_test_aggregates(),
        default_locations(),
    )
    .unwrap();
    Dashboard::new(Arc::new(dataset), MapSettings::default())
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for size in [1_000, 10_000, 100_000] {
        let dashboard = create_dashboard(size);
        let selection = Selection::new("Washington", Some(Month::Aug));

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("full_view_{}", size), |b| {
            b.iter(|| dashboard.render(black_box(&selection)))
        });

        group.bench_function(format!("full_view_json_{}", size), |b| {
            b.iter(|| serde_json::to_vec(&dashboard.render(black_box(&selection))).unwrap())
        });
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let dashboard = create_dashboard(10_000);

    group.bench_function("bar_click", |b| {
        let current = Selection::new("Oregon", Some(Month::Jan));
        b.iter(|| {
            dashboard.dispatch(
                black_box(&current),
                SelectionEvent::BarClicked { month: Month::Aug },
            )
        })
    });

    group.bench_function("state_change", |b| {
        let current = Selection::new("Oregon", Some(Month::Jul));
        b.iter(|| {
            dashboard.dispatch(
                black_box(&current),
                SelectionEvent::SetState {
                    state: "California".to_string(),
                },
            )
        })
    });

    group.bench_function("session_month_sweep", |b| {
        b.iter(|| {
            let mut manager = SelectionManager::new(dashboard.initial_selection());
            for month in Month::ALL {
                let transition = manager.set_month(Some(month));
                black_box(dashboard.render_transition(&transition));
            }
        })
    });

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    let mut csv_data = String::from(",longitude,latitude,num,month\n");
    for (i, point) in create_test_points(10_000).iter().enumerate() {
        writeln!(
            csv_data,
            "{},{},{},{},{}",
            i,
            point.longitude,
            point.latitude,
            point.count,
            point.month.number()
        )
        .unwrap();
    }

    group.throughput(Throughput::Elements(10_000));
    group.bench_function("points_10000", |b| {
        b.iter(|| points_from_str(black_box(&csv_data)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_render, bench_dispatch, bench_load);
criterion_main!(benches);
