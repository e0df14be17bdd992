//! Benchmarks for the dashboard model
//!
//! Run with: cargo bench

use chemdash::config::DashboardConfig;
use chemdash::dashboard::{demo_document, trend_chart, Dashboard};
use chemdash::scheduler::TimerQueue;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_timer_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("timer_queue");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("schedule_drain_{}", size), |b| {
            b.iter(|| {
                let mut timers = TimerQueue::new();
                for i in 0..size {
                    timers.schedule((i % 97) as u64, black_box(i));
                }
                let mut fired = 0;
                while timers.pop_due(u64::MAX).is_some() {
                    fired += 1;
                }
                fired
            })
        });

        group.bench_function(format!("cancel_half_{}", size), |b| {
            b.iter(|| {
                let mut timers = TimerQueue::new();
                let ids: Vec<_> = (0..size).map(|i| timers.schedule(15, i)).collect();
                for id in ids.iter().step_by(2) {
                    timers.cancel(*id);
                }
                timers.pending()
            })
        });
    }

    group.finish();
}

fn bench_dashboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard");

    group.bench_function("load_demo_page", |b| {
        b.iter(|| {
            Dashboard::load(black_box(demo_document()), DashboardConfig::default(), None).unwrap()
        })
    });

    group.bench_function("counters_to_target", |b| {
        b.iter(|| {
            let mut dashboard =
                Dashboard::load(demo_document(), DashboardConfig::default(), None).unwrap();
            dashboard.run_until_idle()
        })
    });

    group.bench_function("analyze_cycle", |b| {
        let mut dashboard =
            Dashboard::load(demo_document(), DashboardConfig::default(), None).unwrap();
        dashboard.run_until_idle();

        b.iter(|| {
            dashboard.submit_analyze();
            dashboard.run_until_idle();
            dashboard.reset_form();
        })
    });

    group.bench_function("trend_chart_json", |b| {
        let chart = trend_chart();
        b.iter(|| black_box(&chart).to_json().unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_timer_queue, bench_dashboard);
criterion_main!(benches);
