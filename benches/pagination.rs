//! Benchmarks for page appends and viewport reconciliation.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use photogrid::search::{PhotoPage, RawPhoto, SearchSession};
use photogrid::ui::{SurfaceEvent, ViewportReconciler, ViewportSnapshot};

fn page(start: usize, len: usize, total: usize) -> PhotoPage {
    PhotoPage {
        items: (start..start + len)
            .map(|i| {
                let url = (i % 10 != 0).then(|| format!("https://farm1.staticflickr.com/1/{i}_abc.jpg"));
                RawPhoto::new(format!("Photo {i}"), url.as_deref())
            })
            .collect(),
        total_count: total,
    }
}

fn bench_append_pages(c: &mut Criterion) {
    let pages = (0..40).map(|n| page(n * 25, 25, 1000)).collect::<Vec<_>>();
    c.bench_function("append_40_pages", |b| {
        b.iter(|| {
            let mut session = SearchSession::new("bench");
            for page in pages.iter().cloned() {
                black_box(session.append_page(page));
            }
            session
        });
    });
}

fn bench_reconcile_while_still(c: &mut Criterion) {
    let snapshot = ViewportSnapshot::still(480..520);
    c.bench_function("reconcile_still", |b| {
        b.iter(|| {
            let mut reconciler = ViewportReconciler::default();
            let mut events: Vec<SurfaceEvent> = Vec::new();
            for n in 1..40 {
                reconciler.counts_changed(n * 25, (n + 1) * 25, black_box(&snapshot), &mut events);
            }
            events
        });
    });
}

fn bench_reconcile_deferred(c: &mut Criterion) {
    let moving = ViewportSnapshot::moving(480..520);
    let still = ViewportSnapshot::still(480..520);
    c.bench_function("reconcile_deferred", |b| {
        b.iter(|| {
            let mut reconciler = ViewportReconciler::default();
            let mut events: Vec<SurfaceEvent> = Vec::new();
            for n in 1..40 {
                reconciler.counts_changed(n * 25, (n + 1) * 25, &moving, &mut events);
            }
            reconciler.motion_ended(black_box(&still), &mut events);
            events
        });
    });
}

criterion_group!(
    benches,
    bench_append_pages,
    bench_reconcile_while_still,
    bench_reconcile_deferred
);
criterion_main!(benches);
