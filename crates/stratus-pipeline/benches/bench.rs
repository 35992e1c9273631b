use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use stratus_pipeline::demux;
use tokio::runtime::Builder;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

// Number of items pushed through the pipeline per benchmark iteration.
const TOTAL_ITEMS: usize = 8192;

/// Benchmarks the dispatcher under full consumer readiness: every lane
/// drains as fast as it can, so the reserve race is the hot path.
fn bench_demux(c: &mut Criterion) {
    let rt = Builder::new_multi_thread()
        .build()
        .expect("failed to build tokio runtime");

    let mut group = c.benchmark_group("demux");
    group.throughput(Throughput::Elements(TOTAL_ITEMS as u64));

    for width in [1, 4, 16, 25] {
        group.bench_function(format!("width/{width}"), |b| {
            b.to_async(&rt).iter(|| async move {
                let shutdown = CancellationToken::new();
                let (tx, rx) = mpsc::channel(1);
                let lanes = demux(&shutdown, rx, width);

                let producer = tokio::spawn(async move {
                    for i in 0..TOTAL_ITEMS {
                        if tx.send(i).await.is_err() {
                            return;
                        }
                    }
                });

                let mut readers = JoinSet::new();
                for mut lane in lanes {
                    readers.spawn(async move {
                        let mut count = 0_usize;
                        while let Some(item) = lane.recv().await {
                            black_box(item);
                            count += 1;
                        }
                        count
                    });
                }

                let mut total = 0;
                while let Some(count) = readers.join_next().await {
                    total += count.expect("reader task");
                }
                producer.await.expect("producer task");
                assert_eq!(total, TOTAL_ITEMS);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_demux);
criterion_main!(benches);
