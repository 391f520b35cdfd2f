use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use json_stores::Registry;
use serde_json::json;
use std::hint::black_box;
use std::path::PathBuf;
use std::time::Duration;

fn bench_path(name: &str, size: usize) -> PathBuf {
    std::env::temp_dir().join(format!("json_stores_bench_{}_{}.json", name, size))
}

fn bench_set_get_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_get_delete");
    group.sample_size(20);
    for size in [10, 100] {
        group.bench_with_input(BenchmarkId::new("compact", size), &size, |b, &size| {
            let path = bench_path("sgd", size);
            let _ = std::fs::remove_file(&path);
            let reg = Registry::builder().pretty(false).build();
            let store = reg.open(&path).unwrap();
            b.iter(|| {
                for i in 0..size {
                    store.set(format!("k{i}"), i).unwrap();
                }
                for i in 0..size {
                    black_box(store.get(format!("k{i}")).unwrap());
                }
                for i in 0..size {
                    store.delete(format!("k{i}")).unwrap();
                }
            });
            let _ = std::fs::remove_file(&path);
        });
    }
}

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(8));
    for size in [100, 1000, 10_000] {
        for (label, pretty) in [("compact", false), ("pretty", true)] {
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, &size| {
                let path = bench_path(&format!("flush_{label}"), size);
                let _ = std::fs::remove_file(&path);
                let reg = Registry::builder().pretty(pretty).build();
                let store = reg.open(&path).unwrap();
                store
                    .extend((0..size).map(|i| (format!("k{i}"), json!({"n": i}))))
                    .unwrap();
                b.iter(|| store.document().flush().unwrap());
                let _ = std::fs::remove_file(&path);
            });
        }
    }
}

fn bench_deep_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_set");
    for depth in [1, 8, 32] {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            let path = bench_path("deep", depth);
            let _ = std::fs::remove_file(&path);
            let reg = Registry::builder().pretty(false).atomic(false).build();
            let keys: Vec<String> = (0..depth).map(|d| format!("level{d}")).collect();
            let store = reg.open_at(&path, &keys).unwrap();
            let mut n = 0u64;
            b.iter(|| {
                n += 1;
                store.set("leaf", n).unwrap();
            });
            let _ = std::fs::remove_file(&path);
        });
    }
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    for size in [100, 1000] {
        group.bench_with_input(BenchmarkId::new("keys", size), &size, |b, &size| {
            let path = bench_path("read", size);
            let _ = std::fs::remove_file(&path);
            let reg = Registry::builder().pretty(false).build();
            let store = reg.open(&path).unwrap();
            store
                .extend((0..size).map(|i| (format!("k{i}"), i)))
                .unwrap();
            b.iter(|| black_box(store.keys().unwrap()));
            let _ = std::fs::remove_file(&path);
        });
    }
}

criterion_group!(
    benches,
    bench_set_get_delete,
    bench_flush,
    bench_deep_set,
    bench_read,
);
criterion_main!(benches);
