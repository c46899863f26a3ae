//! Performance benchmarks for ExtSort
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

const EXTENSIONS: [&str; 5] = ["txt", "JPG", "rs", "log", ""];

/// Create `count` small files spread over a few subdirectories
fn create_tree(dir: &Path, count: usize, size: usize) {
    let chunk: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();

    for i in 0..count {
        let sub = dir.join(format!("d{}", i % 8));
        std::fs::create_dir_all(&sub).unwrap();

        let ext = EXTENSIONS[i % EXTENSIONS.len()];
        let name = if ext.is_empty() {
            format!("file_{}", i)
        } else {
            format!("file_{}.{}", i, ext)
        };
        File::create(sub.join(name)).unwrap().write_all(&chunk).unwrap();
    }
}

fn bench_sort_small_files(c: &mut Criterion) {
    let src_dir = TempDir::new().unwrap();
    create_tree(src_dir.path(), 500, 1024);

    let mut group = c.benchmark_group("sort_500_small_files");
    group.throughput(Throughput::Elements(500));

    for threads in [1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let dst_dir = TempDir::new().unwrap();
                let report = extsort::core::sort_files_with_threads(
                    src_dir.path(),
                    dst_dir.path(),
                    threads,
                );
                black_box(report.unwrap());
            });
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let paths: Vec<std::path::PathBuf> = (0..1000)
        .map(|i| format!("/data/set_{}/Sample.{}", i, EXTENSIONS[i % EXTENSIONS.len()]).into())
        .collect();

    c.bench_function("classify_1000_paths", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(extsort::fs::classify(path));
            }
        });
    });
}

criterion_group!(benches, bench_sort_small_files, bench_classify);
criterion_main!(benches);
