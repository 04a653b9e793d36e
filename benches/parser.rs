//! Benchmarks for dump parsing and the displacement join.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tempfile::TempDir;

use granuview::{parse_dump, playback::ReferenceFrame};

fn write_dump(dir: &TempDir, name: &str, particles: usize) -> PathBuf {
    let mut content = String::from("ITEM: ATOMS id x y z radius fx fy fz\n");
    for i in 0..particles {
        let x = i as f64 * 0.01;
        content.push_str(&format!("{} {x} {x} {x} 0.05 0.0 0.0 -9.8\n", i + 1));
    }
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn bench_parse_dump(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_dump");
    let dir = tempfile::tempdir().unwrap();

    for particles in [100, 1_000, 10_000, 100_000] {
        let path = write_dump(&dir, &format!("dump_{particles}.txt"), particles);

        group.bench_with_input(
            BenchmarkId::from_parameter(particles),
            &particles,
            |b, _| {
                b.iter(|| parse_dump(black_box(&path), 0).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_displace(c: &mut Criterion) {
    let mut group = c.benchmark_group("displace");
    let dir = tempfile::tempdir().unwrap();

    for particles in [1_000, 10_000, 100_000] {
        let reference_path = write_dump(&dir, &format!("ref_{particles}.txt"), particles);
        let target_path = write_dump(&dir, &format!("target_{particles}.txt"), particles);

        let reference = ReferenceFrame::new(Arc::new(parse_dump(&reference_path, 0).unwrap()));
        let target = Arc::new(parse_dump(&target_path, 100).unwrap());

        group.bench_with_input(
            BenchmarkId::from_parameter(particles),
            &particles,
            |b, _| {
                b.iter(|| reference.displace(black_box(Arc::clone(&target))));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse_dump, bench_displace);
criterion_main!(benches);
