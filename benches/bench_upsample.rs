use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pointview_core::{Colors, PointCloud};
use pointview_filters::{linear_upsample, segment_starts};

fn polyline(n: usize) -> PointCloud {
    let points: Vec<[f32; 3]> = (0..n)
        .map(|i| {
            let t = i as f32 * 0.01;
            [t.cos(), t.sin(), t * 0.1]
        })
        .collect();
    let colors = Colors::from_rgb(&vec![[0.5, 0.25, 1.0]; n]);
    PointCloud::from_points(&points)
        .with_colors(colors)
        .expect("one color per point")
}

fn bench_upsample(c: &mut Criterion) {
    let mut group = c.benchmark_group("upsample");
    for size in [10_000, 100_000] {
        let cloud = polyline(size);
        for k in [1, 4] {
            group.bench_with_input(
                BenchmarkId::new(format!("linear_k{}", k), size),
                &cloud,
                |b, cloud| b.iter(|| linear_upsample(cloud, k)),
            );
        }
        group.bench_with_input(BenchmarkId::new("segment_starts", size), &cloud, |b, cloud| {
            b.iter(|| segment_starts(cloud))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_upsample);
criterion_main!(benches);
