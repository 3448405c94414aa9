use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use subframe_snr::algorithms::statistics::{median, median_and_mad};
use subframe_snr::algorithms::{measure, StretchNormalizer};
use subframe_snr::core::domain::{Rectangle, RoiPair};
use subframe_snr::core::image::Image;

/// Deterministic noisy frame: a sky gradient plus a brighter block.
fn synthetic_frame(width: usize, height: usize) -> Image {
    let mut image = Image::new(width, height, 1);
    let mut state: u32 = 0x2545_f491;
    for y in 0..height {
        for x in 0..width {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let noise = (state as f32 / u32::MAX as f32 - 0.5) * 0.02;
            let signal = if x > width / 2 && y > height / 2 { 0.08 } else { 0.0 };
            let sky = 0.05 + 0.01 * (x as f32 / width as f32);
            image.set(0, x, y, sky + signal + noise);
        }
    }
    image
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    for side in [256usize, 1024] {
        let frame = synthetic_frame(side, side);
        group.bench_with_input(BenchmarkId::new("median", side), &frame, |b, img| {
            b.iter(|| median(black_box(&img.data)));
        });
        group.bench_with_input(BenchmarkId::new("median_and_mad", side), &frame, |b, img| {
            b.iter(|| median_and_mad(black_box(&img.data)));
        });
    }

    group.finish();
}

fn bench_auto_stretch(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_stretch");
    let normalizer = StretchNormalizer::default();

    for side in [256usize, 1024] {
        let frame = synthetic_frame(side, side);
        group.bench_with_input(BenchmarkId::new("normalize", side), &frame, |b, img| {
            b.iter(|| {
                let mut work = img.clone();
                black_box(normalizer.normalize(&mut work));
            });
        });
    }

    group.finish();
}

fn bench_region_measure(c: &mut Criterion) {
    let mut group = c.benchmark_group("measure");

    let frame = synthetic_frame(1024, 1024);
    let rois = RoiPair::new(
        Rectangle::new(0, 0, 256, 256).unwrap(),
        Rectangle::new(640, 640, 896, 896).unwrap(),
    )
    .unwrap();

    group.bench_function("roi_pair_1024", |b| {
        b.iter(|| measure(black_box(&frame), black_box(&rois), "bench"));
    });

    group.finish();
}

criterion_group!(benches, bench_statistics, bench_auto_stretch, bench_region_measure);
criterion_main!(benches);
