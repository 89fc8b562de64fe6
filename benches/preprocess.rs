use criterion::{Criterion, black_box, criterion_group, criterion_main};
use fiscalqr::models::Raster;
use fiscalqr::preprocess::{self, generate_variants};
use image::{GrayImage, Luma};

/// Synthetic test image with gradient plus checkerboard texture.
fn test_raster(size: u32) -> Raster {
    let image = GrayImage::from_fn(size, size, |x, y| {
        let gradient = ((x + y) * 255 / (2 * size)) as u8;
        let checker = if (x / 8 + y / 8) % 2 == 0 { 40 } else { 0 };
        Luma([gradient.saturating_add(checker)])
    });
    Raster::Gray(image)
}

fn bench_variant_sweep_small(c: &mut Criterion) {
    let image = test_raster(128);
    c.bench_function("variant_sweep_128x128", |b| {
        b.iter(|| generate_variants(black_box(&image)).count())
    });
}

fn bench_variant_sweep_medium(c: &mut Criterion) {
    let image = test_raster(512);
    c.bench_function("variant_sweep_512x512", |b| {
        b.iter(|| generate_variants(black_box(&image)).count())
    });
}

fn bench_bilateral_medium(c: &mut Criterion) {
    let image = test_raster(512);
    let gray = image.to_gray();
    c.bench_function("bilateral_512x512", |b| {
        b.iter(|| preprocess::filters::bilateral(black_box(&gray)))
    });
}

fn bench_clahe_medium(c: &mut Criterion) {
    let image = test_raster(512);
    let gray = image.to_gray();
    c.bench_function("clahe_512x512", |b| {
        b.iter(|| preprocess::filters::clahe(black_box(&gray)))
    });
}

criterion_group!(
    benches,
    bench_variant_sweep_small,
    bench_variant_sweep_medium,
    bench_bilateral_medium,
    bench_clahe_medium
);
criterion_main!(benches);
