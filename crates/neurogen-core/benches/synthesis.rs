use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use neurogen_core::prelude::*;

fn noise_buffer(size: u32) -> PixelBuffer {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(0xBEEF);
    let mut data = vec![0u8; (size * size * 4) as usize];
    rng.fill(data.as_mut_slice());
    PixelBuffer::from_raw(size, size, data).expect("valid buffer")
}

fn bench_normal_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("normal_synthesis");

    for size in [256u32, 512, 1024] {
        let source = noise_buffer(size);
        group.throughput(Throughput::Elements((size as u64) * (size as u64)));
        group.bench_with_input(BenchmarkId::new("sobel", size), &source, |b, source| {
            b.iter(|| black_box(synthesize_normal_map(source, 2.0).unwrap()));
        });
    }

    group.finish();
}

fn bench_mask_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_packing");

    let metallic = noise_buffer(512);
    let occlusion = noise_buffer(1024);
    let roughness = noise_buffer(1024);

    for filter in [ResampleFilter::Nearest, ResampleFilter::Bilinear] {
        group.bench_function(BenchmarkId::new("pack_1024", format!("{filter:?}")), |b| {
            let sources = MaskSources {
                metallic: Some(&metallic),
                occlusion: Some(&occlusion),
                roughness: Some(&roughness),
            };
            b.iter(|| black_box(pack_mask_map(&sources, 1024, 1024, filter).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normal_synthesis, bench_mask_packing);
criterion_main!(benches);
