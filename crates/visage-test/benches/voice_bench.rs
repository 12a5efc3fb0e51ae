//! Benchmarks for VISAGE audio analysis and lip-sync drivers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use visage_test::{rig, SyntheticVoice};
use visage_voice::{AnalyserConfig, FrequencyDriver, ProceduralDriver, SpectrumAnalyser};

fn bench_analyser(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyser_byte_frequency_data");

    for fft_size in [256usize, 512, 2048] {
        let config = AnalyserConfig {
            fft_size,
            ..Default::default()
        };
        let mut analyser = SpectrumAnalyser::new(config).unwrap();
        let mut voice = SyntheticVoice::new(16_000, 1);
        analyser.push_samples(&voice.next_chunk(fft_size));
        let mut bins = Vec::new();

        group.bench_with_input(BenchmarkId::from_parameter(fft_size), &fft_size, |b, _| {
            b.iter(|| {
                analyser.byte_frequency_data(&mut bins);
                black_box(bins.len())
            })
        });
    }
    group.finish();
}

fn bench_frequency_driver(c: &mut Criterion) {
    let mut registry = rig::registry(&rig::full_face());
    let mut driver = FrequencyDriver::new();
    let bins = vec![120u8; 256];

    c.bench_function("frequency_driver_apply", |b| {
        b.iter(|| driver.apply_bins(&mut registry, black_box(&bins)))
    });
}

fn bench_procedural_driver(c: &mut Criterion) {
    let mut registry = rig::registry(&rig::full_face());
    let mut driver = ProceduralDriver::default();
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("procedural_driver_tick", |b| {
        b.iter(|| black_box(driver.tick(&mut registry, 1.0 / 60.0, &mut rng)))
    });
}

criterion_group!(
    benches,
    bench_analyser,
    bench_frequency_driver,
    bench_procedural_driver,
);
criterion_main!(benches);
