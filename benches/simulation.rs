//! Performance benchmarks for REEFSIM

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use reefsim::flock::FlockConfig;
use reefsim::{Config, FlockGroup, PlayerInput, PlayerSample, Reef, SpeciesRegistry, TerrainGenerator};

fn benchmark_terrain(c: &mut Criterion) {
    let mut group = c.benchmark_group("terrain_generate");
    let generator = TerrainGenerator::default();

    for size in [20, 50, 100].iter() {
        group.bench_with_input(BenchmarkId::new("cells", size), size, |b, &size| {
            b.iter(|| generator.generate_seeded(black_box(size), black_box(size), 42));
        });
    }

    group.finish();
}

fn benchmark_flock_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("flock_tick");
    let registry = SpeciesRegistry::reef();
    let player = PlayerSample {
        position: Vec3::new(0.0, 0.0, 50.0),
        moving: false,
    };

    for id in ["manta_ray", "clownfish", "sardine"] {
        let Some(species) = registry.get(id) else {
            continue;
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut flock = FlockGroup::new(species.clone(), Vec3::ZERO, FlockConfig::default(), &mut rng);

        group.bench_with_input(BenchmarkId::new("population", species.population), id, |b, _| {
            b.iter(|| {
                flock.advance(black_box(1.0 / 60.0), &player);
            });
        });
    }

    group.finish();
}

fn benchmark_reef_step(c: &mut Criterion) {
    let config = Config::default();
    let mut reef = Reef::new_with_seed(config, 42).unwrap();
    let input = PlayerInput::swim(Vec3::X);

    // Warm up
    for _ in 0..10 {
        reef.step(1.0 / 60.0, &input);
    }

    c.bench_function("reef_step", |b| {
        b.iter(|| reef.step(black_box(1.0 / 60.0), &input));
    });
}

criterion_group!(benches, benchmark_terrain, benchmark_flock_tick, benchmark_reef_step);

criterion_main!(benches);
