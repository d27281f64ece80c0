use std::collections::HashSet;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use guess_core::{session_rng, ChallengeGenerator, ComparisonEngine};
use guess_schema::{Entity, EntityId};

const GENRES: [&str; 6] = ["Action", "Comedy", "Drama", "Fantasy", "Romance", "Sci-Fi"];
const STUDIOS: [&str; 4] = ["Bones", "Madhouse", "Sunrise", "Wit Studio"];

fn synthetic_catalog(size: u64) -> Vec<Entity> {
    (0..size)
        .map(|id| {
            let mut entity = Entity::new(id, format!("Series {id}"));
            entity.score = Some(5.0 + (id % 50) as f32 / 10.0);
            entity.genres = vec![
                GENRES[(id % 6) as usize].to_string(),
                GENRES[((id / 6) % 6) as usize].to_string(),
            ];
            entity.studios = vec![STUDIOS[(id % 4) as usize].to_string()];
            entity.tags = vec![format!("tag-{}", id % 12)];
            entity.source = Some(if id % 3 == 0 { "Manga" } else { "Original" }.to_string());
            entity.year = Some(1990 + (id % 35) as i32);
            entity.episodes = Some(1 + (id % 60) as u32);
            entity
        })
        .collect()
}

fn bench_challenge_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("challenge");
    let generator = ChallengeGenerator::default();

    for size in [100u64, 1_000, 5_000] {
        let catalog = synthetic_catalog(size);
        let used: HashSet<EntityId> = catalog.iter().take(size as usize / 2).map(|e| e.id).collect();
        group.bench_with_input(BenchmarkId::new("solvable", size), &catalog, |b, catalog| {
            let mut rng = session_rng(Some(42));
            b.iter(|| generator.generate_for_pool(&catalog[0], catalog, &used, &mut rng));
        });
    }

    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let catalog = synthetic_catalog(256);
    let engine = ComparisonEngine::default();
    c.bench_function("compare/catalog_sweep", |b| {
        b.iter(|| {
            catalog
                .iter()
                .map(|guess| engine.compare(&catalog[17], guess).genre_overlap.count())
                .sum::<usize>()
        })
    });
}

criterion_group!(engine_benches, bench_challenge_generation, bench_compare);
criterion_main!(engine_benches);
