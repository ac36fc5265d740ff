//! Tactics benchmarks
//!
//! Measures candidate refresh cost and full simulation ticks as the number of
//! agents grows.
//!
//! Run with: cargo bench --bench tactics

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tank_tactics::config::{CandidateConfig, ScoringConfig, TacticsConfig};
use tank_tactics::game::constants::sim::DT;
use tank_tactics::game::spatial::{Layer, Shape, Tag, World};
use tank_tactics::game::state::Simulation;
use tank_tactics::game::systems::candidates::CandidateGenerator;
use tank_tactics::game::systems::scoring::{CandidateScorer, TacticalContext};
use tank_tactics::game::systems::selection::select_best;
use tank_tactics::util::vec2::Vec2;

const ARENA_HALF: f32 = 60.0;

/// Ground plane scattered with walls and rocks
fn create_world(rng: &mut ChaCha8Rng) -> World {
    let mut world = World::default();
    world.insert(
        Shape::Rect {
            min: Vec2::new(-ARENA_HALF, -ARENA_HALF),
            max: Vec2::new(ARENA_HALF, ARENA_HALF),
        },
        Layer::Ground,
        Tag::Untagged,
    );

    for _ in 0..40 {
        let x = rng.gen_range(-ARENA_HALF..ARENA_HALF);
        let z = rng.gen_range(-ARENA_HALF..ARENA_HALF);
        world.insert(
            Shape::Rect {
                min: Vec2::new(x, z),
                max: Vec2::new(x + rng.gen_range(1.0..6.0), z + 1.0),
            },
            Layer::Wall,
            Tag::Untagged,
        );
    }
    for _ in 0..60 {
        world.insert(
            Shape::Circle {
                center: Vec2::new(
                    rng.gen_range(-ARENA_HALF..ARENA_HALF),
                    rng.gen_range(-ARENA_HALF..ARENA_HALF),
                ),
                radius: rng.gen_range(0.5..2.0),
            },
            Layer::Obstacle,
            Tag::Untagged,
        );
    }
    world
}

fn create_simulation(enemies: usize, turrets: usize) -> Simulation {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let world = create_world(&mut rng);
    let mut sim = Simulation::new(world, TacticsConfig::default(), 99);
    sim.set_player(Vec2::ZERO, Vec2::new(1.5, 0.5));

    let area = ARENA_HALF - 5.0;
    for _ in 0..enemies {
        let position = Vec2::new(rng.gen_range(-area..area), rng.gen_range(-area..area));
        sim.spawn_enemy(position, rng.gen_range(0.0..360.0));
    }
    for _ in 0..turrets {
        let position = Vec2::new(rng.gen_range(-area..area), rng.gen_range(-area..area));
        sim.spawn_turret(position, rng.gen_range(0.0..360.0));
    }
    sim
}

/// Generate, score and select one candidate batch
fn bench_candidate_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate_refresh");
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let world = create_world(&mut rng);
    let scorer = CandidateScorer::new(ScoringConfig::default());

    for count in [8, 12, 24, 48] {
        let generator = CandidateGenerator::new(CandidateConfig {
            count,
            ..CandidateConfig::default()
        });
        let context = TacticalContext {
            agent_position: Vec2::new(-8.0, -8.0),
            agent_heading: 45.0,
            agent_collider: None,
            target: Some(Vec2::new(2.0, 3.0)),
            last_known: None,
        };

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("ring", count), &count, |b, _| {
            b.iter(|| {
                let mut candidates = generator.generate(&world, Vec2::new(2.0, 3.0));
                scorer.score_all(&world, &mut candidates, &context);
                black_box(select_best(&candidates, &mut rng).map(|c| c.position))
            });
        });
    }

    group.finish();
}

/// Full simulation step with mixed enemies and turrets
fn bench_simulation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");
    group.sample_size(30);

    for agents in [10, 50, 100, 250] {
        let mut sim = create_simulation(agents, agents / 5);

        group.throughput(Throughput::Elements(agents as u64));
        group.bench_with_input(BenchmarkId::new("agents", agents), &agents, |b, _| {
            b.iter(|| black_box(sim.step(DT).shots_fired));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_candidate_refresh, bench_simulation_step);
criterion_main!(benches);
