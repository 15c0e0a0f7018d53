//! Criterion benchmarks for the game simulations and the arcade frame loop.
//!
//! Run with:
//!   cargo bench -p arcade
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use arcade::prelude::*;
use arcade_games::flappy::FlappySim;
use arcade_games::snake::{SnakeParams, SnakeSim};

/// Snake steps on boards of growing size, circling so it never dies.
fn bench_snake_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("snake_step");

    for grid in [15, 31, 63].iter() {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(grid), grid, |b, &grid| {
            let params = SnakeParams {
                grid,
                start: (grid / 2, grid / 2),
                ..SnakeParams::default()
            };
            let mut sim = SnakeSim::with_params(42, params.clone());
            let turns = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];
            let mut n = 0usize;
            b.iter(|| {
                sim.steer(turns[(n / 2) % 4]);
                n += 1;
                if sim.step().is_terminal() {
                    sim = SnakeSim::with_params(42, params.clone());
                }
                black_box(sim.head());
            });
        });
    }

    group.finish();
}

fn bench_flappy_step(c: &mut Criterion) {
    c.bench_function("flappy_step", |b| {
        let mut sim = FlappySim::new(42);
        b.iter(|| {
            if sim.bird_velocity() > 4.0 {
                sim.flap();
            }
            if sim.step() == arcade_games::flappy::FlappyEvent::Crashed {
                sim.reset();
            }
            black_box(sim.score());
        });
    });
}

/// One 16 ms host frame with a running game and all triggers armed.
fn bench_arcade_frame(c: &mut Criterion) {
    c.bench_function("arcade_frame", |b| {
        let mut progress = Progress::in_memory();
        progress.record(UnlockKind::Game, "flappy");
        let config = ArcadeConfig {
            seed: Some(42),
            ..ArcadeConfig::default()
        };
        let mut arcade = Arcade::new(config, progress, 0);
        let _ = arcade.open_game(GameId::Flappy);
        b.iter(|| {
            if arcade.phase() != Some(Phase::Running) {
                let _ = arcade.command(SessionCommand::Reset);
                arcade.handle(Input::Key(Key::Space));
            }
            black_box(arcade.advance(16));
        });
    });
}

fn bench_snapshot(c: &mut Criterion) {
    c.bench_function("arcade_snapshot_json", |b| {
        let mut progress = Progress::in_memory();
        progress.record(UnlockKind::Game, "memory");
        let mut arcade = Arcade::new(ArcadeConfig::default(), progress, 42);
        let _ = arcade.open_game(GameId::Memory);
        b.iter(|| {
            let snap = arcade.snapshot();
            black_box(serde_json::to_string(&snap).unwrap_or_default());
        });
    });
}

criterion_group!(
    benches,
    bench_snake_step,
    bench_flappy_step,
    bench_arcade_frame,
    bench_snapshot
);
criterion_main!(benches);
