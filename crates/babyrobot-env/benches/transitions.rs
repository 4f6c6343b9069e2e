//! Criterion benchmarks for the transition model.
//!
//! Run with:
//!   cargo bench -p babyrobot-env
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use babyrobot_env::{Action, Cell, Grid, GridConfig, PuddleLayout, PuddleSize};

fn make_grid(size: usize) -> Grid {
    let puddles = (0..size)
        .flat_map(|y| (0..size).map(move |x| Cell::new(x, y)))
        .filter(|cell| (cell.x * 7 + cell.y * 3) % 5 == 0)
        .map(|cell| {
            let puddle = if cell.x % 2 == 0 { PuddleSize::Small } else { PuddleSize::Large };
            (cell, puddle)
        })
        .collect();
    let mut config = GridConfig::new(size, size).with_maze(42);
    config.puddles = Some(PuddleLayout::List(puddles));
    Grid::new(&config).expect("benchmark grid")
}

/// One planner-style sweep: enumerate every action from every state.
fn bench_enumeration_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumeration_sweep");

    for size in [4, 8, 16, 32].iter() {
        let grid = make_grid(*size);
        let states = grid.valid_states();
        group.throughput(Throughput::Elements(states.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut total = 0.0;
                for cell in &states {
                    for action in Action::ALL {
                        for outcome in grid.action_probabilities(cell.x, cell.y, action).unwrap() {
                            total += outcome.probability * outcome.reward;
                        }
                    }
                }
                black_box(total)
            });
        });
    }

    group.finish();
}

/// Sampling single transitions from a puddle cell.
fn bench_sampling(c: &mut Criterion) {
    let grid = make_grid(8);
    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("sample_next_state", |b| {
        b.iter(|| {
            black_box(
                grid.sample_next_state(0, 0, Action::East.to_direction(), &mut rng)
                    .unwrap(),
            )
        });
    });
}

criterion_group!(benches, bench_enumeration_sweep, bench_sampling);

criterion_main!(benches);
