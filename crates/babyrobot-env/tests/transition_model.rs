//! Properties of the grid-world transition model

use std::collections::VecDeque;

use approx::assert_relative_eq;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use babyrobot_env::{
    Action, BarrierDecl, BaseArea, Cell, Direction, DirectionSet, Grid, GridArea, GridConfig,
    PuddleLayout, PuddleSize, Rect,
};

fn hazard_level() -> GridConfig {
    let mut config = GridConfig::new(5, 4)
        .with_puddle(Cell::new(1, 1), PuddleSize::Large)
        .with_puddle(Cell::new(2, 1), PuddleSize::Small)
        .with_puddle(Cell::new(3, 2), PuddleSize::Large)
        .with_puddle(Cell::new(0, 3), PuddleSize::Small)
        .with_wall(Cell::new(3, 2), Direction::North);
    config.barriers.push(BarrierDecl(Cell::new(2, 1), Direction::East, 0.5));
    config.barriers.push(BarrierDecl(Cell::new(0, 3), Direction::East, 0.8));
    config.base_areas.push(BaseArea::Area(Rect::new(4, 0, 1, 1)));
    config
        .grid_areas
        .push(GridArea::Rewarded(Rect::new(2, 2, 2, 2), Some("orange".into()), Some(-3.0)));
    config
}

#[test]
fn boundary_example() {
    let grid = Grid::new(&GridConfig::default()).unwrap();

    let outcomes = grid.action_probabilities(0, 0, Action::East).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_relative_eq!(outcomes[0].probability, 1.0);
    assert_eq!(outcomes[0].next, Cell::new(1, 0));
    assert_relative_eq!(outcomes[0].reward, -1.0);

    let mut rng = StdRng::seed_from_u64(5);
    let sample = grid
        .sample_next_state(0, 0, Action::North.to_direction(), &mut rng)
        .unwrap();
    assert_eq!(sample.next, Cell::new(0, 0));
    assert_relative_eq!(sample.reward, -1.0);
    assert!(!sample.target_reached);
}

#[test]
fn hazard_example() {
    let config = GridConfig::default()
        .with_puddle(Cell::new(1, 1), PuddleSize::Large)
        .with_wall(Cell::new(1, 1), Direction::North)
        .with_wall(Cell::new(1, 1), Direction::West);
    let grid = Grid::new(&config).unwrap();

    let outcomes = grid.action_probabilities(1, 1, Action::East).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_relative_eq!(outcomes[0].probability, 0.4);
    assert_eq!(outcomes[0].next, Cell::new(2, 1));
    assert_relative_eq!(outcomes[0].reward, grid.reward(2, 1).unwrap());
    assert_relative_eq!(outcomes[1].probability, 0.6);
    assert_eq!(outcomes[1].next, Cell::new(1, 2));
    assert_relative_eq!(outcomes[1].reward, grid.reward(1, 2).unwrap());
}

#[test]
fn stay_example() {
    let grid = Grid::new(&hazard_level()).unwrap();
    for cell in grid.valid_states() {
        let outcomes = grid.action_probabilities(cell.x, cell.y, Action::Stay).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_relative_eq!(outcomes[0].probability, 1.0);
        assert_eq!(outcomes[0].next, cell);
        assert_relative_eq!(outcomes[0].reward, grid.reward(cell.x, cell.y).unwrap());
    }

    // The exit is not a valid state; staying there is free rather than
    // costing reward(end). See also `test_terminal_stay_is_free`.
    let end = grid.end();
    let outcomes = grid.action_probabilities(end.x, end.y, Action::Stay).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].next, end);
    assert_relative_eq!(outcomes[0].reward, 0.0);
}

#[test]
fn terminal_absorption() {
    let grid = Grid::new(&hazard_level()).unwrap();
    let end = grid.end();
    assert!(grid.available_actions(end.x, end.y).unwrap().is_empty());
    assert!(!grid.is_valid_state(end.x, end.y));
}

#[test]
fn reward_array_matches_pointwise_rewards() {
    let grid = Grid::new(&hazard_level()).unwrap();
    let rewards = grid.reward_array();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            assert_relative_eq!(rewards[[y, x]], grid.reward(x, y).unwrap());
        }
    }
    assert_relative_eq!(grid.reward(4, 0).unwrap(), 0.0);
    assert_relative_eq!(grid.reward(3, 2).unwrap(), -4.0);
    assert_relative_eq!(grid.reward(2, 3).unwrap(), -3.0);
}

#[test]
fn maze_spans_every_open_cell() {
    let mut config = GridConfig::new(7, 6).with_maze(2024);
    config.base_areas.push(BaseArea::Styled(
        Rect::new(5, 0, 2, 2),
        serde_json::json!("water"),
    ));
    let grid = Grid::new(&config).unwrap();
    let walls = grid.walls();

    let mut seen = vec![false; 7 * 6];
    let mut queue = VecDeque::from([grid.start()]);
    seen[grid.start().index(7)] = true;
    let mut passages = 0;
    while let Some(cell) = queue.pop_front() {
        for direction in walls.open_directions(cell).iter() {
            let next = walls.neighbour(cell, direction).unwrap();
            if !seen[next.index(7)] {
                seen[next.index(7)] = true;
                passages += 1;
                queue.push_back(next);
            }
        }
    }

    let open_cells = (0..6)
        .flat_map(|y| (0..7).map(move |x| (x, y)))
        .filter(|&(x, y)| !grid.is_base_area(x, y))
        .count();
    for y in 0..6 {
        for x in 0..7 {
            assert_eq!(seen[y * 7 + x], !grid.is_base_area(x, y), "cell ({x},{y})");
        }
    }
    // a tree over the open cells, so no passage closes a cycle
    assert_eq!(passages, open_cells - 1);
    let total_open: usize = (0..6)
        .flat_map(|y| (0..7).map(move |x| Cell::new(x, y)))
        .map(|cell| walls.open_directions(cell).len())
        .sum();
    assert_eq!(total_open / 2, open_cells - 1);
}

#[test]
fn sampler_matches_enumerated_distribution() {
    const SAMPLES: usize = 20_000;

    let grid = Grid::new(&hazard_level()).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let mut checked = 0;

    for cell in grid.valid_states() {
        for action in Action::ALL {
            let outcomes = grid.action_probabilities(cell.x, cell.y, action).unwrap();
            let mut counts = vec![0usize; outcomes.len()];

            for _ in 0..SAMPLES {
                let sample = grid
                    .sample_next_state(cell.x, cell.y, action.to_direction(), &mut rng)
                    .unwrap();
                let index = outcomes
                    .iter()
                    .position(|o| o.next == sample.next && (o.reward - sample.reward).abs() < 1e-9)
                    .unwrap_or_else(|| {
                        panic!("{sample:?} is not among {outcomes:?} for {action} at {cell}")
                    });
                counts[index] += 1;
            }

            if outcomes.len() < 2 {
                continue;
            }

            #[allow(clippy::cast_precision_loss)]
            let statistic: f64 = outcomes
                .iter()
                .zip(&counts)
                .map(|(outcome, &count)| {
                    let expected = outcome.probability * SAMPLES as f64;
                    (count as f64 - expected).powi(2) / expected
                })
                .sum();
            #[allow(clippy::cast_precision_loss)]
            let dof = (outcomes.len() - 1) as f64;
            let critical = ChiSquared::new(dof).unwrap().inverse_cdf(0.9999);
            assert!(
                statistic < critical,
                "{action} at {cell}: chi-square {statistic} >= {critical} for {outcomes:?} / {counts:?}"
            );
            checked += 1;
        }
    }

    assert!(checked >= 10, "only {checked} stochastic transitions checked");
}

#[test]
fn invalid_direction_bits_are_rejected() {
    assert!(DirectionSet::from_bits(16).is_err());
    assert!(Action::try_from(5usize).is_err());
}

fn level_strategy() -> impl Strategy<Value = GridConfig> {
    (2usize..7, 2usize..7).prop_flat_map(|(width, height)| {
        let cell = (0..width, 0..height).prop_map(|(x, y)| Cell::new(x, y));
        let direction = prop::sample::select(Direction::ALL.to_vec());
        let size = prop::sample::select(vec![PuddleSize::Small, PuddleSize::Large]);
        (
            prop::collection::vec((cell.clone(), size), 0..8),
            prop::collection::vec((cell.clone(), direction.clone(), 1usize..3), 0..6),
            prop::collection::vec((cell, direction, 0.0f64..=1.0), 0..4),
            any::<bool>(),
            any::<u64>(),
            0.0f64..=1.0,
        )
            .prop_map(move |(puddles, walls, barriers, add_maze, maze_seed, small_prob)| {
                let mut config = GridConfig::new(width, height);
                config.puddles = Some(PuddleLayout::List(puddles));
                config.walls = walls
                    .into_iter()
                    .map(|(cell, direction, run)| babyrobot_env::WallToggle::Run(cell, direction, run))
                    .collect();
                config.barriers = barriers
                    .into_iter()
                    .map(|(cell, direction, p)| BarrierDecl(cell, direction, p))
                    .collect();
                config.add_maze = add_maze;
                config.maze_seed = maze_seed;
                config.puddle_props.small_prob = small_prob;
                config
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn probabilities_are_conserved(config in level_strategy()) {
        let grid = Grid::new(&config).unwrap();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                for action in Action::ALL {
                    let outcomes = grid.action_probabilities(x, y, action).unwrap();
                    let total: f64 = outcomes.iter().map(|o| o.probability).sum();
                    prop_assert!((total - 1.0).abs() < 1e-9, "{action} at ({x},{y}): {outcomes:?}");
                    for outcome in &outcomes {
                        prop_assert!(outcome.probability > 0.0);
                        prop_assert!(grid.cell(outcome.next.x, outcome.next.y).is_ok());
                        prop_assert!(!grid.is_base_area(outcome.next.x, outcome.next.y));
                    }
                }
            }
        }
    }

    #[test]
    fn walls_stay_symmetric(config in level_strategy()) {
        let grid = Grid::new(&config).unwrap();
        let walls = grid.walls();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let cell = Cell::new(x, y);
                for direction in Direction::ALL {
                    if let Some(next) = walls.neighbour(cell, direction) {
                        prop_assert_eq!(
                            walls.has_wall(cell, direction),
                            walls.has_wall(next, direction.opposite())
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn sampled_outcomes_are_enumerated(config in level_strategy(), seed in any::<u64>()) {
        let grid = Grid::new(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        for cell in grid.valid_states() {
            for action in Action::ALL {
                let outcomes = grid.action_probabilities(cell.x, cell.y, action).unwrap();
                let sample = grid
                    .sample_next_state(cell.x, cell.y, action.to_direction(), &mut rng)
                    .unwrap();
                prop_assert!(outcomes
                    .iter()
                    .any(|o| o.next == sample.next && (o.reward - sample.reward).abs() < 1e-9));
            }
        }
    }
}
