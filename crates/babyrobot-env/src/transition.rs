//! Transition model
//!
//! Two views of the same dynamics. [`Grid::action_probabilities`] lists
//! every outcome of an action with its probability, for planners.
//! [`Grid::sample_next_state`] draws one outcome from that distribution, for
//! episodes.
//!
//! A move from a dry cell always reaches its target. From a puddle it
//! reaches the target with the puddle's success probability and otherwise
//! slips, with equal probability, to one of the other directions open at
//! that cell. A move across a declared barrier that fails bounces the robot
//! the opposite way instead (or leaves it in place when that way is
//! closed) and costs an extra [`BOUNCE_PENALTY`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use babyrobot_core::{Action, Cell, Direction, DirectionSet, Result};

use crate::grid::Grid;

/// Extra reward added when a failed move bounces off a barrier
pub const BOUNCE_PENALTY: f64 = -1.0;

/// One possible result of an action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Probability of this result
    pub probability: f64,
    /// Cell the robot ends up in
    pub next: Cell,
    /// Reward received
    pub reward: f64,
}

/// A realized transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Cell the robot ends up in
    pub next: Cell,
    /// Reward received
    pub reward: f64,
    /// Whether the robot went where it intended to
    pub target_reached: bool,
}

impl Grid {
    /// Probability that a move from `(x, y)` toward `direction` reaches
    /// its target, and whether a barrier lies across that move
    pub fn transition_probability(
        &self,
        x: usize,
        y: usize,
        direction: Direction,
    ) -> Result<(f64, bool)> {
        let cell = self.cell(x, y)?;
        Ok(self.success(cell, direction))
    }

    /// Every outcome of taking `action` at `(x, y)`.
    ///
    /// The intended outcome comes first when it is possible; slips follow
    /// in N, S, E, W order. Probabilities sum to one.
    pub fn action_probabilities(&self, x: usize, y: usize, action: Action) -> Result<Vec<Outcome>> {
        let cell = self.cell(x, y)?;
        let allowed = self.directions_at(cell);

        let Some(direction) = action.direction().filter(|d| allowed.contains(*d)) else {
            return Ok(vec![Outcome {
                probability: 1.0,
                next: cell,
                reward: self.stay_reward(cell),
            }]);
        };

        let (p, barrier) = self.success(cell, direction);
        let mut outcomes = Vec::with_capacity(4);

        if p > 0.0 {
            let next = self.land(cell, direction);
            outcomes.push(Outcome {
                probability: p,
                next,
                reward: self.rewards.get(next),
            });
        }
        if p >= 1.0 {
            return Ok(outcomes);
        }

        let residual = 1.0 - p;
        let others = allowed.without(direction);

        if barrier {
            let (next, reward) = self.bounce(cell, direction, others);
            outcomes.push(Outcome {
                probability: residual,
                next,
                reward,
            });
        } else if others.is_empty() {
            outcomes.push(Outcome {
                probability: residual,
                next: cell,
                reward: self.rewards.get(cell),
            });
        } else {
            #[allow(clippy::cast_precision_loss)]
            let share = residual / others.len() as f64;
            outcomes.extend(others.iter().map(|other| {
                let next = self.land(cell, other);
                Outcome {
                    probability: share,
                    next,
                    reward: self.rewards.get(next),
                }
            }));
        }

        Ok(outcomes)
    }

    /// Draw the result of trying to move from `(x, y)` toward `direction`.
    ///
    /// `direction` should name one direction, or none to stay. Requests
    /// that match no open direction, or several, leave the robot in place
    /// without consuming randomness. Otherwise one uniform `f64` is drawn,
    /// plus one index draw when a slip has two or more directions to
    /// choose from.
    pub fn sample_next_state<R: Rng + ?Sized>(
        &self,
        x: usize,
        y: usize,
        direction: DirectionSet,
        rng: &mut R,
    ) -> Result<Sample> {
        let cell = self.cell(x, y)?;
        let allowed = self.directions_at(cell);

        if direction.is_empty() || allowed.is_empty() {
            return Ok(self.stay(cell, direction.is_empty()));
        }
        let Some(chosen) = (allowed & direction).single() else {
            return Ok(self.stay(cell, false));
        };

        let others = allowed.without(chosen);
        let (p, barrier) = self.success(cell, chosen);

        let sample = if rng.gen::<f64>() < p {
            let next = self.land(cell, chosen);
            Sample {
                next,
                reward: self.rewards.get(next),
                target_reached: true,
            }
        } else {
            let (next, reward) = if barrier {
                self.bounce(cell, chosen, others)
            } else if others.is_empty() {
                (cell, self.rewards.get(cell))
            } else {
                let slip = if others.len() == 1 {
                    others.single()
                } else {
                    others.iter().nth(rng.gen_range(0..others.len()))
                };
                let next = slip.map_or(cell, |slip| self.land(cell, slip));
                (next, self.rewards.get(next))
            };
            Sample {
                next,
                reward,
                target_reached: false,
            }
        };

        tracing::trace!(
            from = %cell,
            to = %sample.next,
            reward = sample.reward,
            target_reached = sample.target_reached,
            "sampled transition"
        );
        Ok(sample)
    }

    fn success(&self, cell: Cell, direction: Direction) -> (f64, bool) {
        let p = self.puddles.success_probability(cell);
        match self.barriers.get(cell, direction) {
            Some(barrier) => (p * barrier, true),
            None => (p, false),
        }
    }

    // Staying put in the terminal cell is free.
    fn stay_reward(&self, cell: Cell) -> f64 {
        if cell == self.end() {
            0.0
        } else {
            self.rewards.get(cell)
        }
    }

    fn stay(&self, cell: Cell, target_reached: bool) -> Sample {
        Sample {
            next: cell,
            reward: self.stay_reward(cell),
            target_reached,
        }
    }

    fn land(&self, cell: Cell, direction: Direction) -> Cell {
        self.walls.neighbour(cell, direction).unwrap_or(cell)
    }

    fn bounce(&self, cell: Cell, direction: Direction, others: DirectionSet) -> (Cell, f64) {
        let back = direction.opposite();
        let next = if others.contains(back) {
            self.land(cell, back)
        } else {
            cell
        };
        (next, self.rewards.get(next) + BOUNCE_PENALTY)
    }
}
