//! Value iteration
//!
//! Sweeps the Bellman optimality backup `V(s) = max_a sum p (r + gamma V(s'))`
//! over every state until the values stop changing.

use ndarray::Array2;

use babyrobot_core::Result;
use babyrobot_env::Grid;

use crate::policy::GridPolicy;
use crate::utils::max_abs_diff;

/// Default discount factor
pub const DEFAULT_DISCOUNT_FACTOR: f64 = 0.9;

/// Value iteration over a grid level
#[derive(Debug, Clone)]
pub struct ValueIteration {
    grid: Grid,
    discount_factor: f64,
    values: Array2<f64>,
    sweeps: usize,
}

impl ValueIteration {
    /// Start from zero values with the default discount
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self {
            values: Array2::zeros((grid.height(), grid.width())),
            grid: grid.clone(),
            discount_factor: DEFAULT_DISCOUNT_FACTOR,
            sweeps: 0,
        }
    }

    /// Set the discount applied to future rewards
    #[must_use]
    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    /// Current state values, indexed `[y, x]`
    #[must_use]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Sweeps performed so far
    #[must_use]
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Best one-step lookahead value of `(x, y)`; zero where no move is
    /// possible
    pub fn max_action_value(&self, x: usize, y: usize) -> Result<f64> {
        let mut best: Option<f64> = None;
        for action in self.grid.available_actions(x, y)? {
            let value: f64 = self
                .grid
                .action_probabilities(x, y, action)?
                .iter()
                .map(|o| {
                    o.probability
                        * (o.reward + self.discount_factor * self.values[[o.next.y, o.next.x]])
                })
                .sum();
            best = Some(best.map_or(value, |b| b.max(value)));
        }
        Ok(best.unwrap_or(0.0))
    }

    /// Update every state once and return the largest change
    pub fn state_sweep(&mut self) -> Result<f64> {
        let mut next = Array2::zeros(self.values.dim());
        for cell in self.grid.valid_states() {
            next[[cell.y, cell.x]] = self.max_action_value(cell.x, cell.y)?;
        }

        let delta = max_abs_diff(&self.values, &next);
        self.values = next;
        self.sweeps += 1;
        Ok(delta)
    }

    /// Sweep until the largest change falls below `threshold` or
    /// `max_iterations` sweeps have run. Returns the number of sweeps.
    pub fn run_to_convergence(&mut self, max_iterations: usize, threshold: f64) -> Result<usize> {
        for n in 1..=max_iterations {
            let delta = self.state_sweep()?;
            tracing::trace!(sweep = n, delta, "value iteration sweep");
            if delta < threshold {
                tracing::debug!(sweeps = n, "value iteration converged");
                return Ok(n);
            }
        }
        Ok(max_iterations)
    }

    /// The policy acting greedily with respect to the current values
    pub fn greedy_policy(&self) -> Result<GridPolicy> {
        let mut policy = GridPolicy::new(&self.grid);
        policy.update_policy(&self.grid, &self.values)?;
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use babyrobot_core::{Cell, Direction};
    use babyrobot_env::{GridConfig, PuddleSize};

    #[test]
    fn test_corridor_values_are_discounted() {
        let grid = Grid::new(&GridConfig::new(3, 1)).unwrap();
        let mut planner = ValueIteration::new(&grid);
        let sweeps = planner.run_to_convergence(100, 1e-3).unwrap();

        assert_eq!(sweeps, 3);
        let values = planner.values();
        assert_relative_eq!(values[[0, 2]], 0.0);
        assert_relative_eq!(values[[0, 1]], -1.0);
        assert_relative_eq!(values[[0, 0]], -1.9);
    }

    #[test]
    fn test_first_sweep_delta() {
        let grid = Grid::new(&GridConfig::new(3, 3)).unwrap();
        let mut planner = ValueIteration::new(&grid).with_discount_factor(1.0);
        assert_relative_eq!(planner.state_sweep().unwrap(), 1.0);
        assert_eq!(planner.sweeps(), 1);
    }

    #[test]
    fn test_puddles_are_avoided() {
        let config = GridConfig::new(3, 2)
            .with_end(Cell::new(2, 0))
            .with_puddle(Cell::new(1, 0), PuddleSize::Large);
        let grid = Grid::new(&config).unwrap();
        let mut planner = ValueIteration::new(&grid).with_discount_factor(1.0);
        planner.run_to_convergence(100, 1e-6).unwrap();

        let policy = planner.greedy_policy().unwrap();
        // going round the puddle costs 4, wading in costs at least 5
        assert_eq!(
            policy.state_directions(0, 0).unwrap().single(),
            Some(Direction::South)
        );
        assert_relative_eq!(planner.values()[[0, 0]], -4.0, epsilon = 1e-6);
    }
}
