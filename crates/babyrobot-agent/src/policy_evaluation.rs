//! Iterative policy evaluation
//!
//! Each iteration is a synchronous sweep: every state's new value is
//! computed from the values of the previous sweep,
//! `V(s) = sum_a pi(a|s) sum_s' p(s'|s,a) (r + gamma V(s'))`. Base areas and
//! the terminal cell keep a value of zero.

use ndarray::Array2;

use babyrobot_core::{Action, Result};
use babyrobot_env::Grid;

use crate::policy::GridPolicy;
use crate::utils::max_abs_diff;

/// Default number of sweeps for [`PolicyEvaluation::run_to_convergence`]
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
/// Default convergence threshold on the largest change in a sweep
pub const DEFAULT_THRESHOLD: f64 = 1e-3;

/// Evaluates a [`GridPolicy`] on a grid level
#[derive(Debug, Clone)]
pub struct PolicyEvaluation {
    grid: Grid,
    policy: GridPolicy,
    discount_factor: f64,
    values: Array2<f64>,
    iterations: usize,
}

impl PolicyEvaluation {
    /// Evaluate `policy` on `grid` without discounting
    #[must_use]
    pub fn new(grid: &Grid, policy: GridPolicy) -> Self {
        Self {
            values: Array2::zeros((grid.height(), grid.width())),
            grid: grid.clone(),
            policy,
            discount_factor: 1.0,
            iterations: 0,
        }
    }

    /// Set the discount applied to future rewards
    #[must_use]
    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    /// Zero the values and the iteration count
    pub fn reset(&mut self) {
        self.values.fill(0.0);
        self.iterations = 0;
    }

    /// Current state values, indexed `[y, x]`
    #[must_use]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// The policy being evaluated
    #[must_use]
    pub fn policy(&self) -> &GridPolicy {
        &self.policy
    }

    /// Evaluate a different policy, starting from the current values
    pub fn set_policy(&mut self, policy: GridPolicy) {
        self.policy = policy;
        self.iterations = 0;
    }

    /// Change the discount factor
    pub fn set_discount_factor(&mut self, discount_factor: f64) {
        self.discount_factor = discount_factor;
    }

    /// Sweeps performed since the last reset or policy change
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Run one sweep over every state and return the largest change
    pub fn do_iteration(&mut self) -> Result<f64> {
        let mut next = Array2::zeros(self.values.dim());
        for cell in self.grid.valid_states() {
            next[[cell.y, cell.x]] = self.policy_state_value(cell.x, cell.y)?;
        }

        let delta = max_abs_diff(&self.values, &next);
        self.values = next;
        self.iterations += 1;
        Ok(delta)
    }

    /// Sweep until the largest change falls below `threshold` or
    /// `max_iterations` sweeps have run. Returns the number of sweeps.
    pub fn run_to_convergence(&mut self, max_iterations: usize, threshold: f64) -> Result<usize> {
        for n in 1..=max_iterations {
            let delta = self.do_iteration()?;
            if delta < threshold {
                tracing::debug!(sweeps = n, delta, "policy evaluation converged");
                return Ok(n);
            }
        }
        Ok(max_iterations)
    }

    /// Make the policy greedy with respect to the current values. Returns
    /// whether the policy changed.
    pub fn improve_policy(&mut self) -> Result<bool> {
        let changed = self.policy.update_policy(&self.grid, &self.values)?;
        if changed {
            self.iterations = 0;
        }
        Ok(changed)
    }

    fn action_value(&self, x: usize, y: usize, action: Action) -> Result<f64> {
        Ok(self
            .grid
            .action_probabilities(x, y, action)?
            .iter()
            .map(|o| {
                o.probability * (o.reward + self.discount_factor * self.values[[o.next.y, o.next.x]])
            })
            .sum())
    }

    fn policy_state_value(&self, x: usize, y: usize) -> Result<f64> {
        let mut value = 0.0;
        for (action, probability) in self.policy.action_probabilities(x, y)? {
            value += probability * self.action_value(x, y, action)?;
        }
        Ok(value)
    }
}
