//! Monte Carlo prediction
//!
//! Episodes are played through a [`BabyRobotEnv`] under a policy, the
//! rewards of each episode are turned into returns by working backwards
//! from its end, and an [`Estimator`] folds those returns into running
//! means. Estimates are either state values (first-visit or every-visit)
//! or first-visit action values.

use ndarray::{Array2, Array3, ArrayViewD};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use babyrobot_core::{Action, Cell, Environment, Policy, Result, Trajectory, Transition};
use babyrobot_env::{BabyRobotEnv, Grid};

use crate::utils::{incremental_mean, DeltaType};

/// Which visits to a state contribute to its estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitRule {
    /// Only the first visit in each episode
    FirstVisit,
    /// Every visit
    EveryVisit,
}

/// Folds the returns of finished episodes into value estimates
pub trait Estimator {
    /// Update the estimates with one episode and the return that followed
    /// each of its transitions
    fn update(&mut self, trajectory: &Trajectory<Cell>, returns: &[f64]);

    /// The current estimates
    fn estimates(&self) -> ArrayViewD<'_, f64>;
}

/// State-value estimates, indexed `[y, x]`
#[derive(Debug, Clone)]
pub struct StateValues {
    rule: VisitRule,
    values: Array2<f64>,
    visits: Array2<u32>,
}

impl StateValues {
    /// Estimate from the first visit to each state in an episode
    #[must_use]
    pub fn first_visit(grid: &Grid) -> Self {
        Self::new(grid, VisitRule::FirstVisit)
    }

    /// Estimate from every visit to each state
    #[must_use]
    pub fn every_visit(grid: &Grid) -> Self {
        Self::new(grid, VisitRule::EveryVisit)
    }

    fn new(grid: &Grid, rule: VisitRule) -> Self {
        let dim = (grid.height(), grid.width());
        Self {
            rule,
            values: Array2::zeros(dim),
            visits: Array2::zeros(dim),
        }
    }

    /// Mean return from each state
    #[must_use]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of returns averaged into each state
    #[must_use]
    pub fn visits(&self) -> &Array2<u32> {
        &self.visits
    }
}

impl Estimator for StateValues {
    fn update(&mut self, trajectory: &Trajectory<Cell>, returns: &[f64]) {
        let mut seen = Array2::from_elem(self.values.dim(), false);
        for (transition, &g) in trajectory.transitions.iter().zip(returns) {
            let index = [transition.state.y, transition.state.x];
            if self.rule == VisitRule::FirstVisit {
                if seen[index] {
                    continue;
                }
                seen[index] = true;
            }
            self.visits[index] += 1;
            self.values[index] = incremental_mean(self.values[index], self.visits[index], g);
        }
    }

    fn estimates(&self) -> ArrayViewD<'_, f64> {
        self.values.view().into_dyn()
    }
}

/// First-visit action-value estimates, indexed `[y, x, action]`
#[derive(Debug, Clone)]
pub struct ActionValues {
    values: Array3<f64>,
    visits: Array3<u32>,
}

impl ActionValues {
    /// Zeroed estimates for every cell and action of `grid`
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        let dim = (grid.height(), grid.width(), Action::COUNT);
        Self {
            values: Array3::zeros(dim),
            visits: Array3::zeros(dim),
        }
    }

    /// Mean return after taking each action in each state
    #[must_use]
    pub fn values(&self) -> &Array3<f64> {
        &self.values
    }

    /// Number of returns averaged into each state-action pair
    #[must_use]
    pub fn visits(&self) -> &Array3<u32> {
        &self.visits
    }
}

impl Estimator for ActionValues {
    fn update(&mut self, trajectory: &Trajectory<Cell>, returns: &[f64]) {
        let mut seen = Array3::from_elem(self.values.dim(), false);
        for (transition, &g) in trajectory.transitions.iter().zip(returns) {
            let index = [
                transition.state.y,
                transition.state.x,
                transition.action.index(),
            ];
            if seen[index] {
                continue;
            }
            seen[index] = true;
            self.visits[index] += 1;
            self.values[index] = incremental_mean(self.values[index], self.visits[index], g);
        }
    }

    fn estimates(&self) -> ArrayViewD<'_, f64> {
        self.values.view().into_dyn()
    }
}

/// Monte Carlo run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Start successive episodes from successive valid states instead of
    /// always from the level's start
    pub exploring_starts: bool,
    /// Discount applied when converting rewards to returns
    pub discount_factor: f64,
    /// Episodes longer than this are cut short
    pub max_steps: usize,
    /// Record a delta every this many episodes; zero records none
    pub delta_interval: usize,
    /// How the recorded deltas summarise the change in the estimates
    pub delta_type: DeltaType,
    /// Seed for action selection
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            exploring_starts: false,
            discount_factor: 1.0,
            max_steps: 1000,
            delta_interval: 10,
            delta_type: DeltaType::Max,
            seed: None,
        }
    }
}

/// Plays episodes under a policy and feeds them to an estimator
pub struct MonteCarlo<P, S> {
    env: BabyRobotEnv,
    policy: P,
    estimator: S,
    config: MonteCarloConfig,
    last_start: Option<Cell>,
    rng: StdRng,
}

impl<P: Policy> MonteCarlo<P, StateValues> {
    /// First-visit state-value prediction
    #[must_use]
    pub fn first_visit(env: BabyRobotEnv, policy: P, config: MonteCarloConfig) -> Self {
        let estimator = StateValues::first_visit(env.grid());
        Self::new(env, policy, estimator, config)
    }

    /// Every-visit state-value prediction
    #[must_use]
    pub fn every_visit(env: BabyRobotEnv, policy: P, config: MonteCarloConfig) -> Self {
        let estimator = StateValues::every_visit(env.grid());
        Self::new(env, policy, estimator, config)
    }
}

impl<P: Policy> MonteCarlo<P, ActionValues> {
    /// First-visit action-value prediction
    #[must_use]
    pub fn action_values(env: BabyRobotEnv, policy: P, config: MonteCarloConfig) -> Self {
        let estimator = ActionValues::new(env.grid());
        Self::new(env, policy, estimator, config)
    }
}

impl<P: Policy, S: Estimator> MonteCarlo<P, S> {
    /// Combine an environment, a policy and an estimator
    pub fn new(env: BabyRobotEnv, policy: P, estimator: S, config: MonteCarloConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            env,
            policy,
            estimator,
            config,
            last_start: None,
            rng,
        }
    }

    /// The environment episodes are played in
    #[must_use]
    pub fn env(&self) -> &BabyRobotEnv {
        &self.env
    }

    /// The policy being followed
    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Swap in a different policy, keeping the estimates
    pub fn set_policy(&mut self, policy: P) {
        self.policy = policy;
    }

    /// The estimates gathered so far
    #[must_use]
    pub fn estimator(&self) -> &S {
        &self.estimator
    }

    /// Where the next episode begins. Without exploring starts this is
    /// always the level's start; with them, each call moves on to the next
    /// valid state in row-major order, wrapping back to the start.
    pub fn next_start_state(&mut self) -> Cell {
        let grid = self.env.grid();
        let start = grid.start();
        if !self.config.exploring_starts {
            self.last_start = Some(start);
            return start;
        }

        let width = grid.width();
        let from = self
            .last_start
            .map_or(start.index(width), |last| last.index(width) + 1);
        let valid = grid.valid_states();
        let next = valid
            .iter()
            .find(|cell| cell.index(width) >= from)
            .or_else(|| valid.iter().find(|cell| cell.index(width) >= start.index(width)))
            .or_else(|| valid.first())
            .copied()
            .unwrap_or(start);

        self.last_start = Some(next);
        next
    }

    /// Play one episode from the environment's initial position
    pub async fn single_episode(&mut self) -> Result<Trajectory<Cell>> {
        self.env.reset().await?;
        let mut trajectory = Trajectory::new();
        let mut state = self.env.position();

        while !self.env.is_done() {
            if trajectory.len() >= self.config.max_steps {
                tracing::debug!(steps = trajectory.len(), position = %state, "episode cut short");
                break;
            }

            let available = self.env.available_actions();
            let action = self.policy.select(state, &available, &mut self.rng);
            let step = self.env.step(action).await?;
            let next = self.env.position();
            trajectory.push(Transition {
                state,
                action,
                reward: step.reward,
                next_state: next,
                done: step.done,
            });
            state = next;
        }

        Ok(trajectory)
    }

    /// Play `max_episodes` episodes, updating the estimates after each.
    /// Returns the change in the estimates recorded every
    /// `delta_interval` episodes.
    pub async fn run(&mut self, max_episodes: usize) -> Result<Vec<f64>> {
        let mut deltas = Vec::new();
        for episode in 0..max_episodes {
            let record =
                self.config.delta_interval > 0 && episode % self.config.delta_interval == 0;
            let before = record.then(|| self.estimator.estimates().to_owned());

            let start = self.next_start_state();
            self.env.set_initial_position(start)?;
            let trajectory = self.single_episode().await?;
            let returns = trajectory.returns(self.config.discount_factor);
            self.estimator.update(&trajectory, &returns);

            if let Some(before) = before {
                let after = self.estimator.estimates().to_owned();
                let delta = self.config.delta_type.measure(&before, &after);
                tracing::debug!(episode, delta, "monte carlo estimates changed");
                deltas.push(delta);
            }
        }

        tracing::info!(episodes = max_episodes, "monte carlo run finished");
        Ok(deltas)
    }
}
