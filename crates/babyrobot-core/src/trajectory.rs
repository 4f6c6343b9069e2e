//! Episode trajectories

use serde::{Deserialize, Serialize};

use crate::{Action, Reward};

/// Single transition in a trajectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition<S> {
    /// State the action was taken in
    pub state: S,
    /// Action taken
    pub action: Action,
    /// Reward received
    pub reward: Reward,
    /// State reached
    pub next_state: S,
    /// Whether episode ended
    pub done: bool,
}

/// Complete trajectory of an episode
#[derive(Debug, Clone)]
pub struct Trajectory<S> {
    /// Sequence of transitions
    pub transitions: Vec<Transition<S>>,
    /// Total reward
    pub total_reward: f64,
}

impl<S> Trajectory<S> {
    /// Create a new empty trajectory
    #[must_use]
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
            total_reward: 0.0,
        }
    }

    /// Add a transition to the trajectory
    pub fn push(&mut self, transition: Transition<S>) {
        self.total_reward += transition.reward.0;
        self.transitions.push(transition);
    }

    /// Get the length of the trajectory
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if trajectory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Compute returns (cumulative discounted rewards), working backwards
    /// from the end of the episode
    #[must_use]
    pub fn returns(&self, gamma: f64) -> Vec<f64> {
        let mut returns = vec![0.0; self.len()];
        let mut running_return = 0.0;

        for i in (0..self.len()).rev() {
            if self.transitions[i].done {
                running_return = 0.0;
            }
            running_return = self.transitions[i].reward.0 + gamma * running_return;
            returns[i] = running_return;
        }

        returns
    }
}

impl<S> Default for Trajectory<S> {
    fn default() -> Self {
        Self::new()
    }
}
