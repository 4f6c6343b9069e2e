//! Policy abstractions for action selection

use rand::{Rng, RngCore};

use crate::{Action, Cell};

/// A policy maps a state and its available actions to a distribution over
/// those actions
pub trait Policy: Send + Sync {
    /// The probability of taking each action in `cell`.
    ///
    /// An empty result means the policy has no opinion about this state.
    fn action_probabilities(&self, cell: Cell, available: &[Action]) -> Vec<(Action, f64)>;

    /// Draw one action from [`Policy::action_probabilities`], falling back
    /// to a uniform choice over `available` (or `Stay`) when the policy
    /// gives no distribution
    fn select(&self, cell: Cell, available: &[Action], rng: &mut dyn RngCore) -> Action {
        let probabilities = self.action_probabilities(cell, available);
        let Some(&(last, _)) = probabilities.last() else {
            if available.is_empty() {
                return Action::Stay;
            }
            return available[rng.gen_range(0..available.len())];
        };

        let mut u: f64 = rng.gen();
        for &(action, probability) in &probabilities {
            if u < probability {
                return action;
            }
            u -= probability;
        }
        last
    }
}

/// Random policy that selects uniformly among the available actions
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    #[allow(clippy::cast_precision_loss)]
    fn action_probabilities(&self, _cell: Cell, available: &[Action]) -> Vec<(Action, f64)> {
        if available.is_empty() {
            return Vec::new();
        }
        let probability = 1.0 / available.len() as f64;
        available.iter().map(|&a| (a, probability)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_policy_is_uniform() {
        let probabilities =
            RandomPolicy.action_probabilities(Cell::new(0, 0), &[Action::North, Action::East]);
        assert_eq!(probabilities, vec![(Action::North, 0.5), (Action::East, 0.5)]);
    }

    #[test]
    fn test_select_with_no_actions_stays() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(RandomPolicy.select(Cell::new(0, 0), &[], &mut rng), Action::Stay);
    }

    #[test]
    fn test_select_draws_available_actions() {
        let mut rng = StdRng::seed_from_u64(1);
        let available = [Action::South, Action::West];
        let mut seen = [false; 2];
        for _ in 0..100 {
            match RandomPolicy.select(Cell::new(1, 1), &available, &mut rng) {
                Action::South => seen[0] = true,
                Action::West => seen[1] = true,
                other => panic!("unexpected action {other}"),
            }
        }
        assert!(seen[0] && seen[1]);
    }
}
