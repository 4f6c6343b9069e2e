//! A policy that replays a fixed list of actions

use std::sync::{Mutex, PoisonError};

use babyrobot_core::{Action, Cell, Policy};

#[derive(Debug, Default)]
struct Cursor {
    last: Option<Cell>,
    index: Option<usize>,
}

/// Plays `actions` in order, moving to the next entry each time the robot
/// arrives in a different cell. The script wraps around once exhausted.
///
/// Scripting `Stay` holds the script on that entry until something else
/// moves the robot.
#[derive(Debug, Default)]
pub struct ScriptedPolicy {
    actions: Vec<Action>,
    cursor: Mutex<Cursor>,
}

impl ScriptedPolicy {
    /// Create a policy that replays `actions`
    #[must_use]
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            actions,
            cursor: Mutex::new(Cursor::default()),
        }
    }

    /// The scripted actions
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Index of the entry currently being played, if any has been
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.cursor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .index
    }

    /// Restart the script from its first entry
    pub fn reset(&self) {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner) = Cursor::default();
    }

    fn current(&self, cell: Cell) -> Option<Action> {
        if self.actions.is_empty() {
            return None;
        }
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        if cursor.last != Some(cell) {
            let next = cursor.index.map_or(0, |i| (i + 1) % self.actions.len());
            cursor.index = Some(next);
            cursor.last = Some(cell);
        }
        cursor.index.map(|i| self.actions[i])
    }
}

impl Policy for ScriptedPolicy {
    /// The scripted action with certainty, whether or not it is available.
    /// An empty script gives no distribution.
    fn action_probabilities(&self, cell: Cell, _available: &[Action]) -> Vec<(Action, f64)> {
        self.current(cell)
            .map(|action| vec![(action, 1.0)])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MonteCarlo;
    use crate::MonteCarloConfig;
    use approx::assert_relative_eq;
    use babyrobot_env::{BabyRobotEnv, GridConfig};

    #[test]
    fn test_advances_only_when_the_cell_changes() {
        let policy = ScriptedPolicy::new(vec![Action::East, Action::South]);
        let a = Cell::new(0, 0);
        let b = Cell::new(1, 0);

        assert_eq!(policy.action_probabilities(a, &[]), vec![(Action::East, 1.0)]);
        assert_eq!(policy.action_probabilities(a, &[]), vec![(Action::East, 1.0)]);
        assert_eq!(policy.position(), Some(0));

        assert_eq!(policy.action_probabilities(b, &[]), vec![(Action::South, 1.0)]);
        assert_eq!(policy.position(), Some(1));
    }

    #[test]
    fn test_wraps_and_resets() {
        let policy = ScriptedPolicy::new(vec![Action::North, Action::West]);
        let cells = [Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0)];
        let played: Vec<_> = cells
            .iter()
            .map(|&cell| policy.action_probabilities(cell, &[])[0].0)
            .collect();
        assert_eq!(played, vec![Action::North, Action::West, Action::North]);

        policy.reset();
        assert_eq!(policy.position(), None);
        assert_eq!(
            policy.action_probabilities(Cell::new(2, 0), &[]),
            vec![(Action::North, 1.0)]
        );
    }

    #[test]
    fn test_empty_script_has_no_opinion() {
        let policy = ScriptedPolicy::default();
        assert!(policy.action_probabilities(Cell::new(0, 0), &[Action::East]).is_empty());
        assert_eq!(policy.position(), None);
    }

    #[tokio::test]
    async fn test_scripted_episode_follows_the_route() {
        let env = BabyRobotEnv::from_grid_config(GridConfig::new(3, 2), Some(5)).unwrap();
        let route = vec![Action::East, Action::South, Action::East];
        let config = MonteCarloConfig {
            seed: Some(5),
            ..MonteCarloConfig::default()
        };
        let mut mc = MonteCarlo::first_visit(env, ScriptedPolicy::new(route.clone()), config);

        let trajectory = mc.single_episode().await.unwrap();
        let actions: Vec<_> = trajectory.transitions.iter().map(|t| t.action).collect();
        assert_eq!(actions, route);
        assert_eq!(
            trajectory.transitions.last().map(|t| t.next_state),
            Some(Cell::new(2, 1))
        );
        assert_relative_eq!(trajectory.returns(1.0)[0], -3.0);
    }
}
