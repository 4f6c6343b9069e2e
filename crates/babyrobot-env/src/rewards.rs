//! Reward surface

use ndarray::Array2;

use babyrobot_core::Cell;

use crate::areas::Areas;
use crate::hazards::Puddles;

/// Reward for a move that lands on an ordinary cell
pub const DEFAULT_REWARD: f64 = -1.0;

/// Reward for entering `cell`.
///
/// Base areas give 0, puddles give their penalty, reward zones give their
/// override and every other cell gives [`DEFAULT_REWARD`], checked in that
/// order.
#[must_use]
pub fn cell_reward(cell: Cell, puddles: &Puddles, areas: &Areas) -> f64 {
    if areas.is_base(cell) {
        return 0.0;
    }
    puddles
        .penalty(cell)
        .or_else(|| areas.zone_reward(cell))
        .unwrap_or(DEFAULT_REWARD)
}

/// Precomputed [`cell_reward`] for every cell, indexed `[y, x]`
#[derive(Debug, Clone)]
pub struct RewardSurface {
    rewards: Array2<f64>,
}

impl RewardSurface {
    /// Evaluate the reward of every cell of a `width x height` grid
    #[must_use]
    pub fn new(width: usize, height: usize, puddles: &Puddles, areas: &Areas) -> Self {
        let rewards =
            Array2::from_shape_fn((height, width), |(y, x)| cell_reward(Cell::new(x, y), puddles, areas));
        Self { rewards }
    }

    /// Reward for entering an in-bounds cell
    #[must_use]
    pub fn get(&self, cell: Cell) -> f64 {
        self.rewards
            .get([cell.y, cell.x])
            .copied()
            .unwrap_or(DEFAULT_REWARD)
    }

    /// The whole surface
    #[must_use]
    pub fn as_array(&self) -> &Array2<f64> {
        &self.rewards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::Rect;
    use crate::config::{BaseArea, GridArea, PuddleLayout, PuddleProps};
    use crate::hazards::PuddleSize;

    #[test]
    fn test_reward_precedence() {
        let puddles = Puddles::new(
            4,
            3,
            Some(&PuddleLayout::List(vec![
                (Cell::new(1, 1), PuddleSize::Large),
                (Cell::new(3, 0), PuddleSize::Small),
            ])),
            PuddleProps::default(),
        );
        let areas = Areas::new(
            &[BaseArea::Area(Rect::new(3, 0, 1, 1))],
            &[GridArea::Rewarded(Rect::new(0, 0, 3, 2), None, Some(5.0))],
        );

        // base area beats the puddle underneath it
        assert!(cell_reward(Cell::new(3, 0), &puddles, &areas).abs() < f64::EPSILON);
        // puddle beats the zone
        assert!((cell_reward(Cell::new(1, 1), &puddles, &areas) + 4.0).abs() < f64::EPSILON);
        assert!((cell_reward(Cell::new(0, 0), &puddles, &areas) - 5.0).abs() < f64::EPSILON);
        assert!((cell_reward(Cell::new(2, 2), &puddles, &areas) - DEFAULT_REWARD).abs() < f64::EPSILON);
    }

    #[test]
    fn test_surface_matches_pointwise_rule() {
        let puddles = Puddles::new(
            5,
            4,
            Some(&PuddleLayout::List(vec![(Cell::new(2, 3), PuddleSize::Small)])),
            PuddleProps::default(),
        );
        let areas = Areas::new(
            &[BaseArea::Area(Rect::new(0, 3, 2, 1))],
            &[GridArea::Rewarded(Rect::new(3, 0, 2, 2), None, Some(-7.5))],
        );
        let surface = RewardSurface::new(5, 4, &puddles, &areas);

        assert_eq!(surface.as_array().dim(), (4, 5));
        for ((y, x), &reward) in surface.as_array().indexed_iter() {
            let cell = Cell::new(x, y);
            assert!((reward - cell_reward(cell, &puddles, &areas)).abs() < f64::EPSILON);
            assert!((surface.get(cell) - reward).abs() < f64::EPSILON);
        }
    }
}
