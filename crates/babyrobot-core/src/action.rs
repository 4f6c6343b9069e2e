//! Actions and action spaces

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BabyRobotError, Direction, DirectionSet};

/// The five actions available to Baby Robot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum Action {
    /// Remain in the current cell
    Stay = 0,
    /// Move north
    North = 1,
    /// Move east
    East = 2,
    /// Move south
    South = 3,
    /// Move west
    West = 4,
}

impl Action {
    /// Number of actions in the enumeration
    pub const COUNT: usize = 5;

    /// Every action, in enumeration order
    pub const ALL: [Action; Self::COUNT] = [
        Action::Stay,
        Action::North,
        Action::East,
        Action::South,
        Action::West,
    ];

    /// Enumeration value of the action
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The compass direction of a movement action
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Action::Stay => None,
            Action::North => Some(Direction::North),
            Action::East => Some(Direction::East),
            Action::South => Some(Direction::South),
            Action::West => Some(Direction::West),
        }
    }

    /// Direction bitfield of the action: `Stay -> 0`, action `a -> 2^(a-1)`
    #[must_use]
    pub fn to_direction(self) -> DirectionSet {
        self.direction().map_or(DirectionSet::STAY, DirectionSet::from)
    }
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::North => Action::North,
            Direction::East => Action::East,
            Direction::South => Action::South,
            Direction::West => Action::West,
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = BabyRobotError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Action::ALL
            .get(value)
            .copied()
            .ok_or_else(|| BabyRobotError::InvalidAction(format!("{value} is not in 0..=4")))
    }
}

impl From<Action> for usize {
    fn from(action: Action) -> Self {
        action.index()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Stay => "Stay",
            Action::North => "North",
            Action::East => "East",
            Action::South => "South",
            Action::West => "West",
        };
        f.write_str(name)
    }
}

/// Trait for defining action spaces
pub trait ActionSpace: Send + Sync {
    /// Sample a random action from the space
    fn sample(&self, rng: &mut dyn RngCore) -> Action;

    /// Check if an action is valid within this space
    fn contains(&self, action: Action) -> bool;

    /// Number of actions in the space
    fn n(&self) -> usize;
}

/// Fixed space of all five actions
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscreteSpace;

impl ActionSpace for DiscreteSpace {
    fn sample(&self, rng: &mut dyn RngCore) -> Action {
        Action::ALL[rng.gen_range(0..Action::COUNT)]
    }

    fn contains(&self, _action: Action) -> bool {
        true
    }

    fn n(&self) -> usize {
        Action::COUNT
    }
}

/// The actions available in one particular state.
///
/// This is a plain value recomputed for every state rather than a space whose
/// size changes underneath its users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicActionSpace {
    available: Vec<Action>,
}

impl DynamicActionSpace {
    /// Create a space holding the given actions
    #[must_use]
    pub fn new(available: Vec<Action>) -> Self {
        Self { available }
    }

    /// The available actions
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.available
    }

    /// True when no action is available
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}

impl ActionSpace for DynamicActionSpace {
    /// A uniformly chosen available action, or `Stay` when there are none
    fn sample(&self, rng: &mut dyn RngCore) -> Action {
        if self.available.is_empty() {
            return Action::Stay;
        }
        self.available[rng.gen_range(0..self.available.len())]
    }

    fn contains(&self, action: Action) -> bool {
        self.available.contains(&action)
    }

    fn n(&self) -> usize {
        self.available.len()
    }
}
