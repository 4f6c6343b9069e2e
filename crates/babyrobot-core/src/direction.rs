//! Compass directions and the direction bitfield
//!
//! A [`Direction`] is one of the four compass points. A [`DirectionSet`] is
//! the bitfield `North=1, East=2, South=4, West=8` used to describe which
//! moves are possible from a cell, supporting union and intersection.
//! Iteration over a set always yields North, South, East, West in that order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Sub};

use crate::{Action, BabyRobotError};

/// One of the four compass points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards `y - 1`
    #[serde(rename = "N", alias = "North")]
    North,
    /// Towards `x + 1`
    #[serde(rename = "E", alias = "East")]
    East,
    /// Towards `y + 1`
    #[serde(rename = "S", alias = "South")]
    South,
    /// Towards `x - 1`
    #[serde(rename = "W", alias = "West")]
    West,
}

impl Direction {
    /// All directions in iteration order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// The bit of this direction in a [`DirectionSet`]
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Direction::North => 1,
            Direction::East => 2,
            Direction::South => 4,
            Direction::West => 8,
        }
    }

    /// The direction pointing the other way
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Coordinate delta `(dx, dy)`
    #[must_use]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Single letter name
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "North",
            Direction::East => "East",
            Direction::South => "South",
            Direction::West => "West",
        };
        f.write_str(name)
    }
}

/// Bitfield of directions. The empty set is `Stay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DirectionSet(u8);

impl DirectionSet {
    /// No direction
    pub const STAY: Self = Self(0);
    /// Every direction
    pub const ALL: Self = Self(15);

    /// Build a set from raw bits, rejecting anything outside `0..=15`
    pub fn from_bits(bits: u8) -> crate::Result<Self> {
        if bits > Self::ALL.0 {
            return Err(BabyRobotError::InvalidDirection(bits));
        }
        Ok(Self(bits))
    }

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True for `Stay`
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of directions in the set
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether `direction` is in the set
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Copy of the set with `direction` added
    #[must_use]
    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | direction.bit())
    }

    /// Copy of the set with `direction` removed
    #[must_use]
    pub const fn without(self, direction: Direction) -> Self {
        Self(self.0 & !direction.bit())
    }

    /// Directions in the set, ordered North, South, East, West
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// The only direction in the set, if it holds exactly one
    #[must_use]
    pub fn single(self) -> Option<Direction> {
        if self.len() == 1 {
            self.iter().next()
        } else {
            None
        }
    }

    /// Movement actions for the directions in the set, ordered N, S, E, W
    #[must_use]
    pub fn to_actions(self) -> Vec<Action> {
        self.iter().map(Action::from).collect()
    }

    /// Union of the directions of the supplied actions
    #[must_use]
    pub fn from_actions(actions: &[Action]) -> Self {
        actions
            .iter()
            .fold(Self::STAY, |set, action| set | action.to_direction())
    }
}

impl From<Direction> for DirectionSet {
    fn from(direction: Direction) -> Self {
        Self(direction.bit())
    }
}

impl TryFrom<u8> for DirectionSet {
    type Error = BabyRobotError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits)
    }
}

impl From<DirectionSet> for u8 {
    fn from(set: DirectionSet) -> Self {
        set.0
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter().fold(Self::STAY, DirectionSet::with)
    }
}

impl BitOr for DirectionSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DirectionSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for DirectionSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for DirectionSet {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Sub for DirectionSet {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 & !rhs.0)
    }
}

impl Not for DirectionSet {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(!self.0 & Self::ALL.0)
    }
}

impl fmt::Display for DirectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Stay");
        }
        for direction in self.iter() {
            write!(f, "{}", direction.as_char())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bits_match_bitfield() {
        assert_eq!(DirectionSet::from(Direction::North).bits(), 1);
        assert_eq!(DirectionSet::from(Direction::East).bits(), 2);
        assert_eq!(DirectionSet::from(Direction::South).bits(), 4);
        assert_eq!(DirectionSet::from(Direction::West).bits(), 8);
        assert_eq!(DirectionSet::ALL.bits(), 15);
    }

    #[test]
    fn test_iteration_order_is_north_south_east_west() {
        let order: Vec<_> = DirectionSet::ALL.iter().collect();
        assert_eq!(
            order,
            vec![Direction::North, Direction::South, Direction::East, Direction::West]
        );
        assert_eq!(
            DirectionSet::ALL.to_actions(),
            vec![Action::North, Action::South, Action::East, Action::West]
        );
    }

    #[test]
    fn test_out_of_range_bits_rejected() {
        assert!(matches!(
            DirectionSet::from_bits(16),
            Err(BabyRobotError::InvalidDirection(16))
        ));
        assert!(DirectionSet::from_bits(15).is_ok());
    }

    #[test]
    fn test_opposites() {
        for direction in Direction::ALL {
            assert_ne!(direction.opposite(), direction);
            assert_eq!(direction.opposite().opposite(), direction);
        }
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::East.opposite(), Direction::West);
    }

    #[test]
    fn test_display() {
        assert_eq!(DirectionSet::ALL.to_string(), "NSEW");
        assert_eq!(DirectionSet::STAY.to_string(), "Stay");
    }

    proptest! {
        #[test]
        fn prop_set_algebra(a in 0u8..16, b in 0u8..16) {
            let sa = DirectionSet::from_bits(a).unwrap();
            let sb = DirectionSet::from_bits(b).unwrap();
            prop_assert_eq!((sa | sb).bits(), a | b);
            prop_assert_eq!((sa & sb).bits(), a & b);
            prop_assert_eq!((sa - sb).bits(), a & !b);
            prop_assert_eq!((!sa).bits(), !a & 15);
        }

        #[test]
        fn prop_actions_round_trip(bits in 0u8..16) {
            let set = DirectionSet::from_bits(bits).unwrap();
            prop_assert_eq!(DirectionSet::from_actions(&set.to_actions()), set);
            prop_assert_eq!(set.to_actions().len(), set.len());
        }
    }
}
