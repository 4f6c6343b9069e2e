//! Puddles and barriers, the two sources of slip in the grid world

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use babyrobot_core::{BabyRobotError, Cell, Direction};

use crate::config::{BarrierDecl, PuddleLayout, PuddleProps};

/// Size of the puddle on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PuddleSize {
    /// No puddle
    #[default]
    Dry = 0,
    /// Small puddle
    Small = 1,
    /// Large puddle
    Large = 2,
}

impl TryFrom<u8> for PuddleSize {
    type Error = BabyRobotError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Dry),
            1 => Ok(Self::Small),
            2 => Ok(Self::Large),
            other => Err(BabyRobotError::Config(format!(
                "puddle size must be 0, 1 or 2, got {other}"
            ))),
        }
    }
}

impl From<PuddleSize> for u8 {
    fn from(size: PuddleSize) -> Self {
        size as u8
    }
}

/// Puddle sizes for every cell, with the properties of each size
#[derive(Debug, Clone)]
pub struct Puddles {
    sizes: Array2<PuddleSize>,
    props: PuddleProps,
}

impl Puddles {
    /// Lay out puddles on a `width x height` grid; entries outside the grid
    /// are skipped
    #[must_use]
    pub fn new(
        width: usize,
        height: usize,
        layout: Option<&PuddleLayout>,
        props: PuddleProps,
    ) -> Self {
        let mut sizes = Array2::from_elem((height, width), PuddleSize::Dry);
        if let Some(layout) = layout {
            for (cell, size) in layout.clone().entries() {
                if cell.within(width, height) {
                    sizes[[cell.y, cell.x]] = size;
                } else {
                    tracing::debug!(%cell, "skipping puddle outside the grid");
                }
            }
        }
        Self { sizes, props }
    }

    /// Puddle size at an in-bounds cell
    #[must_use]
    pub fn size(&self, cell: Cell) -> PuddleSize {
        self.sizes
            .get([cell.y, cell.x])
            .copied()
            .unwrap_or_default()
    }

    /// Probability that a move from `cell` reaches its target
    #[must_use]
    pub fn success_probability(&self, cell: Cell) -> f64 {
        match self.size(cell) {
            PuddleSize::Dry => 1.0,
            PuddleSize::Small => self.props.small_prob,
            PuddleSize::Large => self.props.large_prob,
        }
    }

    /// Reward for entering `cell`, if it holds a puddle
    #[must_use]
    pub fn penalty(&self, cell: Cell) -> Option<f64> {
        match self.size(cell) {
            PuddleSize::Dry => None,
            PuddleSize::Small => Some(self.props.small_reward),
            PuddleSize::Large => Some(self.props.large_reward),
        }
    }
}

/// Directed transitions whose failure bounces the robot back
#[derive(Debug, Clone, Default)]
pub struct Barriers {
    transitions: HashMap<(Cell, Direction), f64>,
}

impl Barriers {
    /// Collect barrier declarations; declarations outside the grid are
    /// skipped and a repeated declaration replaces the earlier one
    #[must_use]
    pub fn new(width: usize, height: usize, declarations: &[BarrierDecl]) -> Self {
        let mut transitions = HashMap::new();
        for &BarrierDecl(cell, direction, probability) in declarations {
            if cell.within(width, height) {
                transitions.insert((cell, direction), probability);
            } else {
                tracing::debug!(%cell, %direction, "skipping barrier outside the grid");
            }
        }
        Self { transitions }
    }

    /// Success probability of the barrier on the move from `cell` toward
    /// `direction`, if one is declared
    #[must_use]
    pub fn get(&self, cell: Cell, direction: Direction) -> Option<f64> {
        self.transitions.get(&(cell, direction)).copied()
    }
}
