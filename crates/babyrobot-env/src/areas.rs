//! Rectangular base areas and reward zones

use serde::{Deserialize, Serialize};
use std::fmt;

use babyrobot_core::Cell;

use crate::config::{BaseArea, GridArea};

/// An axis-aligned rectangle of cells, written `[x, y, width, height]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    from = "(usize, usize, usize, usize)",
    into = "(usize, usize, usize, usize)"
)]
pub struct Rect {
    /// Left column
    pub x: usize,
    /// Top row
    pub y: usize,
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether `cell` lies inside the rectangle
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x
            && cell.y >= self.y
            && cell.x - self.x < self.width
            && cell.y - self.y < self.height
    }
}

impl From<(usize, usize, usize, usize)> for Rect {
    fn from((x, y, width, height): (usize, usize, usize, usize)) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<Rect> for (usize, usize, usize, usize) {
    fn from(rect: Rect) -> Self {
        (rect.x, rect.y, rect.width, rect.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{} {}x{}]", self.x, self.y, self.width, self.height)
    }
}

/// Base areas and reward zones of a level
#[derive(Debug, Clone, Default)]
pub struct Areas {
    base: Vec<Rect>,
    zones: Vec<(Rect, f64)>,
}

impl Areas {
    /// Collect the areas of a level; grid areas without a reward are
    /// cosmetic and dropped
    #[must_use]
    pub fn new(base_areas: &[BaseArea], grid_areas: &[GridArea]) -> Self {
        Self {
            base: base_areas.iter().map(BaseArea::rect).collect(),
            zones: grid_areas
                .iter()
                .filter_map(|area| area.reward().map(|reward| (area.rect(), reward)))
                .collect(),
        }
    }

    /// Whether `cell` is off-grid
    #[must_use]
    pub fn is_base(&self, cell: Cell) -> bool {
        self.base.iter().any(|rect| rect.contains(cell))
    }

    /// Reward override for `cell`; later zones win where zones overlap
    #[must_use]
    pub fn zone_reward(&self, cell: Cell) -> Option<f64> {
        self.zones
            .iter()
            .rev()
            .find(|(rect, _)| rect.contains(cell))
            .map(|&(_, reward)| reward)
    }
}
