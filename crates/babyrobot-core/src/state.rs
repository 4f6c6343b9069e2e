//! Grid cells, the states of the grid world

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Direction;

/// A grid coordinate `(x, y)`, with `x` growing east and `y` growing south.
///
/// Cells serialize as a two element array so configurations can be written
/// as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Cell {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
}

impl Cell {
    /// Create a new cell
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in `direction`.
    ///
    /// Returns `None` only when the step would leave the non-negative
    /// quadrant; callers check the upper bounds against their grid.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self { x, y })
    }

    /// Row-major index of this cell in a grid of the given width
    #[must_use]
    pub const fn index(self, width: usize) -> usize {
        self.y * width + self.x
    }

    /// Whether this cell lies inside a `width x height` grid
    #[must_use]
    pub const fn within(self, width: usize, height: usize) -> bool {
        self.x < width && self.y < height
    }
}

impl From<(usize, usize)> for Cell {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl From<Cell> for (usize, usize) {
    fn from(cell: Cell) -> Self {
        (cell.x, cell.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
