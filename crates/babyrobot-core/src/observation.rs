//! Observation representations and observation spaces

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::Cell;

/// Trait for observations from an environment
pub trait Observation: Clone + Debug + Send + Sync {
    /// Convert observation to a feature vector
    fn to_vec(&self) -> Vec<f64>;

    /// Get the shape of the observation
    fn shape(&self) -> Vec<usize>;
}

/// Trait for defining observation spaces
pub trait ObservationSpace: Send + Sync {
    /// The type of observations in this space
    type Observation: Observation;

    /// Check if an observation is valid within this space
    fn contains(&self, obs: &Self::Observation) -> bool;

    /// Get the shape of observations in this space
    fn shape(&self) -> Vec<usize>;
}

/// How the robot's position is presented to an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationEncoding {
    /// The `[x, y]` pair
    #[default]
    Coordinates,
    /// The row-major cell index `y * width + x`
    Index,
}

/// The robot's position, encoded per [`ObservationEncoding`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridObservation {
    /// `[x, y]`
    Coordinates(Cell),
    /// `y * width + x`
    Index(usize),
}

impl GridObservation {
    /// Encode `cell` for a grid of the given width
    #[must_use]
    pub fn encode(cell: Cell, width: usize, encoding: ObservationEncoding) -> Self {
        match encoding {
            ObservationEncoding::Coordinates => Self::Coordinates(cell),
            ObservationEncoding::Index => Self::Index(cell.index(width)),
        }
    }

    /// Recover the cell for a grid of the given width
    #[must_use]
    pub fn cell(&self, width: usize) -> Cell {
        match *self {
            Self::Coordinates(cell) => cell,
            Self::Index(index) => Cell::new(index % width, index / width),
        }
    }
}

impl Observation for GridObservation {
    #[allow(clippy::cast_precision_loss)]
    fn to_vec(&self) -> Vec<f64> {
        match *self {
            Self::Coordinates(cell) => vec![cell.x as f64, cell.y as f64],
            Self::Index(index) => vec![index as f64],
        }
    }

    fn shape(&self) -> Vec<usize> {
        match self {
            Self::Coordinates(_) => vec![2],
            Self::Index(_) => vec![1],
        }
    }
}

/// The space of robot positions on a `width x height` grid
#[derive(Debug, Clone, Copy)]
pub struct GridObservationSpace {
    /// Grid width
    pub width: usize,
    /// Grid height
    pub height: usize,
    /// Encoding of observations in this space
    pub encoding: ObservationEncoding,
}

impl ObservationSpace for GridObservationSpace {
    type Observation = GridObservation;

    fn contains(&self, obs: &Self::Observation) -> bool {
        match (self.encoding, obs) {
            (ObservationEncoding::Coordinates, GridObservation::Coordinates(cell)) => {
                cell.within(self.width, self.height)
            }
            (ObservationEncoding::Index, GridObservation::Index(index)) => {
                *index < self.width * self.height
            }
            _ => false,
        }
    }

    fn shape(&self) -> Vec<usize> {
        match self.encoding {
            ObservationEncoding::Coordinates => vec![self.width, self.height],
            ObservationEncoding::Index => vec![self.width * self.height],
        }
    }
}
