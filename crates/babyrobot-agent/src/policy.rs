//! Deterministic and stochastic grid policies
//!
//! A [`GridPolicy`] stores a direction bitfield for every cell. The actions
//! it takes in a cell are the directions it allows that the grid also
//! allows there, chosen between uniformly. Planners improve the policy by
//! acting greedily with respect to state or action values.

use std::path::Path;

use ndarray::{Array2, Array3, ArrayView1};
use rand::seq::SliceRandom;
use rand::RngCore;

use babyrobot_core::{Action, BabyRobotError, Cell, DirectionSet, Policy, Result};
use babyrobot_env::Grid;

use crate::utils::is_close;

/// Relative tolerance under which two action values count as equal
pub const TIE_TOLERANCE: f64 = 1e-6;

/// Per-cell direction policy over a grid level
#[derive(Debug, Clone, PartialEq)]
pub struct GridPolicy {
    directions: Array2<u8>,
    available: Array2<u8>,
    end: Cell,
}

impl GridPolicy {
    /// A policy allowing every direction, except in the terminal cell
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        let end = grid.end();
        let mut directions =
            Array2::from_elem((grid.height(), grid.width()), DirectionSet::ALL.bits());
        directions[[end.y, end.x]] = 0;
        Self {
            directions,
            available: grid.direction_array(),
            end,
        }
    }

    /// A policy with the given per-cell directions, indexed `[y, x]`
    pub fn with_directions(grid: &Grid, directions: Array2<u8>) -> Result<Self> {
        let mut policy = Self::new(grid);
        policy.set_policy(directions)?;
        Ok(policy)
    }

    /// Per-cell direction bits, indexed `[y, x]`
    #[must_use]
    pub fn directions(&self) -> &Array2<u8> {
        &self.directions
    }

    /// Replace every cell's directions
    pub fn set_policy(&mut self, directions: Array2<u8>) -> Result<()> {
        if directions.dim() != self.directions.dim() {
            return Err(BabyRobotError::Config(format!(
                "policy shape {:?} does not match the grid shape {:?}",
                directions.dim(),
                self.directions.dim()
            )));
        }
        if let Some(&bits) = directions.iter().find(|&&bits| bits > DirectionSet::ALL.bits()) {
            return Err(BabyRobotError::InvalidDirection(bits));
        }
        self.directions = directions;
        Ok(())
    }

    /// Set the directions of a single cell
    pub fn set_directions(&mut self, x: usize, y: usize, directions: DirectionSet) -> Result<()> {
        self.check(x, y)?;
        self.directions[[y, x]] = directions.bits();
        Ok(())
    }

    /// Directions the policy takes at `(x, y)`, limited to those the grid
    /// allows there
    pub fn state_directions(&self, x: usize, y: usize) -> Result<DirectionSet> {
        self.check(x, y)?;
        Ok(masked(self.directions[[y, x]] & self.available[[y, x]]))
    }

    /// Actions the policy takes at `(x, y)`, ordered N, S, E, W
    pub fn actions(&self, x: usize, y: usize) -> Result<Vec<Action>> {
        Ok(self.state_directions(x, y)?.to_actions())
    }

    /// Probability of each action at `(x, y)`; empty when the policy takes
    /// no action there
    pub fn action_probabilities(&self, x: usize, y: usize) -> Result<Vec<(Action, f64)>> {
        Ok(uniform(&self.actions(x, y)?))
    }

    /// Pick an action at `(x, y)`. When the policy takes no action there a
    /// random grid-allowed move is chosen instead, or `Stay` if there is none.
    pub fn select(&self, x: usize, y: usize, rng: &mut dyn RngCore) -> Result<Action> {
        let actions = self.actions(x, y)?;
        if let Some(&action) = actions.choose(rng) {
            return Ok(action);
        }
        let available = masked(self.available[[y, x]]).to_actions();
        Ok(available.choose(rng).copied().unwrap_or(Action::Stay))
    }

    /// Directions that act greedily with respect to the state values
    /// `values` (indexed `[y, x]`). Ties within [`TIE_TOLERANCE`] keep every
    /// tied direction; the terminal cell gets none.
    pub fn calculate_greedy_directions(
        &self,
        grid: &Grid,
        values: &Array2<f64>,
    ) -> Result<Array2<u8>> {
        self.check_shape(values.dim())?;
        let mut directions = Array2::zeros(self.directions.dim());
        for ((y, x), bits) in directions.indexed_iter_mut() {
            if Cell::new(x, y) != self.end {
                *bits = cell_directions(grid, x, y, values)?.bits();
            }
        }
        Ok(directions)
    }

    /// Directions of the best action in each cell from action values
    /// indexed `[y, x, action]`. Zero-valued actions are never chosen, so
    /// unvisited cells get no direction.
    pub fn greedy_from_action_values(&self, action_values: &Array3<f64>) -> Result<Array2<u8>> {
        let (height, width, actions) = action_values.dim();
        self.check_shape((height, width))?;
        if actions != Action::COUNT {
            return Err(BabyRobotError::Config(format!(
                "expected {} action values per cell, got {actions}",
                Action::COUNT
            )));
        }

        let mut directions = Array2::zeros((height, width));
        for ((y, x), bits) in directions.indexed_iter_mut() {
            if Cell::new(x, y) != self.end {
                let row = action_values.slice(ndarray::s![y, x, ..]);
                *bits = greedy_direction(row);
            }
        }
        Ok(directions)
    }

    /// Act greedily with respect to `values`. Cells where the greedy choice
    /// is not a single direction keep their current directions. Returns
    /// whether any cell changed.
    pub fn update_policy(&mut self, grid: &Grid, values: &Array2<f64>) -> Result<bool> {
        let mut greedy = self.calculate_greedy_directions(grid, values)?;
        for ((y, x), bits) in greedy.indexed_iter_mut() {
            if !bits.is_power_of_two() {
                *bits = self.directions[[y, x]];
            }
        }
        let changed = greedy != self.directions;
        self.directions = greedy;
        Ok(changed)
    }

    /// Write the per-cell directions as JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.directions)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Read per-cell directions written by [`GridPolicy::save`]
    pub async fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let json = tokio::fs::read_to_string(path).await?;
        self.set_policy(serde_json::from_str(&json)?)
    }

    fn check(&self, x: usize, y: usize) -> Result<()> {
        let (height, width) = self.directions.dim();
        if x < width && y < height {
            Ok(())
        } else {
            Err(BabyRobotError::OutOfBounds {
                x,
                y,
                width,
                height,
            })
        }
    }

    fn check_shape(&self, dim: (usize, usize)) -> Result<()> {
        if dim == self.directions.dim() {
            Ok(())
        } else {
            Err(BabyRobotError::Config(format!(
                "value table shape {dim:?} does not match the grid shape {:?}",
                self.directions.dim()
            )))
        }
    }
}

impl Policy for GridPolicy {
    fn action_probabilities(&self, cell: Cell, available: &[Action]) -> Vec<(Action, f64)> {
        let Some(&bits) = self.directions.get([cell.y, cell.x]) else {
            return Vec::new();
        };
        let allowed = DirectionSet::from_actions(available) & masked(bits);
        uniform(&allowed.to_actions())
    }
}

fn masked(bits: u8) -> DirectionSet {
    DirectionSet::from_bits(bits & DirectionSet::ALL.bits()).unwrap_or(DirectionSet::STAY)
}

#[allow(clippy::cast_precision_loss)]
fn uniform(actions: &[Action]) -> Vec<(Action, f64)> {
    if actions.is_empty() {
        return Vec::new();
    }
    let probability = 1.0 / actions.len() as f64;
    actions.iter().map(|&action| (action, probability)).collect()
}

/// Best directions at `(x, y)` by one-step lookahead on `values`
fn cell_directions(grid: &Grid, x: usize, y: usize, values: &Array2<f64>) -> Result<DirectionSet> {
    let mut directions = DirectionSet::STAY;
    let mut best = f64::NEG_INFINITY;

    for action in grid.available_actions(x, y)? {
        let Some(direction) = action.direction() else {
            continue;
        };
        let value: f64 = grid
            .action_probabilities(x, y, action)?
            .iter()
            .map(|o| o.probability * (o.reward + values[[o.next.y, o.next.x]]))
            .sum();

        if !directions.is_empty() && is_close(value, best, TIE_TOLERANCE) {
            directions = directions.with(direction);
        } else if value > best {
            directions = DirectionSet::STAY.with(direction);
            best = value;
        }
    }
    Ok(directions)
}

#[allow(clippy::float_cmp)]
fn greedy_direction(values: ArrayView1<'_, f64>) -> u8 {
    let mut bits = 0;
    let mut best = f64::NEG_INFINITY;
    for action in Action::ALL {
        let value = values[action.index()];
        let bit = action.to_direction().bits();
        if bits > 0 && is_close(value, best, TIE_TOLERANCE) {
            bits |= bit;
        } else if value != 0.0 && value > best {
            bits = bit;
            best = value;
        }
    }
    bits
}
