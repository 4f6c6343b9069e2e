//! The grid level: geometry, walls, hazards and rewards behind one query
//! surface
//!
//! A [`Grid`] is immutable once built. Every query takes plain `(x, y)`
//! coordinates and rejects coordinates outside the grid with
//! [`BabyRobotError::OutOfBounds`].

use ndarray::Array2;

use babyrobot_core::{Action, BabyRobotError, Cell, Direction, DirectionSet, Result};

use crate::areas::Areas;
use crate::config::GridConfig;
use crate::hazards::{Barriers, PuddleSize, Puddles};
use crate::rewards::RewardSurface;
use crate::walls::WallSet;

/// A grid level
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    start: Cell,
    end: Cell,
    pub(crate) walls: WallSet,
    pub(crate) puddles: Puddles,
    pub(crate) barriers: Barriers,
    pub(crate) areas: Areas,
    pub(crate) rewards: RewardSurface,
}

impl Grid {
    /// Build a level from its configuration
    pub fn new(config: &GridConfig) -> Result<Self> {
        config.validate()?;

        let (width, height) = (config.width, config.height);
        let areas = Areas::new(&config.base_areas, &config.grid_areas);

        let mut walls = if config.add_maze {
            WallSet::maze(width, height, config.start, config.maze_seed, |cell| {
                areas.is_base(cell)
            })
        } else {
            WallSet::open(width, height)
        };

        let mut skipped = 0;
        for toggle in &config.walls {
            let toggled = walls.toggle_run(toggle.cell(), toggle.direction(), toggle.run_length());
            if toggled < toggle.run_length() {
                tracing::debug!(
                    cell = %toggle.cell(),
                    direction = %toggle.direction(),
                    requested = toggle.run_length(),
                    toggled,
                    "wall toggle partly outside the grid"
                );
                skipped += toggle.run_length() - toggled;
            }
        }

        let puddles = Puddles::new(width, height, config.puddles.as_ref(), config.puddle_props);
        let barriers = Barriers::new(width, height, &config.barriers);
        let rewards = RewardSurface::new(width, height, &puddles, &areas);

        tracing::debug!(
            width,
            height,
            maze = config.add_maze,
            maze_seed = config.maze_seed,
            toggles = config.walls.len(),
            skipped,
            "built grid level"
        );

        Ok(Self {
            width,
            height,
            start: config.start,
            end: config.end(),
            walls,
            puddles,
            barriers,
            areas,
            rewards,
        })
    }

    /// Number of columns
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Maze root and default initial position
    #[must_use]
    pub fn start(&self) -> Cell {
        self.start
    }

    /// Terminal cell
    #[must_use]
    pub fn end(&self) -> Cell {
        self.end
    }

    /// Walls of the level
    #[must_use]
    pub fn walls(&self) -> &WallSet {
        &self.walls
    }

    /// The cell at `(x, y)`, if it lies on the grid
    pub fn cell(&self, x: usize, y: usize) -> Result<Cell> {
        let cell = Cell::new(x, y);
        if cell.within(self.width, self.height) {
            Ok(cell)
        } else {
            Err(BabyRobotError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Whether `(x, y)` lies inside a base area
    #[must_use]
    pub fn is_base_area(&self, x: usize, y: usize) -> bool {
        self.areas.is_base(Cell::new(x, y))
    }

    /// Whether `(x, y)` is a state the robot can be in before the episode
    /// ends: on the grid, outside base areas, and not the terminal cell
    #[must_use]
    pub fn is_valid_state(&self, x: usize, y: usize) -> bool {
        let cell = Cell::new(x, y);
        cell.within(self.width, self.height) && !self.areas.is_base(cell) && cell != self.end
    }

    /// Every valid state, in row-major order
    #[must_use]
    pub fn valid_states(&self) -> Vec<Cell> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Cell::new(x, y)))
            .filter(|cell| self.is_valid_state(cell.x, cell.y))
            .collect()
    }

    /// Directions that can be taken from `(x, y)`
    pub fn available_directions(&self, x: usize, y: usize) -> Result<DirectionSet> {
        let cell = self.cell(x, y)?;
        Ok(self.directions_at(cell))
    }

    /// Movement actions that can be taken from `(x, y)`, ordered N, S, E, W
    pub fn available_actions(&self, x: usize, y: usize) -> Result<Vec<Action>> {
        Ok(self.available_directions(x, y)?.to_actions())
    }

    /// Reward for entering `(x, y)`
    pub fn reward(&self, x: usize, y: usize) -> Result<f64> {
        let cell = self.cell(x, y)?;
        Ok(self.rewards.get(cell))
    }

    /// Reward for moving from `(x, y)` toward `direction`, with the cell
    /// the move lands on
    pub fn reward_toward(&self, x: usize, y: usize, direction: Direction) -> Result<(f64, Cell)> {
        let cell = self.cell(x, y)?;
        let next = cell
            .step(direction)
            .filter(|next| next.within(self.width, self.height))
            .ok_or_else(|| BabyRobotError::InvalidAction(format!(
                "moving {direction} from {cell} leaves the grid"
            )))?;
        Ok((self.rewards.get(next), next))
    }

    /// Reward of every cell, indexed `[y, x]`
    #[must_use]
    pub fn reward_array(&self) -> &Array2<f64> {
        self.rewards.as_array()
    }

    /// Available direction bits of every cell, indexed `[y, x]`
    #[must_use]
    pub fn direction_array(&self) -> Array2<u8> {
        Array2::from_shape_fn((self.height, self.width), |(y, x)| {
            self.directions_at(Cell::new(x, y)).bits()
        })
    }

    /// Puddle at `(x, y)`
    pub fn puddle_size(&self, x: usize, y: usize) -> Result<PuddleSize> {
        let cell = self.cell(x, y)?;
        Ok(self.puddles.size(cell))
    }

    pub(crate) fn directions_at(&self, cell: Cell) -> DirectionSet {
        if cell == self.end || self.areas.is_base(cell) {
            return DirectionSet::STAY;
        }
        self.walls
            .open_directions(cell)
            .iter()
            .filter(|&direction| {
                self.walls
                    .neighbour(cell, direction)
                    .is_some_and(|next| !self.areas.is_base(next))
            })
            .collect()
    }
}
