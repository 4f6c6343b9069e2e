//! Grid level configuration
//!
//! A [`GridConfig`] is usually deserialized from JSON, or from the flattened
//! `params` of an [`EnvironmentConfig`]. Unknown keys are ignored and every
//! key has a default, so `{}` describes a dry, open 3x3 grid running from
//! `[0, 0]` to `[2, 2]`.

use serde::{Deserialize, Serialize};

use babyrobot_core::{
    BabyRobotError, Cell, Direction, EnvironmentConfig, ObservationEncoding, Result,
};

use crate::areas::Rect;
use crate::hazards::PuddleSize;

/// Complete description of a grid level and of the environment built on it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Maze root and default initial position
    pub start: Cell,
    /// Terminal cell, bottom-right when absent
    pub end: Option<Cell>,
    /// Position the robot is placed at on reset, `start` when absent
    pub initial_pos: Option<Cell>,
    /// Wall toggles
    pub walls: Vec<WallToggle>,
    /// Carve a perfect maze before applying wall toggles
    pub add_maze: bool,
    /// Seed for maze carving
    pub maze_seed: u64,
    /// Puddle placement
    pub puddles: Option<PuddleLayout>,
    /// Puddle rewards and success probabilities
    pub puddle_props: PuddleProps,
    /// Directed transitions that bounce the robot back when they fail
    pub barriers: Vec<BarrierDecl>,
    /// Off-grid regions
    pub base_areas: Vec<BaseArea>,
    /// Regions with a reward override
    pub grid_areas: Vec<GridArea>,
    /// Shape of the environment's action space
    pub action_space: ActionSpaceKind,
    /// Encoding of environment observations
    pub observation: ObservationEncoding,
    /// How the environment rewards each step
    pub reward_mode: RewardMode,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 3,
            height: 3,
            start: Cell::new(0, 0),
            end: None,
            initial_pos: None,
            walls: Vec::new(),
            add_maze: false,
            maze_seed: 0,
            puddles: None,
            puddle_props: PuddleProps::default(),
            barriers: Vec::new(),
            base_areas: Vec::new(),
            grid_areas: Vec::new(),
            action_space: ActionSpaceKind::default(),
            observation: ObservationEncoding::default(),
            reward_mode: RewardMode::default(),
        }
    }
}

impl GridConfig {
    /// Create a default configuration for a `width x height` grid
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read the grid keys out of a generic environment configuration
    pub fn from_environment(config: &EnvironmentConfig) -> Result<Self> {
        let value = serde_json::Value::Object(config.params.clone());
        Ok(serde_json::from_value(value)?)
    }

    /// The terminal cell
    #[must_use]
    pub fn end(&self) -> Cell {
        self.end.unwrap_or_else(|| {
            Cell::new(self.width.saturating_sub(1), self.height.saturating_sub(1))
        })
    }

    /// The cell the robot is placed at on reset
    #[must_use]
    pub fn initial_pos(&self) -> Cell {
        self.initial_pos.unwrap_or(self.start)
    }

    /// Set the terminal cell
    #[must_use]
    pub fn with_end(mut self, end: Cell) -> Self {
        self.end = Some(end);
        self
    }

    /// Place a puddle, converting any array layout to a list
    #[must_use]
    pub fn with_puddle(mut self, cell: Cell, size: PuddleSize) -> Self {
        let mut entries = self
            .puddles
            .take()
            .map(|layout| layout.entries())
            .unwrap_or_default();
        entries.push((cell, size));
        self.puddles = Some(PuddleLayout::List(entries));
        self
    }

    /// Toggle a single wall
    #[must_use]
    pub fn with_wall(mut self, cell: Cell, direction: Direction) -> Self {
        self.walls.push(WallToggle::Single(cell, direction));
        self
    }

    /// Enable maze carving with the given seed
    #[must_use]
    pub fn with_maze(mut self, seed: u64) -> Self {
        self.add_maze = true;
        self.maze_seed = seed;
        self
    }

    /// Check the structurally required fields
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BabyRobotError::Config(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }

        for (name, cell) in [
            ("start", self.start),
            ("end", self.end()),
            ("initial_pos", self.initial_pos()),
        ] {
            if !cell.within(self.width, self.height) {
                return Err(BabyRobotError::Config(format!(
                    "{name} {cell} lies outside the {}x{} grid",
                    self.width, self.height
                )));
            }
        }

        for area in &self.base_areas {
            let rect = area.rect();
            for (name, cell) in [("start", self.start), ("end", self.end())] {
                if rect.contains(cell) {
                    return Err(BabyRobotError::Config(format!(
                        "{name} {cell} lies inside base area {rect}"
                    )));
                }
            }
        }

        self.puddle_props.validate()?;

        for barrier in &self.barriers {
            if !(0.0..=1.0).contains(&barrier.2) {
                return Err(BabyRobotError::Config(format!(
                    "barrier probability {} at {} is outside [0, 1]",
                    barrier.2, barrier.0
                )));
            }
        }

        if let Some(PuddleLayout::Array(rows)) = &self.puddles {
            if rows.len() != self.height || rows.iter().any(|row| row.len() != self.width) {
                return Err(BabyRobotError::Config(format!(
                    "puddle array must have shape {}x{}",
                    self.height, self.width
                )));
            }
        }

        Ok(())
    }
}

/// A wall toggle, optionally repeated over a run of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WallToggle {
    /// `[[x, y], direction, run_length]`
    Run(Cell, Direction, usize),
    /// `[[x, y], direction]`
    Single(Cell, Direction),
}

impl WallToggle {
    /// First cell of the toggle
    #[must_use]
    pub fn cell(&self) -> Cell {
        match *self {
            Self::Run(cell, ..) | Self::Single(cell, _) => cell,
        }
    }

    /// Side of the cell the wall is on
    #[must_use]
    pub fn direction(&self) -> Direction {
        match *self {
            Self::Run(_, direction, _) | Self::Single(_, direction) => direction,
        }
    }

    /// Number of consecutive cells toggled
    #[must_use]
    pub fn run_length(&self) -> usize {
        match *self {
            Self::Run(.., run) => run,
            Self::Single(..) => 1,
        }
    }
}

/// Puddle placement, either as a list or as a full `height x width` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PuddleLayout {
    /// `[[[x, y], size], ...]`
    List(Vec<(Cell, PuddleSize)>),
    /// `[[size, ...], ...]`, indexed `[y][x]`
    Array(Vec<Vec<PuddleSize>>),
}

impl PuddleLayout {
    /// The non-dry puddles of this layout as `(cell, size)` pairs
    #[must_use]
    pub fn entries(self) -> Vec<(Cell, PuddleSize)> {
        match self {
            Self::List(entries) => entries,
            Self::Array(rows) => rows
                .into_iter()
                .enumerate()
                .flat_map(|(y, row)| {
                    row.into_iter()
                        .enumerate()
                        .filter(|(_, size)| *size != PuddleSize::Dry)
                        .map(move |(x, size)| (Cell::new(x, y), size))
                })
                .collect(),
        }
    }
}

/// Rewards and success probabilities of the two puddle sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuddleProps {
    /// Probability of reaching the target from a small puddle
    pub small_prob: f64,
    /// Probability of reaching the target from a large puddle
    pub large_prob: f64,
    /// Reward for entering a small puddle
    pub small_reward: f64,
    /// Reward for entering a large puddle
    pub large_reward: f64,
}

impl Default for PuddleProps {
    fn default() -> Self {
        Self {
            small_prob: 0.6,
            large_prob: 0.4,
            small_reward: -2.0,
            large_reward: -4.0,
        }
    }
}

impl PuddleProps {
    fn validate(&self) -> Result<()> {
        for (name, p) in [("small_prob", self.small_prob), ("large_prob", self.large_prob)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(BabyRobotError::Config(format!(
                    "{name} must be in [0, 1], got {p}"
                )));
            }
        }
        Ok(())
    }
}

/// `[[x, y], direction, probability]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrierDecl(pub Cell, pub Direction, pub f64);

/// An off-grid region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BaseArea {
    /// `[x, y, w, h]`
    Area(Rect),
    /// `[[x, y, w, h], style]`; the style only matters to renderers
    Styled(Rect, serde_json::Value),
}

impl BaseArea {
    /// Extent of the area
    #[must_use]
    pub fn rect(&self) -> Rect {
        match *self {
            Self::Area(rect) | Self::Styled(rect, _) => rect,
        }
    }
}

/// A region with an optional reward override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridArea {
    /// `[[x, y, w, h], color, reward]`
    Rewarded(Rect, Option<String>, Option<f64>),
    /// `[[x, y, w, h], color]`
    Plain(Rect, Option<String>),
}

impl GridArea {
    /// Extent of the area
    #[must_use]
    pub fn rect(&self) -> Rect {
        match *self {
            Self::Rewarded(rect, ..) | Self::Plain(rect, _) => rect,
        }
    }

    /// Reward override for cells in the area
    #[must_use]
    pub fn reward(&self) -> Option<f64> {
        match *self {
            Self::Rewarded(_, _, reward) => reward,
            Self::Plain(..) => None,
        }
    }
}

/// Shape of the action space offered to agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSpaceKind {
    /// Only the actions available in the current cell
    #[default]
    Dynamic,
    /// All five actions, always
    Discrete,
}

/// Reward policy of the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardMode {
    /// The transition model's reward
    #[default]
    Grid,
    /// `-1` per step and `0` on reaching the exit
    StepPenalty,
}
