//! The Baby Robot environment
//!
//! [`BabyRobotEnv`] drives one robot around a [`Grid`]. Its observation
//! encoding, action-space shape and reward policy are chosen by
//! configuration rather than by separate environment types.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use babyrobot_core::{
    Action, ActionSpace, BabyRobotError, Cell, DiscreteSpace, DynamicActionSpace, Environment,
    EnvironmentConfig, GridObservation, GridObservationSpace, ObservationSpace, Result, Reward,
    Step, StepInfo,
};

use crate::config::{ActionSpaceKind, GridConfig, RewardMode};
use crate::grid::Grid;

/// Info key holding whether the last step went where it was meant to
pub const TARGET_REACHED: &str = "target_reached";
/// Info key holding the actions available at the new position
pub const AVAILABLE_ACTIONS: &str = "available_actions";

/// Grid-world environment for a single robot
pub struct BabyRobotEnv {
    grid: Grid,
    config: GridConfig,
    initial_pos: Cell,
    position: Cell,
    rng: StdRng,
}

impl BabyRobotEnv {
    /// Create an environment from a generic configuration; grid keys are
    /// read from `params`, and `seed` seeds the transition sampler
    pub fn new(config: EnvironmentConfig) -> Result<Self> {
        let grid_config = GridConfig::from_environment(&config)?;
        Self::from_grid_config(grid_config, config.seed)
    }

    /// Create an environment from a grid configuration
    pub fn from_grid_config(config: GridConfig, seed: Option<u64>) -> Result<Self> {
        let grid = Grid::new(&config)?;
        let initial_pos = config.initial_pos();
        if grid.is_base_area(initial_pos.x, initial_pos.y) {
            return Err(BabyRobotError::Config(format!(
                "initial position {initial_pos} lies inside a base area"
            )));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            grid,
            config,
            initial_pos,
            position: initial_pos,
            rng,
        })
    }

    /// The level the robot moves on
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current position
    #[must_use]
    pub fn position(&self) -> Cell {
        self.position
    }

    /// Change where the robot is placed on the next reset
    pub fn set_initial_position(&mut self, cell: Cell) -> Result<()> {
        let cell = self.grid.cell(cell.x, cell.y)?;
        if self.grid.is_base_area(cell.x, cell.y) {
            return Err(BabyRobotError::InvalidState(format!(
                "{cell} lies inside a base area"
            )));
        }
        self.initial_pos = cell;
        Ok(())
    }

    /// Reseed the transition sampler
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Movement actions available at the current position
    #[must_use]
    pub fn available_actions(&self) -> Vec<Action> {
        self.grid.directions_at(self.position).to_actions()
    }

    /// Whether the robot is in the terminal cell
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.position == self.grid.end()
    }

    fn observe(&self) -> GridObservation {
        GridObservation::encode(self.position, self.grid.width(), self.config.observation)
    }

    fn info(&self) -> StepInfo {
        let actions: Vec<usize> = self.available_actions().into_iter().map(usize::from).collect();
        StepInfo::default().with(AVAILABLE_ACTIONS, actions)
    }

    fn check_action(&self, action: Action) -> Result<()> {
        if self.config.action_space == ActionSpaceKind::Discrete || action == Action::Stay {
            return Ok(());
        }
        if self.available_actions().contains(&action) {
            Ok(())
        } else {
            Err(BabyRobotError::InvalidAction(format!(
                "{action} is not available at {}",
                self.position
            )))
        }
    }
}

#[async_trait]
impl Environment for BabyRobotEnv {
    type Observation = GridObservation;

    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>> {
        Box::new(GridObservationSpace {
            width: self.grid.width(),
            height: self.grid.height(),
            encoding: self.config.observation,
        })
    }

    fn action_space(&self) -> Box<dyn ActionSpace> {
        match self.config.action_space {
            ActionSpaceKind::Dynamic => Box::new(DynamicActionSpace::new(self.available_actions())),
            ActionSpaceKind::Discrete => Box::new(DiscreteSpace),
        }
    }

    async fn reset(&mut self) -> Result<(Self::Observation, StepInfo)> {
        self.position = self.initial_pos;
        tracing::debug!(position = %self.position, "reset");
        Ok((self.observe(), self.info()))
    }

    async fn step(&mut self, action: Action) -> Result<Step<Self::Observation>> {
        self.check_action(action)?;

        let sample = self.grid.sample_next_state(
            self.position.x,
            self.position.y,
            action.to_direction(),
            &mut self.rng,
        )?;
        self.position = sample.next;
        let done = self.is_done();

        let reward = match self.config.reward_mode {
            RewardMode::Grid => sample.reward,
            RewardMode::StepPenalty if done => 0.0,
            RewardMode::StepPenalty => -1.0,
        };

        Ok(Step {
            observation: self.observe(),
            reward: Reward(reward),
            done,
            truncated: false,
            info: self.info().with(TARGET_REACHED, sample.target_reached),
        })
    }
}
