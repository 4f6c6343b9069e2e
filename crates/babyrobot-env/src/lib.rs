//! The Baby Robot grid world
//!
//! This crate provides:
//! - Grid level configuration, with walls, mazes, puddles, barriers and areas
//! - The grid-world MDP: rewards, allowed moves and the transition model
//! - `BabyRobotEnv`, an [`Environment`] driving a robot around a level
//! - A time limit wrapper and a name-based environment registry

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod areas;
pub mod config;
pub mod env;
pub mod grid;
pub mod hazards;
pub mod registry;
pub mod rewards;
pub mod transition;
pub mod walls;
pub mod wrappers;

// Re-export the model and environments
pub use areas::{Areas, Rect};
pub use config::{
    ActionSpaceKind, BarrierDecl, BaseArea, GridArea, GridConfig, PuddleLayout, PuddleProps,
    RewardMode, WallToggle,
};
pub use env::{BabyRobotEnv, AVAILABLE_ACTIONS, TARGET_REACHED};
pub use grid::Grid;
pub use hazards::{Barriers, PuddleSize, Puddles};
pub use registry::{list_envs, make_env, register_env, BoxedEnv, EnvRegistry};
pub use rewards::{RewardSurface, DEFAULT_REWARD};
pub use transition::{Outcome, Sample, BOUNCE_PENALTY};
pub use walls::WallSet;
pub use wrappers::TimeLimit;

// Re-export core types
pub use babyrobot_core::{
    Action, ActionSpace, Cell, Direction, DirectionSet, Environment, EnvironmentConfig,
    GridObservation, Observation, ObservationEncoding, ObservationSpace, Reward, Step,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{make_env, BabyRobotEnv, Grid, GridConfig, Outcome, Sample, TimeLimit};
    pub use babyrobot_core::prelude::*;
}
