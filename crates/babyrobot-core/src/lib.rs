//! Core types and traits for the Baby Robot grid world
//!
//! This crate provides the shared vocabulary of the toolkit: cells, actions,
//! the direction bitfield, rewards, observations, and the environment and
//! policy traits that the grid model, the environment wrapper and the
//! planning algorithms are written against.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod direction;
pub mod environment;
pub mod error;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod state;
pub mod trajectory;

// Re-export core traits and types
pub use action::{Action, ActionSpace, DiscreteSpace, DynamicActionSpace};
pub use direction::{Direction, DirectionSet};
pub use environment::{Environment, EnvironmentConfig, Episode, Step, StepInfo, TrackedEnvironment};
pub use error::{BabyRobotError, Result};
pub use observation::{
    GridObservation, GridObservationSpace, Observation, ObservationEncoding, ObservationSpace,
};
pub use policy::{Policy, RandomPolicy};
pub use reward::Reward;
pub use state::Cell;
pub use trajectory::{Trajectory, Transition};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, ActionSpace, Cell, Direction, DirectionSet, Environment, Observation, Policy,
        Result, Reward, Step,
    };
}
