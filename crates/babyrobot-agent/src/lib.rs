//! Planning and learning for the Baby Robot grid world
//!
//! This crate provides:
//! - `GridPolicy`, a per-cell direction policy with greedy improvement
//! - Iterative policy evaluation and value iteration over the transition model
//! - Monte Carlo prediction of state and action values from played episodes
//! - `ScriptedPolicy`, which replays a fixed route

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod monte_carlo;
pub mod policy;
pub mod policy_evaluation;
pub mod scripted;
pub mod utils;
pub mod value_iteration;

// Re-export planners and estimators
pub use monte_carlo::{
    ActionValues, Estimator, MonteCarlo, MonteCarloConfig, StateValues, VisitRule,
};
pub use policy::{GridPolicy, TIE_TOLERANCE};
pub use policy_evaluation::PolicyEvaluation;
pub use scripted::ScriptedPolicy;
pub use value_iteration::ValueIteration;

// Re-export utilities
pub use utils::{incremental_mean, is_close, max_abs_diff, mean_abs_diff, DeltaType};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DeltaType, GridPolicy, MonteCarlo, MonteCarloConfig, PolicyEvaluation, ScriptedPolicy,
        ValueIteration,
    };
    pub use babyrobot_env::prelude::*;
}
