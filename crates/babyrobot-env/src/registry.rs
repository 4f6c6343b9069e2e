//! Environment registry for easy environment creation

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use babyrobot_core::{BabyRobotError, Environment, EnvironmentConfig, GridObservation, Result};

use crate::env::BabyRobotEnv;
use crate::wrappers::TimeLimit;

/// A type-erased grid environment
pub type BoxedEnv = Box<dyn Environment<Observation = GridObservation>>;

type EnvConstructor = Box<dyn Fn(EnvironmentConfig) -> Result<BoxedEnv> + Send + Sync>;

lazy_static::lazy_static! {
    static ref REGISTRY: Arc<Mutex<EnvRegistry>> = Arc::new(Mutex::new(EnvRegistry::with_defaults()));
}

/// Full transition model, all five actions
pub const BABY_ROBOT_V0: &str = "BabyRobot-v0";
/// `-1` per step, all five actions
pub const BABY_ROBOT_ENV_V2: &str = "BabyRobotEnv-v2";
/// Full transition model, only the actions available in each cell
pub const BABY_ROBOT_ENV_V7: &str = "BabyRobotEnv-v7";

/// Global environment registry
pub struct EnvRegistry {
    /// Registered environments
    envs: HashMap<String, EnvConstructor>,
}

impl EnvRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            envs: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in Baby Robot environments
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(BABY_ROBOT_V0, |config| {
            build(with_defaults(config, &[("action_space", "discrete")]))
        });
        registry.register(BABY_ROBOT_ENV_V2, |config| {
            build(with_defaults(
                config,
                &[("action_space", "discrete"), ("reward_mode", "step_penalty")],
            ))
        });
        registry.register(BABY_ROBOT_ENV_V7, |config| {
            build(with_defaults(config, &[("action_space", "dynamic")]))
        });
        registry
    }

    /// Register an environment
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(EnvironmentConfig) -> Result<BoxedEnv> + Send + Sync + 'static,
    {
        self.envs.insert(name.into(), Box::new(constructor));
    }

    /// Create an environment by name
    pub fn make(&self, name: &str, config: EnvironmentConfig) -> Result<BoxedEnv> {
        self.envs
            .get(name)
            .ok_or_else(|| BabyRobotError::Environment(format!("Unknown environment: {name}")))
            .and_then(|constructor| constructor(config))
    }

    /// List registered environments
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.envs.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for EnvRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn with_defaults(mut config: EnvironmentConfig, defaults: &[(&str, &str)]) -> EnvironmentConfig {
    for &(key, value) in defaults {
        config
            .params
            .entry(key)
            .or_insert_with(|| serde_json::Value::from(value));
    }
    config
}

fn build(config: EnvironmentConfig) -> Result<BoxedEnv> {
    let max_steps = config.max_steps;
    let env = BabyRobotEnv::new(config)?;
    Ok(match max_steps {
        Some(max_steps) => Box::new(TimeLimit::new(env, max_steps)),
        None => Box::new(env),
    })
}

fn registry() -> Result<MutexGuard<'static, EnvRegistry>> {
    REGISTRY
        .lock()
        .map_err(|_| BabyRobotError::Environment("environment registry lock poisoned".into()))
}

/// Register an environment globally
pub fn register_env<F>(name: impl Into<String>, constructor: F) -> Result<()>
where
    F: Fn(EnvironmentConfig) -> Result<BoxedEnv> + Send + Sync + 'static,
{
    registry()?.register(name, constructor);
    Ok(())
}

/// Create an environment by name
pub fn make_env(name: &str, config: EnvironmentConfig) -> Result<BoxedEnv> {
    registry()?.make(name, config)
}

/// List all registered environments
pub fn list_envs() -> Result<Vec<String>> {
    Ok(registry()?.list())
}
