//! Environment traits and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Action, ActionSpace, Observation, ObservationSpace, Reward};

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct Step<O> {
    /// Observation from the environment
    pub observation: O,
    /// Reward signal
    pub reward: Reward,
    /// Whether the episode is done
    pub done: bool,
    /// Whether the episode was truncated (e.g., time limit)
    pub truncated: bool,
    /// Additional info from the environment
    pub info: StepInfo,
}

/// Additional information from a step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepInfo {
    /// Custom fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl StepInfo {
    /// Set a field, returning the updated info
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Read a boolean field
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(serde_json::Value::as_bool)
    }
}

/// Episode information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Episode ID
    pub id: String,
    /// Total reward
    pub total_reward: f64,
    /// Number of steps
    pub steps: usize,
    /// Whether episode was truncated
    pub truncated: bool,
    /// Start time
    pub start_time: chrono::DateTime<chrono::Utc>,
    /// End time
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Configuration for environments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Random seed
    pub seed: Option<u64>,
    /// Maximum episode steps
    pub max_steps: Option<usize>,
    /// Render mode
    pub render_mode: Option<String>,
    /// Additional parameters
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl EnvironmentConfig {
    /// Build a config from a JSON object; known keys are lifted out and the
    /// rest is kept in `params`
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the random seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Core environment trait
#[async_trait]
pub trait Environment: Send + Sync {
    /// Observation type
    type Observation: Observation + 'static;

    /// Get the observation space
    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>>;

    /// Get the action space for the current state
    fn action_space(&self) -> Box<dyn ActionSpace>;

    /// Reset the environment
    async fn reset(&mut self) -> crate::Result<(Self::Observation, StepInfo)>;

    /// Take a step in the environment
    async fn step(&mut self, action: Action) -> crate::Result<Step<Self::Observation>>;

    /// Close the environment
    async fn close(&mut self) -> crate::Result<()> {
        Ok(())
    }

    /// Get current episode info
    fn episode_info(&self) -> Option<Episode> {
        None
    }
}

#[async_trait]
impl<E> Environment for Box<E>
where
    E: Environment + ?Sized,
{
    type Observation = E::Observation;

    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>> {
        (**self).observation_space()
    }

    fn action_space(&self) -> Box<dyn ActionSpace> {
        (**self).action_space()
    }

    async fn reset(&mut self) -> crate::Result<(Self::Observation, StepInfo)> {
        (**self).reset().await
    }

    async fn step(&mut self, action: Action) -> crate::Result<Step<Self::Observation>> {
        (**self).step(action).await
    }

    async fn close(&mut self) -> crate::Result<()> {
        (**self).close().await
    }

    fn episode_info(&self) -> Option<Episode> {
        (**self).episode_info()
    }
}

/// Wrapper for environments that tracks episodes
pub struct TrackedEnvironment<E> {
    /// Inner environment
    pub env: E,
    /// Current episode
    pub episode: Option<Episode>,
    /// Step counter
    pub step_count: usize,
}

impl<E> TrackedEnvironment<E> {
    /// Create a new tracked environment
    pub fn new(env: E) -> Self {
        Self {
            env,
            episode: None,
            step_count: 0,
        }
    }
}

#[async_trait]
impl<E> Environment for TrackedEnvironment<E>
where
    E: Environment,
{
    type Observation = E::Observation;

    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>> {
        self.env.observation_space()
    }

    fn action_space(&self) -> Box<dyn ActionSpace> {
        self.env.action_space()
    }

    async fn reset(&mut self) -> crate::Result<(Self::Observation, StepInfo)> {
        if let Some(ref mut episode) = self.episode {
            if episode.end_time.is_none() {
                episode.end_time = Some(chrono::Utc::now());
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(episode = %id, "starting episode");
        self.episode = Some(Episode {
            id,
            total_reward: 0.0,
            steps: 0,
            truncated: false,
            start_time: chrono::Utc::now(),
            end_time: None,
        });
        self.step_count = 0;

        self.env.reset().await
    }

    async fn step(&mut self, action: Action) -> crate::Result<Step<Self::Observation>> {
        let step = self.env.step(action).await?;

        self.step_count += 1;
        if let Some(ref mut episode) = self.episode {
            episode.total_reward += step.reward.0;
            episode.steps = self.step_count;

            if step.done || step.truncated {
                episode.truncated = step.truncated;
                episode.end_time = Some(chrono::Utc::now());
            }
        }

        Ok(step)
    }

    async fn close(&mut self) -> crate::Result<()> {
        self.env.close().await
    }

    fn episode_info(&self) -> Option<Episode> {
        self.episode.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, DiscreteSpace, GridObservation, GridObservationSpace, ObservationEncoding};

    /// Walks east along a corridor of length 3
    struct Corridor {
        x: usize,
    }

    #[async_trait]
    impl Environment for Corridor {
        type Observation = GridObservation;

        fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>> {
            Box::new(GridObservationSpace {
                width: 3,
                height: 1,
                encoding: ObservationEncoding::Coordinates,
            })
        }

        fn action_space(&self) -> Box<dyn ActionSpace> {
            Box::new(DiscreteSpace)
        }

        async fn reset(&mut self) -> crate::Result<(Self::Observation, StepInfo)> {
            self.x = 0;
            Ok((GridObservation::Coordinates(Cell::new(0, 0)), StepInfo::default()))
        }

        async fn step(&mut self, action: Action) -> crate::Result<Step<Self::Observation>> {
            if action == Action::East {
                self.x = (self.x + 1).min(2);
            }
            Ok(Step {
                observation: GridObservation::Coordinates(Cell::new(self.x, 0)),
                reward: Reward(-1.0),
                done: self.x == 2,
                truncated: false,
                info: StepInfo::default(),
            })
        }
    }

    #[tokio::test]
    async fn test_tracked_environment_records_episode() {
        let mut env = TrackedEnvironment::new(Corridor { x: 0 });
        env.reset().await.unwrap();
        env.step(Action::East).await.unwrap();
        let last = env.step(Action::East).await.unwrap();
        assert!(last.done);

        let episode = env.episode_info().unwrap();
        assert_eq!(episode.steps, 2);
        assert!((episode.total_reward + 2.0).abs() < 1e-12);
        assert!(episode.end_time.is_some());
        assert!(!episode.truncated);
    }

    #[test]
    fn test_config_keeps_unknown_keys_as_params() {
        let config =
            EnvironmentConfig::from_json(r#"{"seed": 3, "width": 5, "add_maze": true}"#).unwrap();
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.params.get("width"), Some(&serde_json::json!(5)));
        assert_eq!(config.params.get("add_maze"), Some(&serde_json::json!(true)));
    }

    #[test]
    fn test_step_info_fields() {
        let info = StepInfo::default().with("target_reached", true);
        assert_eq!(info.get_bool("target_reached"), Some(true));
        assert_eq!(info.get_bool("missing"), None);
    }
}
