//! Environment wrappers

use async_trait::async_trait;

use babyrobot_core::{Action, ActionSpace, Environment, ObservationSpace, Step, StepInfo};

/// Time limit wrapper
pub struct TimeLimit<E> {
    /// Inner environment
    pub env: E,
    /// Maximum steps
    pub max_steps: usize,
    /// Current step count
    pub steps: usize,
}

impl<E> TimeLimit<E> {
    /// Create a new time limit wrapper
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            max_steps,
            steps: 0,
        }
    }
}

#[async_trait]
impl<E> Environment for TimeLimit<E>
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

    async fn reset(&mut self) -> babyrobot_core::Result<(Self::Observation, StepInfo)> {
        self.steps = 0;
        self.env.reset().await
    }

    async fn step(&mut self, action: Action) -> babyrobot_core::Result<Step<Self::Observation>> {
        self.steps += 1;
        let mut step = self.env.step(action).await?;

        if self.steps >= self.max_steps && !step.done {
            tracing::debug!(steps = self.steps, "episode truncated");
            step.truncated = true;
            step.done = true;
        }

        Ok(step)
    }

    async fn close(&mut self) -> babyrobot_core::Result<()> {
        self.env.close().await
    }
}
