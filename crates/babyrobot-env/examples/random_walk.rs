//! Example: a random robot wandering through a puddled maze

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use babyrobot_core::{ActionSpace, Environment, EnvironmentConfig, TrackedEnvironment};
use babyrobot_env::{make_env, TARGET_REACHED};

const LEVEL: &str = r#"{
    "seed": 11,
    "max_steps": 400,
    "width": 6,
    "height": 5,
    "add_maze": true,
    "maze_seed": 3,
    "walls": [[[2, 2], "E", 2]],
    "puddles": [[[1, 1], 2], [[3, 2], 1], [[4, 4], 1]],
    "base_areas": [[[5, 0, 1, 1], "grass"]]
}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EnvironmentConfig::from_json(LEVEL).context("parsing level")?;
    let env = make_env("BabyRobotEnv-v7", config).context("building environment")?;
    let mut env = TrackedEnvironment::new(env);
    let mut rng = StdRng::seed_from_u64(5);

    let num_episodes = 5;
    for episode in 0..num_episodes {
        let (mut observation, _info) = env.reset().await?;
        let mut slips = 0;

        loop {
            let action = env.action_space().sample(&mut rng);
            let step = env.step(action).await?;
            if step.info.get_bool(TARGET_REACHED) == Some(false) {
                slips += 1;
            }
            observation = step.observation;
            if step.done {
                break;
            }
        }

        let info = env.episode_info().context("episode not tracked")?;
        tracing::info!(
            episode,
            steps = info.steps,
            total_reward = info.total_reward,
            truncated = info.truncated,
            slips,
            final_position = ?observation,
            "episode finished"
        );
    }

    env.close().await?;
    Ok(())
}
