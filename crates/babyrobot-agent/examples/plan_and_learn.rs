//! Example: plan a route with value iteration, then check it by Monte Carlo

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use babyrobot_agent::{MonteCarlo, MonteCarloConfig, ValueIteration};
use babyrobot_env::{BabyRobotEnv, Grid, GridConfig};

const LEVEL: &str = r#"{
    "width": 5,
    "height": 4,
    "walls": [[[1, 0], "S", 2]],
    "puddles": [[[2, 1], 2], [[3, 2], 1]],
    "grid_areas": [[[0, 3, 2, 1], "orange", -3.0]]
}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GridConfig::from_json(LEVEL).context("parsing level")?;
    let grid = Grid::new(&config)?;

    let mut planner = ValueIteration::new(&grid).with_discount_factor(1.0);
    let sweeps = planner.run_to_convergence(200, 1e-6)?;
    let policy = planner.greedy_policy()?;
    tracing::info!(sweeps, "value iteration finished");
    for y in 0..grid.height() {
        let row: Vec<String> = (0..grid.width())
            .map(|x| {
                let directions = policy.state_directions(x, y).map(|d| d.to_string());
                format!("{:>5.1} {:<4}", planner.values()[[y, x]], directions.unwrap_or_default())
            })
            .collect();
        tracing::info!("{}", row.join(" | "));
    }

    let env = BabyRobotEnv::from_grid_config(config, Some(7))?;
    let mc_config = MonteCarloConfig {
        exploring_starts: true,
        seed: Some(7),
        ..MonteCarloConfig::default()
    };
    let mut mc = MonteCarlo::first_visit(env, policy, mc_config);
    let deltas = mc.run(500).await?;
    tracing::info!(
        final_delta = deltas.last().copied().unwrap_or_default(),
        start_value = mc.estimator().values()[[0, 0]],
        planned_value = planner.values()[[0, 0]],
        "monte carlo estimate of the planned route"
    );

    Ok(())
}
