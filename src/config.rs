use crate::planner::PlannerConfig;
use crate::scenario::Benchmark;

use anyhow::{anyhow, Result};
use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(
    name = "D* Lite",
    about = "Incremental D* Lite path planning on an 8-connected grid.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to a YAML scenario file")]
    pub scenario: Option<String>,

    #[arg(long, help = "Path to a MovingAI map file")]
    pub map: Option<String>,

    #[arg(long, help = "Start cell as x,y", value_parser = parse_cell)]
    pub start: Option<(i32, i32)>,

    #[arg(long, help = "Goal cell as x,y", value_parser = parse_cell)]
    pub goal: Option<(i32, i32)>,

    #[arg(long, help = "Run the random benchmark with this many cost updates")]
    pub bench: Option<usize>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Write a JSON report to this path")]
    pub output: Option<String>,

    #[arg(long, help = "Expansion budget per replan")]
    pub max_expansions: Option<usize>,
}

fn parse_cell(value: &str) -> Result<(i32, i32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got {value}"))?;
    let x = x.trim().parse().map_err(|err| format!("invalid x: {err}"))?;
    let y = y.trim().parse().map_err(|err| format!("invalid y: {err}"))?;
    Ok((x, y))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scenario: Option<String>,
    pub map: Option<String>,
    pub start: (i32, i32),
    pub goal: (i32, i32),
    pub seed: u64,
    pub output: Option<String>,
    // Cost updates for the random benchmark, `None` runs a scenario instead.
    pub bench: Option<usize>,
    pub benchmark: Benchmark,
    pub planner: PlannerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scenario: None,
            map: None,
            start: (2, 0),
            goal: (10, 10),
            seed: 0,
            output: None,
            bench: None,
            benchmark: Benchmark::default(),
            planner: PlannerConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> Result<Self> {
        if let Some(scenario) = &cli.scenario {
            self.scenario = Some(scenario.clone());
        }
        if let Some(map) = &cli.map {
            self.map = Some(map.clone());
        }
        if let Some(start) = cli.start {
            self.start = start;
        }
        if let Some(goal) = cli.goal {
            self.goal = goal;
        }
        if let Some(bench) = cli.bench {
            self.bench = Some(bench);
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(output) = &cli.output {
            self.output = Some(output.clone());
        }
        if let Some(max_expansions) = cli.max_expansions {
            self.planner.max_expansions = max_expansions;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.planner.max_expansions == 0 {
            return Err(anyhow!("Expansion budget must be positive"));
        }
        if !(self.planner.unseen_cost > 0.0 && self.planner.unseen_cost.is_finite()) {
            return Err(anyhow!(
                "Unseen cell cost must be positive and finite, got {}",
                self.planner.unseen_cost
            ));
        }
        if self.planner.max_path_len == 0 {
            return Err(anyhow!("Maximum path length must be positive"));
        }
        if self.benchmark.width <= 0 || self.benchmark.height <= 0 {
            return Err(anyhow!(
                "Benchmark field must be non-empty, got {}x{}",
                self.benchmark.width,
                self.benchmark.height
            ));
        }
        if !(0.0..=1.0).contains(&self.benchmark.obstacle_ratio) {
            return Err(anyhow!(
                "Obstacle ratio must be within [0, 1], got {}",
                self.benchmark.obstacle_ratio
            ));
        }
        if self.scenario.is_some() && self.bench.is_some() {
            return Err(anyhow!("Choose either a scenario or a benchmark, not both"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_str_fills_defaults() {
        let config = Config::from_yaml_str(
            r#"
start: [0, 0]
goal: [1000, 100]
planner:
  max_expansions: 500000
benchmark:
  width: 64
"#,
        )
        .unwrap();
        assert_eq!(config.start, (0, 0));
        assert_eq!(config.goal, (1000, 100));
        assert_eq!(config.planner.max_expansions, 500_000);
        assert_eq!(config.planner.unseen_cost, 1.0);
        assert_eq!(config.benchmark.width, 64);
        assert_eq!(config.benchmark.height, 512);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_command_line_overrides() {
        let cli = Cli::parse_from([
            "dstar_lite",
            "--start",
            "5,-3",
            "--goal",
            "7, 8",
            "--bench",
            "20",
            "--max-expansions",
            "10",
        ]);
        let config = Config::default().override_from_command_line(&cli).unwrap();
        assert_eq!(config.start, (5, -3));
        assert_eq!(config.goal, (7, 8));
        assert_eq!(config.bench, Some(20));
        assert_eq!(config.planner.max_expansions, 10);
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = Config::default();
        config.planner.unseen_cost = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.benchmark.obstacle_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scenario = Some("scenario_file/demo.yaml".to_string());
        config.bench = Some(10);
        assert!(config.validate().is_err());

        assert!(Cli::try_parse_from(["dstar_lite", "--start", "5"]).is_err());
    }
}
