use dstar_lite::config::{Cli, Config};
use dstar_lite::scenario::{Benchmark, Scenario, Step};

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let report = if let Some(cell_updates) = config.bench {
        let bench = Benchmark {
            cell_updates,
            ..config.benchmark.clone()
        };
        let mut rng = StdRng::seed_from_u64(config.seed);
        serde_json::to_value(bench.run(&config.planner, &mut rng))?
    } else {
        let scenario = match &config.scenario {
            Some(path) => Scenario::load_from_file(path)?,
            None => Scenario {
                start: [config.start.0, config.start.1],
                goal: [config.goal.0, config.goal.1],
                map: config.map.clone(),
                steps: vec![Step::Replan],
            },
        };
        let report = scenario.run(&config.planner)?;
        for (index, record) in report.replans.iter().enumerate() {
            if record.found {
                info!(
                    "replan {index}: {:?} -> {:?} in {} steps",
                    record.start,
                    record.goal,
                    record.path.len().saturating_sub(1)
                );
                for (step, (x, y)) in record.path.iter().enumerate() {
                    println!("{step}: {x} {y}");
                }
            } else {
                error!(
                    "replan {index}: {:?} -> {:?} failed: {}",
                    record.start,
                    record.goal,
                    record.error.as_deref().unwrap_or("unknown")
                );
            }
        }
        report.stats.print();
        serde_json::to_value(report)?
    };

    if let Some(output) = &config.output {
        std::fs::write(output, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("failed to write report: {output}"))?;
        info!("report written to {output}");
    }

    Ok(())
}
