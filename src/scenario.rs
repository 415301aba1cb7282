use crate::common::Vertex;
use crate::map::Map;
use crate::planner::{Planner, PlannerConfig};

use anyhow::{Context, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Cell { x: i32, y: i32, cost: f64 },
    Start([i32; 2]),
    Goal([i32; 2]),
    Replan,
}

// Scripted sequence of edits and replans against one planner.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub start: [i32; 2],
    pub goal: [i32; 2],
    #[serde(default)]
    pub map: Option<String>,
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplanRecord {
    pub start: (i32, i32),
    pub goal: (i32, i32),
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub expansions: usize,
    pub path: Vec<(i32, i32)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub replans: Vec<ReplanRecord>,
    pub stats: crate::stat::Stats,
}

impl Scenario {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open scenario {path}"))?;
        serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse scenario {path}"))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    #[instrument(skip_all, name = "scenario", fields(start = ?self.start, goal = ?self.goal), level = "debug")]
    pub fn run(&self, config: &PlannerConfig) -> Result<ScenarioReport> {
        let mut planner = Planner::with_config(self.start.into(), self.goal.into(), config.clone());
        if let Some(map_path) = &self.map {
            let map = Map::from_file(map_path)?;
            let marked = map.apply_to(&mut planner);
            debug!("marked {marked} cells from {map_path}");
        }

        let mut replans = Vec::new();
        for step in &self.steps {
            match *step {
                Step::Cell { x, y, cost } => planner.update_cell(x, y, cost),
                Step::Start([x, y]) => planner.update_start(x, y),
                Step::Goal([x, y]) => planner.update_goal(x, y),
                Step::Replan => replans.push(Self::replan(&mut planner)),
            }
        }

        Ok(ScenarioReport {
            replans,
            stats: planner.stats().clone(),
        })
    }

    fn replan(planner: &mut Planner) -> ReplanRecord {
        let expansions_before = planner.stats().expansions;
        let result = planner.try_replan();
        if let Err(err) = &result {
            warn!("replan failed: {err}");
        }
        ReplanRecord {
            start: planner.start().into(),
            goal: planner.goal().into(),
            found: result.is_ok(),
            error: result.err().map(|err| err.to_string()),
            expansions: planner.stats().expansions - expansions_before,
            path: planner.path_coords(),
        }
    }
}

// Random edits on a framed field, in the spirit of the cost-update benchmarks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Benchmark {
    pub width: i32,
    pub height: i32,
    pub cell_updates: usize,
    pub obstacle_ratio: f64,
    pub max_cost: f64,
    pub start_moves: usize,
}

impl Default for Benchmark {
    fn default() -> Self {
        Benchmark {
            width: 256,
            height: 512,
            cell_updates: 99,
            obstacle_ratio: 0.2,
            max_cost: 100.0,
            start_moves: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BenchmarkReport {
    pub replans: usize,
    pub successful_replans: usize,
    pub total_micros: u64,
    pub max_replan_micros: u64,
    pub expansions: usize,
}

impl Benchmark {
    #[instrument(skip_all, name = "benchmark", fields(width = self.width, height = self.height), level = "debug")]
    pub fn run<R: Rng + ?Sized>(&self, config: &PlannerConfig, rng: &mut R) -> BenchmarkReport {
        let mut planner = Planner::with_config(
            Vertex::new(0, 0),
            Vertex::new(self.width - 1, self.height - 1),
            config.clone(),
        );
        for x in -1..=self.width {
            planner.update_cell(x, -1, -1.0);
            planner.update_cell(x, self.height, -1.0);
        }
        for y in 0..self.height {
            planner.update_cell(-1, y, -1.0);
            planner.update_cell(self.width, y, -1.0);
        }

        for _ in 0..self.cell_updates {
            let x = rng.gen_range(0..self.width);
            let y = rng.gen_range(0..self.height);
            let cost = if rng.gen_bool(self.obstacle_ratio) {
                -1.0
            } else {
                rng.gen_range(1.0..=self.max_cost.max(1.0))
            };
            planner.update_cell(x, y, cost);
        }

        let mut report = BenchmarkReport::default();
        Self::timed_replan(&mut planner, &mut report);
        for _ in 0..self.start_moves {
            let x = rng.gen_range(0..self.width);
            let y = rng.gen_range(0..self.height);
            if planner.is_obstacle(x, y) {
                continue;
            }
            planner.update_start(x, y);
            Self::timed_replan(&mut planner, &mut report);
        }
        report.expansions = planner.stats().expansions;

        info!(
            "benchmark: {}/{} replans succeeded, total {}us, worst {}us",
            report.successful_replans, report.replans, report.total_micros, report.max_replan_micros
        );
        planner.stats().print();
        report
    }

    fn timed_replan(planner: &mut Planner, report: &mut BenchmarkReport) {
        let replan_start_time = Instant::now();
        let found = planner.replan();
        let elapsed = replan_start_time.elapsed().as_micros() as u64;

        report.replans += 1;
        report.successful_replans += usize::from(found);
        report.total_micros += elapsed;
        report.max_replan_micros = report.max_replan_micros.max(elapsed);
    }
}
