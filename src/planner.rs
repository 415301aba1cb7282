//! Incremental D* Lite planner over an implicit 8-connected grid.
//!
//! All search state is owned by a [`Planner`]: the sparse cell store, the open
//! list with its validity index, the start/goal pair and the key modifier.
//! Callers edit costs or move the endpoints, then call [`Planner::replan`] to
//! repair only the part of the search the edits invalidated.
//!
//! The octile heuristic assumes orthogonal steps cost `unseen_cost` and
//! diagonal steps `sqrt(2) * unseen_cost`. Cells edited to a cheaper cost make
//! it inadmissible; paths stay obstacle-free but may no longer be optimal.

mod edit;
mod extract;
mod search;

use crate::common::{
    close, octile_distance, CellInfo, CellStore, Key, OpenList, Vertex, DIRECTIONS,
};
use crate::stat::Stats;

use serde::Deserialize;
use std::f64::consts::SQRT_2;
use thiserror::Error;
use tracing::trace;

pub const DEFAULT_UNSEEN_COST: f64 = 1.0;
pub const DEFAULT_MAX_EXPANSIONS: usize = 80_000;
pub const DEFAULT_MAX_PATH_LEN: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    // Expansions allowed per `compute_shortest_path` call.
    pub max_expansions: usize,
    // Cost of a cell that was never edited.
    pub unseen_cost: f64,
    // Upper bound on vertices in an extracted path.
    pub max_path_len: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            unseen_cost: DEFAULT_UNSEEN_COST,
            max_path_len: DEFAULT_MAX_PATH_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Success,
    // Open list ran dry while the start was still inconsistent.
    NoPathPossible,
    // Expansion budget hit.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("goal {goal} is unreachable from {start}")]
    Unreachable { start: Vertex, goal: Vertex },
    #[error("expansion budget exceeded after {expansions} expansions")]
    BudgetExceeded { expansions: usize },
    #[error("dead end at {at}: no traversable successor")]
    DeadEnd { at: Vertex },
    #[error("path extraction revisited {at}")]
    CycleDetected { at: Vertex },
}

#[derive(Debug)]
pub struct Planner {
    config: PlannerConfig,
    start: Vertex,
    goal: Vertex,
    // Start position at the last key modifier update.
    last: Vertex,
    k_m: f64,
    cells: CellStore,
    open: OpenList,
    path: Vec<Vertex>,
    stats: Stats,
}

impl Planner {
    pub fn new(start_x: i32, start_y: i32, goal_x: i32, goal_y: i32) -> Self {
        Self::with_config(
            Vertex::new(start_x, start_y),
            Vertex::new(goal_x, goal_y),
            PlannerConfig::default(),
        )
    }

    pub fn with_config(start: Vertex, goal: Vertex, config: PlannerConfig) -> Self {
        let mut planner = Planner {
            config,
            start,
            goal,
            last: start,
            k_m: 0.0,
            cells: CellStore::new(),
            open: OpenList::new(),
            path: Vec::new(),
            stats: Stats::default(),
        };
        planner.reset_search();
        planner
    }

    pub fn start(&self) -> Vertex {
        self.start
    }

    pub fn goal(&self) -> Vertex {
        self.goal
    }

    pub fn k_m(&self) -> f64 {
        self.k_m
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Vertices believed to need re-expansion.
    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// Number of cells with a stored record.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Route from the last successful replan, start to goal inclusive.
    pub fn path(&self) -> &[Vertex] {
        &self.path
    }

    pub fn path_coords(&self) -> Vec<(i32, i32)> {
        self.path.iter().map(|v| (v.x, v.y)).collect()
    }

    pub fn g(&self, x: i32, y: i32) -> f64 {
        self.get_g(Vertex::new(x, y))
    }

    pub fn rhs(&self, x: i32, y: i32) -> f64 {
        self.get_rhs(Vertex::new(x, y))
    }

    /// Traversal cost of a cell, the unseen cost if it was never edited.
    pub fn cost(&self, x: i32, y: i32) -> f64 {
        self.cells
            .get(Vertex::new(x, y))
            .map_or(self.config.unseen_cost, |info| info.cost)
    }

    pub fn is_obstacle(&self, x: i32, y: i32) -> bool {
        self.cells.is_obstacle(Vertex::new(x, y))
    }

    pub fn is_consistent(&self, x: i32, y: i32) -> bool {
        let v = Vertex::new(x, y);
        close(self.get_g(v), self.get_rhs(v))
    }

    // Clears all search state and seeds the goal and start records.
    fn reset_search(&mut self) {
        self.cells.clear();
        self.open.clear();
        self.path.clear();
        self.k_m = 0.0;

        self.cells
            .insert(self.goal, CellInfo::seeded(0.0, self.config.unseen_cost));
        if self.start != self.goal {
            let h = self.heuristic(self.start, self.goal);
            self.cells
                .insert(self.start, CellInfo::seeded(h, self.config.unseen_cost));
        }
        self.last = self.start;
    }

    fn heuristic(&self, a: Vertex, b: Vertex) -> f64 {
        octile_distance(a, b) * self.config.unseen_cost
    }

    fn get_g(&self, u: Vertex) -> f64 {
        match self.cells.get(u) {
            Some(info) => info.g,
            None => self.heuristic(u, self.goal),
        }
    }

    fn get_rhs(&self, u: Vertex) -> f64 {
        if u == self.goal {
            return 0.0;
        }
        match self.cells.get(u) {
            Some(info) => info.rhs,
            None => self.heuristic(u, self.goal),
        }
    }

    // Record for `u`, seeded with the heuristic estimate if it is new.
    fn cell_mut(&mut self, u: Vertex) -> &mut CellInfo {
        let estimate = self.heuristic(u, self.goal);
        let cost = self.config.unseen_cost;
        self.cells
            .get_or_insert_with(u, || CellInfo::seeded(estimate, cost))
    }

    fn set_g(&mut self, u: Vertex, g: f64) {
        self.cell_mut(u).g = g;
    }

    fn set_rhs(&mut self, u: Vertex, rhs: f64) {
        self.cell_mut(u).rhs = rhs;
    }

    // Edge cost is charged to the origin cell.
    fn edge_cost(&self, a: Vertex, b: Vertex) -> f64 {
        let scale = if a.is_diagonal_to(&b) { SQRT_2 } else { 1.0 };
        let cost = self
            .cells
            .get(a)
            .map_or(self.config.unseen_cost, |info| info.cost);
        scale * cost
    }

    fn traversable_neighbors(&self, u: Vertex) -> Vec<Vertex> {
        DIRECTIONS
            .iter()
            .map(|&(dx, dy)| u.offset(dx, dy))
            .filter(|n| !self.cells.is_obstacle(*n))
            .collect()
    }

    // An obstacle has no successors.
    fn successors(&self, u: Vertex) -> Vec<Vertex> {
        if self.cells.is_obstacle(u) {
            return Vec::new();
        }
        self.traversable_neighbors(u)
    }

    fn predecessors(&self, u: Vertex) -> Vec<Vertex> {
        self.traversable_neighbors(u)
    }

    fn calculate_key(&self, u: Vertex) -> Key {
        let val = self.get_g(u).min(self.get_rhs(u));
        Key::new(val + self.heuristic(u, self.start) + self.k_m, val)
    }

    fn insert(&mut self, u: Vertex) {
        let key = self.calculate_key(u);
        trace!("open {u} with key {key}");
        self.open.insert(u, key);
    }

    fn update_vertex(&mut self, u: Vertex) {
        if u != self.goal {
            let rhs = self
                .successors(u)
                .into_iter()
                .map(|s| self.edge_cost(u, s) + self.get_g(s))
                .fold(f64::INFINITY, f64::min);
            if !close(self.get_rhs(u), rhs) {
                self.set_rhs(u, rhs);
            }
        }

        if close(self.get_g(u), self.get_rhs(u)) {
            self.open.remove(u);
        } else {
            self.insert(u);
        }
    }
}
