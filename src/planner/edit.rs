use super::Planner;
use crate::common::Vertex;

use tracing::{debug, instrument, warn};

impl Planner {
    /// Sets the traversal cost of a cell; a negative cost makes it an obstacle.
    /// Start and goal costs cannot be edited.
    pub fn update_cell(&mut self, x: i32, y: i32, cost: f64) {
        let u = Vertex::new(x, y);
        if u == self.start || u == self.goal {
            debug!("ignore cost edit on endpoint {u}");
            return;
        }
        if cost.is_nan() {
            warn!("ignore NaN cost for {u}");
            return;
        }

        self.cell_mut(u).cost = cost;
        self.stats.cell_updates += 1;
        self.update_vertex(u);
    }

    /// Moves the start without rebuilding any search state; previously queued
    /// keys stay comparable through the key modifier.
    pub fn update_start(&mut self, x: i32, y: i32) {
        let start = Vertex::new(x, y);
        if start == self.start {
            return;
        }

        self.start = start;
        self.k_m += self.heuristic(self.last, self.start);
        self.last = self.start;
        self.stats.start_moves += 1;
        debug!("start moved to {start}, k_m = {}", self.k_m);
    }

    /// Re-anchors the search on a new goal. Every heuristic value changes, so
    /// all state is rebuilt and cost edits are replayed.
    #[instrument(skip(self), name = "update_goal", level = "debug")]
    pub fn update_goal(&mut self, x: i32, y: i32) {
        let edited = self.cells.edited_costs(self.config.unseen_cost);

        self.goal = Vertex::new(x, y);
        self.reset_search();
        self.stats.goal_resets += 1;

        debug!("replay {} cost edits", edited.len());
        for (v, cost) in edited {
            self.update_cell(v.x, v.y, cost);
        }
    }
}
