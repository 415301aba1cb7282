use super::{PlanError, Planner, SearchOutcome};
use crate::common::{close, euclidean_distance, Vertex};

use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, instrument};

impl Planner {
    /// Repairs the search and extracts a route. Returns whether a path was
    /// found; the path itself is available through [`Planner::path`].
    pub fn replan(&mut self) -> bool {
        self.try_replan().is_ok()
    }

    #[instrument(skip_all, name = "replan", fields(start = %self.start, goal = %self.goal), level = "debug")]
    pub fn try_replan(&mut self) -> Result<(), PlanError> {
        let replan_start_time = Instant::now();
        self.path.clear();
        self.stats.replans += 1;

        let result = self.search_and_extract();
        self.stats.last_replan_micros = replan_start_time.elapsed().as_micros() as u64;

        match result {
            Ok(path) => {
                debug!("found path with {} vertices", path.len());
                self.path = path;
                Ok(())
            }
            Err(err) => {
                debug!("replan failed: {err}");
                self.stats.failed_replans += 1;
                Err(err)
            }
        }
    }

    fn search_and_extract(&mut self) -> Result<Vec<Vertex>, PlanError> {
        let expansions_before = self.stats.expansions;
        match self.compute_shortest_path() {
            SearchOutcome::Exhausted => {
                return Err(PlanError::BudgetExceeded {
                    expansions: self.stats.expansions - expansions_before,
                })
            }
            SearchOutcome::NoPathPossible => {
                return Err(PlanError::Unreachable {
                    start: self.start,
                    goal: self.goal,
                })
            }
            SearchOutcome::Success => {}
        }

        if self.get_g(self.start).is_infinite() {
            return Err(PlanError::Unreachable {
                start: self.start,
                goal: self.goal,
            });
        }

        self.extract_path()
    }

    // Greedy walk along the cheapest successor. Equal-cost options prefer the
    // one geometrically closest to the straight start-goal segment.
    fn extract_path(&self) -> Result<Vec<Vertex>, PlanError> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.start;

        while current != self.goal {
            if !visited.insert(current) || path.len() >= self.config.max_path_len {
                return Err(PlanError::CycleDetected { at: current });
            }
            path.push(current);

            let mut best: Option<(Vertex, f64, f64)> = None;
            for next in self.successors(current) {
                let value = self.edge_cost(current, next) + self.get_g(next);
                let detour =
                    euclidean_distance(next, self.goal) + euclidean_distance(self.start, next);
                best = match best {
                    Some((_, best_value, best_detour))
                        if close(value, best_value) && detour < best_detour =>
                    {
                        Some((next, value, detour))
                    }
                    Some((_, best_value, _)) if !close(value, best_value) && value < best_value => {
                        Some((next, value, detour))
                    }
                    None => Some((next, value, detour)),
                    keep => keep,
                };
            }

            match best {
                Some((next, value, _)) if value.is_finite() => current = next,
                _ => return Err(PlanError::DeadEnd { at: current }),
            }
        }

        path.push(self.goal);
        Ok(path)
    }
}
