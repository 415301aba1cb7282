use super::{Planner, SearchOutcome};
use crate::common::{approx_cmp, close};

use std::cmp::Ordering;
use tracing::{debug, instrument, trace, warn};

impl Planner {
    /// Expands open vertices until the start is locally consistent and no open
    /// key is smaller than the start key.
    #[instrument(skip_all, name = "compute_shortest_path", fields(start = %self.start, goal = %self.goal), level = "debug")]
    pub fn compute_shortest_path(&mut self) -> SearchOutcome {
        let mut expansions = 0;

        let outcome = loop {
            let start_key = self.calculate_key(self.start);
            let start_inconsistent = !close(self.get_rhs(self.start), self.get_g(self.start));
            let keep_expanding = match self.open.top_key() {
                Some(top) => top.lt(&start_key) || start_inconsistent,
                None => start_inconsistent,
            };
            if !keep_expanding {
                break SearchOutcome::Success;
            }

            if expansions >= self.config.max_expansions {
                warn!(
                    "expansion budget of {} reached with {} open vertices",
                    self.config.max_expansions,
                    self.open.len()
                );
                break SearchOutcome::Exhausted;
            }
            expansions += 1;

            let Some((u, k_old)) = self.open.poll_valid() else {
                break if start_inconsistent {
                    SearchOutcome::NoPathPossible
                } else {
                    SearchOutcome::Success
                };
            };
            self.open.remove(u);

            let k_new = self.calculate_key(u);
            trace!("expand {u} with key {k_old} (fresh {k_new})");

            if k_old.lt(&k_new) {
                // Queued before the key modifier or its neighbours moved.
                self.open.insert(u, k_new);
            } else if approx_cmp(self.get_g(u), self.get_rhs(u)) == Ordering::Greater {
                let rhs = self.get_rhs(u);
                self.set_g(u, rhs);
                for p in self.predecessors(u) {
                    self.update_vertex(p);
                }
            } else {
                self.set_g(u, f64::INFINITY);
                for p in self.predecessors(u) {
                    self.update_vertex(p);
                }
                self.update_vertex(u);
            }
        };

        self.stats.expansions += expansions;
        debug!(
            "{outcome:?} after {expansions} expansions, {} open, g(start) = {}",
            self.open.len(),
            self.get_g(self.start)
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Vertex;
    use crate::planner::PlannerConfig;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }

    fn assert_window_consistent(planner: &Planner, lo: i32, hi: i32) {
        for x in lo..=hi {
            for y in lo..=hi {
                if planner.open.contains(Vertex::new(x, y)) {
                    continue;
                }
                assert!(
                    planner.is_consistent(x, y),
                    "({x}, {y}) closed but g = {} rhs = {}",
                    planner.g(x, y),
                    planner.rhs(x, y)
                );
            }
        }
    }

    #[test]
    fn test_free_grid_needs_no_expansion() {
        init_tracing();
        let mut planner = Planner::new(0, 0, 7, 3);
        assert_eq!(planner.compute_shortest_path(), SearchOutcome::Success);
        assert_eq!(planner.stats().expansions, 0);
    }

    #[test]
    fn test_wall_converges_to_true_cost() {
        init_tracing();
        // Wall at x = 2 from y = -3 to y = 3 between (0, 0) and (4, 0).
        let mut planner = Planner::new(0, 0, 4, 0);
        for y in -3..=3 {
            planner.update_cell(2, y, -1.0);
        }
        assert_eq!(planner.compute_shortest_path(), SearchOutcome::Success);

        assert!(planner.is_consistent(0, 0));
        // Detour around a wall end at y = 4 or y = -4.
        assert!(planner.g(0, 0) > 4.0 + 1.0);
        assert!(planner.g(0, 0).is_finite());
        assert_window_consistent(&planner, -1, 5);

        let start_key = planner.calculate_key(Vertex::new(0, 0));
        if let Some(top) = planner.open.top_key() {
            assert!(!top.lt(&start_key), "stopped with {top} below {start_key}");
        }
    }

    #[test]
    fn test_enclosed_start_settles_at_infinity() {
        init_tracing();
        // No straight or diagonal line into the goal crosses the ring, so the
        // raise wave behind it stays finite once the start reaches infinity.
        let mut planner = Planner::new(0, 0, 5, 2);
        for (dx, dy) in crate::common::DIRECTIONS {
            planner.update_cell(dx, dy, -1.0);
        }
        assert_eq!(planner.compute_shortest_path(), SearchOutcome::Success);
        assert_eq!(planner.g(0, 0), f64::INFINITY);
        assert_eq!(planner.rhs(0, 0), f64::INFINITY);
    }

    #[test]
    fn test_enclosed_goal_runs_out_of_budget() {
        init_tracing();
        // The lattice is unbounded, so the raise wave around a sealed goal
        // only stops at the expansion cap.
        let config = PlannerConfig {
            max_expansions: 2_000,
            ..PlannerConfig::default()
        };
        let mut planner = Planner::with_config(Vertex::new(0, 0), Vertex::new(5, 5), config);
        for (dx, dy) in crate::common::DIRECTIONS {
            planner.update_cell(5 + dx, 5 + dy, -1.0);
        }
        assert_eq!(planner.compute_shortest_path(), SearchOutcome::Exhausted);
    }

    #[test]
    fn test_single_edit_restores_consistency() {
        init_tracing();
        let mut planner = Planner::new(0, 0, 6, 6);
        planner.update_cell(3, 3, 10.0);
        assert_eq!(planner.compute_shortest_path(), SearchOutcome::Success);
        assert!(planner.is_consistent(0, 0));
        assert_window_consistent(&planner, 0, 6);
    }

    #[test]
    fn test_budget_exhaustion() {
        init_tracing();
        let config = PlannerConfig {
            max_expansions: 3,
            ..PlannerConfig::default()
        };
        let mut planner = Planner::with_config(Vertex::new(0, 0), Vertex::new(10, 0), config);
        for y in -5..=5 {
            planner.update_cell(5, y, -1.0);
        }
        assert_eq!(planner.compute_shortest_path(), SearchOutcome::Exhausted);
        assert_eq!(planner.stats().expansions, 3);
    }
}
