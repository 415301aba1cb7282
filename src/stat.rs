use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub expansions: usize,
    pub replans: usize,
    pub failed_replans: usize,
    pub cell_updates: usize,
    pub start_moves: usize,
    pub goal_resets: usize,
    pub last_replan_micros: u64,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Replans {:?} (failed {:?}) Expansions {:?} Last replan time(microseconds) {:?} Cell updates {:?} Start moves {:?} Goal resets {:?}",
            self.replans,
            self.failed_replans,
            self.expansions,
            self.last_replan_micros,
            self.cell_updates,
            self.start_moves,
            self.goal_resets
        );
    }
}
