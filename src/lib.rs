pub mod common;
pub mod config;
pub mod map;
pub mod planner;
pub mod scenario;
pub mod stat;

pub use common::{Key, Vertex};
pub use planner::{PlanError, Planner, PlannerConfig, SearchOutcome};
