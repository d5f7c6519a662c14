pub mod config;
pub mod planner;

pub use config::PlannerConfig;
pub use planner::ItineraryPlanner;
