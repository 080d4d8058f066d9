mod main;
mod planner_command;
mod risk_command;
mod utils;

// Commands here
mod commands {
    pub use super::planner_command::{max_occupancy, max_time, PlannerArgs};
    pub use super::risk_command::{risk, RiskArgs};
}

pub use main::*;
