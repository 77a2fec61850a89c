pub mod actor;
pub mod critic;
pub mod planner;
