pub mod coordinator;
pub mod error;
pub mod executable;
pub mod planner;
pub mod status;
