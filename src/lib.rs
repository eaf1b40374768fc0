pub mod classifier;
pub mod config;
pub mod error;
pub mod output;
pub mod planner;
pub mod projection;
pub mod reference;
pub mod server;
pub mod types;

#[cfg(test)]
mod testing;

pub use error::{PlanError, PlanStatus};
pub use planner::PlanResult;
pub use reference::ReferenceData;
