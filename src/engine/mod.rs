//! Apply engine for mzconverge
//!
//! The engine works in three passes:
//! 1. Planning - Compare declared resources with the state file
//! 2. Display - Show the planned actions
//! 3. Executing - Drive each action through the lifecycle orchestrator

pub mod differ;
pub mod executor;
pub mod planner;

pub use executor::{ExecuteOptions, execute};
pub use planner::{Plan, destroy_plan, plan};
