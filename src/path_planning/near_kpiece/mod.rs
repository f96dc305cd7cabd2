//! Parallel KPIECE with near-projected sampling
//!
//! Several worker threads grow one tree of motions. A projection maps
//! states to grid cells; cells are ranked by how unexplored they look and
//! the workers expand from the most promising ones.

pub mod config;
pub mod discretization;
pub mod motion;
pub mod planner;
pub mod sampling;
pub mod solution;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::NearKpieceConfig;
pub use discretization::GridDiscretization;
pub use motion::{Motion, MotionArena};
pub use planner::{NearKpiece, PlannerStatus, ProblemDefinition, Solution};
pub use sampling::{ExpansionSampling, GoalSampling, SamplingParams, SamplingStrategy};
pub use solution::{SolutionOutcome, SolutionRecord};
pub use worker::{SearchTree, Worker, WorkerContext, WorkerStats};
