//! near_kpiece - parallel KPIECE motion planning with near-projected sampling
//!
//! This crate provides a multi-threaded tree planner that discretizes the
//! explored space through a projection and expands from its least explored
//! cells, together with a real-vector state space to plan in.

// Core modules
pub mod common;
pub mod utils;

// Planning modules
pub mod state_space;
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Goal, ProjectionEvaluator, StateSampler, StateSpace, TerminationCondition};
pub use common::{Path, PlanningError, PlanningResult, Point2D};
pub use path_planning::{NearKpiece, NearKpieceConfig, PlannerStatus, ProblemDefinition, Solution};
