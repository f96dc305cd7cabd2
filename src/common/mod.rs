//! Common types, traits, and error definitions for near_kpiece
//!
//! This module provides the collaborator interfaces the planner is
//! written against, plus the shared value types and errors.

pub mod types;
pub mod traits;
pub mod error;
pub mod termination;

pub use types::*;
pub use traits::*;
pub use error::*;
pub use termination::{or, Either, IterationLimit, Timeout};
