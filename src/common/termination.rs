//! Ready-made termination conditions

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::common::traits::TerminationCondition;

/// Stops once a wall-clock deadline has passed.
///
/// A duration too large to represent as an `Instant` never expires.
#[derive(Debug, Clone, Copy)]
pub struct Timeout {
    deadline: Option<Instant>,
}

impl Timeout {
    pub fn new(duration: Duration) -> Self {
        Self { deadline: Instant::now().checked_add(duration) }
    }

    /// Negative seconds expire at once; infinite or NaN seconds never expire
    pub fn from_secs_f64(seconds: f64) -> Self {
        if seconds.is_nan() {
            return Self { deadline: None };
        }
        match Duration::try_from_secs_f64(seconds.max(0.0)) {
            Ok(duration) => Self::new(duration),
            Err(_) => Self { deadline: None },
        }
    }
}

impl TerminationCondition for Timeout {
    fn should_terminate(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }
}

/// Stops once a shared iteration counter reaches a limit
#[derive(Debug, Clone)]
pub struct IterationLimit {
    counter: Arc<AtomicU64>,
    limit: u64,
}

impl IterationLimit {
    pub fn new(counter: Arc<AtomicU64>, limit: u64) -> Self {
        Self { counter, limit }
    }
}

impl TerminationCondition for IterationLimit {
    fn should_terminate(&self) -> bool {
        self.counter.load(Ordering::Acquire) >= self.limit
    }
}

/// Stops when either of two conditions does
#[derive(Debug, Clone)]
pub struct Either<A, B> {
    first: A,
    second: B,
}

impl<A, B> TerminationCondition for Either<A, B>
where
    A: TerminationCondition,
    B: TerminationCondition,
{
    fn should_terminate(&self) -> bool {
        self.first.should_terminate() || self.second.should_terminate()
    }
}

/// Combine two conditions; the result stops as soon as one of them does
pub fn or<A, B>(first: A, second: B) -> Either<A, B>
where
    A: TerminationCondition,
    B: TerminationCondition,
{
    Either { first, second }
}
