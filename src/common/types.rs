//! Common types used throughout near_kpiece

use itertools::Itertools;
use nalgebra::DVector;

/// 2D point representation, used for plotting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// First two components of a real-vector state; missing components read as zero.
    pub fn from_state(state: &DVector<f64>) -> Self {
        let x = state.get(0).copied().unwrap_or(0.0);
        let y = state.get(1).copied().unwrap_or(0.0);
        Self { x, y }
    }
}

/// Stable handle of a motion inside a `MotionArena`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MotionId(pub(crate) usize);

impl MotionId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Handle of a cell inside a discretization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(pub usize);

/// Discretized projection coordinate, used as grid key
pub type Coord = Vec<i64>;

/// Outcome of validating the straight transition between two states
#[derive(Debug, Clone, PartialEq)]
pub enum MotionValidity<S> {
    /// Every checked state along the transition is valid
    Valid,
    /// The transition hits an invalid state; `last_valid` sits at `fraction` of the way
    Invalid { last_valid: S, fraction: f64 },
}

impl<S> MotionValidity<S> {
    pub fn is_valid(&self) -> bool {
        matches!(self, MotionValidity::Valid)
    }
}

/// Path represented as a sequence of states, start first
#[derive(Debug, Clone)]
pub struct Path<S> {
    pub states: Vec<S>,
}

impl<S> Path<S> {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    pub fn from_states(states: Vec<S>) -> Self {
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<&S> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&S> {
        self.states.last()
    }

    /// Sum of segment lengths under the given metric
    pub fn total_length<F>(&self, distance: F) -> f64
    where
        F: Fn(&S, &S) -> f64,
    {
        self.states
            .iter()
            .tuple_windows()
            .map(|(a, b)| distance(a, b))
            .sum()
    }
}

impl<S> Default for Path<S> {
    fn default() -> Self {
        Self::new()
    }
}
