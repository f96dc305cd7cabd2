//! Counting mocks on a 1-D line, shared by the planner tests

use std::sync::atomic::{AtomicUsize, Ordering};

use nalgebra::DVector;
use rand::{Rng, RngCore};

use crate::common::{
    discrete_motion_check, Goal, MotionValidity, NearGoal, NearProjectedSampler,
    ProjectionEvaluator, StateSampler, StateSpace,
};

/// Line `[0, length]`, optionally with an open interval blocked
pub struct CountingLine {
    length: f64,
    blocked: Option<(f64, f64)>,
    check_motion_calls: AtomicUsize,
    sample_calls: AtomicUsize,
}

impl CountingLine {
    pub fn free(length: f64) -> Self {
        Self {
            length,
            blocked: None,
            check_motion_calls: AtomicUsize::new(0),
            sample_calls: AtomicUsize::new(0),
        }
    }

    pub fn blocked(length: f64, from: f64, to: f64) -> Self {
        Self { blocked: Some((from, to)), ..Self::free(length) }
    }

    pub fn check_motion_calls(&self) -> usize {
        self.check_motion_calls.load(Ordering::SeqCst)
    }

    pub fn sample_calls(&self) -> usize {
        self.sample_calls.load(Ordering::SeqCst)
    }
}

impl StateSpace for CountingLine {
    type State = f64;

    fn distance(&self, a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }

    fn max_extent(&self) -> f64 {
        self.length
    }

    fn is_valid(&self, state: &f64) -> bool {
        let blocked = self.blocked.map_or(false, |(lo, hi)| *state > lo && *state < hi);
        *state >= 0.0 && *state <= self.length && !blocked
    }

    fn interpolate(&self, from: &f64, to: &f64, t: f64) -> f64 {
        from + (to - from) * t
    }

    fn sample_uniform_near(&self, rng: &mut dyn RngCore, center: &f64, max_distance: f64) -> f64 {
        self.sample_calls.fetch_add(1, Ordering::SeqCst);
        uniform_on_line(rng, self.length, *center, max_distance)
    }

    fn check_motion(&self, from: &f64, to: &f64) -> MotionValidity<f64> {
        self.check_motion_calls.fetch_add(1, Ordering::SeqCst);
        discrete_motion_check(self, from, to)
    }
}

fn uniform_on_line(rng: &mut dyn RngCore, length: f64, center: f64, max_distance: f64) -> f64 {
    let lo = (center - max_distance).max(0.0);
    let hi = (center + max_distance).min(length);
    if lo < hi {
        rng.gen_range(lo..=hi)
    } else {
        center.clamp(0.0, length)
    }
}

/// Goal interval `[low, high]` on the line
pub struct LineGoal {
    low: f64,
    high: f64,
    sampleable: bool,
    near: bool,
    sample_calls: AtomicUsize,
}

impl LineGoal {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high, sampleable: true, near: false, sample_calls: AtomicUsize::new(0) }
    }

    pub fn with_near(mut self) -> Self {
        self.near = true;
        self
    }

    pub fn unsampleable(mut self) -> Self {
        self.sampleable = false;
        self
    }

    pub fn sample_calls(&self) -> usize {
        self.sample_calls.load(Ordering::SeqCst)
    }
}

impl Goal<f64> for LineGoal {
    fn is_satisfied(&self, state: &f64) -> (bool, f64) {
        let distance = if *state < self.low {
            self.low - state
        } else if *state > self.high {
            state - self.high
        } else {
            0.0
        };
        (distance <= 0.0, distance)
    }

    fn can_sample(&self) -> bool {
        self.sampleable
    }

    fn sample_goal(&self, rng: &mut dyn RngCore) -> Option<f64> {
        self.sample_calls.fetch_add(1, Ordering::SeqCst);
        Some(rng.gen_range(self.low..=self.high))
    }

    fn near(&self) -> Option<&dyn NearGoal<f64>> {
        if self.near {
            Some(self)
        } else {
            None
        }
    }
}

impl NearGoal<f64> for LineGoal {
    fn sample_connectable(&self, rng: &mut dyn RngCore, _from: &f64) -> f64 {
        self.sample_calls.fetch_add(1, Ordering::SeqCst);
        rng.gen_range(self.low..=self.high)
    }
}

/// Sampler on the line `[0, 10]`.
///
/// The plain variant always steps `max_distance` forward and has no near
/// capability; the near variant samples uniformly and reports near-projected.
pub struct LineSampler {
    near: bool,
    near_calls: AtomicUsize,
    uniform_calls: AtomicUsize,
}

impl LineSampler {
    pub fn near() -> Self {
        Self { near: true, near_calls: AtomicUsize::new(0), uniform_calls: AtomicUsize::new(0) }
    }

    pub fn plain() -> Self {
        Self { near: false, ..Self::near() }
    }

    pub fn near_calls(&self) -> usize {
        self.near_calls.load(Ordering::SeqCst)
    }

    pub fn uniform_calls(&self) -> usize {
        self.uniform_calls.load(Ordering::SeqCst)
    }
}

impl StateSampler<f64> for LineSampler {
    fn sample_uniform_near(&self, _rng: &mut dyn RngCore, center: &f64, max_distance: f64) -> f64 {
        self.uniform_calls.fetch_add(1, Ordering::SeqCst);
        center + max_distance
    }

    fn near_projected(&self) -> Option<&dyn NearProjectedSampler<f64>> {
        if self.near {
            Some(self)
        } else {
            None
        }
    }
}

impl NearProjectedSampler<f64> for LineSampler {
    fn sample_near_valid(&self, rng: &mut dyn RngCore, center: &f64, max_distance: f64) -> f64 {
        self.near_calls.fetch_add(1, Ordering::SeqCst);
        uniform_on_line(rng, 10.0, *center, max_distance)
    }
}

/// Identity projection of the line with a fixed cell size
pub struct LineProjection {
    cell_sizes: [f64; 1],
}

impl LineProjection {
    pub fn new(cell_size: f64) -> Self {
        Self { cell_sizes: [cell_size] }
    }
}

impl ProjectionEvaluator<f64> for LineProjection {
    fn dimension(&self) -> usize {
        1
    }

    fn cell_sizes(&self) -> &[f64] {
        &self.cell_sizes
    }

    fn project(&self, state: &f64) -> DVector<f64> {
        DVector::from_element(1, *state)
    }
}
