//! Common traits defining the collaborators of the planner

use nalgebra::DVector;
use rand::RngCore;

use crate::common::types::*;

/// Continuous state space the tree grows in
pub trait StateSpace: Send + Sync {
    /// State type; motions own one each
    type State: Clone + std::fmt::Debug + Send + Sync;

    /// Distance between two states
    fn distance(&self, a: &Self::State, b: &Self::State) -> f64;

    /// Largest possible distance between two states of the space
    fn max_extent(&self) -> f64;

    /// Whether a single state is valid (inside bounds, collision free, ...)
    fn is_valid(&self, state: &Self::State) -> bool;

    /// State at fraction `t` of the way from `from` to `to`
    fn interpolate(&self, from: &Self::State, to: &Self::State, t: f64) -> Self::State;

    /// Sample a state within `max_distance` of `center`
    fn sample_uniform_near(
        &self,
        rng: &mut dyn RngCore,
        center: &Self::State,
        max_distance: f64,
    ) -> Self::State;

    /// Length of the longest segment assumed valid between two checked states
    fn validity_resolution(&self) -> f64 {
        0.01 * self.max_extent()
    }

    /// Check the straight transition between two states
    fn check_motion(&self, from: &Self::State, to: &Self::State) -> MotionValidity<Self::State> {
        discrete_motion_check(self, from, to)
    }
}

/// Check a transition at `validity_resolution` steps.
///
/// `from` is assumed valid. Intermediate states are checked in order, then `to`.
pub fn discrete_motion_check<Sp: StateSpace + ?Sized>(
    space: &Sp,
    from: &Sp::State,
    to: &Sp::State,
) -> MotionValidity<Sp::State> {
    let resolution = space.validity_resolution();
    let segments = if resolution > 0.0 {
        ((space.distance(from, to) / resolution).ceil() as usize).max(1)
    } else {
        1
    };

    for j in 1..segments {
        let state = space.interpolate(from, to, j as f64 / segments as f64);
        if !space.is_valid(&state) {
            let fraction = (j - 1) as f64 / segments as f64;
            return MotionValidity::Invalid {
                last_valid: space.interpolate(from, to, fraction),
                fraction,
            };
        }
    }

    if !space.is_valid(to) {
        let fraction = (segments - 1) as f64 / segments as f64;
        return MotionValidity::Invalid {
            last_valid: space.interpolate(from, to, fraction),
            fraction,
        };
    }

    MotionValidity::Valid
}

/// Sampler whose output is valid and reachable from the center by construction
pub trait NearProjectedSampler<S>: Send + Sync {
    /// Sample a state within `max_distance` of `center`; the output needs no validation
    fn sample_near_valid(&self, rng: &mut dyn RngCore, center: &S, max_distance: f64) -> S;
}

/// State sampler configured on the planner in place of the space's own sampling
pub trait StateSampler<S>: Send + Sync {
    /// Sample a state within `max_distance` of `center`; the output must be validated
    fn sample_uniform_near(&self, rng: &mut dyn RngCore, center: &S, max_distance: f64) -> S;

    /// Near-projected capability, if this sampler has one
    fn near_projected(&self) -> Option<&dyn NearProjectedSampler<S>> {
        None
    }
}

/// Goal whose samples are connectable from a given state by construction
pub trait NearGoal<S>: Send + Sync {
    /// Sample a goal-directed state that is valid and connectable from `from`
    fn sample_connectable(&self, rng: &mut dyn RngCore, from: &S) -> S;
}

/// Goal region of a planning problem
pub trait Goal<S>: Send + Sync {
    /// Whether the state satisfies the goal, and its distance to the goal
    fn is_satisfied(&self, state: &S) -> (bool, f64);

    /// Whether goal states can currently be sampled
    fn can_sample(&self) -> bool {
        false
    }

    /// Sample a goal state; `None` when the goal cannot be sampled
    fn sample_goal(&self, _rng: &mut dyn RngCore) -> Option<S> {
        None
    }

    /// Near capability, if this goal has one
    fn near(&self) -> Option<&dyn NearGoal<S>> {
        None
    }
}

/// Projection of states onto a low-dimensional Euclidean space
pub trait ProjectionEvaluator<S>: Send + Sync {
    /// Dimension of the projection
    fn dimension(&self) -> usize;

    /// Size of a grid cell along each projected axis
    fn cell_sizes(&self) -> &[f64];

    /// Continuous projection of a state
    fn project(&self, state: &S) -> DVector<f64>;

    /// Discretized grid coordinate of a state
    fn coordinates(&self, state: &S) -> Coord {
        let projection = self.project(state);
        projection
            .iter()
            .zip(self.cell_sizes())
            .map(|(value, size)| (value / size).floor() as i64)
            .collect()
    }
}

/// Grid discretization of the tree, selecting where to expand next.
///
/// Accessed only under the planner's structural lock.
pub trait Discretization {
    /// Record one expansion attempt
    fn count_iteration(&mut self);

    /// Pick a motion to expand and the cell that holds it
    fn select_motion(&mut self, rng: &mut dyn RngCore) -> Option<(MotionId, CellId)>;

    /// Insert a motion; returns `true` when a new cell was created for it
    fn add_motion(&mut self, motion: MotionId, coord: &[i64], goal_distance: f64) -> bool;

    /// Refresh the selection bookkeeping of a cell
    fn update_cell(&mut self, cell: CellId);

    /// Multiply the exploration score of a cell by `factor`
    fn scale_cell_score(&mut self, cell: CellId, factor: f64);

    fn motion_count(&self) -> usize;

    fn cell_count(&self) -> usize;

    /// Cells surrounded by neighbours along every axis
    fn interior_count(&self) -> usize;

    /// Cells on the border of the explored region
    fn exterior_count(&self) -> usize {
        self.cell_count() - self.interior_count()
    }
}

/// Cooperative stop signal, polled once per worker iteration
pub trait TerminationCondition: Sync {
    /// `true` means stop
    fn should_terminate(&self) -> bool;
}

impl<F> TerminationCondition for F
where
    F: Fn() -> bool + Sync,
{
    fn should_terminate(&self) -> bool {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1-D line on [0, 10] with the open interval (4, 5) blocked
    struct BlockedLine;

    impl StateSpace for BlockedLine {
        type State = f64;

        fn distance(&self, a: &f64, b: &f64) -> f64 {
            (a - b).abs()
        }

        fn max_extent(&self) -> f64 {
            10.0
        }

        fn is_valid(&self, state: &f64) -> bool {
            (0.0..=10.0).contains(state) && !(*state > 4.0 && *state < 5.0)
        }

        fn interpolate(&self, from: &f64, to: &f64, t: f64) -> f64 {
            from + (to - from) * t
        }

        fn sample_uniform_near(&self, _rng: &mut dyn RngCore, center: &f64, _d: f64) -> f64 {
            *center
        }
    }

    #[test]
    fn test_check_motion_valid() {
        assert!(BlockedLine.check_motion(&0.0, &3.0).is_valid());
    }

    #[test]
    fn test_check_motion_reports_last_valid_state() {
        match BlockedLine.check_motion(&0.0, &8.0) {
            MotionValidity::Invalid { last_valid, fraction } => {
                assert!(last_valid <= 4.0);
                assert!(last_valid > 3.8);
                assert!((fraction - last_valid / 8.0).abs() < 1e-9);
            }
            MotionValidity::Valid => panic!("transition crosses the blocked interval"),
        }
    }

    #[test]
    fn test_check_motion_invalid_endpoint() {
        match BlockedLine.check_motion(&3.0, &4.5) {
            MotionValidity::Invalid { fraction, .. } => assert!(fraction < 1.0),
            MotionValidity::Valid => panic!("endpoint is blocked"),
        }
    }

    #[test]
    fn test_closure_is_termination_condition() {
        let stop = || true;
        assert!(stop.should_terminate());
    }
}
