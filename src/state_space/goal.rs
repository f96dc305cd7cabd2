//! Box goal regions

use std::sync::Arc;

use nalgebra::DVector;
use rand::{Rng, RngCore};

use crate::common::{Goal, MotionValidity, NearGoal, PlanningError, PlanningResult, StateSpace};

/// Axis-aligned box goal region
#[derive(Debug, Clone)]
pub struct GoalBox {
    low: DVector<f64>,
    high: DVector<f64>,
}

impl GoalBox {
    pub fn new(low: Vec<f64>, high: Vec<f64>) -> PlanningResult<Self> {
        if low.is_empty() || low.len() != high.len() {
            return Err(PlanningError::InvalidParameter(
                "goal box needs matching non-empty corners".to_string(),
            ));
        }
        if low.iter().zip(&high).any(|(l, h)| l > h) {
            return Err(PlanningError::InvalidParameter(
                "goal box low corner must not exceed its high corner".to_string(),
            ));
        }
        Ok(Self { low: DVector::from_vec(low), high: DVector::from_vec(high) })
    }

    pub fn low(&self) -> &DVector<f64> {
        &self.low
    }

    pub fn high(&self) -> &DVector<f64> {
        &self.high
    }

    /// Euclidean distance from a state to the box, zero inside
    pub fn distance_to(&self, state: &DVector<f64>) -> f64 {
        state
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .map(|(v, (l, h))| {
                if v < l {
                    l - v
                } else if v > h {
                    v - h
                } else {
                    0.0
                }
            })
            .map(|d| d * d)
            .sum::<f64>()
            .sqrt()
    }

    fn sample_inside(&self, rng: &mut dyn RngCore) -> DVector<f64> {
        DVector::from_iterator(
            self.low.len(),
            self.low.iter().zip(self.high.iter()).map(|(&l, &h)| {
                if l < h {
                    rng.gen_range(l..=h)
                } else {
                    l
                }
            }),
        )
    }
}

impl Goal<DVector<f64>> for GoalBox {
    fn is_satisfied(&self, state: &DVector<f64>) -> (bool, f64) {
        let distance = self.distance_to(state);
        (distance <= 0.0, distance)
    }

    fn can_sample(&self) -> bool {
        true
    }

    fn sample_goal(&self, rng: &mut dyn RngCore) -> Option<DVector<f64>> {
        Some(self.sample_inside(rng))
    }
}

/// Box goal that samples states connectable from a given source.
///
/// A goal point is drawn inside the box and the straight transition from the
/// source is retracted to its last valid state.
pub struct ProjectedGoalBox<Sp> {
    region: GoalBox,
    space: Arc<Sp>,
}

impl<Sp> ProjectedGoalBox<Sp>
where
    Sp: StateSpace<State = DVector<f64>>,
{
    pub fn new(region: GoalBox, space: Arc<Sp>) -> Self {
        Self { region, space }
    }

    pub fn region(&self) -> &GoalBox {
        &self.region
    }
}

impl<Sp> Goal<DVector<f64>> for ProjectedGoalBox<Sp>
where
    Sp: StateSpace<State = DVector<f64>>,
{
    fn is_satisfied(&self, state: &DVector<f64>) -> (bool, f64) {
        self.region.is_satisfied(state)
    }

    fn can_sample(&self) -> bool {
        true
    }

    fn sample_goal(&self, rng: &mut dyn RngCore) -> Option<DVector<f64>> {
        self.region.sample_goal(rng)
    }

    fn near(&self) -> Option<&dyn NearGoal<DVector<f64>>> {
        Some(self)
    }
}

impl<Sp> NearGoal<DVector<f64>> for ProjectedGoalBox<Sp>
where
    Sp: StateSpace<State = DVector<f64>>,
{
    fn sample_connectable(&self, rng: &mut dyn RngCore, from: &DVector<f64>) -> DVector<f64> {
        let target = self.region.sample_inside(rng);
        match self.space.check_motion(from, &target) {
            MotionValidity::Valid => target,
            MotionValidity::Invalid { last_valid, .. } => last_valid,
        }
    }
}
