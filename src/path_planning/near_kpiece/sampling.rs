//! Per-attempt choice of the next candidate state
//!
//! Samplers come in two classes. Near-projected samplers and near goals
//! produce states that are valid and connectable by construction, and their
//! output is used as is. Everything else is checked with the state space's
//! motion validator, keeping mostly-valid transitions up to their last valid
//! state.

use rand::{Rng, RngCore};

use crate::common::{
    Goal, MotionValidity, NearGoal, NearProjectedSampler, StateSampler, StateSpace,
};

/// How goal-biased samples are drawn, resolved once per solve
pub enum GoalSampling<'a, S> {
    /// The goal yields states connectable from the source
    Near(&'a dyn NearGoal<S>),
    /// Goal samples are validated against the source
    Validated,
}

/// How regular expansion samples are drawn, resolved once per solve
pub enum ExpansionSampling<'a, S> {
    /// The configured sampler yields valid states near the source
    NearProjected(&'a dyn NearProjectedSampler<S>),
    /// The configured sampler's output is validated
    Sampler(&'a dyn StateSampler<S>),
    /// The state space samples, and its output is validated
    Space,
}

/// Parameters of the sampling decision
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    pub goal_bias: f64,
    pub max_distance: f64,
    pub min_valid_path_fraction: f64,
}

/// Decision procedure producing candidate states for one source at a time
pub struct SamplingStrategy<'a, Sp: StateSpace> {
    space: &'a Sp,
    goal: &'a dyn Goal<Sp::State>,
    goal_sampling: GoalSampling<'a, Sp::State>,
    expansion: ExpansionSampling<'a, Sp::State>,
    params: SamplingParams,
}

impl<'a, Sp: StateSpace> SamplingStrategy<'a, Sp> {
    /// Probe the goal and the sampler for their near capabilities
    pub fn resolve(
        space: &'a Sp,
        goal: &'a dyn Goal<Sp::State>,
        sampler: Option<&'a dyn StateSampler<Sp::State>>,
        params: SamplingParams,
    ) -> Self {
        let goal_sampling = match goal.near() {
            Some(near) => GoalSampling::Near(near),
            None => GoalSampling::Validated,
        };
        let expansion = match sampler {
            Some(s) => match s.near_projected() {
                Some(near) => ExpansionSampling::NearProjected(near),
                None => ExpansionSampling::Sampler(s),
            },
            None => ExpansionSampling::Space,
        };

        Self { space, goal, goal_sampling, expansion, params }
    }

    pub fn uses_near_goal(&self) -> bool {
        matches!(self.goal_sampling, GoalSampling::Near(_))
    }

    pub fn uses_near_sampler(&self) -> bool {
        matches!(self.expansion, ExpansionSampling::NearProjected(_))
    }

    /// Candidate state to expand `source` toward, or `None` when the attempt failed
    pub fn sample(&self, rng: &mut dyn RngCore, source: &Sp::State) -> Option<Sp::State> {
        if rng.gen::<f64>() < self.params.goal_bias && self.goal.can_sample() {
            return match self.goal_sampling {
                GoalSampling::Near(near) => Some(near.sample_connectable(rng, source)),
                GoalSampling::Validated => {
                    let target = self.goal.sample_goal(rng)?;
                    self.validate(source, target)
                }
            };
        }

        let max_distance = self.params.max_distance;
        match self.expansion {
            ExpansionSampling::NearProjected(near) => {
                Some(near.sample_near_valid(rng, source, max_distance))
            }
            ExpansionSampling::Sampler(sampler) => {
                let target = sampler.sample_uniform_near(rng, source, max_distance);
                self.validate(source, target)
            }
            ExpansionSampling::Space => {
                let target = self.space.sample_uniform_near(rng, source, max_distance);
                self.validate(source, target)
            }
        }
    }

    fn validate(&self, source: &Sp::State, target: Sp::State) -> Option<Sp::State> {
        match self.space.check_motion(source, &target) {
            MotionValidity::Valid => Some(target),
            MotionValidity::Invalid { last_valid, fraction }
                if fraction > self.params.min_valid_path_fraction =>
            {
                Some(last_valid)
            }
            MotionValidity::Invalid { .. } => None,
        }
    }
}
