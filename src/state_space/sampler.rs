//! Near-projected state sampler

use std::sync::Arc;

use rand::RngCore;

use crate::common::{MotionValidity, NearProjectedSampler, StateSampler, StateSpace};

/// Sampler that retracts uniform-near samples onto the valid part of the
/// transition from the center, so its output needs no further checking.
pub struct ProjectedNearSampler<Sp> {
    space: Arc<Sp>,
}

impl<Sp: StateSpace> ProjectedNearSampler<Sp> {
    pub fn new(space: Arc<Sp>) -> Self {
        Self { space }
    }
}

impl<Sp: StateSpace> StateSampler<Sp::State> for ProjectedNearSampler<Sp> {
    fn sample_uniform_near(
        &self,
        rng: &mut dyn RngCore,
        center: &Sp::State,
        max_distance: f64,
    ) -> Sp::State {
        self.space.sample_uniform_near(rng, center, max_distance)
    }

    fn near_projected(&self) -> Option<&dyn NearProjectedSampler<Sp::State>> {
        Some(self)
    }
}

impl<Sp: StateSpace> NearProjectedSampler<Sp::State> for ProjectedNearSampler<Sp> {
    fn sample_near_valid(
        &self,
        rng: &mut dyn RngCore,
        center: &Sp::State,
        max_distance: f64,
    ) -> Sp::State {
        let candidate = self.space.sample_uniform_near(rng, center, max_distance);
        match self.space.check_motion(center, &candidate) {
            MotionValidity::Valid => candidate,
            MotionValidity::Invalid { last_valid, .. } => last_valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_space::real_vector::{BallObstacle, Bounds, RealVectorSpace};
    use nalgebra::DVector;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_near_valid_samples_are_valid() {
        let bounds = Bounds::square(0.0, 10.0).unwrap();
        let space = Arc::new(
            RealVectorSpace::new(bounds, vec![BallObstacle::circle(5.0, 5.0, 1.0)]).unwrap(),
        );
        let sampler = ProjectedNearSampler::new(space.clone());
        assert!(sampler.near_projected().is_some());

        let mut rng = StdRng::seed_from_u64(5);
        let center = DVector::from_vec(vec![3.5, 5.0]);
        for _ in 0..100 {
            let s = sampler.sample_near_valid(&mut rng, &center, 1.0);
            assert!(space.is_valid(&s));
            assert!(space.check_motion(&center, &s).is_valid());
        }
    }

    #[test]
    fn test_uniform_near_samples_are_unchecked() {
        let bounds = Bounds::square(0.0, 10.0).unwrap();
        let space = Arc::new(
            RealVectorSpace::new(bounds, vec![BallObstacle::circle(5.0, 5.0, 1.0)]).unwrap(),
        );
        let sampler = ProjectedNearSampler::new(space.clone());

        let mut rng = StdRng::seed_from_u64(6);
        let center = DVector::from_vec(vec![3.5, 5.0]);
        let samples: Vec<_> = (0..200)
            .map(|_| sampler.sample_uniform_near(&mut rng, &center, 1.0))
            .collect();
        for s in samples.iter() {
            assert!((s - &center).amax() <= 1.0 + 1e-12);
        }
        assert!(samples.iter().any(|s| !space.is_valid(s)));
    }
}
