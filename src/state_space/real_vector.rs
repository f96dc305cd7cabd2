//! Bounded real-vector state space with ball obstacles

use nalgebra::DVector;
use rand::{Rng, RngCore};

use crate::common::{PlanningError, PlanningResult, StateSpace};

/// Axis-aligned bounds of the space
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub low: Vec<f64>,
    pub high: Vec<f64>,
}

impl Bounds {
    pub fn new(low: Vec<f64>, high: Vec<f64>) -> PlanningResult<Self> {
        if low.is_empty() || low.len() != high.len() {
            return Err(PlanningError::InvalidParameter(format!(
                "bounds need matching non-empty low/high, got {} and {}",
                low.len(),
                high.len()
            )));
        }
        if low.iter().zip(&high).any(|(l, h)| !(l < h)) {
            return Err(PlanningError::InvalidParameter(
                "every low bound must be below its high bound".to_string(),
            ));
        }
        Ok(Self { low, high })
    }

    /// Square area `[min, max]^2`
    pub fn square(min: f64, max: f64) -> PlanningResult<Self> {
        Self::new(vec![min, min], vec![max, max])
    }

    pub fn dimension(&self) -> usize {
        self.low.len()
    }

    pub fn extent(&self, axis: usize) -> f64 {
        self.high[axis] - self.low[axis]
    }

    pub fn contains(&self, state: &DVector<f64>) -> bool {
        state.len() == self.dimension()
            && state
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(v, (l, h))| *v >= *l && *v <= *h)
    }
}

/// Ball obstacle (circle in 2D)
#[derive(Debug, Clone)]
pub struct BallObstacle {
    pub center: DVector<f64>,
    pub radius: f64,
}

impl BallObstacle {
    pub fn new(center: DVector<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Self::new(DVector::from_vec(vec![x, y]), radius)
    }
}

/// Real-vector state space; states are `DVector<f64>`
#[derive(Debug, Clone)]
pub struct RealVectorSpace {
    bounds: Bounds,
    obstacles: Vec<BallObstacle>,
    robot_radius: f64,
}

impl RealVectorSpace {
    pub fn new(bounds: Bounds, obstacles: Vec<BallObstacle>) -> PlanningResult<Self> {
        let dim = bounds.dimension();
        if let Some(obs) = obstacles.iter().find(|o| o.center.len() != dim) {
            return Err(PlanningError::InvalidParameter(format!(
                "obstacle of dimension {} in a {}-dimensional space",
                obs.center.len(),
                dim
            )));
        }
        Ok(Self { bounds, obstacles, robot_radius: 0.0 })
    }

    /// Inflate every obstacle by the robot radius
    pub fn with_robot_radius(mut self, robot_radius: f64) -> Self {
        self.robot_radius = robot_radius.max(0.0);
        self
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn obstacles(&self) -> &[BallObstacle] {
        &self.obstacles
    }

    pub fn dimension(&self) -> usize {
        self.bounds.dimension()
    }

    fn check_collision(&self, state: &DVector<f64>) -> bool {
        self.obstacles
            .iter()
            .all(|obs| (&obs.center - state).norm() > obs.radius + self.robot_radius)
    }
}

impl StateSpace for RealVectorSpace {
    type State = DVector<f64>;

    fn distance(&self, a: &DVector<f64>, b: &DVector<f64>) -> f64 {
        (a - b).norm()
    }

    fn max_extent(&self) -> f64 {
        (0..self.dimension())
            .map(|axis| self.bounds.extent(axis).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    fn is_valid(&self, state: &DVector<f64>) -> bool {
        self.bounds.contains(state) && self.check_collision(state)
    }

    fn interpolate(&self, from: &DVector<f64>, to: &DVector<f64>, t: f64) -> DVector<f64> {
        from + (to - from) * t
    }

    fn sample_uniform_near(
        &self,
        rng: &mut dyn RngCore,
        center: &DVector<f64>,
        max_distance: f64,
    ) -> DVector<f64> {
        DVector::from_iterator(
            self.dimension(),
            (0..self.dimension()).map(|axis| {
                let low = self.bounds.low[axis];
                let high = self.bounds.high[axis];
                let c = center[axis].clamp(low, high);
                let lo = (c - max_distance).max(low);
                let hi = (c + max_distance).min(high);
                if lo < hi {
                    rng.gen_range(lo..=hi)
                } else {
                    c
                }
            }),
        )
    }
}
