//! Axis-aligned projection for real-vector states

use nalgebra::DVector;

use crate::common::{PlanningError, PlanningResult, ProjectionEvaluator};
use crate::state_space::real_vector::RealVectorSpace;

/// Number of cells along each projected axis for the default cell sizes
const DEFAULT_CELLS_PER_AXIS: f64 = 20.0;

/// Projects a state onto a subset of its axes
#[derive(Debug, Clone)]
pub struct AxisProjection {
    axes: Vec<usize>,
    cell_sizes: Vec<f64>,
}

impl AxisProjection {
    pub fn new(axes: Vec<usize>, cell_sizes: Vec<f64>) -> PlanningResult<Self> {
        if axes.is_empty() || axes.len() != cell_sizes.len() {
            return Err(PlanningError::InvalidParameter(
                "projection needs one cell size per projected axis".to_string(),
            ));
        }
        if cell_sizes.iter().any(|s| !(*s > 0.0)) {
            return Err(PlanningError::InvalidParameter(
                "projection cell sizes must be positive".to_string(),
            ));
        }
        Ok(Self { axes, cell_sizes })
    }

    /// First (up to) two axes of the space, each split into 20 cells
    pub fn for_space(space: &RealVectorSpace) -> PlanningResult<Self> {
        let axes: Vec<usize> = (0..space.dimension().min(2)).collect();
        let cell_sizes = axes
            .iter()
            .map(|&axis| space.bounds().extent(axis) / DEFAULT_CELLS_PER_AXIS)
            .collect();
        Self::new(axes, cell_sizes)
    }

    pub fn axes(&self) -> &[usize] {
        &self.axes
    }
}

impl ProjectionEvaluator<DVector<f64>> for AxisProjection {
    fn dimension(&self) -> usize {
        self.axes.len()
    }

    fn cell_sizes(&self) -> &[f64] {
        &self.cell_sizes
    }

    fn project(&self, state: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            self.axes.len(),
            self.axes.iter().map(|&axis| state.get(axis).copied().unwrap_or(0.0)),
        )
    }
}
