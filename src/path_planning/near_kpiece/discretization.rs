//! Grid discretization of the exploration tree
//!
//! Motions are bucketed into cells by their projected coordinate. Each cell
//! carries an exploration score; expansion sources are drawn from the most
//! important cell, preferring cells on the border of the explored region.

use std::collections::HashMap;

use itertools::iproduct;
use ordered_float::OrderedFloat;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};

use crate::common::{CellId, Coord, Discretization, MotionId};

/// How strongly motion selection inside a cell favors recent motions
const HALF_NORMAL_FOCUS: f64 = 3.0;

#[derive(Debug, Clone)]
struct CellData {
    coord: Coord,
    motions: Vec<MotionId>,
    coverage: f64,
    selections: u32,
    score: f64,
    iteration: u64,
    importance: f64,
    neighbors: usize,
}

impl CellData {
    fn compute_importance(&mut self) {
        self.importance =
            self.score / ((self.neighbors + 1) as f64 * self.coverage * self.selections as f64);
    }
}

/// KPIECE-style grid over projected coordinates
#[derive(Debug, Clone)]
pub struct GridDiscretization {
    dimension: usize,
    border_fraction: f64,
    cells: Vec<CellData>,
    index: HashMap<Coord, CellId>,
    iteration: u64,
    size: usize,
    recent_cell: Option<CellId>,
}

impl GridDiscretization {
    pub fn new(dimension: usize, border_fraction: f64) -> Self {
        Self {
            dimension,
            border_fraction,
            cells: Vec::new(),
            index: HashMap::new(),
            iteration: 1,
            size: 0,
            recent_cell: None,
        }
    }

    pub fn cell_at(&self, coord: &[i64]) -> Option<CellId> {
        self.index.get(coord).copied()
    }

    /// Cell created most recently
    pub fn recent_cell(&self) -> Option<CellId> {
        self.recent_cell
    }

    pub fn cell_score(&self, cell: CellId) -> Option<f64> {
        self.cells.get(cell.0).map(|c| c.score)
    }

    pub fn cell_importance(&self, cell: CellId) -> Option<f64> {
        self.cells.get(cell.0).map(|c| c.importance)
    }

    pub fn cell_motions(&self, cell: CellId) -> &[MotionId] {
        self.cells.get(cell.0).map(|c| c.motions.as_slice()).unwrap_or(&[])
    }

    /// A cell is interior once all of its axis neighbours exist
    pub fn is_interior(&self, cell: CellId) -> bool {
        self.cells
            .get(cell.0)
            .map_or(false, |c| c.neighbors >= 2 * self.dimension)
    }

    fn neighbor_coords(&self, coord: &[i64]) -> Vec<Coord> {
        iproduct!(0..self.dimension, [-1_i64, 1])
            .map(|(axis, step)| {
                let mut neighbor = coord.to_vec();
                neighbor[axis] += step;
                neighbor
            })
            .collect()
    }

    fn create_cell(&mut self, coord: &[i64], motion: MotionId, goal_distance: f64) -> CellId {
        let id = CellId(self.cells.len());
        let mut neighbors = 0;
        for neighbor in self.neighbor_coords(coord) {
            if let Some(&other) = self.index.get(&neighbor) {
                let cell = &mut self.cells[other.0];
                cell.neighbors += 1;
                cell.compute_importance();
                neighbors += 1;
            }
        }

        let mut cell = CellData {
            coord: coord.to_vec(),
            motions: vec![motion],
            coverage: 1.0,
            selections: 1,
            score: (1.0 + (self.iteration as f64).ln()) / (1.0 + goal_distance),
            iteration: self.iteration,
            importance: 0.0,
            neighbors,
        };
        cell.compute_importance();

        self.index.insert(cell.coord.clone(), id);
        self.cells.push(cell);
        self.recent_cell = Some(id);
        id
    }

    fn top_cell(&self, interior: bool) -> Option<CellId> {
        (0..self.cells.len())
            .map(CellId)
            .filter(|&id| self.is_interior(id) == interior)
            .max_by_key(|id| OrderedFloat(self.cells[id.0].importance))
    }

    fn boost_all_scores(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.score += 1.0 + (cell.iteration as f64).ln();
            cell.compute_importance();
        }
    }
}

/// Index in `0..len`, half-normally distributed toward `len - 1`
fn half_normal_index(rng: &mut dyn RngCore, len: usize) -> usize {
    let last = len.saturating_sub(1);
    let mean = len as f64;
    let normal = match Normal::new(mean, mean / HALF_NORMAL_FOCUS) {
        Ok(normal) => normal,
        Err(_) => return last,
    };

    let mut v = normal.sample(rng);
    if v > mean {
        v = 2.0 * mean - v;
    }
    let r = v.max(0.0).floor() as usize;
    r.min(last)
}

impl Discretization for GridDiscretization {
    fn count_iteration(&mut self) {
        self.iteration += 1;
    }

    fn select_motion(&mut self, rng: &mut dyn RngCore) -> Option<(MotionId, CellId)> {
        if self.cells.is_empty() {
            return None;
        }

        let exterior_fraction = self.exterior_count() as f64 / self.cells.len() as f64;
        let prefer_exterior = rng.gen::<f64>() < self.border_fraction.max(exterior_fraction);
        let cell = self
            .top_cell(!prefer_exterior)
            .or_else(|| self.top_cell(prefer_exterior))?;

        if self.cells[cell.0].score < f64::EPSILON {
            self.boost_all_scores();
        }

        let data = &mut self.cells[cell.0];
        if data.motions.is_empty() {
            return None;
        }
        data.selections += 1;
        let pick = half_normal_index(rng, data.motions.len());
        Some((data.motions[pick], cell))
    }

    fn add_motion(&mut self, motion: MotionId, coord: &[i64], goal_distance: f64) -> bool {
        self.size += 1;
        match self.index.get(coord).copied() {
            Some(id) => {
                let cell = &mut self.cells[id.0];
                cell.motions.push(motion);
                cell.coverage += 1.0;
                cell.compute_importance();
                false
            }
            None => {
                self.create_cell(coord, motion, goal_distance);
                true
            }
        }
    }

    fn update_cell(&mut self, cell: CellId) {
        if let Some(data) = self.cells.get_mut(cell.0) {
            data.compute_importance();
        }
    }

    fn scale_cell_score(&mut self, cell: CellId, factor: f64) {
        if let Some(data) = self.cells.get_mut(cell.0) {
            data.score *= factor;
            data.compute_importance();
        }
    }

    fn motion_count(&self) -> usize {
        self.size
    }

    fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn interior_count(&self) -> usize {
        (0..self.cells.len()).filter(|&i| self.is_interior(CellId(i))).count()
    }
}
