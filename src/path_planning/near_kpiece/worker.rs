//! Expansion loop run by every worker thread

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rand::rngs::StdRng;

use crate::common::{
    Discretization, Goal, MotionId, ProjectionEvaluator, StateSpace, TerminationCondition,
};
use crate::path_planning::near_kpiece::motion::{Motion, MotionArena};
use crate::path_planning::near_kpiece::sampling::SamplingStrategy;
use crate::path_planning::near_kpiece::solution::SolutionRecord;

/// Tree structure guarded by the structural lock: the motions and their grid
pub struct SearchTree<S, D> {
    pub arena: MotionArena<S>,
    pub disc: D,
}

impl<S: Clone, D: Discretization> SearchTree<S, D> {
    pub fn new(disc: D) -> Self {
        Self { arena: MotionArena::new(), disc }
    }

    /// Insert a motion into the arena and the discretization
    pub fn insert(&mut self, motion: Motion<S>, coord: &[i64], goal_distance: f64) -> MotionId {
        let id = self.arena.push(motion);
        self.disc.add_motion(id, coord, goal_distance);
        id
    }
}

/// Everything the workers of one solve share
pub struct WorkerContext<'a, Sp: StateSpace, D> {
    pub tree: &'a Mutex<SearchTree<Sp::State, D>>,
    pub record: &'a SolutionRecord,
    pub iterations: &'a AtomicU64,
    pub strategy: &'a SamplingStrategy<'a, Sp>,
    pub goal: &'a dyn Goal<Sp::State>,
    pub projection: &'a dyn ProjectionEvaluator<Sp::State>,
    pub ptc: &'a dyn TerminationCondition,
    pub failed_expansion_score_factor: f64,
}

/// Per-worker counters, logged when the worker stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub iterations: u64,
    pub added: u64,
    pub failed: u64,
    pub found_exact: bool,
}

/// One thread's expansion loop with its private random generator
pub struct Worker {
    id: usize,
    rng: StdRng,
}

impl Worker {
    pub fn new(id: usize, rng: StdRng) -> Self {
        Self { id, rng }
    }

    pub fn run<Sp, D>(mut self, ctx: &WorkerContext<'_, Sp, D>) -> WorkerStats
    where
        Sp: StateSpace,
        D: Discretization,
    {
        let mut stats = WorkerStats::default();

        while !ctx.record.has_exact_solution() && !ctx.ptc.should_terminate() {
            let (source, source_state, cell) = {
                let mut tree = ctx.tree.lock();
                ctx.iterations.fetch_add(1, Ordering::AcqRel);
                tree.disc.count_iteration();

                let selected = tree
                    .disc
                    .select_motion(&mut self.rng)
                    .and_then(|(m, c)| tree.arena.get(m).map(|x| (m, x.state().clone(), c)));
                match selected {
                    Some(found) => found,
                    None => {
                        log::warn!("worker {}: discretization has nothing to expand", self.id);
                        break;
                    }
                }
            };
            stats.iterations += 1;

            let candidate = match ctx.strategy.sample(&mut self.rng, &source_state) {
                Some(candidate) => candidate,
                None => {
                    stats.failed += 1;
                    let mut tree = ctx.tree.lock();
                    tree.disc.scale_cell_score(cell, ctx.failed_expansion_score_factor);
                    tree.disc.update_cell(cell);
                    continue;
                }
            };

            let (solved, distance) = ctx.goal.is_satisfied(&candidate);
            let coord = ctx.projection.coordinates(&candidate);
            let motion = ctx
                .tree
                .lock()
                .insert(Motion::with_parent(candidate, source), &coord, distance);
            stats.added += 1;

            if solved {
                stats.found_exact = ctx.record.try_commit_exact(motion, distance);
                break;
            }
            ctx.record.try_improve_approx(motion, distance);

            ctx.tree.lock().disc.update_cell(cell);
        }

        log::debug!(
            "worker {}: {} iterations, {} motions added, {} failed expansions{}",
            self.id,
            stats.iterations,
            stats.added,
            stats.failed,
            if stats.found_exact { ", found exact solution" } else { "" }
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_planning::near_kpiece::discretization::GridDiscretization;
    use crate::path_planning::near_kpiece::sampling::SamplingParams;
    use crate::path_planning::near_kpiece::testing::{CountingLine, LineGoal, LineProjection};
    use rand::SeedableRng;

    fn seeded_tree(projection: &LineProjection) -> Mutex<SearchTree<f64, GridDiscretization>> {
        let mut tree = SearchTree::new(GridDiscretization::new(1, 0.9));
        tree.insert(Motion::root(0.0), &projection.coordinates(&0.0), 1.0);
        Mutex::new(tree)
    }

    #[test]
    fn test_worker_stops_on_exact_solution() {
        let space = CountingLine::free(10.0);
        let goal = LineGoal::new(9.0, 10.0);
        let projection = LineProjection::new(0.5);
        let tree = seeded_tree(&projection);
        let record = SolutionRecord::new();
        let iterations = AtomicU64::new(0);
        let params = SamplingParams {
            goal_bias: 0.5,
            max_distance: 1.0,
            min_valid_path_fraction: 0.5,
        };
        let strategy = SamplingStrategy::resolve(&space, &goal, None, params);
        let never = || false;

        let ctx = WorkerContext {
            tree: &tree,
            record: &record,
            iterations: &iterations,
            strategy: &strategy,
            goal: &goal,
            projection: &projection,
            ptc: &never,
            failed_expansion_score_factor: 0.5,
        };
        let stats = Worker::new(0, StdRng::seed_from_u64(1)).run(&ctx);

        assert!(stats.found_exact);
        assert!(record.has_exact_solution());
        assert_eq!(iterations.load(Ordering::SeqCst), stats.iterations);
        assert_eq!(tree.lock().arena.len() as u64, stats.added + 1);
    }

    #[test]
    fn test_failed_expansion_decays_cell_score() {
        // Only the start state is valid, so every expansion fails
        let space = CountingLine::blocked(10.0, 0.0, 10.5);
        let goal = LineGoal::new(9.0, 10.0).unsampleable();
        let projection = LineProjection::new(0.5);
        let tree = seeded_tree(&projection);
        let cell = tree.lock().disc.cell_at(&[0]).unwrap();
        let initial = tree.lock().disc.cell_score(cell).unwrap();

        let record = SolutionRecord::new();
        let iterations = AtomicU64::new(0);
        let params = SamplingParams {
            goal_bias: 0.0,
            max_distance: 5.0,
            min_valid_path_fraction: 0.99,
        };
        let strategy = SamplingStrategy::resolve(&space, &goal, None, params);
        let stop = || iterations.load(Ordering::SeqCst) >= 3;

        let ctx = WorkerContext {
            tree: &tree,
            record: &record,
            iterations: &iterations,
            strategy: &strategy,
            goal: &goal,
            projection: &projection,
            ptc: &stop,
            failed_expansion_score_factor: 0.5,
        };
        let stats = Worker::new(0, StdRng::seed_from_u64(2)).run(&ctx);

        assert_eq!(stats.iterations, 3);
        assert_eq!(stats.failed, 3);
        assert_eq!(stats.added, 0);
        let score = tree.lock().disc.cell_score(cell).unwrap();
        assert!((score - initial * 0.125).abs() < 1e-12);
        assert!(record.into_outcome().approximate.is_none());
    }

    #[test]
    fn test_worker_records_approximate_progress() {
        let space = CountingLine::free(10.0);
        let goal = LineGoal::new(20.0, 30.0).unsampleable();
        let projection = LineProjection::new(0.5);
        let tree = seeded_tree(&projection);
        let record = SolutionRecord::new();
        let iterations = AtomicU64::new(0);
        let params = SamplingParams {
            goal_bias: 0.0,
            max_distance: 1.0,
            min_valid_path_fraction: 0.5,
        };
        let strategy = SamplingStrategy::resolve(&space, &goal, None, params);
        let stop = || iterations.load(Ordering::SeqCst) >= 50;

        let ctx = WorkerContext {
            tree: &tree,
            record: &record,
            iterations: &iterations,
            strategy: &strategy,
            goal: &goal,
            projection: &projection,
            ptc: &stop,
            failed_expansion_score_factor: 0.5,
        };
        let stats = Worker::new(0, StdRng::seed_from_u64(3)).run(&ctx);

        assert!(!stats.found_exact);
        assert_eq!(stats.added, 50);
        assert!(record.approximate_distance() < 20.0);
    }
}
