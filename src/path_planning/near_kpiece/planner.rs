//! Parallel near-projection KPIECE planner
//!
//! A fixed pool of worker threads grows one shared tree. The tree and its
//! grid discretization sit behind one lock, the best solutions behind
//! another, so solution bookkeeping never waits on tree contention.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::common::{
    Discretization, Goal, IterationLimit, MotionId, Path, PlanningError, PlanningResult,
    ProjectionEvaluator, StateSampler, StateSpace, TerminationCondition,
};
use crate::path_planning::near_kpiece::config::NearKpieceConfig;
use crate::path_planning::near_kpiece::discretization::GridDiscretization;
use crate::path_planning::near_kpiece::motion::Motion;
use crate::path_planning::near_kpiece::sampling::{SamplingParams, SamplingStrategy};
use crate::path_planning::near_kpiece::solution::SolutionRecord;
use crate::path_planning::near_kpiece::worker::{SearchTree, Worker, WorkerContext, WorkerStats};

/// Fraction of the space extent used as expansion distance when none is configured
const DEFAULT_RANGE_FRACTION: f64 = 0.2;

/// Goal distance recorded for start motions
const START_GOAL_DISTANCE: f64 = 1.0;

/// Start states and goal of one planning query
pub struct ProblemDefinition<S> {
    start_states: Vec<S>,
    goal: Arc<dyn Goal<S>>,
}

impl<S> ProblemDefinition<S> {
    pub fn new(goal: Arc<dyn Goal<S>>) -> Self {
        Self { start_states: Vec::new(), goal }
    }

    pub fn with_start(mut self, state: S) -> Self {
        self.start_states.push(state);
        self
    }

    pub fn add_start_state(&mut self, state: S) {
        self.start_states.push(state);
    }

    pub fn start_states(&self) -> &[S] {
        &self.start_states
    }

    pub fn goal(&self) -> &dyn Goal<S> {
        self.goal.as_ref()
    }
}

/// How a solve ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerStatus {
    /// A motion satisfying the goal was found
    ExactSolution,
    /// Only a motion close to the goal was found
    ApproximateSolution,
    /// Termination came before any candidate was recorded
    Timeout,
}

/// Result of a solve
#[derive(Debug, Clone)]
pub struct Solution<S> {
    pub status: PlannerStatus,
    /// States from a start to the goal, or to the closest approach
    pub path: Path<S>,
    /// Residual goal distance, for approximate solutions only
    pub approximate_distance: Option<f64>,
    /// Expansion attempts made during this solve, over all workers
    pub iterations: u64,
    /// Every motion of the search with the index of its parent
    pub tree: Vec<(S, Option<usize>)>,
}

impl<S> Solution<S> {
    pub fn is_solved(&self) -> bool {
        self.status != PlannerStatus::Timeout
    }

    pub fn is_approximate(&self) -> bool {
        self.status == PlannerStatus::ApproximateSolution
    }
}

/// Parallel KPIECE planner with near-projected sampling support
pub struct NearKpiece<Sp: StateSpace, P> {
    space: Arc<Sp>,
    projection: P,
    config: NearKpieceConfig,
    sampler: Option<Arc<dyn StateSampler<Sp::State>>>,
    iterations: Arc<AtomicU64>,
}

impl<Sp, P> NearKpiece<Sp, P>
where
    Sp: StateSpace,
    P: ProjectionEvaluator<Sp::State>,
{
    pub fn new(space: Arc<Sp>, projection: P, config: NearKpieceConfig) -> PlanningResult<Self> {
        config.validate()?;
        Ok(Self {
            space,
            projection,
            config,
            sampler: None,
            iterations: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Sample expansions with `sampler` instead of the state space
    pub fn with_sampler(mut self, sampler: Arc<dyn StateSampler<Sp::State>>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn config(&self) -> &NearKpieceConfig {
        &self.config
    }

    pub fn space(&self) -> &Arc<Sp> {
        &self.space
    }

    pub fn set_thread_count(&mut self, thread_count: usize) -> PlanningResult<()> {
        if thread_count == 0 {
            return Err(PlanningError::InvalidParameter(
                "thread_count must be at least 1".to_string(),
            ));
        }
        self.config.thread_count = thread_count;
        Ok(())
    }

    pub fn thread_count(&self) -> usize {
        self.config.thread_count
    }

    /// Expansion attempts made over the lifetime of this planner
    pub fn iteration_count(&self) -> u64 {
        self.iterations.load(Ordering::Acquire)
    }

    /// Termination condition tripping after `iterations` more expansion attempts
    pub fn iteration_limit(&self, iterations: u64) -> IterationLimit {
        IterationLimit::new(self.iterations.clone(), self.iteration_count() + iterations)
    }

    /// Expansion distance used by the workers
    pub fn max_distance(&self) -> f64 {
        self.config
            .max_distance
            .unwrap_or_else(|| DEFAULT_RANGE_FRACTION * self.space.max_extent())
    }

    /// Solve with the default grid discretization
    pub fn solve<T>(
        &self,
        problem: &ProblemDefinition<Sp::State>,
        ptc: &T,
    ) -> PlanningResult<Solution<Sp::State>>
    where
        T: TerminationCondition,
    {
        let dimension = self.projection.dimension();
        let disc = GridDiscretization::new(dimension, self.config.border_fraction);
        self.solve_with(disc, problem, ptc)
    }

    /// Solve with a caller-supplied discretization
    pub fn solve_with<D, T>(
        &self,
        disc: D,
        problem: &ProblemDefinition<Sp::State>,
        ptc: &T,
    ) -> PlanningResult<Solution<Sp::State>>
    where
        D: Discretization + Send,
        T: TerminationCondition,
    {
        self.config.validate()?;

        let mut tree = SearchTree::new(disc);
        for state in problem.start_states() {
            if !self.space.is_valid(state) {
                log::warn!("NearKpiece: skipping invalid start state {:?}", state);
                continue;
            }
            let coord = self.projection.coordinates(state);
            tree.insert(Motion::root(state.clone()), &coord, START_GOAL_DISTANCE);
        }

        if tree.disc.motion_count() == 0 {
            log::error!("NearKpiece: There are no valid initial states!");
            return Err(PlanningError::InvalidStart);
        }

        log::info!(
            "NearKpiece: Starting planning with {} states already in datastructure",
            tree.disc.motion_count()
        );

        let goal = problem.goal();
        let params = SamplingParams {
            goal_bias: self.config.goal_bias,
            max_distance: self.max_distance(),
            min_valid_path_fraction: self.config.min_valid_path_fraction,
        };
        let strategy =
            SamplingStrategy::resolve(self.space.as_ref(), goal, self.sampler.as_deref(), params);
        log::debug!(
            "NearKpiece: near goal sampling {}, near-projected expansion {}",
            strategy.uses_near_goal(),
            strategy.uses_near_sampler()
        );

        let tree = Mutex::new(tree);
        let record = SolutionRecord::new();
        let start_iterations = self.iteration_count();
        let ctx = WorkerContext {
            tree: &tree,
            record: &record,
            iterations: self.iterations.as_ref(),
            strategy: &strategy,
            goal,
            projection: &self.projection,
            ptc,
            failed_expansion_score_factor: self.config.failed_expansion_score_factor,
        };

        let results = self.run_workers(&ctx);
        let iterations = self.iteration_count() - start_iterations;

        let mut first_error = None;
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(stats) => log::trace!("NearKpiece: worker {} finished: {:?}", i, stats),
                Err(e) => {
                    log::error!("NearKpiece: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let tree = tree.into_inner();
        let outcome = record.into_outcome();

        let (status, goal_motion, approximate_distance) = match (outcome.exact, outcome.approximate)
        {
            (Some((motion, _)), _) => (PlannerStatus::ExactSolution, Some(motion), None),
            (None, Some(motion)) => (
                PlannerStatus::ApproximateSolution,
                Some(motion),
                Some(outcome.approximate_distance),
            ),
            (None, None) => (PlannerStatus::Timeout, None, None),
        };

        let path = goal_motion.map_or_else(Path::new, |m: MotionId| tree.arena.trace_path(m));

        log::info!("NearKpiece: {}", tree_summary(&tree.disc));

        Ok(Solution {
            status,
            path,
            approximate_distance,
            iterations,
            tree: tree.arena.export_tree(),
        })
    }

    fn run_workers<D>(&self, ctx: &WorkerContext<'_, Sp, D>) -> Vec<PlanningResult<WorkerStats>>
    where
        D: Discretization + Send,
    {
        thread::scope(|s| {
            let handles: Vec<_> = (0..self.config.thread_count)
                .map(|i| {
                    let worker = Worker::new(i, self.worker_rng(i));
                    thread::Builder::new()
                        .name(format!("near-kpiece-{}", i))
                        .spawn_scoped(s, move || worker.run(ctx))
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(i, handle)| match handle {
                    Ok(handle) => handle.join().map_err(|_| PlanningError::WorkerPanicked(i)),
                    Err(e) => Err(PlanningError::Io(e)),
                })
                .collect()
        })
    }

    fn worker_rng(&self, index: usize) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64 + 1)),
            None => StdRng::from_entropy(),
        }
    }
}

fn tree_summary<D: Discretization>(disc: &D) -> String {
    format!(
        "Created {} states in {} cells ({} internal + {} external)",
        disc.motion_count(),
        disc.cell_count(),
        disc.interior_count(),
        disc.exterior_count()
    )
}
