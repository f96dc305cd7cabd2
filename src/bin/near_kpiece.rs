// Parallel near-projection KPIECE planning in a 2-D world with circular obstacles

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use nalgebra::DVector;

use near_kpiece::common::{or, Goal, PlanningResult, Timeout};
use near_kpiece::path_planning::{NearKpiece, NearKpieceConfig, PlannerStatus, ProblemDefinition};
use near_kpiece::state_space::{
    AxisProjection, BallObstacle, Bounds, GoalBox, ProjectedGoalBox, ProjectedNearSampler,
    RealVectorSpace,
};
use near_kpiece::utils::{PathStyle, Visualizer};
use near_kpiece::StateSpace;

#[derive(Parser, Debug)]
#[command(name = "near_kpiece")]
#[command(about = "Plan a path through a 2-D obstacle field with parallel KPIECE")]
struct Args {
    /// TOML planner configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of worker threads, overrides the configuration
    #[arg(short, long)]
    threads: Option<usize>,

    /// Time limit in seconds
    #[arg(long, default_value_t = 5.0)]
    timeout: f64,

    /// Stop after this many expansion attempts
    #[arg(long)]
    max_iterations: Option<u64>,

    /// Random seed, overrides the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Use the near-projected sampler and goal
    #[arg(long)]
    near: bool,

    /// Save a plot of the tree and path to this PNG file
    #[arg(long)]
    plot: Option<String>,

    /// Open the plot in a gnuplot window
    #[arg(long)]
    show: bool,
}

fn obstacles() -> Vec<BallObstacle> {
    vec![
        BallObstacle::circle(5.0, 5.0, 1.0),
        BallObstacle::circle(3.0, 6.0, 2.0),
        BallObstacle::circle(3.0, 8.0, 2.0),
        BallObstacle::circle(3.0, 10.0, 2.0),
        BallObstacle::circle(7.0, 5.0, 2.0),
        BallObstacle::circle(9.0, 5.0, 2.0),
        BallObstacle::circle(8.0, 10.0, 1.0),
    ]
}

fn run(args: Args) -> PlanningResult<()> {
    let mut config = match &args.config {
        Some(path) => NearKpieceConfig::from_file(path)?,
        None => NearKpieceConfig::default(),
    };
    if let Some(threads) = args.threads {
        config.thread_count = threads;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let space = Arc::new(
        RealVectorSpace::new(Bounds::square(-2.0, 15.0)?, obstacles())?.with_robot_radius(0.5),
    );
    let projection = AxisProjection::for_space(&space)?;
    let start = DVector::from_vec(vec![0.0, 0.0]);
    let region = GoalBox::new(vec![5.5, 9.5], vec![6.5, 10.5])?;

    let goal: Arc<dyn Goal<DVector<f64>>> = if args.near {
        Arc::new(ProjectedGoalBox::new(region.clone(), space.clone()))
    } else {
        Arc::new(region.clone())
    };
    let mut planner = NearKpiece::new(space.clone(), projection, config)?;
    if args.near {
        planner = planner.with_sampler(Arc::new(ProjectedNearSampler::new(space.clone())));
    }
    let problem = ProblemDefinition::new(goal).with_start(start.clone());

    log::info!(
        "planning with {} threads, range {:.3}",
        planner.thread_count(),
        planner.max_distance()
    );

    let timeout = Timeout::from_secs_f64(args.timeout);
    let solution = match args.max_iterations {
        Some(k) => planner.solve(&problem, &or(timeout, planner.iteration_limit(k)))?,
        None => planner.solve(&problem, &timeout)?,
    };

    match solution.status {
        PlannerStatus::ExactSolution => log::info!(
            "found solution with {} states after {} iterations",
            solution.path.len(),
            solution.iterations
        ),
        PlannerStatus::ApproximateSolution => log::warn!(
            "found approximate solution, {:.3} from the goal",
            solution.approximate_distance.unwrap_or(f64::INFINITY)
        ),
        PlannerStatus::Timeout => log::warn!("no solution found"),
    }
    if solution.is_solved() {
        let length = solution.path.total_length(|a, b| space.distance(a, b));
        log::info!("path length {:.3}", length);
    }

    if args.plot.is_some() || args.show {
        let mut vis = Visualizer::new();
        vis.set_title("Near KPIECE")
            .set_x_range(-2.0, 15.0)
            .set_y_range(-2.0, 15.0);
        vis.plot_tree(&solution.tree)
            .plot_obstacles(space.obstacles())
            .plot_goal_box(&region)
            .plot_start(&start)
            .plot_path(&solution.path, &PathStyle::default());

        if let Some(file) = &args.plot {
            match vis.save_png(file, 800, 800) {
                Ok(()) => log::info!("plot saved to {}", file),
                Err(e) => log::error!("failed to save plot: {}", e),
            }
        }
        if args.show {
            if let Err(e) = vis.show() {
                log::error!("failed to show plot: {}", e);
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
