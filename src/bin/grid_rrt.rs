// RRT / RRT* planner on an occupancy grid
//
// Reads a problem description from stdin (or --map), plans until the goal is
// reached and prints the solution path followed by the explored edges.
//
// Usage:
//   grid_rrt [rrt|rrt_star] [RADIUS] < problem.txt
//   RUST_LOG=info grid_rrt rrt_star 3.0 --model dubins --seed 7 --plot tree.svg < problem.txt

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info};

use grid_rrt::path_planning::{
    Algorithm, DubinsConfig, MotionModelKind, Planner, PlannerConfig, StraightLineConfig,
    LEGACY_HEADING_RANGE,
};
use grid_rrt::utils::{plot_solution, Problem};
use grid_rrt::PlannerResult;

/// Grow an RRT or RRT* tree from start to goal on a grid map
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Planning algorithm: rrt or rrt_star
    #[arg(default_value_t = Algorithm::Rrt)]
    algorithm: Algorithm,

    /// RRT* neighborhood radius
    #[arg(default_value_t = 5.0)]
    radius: f64,

    /// Edge model: straight or dubins
    #[arg(short, long, default_value_t = MotionModelKind::Straight)]
    model: MotionModelKind,

    /// Fixed sampling seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Read the problem from this file instead of stdin
    #[arg(long)]
    map: Option<PathBuf>,

    /// Also render the result to this SVG file (requires gnuplot)
    #[arg(long)]
    plot: Option<String>,

    /// Minimum turning radius of the dubins model
    #[arg(long, default_value_t = 0.2)]
    turning_radius: f64,

    /// Probability of sampling the goal directly (model default if unset)
    #[arg(long)]
    goal_sample_rate: Option<f64>,

    /// Reject straight edges steeper than 9:1
    #[arg(long)]
    legacy_slope_check: bool,

    /// Draw headings from [0, 1000) instead of one full turn
    #[arg(long)]
    legacy_heading_range: bool,
}

fn read_problem(args: &Args) -> PlannerResult<Problem> {
    let text = match &args.map {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Problem::parse(&text)
}

fn run(args: Args) -> PlannerResult<()> {
    let problem = read_problem(&args)?;

    let straight = StraightLineConfig {
        legacy_slope_check: args.legacy_slope_check,
        ..Default::default()
    };
    let dubins = DubinsConfig {
        turning_radius: args.turning_radius,
        ..Default::default()
    };
    let model = args.model.build(straight, dubins)?;

    let config = PlannerConfig {
        algorithm: args.algorithm,
        radius: args.radius,
        goal_sample_rate: args
            .goal_sample_rate
            .unwrap_or_else(|| args.model.default_goal_sample_rate()),
        heading_range: if args.legacy_heading_range {
            LEGACY_HEADING_RANGE
        } else {
            PlannerConfig::default().heading_range
        },
        seed: args.seed,
        ..Default::default()
    };

    let start = args.model.start_configuration(problem.start);
    let goal = args.model.goal_configuration(problem.goal);
    let mut planner = Planner::new(problem.map, model, start, goal, config)?;
    let goal_node = planner.plan()?;
    let solution = planner.solution(goal_node);

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    solution.write_to(&mut out)?;
    out.flush()?;

    if let Some(path) = &args.plot {
        plot_solution(planner.map(), &solution, problem.start, problem.goal).save_svg(path)?;
        info!("plot saved to {}", path);
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        eprintln!("grid_rrt: {}", e);
        process::exit(1);
    }
}
