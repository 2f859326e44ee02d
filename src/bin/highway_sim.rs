// Closed-loop highway simulation
//
// The ego vehicle drives a ring road among randomly seeded traffic. Every
// cycle it consumes the first few points of the planned path, is projected
// back onto the road frame, and replans.
use std::f64::consts::PI;
use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn, LevelFilter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use structopt::StructOpt;

use highway_planner::behavior::TrafficTracker;
use highway_planner::common::{OtherVehicle, Path2D, Point2D, Pose2D, Telemetry};
use highway_planner::road::{progress_delta, wrap_progress, LaneLayout, ReferenceCurve};
use highway_planner::utils::{logger_init, params, Visualizer, PathStyle};
use highway_planner::{HighwayPlanner, PlannerConfig, PlannerError, PlannerResult};

#[derive(Debug, StructOpt)]
#[structopt(name = "highway_sim", about = "Closed-loop highway planner simulation")]
struct Opts {
    /// TOML parameter file
    #[structopt(long, parse(from_os_str), default_value = "params/planner.toml")]
    params: PathBuf,

    /// Number of planning cycles to run
    #[structopt(long, default_value = "300")]
    cycles: usize,

    /// Output points consumed per cycle
    #[structopt(long, default_value = "10")]
    consumed: usize,

    /// Number of traffic vehicles
    #[structopt(long, default_value = "12")]
    vehicles: usize,

    /// Ring road radius [m]
    #[structopt(long, default_value = "400.0")]
    radius: f64,

    #[structopt(long, default_value = "42")]
    seed: u64,

    /// Log level (error, warn, info, debug, trace)
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,

    /// Save a plot of the run to this PNG file
    #[structopt(long, parse(from_os_str))]
    plot: Option<PathBuf>,
}

/// Road kept free of traffic ahead of and behind the ego start [m]
const START_CLEARANCE: f64 = 60.0;
const END_CLEARANCE: f64 = 30.0;

/// A traffic vehicle holding its lane at constant speed
#[derive(Debug, Clone, Copy)]
struct SimVehicle {
    id: i64,
    progress: f64,
    lateral: f64,
    speed: f64,
}

fn ring_road(radius: f64) -> PlannerResult<ReferenceCurve> {
    let n = 720;
    let points: Vec<Point2D> = (0..n)
        .map(|i| {
            let a = 2.0 * PI * i as f64 / n as f64;
            Point2D::new(radius * a.cos(), radius * a.sin())
        })
        .collect();
    ReferenceCurve::from_points(&points)
}

fn spawn_traffic(
    rng: &mut StdRng,
    count: usize,
    lanes: &LaneLayout,
    track_length: f64,
    speed_limit: f64,
) -> PlannerResult<Vec<SimVehicle>> {
    // Vehicles spawn in [START_CLEARANCE, track_length - END_CLEARANCE)
    if !(track_length > START_CLEARANCE + END_CLEARANCE) {
        return Err(PlannerError::InvalidParameter(format!(
            "ring road of {:.1} m is too short for traffic, need more than {} m",
            track_length, START_CLEARANCE + END_CLEARANCE
        )));
    }
    let speeds = Normal::new(0.8 * speed_limit, 0.1 * speed_limit)
        .map_err(|e| PlannerError::InvalidParameter(e.to_string()))?;

    Ok((0..count)
        .map(|i| {
            let lane = rng.gen_range(0..lanes.lane_count);
            SimVehicle {
                id: i as i64,
                // Keep the start of the road clear for the ego vehicle
                progress: rng.gen_range(START_CLEARANCE..track_length - END_CLEARANCE),
                lateral: lanes.lane_center(lane),
                speed: speeds.sample(rng).clamp(0.4 * speed_limit, speed_limit),
            }
        })
        .collect())
}

fn run(opts: &Opts) -> PlannerResult<()> {
    let config: PlannerConfig = params::load(&opts.params)?;
    let curve = Arc::new(ring_road(opts.radius)?);
    let track_length = curve.total_length();
    let planner = HighwayPlanner::new(curve, config)?;
    let mut tracker = TrafficTracker::new(0.5)?;

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut traffic = spawn_traffic(&mut rng, opts.vehicles, &config.lanes, track_length, config.speed_limit)?;
    info!(
        "Ring road of {:.1} m with {} vehicles, {} cycles",
        track_length, traffic.len(), opts.cycles
    );

    if config.path.output_count < 2 {
        return Err(PlannerError::InvalidParameter(
            "simulation needs at least 2 output points per cycle".to_string(),
        ));
    }
    let consumed = opts.consumed.clamp(1, config.path.output_count - 1);
    let dt = consumed as f64 * config.path.output_step;

    let mut ego_progress = 0.0;
    let mut ego_lateral = config.lanes.lane_center(config.lanes.lane_count / 2);
    let mut ego_speed = 0.0;
    let mut trace = Path2D::new();
    let mut last_path = Path2D::new();
    let mut lane_changes = 0;
    let mut close_calls = 0;

    for cycle in 0..opts.cycles {
        let telemetry = Telemetry::new(
            ego_progress,
            ego_lateral,
            ego_speed,
            traffic.iter()
                .map(|v| OtherVehicle::new(v.id, v.progress, v.lateral, v.speed))
                .collect(),
        );
        let smoothed = tracker.update(&telemetry);
        let outcome = planner.plan(&smoothed)?;
        if outcome.maneuver.is_lane_change() {
            lane_changes += 1;
        }

        // Drive the first points of the path
        let points = &outcome.path.points;
        let here = points[consumed];
        let before = points[consumed - 1];
        let heading = (here.y - before.y).atan2(here.x - before.x);
        let road = planner.frame().to_road_frame(here.x, here.y, heading);
        ego_speed = here.distance(&before) / config.path.output_step;
        ego_progress = road.s;
        ego_lateral = road.d;
        points[..consumed].iter().for_each(|p| trace.push(*p));

        for v in traffic.iter_mut() {
            v.progress = wrap_progress(v.progress + v.speed * dt, track_length);
        }

        let ego_lane = config.lanes.lane_at(ego_lateral);
        for v in &traffic {
            let gap = progress_delta(ego_progress, v.progress, track_length).abs();
            if gap < 5.0 && config.lanes.lane_at(v.lateral) == ego_lane {
                warn!("Cycle {}: vehicle {} only {:.1} m away", cycle, v.id, gap);
                close_calls += 1;
            }
        }

        if cycle % 50 == 0 {
            info!(
                "Cycle {:4}: s = {:8.2}, d = {:5.2}, v = {:5.2} m/s, {}",
                cycle, ego_progress, ego_lateral, ego_speed, outcome.maneuver
            );
        }
        last_path = outcome.path;
    }

    info!(
        "Done: {:.1} m driven, {} lane change cycles, {} close calls",
        trace.total_length(), lane_changes, close_calls
    );

    if let Some(path) = &opts.plot {
        let mut vis = Visualizer::new();
        vis.set_title("Highway simulation");
        vis.plot_road(planner.frame(), &config.lanes);
        vis.plot_path(&trace, &PathStyle::new("#35C788", "Driven").with_line_width(1.0));
        vis.plot_path(&last_path, &PathStyle::default());
        let traffic_xy: Vec<Point2D> = traffic.iter()
            .map(|v| planner.frame().to_cartesian(v.progress, v.lateral))
            .collect();
        vis.plot_traffic(&traffic_xy);
        if let Some(&p) = trace.last() {
            vis.plot_ego(&Pose2D::new(p.x, p.y, planner.frame().heading_at(ego_progress)), 1.5);
        }
        vis.save_png(&path.to_string_lossy(), 1200, 1200)?;
        info!("Plot saved to {:?}", path);
    }

    Ok(())
}

fn main() {
    let opts = Opts::from_args();
    if let Err(e) = logger_init(opts.log_level, None) {
        eprintln!("Failed to initialise logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&opts) {
        error!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}
