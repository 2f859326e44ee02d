// Highway map viewer
//
// Loads a waypoint table (`x y s dx dy` per line), densifies it with
// cubic splines and plots the waypoints together with the lane boundaries.
use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, LevelFilter};
use structopt::StructOpt;

use highway_planner::common::Visualizable;
use highway_planner::road::{load_highway_map, FrenetFrame, LaneLayout};
use highway_planner::utils::{logger_init, Visualizer};
use highway_planner::PlannerResult;

#[derive(Debug, StructOpt)]
#[structopt(name = "map_viewer", about = "Plot a highway waypoint map")]
struct Opts {
    /// Waypoint table
    #[structopt(parse(from_os_str))]
    map: PathBuf,

    /// Length of the loop, from the last waypoint back to the first [m]
    #[structopt(long, default_value = "6945.554")]
    length: f64,

    /// Number of samples after densification (0 keeps the raw waypoints)
    #[structopt(long, default_value = "4000")]
    samples: usize,

    #[structopt(long, default_value = "3")]
    lanes: usize,

    /// Save to this PNG file instead of opening a window
    #[structopt(long, parse(from_os_str))]
    output: Option<PathBuf>,
}

fn run(opts: &Opts) -> PlannerResult<()> {
    let raw = load_highway_map(&opts.map, opts.length)?;
    let curve = if opts.samples > 0 {
        let dense = raw.densify(opts.samples)?;
        info!("Densified {} waypoints to {}", raw.len(), dense.len());
        dense
    } else {
        raw.clone()
    };

    let lanes = LaneLayout::new(4.0, opts.lanes)?;
    let frame = FrenetFrame::new(Arc::new(curve));

    let mut vis = Visualizer::new();
    vis.set_title(&format!("{:?}", opts.map));
    vis.plot_road(&frame, &lanes);
    raw.visualize(&mut vis);

    match &opts.output {
        Some(path) => {
            vis.save_png(&path.to_string_lossy(), 1600, 1200)?;
            info!("Plot saved to {:?}", path);
        }
        None => vis.show()?,
    }
    Ok(())
}

fn main() {
    let opts = Opts::from_args();
    if let Err(e) = logger_init(LevelFilter::Info, None) {
        eprintln!("Failed to initialise logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&opts) {
        error!("Map viewer failed: {}", e);
        std::process::exit(1);
    }
}
