//! highway_planner - motion planning core for a highway autopilot
//!
//! Each control cycle turns a telemetry snapshot (ego state and surrounding
//! traffic in road-relative coordinates) into a short, dense Cartesian path:
//! a maneuver is chosen by cost, turned into boundary conditions, synthesized
//! as minimum-jerk trajectories and resampled at the actuation cadence.

// Core modules
pub mod common;
pub mod utils;

// Planning modules
pub mod road;
pub mod path_planning;
pub mod behavior;
pub mod planner;

// Re-export common types for convenience
pub use common::{FrenetPoint, OtherVehicle, Path2D, Point2D, Pose2D, Telemetry};
pub use common::{CyclePlanner, FrameTransform};
pub use common::{PlannerError, PlannerResult};
pub use road::{FrenetFrame, LaneLayout, ReferenceCurve};
pub use behavior::{Maneuver, Setpoint};
pub use planner::{HighwayPlanner, PlanOutcome, PlannerConfig};
