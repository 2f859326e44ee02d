// Behavior layer: maneuver selection and setpoint generation

pub mod maneuver;
pub mod traffic;
pub mod evaluator;
pub mod setpoint;

pub use maneuver::Maneuver;
pub use traffic::{nearest_ahead, nearest_behind, Neighbor, TrafficTracker};
pub use evaluator::{BehaviorConfig, BehaviorEvaluator, ManeuverCosts};
pub use setpoint::{Setpoint, SetpointConfig, SetpointGenerator};
