//! Utility modules for highway_planner

pub mod logger;
pub mod params;
pub mod visualization;

pub use logger::logger_init;
pub use visualization::{colors, PathStyle, PointStyle, Visualizer};
