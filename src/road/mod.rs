//! Road geometry: the reference centerline, lane layout and the
//! Cartesian <-> road-relative frame built on top of them.

pub mod reference_curve;
pub mod lanes;
pub mod frenet_frame;
pub mod map_loader;

pub use reference_curve::{progress_delta, wrap_progress, CurveSample, ReferenceCurve};
pub use lanes::LaneLayout;
pub use frenet_frame::FrenetFrame;
pub use map_loader::{load_highway_map, parse_highway_map};
