//! Common types, traits, and error definitions for highway_planner
//!
//! This module provides the foundational building blocks shared by the
//! road, behavior and path planning layers.

pub mod types;
pub mod telemetry;
pub mod traits;
pub mod error;

pub use types::*;
pub use telemetry::*;
pub use traits::*;
pub use error::*;
