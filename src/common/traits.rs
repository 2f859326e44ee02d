//! Common traits defining the seams between pipeline stages

use crate::common::error::PlannerResult;
use crate::common::telemetry::Telemetry;
use crate::common::types::*;

/// Bidirectional transform between Cartesian map coordinates and the
/// road-relative (progress, lateral offset) frame.
pub trait FrameTransform {
    /// Project a Cartesian pose onto the road frame
    fn to_road_frame(&self, x: f64, y: f64, heading: f64) -> FrenetPoint;

    /// Map a road-frame position back to Cartesian coordinates
    fn to_cartesian(&self, progress: f64, lateral: f64) -> Point2D;
}

/// A planner that turns one telemetry snapshot into one output path
pub trait CyclePlanner {
    fn plan_cycle(&self, telemetry: &Telemetry) -> PlannerResult<Path2D>;
}

/// Trait for visualizable objects
pub trait Visualizable {
    /// Draw current state to visualizer
    fn visualize(&self, vis: &mut crate::utils::Visualizer);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Road frame of a straight road along the x axis
    struct StraightFrame;

    impl FrameTransform for StraightFrame {
        fn to_road_frame(&self, x: f64, y: f64, _heading: f64) -> FrenetPoint {
            FrenetPoint::new(x, -y)
        }

        fn to_cartesian(&self, progress: f64, lateral: f64) -> Point2D {
            Point2D::new(progress, -lateral)
        }
    }

    #[test]
    fn test_frame_transform_trait() {
        let frame = StraightFrame;
        let p = frame.to_road_frame(3.0, -2.0, 0.0);
        assert_eq!(p, FrenetPoint::new(3.0, 2.0));
        assert_eq!(frame.to_cartesian(p.s, p.d), Point2D::new(3.0, -2.0));
    }
}
