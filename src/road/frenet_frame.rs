//! Cartesian <-> road-relative (Frenet) frame conversion
//!
//! Road-relative positions are `(s, d)`: progress along the reference curve
//! and lateral offset, positive to the right of the direction of travel.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::common::{normalize_angle, FrameTransform, FrenetPoint, Point2D};
use crate::road::ReferenceCurve;

/// Query points closer than this to a sample are treated as lying on it
const ON_SAMPLE_EPS: f64 = 1e-9;

/// Frame converter over a shared, immutable reference curve
#[derive(Debug, Clone)]
pub struct FrenetFrame {
    curve: Arc<ReferenceCurve>,
}

impl FrenetFrame {
    pub fn new(curve: Arc<ReferenceCurve>) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> &ReferenceCurve {
        &self.curve
    }

    /// Index of the curve sample nearest to `(x, y)`
    pub fn closest_sample(&self, x: f64, y: f64) -> usize {
        let query = Point2D::new(x, y);
        self.curve.samples().iter()
            .enumerate()
            .min_by_key(|(_, p)| OrderedFloat(p.position().distance(&query)))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Index of the first sample ahead of a vehicle at `(x, y)` facing `heading`
    pub fn next_sample(&self, x: f64, y: f64, heading: f64) -> usize {
        let closest = self.closest_sample(x, y);
        let p = self.curve.sample(closest);
        let (bx, by) = (p.x - x, p.y - y);
        if bx.hypot(by) < ON_SAMPLE_EPS {
            return self.curve.next_index(closest);
        }
        let bearing = by.atan2(bx);
        let angle = normalize_angle(heading - bearing).abs();
        if angle > FRAC_PI_4 {
            self.curve.next_index(closest)
        } else {
            closest
        }
    }

    /// Projection of `(x, y)` onto the segment starting at sample `prev`,
    /// as (fraction along the segment, segment length).
    fn project(&self, prev: usize, x: f64, y: f64) -> (f64, f64) {
        let a = self.curve.sample(prev);
        let b = self.curve.sample(self.curve.next_index(prev));
        let (nx, ny) = (b.x - a.x, b.y - a.y);
        let len2 = nx * nx + ny * ny;
        if len2 == 0.0 {
            return (0.0, 0.0);
        }
        (((x - a.x) * nx + (y - a.y) * ny) / len2, len2.sqrt())
    }

    pub fn to_road_frame(&self, x: f64, y: f64, heading: f64) -> FrenetPoint {
        let next = self.next_sample(x, y, heading);
        let mut prev = self.curve.prev_index(next);

        // Slide onto a segment the point actually projects into; only ever
        // move in one direction so corner wedges cannot oscillate.
        let (mut stepped_back, mut stepped_forward) = (false, false);
        for _ in 0..self.curve.len() {
            let (t, _) = self.project(prev, x, y);
            if t < 0.0 && !stepped_forward {
                prev = self.curve.prev_index(prev);
                stepped_back = true;
            } else if t > 1.0 && !stepped_back {
                prev = self.curve.next_index(prev);
                stepped_forward = true;
            } else {
                break;
            }
        }

        let (t, len) = self.project(prev, x, y);
        let a = self.curve.sample(prev);
        let b = self.curve.sample(self.curve.next_index(prev));
        let (nx, ny) = (b.x - a.x, b.y - a.y);
        let (qx, qy) = (x - a.x, y - a.y);

        let (px, py) = (t * nx, t * ny);
        let mut d = (qx - px).hypot(qy - py);
        // Left of the direction of travel is negative
        if nx * qy - ny * qx > 0.0 {
            d = -d;
        }

        let s = self.curve.wrap_progress(a.progress + t * len);
        FrenetPoint::new(s, d)
    }

    pub fn to_cartesian(&self, progress: f64, lateral: f64) -> Point2D {
        let (prev, seg_s) = self.curve.locate(progress);
        let a = self.curve.sample(prev);
        let b = self.curve.sample(self.curve.next_index(prev));

        let heading = (b.y - a.y).atan2(b.x - a.x);
        let seg_x = a.x + seg_s * heading.cos();
        let seg_y = a.y + seg_s * heading.sin();

        let perp_heading = heading - FRAC_PI_2;
        Point2D::new(
            seg_x + lateral * perp_heading.cos(),
            seg_y + lateral * perp_heading.sin(),
        )
    }

    /// Heading of the reference curve at `progress`
    pub fn heading_at(&self, progress: f64) -> f64 {
        let (prev, _) = self.curve.locate(progress);
        let a = self.curve.sample(prev);
        let b = self.curve.sample(self.curve.next_index(prev));
        (b.y - a.y).atan2(b.x - a.x)
    }
}

impl FrameTransform for FrenetFrame {
    fn to_road_frame(&self, x: f64, y: f64, heading: f64) -> FrenetPoint {
        FrenetFrame::to_road_frame(self, x, y, heading)
    }

    fn to_cartesian(&self, progress: f64, lateral: f64) -> Point2D {
        FrenetFrame::to_cartesian(self, progress, lateral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn straight_frame() -> FrenetFrame {
        let points: Vec<Point2D> = (0..=100).map(|i| Point2D::new(i as f64, 0.0)).collect();
        FrenetFrame::new(Arc::new(ReferenceCurve::from_points(&points).unwrap()))
    }

    fn circle_frame() -> FrenetFrame {
        // Counter-clockwise, so the interior lies to the left (negative d)
        let r = 200.0;
        let points: Vec<Point2D> = (0..720)
            .map(|i| {
                let a = 2.0 * PI * i as f64 / 720.0;
                Point2D::new(r * a.cos(), r * a.sin())
            })
            .collect();
        FrenetFrame::new(Arc::new(ReferenceCurve::from_points(&points).unwrap()))
    }

    #[test]
    fn test_straight_line_frame() {
        let frame = straight_frame();
        let p = frame.to_road_frame(42.5, -6.0, 0.0);
        assert_abs_diff_eq!(p.s, 42.5, epsilon = 1e-9);
        assert_abs_diff_eq!(p.d, 6.0, epsilon = 1e-9);

        let p = frame.to_road_frame(42.5, 2.0, 0.0);
        assert_abs_diff_eq!(p.d, -2.0, epsilon = 1e-9);

        let xy = frame.to_cartesian(42.5, 6.0);
        assert_abs_diff_eq!(xy.x, 42.5, epsilon = 1e-9);
        assert_abs_diff_eq!(xy.y, -6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_monotonic_progress_on_straight_line() {
        let frame = straight_frame();
        let mut last = f64::NEG_INFINITY;
        for i in 1..190 {
            let x = 0.5 * i as f64 + 0.1;
            let s = frame.to_road_frame(x, -6.0, 0.0).s;
            assert!(s > last, "progress {} not beyond {} at x = {}", s, last, x);
            last = s;
        }
    }

    #[test]
    fn test_lateral_sign_matches_curve_orientation() {
        let frame = circle_frame();
        // Outside the loop is to the right of counter-clockwise travel
        let outside = frame.to_road_frame(0.0, 206.0, PI);
        assert!(outside.d > 0.0);
        assert_abs_diff_eq!(outside.d, 6.0, epsilon = 1e-3);
        let inside = frame.to_road_frame(0.0, 194.0, PI);
        assert!(inside.d < 0.0);

        // Same convention as the curve's lateral unit vectors
        let sample = *frame.curve().sample(10);
        let p = frame.to_road_frame(
            sample.x + 3.0 * sample.lateral_dx,
            sample.y + 3.0 * sample.lateral_dy,
            frame.heading_at(sample.progress),
        );
        assert!(p.d > 0.0);
    }

    #[test]
    fn test_round_trip_on_curve_samples() {
        let frame = circle_frame();
        for p in frame.curve().samples().iter().step_by(7) {
            let heading = frame.heading_at(p.progress);
            let sd = frame.to_road_frame(p.x, p.y, heading);
            assert_abs_diff_eq!(sd.d, 0.0, epsilon = 1e-9);
            let xy = frame.to_cartesian(sd.s, sd.d);
            assert_abs_diff_eq!(xy.x, p.x, epsilon = 1e-6);
            assert_abs_diff_eq!(xy.y, p.y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_progress_wraps_around_loop() {
        let frame = circle_frame();
        let length = frame.curve().total_length();
        let a = frame.to_cartesian(10.0, 2.0);
        let b = frame.to_cartesian(10.0 + length, 2.0);
        let c = frame.to_cartesian(10.0 - length, 2.0);
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-6);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-6);
        assert_abs_diff_eq!(a.x, c.x, epsilon = 1e-6);
        assert_abs_diff_eq!(a.y, c.y, epsilon = 1e-6);
    }

    proptest! {
        #[test]
        fn prop_round_trip_within_lateral_band(s in 0.0..1256.0f64, d in -10.0..10.0f64) {
            let frame = circle_frame();
            let xy = frame.to_cartesian(s, d);
            let sd = frame.to_road_frame(xy.x, xy.y, frame.heading_at(s));
            let back = frame.to_cartesian(sd.s, sd.d);
            prop_assert!((back.x - xy.x).abs() < 1e-6);
            prop_assert!((back.y - xy.y).abs() < 1e-6);
        }
    }
}
