//! Road centerline as a closed loop of progress-tagged samples

use itertools::Itertools;

use crate::common::{PlannerError, PlannerResult, Point2D};
use crate::path_planning::CubicSpline;

/// One centerline sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    /// Arc length from the start of the loop [m]
    pub progress: f64,
    pub x: f64,
    pub y: f64,
    /// Unit vector pointing to the right of the direction of travel
    pub lateral_dx: f64,
    pub lateral_dy: f64,
}

impl CurveSample {
    pub fn new(progress: f64, x: f64, y: f64, lateral_dx: f64, lateral_dy: f64) -> Self {
        Self { progress, x, y, lateral_dx, lateral_dy }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Immutable closed-loop reference curve.
///
/// The segment after the last sample joins it back to the first one and
/// covers progress `[last.progress, total_length)` followed by
/// `[0, first.progress)`.
#[derive(Debug, Clone)]
pub struct ReferenceCurve {
    samples: Vec<CurveSample>,
    total_length: f64,
}

impl ReferenceCurve {
    pub fn new(samples: Vec<CurveSample>, total_length: f64) -> PlannerResult<Self> {
        if samples.len() < 2 {
            return Err(PlannerError::InvalidCurve(format!(
                "need at least 2 samples, got {}", samples.len()
            )));
        }
        let all_finite = samples.iter().all(|p| {
            p.progress.is_finite() && p.x.is_finite() && p.y.is_finite()
                && p.lateral_dx.is_finite() && p.lateral_dy.is_finite()
        });
        if !all_finite {
            return Err(PlannerError::InvalidCurve("non-finite sample".to_string()));
        }
        if let Some((i, _)) = samples.iter()
            .tuple_windows()
            .find_position(|(a, b)| b.progress <= a.progress)
        {
            return Err(PlannerError::InvalidCurve(format!(
                "progress not strictly increasing at sample {}", i + 1
            )));
        }
        if samples[0].progress < 0.0 {
            return Err(PlannerError::InvalidCurve(format!(
                "first sample progress {} is negative", samples[0].progress
            )));
        }
        let last = samples[samples.len() - 1].progress;
        if !(total_length > last) {
            return Err(PlannerError::InvalidCurve(format!(
                "total length {} must exceed the last sample progress {}", total_length, last
            )));
        }

        Ok(Self { samples, total_length })
    }

    /// Closed loop through `points`, with progress equal to the cumulative
    /// chord length and lateral vectors normal to each outgoing segment.
    pub fn from_points(points: &[Point2D]) -> PlannerResult<Self> {
        if points.len() < 2 {
            return Err(PlannerError::InvalidCurve(format!(
                "need at least 2 points, got {}", points.len()
            )));
        }
        let n = points.len();
        let mut samples = Vec::with_capacity(n);
        let mut progress = 0.0;
        for i in 0..n {
            let p = points[i];
            let q = points[(i + 1) % n];
            let len = p.distance(&q);
            let (lateral_dx, lateral_dy) = if len > 0.0 {
                ((q.y - p.y) / len, -(q.x - p.x) / len)
            } else {
                (0.0, 0.0)
            };
            samples.push(CurveSample::new(progress, p.x, p.y, lateral_dx, lateral_dy));
            progress += len;
        }
        Self::new(samples, progress)
    }

    pub fn samples(&self) -> &[CurveSample] {
        &self.samples
    }

    pub fn sample(&self, index: usize) -> &CurveSample {
        &self.samples[index]
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.samples.len()
    }

    pub fn prev_index(&self, index: usize) -> usize {
        if index == 0 { self.samples.len() - 1 } else { index - 1 }
    }

    /// Progress wrapped into `[0, total_length)`
    pub fn wrap_progress(&self, s: f64) -> f64 {
        wrap_progress(s, self.total_length)
    }

    /// Signed along-road distance from `from` to `to`, in `(-L/2, L/2]`
    pub fn progress_delta(&self, from: f64, to: f64) -> f64 {
        progress_delta(from, to, self.total_length)
    }

    /// Segment start index containing `s` and the offset of `s` into that segment.
    pub fn locate(&self, s: f64) -> (usize, f64) {
        let s = self.wrap_progress(s);
        let n = self.samples.len();
        let i = self.samples.partition_point(|p| p.progress <= s);
        if i == 0 {
            // before the first sample: tail of the closing segment
            (n - 1, s + self.total_length - self.samples[n - 1].progress)
        } else {
            (i - 1, s - self.samples[i - 1].progress)
        }
    }

    /// Resample to `count` samples evenly spaced in progress over the whole
    /// loop, fitting natural cubic splines through x, y and the lateral vector.
    ///
    /// The splines use natural end conditions, so curvature is not continuous
    /// across the seam between the last and first input samples.
    pub fn densify(&self, count: usize) -> PlannerResult<Self> {
        if count < 2 {
            return Err(PlannerError::InvalidParameter(format!(
                "densified curve needs at least 2 samples, got {}", count
            )));
        }

        let first = self.samples[0];
        let closing = self.samples.iter().chain(std::iter::once(&first));
        let (mut s, mut x, mut y, mut dx, mut dy) =
            (Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new());
        for p in closing {
            x.push(p.x);
            y.push(p.y);
            dx.push(p.lateral_dx);
            dy.push(p.lateral_dy);
            s.push(p.progress);
        }
        // re-appended first sample sits one lap later
        let last = s.len() - 1;
        s[last] = first.progress + self.total_length;

        let sx = CubicSpline::new(&s, &x)?;
        let sy = CubicSpline::new(&s, &y)?;
        let sdx = CubicSpline::new(&s, &dx)?;
        let sdy = CubicSpline::new(&s, &dy)?;

        let step = self.total_length / count as f64;
        let samples = (0..count)
            .map(|k| {
                let progress = k as f64 * step;
                let at = if progress < first.progress { progress + self.total_length } else { progress };
                let (ldx, ldy) = (sdx.calc(at), sdy.calc(at));
                let norm = ldx.hypot(ldy);
                let (ldx, ldy) = if norm > 0.0 { (ldx / norm, ldy / norm) } else { (0.0, 0.0) };
                CurveSample::new(progress, sx.calc(at), sy.calc(at), ldx, ldy)
            })
            .collect();

        Self::new(samples, self.total_length)
    }
}

/// Progress wrapped into `[0, total_length)`
pub fn wrap_progress(s: f64, total_length: f64) -> f64 {
    let w = s.rem_euclid(total_length);
    // rem_euclid may round up to the modulus for tiny negative inputs
    if w >= total_length { 0.0 } else { w }
}

/// Signed along-road distance from `from` to `to` on a loop of
/// `total_length`, in `(-L/2, L/2]`
pub fn progress_delta(from: f64, to: f64, total_length: f64) -> f64 {
    let mut delta = wrap_progress(to - from, total_length);
    if delta > total_length / 2.0 {
        delta -= total_length;
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn square() -> ReferenceCurve {
        ReferenceCurve::from_points(&[
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
        ]).unwrap()
    }

    #[test]
    fn test_from_points_progress_and_lateral() {
        let curve = square();
        assert_eq!(curve.len(), 4);
        assert_abs_diff_eq!(curve.total_length(), 40.0);
        assert_abs_diff_eq!(curve.sample(2).progress, 20.0);
        // Travelling +x, right is -y
        assert_abs_diff_eq!(curve.sample(0).lateral_dx, 0.0);
        assert_abs_diff_eq!(curve.sample(0).lateral_dy, -1.0);
    }

    #[test]
    fn test_rejects_bad_curves() {
        let p = CurveSample::new(0.0, 0.0, 0.0, 0.0, -1.0);
        assert!(matches!(ReferenceCurve::new(vec![p], 10.0), Err(PlannerError::InvalidCurve(_))));

        let q = CurveSample::new(0.0, 1.0, 0.0, 0.0, -1.0);
        assert!(matches!(ReferenceCurve::new(vec![p, q], 10.0), Err(PlannerError::InvalidCurve(_))));

        let q = CurveSample::new(5.0, 1.0, 0.0, 0.0, -1.0);
        assert!(matches!(ReferenceCurve::new(vec![p, q], 5.0), Err(PlannerError::InvalidCurve(_))));
        assert!(ReferenceCurve::new(vec![p, q], 6.0).is_ok());

        let n = CurveSample::new(-1.0, 0.0, 0.0, 0.0, -1.0);
        match ReferenceCurve::new(vec![n, q], 10.0) {
            Err(PlannerError::InvalidCurve(msg)) => assert!(msg.contains("negative"), "{}", msg),
            other => panic!("expected a negative progress error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrap_and_delta() {
        let curve = square();
        assert_abs_diff_eq!(curve.wrap_progress(45.0), 5.0);
        assert_abs_diff_eq!(curve.wrap_progress(-5.0), 35.0);
        assert_abs_diff_eq!(curve.progress_delta(38.0, 2.0), 4.0);
        assert_abs_diff_eq!(curve.progress_delta(2.0, 38.0), -4.0);
    }

    #[test]
    fn test_locate() {
        let curve = square();
        assert_eq!(curve.locate(0.0), (0, 0.0));
        let (i, off) = curve.locate(25.0);
        assert_eq!(i, 2);
        assert_abs_diff_eq!(off, 5.0);
        let (i, off) = curve.locate(39.0);
        assert_eq!(i, 3);
        assert_abs_diff_eq!(off, 9.0);
    }

    #[test]
    fn test_densify_circle() {
        let r = 100.0;
        let points: Vec<Point2D> = (0..72)
            .map(|i| {
                let a = 2.0 * PI * i as f64 / 72.0;
                Point2D::new(r * a.cos(), r * a.sin())
            })
            .collect();
        let sparse = ReferenceCurve::from_points(&points).unwrap();
        let dense = sparse.densify(1000).unwrap();

        assert_eq!(dense.len(), 1000);
        assert_abs_diff_eq!(dense.total_length(), sparse.total_length());
        for p in dense.samples() {
            assert_abs_diff_eq!(p.x.hypot(p.y), r, epsilon = 0.25);
            assert_abs_diff_eq!(p.lateral_dx.hypot(p.lateral_dy), 1.0, epsilon = 1e-9);
        }
        // Passes through the input knots
        assert_abs_diff_eq!(dense.sample(0).x, r, epsilon = 1e-9);
        assert_abs_diff_eq!(dense.sample(0).y, 0.0, epsilon = 1e-9);
    }
}
