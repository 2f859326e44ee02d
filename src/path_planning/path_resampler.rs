//! Conversion of coarse road-relative samples into the dense output path
//!
//! The synthesizer emits one (s, d) pair every `sample_step` seconds. Each
//! pair is mapped to Cartesian space, x(t) and y(t) are fitted with natural
//! cubic splines through those knots, and the splines are evaluated at the
//! fixed output cadence expected by the actuation layer.

use log::trace;
use serde::Deserialize;

use crate::common::{FrameTransform, Path2D, PlannerError, PlannerResult, Point2D};
use crate::path_planning::CubicSpline;

/// Sampling cadence of the synthesized and output paths
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Time between synthesizer samples [s]
    pub sample_step: f64,
    /// Number of points in the output path
    pub output_count: usize,
    /// Time between consecutive output points [s]
    pub output_step: f64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            sample_step: 0.2,
            output_count: 50,
            output_step: 0.02,
        }
    }
}

impl PathConfig {
    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.sample_step > 0.0) || !(self.output_step > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "sample and output steps must be positive, got {} and {}",
                self.sample_step, self.output_step
            )));
        }
        if self.output_count == 0 {
            return Err(PlannerError::InvalidParameter(
                "output path must have at least one point".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fits and resamples coarse road-relative samples through a frame transform
pub struct PathResampler<'a, F: FrameTransform> {
    frame: &'a F,
    config: PathConfig,
}

impl<'a, F: FrameTransform> PathResampler<'a, F> {
    pub fn new(frame: &'a F, config: PathConfig) -> Self {
        Self { frame, config }
    }

    /// Map paired (s, d) samples to Cartesian knots
    pub fn coarse_path(&self, long_samples: &[f64], lat_samples: &[f64]) -> PlannerResult<Path2D> {
        if long_samples.len() != lat_samples.len() {
            return Err(PlannerError::DegenerateInput(format!(
                "{} longitudinal samples but {} lateral samples",
                long_samples.len(), lat_samples.len()
            )));
        }
        let points = long_samples.iter()
            .zip(lat_samples.iter())
            .map(|(&s, &d)| self.frame.to_cartesian(s, d))
            .collect();
        Ok(Path2D::from_points(points))
    }

    pub fn resample(&self, long_samples: &[f64], lat_samples: &[f64]) -> PlannerResult<Path2D> {
        self.resample_with(
            long_samples,
            lat_samples,
            self.config.output_count,
            self.config.output_step,
        )
    }

    pub fn resample_with(
        &self,
        long_samples: &[f64],
        lat_samples: &[f64],
        output_count: usize,
        output_step: f64,
    ) -> PlannerResult<Path2D> {
        let coarse = self.coarse_path(long_samples, lat_samples)?;
        if coarse.len() < 2 {
            return Err(PlannerError::DegenerateInput(format!(
                "need at least 2 coarse samples to fit a path, got {}", coarse.len()
            )));
        }

        let times: Vec<f64> = (0..coarse.len())
            .map(|i| i as f64 * self.config.sample_step)
            .collect();
        let spline_x = CubicSpline::new(&times, &coarse.x_coords())?;
        let spline_y = CubicSpline::new(&times, &coarse.y_coords())?;

        let points: Vec<Point2D> = (0..output_count)
            .map(|i| {
                let t = i as f64 * output_step;
                Point2D::new(spline_x.calc(t), spline_y.calc(t))
            })
            .collect();
        trace!(
            "Resampled {} knots over {:.2} s into {} points",
            coarse.len(), times[times.len() - 1], points.len()
        );

        Ok(Path2D::from_points(points))
    }
}

/// Convenience wrapper over [`PathResampler::resample_with`]
pub fn resample<F: FrameTransform>(
    frame: &F,
    long_samples: &[f64],
    lat_samples: &[f64],
    sample_step: f64,
    output_count: usize,
    output_step: f64,
) -> PlannerResult<Path2D> {
    let config = PathConfig { sample_step, output_count, output_step };
    config.validate()?;
    PathResampler::new(frame, config).resample(long_samples, lat_samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::FrenetPoint;
    use approx::assert_abs_diff_eq;

    // Road along the x axis, lanes towards -y
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
    fn test_interpolates_coarse_knots() {
        let frame = StraightFrame;
        let s = [0.0, 3.0, 7.0, 12.0, 18.0];
        let d = [2.0, 2.5, 4.0, 5.5, 6.0];
        // 0.2 s knots land on every 10th output point
        let path = resample(&frame, &s, &d, 0.2, 50, 0.02).unwrap();
        assert_eq!(path.len(), 50);
        for (k, (&si, &di)) in s.iter().zip(d.iter()).enumerate() {
            let p = path.points[k * 10];
            assert_abs_diff_eq!(p.x, si, epsilon = 1e-9);
            assert_abs_diff_eq!(p.y, -di, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_extrapolates_past_last_knot() {
        let frame = StraightFrame;
        let s = [0.0, 2.0, 4.0, 6.0];
        let d = [6.0; 4];
        let path = resample(&frame, &s, &d, 0.2, 50, 0.02).unwrap();
        // Constant 10 m/s continues beyond t = 0.6 s
        let last = path.last().unwrap();
        assert_abs_diff_eq!(last.x, 9.8, epsilon = 1e-9);
        assert_abs_diff_eq!(last.y, -6.0, epsilon = 1e-9);
        assert!(path.points.windows(2).all(|w| w[1].x > w[0].x));
    }

    #[test]
    fn test_degenerate_input() {
        let frame = StraightFrame;
        assert!(matches!(
            resample(&frame, &[1.0], &[2.0], 0.2, 50, 0.02),
            Err(PlannerError::DegenerateInput(_))
        ));
        assert!(matches!(
            resample(&frame, &[], &[], 0.2, 50, 0.02),
            Err(PlannerError::DegenerateInput(_))
        ));
        assert!(matches!(
            resample(&frame, &[1.0, 2.0], &[2.0], 0.2, 50, 0.02),
            Err(PlannerError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_invalid_cadence() {
        let frame = StraightFrame;
        assert!(matches!(
            resample(&frame, &[0.0, 1.0], &[0.0, 0.0], 0.2, 50, 0.0),
            Err(PlannerError::InvalidParameter(_))
        ));
    }
}
