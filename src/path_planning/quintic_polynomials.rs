//! Minimum-jerk trajectory synthesis
//!
//! The trajectory minimizing integrated squared jerk between two
//! (position, velocity, acceleration) states over a fixed duration is the
//! unique quintic polynomial matching both states. The first three
//! coefficients follow from the start state; the remaining three come from
//! a 3x3 linear system whose matrix depends only on the duration.

use nalgebra::{Matrix3, Vector3};

use crate::common::{PlannerError, PlannerResult};

/// 1-D boundary conditions at t = 0 and t = duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryConditions {
    pub pos0: f64,
    pub vel0: f64,
    pub acc0: f64,
    pub pos1: f64,
    pub vel1: f64,
    pub acc1: f64,
    pub duration: f64,
}

impl BoundaryConditions {
    /// Rest-to-rest motion from `pos0` to `pos1`
    pub fn rest_to_rest(pos0: f64, pos1: f64, duration: f64) -> Self {
        Self { pos0, vel0: 0.0, acc0: 0.0, pos1, vel1: 0.0, acc1: 0.0, duration }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuinticPolynomial {
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
    pub a4: f64,
    pub a5: f64,
}

impl QuinticPolynomial {
    pub fn new(boundary: &BoundaryConditions) -> PlannerResult<Self> {
        let time = boundary.duration;
        if !(time > 0.0) {
            return Err(PlannerError::InvalidDuration(time));
        }

        let a0 = boundary.pos0;
        let a1 = boundary.vel0;
        let a2 = boundary.acc0 / 2.0;

        let t2 = time * time;
        let t3 = t2 * time;
        let t4 = t3 * time;
        let t5 = t4 * time;

        let a = Matrix3::new(
            t3, t4, t5,
            3.0 * t2, 4.0 * t3, 5.0 * t4,
            6.0 * time, 12.0 * t2, 20.0 * t3,
        );

        let b = Vector3::new(
            boundary.pos1 - a0 - a1 * time - a2 * t2,
            boundary.vel1 - a1 - 2.0 * a2 * time,
            boundary.acc1 - 2.0 * a2,
        );

        // det(A) = 2 T^9, non-zero for any positive duration short of underflow
        let x = a.try_inverse()
            .map(|inv| inv * b)
            .ok_or(PlannerError::InvalidDuration(time))?;

        Ok(QuinticPolynomial { a0, a1, a2, a3: x[0], a4: x[1], a5: x[2] })
    }

    pub fn calc_point(&self, t: f64) -> f64 {
        self.a0 + self.a1 * t + self.a2 * t.powi(2) +
        self.a3 * t.powi(3) + self.a4 * t.powi(4) + self.a5 * t.powi(5)
    }

    pub fn calc_first_derivative(&self, t: f64) -> f64 {
        self.a1 + 2.0 * self.a2 * t +
        3.0 * self.a3 * t.powi(2) + 4.0 * self.a4 * t.powi(3) + 5.0 * self.a5 * t.powi(4)
    }

    pub fn calc_second_derivative(&self, t: f64) -> f64 {
        2.0 * self.a2 + 6.0 * self.a3 * t +
        12.0 * self.a4 * t.powi(2) + 20.0 * self.a5 * t.powi(3)
    }

    pub fn calc_third_derivative(&self, t: f64) -> f64 {
        6.0 * self.a3 + 24.0 * self.a4 * t + 60.0 * self.a5 * t.powi(2)
    }
}

/// A solved minimum-jerk trajectory together with its horizon
#[derive(Debug, Clone, Copy)]
pub struct MinimumJerkTrajectory {
    polynomial: QuinticPolynomial,
    duration: f64,
}

impl MinimumJerkTrajectory {
    pub fn new(boundary: &BoundaryConditions) -> PlannerResult<Self> {
        Ok(Self {
            polynomial: QuinticPolynomial::new(boundary)?,
            duration: boundary.duration,
        })
    }

    pub fn polynomial(&self) -> &QuinticPolynomial {
        &self.polynomial
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Positions at t = 0, step, 2*step, ... while t < duration
    pub fn samples(&self, step: f64) -> PlannerResult<TrajectorySamples> {
        if !(step > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "sample step must be positive, got {}", step
            )));
        }
        Ok(TrajectorySamples {
            polynomial: self.polynomial,
            duration: self.duration,
            step,
            index: 0,
        })
    }
}

/// Lazy, finite sample sequence of a trajectory. Clone it to restart.
#[derive(Debug, Clone)]
pub struct TrajectorySamples {
    polynomial: QuinticPolynomial,
    duration: f64,
    step: f64,
    index: usize,
}

impl TrajectorySamples {
    /// Number of samples not yet yielded
    fn remaining(&self) -> usize {
        let mut total = (self.duration / self.step).ceil().max(0.0) as usize;
        while (total as f64) * self.step < self.duration {
            total += 1;
        }
        while total > 0 && ((total - 1) as f64) * self.step >= self.duration {
            total -= 1;
        }
        total.saturating_sub(self.index)
    }
}

impl Iterator for TrajectorySamples {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let t = self.index as f64 * self.step;
        if t >= self.duration {
            return None;
        }
        self.index += 1;
        Some(self.polynomial.calc_point(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for TrajectorySamples {}

/// Synthesize the minimum-jerk trajectory for `boundary` and sample it every `sample_step`.
pub fn solve(boundary: &BoundaryConditions, sample_step: f64) -> PlannerResult<TrajectorySamples> {
    MinimumJerkTrajectory::new(boundary)?.samples(sample_step)
}
