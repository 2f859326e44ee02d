// Natural cubic spline interpolation
//
// Used to densify the road centerline at startup and to resample the
// coarse jerk-optimal samples into the fixed-cadence output path.

use nalgebra::{DMatrix, DVector};

use crate::common::{PlannerError, PlannerResult};

/// 1-D natural cubic spline `y(x)` through a set of knots.
///
/// Outside the knot range the spline continues as a straight line with the
/// end slope, which keeps it C1 (and C2, since the natural end condition
/// zeroes the second derivative there).
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSpline {
    pub fn new(x: &[f64], y: &[f64]) -> PlannerResult<Self> {
        let nx = x.len();
        if nx != y.len() {
            return Err(PlannerError::DegenerateInput(format!(
                "knot count mismatch: {} abscissae, {} ordinates", nx, y.len()
            )));
        }
        if nx < 2 {
            return Err(PlannerError::DegenerateInput(format!(
                "a spline needs at least 2 knots, got {}", nx
            )));
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        if h.iter().any(|&hi| !(hi > 0.0)) {
            return Err(PlannerError::DegenerateInput(
                "spline knots must be strictly increasing".to_string(),
            ));
        }

        let a = y.to_vec();
        let a_mat = Self::calc_a(&h);
        let b_vec = Self::calc_b(&h, &a);
        let c_na = a_mat.lu().solve(&b_vec).ok_or_else(|| {
            PlannerError::DegenerateInput("singular spline system".to_string())
        })?;
        let c: Vec<f64> = c_na.iter().copied().collect();

        let mut b = Vec::with_capacity(nx);
        let mut d = Vec::with_capacity(nx - 1);
        for i in 0..nx - 1 {
            d.push((c[i + 1] - c[i]) / (3.0 * h[i]));
            b.push((a[i + 1] - a[i]) / h[i] - h[i] * (c[i + 1] + 2.0 * c[i]) / 3.0);
        }
        // Slope at the last knot, used for extrapolation past the end
        let last = nx - 2;
        b.push(b[last] + 2.0 * c[last] * h[last] + 3.0 * d[last] * h[last].powi(2));

        Ok(CubicSpline { x: x.to_vec(), a, b, c, d })
    }

    pub fn knots(&self) -> &[f64] {
        &self.x
    }

    /// Value at `t`
    pub fn calc(&self, t: f64) -> f64 {
        let n = self.x.len();
        if t <= self.x[0] {
            return self.a[0] + self.b[0] * (t - self.x[0]);
        }
        if t >= self.x[n - 1] {
            return self.a[n - 1] + self.b[n - 1] * (t - self.x[n - 1]);
        }
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.a[i] + self.b[i] * dx + self.c[i] * dx.powi(2) + self.d[i] * dx.powi(3)
    }

    /// First derivative at `t`
    pub fn calc_d(&self, t: f64) -> f64 {
        let n = self.x.len();
        if t <= self.x[0] {
            return self.b[0];
        }
        if t >= self.x[n - 1] {
            return self.b[n - 1];
        }
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.b[i] + 2.0 * self.c[i] * dx + 3.0 * self.d[i] * dx.powi(2)
    }

    /// Second derivative at `t`
    pub fn calc_dd(&self, t: f64) -> f64 {
        let n = self.x.len();
        if t <= self.x[0] || t >= self.x[n - 1] {
            return 0.0;
        }
        let i = self.search_index(t);
        let dx = t - self.x[i];
        2.0 * self.c[i] + 6.0 * self.d[i] * dx
    }

    fn search_index(&self, t: f64) -> usize {
        let i = self.x.partition_point(|&xi| xi <= t);
        i.saturating_sub(1).min(self.x.len() - 2)
    }

    fn calc_a(h: &[f64]) -> DMatrix<f64> {
        let nx = h.len() + 1;
        let mut a = DMatrix::zeros(nx, nx);
        a[(0, 0)] = 1.0;
        a[(nx - 1, nx - 1)] = 1.0;
        for i in 1..nx - 1 {
            a[(i, i - 1)] = h[i - 1];
            a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            a[(i, i + 1)] = h[i];
        }
        a
    }

    fn calc_b(h: &[f64], a: &[f64]) -> DVector<f64> {
        let nx = h.len() + 1;
        let mut b = DVector::zeros(nx);
        for i in 1..nx - 1 {
            b[i] = 3.0 * (a[i + 1] - a[i]) / h[i] - 3.0 * (a[i] - a[i - 1]) / h[i - 1];
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_passes_through_knots() {
        let x = [0.0, 1.0, 2.5, 3.0, 4.5, 6.0];
        let y = [0.0, -6.0, 5.0, 6.5, 0.0, -4.0];
        let sp = CubicSpline::new(&x, &y).unwrap();
        for (&xi, &yi) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(sp.calc(xi), yi, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_reproduces_linear_data() {
        let x = [0.0, 0.2, 0.4, 0.6, 0.8];
        let y: Vec<f64> = x.iter().map(|t| 3.0 * t + 1.0).collect();
        let sp = CubicSpline::new(&x, &y).unwrap();
        for k in 0..50 {
            let t = k as f64 * 0.02;
            assert_abs_diff_eq!(sp.calc(t), 3.0 * t + 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(sp.calc_d(t), 3.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_two_knots_is_a_line() {
        let sp = CubicSpline::new(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert_abs_diff_eq!(sp.calc(1.0), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sp.calc(3.0), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_first_derivative_continuous_at_knots() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 0.0, 1.0];
        let sp = CubicSpline::new(&x, &y).unwrap();
        let eps = 1e-7;
        for &xi in &x[1..3] {
            assert_abs_diff_eq!(sp.calc_d(xi - eps), sp.calc_d(xi + eps), epsilon = 1e-5);
        }
        // Natural end conditions and smooth extrapolation
        assert_abs_diff_eq!(sp.calc_d(3.0 - eps), sp.calc_d(3.0 + eps), epsilon = 1e-5);
        assert_abs_diff_eq!(sp.calc_dd(0.0 + eps), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rejects_degenerate_knots() {
        assert!(matches!(
            CubicSpline::new(&[1.0], &[1.0]),
            Err(PlannerError::DegenerateInput(_))
        ));
        assert!(matches!(
            CubicSpline::new(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0]),
            Err(PlannerError::DegenerateInput(_))
        ));
        assert!(matches!(
            CubicSpline::new(&[0.0, 1.0], &[0.0]),
            Err(PlannerError::DegenerateInput(_))
        ));
    }
}
