//! Piecewise-linear lookup tables
//!
//! A [`PiecewiseLinear`] table maps an abscissa to an ordinate through a set of
//! known points. Inside the covered range it interpolates linearly between the
//! two neighbouring points; outside it extends from the nearest boundary point
//! along a fixed slope chosen by the caller.
//!
//! # Examples
//!
//! ```
//! use schicksal_stats::interpolate::PiecewiseLinear;
//!
//! let table = PiecewiseLinear::new(vec![(1.0, 2.0), (3.0, 4.0), (7.0, 9.2)], 1.0).unwrap();
//! assert_eq!(table.eval(3.0), 4.0);
//! assert!((table.eval(2.0) - 3.0).abs() < 1e-12);
//! assert!((table.eval(9.0) - 11.2).abs() < 1e-12);
//! assert!((table.eval(0.0) - 1.0).abs() < 1e-12);
//! ```

/// Lookup table with linear interpolation and fixed-slope extrapolation
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    /// Known points, strictly increasing in x
    points: Vec<(f64, f64)>,
    /// Slope used beyond either end of the table
    outer_slope: f64,
}

impl PiecewiseLinear {
    /// Creates a table from points sorted by strictly increasing abscissa.
    ///
    /// # Returns
    ///
    /// * `Some(PiecewiseLinear)` - if at least one point is given
    /// * `None` - if `points` is empty
    ///
    /// # Panics
    ///
    /// Panics if the abscissas are not strictly increasing.
    #[must_use]
    pub fn new(points: Vec<(f64, f64)>, outer_slope: f64) -> Option<Self> {
        assert!(
            points.is_sorted_by(|a, b| a.0 < b.0),
            "points must have strictly increasing abscissas"
        );
        if points.is_empty() {
            return None;
        }
        Some(Self {
            points,
            outer_slope,
        })
    }

    /// Known points in ascending abscissa order.
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Slope used for extrapolation.
    #[must_use]
    pub fn outer_slope(&self) -> f64 {
        self.outer_slope
    }

    /// Evaluates the table at `x`.
    ///
    /// A query equal to a known abscissa returns its ordinate exactly.
    #[expect(clippy::float_cmp)]
    #[must_use]
    pub fn eval(&self, x: f64) -> f64 {
        // `new` guarantees at least one point
        let (first_x, first_y) = self.points[0];
        let (last_x, last_y) = self.points[self.points.len() - 1];

        if x <= first_x {
            return first_y - (first_x - x) * self.outer_slope;
        }
        if x >= last_x {
            return last_y + (x - last_x) * self.outer_slope;
        }

        let idx = self.points.partition_point(|&(px, _)| px < x);
        let (upper_x, upper_y) = self.points[idx];
        if upper_x == x {
            return upper_y;
        }
        let (lower_x, lower_y) = self.points[idx - 1];
        let ratio = (x - lower_x) / (upper_x - lower_x);
        lower_y + ratio * (upper_y - lower_y)
    }
}
