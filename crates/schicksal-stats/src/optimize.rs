//! Bounded scalar minimization
//!
//! [`minimize_bounded`] implements Brent's method: golden-section search on
//! the bracketing interval, accelerated by successive parabolic interpolation
//! whenever the parabola step stays inside the bracket and shrinks fast enough.
//! It needs no derivatives, never evaluates outside `[lower, upper]` and
//! terminates after at most [`MAX_ITERATIONS`] steps.
//!
//! # Examples
//!
//! ```
//! use schicksal_stats::optimize::minimize_bounded;
//!
//! let min = minimize_bounded(|x| (x - 2.0).powi(2) + 1.0, -10.0, 10.0, 1e-8);
//! assert!(min.converged);
//! assert!((min.x - 2.0).abs() < 1e-6);
//! assert!((min.value - 1.0).abs() < 1e-12);
//! ```

/// Upper bound on iterations performed by [`minimize_bounded`].
pub const MAX_ITERATIONS: usize = 500;

/// Absolute floor added to the relative tolerance so that minima at zero converge.
const ABSOLUTE_TOLERANCE: f64 = 1e-10;

/// Result of a bounded minimization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedMinimum {
    /// Abscissa of the best point found
    pub x: f64,
    /// Objective value at `x`
    pub value: f64,
    /// Number of iterations performed
    pub iterations: usize,
    /// Whether the bracket shrank below the tolerance before [`MAX_ITERATIONS`]
    pub converged: bool,
}

/// Minimizes `f` over the closed interval `[lower, upper]`.
///
/// # Arguments
///
/// * `f` - Objective function. Non-finite values are treated as `+inf`.
/// * `lower`, `upper` - Bracketing interval, `lower < upper`
/// * `tolerance` - Relative tolerance on the abscissa
///
/// # Panics
///
/// Panics if `lower >= upper` or either bound is not finite.
#[expect(clippy::float_cmp)]
#[must_use]
pub fn minimize_bounded<F>(mut f: F, lower: f64, upper: f64, tolerance: f64) -> BoundedMinimum
where
    F: FnMut(f64) -> f64,
{
    assert!(
        lower.is_finite() && upper.is_finite() && lower < upper,
        "bounds must be finite with lower < upper"
    );

    let golden = (3.0 - 5.0_f64.sqrt()) / 2.0;
    let mut objective = |x: f64| {
        let value = f(x);
        if value.is_finite() { value } else { f64::INFINITY }
    };

    let (mut a, mut b) = (lower, upper);
    let mut x = a + golden * (b - a);
    let (mut w, mut v) = (x, x);
    let mut fx = objective(x);
    let (mut fw, mut fv) = (fx, fx);
    // d: current step, e: step before last
    let (mut d, mut e) = (0.0_f64, 0.0_f64);

    for iteration in 0..MAX_ITERATIONS {
        let mid = 0.5 * (a + b);
        let tol1 = tolerance * x.abs() + ABSOLUTE_TOLERANCE;
        let tol2 = 2.0 * tol1;
        if (x - mid).abs() <= tol2 - 0.5 * (b - a) {
            return BoundedMinimum {
                x,
                value: fx,
                iterations: iteration,
                converged: true,
            };
        }

        let mut parabolic = false;
        if e.abs() > tol1 {
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let previous = e;
            e = d;
            if p.abs() < (0.5 * q * previous).abs() && p > q * (a - x) && p < q * (b - x) {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = if x < mid { tol1 } else { -tol1 };
                }
                parabolic = true;
            }
        }
        if !parabolic {
            e = if x < mid { b - x } else { a - x };
            d = golden * e;
        }

        let u = if d.abs() >= tol1 {
            x + d
        } else if d > 0.0 {
            x + tol1
        } else {
            x - tol1
        };
        let fu = objective(u);

        if fu <= fx {
            if u < x {
                b = x;
            } else {
                a = x;
            }
            (v, fv) = (w, fw);
            (w, fw) = (x, fx);
            (x, fx) = (u, fu);
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                (v, fv) = (w, fw);
                (w, fw) = (u, fu);
            } else if fu <= fv || v == x || v == w {
                (v, fv) = (u, fu);
            }
        }
    }

    BoundedMinimum {
        x,
        value: fx,
        iterations: MAX_ITERATIONS,
        converged: false,
    }
}
