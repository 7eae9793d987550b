//! Box-Cox power transform over a pooled hierarchy
//!
//! The transform `x ↦ (x^λ − 1) / λ` (`ln x` for `λ = 0`) is applied with a
//! single λ estimated from the pooled sample of the whole hierarchy passed in.
//! λ maximizes the profile log-likelihood of a normal model for the
//! transformed values:
//!
//! ```text
//! llf(λ) = (λ − 1) · Σ ln xᵢ − (n / 2) · ln σ²(λ)
//! ```
//!
//! where `σ²(λ)` is the population variance of the transformed sample. The
//! search runs Brent's bounded method over [`LambdaSearch`] bounds, `[-10, 10]`
//! by default. Since only the pooled multiset enters the likelihood, λ does
//! not depend on how the values are grouped.
//!
//! # Example
//!
//! ```
//! use schicksal_normalize::{box_cox::calculate_lambda, sample::{Leaf, Sample}};
//!
//! let sample = Sample::from(Leaf::new(vec![2.0, 7.0, 8.0, 7.0, 4.0, 4.0, 4.0]));
//! let lambda = calculate_lambda(&sample)?;
//! assert!((lambda - 0.705).abs() < 0.00025);
//! # Ok::<(), schicksal_normalize::NormalizeError>(())
//! ```

use std::borrow::Cow;

use schicksal_stats::{descriptive::DescriptiveStats, optimize::minimize_bounded};
use serde::{Deserialize, Serialize};

use crate::{NormalizeError, record::TransformRecord, sample::Sample};

/// |λ| below which the logarithmic branch of the transform is used
const LAMBDA_ZERO: f64 = 1e-12;

/// λ used when the pooled sample has fewer than two distinct values
const DEGENERATE_LAMBDA: f64 = 1.0;

/// Bounds and tolerance of the λ search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LambdaSearch {
    /// Lower bound of the search interval
    pub lower: f64,
    /// Upper bound of the search interval
    pub upper: f64,
    /// Relative tolerance on λ
    pub tolerance: f64,
}

impl Default for LambdaSearch {
    fn default() -> Self {
        Self {
            lower: -10.0,
            upper: 10.0,
            tolerance: 1e-8,
        }
    }
}

impl LambdaSearch {
    fn validate(&self) -> Result<(), NormalizeError> {
        let Self {
            lower,
            upper,
            tolerance,
        } = *self;
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(NormalizeError::argument(format!(
                "invalid λ search interval [{lower}, {upper}]"
            )));
        }
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(NormalizeError::argument(format!(
                "invalid λ search tolerance {tolerance}"
            )));
        }
        Ok(())
    }
}

/// Box-Cox transform of a single positive value.
///
/// Evaluated as `expm1(λ ln x) / λ` so that λ close to zero stays accurate.
#[must_use]
pub fn box_cox(x: f64, lambda: f64) -> f64 {
    if lambda.abs() < LAMBDA_ZERO {
        x.ln()
    } else {
        (lambda * x.ln()).exp_m1() / lambda
    }
}

/// Inverse of [`box_cox`].
#[must_use]
pub fn inverse_box_cox(y: f64, lambda: f64) -> f64 {
    if lambda.abs() < LAMBDA_ZERO {
        y.exp()
    } else {
        ((y * lambda).ln_1p() / lambda).exp()
    }
}

/// Collects the pooled sample, checking that Box-Cox is defined on it.
fn positive_pooled(sample: &Sample) -> Result<Vec<f64>, NormalizeError> {
    let pooled = sample.flatten().collect::<Vec<_>>();
    if pooled.is_empty() {
        return Err(NormalizeError::argument(
            "cannot apply Box-Cox to an empty sample",
        ));
    }
    if let Some(value) = pooled.iter().find(|v| !v.is_finite()) {
        return Err(NormalizeError::argument(format!(
            "cannot apply Box-Cox to non-finite value {value}"
        )));
    }
    if let Some(&value) = pooled.iter().find(|&&v| v <= 0.0) {
        return Err(NormalizeError::Domain { value });
    }
    Ok(pooled)
}

/// Negative profile log-likelihood of λ for a positive sample.
#[expect(clippy::cast_precision_loss)]
fn negative_log_likelihood(values: &[f64], log_sum: f64, lambda: f64) -> f64 {
    let n = values.len() as f64;
    let Some(stats) = DescriptiveStats::new(values.iter().map(|&x| box_cox(x, lambda))) else {
        return f64::INFINITY;
    };
    -((lambda - 1.0) * log_sum - n / 2.0 * stats.variance.ln())
}

/// Estimates λ for an already validated pooled sample.
#[expect(clippy::float_cmp)]
fn estimate_lambda(pooled: &[f64], search: &LambdaSearch) -> f64 {
    let first = pooled[0];
    if pooled.iter().all(|&x| x == first) {
        log::debug!("pooled sample has no spread, using λ = {DEGENERATE_LAMBDA}");
        return DEGENERATE_LAMBDA;
    }

    let log_sum = pooled.iter().map(|x| x.ln()).sum::<f64>();
    let minimum = minimize_bounded(
        |lambda| negative_log_likelihood(pooled, log_sum, lambda),
        search.lower,
        search.upper,
        search.tolerance,
    );
    if !minimum.converged {
        log::warn!(
            "λ search did not converge after {} iterations, using λ = {}",
            minimum.iterations,
            minimum.x
        );
    }
    let margin = 2.0 * search.tolerance * minimum.x.abs().max(1.0);
    if minimum.x - search.lower < margin || search.upper - minimum.x < margin {
        log::warn!(
            "estimated λ = {} lies on the search bound [{}, {}]",
            minimum.x,
            search.lower,
            search.upper
        );
    }
    log::debug!(
        "estimated λ = {} from {} values in {} iterations",
        minimum.x,
        pooled.len(),
        minimum.iterations
    );
    minimum.x
}

/// Estimates the Box-Cox λ of the pooled sample with the default search.
///
/// # Errors
///
/// * [`NormalizeError::Domain`] when a pooled value is `<= 0`
/// * [`NormalizeError::Argument`] when the pooled sample is empty or contains a non-finite value
pub fn calculate_lambda(sample: &Sample) -> Result<f64, NormalizeError> {
    calculate_lambda_with(sample, &LambdaSearch::default())
}

/// Estimates the Box-Cox λ of the pooled sample within `search`.
///
/// # Errors
///
/// As [`calculate_lambda`], plus [`NormalizeError::Argument`] for invalid
/// search bounds or tolerance.
pub fn calculate_lambda_with(
    sample: &Sample,
    search: &LambdaSearch,
) -> Result<f64, NormalizeError> {
    search.validate()?;
    let pooled = positive_pooled(sample)?;
    Ok(estimate_lambda(&pooled, search))
}

/// Applies the Box-Cox transform with λ estimated from the pooled sample.
///
/// Every produced leaf carries `TransformRecord::BoxCox { lambda, estimated: true }`.
/// The result is always a new instance.
///
/// # Errors
///
/// As [`calculate_lambda`].
pub fn box_cox_normalize(sample: &Sample) -> Result<Sample, NormalizeError> {
    box_cox_normalize_with(sample, &LambdaSearch::default())
}

/// Applies the Box-Cox transform with λ estimated within `search`.
///
/// # Errors
///
/// As [`calculate_lambda_with`].
pub fn box_cox_normalize_with(
    sample: &Sample,
    search: &LambdaSearch,
) -> Result<Sample, NormalizeError> {
    search.validate()?;
    let pooled = positive_pooled(sample)?;
    let lambda = estimate_lambda(&pooled, search);
    Ok(transform(sample, pooled, lambda, true))
}

/// Applies the Box-Cox transform with a caller-supplied λ.
///
/// When every leaf of `sample` already carries a record produced by this
/// function with the same λ, `sample` is returned borrowed. Records holding an
/// estimated λ never match.
///
/// # Errors
///
/// * [`NormalizeError::Argument`] when `lambda` is not finite, or as [`calculate_lambda`]
/// * [`NormalizeError::Domain`] when a pooled value is `<= 0`
#[expect(clippy::float_cmp)]
pub fn box_cox_normalize_with_lambda(
    sample: &Sample,
    lambda: f64,
) -> Result<Cow<'_, Sample>, NormalizeError> {
    if !lambda.is_finite() {
        return Err(NormalizeError::argument(format!("invalid λ {lambda}")));
    }

    let mut leaves = sample.leaves().peekable();
    if leaves.peek().is_some()
        && leaves.all(|leaf| match leaf.record() {
            Some(TransformRecord::BoxCox {
                lambda: previous,
                estimated: false,
            }) => *previous == lambda,
            _ => false,
        })
    {
        log::debug!("sample already Box-Cox transformed with λ = {lambda}, reusing it");
        return Ok(Cow::Borrowed(sample));
    }

    let pooled = positive_pooled(sample)?;
    Ok(Cow::Owned(transform(sample, pooled, lambda, false)))
}

fn transform(sample: &Sample, pooled: Vec<f64>, lambda: f64, estimated: bool) -> Sample {
    let record = TransformRecord::BoxCox { lambda, estimated };
    let mut transformed = pooled.into_iter().map(|x| box_cox(x, lambda));
    sample.rebuild(&mut transformed, Some(&record))
}
