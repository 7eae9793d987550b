//! Shifting samples into the Box-Cox domain
//!
//! The Box-Cox transform is only defined for strictly positive values.
//! [`calculate_delta`] finds the smallest whole-number shift that moves a
//! sample into that domain, and [`shift_to_positive`] applies it to a whole
//! hierarchy.

use std::borrow::Cow;

use crate::{NormalizeError, sample::Sample};

/// Magnitude from which adding one to an `f64` is no longer exact (2^53)
const MAX_EXACT_SHIFT: f64 = 9_007_199_254_740_992.0;

/// Smallest non-negative integer `d` such that every `value + d > 0`.
///
/// Returns `0` when all values are already positive (or there are none),
/// otherwise `floor(-min) + 1`.
///
/// # Examples
///
/// ```
/// use schicksal_normalize::delta::calculate_delta;
///
/// assert_eq!(calculate_delta(&[-3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0]), 4);
/// assert_eq!(calculate_delta(&[-5.0]), 6);
/// assert_eq!(calculate_delta(&[0.0, 1.0, 2.0]), 1);
/// assert_eq!(calculate_delta(&[f64::MIN_POSITIVE, 2.0, 3.0]), 0);
/// ```
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn calculate_delta(values: &[f64]) -> u64 {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if min > 0.0 {
        return 0;
    }
    // saturating float-to-int conversion
    ((-min).floor() + 1.0) as u64
}

/// Shifts every value of `sample` by [`calculate_delta`] of its pooled sample.
///
/// Returns `sample` borrowed when no shift is needed. A shifted copy carries no
/// transform records.
///
/// # Errors
///
/// [`NormalizeError::Argument`] when the pooled sample contains a non-finite
/// value, or a value at or below `-2^53` that no integer shift can lift above zero.
#[expect(clippy::cast_precision_loss)]
pub fn shift_to_positive(sample: &Sample) -> Result<Cow<'_, Sample>, NormalizeError> {
    let pooled = sample.flatten().collect::<Vec<_>>();
    if let Some(value) = pooled.iter().find(|v| !v.is_finite()) {
        return Err(NormalizeError::argument(format!(
            "cannot shift non-finite value {value}"
        )));
    }

    let min = pooled.iter().copied().fold(f64::INFINITY, f64::min);
    if -min >= MAX_EXACT_SHIFT {
        return Err(NormalizeError::argument(format!(
            "cannot shift {min} into the positive range"
        )));
    }

    let delta = calculate_delta(&pooled);
    if delta == 0 {
        return Ok(Cow::Borrowed(sample));
    }
    log::debug!("shifting {} values by {delta}", pooled.len());
    let shift = delta as f64;
    let mut shifted = pooled.into_iter().map(|v| v + shift);
    Ok(Cow::Owned(sample.rebuild(&mut shifted, None)))
}
