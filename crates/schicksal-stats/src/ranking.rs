//! Fractional (mid-rank) ranking
//!
//! Ranks are 1-based positions in ascending order. Values that compare as
//! tied share the arithmetic mean of the positions they occupy, so the ranks
//! of `n` values always sum to `n * (n + 1) / 2`.
//!
//! # Examples
//!
//! ```
//! use schicksal_stats::ranking::fractional_ranks_sorted;
//!
//! let sorted = [2.0, 4.0, 4.0, 4.0, 7.0, 7.0, 9.2];
//! let ranks = fractional_ranks_sorted(&sorted, |a, b| a == b);
//! assert_eq!(ranks, vec![1.0, 3.0, 3.0, 3.0, 5.5, 5.5, 7.0]);
//! ```

/// Assigns fractional ranks to an already sorted sequence.
///
/// `tied` decides whether two *adjacent* items belong to the same run. Every
/// member of a run receives the mean of the run's 1-based positions.
///
/// # Arguments
///
/// * `sorted` - Items in ascending order
/// * `tied` - Equality predicate used to detect runs of tied items
///
/// # Returns
///
/// Ranks in the same order as `sorted`.
///
/// # Examples
///
/// ```
/// use schicksal_stats::ranking::fractional_ranks_sorted;
///
/// // Ties detected on values rounded to whole numbers
/// let sorted = [1.1, 1.2, 3.0];
/// let ranks = fractional_ranks_sorted(&sorted, |a: &f64, b: &f64| a.round() == b.round());
/// assert_eq!(ranks, vec![1.5, 1.5, 3.0]);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn fractional_ranks_sorted<T, F>(sorted: &[T], mut tied: F) -> Vec<f64>
where
    F: FnMut(&T, &T) -> bool,
{
    let mut ranks = Vec::with_capacity(sorted.len());
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start + 1;
        while end < sorted.len() && tied(&sorted[end - 1], &sorted[end]) {
            end += 1;
        }
        // positions start+1 ..= end
        let rank = (start + 1 + end) as f64 / 2.0;
        ranks.extend(std::iter::repeat_n(rank, end - start));
        start = end;
    }
    ranks
}
