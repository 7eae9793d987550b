//! Rank normalization over a pooled hierarchy
//!
//! Every observation is replaced by its fractional rank within the pooled
//! sample of the whole hierarchy passed in, so ranks from different leaves are
//! directly comparable. Ties share the mean of their positions.
//!
//! # Example
//!
//! ```
//! use schicksal_normalize::{rank::rank_normalize, sample::{Leaf, Sample}};
//!
//! let sample = Sample::from(Leaf::new(vec![2.0, 7.0, 9.2, 7.0, 4.0, 4.0, 4.0]));
//! let ranked = rank_normalize(&sample, Some(2))?;
//! assert_eq!(
//!     ranked.flatten().collect::<Vec<_>>(),
//!     vec![1.0, 5.5, 7.0, 5.5, 3.0, 3.0, 3.0]
//! );
//! # Ok::<(), schicksal_normalize::NormalizeError>(())
//! ```

use std::{borrow::Cow, sync::Arc};

use schicksal_stats::ranking::fractional_ranks_sorted;

use crate::{
    NormalizeError,
    record::{Precision, RankTable, TransformRecord},
    sample::Sample,
};

/// Replaces every observation by its fractional rank in the pooled sample.
///
/// # Arguments
///
/// * `sample` - Hierarchy to normalize
/// * `precision` - Decimal digits used to decide ties. `None` compares exact
///   values.
///
/// # Returns
///
/// A hierarchy of identical shape carrying [`TransformRecord::Rank`] on its
/// root. When `sample` already carries a rank record with the same explicit
/// precision, `sample` itself is returned borrowed. An omitted precision
/// always recomputes.
///
/// # Errors
///
/// [`NormalizeError::Argument`] when the pooled sample is empty, contains a
/// non-finite value, or `precision` exceeds [`Precision::MAX_DIGITS`].
pub fn rank_normalize(
    sample: &Sample,
    precision: Option<u32>,
) -> Result<Cow<'_, Sample>, NormalizeError> {
    if let Some(digits) = precision
        && digits > Precision::MAX_DIGITS
    {
        return Err(NormalizeError::argument(format!(
            "precision {digits} exceeds the maximum of {} digits",
            Precision::MAX_DIGITS
        )));
    }
    let precision = Precision::from(precision);

    if precision.is_explicit()
        && let Some(TransformRecord::Rank {
            precision: previous,
            ..
        }) = sample.record()
        && *previous == precision
    {
        log::debug!("sample already rank-normalized with {precision:?}, reusing it");
        return Ok(Cow::Borrowed(sample));
    }

    let pooled = sample.flatten().collect::<Vec<_>>();
    if pooled.is_empty() {
        return Err(NormalizeError::argument("cannot rank an empty sample"));
    }
    if let Some(value) = pooled.iter().find(|v| !v.is_finite()) {
        return Err(NormalizeError::argument(format!(
            "cannot rank non-finite value {value}"
        )));
    }

    // positions into `pooled`, ordered by true value
    let mut order = (0..pooled.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| pooled[a].total_cmp(&pooled[b]));
    let sorted = order.iter().map(|&i| pooled[i]).collect::<Vec<_>>();
    let sorted_ranks = fractional_ranks_sorted(&sorted, |&a, &b| precision.ties(a, b));

    let mut ranks = vec![0.0; pooled.len()];
    for (&position, &rank) in order.iter().zip(&sorted_ranks) {
        ranks[position] = rank;
    }

    let table = RankTable::from_sorted(&sorted, &sorted_ranks)
        .ok_or_else(|| NormalizeError::argument("cannot rank an empty sample"))?;
    let record = TransformRecord::Rank {
        precision,
        table: Arc::new(table),
    };

    let ranked = sample
        .rebuild(&mut ranks.into_iter(), None)
        .with_root_record(record);
    log::debug!("rank-normalized {} values with {precision:?}", sorted.len());
    Ok(Cow::Owned(ranked))
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;
    use crate::sample::{Leaf, Node};

    fn leaf(values: &[f64]) -> Sample {
        Leaf::new(values.to_vec()).into()
    }

    fn node(children: Vec<Sample>) -> Sample {
        Node::new(children).unwrap().into()
    }

    fn assert_values(sample: &Sample, expected: &[f64]) {
        let actual = sample.flatten().collect::<Vec<_>>();
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 0.01, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_one_dimension_group() {
        let sample = leaf(&[2.0, 7.0, 9.2, 7.0, 4.0, 4.0, 4.0]);
        let ranked = rank_normalize(&sample, Some(2)).unwrap();
        assert_eq!(ranked.count(), 7);
        assert_values(&ranked, &[1.0, 5.5, 7.0, 5.5, 3.0, 3.0, 3.0]);
        assert_eq!(
            ranked.record().and_then(TransformRecord::precision),
            Some(Precision::Digits(2))
        );
    }

    #[test]
    fn test_several_maxes() {
        let sample = leaf(&[2.0, 7.0, 9.2, 7.0, 4.0, 4.0, 9.2, 9.2]);
        let ranked = rank_normalize(&sample, Some(2)).unwrap();
        assert_values(&ranked, &[1.0, 4.5, 7.0, 4.5, 2.5, 2.5, 7.0, 7.0]);
    }

    #[test]
    fn test_two_dimensions_group() {
        let sample = node(vec![
            leaf(&[2.0, 4.0, 6.0]),
            leaf(&[4.0, 5.0, 7.0]),
            leaf(&[6.0, 7.0, 7.0, 8.0]),
        ]);
        let ranked = rank_normalize(&sample, None).unwrap();
        assert_eq!(ranked.count(), 3);
        assert!(sample.has_same_shape(&ranked));
        assert_values(
            &ranked,
            &[1.0, 2.5, 5.5, 2.5, 4.0, 8.0, 5.5, 8.0, 8.0, 10.0],
        );
        // only the root carries the record
        assert!(ranked.record().is_some());
        assert!(ranked.child(0).unwrap().record().is_none());
    }

    #[test]
    fn test_three_dimensions_group() {
        let sample = node(vec![
            node(vec![leaf(&[9.0, 4.0, 6.0]), leaf(&[10.0, 5.0, 7.0])]),
            node(vec![leaf(&[8.0, 11.0, 15.0]), leaf(&[12.0, 13.0, 14.0])]),
        ]);
        let ranked = rank_normalize(&sample, None).unwrap();
        assert!(sample.has_same_shape(&ranked));
        // values 4..=15 are distinct, so each rank is value - 3
        let expected = sample.flatten().map(|v| v - 3.0).collect::<Vec<_>>();
        assert_values(&ranked, &expected);
    }

    #[test]
    fn test_explicit_precision_is_idempotent() {
        let sample = leaf(&[2.0, 7.0, 9.2, 7.0, 4.0, 4.0, 4.0]);
        let ranked = rank_normalize(&sample, Some(2)).unwrap().into_owned();
        let again = rank_normalize(&ranked, Some(2)).unwrap();
        assert!(matches!(again, Cow::Borrowed(_)));
        assert!(std::ptr::eq(&*again, &ranked));
    }

    #[test]
    fn test_omitted_precision_recomputes() {
        let sample = leaf(&[2.0, 7.0, 9.2, 7.0, 4.0, 4.0, 4.0]);
        let ranked = rank_normalize(&sample, Some(2)).unwrap().into_owned();
        let again = rank_normalize(&ranked, None).unwrap();
        assert!(matches!(again, Cow::Owned(_)));
        assert_eq!(
            again.record().and_then(TransformRecord::precision),
            Some(Precision::Unrounded)
        );

        let unrounded = rank_normalize(&sample, None).unwrap().into_owned();
        assert!(matches!(rank_normalize(&unrounded, None).unwrap(), Cow::Owned(_)));
        // explicit after omitted: different parameter, recompute
        assert!(matches!(rank_normalize(&unrounded, Some(2)).unwrap(), Cow::Owned(_)));
    }

    #[test]
    fn test_different_precision_recomputes() {
        let sample = leaf(&[1.04, 1.01, 2.0]);
        let coarse = rank_normalize(&sample, Some(1)).unwrap().into_owned();
        assert_values(&coarse, &[1.5, 1.5, 3.0]);
        let fine = rank_normalize(&coarse, Some(2)).unwrap();
        assert!(matches!(fine, Cow::Owned(_)));
        // ranks of ranks: 1.5, 1.5, 3.0 stay tied at any precision
        assert_values(&fine, &[1.5, 1.5, 3.0]);
    }

    #[test]
    fn test_child_of_ranked_node_is_not_ranked() {
        let sample = node(vec![leaf(&[2.0, 4.0, 6.0]), leaf(&[6.0, 7.0, 7.0, 8.0])]);
        let ranked = rank_normalize(&sample, Some(2)).unwrap().into_owned();
        let child = ranked.child(1).unwrap();
        let reranked = rank_normalize(child, Some(2)).unwrap();
        assert!(matches!(reranked, Cow::Owned(_)));
        assert_values(&reranked, &[1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn test_edge_cases() {
        assert_values(&rank_normalize(&leaf(&[3.3]), None).unwrap(), &[1.0]);
        assert_values(
            &rank_normalize(&leaf(&[5.0; 4]), Some(0)).unwrap(),
            &[2.5; 4],
        );
    }

    #[test]
    fn test_rounding_window_ties() {
        let sample = leaf(&[4.001, 4.004, 3.0]);
        assert_values(&rank_normalize(&sample, Some(2)).unwrap(), &[2.5, 2.5, 1.0]);
        assert_values(&rank_normalize(&sample, None).unwrap(), &[2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(rank_normalize(&leaf(&[]), None).unwrap_err().is_argument());
        let empty_groups = node(vec![leaf(&[]), leaf(&[])]);
        assert!(rank_normalize(&empty_groups, Some(1)).unwrap_err().is_argument());
        assert!(rank_normalize(&leaf(&[1.0, f64::NAN]), None).unwrap_err().is_argument());
        assert!(rank_normalize(&leaf(&[1.0, f64::INFINITY]), None).unwrap_err().is_argument());
        assert!(rank_normalize(&leaf(&[1.0]), Some(16)).unwrap_err().is_argument());
    }

    #[test]
    #[expect(clippy::cast_precision_loss)]
    fn test_random_hierarchies_keep_shape_and_rank_sum() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..30 {
            let groups = (0..rng.random_range(1..5))
                .map(|_| {
                    let len = rng.random_range(1..8);
                    leaf(&(0..len).map(|_| f64::from(rng.random_range(0..6))).collect::<Vec<_>>())
                })
                .collect();
            let sample = node(groups);
            let ranked = rank_normalize(&sample, Some(3)).unwrap();
            assert!(sample.has_same_shape(&ranked));
            let n = sample.pooled_len() as f64;
            let sum = ranked.flatten().sum::<f64>();
            assert!((sum - n * (n + 1.0) / 2.0).abs() < 1e-9);
        }
    }
}
