//! Transform metadata carried by normalized hierarchies
//!
//! Every hierarchy produced by the normalizer remembers how it was produced:
//!
//! - Rank normalization attaches [`TransformRecord::Rank`] to the *root* of the
//!   result. The record holds the comparison [`Precision`] and a [`RankTable`]
//!   capturing the pooled `(rank, original value)` pairs for inversion.
//! - Box-Cox normalization attaches [`TransformRecord::BoxCox`] to *every*
//!   produced leaf, so any leaf can be inverted on its own.
//!
//! Records are compared by value when deciding whether a transform can be
//! skipped; they live exactly as long as the instance that owns them.

use std::sync::Arc;

use schicksal_stats::{descriptive::DescriptiveStats, interpolate::PiecewiseLinear};
use serde::{Deserialize, Serialize};

/// Which transform produced a hierarchy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
    #[display("rank")]
    Rank,
    #[display("box-cox")]
    BoxCox,
}

/// Equality rule used to detect tied values during rank normalization
///
/// Ordering always uses the true value; precision only decides which
/// neighbours count as tied.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    /// Exact comparison. Used when the caller omits the precision; never
    /// considered equal to an explicit precision for idempotence purposes.
    #[default]
    Unrounded,
    /// Values are tied when they agree after rounding to this many decimal digits.
    Digits(u32),
}

impl Precision {
    /// Largest supported number of decimal digits
    pub const MAX_DIGITS: u32 = 15;

    /// Returns `true` when the precision was given explicitly by the caller.
    #[must_use]
    pub fn is_explicit(self) -> bool {
        self.digits().is_some()
    }

    /// Number of decimal digits, or `None` for [`Precision::Unrounded`].
    #[must_use]
    pub fn digits(self) -> Option<u32> {
        match self {
            Self::Unrounded => None,
            Self::Digits(digits) => Some(digits),
        }
    }

    /// Whether two values, adjacent in sorted order, are tied.
    #[expect(clippy::float_cmp, clippy::cast_possible_wrap)]
    #[must_use]
    pub fn ties(self, a: f64, b: f64) -> bool {
        match self {
            Self::Unrounded => a == b,
            Self::Digits(digits) => {
                let scale = 10.0_f64.powi(digits as i32);
                let (a_scaled, b_scaled) = (a * scale, b * scale);
                if a_scaled.is_finite() && b_scaled.is_finite() {
                    a_scaled.round() == b_scaled.round()
                } else {
                    // beyond the rounding window: fall back to exact comparison
                    a == b
                }
            }
        }
    }
}

impl From<Option<u32>> for Precision {
    fn from(digits: Option<u32>) -> Self {
        digits.map_or(Self::Unrounded, Self::Digits)
    }
}

/// Mapping from ranks back to original values, captured at transform time
///
/// Holds one point per distinct rank of the pooled sample (the original value
/// of a point is the mean of the originals sharing that rank) plus the
/// descriptive statistics of the original pooled sample. Queries between known
/// ranks are interpolated linearly; queries outside the observed rank range are
/// extrapolated from the nearest end with slope `(max - min) / n`, the average
/// width of one rank position in original units.
#[derive(Debug, Clone, PartialEq)]
pub struct RankTable {
    lookup: PiecewiseLinear,
    original: DescriptiveStats,
}

impl RankTable {
    /// Builds the table from the pooled sample sorted ascending and the ranks
    /// assigned to it in the same order.
    ///
    /// Returns `None` for an empty sample.
    #[expect(clippy::float_cmp, clippy::cast_precision_loss)]
    pub(crate) fn from_sorted(sorted_values: &[f64], ranks: &[f64]) -> Option<Self> {
        debug_assert_eq!(sorted_values.len(), ranks.len());
        let original = DescriptiveStats::new(sorted_values.iter().copied())?;

        let pairs = ranks
            .iter()
            .copied()
            .zip(sorted_values.iter().copied())
            .collect::<Vec<_>>();
        let points = pairs
            .chunk_by(|a, b| a.0 == b.0)
            .map(|run| {
                let mean = run.iter().map(|(_, value)| value).sum::<f64>() / run.len() as f64;
                (run[0].0, mean)
            })
            .collect::<Vec<_>>();

        let outer_slope = original.range() / original.count as f64;
        let lookup = PiecewiseLinear::new(points, outer_slope)?;
        Some(Self { lookup, original })
    }

    /// Distinct `(rank, original value)` points in ascending rank order.
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        self.lookup.points()
    }

    /// Descriptive statistics of the original pooled sample.
    #[must_use]
    pub fn original_stats(&self) -> &DescriptiveStats {
        &self.original
    }

    /// Maps a rank (possibly fractional, possibly out of range) to original units.
    #[must_use]
    pub fn original_value(&self, rank: f64) -> f64 {
        self.lookup.eval(rank)
    }
}

/// Metadata identifying the transform that produced a hierarchy instance
#[derive(Debug, Clone, PartialEq)]
pub enum TransformRecord {
    /// Rank normalization, attached to the root of the result
    Rank {
        precision: Precision,
        table: Arc<RankTable>,
    },
    /// Box-Cox transform, attached to every produced leaf
    BoxCox {
        lambda: f64,
        /// `true` when λ was estimated from the data rather than supplied
        estimated: bool,
    },
}

impl TransformRecord {
    /// Which transform this record describes.
    #[must_use]
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Rank { .. } => TransformKind::Rank,
            Self::BoxCox { .. } => TransformKind::BoxCox,
        }
    }

    /// The transform parameter as a real number: precision digits for rank
    /// records (`None` when unrounded), λ for Box-Cox records.
    #[must_use]
    pub fn parameter(&self) -> Option<f64> {
        match self {
            Self::Rank { precision, .. } => precision.digits().map(f64::from),
            Self::BoxCox { lambda, .. } => Some(*lambda),
        }
    }

    /// Comparison precision of a rank record.
    #[must_use]
    pub fn precision(&self) -> Option<Precision> {
        match self {
            Self::Rank { precision, .. } => Some(*precision),
            Self::BoxCox { .. } => None,
        }
    }

    /// λ of a Box-Cox record.
    #[must_use]
    pub fn lambda(&self) -> Option<f64> {
        match self {
            Self::Rank { .. } => None,
            Self::BoxCox { lambda, .. } => Some(*lambda),
        }
    }

    /// Inverse table of a rank record.
    #[must_use]
    pub fn rank_table(&self) -> Option<&RankTable> {
        match self {
            Self::Rank { table, .. } => Some(table),
            Self::BoxCox { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_from_option() {
        assert_eq!(Precision::from(None), Precision::Unrounded);
        assert_eq!(Precision::from(Some(2)), Precision::Digits(2));
        assert!(!Precision::Unrounded.is_explicit());
        assert!(Precision::Digits(0).is_explicit());
    }

    #[test]
    fn test_precision_ties() {
        assert!(Precision::Digits(2).ties(4.001, 4.004));
        assert!(!Precision::Digits(2).ties(4.001, 4.009));
        assert!(!Precision::Unrounded.ties(4.001, 4.004));
        assert!(Precision::Unrounded.ties(7.0, 7.0));
        assert!(Precision::Digits(0).ties(1.6, 2.4));
        // scaled values overflow: exact comparison
        assert!(!Precision::Digits(15).ties(1e300, 1.000_000_1e300));
    }

    #[test]
    fn test_rank_table_merges_tied_ranks() {
        let sorted = [2.0, 4.0, 4.0, 4.0, 7.0, 7.0, 9.2];
        let ranks = [1.0, 3.0, 3.0, 3.0, 5.5, 5.5, 7.0];
        let table = RankTable::from_sorted(&sorted, &ranks).unwrap();
        assert_eq!(
            table.points(),
            &[(1.0, 2.0), (3.0, 4.0), (5.5, 7.0), (7.0, 9.2)]
        );
        assert_eq!(table.original_stats().count, 7);
    }

    #[test]
    fn test_rank_table_empty() {
        assert!(RankTable::from_sorted(&[], &[]).is_none());
    }

    #[test]
    fn test_record_accessors() {
        let record = TransformRecord::BoxCox {
            lambda: 0.5,
            estimated: true,
        };
        assert_eq!(record.kind(), TransformKind::BoxCox);
        assert_eq!(record.lambda(), Some(0.5));
        assert_eq!(record.parameter(), Some(0.5));
        assert!(record.precision().is_none());
        assert!(record.rank_table().is_none());

        let table = RankTable::from_sorted(&[1.0], &[1.0]).unwrap();
        let record = TransformRecord::Rank {
            precision: Precision::Digits(3),
            table: Arc::new(table),
        };
        assert_eq!(record.kind(), TransformKind::Rank);
        assert_eq!(record.parameter(), Some(3.0));
        assert_eq!(record.precision(), Some(Precision::Digits(3)));
        assert!(record.lambda().is_none());
        assert!(record.rank_table().is_some());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TransformKind::Rank.to_string(), "rank");
        assert_eq!(TransformKind::BoxCox.to_string(), "box-cox");
    }
}
