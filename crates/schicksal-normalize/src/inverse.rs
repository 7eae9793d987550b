//! Mapping normalized values back to original units
//!
//! [`create_inverse_handler`] reads the transform records of a normalized
//! hierarchy and returns an [`InverseHandler`], a scalar-to-scalar mapping the
//! caller can apply to any value expressed on the normalized scale (for
//! example a group mean computed after normalization).
//!
//! # Example
//!
//! ```
//! use schicksal_normalize::{
//!     inverse::create_inverse_handler, rank::rank_normalize, sample::{Leaf, Sample},
//! };
//!
//! let sample = Sample::from(Leaf::new(vec![2.0, 7.0, 9.2, 7.0, 4.0, 4.0, 4.0]));
//! let ranked = rank_normalize(&sample, Some(2))?;
//! let inverse = create_inverse_handler(&ranked)?;
//! assert_eq!(inverse.invert(7.0), 9.2);
//! assert_eq!(inverse.invert(3.0), 4.0);
//! # Ok::<(), schicksal_normalize::NormalizeError>(())
//! ```

use std::sync::Arc;

use crate::{
    NormalizeError,
    box_cox::inverse_box_cox,
    record::{RankTable, TransformKind, TransformRecord},
    sample::Sample,
};

/// Scalar mapping from the normalized scale back to original units
#[derive(Debug, Clone, PartialEq)]
pub enum InverseHandler {
    /// Interpolation over the pooled rank table captured at transform time
    Rank(Arc<RankTable>),
    /// Exact algebraic inverse of the Box-Cox transform
    BoxCox { lambda: f64 },
}

impl InverseHandler {
    /// Which transform this handler undoes.
    #[must_use]
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Rank(_) => TransformKind::Rank,
            Self::BoxCox { .. } => TransformKind::BoxCox,
        }
    }

    /// Maps a normalized value back to original units.
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        match self {
            Self::Rank(table) => table.original_value(value),
            Self::BoxCox { lambda } => inverse_box_cox(value, *lambda),
        }
    }

    /// Borrows the handler as a plain function.
    pub fn as_fn(&self) -> impl Fn(f64) -> f64 + '_ {
        move |value| self.invert(value)
    }
}

/// Builds the inverse mapping of a normalized hierarchy.
///
/// A rank record on the root takes precedence. Otherwise every leaf must
/// carry a Box-Cox record, and all of them must agree on λ; a hierarchy
/// assembled from separately transformed parts is inverted leaf by leaf
/// (each leaf owns its record).
///
/// # Errors
///
/// [`NormalizeError::InvalidState`] when the hierarchy is not the output of
/// a transform, or its leaves carry inconsistent Box-Cox records.
#[expect(clippy::float_cmp)]
pub fn create_inverse_handler(sample: &Sample) -> Result<InverseHandler, NormalizeError> {
    if let Some(TransformRecord::Rank { table, .. }) = sample.record() {
        return Ok(InverseHandler::Rank(Arc::clone(table)));
    }

    let mut lambda = None;
    for leaf in sample.leaves() {
        let Some(leaf_lambda) = leaf.lambda() else {
            return Err(NormalizeError::InvalidState {
                reason: "sample carries no transform record",
            });
        };
        match lambda {
            None => lambda = Some(leaf_lambda),
            Some(previous) if previous != leaf_lambda => {
                return Err(NormalizeError::InvalidState {
                    reason: "leaves carry different Box-Cox parameters",
                });
            }
            Some(_) => {}
        }
    }

    lambda
        .map(|lambda| InverseHandler::BoxCox { lambda })
        .ok_or(NormalizeError::InvalidState {
            reason: "sample carries no transform record",
        })
}
