//! Hierarchical normalization engine for the Schicksal statistics toolkit.
//!
//! This crate rewrites nested collections of numeric samples (a single
//! experiment, an experiment of experiments, or a set of experiment sets)
//! through a normalizing transform while keeping the nesting shape intact.
//! Statistics are always pooled over the whole hierarchy passed in, so values
//! from different groups stay comparable after the transform.
//!
//! # Overview
//!
//! 1. **Build a hierarchy** ([`sample::Sample`]): leaves of observations nested
//!    in up to two levels of nodes
//! 2. **Normalize** it with [`rank::rank_normalize`] (fractional ranks, mid-rank
//!    ties) or [`box_cox::box_cox_normalize`] (power transform with λ estimated
//!    by profile likelihood)
//! 3. **Invert** results back into original units with
//!    [`inverse::create_inverse_handler`]
//!
//! Each produced hierarchy carries a [`record::TransformRecord`] describing the
//! transform. Records make explicit-parameter transforms idempotent (the input
//! is returned borrowed) and hold what the inverse mapping needs.
//!
//! # Modules
//!
//! - [`sample`]: The recursive sample hierarchy
//! - [`record`]: Transform metadata and the captured rank table
//! - [`rank`]: Rank normalization
//! - [`box_cox`]: Box-Cox λ estimation and transform
//! - [`inverse`]: Inverse mappings
//! - [`delta`]: Shifting samples into the Box-Cox domain
//!
//! # Examples
//!
//! ```
//! use schicksal_normalize::{
//!     box_cox::box_cox_normalize,
//!     inverse::create_inverse_handler,
//!     sample::{Leaf, Node, Sample},
//! };
//!
//! let sample = Sample::from(Node::new(vec![
//!     Leaf::new(vec![9.0, 4.0, 6.0]).into(),
//!     Leaf::new(vec![10.0, 5.0, 7.0]).into(),
//! ])?);
//!
//! let transformed = box_cox_normalize(&sample)?;
//! assert!(sample.has_same_shape(&transformed));
//!
//! let inverse = create_inverse_handler(&transformed)?;
//! let restored = inverse.invert(transformed.child(0)?.value(0)?);
//! assert!((restored - 9.0).abs() < 1e-9);
//! # Ok::<(), schicksal_normalize::NormalizeError>(())
//! ```

pub use self::error::NormalizeError;

pub mod box_cox;
pub mod delta;
mod error;
pub mod inverse;
pub mod rank;
pub mod record;
pub mod sample;
