//! Numeric building blocks for the Schicksal normalization engine.
//!
//! This crate knows nothing about sample hierarchies. It provides:
//!
//! - **Descriptive statistics**: count, extremes, mean, population variance
//! - **Ranking**: fractional (mid-rank) ranks of a sorted sequence with a caller-defined tie rule
//! - **Optimization**: Brent's bounded scalar minimization
//! - **Interpolation**: piecewise-linear lookup tables with fixed-slope extrapolation
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing samples
//! - [`ranking`]: Fractional ranks with tie averaging
//! - [`optimize`]: Derivative-free bounded minimization
//! - [`interpolate`]: Piecewise-linear tables
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use schicksal_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Ranking with ties
//!
//! ```
//! use schicksal_stats::ranking::fractional_ranks_sorted;
//!
//! let ranks = fractional_ranks_sorted(&[1.0, 2.0, 2.0, 3.0], |a, b| a == b);
//! assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
//! ```
//!
//! ## Minimizing on an interval
//!
//! ```
//! use schicksal_stats::optimize::minimize_bounded;
//!
//! let min = minimize_bounded(|x| (x - 0.5).powi(2), -10.0, 10.0, 1e-8);
//! assert!((min.x - 0.5).abs() < 1e-6);
//! ```

pub mod descriptive;
pub mod interpolate;
pub mod optimize;
pub mod ranking;
