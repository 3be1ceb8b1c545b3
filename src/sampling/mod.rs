//! Sampling

mod common;
mod distribution_1d;
mod interpolated_distribution_1d;
mod sparse_distribution_1d;

// Re-export
pub use common::*;
pub use distribution_1d::*;
pub use interpolated_distribution_1d::*;
pub use sparse_distribution_1d::*;

use crate::pbrt::Float;

/// Interface of distributions that support discrete sampling over a fixed
/// range of indices `[0, count)`. Light distributions hand these out so an
/// integrator can sample a light index with a single uniform scalar.
pub trait DiscreteDistribution: Send + Sync {
    /// Returns the number of indices the distribution covers.
    fn count(&self) -> usize;

    /// Sample an index from the discrete distribution; returns the index and
    /// the probability of sampling it.
    ///
    /// * `u` - A uniform random sample in [0, 1).
    fn sample_discrete(&self, u: Float) -> (usize, Float);

    /// Return the probability of sampling a given index from the discrete
    /// distribution.
    ///
    /// * `index` - Sample index.
    fn discrete_pdf(&self, index: usize) -> Float;
}
