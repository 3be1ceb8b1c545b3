//! Interpolated 1D Distribution.

use super::{DiscreteDistribution, Distribution1D};
use crate::pbrt::*;
use crate::rng::ONE_MINUS_EPSILON;
use std::sync::Arc;

/// Interpolates several given distributions without copying them. The
/// construction of this object takes O(k) and a lookup O(k + log n) with k
/// being the number of interpolated distributions and n the number of
/// elements within them. Copying the interpolated weights into one flat
/// distribution would need O(k * n) construction time instead.
///
/// Note that the interpolated distributions must all cover the same number
/// of elements in the same order.
pub struct InterpolatedDistribution1D {
    /// Distribution over the k interpolated distributions.
    outer: Distribution1D,

    /// The interpolated distributions.
    distributions: Vec<Arc<dyn DiscreteDistribution>>,
}

impl InterpolatedDistribution1D {
    /// Create a new `InterpolatedDistribution1D` from interpolation weights
    /// and the distributions they weight.
    ///
    /// * `f`             - Interpolation weight per distribution.
    /// * `distributions` - The distributions to interpolate.
    pub fn new(f: Vec<Float>, distributions: Vec<Arc<dyn DiscreteDistribution>>) -> Self {
        assert!(!distributions.is_empty());
        assert_eq!(f.len(), distributions.len());
        debug_assert!(distributions
            .windows(2)
            .all(|w| w[0].count() == w[1].count()));

        Self {
            outer: Distribution1D::new(f),
            distributions,
        }
    }
}

impl DiscreteDistribution for InterpolatedDistribution1D {
    /// Returns the number of elements covered by the interpolated
    /// distributions.
    fn count(&self) -> usize {
        self.distributions[0].count()
    }

    /// Sample an index by first picking a distribution through the outer CDF
    /// and then sampling within it with the renormalized scalar.
    ///
    /// * `u` - A uniform random sample in [0, 1).
    fn sample_discrete(&self, u: Float) -> (usize, Float) {
        // `offset` is the sampled distribution within which we further want
        // to sample.
        let cdf = &self.outer.cdf;
        let offset = find_interval(cdf.len(), |index| cdf[index] <= u);

        // `u_sub` is a new u in [0,1) used to sample within the selected
        // distribution. Can reach 1.0 in rare cases due to floating point
        // precision.
        let mut u_sub = (u - cdf[offset]) / (cdf[offset + 1] - cdf[offset]);
        if u_sub >= 1.0 {
            u_sub = ONE_MINUS_EPSILON;
        }

        let (sampled_num, _pdf) = self.distributions[offset].sample_discrete(u_sub);

        // Add up all probabilities that this sample was taken.
        (sampled_num, self.discrete_pdf(sampled_num))
    }

    /// Return the marginal probability of sampling an index: each
    /// distribution's PDF weighted by the outer probability of selecting it.
    ///
    /// * `index` - Sample index.
    fn discrete_pdf(&self, index: usize) -> Float {
        let cdf = &self.outer.cdf;
        self.distributions
            .iter()
            .enumerate()
            .map(|(i, d)| d.discrete_pdf(index) * (cdf[i + 1] - cdf[i]))
            .sum()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::SparseDistribution1D;
    use std::collections::HashMap;

    fn distribution(weights: Vec<Float>) -> Arc<dyn DiscreteDistribution> {
        Arc::new(Distribution1D::new(weights))
    }

    #[test]
    fn identical_peers_reproduce_their_pdf() {
        let d = distribution(vec![1.0, 3.0, 2.0, 0.5]);
        let interp = InterpolatedDistribution1D::new(
            vec![0.3, 1.2, 0.5],
            vec![Arc::clone(&d), Arc::clone(&d), Arc::clone(&d)],
        );
        for i in 0..d.count() {
            assert!((interp.discrete_pdf(i) - d.discrete_pdf(i)).abs() < 1e-5);
        }
    }

    #[test]
    fn pdf_sums_to_one() {
        let a = distribution(vec![1.0, 0.0, 2.0]);
        let b = distribution(vec![0.0, 5.0, 1.0]);
        let interp = InterpolatedDistribution1D::new(vec![2.0, 1.0], vec![a, b]);
        let total: Float = (0..interp.count()).map(|i| interp.discrete_pdf(i)).sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn marginalizes_outer_weights() {
        let a = distribution(vec![1.0, 0.0]);
        let b = distribution(vec![0.0, 1.0]);
        let interp = InterpolatedDistribution1D::new(vec![3.0, 1.0], vec![a, b]);
        assert!((interp.discrete_pdf(0) - 0.75).abs() < 1e-5);
        assert!((interp.discrete_pdf(1) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn sampling_splits_on_outer_cdf() {
        let a = distribution(vec![1.0, 0.0]);
        let b = distribution(vec![0.0, 1.0]);
        let interp = InterpolatedDistribution1D::new(vec![1.0, 1.0], vec![a, b]);
        let (index, _pdf) = interp.sample_discrete(0.25);
        assert_eq!(index, 0);
        let (index, _pdf) = interp.sample_discrete(0.75);
        assert_eq!(index, 1);
    }

    #[test]
    fn zero_outer_weights_fall_back_to_uniform_mixture() {
        let a = distribution(vec![1.0, 0.0]);
        let b = distribution(vec![0.0, 1.0]);
        let interp = InterpolatedDistribution1D::new(vec![0.0, 0.0], vec![a, b]);
        assert!((interp.discrete_pdf(0) - 0.5).abs() < 1e-5);
        assert!((interp.discrete_pdf(1) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn interpolates_sparse_peers_over_the_full_index_range() {
        let mut c0 = HashMap::new();
        c0.insert(0_usize, 1.0 as Float);
        let mut c1 = HashMap::new();
        c1.insert(3_usize, 1.0 as Float);
        let a: Arc<dyn DiscreteDistribution> =
            Arc::new(SparseDistribution1D::from_contrib(&c0, 0.0, 4));
        let b: Arc<dyn DiscreteDistribution> =
            Arc::new(SparseDistribution1D::from_contrib(&c1, 0.0, 4));
        let interp = InterpolatedDistribution1D::new(vec![1.0, 1.0], vec![a, b]);
        assert_eq!(interp.count(), 4);
        assert!((interp.discrete_pdf(0) - 0.5).abs() < 1e-5);
        assert!((interp.discrete_pdf(3) - 0.5).abs() < 1e-5);
        assert!(interp.discrete_pdf(1).abs() < 1e-6);
    }
}
