//! Sparse 1D Distribution.

use super::{DiscreteDistribution, Distribution1D};
use crate::pbrt::*;
use itertools::Itertools;
use std::collections::HashMap;

/// A discrete distribution over `[0, n_all)` expressed as a mixture of a
/// small explicit part covering only the indices with nonzero contribution
/// and a uniform floor over all `n_all` indices. The floor keeps every index
/// reachable so an estimator stays unbiased when the explicit part missed a
/// light entirely.
pub struct SparseDistribution1D {
    /// Distribution over the explicit contributions only.
    inner: Distribution1D,

    /// Maps offsets of `inner` to indices in `[0, n_all)`.
    sample_map: Vec<usize>,

    /// Inverse of `sample_map`.
    back_map: HashMap<usize, usize>,

    /// Probability mass assigned to the uniform part.
    uni_prob: Float,

    /// Probability of sampling one particular index from the uniform part.
    uni_prob_single: Float,

    /// Total number of indices covered.
    n_all: usize,
}

impl SparseDistribution1D {
    /// Create a new `SparseDistribution1D` from a map of per-index
    /// contributions. Zero contributions are dropped; when no contributions
    /// remain the whole probability mass goes to the uniform part.
    ///
    /// * `contrib`  - Contribution by index; indices must be < `n_all`.
    /// * `uni_prob` - Probability mass reserved for the uniform part.
    /// * `n_all`    - Total number of indices covered.
    pub fn from_contrib(contrib: &HashMap<usize, Float>, uni_prob: Float, n_all: usize) -> Self {
        assert!(n_all > 0);

        let mut sample_map = Vec::with_capacity(contrib.len());
        let mut back_map = HashMap::with_capacity(contrib.len());
        let mut func = Vec::with_capacity(contrib.len());

        // Iterate in index order so identical contributions always build
        // identical distributions.
        for (i, (&index, &c)) in contrib
            .iter()
            .filter(|(_, c)| **c > 0.0)
            .sorted_by_key(|(index, _)| **index)
            .enumerate()
        {
            debug_assert!(index < n_all);
            sample_map.push(index);
            func.push(c);
            back_map.insert(index, i);
        }

        let uni_prob = if func.is_empty() { 1.0 } else { uni_prob };

        Self {
            inner: Distribution1D::new(func),
            sample_map,
            back_map,
            uni_prob,
            uni_prob_single: uni_prob / n_all as Float,
            n_all,
        }
    }
}

impl DiscreteDistribution for SparseDistribution1D {
    /// Returns the total number of indices covered.
    fn count(&self) -> usize {
        self.n_all
    }

    /// Sample an index; `[0, 1 - uni_prob)` selects the explicit part and
    /// `[1 - uni_prob, 1)` the uniform part, with `u` renormalized within the
    /// chosen interval.
    ///
    /// * `u` - A uniform random sample in [0, 1).
    fn sample_discrete(&self, u: Float) -> (usize, Float) {
        let sampled_num = if self.uni_prob >= 1.0 || u > 1.0 - self.uni_prob {
            // Sample from the uniform part. The renormalized sample is in
            // [0, 1) but can reach 1.0 through floating point rounding, which
            // would index one past the end.
            let new_u = (u - (1.0 - self.uni_prob)) / self.uni_prob;
            min((new_u * self.n_all as Float) as usize, self.n_all - 1)
        } else {
            // Sample from the explicit part.
            let new_u = u / (1.0 - self.uni_prob);
            let (offset, _pdf, _u_remapped) = self.inner.sample_discrete(new_u);
            self.sample_map[offset]
        };
        (sampled_num, self.discrete_pdf(sampled_num))
    }

    /// Return the probability of sampling a given index: the uniform share
    /// plus, for explicitly represented indices, the weighted explicit share.
    ///
    /// * `index` - Sample index.
    fn discrete_pdf(&self, index: usize) -> Float {
        assert!(index < self.n_all);
        let mut pdf = self.uni_prob_single;
        if let Some(&offset) = self.back_map.get(&index) {
            pdf += self.inner.discrete_pdf(offset) * (1.0 - self.uni_prob);
        }
        pdf
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
