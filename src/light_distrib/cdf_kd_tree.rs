//! Photon Leaf-Cluster CDF Kd-Tree Light Distribution.

use super::{
    kernel_values, photon_sampling_distribution, shoot_photons, InterpolationKernel,
    LightDistribution, Photon,
};
use crate::geometry::*;
use crate::paramset::*;
use crate::pbrt::*;
use crate::sampling::*;
use crate::scene::*;
use crate::spatial::PointKdTree;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of centroids per centroid k-d tree leaf.
const MAX_LEAF_SIZE: usize = 10;

/// A spatially-varying light distribution that clusters the photon batch by
/// the leaves of a k-d tree whose leaf size is chosen so every leaf
/// approximates one of `cdfCount` clusters. Each sufficiently populated leaf
/// becomes a centroid with a precomputed sparse distribution; a lookup
/// gathers the nearest centroids and interpolates their distributions with
/// photon-count-weighted distance kernels.
pub struct PhotonCdfKdTreeLightDistribution {
    kn_cdf: usize,
    knn: bool,
    interpolation: InterpolationKernel,
    int_smooth: Float,
    default_distrib: Arc<Distribution1D>,
    clusters: Vec<Arc<dyn DiscreteDistribution>>,
    weights: Vec<Float>,
    kd_tree: PointKdTree,
}

impl PhotonCdfKdTreeLightDistribution {
    /// Create a new instance of `PhotonCdfKdTreeLightDistribution` by
    /// shooting `photonCount` photons into the scene.
    ///
    /// * `params` - The strategy parameters.
    /// * `scene`  - The scene.
    pub fn new(params: &ParamSet, scene: &Scene) -> Self {
        let photon_count = params.find_one_int("photonCount", 100000) as usize;
        let photon_distrib = photon_sampling_distribution(params, scene);
        let photons = shoot_photons(scene, &photon_distrib, photon_count);
        Self::from_photons(&photons, scene.lights.len(), params)
    }

    /// Create a new instance from an already traced photon batch. The whole
    /// batch is indexed, misses included; misses are skipped when the leaves
    /// are aggregated.
    ///
    /// * `photons`  - The traced photons.
    /// * `n_lights` - Number of lights in the scene.
    /// * `params`   - The strategy parameters.
    pub(crate) fn from_photons(photons: &[Photon], n_lights: usize, params: &ParamSet) -> Self {
        let cdf_count = params.find_one_int("cdfCount", 8) as usize;
        let photon_threshold = params.find_one_int("photonThreshold", 15) as usize;
        let min_contribution_scale = params.find_one_float("minContributionScale", 0.001);

        let interpolation = InterpolationKernel::from(
            params
                .find_one_string("interpolation", String::from("shepard"))
                .as_str(),
        );
        let interpolation = if interpolation == InterpolationKernel::None {
            warn!("The cdftree strategy has no unweighted interpolation. Using 'shepard'.");
            InterpolationKernel::Shepard
        } else {
            interpolation
        };

        // Misses keep their slot under sentinel coordinates so leaf sizing
        // stays tied to the shot count; they sort into far-away leaves and
        // never enter a cluster.
        let positions: Vec<Point3f> = photons
            .iter()
            .map(|photon| {
                if photon.light_num.is_some() {
                    photon.p
                } else {
                    Point3f::new(Float::MAX, Float::MAX, Float::MAX)
                }
            })
            .collect();

        // Build a k-d tree whose leaves hold roughly one cdfCount'th of the
        // batch each, so the leaves partition the photons into spatially
        // compact clusters.
        let max_leaf_size = max(1, photons.len() / max(1, cdf_count));
        let photon_tree = PointKdTree::new(positions, max_leaf_size);

        // Aggregate each sufficiently populated leaf into a centroid, a
        // sampling distribution and a photon-count weight. Only photons that
        // hit a surface count.
        let leaves = photon_tree.enumerate_leaves();
        let clusters_data: Vec<(Point3f, Arc<dyn DiscreteDistribution>, Float)> = leaves
            .par_iter()
            .filter_map(|leaf| {
                let mut centroid = Point3f::ZERO;
                let mut light_contrib: HashMap<usize, Float> = HashMap::new();
                let mut num_photons = 0;
                for &photon_index in leaf {
                    let photon = &photons[photon_index];
                    if let Some(light_num) = photon.light_num {
                        centroid += photon.p;
                        *light_contrib.entry(light_num).or_insert(0.0) += photon.beta;
                        num_photons += 1;
                    }
                }
                if num_photons <= photon_threshold {
                    return None;
                }
                let centroid = centroid / num_photons as Float;
                let distr = Arc::new(SparseDistribution1D::from_contrib(
                    &light_contrib,
                    min_contribution_scale,
                    n_lights,
                )) as Arc<dyn DiscreteDistribution>;
                Some((centroid, distr, num_photons as Float))
            })
            .collect();
        info!(
            "PhotonCdfKdTreeLightDistribution: {} clusters from {} leaves",
            clusters_data.len(),
            leaves.len()
        );

        let mut centroids = Vec::with_capacity(clusters_data.len());
        let mut clusters = Vec::with_capacity(clusters_data.len());
        let mut weights = Vec::with_capacity(clusters_data.len());
        for (centroid, distr, weight) in clusters_data {
            centroids.push(centroid);
            clusters.push(distr);
            weights.push(weight);
        }

        Self {
            kn_cdf: params.find_one_int("knCdf", 16) as usize,
            knn: params.find_one_bool("knn", true),
            interpolation,
            int_smooth: params.find_one_float("intSmooth", 1.0),
            default_distrib: Arc::new(Distribution1D::new(vec![1.0; n_lights])),
            clusters,
            weights,
            kd_tree: PointKdTree::new(centroids, MAX_LEAF_SIZE),
        }
    }
}

impl LightDistribution for PhotonCdfKdTreeLightDistribution {
    /// Given a point |p| in space, this method returns a (hopefully effective)
    /// sampling distribution for light sources at that point. The returned
    /// distribution is synthesized per query.
    fn lookup(&self, p: &Point3f, _n: &Normal3f) -> Option<Arc<dyn DiscreteDistribution>> {
        assert!(
            self.knn,
            "radius search is not implemented for the cdftree strategy"
        );

        if self.kd_tree.is_empty() {
            // No leaf exceeded the photon threshold.
            return Some(Arc::clone(&self.default_distrib) as Arc<dyn DiscreteDistribution>);
        }

        // Perform a k-nearest-neighbour search over the cluster centroids
        // and interpolate their distributions; each centroid's kernel weight
        // is scaled by the photon count of its cluster.
        let matches = self.kd_tree.knn(p, self.kn_cdf);
        let kernels = kernel_values(self.interpolation, &matches, self.int_smooth);
        let mut distributions = Vec::with_capacity(matches.len());
        let mut influence = Vec::with_capacity(matches.len());
        for ((index, _d2), k) in matches.iter().zip(kernels.into_iter()) {
            distributions.push(Arc::clone(&self.clusters[*index]));
            influence.push(self.weights[*index] * k);
        }

        Some(Arc::new(InterpolatedDistribution1D::new(
            influence,
            distributions,
        )))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
