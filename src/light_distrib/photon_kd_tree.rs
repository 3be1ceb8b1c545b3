//! Photon Kd-Tree Light Distribution.

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
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of photons per k-d tree leaf.
const MAX_LEAF_SIZE: usize = 10;

/// Per-photon payload stored alongside the k-d tree; positions live in the
/// tree itself.
struct StoredPhoton {
    beta: Float,
    light_num: usize,
}

/// A spatially-varying light distribution that gathers the photons nearest
/// to the query point from a k-d tree built at construction and synthesizes
/// a sparse distribution from their per-light throughput, weighted by a
/// distance kernel. Gathering uses either the k nearest photons or all
/// photons within a fixed radius.
pub struct PhotonKdTreeLightDistribution {
    n_lights: usize,
    min_contribution_scale: Float,
    nearest_neighbours: usize,
    photon_radius: Float,
    interpolation: InterpolationKernel,
    int_smooth: Float,
    knn: bool,
    photons: Vec<StoredPhoton>,
    kd_tree: PointKdTree,
}

impl PhotonKdTreeLightDistribution {
    /// Create a new instance of `PhotonKdTreeLightDistribution` by shooting
    /// `photonCount` photons into the scene.
    ///
    /// * `params` - The strategy parameters.
    /// * `scene`  - The scene.
    pub fn new(params: &ParamSet, scene: &Scene) -> Self {
        let photon_count = params.find_one_int("photonCount", 100000) as usize;
        let photon_distrib = photon_sampling_distribution(params, scene);
        let photons = shoot_photons(scene, &photon_distrib, photon_count);
        Self::from_photons(&photons, scene.lights.len(), params)
    }

    /// Create a new instance from an already traced photon batch; photons
    /// that missed the scene are left out of the index.
    ///
    /// * `photons`  - The traced photons.
    /// * `n_lights` - Number of lights in the scene.
    /// * `params`   - The strategy parameters.
    pub(crate) fn from_photons(photons: &[Photon], n_lights: usize, params: &ParamSet) -> Self {
        let mut positions = Vec::new();
        let mut stored = Vec::new();
        for photon in photons {
            if let Some(light_num) = photon.light_num {
                positions.push(photon.p);
                stored.push(StoredPhoton {
                    beta: photon.beta,
                    light_num,
                });
            }
        }
        info!(
            "PhotonKdTreeLightDistribution: indexing {} of {} photons",
            stored.len(),
            photons.len()
        );

        Self {
            n_lights,
            min_contribution_scale: params.find_one_float("minContributionScale", 0.001),
            nearest_neighbours: params.find_one_int("nearestNeighbours", 50) as usize,
            photon_radius: params.find_one_float("photonRadius", 0.1),
            interpolation: InterpolationKernel::from(
                params
                    .find_one_string("interpolation", String::from("shepard"))
                    .as_str(),
            ),
            int_smooth: params.find_one_float("intSmooth", 1.0),
            knn: params.find_one_bool("knn", true),
            photons: stored,
            kd_tree: PointKdTree::new(positions, MAX_LEAF_SIZE),
        }
    }
}

impl LightDistribution for PhotonKdTreeLightDistribution {
    /// Given a point |p| in space, this method returns a (hopefully effective)
    /// sampling distribution for light sources at that point. The returned
    /// distribution is synthesized per query.
    fn lookup(&self, p: &Point3f, _n: &Normal3f) -> Option<Arc<dyn DiscreteDistribution>> {
        let mut light_contrib: HashMap<usize, Float> = HashMap::new();

        if self.knn {
            // Perform a k-nearest-neighbour search and weight each photon's
            // throughput by the interpolation kernel. The Gaussian kernels
            // replace the throughput entirely.
            let matches = self.kd_tree.knn(p, self.nearest_neighbours);
            let use_beta = matches!(
                self.interpolation,
                InterpolationKernel::Shepard | InterpolationKernel::None
            );
            let kernels = kernel_values(self.interpolation, &matches, self.int_smooth);
            for ((index, _d2), k) in matches.iter().zip(kernels.into_iter()) {
                let photon = &self.photons[*index];
                let contribution = if use_beta { photon.beta * k } else { k };
                *light_contrib.entry(photon.light_num).or_insert(0.0) += contribution;
            }
        } else {
            // Perform a search within the photon radius; radius gathers
            // accumulate the raw throughput.
            for (index, _d2) in self.kd_tree.radius(p, self.photon_radius) {
                let photon = &self.photons[index];
                *light_contrib.entry(photon.light_num).or_insert(0.0) += photon.beta;
            }
        }

        Some(Arc::new(SparseDistribution1D::from_contrib(
            &light_contrib,
            self.min_contribution_scale,
            self.n_lights,
        )))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
