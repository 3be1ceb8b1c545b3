//! Photon K-Means CDF Kd-Tree Light Distribution.

use super::{
    photon_sampling_distribution, shoot_photons, LightDistribution, Photon, MIN_DIST_SQUARED,
};
use crate::geometry::*;
use crate::paramset::*;
use crate::pbrt::*;
use crate::sampling::*;
use crate::scene::*;
use crate::spatial::{kmeans_lloyd, PointKdTree};
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of centroids per k-d tree leaf.
const MAX_LEAF_SIZE: usize = 10;

/// A spatially-varying light distribution that clusters the photon batch
/// with k-means at construction and precomputes one sparse distribution per
/// cluster. A lookup gathers the centroids nearest to the query point and
/// interpolates their distributions with inverse-squared-distance weights.
pub struct PhotonMlCdfKdTreeLightDistribution {
    kn_cdf: usize,
    knn: bool,
    default_distrib: Arc<Distribution1D>,
    clusters: Vec<Arc<dyn DiscreteDistribution>>,
    kd_tree: PointKdTree,
}

impl PhotonMlCdfKdTreeLightDistribution {
    /// Create a new instance of `PhotonMlCdfKdTreeLightDistribution` by
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

    /// Create a new instance from an already traced photon batch; photons
    /// that missed the scene are left out of the clustering.
    ///
    /// * `photons`  - The traced photons.
    /// * `n_lights` - Number of lights in the scene.
    /// * `params`   - The strategy parameters.
    pub(crate) fn from_photons(photons: &[Photon], n_lights: usize, params: &ParamSet) -> Self {
        let cdf_count = params.find_one_int("cdfCount", 264) as usize;
        let min_contribution_scale = params.find_one_float("minContributionScale", 0.001);

        let mut positions = Vec::new();
        let mut hits = Vec::new();
        for photon in photons {
            if let Some(light_num) = photon.light_num {
                positions.push(photon.p);
                hits.push((photon.beta, light_num));
            }
        }

        // Cluster the photon positions and add each photon's throughput to
        // its cluster's per-light contributions.
        let (centroids, labels) = kmeans_lloyd(&positions, cdf_count);
        let mut light_contributions: Vec<HashMap<usize, Float>> =
            vec![HashMap::new(); centroids.len()];
        for ((beta, light_num), label) in hits.iter().zip(labels.iter()) {
            *light_contributions[*label].entry(*light_num).or_insert(0.0) += beta;
        }
        info!(
            "PhotonMlCdfKdTreeLightDistribution: {} clusters from {} photons",
            centroids.len(),
            positions.len()
        );

        let clusters = light_contributions
            .iter()
            .map(|light_contrib| {
                Arc::new(SparseDistribution1D::from_contrib(
                    light_contrib,
                    min_contribution_scale,
                    n_lights,
                )) as Arc<dyn DiscreteDistribution>
            })
            .collect();

        Self {
            kn_cdf: params.find_one_int("knCdf", 16) as usize,
            knn: params.find_one_bool("knn", true),
            default_distrib: Arc::new(Distribution1D::new(vec![1.0; n_lights])),
            clusters,
            kd_tree: PointKdTree::new(centroids, MAX_LEAF_SIZE),
        }
    }
}

impl LightDistribution for PhotonMlCdfKdTreeLightDistribution {
    /// Given a point |p| in space, this method returns a (hopefully effective)
    /// sampling distribution for light sources at that point. The returned
    /// distribution is synthesized per query.
    fn lookup(&self, p: &Point3f, _n: &Normal3f) -> Option<Arc<dyn DiscreteDistribution>> {
        assert!(
            self.knn,
            "radius search is not implemented for the mlcdftree strategy"
        );

        if self.kd_tree.is_empty() {
            // No photon survived to form a cluster.
            return Some(Arc::clone(&self.default_distrib) as Arc<dyn DiscreteDistribution>);
        }

        // Perform a k-nearest-neighbour search over the cluster centroids
        // and interpolate their distributions with inverse squared distance
        // weights.
        let matches = self.kd_tree.knn(p, self.kn_cdf);
        let mut distributions = Vec::with_capacity(matches.len());
        let mut influence: Vec<Float> = Vec::with_capacity(matches.len());
        for (index, d2) in matches {
            distributions.push(Arc::clone(&self.clusters[index]));
            influence.push(1.0 / max(MIN_DIST_SQUARED, d2));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn params(cdf_count: Int, kn_cdf: Int) -> ParamSet {
        let mut params = ParamSet::new();
        params.add_int("cdfCount", &[cdf_count]);
        params.add_int("knCdf", &[kn_cdf]);
        params
    }

    fn photon(p: Point3f, beta: Float, light_num: usize) -> Photon {
        Photon {
            p,
            beta,
            light_num: Some(light_num),
        }
    }

    fn two_blob_cloud() -> Vec<Photon> {
        let mut photons = Vec::new();
        for i in 0..32 {
            let f = i as Float * 0.005;
            photons.push(photon(Point3f::new(f, 0.0, 0.0), 1.0, 0));
            photons.push(photon(Point3f::new(5.0 + f, 0.0, 0.0), 1.0, 1));
        }
        photons
    }

    #[test]
    fn queries_near_a_cluster_favor_its_light() {
        let dist = PhotonMlCdfKdTreeLightDistribution::from_photons(
            &two_blob_cloud(),
            2,
            &params(2, 1),
        );
        let d = dist
            .lookup(&Point3f::new(0.05, 0.0, 0.0), &Normal3f::ZERO)
            .unwrap();
        assert!(d.discrete_pdf(0) > 0.99);

        let d = dist
            .lookup(&Point3f::new(5.05, 0.0, 0.0), &Normal3f::ZERO)
            .unwrap();
        assert!(d.discrete_pdf(1) > 0.99);
    }

    #[test]
    fn interpolation_mixes_nearby_clusters_by_inverse_squared_distance() {
        let dist = PhotonMlCdfKdTreeLightDistribution::from_photons(
            &two_blob_cloud(),
            2,
            &params(2, 2),
        );
        // Closer to the first blob: light 0 dominates but light 1 keeps the
        // far cluster's share.
        let d = dist
            .lookup(&Point3f::new(1.0, 0.0, 0.0), &Normal3f::ZERO)
            .unwrap();
        assert!(d.discrete_pdf(0) > d.discrete_pdf(1));
        assert!(d.discrete_pdf(1) > 0.0);

        // The midpoint mixes both clusters evenly.
        let d = dist
            .lookup(&Point3f::new(2.54, 0.0, 0.0), &Normal3f::ZERO)
            .unwrap();
        assert!((d.discrete_pdf(0) - d.discrete_pdf(1)).abs() < 0.1);
    }

    #[test]
    #[should_panic(expected = "radius search is not implemented")]
    fn radius_mode_is_a_hard_error() {
        let mut p = params(2, 2);
        p.add_bool("knn", &[false]);
        let dist =
            PhotonMlCdfKdTreeLightDistribution::from_photons(&two_blob_cloud(), 2, &p);
        let _ = dist.lookup(&Point3f::ZERO, &Normal3f::ZERO);
    }

    #[test]
    fn all_photons_missing_falls_back_to_uniform() {
        let dist = PhotonMlCdfKdTreeLightDistribution::from_photons(
            &[Photon::default(), Photon::default()],
            3,
            &params(4, 2),
        );
        let d = dist
            .lookup(&Point3f::new(0.5, 0.5, 0.5), &Normal3f::ZERO)
            .unwrap();
        for i in 0..3 {
            assert!((d.discrete_pdf(i) - 1.0 / 3.0).abs() < 1e-5);
        }
    }
}
