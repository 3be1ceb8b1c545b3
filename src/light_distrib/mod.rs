//! Light Distribution.

mod cdf_kd_tree;
mod ml_cdf_kd_tree;
mod photon;
mod photon_kd_tree;
mod photon_voxel;
mod power;
mod spatial;
mod uniform;
mod voxel_grid;

pub use cdf_kd_tree::*;
pub use ml_cdf_kd_tree::*;
pub use photon::*;
pub use photon_kd_tree::*;
pub use photon_voxel::*;
pub use power::*;
pub use spatial::*;
pub use uniform::*;
pub(crate) use voxel_grid::*;

use crate::geometry::*;
use crate::paramset::*;
use crate::sampling::*;
use crate::scene::*;
use std::sync::Arc;

/// Light sampling strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightSampleStrategy {
    /// Sample all light sources uniformly.
    Uniform,

    /// Samples light sources according to their emitted power.
    Power,

    /// Compute light contributions in regions of the scene and sample from a
    /// related distribution.
    Spatial,

    /// Accumulate photons into a voxel grid and sample from per-voxel
    /// contribution distributions.
    PhotonVoxel,

    /// Gather nearby photons from a k-d tree at every lookup.
    PhotonTree,

    /// Interpolate per-cluster distributions of k-means clustered photons.
    MlCdfTree,

    /// Interpolate per-cell distributions of k-d leaf clustered photons.
    CdfTree,
}

impl From<&str> for LightSampleStrategy {
    /// Returns a `LightSampleStrategy` given a string name.
    fn from(name: &str) -> Self {
        match name {
            "uniform" => Self::Uniform,
            "power" => Self::Power,
            "spatial" => Self::Spatial,
            "photonvoxel" => Self::PhotonVoxel,
            "photontree" => Self::PhotonTree,
            "mlcdftree" => Self::MlCdfTree,
            "cdftree" => Self::CdfTree,
            _ => {
                error!(
                    "Light sample distribution type '{}' unknown. Using 'spatial'.",
                    name
                );
                Self::Spatial
            }
        }
    }
}

/// Interface of light distribution implementations that provide probability
/// distributions for sampling light sources at a given point in space.
pub trait LightDistribution: Send + Sync {
    /// Given a point |p| in space, this method returns a (hopefully effective)
    /// sampling distribution for light sources at that point.
    ///
    /// Strategies either share a cached distribution or synthesize one for
    /// this query; the caller releases the latter by dropping the returned
    /// `Arc` after sampling.
    ///
    /// * `p` - The point.
    /// * `n` - Surface normal at the point.
    fn lookup(&self, p: &Point3f, n: &Normal3f) -> Option<Arc<dyn DiscreteDistribution>>;
}

/// Atomic reference counted `LightDistribution`.
pub type ArcLightDistribution = Arc<dyn LightDistribution + Send + Sync>;

/// Returns a smart pointer to a new `LightDistribution` implementation chosen
/// by the `lightsamplestrategy` parameter.
///
/// * `params` - The strategy parameters.
/// * `scene`  - The scene.
pub fn create_light_sample_distribution(params: &ParamSet, scene: &Scene) -> ArcLightDistribution {
    let name = params.find_one_string("lightsamplestrategy", String::from("spatial"));
    let strategy = if scene.lights.len() == 1 {
        LightSampleStrategy::Uniform
    } else {
        LightSampleStrategy::from(name.as_str())
    };
    match strategy {
        LightSampleStrategy::Uniform => Arc::new(UniformLightDistribution::new(scene)),
        LightSampleStrategy::Power => Arc::new(PowerLightDistribution::new(scene)),
        LightSampleStrategy::Spatial => Arc::new(SpatialLightDistribution::new(scene, 64)),
        LightSampleStrategy::PhotonVoxel => {
            Arc::new(PhotonVoxelLightDistribution::new(params, scene))
        }
        LightSampleStrategy::PhotonTree => {
            Arc::new(PhotonKdTreeLightDistribution::new(params, scene))
        }
        LightSampleStrategy::MlCdfTree => {
            Arc::new(PhotonMlCdfKdTreeLightDistribution::new(params, scene))
        }
        LightSampleStrategy::CdfTree => {
            Arc::new(PhotonCdfKdTreeLightDistribution::new(params, scene))
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn unknown_strategy_name_falls_back_to_spatial() {
        assert_eq!(
            LightSampleStrategy::from("bogus"),
            LightSampleStrategy::Spatial
        );
    }

    #[test]
    fn strategy_names_resolve() {
        for (name, strategy) in [
            ("uniform", LightSampleStrategy::Uniform),
            ("power", LightSampleStrategy::Power),
            ("spatial", LightSampleStrategy::Spatial),
            ("photonvoxel", LightSampleStrategy::PhotonVoxel),
            ("photontree", LightSampleStrategy::PhotonTree),
            ("mlcdftree", LightSampleStrategy::MlCdfTree),
            ("cdftree", LightSampleStrategy::CdfTree),
        ] {
            assert_eq!(LightSampleStrategy::from(name), strategy);
        }
    }

    #[test]
    fn single_light_scene_forces_uniform() {
        let scene = single_light_scene();
        let mut params = ParamSet::new();
        params.add_string("lightsamplestrategy", &[String::from("power")]);
        let distribution = create_light_sample_distribution(&params, &scene);

        // A single-light scene downgrades every strategy to uniform; the
        // one light is sampled with probability one everywhere.
        let d = distribution
            .lookup(&Point3f::new(0.5, 0.5, 0.5), &Normal3f::ZERO)
            .unwrap();
        assert_eq!(d.count(), 1);
        assert!((d.discrete_pdf(0) - 1.0).abs() < 1e-6);
    }
}
