//! Power Light Distribution.

use super::LightDistribution;
use crate::geometry::*;
use crate::pbrt::Float;
use crate::sampling::*;
use crate::scene::*;
use std::sync::Arc;

/// Returns a distribution over the scene's lights with sampling probability
/// proportional to each light's total emitted power, or `None` for a scene
/// without lights. Shared by the `power` strategy and the photon strategies'
/// `photonsampling=power` mode.
///
/// * `scene` - The scene.
pub fn compute_light_power_distribution(scene: &Scene) -> Option<Distribution1D> {
    if scene.lights.is_empty() {
        return None;
    }
    let light_power: Vec<Float> = scene.lights.iter().map(|l| l.power().y()).collect();
    Some(Distribution1D::new(light_power))
}

/// Weights every light by its total emitted power, wherever the query point
/// lies. A good fit when the brightest lights dominate the whole scene; when
/// different lights matter in different regions, power alone over- or
/// under-samples them and the spatially-varying strategies are the better
/// choice.
pub struct PowerLightDistribution {
    /// The shared distribution, absent only for a lightless scene.
    distrib: Option<Arc<Distribution1D>>,
}

impl PowerLightDistribution {
    /// Create a new instance of `PowerLightDistribution`.
    ///
    /// * `scene` - The scene.
    pub fn new(scene: &Scene) -> Self {
        Self {
            distrib: compute_light_power_distribution(scene).map(Arc::new),
        }
    }
}

impl LightDistribution for PowerLightDistribution {
    /// Returns the shared power-weighted distribution; the query point is
    /// ignored.
    fn lookup(&self, _p: &Point3f, _n: &Normal3f) -> Option<Arc<dyn DiscreteDistribution>> {
        let distrib = self.distrib.as_ref()?;
        Some(Arc::clone(distrib) as Arc<dyn DiscreteDistribution>)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
