//! Uniform Light Distribution.

use super::LightDistribution;
use crate::geometry::*;
use crate::sampling::*;
use crate::scene::*;
use std::sync::Arc;

/// The simplest strategy: every lookup shares one uniform distribution over
/// the scene's lights, wherever the query point lies. Adequate for a handful
/// of lights, and what the factory downgrades every request to when the
/// scene has exactly one light; with many lights of varying reach the
/// spatially-varying strategies do far better.
pub struct UniformLightDistribution {
    /// The shared distribution; equal weight per light.
    distrib: Arc<Distribution1D>,
}

impl UniformLightDistribution {
    /// Create a new instance of `UniformLightDistribution`.
    ///
    /// * `scene` - The scene.
    pub fn new(scene: &Scene) -> Self {
        Self {
            distrib: Arc::new(Distribution1D::new(vec![1.0; scene.lights.len()])),
        }
    }
}

impl LightDistribution for UniformLightDistribution {
    /// Returns the shared uniform distribution; the query point is ignored.
    fn lookup(&self, _p: &Point3f, _n: &Normal3f) -> Option<Arc<dyn DiscreteDistribution>> {
        Some(Arc::clone(&self.distrib) as Arc<dyn DiscreteDistribution>)
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
    fn two_unit_lights_split_evenly() {
        let scene = two_point_light_scene(1.0, 1.0);
        let distribution = UniformLightDistribution::new(&scene);
        let d = distribution
            .lookup(&Point3f::new(0.3, 0.3, 0.3), &Normal3f::ZERO)
            .unwrap();
        assert_eq!(d.count(), 2);
        assert!((d.discrete_pdf(0) - 0.5).abs() < 1e-6);
        assert!((d.discrete_pdf(1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn lookup_ignores_the_query_point() {
        let scene = two_point_light_scene(1.0, 3.0);
        let distribution = UniformLightDistribution::new(&scene);
        let a = distribution
            .lookup(&Point3f::new(0.1, 0.1, 0.1), &Normal3f::ZERO)
            .unwrap();
        let b = distribution
            .lookup(&Point3f::new(0.9, 0.9, 0.9), &Normal3f::ZERO)
            .unwrap();
        for i in 0..2 {
            assert_eq!(a.discrete_pdf(i), b.discrete_pdf(i));
            assert!((a.discrete_pdf(i) - 0.5).abs() < 1e-6);
        }
    }
}
