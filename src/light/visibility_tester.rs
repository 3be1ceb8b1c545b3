//! Visibility Tester

use crate::geometry::Ray;
use crate::interaction::Hit;
use crate::pbrt::SHADOW_EPSILON;
use crate::scene::Scene;

/// VisibilityTester allows lights to return a radiance value under the
/// assumption that the reference point and light source are mutually
/// visible.
#[derive(Clone)]
pub struct VisibilityTester {
    /// One endpoint of shadow ray.
    pub p0: Hit,

    /// Second endpoint of shadow ray.
    pub p1: Hit,
}

impl VisibilityTester {
    /// Create a new `VisibilityTester` for given endpoints of a shadow ray.
    ///
    /// * `p0` - One endpoint of shadow ray.
    /// * `p1` - Second endpoint of shadow ray.
    pub fn new(p0: Hit, p1: Hit) -> Self {
        Self { p0, p1 }
    }

    /// Traces a shadow ray between `p0` and `p1` through the scene and returns
    /// true if the points are visible to each other.
    ///
    /// * `scene` - The scene.
    pub fn unoccluded(&self, scene: &Scene) -> bool {
        let d = self.p1.p - self.p0.p;
        let ray = Ray::new(self.p0.p, d, 1.0 - SHADOW_EPSILON, self.p0.time);
        !scene.intersect_p(&ray)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
