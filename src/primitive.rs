//! Primitive

use crate::geometry::*;
use crate::interaction::*;
use std::sync::Arc;

/// Represents the result of a ray / primitive intersection.
#[derive(Clone)]
pub struct SurfaceInteraction {
    /// The common interaction data.
    pub hit: Hit,
}

impl SurfaceInteraction {
    /// Create a new `SurfaceInteraction`.
    ///
    /// * `hit` - The common interaction data.
    pub fn new(hit: Hit) -> Self {
        Self { hit }
    }
}

/// Primitive trait provides common behavior for intersectable scene geometry.
pub trait Primitive: Send + Sync {
    /// Returns a bounding box in world space.
    fn world_bound(&self) -> Bounds3f;

    /// Returns geometric details if the ray intersects the primitive and
    /// updates the `t_max` parameter of the ray. Otherwise it returns `None`.
    ///
    /// * `ray` - The ray.
    fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction>;

    /// Returns `true` if the ray intersects the primitive.
    ///
    /// * `ray` - The ray.
    fn intersect_p(&self, ray: &Ray) -> bool;
}

/// Atomic reference counted `Primitive`.
pub type ArcPrimitive = Arc<dyn Primitive + Send + Sync>;
