//! Scene

use crate::geometry::*;
use crate::light::*;
use crate::primitive::*;
use crate::{stat_counter, stat_inc, stat_register_fns, stats::*};
use std::sync::Arc;

stat_counter!(
    "Intersections/Regular ray intersection tests",
    N_INTERSECTION_TESTS,
    scene_stats_n_intersection_tests,
);

stat_counter!(
    "Intersections/Shadow ray intersection tests",
    N_SHADOW_TESTS,
    scene_stats_n_shadow_tests,
);

stat_register_fns!(scene_stats_n_intersection_tests, scene_stats_n_shadow_tests);

/// Scene.
pub struct Scene {
    /// An aggregate of all primitives in the scene.
    pub aggregate: ArcPrimitive,

    /// All light sources in the scene.
    pub lights: Vec<ArcLight>,

    /// The bounding box of the scene geometry.
    pub world_bound: Bounds3f,
}

impl Scene {
    /// Creates a new `Scene`.
    ///
    /// * `aggregate` - An aggregate of all primitives in the scene.
    /// * `lights`    - All light sources in the scene.
    pub fn new(aggregate: ArcPrimitive, lights: Vec<ArcLight>) -> Self {
        register_stats();

        Self {
            world_bound: aggregate.world_bound(),
            aggregate: Arc::clone(&aggregate),
            lights,
        }
    }

    /// Traces the ray into the scene and returns the `SurfaceInteraction` if
    /// an intersection occurred.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction> {
        stat_inc!(N_INTERSECTION_TESTS, 1);
        self.aggregate.intersect(ray)
    }

    /// Traces the ray into the scene and returns whether or not an
    /// intersection occurred.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        stat_inc!(N_SHADOW_TESTS, 1);
        self.aggregate.intersect_p(ray)
    }
}
