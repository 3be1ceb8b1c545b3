//! Test scene fixtures.

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::lights::*;
use crate::pbrt::*;
use crate::primitive::*;
use crate::scene::*;
use crate::spectrum::*;
use std::sync::Arc;

/// The unit box used as scene bounds by most fixtures.
pub fn unit_bounds() -> Bounds3f {
    Bounds3f::new(Point3f::ZERO, Point3f::new(1.0, 1.0, 1.0))
}

/// An aggregate with bounds but no intersectable geometry; every ray misses.
pub struct NoGeometry {
    bounds: Bounds3f,
}

impl NoGeometry {
    pub fn new(bounds: Bounds3f) -> Self {
        Self { bounds }
    }
}

impl Primitive for NoGeometry {
    fn world_bound(&self) -> Bounds3f {
        self.bounds
    }

    fn intersect(&self, _ray: &mut Ray) -> Option<SurfaceInteraction> {
        None
    }

    fn intersect_p(&self, _ray: &Ray) -> bool {
        false
    }
}

/// An axis-aligned quad covering the floor of its bounds, at the bounds'
/// minimum y.
pub struct FloorQuad {
    bounds: Bounds3f,
}

impl FloorQuad {
    pub fn new(bounds: Bounds3f) -> Self {
        Self { bounds }
    }

    fn hit_t(&self, ray: &Ray) -> Option<Float> {
        if ray.d.y == 0.0 {
            return None;
        }
        let t = (self.bounds.p_min.y - ray.o.y) / ray.d.y;
        if t <= SHADOW_EPSILON || t >= ray.t_max {
            return None;
        }
        let p = ray.at(t);
        let inside = p.x >= self.bounds.p_min.x
            && p.x <= self.bounds.p_max.x
            && p.z >= self.bounds.p_min.z
            && p.z <= self.bounds.p_max.z;
        inside.then_some(t)
    }
}

impl Primitive for FloorQuad {
    fn world_bound(&self) -> Bounds3f {
        self.bounds
    }

    fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction> {
        let t = self.hit_t(ray)?;
        ray.t_max = t;
        let hit = Hit::new(
            ray.at(t),
            ray.time,
            Vector3f::ZERO,
            -ray.d,
            Normal3f::new(0.0, 1.0, 0.0),
        );
        Some(SurfaceInteraction::new(hit))
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        self.hit_t(ray).is_some()
    }
}

/// A scene with no lights and no geometry.
pub fn empty_scene() -> Scene {
    Scene::new(Arc::new(NoGeometry::new(unit_bounds())), Vec::new())
}

/// A scene with a single unit-power point light and no geometry.
pub fn single_light_scene() -> Scene {
    let light: ArcLight = Arc::new(PointLight::new(
        Point3f::new(0.5, 0.5, 0.5),
        Spectrum::ONE,
    ));
    Scene::new(Arc::new(NoGeometry::new(unit_bounds())), vec![light])
}

/// A unit-box scene with two point lights in opposite halves along x and no
/// geometry. Intensities are per light.
pub fn two_point_light_scene(intensity0: Float, intensity1: Float) -> Scene {
    let lights: Vec<ArcLight> = vec![
        Arc::new(PointLight::new(
            Point3f::new(0.05, 0.75, 0.75),
            Spectrum::new(intensity0),
        )),
        Arc::new(PointLight::new(
            Point3f::new(0.95, 0.75, 0.75),
            Spectrum::new(intensity1),
        )),
    ];
    Scene::new(Arc::new(NoGeometry::new(unit_bounds())), lights)
}

/// A unit-box scene with a floor quad at y = 0 and two point lights above
/// it.
pub fn floor_scene_with_two_lights() -> Scene {
    let lights: Vec<ArcLight> = vec![
        Arc::new(PointLight::new(Point3f::new(0.25, 0.5, 0.5), Spectrum::ONE)),
        Arc::new(PointLight::new(Point3f::new(0.75, 0.5, 0.5), Spectrum::ONE)),
    ];
    Scene::new(Arc::new(FloorQuad::new(unit_bounds())), lights)
}

/// A unit-box scene with a floor quad at y = 0 and two narrow spot lights
/// pointing straight down, so each light's photons land in a disjoint region
/// of the floor: light 0 around x = 0.25 and light 1 around x = 0.75.
pub fn spot_floor_scene() -> Scene {
    let down = Vector3f::new(0.0, -1.0, 0.0);
    let lights: Vec<ArcLight> = vec![
        Arc::new(SpotLight::new(
            Point3f::new(0.25, 0.9, 0.5),
            down,
            Spectrum::ONE,
            10.0,
            8.0,
        )),
        Arc::new(SpotLight::new(
            Point3f::new(0.75, 0.9, 0.5),
            down,
            Spectrum::ONE,
            10.0,
            8.0,
        )),
    ];
    Scene::new(Arc::new(FloorQuad::new(unit_bounds())), lights)
}

/// A scene whose photons can never land: two point lights, no geometry.
pub fn no_geometry_scene() -> Scene {
    let lights: Vec<ArcLight> = vec![
        Arc::new(PointLight::new(Point3f::new(0.25, 0.5, 0.5), Spectrum::ONE)),
        Arc::new(PointLight::new(Point3f::new(0.75, 0.5, 0.5), Spectrum::ONE)),
    ];
    Scene::new(Arc::new(NoGeometry::new(unit_bounds())), lights)
}
