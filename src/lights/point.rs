//! Point Light Source

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::pbrt::*;
use crate::sampling::*;
use crate::spectrum::*;

/// Implements an isotropic point light source that emits the same amount of
/// light in all directions.
#[derive(Clone)]
pub struct PointLight {
    /// Light source type.
    pub light_type: LightType,

    /// Position.
    pub p_light: Point3f,

    /// Intensity.
    pub intensity: Spectrum,
}

impl PointLight {
    /// Returns a new `PointLight`.
    ///
    /// * `p_light`   - Position.
    /// * `intensity` - Intensity.
    pub fn new(p_light: Point3f, intensity: Spectrum) -> Self {
        Self {
            light_type: LightType(DELTA_POSITION_LIGHT),
            p_light,
            intensity,
        }
    }
}

impl Light for PointLight {
    /// Returns the type of light.
    fn get_type(&self) -> LightType {
        self.light_type
    }

    /// Return the radiance arriving at an interaction point.
    ///
    /// * `hit` - The interaction hit point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, _u: &Point2f) -> Option<Li> {
        let wi = (self.p_light - hit.p).normalize();
        let pdf = 1.0;

        let p0 = hit.clone();
        let p1 = Hit::new_minimal(self.p_light, hit.time);
        let vis = VisibilityTester::new(p0, p1);

        let value = self.intensity / self.p_light.distance_squared(hit.p);
        Some(Li::new(wi, pdf, Some(vis), value))
    }

    /// Return the total emitted power.
    fn power(&self) -> Spectrum {
        FOUR_PI * self.intensity
    }

    /// Returns the probability density with respect to solid angle for the
    /// light's `sample_li()`.
    ///
    /// * `hit` - The interaction hit point.
    /// * `wi`  - The incident direction.
    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        0.0
    }

    /// Returns a sampled light-carrying ray leaving the light source.
    ///
    /// * `u1`   - Sample values for Monte Carlo.
    /// * `u2`   - Sample values for Monte Carlo.
    /// * `time` - Time to use for the ray.
    fn sample_le(&self, u1: &Point2f, _u2: &Point2f, time: Float) -> Le {
        let dir = uniform_sample_sphere(u1);
        let ray = Ray::new(self.p_light, dir, INFINITY, time);
        Le::new(
            ray,
            Normal3f::from(dir),
            1.0,
            uniform_sphere_pdf(),
            self.intensity,
        )
    }

    /// Returns the probability density for the light's `sample_le()`.
    ///
    /// * `ray`     - The ray.
    /// * `n_light` - The normal.
    fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Pdf {
        Pdf::new(0.0, uniform_sphere_pdf())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radiance_falls_off_with_squared_distance() {
        let light = PointLight::new(Point3f::ZERO, Spectrum::new(4.0));
        let hit = Hit::new_minimal(Point3f::new(2.0, 0.0, 0.0), 0.0);
        let li = light.sample_li(&hit, &Point2f::new(0.5, 0.5)).unwrap();
        assert_eq!(li.pdf, 1.0);
        assert_eq!(li.value, Spectrum::new(1.0));
        assert_eq!(li.wi, Vector3f::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn emitted_rays_leave_the_light_position() {
        let light = PointLight::new(Point3f::new(1.0, 2.0, 3.0), Spectrum::ONE);
        let le = light.sample_le(&Point2f::new(0.3, 0.7), &Point2f::new(0.0, 0.0), 0.0);
        assert_eq!(le.ray.o, Point3f::new(1.0, 2.0, 3.0));
        assert_eq!(le.pdf_pos, 1.0);
        assert!((le.pdf_dir - 1.0 / FOUR_PI).abs() < 1e-6);
    }
}
