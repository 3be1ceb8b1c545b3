//! Spot Light Source

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::pbrt::*;
use crate::sampling::*;
use crate::spectrum::*;

/// Implements a spot light source that emits light in a cone of directions
/// from its position.
///
/// The cone axis is given at construction; directions sampled in the light's
/// local frame point down the +z axis and are mapped onto the cone axis.
#[derive(Clone)]
pub struct SpotLight {
    /// Light source type.
    pub light_type: LightType,

    /// Position.
    pub p_light: Point3f,

    /// Intensity.
    pub intensity: Spectrum,

    /// Cone axis (normalized).
    axis: Vector3f,

    /// The two frame vectors perpendicular to the cone axis.
    frame: (Vector3f, Vector3f),

    /// Cosine of overall angular width of the cone.
    cos_total_width: Float,

    /// Cosine of angle at which falloff starts.
    cos_falloff_start: Float,
}

impl SpotLight {
    /// Returns a new `SpotLight`.
    ///
    /// * `p_light`       - Position.
    /// * `axis`          - Cone axis.
    /// * `intensity`     - Intensity.
    /// * `total_width`   - Overall angular width of the cone in degrees.
    /// * `falloff_start` - Angle at which falloff starts in degrees.
    pub fn new(
        p_light: Point3f,
        axis: Vector3f,
        intensity: Spectrum,
        total_width: Float,
        falloff_start: Float,
    ) -> Self {
        let axis = axis.normalize();
        let frame = coordinate_system(&axis);

        Self {
            light_type: LightType(DELTA_POSITION_LIGHT),
            p_light,
            intensity,
            axis,
            frame,
            cos_total_width: total_width.to_radians().cos(),
            cos_falloff_start: falloff_start.to_radians().cos(),
        }
    }

    /// Map a direction sampled in the light's local frame (cone about +z)
    /// onto the cone axis in world space.
    ///
    /// * `w` - The local direction.
    fn light_to_world(&self, w: &Vector3f) -> Vector3f {
        self.frame.0 * w.x + self.frame.1 * w.y + self.axis * w.z
    }

    /// Returns the distribution of light accounting for the spotlight cone.
    ///
    /// * `w` - Direction away from the light.
    fn falloff(&self, w: &Vector3f) -> Float {
        let cos_theta = w.normalize().dot(&self.axis);
        if cos_theta < self.cos_total_width {
            return 0.0;
        }
        if cos_theta >= self.cos_falloff_start {
            return 1.0;
        }

        // Compute falloff inside spotlight cone.
        let delta =
            (cos_theta - self.cos_total_width) / (self.cos_falloff_start - self.cos_total_width);
        (delta * delta) * (delta * delta)
    }
}

impl Light for SpotLight {
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

        let value =
            self.intensity * self.falloff(&-wi) / self.p_light.distance_squared(hit.p);
        Some(Li::new(wi, pdf, Some(vis), value))
    }

    /// Return the total emitted power.
    fn power(&self) -> Spectrum {
        self.intensity * TWO_PI * (1.0 - 0.5 * (self.cos_falloff_start + self.cos_total_width))
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
        let w = uniform_sample_cone(u1, self.cos_total_width);
        let d = self.light_to_world(&w);
        let ray = Ray::new(self.p_light, d, INFINITY, time);

        Le::new(
            ray,
            Normal3f::from(d),
            1.0,
            uniform_cone_pdf(self.cos_total_width),
            self.intensity * self.falloff(&d),
        )
    }

    /// Returns the probability density for the light's `sample_le()`.
    ///
    /// * `ray`     - The ray.
    /// * `n_light` - The normal.
    fn pdf_le(&self, ray: &Ray, _n_light: &Normal3f) -> Pdf {
        let pdf_dir = if ray.d.normalize().dot(&self.axis) >= self.cos_total_width {
            uniform_cone_pdf(self.cos_total_width)
        } else {
            0.0
        };
        Pdf::new(0.0, pdf_dir)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emitted_rays_stay_inside_cone() {
        let axis = Vector3f::new(0.0, -1.0, 0.0);
        let light = SpotLight::new(Point3f::new(0.0, 1.0, 0.0), axis, Spectrum::ONE, 20.0, 15.0);
        let cos_total = (20.0 as Float).to_radians().cos();
        for i in 0..64 {
            let u = Point2f::new((i as Float + 0.5) / 64.0, (i as Float * 0.37).fract());
            let le = light.sample_le(&u, &Point2f::new(0.0, 0.0), 0.0);
            assert!(le.ray.d.normalize().dot(&axis) >= cos_total - 1e-5);
        }
    }

    #[test]
    fn falloff_is_zero_outside_cone() {
        let light = SpotLight::new(
            Point3f::ZERO,
            Vector3f::new(0.0, 0.0, 1.0),
            Spectrum::ONE,
            30.0,
            20.0,
        );
        assert_eq!(light.falloff(&Vector3f::new(1.0, 0.0, 0.0)), 0.0);
        assert_eq!(light.falloff(&Vector3f::new(0.0, 0.0, 1.0)), 1.0);
    }
}
