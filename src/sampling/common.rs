//! Common sampling functions.

use crate::geometry::*;
use crate::pbrt::*;

/// Uniformly sample a direction on the unit sphere.
///
/// * `u` - The random sample point.
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u.x;
    let r = max(0.0, 1.0 - z * z).sqrt();
    let phi = TWO_PI * u.y;
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling directions on the unit sphere.
pub fn uniform_sphere_pdf() -> Float {
    1.0 / FOUR_PI
}

/// Uniformly sample a direction inside a cone of directions about the +z
/// axis.
///
/// * `u`             - The random sample point.
/// * `cos_theta_max` - Cosine of the maximum angle of the cone.
pub fn uniform_sample_cone(u: &Point2f, cos_theta_max: Float) -> Vector3f {
    let cos_theta = (1.0 - u.x) + u.x * cos_theta_max;
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi = u.y * TWO_PI;
    Vector3f::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta)
}

/// Returns the PDF for uniformly sampling directions inside a cone.
///
/// * `cos_theta_max` - Cosine of the maximum angle of the cone.
pub fn uniform_cone_pdf(cos_theta_max: Float) -> Float {
    1.0 / (TWO_PI * (1.0 - cos_theta_max))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
