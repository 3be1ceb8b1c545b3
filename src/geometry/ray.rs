//! Rays

use super::{Point3f, Vector3f};
use crate::pbrt::Float;

/// A Ray
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Maximum extent of the ray.
    pub t_max: Float,

    /// Time value.
    pub time: Float,
}

impl Ray {
    /// Returns a new ray.
    ///
    /// * `o`     - Origin.
    /// * `d`     - Direction.
    /// * `t_max` - Maximum extent of the ray.
    /// * `time`  - Time value.
    pub fn new(o: Point3f, d: Vector3f, t_max: Float, time: Float) -> Self {
        Self { o, d, t_max, time }
    }

    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool {
        self.o.has_nans() || self.d.has_nans() || self.t_max.is_nan()
    }

    /// Get position along the ray at given parameter.
    ///
    /// * `t` - Parameter to evaluate.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

impl Default for Ray {
    /// Returns a ray from the origin pointing down +x with unbounded extent.
    fn default() -> Self {
        Self::new(
            Point3f::ZERO,
            Vector3f::new(1.0, 0.0, 0.0),
            crate::pbrt::INFINITY,
            0.0,
        )
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
