//! Interactions

use crate::geometry::*;
use crate::pbrt::Float;
use std::fmt;

/// Hit provides the common data describing a point on or probe point near a
/// surface, shared by light sampling and intersection results.
#[derive(Clone)]
pub struct Hit {
    /// Point of interaction.
    pub p: Point3f,

    /// Time when interaction occurred.
    pub time: Float,

    /// Floating point error for ray intersection points.
    pub p_error: Vector3f,

    /// The negative ray direction (outgoing direction used when computing
    /// lighting at points).
    pub wo: Vector3f,

    /// Surface normal at the point `p`.
    pub n: Normal3f,
}

impl Hit {
    /// Create a new hit.
    ///
    /// NOTE: If you need to contruct a new `Hit` without `wo`, `n` and
    /// `p_error` use `Hit::new_minimal()`.
    ///
    /// `p`       - Point of interaction.
    /// `time`    - Time when interaction occurred.
    /// `p_error` - Floating point error for ray intersection points.
    /// `wo`      - The negative ray direction (outgoing direction used when
    ///             computing lighting at points).
    /// `n`       - Surface normal at the point `p`.
    pub fn new(p: Point3f, time: Float, p_error: Vector3f, wo: Vector3f, n: Normal3f) -> Self {
        let l2 = wo.length_squared();
        let wo = if l2 == 0.0 { wo } else { wo / l2.sqrt() };

        Self { p, time, p_error, wo, n }
    }

    /// Create a new hit from minimal fields.
    ///
    /// `p`    - Point of interaction.
    /// `time` - Time when interaction occurred.
    pub fn new_minimal(p: Point3f, time: Float) -> Self {
        Self {
            p,
            time,
            p_error: Vector3f::ZERO,
            wo: Vector3f::ZERO,
            n: Normal3f::ZERO,
        }
    }
}

impl fmt::Display for Hit {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hit {{ p: {}, time: {}, p_error: {}, wo: {}, n: {} }}",
            self.p, self.time, self.p_error, self.wo, self.n,
        )
    }
}
