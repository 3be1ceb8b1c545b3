//! 3-D Axis Aligned Bounding Boxes.

use super::common::Union;
use super::{Point3, Point3f, Vector3};
use crate::pbrt::{lerp, max, min, Axis, Float};
use num_traits::Num;
use std::fmt;
use std::ops::DivAssign;

/// 3-D Axis Aligned Bounding Box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3<T: Num> {
    /// Minimum bounds.
    pub p_min: Point3<T>,

    /// Maximum bounds.
    pub p_max: Point3<T>,
}

/// 3-D bounding box containing `Float` points.
pub type Bounds3f = Bounds3<Float>;

impl<T: Num + PartialOrd + Copy> Bounds3<T> {
    /// Creates a new 3-D bounding box from 2 points. The minimum and maximum
    /// bounds are used for each coordinate axis.
    ///
    /// * `p1` - First point.
    /// * `p2` - Second point.
    pub fn new(p1: Point3<T>, p2: Point3<T>) -> Self {
        Self {
            p_min: Point3::new(min(p1.x, p2.x), min(p1.y, p2.y), min(p1.z, p2.z)),
            p_max: Point3::new(max(p1.x, p2.x), max(p1.y, p2.y), max(p1.z, p2.z)),
        }
    }
}

impl<T: Num + Copy> Bounds3<T> {
    /// Returns the vector along the box diagonal from the minimum point to
    /// the maximum point.
    pub fn diagonal(&self) -> Vector3<T> {
        self.p_max - self.p_min
    }

    /// Returns the index of which of the axes is longest. This is useful, for
    /// example, when deciding which axis to subdivide when building some of
    /// the spatial indices.
    pub fn maximum_extent(&self) -> Axis
    where
        T: PartialOrd,
    {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            Axis::X
        } else if d.y > d.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Returns the continuous position of a point relative to the corners of
    /// the box, where a point at the minimum corner has offset `(0, 0, 0)` and
    /// a point at the maximum corner has offset `(1, 1, 1)`.
    ///
    /// * `p` - The point.
    pub fn offset(&self, p: &Point3<T>) -> Vector3<T>
    where
        T: num_traits::Float + DivAssign<T> + PartialOrd,
    {
        let mut o = *p - self.p_min;
        if self.p_max.x > self.p_min.x {
            o.x /= self.p_max.x - self.p_min.x;
        }
        if self.p_max.y > self.p_min.y {
            o.y /= self.p_max.y - self.p_min.y;
        }
        if self.p_max.z > self.p_min.z {
            o.z /= self.p_max.z - self.p_min.z;
        }
        o
    }

    /// Returns true if a point is inside the bounding box.
    ///
    /// * `p` - The point.
    pub fn contains(&self, p: &Point3<T>) -> bool
    where
        T: PartialOrd,
    {
        (p.x >= self.p_min.x && p.x <= self.p_max.x)
            && (p.y >= self.p_min.y && p.y <= self.p_max.y)
            && (p.z >= self.p_min.z && p.z <= self.p_max.z)
    }

    /// Linearly interpolates between the corners of the box by the given
    /// amount in each dimension.
    ///
    /// * `t` - The interpolation parameter in x, y and z directions.
    pub fn lerp(&self, t: &Point3f) -> Point3<T>
    where
        Float: std::ops::Mul<T, Output = T>,
    {
        Point3::new(
            lerp::<T>(t.x, self.p_min.x, self.p_max.x),
            lerp::<T>(t.y, self.p_min.y, self.p_max.y),
            lerp::<T>(t.z, self.p_min.z, self.p_max.z),
        )
    }
}

impl<T: Num + PartialOrd + Copy> Union<Point3<T>> for Bounds3<T> {
    /// Return a bounding box containing itself and a point.
    ///
    /// * `other` - The point.
    fn union(&self, other: &Point3<T>) -> Self {
        Self {
            p_min: Point3::new(
                min(self.p_min.x, other.x),
                min(self.p_min.y, other.y),
                min(self.p_min.z, other.z),
            ),
            p_max: Point3::new(
                max(self.p_max.x, other.x),
                max(self.p_max.y, other.y),
                max(self.p_max.z, other.z),
            ),
        }
    }
}

impl<T: Num + PartialOrd + Copy> Union<Bounds3<T>> for Bounds3<T> {
    /// Return a bounding box containing both bounding boxes.
    ///
    /// * `other` - The other bounding box.
    fn union(&self, other: &Bounds3<T>) -> Self {
        Self {
            p_min: Point3::new(
                min(self.p_min.x, other.p_min.x),
                min(self.p_min.y, other.p_min.y),
                min(self.p_min.z, other.p_min.z),
            ),
            p_max: Point3::new(
                max(self.p_max.x, other.p_max.x),
                max(self.p_max.y, other.p_max.y),
                max(self.p_max.z, other.p_max.z),
            ),
        }
    }
}

impl<T: Num + fmt::Display> fmt::Display for Bounds3<T> {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.p_min, self.p_max)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Bounds3f {
        Bounds3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn new_orders_corners() {
        let b = Bounds3::new(Point3::new(1.0, -1.0, 3.0), Point3::new(0.0, 2.0, -3.0));
        assert_eq!(b.p_min, Point3::new(0.0, -1.0, -3.0));
        assert_eq!(b.p_max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn maximum_extent_picks_widest_axis() {
        let b = Bounds3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 3.0, 2.0));
        assert_eq!(b.maximum_extent(), Axis::Y);
    }

    #[test]
    fn offset_is_relative_position() {
        let b = unit_box();
        let o = b.offset(&Point3::new(0.25, 0.5, 1.0));
        assert_eq!(o, Vector3::new(0.25, 0.5, 1.0));
    }

    #[test]
    fn lerp_hits_corners() {
        let b = Bounds3::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(b.lerp(&Point3::new(0.0, 0.0, 0.0)), b.p_min);
        assert_eq!(b.lerp(&Point3::new(1.0, 1.0, 1.0)), b.p_max);
        assert_eq!(b.lerp(&Point3::new(0.5, 0.5, 0.5)), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn union_grows_bounds() {
        let b = unit_box().union(&Point3::new(2.0, -1.0, 0.5));
        assert_eq!(b.p_min, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(b.p_max, Point3::new(2.0, 1.0, 1.0));
    }
}
