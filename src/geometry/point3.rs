//! 3-D points

use super::Vector3;
use crate::pbrt::{Axis, Float, Int};
use num_traits::{Num, Zero};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Sub};

/// A 3-D point containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D point containing `Float` values.
pub type Point3f = Point3<Float>;
impl Point3f {
    /// Origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
}

/// 3-D point containing `Int` values.
pub type Point3i = Point3<Int>;
impl Point3i {
    /// Origin.
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };
}

impl<T: Num> Point3<T> {
    /// Creates a new 3-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Creates a new 3-D zero point.
    pub fn zero() -> Self
    where
        T: Zero,
    {
        Self::new(T::zero(), T::zero(), T::zero())
    }

    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool
    where
        T: num_traits::Float,
    {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Returns the squared distance to another point.
    ///
    /// * `other` - The other point.
    pub fn distance_squared(&self, other: Self) -> T
    where
        T: Copy,
    {
        (*self - other).length_squared()
    }

    /// Returns the distance to another point.
    ///
    /// * `other` - The other point.
    pub fn distance(&self, other: Self) -> T
    where
        T: num_traits::Float,
    {
        (*self - other).length()
    }
}

impl<T: Num> Add<Vector3<T>> for Point3<T> {
    type Output = Self;

    /// Offsets the point by a vector and returns the result.
    ///
    /// * `v` - The offset vector.
    fn add(self, v: Vector3<T>) -> Self::Output {
        Self::Output::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl<T: Num> Add for Point3<T> {
    type Output = Self;

    /// Adds the coordinates of another point. Used for interpolating between
    /// weighted points.
    ///
    /// * `other` - The other point.
    fn add(self, other: Self) -> Self::Output {
        Self::Output::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<T: Num + Copy> AddAssign for Point3<T> {
    /// Performs the `+=` operation.
    ///
    /// * `other` - The other point.
    fn add_assign(&mut self, other: Self) {
        *self = Self::new(self.x + other.x, self.y + other.y, self.z + other.z);
    }
}

impl<T: Num> Sub for Point3<T> {
    type Output = Vector3<T>;

    /// Returns the vector towards this point from the given point.
    ///
    /// * `other` - The other point.
    fn sub(self, other: Self) -> Self::Output {
        Self::Output::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T: Num> Sub<Vector3<T>> for Point3<T> {
    type Output = Self;

    /// Offsets the point backwards by a vector and returns the result.
    ///
    /// * `v` - The offset vector.
    fn sub(self, v: Vector3<T>) -> Self::Output {
        Self::Output::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl<T: Num + Copy> Mul<T> for Point3<T> {
    type Output = Self;

    /// Scales the point's coordinates.
    ///
    /// * `f` - The scaling factor.
    fn mul(self, f: T) -> Self::Output {
        Self::Output::new(f * self.x, f * self.y, f * self.z)
    }
}

impl Mul<Point3f> for Float {
    type Output = Point3f;

    /// Scales the point's coordinates.
    ///
    /// * `p` - The point.
    fn mul(self, p: Point3f) -> Self::Output {
        p * self
    }
}

impl<T: Num + Copy> Div<T> for Point3<T> {
    type Output = Self;

    /// Scales the point's coordinates by 1/f.
    ///
    /// * `f` - The divisor.
    fn div(self, f: T) -> Self::Output {
        debug_assert!(!f.is_zero());
        Self::Output::new(self.x / f, self.y / f, self.z / f)
    }
}

impl<T> Index<Axis> for Point3<T> {
    type Output = T;

    /// Index the point by an axis.
    ///
    /// * `axis` - A 3-D coordinate axis.
    fn index(&self, axis: Axis) -> &Self::Output {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl<T> Index<usize> for Point3<T> {
    type Output = T;

    /// Index the point by an axis number.
    ///
    /// * `i` - A 3-D coordinate axis (0, 1 or 2).
    fn index(&self, i: usize) -> &Self::Output {
        &self[Axis::from(i)]
    }
}

impl<T> IndexMut<Axis> for Point3<T> {
    /// Index the point by an axis for mutation.
    ///
    /// * `axis` - A 3-D coordinate axis.
    fn index_mut(&mut self, axis: Axis) -> &mut Self::Output {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

impl<T> IndexMut<usize> for Point3<T> {
    /// Index the point by an axis number for mutation.
    ///
    /// * `i` - A 3-D coordinate axis (0, 1 or 2).
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self[Axis::from(i)]
    }
}

impl<T> From<Vector3<T>> for Point3<T> {
    /// Convert a 3-D vector to a 3-D point.
    ///
    /// * `v` - 3-D vector.
    fn from(v: Vector3<T>) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl<T: fmt::Display> fmt::Display for Point3<T> {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
