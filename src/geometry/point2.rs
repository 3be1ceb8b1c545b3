//! 2-D points

use crate::pbrt::Float;
use num_traits::Num;
use std::fmt;

/// A 2-D point containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,
}

/// 2-D point containing `Float` values.
pub type Point2f = Point2<Float>;

impl<T: Num> Point2<T> {
    /// Creates a new 2-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: fmt::Display> fmt::Display for Point2<T> {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
