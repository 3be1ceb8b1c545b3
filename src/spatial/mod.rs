//! Spatial indices over point clouds.
//!
//! The photon strategies treat these as black boxes with a narrow surface:
//! build once, then `knn` / `radius` queries returning squared distances, and
//! leaf enumeration for leaf-cluster construction.

mod k_means;
mod point_kd_tree;

// Re-export
pub use k_means::*;
pub use point_kd_tree::*;
