//! Voxel grid imposed over the scene bounds.

use crate::geometry::*;
use crate::pbrt::*;

/// Voxel coordinates are packed into a u64 for hash table lookups; 20 bits
/// are allocated to each coordinate. `INVALID_PACKED_POS` is an impossible
/// packed coordinate value, which we use to represent an unclaimed hash
/// table entry.
pub(crate) const INVALID_PACKED_POS: u64 = 0xffffffffffffffff;

/// A fixed voxel grid over the scene bounds shared by the voxel-indexed
/// light distributions. The grid resolution is chosen so the widest scene
/// bounding box dimension has `max_voxels` voxels and the other dimensions
/// have a number of voxels so that voxels are roughly cube shaped.
pub(crate) struct VoxelGrid {
    /// The scene bounds the grid covers.
    world_bound: Bounds3f,

    /// Grid resolution per axis.
    n_voxels: [usize; 3],

    /// Slot count of the hash tables addressed by `hash()`.
    hash_table_size: usize,
}

impl VoxelGrid {
    /// Create a new `VoxelGrid`.
    ///
    /// * `world_bound` - The scene bounds.
    /// * `max_voxels`  - Number of voxels along the widest axis.
    pub fn new(world_bound: Bounds3f, max_voxels: usize) -> Self {
        let diag = world_bound.diagonal();
        let bmax = diag[world_bound.maximum_extent()];
        let mut n_voxels = [0_usize; 3];
        for (i, n) in n_voxels.iter_mut().enumerate() {
            *n = max(1_usize, (diag[i] / bmax * max_voxels as Float).round() as usize);

            // The packed representation requires that 20 or fewer bits be
            // sufficient for each coordinate value. It's fairly hard to
            // imagine that this would ever be a problem.
            assert!(*n < (1 << 20));
        }

        let hash_table_size = 4 * n_voxels[0] * n_voxels[1] * n_voxels[2];
        Self {
            world_bound,
            n_voxels,
            hash_table_size,
        }
    }

    /// Returns the grid resolution per axis.
    pub fn n_voxels(&self) -> [usize; 3] {
        self.n_voxels
    }

    /// Returns the slot count for a hash table over this grid's voxels. With
    /// four slots per voxel, quadratic probing is guaranteed to find every
    /// claimed key and an unclaimed slot for every new one.
    pub fn hash_table_size(&self) -> usize {
        self.hash_table_size
    }

    /// Returns the integer voxel coordinates for the given point with respect
    /// to the overall voxel grid.
    ///
    /// * `p` - The point.
    pub fn voxel_of(&self, p: &Point3f) -> Point3i {
        let offset = self.world_bound.offset(p); // offset in [0,1].
        let mut pi = Point3i::ZERO;
        for i in 0..3 {
            // The clamp should almost never be necessary, but is there to be
            // robust to computed intersection points being slightly outside
            // the scene bounds due to floating-point roundoff error.
            pi[i] = clamp(
                (offset[i] * self.n_voxels[i] as Float) as Int,
                0,
                self.n_voxels[i] as Int - 1,
            );
        }
        pi
    }

    /// Pack the 3D integer voxel coordinates into a single 64-bit value.
    ///
    /// * `pi` - The voxel coordinates.
    pub fn pack(&self, pi: &Point3i) -> u64 {
        let packed_pos = ((pi[0] as u64) << 40) | ((pi[1] as u64) << 20) | pi[2] as u64;
        assert_ne!(packed_pos, INVALID_PACKED_POS);
        packed_pos
    }

    /// Compute a hash value from the packed voxel coordinates. We could just
    /// take packed_pos mod the hash table size, but since packed_pos isn't
    /// necessarily well distributed on its own, it's worthwhile to do a
    /// little work to make sure that its bits values are individually fairly
    /// random. For details of and motivation for the following, see:
    /// http://zimbry.blogspot.ch/2011/09/better-bit-mixing-improving-on.html
    ///
    /// * `packed_pos` - The packed voxel coordinates.
    pub fn hash(&self, packed_pos: u64) -> usize {
        let mut hash = packed_pos;
        hash ^= hash >> 31;
        hash = hash.wrapping_mul(0x7fb5d329728ea185);
        hash ^= hash >> 27;
        hash = hash.wrapping_mul(0x81dadef4bc2dd44d);
        hash ^= hash >> 33;
        (hash % self.hash_table_size as u64) as usize
    }

    /// Compute the world-space bounding box of the voxel with the given
    /// coordinates.
    ///
    /// * `pi` - The voxel coordinates.
    pub fn voxel_bounds(&self, pi: &Point3i) -> Bounds3f {
        let p0 = Point3f::new(
            pi[0] as Float / self.n_voxels[0] as Float,
            pi[1] as Float / self.n_voxels[1] as Float,
            pi[2] as Float / self.n_voxels[2] as Float,
        );
        let p1 = Point3f::new(
            (pi[0] + 1) as Float / self.n_voxels[0] as Float,
            (pi[1] + 1) as Float / self.n_voxels[1] as Float,
            (pi[2] + 1) as Float / self.n_voxels[2] as Float,
        );
        Bounds3f::new(self.world_bound.lerp(&p0), self.world_bound.lerp(&p1))
    }

    /// Returns the position of a point within its voxel along an axis,
    /// centered so the voxel midpoint maps to 0 and the faces map to -0.5 and
    /// 0.5.
    ///
    /// * `p`    - The point.
    /// * `axis` - The axis.
    pub fn offset_in_voxel(&self, p: &Point3f, axis: usize) -> Float {
        let offset = self.world_bound.offset(p);
        (offset[axis] * self.n_voxels[axis] as Float).fract() - 0.5
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid(max_voxels: usize) -> VoxelGrid {
        VoxelGrid::new(
            Bounds3f::new(Point3f::ZERO, Point3f::new(1.0, 1.0, 1.0)),
            max_voxels,
        )
    }

    #[test]
    fn cubic_bounds_get_equal_resolution() {
        let grid = unit_grid(4);
        assert_eq!(grid.n_voxels(), [4, 4, 4]);
        assert_eq!(grid.hash_table_size(), 4 * 64);
    }

    #[test]
    fn flat_bounds_clamp_to_one_voxel() {
        let grid = VoxelGrid::new(
            Bounds3f::new(Point3f::ZERO, Point3f::new(8.0, 1.0, 0.0)),
            8,
        );
        assert_eq!(grid.n_voxels(), [8, 1, 1]);
    }

    #[test]
    fn points_outside_bounds_clamp_to_nearest_voxel() {
        let grid = unit_grid(4);
        assert_eq!(
            grid.voxel_of(&Point3f::new(-0.5, 0.5, 1.5)),
            Point3i::new(0, 2, 3)
        );
    }

    #[test]
    fn packed_positions_are_unique_per_voxel() {
        let grid = unit_grid(4);
        let mut seen = std::collections::HashSet::new();
        for x in 0..4 {
            for y in 0..4 {
                for z in 0..4 {
                    assert!(seen.insert(grid.pack(&Point3i::new(x, y, z))));
                }
            }
        }
    }

    #[test]
    fn hash_stays_in_table() {
        let grid = unit_grid(8);
        for x in 0..8 {
            for y in 0..8 {
                for z in 0..8 {
                    let hash = grid.hash(grid.pack(&Point3i::new(x, y, z)));
                    assert!(hash < grid.hash_table_size());
                }
            }
        }
    }

    #[test]
    fn voxel_bounds_tile_the_scene() {
        let grid = unit_grid(2);
        let b = grid.voxel_bounds(&Point3i::new(0, 0, 0));
        assert_eq!(b.p_min, Point3f::ZERO);
        assert_eq!(b.p_max, Point3f::new(0.5, 0.5, 0.5));
        let b = grid.voxel_bounds(&Point3i::new(1, 1, 1));
        assert_eq!(b.p_min, Point3f::new(0.5, 0.5, 0.5));
        assert_eq!(b.p_max, Point3f::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn offset_in_voxel_is_centered() {
        let grid = unit_grid(2);
        assert!((grid.offset_in_voxel(&Point3f::new(0.25, 0.25, 0.25), 0)).abs() < 1e-6);
        assert!((grid.offset_in_voxel(&Point3f::new(0.375, 0.25, 0.25), 0) - 0.25).abs() < 1e-6);
        assert!((grid.offset_in_voxel(&Point3f::new(0.125, 0.25, 0.25), 0) + 0.25).abs() < 1e-6);
    }
}
