//! Spatial Light Distribution.

use super::{LightDistribution, VoxelGrid, INVALID_PACKED_POS};
use crate::geometry::*;
use crate::interaction::Hit;
use crate::light::*;
use crate::low_discrepency::radical_inverse;
use crate::pbrt::*;
use crate::sampling::*;
use crate::scene::*;
use crate::{stat_counter, stat_inc, stat_ratio, stat_register_fns, stats::*};
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

stat_counter!(
    "SpatialLightDistribution/Distributions created",
    N_CREATED,
    spatial_stats_n_created,
);

stat_ratio!(
    "SpatialLightDistribution/Lookups per distribution",
    N_LOOKUPS,
    N_DISTRIBUTIONS,
    spatial_stats_lookups_per_distribution,
);

stat_ratio!(
    "SpatialLightDistribution/Hash probes per lookup",
    N_PROBES,
    N_PROBE_LOOKUPS,
    spatial_stats_probes_per_lookup,
);

stat_register_fns!(
    spatial_stats_n_created,
    spatial_stats_lookups_per_distribution,
    spatial_stats_probes_per_lookup,
);

/// A hash table entry for one voxel. The packed voxel coordinates are
/// claimed with an atomic compare/exchange; the distribution is published
/// once afterwards and read-only from then on.
struct HashEntry {
    packed_pos: AtomicU64,
    distribution: ArcSwapOption<Distribution1D>,
}

impl Default for HashEntry {
    /// Returns the "default value" for `HashEntry`.
    fn default() -> Self {
        Self {
            packed_pos: AtomicU64::new(INVALID_PACKED_POS),
            distribution: ArcSwapOption::const_empty(),
        }
    }
}

/// A spatially-varying light distribution that adjusts the probability of sampling a light source
/// based on an estimate of its contribution to a region of space.  A fixed voxel grid is imposed
/// over the scene bounds and a sampling distribution is computed as needed for each voxel.
pub struct SpatialLightDistribution {
    lights: Vec<ArcLight>,
    grid: VoxelGrid,
    hash_table: Vec<HashEntry>,
}

impl SpatialLightDistribution {
    /// Create a new instance of `SpatialLightDistribution`.
    ///
    /// * `scene`      - The scene.
    /// * `max_voxels` - Maximum number of voxels (defaults to 64).
    pub fn new(scene: &Scene, max_voxels: usize) -> Self {
        register_stats();

        let grid = VoxelGrid::new(scene.world_bound, max_voxels);
        let n_voxels = grid.n_voxels();
        info!(
            "SpatialLightDistribution: scene bounds {}, voxel res ({}, {}, {})",
            scene.world_bound, n_voxels[0], n_voxels[1], n_voxels[2]
        );

        let hash_table = (0..grid.hash_table_size())
            .map(|_| HashEntry::default())
            .collect();
        Self {
            lights: scene.lights.iter().map(Arc::clone).collect(),
            grid,
            hash_table,
        }
    }

    /// Compute the sampling distribution for the voxel with integer
    /// coordinates given by `pi`.
    fn compute_distribution(&self, pi: &Point3i) -> Distribution1D {
        stat_inc!(N_CREATED, 1);
        stat_inc!(N_DISTRIBUTIONS, 1);

        let voxel_bounds = self.grid.voxel_bounds(pi);

        // Compute the sampling distribution. Sample a number of points inside
        // voxelBounds using a 3D Halton sequence; at each one, sample each
        // light source and compute a weight based on Li/pdf for the light's
        // sample (ignoring visibility between the point in the voxel and the
        // point on the light source) as an approximation to how much the
        // light is likely to contribute to illumination in the voxel.
        const N_SAMPLES: usize = 128;
        let mut light_contrib = vec![0.0 as Float; self.lights.len()];
        for i in 0..N_SAMPLES {
            let po = voxel_bounds.lerp(&Point3f::new(
                radical_inverse(0, i as u64),
                radical_inverse(1, i as u64),
                radical_inverse(2, i as u64),
            ));
            let intr = Hit::new(
                po,
                0.0, /* time */
                Vector3f::ZERO,
                Vector3f::new(1.0, 0.0, 0.0),
                Normal3f::ZERO,
            );

            // Use the next two Halton dimensions to sample a point on the
            // light source.
            let u = Point2f::new(radical_inverse(3, i as u64), radical_inverse(4, i as u64));
            for (j, light) in self.lights.iter().enumerate() {
                if let Some(li) = light.sample_li(&intr, &u) {
                    if li.pdf > 0.0 {
                        // TODO: look at tracing shadow rays / computing beam
                        // transmittance. Probably shouldn't give those full
                        // weight but instead e.g. have an occluded shadow ray
                        // scale down the contribution by 10 or something.
                        light_contrib[j] += li.value.y() / li.pdf;
                    }
                }
            }
        }

        // We don't want to leave any lights with a zero probability; it's
        // possible that a light contributes to points in the voxel even
        // though we didn't find such a point when sampling above. Therefore,
        // compute a minimum (small) weight and ensure that all lights are
        // given at least the corresponding probability.
        let sum_contrib: Float = light_contrib.iter().sum();
        let avg_contrib = sum_contrib / (N_SAMPLES * light_contrib.len()) as Float;
        let min_contrib = if avg_contrib > 0.0 { 0.001 * avg_contrib } else { 1.0 };
        for (i, contrib) in light_contrib.iter_mut().enumerate() {
            debug!("Voxel pi = {pi}, light {i} contrib = {contrib}");
            *contrib = max(*contrib, min_contrib);
        }
        info!("Initialized light distribution in voxel pi = {pi}, avgContrib = {avg_contrib}");

        // Compute a sampling distribution from the accumulated contributions.
        let dist = Distribution1D::new(light_contrib);
        debug!("Voxel pi = {pi}: {dist}");
        dist
    }
}

impl LightDistribution for SpatialLightDistribution {
    /// Given a point |p| in space, this method returns a (hopefully effective) sampling distribution
    /// for light sources at that point.
    fn lookup(&self, p: &Point3f, _n: &Normal3f) -> Option<Arc<dyn DiscreteDistribution>> {
        stat_inc!(N_LOOKUPS, 1);
        stat_inc!(N_PROBE_LOOKUPS, 1);

        let pi = self.grid.voxel_of(p);
        let packed_pos = self.grid.pack(&pi);
        let mut hash = self.grid.hash(packed_pos);

        let hash_table_size = self.hash_table.len();

        // Now, see if the hash table already has an entry for the voxel. We'll use quadratic probing
        // when the hash table entry is already used for another value; step stores the square root
        // of the probe step.
        let mut step = 1;
        let mut n_probes = 1_i64;
        'probe: loop {
            // Probing terminates because the table has four slots per voxel.
            debug_assert!(n_probes as usize <= hash_table_size);
            let entry = &self.hash_table[hash];

            // Does the hash table entry at offset |hash| match the current point?
            let entry_packed_pos = entry.packed_pos.load(Ordering::Acquire);
            if entry_packed_pos == packed_pos {
                // Yes! Most of the time, there should already be a light
                // sampling distribution available; otherwise another thread
                // claimed the entry and is still computing it, so spin until
                // it publishes the distribution.
                loop {
                    if let Some(dist) = entry.distribution.load_full() {
                        stat_inc!(N_PROBES, n_probes);
                        break 'probe Some(dist as Arc<dyn DiscreteDistribution>);
                    }
                    std::hint::spin_loop();
                }
            } else if entry_packed_pos != INVALID_PACKED_POS {
                // The hash table entry we're checking has already been allocated for another voxel.
                // Advance to the next entry with quadratic probing.
                hash += step * step;
                if hash >= hash_table_size {
                    hash %= hash_table_size;
                }
                step += 1;
                n_probes += 1;
            } else {
                // We have found an invalid entry. (Though this may have changed since the load into
                // entryPackedPos above.) Use an atomic compare/exchange to try to claim this entry
                // for the current position.
                if entry
                    .packed_pos
                    .compare_exchange_weak(
                        INVALID_PACKED_POS,
                        packed_pos,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_ok()
                {
                    // Success; we've claimed this position for this voxel's distribution. Now
                    // compute the sampling distribution and publish it. As long as packedPos has
                    // been set but the entry's distribution is still empty, any other threads
                    // looking up the distribution for this voxel will spin wait until it is
                    // written.
                    let dist = Arc::new(self.compute_distribution(&pi));
                    entry.distribution.store(Some(Arc::clone(&dist)));
                    stat_inc!(N_PROBES, n_probes);
                    break 'probe Some(dist as Arc<dyn DiscreteDistribution>);
                }
                // The claim raced with another thread; re-examine this slot.
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
