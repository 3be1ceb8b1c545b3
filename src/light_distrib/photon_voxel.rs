//! Photon Voxel Light Distribution.

use super::{
    photon_sampling_distribution, trace_photon, LightDistribution, Photon, VoxelGrid,
    INVALID_PACKED_POS, PHOTON_CHUNK_SIZE,
};
use crate::geometry::*;
use crate::paramset::*;
use crate::pbrt::*;
use crate::sampling::*;
use crate::scene::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A hash table entry for one voxel. During photon shooting the packed voxel
/// coordinates are claimed with an atomic compare/exchange and contributions
/// accumulate under the entry's own lock; after shooting each claimed entry
/// is frozen into a sampling distribution and is read-only from then on.
struct VoxelEntry {
    packed_pos: AtomicU64,
    light_contrib: Mutex<HashMap<usize, Float>>,
    distribution: Option<Arc<SparseDistribution1D>>,
}

impl Default for VoxelEntry {
    /// Returns the "default value" for `VoxelEntry`.
    fn default() -> Self {
        Self {
            packed_pos: AtomicU64::new(INVALID_PACKED_POS),
            light_contrib: Mutex::new(HashMap::new()),
            distribution: None,
        }
    }
}

/// A spatially-varying light distribution estimated by shooting a batch of
/// photons at construction and accumulating each photon's throughput into
/// the voxel containing its first surface hit. Voxels no photon reached fall
/// back to a uniform distribution over the lights. Lookups either return the
/// query voxel's distribution directly or blend it with up to seven axis
/// neighbors based on where the query point lies within the voxel.
pub struct PhotonVoxelLightDistribution {
    n_lights: usize,
    min_contribution_scale: Float,
    interpolate_cdf: bool,
    grid: VoxelGrid,
    default_distrib: Arc<Distribution1D>,
    hash_table: Vec<VoxelEntry>,
}

impl PhotonVoxelLightDistribution {
    /// Create a new instance of `PhotonVoxelLightDistribution` by shooting
    /// `photonCount` photons into the scene.
    ///
    /// * `params` - The strategy parameters.
    /// * `scene`  - The scene.
    pub fn new(params: &ParamSet, scene: &Scene) -> Self {
        let photon_count = params.find_one_int("photonCount", 100000) as usize;
        let photon_distrib = photon_sampling_distribution(params, scene);

        let mut dist = Self::empty(params, scene.lights.len(), scene.world_bound);
        dist.shoot_photons(scene, &photon_distrib, photon_count);
        dist.freeze();
        dist
    }

    /// Create a new instance from an already traced photon batch; photons
    /// that missed the scene are ignored.
    ///
    /// * `photons`     - The traced photons.
    /// * `n_lights`    - Number of lights in the scene.
    /// * `world_bound` - The scene bounds.
    /// * `params`      - The strategy parameters.
    pub(crate) fn from_photons(
        photons: &[Photon],
        n_lights: usize,
        world_bound: Bounds3f,
        params: &ParamSet,
    ) -> Self {
        let mut dist = Self::empty(params, n_lights, world_bound);
        for photon in photons {
            if let Some(light_num) = photon.light_num {
                dist.deposit(&photon.p, photon.beta, light_num);
            }
        }
        dist.freeze();
        dist
    }

    fn empty(params: &ParamSet, n_lights: usize, world_bound: Bounds3f) -> Self {
        let max_voxels = params.find_one_int("maxVoxels", 64) as usize;
        let grid = VoxelGrid::new(world_bound, max_voxels);
        let n_voxels = grid.n_voxels();
        info!(
            "PhotonVoxelLightDistribution: scene bounds {}, voxel res ({}, {}, {})",
            world_bound, n_voxels[0], n_voxels[1], n_voxels[2]
        );

        let hash_table = (0..grid.hash_table_size())
            .map(|_| VoxelEntry::default())
            .collect();
        Self {
            n_lights,
            min_contribution_scale: params.find_one_float("minContributionScale", 0.001),
            interpolate_cdf: params.find_one_bool("interpolateCdf", true),
            grid,
            default_distrib: Arc::new(Distribution1D::new(vec![1.0; n_lights])),
            hash_table,
        }
    }

    /// Trace the photon batch in parallel, depositing every surface hit into
    /// the voxel hash table.
    fn shoot_photons(&self, scene: &Scene, photon_distrib: &Distribution1D, photon_count: usize) {
        (0..photon_count)
            .into_par_iter()
            .chunks(PHOTON_CHUNK_SIZE)
            .for_each(|chunk| {
                for photon_index in chunk {
                    let photon = trace_photon(scene, photon_distrib, photon_index);
                    if let Some(light_num) = photon.light_num {
                        self.deposit(&photon.p, photon.beta, light_num);
                    }
                }
            });
    }

    /// Accumulate a photon's throughput into the entry of the voxel holding
    /// its hit point, claiming the entry if the photon is the first to reach
    /// the voxel.
    ///
    /// * `p`         - The photon's surface hit position.
    /// * `beta`      - The photon's scalar throughput.
    /// * `light_num` - The photon's originating light.
    fn deposit(&self, p: &Point3f, beta: Float, light_num: usize) {
        let pi = self.grid.voxel_of(p);
        let packed_pos = self.grid.pack(&pi);
        let mut hash = self.grid.hash(packed_pos);

        let hash_table_size = self.hash_table.len();
        let mut step = 1;
        let mut n_probes = 1;
        loop {
            // Probing terminates because the table has four slots per voxel.
            assert!(n_probes <= hash_table_size);
            let entry = &self.hash_table[hash];
            let entry_packed_pos = entry.packed_pos.load(Ordering::Acquire);
            if entry_packed_pos == packed_pos {
                let mut light_contrib = entry.light_contrib.lock().unwrap();
                *light_contrib.entry(light_num).or_insert(0.0) += beta;
                break;
            } else if entry_packed_pos == INVALID_PACKED_POS {
                // Try to claim this entry for the voxel; on a lost race the
                // same slot is re-examined since the winner may have claimed
                // it for this very voxel.
                if entry
                    .packed_pos
                    .compare_exchange(
                        INVALID_PACKED_POS,
                        packed_pos,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_ok()
                {
                    let mut light_contrib = entry.light_contrib.lock().unwrap();
                    *light_contrib.entry(light_num).or_insert(0.0) += beta;
                    break;
                }
            } else {
                // The hash table entry we're checking has already been
                // allocated for another voxel. Advance to the next entry with
                // quadratic probing.
                hash += step * step;
                if hash >= hash_table_size {
                    hash %= hash_table_size;
                }
                step += 1;
                n_probes += 1;
            }
        }
    }

    /// Replace every claimed entry's contribution map with a sampling
    /// distribution. Entries are read-only afterwards.
    fn freeze(&mut self) {
        let n_lights = self.n_lights;
        let min_contribution_scale = self.min_contribution_scale;
        self.hash_table.par_iter_mut().for_each(|entry| {
            if entry.packed_pos.load(Ordering::Acquire) == INVALID_PACKED_POS {
                return;
            }
            let light_contrib = std::mem::take(entry.light_contrib.get_mut().unwrap());
            entry.distribution = Some(Arc::new(SparseDistribution1D::from_contrib(
                &light_contrib,
                min_contribution_scale,
                n_lights,
            )));
        });
    }

    /// Returns the distribution of the voxel with the given packed
    /// coordinates, or the default distribution when no photon reached it.
    fn distribution(&self, packed_pos: u64, mut hash: usize) -> Arc<dyn DiscreteDistribution> {
        let hash_table_size = self.hash_table.len();
        let mut step = 1;
        loop {
            let entry = &self.hash_table[hash];
            let entry_packed_pos = entry.packed_pos.load(Ordering::Acquire);
            if entry_packed_pos == packed_pos {
                // We have a valid sampling distribution.
                break match entry.distribution.as_ref() {
                    Some(d) => Arc::clone(d) as Arc<dyn DiscreteDistribution>,
                    None => Arc::clone(&self.default_distrib) as Arc<dyn DiscreteDistribution>,
                };
            } else if entry_packed_pos == INVALID_PACKED_POS {
                // No photon arrived in this voxel; use the default
                // distribution instead.
                break Arc::clone(&self.default_distrib) as Arc<dyn DiscreteDistribution>;
            } else {
                // The hash table entry we're checking has already been
                // allocated for another voxel. Advance to the next entry with
                // quadratic probing.
                hash += step * step;
                if hash >= hash_table_size {
                    hash %= hash_table_size;
                }
                step += 1;
            }
        }
    }

    /// Blend the query voxel's distribution with up to seven axis neighbors.
    /// Along each axis the query point's position within its voxel decides
    /// the step direction and transfers a share of every collected voxel's
    /// weight to its neighbor in that direction; neighbors outside the grid
    /// are skipped.
    fn interpolated_distribution(
        &self,
        p: &Point3f,
        packed_pos: u64,
        hash: usize,
        voxel_id: &Point3i,
    ) -> Arc<dyn DiscreteDistribution> {
        let n_voxels = self.grid.n_voxels();

        let mut distributions = vec![self.distribution(packed_pos, hash)];
        let mut voxel_ids = vec![*voxel_id];
        let mut influence: Vec<Float> = vec![1.0];

        for i in 0..3 {
            let offset_in_voxel = self.grid.offset_in_voxel(p, i);
            if offset_in_voxel == 0.0 {
                // No influence along this axis.
                continue;
            }
            let size = voxel_ids.len();
            for n in 0..size {
                let mut new_id = voxel_ids[n];
                // Go a voxel back or forth.
                new_id[i] += if offset_in_voxel > 0.0 { 1 } else { -1 };

                // On a grid boundary there is nothing to interpolate into
                // along this direction.
                if new_id[i] >= 0 && new_id[i] < n_voxels[i] as Int {
                    let new_packed_pos = self.grid.pack(&new_id);
                    let new_hash = self.grid.hash(new_packed_pos);
                    distributions.push(self.distribution(new_packed_pos, new_hash));
                    voxel_ids.push(new_id);
                    influence.push(influence[n] * offset_in_voxel.abs());

                    influence[n] *= 1.0 - offset_in_voxel.abs();
                }
            }
        }

        Arc::new(InterpolatedDistribution1D::new(influence, distributions))
    }
}

impl LightDistribution for PhotonVoxelLightDistribution {
    /// Given a point |p| in space, this method returns a (hopefully effective)
    /// sampling distribution for light sources at that point.
    fn lookup(&self, p: &Point3f, _n: &Normal3f) -> Option<Arc<dyn DiscreteDistribution>> {
        let voxel_id = self.grid.voxel_of(p);
        let packed_pos = self.grid.pack(&voxel_id);
        let hash = self.grid.hash(packed_pos);

        if self.interpolate_cdf {
            Some(self.interpolated_distribution(p, packed_pos, hash, &voxel_id))
        } else {
            Some(self.distribution(packed_pos, hash))
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn params(interpolate_cdf: bool, max_voxels: Int) -> ParamSet {
        let mut params = ParamSet::new();
        params.add_bool("interpolateCdf", &[interpolate_cdf]);
        params.add_int("maxVoxels", &[max_voxels]);
        params
    }

    fn photon(p: Point3f, beta: Float, light_num: usize) -> Photon {
        Photon {
            p,
            beta,
            light_num: Some(light_num),
        }
    }

    #[test]
    fn voxel_with_photons_from_one_light_concentrates_on_it() {
        let min_contribution_scale = 0.001;
        let n_lights = 2;
        let dist = PhotonVoxelLightDistribution::from_photons(
            &[
                photon(Point3f::new(0.1, 0.1, 0.1), 1.0, 0),
                photon(Point3f::new(0.15, 0.1, 0.1), 2.0, 0),
                photon(Point3f::new(0.9, 0.9, 0.9), 1.0, 1),
            ],
            n_lights,
            unit_bounds(),
            &params(false, 4),
        );
        let d = dist
            .lookup(&Point3f::new(0.1, 0.1, 0.1), &Normal3f::ZERO)
            .unwrap();
        let expected = 1.0 - min_contribution_scale + min_contribution_scale / n_lights as Float;
        assert!((d.discrete_pdf(0) - expected).abs() < 1e-5);
        assert!(d.discrete_pdf(1) >= min_contribution_scale / n_lights as Float);
    }

    #[test]
    fn empty_voxels_fall_back_to_uniform() {
        let dist = PhotonVoxelLightDistribution::from_photons(
            &[photon(Point3f::new(0.1, 0.1, 0.1), 1.0, 0)],
            4,
            unit_bounds(),
            &params(false, 4),
        );
        let d = dist
            .lookup(&Point3f::new(0.9, 0.9, 0.9), &Normal3f::ZERO)
            .unwrap();
        for i in 0..4 {
            assert!((d.discrete_pdf(i) - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn all_photons_missing_degrades_to_uniform_everywhere() {
        let dist = PhotonVoxelLightDistribution::from_photons(
            &[Photon::default(), Photon::default()],
            3,
            unit_bounds(),
            &params(true, 4),
        );
        let d = dist
            .lookup(&Point3f::new(0.4, 0.6, 0.5), &Normal3f::ZERO)
            .unwrap();
        for i in 0..3 {
            assert!((d.discrete_pdf(i) - 1.0 / 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn interpolated_lookup_blends_neighbor_voxels() {
        // Photons of light 0 fill the voxel at x in [0, 0.5); photons of
        // light 1 the voxel at x in [0.5, 1). A query near the shared face
        // mixes both; a query in the center of the first voxel does not.
        let min_contribution_scale = 0.001;
        let dist = PhotonVoxelLightDistribution::from_photons(
            &[
                photon(Point3f::new(0.25, 0.25, 0.25), 1.0, 0),
                photon(Point3f::new(0.75, 0.25, 0.25), 1.0, 1),
            ],
            2,
            Bounds3f::new(Point3f::ZERO, Point3f::new(1.0, 0.5, 0.5)),
            &params(true, 2),
        );

        // Near the face between the two voxels.
        let d = dist
            .lookup(&Point3f::new(0.45, 0.25, 0.25), &Normal3f::ZERO)
            .unwrap();
        let p0 = d.discrete_pdf(0);
        let p1 = d.discrete_pdf(1);
        assert!(p0 > p1, "query in voxel 0 still favors light 0");
        assert!(p1 > min_contribution_scale, "neighbor blend gives light 1 real mass");

        // At a voxel center no neighbor weight transfers along x.
        let d = dist
            .lookup(&Point3f::new(0.25, 0.25, 0.25), &Normal3f::ZERO)
            .unwrap();
        assert!(d.discrete_pdf(0) > 0.9);
    }

    #[test]
    fn point_lookup_matches_photon_deposition_voxel() {
        let dist = PhotonVoxelLightDistribution::from_photons(
            &[photon(Point3f::new(0.6, 0.1, 0.1), 3.0, 1)],
            2,
            unit_bounds(),
            &params(false, 4),
        );
        // Any point of the voxel containing the photon sees its light.
        let d = dist
            .lookup(&Point3f::new(0.55, 0.05, 0.2), &Normal3f::ZERO)
            .unwrap();
        assert!(d.discrete_pdf(1) > 0.9);
    }

    #[test]
    fn filling_every_voxel_keeps_probing_bounded() {
        // One photon in the center of each voxel of a 4x4x4 grid; every
        // deposit and lookup must terminate within the probe bound.
        let mut photons = Vec::new();
        for x in 0..4 {
            for y in 0..4 {
                for z in 0..4 {
                    let p = Point3f::new(
                        (x as Float + 0.5) / 4.0,
                        (y as Float + 0.5) / 4.0,
                        (z as Float + 0.5) / 4.0,
                    );
                    photons.push(photon(p, 1.0, (x + y + z) % 2));
                }
            }
        }
        let dist = PhotonVoxelLightDistribution::from_photons(
            &photons,
            2,
            unit_bounds(),
            &params(false, 4),
        );
        for p in photons.iter() {
            let d = dist.lookup(&p.p, &Normal3f::ZERO).unwrap();
            let light_num = p.light_num.unwrap();
            assert!(d.discrete_pdf(light_num) > 0.9);
        }
    }

    #[test]
    fn shot_photons_populate_the_table() {
        let scene = spot_floor_scene();
        let mut params = params(false, 4);
        params.add_int("photonCount", &[4096]);
        let dist = PhotonVoxelLightDistribution::new(&params, &scene);

        // Voxels under the left spot see only light 0, voxels under the
        // right spot only light 1.
        let d = dist
            .lookup(&Point3f::new(0.25, 0.01, 0.5), &Normal3f::ZERO)
            .unwrap();
        assert!(d.discrete_pdf(0) > 0.99);
        let d = dist
            .lookup(&Point3f::new(0.75, 0.01, 0.5), &Normal3f::ZERO)
            .unwrap();
        assert!(d.discrete_pdf(1) > 0.99);
    }
}
