//! Photon shooting shared by the photon-based light distributions.

use super::compute_light_power_distribution;
use crate::geometry::*;
use crate::light::Le;
use crate::low_discrepency::radical_inverse;
use crate::paramset::*;
use crate::pbrt::*;
use crate::sampling::*;
use crate::scene::*;
use crate::spectrum::*;
use crate::{stat_counter, stat_inc, stat_register_fns, stats::*};
use rayon::prelude::*;

stat_counter!("Photons/Photons shot", N_PHOTONS_SHOT, photon_stats_n_shot);
stat_counter!(
    "Photons/Photons stored",
    N_PHOTONS_STORED,
    photon_stats_n_stored,
);

stat_register_fns!(photon_stats_n_shot, photon_stats_n_stored);

/// Photon batches are traced in parallel chunks of this many indices.
pub(crate) const PHOTON_CHUNK_SIZE: usize = 4096;

/// A light path truncated at its first surface hit: the hit position, the
/// scalar throughput the photon carried there and the light it left from.
/// A photon whose path never found a surface carries no light number.
#[derive(Clone, Default)]
pub struct Photon {
    /// First surface hit position.
    pub p: Point3f,

    /// Scalar radiance-weighted throughput at the hit.
    pub beta: Float,

    /// Index of the originating light; `None` for photons that left the
    /// scene without hitting anything.
    pub light_num: Option<usize>,
}

/// Returns the distribution used to pick the light each photon leaves from,
/// selected by the `photonsampling` parameter: uniform over the lights
/// (`"uni"`, the default) or proportional to emitted power (`"power"`).
///
/// * `params` - The strategy parameters.
/// * `scene`  - The scene.
pub(crate) fn photon_sampling_distribution(params: &ParamSet, scene: &Scene) -> Distribution1D {
    if params.find_one_string("photonsampling", String::from("uni")) == "uni" {
        Distribution1D::new(vec![1.0; scene.lights.len()])
    } else {
        compute_light_power_distribution(scene)
            .unwrap_or_else(|| Distribution1D::new(vec![1.0; scene.lights.len()]))
    }
}

/// Follow the photon path for `photon_index` up to its first surface hit.
/// All sample values are taken from the low-discrepancy sequence at the
/// photon index, so the result depends on nothing but the inputs.
///
/// * `scene`          - The scene.
/// * `photon_distrib` - Distribution used to pick the light to shoot from.
/// * `photon_index`   - Index of the photon in the batch.
pub(crate) fn trace_photon(
    scene: &Scene,
    photon_distrib: &Distribution1D,
    photon_index: usize,
) -> Photon {
    let halton_index = photon_index as u64;
    let mut halton_dim = 0;

    // Choose light to shoot photon from.
    let light_sample = radical_inverse(halton_dim, halton_index);
    halton_dim += 1;
    let (light_num, light_pdf, _u_remapped) = photon_distrib.sample_discrete(light_sample);
    let light = &scene.lights[light_num];

    // Compute sample values for photon ray leaving light source. Dimension
    // `halton_dim + 4` is reserved for the shutter time, which is not
    // available to this subsystem; photons are traced at t = 0.
    let u_light_0 = Point2f::new(
        radical_inverse(halton_dim, halton_index),
        radical_inverse(halton_dim + 1, halton_index),
    );
    let u_light_1 = Point2f::new(
        radical_inverse(halton_dim + 2, halton_index),
        radical_inverse(halton_dim + 3, halton_index),
    );
    let u_light_time = 0.0;

    // Generate photon ray from light source and initialize beta.
    let Le {
        ray,
        n_light,
        pdf_pos,
        pdf_dir,
        value: le,
    } = light.sample_le(&u_light_0, &u_light_1, u_light_time);
    if pdf_pos == 0.0 || pdf_dir == 0.0 || le.is_black() {
        return Photon::default();
    }
    let beta = (n_light.abs_dot(&ray.d) * le) / (light_pdf * pdf_pos * pdf_dir);
    if beta.is_black() {
        return Photon::default();
    }
    let fbeta = beta.sum();

    // Follow photon through the scene and record the first intersection.
    let mut photon_ray = ray;
    match scene.intersect(&mut photon_ray) {
        Some(isect) => Photon {
            p: isect.hit.p,
            beta: fbeta,
            light_num: Some(light_num),
        },
        None => Photon::default(),
    }
}

/// Shoot a batch of `photon_count` photons in parallel and collect their
/// first-hit records. The record at index i depends only on photon index i,
/// the scene and the photon distribution, so repeated batches are identical.
///
/// * `scene`          - The scene.
/// * `photon_distrib` - Distribution used to pick the light to shoot from.
/// * `photon_count`   - Number of photons to shoot.
pub(crate) fn shoot_photons(
    scene: &Scene,
    photon_distrib: &Distribution1D,
    photon_count: usize,
) -> Vec<Photon> {
    register_stats();

    let mut photons = vec![Photon::default(); photon_count];
    photons
        .par_chunks_mut(PHOTON_CHUNK_SIZE)
        .enumerate()
        .for_each(|(chunk, slots)| {
            for (i, slot) in slots.iter_mut().enumerate() {
                let photon_index = chunk * PHOTON_CHUNK_SIZE + i;
                *slot = trace_photon(scene, photon_distrib, photon_index);
                stat_inc!(N_PHOTONS_SHOT, 1);
                if slot.light_num.is_some() {
                    stat_inc!(N_PHOTONS_STORED, 1);
                }
            }
        });
    photons
}

/// The weighting kernels applied to gathered photons or photon clusters by
/// distance to the query point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterpolationKernel {
    /// Inverse distance weighting.
    Shepard,

    /// Shepard weights modified to fall to zero at the gather radius.
    ModShep,

    /// Gaussian kernel regression with a fixed bandwidth.
    KReg,

    /// Gaussian kernel regression with the bandwidth adapted to the gather
    /// radius.
    AdKReg,

    /// No distance weighting; raw throughput sums.
    None,
}

impl From<&str> for InterpolationKernel {
    /// Returns an `InterpolationKernel` given a string name.
    fn from(name: &str) -> Self {
        match name {
            "shepard" => Self::Shepard,
            "modshep" => Self::ModShep,
            "kreg" => Self::KReg,
            "adkreg" => Self::AdKReg,
            "none" => Self::None,
            _ => {
                error!(
                    "Photon interpolation kernel '{}' unknown. Using 'shepard'.",
                    name
                );
                Self::Shepard
            }
        }
    }
}

/// Distances closer than this (squared) are clamped so inverse-distance
/// weights stay finite for queries that land exactly on a photon or
/// centroid.
pub(crate) const MIN_DIST_SQUARED: Float = 1e-4;

/// Smallest inverse-distance denominator for the Shepard kernels.
const MIN_SHEPARD_DENOM: Float = 0.001;

/// Evaluate the kernel for each match of a gather query. Matches carry the
/// squared distance to the query point, as the spatial index reports them.
///
/// * `kernel`     - The weighting kernel.
/// * `matches`    - `(index, squared distance)` gather results.
/// * `int_smooth` - Kernel smoothing parameter.
pub(crate) fn kernel_values(
    kernel: InterpolationKernel,
    matches: &[(usize, Float)],
    int_smooth: Float,
) -> Vec<Float> {
    match kernel {
        InterpolationKernel::Shepard => matches
            .iter()
            .map(|(_, d2)| 1.0 / max(MIN_SHEPARD_DENOM, d2.powf(int_smooth)))
            .collect(),
        InterpolationKernel::ModShep => {
            let max_r = matches
                .iter()
                .fold(0.0 as Float, |m, (_, d2)| max(m, *d2))
                .powf(int_smooth);
            matches
                .iter()
                .map(|(_, d2)| {
                    let d = max(MIN_SHEPARD_DENOM, d2.powf(int_smooth));
                    ((max_r - d) / (max_r * d)).powi(2)
                })
                .collect()
        }
        InterpolationKernel::KReg => matches
            .iter()
            .map(|(_, d2)| (-(d2.sqrt() / int_smooth).powi(2)).exp())
            .collect(),
        InterpolationKernel::AdKReg => {
            let max_r = matches
                .iter()
                .fold(0.0 as Float, |m, (_, d2)| max(m, *d2))
                .sqrt();
            let p = max_r / (-int_smooth.ln()).sqrt();
            matches
                .iter()
                .map(|(_, d2)| (-(d2.sqrt() / p).powi(2)).exp() - int_smooth)
                .collect()
        }
        InterpolationKernel::None => vec![1.0; matches.len()],
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn kernel_names_resolve() {
        for (name, kernel) in [
            ("shepard", InterpolationKernel::Shepard),
            ("modshep", InterpolationKernel::ModShep),
            ("kreg", InterpolationKernel::KReg),
            ("adkreg", InterpolationKernel::AdKReg),
            ("none", InterpolationKernel::None),
        ] {
            assert_eq!(InterpolationKernel::from(name), kernel);
        }
        assert_eq!(
            InterpolationKernel::from("bogus"),
            InterpolationKernel::Shepard
        );
    }

    #[test]
    fn shepard_weights_decrease_with_distance() {
        let matches = [(0, 0.01), (1, 0.25), (2, 4.0)];
        let w = kernel_values(InterpolationKernel::Shepard, &matches, 1.0);
        assert!(w[0] > w[1] && w[1] > w[2]);
        assert!(w.iter().all(|v| v.is_finite() && *v > 0.0));
    }

    #[test]
    fn shepard_weight_is_clamped_at_zero_distance() {
        let w = kernel_values(InterpolationKernel::Shepard, &[(0, 0.0)], 1.0);
        assert_eq!(w[0], 1.0 / 0.001);
    }

    #[test]
    fn modshep_vanishes_at_the_gather_radius() {
        let matches = [(0, 0.25), (1, 1.0)];
        let w = kernel_values(InterpolationKernel::ModShep, &matches, 1.0);
        assert!(w[0] > 0.0);
        assert!(w[1].abs() < 1e-6);
    }

    #[test]
    fn kreg_is_gaussian_in_distance() {
        let matches = [(0, 0.0), (1, 1.0)];
        let w = kernel_values(InterpolationKernel::KReg, &matches, 1.0);
        assert!((w[0] - 1.0).abs() < 1e-6);
        assert!((w[1] - (-1.0 as Float).exp()).abs() < 1e-6);
    }

    #[test]
    fn none_kernel_weights_equally() {
        let matches = [(0, 0.01), (1, 9.0)];
        let w = kernel_values(InterpolationKernel::None, &matches, 1.0);
        assert_eq!(w, vec![1.0, 1.0]);
    }

    #[test]
    fn photon_shooting_is_deterministic() {
        let scene = floor_scene_with_two_lights();
        let distrib = Distribution1D::new(vec![1.0; scene.lights.len()]);
        let a = shoot_photons(&scene, &distrib, 2000);
        let b = shoot_photons(&scene, &distrib, 2000);
        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert_eq!(pa.p, pb.p);
            assert_eq!(pa.beta, pb.beta);
            assert_eq!(pa.light_num, pb.light_num);
        }
    }

    #[test]
    fn photons_land_on_the_floor() {
        let scene = floor_scene_with_two_lights();
        let distrib = Distribution1D::new(vec![1.0; scene.lights.len()]);
        let photons = shoot_photons(&scene, &distrib, 2000);
        let hits: Vec<&Photon> = photons.iter().filter(|p| p.light_num.is_some()).collect();
        assert!(!hits.is_empty());
        for photon in hits {
            assert!(photon.p.y.abs() < 1e-4);
            assert!(photon.beta > 0.0);
        }
    }

    #[test]
    fn all_photons_miss_in_an_empty_scene() {
        let scene = no_geometry_scene();
        let distrib = Distribution1D::new(vec![1.0; scene.lights.len()]);
        let photons = shoot_photons(&scene, &distrib, 512);
        assert!(photons.iter().all(|p| p.light_num.is_none()));
    }
}
