//! Spatially-varying light sampling distributions.
//!
//! For every surface intersection an integrator produces, this crate returns
//! a discrete probability distribution over the scene's light sources that
//! approximates each light's contribution at that point. Six strategies are
//! provided behind the [`light_distrib::LightDistribution`] trait; see
//! [`light_distrib::create_light_sample_distribution`] for strategy selection.

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

// Re-export.
pub mod geometry;
pub mod interaction;
pub mod light;
pub mod light_distrib;
pub mod lights;
pub mod low_discrepency;
pub mod paramset;
pub mod pbrt;
pub mod primitive;
pub mod rng;
pub mod sampling;
pub mod scene;
pub mod spatial;
pub mod spectrum;
pub mod stats;

#[cfg(test)]
pub mod testing;
