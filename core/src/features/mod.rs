//! Parametric features that turn sketches into kernel bodies.
//!
//! Every feature follows the same protocol: validate parameters, convert the
//! referenced sketches into wires, then run one kernel primitive. Any failure
//! along the way collapses to `None` in [`FeatureOps::create_shape`].

pub mod convert;
pub mod params;
pub mod types;
mod extrude;
mod loft;
mod sweep;

#[cfg(test)]
mod tests_loft;
#[cfg(test)]
pub(crate) mod test_support;

pub use convert::sketch_to_wire;
pub use extrude::ExtrudeFeature;
pub use loft::LoftFeature;
pub use params::ParameterStore;
pub use sweep::SweepFeature;
pub use types::*;
