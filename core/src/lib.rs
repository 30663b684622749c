pub mod config;
pub mod features;
pub mod geometry;
pub mod ids;
pub mod kernel;
pub mod shape;
pub mod sketch;

pub use config::{ConfigError, ModelingConfig};
pub use features::{Feature, FeatureError, FeatureOps, FeatureType};
pub use kernel::{AnalyticKernel, GeometryKernel, KernelOpError, KernelResult, TruckKernel};
pub use shape::{Shape, ShapeProperties};
pub use sketch::{SharedSketch, Sketch, SketchPlane};
