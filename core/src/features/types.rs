use super::extrude::ExtrudeFeature;
use super::loft::LoftFeature;
use super::params::ParameterStore;
use super::sweep::SweepFeature;
use crate::config::ModelingConfig;
use crate::ids::EntityId;
use crate::kernel::{GeometryKernel, KernelOpError};
use crate::shape::Shape;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a feature could not produce a shape.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Invalid parameters: {0}")]
    ParameterInvalid(String),

    #[error("Empty or degenerate wire: {0}")]
    EmptyOrDegenerateWire(String),

    /// Profile edges do not form one connected (closed, where required) wire.
    #[error("Non-manifold profile: {0}")]
    NonManifoldProfile(String),

    #[error("Kernel construction failed: {0}")]
    KernelConstructionFailed(String),

    /// The kernel faulted or panicked mid-construction.
    #[error("Kernel exception: {0}")]
    KernelException(String),
}

impl FeatureError {
    /// Classify a kernel error raised by a construction primitive.
    pub fn from_kernel(stage: &str, err: KernelOpError) -> Self {
        match err {
            KernelOpError::Fault(msg) => FeatureError::KernelException(format!("{}: {}", stage, msg)),
            KernelOpError::DisconnectedWire(index) => FeatureError::NonManifoldProfile(format!(
                "{}: edge {} does not connect",
                stage, index
            )),
            other => FeatureError::KernelConstructionFailed(format!("{}: {}", stage, other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureType {
    Extrude,
    Loft,
    Sweep,
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureType::Extrude => "Extrude",
            FeatureType::Loft => "Loft",
            FeatureType::Sweep => "Sweep",
        };
        f.write_str(name)
    }
}

/// State shared by every feature variant.
#[derive(Debug, Clone)]
pub struct FeatureBase {
    pub id: EntityId,
    pub name: String,
    pub feature_type: FeatureType,
    pub parameters: ParameterStore,
    pub config: ModelingConfig,
}

impl FeatureBase {
    pub fn new(name: &str, feature_type: FeatureType, defaults: &[(&str, f64)]) -> Self {
        Self {
            id: EntityId::new(),
            name: name.to_string(),
            feature_type,
            parameters: ParameterStore::with_defaults(defaults),
            config: ModelingConfig::default(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "kernel panicked".to_string()
    }
}

/// Common behaviour of the parametric features.
///
/// Implementors provide parameter checks and the kernel construction
/// sequence; validation gating, panic interception and the nullable
/// `create_shape` contract are shared.
pub trait FeatureOps {
    fn base(&self) -> &FeatureBase;

    fn base_mut(&mut self) -> &mut FeatureBase;

    /// Check parameters and sketch references without touching the kernel.
    fn check_parameters(&self) -> Result<(), FeatureError>;

    /// Run the kernel construction. Only called after a successful check.
    fn construct<K: GeometryKernel>(&self, kernel: &K) -> Result<K::Body, FeatureError>;

    fn validate_parameters(&self) -> bool {
        self.check_parameters().is_ok()
    }

    fn build<K: GeometryKernel>(&self, kernel: &K) -> Result<Shape<K::Body>, FeatureError> {
        self.check_parameters()?;
        let body = panic::catch_unwind(AssertUnwindSafe(|| self.construct(kernel)))
            .map_err(|payload| FeatureError::KernelException(panic_message(&*payload)))??;
        Ok(Shape::new(self.feature_type(), body))
    }

    /// Build the shape, or `None` when validation or construction fails.
    fn create_shape<K: GeometryKernel>(&self, kernel: &K) -> Option<Shape<K::Body>> {
        match self.build(kernel) {
            Ok(shape) => {
                debug!(feature = %self.name(), kind = %self.feature_type(), "shape created");
                Some(shape)
            }
            Err(err @ FeatureError::ParameterInvalid(_)) => {
                debug!(feature = %self.name(), error = %err, "feature not constructed");
                None
            }
            Err(err) => {
                warn!(feature = %self.name(), kind = %self.feature_type(), error = %err, "construction failed");
                None
            }
        }
    }

    fn id(&self) -> EntityId {
        self.base().id
    }

    fn name(&self) -> &str {
        &self.base().name
    }

    fn set_name(&mut self, name: &str) {
        self.base_mut().name = name.to_string();
    }

    fn feature_type(&self) -> FeatureType {
        self.base().feature_type
    }

    fn parameter(&self, key: &str) -> Option<f64> {
        self.base().parameters.get(key)
    }

    fn set_parameter(&mut self, key: &str, value: f64) {
        self.base_mut().parameters.set(key, value);
    }

    fn parameters(&self) -> &ParameterStore {
        &self.base().parameters
    }

    fn config(&self) -> &ModelingConfig {
        &self.base().config
    }

    fn set_config(&mut self, config: ModelingConfig) {
        self.base_mut().config = config;
    }
}

/// Any of the supported features.
#[derive(Debug, Clone)]
pub enum Feature {
    Extrude(ExtrudeFeature),
    Loft(LoftFeature),
    Sweep(SweepFeature),
}

impl FeatureOps for Feature {
    fn base(&self) -> &FeatureBase {
        match self {
            Feature::Extrude(f) => f.base(),
            Feature::Loft(f) => f.base(),
            Feature::Sweep(f) => f.base(),
        }
    }

    fn base_mut(&mut self) -> &mut FeatureBase {
        match self {
            Feature::Extrude(f) => f.base_mut(),
            Feature::Loft(f) => f.base_mut(),
            Feature::Sweep(f) => f.base_mut(),
        }
    }

    fn check_parameters(&self) -> Result<(), FeatureError> {
        match self {
            Feature::Extrude(f) => f.check_parameters(),
            Feature::Loft(f) => f.check_parameters(),
            Feature::Sweep(f) => f.check_parameters(),
        }
    }

    fn construct<K: GeometryKernel>(&self, kernel: &K) -> Result<K::Body, FeatureError> {
        match self {
            Feature::Extrude(f) => f.construct(kernel),
            Feature::Loft(f) => f.construct(kernel),
            Feature::Sweep(f) => f.construct(kernel),
        }
    }
}

impl From<ExtrudeFeature> for Feature {
    fn from(f: ExtrudeFeature) -> Self {
        Feature::Extrude(f)
    }
}

impl From<LoftFeature> for Feature {
    fn from(f: LoftFeature) -> Self {
        Feature::Loft(f)
    }
}

impl From<SweepFeature> for Feature {
    fn from(f: SweepFeature) -> Self {
        Feature::Sweep(f)
    }
}
