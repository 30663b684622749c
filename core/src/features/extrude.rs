use super::convert::sketch_to_wire;
use super::params::{self, ParameterStore};
use super::types::{FeatureBase, FeatureError, FeatureOps, FeatureType};
use crate::geometry::Vector3;
use crate::kernel::GeometryKernel;
use crate::sketch::{SharedSketch, SketchPlane};
use tracing::trace;

/// Linear extrusion of a closed sketch profile along its plane normal.
#[derive(Debug, Clone)]
pub struct ExtrudeFeature {
    base: FeatureBase,
    sketch: Option<SharedSketch>,
    /// Placement override; the sketch's own plane is used when unset.
    plane: Option<SketchPlane>,
}

impl Default for ExtrudeFeature {
    fn default() -> Self {
        Self::new("Extrude")
    }
}

impl ExtrudeFeature {
    pub fn new(name: &str) -> Self {
        Self {
            base: FeatureBase::new(
                name,
                FeatureType::Extrude,
                &[
                    (params::DISTANCE, 10.0),
                    (params::DIRECTION_X, 0.0),
                    (params::DIRECTION_Y, 0.0),
                    (params::DIRECTION_Z, 1.0),
                    (params::TAPER_ANGLE, 0.0),
                    (params::MIDPLANE, 0.0),
                ],
            ),
            sketch: None,
            plane: None,
        }
    }

    pub fn with_sketch(mut self, sketch: SharedSketch) -> Self {
        self.sketch = Some(sketch);
        self
    }

    pub fn set_sketch(&mut self, sketch: SharedSketch) {
        self.sketch = Some(sketch);
    }

    pub fn sketch(&self) -> Option<&SharedSketch> {
        self.sketch.as_ref()
    }

    pub fn set_sketch_plane(&mut self, plane: SketchPlane) {
        self.plane = Some(plane);
    }

    pub fn sketch_plane(&self) -> Option<&SketchPlane> {
        self.plane.as_ref()
    }

    fn store(&self) -> &ParameterStore {
        &self.base.parameters
    }

    /// Signed extrusion length; negative values extrude against the normal.
    pub fn distance(&self) -> f64 {
        self.store().value(params::DISTANCE)
    }

    pub fn set_distance(&mut self, distance: f64) {
        self.base.parameters.set(params::DISTANCE, distance);
    }

    pub fn direction(&self) -> Vector3 {
        Vector3::new(
            self.store().value(params::DIRECTION_X),
            self.store().value(params::DIRECTION_Y),
            self.store().value(params::DIRECTION_Z),
        )
    }

    pub fn set_direction(&mut self, direction: Vector3) {
        self.base.parameters.set(params::DIRECTION_X, direction.x);
        self.base.parameters.set(params::DIRECTION_Y, direction.y);
        self.base.parameters.set(params::DIRECTION_Z, direction.z);
    }

    pub fn taper_angle(&self) -> f64 {
        self.store().value(params::TAPER_ANGLE)
    }

    pub fn set_taper_angle(&mut self, angle: f64) {
        self.base.parameters.set(params::TAPER_ANGLE, angle);
    }

    pub fn is_midplane(&self) -> bool {
        self.store().flag(params::MIDPLANE)
    }

    pub fn set_midplane(&mut self, midplane: bool) {
        self.base.parameters.set_flag(params::MIDPLANE, midplane);
    }
}

impl FeatureOps for ExtrudeFeature {
    fn base(&self) -> &FeatureBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FeatureBase {
        &mut self.base
    }

    fn check_parameters(&self) -> Result<(), FeatureError> {
        let sketch = self
            .sketch
            .as_ref()
            .ok_or_else(|| FeatureError::ParameterInvalid("no profile sketch".into()))?;
        if sketch.read().is_empty() {
            return Err(FeatureError::ParameterInvalid("profile sketch is empty".into()));
        }
        let distance = self.distance();
        if !distance.is_finite() || distance.abs() < 1e-9 {
            return Err(FeatureError::ParameterInvalid(format!("distance {}", distance)));
        }
        let length = self.direction().norm();
        if !(length >= 1e-10) {
            return Err(FeatureError::ParameterInvalid(format!("direction length {}", length)));
        }
        Ok(())
    }

    fn construct<K: GeometryKernel>(&self, kernel: &K) -> Result<K::Body, FeatureError> {
        let shared = self
            .sketch
            .as_ref()
            .ok_or_else(|| FeatureError::ParameterInvalid("no profile sketch".into()))?;
        let sketch = shared.read();
        let plane = self.plane.as_ref().unwrap_or_else(|| sketch.plane());

        let wire = sketch_to_wire(kernel, &sketch, plane, self.base.config.coincidence_tolerance)?;
        if !kernel.is_closed(&wire) {
            return Err(FeatureError::NonManifoldProfile(format!(
                "profile of sketch '{}' is not closed",
                sketch.name()
            )));
        }
        let face = kernel
            .planar_face(&wire)
            .map_err(|e| FeatureError::from_kernel("profile face", e))?;

        if self.taper_angle() != 0.0 || self.is_midplane() {
            trace!(
                taper = self.taper_angle(),
                midplane = self.is_midplane(),
                "taper and midplane are not applied"
            );
        }
        let vector = plane.unit_normal().into_inner() * self.distance();
        kernel
            .linear_sweep(&face, &vector)
            .map_err(|e| FeatureError::from_kernel("extrude", e))
    }
}
