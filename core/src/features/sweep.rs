use super::convert::sketch_to_wire;
use super::params;
use super::types::{FeatureBase, FeatureError, FeatureOps, FeatureType};
use crate::kernel::GeometryKernel;
use crate::sketch::{SharedSketch, SketchPlane};
use tracing::trace;

/// Sweep of a profile sketch along a path sketch.
#[derive(Debug, Clone)]
pub struct SweepFeature {
    base: FeatureBase,
    profile: Option<SharedSketch>,
    profile_plane: Option<SketchPlane>,
    path: Option<SharedSketch>,
    path_plane: Option<SketchPlane>,
}

impl Default for SweepFeature {
    fn default() -> Self {
        Self::new("Sweep")
    }
}

impl SweepFeature {
    pub fn new(name: &str) -> Self {
        Self {
            base: FeatureBase::new(
                name,
                FeatureType::Sweep,
                &[
                    (params::TWIST_ANGLE, 0.0),
                    (params::SCALE_FACTOR, 1.0),
                    (params::KEEP_ORIENTATION, 1.0),
                ],
            ),
            profile: None,
            profile_plane: None,
            path: None,
            path_plane: None,
        }
    }

    pub fn set_profile(&mut self, profile: SharedSketch) {
        self.profile = Some(profile);
    }

    pub fn profile(&self) -> Option<&SharedSketch> {
        self.profile.as_ref()
    }

    pub fn set_profile_plane(&mut self, plane: SketchPlane) {
        self.profile_plane = Some(plane);
    }

    pub fn profile_plane(&self) -> Option<&SketchPlane> {
        self.profile_plane.as_ref()
    }

    pub fn set_path(&mut self, path: SharedSketch) {
        self.path = Some(path);
    }

    pub fn path(&self) -> Option<&SharedSketch> {
        self.path.as_ref()
    }

    pub fn set_path_plane(&mut self, plane: SketchPlane) {
        self.path_plane = Some(plane);
    }

    pub fn path_plane(&self) -> Option<&SketchPlane> {
        self.path_plane.as_ref()
    }

    pub fn twist_angle(&self) -> f64 {
        self.base.parameters.value(params::TWIST_ANGLE)
    }

    pub fn set_twist_angle(&mut self, angle: f64) {
        self.base.parameters.set(params::TWIST_ANGLE, angle);
    }

    pub fn scale_factor(&self) -> f64 {
        self.base.parameters.value(params::SCALE_FACTOR)
    }

    pub fn set_scale_factor(&mut self, factor: f64) {
        self.base.parameters.set(params::SCALE_FACTOR, factor);
    }

    pub fn keeps_orientation(&self) -> bool {
        self.base.parameters.flag(params::KEEP_ORIENTATION)
    }

    pub fn set_keep_orientation(&mut self, keep: bool) {
        self.base.parameters.set_flag(params::KEEP_ORIENTATION, keep);
    }

    pub fn is_profile_valid(&self) -> bool {
        self.profile.as_ref().map_or(false, |p| !p.read().is_empty())
    }

    pub fn is_path_valid(&self) -> bool {
        self.path.as_ref().map_or(false, |p| !p.read().is_empty())
    }

    fn wire<K: GeometryKernel>(
        &self,
        kernel: &K,
        role: &str,
        sketch: Option<&SharedSketch>,
        plane: Option<&SketchPlane>,
    ) -> Result<K::Wire, FeatureError> {
        let shared = sketch.ok_or_else(|| FeatureError::ParameterInvalid(format!("no {} sketch", role)))?;
        let sketch = shared.read();
        let plane = plane.unwrap_or_else(|| sketch.plane());
        sketch_to_wire(kernel, &sketch, plane, self.base.config.coincidence_tolerance)
    }
}

impl FeatureOps for SweepFeature {
    fn base(&self) -> &FeatureBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FeatureBase {
        &mut self.base
    }

    fn check_parameters(&self) -> Result<(), FeatureError> {
        if !self.is_profile_valid() {
            return Err(FeatureError::ParameterInvalid("profile sketch missing or empty".into()));
        }
        if !self.is_path_valid() {
            return Err(FeatureError::ParameterInvalid("path sketch missing or empty".into()));
        }
        let scale = self.scale_factor();
        if !(scale > 0.0) {
            return Err(FeatureError::ParameterInvalid(format!("scale factor {}", scale)));
        }
        Ok(())
    }

    fn construct<K: GeometryKernel>(&self, kernel: &K) -> Result<K::Body, FeatureError> {
        let profile = self.wire(kernel, "profile", self.profile.as_ref(), self.profile_plane.as_ref())?;
        let path = self.wire(kernel, "path", self.path.as_ref(), self.path_plane.as_ref())?;
        trace!(
            twist = self.twist_angle(),
            scale = self.scale_factor(),
            keep_orientation = self.keeps_orientation(),
            "sweeping profile along path"
        );
        kernel
            .pipe(&path, &profile)
            .map_err(|e| FeatureError::from_kernel("sweep", e))
    }
}
