use super::convert::sketch_to_wire;
use super::params;
use super::types::{FeatureBase, FeatureError, FeatureOps, FeatureType};
use crate::kernel::{GeometryKernel, LoftOptions};
use crate::sketch::SharedSketch;
use std::sync::Arc;
use tracing::debug;

/// Skin through an ordered list of section sketches.
///
/// Each section is placed on its own sketch plane. Guide curves are checked
/// for validity but do not steer the surface.
#[derive(Debug, Clone)]
pub struct LoftFeature {
    base: FeatureBase,
    sections: Vec<SharedSketch>,
    guide_curves: Vec<SharedSketch>,
}

impl Default for LoftFeature {
    fn default() -> Self {
        Self::new("Loft")
    }
}

impl LoftFeature {
    pub fn new(name: &str) -> Self {
        Self {
            base: FeatureBase::new(
                name,
                FeatureType::Loft,
                &[(params::SOLID, 1.0), (params::RULED, 0.0), (params::CLOSED, 0.0)],
            ),
            sections: Vec::new(),
            guide_curves: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: SharedSketch) {
        self.sections.push(section);
    }

    /// Remove the first occurrence of `section` (compared by handle).
    pub fn remove_section(&mut self, section: &SharedSketch) -> bool {
        match self.sections.iter().position(|s| Arc::ptr_eq(s, section)) {
            Some(idx) => {
                self.sections.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear_sections(&mut self) {
        self.sections.clear();
    }

    pub fn sections(&self) -> &[SharedSketch] {
        &self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn add_guide_curve(&mut self, guide: SharedSketch) {
        self.guide_curves.push(guide);
    }

    pub fn remove_guide_curve(&mut self, guide: &SharedSketch) -> bool {
        match self.guide_curves.iter().position(|g| Arc::ptr_eq(g, guide)) {
            Some(idx) => {
                self.guide_curves.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear_guide_curves(&mut self) {
        self.guide_curves.clear();
    }

    pub fn guide_curves(&self) -> &[SharedSketch] {
        &self.guide_curves
    }

    pub fn guide_curve_count(&self) -> usize {
        self.guide_curves.len()
    }

    pub fn is_solid(&self) -> bool {
        self.base.parameters.flag(params::SOLID)
    }

    pub fn set_solid(&mut self, solid: bool) {
        self.base.parameters.set_flag(params::SOLID, solid);
    }

    pub fn is_ruled(&self) -> bool {
        self.base.parameters.flag(params::RULED)
    }

    pub fn set_ruled(&mut self, ruled: bool) {
        self.base.parameters.set_flag(params::RULED, ruled);
    }

    pub fn is_closed(&self) -> bool {
        self.base.parameters.flag(params::CLOSED)
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.base.parameters.set_flag(params::CLOSED, closed);
    }
}

impl FeatureOps for LoftFeature {
    fn base(&self) -> &FeatureBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FeatureBase {
        &mut self.base
    }

    fn check_parameters(&self) -> Result<(), FeatureError> {
        if let Some(idx) = self.sections.iter().position(|s| s.read().is_empty()) {
            return Err(FeatureError::ParameterInvalid(format!("section {} is empty", idx)));
        }
        if self.sections.len() < 2 {
            return Err(FeatureError::ParameterInvalid(format!(
                "loft needs at least two sections, got {}",
                self.sections.len()
            )));
        }
        if let Some(idx) = self.guide_curves.iter().position(|g| g.read().is_empty()) {
            return Err(FeatureError::ParameterInvalid(format!("guide curve {} is empty", idx)));
        }
        Ok(())
    }

    fn construct<K: GeometryKernel>(&self, kernel: &K) -> Result<K::Body, FeatureError> {
        let tolerance = self.base.config.coincidence_tolerance;
        let wires = self
            .sections
            .iter()
            .map(|shared| {
                let sketch = shared.read();
                sketch_to_wire(kernel, &sketch, sketch.plane(), tolerance)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let options = LoftOptions {
            solid: self.is_solid(),
            ruled: self.is_ruled(),
            tolerance: self.base.config.loft_tolerance,
        };
        debug!(sections = wires.len(), solid = options.solid, ruled = options.ruled, "lofting");
        kernel
            .loft(&wires, &options)
            .map_err(|e| FeatureError::from_kernel("loft", e))
    }
}
