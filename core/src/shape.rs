//! Construction results handed back by features.

use crate::features::FeatureType;
use crate::geometry::BoundingBox;
use crate::ids::EntityId;
use crate::kernel::{AnalyticBody, BodyKind};

/// Immutable handle to a kernel body. Every successful construction yields a
/// fresh shape; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Shape<B> {
    id: EntityId,
    source: FeatureType,
    body: B,
}

impl<B> Shape<B> {
    pub fn new(source: FeatureType, body: B) -> Self {
        Self {
            id: EntityId::new(),
            source,
            body,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Kind of feature that produced the shape.
    pub fn source(&self) -> FeatureType {
        self.source
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn into_body(self) -> B {
        self.body
    }
}

/// Geometric queries answered without tessellating.
pub trait ShapeProperties {
    fn volume(&self) -> f64;
    fn bounding_box(&self) -> BoundingBox;
    fn face_count(&self) -> usize;
    fn is_solid(&self) -> bool;
}

impl ShapeProperties for AnalyticBody {
    fn volume(&self) -> f64 {
        self.volume
    }

    fn bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn is_solid(&self) -> bool {
        self.kind == BodyKind::Solid
    }
}

impl<B: ShapeProperties> ShapeProperties for Shape<B> {
    fn volume(&self) -> f64 {
        self.body.volume()
    }

    fn bounding_box(&self) -> BoundingBox {
        self.body.bounding_box()
    }

    fn face_count(&self) -> usize {
        self.body.face_count()
    }

    fn is_solid(&self) -> bool {
        self.body.is_solid()
    }
}
