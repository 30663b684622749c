//! Sketch-to-wire conversion.
//!
//! Walks the sketch elements in their stored order, maps 2D plane
//! coordinates through `P(u, v) = origin + u·x_axis + v·y_axis` and asks the
//! kernel to chain the resulting edges into one wire.

use super::types::FeatureError;
use crate::geometry::{coincident, Point3};
use crate::kernel::{GeometryKernel, KernelOpError};
use crate::sketch::{Sketch, SketchGeometry, SketchPlane};
use std::f64::consts::TAU;
use tracing::{debug, trace};

fn map(plane: &SketchPlane, p: [f64; 2]) -> Point3 {
    plane.to_world(p[0], p[1])
}

fn edge_error(kind: &str, err: KernelOpError) -> FeatureError {
    match err {
        KernelOpError::InvalidGeometry(msg) => {
            FeatureError::EmptyOrDegenerateWire(format!("{}: {}", kind, msg))
        }
        other => FeatureError::from_kernel(kind, other),
    }
}

/// Build a 3D wire from the profile geometry of `sketch` placed on `plane`.
///
/// Construction geometry and bare points are skipped; lines whose mapped
/// endpoints coincide within `tolerance` (or within the kernel's own
/// tolerance, whichever is larger) are dropped. The sketch is never modified.
pub fn sketch_to_wire<K: GeometryKernel>(
    kernel: &K,
    sketch: &Sketch,
    plane: &SketchPlane,
    tolerance: f64,
) -> Result<K::Wire, FeatureError> {
    let normal = plane.unit_normal().into_inner();
    let tolerance = tolerance.max(kernel.tolerance());
    let mut edges = Vec::with_capacity(sketch.element_count());

    for element in sketch.elements().iter().filter(|e| !e.is_construction) {
        let edge = match &element.geometry {
            SketchGeometry::Point(_) => continue,
            SketchGeometry::Line(line) => {
                let start = map(plane, line.start.position());
                let end = map(plane, line.end.position());
                if coincident(&start, &end, tolerance) {
                    trace!(element = %element.id, "skipping zero-length line");
                    continue;
                }
                kernel.line_edge(&start, &end).map_err(|e| edge_error("line", e))?
            }
            SketchGeometry::Circle(circle) => {
                let center = map(plane, circle.center.position());
                kernel
                    .circle_edge(&center, &normal, circle.radius())
                    .map_err(|e| edge_error("circle", e))?
            }
            SketchGeometry::Arc(arc) if arc.sweep() >= TAU - 1e-9 => {
                let center = map(plane, arc.center.position());
                kernel
                    .circle_edge(&center, &normal, arc.radius())
                    .map_err(|e| edge_error("arc", e))?
            }
            SketchGeometry::Arc(arc) => {
                let start = map(plane, arc.start_point());
                let mid = map(plane, arc.mid_point());
                let end = map(plane, arc.end_point());
                kernel.arc_edge(&start, &mid, &end).map_err(|e| edge_error("arc", e))?
            }
        };
        edges.push(edge);
    }

    if edges.is_empty() {
        return Err(FeatureError::EmptyOrDegenerateWire(format!(
            "sketch '{}' has no profile edges",
            sketch.name()
        )));
    }

    let count = edges.len();
    let wire = kernel.make_wire(edges).map_err(|err| match err {
        KernelOpError::DisconnectedWire(index) => FeatureError::NonManifoldProfile(format!(
            "sketch '{}': edge {} of {} does not connect to the wire",
            sketch.name(),
            index,
            count
        )),
        KernelOpError::InvalidGeometry(msg) => FeatureError::EmptyOrDegenerateWire(msg),
        other => FeatureError::from_kernel("wire", other),
    })?;
    debug!(sketch = %sketch.name(), edges = count, closed = kernel.is_closed(&wire), "sketch converted");
    Ok(wire)
}
