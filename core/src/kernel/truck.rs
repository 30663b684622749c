//! Truck-based implementation of the geometry kernel.
//!
//! This module provides a B-rep kernel implementation using the Truck library,
//! which is licensed under Apache-2.0 (MIT-compatible). Edges are described
//! with [`EdgeCurve`] and turned into Truck topology once they are chained,
//! so consecutive edges share their Truck vertices.

use super::chain::chain_edges;
use super::types::{EdgeChain, EdgeCurve};
use super::{GeometryKernel, KernelOpError, KernelResult, LoftOptions};
use crate::config::ModelingConfig;
use crate::geometry::{Point3 as GeoPoint3, Vector3 as GeoVector3};
use tracing::debug;

// Use truck's pre-exported types which come from cgmath64
use truck_modeling::{builder, Face, Point3, Rad, Shell, Solid, Vector3, Vertex, Wire};

/// Truck-based CAD kernel implementation.
#[derive(Debug, Clone)]
pub struct TruckKernel {
    /// Distance below which two points are the same vertex.
    pub tolerance: f64,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self::from_config(&ModelingConfig::default())
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn from_config(config: &ModelingConfig) -> Self {
        Self::with_tolerance(config.truck_tolerance)
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// A Truck wire together with the curve description it was built from.
#[derive(Debug, Clone)]
pub struct TruckWire {
    pub wire: Wire,
    pub chain: EdgeChain,
}

#[derive(Debug, Clone)]
pub enum TruckShape {
    Solid(Solid),
    Shell(Shell),
}

impl TruckShape {
    pub fn is_solid(&self) -> bool {
        matches!(self, TruckShape::Solid(_))
    }

    pub fn face_count(&self) -> usize {
        match self {
            TruckShape::Solid(solid) => solid.boundaries().iter().map(|s| s.face_iter().count()).sum(),
            TruckShape::Shell(shell) => shell.face_iter().count(),
        }
    }
}

fn tp(p: &GeoPoint3) -> Point3 {
    Point3::new(p.x, p.y, p.z)
}

fn tv(v: &GeoVector3) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

impl TruckKernel {
    /// Build Truck topology for an ordered chain, sharing junction vertices.
    fn build_wire(&self, chain: &EdgeChain) -> KernelResult<Wire> {
        if let [EdgeCurve::Circle { center, axis, start, .. }] = chain.edges.as_slice() {
            // Truck requires angle > 2π for closed shapes (2π ≈ 6.28, so use 7.0)
            let v: Vertex = builder::vertex(tp(start));
            let circle: Wire = builder::rsweep(&v, tp(center), tv(&axis.into_inner()), Rad(7.0));
            return Ok(circle);
        }

        let mut edges = Vec::with_capacity(chain.edges.len());
        let mut first: Option<Vertex> = None;
        let mut previous: Option<Vertex> = None;
        let last = chain.edges.len().saturating_sub(1);
        for (i, edge) in chain.edges.iter().enumerate() {
            let (start, end) = edge.endpoints().ok_or_else(|| {
                KernelOpError::InvalidGeometry("full circle inside a multi-edge wire".into())
            })?;
            let v0 = previous.take().unwrap_or_else(|| builder::vertex(tp(&start)));
            if first.is_none() {
                first = Some(v0.clone());
            }
            let v1 = match (&first, chain.closed && i == last) {
                (Some(front), true) => front.clone(),
                _ => builder::vertex(tp(&end)),
            };
            let truck_edge = match edge {
                EdgeCurve::Line { .. } => builder::line(&v0, &v1),
                EdgeCurve::Arc { .. } => builder::circle_arc(&v0, &v1, tp(&edge.point_at(0.5))),
                EdgeCurve::Circle { .. } => {
                    return Err(KernelOpError::InvalidGeometry(
                        "full circle inside a multi-edge wire".into(),
                    ))
                }
            };
            edges.push(truck_edge);
            previous = Some(v1);
        }
        Ok(Wire::from_iter(edges))
    }

    fn attach_plane(wire: &Wire) -> KernelResult<Face> {
        builder::try_attach_plane(&[wire.clone()])
            .map_err(|e| KernelOpError::OperationFailed(format!("Failed to create face: {:?}", e)))
    }

    /// Direction of a spine made of collinear line segments.
    fn straight_spine(&self, spine: &EdgeChain) -> KernelResult<GeoVector3> {
        let (Some(start), Some(end)) = (spine.start_point(), spine.end_point()) else {
            return Err(KernelOpError::InvalidGeometry("spine has no edges".into()));
        };
        let travel = end - start;
        if spine.closed || travel.norm() <= self.tolerance {
            return Err(KernelOpError::NotImplemented("pipe sweep along a closed spine".into()));
        }
        let dir = travel.normalize();
        for edge in &spine.edges {
            let EdgeCurve::Line { start: a, end: b } = edge else {
                return Err(KernelOpError::NotImplemented("pipe sweep along a curved spine".into()));
            };
            let offset = (b - a).cross(&dir).norm() + (a - start).cross(&dir).norm();
            if offset > self.tolerance {
                return Err(KernelOpError::NotImplemented("pipe sweep along a bent spine".into()));
            }
        }
        Ok(travel)
    }
}

impl GeometryKernel for TruckKernel {
    type Edge = EdgeCurve;
    type Wire = TruckWire;
    type Face = Face;
    type Body = TruckShape;

    fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn line_edge(&self, start: &GeoPoint3, end: &GeoPoint3) -> KernelResult<EdgeCurve> {
        EdgeCurve::line(start, end, self.tolerance)
    }

    fn circle_edge(&self, center: &GeoPoint3, axis: &GeoVector3, radius: f64) -> KernelResult<EdgeCurve> {
        EdgeCurve::circle(center, axis, radius, self.tolerance)
    }

    fn arc_edge(&self, start: &GeoPoint3, transit: &GeoPoint3, end: &GeoPoint3) -> KernelResult<EdgeCurve> {
        EdgeCurve::arc_through(start, transit, end, self.tolerance)
    }

    fn make_wire(&self, edges: Vec<EdgeCurve>) -> KernelResult<TruckWire> {
        let chain = chain_edges(edges, self.tolerance)?;
        let wire = self.build_wire(&chain)?;
        Ok(TruckWire { wire, chain })
    }

    fn is_closed(&self, wire: &TruckWire) -> bool {
        wire.chain.closed && wire.wire.is_closed()
    }

    fn planar_face(&self, wire: &TruckWire) -> KernelResult<Face> {
        if !self.is_closed(wire) {
            return Err(KernelOpError::InvalidGeometry("face boundary is not closed".into()));
        }
        Self::attach_plane(&wire.wire)
    }

    fn linear_sweep(&self, face: &Face, vector: &GeoVector3) -> KernelResult<TruckShape> {
        if vector.norm() <= self.tolerance {
            return Err(KernelOpError::InvalidGeometry("zero sweep vector".into()));
        }
        let solid: Solid = builder::tsweep(face, tv(vector));
        Ok(TruckShape::Solid(solid))
    }

    fn loft(&self, sections: &[TruckWire], options: &LoftOptions) -> KernelResult<TruckShape> {
        if sections.len() < 2 {
            return Err(KernelOpError::InvalidGeometry(format!(
                "loft needs at least two sections, got {}",
                sections.len()
            )));
        }
        if !options.ruled {
            debug!("truck kernel lofts are ruled between consecutive sections");
        }

        let mut faces: Vec<Face> = Vec::new();
        for pair in sections.windows(2) {
            let lateral = builder::try_wire_homotopy(&pair[0].wire, &pair[1].wire).map_err(|e| {
                KernelOpError::OperationFailed(format!("Failed to skin sections: {:?}", e))
            })?;
            faces.extend(lateral.face_iter().cloned());
        }

        if !options.solid {
            return Ok(TruckShape::Shell(Shell::from(faces)));
        }
        if sections.iter().any(|s| !self.is_closed(s)) {
            return Err(KernelOpError::InvalidGeometry(
                "solid loft needs closed sections".into(),
            ));
        }
        let (Some(head), Some(tail)) = (sections.first(), sections.last()) else {
            return Err(KernelOpError::InvalidGeometry("loft has no sections".into()));
        };
        faces.insert(0, Self::attach_plane(&head.wire)?.inverse());
        faces.push(Self::attach_plane(&tail.wire)?);

        let solid = Solid::try_new(vec![Shell::from(faces)])
            .map_err(|e| KernelOpError::OperationFailed(format!("Loft is not a closed solid: {:?}", e)))?;
        Ok(TruckShape::Solid(solid))
    }

    fn pipe(&self, spine: &TruckWire, section: &TruckWire) -> KernelResult<TruckShape> {
        let travel = self.straight_spine(&spine.chain)?;
        if self.is_closed(section) {
            let face = Self::attach_plane(&section.wire)?;
            let solid: Solid = builder::tsweep(&face, tv(&travel));
            Ok(TruckShape::Solid(solid))
        } else {
            let shell: Shell = builder::tsweep(&section.wire, tv(&travel));
            Ok(TruckShape::Shell(shell))
        }
    }
}
