//! Kernel-agnostic curve and wire descriptions.
//!
//! Both bundled kernels describe edges with [`EdgeCurve`] and assembled wires
//! with [`EdgeChain`]; a backend with its own topology types only needs to
//! honour the [`GeometryKernel`](super::GeometryKernel) contract.

use super::{KernelOpError, KernelResult};
use crate::geometry::{circumcircle, perpendicular, Point3, Rotation3, UnitVector3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// A single bounded 3D curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeCurve {
    Line {
        start: Point3,
        end: Point3,
    },
    /// Full circle that starts and ends at `start`, running CCW about `axis`.
    Circle {
        center: Point3,
        axis: UnitVector3,
        radius: f64,
        start: Point3,
    },
    /// Arc from `start` to `end`, rotating `sweep` radians CCW about `axis`.
    Arc {
        center: Point3,
        axis: UnitVector3,
        radius: f64,
        start: Point3,
        end: Point3,
        sweep: f64,
    },
}

impl EdgeCurve {
    pub fn line(start: &Point3, end: &Point3, tolerance: f64) -> KernelResult<Self> {
        if (end - start).norm() <= tolerance {
            return Err(KernelOpError::InvalidGeometry("zero-length line".into()));
        }
        Ok(EdgeCurve::Line { start: *start, end: *end })
    }

    /// Full circle; its seam point is picked deterministically from the axis.
    pub fn circle(center: &Point3, axis: &Vector3, radius: f64, tolerance: f64) -> KernelResult<Self> {
        if !(radius.is_finite() && radius > tolerance) {
            return Err(KernelOpError::InvalidGeometry(format!("circle radius {}", radius)));
        }
        let axis = UnitVector3::try_new(*axis, 1e-12)
            .ok_or_else(|| KernelOpError::InvalidGeometry("circle axis has zero length".into()))?;
        Ok(EdgeCurve::Circle {
            center: *center,
            axis,
            radius,
            start: center + perpendicular(&axis).into_inner() * radius,
        })
    }

    /// Arc from `start` through `transit` to `end`.
    pub fn arc_through(start: &Point3, transit: &Point3, end: &Point3, tolerance: f64) -> KernelResult<Self> {
        if (end - start).norm() <= tolerance {
            return Err(KernelOpError::InvalidGeometry("arc endpoints coincide".into()));
        }
        let (center, radius) = circumcircle(start, transit, end)
            .ok_or_else(|| KernelOpError::InvalidGeometry("arc points are collinear".into()))?;
        let axis = UnitVector3::try_new((transit - start).cross(&(end - transit)), 1e-12)
            .ok_or_else(|| KernelOpError::InvalidGeometry("arc points are collinear".into()))?;

        let u = (start - center) / radius;
        let e = end - center;
        let mut sweep = e.dot(&axis.cross(&u)).atan2(e.dot(&u));
        if sweep <= 0.0 {
            sweep += TAU;
        }
        Ok(EdgeCurve::Arc {
            center,
            axis,
            radius,
            start: *start,
            end: *end,
            sweep,
        })
    }

    /// Closed edges (full circles) have no distinct endpoints.
    pub fn is_closed(&self) -> bool {
        matches!(self, EdgeCurve::Circle { .. })
    }

    pub fn endpoints(&self) -> Option<(Point3, Point3)> {
        match self {
            EdgeCurve::Line { start, end } | EdgeCurve::Arc { start, end, .. } => Some((*start, *end)),
            EdgeCurve::Circle { .. } => None,
        }
    }

    /// Same curve traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        match self {
            EdgeCurve::Line { start, end } => EdgeCurve::Line { start: *end, end: *start },
            EdgeCurve::Circle { center, axis, radius, start } => EdgeCurve::Circle {
                center: *center,
                axis: UnitVector3::new_unchecked(-axis.into_inner()),
                radius: *radius,
                start: *start,
            },
            EdgeCurve::Arc { center, axis, radius, start, end, sweep } => EdgeCurve::Arc {
                center: *center,
                axis: UnitVector3::new_unchecked(-axis.into_inner()),
                radius: *radius,
                start: *end,
                end: *start,
                sweep: *sweep,
            },
        }
    }

    /// Point at normalised parameter `t` in [0, 1].
    pub fn point_at(&self, t: f64) -> Point3 {
        match self {
            EdgeCurve::Line { start, end } => start + (end - start) * t,
            EdgeCurve::Circle { center, axis, start, .. } => {
                center + Rotation3::from_axis_angle(axis, t * TAU) * (start - center)
            }
            EdgeCurve::Arc { center, axis, start, sweep, .. } => {
                center + Rotation3::from_axis_angle(axis, t * sweep) * (start - center)
            }
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            EdgeCurve::Line { start, end } => (end - start).norm(),
            EdgeCurve::Circle { radius, .. } => TAU * radius,
            EdgeCurve::Arc { radius, sweep, .. } => radius * sweep,
        }
    }

    /// Polyline approximation from start to end. Circles are returned without
    /// repeating the start point.
    pub fn sample(&self, samples_per_turn: usize) -> Vec<Point3> {
        match self {
            EdgeCurve::Line { start, end } => vec![*start, *end],
            EdgeCurve::Circle { .. } => {
                let n = samples_per_turn.max(8);
                (0..n).map(|i| self.point_at(i as f64 / n as f64)).collect()
            }
            EdgeCurve::Arc { sweep, .. } => {
                let n = ((sweep / TAU) * samples_per_turn as f64).ceil().max(2.0) as usize;
                (0..=n).map(|i| self.point_at(i as f64 / n as f64)).collect()
            }
        }
    }
}

/// Edges ordered and oriented head-to-tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeChain {
    pub edges: Vec<EdgeCurve>,
    pub closed: bool,
}

impl EdgeChain {
    pub fn start_point(&self) -> Option<Point3> {
        self.edges.first().map(|e| e.point_at(0.0))
    }

    pub fn end_point(&self) -> Option<Point3> {
        self.edges.last().map(|e| e.point_at(1.0))
    }

    pub fn length(&self) -> f64 {
        self.edges.iter().map(EdgeCurve::length).sum()
    }

    /// Concatenated edge samples without duplicated junction points. A closed
    /// chain does not repeat its first point at the end.
    pub fn polyline(&self, samples_per_turn: usize) -> Vec<Point3> {
        let mut points: Vec<Point3> = Vec::new();
        for edge in &self.edges {
            let samples = edge.sample(samples_per_turn);
            let skip = usize::from(!points.is_empty() && !edge.is_closed());
            points.extend(samples.into_iter().skip(skip));
        }
        if self.closed && points.len() > 1 && !self.edges.iter().any(EdgeCurve::is_closed) {
            points.pop();
        }
        points
    }
}
