//! Kernel abstraction layer for solid construction.
//!
//! Features talk to the geometry kernel only through [`GeometryKernel`], so the
//! backend (analytic reference kernel, Truck B-rep kernel, or something else)
//! can be swapped without touching the feature pipeline.

pub mod chain;
pub mod types;
mod analytic;
mod truck;

#[cfg(test)]
mod tests_analytic;

pub use analytic::{AnalyticBody, AnalyticFace, AnalyticKernel, BodyKind, FaceRecord, SurfaceKind};
pub use chain::chain_edges;
pub use truck::{TruckKernel, TruckShape, TruckWire};
pub use types::*;

use crate::geometry::{Point3, Vector3};
use std::fmt::Debug;
use thiserror::Error;

/// Errors that can occur during kernel operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelOpError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Edge at the given position does not connect to the wire built so far.
    #[error("Edge {0} does not connect to the wire")]
    DisconnectedWire(usize),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// The kernel hit an internal inconsistency mid-operation.
    #[error("Kernel fault: {0}")]
    Fault(String),
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelOpError>;

/// Options for skinning a solid or shell through section wires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoftOptions {
    /// Cap the ends and produce a solid instead of a shell.
    pub solid: bool,
    /// Straight ruled surfaces between consecutive sections.
    pub ruled: bool,
    pub tolerance: f64,
}

impl Default for LoftOptions {
    fn default() -> Self {
        Self {
            solid: true,
            ruled: false,
            tolerance: 1e-6,
        }
    }
}

/// Abstract interface for the kernel primitives the features need.
///
/// Every call either returns a valid object or reports a [`KernelOpError`];
/// implementations must not panic on bad input.
pub trait GeometryKernel: Send + Sync {
    type Edge: Clone + Debug;
    type Wire: Clone + Debug;
    type Face: Clone + Debug;
    /// The kernel's solid (or shell) representation.
    type Body: Clone + Debug;

    /// Distance below which two points are the same vertex.
    fn tolerance(&self) -> f64;

    /// Straight segment between two points.
    fn line_edge(&self, start: &Point3, end: &Point3) -> KernelResult<Self::Edge>;

    /// Full circle in the plane through `center` perpendicular to `axis`.
    fn circle_edge(&self, center: &Point3, axis: &Vector3, radius: f64) -> KernelResult<Self::Edge>;

    /// Circular arc from `start` through `transit` to `end`.
    fn arc_edge(&self, start: &Point3, transit: &Point3, end: &Point3) -> KernelResult<Self::Edge>;

    /// Join edges head-to-tail into one wire, flipping edges as needed.
    fn make_wire(&self, edges: Vec<Self::Edge>) -> KernelResult<Self::Wire>;

    fn is_closed(&self, wire: &Self::Wire) -> bool;

    /// Planar face bounded by a closed wire.
    fn planar_face(&self, wire: &Self::Wire) -> KernelResult<Self::Face>;

    /// Sweep a face along a straight vector (prism).
    fn linear_sweep(&self, face: &Self::Face, vector: &Vector3) -> KernelResult<Self::Body>;

    /// Skin a body through an ordered list of section wires.
    fn loft(&self, sections: &[Self::Wire], options: &LoftOptions) -> KernelResult<Self::Body>;

    /// Sweep a section wire along a spine wire.
    fn pipe(&self, spine: &Self::Wire, section: &Self::Wire) -> KernelResult<Self::Body>;
}
