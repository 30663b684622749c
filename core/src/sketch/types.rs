use crate::geometry::{perpendicular, Point3, UnitVector3, Vector3};
use crate::ids::EntityId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::solver::{ConstraintSolver, RelaxationSolver};

/// Errors raised by sketch editing operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SketchError {
    #[error("Radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    #[error("Arc sweep must be non-zero, got {start} -> {end}")]
    DegenerateArc { start: f64, end: f64 },

    #[error("No element with id {0}")]
    UnknownElement(EntityId),

    #[error("Element {0} is already part of the sketch")]
    DuplicateElement(EntityId),
}

/// Oriented coordinate frame embedding 2D sketch coordinates into 3D space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchPlane {
    pub origin: Point3,
    pub normal: Vector3,
    pub x_axis: Vector3,
    pub y_axis: Vector3,
}

impl Default for SketchPlane {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            normal: Vector3::z_axis().into_inner(),
            x_axis: Vector3::x_axis().into_inner(),
            y_axis: Vector3::y_axis().into_inner(),
        }
    }
}

impl SketchPlane {
    /// Build an orthonormal frame. `x_axis` is projected into the plane; when
    /// it is parallel to the normal a perpendicular direction is chosen. A
    /// zero normal falls back to +Z.
    pub fn new(origin: Point3, normal: Vector3, x_axis: Vector3) -> Self {
        let n = UnitVector3::try_new(normal, 1e-12).unwrap_or_else(Vector3::z_axis);
        let projected = x_axis - n.into_inner() * x_axis.dot(&n.into_inner());
        let x = UnitVector3::try_new(projected, 1e-12).unwrap_or_else(|| perpendicular(&n));
        let y = n.into_inner().cross(&x.into_inner());
        Self {
            origin,
            normal: n.into_inner(),
            x_axis: x.into_inner(),
            y_axis: y,
        }
    }

    /// Plane through `origin` with the given normal and a derived in-plane frame.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Self {
        let n = UnitVector3::try_new(normal, 1e-12).unwrap_or_else(Vector3::z_axis);
        Self::new(origin, n.into_inner(), perpendicular(&n).into_inner())
    }

    /// XY plane at origin.
    pub fn xy() -> Self {
        Self::default()
    }

    /// XZ plane at origin (normal -Y, so x × z stays right-handed).
    pub fn xz() -> Self {
        Self::new(Point3::origin(), -Vector3::y(), Vector3::x())
    }

    /// YZ plane at origin.
    pub fn yz() -> Self {
        Self::new(Point3::origin(), Vector3::x(), Vector3::y())
    }

    /// Same frame shifted along its normal.
    pub fn offset(&self, distance: f64) -> Self {
        Self {
            origin: self.origin + self.unit_normal().into_inner() * distance,
            ..self.clone()
        }
    }

    pub fn unit_normal(&self) -> UnitVector3 {
        UnitVector3::try_new(self.normal, 1e-12).unwrap_or_else(Vector3::z_axis)
    }

    /// `P(u, v) = origin + u·xAxis + v·yAxis`
    pub fn to_world(&self, u: f64, v: f64) -> Point3 {
        self.origin + self.x_axis * u + self.y_axis * v
    }
}

/// A 2D point in sketch coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SketchPoint {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
}

impl SketchPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { id: EntityId::new(), x, y }
    }

    pub fn position(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn set_position(&mut self, pos: [f64; 2]) {
        self.x = pos[0];
        self.y = pos[1];
    }
}

impl From<[f64; 2]> for SketchPoint {
    fn from(pos: [f64; 2]) -> Self {
        Self::new(pos[0], pos[1])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchLine {
    pub start: SketchPoint,
    pub end: SketchPoint,
}

impl SketchLine {
    pub fn new(start: impl Into<SketchPoint>, end: impl Into<SketchPoint>) -> Self {
        Self { start: start.into(), end: end.into() }
    }

    pub fn length(&self) -> f64 {
        (self.end.x - self.start.x).hypot(self.end.y - self.start.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchCircle {
    pub center: SketchPoint,
    radius: f64,
}

impl SketchCircle {
    pub fn new(center: impl Into<SketchPoint>, radius: f64) -> Result<Self, SketchError> {
        check_radius(radius)?;
        Ok(Self { center: center.into(), radius })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), SketchError> {
        check_radius(radius)?;
        self.radius = radius;
        Ok(())
    }
}

/// Counter-clockwise arc from `start_angle` to `end_angle` (radians).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchArc {
    pub center: SketchPoint,
    radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl SketchArc {
    pub fn new(
        center: impl Into<SketchPoint>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self, SketchError> {
        check_radius(radius)?;
        let arc = Self { center: center.into(), radius, start_angle, end_angle };
        if arc.sweep() < 1e-9 {
            return Err(SketchError::DegenerateArc { start: start_angle, end: end_angle });
        }
        Ok(arc)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), SketchError> {
        check_radius(radius)?;
        self.radius = radius;
        Ok(())
    }

    /// CCW sweep in (0, 2π].
    pub fn sweep(&self) -> f64 {
        let tau = std::f64::consts::TAU;
        let raw = self.end_angle - self.start_angle;
        if raw >= tau {
            return tau;
        }
        raw.rem_euclid(tau)
    }

    pub fn point_at_angle(&self, angle: f64) -> [f64; 2] {
        [
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        ]
    }

    pub fn start_point(&self) -> [f64; 2] {
        self.point_at_angle(self.start_angle)
    }

    pub fn end_point(&self) -> [f64; 2] {
        self.point_at_angle(self.start_angle + self.sweep())
    }

    pub fn mid_point(&self) -> [f64; 2] {
        self.point_at_angle(self.start_angle + 0.5 * self.sweep())
    }
}

fn check_radius(radius: f64) -> Result<(), SketchError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(SketchError::InvalidRadius(radius))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SketchGeometry {
    Point(SketchPoint),
    Line(SketchLine),
    Circle(SketchCircle),
    Arc(SketchArc),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SketchElementType {
    Point,
    Line,
    Circle,
    Arc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchElement {
    pub id: EntityId,
    pub geometry: SketchGeometry,
    /// Construction geometry guides constraints but never reaches a profile.
    #[serde(default)]
    pub is_construction: bool,
}

impl SketchElement {
    pub fn new(geometry: SketchGeometry) -> Self {
        Self { id: EntityId::new(), geometry, is_construction: false }
    }

    pub fn construction(geometry: SketchGeometry) -> Self {
        Self { id: EntityId::new(), geometry, is_construction: true }
    }

    pub fn element_type(&self) -> SketchElementType {
        match self.geometry {
            SketchGeometry::Point(_) => SketchElementType::Point,
            SketchGeometry::Line(_) => SketchElementType::Line,
            SketchGeometry::Circle(_) => SketchElementType::Circle,
            SketchGeometry::Arc(_) => SketchElementType::Arc,
        }
    }

    /// Point addressed by a constraint reference index.
    /// 0 = position / start / center, 1 = line end.
    pub fn point(&self, index: u8) -> Option<&SketchPoint> {
        match (&self.geometry, index) {
            (SketchGeometry::Point(p), 0) => Some(p),
            (SketchGeometry::Line(l), 0) => Some(&l.start),
            (SketchGeometry::Line(l), 1) => Some(&l.end),
            (SketchGeometry::Circle(c), 0) => Some(&c.center),
            (SketchGeometry::Arc(a), 0) => Some(&a.center),
            _ => None,
        }
    }

    pub fn point_mut(&mut self, index: u8) -> Option<&mut SketchPoint> {
        match (&mut self.geometry, index) {
            (SketchGeometry::Point(p), 0) => Some(p),
            (SketchGeometry::Line(l), 0) => Some(&mut l.start),
            (SketchGeometry::Line(l), 1) => Some(&mut l.end),
            (SketchGeometry::Circle(c), 0) => Some(&mut c.center),
            (SketchGeometry::Arc(a), 0) => Some(&mut a.center),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintPoint {
    pub id: EntityId,
    pub index: u8, // 0=Start/Center/Pos, 1=End
}

impl ConstraintPoint {
    pub fn new(id: EntityId, index: u8) -> Self {
        Self { id, index }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SketchConstraint {
    Coincident { points: [ConstraintPoint; 2] },
    Horizontal { entity: EntityId },
    Vertical { entity: EntityId },
    /// Distance constraint between two points
    Distance { points: [ConstraintPoint; 2], value: f64 },
    /// Radius constraint for a Circle or Arc
    Radius { entity: EntityId, value: f64 },
    Fix { point: ConstraintPoint, position: [f64; 2] },
}

impl SketchConstraint {
    /// Element ids this constraint relates.
    pub fn referenced_elements(&self) -> Vec<EntityId> {
        match self {
            SketchConstraint::Coincident { points } | SketchConstraint::Distance { points, .. } => {
                vec![points[0].id, points[1].id]
            }
            SketchConstraint::Horizontal { entity }
            | SketchConstraint::Vertical { entity }
            | SketchConstraint::Radius { entity, .. } => vec![*entity],
            SketchConstraint::Fix { point, .. } => vec![point.id],
        }
    }
}

/// Shared handle used when several features reference the same sketch.
pub type SharedSketch = Arc<parking_lot::RwLock<Sketch>>;

fn default_solver() -> Arc<dyn ConstraintSolver> {
    Arc::new(RelaxationSolver::default())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sketch {
    pub name: String,
    pub plane: SketchPlane,
    // Vec keeps insertion order: wire chaining follows it.
    elements: Vec<SketchElement>,
    constraints: Vec<SketchConstraint>,
    #[serde(skip)]
    selection: Vec<EntityId>,
    #[serde(skip, default = "default_solver")]
    solver: Arc<dyn ConstraintSolver>,
}

impl Default for Sketch {
    fn default() -> Self {
        Self::new("Sketch", SketchPlane::default())
    }
}

impl Sketch {
    pub fn new(name: &str, plane: SketchPlane) -> Self {
        Self {
            name: name.to_string(),
            plane,
            elements: Vec::new(),
            constraints: Vec::new(),
            selection: Vec::new(),
            solver: default_solver(),
        }
    }

    pub fn with_solver(mut self, solver: Arc<dyn ConstraintSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// Wrap the sketch in a shared, lock-guarded handle.
    pub fn into_shared(self) -> SharedSketch {
        Arc::new(parking_lot::RwLock::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn plane(&self) -> &SketchPlane {
        &self.plane
    }

    pub fn set_plane(&mut self, plane: SketchPlane) {
        self.plane = plane;
    }

    // === Elements ===

    pub fn add_element(&mut self, element: SketchElement) -> Result<EntityId, SketchError> {
        if self.element(element.id).is_some() {
            return Err(SketchError::DuplicateElement(element.id));
        }
        let id = element.id;
        self.elements.push(element);
        Ok(id)
    }

    pub fn add_geometry(&mut self, geometry: SketchGeometry) -> EntityId {
        let element = SketchElement::new(geometry);
        let id = element.id;
        self.elements.push(element);
        id
    }

    pub fn add_point(&mut self, pos: [f64; 2]) -> EntityId {
        self.add_geometry(SketchGeometry::Point(pos.into()))
    }

    pub fn add_line(&mut self, start: [f64; 2], end: [f64; 2]) -> EntityId {
        self.add_geometry(SketchGeometry::Line(SketchLine::new(start, end)))
    }

    pub fn add_circle(&mut self, center: [f64; 2], radius: f64) -> Result<EntityId, SketchError> {
        Ok(self.add_geometry(SketchGeometry::Circle(SketchCircle::new(center, radius)?)))
    }

    pub fn add_arc(
        &mut self,
        center: [f64; 2],
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<EntityId, SketchError> {
        let arc = SketchArc::new(center, radius, start_angle, end_angle)?;
        Ok(self.add_geometry(SketchGeometry::Arc(arc)))
    }

    /// Closed polyline through `points`, one line per side.
    pub fn add_polygon(&mut self, points: &[[f64; 2]]) -> Vec<EntityId> {
        (0..points.len())
            .map(|i| self.add_line(points[i], points[(i + 1) % points.len()]))
            .collect()
    }

    /// Remove an element together with its selection entry and every
    /// constraint that references it.
    pub fn remove_element(&mut self, id: EntityId) -> Result<SketchElement, SketchError> {
        let idx = self
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(SketchError::UnknownElement(id))?;
        self.selection.retain(|s| *s != id);
        self.constraints.retain(|c| !c.referenced_elements().contains(&id));
        Ok(self.elements.remove(idx))
    }

    pub fn clear_elements(&mut self) {
        self.elements.clear();
        self.constraints.clear();
        self.selection.clear();
    }

    pub fn elements(&self) -> &[SketchElement] {
        &self.elements
    }

    pub fn element(&self, id: EntityId) -> Option<&SketchElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: EntityId) -> Option<&mut SketchElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn set_construction(&mut self, id: EntityId, construction: bool) -> Result<(), SketchError> {
        let element = self.element_mut(id).ok_or(SketchError::UnknownElement(id))?;
        element.is_construction = construction;
        Ok(())
    }

    // === Constraints ===

    pub fn add_constraint(&mut self, constraint: SketchConstraint) {
        self.constraints.push(constraint);
    }

    pub fn remove_constraint(&mut self, index: usize) -> Option<SketchConstraint> {
        if index < self.constraints.len() {
            Some(self.constraints.remove(index))
        } else {
            None
        }
    }

    pub fn clear_constraints(&mut self) {
        self.constraints.clear();
    }

    pub fn constraints(&self) -> &[SketchConstraint] {
        &self.constraints
    }

    // === Solver ===

    /// Run the solver over the current geometry. Returns false when the
    /// constraints conflict or cannot be satisfied.
    pub fn solve_constraints(&mut self) -> bool {
        let solver = Arc::clone(&self.solver);
        solver.solve(&mut self.elements, &self.constraints)
    }

    /// Check that the constraint system is well formed for this sketch.
    pub fn validate_constraints(&self) -> bool {
        self.solver.validate(&self.elements, &self.constraints)
    }

    // === Selection ===

    pub fn select_element(&mut self, id: EntityId) -> Result<(), SketchError> {
        if self.element(id).is_none() {
            return Err(SketchError::UnknownElement(id));
        }
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
        Ok(())
    }

    pub fn deselect_element(&mut self, id: EntityId) {
        self.selection.retain(|s| *s != id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_elements(&self) -> Vec<&SketchElement> {
        self.selection.iter().filter_map(|id| self.element(*id)).collect()
    }

    // === Queries ===

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}
