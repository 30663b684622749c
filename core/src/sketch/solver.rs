use super::types::{ConstraintPoint, SketchConstraint, SketchElement, SketchGeometry};
use crate::ids::EntityId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, trace};

/// Constraint solver collaborator owned by a sketch.
///
/// The feature pipeline only relies on the boolean contract: `solve` moves
/// geometry until every constraint holds (or reports failure), `validate`
/// checks that the constraint system is well formed.
pub trait ConstraintSolver: fmt::Debug + Send + Sync {
    fn solve(&self, elements: &mut [SketchElement], constraints: &[SketchConstraint]) -> bool;

    fn validate(&self, elements: &[SketchElement], constraints: &[SketchConstraint]) -> bool;
}

/// Iterative projection solver: each pass nudges the geometry to satisfy one
/// constraint at a time until the worst residual drops below `epsilon`.
#[derive(Debug, Clone)]
pub struct RelaxationSolver {
    pub max_iterations: usize,
    pub epsilon: f64,
}

impl Default for RelaxationSolver {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            epsilon: 1e-6,
        }
    }
}

impl RelaxationSolver {
    fn get_point(
        elements: &[SketchElement],
        id_map: &HashMap<EntityId, usize>,
        cp: ConstraintPoint,
    ) -> Option<[f64; 2]> {
        let idx = id_map.get(&cp.id)?;
        elements[*idx].point(cp.index).map(|p| p.position())
    }

    fn set_point(
        elements: &mut [SketchElement],
        id_map: &HashMap<EntityId, usize>,
        cp: ConstraintPoint,
        pos: [f64; 2],
    ) {
        if let Some(idx) = id_map.get(&cp.id) {
            if let Some(p) = elements[*idx].point_mut(cp.index) {
                p.set_position(pos);
            }
        }
    }

    /// Move two points by `delta` split according to which of them is fixed.
    fn shift_pair(
        elements: &mut [SketchElement],
        id_map: &HashMap<EntityId, usize>,
        fixed: &HashSet<ConstraintPoint>,
        points: [ConstraintPoint; 2],
        positions: [[f64; 2]; 2],
        delta: [f64; 2],
    ) {
        let (w0, w1) = match (fixed.contains(&points[0]), fixed.contains(&points[1])) {
            (true, true) => return,
            (true, false) => (0.0, 1.0),
            (false, true) => (1.0, 0.0),
            (false, false) => (0.5, 0.5),
        };
        let p0 = [positions[0][0] - delta[0] * w0, positions[0][1] - delta[1] * w0];
        let p1 = [positions[1][0] + delta[0] * w1, positions[1][1] + delta[1] * w1];
        Self::set_point(elements, id_map, points[0], p0);
        Self::set_point(elements, id_map, points[1], p1);
    }

    fn line_points(
        elements: &[SketchElement],
        id_map: &HashMap<EntityId, usize>,
        entity: EntityId,
    ) -> Option<[ConstraintPoint; 2]> {
        let idx = id_map.get(&entity)?;
        match elements[*idx].geometry {
            SketchGeometry::Line(_) => Some([ConstraintPoint::new(entity, 0), ConstraintPoint::new(entity, 1)]),
            _ => None,
        }
    }

    /// Apply one projection step; returns the residual measured before it.
    fn project(
        elements: &mut [SketchElement],
        id_map: &HashMap<EntityId, usize>,
        fixed: &HashSet<ConstraintPoint>,
        constraint: &SketchConstraint,
    ) -> Option<f64> {
        match constraint {
            SketchConstraint::Coincident { points } => {
                let p0 = Self::get_point(elements, id_map, points[0])?;
                let p1 = Self::get_point(elements, id_map, points[1])?;
                let delta = [p0[0] - p1[0], p0[1] - p1[1]];
                Self::shift_pair(elements, id_map, fixed, *points, [p0, p1], delta);
                Some(delta[0].hypot(delta[1]))
            }
            SketchConstraint::Horizontal { entity } | SketchConstraint::Vertical { entity } => {
                let points = Self::line_points(elements, id_map, *entity)?;
                let p0 = Self::get_point(elements, id_map, points[0])?;
                let p1 = Self::get_point(elements, id_map, points[1])?;
                let delta = if matches!(constraint, SketchConstraint::Horizontal { .. }) {
                    [0.0, p0[1] - p1[1]]
                } else {
                    [p0[0] - p1[0], 0.0]
                };
                Self::shift_pair(elements, id_map, fixed, points, [p0, p1], delta);
                Some(delta[0].abs() + delta[1].abs())
            }
            SketchConstraint::Distance { points, value } => {
                let p0 = Self::get_point(elements, id_map, points[0])?;
                let p1 = Self::get_point(elements, id_map, points[1])?;
                let d = [p1[0] - p0[0], p1[1] - p0[1]];
                let len = d[0].hypot(d[1]);
                let error = len - value;
                // Coincident points have no direction to push along; pick +X.
                let dir = if len < 1e-12 { [1.0, 0.0] } else { [d[0] / len, d[1] / len] };
                let delta = [-dir[0] * error, -dir[1] * error];
                Self::shift_pair(elements, id_map, fixed, *points, [p0, p1], delta);
                Some(error.abs())
            }
            SketchConstraint::Radius { entity, value } => {
                let idx = *id_map.get(entity)?;
                let current = match &elements[idx].geometry {
                    SketchGeometry::Circle(c) => c.radius(),
                    SketchGeometry::Arc(a) => a.radius(),
                    _ => return None,
                };
                let applied = match &mut elements[idx].geometry {
                    SketchGeometry::Circle(c) => c.set_radius(*value),
                    SketchGeometry::Arc(a) => a.set_radius(*value),
                    _ => return None,
                };
                applied.ok()?;
                Some((current - value).abs())
            }
            SketchConstraint::Fix { point, position } => {
                let p = Self::get_point(elements, id_map, *point)?;
                Self::set_point(elements, id_map, *point, *position);
                Some((p[0] - position[0]).hypot(p[1] - position[1]))
            }
        }
    }

    fn residual(
        elements: &[SketchElement],
        id_map: &HashMap<EntityId, usize>,
        constraint: &SketchConstraint,
    ) -> Option<f64> {
        let mut scratch = elements.to_vec();
        Self::project(&mut scratch, id_map, &HashSet::new(), constraint)
    }
}

fn id_map(elements: &[SketchElement]) -> HashMap<EntityId, usize> {
    elements.iter().enumerate().map(|(i, e)| (e.id, i)).collect()
}

impl ConstraintSolver for RelaxationSolver {
    fn solve(&self, elements: &mut [SketchElement], constraints: &[SketchConstraint]) -> bool {
        if !self.validate(elements, constraints) {
            debug!("constraint system is malformed, refusing to solve");
            return false;
        }
        let id_map = id_map(elements);
        let fixed: HashSet<ConstraintPoint> = constraints
            .iter()
            .filter_map(|c| match c {
                SketchConstraint::Fix { point, .. } => Some(*point),
                _ => None,
            })
            .collect();

        for iteration in 0..self.max_iterations {
            let mut max_error: f64 = 0.0;
            for constraint in constraints {
                if let Some(error) = Self::project(elements, &id_map, &fixed, constraint) {
                    max_error = max_error.max(error);
                }
            }
            trace!(iteration, max_error, "relaxation pass");
            if max_error < self.epsilon {
                debug!(iterations = iteration + 1, "constraints converged");
                return true;
            }
        }

        // The last pass may have converged after its own residuals were measured.
        let converged = constraints
            .iter()
            .all(|c| Self::residual(elements, &id_map, c).map_or(false, |e| e < self.epsilon));
        if !converged {
            debug!(max_iterations = self.max_iterations, "constraints did not converge");
        }
        converged
    }

    fn validate(&self, elements: &[SketchElement], constraints: &[SketchConstraint]) -> bool {
        let id_map = id_map(elements);
        let has_point = |cp: &ConstraintPoint| {
            id_map
                .get(&cp.id)
                .and_then(|idx| elements[*idx].point(cp.index))
                .is_some()
        };
        let mut fixes: HashMap<ConstraintPoint, [f64; 2]> = HashMap::new();

        constraints.iter().all(|constraint| match constraint {
            SketchConstraint::Coincident { points } => points.iter().all(has_point),
            SketchConstraint::Distance { points, value } => {
                value.is_finite() && *value >= 0.0 && points.iter().all(has_point)
            }
            SketchConstraint::Horizontal { entity } | SketchConstraint::Vertical { entity } => {
                Self::line_points(elements, &id_map, *entity).is_some()
            }
            SketchConstraint::Radius { entity, value } => {
                value.is_finite()
                    && *value > 0.0
                    && id_map.get(entity).map_or(false, |idx| {
                        matches!(
                            elements[*idx].geometry,
                            SketchGeometry::Circle(_) | SketchGeometry::Arc(_)
                        )
                    })
            }
            SketchConstraint::Fix { point, position } => {
                // Two different anchors for the same point can never both hold.
                let consistent = match fixes.insert(*point, *position) {
                    Some(prev) => (prev[0] - position[0]).hypot(prev[1] - position[1]) < self.epsilon,
                    None => true,
                };
                consistent && has_point(point)
            }
        })
    }
}
