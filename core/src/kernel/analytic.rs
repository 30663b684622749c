//! Analytic reference kernel.
//!
//! Curves are kept exact ([`EdgeCurve`]); surfaces and solids are evaluated
//! from sampled rings. Volumes come from the divergence theorem over a closed
//! triangle soup, faces are reported as a census of [`FaceRecord`]s. The
//! result is deterministic for a given input, which makes this kernel the
//! default for tests and for headless property queries.

use super::chain::chain_edges;
use super::types::{EdgeChain, EdgeCurve};
use super::{GeometryKernel, KernelOpError, KernelResult, LoftOptions};
use crate::config::ModelingConfig;
use crate::geometry::{
    catmull_rom, newell_normal, polygon_centroid, resample_polyline, segment_distance,
    signed_volume, BoundingBox, Point3, Rotation3, UnitVector3, Vector3,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::ops::Range;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct AnalyticKernel {
    /// Distance below which two points are the same vertex.
    pub tolerance: f64,
    pub samples_per_turn: usize,
    pub ring_samples: usize,
    pub smooth_subdivisions: usize,
}

impl AnalyticKernel {
    pub fn new() -> Self {
        Self::from_config(&ModelingConfig::default())
    }

    pub fn from_config(config: &ModelingConfig) -> Self {
        Self {
            tolerance: config.coincidence_tolerance,
            samples_per_turn: config.samples_per_turn,
            ring_samples: config.ring_samples,
            smooth_subdivisions: config.smooth_subdivisions,
        }
    }
}

impl Default for AnalyticKernel {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Solid,
    Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceKind {
    Planar,
    /// Curved edge swept along a straight vector.
    Extruded,
    Ruled,
    Lofted,
    Swept,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub surface: SurfaceKind,
    pub area: f64,
    pub centroid: Point3,
    /// Outward normal, only for planar faces.
    pub normal: Option<Vector3>,
}

/// Planar region bounded by a closed wire.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticFace {
    pub boundary: EdgeChain,
    pub outline: Vec<Point3>,
    pub normal: UnitVector3,
    pub area: f64,
    pub centroid: Point3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticBody {
    pub kind: BodyKind,
    /// Enclosed volume; zero for shells.
    pub volume: f64,
    pub bounds: BoundingBox,
    pub faces: Vec<FaceRecord>,
}

impl AnalyticBody {
    pub fn faces_of(&self, surface: SurfaceKind) -> impl Iterator<Item = &FaceRecord> + '_ {
        self.faces.iter().filter(move |f| f.surface == surface)
    }
}

/// Stack of equally sized point rings forming a tube.
struct Tube {
    rings: Vec<Vec<Point3>>,
    closed: bool,
}

impl Tube {
    fn segments(&self) -> usize {
        let n = self.rings.first().map_or(0, Vec::len);
        if self.closed {
            n
        } else {
            n.saturating_sub(1)
        }
    }

    fn quad(&self, step: usize, segment: usize) -> [[&Point3; 3]; 2] {
        let a = &self.rings[step];
        let b = &self.rings[step + 1];
        let next = (segment + 1) % a.len();
        [
            [&a[segment], &a[next], &b[next]],
            [&a[segment], &b[next], &b[segment]],
        ]
    }

    /// Area and centroid of the lateral patch over the given steps and segments.
    fn patch(&self, steps: Range<usize>, segments: Range<usize>) -> (f64, Point3) {
        let mut area = 0.0;
        let mut weighted = Vector3::zeros();
        for step in steps {
            for segment in segments.clone() {
                for [a, b, c] in self.quad(step, segment) {
                    let tri = 0.5 * (b - a).cross(&(c - a)).norm();
                    weighted += (a.coords + b.coords + c.coords) / 3.0 * tri;
                    area += tri;
                }
            }
        }
        let centroid = if area > 0.0 {
            Point3::from(weighted / area)
        } else {
            Point3::origin()
        };
        (area, centroid)
    }

    fn cap(ring: &[Point3]) -> Option<(f64, Point3, Vector3)> {
        let normal = newell_normal(ring);
        let centroid = polygon_centroid(ring)?;
        Some((0.5 * normal.norm(), centroid, normal))
    }

    /// Enclosed volume of the tube closed by planar end caps.
    fn capped_volume(&self, first: &Point3, last: &Point3) -> f64 {
        let steps = self.rings.len() - 1;
        let segments = self.segments();
        let lateral = (0..steps)
            .flat_map(move |step| (0..segments).flat_map(move |seg| self.quad(step, seg)));
        let head = &self.rings[0];
        let tail = &self.rings[steps];
        let n = head.len();
        let head_cap = (0..n).map(move |j| [first, &head[(j + 1) % n], &head[j]]);
        let tail_cap = (0..n).map(move |j| [last, &tail[j], &tail[(j + 1) % n]]);
        signed_volume(lateral.chain(head_cap).chain(tail_cap)).abs()
    }

    /// Volume of a tube whose last ring closes back onto the first.
    fn closed_volume(&self) -> f64 {
        let steps = self.rings.len() - 1;
        let segments = self.segments();
        signed_volume(
            (0..steps).flat_map(move |step| (0..segments).flat_map(move |seg| self.quad(step, seg))),
        )
        .abs()
    }

    fn bounds(&self) -> KernelResult<BoundingBox> {
        BoundingBox::from_points(self.rings.iter().flatten())
            .ok_or_else(|| KernelOpError::InvalidGeometry("empty tube".into()))
    }
}

/// Points along a single edge with the closing point included for circles.
fn edge_polyline(edge: &EdgeCurve, samples_per_turn: usize) -> Vec<Point3> {
    let mut points = edge.sample(samples_per_turn);
    if edge.is_closed() {
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
    }
    points
}

/// Ring sampled on the curves themselves, with the segment range each edge
/// of the chain occupies.
fn edge_ring(chain: &EdgeChain, samples_per_turn: usize) -> (Vec<Point3>, Vec<Range<usize>>) {
    let mut points = Vec::new();
    let mut spans = Vec::with_capacity(chain.edges.len());
    for edge in &chain.edges {
        let count = match edge {
            EdgeCurve::Line { .. } => 1,
            EdgeCurve::Circle { .. } => samples_per_turn.max(8),
            EdgeCurve::Arc { sweep, .. } => ((sweep / TAU) * samples_per_turn as f64).ceil().max(2.0) as usize,
        };
        let offset = points.len();
        points.extend((0..count).map(|i| edge.point_at(i as f64 / count as f64)));
        spans.push(offset..offset + count);
    }
    if !chain.closed {
        if let Some(end) = chain.end_point() {
            points.push(end);
        }
    }
    (points, spans)
}

/// Reverse a closed ring in place while keeping its first point.
fn reverse_ring(ring: &mut [Point3]) {
    if ring.len() > 2 {
        ring[1..].reverse();
    }
}

/// Rotate a closed ring so its seam lines up with `reference`.
fn align_seam(reference: &[Point3], ring: &[Point3]) -> Vec<Point3> {
    let n = ring.len();
    let (Some(rc), Some(c)) = (polygon_centroid(reference), polygon_centroid(ring)) else {
        return ring.to_vec();
    };
    let best = (0..n)
        .map(|shift| {
            let cost: f64 = (0..n)
                .map(|i| ((reference[i] - rc) - (ring[(i + shift) % n] - c)).norm_squared())
                .sum();
            (shift, cost)
        })
        .fold((0, f64::MAX), |best, cand| if cand.1 < best.1 { cand } else { best })
        .0;
    (0..n).map(|i| ring[(i + best) % n]).collect()
}

impl AnalyticKernel {
    fn sampled_ring(&self, wire: &EdgeChain) -> KernelResult<Vec<Point3>> {
        let polyline = wire.polyline(self.samples_per_turn);
        if polyline.len() < 2 {
            return Err(KernelOpError::InvalidGeometry("section has no extent".into()));
        }
        Ok(resample_polyline(&polyline, self.ring_samples, wire.closed))
    }

    /// Rings for each section, wound and seamed consistently with the first.
    fn section_rings(&self, sections: &[EdgeChain], closed: bool) -> KernelResult<Vec<Vec<Point3>>> {
        let mut rings: Vec<Vec<Point3>> = Vec::with_capacity(sections.len());
        for section in sections {
            let mut ring = self.sampled_ring(section)?;
            if let Some(previous) = rings.last() {
                if closed {
                    if newell_normal(&ring).dot(&newell_normal(previous)) < 0.0 {
                        reverse_ring(&mut ring);
                    }
                    ring = align_seam(previous, &ring);
                } else if (ring[0] - previous[0]).norm() > (ring[ring.len() - 1] - previous[0]).norm() {
                    ring.reverse();
                }
            }
            rings.push(ring);
        }
        Ok(rings)
    }

    /// Insert Catmull-Rom rings between the sections; ends are clamped.
    fn smooth_rings(&self, rings: &[Vec<Point3>]) -> Vec<Vec<Point3>> {
        let last = rings.len() - 1;
        let steps = self.smooth_subdivisions + 1;
        let mut out = Vec::with_capacity(last * steps + 1);
        for span in 0..last {
            let p0 = &rings[span.saturating_sub(1)];
            let p1 = &rings[span];
            let p2 = &rings[span + 1];
            let p3 = &rings[(span + 2).min(last)];
            for step in 0..steps {
                let t = step as f64 / steps as f64;
                out.push(
                    (0..p1.len())
                        .map(|i| catmull_rom(&p0[i], &p1[i], &p2[i], &p3[i], t))
                        .collect(),
                );
            }
        }
        out.push(rings[last].clone());
        out
    }

    fn check_spine(&self, path: &[Point3], closed: bool) -> KernelResult<()> {
        let segments = path.len() - 1;
        let direction = |i: usize| (path[i + 1] - path[i]).try_normalize(self.tolerance);
        let mut turns: Vec<(usize, usize)> = (1..segments).map(|i| (i - 1, i)).collect();
        if closed && segments > 1 {
            turns.push((segments - 1, 0));
        }
        for (a, b) in turns {
            let (Some(da), Some(db)) = (direction(a), direction(b)) else {
                return Err(KernelOpError::Fault(format!("spine segment {} has zero length", a)));
            };
            if da.dot(&db) <= -1.0 + 1e-9 {
                return Err(KernelOpError::Fault(format!(
                    "spine reverses between segments {} and {}",
                    a, b
                )));
            }
        }
        for i in 0..segments {
            for j in (i + 2)..segments {
                if closed && i == 0 && j == segments - 1 {
                    continue;
                }
                let d = segment_distance(&path[i], &path[i + 1], &path[j], &path[j + 1]);
                if d < self.tolerance {
                    return Err(KernelOpError::Fault(format!(
                        "spine self-intersects between segments {} and {}",
                        i, j
                    )));
                }
            }
        }
        Ok(())
    }

    /// Rotation-minimising frames along a polyline, relative to its start.
    fn spine_frames(&self, path: &[Point3], closed: bool) -> KernelResult<Vec<Rotation3>> {
        let last = path.len() - 1;
        let tangent = |k: usize| -> Vector3 {
            if closed && (k == 0 || k == last) {
                path[1] - path[last - 1]
            } else if k == 0 {
                path[1] - path[0]
            } else if k == last {
                path[last] - path[last - 1]
            } else {
                path[k + 1] - path[k - 1]
            }
        };

        let mut frames = Vec::with_capacity(path.len());
        let mut current = Rotation3::identity();
        let mut previous = tangent(0);
        frames.push(current);
        for k in 1..path.len() {
            let t = tangent(k);
            if t.norm() <= self.tolerance {
                return Err(KernelOpError::Fault(format!("spine has no tangent at sample {}", k)));
            }
            let step = Rotation3::rotation_between(&previous, &t).ok_or_else(|| {
                KernelOpError::Fault(format!("spine folds back on itself at sample {}", k))
            })?;
            current = step * current;
            frames.push(current);
            previous = t;
        }
        Ok(frames)
    }

    /// Planar end cap with its normal pointing away from the opposite end.
    fn cap_record(ring: &[Point3], opposite: &[Point3]) -> KernelResult<FaceRecord> {
        let (area, centroid, normal) = Tube::cap(ring)
            .ok_or_else(|| KernelOpError::InvalidGeometry("degenerate end cap".into()))?;
        let inward = polygon_centroid(opposite).map_or_else(Vector3::zeros, |c| c - centroid);
        Ok(FaceRecord {
            surface: SurfaceKind::Planar,
            area,
            centroid,
            normal: normal
                .try_normalize(0.0)
                .map(|n| if n.dot(&inward) > 0.0 { -n } else { n }),
        })
    }
}

impl GeometryKernel for AnalyticKernel {
    type Edge = EdgeCurve;
    type Wire = EdgeChain;
    type Face = AnalyticFace;
    type Body = AnalyticBody;

    fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn line_edge(&self, start: &Point3, end: &Point3) -> KernelResult<EdgeCurve> {
        EdgeCurve::line(start, end, self.tolerance)
    }

    fn circle_edge(&self, center: &Point3, axis: &Vector3, radius: f64) -> KernelResult<EdgeCurve> {
        EdgeCurve::circle(center, axis, radius, self.tolerance)
    }

    fn arc_edge(&self, start: &Point3, transit: &Point3, end: &Point3) -> KernelResult<EdgeCurve> {
        EdgeCurve::arc_through(start, transit, end, self.tolerance)
    }

    fn make_wire(&self, edges: Vec<EdgeCurve>) -> KernelResult<EdgeChain> {
        chain_edges(edges, self.tolerance)
    }

    fn is_closed(&self, wire: &EdgeChain) -> bool {
        wire.closed
    }

    fn planar_face(&self, wire: &EdgeChain) -> KernelResult<AnalyticFace> {
        if !wire.closed {
            return Err(KernelOpError::InvalidGeometry("face boundary is not closed".into()));
        }
        let outline = wire.polyline(self.samples_per_turn);

        if let [EdgeCurve::Circle { center, axis, radius, .. }] = wire.edges.as_slice() {
            return Ok(AnalyticFace {
                boundary: wire.clone(),
                outline,
                normal: *axis,
                area: PI * radius * radius,
                centroid: *center,
            });
        }

        let newell = newell_normal(&outline);
        let area = 0.5 * newell.norm();
        let normal = UnitVector3::try_new(newell, self.tolerance * self.tolerance)
            .ok_or_else(|| KernelOpError::InvalidGeometry("face boundary encloses no area".into()))?;
        let centroid = polygon_centroid(&outline)
            .ok_or_else(|| KernelOpError::InvalidGeometry("face boundary encloses no area".into()))?;
        let n = normal.into_inner();
        let off_plane = outline
            .iter()
            .map(|p| (p - centroid).dot(&n).abs())
            .fold(0.0, f64::max);
        if off_plane > self.tolerance.max(1e-9) {
            return Err(KernelOpError::InvalidGeometry(format!(
                "face boundary is not planar (deviation {:.3e})",
                off_plane
            )));
        }
        Ok(AnalyticFace {
            boundary: wire.clone(),
            outline,
            normal,
            area,
            centroid,
        })
    }

    fn linear_sweep(&self, face: &AnalyticFace, vector: &Vector3) -> KernelResult<AnalyticBody> {
        let height = vector.dot(&face.normal.into_inner());
        if height.abs() <= self.tolerance {
            return Err(KernelOpError::InvalidGeometry(
                "sweep vector lies in the face plane".into(),
            ));
        }
        let up = face.normal.into_inner() * height.signum();

        let mut faces = vec![
            FaceRecord {
                surface: SurfaceKind::Planar,
                area: face.area,
                centroid: face.centroid,
                normal: Some(-up),
            },
            FaceRecord {
                surface: SurfaceKind::Planar,
                area: face.area,
                centroid: face.centroid + vector,
                normal: Some(up),
            },
        ];
        for edge in &face.boundary.edges {
            let points = edge_polyline(edge, self.samples_per_turn);
            let area: f64 = points.windows(2).map(|s| (s[1] - s[0]).cross(vector).norm()).sum();
            let record = match edge {
                EdgeCurve::Line { start, end } => FaceRecord {
                    surface: SurfaceKind::Planar,
                    area,
                    centroid: nalgebra::center(start, end) + vector * 0.5,
                    normal: (end - start).cross(vector).try_normalize(0.0),
                },
                _ => FaceRecord {
                    surface: SurfaceKind::Extruded,
                    area,
                    centroid: Point3::from(
                        points.iter().map(|p| p.coords).sum::<Vector3>() / points.len() as f64,
                    ) + vector * 0.5,
                    normal: None,
                },
            };
            faces.push(record);
        }

        let base = BoundingBox::from_points(&face.outline)
            .ok_or_else(|| KernelOpError::InvalidGeometry("empty face".into()))?;
        let body = AnalyticBody {
            kind: BodyKind::Solid,
            volume: face.area * height.abs(),
            bounds: base.union(&base.translated(vector)),
            faces,
        };
        trace!(volume = body.volume, faces = body.faces.len(), "linear sweep");
        Ok(body)
    }

    fn loft(&self, sections: &[EdgeChain], options: &LoftOptions) -> KernelResult<AnalyticBody> {
        if sections.len() < 2 {
            return Err(KernelOpError::InvalidGeometry(format!(
                "loft needs at least two sections, got {}",
                sections.len()
            )));
        }
        let closed = sections[0].closed;
        if sections.iter().any(|s| s.closed != closed) {
            return Err(KernelOpError::InvalidGeometry(
                "loft sections mix open and closed wires".into(),
            ));
        }
        if options.solid && !closed {
            return Err(KernelOpError::InvalidGeometry(
                "solid loft needs closed sections".into(),
            ));
        }

        let sections_rings = self.section_rings(sections, closed)?;
        let rings = if options.ruled {
            sections_rings
        } else {
            self.smooth_rings(&sections_rings)
        };
        let per_span = if options.ruled { 1 } else { self.smooth_subdivisions + 1 };
        let tube = Tube { rings, closed };

        let surface = if options.ruled { SurfaceKind::Ruled } else { SurfaceKind::Lofted };
        let mut faces: Vec<FaceRecord> = (0..sections.len() - 1)
            .map(|span| {
                let (area, centroid) = tube.patch(span * per_span..(span + 1) * per_span, 0..tube.segments());
                FaceRecord {
                    surface,
                    area,
                    centroid,
                    normal: None,
                }
            })
            .collect();

        let bounds = tube.bounds()?;
        if !options.solid {
            debug!(sections = sections.len(), ruled = options.ruled, "lofted shell");
            return Ok(AnalyticBody {
                kind: BodyKind::Shell,
                volume: 0.0,
                bounds,
                faces,
            });
        }

        let head = &tube.rings[0];
        let tail = &tube.rings[tube.rings.len() - 1];
        let head_cap = Self::cap_record(head, tail)?;
        let tail_cap = Self::cap_record(tail, head)?;
        let volume = tube.capped_volume(&head_cap.centroid, &tail_cap.centroid);
        if volume <= self.tolerance {
            return Err(KernelOpError::OperationFailed("loft encloses no volume".into()));
        }
        faces.insert(0, head_cap);
        faces.push(tail_cap);
        debug!(sections = sections.len(), ruled = options.ruled, volume, "lofted solid");
        Ok(AnalyticBody {
            kind: BodyKind::Solid,
            volume,
            bounds,
            faces,
        })
    }

    fn pipe(&self, spine: &EdgeChain, section: &EdgeChain) -> KernelResult<AnalyticBody> {
        let mut path = spine.polyline(self.samples_per_turn);
        if spine.closed {
            if let Some(first) = path.first().copied() {
                path.push(first);
            }
        }
        path.dedup_by(|b, a| (*b - *a).norm() <= self.tolerance);
        if path.len() < 2 || spine.length() <= self.tolerance {
            return Err(KernelOpError::InvalidGeometry("spine has zero length".into()));
        }
        self.check_spine(&path, spine.closed)?;
        let frames = self.spine_frames(&path, spine.closed)?;

        let (profile, spans) = edge_ring(section, self.samples_per_turn);
        let origin = path[0];
        let rings: Vec<Vec<Point3>> = path
            .iter()
            .zip(&frames)
            .map(|(s, frame)| profile.iter().map(|p| s + frame * (p - origin)).collect())
            .collect();
        let tube = Tube {
            rings,
            closed: section.closed,
        };

        let steps = tube.rings.len() - 1;
        let mut faces: Vec<FaceRecord> = spans
            .into_iter()
            .map(|span| {
                let (area, centroid) = tube.patch(0..steps, span);
                FaceRecord {
                    surface: SurfaceKind::Swept,
                    area,
                    centroid,
                    normal: None,
                }
            })
            .collect();
        let bounds = tube.bounds()?;

        if !section.closed {
            return Ok(AnalyticBody {
                kind: BodyKind::Shell,
                volume: 0.0,
                bounds,
                faces,
            });
        }

        let volume = if spine.closed {
            tube.closed_volume()
        } else {
            let head_cap = Self::cap_record(&tube.rings[0], &tube.rings[steps])?;
            let tail_cap = Self::cap_record(&tube.rings[steps], &tube.rings[0])?;
            let volume = tube.capped_volume(&head_cap.centroid, &tail_cap.centroid);
            faces.insert(0, head_cap);
            faces.push(tail_cap);
            volume
        };
        debug!(samples = path.len(), volume, "pipe sweep");
        Ok(AnalyticBody {
            kind: BodyKind::Solid,
            volume,
            bounds,
            faces,
        })
    }
}
