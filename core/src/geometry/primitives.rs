use super::{Point3, UnitVector3, Vector3, EPSILON};

/// Pick a deterministic unit vector perpendicular to `axis`.
///
/// The world axis least aligned with `axis` is crossed with it, so the
/// result is stable for a given input.
pub fn perpendicular(axis: &UnitVector3) -> UnitVector3 {
    let a = axis.into_inner();
    let helper = if a.x.abs() <= a.y.abs() && a.x.abs() <= a.z.abs() {
        Vector3::x()
    } else if a.y.abs() <= a.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    UnitVector3::new_normalize(a.cross(&helper))
}

/// Circle through three points: returns (center, radius).
///
/// None when the points are (nearly) collinear.
pub fn circumcircle(p1: &Point3, p2: &Point3, p3: &Point3) -> Option<(Point3, f64)> {
    let a = p1 - p3;
    let b = p2 - p3;
    let axb = a.cross(&b);
    let denom = 2.0 * axb.norm_squared();
    if denom < EPSILON * EPSILON {
        return None;
    }
    let offset = (b * a.norm_squared() - a * b.norm_squared()).cross(&axb) / denom;
    let center = p3 + offset;
    Some((center, offset.norm()))
}

/// Newell normal of a closed polyline. Its length is twice the enclosed area.
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let mut n = Vector3::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n
}

/// Area-weighted centroid of a planar closed polyline (fan triangulation).
pub fn polygon_centroid(points: &[Point3]) -> Option<Point3> {
    let anchor = points.first()?;
    let mut weighted = Vector3::zeros();
    let mut total = 0.0;
    let reference = newell_normal(points);
    for pair in points[1..].windows(2) {
        let cross = (pair[0] - anchor).cross(&(pair[1] - anchor));
        let area = 0.5 * cross.dot(&reference).signum() * cross.norm();
        let tri_centroid = (anchor.coords + pair[0].coords + pair[1].coords) / 3.0;
        weighted += tri_centroid * area;
        total += area;
    }
    if total.abs() < EPSILON * EPSILON {
        return None;
    }
    Some(Point3::from(weighted / total))
}

/// Signed volume enclosed by a triangle soup (divergence theorem).
pub fn signed_volume<'a>(triangles: impl IntoIterator<Item = [&'a Point3; 3]>) -> f64 {
    triangles
        .into_iter()
        .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)))
        .sum::<f64>()
        / 6.0
}

/// Resample a polyline to `count` points spaced evenly by arc length.
///
/// For a closed polyline the closing segment is included and the first
/// point is not repeated at the end.
pub fn resample_polyline(points: &[Point3], count: usize, closed: bool) -> Vec<Point3> {
    if points.len() < 2 || count < 2 {
        return points.to_vec();
    }
    let mut path: Vec<Point3> = points.to_vec();
    if closed {
        path.push(points[0]);
    }
    let mut cumulative = Vec::with_capacity(path.len());
    cumulative.push(0.0);
    for pair in path.windows(2) {
        let last = cumulative[cumulative.len() - 1];
        cumulative.push(last + (pair[1] - pair[0]).norm());
    }
    let total = cumulative[cumulative.len() - 1];
    if total < EPSILON {
        return vec![path[0]; count];
    }

    let steps = if closed { count } else { count - 1 };
    let mut out = Vec::with_capacity(count);
    let mut seg = 0;
    for i in 0..count {
        let target = total * i as f64 / steps as f64;
        while seg + 2 < cumulative.len() && cumulative[seg + 1] < target {
            seg += 1;
        }
        let span = cumulative[seg + 1] - cumulative[seg];
        let t = if span < EPSILON { 0.0 } else { (target - cumulative[seg]) / span };
        out.push(path[seg] + (path[seg + 1] - path[seg]) * t.clamp(0.0, 1.0));
    }
    out
}

/// Uniform Catmull-Rom interpolation between `p1` and `p2` at `t` in [0, 1].
pub fn catmull_rom(p0: &Point3, p1: &Point3, p2: &Point3, p3: &Point3, t: f64) -> Point3 {
    let t2 = t * t;
    let t3 = t2 * t;
    let b0 = -0.5 * t3 + t2 - 0.5 * t;
    let b1 = 1.5 * t3 - 2.5 * t2 + 1.0;
    let b2 = -1.5 * t3 + 2.0 * t2 + 0.5 * t;
    let b3 = 0.5 * t3 - 0.5 * t2;
    Point3::from(p0.coords * b0 + p1.coords * b1 + p2.coords * b2 + p3.coords * b3)
}

/// Shortest distance between segments [p1, q1] and [p2, q2].
pub fn segment_distance(p1: &Point3, q1: &Point3, p2: &Point3, q2: &Point3) -> f64 {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let (s, t) = if a <= f64::EPSILON && e <= f64::EPSILON {
        (0.0, 0.0)
    } else if a <= f64::EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= f64::EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let mut s = if denom > f64::EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };
    ((p1 + d1 * s) - (p2 + d2 * t)).norm()
}
