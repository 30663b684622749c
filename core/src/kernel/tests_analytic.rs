use super::*;
use crate::geometry::{Point3, Vector3};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI};

fn kernel() -> AnalyticKernel {
    AnalyticKernel::default()
}

fn circle_wire(k: &AnalyticKernel, center: Point3, axis: Vector3, radius: f64) -> EdgeChain {
    let edge = k.circle_edge(&center, &axis, radius).unwrap();
    k.make_wire(vec![edge]).unwrap()
}

fn polygon_wire(k: &AnalyticKernel, points: &[Point3]) -> EdgeChain {
    let edges = (0..points.len())
        .map(|i| k.line_edge(&points[i], &points[(i + 1) % points.len()]).unwrap())
        .collect();
    k.make_wire(edges).unwrap()
}

fn square(z: f64, size: f64) -> Vec<Point3> {
    vec![
        Point3::new(0.0, 0.0, z),
        Point3::new(size, 0.0, z),
        Point3::new(size, size, z),
        Point3::new(0.0, size, z),
    ]
}

fn assert_rel(actual: f64, expected: f64, rel: f64) {
    assert!(
        ((actual - expected) / expected).abs() < rel,
        "expected {} got {}",
        expected,
        actual
    );
}

#[test]
fn test_arc_edge_orientation() {
    let k = kernel();
    let ccw = k
        .arc_edge(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
    let EdgeCurve::Arc { axis, sweep, radius, .. } = &ccw else {
        panic!("expected an arc");
    };
    assert!((axis.z - 1.0).abs() < 1e-12);
    assert!((sweep - FRAC_PI_2).abs() < 1e-12);
    assert!((radius - 1.0).abs() < 1e-12);
    assert!((ccw.point_at(1.0) - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-12);

    let major = k
        .arc_edge(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::new(0.0, -1.0, 0.0),
        )
        .unwrap();
    assert!((major.length() - 1.5 * PI).abs() < 1e-9);
}

#[test]
fn test_degenerate_edges_are_rejected() {
    let k = kernel();
    let p = Point3::new(1.0, 1.0, 1.0);
    assert!(matches!(k.line_edge(&p, &p), Err(KernelOpError::InvalidGeometry(_))));
    assert!(k.circle_edge(&p, &Vector3::z(), 0.0).is_err());
    assert!(k.circle_edge(&p, &Vector3::zeros(), 1.0).is_err());
    assert!(k
        .arc_edge(&Point3::origin(), &Point3::new(1.0, 0.0, 0.0), &Point3::new(2.0, 0.0, 0.0))
        .is_err());
}

#[test]
fn test_circle_face_is_exact() {
    let k = kernel();
    let wire = circle_wire(&k, Point3::new(1.0, 2.0, 3.0), Vector3::z(), 2.0);
    assert!(k.is_closed(&wire));
    let face = k.planar_face(&wire).unwrap();
    assert!((face.area - 4.0 * PI).abs() < 1e-12);
    assert!((face.centroid - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-12);
}

#[test]
fn test_open_wire_has_no_face() {
    let k = kernel();
    let a = k.line_edge(&Point3::origin(), &Point3::new(1.0, 0.0, 0.0)).unwrap();
    let b = k.line_edge(&Point3::new(1.0, 0.0, 0.0), &Point3::new(1.0, 1.0, 0.0)).unwrap();
    let wire = k.make_wire(vec![a, b]).unwrap();
    assert!(!k.is_closed(&wire));
    assert!(k.planar_face(&wire).is_err());
}

#[test]
fn test_non_planar_wire_has_no_face() {
    let k = kernel();
    let wire = polygon_wire(
        &k,
        &[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
    );
    assert!(k.planar_face(&wire).is_err());
}

#[test]
fn test_half_disc_face_area() {
    let k = kernel();
    let arc = k
        .arc_edge(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::new(-1.0, 0.0, 0.0),
        )
        .unwrap();
    let diameter = k.line_edge(&Point3::new(-1.0, 0.0, 0.0), &Point3::new(1.0, 0.0, 0.0)).unwrap();
    let wire = k.make_wire(vec![arc, diameter]).unwrap();
    let face = k.planar_face(&wire).unwrap();
    assert_rel(face.area, FRAC_PI_2, 1e-3);
    // centroid of a half disc sits 4r/3π above the diameter
    assert!((face.centroid.y - 4.0 / (3.0 * PI)).abs() < 1e-3);
}

#[test]
fn test_extrude_square() {
    let k = kernel();
    let face = k.planar_face(&polygon_wire(&k, &square(0.0, 2.0))).unwrap();
    let body = k.linear_sweep(&face, &Vector3::new(0.0, 0.0, 3.0)).unwrap();
    assert_eq!(body.kind, BodyKind::Solid);
    assert!((body.volume - 12.0).abs() < 1e-9);
    assert_eq!(body.faces.len(), 6);
    assert_eq!(body.faces_of(SurfaceKind::Planar).count(), 6);
    assert!((body.bounds.extent() - Vector3::new(2.0, 2.0, 3.0)).norm() < 1e-12);
}

#[test]
fn test_extrude_circle_caps() {
    let k = kernel();
    let face = k.planar_face(&circle_wire(&k, Point3::origin(), Vector3::z(), 1.5)).unwrap();
    let body = k.linear_sweep(&face, &Vector3::new(0.0, 0.0, -4.0)).unwrap();
    assert!((body.volume - PI * 1.5 * 1.5 * 4.0).abs() < 1e-9);

    let caps: Vec<_> = body.faces_of(SurfaceKind::Planar).collect();
    assert_eq!(caps.len(), 2);
    assert!(((caps[0].centroid - caps[1].centroid).norm() - 4.0).abs() < 1e-12);
    for cap in &caps {
        assert!((cap.area - PI * 2.25).abs() < 1e-9);
    }
    let side: Vec<_> = body.faces_of(SurfaceKind::Extruded).collect();
    assert_eq!(side.len(), 1);
    assert_rel(side[0].area, 2.0 * PI * 1.5 * 4.0, 1e-3);
}

#[test]
fn test_oblique_extrude_uses_normal_height() {
    let k = kernel();
    let face = k.planar_face(&polygon_wire(&k, &square(0.0, 1.0))).unwrap();
    let body = k.linear_sweep(&face, &Vector3::new(3.0, 0.0, 2.0)).unwrap();
    assert!((body.volume - 2.0).abs() < 1e-9);

    let err = k.linear_sweep(&face, &Vector3::new(1.0, 1.0, 0.0)).unwrap_err();
    assert!(matches!(err, KernelOpError::InvalidGeometry(_)));
}

#[test]
fn test_ruled_loft_of_two_circles() {
    let k = kernel();
    let sections = vec![
        circle_wire(&k, Point3::origin(), Vector3::z(), 1.0),
        circle_wire(&k, Point3::new(0.0, 0.0, 5.0), Vector3::z(), 1.0),
    ];
    let options = LoftOptions { solid: true, ruled: true, tolerance: 1e-6 };
    let body = k.loft(&sections, &options).unwrap();
    assert_eq!(body.kind, BodyKind::Solid);
    assert_rel(body.volume, PI * 5.0, 1e-3);
    assert_eq!(body.faces_of(SurfaceKind::Ruled).count(), 1);
    assert_eq!(body.faces_of(SurfaceKind::Planar).count(), 2);
    assert!((body.bounds.extent().z - 5.0).abs() < 1e-9);
}

#[test]
fn test_loft_aligns_flipped_sections() {
    let k = kernel();
    let options = LoftOptions { solid: true, ruled: true, tolerance: 1e-6 };
    let aligned = k
        .loft(
            &[
                circle_wire(&k, Point3::origin(), Vector3::z(), 1.0),
                circle_wire(&k, Point3::new(0.0, 0.0, 2.0), Vector3::z(), 1.0),
            ],
            &options,
        )
        .unwrap();
    let flipped = k
        .loft(
            &[
                circle_wire(&k, Point3::origin(), Vector3::z(), 1.0),
                circle_wire(&k, Point3::new(0.0, 0.0, 2.0), -Vector3::z(), 1.0),
            ],
            &options,
        )
        .unwrap();
    assert_rel(flipped.volume, aligned.volume, 1e-3);
}

#[test]
fn test_smooth_loft_passes_through_sections() {
    let k = kernel();
    let sections = vec![
        circle_wire(&k, Point3::origin(), Vector3::z(), 1.0),
        circle_wire(&k, Point3::new(0.0, 0.0, 2.0), Vector3::z(), 2.0),
        circle_wire(&k, Point3::new(0.0, 0.0, 4.0), Vector3::z(), 1.0),
    ];
    let smooth = k.loft(&sections, &LoftOptions::default()).unwrap();
    let ruled = k
        .loft(&sections, &LoftOptions { ruled: true, ..LoftOptions::default() })
        .unwrap();

    assert_eq!(smooth.faces_of(SurfaceKind::Lofted).count(), 2);
    // the middle section bulges the smooth skin past the ruled one
    assert!(smooth.volume > ruled.volume);
    assert!((smooth.bounds.extent().x - 4.0).abs() < 1e-2);
}

#[test]
fn test_loft_requirements() {
    let k = kernel();
    let one = vec![circle_wire(&k, Point3::origin(), Vector3::z(), 1.0)];
    assert!(k.loft(&one, &LoftOptions::default()).is_err());

    let open = |z: f64| {
        let edge = k.line_edge(&Point3::new(0.0, 0.0, z), &Point3::new(1.0, 0.0, z)).unwrap();
        k.make_wire(vec![edge]).unwrap()
    };
    let sections = vec![open(0.0), open(1.0)];
    assert!(k.loft(&sections, &LoftOptions::default()).is_err());

    let shell = k
        .loft(&sections, &LoftOptions { solid: false, ruled: true, tolerance: 1e-6 })
        .unwrap();
    assert_eq!(shell.kind, BodyKind::Shell);
    assert_eq!(shell.volume, 0.0);
    assert!((shell.faces[0].area - 1.0).abs() < 1e-9);
}

#[test]
fn test_pipe_along_straight_spine() {
    let k = kernel();
    let spine_edge = k.line_edge(&Point3::origin(), &Point3::new(0.0, 0.0, 10.0)).unwrap();
    let spine = k.make_wire(vec![spine_edge]).unwrap();
    let section = circle_wire(&k, Point3::origin(), Vector3::z(), 0.5);

    let body = k.pipe(&spine, &section).unwrap();
    assert_eq!(body.kind, BodyKind::Solid);
    assert_rel(body.volume, PI * 0.25 * 10.0, 1e-3);
    assert!((body.bounds.min.z).abs() < 1e-12);
    assert!((body.bounds.max.z - 10.0).abs() < 1e-12);
    assert_eq!(body.faces_of(SurfaceKind::Swept).count(), 1);
    assert_eq!(body.faces_of(SurfaceKind::Planar).count(), 2);
}

#[test]
fn test_pipe_along_quarter_arc_follows_pappus() {
    let k = kernel();
    let bend = 5.0;
    let arc = k
        .arc_edge(
            &Point3::origin(),
            &Point3::new(bend * (1.0 - FRAC_1_SQRT_2), 0.0, bend * FRAC_1_SQRT_2),
            &Point3::new(bend, 0.0, bend),
        )
        .unwrap();
    let spine = k.make_wire(vec![arc]).unwrap();
    let section = circle_wire(&k, Point3::origin(), Vector3::z(), 0.5);

    let body = k.pipe(&spine, &section).unwrap();
    let expected = PI * 0.25 * bend * FRAC_PI_2;
    assert_rel(body.volume, expected, 1e-2);
    assert!((body.bounds.max.z - bend).abs() < 0.6);
}

#[test]
fn test_pipe_open_section_gives_shell() {
    let k = kernel();
    let spine_edge = k.line_edge(&Point3::origin(), &Point3::new(0.0, 0.0, 3.0)).unwrap();
    let spine = k.make_wire(vec![spine_edge]).unwrap();
    let section_edge = k.line_edge(&Point3::origin(), &Point3::new(2.0, 0.0, 0.0)).unwrap();
    let section = k.make_wire(vec![section_edge]).unwrap();

    let body = k.pipe(&spine, &section).unwrap();
    assert_eq!(body.kind, BodyKind::Shell);
    assert!((body.faces[0].area - 6.0).abs() < 1e-9);
}

#[test]
fn test_pipe_rejects_bad_spines() {
    let k = kernel();
    let section = circle_wire(&k, Point3::origin(), Vector3::x(), 0.1);

    let crossing = polyline_wire(
        &k,
        &[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 5.0, 0.0),
            Point3::new(5.0, -5.0, 0.0),
        ],
    );
    assert!(matches!(k.pipe(&crossing, &section), Err(KernelOpError::Fault(_))));

    let folded = polyline_wire(
        &k,
        &[Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)],
    );
    assert!(matches!(k.pipe(&folded, &section), Err(KernelOpError::Fault(_))));

    let there_and_back = polyline_wire(
        &k,
        &[Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 10.0), Point3::new(0.0, 0.0, 0.0)],
    );
    assert!(!there_and_back.closed);
    assert!(matches!(k.pipe(&there_and_back, &section), Err(KernelOpError::Fault(_))));

    let doubled = EdgeChain {
        closed: true,
        ..there_and_back
    };
    assert!(matches!(k.pipe(&doubled, &section), Err(KernelOpError::Fault(_))));
}

fn polyline_wire(k: &AnalyticKernel, points: &[Point3]) -> EdgeChain {
    let edges = points.windows(2).map(|w| k.line_edge(&w[0], &w[1]).unwrap()).collect();
    k.make_wire(edges).unwrap()
}

#[test]
fn test_loft_is_deterministic() {
    let k = kernel();
    let sections = vec![
        polygon_wire(&k, &square(0.0, 1.0)),
        circle_wire(&k, Point3::new(0.5, 0.5, 3.0), Vector3::z(), 0.5),
    ];
    let a = k.loft(&sections, &LoftOptions::default()).unwrap();
    let b = k.loft(&sections, &LoftOptions::default()).unwrap();
    assert_eq!(a, b);
}
