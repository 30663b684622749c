use super::test_support::{circle_sketch, init_tracing, line_sketch, square_sketch, PanickingKernel};
use super::types::{Feature, FeatureError, FeatureOps, FeatureType};
use super::LoftFeature;
use crate::kernel::{AnalyticKernel, BodyKind, SurfaceKind};
use crate::shape::ShapeProperties;
use crate::sketch::{Sketch, SketchPlane};
use std::f64::consts::PI;

fn circles(radii_and_heights: &[(f64, f64)]) -> LoftFeature {
    let mut feature = LoftFeature::default();
    for &(radius, z) in radii_and_heights {
        feature.add_section(circle_sketch(SketchPlane::xy().offset(z), [0.0, 0.0], radius));
    }
    feature
}

#[test]
fn test_defaults() {
    let feature = LoftFeature::default();
    assert_eq!(feature.feature_type(), FeatureType::Loft);
    assert!(feature.is_solid());
    assert!(!feature.is_ruled());
    assert!(!feature.is_closed());
    assert_eq!(feature.section_count(), 0);
    assert_eq!(feature.guide_curve_count(), 0);
}

#[test]
fn test_section_count_and_emptiness() {
    let k = AnalyticKernel::default();
    let mut feature = LoftFeature::default();
    assert!(!feature.validate_parameters());

    feature.add_section(square_sketch(SketchPlane::xy(), 1.0));
    assert!(!feature.validate_parameters());
    assert!(feature.create_shape(&k).is_none());

    feature.add_section(square_sketch(SketchPlane::xy().offset(1.0), 1.0));
    assert!(feature.validate_parameters());

    feature.add_section(Sketch::new("Blank", SketchPlane::xy().offset(2.0)).into_shared());
    assert!(matches!(feature.build(&k), Err(FeatureError::ParameterInvalid(_))));
}

#[test]
fn test_guide_curves_are_checked() {
    let mut feature = circles(&[(1.0, 0.0), (1.0, 2.0)]);
    assert!(feature.validate_parameters());

    let guide = line_sketch(SketchPlane::xz(), [1.0, 0.0], [1.0, 2.0]);
    feature.add_guide_curve(guide.clone());
    assert!(feature.validate_parameters());

    let blank = Sketch::new("Blank guide", SketchPlane::xz()).into_shared();
    feature.add_guide_curve(blank.clone());
    assert!(!feature.validate_parameters());

    assert!(feature.remove_guide_curve(&blank));
    assert!(!feature.remove_guide_curve(&blank));
    assert!(feature.validate_parameters());
    assert_eq!(feature.guide_curves().len(), 1);

    feature.clear_guide_curves();
    assert_eq!(feature.guide_curve_count(), 0);
}

#[test]
fn test_remove_section_compares_handles() {
    let first = square_sketch(SketchPlane::xy(), 1.0);
    let mut feature = LoftFeature::default();
    feature.add_section(first.clone());
    feature.add_section(square_sketch(SketchPlane::xy().offset(1.0), 1.0));

    let lookalike = square_sketch(SketchPlane::xy(), 1.0);
    assert!(!feature.remove_section(&lookalike));
    assert!(feature.remove_section(&first));
    assert_eq!(feature.section_count(), 1);

    feature.clear_sections();
    assert!(feature.sections().is_empty());
}

#[test]
fn test_ruled_loft_between_circles() {
    init_tracing();
    let k = AnalyticKernel::default();
    let mut feature = circles(&[(1.0, 0.0), (1.0, 2.0)]);
    feature.set_ruled(true);

    let shape = feature.create_shape(&k).unwrap();
    assert!(shape.is_solid());
    assert!((shape.volume() - 2.0 * PI).abs() < 1e-2);
    assert_eq!(shape.body().faces_of(SurfaceKind::Ruled).count(), 1);
    assert_eq!(shape.body().faces_of(SurfaceKind::Planar).count(), 2);
    let bounds = shape.bounding_box();
    assert!(bounds.min.z.abs() < 1e-9);
    assert!((bounds.max.z - 2.0).abs() < 1e-9);
}

#[test]
fn test_ruled_loft_between_squares() {
    let k = AnalyticKernel::default();
    let mut feature = LoftFeature::default();
    feature.add_section(square_sketch(SketchPlane::xy(), 2.0));
    feature.add_section(square_sketch(SketchPlane::xy().offset(3.0), 2.0));
    feature.set_ruled(true);

    let shape = feature.create_shape(&k).unwrap();
    assert!((shape.volume() - 12.0).abs() < 1e-6);
}

#[test]
fn test_smooth_loft_bulges_through_middle_section() {
    let k = AnalyticKernel::default();
    let mut ruled = circles(&[(1.0, 0.0), (2.0, 1.0), (1.0, 2.0)]);
    ruled.set_ruled(true);
    let smooth = circles(&[(1.0, 0.0), (2.0, 1.0), (1.0, 2.0)]);

    let ruled_shape = ruled.create_shape(&k).unwrap();
    let smooth_shape = smooth.create_shape(&k).unwrap();
    assert!(smooth_shape.volume() > ruled_shape.volume());
    assert_eq!(smooth_shape.body().faces_of(SurfaceKind::Lofted).count(), 2);
    let extent = smooth_shape.bounding_box().extent();
    assert!((extent.x - 4.0).abs() < 1e-2);
}

#[test]
fn test_shell_loft() {
    let k = AnalyticKernel::default();
    let mut feature = circles(&[(1.0, 0.0), (1.0, 1.0)]);
    feature.set_solid(false);
    feature.set_ruled(true);

    let shape = feature.create_shape(&k).unwrap();
    assert_eq!(shape.body().kind, BodyKind::Shell);
    assert!(!shape.is_solid());
    assert_eq!(shape.volume(), 0.0);
    assert_eq!(shape.face_count(), 1);
}

#[test]
fn test_open_sections_need_shell_mode() {
    let k = AnalyticKernel::default();
    let mut feature = LoftFeature::default();
    feature.add_section(line_sketch(SketchPlane::xy(), [0.0, 0.0], [1.0, 0.0]));
    feature.add_section(line_sketch(SketchPlane::xy().offset(1.0), [0.0, 0.0], [1.0, 0.0]));
    feature.set_ruled(true);

    assert!(matches!(
        feature.build(&k),
        Err(FeatureError::KernelConstructionFailed(_))
    ));

    feature.set_solid(false);
    let shape = feature.create_shape(&k).unwrap();
    assert!((shape.body().faces[0].area - 1.0).abs() < 1e-9);
}

#[test]
fn test_section_without_edges_aborts_the_loft() {
    let k = AnalyticKernel::default();
    let mut dots = Sketch::new("Dots", SketchPlane::xy().offset(1.0));
    dots.add_point([0.0, 0.0]);
    dots.add_point([1.0, 0.0]);

    let mut feature = LoftFeature::default();
    feature.add_section(circle_sketch(SketchPlane::xy(), [0.0, 0.0], 1.0));
    feature.add_section(dots.into_shared());
    feature.add_section(circle_sketch(SketchPlane::xy().offset(2.0), [0.0, 0.0], 1.0));

    assert!(feature.validate_parameters());
    assert!(matches!(feature.build(&k), Err(FeatureError::EmptyOrDegenerateWire(_))));
    assert!(feature.create_shape(&k).is_none());
}

#[test]
fn test_kernel_panic_is_contained() {
    let k = PanickingKernel(AnalyticKernel::default());
    let feature = circles(&[(1.0, 0.0), (1.0, 1.0)]);
    match feature.build(&k) {
        Err(FeatureError::KernelException(msg)) => assert!(msg.contains("skinning")),
        other => panic!("expected a kernel exception, got {:?}", other),
    }
}

#[test]
fn test_dispatch_through_feature() {
    let k = AnalyticKernel::default();
    let feature: Feature = circles(&[(1.0, 0.0), (1.0, 1.0)]).into();
    assert_eq!(feature.feature_type(), FeatureType::Loft);
    let shape = feature.create_shape(&k).unwrap();
    assert_eq!(shape.source(), FeatureType::Loft);
}
