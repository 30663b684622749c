use crate::geometry::{Point3, Vector3};
use crate::kernel::{
    AnalyticBody, AnalyticFace, AnalyticKernel, EdgeChain, EdgeCurve, GeometryKernel, KernelResult,
    LoftOptions,
};
use crate::sketch::{SharedSketch, Sketch, SketchPlane};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn circle_sketch(plane: SketchPlane, center: [f64; 2], radius: f64) -> SharedSketch {
    let mut sketch = Sketch::new("Circle", plane);
    sketch.add_circle(center, radius).unwrap();
    sketch.into_shared()
}

pub fn square_sketch(plane: SketchPlane, size: f64) -> SharedSketch {
    let mut sketch = Sketch::new("Square", plane);
    sketch.add_polygon(&[[0.0, 0.0], [size, 0.0], [size, size], [0.0, size]]);
    sketch.into_shared()
}

pub fn line_sketch(plane: SketchPlane, start: [f64; 2], end: [f64; 2]) -> SharedSketch {
    let mut sketch = Sketch::new("Path", plane);
    sketch.add_line(start, end);
    sketch.into_shared()
}

/// Analytic kernel whose body-producing primitives panic.
pub struct PanickingKernel(pub AnalyticKernel);

impl GeometryKernel for PanickingKernel {
    type Edge = EdgeCurve;
    type Wire = EdgeChain;
    type Face = AnalyticFace;
    type Body = AnalyticBody;

    fn tolerance(&self) -> f64 {
        self.0.tolerance()
    }

    fn line_edge(&self, start: &Point3, end: &Point3) -> KernelResult<EdgeCurve> {
        self.0.line_edge(start, end)
    }

    fn circle_edge(&self, center: &Point3, axis: &Vector3, radius: f64) -> KernelResult<EdgeCurve> {
        self.0.circle_edge(center, axis, radius)
    }

    fn arc_edge(&self, start: &Point3, transit: &Point3, end: &Point3) -> KernelResult<EdgeCurve> {
        self.0.arc_edge(start, transit, end)
    }

    fn make_wire(&self, edges: Vec<EdgeCurve>) -> KernelResult<EdgeChain> {
        self.0.make_wire(edges)
    }

    fn is_closed(&self, wire: &EdgeChain) -> bool {
        self.0.is_closed(wire)
    }

    fn planar_face(&self, wire: &EdgeChain) -> KernelResult<AnalyticFace> {
        self.0.planar_face(wire)
    }

    fn linear_sweep(&self, _face: &AnalyticFace, _vector: &Vector3) -> KernelResult<AnalyticBody> {
        panic!("prism construction blew up")
    }

    fn loft(&self, _sections: &[EdgeChain], _options: &LoftOptions) -> KernelResult<AnalyticBody> {
        panic!("{}", String::from("skinning blew up"))
    }

    fn pipe(&self, _spine: &EdgeChain, _section: &EdgeChain) -> KernelResult<AnalyticBody> {
        panic!("pipe blew up")
    }
}
