use nalgebra as na;

pub type Point3 = na::Point3<f64>;
pub type Vector3 = na::Vector3<f64>;
pub type UnitVector3 = na::Unit<na::Vector3<f64>>;
pub type Rotation3 = na::UnitQuaternion<f64>;

pub const EPSILON: f64 = 1e-6;

pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() < EPSILON
    }
}

impl ApproxEq for Point3 {
    fn approx_eq(&self, other: &Self) -> bool {
        na::distance_squared(self, other) < EPSILON * EPSILON
    }
}

impl ApproxEq for Vector3 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).norm_squared() < EPSILON * EPSILON
    }
}

pub mod primitives;
pub use primitives::*;

pub mod bounds;
pub use bounds::BoundingBox;

pub fn dist_sq(p1: &Point3, p2: &Point3) -> f64 {
    na::distance_squared(p1, p2)
}

/// True when the two points lie within `tolerance` of each other.
pub fn coincident(p1: &Point3, p2: &Point3, tolerance: f64) -> bool {
    dist_sq(p1, p2) <= tolerance * tolerance
}
