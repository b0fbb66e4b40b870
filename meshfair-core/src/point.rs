//! Point types and related functionality

use nalgebra::{Matrix3, Point3, Vector3};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// A 3x3 double precision matrix, used for local frames and tensors
pub type Matrix3d = Matrix3<f64>;

/// Squared Euclidean distance between two points
#[inline]
pub fn distance_squared(a: &Point3d, b: &Point3d) -> f64 {
    (b - a).norm_squared()
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: &Point3d, b: &Point3d) -> f64 {
    (b - a).norm()
}
