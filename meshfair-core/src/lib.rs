//! Core data structures for meshfair
//!
//! This crate provides the mesh model used by the smoothing algorithms:
//! points, polygon meshes with named per-vertex attribute arrays, the vertex
//! adjacency table and edge length statistics.

pub mod point;
pub mod attributes;
pub mod mesh;
pub mod adjacency;
pub mod error;

pub use point::*;
pub use attributes::*;
pub use mesh::*;
pub use adjacency::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix3, Point3, Vector3};
