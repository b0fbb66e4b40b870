//! Mesh point and point data smoothing
//!
//! This crate smooths vertex positions and arbitrary per-vertex attribute
//! arrays by iterated weighted averaging over the 1-ring of each vertex:
//! - Uniform (umbrella), inverse distance and Gaussian node weights
//! - Anisotropic Gaussian weights in local frames from geometry tensors or
//!   principal directions
//! - Automatic bandwidth selection from edge length statistics
//! - Taubin-style alternating relaxation to counter shrinkage
//! - Masked smoothing and sign-consistent averaging of direction fields

pub mod kernel;
pub mod diffusion;
pub mod parallel;
pub mod progress;
pub mod smoothing;

pub use kernel::*;
pub use diffusion::*;
pub use parallel::*;
pub use progress::*;
pub use smoothing::*;
