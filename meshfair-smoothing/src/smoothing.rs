//! Iterative smoothing of mesh points and point data arrays
//!
//! [`MeshSmoother`] validates a [`SmoothingConfig`] against a mesh, builds
//! the adjacency table and weighting kernel once, and then applies the
//! diffusion step for the requested number of iterations. Results are
//! written back onto the mesh only when the run is finalized, so a
//! configuration error leaves the mesh untouched.
//!
//! # Example
//!
//! ```
//! use meshfair_core::{PolyMesh, Point3d};
//! use meshfair_smoothing::{MeshSmoother, SmoothingConfig, Weighting};
//!
//! let mut mesh = PolyMesh::from_triangles(
//!     vec![
//!         Point3d::new(0.0, 0.0, 0.0),
//!         Point3d::new(1.0, 0.0, 0.0),
//!         Point3d::new(0.5, 1.0, 0.0),
//!         Point3d::new(0.5, 0.5, 0.5),
//!     ],
//!     &[[0, 1, 3], [1, 2, 3], [2, 0, 3]],
//! );
//!
//! let config = SmoothingConfig::default()
//!     .with_weighting(Weighting::Uniform)
//!     .with_iterations(4)
//!     .with_lambda(0.5)
//!     .with_mu(-0.53);
//! MeshSmoother::new(config).smooth(&mut mesh).unwrap();
//! ```

use crate::diffusion::DiffusionStep;
use crate::kernel::*;
use crate::parallel::ParallelConfig;
use crate::progress::Progress;
use log::{debug, warn};
use meshfair_core::{
    average_edge_length, AdjacencyTable, DataArray, EdgeLengthStatistics, Error, Point3d, PolyMesh, Result,
    Vector3d,
};
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Smoothing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of smoothing iterations (at least 1)
    pub iterations: usize,
    /// Relaxation factor of odd iterations
    pub lambda: f64,
    /// Relaxation factor of even iterations (None = always use `lambda`)
    pub mu: Option<f64>,
    /// Kernel bandwidth. Zero derives it from the edge length
    /// distribution, a negative value is a multiple of the mean edge length.
    pub sigma: f64,
    /// Anisotropic bandwidth along the direction of maximum change.
    /// Zero derives it from `sigma`, a negative value is a multiple of the
    /// mean edge length.
    pub max_direction_sigma: f64,
    pub weighting: Weighting,
    /// Point data array of local geometry tensors (6 or 9 components)
    pub geometry_tensor: Option<String>,
    /// Point data array of directions of minimum change (3 components)
    pub min_direction: Option<String>,
    /// Point data array of directions of maximum change (3 components)
    pub max_direction: Option<String>,
    /// Include the vertex itself in its weighted average
    pub include_self: bool,
    /// Smooth vertex positions. Enabled automatically when no array is smoothed.
    pub smooth_points: bool,
    /// Names of point data arrays to smooth
    pub smooth_arrays: Vec<String>,
    /// Per-vertex mask, `false` keeps the input values of that vertex
    pub mask: Option<Vec<bool>>,
    pub parallel: ParallelConfig,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            iterations: 1,
            lambda: 1.0,
            mu: None,
            sigma: 0.0,
            max_direction_sigma: 0.0,
            weighting: Weighting::Default,
            geometry_tensor: None,
            min_direction: None,
            max_direction: None,
            include_self: true,
            smooth_points: false,
            smooth_arrays: Vec::new(),
            mask: None,
            parallel: ParallelConfig::default(),
        }
    }
}

impl SmoothingConfig {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Alternate `lambda` with `mu` on even iterations (Taubin smoothing)
    pub fn with_mu(mut self, mu: f64) -> Self {
        self.mu = Some(mu);
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_max_direction_sigma(mut self, sigma: f64) -> Self {
        self.max_direction_sigma = sigma;
        self
    }

    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_geometry_tensor(mut self, name: impl Into<String>) -> Self {
        self.geometry_tensor = Some(name.into());
        self
    }

    pub fn with_min_direction(mut self, name: impl Into<String>) -> Self {
        self.min_direction = Some(name.into());
        self
    }

    pub fn with_max_direction(mut self, name: impl Into<String>) -> Self {
        self.max_direction = Some(name.into());
        self
    }

    pub fn with_include_self(mut self, include_self: bool) -> Self {
        self.include_self = include_self;
        self
    }

    /// Average over adjacent vertices only
    pub fn adjacent_values_only(self) -> Self {
        self.with_include_self(false)
    }

    pub fn with_points(mut self, smooth_points: bool) -> Self {
        self.smooth_points = smooth_points;
        self
    }

    /// Add a point data array to smooth
    pub fn with_array(mut self, name: impl Into<String>) -> Self {
        self.smooth_arrays.push(name.into());
        self
    }

    pub fn with_mask(mut self, mask: Vec<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Mask from the first component of `array`, non-zero values are smoothed
    pub fn with_mask_array(self, array: &DataArray) -> Self {
        let mask = (0..array.len()).map(|id| array.component(id, 0) != 0.0).collect();
        self.with_mask(mask)
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Resolved Gaussian (or inverse distance) bandwidths of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bandwidths {
    pub sigma1: f64,
    pub sigma2: f64,
}

/// Resolve kernel bandwidths from the configured values and mesh edge lengths
///
/// - `sigma1 == 0`: mean + 3 standard deviations of the edge lengths
/// - `sigma1 < 0`: `|sigma1|` times the mean edge length
/// - `sigma2 < 0`: `|sigma2|` times the mean edge length
/// - `sigma2 == 0`: `2 * sigma1` for tensor based kernels, `sigma1` otherwise
pub fn resolve_bandwidths(
    sigma1: f64,
    sigma2: f64,
    tensor_based: bool,
    points: &[Point3d],
    adjacency: &AdjacencyTable,
) -> Bandwidths {
    let stats = (sigma1 <= 0.0 || sigma2 < 0.0).then(|| EdgeLengthStatistics::compute(points, adjacency));
    let mean = stats.map_or(0.0, |s| s.mean);

    let sigma1 = match stats {
        Some(s) if sigma1 == 0.0 => s.mean + 3.0 * s.std_dev,
        _ if sigma1 < 0.0 => sigma1.abs() * mean,
        _ => sigma1,
    };
    let sigma2 = if sigma2 < 0.0 { sigma2.abs() * mean } else { sigma2 };
    let sigma2 = if sigma2 == 0.0 {
        if tensor_based {
            2.0 * sigma1
        } else {
            sigma1
        }
    } else {
        sigma2
    };
    Bandwidths { sigma1, sigma2 }
}

/// Relaxation factor of a 1-based iteration
#[inline]
pub fn relaxation_factor(lambda: f64, mu: Option<f64>, iteration: usize) -> f64 {
    match mu {
        Some(mu) if !mu.is_nan() && iteration % 2 == 0 => mu,
        _ => lambda,
    }
}

/// Source of the per-vertex frames of an anisotropic kernel
enum Anisotropy<'m> {
    Tensor(&'m DataArray),
    Directions {
        normals: Option<Vec<Vector3d>>,
        min: Option<&'m DataArray>,
        max: Option<&'m DataArray>,
    },
}

fn non_empty(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|n| !n.is_empty())
}

fn require_array<'m>(mesh: &'m PolyMesh, name: &str) -> Result<&'m DataArray> {
    let array = mesh.array(name).ok_or_else(|| {
        let available: Vec<_> = mesh.point_data.names().collect();
        Error::configuration(format!(
            "missing input point data array named '{}' (available: {})",
            name,
            available.join(", ")
        ))
    })?;
    if array.len() != mesh.vertex_count() {
        return Err(Error::configuration(format!(
            "point data array '{}' has {} tuples, mesh has {} vertices",
            name,
            array.len(),
            mesh.vertex_count()
        )));
    }
    Ok(array)
}

fn require_direction<'m>(mesh: &'m PolyMesh, name: &str) -> Result<&'m DataArray> {
    let array = require_array(mesh, name)?;
    if array.components() != 3 {
        return Err(Error::configuration(format!(
            "invalid direction array '{}': must have 3 components, found {}",
            name,
            array.components()
        )));
    }
    Ok(array)
}

/// Smoothing filter for mesh points and point data
#[derive(Debug, Clone, Default)]
pub struct MeshSmoother {
    config: SmoothingConfig,
    adjacency: Option<AdjacencyTable>,
    progress: Progress,
}

impl MeshSmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            config,
            adjacency: None,
            progress: Progress::none(),
        }
    }

    pub fn config(&self) -> &SmoothingConfig {
        &self.config
    }

    /// Reuse a prebuilt adjacency table instead of deriving it from the mesh
    pub fn with_adjacency(mut self, adjacency: AdjacencyTable) -> Self {
        self.adjacency = Some(adjacency);
        self
    }

    /// Observer invoked after every iteration
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Initialize, run all iterations and publish the results onto `mesh`
    ///
    /// Returns the adjacency table for reuse.
    pub fn smooth(&self, mesh: &mut PolyMesh) -> Result<AdjacencyTable> {
        let mut run = self.initialize(mesh)?;
        run.run();
        run.finalize(mesh)
    }

    /// Validate the configuration against `mesh` and prepare a run
    ///
    /// All configuration errors are reported here; the mesh is never modified.
    pub fn initialize(&self, mesh: &PolyMesh) -> Result<SmoothingRun> {
        let config = &self.config;
        let n = mesh.vertex_count();

        if config.iterations == 0 {
            return Err(Error::configuration("number of iterations must be at least 1"));
        }
        mesh.validate().map_err(|e| Error::configuration(e.to_string()))?;

        let mut weighting = match config.weighting {
            Weighting::Default => Weighting::Gaussian,
            w => w,
        };

        let mut anisotropy = None;
        if weighting == Weighting::AnisotropicGaussian {
            if let Some(name) = non_empty(&config.geometry_tensor) {
                let tensors = require_array(mesh, name)?;
                if !matches!(tensors.components(), 6 | 9) {
                    return Err(Error::configuration(format!(
                        "invalid local geometry tensor array '{}': must have either 6 or 9 components, found {}",
                        name,
                        tensors.components()
                    )));
                }
                anisotropy = Some(Anisotropy::Tensor(tensors));
            } else {
                let min = non_empty(&config.min_direction).map(|name| require_direction(mesh, name)).transpose()?;
                let max = non_empty(&config.max_direction).map(|name| require_direction(mesh, name)).transpose()?;
                match (min, max) {
                    (None, None) => {
                        warn!("no geometry tensor or direction arrays given, using isotropic Gaussian weighting");
                        weighting = Weighting::Gaussian;
                    }
                    (Some(_), Some(_)) => {
                        anisotropy = Some(Anisotropy::Directions { normals: None, min, max });
                    }
                    _ => {
                        debug!("estimating vertex normals to complete local frames");
                        anisotropy = Some(Anisotropy::Directions {
                            normals: Some(mesh.calculate_vertex_normals()),
                            min,
                            max,
                        });
                    }
                }
            }
        }

        let smooth_points = config.smooth_points || config.smooth_arrays.is_empty();

        let mut seen = HashSet::new();
        let mut input_arrays = Vec::with_capacity(config.smooth_arrays.len());
        for name in &config.smooth_arrays {
            if name.is_empty() {
                return Err(Error::configuration("empty input point data array name"));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::configuration(format!("point data array '{}' listed more than once", name)));
            }
            input_arrays.push(require_array(mesh, name)?.clone());
        }

        if let Some(mask) = &config.mask {
            if mask.len() != n {
                return Err(Error::configuration(format!(
                    "mask has {} entries, mesh has {} vertices",
                    mask.len(),
                    n
                )));
            }
        }

        let adjacency = match &self.adjacency {
            Some(table) if table.vertex_count() == n => table.clone(),
            Some(table) => {
                return Err(Error::configuration(format!(
                    "adjacency table covers {} vertices, mesh has {}",
                    table.vertex_count(),
                    n
                )))
            }
            None => AdjacencyTable::from_edges(n, mesh.cell_edges()),
        };

        let tensor_based = matches!(anisotropy, Some(Anisotropy::Tensor(_)));
        let bandwidths = match weighting {
            Weighting::Gaussian | Weighting::AnisotropicGaussian => {
                let b = resolve_bandwidths(
                    config.sigma,
                    config.max_direction_sigma,
                    tensor_based,
                    &mesh.vertices,
                    &adjacency,
                );
                if weighting == Weighting::Gaussian {
                    debug!("isotropic Gaussian smoothing kernel sigma = {}", b.sigma1);
                } else {
                    debug!("anisotropic Gaussian smoothing kernel sigma1 = {}, sigma2 = {}", b.sigma1, b.sigma2);
                }
                b
            }
            Weighting::InverseDistance if config.sigma < 0.0 => Bandwidths {
                sigma1: config.sigma.abs() * average_edge_length(&mesh.vertices, &adjacency),
                sigma2: 0.0,
            },
            _ => Bandwidths {
                sigma1: config.sigma,
                sigma2: config.max_direction_sigma,
            },
        };

        let kernel = match (weighting, anisotropy) {
            (Weighting::Uniform, _) => Kernel::Uniform(UniformKernel),
            (Weighting::InverseDistance, _) => Kernel::InverseDistance(InverseDistanceKernel::new(bandwidths.sigma1)),
            (Weighting::AnisotropicGaussian, Some(Anisotropy::Tensor(tensors))) => Kernel::AnisotropicGaussian(
                AnisotropicGaussianKernel::from_tensors(tensors, bandwidths.sigma1, bandwidths.sigma2)?,
            ),
            (Weighting::AnisotropicGaussian, Some(Anisotropy::Directions { normals, min, max })) => {
                let fields = DirectionFields {
                    normals: normals.as_deref(),
                    min_direction: min,
                    max_direction: max,
                };
                Kernel::AnisotropicGaussian(AnisotropicGaussianKernel::from_directions(
                    fields,
                    bandwidths.sigma1,
                    bandwidths.sigma2,
                )?)
            }
            _ => Kernel::Gaussian(GaussianKernel::new(bandwidths.sigma1)),
        };

        let pool = config.parallel.build_pool()?;

        let output_points = smooth_points.then(|| vec![Point3d::origin(); n]);
        let output_arrays = input_arrays.iter().map(DataArray::new_like).collect();

        Ok(SmoothingRun {
            config: SmoothingConfig {
                weighting,
                smooth_points,
                ..config.clone()
            },
            adjacency,
            kernel,
            bandwidths,
            input_points: mesh.vertices.clone(),
            output_points,
            input_arrays,
            output_arrays,
            completed: 0,
            pool,
            progress: self.progress.clone(),
        })
    }
}

/// Progress of an initialized smoothing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingState {
    /// Buffers allocated, no iteration performed yet
    Initialized,
    /// The given number of iterations has completed
    Iterating(usize),
    /// All iterations completed, ready to be finalized
    Complete,
}

/// An initialized smoothing run owning its double buffers
///
/// Iteration `i` reads from the input buffers and writes every slot of the
/// output buffers; afterwards the two are swapped so the next iteration
/// reads the previous result. Input and output never alias.
#[derive(Debug)]
pub struct SmoothingRun {
    config: SmoothingConfig,
    adjacency: AdjacencyTable,
    kernel: Kernel,
    bandwidths: Bandwidths,
    input_points: Vec<Point3d>,
    output_points: Option<Vec<Point3d>>,
    input_arrays: Vec<DataArray>,
    output_arrays: Vec<DataArray>,
    completed: usize,
    pool: Option<ThreadPool>,
    progress: Progress,
}

impl SmoothingRun {
    pub fn state(&self) -> SmoothingState {
        match self.completed {
            0 => SmoothingState::Initialized,
            k if k >= self.config.iterations => SmoothingState::Complete,
            k => SmoothingState::Iterating(k),
        }
    }

    /// Weighting after resolving defaults and fallbacks
    pub fn weighting(&self) -> Weighting {
        self.kernel.weighting()
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn bandwidths(&self) -> Bandwidths {
        self.bandwidths
    }

    pub fn adjacency(&self) -> &AdjacencyTable {
        &self.adjacency
    }

    pub fn smooths_points(&self) -> bool {
        self.output_points.is_some()
    }

    pub fn completed_iterations(&self) -> usize {
        self.completed
    }

    /// Positions after the last completed iteration
    pub fn points(&self) -> &[Point3d] {
        match &self.output_points {
            Some(points) if self.completed > 0 => points,
            _ => &self.input_points,
        }
    }

    /// Smoothed array after the last completed iteration
    pub fn array(&self, name: &str) -> Option<&DataArray> {
        let arrays = if self.completed > 0 {
            &self.output_arrays
        } else {
            &self.input_arrays
        };
        arrays.iter().find(|a| a.name() == name)
    }

    fn swap_buffers(&mut self) {
        if let Some(points) = &mut self.output_points {
            std::mem::swap(&mut self.input_points, points);
        }
        std::mem::swap(&mut self.input_arrays, &mut self.output_arrays);
    }

    /// Perform the next iteration, returning its 1-based index
    ///
    /// Returns `None` once all iterations are done.
    pub fn step(&mut self) -> Option<usize> {
        let total = self.config.iterations;
        if self.completed >= total {
            return None;
        }
        let iteration = self.completed + 1;
        if iteration > 1 {
            self.swap_buffers();
        }
        let lambda = relaxation_factor(self.config.lambda, self.config.mu, iteration);
        debug!("smoothing iteration {} out of {} (lambda = {})", iteration, total, lambda);

        let step = DiffusionStep {
            mask: self.config.mask.as_deref(),
            adjacency: &self.adjacency,
            input_points: &self.input_points,
            input_arrays: &self.input_arrays,
            lambda,
            include_self: self.config.include_self,
        };
        let output_points = self.output_points.as_deref_mut();
        let output_arrays = self.output_arrays.as_mut_slice();
        let kernel = &self.kernel;
        let parallel = &self.config.parallel;

        let evaluate = move || match kernel {
            Kernel::Uniform(k) => step.run(k, output_points, output_arrays, parallel),
            Kernel::InverseDistance(k) => step.run(k, output_points, output_arrays, parallel),
            Kernel::Gaussian(k) => step.run(k, output_points, output_arrays, parallel),
            Kernel::AnisotropicGaussian(k) => step.run(k, output_points, output_arrays, parallel),
        };
        match &self.pool {
            Some(pool) => pool.install(evaluate),
            None => evaluate(),
        }

        self.completed = iteration;
        self.progress.report(iteration, total, "Smoothing");
        Some(iteration)
    }

    /// Perform all remaining iterations
    pub fn run(&mut self) {
        while self.step().is_some() {}
    }

    /// Publish the results onto `mesh` and release the buffers
    ///
    /// Remaining iterations are performed first. Smoothed arrays replace
    /// the mesh arrays of the same name. Returns the adjacency table.
    pub fn finalize(mut self, mesh: &mut PolyMesh) -> Result<AdjacencyTable> {
        if mesh.vertex_count() != self.input_points.len() {
            return Err(Error::InvalidData(format!(
                "cannot publish {} smoothed vertices onto a mesh with {} vertices",
                self.input_points.len(),
                mesh.vertex_count()
            )));
        }
        self.run();

        if let Some(points) = self.output_points.take() {
            mesh.vertices = points;
        }
        for array in self.output_arrays.drain(..) {
            mesh.point_data.insert(array);
        }
        Ok(self.adjacency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Closed polyline square with edge length `l`
    fn square(l: f64) -> PolyMesh {
        PolyMesh::from_vertices_and_cells(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(l, 0.0, 0.0),
                Point3d::new(l, l, 0.0),
                Point3d::new(0.0, l, 0.0),
            ],
            vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 0]],
        )
    }

    #[test]
    fn test_default_config() {
        let config = SmoothingConfig::default();
        assert_eq!(config.iterations, 1);
        assert_eq!(config.lambda, 1.0);
        assert!(config.mu.is_none());
        assert!(config.include_self);
        assert_eq!(config.weighting, Weighting::Default);
    }

    #[test]
    fn test_relaxation_factor_alternates() {
        assert_eq!(relaxation_factor(0.5, Some(-0.5), 1), 0.5);
        assert_eq!(relaxation_factor(0.5, Some(-0.5), 2), -0.5);
        assert_eq!(relaxation_factor(0.5, Some(-0.5), 3), 0.5);
        assert_eq!(relaxation_factor(0.5, None, 2), 0.5);
        assert_eq!(relaxation_factor(0.5, Some(f64::NAN), 2), 0.5);
    }

    #[test]
    fn test_auto_bandwidth_equals_uniform_edge_length() {
        let mesh = square(1.5);
        let table = AdjacencyTable::build(&mesh).unwrap();
        let b = resolve_bandwidths(0.0, 0.0, false, &mesh.vertices, &table);
        assert_relative_eq!(b.sigma1, 1.5, epsilon = 1e-12);
        assert_relative_eq!(b.sigma2, 1.5, epsilon = 1e-12);

        let b = resolve_bandwidths(0.0, 0.0, true, &mesh.vertices, &table);
        assert_relative_eq!(b.sigma2, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_bandwidths_scale_mean_edge_length() {
        let mesh = square(2.0);
        let table = AdjacencyTable::build(&mesh).unwrap();
        let b = resolve_bandwidths(-0.5, -3.0, false, &mesh.vertices, &table);
        assert_relative_eq!(b.sigma1, 1.0);
        assert_relative_eq!(b.sigma2, 6.0);

        let b = resolve_bandwidths(0.25, -1.0, true, &mesh.vertices, &table);
        assert_relative_eq!(b.sigma1, 0.25);
        assert_relative_eq!(b.sigma2, 2.0);

        let b = resolve_bandwidths(0.25, 0.75, true, &mesh.vertices, &table);
        assert_eq!(b, Bandwidths { sigma1: 0.25, sigma2: 0.75 });
    }

    #[test]
    fn test_default_weighting_is_gaussian() {
        let mesh = square(1.0);
        let run = MeshSmoother::new(SmoothingConfig::default()).initialize(&mesh).unwrap();
        assert_eq!(run.weighting(), Weighting::Gaussian);
        assert!(run.smooths_points());
        assert_relative_eq!(run.bandwidths().sigma1, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_array_lists_available_names() {
        let mut mesh = square(1.0);
        mesh.set_array(DataArray::from_scalars("height", vec![0.0; 4])).unwrap();
        let err = MeshSmoother::new(SmoothingConfig::default().with_array("heigth"))
            .initialize(&mesh)
            .unwrap_err();
        assert!(matches!(&err, Error::Configuration(msg) if msg.contains("'heigth'") && msg.contains("height")));
    }

    #[test]
    fn test_state_transitions() {
        let mesh = square(1.0);
        let config = SmoothingConfig::default().with_iterations(2);
        let mut run = MeshSmoother::new(config).initialize(&mesh).unwrap();
        assert_eq!(run.state(), SmoothingState::Initialized);
        assert_eq!(run.step(), Some(1));
        assert_eq!(run.state(), SmoothingState::Iterating(1));
        assert_eq!(run.step(), Some(2));
        assert_eq!(run.state(), SmoothingState::Complete);
        assert_eq!(run.step(), None);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: SmoothingConfig =
            serde_json::from_str(r#"{ "iterations": 5, "mu": -0.53, "weighting": "Uniform" }"#).unwrap();
        assert_eq!(config.iterations, 5);
        assert_eq!(config.mu, Some(-0.53));
        assert_eq!(config.weighting, Weighting::Uniform);
        assert_eq!(config.lambda, 1.0);
        assert!(config.parallel.enabled);
    }
}
