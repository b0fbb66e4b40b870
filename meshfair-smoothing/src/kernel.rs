//! Node weighting kernels for local weighted averaging
//!
//! Every kernel maps a center vertex and a neighbor position to a
//! non-negative weight. The weight of a neighbor only depends on the center
//! id (for kernels with a per-vertex local frame) and the two positions.
//!
//! # Kernels
//!
//! - [`UniformKernel`]: constant weight ("umbrella operator", Taubin 1995)
//! - [`InverseDistanceKernel`]: `1 / (|p1 - p0| + sigma)`
//! - [`GaussianKernel`]: `exp(-|p1 - p0|^2 / (2 sigma^2))`
//! - [`AnisotropicGaussianKernel`]: Gaussian evaluated in a per-vertex local
//!   frame, with a larger extent along the direction of maximum change

use meshfair_core::{distance, distance_squared, DataArray, Error, Matrix3d, Point3d, Result, Vector3d};
use serde::{Deserialize, Serialize};

/// Weight function evaluated for every (center, neighbor) pair
pub trait WeightKernel: Sync {
    /// Weight of the node at `p1` for the average centered at vertex `center` with position `p0`
    fn weight(&self, center: usize, p0: &Point3d, p1: &Point3d) -> f64;
}

/// Selectable weighting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weighting {
    /// Resolves to [`Weighting::Gaussian`]
    #[default]
    Default,
    /// Uniform (combinatorial) weights
    Uniform,
    /// Inverse Euclidean distance
    InverseDistance,
    /// Isotropic Gaussian
    Gaussian,
    /// Gaussian in a local frame from a geometry tensor or principal directions
    AnisotropicGaussian,
}

/// Exponent factor `-1 / (2 sigma^2)`; a zero sigma gives negative infinity
#[inline]
fn gaussian_scale(sigma: f64) -> f64 {
    if sigma == 0.0 {
        f64::NEG_INFINITY
    } else {
        -0.5 / (sigma * sigma)
    }
}

/// Product `scale * x2` where a zero square contributes nothing
#[inline]
fn scaled_square(scale: f64, x2: f64) -> f64 {
    if x2 == 0.0 {
        0.0
    } else {
        scale * x2
    }
}

/// Constant unit weight
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformKernel;

impl WeightKernel for UniformKernel {
    #[inline]
    fn weight(&self, _center: usize, _p0: &Point3d, _p1: &Point3d) -> f64 {
        1.0
    }
}

/// Inverse Euclidean distance weight, regularized by `sigma`
#[derive(Debug, Clone, Copy)]
pub struct InverseDistanceKernel {
    sigma: f64,
}

impl InverseDistanceKernel {
    /// Negative `sigma` is clamped to zero
    pub fn new(sigma: f64) -> Self {
        Self { sigma: sigma.max(0.0) }
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Default for InverseDistanceKernel {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl WeightKernel for InverseDistanceKernel {
    #[inline]
    fn weight(&self, _center: usize, p0: &Point3d, p1: &Point3d) -> f64 {
        let d = distance(p0, p1) + self.sigma;
        if d > 0.0 {
            1.0 / d
        } else {
            0.0
        }
    }
}

/// Isotropic Gaussian weight with standard deviation `sigma`
#[derive(Debug, Clone, Copy)]
pub struct GaussianKernel {
    sigma: f64,
    scale: f64,
}

impl GaussianKernel {
    pub fn new(sigma: f64) -> Self {
        Self {
            sigma,
            scale: gaussian_scale(sigma),
        }
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl WeightKernel for GaussianKernel {
    #[inline]
    fn weight(&self, _center: usize, p0: &Point3d, p1: &Point3d) -> f64 {
        scaled_square(self.scale, distance_squared(p0, p1)).exp()
    }
}

/// Per-vertex direction fields from which local frames are assembled
///
/// Either both tangential directions are given (the normal is their cross
/// product), or the normals plus one of the two directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionFields<'a> {
    pub normals: Option<&'a [Vector3d]>,
    pub min_direction: Option<&'a DataArray>,
    pub max_direction: Option<&'a DataArray>,
}

/// Anisotropic Gaussian weight in a locally oriented coordinate system
///
/// The offset `p1 - p0` is expressed in the frame of the center vertex,
/// whose axes are the normal, the direction of minimum change and the
/// direction of maximum change. The first two axes share the standard
/// deviation `sigma1`, the last uses `sigma2`.
///
/// See Tschumperlé, "Fast anisotropic smoothing of multi-valued images
/// using curvature-preserving PDE's", IJCV 2006.
#[derive(Debug, Clone)]
pub struct AnisotropicGaussianKernel {
    frames: Vec<Matrix3d>,
    scale: [f64; 3],
}

impl AnisotropicGaussianKernel {
    /// Kernel from local geometry tensors with standard deviations along
    /// the minimum (`sigma1`) and maximum (`sigma2`) directions
    ///
    /// Tensors have either 6 components (XX, YY, ZZ, XY, YZ, XZ) or 9
    /// components (row-major 3x3).
    pub fn from_tensors(tensors: &DataArray, sigma1: f64, sigma2: f64) -> Result<Self> {
        Ok(Self {
            frames: tensor_frames(tensors)?,
            scale: axis_scales(sigma1, sigma2),
        })
    }

    /// Kernel from orthonormal direction fields
    pub fn from_directions(fields: DirectionFields<'_>, sigma1: f64, sigma2: f64) -> Result<Self> {
        Ok(Self {
            frames: direction_frames(fields)?,
            scale: axis_scales(sigma1, sigma2),
        })
    }

    /// Local frame of vertex `id`, rows are the frame axes
    pub fn frame(&self, id: usize) -> &Matrix3d {
        &self.frames[id]
    }

    /// Exponent factors along the normal, minimum and maximum direction
    pub fn scale(&self) -> [f64; 3] {
        self.scale
    }
}

impl WeightKernel for AnisotropicGaussianKernel {
    #[inline]
    fn weight(&self, center: usize, p0: &Point3d, p1: &Point3d) -> f64 {
        let x = self.frames[center] * (p1 - p0);
        let exponent = scaled_square(self.scale[0], x[0] * x[0])
            + scaled_square(self.scale[1], x[1] * x[1])
            + scaled_square(self.scale[2], x[2] * x[2]);
        exponent.exp()
    }
}

fn axis_scales(sigma1: f64, sigma2: f64) -> [f64; 3] {
    let s1 = gaussian_scale(sigma1);
    [s1, s1, gaussian_scale(sigma2)]
}

fn tensor_frames(tensors: &DataArray) -> Result<Vec<Matrix3d>> {
    match tensors.components() {
        6 => Ok(tensors
            .tuples()
            .map(|m| {
                let (xx, yy, zz, xy, yz, xz) = (m[0], m[1], m[2], m[3], m[4], m[5]);
                Matrix3d::new(xx, xy, xz, xy, yy, yz, xz, yz, zz)
            })
            .collect()),
        9 => Ok(tensors.tuples().map(Matrix3d::from_row_slice).collect()),
        n => Err(Error::configuration(format!(
            "local geometry tensor array '{}' must have 6 or 9 components, found {}",
            tensors.name(),
            n
        ))),
    }
}

fn unit(v: Vector3d) -> Vector3d {
    v.try_normalize(f64::EPSILON).unwrap_or(v)
}

fn direction(array: &DataArray, id: usize) -> Vector3d {
    unit(Vector3d::from_column_slice(array.tuple(id)))
}

fn check_direction_array(array: &DataArray, len: usize) -> Result<()> {
    if array.components() != 3 {
        return Err(Error::configuration(format!(
            "direction array '{}' must have 3 components, found {}",
            array.name(),
            array.components()
        )));
    }
    if array.len() != len {
        return Err(Error::configuration(format!(
            "direction array '{}' has {} tuples, expected {}",
            array.name(),
            array.len(),
            len
        )));
    }
    Ok(())
}

fn frame_from_axes(n: Vector3d, e1: Vector3d, e2: Vector3d) -> Matrix3d {
    Matrix3d::from_rows(&[n.transpose(), e1.transpose(), e2.transpose()])
}

fn direction_frames(fields: DirectionFields<'_>) -> Result<Vec<Matrix3d>> {
    match (fields.min_direction, fields.max_direction) {
        (Some(e1), Some(e2)) => {
            check_direction_array(e1, e1.len())?;
            check_direction_array(e2, e1.len())?;
            Ok((0..e1.len())
                .map(|id| {
                    let (d1, d2) = (direction(e1, id), direction(e2, id));
                    frame_from_axes(d1.cross(&d2), d1, d2)
                })
                .collect())
        }
        (Some(e1), None) => {
            let normals = fields
                .normals
                .ok_or_else(|| Error::configuration("normals required to complete a frame from the minimum direction"))?;
            check_direction_array(e1, normals.len())?;
            Ok(normals
                .iter()
                .enumerate()
                .map(|(id, n)| {
                    let d1 = direction(e1, id);
                    frame_from_axes(*n, d1, n.cross(&d1))
                })
                .collect())
        }
        (None, Some(e2)) => {
            let normals = fields
                .normals
                .ok_or_else(|| Error::configuration("normals required to complete a frame from the maximum direction"))?;
            check_direction_array(e2, normals.len())?;
            Ok(normals
                .iter()
                .enumerate()
                .map(|(id, n)| {
                    let d2 = direction(e2, id);
                    frame_from_axes(*n, d2.cross(n), d2)
                })
                .collect())
        }
        (None, None) => Err(Error::configuration(
            "anisotropic Gaussian kernel requires at least one direction array",
        )),
    }
}

/// Kernel instance selected once per smoothing run
#[derive(Debug, Clone)]
pub enum Kernel {
    Uniform(UniformKernel),
    InverseDistance(InverseDistanceKernel),
    Gaussian(GaussianKernel),
    AnisotropicGaussian(AnisotropicGaussianKernel),
}

impl Kernel {
    pub fn weighting(&self) -> Weighting {
        match self {
            Kernel::Uniform(_) => Weighting::Uniform,
            Kernel::InverseDistance(_) => Weighting::InverseDistance,
            Kernel::Gaussian(_) => Weighting::Gaussian,
            Kernel::AnisotropicGaussian(_) => Weighting::AnisotropicGaussian,
        }
    }
}

impl WeightKernel for Kernel {
    fn weight(&self, center: usize, p0: &Point3d, p1: &Point3d) -> f64 {
        match self {
            Kernel::Uniform(k) => k.weight(center, p0, p1),
            Kernel::InverseDistance(k) => k.weight(center, p0, p1),
            Kernel::Gaussian(k) => k.weight(center, p0, p1),
            Kernel::AnisotropicGaussian(k) => k.weight(center, p0, p1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn xyz_directions(name: &str, v: [f64; 3], n: usize) -> DataArray {
        DataArray::from_vectors(name, &vec![v; n])
    }

    #[test]
    fn test_uniform_is_constant() {
        let p0 = Point3d::new(0.0, 0.0, 0.0);
        let p1 = Point3d::new(3.0, -4.0, 12.0);
        assert_eq!(UniformKernel.weight(0, &p0, &p1), 1.0);
        assert_eq!(UniformKernel.weight(7, &p1, &p1), 1.0);
    }

    #[test]
    fn test_inverse_distance() {
        let p0 = Point3d::new(0.0, 0.0, 0.0);
        let p1 = Point3d::new(3.0, 4.0, 0.0);
        assert_relative_eq!(InverseDistanceKernel::new(0.0).weight(0, &p0, &p1), 0.2);
        assert_relative_eq!(InverseDistanceKernel::new(5.0).weight(0, &p0, &p1), 0.1);
        // coincident points without regularization
        assert_eq!(InverseDistanceKernel::new(0.0).weight(0, &p0, &p0), 0.0);
        assert_relative_eq!(InverseDistanceKernel::new(0.5).weight(0, &p0, &p0), 2.0);
        assert_eq!(InverseDistanceKernel::new(-1.0).sigma(), 0.0);
    }

    #[test]
    fn test_gaussian() {
        let k = GaussianKernel::new(2.0);
        let p0 = Point3d::new(1.0, 1.0, 1.0);
        let p1 = Point3d::new(3.0, 1.0, 1.0);
        assert_relative_eq!(k.weight(0, &p0, &p0), 1.0);
        assert_relative_eq!(k.weight(0, &p0, &p1), (-0.5f64).exp());
    }

    #[test]
    fn test_zero_sigma_gaussian_is_finite() {
        let k = GaussianKernel::new(0.0);
        let p0 = Point3d::new(1.0, 1.0, 1.0);
        assert_eq!(k.weight(0, &p0, &p0), 1.0);
        assert_eq!(k.weight(0, &p0, &Point3d::new(1.0, 1.0, 2.0)), 0.0);
    }

    #[test]
    fn test_anisotropic_from_direction_pair() {
        let e1 = xyz_directions("kmin", [1.0, 0.0, 0.0], 1);
        let e2 = xyz_directions("kmax", [0.0, 2.0, 0.0], 1);
        let fields = DirectionFields {
            normals: None,
            min_direction: Some(&e1),
            max_direction: Some(&e2),
        };
        let k = AnisotropicGaussianKernel::from_directions(fields, 1.0, 2.0).unwrap();
        assert_relative_eq!(*k.frame(0), frame_from_axes(Vector3d::z(), Vector3d::x(), Vector3d::y()));

        let p0 = Point3d::origin();
        // offset along the maximum direction decays with sigma2
        assert_relative_eq!(k.weight(0, &p0, &Point3d::new(0.0, 2.0, 0.0)), (-0.5f64).exp());
        // offset along the minimum direction and the normal decay with sigma1
        assert_relative_eq!(k.weight(0, &p0, &Point3d::new(1.0, 0.0, 0.0)), (-0.5f64).exp());
        assert_relative_eq!(k.weight(0, &p0, &Point3d::new(0.0, 0.0, 1.0)), (-0.5f64).exp());
    }

    #[test]
    fn test_anisotropic_completes_frame_from_normal() {
        let normals = vec![Vector3d::z(); 2];
        let e1 = xyz_directions("kmin", [1.0, 0.0, 0.0], 2);
        let e2 = xyz_directions("kmax", [0.0, 1.0, 0.0], 2);

        let from_min = AnisotropicGaussianKernel::from_directions(
            DirectionFields {
                normals: Some(&normals),
                min_direction: Some(&e1),
                max_direction: None,
            },
            1.0,
            1.0,
        )
        .unwrap();
        let from_max = AnisotropicGaussianKernel::from_directions(
            DirectionFields {
                normals: Some(&normals),
                min_direction: None,
                max_direction: Some(&e2),
            },
            1.0,
            1.0,
        )
        .unwrap();

        let expected = frame_from_axes(Vector3d::z(), Vector3d::x(), Vector3d::y());
        assert_relative_eq!(*from_min.frame(1), expected);
        assert_relative_eq!(*from_max.frame(1), expected);
    }

    #[test]
    fn test_anisotropic_requires_normals_for_single_direction() {
        let e1 = xyz_directions("kmin", [1.0, 0.0, 0.0], 2);
        let fields = DirectionFields {
            normals: None,
            min_direction: Some(&e1),
            max_direction: None,
        };
        assert!(matches!(
            AnisotropicGaussianKernel::from_directions(fields, 1.0, 1.0),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_tensor_layouts_agree() {
        let six = DataArray::from_values("T", 6, vec![1.0, 2.0, 3.0, 0.5, 0.25, 0.125]).unwrap();
        let nine = DataArray::from_values(
            "T",
            9,
            vec![1.0, 0.5, 0.125, 0.5, 2.0, 0.25, 0.125, 0.25, 3.0],
        )
        .unwrap();
        let a = AnisotropicGaussianKernel::from_tensors(&six, 1.0, 2.0).unwrap();
        let b = AnisotropicGaussianKernel::from_tensors(&nine, 1.0, 2.0).unwrap();
        assert_relative_eq!(*a.frame(0), *b.frame(0));
        assert_eq!(a.frame(0), &a.frame(0).transpose());

        let bad = DataArray::from_values("T", 3, vec![0.0; 3]).unwrap();
        assert!(AnisotropicGaussianKernel::from_tensors(&bad, 1.0, 2.0).is_err());
    }

    #[test]
    fn test_tensor_axis_scales() {
        let tensors = DataArray::from_values("T", 9, Matrix3d::identity().as_slice().to_vec()).unwrap();
        let k = AnisotropicGaussianKernel::from_tensors(&tensors, 1.0, 2.0).unwrap();
        assert_eq!(k.scale(), [-0.5, -0.5, -0.125]);
    }

    #[test]
    fn test_all_kernels_non_negative() {
        let mut rng = StdRng::seed_from_u64(17);
        let tensors = DataArray::from_values(
            "T",
            6,
            (0..6 * 4).map(|_| rng.gen_range(-2.0..2.0)).collect(),
        )
        .unwrap();
        let e1 = DataArray::from_values("e1", 3, (0..12).map(|_| rng.gen_range(-1.0..1.0)).collect()).unwrap();
        let e2 = DataArray::from_values("e2", 3, (0..12).map(|_| rng.gen_range(-1.0..1.0)).collect()).unwrap();

        let kernels = vec![
            Kernel::Uniform(UniformKernel),
            Kernel::InverseDistance(InverseDistanceKernel::new(0.0)),
            Kernel::InverseDistance(InverseDistanceKernel::new(0.3)),
            Kernel::Gaussian(GaussianKernel::new(0.7)),
            Kernel::AnisotropicGaussian(AnisotropicGaussianKernel::from_tensors(&tensors, 0.5, 1.5).unwrap()),
            Kernel::AnisotropicGaussian(
                AnisotropicGaussianKernel::from_directions(
                    DirectionFields {
                        normals: None,
                        min_direction: Some(&e1),
                        max_direction: Some(&e2),
                    },
                    1.0,
                    2.0,
                )
                .unwrap(),
            ),
        ];

        for _ in 0..500 {
            let center = rng.gen_range(0..4);
            let p0 = Point3d::new(rng.gen_range(-1e3..1e3), rng.gen_range(-1e3..1e3), rng.gen_range(-1e3..1e3));
            let p1 = Point3d::new(rng.gen_range(-1e3..1e3), rng.gen_range(-1e3..1e3), rng.gen_range(-1e3..1e3));
            for kernel in &kernels {
                let w = kernel.weight(center, &p0, &p1);
                assert!(w >= 0.0, "{:?} gave {} for {:?} -> {:?}", kernel.weighting(), w, p0, p1);
                assert!(kernel.weight(center, &p0, &p0) >= 0.0);
            }
        }
    }
}
