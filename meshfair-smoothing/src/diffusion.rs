//! One diffusion iteration: weighted local averaging over the 1-ring
//!
//! For every vertex the new value is a blend of its current value and the
//! kernel weighted mean of its neighbors (optionally including itself):
//!
//! ```text
//! out(v) = (1 - lambda) * in(v) + lambda * sum_u w(v, u) in(u) / sum_u w(v, u)
//! ```
//!
//! Positions and any number of attribute arrays are averaged with the same
//! weights. Three-component arrays are treated as undirected: a neighbor's
//! vector is flipped when it points away from the running sum.
//!
//! Each output slot is written by exactly one vertex evaluation and only
//! read-only inputs are shared, so vertex id blocks are evaluated in
//! parallel without synchronization.

use crate::kernel::WeightKernel;
use crate::parallel::ParallelConfig;
use meshfair_core::{AdjacencyTable, DataArray, Point3d, Vector3d};
use rayon::prelude::*;

/// Read-only inputs of a single smoothing iteration
#[derive(Debug, Clone, Copy)]
pub struct DiffusionStep<'a> {
    /// Per-vertex smoothing mask, `false` keeps the input value
    pub mask: Option<&'a [bool]>,
    pub adjacency: &'a AdjacencyTable,
    pub input_points: &'a [Point3d],
    /// Arrays to smooth, parallel to the output arrays
    pub input_arrays: &'a [DataArray],
    /// Relaxation factor
    pub lambda: f64,
    /// Include the vertex itself in its weighted average
    pub include_self: bool,
}

/// Output slots of one vertex id block
struct Block<'o> {
    start: usize,
    len: usize,
    points: Option<&'o mut [Point3d]>,
    arrays: Vec<&'o mut [f64]>,
}

/// Blend factors `(alpha, beta)` for `alpha * original + beta * sum`
///
/// A vertex with zero total weight keeps its value.
#[inline]
pub fn blend_factors(norm: f64, lambda: f64) -> (f64, f64) {
    if norm > 0.0 {
        (1.0 - lambda, lambda / norm)
    } else {
        (1.0, 0.0)
    }
}

#[inline]
fn blend(alpha: f64, beta: f64, original: f64, sum: f64) -> f64 {
    if alpha == 0.0 {
        beta * sum
    } else {
        alpha * original + beta * sum
    }
}

/// Add `w * value` to a running sum
///
/// Three-component values are sign-aligned with the running sum first.
#[inline]
pub fn accumulate(sum: &mut [f64], value: &[f64], w: f64) {
    let w = if value.len() == 3 {
        let dot: f64 = sum.iter().zip(value).map(|(s, v)| s * v).sum();
        if dot < 0.0 {
            -w
        } else {
            w
        }
    } else {
        w
    };
    for (s, v) in sum.iter_mut().zip(value) {
        *s += w * v;
    }
}

impl<'a> DiffusionStep<'a> {
    /// Number of vertices processed by this step
    pub fn vertex_count(&self) -> usize {
        self.input_points.len()
    }

    #[inline]
    fn is_masked(&self, id: usize) -> bool {
        self.mask.is_some_and(|mask| !mask[id])
    }

    /// Evaluate all vertices and write the results into the outputs
    ///
    /// `output_points` is `None` when positions are not smoothed.
    /// `output_arrays` must match `input_arrays` in order and shape, and
    /// every buffer must have one entry per vertex.
    pub fn run<K: WeightKernel>(
        &self,
        kernel: &K,
        output_points: Option<&mut [Point3d]>,
        output_arrays: &mut [DataArray],
        parallel: &ParallelConfig,
    ) {
        let n = self.vertex_count();
        debug_assert_eq!(self.adjacency.vertex_count(), n);
        debug_assert_eq!(self.input_arrays.len(), output_arrays.len());
        debug_assert!(output_points.as_ref().map_or(true, |p| p.len() == n));
        debug_assert!(output_arrays.iter().all(|a| a.len() == n));

        let block_size = parallel.block_size(n, rayon::current_num_threads());
        let blocks = split_blocks(n, block_size, output_points, output_arrays);

        if parallel.enabled {
            blocks
                .into_par_iter()
                .for_each(|block| self.evaluate_block(kernel, block));
        } else {
            blocks
                .into_iter()
                .for_each(|block| self.evaluate_block(kernel, block));
        }
    }

    fn evaluate_block<K: WeightKernel>(&self, kernel: &K, mut block: Block<'_>) {
        let mut sums: Vec<Vec<f64>> = self
            .input_arrays
            .iter()
            .map(|a| vec![0.0; a.components()])
            .collect();

        for offset in 0..block.len {
            let id = block.start + offset;
            let p0 = &self.input_points[id];

            if self.is_masked(id) {
                if let Some(points) = block.points.as_deref_mut() {
                    points[offset] = *p0;
                }
                for (out, input) in block.arrays.iter_mut().zip(self.input_arrays) {
                    let nc = input.components();
                    out[offset * nc..(offset + 1) * nc].copy_from_slice(input.tuple(id));
                }
                continue;
            }

            let (mut norm, mut p) = if self.include_self {
                let w = kernel.weight(id, p0, p0);
                for (sum, input) in sums.iter_mut().zip(self.input_arrays) {
                    for (s, v) in sum.iter_mut().zip(input.tuple(id)) {
                        *s = w * v;
                    }
                }
                (w, p0.coords * w)
            } else {
                for sum in &mut sums {
                    sum.fill(0.0);
                }
                (0.0, Vector3d::zeros())
            };

            for &adj in self.adjacency.neighbors(id) {
                let p1 = &self.input_points[adj];
                let w = kernel.weight(id, p0, p1);
                norm += w;
                p += p1.coords * w;
                for (sum, input) in sums.iter_mut().zip(self.input_arrays) {
                    accumulate(sum, input.tuple(adj), w);
                }
            }

            let (alpha, beta) = blend_factors(norm, self.lambda);

            if let Some(points) = block.points.as_deref_mut() {
                points[offset] = Point3d::new(
                    blend(alpha, beta, p0.x, p.x),
                    blend(alpha, beta, p0.y, p.y),
                    blend(alpha, beta, p0.z, p.z),
                );
            }
            for ((out, input), sum) in block.arrays.iter_mut().zip(self.input_arrays).zip(&sums) {
                let nc = input.components();
                let slots = &mut out[offset * nc..(offset + 1) * nc];
                for ((o, &v), &s) in slots.iter_mut().zip(input.tuple(id)).zip(sum) {
                    *o = blend(alpha, beta, v, s);
                }
            }
        }
    }
}

/// Partition the output buffers into disjoint vertex id blocks
fn split_blocks<'o>(
    n: usize,
    block_size: usize,
    points: Option<&'o mut [Point3d]>,
    arrays: &'o mut [DataArray],
) -> Vec<Block<'o>> {
    let mut point_chunks = points.map(|p| p.chunks_mut(block_size));
    let mut array_chunks: Vec<_> = arrays
        .iter_mut()
        .map(|a| {
            let step = block_size * a.components().max(1);
            a.values_mut().chunks_mut(step)
        })
        .collect();

    (0..n)
        .step_by(block_size)
        .map(|start| Block {
            start,
            len: block_size.min(n - start),
            points: point_chunks.as_mut().and_then(|chunks| chunks.next()),
            arrays: array_chunks
                .iter_mut()
                .map(|chunks| chunks.next().unwrap_or_default())
                .collect(),
        })
        .collect()
}
