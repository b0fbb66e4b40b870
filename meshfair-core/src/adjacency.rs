//! Vertex adjacency (1-ring) derived from cell connectivity

use crate::error::Result;
use crate::mesh::PolyMesh;
use crate::point::{distance, Point3d};
use serde::{Deserialize, Serialize};

/// Symmetric neighbor list per vertex
///
/// `b` is listed as a neighbor of `a` exactly when `a` is listed as a
/// neighbor of `b`. Every vertex id has an entry, possibly empty, and no
/// entry contains duplicates or the vertex itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyTable {
    neighbors: Vec<Vec<usize>>,
}

impl AdjacencyTable {
    /// Build the table from the edges of every mesh cell
    pub fn build(mesh: &PolyMesh) -> Result<Self> {
        mesh.validate()?;
        Ok(Self::from_edges(mesh.vertex_count(), mesh.cell_edges()))
    }

    /// Build the table for `vertex_count` vertices from an edge list
    ///
    /// Edge ids must be smaller than `vertex_count`.
    pub fn from_edges(vertex_count: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut neighbors = vec![Vec::new(); vertex_count];
        for (a, b) in edges {
            if a == b {
                continue;
            }
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }
        Self { neighbors }
    }

    /// Neighbor ids of vertex `id`
    #[inline]
    pub fn neighbors(&self, id: usize) -> &[usize] {
        &self.neighbors[id]
    }

    /// Number of vertices covered by the table
    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors[a].binary_search(&b).is_ok()
    }

    /// Iterate over undirected edges, each reported once as `(a, b)` with `a < b`
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.neighbors.iter().enumerate().flat_map(|(a, list)| {
            list.iter().copied().filter(move |&b| a < b).map(move |b| (a, b))
        })
    }
}

/// Mean and standard deviation of mesh edge lengths
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeLengthStatistics {
    pub mean: f64,
    pub std_dev: f64,
    pub edge_count: usize,
}

impl EdgeLengthStatistics {
    /// Compute edge length statistics for `points` connected by `adjacency`
    ///
    /// Returns zero mean and deviation when there are no edges.
    pub fn compute(points: &[Point3d], adjacency: &AdjacencyTable) -> Self {
        let lengths: Vec<f64> = adjacency
            .edges()
            .map(|(a, b)| distance(&points[a], &points[b]))
            .collect();
        if lengths.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                edge_count: 0,
            };
        }
        let n = lengths.len() as f64;
        let mean = lengths.iter().sum::<f64>() / n;
        let variance = lengths.iter().map(|l| (l - mean) * (l - mean)).sum::<f64>() / n;
        Self {
            mean,
            std_dev: variance.sqrt(),
            edge_count: lengths.len(),
        }
    }
}

/// Average edge length of `points` connected by `adjacency`
pub fn average_edge_length(points: &[Point3d], adjacency: &AdjacencyTable) -> f64 {
    EdgeLengthStatistics::compute(points, adjacency).mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_triangles() -> PolyMesh {
        PolyMesh::from_triangles(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 0.0, 0.0),
                Point3d::new(1.0, 1.0, 0.0),
                Point3d::new(0.0, 1.0, 0.0),
                Point3d::new(9.0, 9.0, 9.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_shared_edge_listed_once() {
        let table = AdjacencyTable::build(&two_triangles()).unwrap();
        assert_eq!(table.neighbors(0), &[1, 2, 3]);
        assert_eq!(table.neighbors(2), &[0, 1, 3]);
        assert_eq!(table.edge_count(), 5);
    }

    #[test]
    fn test_unreferenced_vertex_has_empty_entry() {
        let table = AdjacencyTable::build(&two_triangles()).unwrap();
        assert_eq!(table.vertex_count(), 5);
        assert!(table.neighbors(4).is_empty());
    }

    #[test]
    fn test_symmetry() {
        let mesh = PolyMesh::from_vertices_and_cells(
            vec![Point3d::origin(); 6],
            vec![vec![0, 1, 2, 3], vec![3, 4], vec![4, 5, 1], vec![2]],
        );
        let table = AdjacencyTable::build(&mesh).unwrap();
        for a in 0..table.vertex_count() {
            assert!(!table.neighbors(a).contains(&a));
            for &b in table.neighbors(a) {
                assert!(table.is_adjacent(b, a), "{} -> {} not mirrored", a, b);
            }
        }
    }

    #[test]
    fn test_rejects_out_of_range_cells() {
        let mesh = PolyMesh::from_vertices_and_cells(vec![Point3d::origin(); 2], vec![vec![0, 2]]);
        assert!(AdjacencyTable::build(&mesh).is_err());
    }

    #[test]
    fn test_edge_statistics_of_uniform_edges() {
        let points = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(2.0, 0.0, 0.0),
            Point3d::new(2.0, 2.0, 0.0),
            Point3d::new(0.0, 2.0, 0.0),
        ];
        let table = AdjacencyTable::from_edges(4, [(0, 1), (1, 2), (2, 3), (3, 0)]);
        let stats = EdgeLengthStatistics::compute(&points, &table);
        assert_eq!(stats.edge_count, 4);
        assert_relative_eq!(stats.mean, 2.0);
        assert_relative_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_edge_statistics_mixed_lengths() {
        let points = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(4.0, 0.0, 0.0),
        ];
        let table = AdjacencyTable::from_edges(3, [(0, 1), (1, 2)]);
        let stats = EdgeLengthStatistics::compute(&points, &table);
        assert_relative_eq!(stats.mean, 2.0);
        assert_relative_eq!(stats.std_dev, 1.0);
        assert_relative_eq!(average_edge_length(&points, &table), 2.0);
    }
}
