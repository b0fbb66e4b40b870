//! Mesh data structures and functionality

use crate::attributes::{DataArray, PointData};
use crate::error::{Error, Result};
use crate::point::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A point-set mesh: vertices, cell connectivity and per-vertex attributes
///
/// Cells with three or more ids are closed polygons, two ids form a line
/// segment and a single id is a lone vertex without edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolyMesh {
    pub vertices: Vec<Point3d>,
    pub cells: Vec<Vec<usize>>,
    pub point_data: PointData,
}

impl PolyMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and arbitrary cells
    pub fn from_vertices_and_cells(vertices: Vec<Point3d>, cells: Vec<Vec<usize>>) -> Self {
        Self {
            vertices,
            cells,
            point_data: PointData::new(),
        }
    }

    /// Create a mesh from vertices and triangles
    pub fn from_triangles(vertices: Vec<Point3d>, faces: &[[usize; 3]]) -> Self {
        let cells = faces.iter().map(|f| f.to_vec()).collect();
        Self::from_vertices_and_cells(vertices, cells)
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the mesh has no vertices
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3d) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a cell to the mesh
    pub fn add_cell(&mut self, cell: impl Into<Vec<usize>>) {
        self.cells.push(cell.into());
    }

    /// Attach a point data array, replacing one with the same name
    pub fn set_array(&mut self, array: DataArray) -> Result<()> {
        if array.len() != self.vertex_count() {
            return Err(Error::InvalidData(format!(
                "array '{}' has {} tuples, mesh has {} vertices",
                array.name(),
                array.len(),
                self.vertex_count()
            )));
        }
        self.point_data.insert(array);
        Ok(())
    }

    /// Look up a point data array by name
    pub fn array(&self, name: &str) -> Option<&DataArray> {
        self.point_data.get(name)
    }

    /// Check that every cell references existing vertices
    pub fn validate(&self) -> Result<()> {
        let n = self.vertex_count();
        for (ci, cell) in self.cells.iter().enumerate() {
            if let Some(&id) = cell.iter().find(|&&id| id >= n) {
                return Err(Error::InvalidData(format!(
                    "cell {} references vertex {} but mesh has {} vertices",
                    ci, id, n
                )));
            }
        }
        Ok(())
    }

    /// Enumerate the edges of every cell
    ///
    /// Edges shared by several cells are reported once per cell, degenerate
    /// edges (a vertex to itself) are skipped.
    pub fn cell_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .flat_map(|cell| {
                let n = cell.len();
                let count = match n {
                    0 | 1 => 0,
                    2 => 1,
                    _ => n,
                };
                (0..count).map(move |i| (cell[i], cell[(i + 1) % n]))
            })
            .filter(|(a, b)| a != b)
    }

    /// Estimate unit vertex normals from area weighted polygon normals (Newell's method)
    ///
    /// Assumes consistently oriented polygons. Vertices not used by any
    /// polygon get a zero normal.
    pub fn calculate_vertex_normals(&self) -> Vec<Vector3d> {
        let mut normals = vec![Vector3d::zeros(); self.vertex_count()];
        for cell in self.cells.iter().filter(|c| c.len() >= 3) {
            let n = self.polygon_area_vector(cell);
            for &id in cell {
                normals[id] += n;
            }
        }
        normals
            .into_iter()
            .map(|n| n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3d::zeros))
            .collect()
    }

    /// Twice the area times the unit normal of a polygon
    fn polygon_area_vector(&self, cell: &[usize]) -> Vector3d {
        if cell.len() < 3 {
            return Vector3d::zeros();
        }
        cell.iter()
            .circular_tuple_windows()
            .map(|(&a, &b)| self.vertices[a].coords.cross(&self.vertices[b].coords))
            .fold(Vector3d::zeros(), |acc, v| acc + v)
    }
}
