//! Noisy Grid Smoothing Demo
//!
//! Smooths a height field with random noise using plain Laplacian and
//! Taubin (lambda/mu) relaxation and compares how much each one shrinks
//! the surface.

use anyhow::Result;
use log::info;
use meshfair_core::{DataArray, EdgeLengthStatistics, Point3d, PolyMesh};
use meshfair_smoothing::{MeshSmoother, Progress, SmoothingConfig, Weighting};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

fn create_noisy_grid(size: usize, noise: f64) -> PolyMesh {
    let mut rng = StdRng::seed_from_u64(42);
    let mut vertices = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let fx = x as f64 / (size - 1) as f64 * std::f64::consts::PI;
            let fy = y as f64 / (size - 1) as f64 * std::f64::consts::PI;
            let z = 4.0 * fx.sin() * fy.sin() + rng.gen_range(-noise..noise);
            vertices.push(Point3d::new(x as f64, y as f64, z));
        }
    }
    let mut cells = Vec::with_capacity((size - 1) * (size - 1));
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let id = y * size + x;
            cells.push(vec![id, id + 1, id + size + 1, id + size]);
        }
    }
    let mut mesh = PolyMesh::from_vertices_and_cells(vertices, cells);
    let temperature = (0..size * size).map(|_| rng.gen_range(20.0..30.0)).collect();
    mesh.point_data.insert(DataArray::from_scalars("temperature", temperature));
    mesh
}

fn height_range(mesh: &PolyMesh) -> (f64, f64) {
    mesh.vertices
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.z), hi.max(p.z)))
}

fn main() -> Result<()> {
    env_logger::init();

    println!("Noisy Grid Smoothing Demo");
    println!("=========================");

    let mesh = create_noisy_grid(96, 0.3);
    let (lo, hi) = height_range(&mesh);
    println!("Created grid with {} vertices and {} quads", mesh.vertex_count(), mesh.cell_count());
    println!("  - height range: [{:.3}, {:.3}]", lo, hi);

    let progress = Progress::new(|current, total, stage| {
        if current == total {
            info!("{}: {} iterations done", stage, total);
        }
    });

    let base = SmoothingConfig::default()
        .with_weighting(Weighting::Uniform)
        .with_iterations(30)
        .with_lambda(0.5)
        .with_points(true)
        .with_array("temperature");
    println!("\nConfiguration:\n{}", serde_json::to_string_pretty(&base)?);

    println!("\n1. Laplacian smoothing");
    let mut laplace = mesh.clone();
    let start = Instant::now();
    let adjacency = MeshSmoother::new(base.clone())
        .with_progress(progress.clone())
        .smooth(&mut laplace)?;
    let (lo, hi) = height_range(&laplace);
    println!("  - done in {:?}, height range [{:.3}, {:.3}]", start.elapsed(), lo, hi);

    println!("\n2. Taubin smoothing (reusing the adjacency table)");
    let mut taubin = mesh.clone();
    let start = Instant::now();
    MeshSmoother::new(base.with_mu(-0.53))
        .with_adjacency(adjacency.clone())
        .with_progress(progress)
        .smooth(&mut taubin)?;
    let (lo, hi) = height_range(&taubin);
    println!("  - done in {:?}, height range [{:.3}, {:.3}]", start.elapsed(), lo, hi);

    println!("\n3. Edge length statistics");
    for (label, m) in [("input", &mesh), ("laplacian", &laplace), ("taubin", &taubin)] {
        let stats = EdgeLengthStatistics::compute(&m.vertices, &adjacency);
        println!("  - {:<10} mean {:.4}, std dev {:.4}", label, stats.mean, stats.std_dev);
    }

    if let (Some(before), Some(after)) = (mesh.array("temperature"), taubin.array("temperature")) {
        let spread = |a: &DataArray| {
            let (lo, hi) = a
                .values()
                .iter()
                .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            hi - lo
        };
        println!("\nTemperature spread: {:.3} -> {:.3}", spread(before), spread(after));
    }

    Ok(())
}
