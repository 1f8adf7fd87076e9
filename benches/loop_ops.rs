//! Benchmarks for edge loop operations.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use loopcull::algo::loops::{discover_loops, trace_loop, LoopGraph};
use loopcull::prelude::*;
use nalgebra::Point3;

fn grid_data(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 4]>) {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11, v01]);
        }
    }

    (vertices, faces)
}

fn create_grid_mesh(n: usize) -> PolyMesh {
    let (vertices, faces) = grid_data(n);
    build_from_quads(&vertices, &faces).unwrap()
}

fn flat_band() -> LoopOptions {
    LoopOptions::default().with_angle_range(1.0, 180.0)
}

fn bench_mesh_construction(c: &mut Criterion) {
    c.bench_function("build_quad_grid_32x32", |b| {
        let (vertices, faces) = grid_data(32);

        b.iter(|| {
            let mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
            mesh
        });
    });
}

fn bench_loop_discovery(c: &mut Criterion) {
    let mesh = create_grid_mesh(64);
    let options = flat_band();

    c.bench_function("trace_loop_64", |b| {
        let seed = mesh.find_edge(VertexId::new(65), VertexId::new(66)).unwrap();
        b.iter(|| trace_loop(&mesh, seed, &options).map(|lp| lp.len()))
    });

    c.bench_function("discover_loops_64", |b| {
        let seeds = mesh.edges();
        b.iter(|| discover_loops(&mesh, &seeds, &options).len())
    });

    c.bench_function("loop_graph_64", |b| {
        let loops = discover_loops(&mesh, &mesh.edges(), &options);
        b.iter_batched(
            || loops.clone(),
            |loops| LoopGraph::build(&mesh, loops).len(),
            BatchSize::SmallInput,
        )
    });
}

fn bench_optimize(c: &mut Criterion) {
    c.bench_function("optimize_loops_32", |b| {
        let mesh = create_grid_mesh(32);
        let options = flat_band();
        b.iter_batched(
            || mesh.clone(),
            |mut mesh| optimize_loops(&mut mesh, &options).map(|r| r.loops_dissolved),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_mesh_construction, bench_loop_discovery, bench_optimize);
criterion_main!(benches);
