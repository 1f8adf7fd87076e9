//! Mesh construction utilities.
//!
//! This module provides functions for building polygon meshes from
//! face-vertex lists, and for flattening a (possibly edited) mesh back into
//! compact face-vertex form.

use std::collections::HashMap;

use nalgebra::Point3;

use super::index::{MeshIndex, VertexId};
use super::polymesh::PolyMesh;
use crate::error::{MeshError, Result};

/// Build a polygon mesh from vertices and faces of any size (3 or more).
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of polygons, each as counter-clockwise vertex indices
///
/// # Returns
/// A polygon mesh, or an error if the input is invalid or has more vertices
/// or edges than `I` can address.
///
/// # Example
/// ```
/// use loopcull::mesh::{build_from_polygons, PolyMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(2.0, 0.5, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
///
/// let mesh: PolyMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_edges(), 6);
/// ```
pub fn build_from_polygons<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[Vec<usize>],
) -> Result<PolyMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
    }

    // Every corner can introduce at most one edge
    let corners: usize = faces.iter().map(Vec::len).sum();
    if vertices.len().max(corners) > I::CAPACITY {
        return Err(MeshError::invalid_param(
            "vertices",
            vertices.len(),
            "too many elements for the mesh index type",
        ));
    }

    let num_faces = faces.len();
    let mut mesh = PolyMesh::with_capacity(vertices.len(), num_faces);

    let vertex_ids: Vec<VertexId<I>> = vertices
        .iter()
        .map(|&pos| mesh.add_vertex(pos))
        .collect();

    let mut polygon: Vec<VertexId<I>> = Vec::new();
    for face in faces {
        polygon.clear();
        polygon.extend(face.iter().map(|&vi| vertex_ids[vi]));
        mesh.add_face(&polygon)?;
    }

    Ok(mesh)
}

/// Build a polygon mesh from vertices and quad faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of quad faces, each as [v0, v1, v2, v3] indices (counter-clockwise)
///
/// # Example
/// ```
/// use loopcull::mesh::{build_from_quads, PolyMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh: PolyMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
/// assert!(mesh.is_quad_mesh());
/// ```
pub fn build_from_quads<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<PolyMesh<I>> {
    let polygons: Vec<Vec<usize>> = faces.iter().map(|f| f.to_vec()).collect();
    build_from_polygons(vertices, &polygons)
}

/// Convert a polygon mesh back to a compact face-vertex representation.
///
/// Dead vertices and faces are dropped and the remaining vertices renumbered
/// in id order.
///
/// Returns (vertices, faces) tuple.
pub fn to_face_vertex<I: MeshIndex>(mesh: &PolyMesh<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let mut remap: HashMap<VertexId<I>, usize> = HashMap::new();
    let mut vertices = Vec::with_capacity(mesh.num_vertices());
    for v in mesh.vertex_ids() {
        remap.insert(v, vertices.len());
        vertices.push(*mesh.position(v));
    }

    let faces: Vec<Vec<usize>> = mesh
        .face_ids()
        .map(|f| mesh.face(f).vertices().iter().map(|v| remap[v]).collect())
        .collect();

    (vertices, faces)
}
