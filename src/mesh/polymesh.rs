//! Polygon mesh data structure.
//!
//! This module provides an arena-based polygon mesh with first-class edges.
//! Unlike a half-edge structure, edges are stored once and carry the per-edge
//! attributes that loop processing reads (seam flag, bevel weight, crease
//! weight, selection).
//!
//! # Structure
//!
//! - Each **vertex** stores its position and the list of incident edges
//! - Each **edge** stores its two endpoints and the 0–2 faces it borders
//! - Each **face** stores its vertex cycle and the matching edge cycle, where
//!   `edges[i]` joins `vertices[i]` and `vertices[i + 1]`
//!
//! # Liveness
//!
//! Elements are never moved or reused. Removing an element clears its `alive`
//! flag, so ids held across a mutation can be checked with
//! [`PolyMesh::is_edge_valid`] and friends instead of reading stale data.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// A vertex in the polygon mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Edges incident on this vertex.
    pub(crate) edges: Vec<EdgeId<I>>,

    pub(crate) alive: bool,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            edges: Vec::new(),
            alive: true,
        }
    }

    /// Create a new vertex from coordinates.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Edges incident on this vertex.
    #[inline]
    pub fn edges(&self) -> &[EdgeId<I>] {
        &self.edges
    }
}

/// An edge in the polygon mesh.
#[derive(Debug, Clone)]
pub struct Edge<I: MeshIndex = u32> {
    /// The two endpoint vertices.
    pub vertices: [VertexId<I>; 2],

    /// Faces bordering this edge (0, 1 or 2).
    pub(crate) faces: Vec<FaceId<I>>,

    /// UV seam flag.
    pub seam: bool,

    /// Bevel weight (0.0 = none).
    pub bevel_weight: f64,

    /// Subdivision crease weight (0.0 = none).
    pub crease: f64,

    /// Selection state.
    pub selected: bool,

    pub(crate) alive: bool,
}

impl<I: MeshIndex> Edge<I> {
    fn new(v0: VertexId<I>, v1: VertexId<I>) -> Self {
        Self {
            vertices: [v0, v1],
            faces: Vec::with_capacity(2),
            seam: false,
            bevel_weight: 0.0,
            crease: 0.0,
            selected: false,
            alive: true,
        }
    }

    /// Faces bordering this edge.
    #[inline]
    pub fn faces(&self) -> &[FaceId<I>] {
        &self.faces
    }

    /// The endpoint opposite to `v`.
    #[inline]
    pub fn other_vertex(&self, v: VertexId<I>) -> VertexId<I> {
        if self.vertices[0] == v {
            self.vertices[1]
        } else {
            self.vertices[0]
        }
    }

    /// Check whether `v` is one of the endpoints.
    #[inline]
    pub fn has_vertex(&self, v: VertexId<I>) -> bool {
        self.vertices[0] == v || self.vertices[1] == v
    }
}

/// A polygonal face in the mesh.
#[derive(Debug, Clone)]
pub struct Face<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<VertexId<I>>,
    pub(crate) edges: Vec<EdgeId<I>>,
    pub(crate) alive: bool,
}

impl<I: MeshIndex> Face<I> {
    /// The vertex cycle, counter-clockwise.
    #[inline]
    pub fn vertices(&self) -> &[VertexId<I>] {
        &self.vertices
    }

    /// The edge cycle; `edges()[i]` joins `vertices()[i]` and `vertices()[i + 1]`.
    #[inline]
    pub fn edges(&self) -> &[EdgeId<I>] {
        &self.edges
    }
}

/// An arena-based polygon mesh with first-class edges.
#[derive(Debug, Clone)]
pub struct PolyMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) edges: Vec<Edge<I>>,
    pub(crate) faces: Vec<Face<I>>,
}

impl<I: MeshIndex> Default for PolyMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> PolyMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // A closed quad mesh has E = 2F; leave room for boundaries
        let num_edges = num_faces * 2 + num_faces / 2 + 4;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            edges: Vec::with_capacity(num_edges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Counts ====================

    /// Number of live vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.iter().filter(|v| v.alive).count()
    }

    /// Number of live edges.
    pub fn num_edges(&self) -> usize {
        self.edges.iter().filter(|e| e.alive).count()
    }

    /// Number of live faces.
    pub fn num_faces(&self) -> usize {
        self.faces.iter().filter(|f| f.alive).count()
    }

    // ==================== Validity ====================

    /// Check whether a vertex id refers to a live vertex.
    #[inline]
    pub fn is_vertex_valid(&self, v: VertexId<I>) -> bool {
        self.vertices.get(v.index()).is_some_and(|v| v.alive)
    }

    /// Check whether an edge id refers to a live edge.
    #[inline]
    pub fn is_edge_valid(&self, e: EdgeId<I>) -> bool {
        self.edges.get(e.index()).is_some_and(|e| e.alive)
    }

    /// Check whether a face id refers to a live face.
    #[inline]
    pub fn is_face_valid(&self, f: FaceId<I>) -> bool {
        self.faces.get(f.index()).is_some_and(|f| f.alive)
    }

    // ==================== Accessors ====================

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        &self.edges[id.index()]
    }

    /// Get a mutable edge by ID.
    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId<I>) -> &mut Edge<I> {
        &mut self.edges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    // ==================== Iteration ====================

    /// Iterate over live vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.alive)
            .map(|(i, _)| VertexId::new(i))
    }

    /// Iterate over live edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.alive)
            .map(|(i, _)| EdgeId::new(i))
    }

    /// Iterate over live face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.alive)
            .map(|(i, _)| FaceId::new(i))
    }

    // ==================== Topology Queries ====================

    /// Number of edges incident on a vertex.
    #[inline]
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.vertex(v).edges.len()
    }

    /// Number of vertices of a face.
    #[inline]
    pub fn face_vertex_count(&self, f: FaceId<I>) -> usize {
        self.face(f).vertices.len()
    }

    /// Check if an edge lies on the mesh boundary (fewer than two faces).
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeId<I>) -> bool {
        self.edge(e).faces.len() < 2
    }

    /// Find the edge joining two vertices, if any.
    pub fn find_edge(&self, a: VertexId<I>, b: VertexId<I>) -> Option<EdgeId<I>> {
        self.vertex(a)
            .edges
            .iter()
            .copied()
            .find(|&e| self.edge(e).other_vertex(a) == b)
    }

    /// Check if every live face is a quad.
    pub fn is_quad_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_vertex_count(f) == 4)
    }

    // ==================== Edge Attributes ====================

    /// Mark or clear an edge as a UV seam.
    pub fn set_seam(&mut self, e: EdgeId<I>, seam: bool) {
        self.edge_mut(e).seam = seam;
    }

    /// Set an edge's bevel weight.
    pub fn set_bevel_weight(&mut self, e: EdgeId<I>, weight: f64) {
        self.edge_mut(e).bevel_weight = weight;
    }

    /// Set an edge's crease weight.
    pub fn set_crease(&mut self, e: EdgeId<I>, weight: f64) {
        self.edge_mut(e).crease = weight;
    }

    /// Select or deselect an edge.
    pub fn set_selected(&mut self, e: EdgeId<I>, selected: bool) {
        self.edge_mut(e).selected = selected;
    }

    /// Deselect every edge.
    pub fn clear_selection(&mut self) {
        for e in &mut self.edges {
            e.selected = false;
        }
    }

    /// Live edges currently selected.
    pub fn selected_edges(&self) -> Vec<EdgeId<I>> {
        self.edge_ids().filter(|&e| self.edge(e).selected).collect()
    }

    // ==================== Geometry ====================

    /// Compute the unit normal of a face using Newell's method.
    ///
    /// Works for non-planar and concave polygons. Returns the zero vector for
    /// degenerate faces.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let verts = &self.face(f).vertices;
        let n = verts.len();
        let mut normal = Vector3::zeros();
        for i in 0..n {
            let p = self.position(verts[i]);
            let q = self.position(verts[(i + 1) % n]);
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
        }
        normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    /// Compute the angle between the normals of the two faces bordering an edge.
    ///
    /// Returns `None` unless the edge borders exactly two faces. A flat edge has
    /// angle 0; a fully folded edge approaches π.
    pub fn edge_face_angle(&self, e: EdgeId<I>) -> Option<f64> {
        let faces = &self.edge(e).faces;
        if faces.len() != 2 {
            return None;
        }
        let n0 = self.face_normal(faces[0]);
        let n1 = self.face_normal(faces[1]);
        Some(n0.dot(&n1).clamp(-1.0, 1.0).acos())
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    /// Add a polygonal face over existing vertices, creating edges as needed.
    ///
    /// Fails if the polygon is degenerate or if one of its edges already
    /// borders two faces.
    pub fn add_face(&mut self, verts: &[VertexId<I>]) -> Result<FaceId<I>> {
        let face_index = self.faces.len();
        let n = verts.len();
        if n < 3 {
            return Err(MeshError::DegenerateFace { face: face_index });
        }
        for (i, &v) in verts.iter().enumerate() {
            if verts[i + 1..].contains(&v) {
                return Err(MeshError::DegenerateFace { face: face_index });
            }
        }

        // Check manifoldness before touching the arenas
        for i in 0..n {
            let (a, b) = (verts[i], verts[(i + 1) % n]);
            if let Some(e) = self.find_edge(a, b) {
                if self.edge(e).faces.len() >= 2 {
                    return Err(MeshError::NonManifoldEdge {
                        v0: a.index(),
                        v1: b.index(),
                    });
                }
            }
        }

        let face_id = FaceId::new(face_index);
        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (verts[i], verts[(i + 1) % n]);
            let e = match self.find_edge(a, b) {
                Some(e) => e,
                None => self.add_edge(a, b),
            };
            self.edges[e.index()].faces.push(face_id);
            edges.push(e);
        }

        self.faces.push(Face {
            vertices: verts.to_vec(),
            edges,
            alive: true,
        });
        Ok(face_id)
    }

    fn add_edge(&mut self, a: VertexId<I>, b: VertexId<I>) -> EdgeId<I> {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(Edge::new(a, b));
        self.vertices[a.index()].edges.push(id);
        self.vertices[b.index()].edges.push(id);
        id
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all live connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        for (vi, v) in self.vertices.iter().enumerate() {
            if !v.alive {
                continue;
            }
            for &e in &v.edges {
                if !self.is_edge_valid(e) || !self.edge(e).has_vertex(VertexId::new(vi)) {
                    return false;
                }
            }
        }

        for (ei, e) in self.edges.iter().enumerate() {
            if !e.alive {
                continue;
            }
            let id = EdgeId::new(ei);
            if e.faces.len() > 2 || e.vertices[0] == e.vertices[1] {
                return false;
            }
            for &v in &e.vertices {
                if !self.is_vertex_valid(v) || !self.vertex(v).edges.contains(&id) {
                    return false;
                }
            }
            for &f in &e.faces {
                if !self.is_face_valid(f) || !self.face(f).edges.contains(&id) {
                    return false;
                }
            }
        }

        for (fi, f) in self.faces.iter().enumerate() {
            if !f.alive {
                continue;
            }
            let id = FaceId::new(fi);
            let n = f.vertices.len();
            if n < 3 || f.edges.len() != n {
                return false;
            }
            for i in 0..n {
                let e = f.edges[i];
                if !self.is_edge_valid(e) {
                    return false;
                }
                let edge = self.edge(e);
                if !edge.has_vertex(f.vertices[i])
                    || !edge.has_vertex(f.vertices[(i + 1) % n])
                    || !edge.faces.contains(&id)
                {
                    return false;
                }
            }
        }

        true
    }
}
