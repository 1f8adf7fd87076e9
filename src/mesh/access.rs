//! The mesh interface consumed by the loop algorithms.
//!
//! The loop algorithms never touch [`PolyMesh`] internals directly. They read
//! and mutate the mesh through [`MeshAccess`], so any host mesh that can answer
//! these adjacency queries and perform a face-merging dissolve can be driven by
//! them.

use super::dissolve::{DissolveOutcome, EdgeMerge};
use super::index::{EdgeId, FaceId, MeshIndex, VertexId};
use super::polymesh::PolyMesh;

/// Per-edge attributes that can protect an edge loop from removal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeAttributes {
    /// UV seam flag.
    pub seam: bool,
    /// Bevel weight.
    pub bevel_weight: f64,
    /// Subdivision crease weight.
    pub crease: f64,
}

/// Adjacency queries, edge attributes and mutation primitives for loop processing.
///
/// Queries other than the validity checks may assume the id refers to a live
/// element; callers check validity first.
pub trait MeshAccess {
    /// Integer type used by this mesh's ids.
    type Index: MeshIndex;

    /// All live edges, in id order.
    fn edges(&self) -> Vec<EdgeId<Self::Index>>;

    /// Check whether an edge still exists.
    fn is_edge_valid(&self, e: EdgeId<Self::Index>) -> bool;

    /// Check whether a vertex still exists.
    fn is_vertex_valid(&self, v: VertexId<Self::Index>) -> bool;

    /// The two endpoints of an edge.
    fn edge_vertices(&self, e: EdgeId<Self::Index>) -> [VertexId<Self::Index>; 2];

    /// Faces bordering an edge (0–2).
    fn edge_faces(&self, e: EdgeId<Self::Index>) -> &[FaceId<Self::Index>];

    /// Edges incident on a vertex.
    fn vertex_edges(&self, v: VertexId<Self::Index>) -> &[EdgeId<Self::Index>];

    /// Edge cycle of a face.
    fn face_edges(&self, f: FaceId<Self::Index>) -> &[EdgeId<Self::Index>];

    /// Vertex cycle of a face.
    fn face_vertices(&self, f: FaceId<Self::Index>) -> &[VertexId<Self::Index>];

    /// Angle between the normals of the two faces bordering an edge.
    ///
    /// `None` unless the edge borders exactly two faces.
    fn edge_face_angle(&self, e: EdgeId<Self::Index>) -> Option<f64>;

    /// Protection attributes of an edge.
    fn edge_attributes(&self, e: EdgeId<Self::Index>) -> EdgeAttributes;

    /// Selection state of an edge.
    fn is_edge_selected(&self, e: EdgeId<Self::Index>) -> bool;

    /// Select or deselect an edge.
    fn set_edge_selected(&mut self, e: EdgeId<Self::Index>, selected: bool);

    /// Dissolve edges, merging the faces on either side.
    fn dissolve_edges(&mut self, edges: &[EdgeId<Self::Index>]) -> DissolveOutcome;

    /// Dissolve vertices left in the middle of a two-edge chain.
    ///
    /// Returns which edge absorbed which, one entry per removed vertex.
    fn dissolve_vertices(
        &mut self,
        vertices: &[VertexId<Self::Index>],
    ) -> Vec<EdgeMerge<Self::Index>>;

    /// Number of edges incident on a vertex.
    fn vertex_degree(&self, v: VertexId<Self::Index>) -> usize {
        self.vertex_edges(v).len()
    }

    /// Number of vertices of a face.
    fn face_vertex_count(&self, f: FaceId<Self::Index>) -> usize {
        self.face_vertices(f).len()
    }

    /// Check if an edge lies on the mesh boundary (fewer than two faces).
    fn is_boundary_edge(&self, e: EdgeId<Self::Index>) -> bool {
        self.edge_faces(e).len() < 2
    }

    /// Live edges currently selected.
    fn selected_edges(&self) -> Vec<EdgeId<Self::Index>> {
        self.edges()
            .into_iter()
            .filter(|&e| self.is_edge_selected(e))
            .collect()
    }

    /// Deselect every live edge.
    fn clear_selection(&mut self) {
        for e in self.edges() {
            self.set_edge_selected(e, false);
        }
    }
}

impl<I: MeshIndex> MeshAccess for PolyMesh<I> {
    type Index = I;

    fn edges(&self) -> Vec<EdgeId<I>> {
        self.edge_ids().collect()
    }

    #[inline]
    fn is_edge_valid(&self, e: EdgeId<I>) -> bool {
        PolyMesh::is_edge_valid(self, e)
    }

    #[inline]
    fn is_vertex_valid(&self, v: VertexId<I>) -> bool {
        PolyMesh::is_vertex_valid(self, v)
    }

    #[inline]
    fn edge_vertices(&self, e: EdgeId<I>) -> [VertexId<I>; 2] {
        self.edge(e).vertices
    }

    #[inline]
    fn edge_faces(&self, e: EdgeId<I>) -> &[FaceId<I>] {
        self.edge(e).faces()
    }

    #[inline]
    fn vertex_edges(&self, v: VertexId<I>) -> &[EdgeId<I>] {
        self.vertex(v).edges()
    }

    #[inline]
    fn face_edges(&self, f: FaceId<I>) -> &[EdgeId<I>] {
        self.face(f).edges()
    }

    #[inline]
    fn face_vertices(&self, f: FaceId<I>) -> &[VertexId<I>] {
        self.face(f).vertices()
    }

    fn edge_face_angle(&self, e: EdgeId<I>) -> Option<f64> {
        PolyMesh::edge_face_angle(self, e)
    }

    fn edge_attributes(&self, e: EdgeId<I>) -> EdgeAttributes {
        let edge = self.edge(e);
        EdgeAttributes {
            seam: edge.seam,
            bevel_weight: edge.bevel_weight,
            crease: edge.crease,
        }
    }

    #[inline]
    fn is_edge_selected(&self, e: EdgeId<I>) -> bool {
        self.edge(e).selected
    }

    #[inline]
    fn set_edge_selected(&mut self, e: EdgeId<I>, selected: bool) {
        self.set_selected(e, selected);
    }

    fn dissolve_edges(&mut self, edges: &[EdgeId<I>]) -> DissolveOutcome {
        PolyMesh::dissolve_edges(self, edges)
    }

    fn dissolve_vertices(&mut self, vertices: &[VertexId<I>]) -> Vec<EdgeMerge<I>> {
        PolyMesh::dissolve_vertices(self, vertices)
    }

    fn selected_edges(&self) -> Vec<EdgeId<I>> {
        PolyMesh::selected_edges(self)
    }

    fn clear_selection(&mut self) {
        PolyMesh::clear_selection(self);
    }
}
