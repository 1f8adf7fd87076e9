//! Topological dissolve operations.
//!
//! [`PolyMesh::dissolve_edges`] removes edges by merging the faces on either
//! side into one polygon per connected region. [`PolyMesh::dissolve_vertices`]
//! removes vertices that sit in the middle of a two-edge chain, joining the
//! two edges into one.
//!
//! Both operations kill elements in place; nothing is renumbered.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use super::index::{EdgeId, FaceId, MeshIndex, VertexId};
use super::polymesh::{Face, PolyMesh};

/// Summary of a dissolve operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DissolveOutcome {
    /// Edges removed (requested edges plus any edge sealed inside a merged face).
    pub edges_removed: usize,
    /// Original faces consumed by merges.
    pub faces_merged: usize,
    /// New faces created by merges.
    pub faces_created: usize,
    /// Vertices left without edges and removed.
    pub vertices_removed: usize,
    /// Regions left untouched because their outline is not a single simple cycle.
    pub regions_skipped: usize,
}

/// One chain vertex removed by [`PolyMesh::dissolve_vertices`].
///
/// The vertex's two edges became one: `dropped` is dead and `kept` now spans
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeMerge<I: MeshIndex = u32> {
    /// The removed vertex.
    pub vertex: VertexId<I>,
    /// Edge killed by the merge.
    pub dropped: EdgeId<I>,
    /// Edge that now runs across the removed vertex.
    pub kept: EdgeId<I>,
}

/// Per-region result of a successful merge.
struct MergeStats {
    edges_removed: usize,
    vertices_removed: usize,
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Keep the smaller root so region order follows face ids
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[hi] = lo;
    }
}

impl<I: MeshIndex> PolyMesh<I> {
    /// Dissolve a set of edges, merging the faces on either side.
    ///
    /// Faces connected through dissolved edges form a region that is replaced
    /// by a single polygon following the region's outline. Edges whose two
    /// faces both end up inside one region are removed, as are vertices left
    /// with no edges.
    ///
    /// Invalid edges and edges without exactly two faces are ignored. A region
    /// whose outline is not one simple cycle (it would enclose a hole or pinch
    /// at a vertex) is left unchanged and counted in
    /// [`DissolveOutcome::regions_skipped`].
    pub fn dissolve_edges(&mut self, edges: &[EdgeId<I>]) -> DissolveOutcome {
        let mut outcome = DissolveOutcome::default();

        let requested: Vec<EdgeId<I>> = edges
            .iter()
            .copied()
            .filter(|&e| self.is_edge_valid(e) && self.edge(e).faces.len() == 2)
            .collect();
        if requested.is_empty() {
            return outcome;
        }

        let mut parent: Vec<usize> = (0..self.faces.len()).collect();
        for &e in &requested {
            let faces = &self.edge(e).faces;
            union(&mut parent, faces[0].index(), faces[1].index());
        }

        let mut regions: BTreeMap<usize, Vec<FaceId<I>>> = BTreeMap::new();
        for &e in &requested {
            for &f in &self.edges[e.index()].faces {
                let root = find(&mut parent, f.index());
                regions.entry(root).or_default().push(f);
            }
        }

        for (_, mut faces) in regions {
            faces.sort();
            faces.dedup();
            match self.merge_region(&faces) {
                Some(stats) => {
                    outcome.edges_removed += stats.edges_removed;
                    outcome.vertices_removed += stats.vertices_removed;
                    outcome.faces_merged += faces.len();
                    outcome.faces_created += 1;
                }
                None => {
                    warn!(faces = faces.len(), "skipping dissolve region without a simple outline");
                    outcome.regions_skipped += 1;
                }
            }
        }

        outcome
    }

    /// Replace a connected set of faces with one polygon.
    fn merge_region(&mut self, faces: &[FaceId<I>]) -> Option<MergeStats> {
        let mut counts: HashMap<EdgeId<I>, usize> = HashMap::new();
        for &f in faces {
            for &e in &self.face(f).edges {
                *counts.entry(e).or_insert(0) += 1;
            }
        }

        // Directed outline: each boundary edge taken in its face's winding
        let mut outgoing: HashMap<VertexId<I>, (VertexId<I>, EdgeId<I>)> = HashMap::new();
        let mut start = None;
        for &f in faces {
            let face = self.face(f);
            let n = face.vertices.len();
            for i in 0..n {
                let e = face.edges[i];
                if counts[&e] != 1 {
                    continue;
                }
                let (a, b) = (face.vertices[i], face.vertices[(i + 1) % n]);
                if outgoing.insert(a, (b, e)).is_some() {
                    return None;
                }
                start.get_or_insert(a);
            }
        }

        let start = start?;
        let mut cycle_vertices = Vec::with_capacity(outgoing.len());
        let mut cycle_edges = Vec::with_capacity(outgoing.len());
        let mut v = start;
        loop {
            let &(next, e) = outgoing.get(&v)?;
            cycle_vertices.push(v);
            cycle_edges.push(e);
            v = next;
            if v == start {
                break;
            }
            if cycle_vertices.len() > outgoing.len() {
                return None;
            }
        }
        if cycle_vertices.len() != outgoing.len() || cycle_vertices.len() < 3 {
            return None;
        }

        let new_face = FaceId::new(self.faces.len());
        for &f in faces {
            let face = &mut self.faces[f.index()];
            face.alive = false;
            face.vertices.clear();
            face.edges.clear();
        }
        for &e in &cycle_edges {
            for slot in &mut self.edges[e.index()].faces {
                if faces.contains(slot) {
                    *slot = new_face;
                }
            }
        }
        self.faces.push(Face {
            vertices: cycle_vertices,
            edges: cycle_edges,
            alive: true,
        });

        let mut internal: Vec<EdgeId<I>> = counts
            .into_iter()
            .filter(|&(_, count)| count >= 2)
            .map(|(e, _)| e)
            .collect();
        internal.sort();

        let mut stats = MergeStats {
            edges_removed: 0,
            vertices_removed: 0,
        };
        for e in internal {
            for v in self.remove_edge(e) {
                if self.vertices[v.index()].alive && self.vertices[v.index()].edges.is_empty() {
                    self.vertices[v.index()].alive = false;
                    stats.vertices_removed += 1;
                }
            }
            stats.edges_removed += 1;
        }

        Some(stats)
    }

    /// Kill an edge and detach it from its endpoints. Returns the endpoints.
    fn remove_edge(&mut self, e: EdgeId<I>) -> [VertexId<I>; 2] {
        let edge = &mut self.edges[e.index()];
        edge.alive = false;
        edge.selected = false;
        edge.faces.clear();
        let ends = edge.vertices;
        for v in ends {
            self.vertices[v.index()].edges.retain(|&x| x != e);
        }
        ends
    }

    /// Dissolve chain vertices, joining their two edges into one.
    ///
    /// A vertex is dissolved when it has exactly two edges, both edges border
    /// the same faces, every such face keeps at least three vertices, and the
    /// two far endpoints are not already connected. Other vertices are left
    /// alone. The surviving edge inherits the seam flag and the larger bevel
    /// and crease weights of the pair.
    ///
    /// Returns one [`EdgeMerge`] per removed vertex, in removal order. A later
    /// merge may drop an edge kept by an earlier one.
    pub fn dissolve_vertices(&mut self, vertices: &[VertexId<I>]) -> Vec<EdgeMerge<I>> {
        let mut merges = Vec::new();

        for &v in vertices {
            if !self.is_vertex_valid(v) || self.valence(v) != 2 {
                continue;
            }
            let keep = self.vertex(v).edges[0];
            let drop = self.vertex(v).edges[1];
            let a = self.edge(keep).other_vertex(v);
            let b = self.edge(drop).other_vertex(v);
            if a == b || self.find_edge(a, b).is_some() {
                continue;
            }

            let mut keep_faces = self.edge(keep).faces.clone();
            let mut drop_faces = self.edge(drop).faces.clone();
            keep_faces.sort();
            drop_faces.sort();
            if keep_faces != drop_faces
                || keep_faces.iter().any(|&f| self.face_vertex_count(f) <= 3)
            {
                continue;
            }

            for &f in &keep_faces {
                let face = &mut self.faces[f.index()];
                let n = face.vertices.len();
                let Some(pos) = face.vertices.iter().position(|&x| x == v) else {
                    continue;
                };
                let prev = (pos + n - 1) % n;
                face.edges[prev] = keep;
                face.edges.remove(pos);
                face.vertices.remove(pos);
            }

            let (seam, bevel, crease, selected) = {
                let d = self.edge(drop);
                (d.seam, d.bevel_weight, d.crease, d.selected)
            };
            {
                let k = &mut self.edges[keep.index()];
                k.vertices = if k.vertices[0] == v { [b, k.vertices[1]] } else { [k.vertices[0], b] };
                k.seam |= seam;
                k.bevel_weight = k.bevel_weight.max(bevel);
                k.crease = k.crease.max(crease);
                k.selected |= selected;
            }
            {
                let d = &mut self.edges[drop.index()];
                d.alive = false;
                d.selected = false;
                d.faces.clear();
            }
            for slot in &mut self.vertices[b.index()].edges {
                if *slot == drop {
                    *slot = keep;
                }
            }
            let vertex = &mut self.vertices[v.index()];
            vertex.edges.clear();
            vertex.alive = false;
            merges.push(EdgeMerge {
                vertex: v,
                dropped: drop,
                kept: keep,
            });
        }

        merges
    }
}
