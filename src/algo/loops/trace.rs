//! Edge loop tracing.

use std::collections::HashSet;

use crate::mesh::{EdgeId, MeshAccess, MeshIndex, VertexId};

use super::{ClosurePolicy, LoopOptions, ProtectedBy};

/// A traced edge loop.
///
/// Edges are unique and kept in trace order; the first edge is the seed the
/// loop was traced from and serves as its representative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLoop<I: MeshIndex = u32> {
    edges: Vec<EdgeId<I>>,
    closed: bool,
}

impl<I: MeshIndex> EdgeLoop<I> {
    /// Create a loop from edges, dropping repeats but keeping first-seen order.
    pub fn new(edges: impl IntoIterator<Item = EdgeId<I>>, closed: bool) -> Self {
        let mut seen = HashSet::new();
        let edges = edges.into_iter().filter(|e| seen.insert(*e)).collect();
        Self { edges, closed }
    }

    /// The loop's edges.
    #[inline]
    pub fn edges(&self) -> &[EdgeId<I>] {
        &self.edges
    }

    /// The representative (seed) edge.
    #[inline]
    pub fn first(&self) -> Option<EdgeId<I>> {
        self.edges.first().copied()
    }

    /// Number of edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check whether the loop has no edges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Check whether the loop closes on itself.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Check whether the loop contains an edge.
    pub fn contains(&self, e: EdgeId<I>) -> bool {
        self.edges.contains(&e)
    }
}

/// Why a trace produced no loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceRejection<I: MeshIndex = u32> {
    /// The seed edge no longer exists.
    StaleSeed,
    /// The loop would cross an edge with fewer than two faces.
    Boundary(EdgeId<I>),
    /// The loop would cross a protected edge.
    Protected {
        /// The protected edge.
        edge: EdgeId<I>,
        /// The attribute protecting it.
        by: ProtectedBy,
    },
    /// The loop closes on itself and only open loops are wanted.
    Closed,
    /// The loop is open and only closed loops are wanted.
    Open,
    /// Fewer than two edges.
    TooShort,
}

/// A rejected trace, with the edges it visited before giving up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRejected<I: MeshIndex = u32> {
    /// Why the trace was rejected.
    pub reason: TraceRejection<I>,
    /// Edges visited, including the seed and the edge that stopped the trace.
    pub visited: Vec<EdgeId<I>>,
}

impl<I: MeshIndex> TraceRejected<I> {
    fn new(reason: TraceRejection<I>, visited: Vec<EdgeId<I>>) -> Self {
        Self { reason, visited }
    }
}

/// Trace the edge loop through `seed`.
///
/// The walk keeps a stack of vertices to expand, starting from the seed's
/// endpoints. At a vertex with exactly four edges, the edge sharing no face
/// with the loop edge already there is the straight-across continuation.
/// Vertices of any other valence end the loop in that direction.
///
/// The whole trace is rejected if the continuation is a boundary edge, is
/// protected under `options`, or (with [`ClosurePolicy::OpenOnly`]) closes the
/// loop. With [`ClosurePolicy::ClosedOnly`], open results are rejected.
///
/// The loop is closed if the walk came back to an edge it already held.
pub fn trace_loop<M: MeshAccess>(
    mesh: &M,
    seed: EdgeId<M::Index>,
    options: &LoopOptions,
) -> Result<EdgeLoop<M::Index>, TraceRejected<M::Index>> {
    if !mesh.is_edge_valid(seed) {
        return Err(TraceRejected::new(TraceRejection::StaleSeed, vec![seed]));
    }
    if let Some(reason) = cutoff(mesh, seed, options) {
        return Err(TraceRejected::new(reason, vec![seed]));
    }

    let mut raw: Vec<EdgeId<M::Index>> = vec![seed];
    let mut members: HashSet<EdgeId<M::Index>> = HashSet::from([seed]);
    let mut frontier: Vec<VertexId<M::Index>> = mesh.edge_vertices(seed).to_vec();
    let mut checked: HashSet<VertexId<M::Index>> = HashSet::new();

    while let Some(v) = frontier.pop() {
        checked.insert(v);

        let incident = mesh.vertex_edges(v);
        if incident.len() != 4 {
            continue;
        }
        let Some(estart) = incident.iter().rev().copied().find(|e| members.contains(e)) else {
            continue;
        };
        let start_faces = mesh.edge_faces(estart);

        for &e in incident {
            if mesh.edge_faces(e).iter().any(|f| start_faces.contains(f)) {
                continue;
            }

            if let Some(reason) = cutoff(mesh, e, options) {
                raw.push(e);
                return Err(TraceRejected::new(reason, raw));
            }
            if options.closure == ClosurePolicy::OpenOnly && members.contains(&e) {
                return Err(TraceRejected::new(TraceRejection::Closed, raw));
            }

            raw.push(e);
            members.insert(e);
            for w in mesh.edge_vertices(e) {
                if !checked.contains(&w) && !frontier.contains(&w) {
                    frontier.push(w);
                }
            }
        }
    }

    let closed = raw.len() != members.len();
    if options.closure == ClosurePolicy::ClosedOnly && !closed {
        return Err(TraceRejected::new(TraceRejection::Open, raw));
    }

    let lp = EdgeLoop::new(raw, closed);
    if lp.len() < 2 {
        let visited = lp.edges().to_vec();
        return Err(TraceRejected::new(TraceRejection::TooShort, visited));
    }
    Ok(lp)
}

/// Edge-level stop conditions shared by the seed and every continuation.
fn cutoff<M: MeshAccess>(
    mesh: &M,
    e: EdgeId<M::Index>,
    options: &LoopOptions,
) -> Option<TraceRejection<M::Index>> {
    if mesh.is_boundary_edge(e) {
        return Some(TraceRejection::Boundary(e));
    }
    options
        .protection_of(&mesh.edge_attributes(e))
        .map(|by| TraceRejection::Protected { edge: e, by })
}
