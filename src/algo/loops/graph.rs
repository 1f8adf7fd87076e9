//! Adjacency between edge loops.

use std::collections::{BTreeSet, HashMap};

use crate::mesh::{EdgeId, MeshAccess, MeshIndex};

use super::EdgeLoop;

/// Loops of one pass, linked where they run in parallel across a quad.
///
/// Two loops are neighbours when a quad bordering one loop's representative
/// edge has its opposite edge in the other loop. The relation is symmetric and
/// irreflexive. Loops are addressed by their position in [`loops`](Self::loops).
#[derive(Debug, Clone, Default)]
pub struct LoopGraph<I: MeshIndex = u32> {
    loops: Vec<EdgeLoop<I>>,
    neighbours: Vec<BTreeSet<usize>>,
}

impl<I: MeshIndex> LoopGraph<I> {
    /// Link every pair of neighbouring loops.
    pub fn build<M: MeshAccess<Index = I>>(mesh: &M, loops: Vec<EdgeLoop<I>>) -> Self {
        let mut owner: HashMap<EdgeId<I>, usize> = HashMap::new();
        for (i, lp) in loops.iter().enumerate() {
            for &e in lp.edges() {
                owner.entry(e).or_insert(i);
            }
        }

        let mut neighbours = vec![BTreeSet::new(); loops.len()];
        for (i, lp) in loops.iter().enumerate() {
            let Some(rep) = lp.first() else {
                continue;
            };
            if !mesh.is_edge_valid(rep) {
                continue;
            }
            let [a, b] = mesh.edge_vertices(rep);

            for &f in mesh.edge_faces(rep) {
                if mesh.face_vertex_count(f) != 4 {
                    continue;
                }
                for &opposite in mesh.face_edges(f) {
                    let [c, d] = mesh.edge_vertices(opposite);
                    if c == a || c == b || d == a || d == b {
                        continue;
                    }
                    if let Some(&j) = owner.get(&opposite) {
                        if j != i {
                            neighbours[i].insert(j);
                            neighbours[j].insert(i);
                        }
                    }
                }
            }
        }

        Self { loops, neighbours }
    }

    /// Number of loops.
    #[inline]
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    /// Check whether the graph holds no loops.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// All loops, in insertion order.
    #[inline]
    pub fn loops(&self) -> &[EdgeLoop<I>] {
        &self.loops
    }

    /// Loop at position `i`.
    #[inline]
    pub fn loop_at(&self, i: usize) -> &EdgeLoop<I> {
        &self.loops[i]
    }

    /// Neighbours of loop `i`.
    #[inline]
    pub fn neighbours(&self, i: usize) -> &BTreeSet<usize> {
        &self.neighbours[i]
    }

    /// Check whether loops `i` and `j` are neighbours.
    pub fn are_neighbours(&self, i: usize, j: usize) -> bool {
        self.neighbours[i].contains(&j)
    }

    /// Drop loops with fewer than two neighbours and relink the rest.
    pub fn retain_influencing<M: MeshAccess<Index = I>>(self, mesh: &M) -> Self {
        let kept = self
            .loops
            .into_iter()
            .zip(self.neighbours)
            .filter(|(_, n)| n.len() >= 2)
            .map(|(lp, _)| lp)
            .collect();
        Self::build(mesh, kept)
    }

    /// Take the loops at the given positions, in the order given.
    pub fn take(self, indices: &[usize]) -> Vec<EdgeLoop<I>> {
        let mut slots: Vec<Option<EdgeLoop<I>>> = self.loops.into_iter().map(Some).collect();
        indices
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect()
    }

    /// Consume the graph, returning its loops.
    pub fn into_loops(self) -> Vec<EdgeLoop<I>> {
        self.loops
    }
}
