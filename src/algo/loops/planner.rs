//! Choosing which loops to dissolve in a pass.
//!
//! Dissolving two neighbouring loops in the same pass would remove both sides
//! of the quads between them. The planner picks a set of loops with no two
//! neighbours in it, deferring the rest to a later pass. The set is maximal:
//! every deferred loop has at least one neighbour being dissolved.
//!
//! Chains are walked breadth-first starting from their ends, so a chain of
//! parallel loops is split as `dissolve, defer, dissolve, ...` from one end.
//! This dissolves roughly half of every chain per pass.

use std::collections::VecDeque;

use crate::mesh::MeshIndex;

use super::LoopGraph;

/// Split of one pass's loops, as positions in the [`LoopGraph`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DissolvePlan {
    /// Loops to dissolve now, pairwise non-adjacent.
    pub dissolve: Vec<usize>,
    /// Loops to reconsider after this pass.
    pub deferred: Vec<usize>,
}

impl DissolvePlan {
    /// Check whether the plan dissolves nothing.
    pub fn is_empty(&self) -> bool {
        self.dissolve.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    Dissolve,
    Defer,
}

/// Plan one dissolve pass over `graph`.
///
/// Every loop ends up in exactly one of the two lists. Isolated loops are
/// always dissolved, so a non-empty graph always yields a non-empty plan.
pub fn plan_dissolve<I: MeshIndex>(graph: &LoopGraph<I>) -> DissolvePlan {
    let n = graph.len();
    let mut claims: Vec<Option<Claim>> = vec![None; n];

    // Isolated loops, then chains grown from their ends
    for i in 0..n {
        if claims[i].is_some() {
            continue;
        }
        let neighbours = graph.neighbours(i);
        if neighbours.is_empty() {
            claims[i] = Some(Claim::Dissolve);
        } else if neighbours.len() == 1 {
            if let Some(&only) = neighbours.first() {
                if claims[only].is_none() {
                    claim_from(graph, &mut claims, i);
                }
            }
        }
    }

    // Whatever is left sits on cycles
    for i in 0..n {
        if claims[i].is_none() {
            claim_from(graph, &mut claims, i);
        }
    }

    let mut plan = DissolvePlan::default();
    for (i, claim) in claims.into_iter().enumerate() {
        match claim {
            Some(Claim::Dissolve) => plan.dissolve.push(i),
            Some(Claim::Defer) | None => plan.deferred.push(i),
        }
    }
    plan
}

/// Breadth-first claim of every unclaimed loop reachable from `start`.
fn claim_from<I: MeshIndex>(graph: &LoopGraph<I>, claims: &mut [Option<Claim>], start: usize) {
    let mut queue = VecDeque::new();
    claims[start] = Some(classify(graph, claims, start));
    queue.push_back(start);

    while let Some(i) = queue.pop_front() {
        for &j in graph.neighbours(i) {
            if claims[j].is_none() {
                claims[j] = Some(classify(graph, claims, j));
                queue.push_back(j);
            }
        }
    }
}

fn classify<I: MeshIndex>(graph: &LoopGraph<I>, claims: &[Option<Claim>], i: usize) -> Claim {
    let blocked = graph
        .neighbours(i)
        .iter()
        .any(|&j| claims[j] == Some(Claim::Dissolve));
    if blocked {
        Claim::Defer
    } else {
        Claim::Dissolve
    }
}
