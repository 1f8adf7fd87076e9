//! Multi-pass loop discovery and dissolve.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, info, trace, warn};

use crate::algo::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{DissolveOutcome, EdgeId, EdgeMerge, MeshAccess, MeshIndex, VertexId};

use super::{
    angles_outside_band, is_eligible, loop_is_live, plan_dissolve, trace_loop, DissolvePlan,
    EdgeLoop, LoopGraph, LoopOptions,
};

/// Summary of an [`optimize_loops`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopReport {
    /// Seed edges the run started from.
    pub seeds: usize,
    /// Eligible loops found by the initial trace.
    pub loops_found: usize,
    /// Loops dropped by the subdivision influence filter, over all passes.
    pub loops_filtered: usize,
    /// Deferred loops that became ineligible after an earlier pass.
    pub loops_invalidated: usize,
    /// Loops dissolved.
    pub loops_dissolved: usize,
    /// Loops selected in select-only mode.
    pub loops_selected: usize,
    /// Edges removed by dissolving loops. Edges merged away with a chain
    /// vertex are counted in `vertices_dissolved`.
    pub edges_removed: usize,
    /// Edges selected in select-only mode.
    pub edges_selected: usize,
    /// Chain vertices dissolved, over all passes.
    pub vertices_dissolved: usize,
    /// Dissolve regions left untouched because merging them would not give a
    /// simple polygon.
    pub regions_skipped: usize,
    /// Dissolve passes run.
    pub passes: usize,
}

/// Trace every seed and keep the eligible loops.
///
/// Seeds are consumed in ascending id order. Every edge visited by a trace,
/// accepted or not, is dropped from the remaining seeds, and a loop that would
/// reuse an edge of an earlier loop is skipped, so no edge belongs to two
/// returned loops.
pub fn discover_loops<M: MeshAccess>(
    mesh: &M,
    seeds: &[EdgeId<M::Index>],
    options: &LoopOptions,
) -> Vec<EdgeLoop<M::Index>> {
    let mut working: BTreeSet<EdgeId<M::Index>> = seeds.iter().copied().collect();
    let mut claimed: HashSet<EdgeId<M::Index>> = HashSet::new();
    let mut loops = Vec::new();

    while let Some(seed) = working.pop_first() {
        match trace_loop(mesh, seed, options) {
            Ok(lp) => {
                for e in lp.edges() {
                    working.remove(e);
                }
                if lp.edges().iter().any(|e| claimed.contains(e)) {
                    trace!(seed = seed.index(), "Loop overlaps an earlier loop");
                    continue;
                }
                if !is_eligible(mesh, &lp, options) {
                    trace!(seed = seed.index(), edges = lp.len(), "Loop not eligible");
                    continue;
                }
                claimed.extend(lp.edges().iter().copied());
                loops.push(lp);
            }
            Err(rejected) => {
                for e in &rejected.visited {
                    working.remove(e);
                }
                trace!(seed = seed.index(), reason = ?rejected.reason, "Trace rejected");
            }
        }
    }

    loops
}

/// Find and dissolve redundant edge loops.
///
/// Seeds are the selected edges, or every edge if nothing is selected. With
/// `options.dissolve` unset, the eligible loops are selected instead and the
/// mesh is otherwise left alone.
///
/// # Errors
///
/// Returns [`MeshError::InvalidParameter`] for out-of-range angles and
/// [`MeshError::NoEdges`] for a mesh without edges.
pub fn optimize_loops<M: MeshAccess>(mesh: &mut M, options: &LoopOptions) -> Result<LoopReport> {
    optimize_loops_with_progress(mesh, options, &Progress::none())
}

/// Find and dissolve redundant edge loops with progress reporting.
///
/// Progress is reported as loops dissolved out of loops found.
pub fn optimize_loops_with_progress<M: MeshAccess>(
    mesh: &mut M,
    options: &LoopOptions,
    progress: &Progress,
) -> Result<LoopReport> {
    options.validate()?;

    let mut seeds = mesh.selected_edges();
    if seeds.is_empty() {
        seeds = mesh.edges();
    }
    if seeds.is_empty() {
        return Err(MeshError::NoEdges);
    }

    info!(
        seeds = seeds.len(),
        dissolve = options.dissolve,
        min_angle = options.min_angle,
        max_angle = options.max_angle,
        "Starting edge loop optimization"
    );

    mesh.clear_selection();

    let mut report = LoopReport {
        seeds: seeds.len(),
        ..Default::default()
    };

    let mut loops = discover_loops(&*mesh, &seeds, options);
    report.loops_found = loops.len();
    let total = loops.len();
    debug!(loops = total, "Loops discovered");

    let (min_angle, max_angle) = (options.min_angle_rad(), options.max_angle_rad());
    let mut redirect: HashMap<EdgeId<M::Index>, EdgeId<M::Index>> = HashMap::new();

    // ==================== Passes ====================

    loop {
        let mut graph = LoopGraph::build(&*mesh, loops);
        if options.respect_subdivision_influence {
            let before = graph.len();
            graph = graph.retain_influencing(&*mesh);
            report.loops_filtered += before - graph.len();
        }
        if graph.is_empty() {
            break;
        }

        if !options.dissolve {
            for lp in graph.loops() {
                for &e in lp.edges() {
                    mesh.set_edge_selected(e, true);
                }
                report.edges_selected += lp.len();
            }
            report.loops_selected = graph.len();
            break;
        }

        progress.report(report.loops_dissolved, total, "Dissolving edge loops");

        let plan = plan_dissolve(&graph);
        if plan.is_empty() {
            warn!(loops = graph.len(), "No dissolvable loop in pass, stopping");
            break;
        }
        report.passes += 1;

        let pass = dissolve_pass(mesh, graph, &plan);

        debug!(
            pass = report.passes,
            dissolved = plan.dissolve.len(),
            deferred = plan.deferred.len(),
            edges_removed = pass.outcome.edges_removed,
            faces_created = pass.outcome.faces_created,
            vertices_dissolved = pass.merges.len(),
            "Dissolve pass complete"
        );

        report.loops_dissolved += plan.dissolve.len();
        report.edges_removed += pass.outcome.edges_removed;
        report.vertices_dissolved += pass.merges.len();
        report.regions_skipped += pass.outcome.regions_skipped;
        redirect.extend(pass.merges.iter().map(|m| (m.dropped, m.kept)));

        let before = pass.deferred.len();
        loops = pass
            .deferred
            .into_iter()
            .filter(|lp| {
                loop_is_live(&*mesh, lp.edges())
                    && angles_outside_band(&*mesh, lp.edges(), min_angle, max_angle)
            })
            .collect();
        report.loops_invalidated += before - loops.len();
    }

    // ==================== Cleanup ====================

    if options.dissolve && options.select_result {
        for &seed in &seeds {
            let e = resolve(&redirect, seed);
            if mesh.is_edge_valid(e) {
                mesh.set_edge_selected(e, true);
            }
        }
    }

    progress.report(total, total, "Edge loop optimization complete");

    info!(
        passes = report.passes,
        loops_found = report.loops_found,
        loops_dissolved = report.loops_dissolved,
        loops_selected = report.loops_selected,
        edges_removed = report.edges_removed,
        vertices_dissolved = report.vertices_dissolved,
        "Edge loop optimization complete"
    );

    Ok(report)
}

/// Result of [`dissolve_pass`].
struct PassOutcome<I: MeshIndex> {
    outcome: DissolveOutcome,
    merges: Vec<EdgeMerge<I>>,
    /// Deferred loops, rewritten onto the edges that survived the pass.
    deferred: Vec<EdgeLoop<I>>,
}

/// Dissolve the planned loops of `graph`, then the chain vertices they leave.
///
/// Chain vertices go in the same pass so the next graph sees quads again.
/// Deferred loops running through a collapsed vertex are carried over to the
/// edge that absorbed their own.
fn dissolve_pass<M: MeshAccess>(
    mesh: &mut M,
    graph: LoopGraph<M::Index>,
    plan: &DissolvePlan,
) -> PassOutcome<M::Index> {
    let edges: Vec<EdgeId<M::Index>> = plan
        .dissolve
        .iter()
        .flat_map(|&i| graph.loop_at(i).edges().iter().copied())
        .collect();
    let mut touched: Vec<VertexId<M::Index>> =
        edges.iter().flat_map(|&e| mesh.edge_vertices(e)).collect();
    touched.sort_unstable();
    touched.dedup();

    let outcome = mesh.dissolve_edges(&edges);
    for &e in &edges {
        if mesh.is_edge_valid(e) {
            mesh.set_edge_selected(e, false);
        }
    }

    let merges = mesh.dissolve_vertices(&touched);
    let redirect: HashMap<EdgeId<M::Index>, EdgeId<M::Index>> =
        merges.iter().map(|m| (m.dropped, m.kept)).collect();

    let mut claimed: HashSet<EdgeId<M::Index>> = HashSet::new();
    let mut deferred = Vec::with_capacity(plan.deferred.len());
    for lp in graph.take(&plan.deferred) {
        let closed = lp.is_closed();
        let lp = EdgeLoop::new(lp.edges().iter().map(|&e| resolve(&redirect, e)), closed);
        if lp.edges().iter().any(|e| claimed.contains(e)) {
            trace!(edges = lp.len(), "Deferred loop merged into another");
            continue;
        }
        claimed.extend(lp.edges().iter().copied());
        deferred.push(lp);
    }

    PassOutcome {
        outcome,
        merges,
        deferred,
    }
}

/// Follow merges from `e` to the edge that absorbed it.
fn resolve<I: MeshIndex>(
    redirect: &HashMap<EdgeId<I>, EdgeId<I>>,
    mut e: EdgeId<I>,
) -> EdgeId<I> {
    while let Some(&next) = redirect.get(&e) {
        e = next;
    }
    e
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use nalgebra::Point3;

    use super::*;
    use crate::algo::loops::ClosurePolicy;
    use crate::mesh::{build_from_quads, PolyMesh};

    fn create_grid_mesh(n: usize) -> PolyMesh {
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                faces.push([v00, v00 + 1, v00 + n + 2, v00 + n + 1]);
            }
        }
        build_from_quads(&vertices, &faces).unwrap()
    }

    /// Flat annulus: `segments` spokes, `rings` quads from the hole outwards.
    fn create_annulus_mesh(segments: usize, rings: usize) -> PolyMesh {
        let mut vertices = Vec::new();
        for j in 0..=rings {
            let r = 1.0 + j as f64;
            for i in 0..segments {
                let theta = i as f64 / segments as f64 * std::f64::consts::TAU;
                vertices.push(Point3::new(r * theta.cos(), r * theta.sin(), 0.0));
            }
        }
        let mut faces = Vec::new();
        for j in 0..rings {
            for i in 0..segments {
                let a = j * segments + i;
                let b = j * segments + (i + 1) % segments;
                faces.push([a, b, b + segments, a + segments]);
            }
        }
        build_from_quads(&vertices, &faces).unwrap()
    }

    fn flat() -> LoopOptions {
        LoopOptions::default().with_angle_range(1.0, 180.0)
    }

    #[test]
    fn test_grid_collapses_to_single_quad() {
        let mut mesh = create_grid_mesh(4);

        let report = optimize_loops(&mut mesh, &flat()).unwrap();

        assert_eq!(report.loops_found, 6);
        assert_eq!(report.loops_dissolved, 6);
        assert_eq!(report.passes, 2);
        // Twelve chain vertices after the first pass, four after the second
        assert_eq!(report.vertices_dissolved, 16);
        assert_eq!(report.edges_removed, 20);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_odd_cycle_of_spokes_relinks_after_pass() {
        // Five spokes around the hole form an odd cycle of parallel loops
        let mut mesh = create_annulus_mesh(5, 3);
        let loops = discover_loops(&mesh, &mesh.edges(), &flat());
        assert_eq!(loops.len(), 7);

        let graph = LoopGraph::build(&mesh, loops);
        let plan = plan_dissolve(&graph);
        assert_eq!(plan.dissolve.len(), 3);
        let pass = dissolve_pass(&mut mesh, graph, &plan);

        // One ring and two spokes went; the chain vertices they left are gone
        // too, so every face is a quad again.
        assert_eq!(pass.merges.len(), 9);
        assert_eq!(mesh.num_faces(), 6);
        for f in mesh.face_ids() {
            assert_eq!(mesh.face_vertex_count(f), 4);
        }
        for lp in &pass.deferred {
            assert!(loop_is_live(&mesh, lp.edges()));
        }

        // The three surviving spokes still close a cycle, so the next pass
        // cannot dissolve two of them together.
        let graph = LoopGraph::build(&mesh, pass.deferred);
        assert_eq!(graph.len(), 4);
        let spokes: Vec<usize> = (0..graph.len())
            .filter(|&i| !graph.loop_at(i).is_closed())
            .collect();
        assert_eq!(spokes.len(), 3);
        for &i in &spokes {
            assert_eq!(graph.neighbours(i).len(), 2);
        }
        let plan = plan_dissolve(&graph);
        let dissolved_spokes = plan.dissolve.iter().filter(|i| spokes.contains(i)).count();
        assert_eq!(dissolved_spokes, 1);
    }

    #[test]
    fn test_deferred_loops_follow_merged_edges() {
        let mut mesh = create_grid_mesh(4);
        let loops = discover_loops(&mesh, &mesh.edges(), &flat());
        let graph = LoopGraph::build(&mesh, loops);
        let plan = plan_dissolve(&graph);

        let pass = dissolve_pass(&mut mesh, graph, &plan);

        // The middle row and column each lost two chain vertices
        assert_eq!(pass.merges.len(), 12);
        assert_eq!(pass.deferred.len(), 2);
        for lp in &pass.deferred {
            assert_eq!(lp.len(), 2);
            assert!(!lp.is_closed());
            for &e in lp.edges() {
                assert!(mesh.is_edge_valid(e));
                assert!(!mesh.is_boundary_edge(e));
            }
        }
    }

    #[test]
    fn test_select_only_leaves_mesh_unchanged() {
        let mut mesh = create_grid_mesh(4);
        let options = LoopOptions::select_only().with_angle_range(1.0, 180.0);

        let report = optimize_loops(&mut mesh, &options).unwrap();

        assert_eq!(report.loops_selected, 6);
        assert_eq!(report.edges_selected, 24);
        assert_eq!(report.loops_dissolved, 0);
        assert_eq!(mesh.num_faces(), 16);
        assert_eq!(mesh.selected_edges().len(), 24);
        assert!(mesh.selected_edges().iter().all(|&e| !mesh.is_boundary_edge(e)));
    }

    #[test]
    fn test_selection_limits_seeds() {
        let mut mesh = create_grid_mesh(4);
        // Select one edge of the middle row
        let seed = mesh
            .find_edge(VertexId::new(2 * 5 + 1), VertexId::new(2 * 5 + 2))
            .unwrap();
        mesh.set_selected(seed, true);

        let report = optimize_loops(&mut mesh, &flat()).unwrap();

        assert_eq!(report.seeds, 1);
        assert_eq!(report.loops_dissolved, 1);
        assert_eq!(report.edges_removed, 4);
        assert_eq!(mesh.num_faces(), 12);
        assert!(mesh.selected_edges().is_empty());
    }

    #[test]
    fn test_select_result_reselects_surviving_seeds() {
        let mut mesh = create_grid_mesh(4);
        let options = flat().with_select_result(true);

        optimize_loops(&mut mesh, &options).unwrap();

        // Every surviving edge was a seed
        assert_eq!(mesh.selected_edges().len(), mesh.num_edges());
    }

    #[test]
    fn test_influence_filter_keeps_border_loops() {
        let mut mesh = create_grid_mesh(4);
        let options = flat().with_subdivision_influence(true);

        let report = optimize_loops(&mut mesh, &options).unwrap();

        // Only the middle row and column have two neighbours
        assert_eq!(report.loops_filtered, 4);
        assert_eq!(report.loops_dissolved, 2);
        assert_eq!(report.passes, 1);
        // Four corner quads, four merged pairs and the merged centre block
        assert_eq!(mesh.num_faces(), 9);
    }

    #[test]
    fn test_closed_only_on_open_grid() {
        let mut mesh = create_grid_mesh(3);
        let options = flat().with_closure(ClosurePolicy::ClosedOnly);

        let report = optimize_loops(&mut mesh, &options).unwrap();

        assert_eq!(report.loops_found, 0);
        assert_eq!(mesh.num_faces(), 9);
    }

    #[test]
    fn test_empty_mesh_is_an_error() {
        let mut mesh: PolyMesh = PolyMesh::new();
        assert!(matches!(
            optimize_loops(&mut mesh, &flat()),
            Err(MeshError::NoEdges)
        ));
    }

    #[test]
    fn test_invalid_angles_leave_selection_alone() {
        let mut mesh = create_grid_mesh(2);
        let e = mesh.edge_ids().next().unwrap();
        mesh.set_selected(e, true);

        let options = LoopOptions::default().with_angle_range(0.0, 200.0);
        assert!(optimize_loops(&mut mesh, &options).is_err());
        assert!(mesh.edge(e).selected);
    }

    #[test]
    fn test_progress_reaches_total() {
        let mut mesh = create_grid_mesh(4);
        let calls = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(usize::MAX));
        let (c, l) = (calls.clone(), last.clone());
        let progress = Progress::new(move |current, total, _| {
            c.fetch_add(1, Ordering::Relaxed);
            if current == total {
                l.store(current, Ordering::Relaxed);
            }
        });

        optimize_loops_with_progress(&mut mesh, &flat(), &progress).unwrap();

        assert!(calls.load(Ordering::Relaxed) >= 3);
        assert_eq!(last.load(Ordering::Relaxed), 6);
    }
}
