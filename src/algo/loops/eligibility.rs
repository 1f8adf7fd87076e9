//! Angle and shape checks deciding whether a traced loop may be removed.

use crate::mesh::{EdgeId, MeshAccess};

use super::{EdgeLoop, LoopOptions};

/// Check that every edge still exists.
pub fn loop_is_live<M: MeshAccess>(mesh: &M, edges: &[EdgeId<M::Index>]) -> bool {
    edges.iter().all(|&e| mesh.is_edge_valid(e))
}

/// Check that no edge's dihedral angle falls strictly inside `(min, max)`.
///
/// Angles are in radians. Edges whose angle is undefined (not bordered by
/// exactly two faces) fail the check.
pub fn angles_outside_band<M: MeshAccess>(
    mesh: &M,
    edges: &[EdgeId<M::Index>],
    min: f64,
    max: f64,
) -> bool {
    edges.iter().all(|&e| match mesh.edge_face_angle(e) {
        Some(angle) => !(angle > min && angle < max),
        None => false,
    })
}

/// Full eligibility check for a freshly traced loop.
pub fn is_eligible<M: MeshAccess>(mesh: &M, lp: &EdgeLoop<M::Index>, options: &LoopOptions) -> bool {
    lp.len() >= 2
        && options.closure.accepts(lp.is_closed())
        && loop_is_live(mesh, lp.edges())
        && angles_outside_band(mesh, lp.edges(), options.min_angle_rad(), options.max_angle_rad())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use nalgebra::Point3;

    use super::*;
    use crate::algo::loops::{trace_loop, ClosurePolicy};
    use crate::mesh::{
        build_from_quads, DissolveOutcome, EdgeAttributes, EdgeMerge, FaceId, PolyMesh, VertexId,
    };

    /// A mesh whose dihedral angles are set by hand, edge by edge.
    struct FixedAngles {
        mesh: PolyMesh,
        angles: HashMap<EdgeId, Option<f64>>,
    }

    impl FixedAngles {
        fn new(mesh: PolyMesh, edges: &[EdgeId], angle: f64) -> Self {
            let angles = edges.iter().map(|&e| (e, Some(angle))).collect();
            Self { mesh, angles }
        }

        fn set(&mut self, e: EdgeId, angle: Option<f64>) {
            self.angles.insert(e, angle);
        }
    }

    impl MeshAccess for FixedAngles {
        type Index = u32;

        fn edges(&self) -> Vec<EdgeId> {
            MeshAccess::edges(&self.mesh)
        }
        fn is_edge_valid(&self, e: EdgeId) -> bool {
            self.mesh.is_edge_valid(e)
        }
        fn is_vertex_valid(&self, v: VertexId) -> bool {
            self.mesh.is_vertex_valid(v)
        }
        fn edge_vertices(&self, e: EdgeId) -> [VertexId; 2] {
            MeshAccess::edge_vertices(&self.mesh, e)
        }
        fn edge_faces(&self, e: EdgeId) -> &[FaceId] {
            MeshAccess::edge_faces(&self.mesh, e)
        }
        fn vertex_edges(&self, v: VertexId) -> &[EdgeId] {
            MeshAccess::vertex_edges(&self.mesh, v)
        }
        fn face_edges(&self, f: FaceId) -> &[EdgeId] {
            MeshAccess::face_edges(&self.mesh, f)
        }
        fn face_vertices(&self, f: FaceId) -> &[VertexId] {
            MeshAccess::face_vertices(&self.mesh, f)
        }
        fn edge_face_angle(&self, e: EdgeId) -> Option<f64> {
            self.angles.get(&e).copied().flatten()
        }
        fn edge_attributes(&self, e: EdgeId) -> EdgeAttributes {
            MeshAccess::edge_attributes(&self.mesh, e)
        }
        fn is_edge_selected(&self, e: EdgeId) -> bool {
            MeshAccess::is_edge_selected(&self.mesh, e)
        }
        fn set_edge_selected(&mut self, e: EdgeId, selected: bool) {
            MeshAccess::set_edge_selected(&mut self.mesh, e, selected);
        }
        fn dissolve_edges(&mut self, edges: &[EdgeId]) -> DissolveOutcome {
            MeshAccess::dissolve_edges(&mut self.mesh, edges)
        }
        fn dissolve_vertices(&mut self, vertices: &[VertexId]) -> Vec<EdgeMerge> {
            MeshAccess::dissolve_vertices(&mut self.mesh, vertices)
        }
    }

    /// Three-by-three grid whose middle column is lifted into a ridge.
    fn create_ridge_mesh(height: f64) -> PolyMesh {
        let mut vertices = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                let z = if i == 1 || i == 2 { height } else { 0.0 };
                vertices.push(Point3::new(i as f64, j as f64, z));
            }
        }
        let mut faces = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                let v00 = j * 4 + i;
                faces.push([v00, v00 + 1, v00 + 5, v00 + 4]);
            }
        }
        build_from_quads(&vertices, &faces).unwrap()
    }

    fn vertical_loop(mesh: &PolyMesh, column: usize) -> EdgeLoop {
        let seed = mesh
            .find_edge(VertexId::new(4 + column), VertexId::new(8 + column))
            .unwrap();
        trace_loop(mesh, seed, &LoopOptions::default()).unwrap()
    }

    #[test]
    fn test_flat_loop_outside_band() {
        let mesh = create_ridge_mesh(0.0);
        let lp = vertical_loop(&mesh, 1);

        let options = LoopOptions::default().with_angle_range(1.0, 180.0);
        assert!(is_eligible(&mesh, &lp, &options));
    }

    #[test]
    fn test_default_band_keeps_flat_loops() {
        // Zero lies strictly inside (-0.0001, 180)
        let mesh = create_ridge_mesh(0.0);
        let lp = vertical_loop(&mesh, 1);
        assert!(!is_eligible(&mesh, &lp, &LoopOptions::default()));
    }

    #[test]
    fn test_folded_loop_inside_band() {
        // 45 degree fold along columns 1 and 2
        let mesh = create_ridge_mesh(1.0);
        let lp = vertical_loop(&mesh, 1);

        let angle = mesh.edge_face_angle(lp.edges()[0]).unwrap();
        assert!((angle - std::f64::consts::FRAC_PI_4).abs() < 1e-9);

        let options = LoopOptions::default().with_angle_range(1.0, 180.0);
        assert!(!is_eligible(&mesh, &lp, &options));

        let options = LoopOptions::default().with_angle_range(1.0, 40.0);
        assert!(is_eligible(&mesh, &lp, &options));
    }

    #[test]
    fn test_closure_policy_filters_open_loop() {
        let mesh = create_ridge_mesh(0.0);
        let lp = vertical_loop(&mesh, 1);
        let options = LoopOptions::default()
            .with_angle_range(1.0, 180.0)
            .with_closure(ClosurePolicy::ClosedOnly);
        assert!(!is_eligible(&mesh, &lp, &options));
    }

    #[test]
    fn test_dead_edge_fails_liveness() {
        let mut mesh = create_ridge_mesh(0.0);
        let lp = vertical_loop(&mesh, 1);
        assert!(loop_is_live(&mesh, lp.edges()));

        mesh.dissolve_edges(&lp.edges()[..1]);
        assert!(!loop_is_live(&mesh, lp.edges()));
    }

    #[test]
    fn test_angle_on_lower_bound_is_outside_band() {
        let mesh = create_ridge_mesh(0.0);
        let lp = vertical_loop(&mesh, 1);
        let options = LoopOptions::default().with_angle_range(30.0, 180.0);
        let min = options.min_angle_rad();

        let mut stub = FixedAngles::new(mesh, lp.edges(), min);
        assert!(is_eligible(&stub, &lp, &options));

        // One edge a single ulp above the bound rejects the whole loop
        stub.set(lp.edges()[1], Some(f64::from_bits(min.to_bits() + 1)));
        assert!(!is_eligible(&stub, &lp, &options));
    }

    #[test]
    fn test_angle_on_upper_bound_is_outside_band() {
        let mesh = create_ridge_mesh(0.0);
        let lp = vertical_loop(&mesh, 1);
        let options = LoopOptions::default().with_angle_range(1.0, 30.0);
        let max = options.max_angle_rad();

        let mut stub = FixedAngles::new(mesh, lp.edges(), max);
        assert!(is_eligible(&stub, &lp, &options));

        stub.set(lp.edges()[2], Some(f64::from_bits(max.to_bits() - 1)));
        assert!(!is_eligible(&stub, &lp, &options));
    }

    #[test]
    fn test_undefined_angle_rejects_loop() {
        let mesh = create_ridge_mesh(0.0);
        let lp = vertical_loop(&mesh, 1);
        let options = LoopOptions::default().with_angle_range(1.0, 180.0);

        let mut stub = FixedAngles::new(mesh, lp.edges(), 0.0);
        assert!(is_eligible(&stub, &lp, &options));

        stub.set(lp.edges()[0], None);
        assert!(!is_eligible(&stub, &lp, &options));
    }
}
