//! # Loopcull
//!
//! Edge loop discovery and removal for quad-dominant polygon meshes.
//!
//! Loopcull finds edge loops that carry no shape (flat or otherwise within a
//! chosen dihedral-angle band) and dissolves them, merging the quads on either
//! side. Loops are removed over several passes so that no two parallel
//! neighbouring loops disappear at once, which keeps the result made of quads.
//!
//! ## Features
//!
//! - **Polygon mesh with first-class edges**: seams, bevel weights, creases and
//!   selection live on edges; ids stay stable across dissolves
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Pluggable mesh access**: the loop algorithms run against the
//!   [`MeshAccess`](mesh::MeshAccess) trait, not a concrete mesh type
//! - **Protection rules**: keep loops containing seams, bevel weights or creases
//! - **Subdivision-aware**: optionally keep loops bordering the cleaned region
//!
//! ## Quick Start
//!
//! ```
//! use loopcull::prelude::*;
//! use nalgebra::Point3;
//!
//! // Flat 2x2 grid of quads
//! let mut vertices = Vec::new();
//! for j in 0..3 {
//!     for i in 0..3 {
//!         vertices.push(Point3::new(i as f64, j as f64, 0.0));
//!     }
//! }
//! let faces = vec![[0, 1, 4, 3], [1, 2, 5, 4], [3, 4, 7, 6], [4, 5, 8, 7]];
//! let mut mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
//!
//! // Dissolve loops flatter than 1 degree
//! let options = LoopOptions::default().with_angle_range(1.0, 180.0);
//! let report = optimize_loops(&mut mesh, &options).unwrap();
//!
//! assert_eq!(report.loops_dissolved, 2);
//! assert_eq!(mesh.num_faces(), 1);
//! ```
//!
//! ## Selecting Instead of Dissolving
//!
//! ```
//! use loopcull::prelude::*;
//! use nalgebra::Point3;
//!
//! # let mut vertices = Vec::new();
//! # for j in 0..3 {
//! #     for i in 0..3 {
//! #         vertices.push(Point3::new(i as f64, j as f64, 0.0));
//! #     }
//! # }
//! # let faces = vec![[0, 1, 4, 3], [1, 2, 5, 4], [3, 4, 7, 6], [4, 5, 8, 7]];
//! # let mut mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
//! let options = LoopOptions::select_only().with_angle_range(1.0, 180.0);
//! optimize_loops(&mut mesh, &options).unwrap();
//!
//! assert_eq!(mesh.num_faces(), 4);
//! assert_eq!(mesh.selected_edges().len(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use loopcull::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::loops::{
        optimize_loops, ClosurePolicy, EdgeLoop, LoopOptions, LoopReport,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, to_face_vertex, Edge, EdgeId, Face, FaceId,
        MeshAccess, MeshIndex, PolyMesh, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
