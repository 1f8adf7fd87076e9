//! Core mesh data structures.
//!
//! This module provides the polygon mesh representation used by the loop
//! algorithms, and the [`MeshAccess`] trait through which those algorithms read
//! and edit a mesh.
//!
//! # Overview
//!
//! The primary type is [`PolyMesh`], an arena of vertices, edges and polygonal
//! faces. Edges are first-class so they can carry seam, bevel and crease
//! attributes and a selection flag. Removing an element marks it dead instead of
//! renumbering, which keeps ids stable across edits.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`EdgeId`] - Identifies an edge
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size. An id
//! never goes stale silently: once its element is dissolved the mesh reports
//! it as invalid, and the slot is never handed out again.
//!
//! # Construction
//!
//! ```
//! use loopcull::mesh::{build_from_quads, PolyMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2, 3]];
//!
//! let mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_edges(), 4);
//! ```

mod access;
mod builder;
mod dissolve;
mod index;
mod polymesh;

pub use access::{EdgeAttributes, MeshAccess};
pub use builder::{build_from_polygons, build_from_quads, to_face_vertex};
pub use dissolve::{DissolveOutcome, EdgeMerge};
pub use index::{EdgeId, FaceId, MeshIndex, VertexId};
pub use polymesh::{Edge, Face, PolyMesh, Vertex};
