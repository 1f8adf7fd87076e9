//! Mesh processing algorithms.
//!
//! - **Loops**: edge loop tracing, loop adjacency, and multi-pass loop dissolve
//!   for quad-dominant meshes
//!
//! Long-running operations come in pairs, `foo` and `foo_with_progress`, the
//! latter taking a [`Progress`] callback.

pub mod loops;
pub mod progress;

pub use progress::Progress;
