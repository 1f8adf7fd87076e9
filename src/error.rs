//! Error types for loopcull.
//!
//! This module defines the errors surfaced to callers. Conditions that the loop
//! algorithms recover from on their own (a trace hitting a boundary or a
//! protected edge, a deferred loop going stale after a dissolve) are not errors;
//! see [`crate::algo::loops::TraceRejection`].

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// The mesh has no edges to seed loop discovery from.
    #[error("mesh has no edges")]
    NoEdges,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three vertices or repeats a vertex.
    #[error("face {face} is degenerate (fewer than 3 or duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// An edge would have more than two incident faces.
    #[error("edge ({v0}, {v1}) has more than two incident faces")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshError::NoEdges;
        assert_eq!(format!("{err}"), "mesh has no edges");

        let err = MeshError::invalid_param("min_angle", 200.0, "must be within [-0.0001, 180]");
        let msg = format!("{err}");
        assert!(msg.contains("min_angle"));
        assert!(msg.contains("200"));
    }
}
