//! Edge loop discovery and dissolve.
//!
//! An *edge loop* is a chain of edges that crosses successive quads by always
//! leaving through the edge opposite the one it entered by. On a clean quad
//! mesh such loops are the natural unit of simplification: removing a whole
//! loop merges two rows of quads into one without leaving triangles or
//! dangling vertices behind.
//!
//! # Pipeline
//!
//! 1. **Trace** ([`trace_loop`]): grow a loop from a seed edge through
//!    valence-4 vertices. Boundary edges and protected edges abort the trace.
//! 2. **Filter** ([`is_eligible`]): reject loops with any edge whose dihedral
//!    angle falls strictly inside the configured band, or whose shape does not
//!    match the [`ClosurePolicy`].
//! 3. **Graph** ([`LoopGraph`]): link loops that run in parallel across a
//!    shared quad. Optionally drop loops with fewer than two neighbours
//!    ([`LoopGraph::retain_influencing`]), which are the loops that hold the
//!    shape of a subdivision surface at the border of the cleaned region.
//! 4. **Plan** ([`plan_dissolve`]): choose a set of loops with no two
//!    neighbours among them. Dissolving neighbours together would collapse the
//!    quad between them.
//! 5. **Dissolve** ([`optimize_loops`]): dissolve the planned loops and the
//!    chain vertices they leave behind, carry the deferred loops over to the
//!    merged edges, re-check them against the edited mesh and repeat until
//!    nothing is left.
//!
//! # Example
//!
//! ```
//! use loopcull::prelude::*;
//! use loopcull::algo::loops::{optimize_loops, LoopOptions};
//! use nalgebra::Point3;
//!
//! // Flat 3x3 grid of quads
//! let n = 3;
//! let mut vertices = Vec::new();
//! for j in 0..=n {
//!     for i in 0..=n {
//!         vertices.push(Point3::new(i as f64, j as f64, 0.0));
//!     }
//! }
//! let mut faces = Vec::new();
//! for j in 0..n {
//!     for i in 0..n {
//!         let v00 = j * (n + 1) + i;
//!         faces.push([v00, v00 + 1, v00 + n + 2, v00 + n + 1]);
//!     }
//! }
//! let mut mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
//!
//! // Remove every loop flatter than 1 degree
//! let options = LoopOptions::default().with_angle_range(1.0, 180.0);
//! let report = optimize_loops(&mut mesh, &options).unwrap();
//!
//! assert_eq!(report.loops_dissolved, 4);
//! assert_eq!(mesh.num_faces(), 1);
//! assert_eq!(mesh.num_vertices(), 4);
//! ```

mod eligibility;
mod graph;
mod optimize;
mod planner;
mod trace;

pub use eligibility::{angles_outside_band, is_eligible, loop_is_live};
pub use graph::LoopGraph;
pub use optimize::{discover_loops, optimize_loops, optimize_loops_with_progress, LoopReport};
pub use planner::{plan_dissolve, DissolvePlan};
pub use trace::{trace_loop, EdgeLoop, TraceRejected, TraceRejection};

use crate::error::{MeshError, Result};
use crate::mesh::EdgeAttributes;

/// Lowest accepted `min_angle`, in degrees. Slightly negative so that a band
/// starting here still admits exactly flat edges as being outside it.
pub const MIN_ANGLE_LIMIT: f64 = -0.0001;

/// Lowest accepted `max_angle`, in degrees.
pub const MAX_ANGLE_FLOOR: f64 = 0.0001;

/// Highest accepted angle, in degrees.
pub const ANGLE_CEILING: f64 = 180.0;

/// Which loop shapes may be processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClosurePolicy {
    /// Open and closed loops alike.
    #[default]
    Any,
    /// Only closed (cyclic) loops; open loops are kept.
    ClosedOnly,
    /// Only open loops; closed loops are kept.
    OpenOnly,
}

impl ClosurePolicy {
    /// Check whether a loop of the given shape passes this policy.
    #[inline]
    pub fn accepts(self, closed: bool) -> bool {
        match self {
            ClosurePolicy::Any => true,
            ClosurePolicy::ClosedOnly => closed,
            ClosurePolicy::OpenOnly => !closed,
        }
    }
}

/// The attribute that protects an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtectedBy {
    /// UV seam.
    Seam,
    /// Non-zero bevel weight.
    BevelWeight,
    /// Non-zero crease weight.
    Crease,
}

/// Options for edge loop optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOptions {
    /// Dissolve eligible loops. If false, eligible loops are only selected.
    pub dissolve: bool,

    /// After dissolving, re-select the seed edges that survived, so the same
    /// operation can be repeated on the result.
    pub select_result: bool,

    /// Lower bound of the rejection band, in degrees.
    ///
    /// A loop is eligible only if every edge's dihedral angle is `<= min_angle`
    /// or `>= max_angle`.
    pub min_angle: f64,

    /// Upper bound of the rejection band, in degrees.
    pub max_angle: f64,

    /// Keep loops with fewer than two neighbouring loops. These border the
    /// cleaned region and hold the shape of a subdivision surface.
    pub respect_subdivision_influence: bool,

    /// Which loop shapes may be processed.
    pub closure: ClosurePolicy,

    /// Keep loops containing a UV seam.
    pub keep_seams: bool,

    /// Keep loops containing a bevel-weighted edge.
    pub keep_bevel_weighted: bool,

    /// Keep loops containing a creased edge.
    pub keep_creased: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            dissolve: true,
            select_result: false,
            min_angle: MIN_ANGLE_LIMIT,
            max_angle: ANGLE_CEILING,
            respect_subdivision_influence: false,
            closure: ClosurePolicy::Any,
            keep_seams: false,
            keep_bevel_weighted: false,
            keep_creased: false,
        }
    }
}

impl LoopOptions {
    /// Options that only select eligible loops, leaving the mesh unchanged.
    pub fn select_only() -> Self {
        Self {
            dissolve: false,
            ..Default::default()
        }
    }

    /// Set the rejection band, in degrees.
    #[must_use]
    pub fn with_angle_range(mut self, min_angle: f64, max_angle: f64) -> Self {
        self.min_angle = min_angle;
        self.max_angle = max_angle;
        self
    }

    /// Set the loop shape policy.
    #[must_use]
    pub fn with_closure(mut self, closure: ClosurePolicy) -> Self {
        self.closure = closure;
        self
    }

    /// Set whether to keep loops bordering the cleaned region.
    #[must_use]
    pub fn with_subdivision_influence(mut self, respect: bool) -> Self {
        self.respect_subdivision_influence = respect;
        self
    }

    /// Set whether to re-select surviving seed edges after dissolving.
    #[must_use]
    pub fn with_select_result(mut self, select: bool) -> Self {
        self.select_result = select;
        self
    }

    /// Set whether seams protect loops.
    #[must_use]
    pub fn with_keep_seams(mut self, keep: bool) -> Self {
        self.keep_seams = keep;
        self
    }

    /// Set whether bevel weights protect loops.
    #[must_use]
    pub fn with_keep_bevel_weighted(mut self, keep: bool) -> Self {
        self.keep_bevel_weighted = keep;
        self
    }

    /// Set whether creases protect loops.
    #[must_use]
    pub fn with_keep_creased(mut self, keep: bool) -> Self {
        self.keep_creased = keep;
        self
    }

    /// Lower band bound in radians.
    #[inline]
    pub fn min_angle_rad(&self) -> f64 {
        self.min_angle.to_radians()
    }

    /// Upper band bound in radians.
    #[inline]
    pub fn max_angle_rad(&self) -> f64 {
        self.max_angle.to_radians()
    }

    /// Report which active protection, if any, applies to an edge.
    pub fn protection_of(&self, attrs: &EdgeAttributes) -> Option<ProtectedBy> {
        if self.keep_seams && attrs.seam {
            Some(ProtectedBy::Seam)
        } else if self.keep_bevel_weighted && attrs.bevel_weight > 0.0 {
            Some(ProtectedBy::BevelWeight)
        } else if self.keep_creased && attrs.crease > 0.0 {
            Some(ProtectedBy::Crease)
        } else {
            None
        }
    }

    /// Check that the angle bounds are within their accepted ranges.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_ANGLE_LIMIT..=ANGLE_CEILING).contains(&self.min_angle) {
            return Err(MeshError::invalid_param(
                "min_angle",
                self.min_angle,
                "must be within [-0.0001, 180] degrees",
            ));
        }
        if !(MAX_ANGLE_FLOOR..=ANGLE_CEILING).contains(&self.max_angle) {
            return Err(MeshError::invalid_param(
                "max_angle",
                self.max_angle,
                "must be within [0.0001, 180] degrees",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = LoopOptions::default();
        assert!(options.dissolve);
        assert!(!options.select_result);
        assert_eq!(options.closure, ClosurePolicy::Any);
        assert!(options.validate().is_ok());
        assert!((options.max_angle_rad() - std::f64::consts::PI).abs() < 1e-12);
        assert!(options.min_angle_rad() < 0.0);
    }

    #[test]
    fn test_closure_policy() {
        assert!(ClosurePolicy::Any.accepts(true));
        assert!(ClosurePolicy::Any.accepts(false));
        assert!(ClosurePolicy::ClosedOnly.accepts(true));
        assert!(!ClosurePolicy::ClosedOnly.accepts(false));
        assert!(!ClosurePolicy::OpenOnly.accepts(true));
        assert!(ClosurePolicy::OpenOnly.accepts(false));
    }

    #[test]
    fn test_protection_flags_are_independent() {
        let seam = EdgeAttributes {
            seam: true,
            ..Default::default()
        };
        let creased = EdgeAttributes {
            crease: 0.5,
            ..Default::default()
        };

        let options = LoopOptions::default().with_keep_seams(true);
        assert_eq!(options.protection_of(&seam), Some(ProtectedBy::Seam));
        assert_eq!(options.protection_of(&creased), None);

        let options = LoopOptions::default().with_keep_creased(true);
        assert_eq!(options.protection_of(&seam), None);
        assert_eq!(options.protection_of(&creased), Some(ProtectedBy::Crease));
    }

    #[test]
    fn test_validate_rejects_out_of_range_angles() {
        let options = LoopOptions::default().with_angle_range(-5.0, 180.0);
        assert!(matches!(
            options.validate(),
            Err(MeshError::InvalidParameter { name: "min_angle", .. })
        ));

        let options = LoopOptions::default().with_angle_range(0.0, 181.0);
        assert!(matches!(
            options.validate(),
            Err(MeshError::InvalidParameter { name: "max_angle", .. })
        ));

        let options = LoopOptions::default().with_angle_range(f64::NAN, 90.0);
        assert!(options.validate().is_err());
    }
}
