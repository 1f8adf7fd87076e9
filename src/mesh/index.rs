//! Typed ids for mesh elements.
//!
//! An id is a slot number in one of the [`PolyMesh`](super::PolyMesh) arenas.
//! Dissolving kills elements in place and never renumbers or reuses a slot, so
//! an id taken before an edit either still names the same element or names a
//! dead slot. The mesh answers which (`is_vertex_valid`, `is_edge_valid`,
//! `is_face_valid`); ids carry no sentinel of their own.
//!
//! The slot type is chosen by [`MeshIndex`]: `u16` for small meshes, `u32` by
//! default, `u64` when a mesh outgrows 32 bits.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Integer type used for arena slots.
pub trait MeshIndex: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Number of slots the type can address.
    const CAPACITY: usize;

    /// Convert a slot number. The caller keeps it below [`CAPACITY`](Self::CAPACITY).
    fn from_usize(v: usize) -> Self;

    /// Slot number as `usize`.
    fn to_usize(self) -> usize;
}

macro_rules! impl_mesh_index {
    ($($t:ty),*) => {$(
        impl MeshIndex for $t {
            const CAPACITY: usize = (<$t>::MAX as usize).saturating_add(1);

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(v < Self::CAPACITY, "slot {} out of range for {}", v, stringify!($t));
                v as $t
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    )*};
}

impl_mesh_index!(u16, u32, u64);

/// Vertex slot.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// Edge slot. Edges are first-class: seams, weights and selection live here.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

/// Face slot.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

macro_rules! impl_id {
    ($name:ident, $tag:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Id of slot `index`.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Slot number.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $tag, self.index())
            }
        }
    };
}

impl_id!(VertexId, "v");
impl_id!(EdgeId, "e");
impl_id!(FaceId, "f");
