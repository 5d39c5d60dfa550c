//! Slot topologies: which slot lies across each side of a slot.
//!
//! Relations are the four sides of a quad, numbered like
//! [`tiling_rules::Direction`]'s in-plane directions (`+x, +y, -x, -y` on a grid).
//! A neighbor is reported together with the relation under which it sees the
//! slot back, which on a mesh need not be the opposite side.

use thiserror::Error;

pub mod grid;
pub mod mesh;

pub use grid::GridSlotTopology;
pub use mesh::{MeshFace, MeshSlotTopology};

/// Number of relations (sides) per slot.
pub const RELATION_COUNT: usize = 4;

/// Adjacency between slots.
pub trait SlotTopology {
    /// Number of slots.
    fn slot_count(&self) -> usize;

    /// The slot across side `relation` of `slot`, and the relation through
    /// which that neighbor sees `slot`. `None` on a boundary or out of range.
    fn neighbor_of(&self, slot: usize, relation: usize) -> Option<(usize, usize)>;
}

/// Errors raised while building a mesh topology.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// More than two faces share an edge.
    #[error("Non-manifold edge ({0}, {1}) is shared by more than two faces")]
    NonManifoldEdge(usize, usize),
    /// A face repeats a vertex.
    #[error("Face {0} is degenerate (repeated vertex)")]
    DegenerateFace(usize),
    /// Two faces traverse a shared edge in the same direction.
    #[error("Faces {face} and {other} traverse edge ({from}, {to}) in the same direction")]
    InconsistentOrientation {
        /// Face found second.
        face: usize,
        /// Face holding the half-edge first.
        other: usize,
        /// Edge start vertex.
        from: usize,
        /// Edge end vertex.
        to: usize,
    },
    /// A neighbor index points past the face list.
    #[error("Face {face} relation {relation} points to missing face {neighbor}")]
    MissingNeighbor {
        /// Face holding the reference.
        face: usize,
        /// Side of the face.
        relation: usize,
        /// Referenced face index.
        neighbor: usize,
    },
    /// A face lists a neighbor that does not list it back.
    #[error("Face {face} relation {relation} is not reciprocated by its neighbor")]
    NonReciprocal {
        /// Face holding the reference.
        face: usize,
        /// Side of the face.
        relation: usize,
    },
}
