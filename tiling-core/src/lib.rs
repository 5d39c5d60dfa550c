//! Core library for tiling quad meshes with Wang tiles.
//! Holds the slot superpositions, the memoized ruleset, slot topologies, the
//! collapse solver and the tile suggestion engine.

use thiserror::Error;

/// Memoized signed Wang ruleset.
pub mod ruleset;
/// The collapse solver.
pub mod solver;
/// Tile suggestion by neighborhood voting.
pub mod suggestion;
/// Per-slot candidate bitsets.
pub mod superposition;
/// Slot adjacency on grids and meshes.
pub mod topology;

pub use tiling_rules;

/// The ruleset the solver works with.
pub use crate::ruleset::WangRuleset;
/// The solver and its knobs.
pub use crate::solver::{Neighborhood, Solver, SolverOptions, SolverOptionsBuilder, SolverStats, Status};
/// Tile suggestion.
pub use crate::suggestion::{
    materialize, MaterializedTile, SuggestionError, SuggestionStrategy, Tile, TileSuggester,
};
/// Set of candidate variants.
pub use crate::superposition::TileSuperposition;
/// Topologies.
pub use crate::topology::{
    GridSlotTopology, MeshFace, MeshSlotTopology, SlotTopology, TopologyError, RELATION_COUNT,
};

/// Errors reported by solver checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// A candidate has no compatible candidate across one of its sides.
    #[error(
        "Slot {slot} candidate {variant} has no match in slot {neighbor} (relation {relation}, seen back through {neighbor_relation})"
    )]
    Inconsistency {
        /// The slot holding the unsupported candidate.
        slot: usize,
        /// Readable form of the candidate.
        variant: String,
        /// The neighbor offering no support.
        neighbor: usize,
        /// Side of `slot` facing the neighbor.
        relation: usize,
        /// Side of the neighbor facing `slot`.
        neighbor_relation: usize,
    },
}
