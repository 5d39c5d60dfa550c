//! Proposes a new tile when solving fails.
//!
//! Every slot that ran out of candidates left behind its neighborhood. Each
//! neighborhood votes for the tiles that would have fit it, and the strategy
//! picks one of those (or guesses more naively). The suggestion can then be
//! added to the tileset with [`materialize`].

use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiling_rules::{EdgeType, EdgeTypeId, TileEdge, TileType, TileTypeId, TilesetController};

pub mod strategy;
pub mod tile;
pub mod votes;

pub use strategy::TileSuggester;
pub use tile::{Tile, Transform, TransformRequirement};
pub use votes::{consolidate_votes, find_best, wang_label_superposition, Score, VoteEntry, VoteTable};

/// How to turn failed neighborhoods into a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SuggestionStrategy {
    /// Random labels.
    Random,
    /// Labels read off a random failed neighborhood.
    GuidedRandom,
    /// Smallest labels of the first failed neighborhood.
    GreedyNaive,
    /// Random labels of the first failed neighborhood.
    GreedyStochastic,
    /// Best scored tile after all neighborhoods voted.
    #[default]
    Voting,
    /// First tile that received a vote.
    VotingGreedySanityCheck,
    /// Random tile among those that received votes.
    VotingRandomSanityCheck,
    /// First voted tile with which the solve succeeds, else [`Self::Voting`].
    BruteForce,
}

impl SuggestionStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Random,
        Self::GuidedRandom,
        Self::GreedyNaive,
        Self::GreedyStochastic,
        Self::Voting,
        Self::VotingGreedySanityCheck,
        Self::VotingRandomSanityCheck,
        Self::BruteForce,
    ];

    /// Name used on the command line and in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::GuidedRandom => "guided-random",
            Self::GreedyNaive => "greedy-naive",
            Self::GreedyStochastic => "greedy-stochastic",
            Self::Voting => "voting",
            Self::VotingGreedySanityCheck => "voting-greedy-sanity-check",
            Self::VotingRandomSanityCheck => "voting-random-sanity-check",
            Self::BruteForce => "brute-force",
        }
    }
}

impl std::fmt::Display for SuggestionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while suggesting or adding a tile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuggestionError {
    /// The last solve recorded no failed slot to learn from.
    #[error("No impossible neighborhood was recorded")]
    NoImpossibleNeighborhood,
    /// No neighborhood produced a single vote.
    #[error("No candidate tile received a vote")]
    EmptyVotes,
    /// Random labels need at least one edge type to draw from.
    #[error("The tileset has no edge type")]
    NoEdgeTypes,
    /// A label refers to an edge type the tileset does not have.
    #[error("Label {label} refers to a missing edge type ({edge_type_count} edge types)")]
    UnknownLabel {
        /// The offending label.
        label: i32,
        /// Edge types in the tileset.
        edge_type_count: usize,
    },
}

/// What [`materialize`] added to the tileset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializedTile {
    /// The new tile type.
    pub tile_type: TileTypeId,
    /// The edge type created for the zero labels, if any.
    pub edge_type: Option<EdgeTypeId>,
}

/// Adds `tile` to the tileset as a new tile type with the default permission.
///
/// A label `l` uses edge type `|l| - 1`, flipped when negative. All zero labels
/// share one new explicit edge type.
///
/// # Errors
///
/// Returns [`SuggestionError::UnknownLabel`] before touching the tileset if a
/// label has no edge type.
pub fn materialize(tile: &Tile, controller: &mut TilesetController) -> Result<MaterializedTile, SuggestionError> {
    let edge_type_count = controller.tileset().edge_types.len();
    if let Some(&label) = tile
        .labels
        .iter()
        .find(|l| l.unsigned_abs() as usize > edge_type_count)
    {
        return Err(SuggestionError::UnknownLabel {
            label,
            edge_type_count,
        });
    }

    let mut created = None;
    let mut edges = [TileEdge::default(); 4];
    for (edge, &label) in edges.iter_mut().zip(&tile.labels) {
        let edge_type = if label == 0 {
            *created.get_or_insert_with(|| controller.add_edge_type(EdgeType::default()))
        } else {
            EdgeTypeId(label.unsigned_abs() as usize - 1)
        };
        *edge = TileEdge::new(edge_type, label < 0);
    }

    let permission = controller.tileset().default_transform_permission;
    let tile_type = controller.append_tile_type(TileType::from_solved_edges(edges).with_permission(permission));
    if created.is_some() {
        warn!("Suggested tile {tile} required a new edge type");
    }
    Ok(MaterializedTile {
        tile_type,
        edge_type: created,
    })
}
