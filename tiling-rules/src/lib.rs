//! Tileset model for mesh tiling: edge and tile types, their symmetries, the
//! variant enumeration and the signed Wang label table the solver consumes.

use thiserror::Error;

pub mod controller;
pub mod formats;
pub mod loader;
pub mod model;
pub mod ruleset;
pub mod variants;

pub use controller::{TilesetController, TilesetError};
pub use model::{
    Direction, EdgeType, EdgeTypeId, ShapeId, TileEdge, TileOrientation, TileTransform,
    TileTransformPermission, TileType, TileTypeId, Tileset, TransformedEdge,
};
pub use ruleset::{LabelSet, WangTable};
pub use variants::{TileVariant, TileVariantList};

/// Errors raised while loading a tileset file.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("I/O error reading file: {0}")]
    Io(#[from] std::io::Error),
    /// The content is not valid syntax for its format.
    #[error("Failed to parse tileset format (e.g., RON/JSON): {0}")]
    ParseError(String),
    /// The syntax is valid but the tileset is not (unknown names, wrong edge count).
    #[error("Invalid tileset data: {0}")]
    InvalidData(String),
    /// The format needs a cargo feature that was compiled out.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}
