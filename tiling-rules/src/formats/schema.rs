//! On-disk layout of a tileset file, shared by the RON and JSON parsers.

use crate::model::{
    Direction, EdgeType, EdgeTypeId, TileEdge, TileTransformPermission, TileType, Tileset,
};
use crate::LoadError;
use serde::Deserialize;
use std::collections::HashMap;

const fn default_true() -> bool {
    true
}

/// An edge type, declared once and referenced by name from tile edges.
#[derive(Debug, Clone, Deserialize)]
struct EdgeTypeData {
    name: String,
    #[serde(default = "default_true")]
    border_edge: bool,
    #[serde(default)]
    border_only: bool,
}

/// One side of a tile. `edge: None` leaves the side without a profile.
#[derive(Debug, Clone, Deserialize)]
struct EdgeRefData {
    #[serde(default)]
    edge: Option<String>,
    #[serde(default)]
    flipped: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct TileData {
    #[serde(default)]
    name: Option<String>,
    /// The four in-plane sides, in `+x, +y, -x, -y` order.
    edges: Vec<EdgeRefData>,
    #[serde(default)]
    permission: Option<TileTransformPermission>,
    #[serde(default)]
    ignore: bool,
}

/// Top-level structure of a tileset file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TilesetFile {
    edge_types: Vec<EdgeTypeData>,
    tiles: Vec<TileData>,
    #[serde(default)]
    default_permission: Option<TileTransformPermission>,
}

impl TilesetFile {
    /// Resolves edge names and builds the arena.
    pub(crate) fn into_tileset(self) -> Result<Tileset, LoadError> {
        if self.tiles.is_empty() {
            return Err(LoadError::InvalidData("No tiles defined.".to_owned()));
        }

        let mut edge_ids = HashMap::new();
        let mut edge_types = Vec::with_capacity(self.edge_types.len());
        for (index, data) in self.edge_types.into_iter().enumerate() {
            if edge_ids.insert(data.name.clone(), EdgeTypeId(index)).is_some() {
                return Err(LoadError::InvalidData(format!(
                    "Duplicate edge type name: {}",
                    data.name
                )));
            }
            edge_types.push(EdgeType {
                shapes: Vec::new(),
                is_explicit: true,
                border_edge: data.border_edge,
                border_only: data.border_only,
            });
        }

        let mut tile_types = Vec::with_capacity(self.tiles.len());
        for (index, data) in self.tiles.into_iter().enumerate() {
            let label = data.name.unwrap_or_else(|| format!("#{index}"));
            if data.edges.len() != Direction::SOLVE_COUNT {
                return Err(LoadError::InvalidData(format!(
                    "Tile {label} must have {} edges, found {}",
                    Direction::SOLVE_COUNT,
                    data.edges.len()
                )));
            }

            let mut tile = TileType {
                transform_permission: data.permission,
                ignore: data.ignore,
                ..TileType::default()
            };
            for (slot, edge) in tile.edges.iter_mut().zip(data.edges) {
                let edge_type = match edge.edge {
                    Some(name) => Some(*edge_ids.get(&name).ok_or_else(|| {
                        LoadError::InvalidData(format!("Tile {label}: unknown edge type: {name}"))
                    })?),
                    None => None,
                };
                *slot = TileEdge {
                    edge_type,
                    flipped: edge.flipped,
                };
            }
            tile_types.push(tile);
        }

        Ok(Tileset {
            edge_types,
            tile_types,
            default_transform_permission: self.default_permission.unwrap_or_default(),
        })
    }
}
