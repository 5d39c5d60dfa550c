//! Mutation front-end for a [`Tileset`].
//!
//! Every mutation goes through [`TilesetController`], which bumps a version
//! counter so that callers holding a ruleset built from an older state can tell
//! it is stale.

use crate::model::{Direction, EdgeType, EdgeTypeId, TileEdge, TileType, TileTypeId, Tileset};
use thiserror::Error;

/// Errors raised when a controller operation refers to something that does not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TilesetError {
    /// The tile index is past the end of the tile arena.
    #[error("Tile type index {0} is out of bounds ({1} tile types)")]
    TileOutOfBounds(usize, usize),
    /// The edge type index is past the end of the edge arena.
    #[error("Edge type index {0} is out of bounds ({1} edge types)")]
    EdgeTypeOutOfBounds(usize, usize),
}

/// Owns a tileset and applies edits to it.
#[derive(Debug, Clone, Default)]
pub struct TilesetController {
    tileset: Tileset,
    version: u64,
}

impl TilesetController {
    /// Wraps an existing tileset.
    pub fn new(tileset: Tileset) -> Self {
        Self {
            tileset,
            version: 0,
        }
    }

    /// The current tileset.
    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    /// Gives the tileset back.
    pub fn into_tileset(self) -> Tileset {
        self.tileset
    }

    /// Incremented after every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn mark_dirty(&mut self) {
        self.version += 1;
    }

    /// Replaces the whole tileset, e.g. to roll back a speculative edit.
    pub fn restore(&mut self, tileset: Tileset) {
        self.tileset = tileset;
        self.mark_dirty();
    }

    /// Adds an edge type created on purpose, which garbage collection will keep.
    pub fn add_edge_type(&mut self, mut edge_type: EdgeType) -> EdgeTypeId {
        edge_type.is_explicit = true;
        self.append_edge_type(edge_type)
    }

    /// Adds an edge type as is. Implicit edge types are dropped by
    /// [`Self::garbage_collect_edge_types`] once no tile uses them.
    pub fn append_edge_type(&mut self, edge_type: EdgeType) -> EdgeTypeId {
        self.tileset.edge_types.push(edge_type);
        self.mark_dirty();
        EdgeTypeId(self.tileset.edge_types.len() - 1)
    }

    /// Adds a fresh tile type alternating between the first two edge types,
    /// creating them if the tileset has fewer than two.
    pub fn add_tile_type(&mut self) -> TileTypeId {
        while self.tileset.edge_types.len() < 2 {
            self.add_edge_type(EdgeType::default());
        }

        let mut tile = TileType::default();
        for (k, edge) in tile.edges.iter_mut().enumerate().take(Direction::SOLVE_COUNT) {
            *edge = TileEdge::new(EdgeTypeId(k % 2), k >= 2);
        }
        tile.transform_permission = Some(self.tileset.default_transform_permission);
        self.append_tile_type(tile)
    }

    /// Appends a fully specified tile type.
    pub fn append_tile_type(&mut self, tile: TileType) -> TileTypeId {
        self.tileset.tile_types.push(tile);
        self.mark_dirty();
        TileTypeId(self.tileset.tile_types.len() - 1)
    }

    /// Duplicates a tile type and returns the id of the copy.
    ///
    /// # Errors
    ///
    /// Returns [`TilesetError::TileOutOfBounds`] if `id` does not exist.
    pub fn copy_tile_type(&mut self, id: TileTypeId) -> Result<TileTypeId, TilesetError> {
        let tile = self.tile(id)?.clone();
        Ok(self.append_tile_type(tile))
    }

    /// Removes a tile type, then drops the implicit edge types it leaves unused.
    ///
    /// # Errors
    ///
    /// Returns [`TilesetError::TileOutOfBounds`] if `id` does not exist.
    pub fn remove_tile_type(&mut self, id: TileTypeId) -> Result<TileType, TilesetError> {
        self.tile(id)?;
        let removed = self.tileset.tile_types.remove(id.0);
        self.mark_dirty();
        self.garbage_collect_edge_types();
        Ok(removed)
    }

    /// Removes an edge type. Tile edges that referenced it lose their edge type.
    ///
    /// # Errors
    ///
    /// Returns [`TilesetError::EdgeTypeOutOfBounds`] if `id` does not exist.
    pub fn remove_edge_type(&mut self, id: EdgeTypeId) -> Result<EdgeType, TilesetError> {
        let count = self.tileset.edge_types.len();
        if id.0 >= count {
            return Err(TilesetError::EdgeTypeOutOfBounds(id.0, count));
        }
        let keep = (0..count).map(|i| i != id.0).collect::<Vec<_>>();
        let removed = self.retain_edge_types(&keep).pop();
        self.mark_dirty();
        removed.ok_or(TilesetError::EdgeTypeOutOfBounds(id.0, count))
    }

    /// Sets one side of a tile, then drops implicit edge types that became unused.
    ///
    /// # Errors
    ///
    /// Fails if the tile or the edge type does not exist.
    pub fn set_tile_edge_type(
        &mut self,
        tile: TileTypeId,
        direction: Direction,
        edge_type: Option<EdgeTypeId>,
        flipped: bool,
    ) -> Result<(), TilesetError> {
        if let Some(edge_id) = edge_type {
            let count = self.tileset.edge_types.len();
            if edge_id.0 >= count {
                return Err(TilesetError::EdgeTypeOutOfBounds(edge_id.0, count));
            }
        }
        self.tile(tile)?;
        self.tileset.tile_types[tile.0].edges[direction.index()] = TileEdge {
            edge_type,
            flipped,
        };
        self.mark_dirty();
        self.garbage_collect_edge_types();
        Ok(())
    }

    /// Drops every implicit edge type that no tile edge references.
    ///
    /// Returns how many were removed.
    pub fn garbage_collect_edge_types(&mut self) -> usize {
        let mut used = vec![false; self.tileset.edge_types.len()];
        for edge in self.tileset.tile_types.iter().flat_map(|t| t.edges.iter()) {
            if let Some(slot) = edge.edge_type.and_then(|id| used.get_mut(id.0)) {
                *slot = true;
            }
        }
        let keep = self
            .tileset
            .edge_types
            .iter()
            .zip(&used)
            .map(|(edge_type, &used)| edge_type.is_explicit || used)
            .collect::<Vec<_>>();

        let removed = self.retain_edge_types(&keep).len();
        if removed > 0 {
            log::debug!("Garbage collected {removed} unused edge types");
            self.mark_dirty();
        }
        removed
    }

    /// Keeps the edge types flagged in `keep`, remapping tile references.
    /// References to dropped edge types become `None`.
    fn retain_edge_types(&mut self, keep: &[bool]) -> Vec<EdgeType> {
        let mut remap = Vec::with_capacity(keep.len());
        let mut next = 0;
        for &k in keep {
            remap.push(k.then_some(next));
            if k {
                next += 1;
            }
        }

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(next);
        for (edge_type, &k) in std::mem::take(&mut self.tileset.edge_types).into_iter().zip(keep) {
            if k {
                kept.push(edge_type);
            } else {
                removed.push(edge_type);
            }
        }
        self.tileset.edge_types = kept;

        if !removed.is_empty() {
            for edge in self.tileset.tile_types.iter_mut().flat_map(|t| t.edges.iter_mut()) {
                edge.edge_type = edge
                    .edge_type
                    .and_then(|id| remap.get(id.0).copied().flatten())
                    .map(EdgeTypeId);
            }
        }
        removed
    }

    fn tile(&self, id: TileTypeId) -> Result<&TileType, TilesetError> {
        self.tileset
            .tile_type(id)
            .ok_or(TilesetError::TileOutOfBounds(id.0, self.tileset.tile_types.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_tile_type_creates_two_edge_types() {
        let mut controller = TilesetController::default();
        let tile = controller.add_tile_type();
        let ts = controller.tileset();
        assert_eq!(ts.edge_types.len(), 2);
        assert!(ts.edge_types.iter().all(|e| e.is_explicit));
        let t = ts.tile_type(tile).unwrap();
        assert_eq!(t.edges[0], TileEdge::new(EdgeTypeId(0), false));
        assert_eq!(t.edges[1], TileEdge::new(EdgeTypeId(1), false));
        assert_eq!(t.edges[2], TileEdge::new(EdgeTypeId(0), true));
        assert_eq!(t.edges[3], TileEdge::new(EdgeTypeId(1), true));
        assert_eq!(t.edges[4].edge_type, None);
        assert!(t.transform_permission.is_some());

        // The second tile reuses the existing edge types.
        controller.add_tile_type();
        assert_eq!(controller.tileset().edge_types.len(), 2);
    }

    #[test]
    fn test_version_increases() {
        let mut controller = TilesetController::default();
        let v0 = controller.version();
        let tile = controller.add_tile_type();
        let v1 = controller.version();
        assert!(v1 > v0);
        controller.copy_tile_type(tile).unwrap();
        assert!(controller.version() > v1);
    }

    #[test]
    fn test_garbage_collection_keeps_explicit_and_used() {
        let mut controller = TilesetController::default();
        let tile = controller.add_tile_type();
        let implicit_unused = controller.append_edge_type(EdgeType::default());
        let implicit_used = controller.append_edge_type(EdgeType::default());
        let explicit_unused = controller.add_edge_type(EdgeType::default());
        assert_eq!(implicit_unused, EdgeTypeId(2));
        controller
            .set_tile_edge_type(tile, Direction::PosX, Some(implicit_used), false)
            .unwrap();

        // set_tile_edge_type already collected the unused implicit type.
        let ts = controller.tileset();
        assert_eq!(ts.edge_types.len(), 4);
        assert_eq!(
            ts.tile_types[0].edges[0].edge_type,
            Some(EdgeTypeId(implicit_used.0 - 1))
        );
        assert!(ts.edge_types[3].is_explicit);
        assert_eq!(explicit_unused, EdgeTypeId(4));
        assert_eq!(controller.garbage_collect_edge_types(), 0);
    }

    #[test]
    fn test_remove_edge_type_clears_references() {
        let mut controller = TilesetController::default();
        controller.add_tile_type();
        let removed = controller.remove_edge_type(EdgeTypeId(0)).unwrap();
        assert!(removed.is_explicit);
        let ts = controller.tileset();
        assert_eq!(ts.edge_types.len(), 1);
        assert_eq!(ts.tile_types[0].edges[0].edge_type, None);
        assert_eq!(ts.tile_types[0].edges[1].edge_type, Some(EdgeTypeId(0)));
        assert_eq!(
            controller.remove_edge_type(EdgeTypeId(5)),
            Err(TilesetError::EdgeTypeOutOfBounds(5, 1))
        );
    }

    #[test]
    fn test_remove_tile_type_collects_its_implicit_edges() {
        let mut controller = TilesetController::default();
        controller.add_tile_type();
        let extra = controller.append_edge_type(EdgeType::default());
        let mut tile = TileType::default();
        tile.edges[0] = TileEdge::new(extra, false);
        let id = controller.append_tile_type(tile);
        assert_eq!(controller.tileset().edge_types.len(), 3);

        controller.remove_tile_type(id).unwrap();
        assert_eq!(controller.tileset().edge_types.len(), 2);
        assert_eq!(controller.tileset().tile_types.len(), 1);
        assert!(matches!(
            controller.remove_tile_type(TileTypeId(4)),
            Err(TilesetError::TileOutOfBounds(4, 1))
        ));
    }

    #[test]
    fn test_restore_rolls_back() {
        let mut controller = TilesetController::default();
        controller.add_tile_type();
        let snapshot = controller.tileset().clone();
        controller.add_tile_type();
        controller.append_edge_type(EdgeType::default());
        controller.restore(snapshot.clone());
        assert_eq!(controller.tileset(), &snapshot);
    }
}
