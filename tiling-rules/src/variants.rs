use crate::model::{TileOrientation, TileTransform, TileTypeId, Tileset};
use std::collections::HashMap;
use std::fmt::Write as _;

/// A tile type paired with one of its allowed transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileVariant {
    /// The source tile type.
    pub tile: TileTypeId,
    /// The symmetry applied to it.
    pub transform: TileTransform,
}

/// Dense enumeration of every (tile type, allowed transform) pair of a tileset.
///
/// Ids are assigned in tile order, then in the order produced by
/// [`TileTransform::enumerate`]. Tiles flagged `ignore` get no ids. Two
/// transforms that happen to produce the same labeling are kept as distinct
/// variants.
#[derive(Debug, Clone, Default)]
pub struct TileVariantList {
    variants: Vec<TileVariant>,
    lookup: HashMap<TileVariant, usize>,
}

impl TileVariantList {
    /// Enumerates the variants of `tileset`.
    pub fn new(tileset: &Tileset) -> Self {
        let mut variants = Vec::new();
        for (index, tile_type) in tileset.tile_types.iter().enumerate() {
            if tile_type.ignore {
                continue;
            }
            let permission = tileset.permission_of(tile_type);
            variants.extend(
                TileTransform::enumerate(permission)
                    .into_iter()
                    .map(|transform| TileVariant {
                        tile: TileTypeId(index),
                        transform,
                    }),
            );
        }

        let lookup = variants
            .iter()
            .enumerate()
            .map(|(id, variant)| (*variant, id))
            .collect();

        log::debug!(
            "Enumerated {} variants from {} tile types",
            variants.len(),
            tileset.tile_types.len()
        );

        Self { variants, lookup }
    }

    /// Number of variants.
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Whether the tileset produced no variant at all.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Maps a variant id back to its tile and transform.
    pub fn variant_to_tile(&self, variant: usize) -> Option<TileVariant> {
        self.variants.get(variant).copied()
    }

    /// Inverse of [`Self::variant_to_tile`].
    pub fn variant_of(&self, tile: TileTypeId, transform: TileTransform) -> Option<usize> {
        self.lookup.get(&TileVariant { tile, transform }).copied()
    }

    /// Iterates over `(id, variant)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TileVariant)> {
        self.variants.iter().enumerate()
    }

    /// Human readable description of a variant, used in logs.
    pub fn variant_repr(&self, variant: usize) -> String {
        let Some(v) = self.variant_to_tile(variant) else {
            return format!("{variant} (invalid)");
        };
        let mut repr = format!("{variant} (tile #{}, transform", v.tile.0);
        if v.transform.flip_x {
            repr.push_str(" fX");
        }
        if v.transform.flip_y {
            repr.push_str(" fY");
        }
        match v.transform.orientation {
            TileOrientation::Deg0 => {}
            other => {
                let _ = write!(repr, " {}d", other.quarter_turns() * 90);
            }
        }
        repr.push(')');
        repr
    }
}
