use crate::model::{Direction, Tileset};
use crate::variants::TileVariantList;
use std::collections::BTreeSet;

/// A set of signed Wang labels, iterated in ascending order.
pub type LabelSet = BTreeSet<i32>;

/// Flat signed-label compatibility table over the variants of a tileset.
///
/// `table[variant][direction]` holds `±(edge_type_index + 1)`, the sign being
/// the flip state of the edge once the variant's transform is applied, or `0`
/// when the tile has no edge type on that side. Two sides mate when their labels
/// are opposite.
#[derive(Debug, Clone, Default)]
pub struct WangTable {
    labels: Vec<[i32; Direction::SOLVE_COUNT]>,
    variants: TileVariantList,
    border_labels: LabelSet,
    border_only_labels: LabelSet,
    edge_type_count: usize,
}

impl WangTable {
    /// Builds the table for every variant of `tileset`.
    pub fn from_tileset(tileset: &Tileset) -> Self {
        let variants = TileVariantList::new(tileset);

        let mut border_labels = LabelSet::new();
        let mut border_only_labels = LabelSet::new();
        for (index, edge_type) in tileset.edge_types.iter().enumerate() {
            let label = index as i32 + 1;
            if edge_type.border_edge {
                border_labels.extend([label, -label]);
            }
            if edge_type.border_only {
                border_only_labels.extend([label, -label]);
            }
        }

        let labels = variants
            .iter()
            .map(|(_, variant)| {
                let mut row = [0; Direction::SOLVE_COUNT];
                // Ignored tiles never reach the variant list, so the lookup only
                // fails on a malformed tileset; such a row stays unconstrained.
                if let Some(tile) = tileset.tile_type(variant.tile) {
                    for direction in Direction::SOLVED {
                        let edge = tile.edge_in_direction(direction, variant.transform);
                        row[direction.index()] = tileset.label_of(&edge);
                    }
                }
                row
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Built signed Wang table: {} variants, {} edge types, {} border labels",
            labels.len(),
            tileset.edge_types.len(),
            border_labels.len()
        );

        Self {
            labels,
            variants,
            border_labels,
            border_only_labels,
            edge_type_count: tileset.edge_types.len(),
        }
    }

    /// Builds a table directly from label rows, bypassing the tileset model.
    ///
    /// No variant enumeration backs the rows, so [`Self::variants`] is empty.
    pub fn from_rows(
        labels: Vec<[i32; Direction::SOLVE_COUNT]>,
        border_labels: LabelSet,
        border_only_labels: LabelSet,
    ) -> Self {
        let edge_type_count = labels
            .iter()
            .flat_map(|row| row.iter())
            .map(|l| l.unsigned_abs() as usize)
            .max()
            .unwrap_or(0);
        Self {
            labels,
            variants: TileVariantList::default(),
            border_labels,
            border_only_labels,
            edge_type_count,
        }
    }

    /// Number of rows (variants).
    pub fn variant_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of edge types the labels were drawn from.
    pub fn edge_type_count(&self) -> usize {
        self.edge_type_count
    }

    /// The variant enumeration the rows were built from.
    pub fn variants(&self) -> &TileVariantList {
        &self.variants
    }

    /// Label of `variant` on side `relation`, `None` when out of bounds.
    #[inline]
    pub fn label(&self, variant: usize, relation: usize) -> Option<i32> {
        self.labels.get(variant).and_then(|row| row.get(relation)).copied()
    }

    /// All four labels of a variant.
    pub fn row(&self, variant: usize) -> Option<[i32; Direction::SOLVE_COUNT]> {
        self.labels.get(variant).copied()
    }

    /// Iterates over the rows in variant order.
    pub fn rows(&self) -> impl Iterator<Item = &[i32; Direction::SOLVE_COUNT]> {
        self.labels.iter()
    }

    /// Labels allowed on an unconnected boundary edge.
    pub fn border_labels(&self) -> &LabelSet {
        &self.border_labels
    }

    /// Labels allowed only on boundary edges.
    pub fn border_only_labels(&self) -> &LabelSet {
        &self.border_only_labels
    }

    /// Whether variant `x` seen through `relation_x` may face variant `y` seen through `relation_y`.
    ///
    /// Out-of-bounds arguments are treated as disallowed.
    #[inline]
    pub fn allows(&self, x: usize, relation_x: usize, y: usize, relation_y: usize) -> bool {
        match (self.label(x, relation_x), self.label(y, relation_y)) {
            (Some(a), Some(b)) => a == -b,
            _ => false,
        }
    }
}
