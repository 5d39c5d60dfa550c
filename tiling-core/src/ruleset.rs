use crate::superposition::TileSuperposition;
use crate::topology::RELATION_COUNT;
use tiling_rules::{LabelSet, Tileset, WangTable};

/// Signed Wang ruleset with precomputed support sets.
///
/// For every relation and every label `l`, the ruleset keeps the set of
/// variants showing `-l` on that side, so the variants allowed next to a whole
/// superposition are the union of a few precomputed sets rather than a pairwise
/// scan. Immutable once built.
#[derive(Debug, Clone)]
pub struct WangRuleset {
    table: WangTable,
    /// `matching[relation][label + label_offset]`: variants whose label on
    /// `relation` mates with `label`.
    matching: Vec<Vec<TileSuperposition>>,
    label_offset: i32,
    /// Variants whose label on a relation is allowed on a mesh boundary.
    border_masks: Vec<TileSuperposition>,
    /// Variants whose label on a relation is not restricted to mesh boundaries.
    interior_masks: Vec<TileSuperposition>,
}

impl WangRuleset {
    /// Precomputes the support sets of `table`.
    pub fn new(table: WangTable) -> Self {
        let variant_count = table.variant_count();
        let label_offset = table.edge_type_count() as i32;
        let label_range = 2 * table.edge_type_count() + 1;

        let mut matching = vec![vec![TileSuperposition::empty(variant_count); label_range]; RELATION_COUNT];
        let mut border_masks = vec![TileSuperposition::empty(variant_count); RELATION_COUNT];
        let mut interior_masks = vec![TileSuperposition::empty(variant_count); RELATION_COUNT];

        for (variant, row) in table.rows().enumerate() {
            for (relation, &label) in row.iter().enumerate() {
                // `variant` mates with anything showing `-label` on the other side.
                if let Some(set) = matching[relation].get_mut((label_offset - label) as usize) {
                    set.insert(variant);
                }
                if table.border_labels().contains(&label) {
                    border_masks[relation].insert(variant);
                }
                if !table.border_only_labels().contains(&label) {
                    interior_masks[relation].insert(variant);
                }
            }
        }

        Self {
            table,
            matching,
            label_offset,
            border_masks,
            interior_masks,
        }
    }

    /// Builds the label table of `tileset` and its support sets.
    pub fn from_tileset(tileset: &Tileset) -> Self {
        Self::new(WangTable::from_tileset(tileset))
    }

    /// The underlying label table.
    pub fn table(&self) -> &WangTable {
        &self.table
    }

    /// Number of variants.
    pub fn variant_count(&self) -> usize {
        self.table.variant_count()
    }

    /// Label of `variant` on side `relation`, 0 when out of bounds.
    #[inline]
    pub fn label(&self, variant: usize, relation: usize) -> i32 {
        self.table.label(variant, relation).unwrap_or(0)
    }

    /// Labels allowed on an unconnected boundary edge.
    pub fn border_labels(&self) -> &LabelSet {
        self.table.border_labels()
    }

    /// Labels allowed only on boundary edges.
    pub fn border_only_labels(&self) -> &LabelSet {
        self.table.border_only_labels()
    }

    /// Whether variant `x` through `relation_x` may face variant `y` through `relation_y`.
    #[inline]
    pub fn allows(&self, x: usize, relation_x: usize, y: usize, relation_y: usize) -> bool {
        self.table.allows(x, relation_x, y, relation_y)
    }

    /// Variants `y` such that some candidate `x` of `states`, seen through
    /// `relation_x`, allows `y` seen through `relation_y`.
    pub fn allowed_states(
        &self,
        states: &TileSuperposition,
        relation_x: usize,
        relation_y: usize,
    ) -> TileSuperposition {
        let mut allowed = TileSuperposition::empty(self.variant_count());
        let Some(by_label) = self.matching.get(relation_y) else {
            return allowed;
        };

        let mut seen = vec![false; by_label.len()];
        for x in states.iter() {
            let Some(label) = self.table.label(x, relation_x) else {
                continue;
            };
            let index = (label + self.label_offset) as usize;
            if let Some(done) = seen.get_mut(index) {
                if !*done {
                    *done = true;
                    allowed.union_with(&by_label[index]);
                }
            }
        }
        allowed
    }

    /// Variants that may sit on a boundary on side `relation`.
    pub fn border_mask(&self, relation: usize) -> Option<&TileSuperposition> {
        self.border_masks.get(relation)
    }

    /// Variants that may face a neighbor on side `relation`.
    pub fn interior_mask(&self, relation: usize) -> Option<&TileSuperposition> {
        self.interior_masks.get(relation)
    }
}
