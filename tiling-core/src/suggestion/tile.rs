use crate::topology::RELATION_COUNT;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tiling_rules::{TileOrientation, TileTransform, TileTransformPermission};

/// A candidate tile described by its four signed labels, `+x, +y, -x, -y`.
///
/// A label of 0 asks for a brand new edge type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tile {
    /// Signed labels per side.
    pub labels: [i32; RELATION_COUNT],
}

impl Tile {
    /// Creates a tile from its labels.
    pub const fn new(labels: [i32; RELATION_COUNT]) -> Self {
        Self { labels }
    }

    /// Number of sides showing a flipped edge.
    pub fn flip_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l < 0).count()
    }

    /// Number of sides that need a new edge type.
    pub fn new_edge_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 0).count()
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.labels;
        write!(f, "[{a},{b},{c},{d}]")
    }
}

/// Which kinds of symmetry a transform relies on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransformRequirement {
    /// Needs mirroring along X.
    pub flip_x: bool,
    /// Needs mirroring along Y.
    pub flip_y: bool,
    /// Needs a non-trivial rotation.
    pub rotation: bool,
}

impl TransformRequirement {
    /// Number of distinct requirements.
    pub const COUNT: usize = 8;

    /// The identity requires nothing.
    pub const UNTRANSFORMED: Self = Self {
        flip_x: false,
        flip_y: false,
        rotation: false,
    };

    /// Dense index in `0..COUNT`.
    pub const fn index(self) -> usize {
        self.flip_x as usize | (self.flip_y as usize) << 1 | (self.rotation as usize) << 2
    }
}

/// An element of the symmetry group of the square acting on [`Tile`] labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Transform {
    /// Mirror along X.
    pub flip_x: bool,
    /// Mirror along Y.
    pub flip_y: bool,
    /// Quarter turns.
    pub orientation: TileOrientation,
}

impl From<TileTransform> for Transform {
    fn from(t: TileTransform) -> Self {
        Self {
            flip_x: t.flip_x,
            flip_y: t.flip_y,
            orientation: t.orientation,
        }
    }
}

impl Transform {
    /// The symmetries this transform needs.
    pub fn requirements(&self) -> TransformRequirement {
        TransformRequirement {
            flip_x: self.flip_x,
            flip_y: self.flip_y,
            rotation: self.orientation != TileOrientation::Deg0,
        }
    }

    /// Moves each label of `tile` to the side it lands on, negating it once per flip.
    pub fn apply(&self, tile: &Tile) -> Tile {
        let turns = self.orientation.quarter_turns();
        let mut out = Tile::default();
        for (i, &label) in tile.labels.iter().enumerate() {
            let mut label = label;
            let mut j = (i + RELATION_COUNT - turns) % RELATION_COUNT;
            if self.flip_x {
                label = -label;
                if j % 2 == 0 {
                    j = (j + 2) % RELATION_COUNT;
                }
            }
            if self.flip_y {
                label = -label;
                if j % 2 == 1 {
                    j = (j + 2) % RELATION_COUNT;
                }
            }
            out.labels[j] = label;
        }
        out
    }

    /// Inverse of [`Self::apply`]: flips first, then rotates the other way.
    pub fn apply_inverse(&self, tile: &Tile) -> Tile {
        let turns = self.orientation.quarter_turns();
        let mut out = Tile::default();
        for (i, &label) in tile.labels.iter().enumerate() {
            let mut label = label;
            let mut j = i;
            if self.flip_x {
                label = -label;
                if j % 2 == 0 {
                    j = (j + 2) % RELATION_COUNT;
                }
            }
            if self.flip_y {
                label = -label;
                if j % 2 == 1 {
                    j = (j + 2) % RELATION_COUNT;
                }
            }
            j = (j + turns) % RELATION_COUNT;
            out.labels[j] = label;
        }
        out
    }

    /// All 16 transforms, X flip outermost and rotation innermost.
    pub fn all() -> Vec<Self> {
        let mut transforms = Vec::with_capacity(16);
        for flip_x in [false, true] {
            for flip_y in [false, true] {
                for orientation in TileOrientation::ALL {
                    transforms.push(Self {
                        flip_x,
                        flip_y,
                        orientation,
                    });
                }
            }
        }
        transforms
    }

    /// Transforms a permission allows, in variant enumeration order.
    pub fn allowed(permission: TileTransformPermission) -> Vec<Self> {
        TileTransform::enumerate(permission)
            .into_iter()
            .map(Self::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiling_rules::{Direction, EdgeType, EdgeTypeId, TileEdge, TileType, Tileset, WangTable};

    const SAMPLE: Tile = Tile::new([1, -2, 3, -4]);

    #[test]
    fn test_identity() {
        let id = Transform::default();
        assert_eq!(id.apply(&SAMPLE), SAMPLE);
        assert_eq!(id.apply_inverse(&SAMPLE), SAMPLE);
        assert_eq!(id.requirements(), TransformRequirement::UNTRANSFORMED);
    }

    #[test]
    fn test_inverse_undoes_apply() {
        for t in Transform::all() {
            assert_eq!(t.apply_inverse(&t.apply(&SAMPLE)), SAMPLE, "{t:?}");
            assert_eq!(t.apply(&t.apply_inverse(&SAMPLE)), SAMPLE, "{t:?}");
        }
    }

    #[test]
    fn test_flip_x_swaps_x_sides() {
        let t = Transform {
            flip_x: true,
            ..Transform::default()
        };
        assert_eq!(t.apply(&SAMPLE), Tile::new([-3, 2, -1, 4]));
        assert!(t.requirements().flip_x);
        assert_eq!(t.requirements().index(), 1);
    }

    #[test]
    fn test_all_and_allowed() {
        let all = Transform::all();
        assert_eq!(all.len(), 16);
        assert!(all[8].flip_x && !all[8].flip_y);
        assert_eq!(all[1].orientation, TileOrientation::Deg90);
        assert_eq!(Transform::allowed(TileTransformPermission::default()).len(), 16);
        assert_eq!(Transform::allowed(TileTransformPermission::NONE), vec![Transform::default()]);
    }

    #[test]
    fn test_inverse_matches_variant_rows() {
        // The label row of a variant is its transform's inverse applied to the base tile.
        let edges = [(0, false), (1, true), (2, false), (3, true)];
        let tileset = Tileset {
            edge_types: vec![EdgeType::default(); 4],
            tile_types: vec![TileType::from_solved_edges(
                edges.map(|(e, f)| TileEdge::new(EdgeTypeId(e), f)),
            )],
            ..Tileset::default()
        };
        let table = WangTable::from_tileset(&tileset);
        let base = Tile::new(table.row(0).unwrap());
        for (id, variant) in table.variants().iter() {
            let row = Tile::new(table.row(id).unwrap());
            assert_eq!(Transform::from(variant.transform).apply_inverse(&base), row);
        }
        assert_eq!(Direction::SOLVE_COUNT, RELATION_COUNT);
    }

    #[test]
    fn test_counts() {
        let tile = Tile::new([0, -1, 0, 2]);
        assert_eq!(tile.flip_count(), 1);
        assert_eq!(tile.new_edge_count(), 2);
        assert_eq!(tile.to_string(), "[0,-1,0,2]");
    }
}
