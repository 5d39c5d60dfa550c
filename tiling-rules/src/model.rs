//! Declarative tileset model: edge types, tile types and their symmetries.
//!
//! The tileset is an arena. Tile edges refer to edge types through
//! [`EdgeTypeId`] indices rather than shared pointers, so a removed edge type
//! leaves behind `None` references instead of dangling ones.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of an edge type inside [`Tileset::edge_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeTypeId(pub usize);

/// Index of a tile type inside [`Tileset::tile_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileTypeId(pub usize);

/// Opaque handle to a profile shape owned by the external profile compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeId(pub usize);

/// The six sides of a tile. Only the first [`Direction::SOLVE_COUNT`] take part in solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// +X side.
    PosX = 0,
    /// +Y side.
    PosY = 1,
    /// -X side.
    NegX = 2,
    /// -Y side.
    NegY = 3,
    /// Top side, not used by the solver.
    PosZ = 4,
    /// Bottom side, not used by the solver.
    NegZ = 5,
}

impl Direction {
    /// Number of tile edges.
    pub const COUNT: usize = 6;
    /// Number of tile edges constrained by the solver (`PosX..=NegY`).
    pub const SOLVE_COUNT: usize = 4;

    /// All directions, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::PosX,
        Self::PosY,
        Self::NegX,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// The in-plane directions used for solving.
    pub const SOLVED: [Self; Self::SOLVE_COUNT] = [Self::PosX, Self::PosY, Self::NegX, Self::NegY];

    /// Index of the direction in a tile's edge array.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Converts an index back into a direction.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The direction on the other side of the tile.
    pub const fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::PosY => Self::NegY,
            Self::NegX => Self::PosX,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }
}

/// An interface profile shared by any number of tile edges.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeType {
    /// Profile shapes, sorted by their start along the edge.
    pub shapes: Vec<ShapeId>,
    /// Explicit edge types were created on purpose and survive garbage collection.
    pub is_explicit: bool,
    /// May be left unconnected on a mesh boundary.
    pub border_edge: bool,
    /// May only be used on a mesh boundary.
    pub border_only: bool,
}

impl Default for EdgeType {
    fn default() -> Self {
        Self {
            shapes: Vec::new(),
            is_explicit: false,
            border_edge: true,
            border_only: false,
        }
    }
}

/// One side of a tile type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileEdge {
    /// The profile on this side, if any.
    pub edge_type: Option<EdgeTypeId>,
    /// Whether the profile is mirrored along the edge.
    pub flipped: bool,
}

impl TileEdge {
    /// Creates an edge referencing `edge_type`.
    pub const fn new(edge_type: EdgeTypeId, flipped: bool) -> Self {
        Self {
            edge_type: Some(edge_type),
            flipped,
        }
    }
}

/// Which symmetries of the square may be applied to a tile when generating variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileTransformPermission {
    /// Allow the four quarter turns.
    pub rotation: bool,
    /// Allow mirroring along X.
    pub flip_x: bool,
    /// Allow mirroring along Y.
    pub flip_y: bool,
}

impl TileTransformPermission {
    /// Only the identity transform.
    pub const NONE: Self = Self {
        rotation: false,
        flip_x: false,
        flip_y: false,
    };

    /// Rotations only.
    pub const ROTATION_ONLY: Self = Self {
        rotation: true,
        flip_x: false,
        flip_y: false,
    };
}

impl Default for TileTransformPermission {
    fn default() -> Self {
        Self {
            rotation: true,
            flip_x: true,
            flip_y: true,
        }
    }
}

/// Quarter-turn orientation of a transformed tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TileOrientation {
    /// No rotation.
    #[default]
    Deg0 = 0,
    /// A quarter turn.
    Deg90 = 1,
    /// A half turn.
    Deg180 = 2,
    /// Three quarter turns.
    Deg270 = 3,
}

impl TileOrientation {
    /// All orientations, in increasing angle.
    pub const ALL: [Self; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Number of quarter turns.
    pub const fn quarter_turns(self) -> usize {
        self as usize
    }

    /// Orientation for a number of quarter turns, wrapping around.
    pub const fn from_quarter_turns(turns: usize) -> Self {
        Self::ALL[turns % 4]
    }
}

/// One element of the symmetry group of the square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileTransform {
    /// Mirror along X.
    pub flip_x: bool,
    /// Mirror along Y.
    pub flip_y: bool,
    /// Rotation applied on top of the flips.
    pub orientation: TileOrientation,
}

impl TileTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        flip_x: false,
        flip_y: false,
        orientation: TileOrientation::Deg0,
    };

    /// Expands a permission into the ordered list of transforms it allows.
    ///
    /// Flips along X are expanded first, then flips along Y, then rotations, so
    /// the identity always comes first.
    pub fn enumerate(permission: TileTransformPermission) -> Vec<Self> {
        let mut transforms = vec![Self::IDENTITY];
        if permission.flip_x {
            transforms = transforms
                .into_iter()
                .flat_map(|tr| {
                    [
                        tr,
                        Self {
                            flip_x: !tr.flip_x,
                            ..tr
                        },
                    ]
                })
                .collect();
        }
        if permission.flip_y {
            transforms = transforms
                .into_iter()
                .flat_map(|tr| {
                    [
                        tr,
                        Self {
                            flip_y: !tr.flip_y,
                            ..tr
                        },
                    ]
                })
                .collect();
        }
        if permission.rotation {
            transforms = transforms
                .into_iter()
                .flat_map(|tr| {
                    let base = tr.orientation.quarter_turns();
                    (0..4).map(move |i| Self {
                        orientation: TileOrientation::from_quarter_turns(base + i),
                        ..tr
                    })
                })
                .collect();
        }
        transforms
    }
}

/// A tile edge as seen from a given direction once the tile has been transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformedEdge {
    /// The profile on that side, if any.
    pub edge_type: Option<EdgeTypeId>,
    /// Combined flip of the stored edge and of the transform.
    pub flipped: bool,
}

impl TransformedEdge {
    /// Two transformed edges mate iff they share a profile and are mirrored relative to each other.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.edge_type == other.edge_type && self.flipped != other.flipped
    }
}

/// A tile type: six edges plus the symmetries it may be used with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileType {
    /// Edges indexed by [`Direction::index`].
    pub edges: [TileEdge; Direction::COUNT],
    /// Allowed symmetries. `None` falls back to the tileset default.
    pub transform_permission: Option<TileTransformPermission>,
    /// Exclude this tile from solving.
    pub ignore: bool,
}

impl TileType {
    /// Creates a tile from its four in-plane edges, in `PosX, PosY, NegX, NegY` order.
    pub fn from_solved_edges(edges: [TileEdge; Direction::SOLVE_COUNT]) -> Self {
        let mut tile = Self::default();
        tile.edges[..Direction::SOLVE_COUNT].copy_from_slice(&edges);
        tile
    }

    /// Sets the transform permission, builder style.
    #[must_use]
    pub fn with_permission(mut self, permission: TileTransformPermission) -> Self {
        self.transform_permission = Some(permission);
        self
    }

    /// The edge on a given side.
    pub fn edge(&self, direction: Direction) -> &TileEdge {
        &self.edges[direction as usize]
    }

    /// Finds which stored edge ends up facing `direction` once `transform` is applied.
    pub fn edge_in_direction(&self, direction: Direction, transform: TileTransform) -> TransformedEdge {
        let mut index =
            (direction.index() + 4 - transform.orientation.quarter_turns()) % Direction::SOLVE_COUNT;
        let mut flipped = false;

        if transform.flip_y {
            if index % 2 == 1 {
                index = (index + 2) % 4;
            }
            flipped = !flipped;
        }

        if transform.flip_x {
            if index % 2 == 0 {
                index = (index + 2) % 4;
            }
            flipped = !flipped;
        }

        let edge = &self.edges[index];
        TransformedEdge {
            edge_type: edge.edge_type,
            flipped: flipped != edge.flipped,
        }
    }
}

/// The full tileset: an arena of edge types and tile types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tileset {
    /// Edge types, addressed by [`EdgeTypeId`].
    pub edge_types: Vec<EdgeType>,
    /// Tile types, addressed by [`TileTypeId`].
    pub tile_types: Vec<TileType>,
    /// Symmetries used by tiles that do not set their own.
    pub default_transform_permission: TileTransformPermission,
}

impl Tileset {
    /// Gets an edge type, `None` if the id is out of bounds.
    pub fn edge_type(&self, id: EdgeTypeId) -> Option<&EdgeType> {
        self.edge_types.get(id.0)
    }

    /// Gets a tile type, `None` if the id is out of bounds.
    pub fn tile_type(&self, id: TileTypeId) -> Option<&TileType> {
        self.tile_types.get(id.0)
    }

    /// Effective transform permission of a tile.
    pub fn permission_of(&self, tile: &TileType) -> TileTransformPermission {
        tile.transform_permission
            .unwrap_or(self.default_transform_permission)
    }

    /// Signed Wang label of a transformed edge: `±(index + 1)`, or 0 when the
    /// edge has no (or a dangling) edge type.
    pub fn label_of(&self, edge: &TransformedEdge) -> i32 {
        let Some(id) = edge.edge_type.filter(|id| id.0 < self.edge_types.len()) else {
            return 0;
        };
        let label = id.0 as i32 + 1;
        if edge.flipped {
            -label
        } else {
            label
        }
    }
}
