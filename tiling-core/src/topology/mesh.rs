use super::{SlotTopology, TopologyError, RELATION_COUNT};
use std::collections::HashMap;

/// Adjacency of one quad face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshFace {
    /// Face across each side, `None` on a boundary.
    pub neighbors: [Option<usize>; RELATION_COUNT],
    /// Side of the neighbor through which it sees this face.
    pub relations: [usize; RELATION_COUNT],
}

impl MeshFace {
    /// Converts the raw arrays of a mesh structure, where a negative neighbor marks a boundary.
    pub fn from_raw(neighbors: [i64; RELATION_COUNT], relations: [i64; RELATION_COUNT]) -> Self {
        let mut face = Self::default();
        for k in 0..RELATION_COUNT {
            face.neighbors[k] = usize::try_from(neighbors[k]).ok();
            face.relations[k] = usize::try_from(relations[k]).unwrap_or(0);
        }
        face
    }
}

/// Topology of an arbitrary quad mesh.
///
/// Side `k` of a face is its edge from vertex `k` to vertex `k + 1`. Across an
/// irregular vertex, the side through which the neighbor sees a face back can
/// be any of the four.
#[derive(Debug, Clone, Default)]
pub struct MeshSlotTopology {
    faces: Vec<MeshFace>,
}

impl MeshSlotTopology {
    /// Builds the topology from quads given as counter-clockwise vertex loops.
    ///
    /// # Errors
    ///
    /// Fails on a repeated vertex in a face, on an edge shared by more than two
    /// faces and on neighboring faces with opposite winding.
    pub fn from_quads(quads: &[[usize; RELATION_COUNT]]) -> Result<Self, TopologyError> {
        let mut edge_use: HashMap<(usize, usize), usize> = HashMap::new();
        for (face, quad) in quads.iter().enumerate() {
            for k in 0..RELATION_COUNT {
                if quad[..k].contains(&quad[k]) {
                    return Err(TopologyError::DegenerateFace(face));
                }
            }
            for k in 0..RELATION_COUNT {
                let (a, b) = (quad[k], quad[(k + 1) % RELATION_COUNT]);
                let count = edge_use.entry((a.min(b), a.max(b))).or_default();
                *count += 1;
                if *count > 2 {
                    return Err(TopologyError::NonManifoldEdge(a.min(b), a.max(b)));
                }
            }
        }

        let mut half_edges: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        for (face, quad) in quads.iter().enumerate() {
            for k in 0..RELATION_COUNT {
                let key = (quad[k], quad[(k + 1) % RELATION_COUNT]);
                if let Some(&(other, _)) = half_edges.get(&key) {
                    return Err(TopologyError::InconsistentOrientation {
                        face,
                        other,
                        from: key.0,
                        to: key.1,
                    });
                }
                half_edges.insert(key, (face, k));
            }
        }

        let faces = quads
            .iter()
            .map(|quad| {
                let mut face = MeshFace::default();
                for k in 0..RELATION_COUNT {
                    let twin = (quad[(k + 1) % RELATION_COUNT], quad[k]);
                    if let Some(&(neighbor, relation)) = half_edges.get(&twin) {
                        face.neighbors[k] = Some(neighbor);
                        face.relations[k] = relation;
                    }
                }
                face
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Built mesh topology: {} faces, {} boundary sides",
            faces.len(),
            faces
                .iter()
                .flat_map(|f| f.neighbors.iter())
                .filter(|n| n.is_none())
                .count()
        );
        Ok(Self { faces })
    }

    /// Builds the topology from explicit per-face adjacency.
    ///
    /// # Errors
    ///
    /// Fails if a neighbor index is out of range or a neighbor does not point back.
    pub fn from_faces(faces: Vec<MeshFace>) -> Result<Self, TopologyError> {
        for (index, face) in faces.iter().enumerate() {
            for relation in 0..RELATION_COUNT {
                let Some(neighbor) = face.neighbors[relation] else {
                    continue;
                };
                let other = faces.get(neighbor).ok_or(TopologyError::MissingNeighbor {
                    face: index,
                    relation,
                    neighbor,
                })?;
                let back = face.relations[relation];
                if back >= RELATION_COUNT
                    || other.neighbors[back] != Some(index)
                    || other.relations[back] != relation
                {
                    return Err(TopologyError::NonReciprocal {
                        face: index,
                        relation,
                    });
                }
            }
        }
        Ok(Self { faces })
    }

    /// Per-face adjacency.
    pub fn faces(&self) -> &[MeshFace] {
        &self.faces
    }
}

impl SlotTopology for MeshSlotTopology {
    fn slot_count(&self) -> usize {
        self.faces.len()
    }

    fn neighbor_of(&self, slot: usize, relation: usize) -> Option<(usize, usize)> {
        let face = self.faces.get(slot)?;
        let neighbor = (*face.neighbors.get(relation)?)?;
        Some((neighbor, face.relations[relation]))
    }
}
