use super::{SlotTopology, RELATION_COUNT};

/// Regular `width x height` grid. Slot `(x, y)` has index `x + y * width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSlotTopology {
    width: usize,
    height: usize,
}

impl GridSlotTopology {
    /// Creates a grid topology.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Grid width in slots.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in slots.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Slot index of `(x, y)`, `None` outside the grid.
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| x + y * self.width)
    }
}

impl SlotTopology for GridSlotTopology {
    fn slot_count(&self) -> usize {
        self.width * self.height
    }

    fn neighbor_of(&self, slot: usize, relation: usize) -> Option<(usize, usize)> {
        if slot >= self.slot_count() {
            return None;
        }
        let (x, y) = (slot % self.width, slot / self.width);
        let (nx, ny) = match relation {
            0 => (x.checked_add(1)?, y),
            1 => (x, y.checked_add(1)?),
            2 => (x.checked_sub(1)?, y),
            3 => (x, y.checked_sub(1)?),
            _ => return None,
        };
        let neighbor = self.index(nx, ny)?;
        Some((neighbor, (relation + 2) % RELATION_COUNT))
    }
}
