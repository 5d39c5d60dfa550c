use bitvec::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The set of variants still possible for one slot.
///
/// A fixed-width bitset: bit `i` is set while variant `i` is a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileSuperposition {
    bits: BitVec<usize, Lsb0>,
}

impl TileSuperposition {
    /// Every variant possible.
    pub fn full(width: usize) -> Self {
        Self {
            bits: bitvec![usize, Lsb0; 1; width],
        }
    }

    /// No variant possible.
    pub fn empty(width: usize) -> Self {
        Self {
            bits: bitvec![usize, Lsb0; 0; width],
        }
    }

    /// Only `variant` possible. Out-of-range variants give an empty set.
    pub fn singleton(width: usize, variant: usize) -> Self {
        let mut s = Self::empty(width);
        s.insert(variant);
        s
    }

    /// Number of variants the set ranges over.
    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// Number of candidates left.
    pub fn tile_count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Whether no candidate is left, i.e. the slot is contradictory.
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Whether exactly one candidate is left.
    pub fn is_collapsed(&self) -> bool {
        self.tile_count() == 1
    }

    /// Whether `variant` is a candidate.
    #[inline]
    pub fn contains(&self, variant: usize) -> bool {
        self.bits.get(variant).is_some_and(|b| *b)
    }

    /// Adds a candidate. Ignored when out of range.
    pub fn insert(&mut self, variant: usize) {
        if variant < self.bits.len() {
            self.bits.set(variant, true);
        }
    }

    /// Removes a candidate. Ignored when out of range.
    pub fn remove(&mut self, variant: usize) {
        if variant < self.bits.len() {
            self.bits.set(variant, false);
        }
    }

    /// Makes every variant a candidate again.
    pub fn set_all(&mut self) {
        self.bits.fill(true);
    }

    /// Removes every candidate.
    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// Keeps only `variant`.
    pub fn collapse_to(&mut self, variant: usize) {
        self.clear();
        self.insert(variant);
    }

    /// Intersects with `mask` and reports whether anything was removed.
    ///
    /// Bits past the end of a shorter mask count as unset.
    pub fn mask_by(&mut self, mask: &Self) -> bool {
        let before = self.tile_count();
        let shared = self.bits.len().min(mask.bits.len());
        self.bits[..shared] &= &mask.bits[..shared];
        self.bits[shared..].fill(false);
        self.tile_count() != before
    }

    /// Adds every candidate of `other`.
    pub fn union_with(&mut self, other: &Self) {
        let shared = self.bits.len().min(other.bits.len());
        self.bits[..shared] |= &other.bits[..shared];
    }

    /// Candidates in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Smallest candidate.
    pub fn first(&self) -> Option<usize> {
        self.bits.first_one()
    }

    /// The `n`-th candidate in increasing order.
    pub fn nth(&self, n: usize) -> Option<usize> {
        self.bits.iter_ones().nth(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_and_empty() {
        let full = TileSuperposition::full(70);
        assert_eq!(full.tile_count(), 70);
        assert!(full.contains(69));
        assert!(!full.contains(70));
        let empty = TileSuperposition::empty(70);
        assert!(empty.is_empty());
        assert_eq!(empty.first(), None);
    }

    #[test]
    fn test_mask_reports_change() {
        let mut a = TileSuperposition::full(8);
        let mut mask = TileSuperposition::empty(8);
        mask.insert(2);
        mask.insert(5);
        assert!(a.mask_by(&mask));
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![2, 5]);
        assert!(!a.mask_by(&mask));
        assert_eq!(a.nth(1), Some(5));
    }

    #[test]
    fn test_union_and_collapse() {
        let mut a = TileSuperposition::singleton(10, 3);
        a.union_with(&TileSuperposition::singleton(10, 7));
        assert_eq!(a.tile_count(), 2);
        a.collapse_to(7);
        assert!(a.is_collapsed());
        assert_eq!(a.first(), Some(7));
        a.remove(7);
        assert!(a.is_empty());
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut a = TileSuperposition::empty(4);
        a.insert(9);
        assert!(a.is_empty());
        assert_eq!(TileSuperposition::singleton(4, 4).tile_count(), 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn superposition(width: usize, bits: &[bool]) -> TileSuperposition {
        let mut s = TileSuperposition::empty(width);
        for (variant, _) in bits.iter().enumerate().filter(|(_, &b)| b) {
            s.insert(variant);
        }
        s
    }

    proptest! {
        #[test]
        fn masking_is_idempotent(a in proptest::collection::vec(any::<bool>(), 40), m in proptest::collection::vec(any::<bool>(), 40)) {
            let mask = superposition(40, &m);
            let mut once = superposition(40, &a);
            once.mask_by(&mask);
            let mut twice = once.clone();
            prop_assert!(!twice.mask_by(&mask));
            prop_assert_eq!(twice, once.clone());
            for variant in once.iter() {
                prop_assert!(a[variant] && m[variant]);
            }
        }
    }
}
