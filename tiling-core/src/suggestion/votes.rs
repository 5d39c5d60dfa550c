use super::tile::{Tile, Transform, TransformRequirement};
use crate::ruleset::WangRuleset;
use crate::solver::Neighborhood;
use crate::superposition::TileSuperposition;
use crate::topology::RELATION_COUNT;
use log::{debug, error};
#[cfg(feature = "serde")]
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tiling_rules::LabelSet;

/// Neighborhoods beyond this count are thinned before voting.
pub const MAX_VOTING_NEIGHBORHOODS: usize = 20;

/// Votes gathered by one candidate tile.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VoteEntry {
    /// The candidate.
    pub tile: Tile,
    /// Votes per [`TransformRequirement::index`].
    pub counts: [usize; TransformRequirement::COUNT],
}

impl VoteEntry {
    /// Votes of all requirements together.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Votes cast without needing any symmetry.
    pub fn untransformed(&self) -> usize {
        self.counts[TransformRequirement::UNTRANSFORMED.index()]
    }
}

/// Candidate tiles with their votes, in first-vote order.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VoteTable {
    entries: Vec<VoteEntry>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<Tile, usize>,
}

impl VoteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one vote for `tile` under `requirement`.
    pub fn vote(&mut self, tile: Tile, requirement: TransformRequirement) {
        let entries = &mut self.entries;
        let position = *self.index.entry(tile).or_insert_with(|| {
            entries.push(VoteEntry {
                tile,
                counts: [0; TransformRequirement::COUNT],
            });
            entries.len() - 1
        });
        self.entries[position].counts[requirement.index()] += 1;
    }

    /// Number of distinct candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody voted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Votes of `tile`, if it got any.
    pub fn get(&self, tile: &Tile) -> Option<&VoteEntry> {
        self.index.get(tile).map(|&i| &self.entries[i])
    }

    /// The `n`-th candidate in first-vote order.
    pub fn entry_at(&self, n: usize) -> Option<&VoteEntry> {
        self.entries.get(n)
    }

    /// Candidates in first-vote order.
    pub fn iter(&self) -> impl Iterator<Item = &VoteEntry> {
        self.entries.iter()
    }
}

/// Ranking of a candidate. Compared field by field, see [`Score::is_better_than`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    /// Sides needing a new edge type. Fewer is better.
    pub new_edge_count: usize,
    /// Votes of all requirements. More is better.
    pub total_votes: usize,
    /// Flipped sides. Fewer is better.
    pub flip_count: usize,
    /// Votes needing no symmetry. More is better.
    pub untransformed_votes: usize,
}

impl Score {
    /// Scores a vote entry.
    pub fn of(entry: &VoteEntry) -> Self {
        Self {
            new_edge_count: entry.tile.new_edge_count(),
            total_votes: entry.total(),
            flip_count: entry.tile.flip_count(),
            untransformed_votes: entry.untransformed(),
        }
    }

    /// Strict lexicographic comparison.
    pub fn is_better_than(&self, other: &Self) -> bool {
        if self.new_edge_count != other.new_edge_count {
            return self.new_edge_count < other.new_edge_count;
        }
        if self.total_votes != other.total_votes {
            return self.total_votes > other.total_votes;
        }
        if self.flip_count != other.flip_count {
            return self.flip_count < other.flip_count;
        }
        self.untransformed_votes > other.untransformed_votes
    }
}

/// Labels a neighbor may show toward a slot, or the border labels when there is
/// no neighbor. Border-only labels never face a neighbor and are left out.
pub fn wang_label_superposition(
    neighbor: Option<&(TileSuperposition, usize)>,
    ruleset: &WangRuleset,
) -> LabelSet {
    match neighbor {
        None => ruleset.border_labels().clone(),
        Some((states, relation)) => states
            .iter()
            .map(|variant| ruleset.label(variant, *relation))
            .filter(|label| !ruleset.border_only_labels().contains(label))
            .collect(),
    }
}

/// Label sets of every side of every neighborhood.
pub fn neighborhood_label_sets(
    neighborhoods: &[&Neighborhood],
    ruleset: &WangRuleset,
) -> Vec<[LabelSet; RELATION_COUNT]> {
    neighborhoods
        .iter()
        .map(|n| std::array::from_fn(|relation| wang_label_superposition(n[relation].as_ref(), ruleset)))
        .collect()
}

/// Keeps about [`MAX_VOTING_NEIGHBORHOODS`] evenly spread items: when there are
/// more, only those whose 1-based position is a multiple of `len / MAX` remain.
pub fn subsample<T>(items: &[T]) -> Vec<&T> {
    if items.len() <= MAX_VOTING_NEIGHBORHOODS {
        return items.iter().collect();
    }
    let period = items.len() / MAX_VOTING_NEIGHBORHOODS;
    debug!("Subsampling {} neighborhoods with period {period}", items.len());
    items
        .iter()
        .enumerate()
        .filter(|(i, _)| (i + 1) % period == 0)
        .map(|(_, item)| item)
        .collect()
}

/// Lets every neighborhood vote for every tile that would fill it.
///
/// Each combination of one label per side (an empty side counting as 0) asks
/// for the tile showing the opposite labels. Every allowed transform then
/// votes for the canonical tile it would be derived from.
pub fn consolidate_votes(
    label_sets: &[[LabelSet; RELATION_COUNT]],
    transforms: &[Transform],
    votes: &mut VoteTable,
) {
    let zero = LabelSet::from([0]);
    for sets in label_sets {
        let sides: [&LabelSet; RELATION_COUNT] = std::array::from_fn(|relation| {
            if sets[relation].is_empty() {
                &zero
            } else {
                &sets[relation]
            }
        });
        let [s0, s1, s2, s3] = sides;
        for &l0 in s0 {
            for &l1 in s1 {
                for &l2 in s2 {
                    for &l3 in s3 {
                        let candidate = Tile::new([-l0, -l1, -l2, -l3]);
                        for transform in transforms {
                            votes.vote(transform.apply_inverse(&candidate), transform.requirements());
                        }
                    }
                }
            }
        }
    }
}

/// Best and second best candidates, skipping blacklisted ones.
///
/// A candidate only displaces the best when strictly better, so ties go to the
/// earliest voted. Both default to the all-zero tile.
pub fn find_best(votes: &VoteTable, blacklist: &HashSet<Tile>) -> (Tile, Tile) {
    let mut best: Option<(Tile, Score)> = None;
    let mut second = Tile::default();
    for entry in votes.iter() {
        if blacklist.contains(&entry.tile) {
            error!("Candidate {} is already in the tileset", entry.tile);
            continue;
        }
        let score = Score::of(entry);
        let improves = best.map_or(true, |(_, best_score)| score.is_better_than(&best_score));
        if improves {
            if let Some((previous, _)) = best {
                second = previous;
            }
            best = Some((entry.tile, score));
        }
    }
    (best.map(|(tile, _)| tile).unwrap_or_default(), second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiling_rules::{TileTransformPermission, WangTable};

    #[test]
    fn test_vote_table_keeps_first_vote_order() {
        let mut votes = VoteTable::new();
        let a = Tile::new([1, 1, 1, 1]);
        let b = Tile::new([2, 2, 2, 2]);
        votes.vote(b, TransformRequirement::UNTRANSFORMED);
        votes.vote(a, TransformRequirement::default());
        votes.vote(b, TransformRequirement {
            rotation: true,
            ..TransformRequirement::default()
        });
        assert_eq!(votes.len(), 2);
        assert_eq!(votes.entry_at(0).unwrap().tile, b);
        assert_eq!(votes.get(&b).unwrap().total(), 2);
        assert_eq!(votes.get(&b).unwrap().counts[4], 1);
        assert_eq!(votes.get(&a).unwrap().untransformed(), 1);
    }

    #[test]
    fn test_score_order() {
        let base = Score {
            new_edge_count: 1,
            total_votes: 5,
            flip_count: 2,
            untransformed_votes: 1,
        };
        let fewer_new = Score { new_edge_count: 0, total_votes: 0, ..base };
        assert!(fewer_new.is_better_than(&base));
        let more_votes = Score { total_votes: 6, flip_count: 4, ..base };
        assert!(more_votes.is_better_than(&base));
        let fewer_flips = Score { flip_count: 1, untransformed_votes: 0, ..base };
        assert!(fewer_flips.is_better_than(&base));
        assert!(!base.is_better_than(&base));
    }

    #[test]
    fn test_consolidate_single_neighborhood() {
        // One impossible slot: +x and -x see label 1, +y and -y are boundaries showing 2.
        let sets = [[
            LabelSet::from([1]),
            LabelSet::from([2]),
            LabelSet::from([1]),
            LabelSet::from([2]),
        ]];
        let mut votes = VoteTable::new();
        consolidate_votes(&sets, &[Transform::default()], &mut votes);
        assert_eq!(votes.len(), 1);
        assert_eq!(votes.entry_at(0).unwrap().tile, Tile::new([-1, -2, -1, -2]));

        let mut all = VoteTable::new();
        consolidate_votes(&sets, &Transform::allowed(TileTransformPermission::default()), &mut all);
        assert_eq!(all.iter().map(VoteEntry::total).sum::<usize>(), 16);
    }

    #[test]
    fn test_consolidate_empty_side_votes_zero() {
        let sets = [[
            LabelSet::new(),
            LabelSet::from([-1, 1]),
            LabelSet::from([1]),
            LabelSet::from([1]),
        ]];
        let mut votes = VoteTable::new();
        consolidate_votes(&sets, &[Transform::default()], &mut votes);
        let tiles: Vec<_> = votes.iter().map(|e| e.tile).collect();
        assert_eq!(tiles, vec![Tile::new([0, 1, -1, -1]), Tile::new([0, -1, -1, -1])]);
    }

    #[test]
    fn test_find_best() {
        let mut votes = VoteTable::new();
        let new_edge = Tile::new([0, 1, 1, 1]);
        let popular = Tile::new([1, -1, 1, -1]);
        let quiet = Tile::new([1, 1, 1, 1]);
        votes.vote(new_edge, TransformRequirement::UNTRANSFORMED);
        votes.vote(new_edge, TransformRequirement::UNTRANSFORMED);
        votes.vote(new_edge, TransformRequirement::UNTRANSFORMED);
        votes.vote(quiet, TransformRequirement::UNTRANSFORMED);
        votes.vote(popular, TransformRequirement::UNTRANSFORMED);
        votes.vote(popular, TransformRequirement::UNTRANSFORMED);

        assert_eq!(find_best(&votes, &HashSet::new()), (popular, quiet));
        let blacklist = HashSet::from([popular]);
        assert_eq!(find_best(&votes, &blacklist), (quiet, new_edge));
        assert_eq!(find_best(&VoteTable::new(), &blacklist), (Tile::default(), Tile::default()));
    }

    #[test]
    fn test_find_best_ties_keep_first() {
        let mut votes = VoteTable::new();
        let a = Tile::new([1, 2, 1, 2]);
        let b = Tile::new([2, 1, 2, 1]);
        votes.vote(a, TransformRequirement::UNTRANSFORMED);
        votes.vote(b, TransformRequirement::UNTRANSFORMED);
        assert_eq!(find_best(&votes, &HashSet::new()).0, a);
    }

    #[test]
    fn test_subsample() {
        let small: Vec<usize> = (0..20).collect();
        assert_eq!(subsample(&small).len(), 20);
        let large: Vec<usize> = (0..45).collect();
        let kept = subsample(&large);
        // period 2: 1-based positions 2, 4, ..., 44
        assert_eq!(kept.len(), 22);
        assert_eq!(*kept[0], 1);
    }

    #[test]
    fn test_label_superposition() {
        let ruleset = WangRuleset::new(WangTable::from_rows(
            vec![[1, 2, -1, -2], [3, 3, 3, 3]],
            LabelSet::from([3]),
            LabelSet::from([3]),
        ));
        assert_eq!(wang_label_superposition(None, &ruleset), LabelSet::from([3]));
        let both = (TileSuperposition::full(2), 0);
        assert_eq!(wang_label_superposition(Some(&both), &ruleset), LabelSet::from([1]));
        let second = (TileSuperposition::singleton(2, 1), 2);
        assert!(wang_label_superposition(Some(&second), &ruleset).is_empty());
    }
}
