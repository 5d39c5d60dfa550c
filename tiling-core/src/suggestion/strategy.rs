use super::tile::{Tile, Transform};
use super::votes::{consolidate_votes, find_best, neighborhood_label_sets, subsample, wang_label_superposition, VoteTable};
use super::{materialize, SuggestionError, SuggestionStrategy};
use crate::ruleset::WangRuleset;
use crate::solver::Solver;
use crate::topology::RELATION_COUNT;
use log::{debug, info, warn};
#[cfg(feature = "serde")]
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tiling_rules::{LabelSet, Tileset, TilesetController};

/// Runs a [`SuggestionStrategy`] against the outcome of a failed solve.
///
/// Random choices are drawn from the solver's random stream, so a suggestion
/// is reproducible from the solver seed.
#[derive(Debug, Clone, Default)]
pub struct TileSuggester {
    strategy: SuggestionStrategy,
    debug_path: Option<PathBuf>,
}

/// Everything the voting strategies work from.
struct Ballot {
    label_sets: Vec<[LabelSet; RELATION_COUNT]>,
    votes: VoteTable,
}

#[cfg(feature = "serde")]
#[derive(Serialize)]
struct SuggestionDebugInfo<'a> {
    impossible_neighborhood_labels: &'a [[LabelSet; RELATION_COUNT]],
    votes: &'a VoteTable,
    tile: Tile,
    alternative_tile: Tile,
}

impl TileSuggester {
    /// Creates a suggester for `strategy`.
    pub fn new(strategy: SuggestionStrategy) -> Self {
        Self {
            strategy,
            debug_path: None,
        }
    }

    /// Dumps the votes of the voting strategies as JSON to `path`.
    #[must_use]
    pub fn with_debug_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    /// The strategy in use.
    pub fn strategy(&self) -> SuggestionStrategy {
        self.strategy
    }

    /// Suggests a tile that would have filled the slots the last solve of
    /// `solver` failed on.
    ///
    /// The tileset is left as it was, even by [`SuggestionStrategy::BruteForce`].
    ///
    /// # Errors
    ///
    /// Returns [`SuggestionError::NoImpossibleNeighborhood`] when the solver has
    /// not failed anywhere, or a strategy specific error when it cannot pick.
    pub fn suggest(&self, solver: &mut Solver<'_>, controller: &mut TilesetController) -> Result<Tile, SuggestionError> {
        if solver.stats().impossible_neighborhoods.is_empty() {
            warn!("The generation must have failed for the tile suggestion mechanism to work");
            return Err(SuggestionError::NoImpossibleNeighborhood);
        }
        debug!(
            "Suggesting from {} impossible neighborhood(s) with {}",
            solver.stats().impossible_neighborhoods.len(),
            self.strategy
        );

        let tile = match self.strategy {
            SuggestionStrategy::Random => suggest_random(solver, controller.tileset().edge_types.len())?,
            SuggestionStrategy::GuidedRandom
            | SuggestionStrategy::GreedyNaive
            | SuggestionStrategy::GreedyStochastic => self.suggest_guided(solver),
            SuggestionStrategy::Voting
            | SuggestionStrategy::VotingGreedySanityCheck
            | SuggestionStrategy::VotingRandomSanityCheck => {
                let ballot = ballot(solver, controller.tileset());
                self.pick_voted(self.strategy, solver, &ballot)?
            }
            SuggestionStrategy::BruteForce => self.suggest_brute_force(solver, controller)?,
        };
        info!("Suggested tile {tile} ({})", self.strategy);
        Ok(tile)
    }

    fn suggest_guided(&self, solver: &mut Solver<'_>) -> Tile {
        let count = solver.stats().impossible_neighborhoods.len();
        let pick = if self.strategy == SuggestionStrategy::GuidedRandom {
            solver.rand_int(count)
        } else {
            0
        };
        let neighborhood = solver.stats().impossible_neighborhoods[pick].clone();
        let random_label = matches!(
            self.strategy,
            SuggestionStrategy::GuidedRandom | SuggestionStrategy::GreedyStochastic
        );

        let mut tile = Tile::default();
        for (relation, label) in tile.labels.iter_mut().enumerate() {
            let labels = wang_label_superposition(neighborhood[relation].as_ref(), solver.ruleset());
            if labels.is_empty() {
                warn!("Empty possible label set on relation {relation}");
                *label = 0;
                continue;
            }
            let index = if random_label {
                solver.rand_int(labels.len())
            } else {
                0
            };
            *label = labels.iter().nth(index).map_or(0, |l| -l);
        }
        tile
    }

    fn pick_voted(
        &self,
        strategy: SuggestionStrategy,
        solver: &mut Solver<'_>,
        ballot: &Ballot,
    ) -> Result<Tile, SuggestionError> {
        let votes = &ballot.votes;
        match strategy {
            SuggestionStrategy::VotingGreedySanityCheck => {
                votes.entry_at(0).map(|e| e.tile).ok_or(SuggestionError::EmptyVotes)
            }
            SuggestionStrategy::VotingRandomSanityCheck => {
                let index = solver.rand_int(votes.len());
                votes.entry_at(index).map(|e| e.tile).ok_or(SuggestionError::EmptyVotes)
            }
            _ => {
                let blacklist = existing_tiles(solver.ruleset());
                let (tile, alternative_tile) = find_best(votes, &blacklist);
                debug!("Alternative tile: {alternative_tile}");
                if let Some(path) = &self.debug_path {
                    write_debug_info(path, ballot, tile, alternative_tile);
                }
                Ok(tile)
            }
        }
    }

    fn suggest_brute_force(
        &self,
        solver: &mut Solver<'_>,
        controller: &mut TilesetController,
    ) -> Result<Tile, SuggestionError> {
        let ballot = ballot(solver, controller.tileset());
        let blacklist = existing_tiles_any_transform(solver.ruleset());
        let topology = solver.topology();
        let options = *solver.options();

        for entry in ballot.votes.iter() {
            if blacklist.contains(&entry.tile) {
                debug!("Skipping {}, it is a transform of an existing tile", entry.tile);
                continue;
            }
            let snapshot = controller.tileset().clone();
            if let Err(e) = materialize(&entry.tile, controller) {
                warn!("Cannot try {}: {e}", entry.tile);
                continue;
            }
            let ruleset = WangRuleset::from_tileset(controller.tileset());
            let solved = Solver::new(topology, &ruleset, options).solve(true);
            controller.restore(snapshot);
            if solved {
                info!("Tile {} makes the topology solvable", entry.tile);
                return Ok(entry.tile);
            }
            debug!("Tile {} does not help", entry.tile);
        }

        info!("No single tile makes the topology solvable, falling back to voting");
        self.pick_voted(SuggestionStrategy::Voting, solver, &ballot)
    }
}

fn suggest_random(solver: &mut Solver<'_>, edge_type_count: usize) -> Result<Tile, SuggestionError> {
    if edge_type_count == 0 {
        return Err(SuggestionError::NoEdgeTypes);
    }
    let mut tile = Tile::default();
    for label in &mut tile.labels {
        let sign = if solver.rand_int(2) == 0 { -1 } else { 1 };
        let magnitude = i32::try_from(1 + solver.rand_int(edge_type_count)).unwrap_or(i32::MAX);
        *label = sign * magnitude;
    }
    Ok(tile)
}

/// Lets the (subsampled) impossible neighborhoods of `solver` vote, using the
/// transforms the tileset grants new tiles by default.
fn ballot(solver: &Solver<'_>, tileset: &Tileset) -> Ballot {
    let neighborhoods = subsample(&solver.stats().impossible_neighborhoods);
    let label_sets = neighborhood_label_sets(&neighborhoods, solver.ruleset());
    let transforms = Transform::allowed(tileset.default_transform_permission);
    let mut votes = VoteTable::new();
    consolidate_votes(&label_sets, &transforms, &mut votes);
    debug!("{} candidate tile(s) from {} neighborhood(s)", votes.len(), label_sets.len());
    Ballot { label_sets, votes }
}

fn existing_tiles(ruleset: &WangRuleset) -> HashSet<Tile> {
    ruleset.table().rows().map(|row| Tile::new(*row)).collect()
}

fn existing_tiles_any_transform(ruleset: &WangRuleset) -> HashSet<Tile> {
    let transforms = Transform::all();
    ruleset
        .table()
        .rows()
        .flat_map(|row| {
            let tile = Tile::new(*row);
            transforms.iter().map(move |t| t.apply(&tile))
        })
        .collect()
}

#[cfg(feature = "serde")]
fn write_debug_info(path: &Path, ballot: &Ballot, tile: Tile, alternative_tile: Tile) {
    let info = SuggestionDebugInfo {
        impossible_neighborhood_labels: &ballot.label_sets,
        votes: &ballot.votes,
        tile,
        alternative_tile,
    };
    match std::fs::File::create(path) {
        Ok(file) => {
            if let Err(e) = serde_json::to_writer_pretty(std::io::BufWriter::new(file), &info) {
                warn!("Could not write suggestion debug info to {}: {e}", path.display());
            }
        }
        Err(e) => warn!("Could not create {}: {e}", path.display()),
    }
}

#[cfg(not(feature = "serde"))]
fn write_debug_info(path: &Path, _ballot: &Ballot, _tile: Tile, _alternative_tile: Tile) {
    warn!(
        "Suggestion debug output to {} needs the serde feature",
        path.display()
    );
}
