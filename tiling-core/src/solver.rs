//! Wave function collapse over an arbitrary slot topology.

use crate::ruleset::WangRuleset;
use crate::superposition::TileSuperposition;
use crate::topology::{SlotTopology, RELATION_COUNT};
use crate::SolverError;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tiling_rules::LabelSet;

/// What surrounds a slot: for each relation, the neighbor's candidates and the
/// relation through which the neighbor sees the slot, or `None` on a boundary.
pub type Neighborhood = [Option<(TileSuperposition, usize)>; RELATION_COUNT];

/// Limits and seeding of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverOptions {
    /// Observations allowed per attempt.
    pub max_steps: usize,
    /// Attempts before giving up. Also caps the slots that may fail initial constraints.
    pub max_attempts: usize,
    /// Seed of the first attempt. Attempt `i` uses `random_seed + i`.
    pub random_seed: u64,
    /// Extra consistency checks while solving.
    pub debug: bool,
}

impl SolverOptions {
    /// Creates a new builder for `SolverOptions`.
    pub fn builder() -> SolverOptionsBuilder {
        SolverOptionsBuilder::default()
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_steps: 100_000,
            max_attempts: 20,
            random_seed: 0,
            debug: false,
        }
    }
}

/// Builder for [`SolverOptions`].
#[derive(Debug, Default)]
pub struct SolverOptionsBuilder {
    max_steps: Option<usize>,
    max_attempts: Option<usize>,
    random_seed: Option<u64>,
    debug: bool,
}

impl SolverOptionsBuilder {
    /// Sets the number of observations allowed per attempt.
    pub fn max_steps(mut self, max: usize) -> Self {
        self.max_steps = Some(max);
        self
    }

    /// Sets the number of attempts.
    pub fn max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = Some(max);
        self
    }

    /// Sets the seed of the random number generator.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Enables extra consistency checks.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builds the `SolverOptions` instance.
    pub fn build(self) -> SolverOptions {
        let defaults = SolverOptions::default();
        SolverOptions {
            max_steps: self.max_steps.unwrap_or(defaults.max_steps),
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            random_seed: self.random_seed.unwrap_or(defaults.random_seed),
            debug: self.debug,
        }
    }
}

/// Counters gathered since the last reset.
#[derive(Debug, Clone, Default)]
pub struct SolverStats {
    /// Attempts started.
    pub attempt_count: usize,
    /// Calls to observe, including the final one that finds nothing left.
    pub observe_count: usize,
    /// Observations that had to pick among several candidates.
    pub choice_count: usize,
    /// Neighborhood of every slot that ran out of candidates.
    pub impossible_neighborhoods: Vec<Neighborhood>,
    /// Seed each attempt's random stream started from.
    pub attempt_seeds: Vec<u64>,
}

/// Outcome of a single [`Solver::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every slot is collapsed.
    Finished,
    /// A slot ran out of candidates.
    Failed,
    /// Progress was made; keep stepping.
    Continue,
}

/// The tiling solver. Holds one superposition per slot.
pub struct Solver<'a> {
    topology: &'a dyn SlotTopology,
    ruleset: &'a WangRuleset,
    options: SolverOptions,
    slots: Vec<TileSuperposition>,
    initial_slots: Vec<TileSuperposition>,
    rng: StdRng,
    seed: u64,
    stats: SolverStats,
}

impl<'a> Solver<'a> {
    /// Creates a solver with every slot fully undetermined.
    pub fn new(topology: &'a dyn SlotTopology, ruleset: &'a WangRuleset, options: SolverOptions) -> Self {
        let slots = vec![TileSuperposition::full(ruleset.variant_count()); topology.slot_count()];
        Self {
            topology,
            ruleset,
            options,
            initial_slots: slots.clone(),
            slots,
            rng: StdRng::seed_from_u64(options.random_seed),
            seed: options.random_seed,
            stats: SolverStats::default(),
        }
    }

    /// Current options.
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Mutable options, applied from the next reset or attempt.
    pub fn options_mut(&mut self) -> &mut SolverOptions {
        &mut self.options
    }

    /// Counters since the last reset.
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// Per-slot candidates.
    pub fn slots(&self) -> &[TileSuperposition] {
        &self.slots
    }

    /// The ruleset the solver was built with.
    pub fn ruleset(&self) -> &'a WangRuleset {
        self.ruleset
    }

    /// The topology the solver was built with.
    pub fn topology(&self) -> &'a dyn SlotTopology {
        self.topology
    }

    /// Uniform integer in `0..bound` from the solver's random stream. Returns 0 when `bound` is 0.
    pub fn rand_int(&mut self, bound: usize) -> usize {
        if bound == 0 {
            0
        } else {
            self.rng.gen_range(0..bound)
        }
    }

    fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Runs the whole solve: up to `max_attempts` attempts of up to `max_steps` observations.
    ///
    /// Returns `false` when the initial constraints cannot be met or when every attempt fails.
    pub fn solve(&mut self, reset_before: bool) -> bool {
        if reset_before && !self.reset(false) {
            warn!("Initial configuration cannot be solved");
            return false;
        }
        self.initial_slots = self.slots.clone();

        for attempt in 0..self.options.max_attempts {
            if attempt > 0 {
                self.restart();
                self.reseed(self.options.random_seed.wrapping_add(attempt as u64));
            }
            self.stats.attempt_seeds.push(self.seed);
            debug!("Attempt #{attempt} (seed {})", self.seed);

            if self.try_solve() {
                info!(
                    "Solved {} slots in {} attempt(s), {} choices",
                    self.slots.len(),
                    attempt + 1,
                    self.stats.choice_count
                );
                return true;
            }
        }

        warn!("Maximum number of attempts exceeded");
        false
    }

    /// Fills every slot, clears the stats, then applies initial constraints and
    /// propagates them. Reseeds the random stream unless `keep_existing` is set.
    ///
    /// Returns `false` if the initial configuration is already contradictory.
    pub fn reset(&mut self, keep_existing: bool) -> bool {
        for slot in &mut self.slots {
            slot.set_all();
        }
        if !keep_existing {
            self.reseed(self.options.random_seed);
        }
        self.stats = SolverStats::default();

        if !self.apply_initial_constraints() {
            debug!("Initial constraints cannot be met");
            return false;
        }

        let mut success = true;
        for slot in 0..self.slots.len() {
            if !self.propagate(slot) {
                debug!("Initial propagation failed from slot #{slot}");
                success = false;
                break;
            }
        }
        self.initial_slots = self.slots.clone();
        success
    }

    /// Restores the slots as they were right after the last reset (or solve start).
    pub fn restart(&mut self) {
        self.slots.clone_from(&self.initial_slots);
        if self.options.debug {
            debug!("Restart");
        }
    }

    /// Observes one slot and propagates the consequences.
    pub fn step(&mut self) -> Status {
        let Some(slot) = self.observe() else {
            return Status::Finished;
        };
        if self.propagate(slot) {
            Status::Continue
        } else {
            Status::Failed
        }
    }

    fn try_solve(&mut self) -> bool {
        self.stats.attempt_count += 1;
        for _ in 0..self.options.max_steps {
            match self.step() {
                Status::Finished => return true,
                Status::Failed => return false,
                Status::Continue => {}
            }
        }
        debug!("Step limit ({}) reached", self.options.max_steps);
        false
    }

    /// Collapses one of the least determined slots, returning its index, or
    /// `None` when every slot is collapsed (or empty).
    fn observe(&mut self) -> Option<usize> {
        self.stats.observe_count += 1;

        let mut min_count = usize::MAX;
        let mut candidates = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let count = slot.tile_count();
            if count <= 1 {
                continue;
            }
            if count < min_count {
                min_count = count;
                candidates.clear();
            }
            if count == min_count {
                candidates.push(index);
            }
        }
        if candidates.is_empty() {
            return None;
        }

        let pick = self.rand_int(candidates.len());
        let slot = candidates[pick];
        let choice = self.rand_int(min_count);
        let variant = self.slots[slot].nth(choice)?;
        self.slots[slot].collapse_to(variant);
        self.stats.choice_count += 1;

        if self.options.debug {
            debug!(
                "Observed slot #{slot} as {}",
                self.ruleset.table().variants().variant_repr(variant)
            );
        }
        Some(slot)
    }

    /// Propagates a change of `origin` to the whole topology.
    ///
    /// Returns `false` and records the neighborhood of the first slot that runs
    /// out of candidates.
    fn propagate(&mut self, origin: usize) -> bool {
        let mut stack = vec![origin];
        while let Some(slot) = stack.pop() {
            for relation in 0..RELATION_COUNT {
                let Some((neighbor, neighbor_relation)) = self.topology.neighbor_of(slot, relation) else {
                    continue;
                };
                let was_observed = self.slots[neighbor].is_collapsed();
                let allowed = self
                    .ruleset
                    .allowed_states(&self.slots[slot], relation, neighbor_relation);
                if self.slots[neighbor].mask_by(&allowed) {
                    if self.slots[neighbor].is_empty() {
                        self.log_impossible_neighborhood(neighbor, was_observed);
                        return false;
                    }
                    stack.push(neighbor);
                }
            }
        }
        true
    }

    fn log_impossible_neighborhood(&mut self, slot: usize, was_observed: bool) {
        let neighborhood = self.neighborhood(slot);
        if self.options.debug && !was_observed && !self.check_impossible_neighborhood(&neighborhood) {
            warn!("Slot #{slot} emptied although some variant fits its neighborhood");
        }
        self.stats.impossible_neighborhoods.push(neighborhood);
    }

    /// Restricts boundary sides to border labels and interior sides to
    /// labels that are not border-only.
    ///
    /// Returns `false` if some slot ends up empty. Gives up once `max_attempts`
    /// slots have failed.
    pub fn apply_initial_constraints(&mut self) -> bool {
        let ruleset = self.ruleset;
        let mut failures = 0;
        let restrict_interior = !ruleset.border_only_labels().is_empty();

        for slot in 0..self.slots.len() {
            if failures > 0 && self.has_empty_neighbor(slot) {
                continue;
            }

            for relation in 0..RELATION_COUNT {
                let mask = match self.topology.neighbor_of(slot, relation) {
                    None => ruleset.border_mask(relation),
                    Some(_) if restrict_interior => ruleset.interior_mask(relation),
                    Some(_) => None,
                };
                if let Some(mask) = mask {
                    self.slots[slot].mask_by(mask);
                }
            }

            if self.slots[slot].is_empty() {
                debug!("Slot #{slot} cannot satisfy its boundary constraints");
                let neighborhood = self.neighborhood(slot);
                self.stats.impossible_neighborhoods.push(neighborhood);
                failures += 1;
                if failures >= self.options.max_attempts {
                    warn!("Too many slots violate initial constraints, giving up");
                    return false;
                }
            }
        }

        if cfg!(debug_assertions) && failures == 0 && !self.check_integrity(true) {
            warn!("Integrity check failed after initial constraints");
        }
        failures == 0
    }

    fn has_empty_neighbor(&self, slot: usize) -> bool {
        (0..RELATION_COUNT).any(|relation| {
            self.topology
                .neighbor_of(slot, relation)
                .is_some_and(|(n, _)| self.slots[n].is_empty())
        })
    }

    /// Candidates around `slot`.
    pub fn neighborhood(&self, slot: usize) -> Neighborhood {
        std::array::from_fn(|relation| {
            self.topology
                .neighbor_of(slot, relation)
                .map(|(n, back)| (self.slots[n].clone(), back))
        })
    }

    /// Labels each neighbor may show toward the slot; border labels on a boundary.
    pub fn neighborhood_labels(&self, neighborhood: &Neighborhood) -> [LabelSet; RELATION_COUNT] {
        std::array::from_fn(|relation| match &neighborhood[relation] {
            None => self.ruleset.border_labels().clone(),
            Some((states, back)) => states.iter().map(|v| self.ruleset.label(v, *back)).collect(),
        })
    }

    /// Whether `variant` mates with some label on every side.
    pub fn fits_in_neighborhood(&self, variant: usize, labels: &[LabelSet; RELATION_COUNT]) -> bool {
        (0..RELATION_COUNT).all(|relation| labels[relation].contains(&-self.ruleset.label(variant, relation)))
    }

    /// Whether no variant at all fits `neighborhood`.
    pub fn check_impossible_neighborhood(&self, neighborhood: &Neighborhood) -> bool {
        let labels = self.neighborhood_labels(neighborhood);
        !(0..self.ruleset.variant_count()).any(|v| self.fits_in_neighborhood(v, &labels))
    }

    /// Compares each slot's candidates with what fits its neighborhood.
    ///
    /// With `allow_incompatible`, collapsed slots are skipped and a slot only
    /// fails when it lacks a variant that fits. Otherwise a collapsed slot fails
    /// when its variant does not fit, and any other slot fails unless its
    /// candidates are exactly the fitting variants.
    pub fn check_integrity(&self, allow_incompatible: bool) -> bool {
        for slot in 0..self.slots.len() {
            let states = &self.slots[slot];
            let collapsed = states.is_collapsed();
            if allow_incompatible && collapsed {
                continue;
            }
            let labels = self.neighborhood_labels(&self.neighborhood(slot));
            for variant in 0..self.ruleset.variant_count() {
                let fits = self.fits_in_neighborhood(variant, &labels);
                let contains = states.contains(variant);
                let broken = if allow_incompatible {
                    fits && !contains
                } else if collapsed {
                    contains && !fits
                } else {
                    contains != fits
                };
                if broken {
                    warn!(
                        "Integrity: slot #{slot} variant {} (fits: {fits}, present: {contains})",
                        self.ruleset.table().variants().variant_repr(variant)
                    );
                    return false;
                }
            }
        }
        true
    }

    /// Checks that every candidate of every slot has a compatible candidate in each neighbor.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Inconsistency`] for the first violation found.
    pub fn check_local_consistency(&self) -> Result<(), SolverError> {
        for (slot, states) in self.slots.iter().enumerate() {
            for relation in 0..RELATION_COUNT {
                let Some((neighbor, neighbor_relation)) = self.topology.neighbor_of(slot, relation) else {
                    continue;
                };
                for variant in states.iter() {
                    let supported = self.slots[neighbor]
                        .iter()
                        .any(|other| self.ruleset.allows(variant, relation, other, neighbor_relation));
                    if !supported {
                        return Err(SolverError::Inconsistency {
                            slot,
                            variant: self.ruleset.table().variants().variant_repr(variant),
                            neighbor,
                            relation,
                            neighbor_relation,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether every slot holds exactly one variant.
    pub fn is_solved(&self) -> bool {
        self.slots.iter().all(TileSuperposition::is_collapsed)
    }

    /// First candidate of each slot, `None` for empty slots.
    pub fn assignments(&self) -> Vec<Option<usize>> {
        self.slots.iter().map(TileSuperposition::first).collect()
    }
}
