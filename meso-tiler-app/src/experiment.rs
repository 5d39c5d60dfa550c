//! Strategy comparison: for each suggestion strategy, repeat the suggestion
//! loop from the same tileset with different seeds and count the tiles it had
//! to add.

use crate::execution::solve_with_suggestions;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tiling_core::tiling_rules::{Tileset, TilesetController};
use tiling_core::{SlotTopology, SolverOptions, SuggestionStrategy, TileSuggester};

/// Marks a failed iteration in [`StrategyReport::generated_tiles_per_iteration`].
pub const FAILED_ITERATION: i64 = -1;

/// Outcome of one strategy over all iterations.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    /// Strategy under test.
    pub strategy: SuggestionStrategy,
    /// Iterations actually run.
    pub iterations: usize,
    /// Tiles added per iteration, or [`FAILED_ITERATION`].
    pub generated_tiles_per_iteration: Vec<i64>,
    /// Iterations that ended with a tiling.
    pub success_count: usize,
    /// Mean tiles added over successful iterations.
    pub mean_generated_tiles: Option<f64>,
    /// Population standard deviation of the same.
    pub stddev_generated_tiles: Option<f64>,
    /// The tileset already tiles, so a single iteration was run.
    pub trivial: bool,
    /// Mean time spent suggesting per iteration, in milliseconds.
    pub average_suggestion_time_ms: Option<f64>,
}

/// The full experiment.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    /// Tileset file the experiment started from.
    pub tileset: PathBuf,
    /// Slots of the topology.
    pub slot_count: usize,
    /// Seed of iteration 0.
    pub base_seed: u64,
    /// One entry per strategy, in the requested order.
    pub strategies: Vec<StrategyReport>,
}

struct IterationResult {
    generated_tiles: i64,
    suggestion_time: Option<Duration>,
}

fn run_iteration(
    tileset: &Tileset,
    topology: &dyn SlotTopology,
    options: SolverOptions,
    suggester: &TileSuggester,
    max_suggestions: usize,
    iteration: usize,
) -> IterationResult {
    let options = SolverOptions {
        random_seed: options.random_seed.wrapping_add(iteration as u64),
        ..options
    };
    let mut controller = TilesetController::new(tileset.clone());
    match solve_with_suggestions(&mut controller, topology, options, suggester, max_suggestions) {
        Ok(outcome) => IterationResult {
            generated_tiles: if outcome.solved {
                outcome.suggested.len() as i64
            } else {
                FAILED_ITERATION
            },
            suggestion_time: Some(outcome.suggestion_time),
        },
        Err(e) => {
            log::warn!("{} iteration {iteration} failed: {e}", suggester.strategy());
            IterationResult {
                generated_tiles: FAILED_ITERATION,
                suggestion_time: None,
            }
        }
    }
}

/// Runs `iterations` independent suggestion loops with `strategy`.
///
/// Iteration `i` seeds its solver with `options.random_seed + i`. Iteration 0
/// runs first; when it needs no suggestion the strategy is reported trivial and
/// nothing else runs. The remaining iterations run in parallel.
pub fn run_strategy(
    tileset: &Tileset,
    topology: &(dyn SlotTopology + Sync),
    options: SolverOptions,
    strategy: SuggestionStrategy,
    iterations: usize,
    max_suggestions: usize,
) -> StrategyReport {
    log::info!("Testing strategy {strategy} over {iterations} iterations");
    let suggester = TileSuggester::new(strategy);

    let mut results = Vec::with_capacity(iterations);
    if iterations > 0 {
        results.push(run_iteration(tileset, topology, options, &suggester, max_suggestions, 0));
    }
    let trivial = results.first().is_some_and(|r| r.generated_tiles == 0);
    if trivial {
        log::info!("Tileset already tiles the topology, skipping the remaining iterations");
    } else {
        let rest: Vec<IterationResult> = (1..iterations)
            .into_par_iter()
            .map(|i| run_iteration(tileset, topology, options, &suggester, max_suggestions, i))
            .collect();
        results.extend(rest);
    }

    let generated: Vec<i64> = results.iter().map(|r| r.generated_tiles).collect();
    let successes: Vec<f64> = generated
        .iter()
        .filter(|&&g| g != FAILED_ITERATION)
        .map(|&g| g as f64)
        .collect();
    let times: Vec<f64> = results
        .iter()
        .filter_map(|r| r.suggestion_time)
        .map(|t| t.as_secs_f64() * 1000.0)
        .collect();
    let mean_generated_tiles = mean(&successes);

    let report = StrategyReport {
        strategy,
        iterations: results.len(),
        success_count: successes.len(),
        stddev_generated_tiles: mean_generated_tiles.map(|m| std_dev(&successes, m)),
        mean_generated_tiles,
        generated_tiles_per_iteration: generated,
        trivial,
        average_suggestion_time_ms: mean(&times),
    };
    log::info!(
        "{strategy}: {}/{} successful",
        report.success_count,
        report.iterations
    );
    report
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiling_core::tiling_rules::{EdgeType, EdgeTypeId, TileEdge, TileTransformPermission, TileType};
    use tiling_core::GridSlotTopology;

    fn edge(id: usize, flipped: bool) -> TileEdge {
        TileEdge::new(EdgeTypeId(id), flipped)
    }

    fn lonely_tileset() -> Tileset {
        Tileset {
            edge_types: vec![EdgeType::default()],
            tile_types: vec![TileType::from_solved_edges([
                edge(0, false),
                edge(0, false),
                edge(0, false),
                edge(0, false),
            ])
            .with_permission(TileTransformPermission::NONE)],
            default_transform_permission: TileTransformPermission::NONE,
        }
    }

    fn plain_tileset() -> Tileset {
        Tileset {
            edge_types: vec![EdgeType::default()],
            tile_types: vec![TileType::from_solved_edges([
                edge(0, false),
                edge(0, false),
                edge(0, true),
                edge(0, true),
            ])],
            default_transform_permission: TileTransformPermission::NONE,
        }
    }

    #[test]
    fn test_mean_and_std_dev() {
        assert_eq!(mean(&[]), None);
        let values = [1.0, 3.0];
        let m = mean(&values).unwrap();
        assert!((m - 2.0).abs() < 1e-12);
        assert!((std_dev(&values, m) - 1.0).abs() < 1e-12);
        assert!(std_dev(&[4.0], 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_trivial_strategy_runs_once() {
        let topology = GridSlotTopology::new(3, 3);
        let report = run_strategy(
            &plain_tileset(),
            &topology,
            SolverOptions::default(),
            SuggestionStrategy::Voting,
            5,
            3,
        );
        assert!(report.trivial);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.generated_tiles_per_iteration, vec![0]);
        assert_eq!(report.success_count, 1);
        assert_eq!(report.mean_generated_tiles, Some(0.0));
    }

    #[test]
    fn test_strategy_needing_suggestions() {
        let topology = GridSlotTopology::new(2, 1);
        let report = run_strategy(
            &lonely_tileset(),
            &topology,
            SolverOptions::default(),
            SuggestionStrategy::Voting,
            3,
            2,
        );
        assert!(!report.trivial);
        assert_eq!(report.iterations, 3);
        assert_eq!(report.generated_tiles_per_iteration, vec![1, 1, 1]);
        assert_eq!(report.success_count, 3);
        assert_eq!(report.stddev_generated_tiles, Some(0.0));
        assert!(report.average_suggestion_time_ms.is_some());
    }

    #[test]
    fn test_exhausted_suggestions_count_as_failure() {
        let topology = GridSlotTopology::new(2, 1);
        let report = run_strategy(
            &lonely_tileset(),
            &topology,
            SolverOptions::default(),
            SuggestionStrategy::Voting,
            2,
            0,
        );
        assert_eq!(report.generated_tiles_per_iteration, vec![FAILED_ITERATION, FAILED_ITERATION]);
        assert_eq!(report.success_count, 0);
        assert_eq!(report.mean_generated_tiles, None);
        assert_eq!(report.stddev_generated_tiles, None);
    }
}
