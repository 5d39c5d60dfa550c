//! Run modes: a single tiling with suggestions, or the strategy comparison.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::experiment::{run_strategy, ExperimentReport};
use crate::{mesh_input, output};
use anyhow::Context;
use std::time::{Duration, Instant};
use tiling_core::tiling_rules::{loader::load_from_file, Tileset, TilesetController};
use tiling_core::{
    materialize, GridSlotTopology, MeshSlotTopology, SlotTopology, Solver, SolverOptions, Tile, TileSuggester,
    WangRuleset,
};

/// Slot topology shared by parallel iterations.
pub type SharedTopology = Box<dyn SlotTopology + Send + Sync>;

/// Result of solving with suggestions.
#[derive(Debug)]
pub struct TilingOutcome {
    /// Whether the last solve succeeded.
    pub solved: bool,
    /// Tiles added to the tileset, in order.
    pub suggested: Vec<Tile>,
    /// Variant of each slot after the last solve.
    pub assignments: Vec<Option<usize>>,
    /// Ruleset of the last solve.
    pub ruleset: WangRuleset,
    /// Time spent suggesting and adding tiles.
    pub suggestion_time: Duration,
}

/// Solves, and while that fails, adds a suggested tile and solves again.
///
/// Stops at the first success or after `max_suggestions` additions.
///
/// # Errors
///
/// Fails when no tile can be suggested or the suggestion cannot be added.
pub fn solve_with_suggestions(
    controller: &mut TilesetController,
    topology: &dyn SlotTopology,
    options: SolverOptions,
    suggester: &TileSuggester,
    max_suggestions: usize,
) -> Result<TilingOutcome, AppError> {
    let mut suggested = Vec::new();
    let mut suggestion_time = Duration::ZERO;

    loop {
        let ruleset = WangRuleset::from_tileset(controller.tileset());
        let mut solver = Solver::new(topology, &ruleset, options);
        let solved = solver.solve(true);
        if solved || suggested.len() >= max_suggestions {
            let assignments = solver.assignments();
            return Ok(TilingOutcome {
                solved,
                suggested,
                assignments,
                ruleset,
                suggestion_time,
            });
        }

        let started = Instant::now();
        let tile = suggester.suggest(&mut solver, controller)?;
        materialize(&tile, controller)?;
        suggestion_time += started.elapsed();
        log::info!("Added suggested tile #{}: {tile}", suggested.len() + 1);
        suggested.push(tile);
    }
}

/// Builds the slot topology from `--mesh`, or a grid from `--width/--height`.
///
/// # Errors
///
/// Fails on an unreadable or invalid mesh, or an empty grid.
pub fn build_topology(config: &AppConfig) -> Result<SharedTopology, AppError> {
    if let Some(path) = &config.mesh {
        let quads = mesh_input::load_quads(path)?;
        return Ok(Box::new(MeshSlotTopology::from_quads(&quads)?));
    }
    if config.width == 0 || config.height == 0 {
        return Err(AppError::Config(format!(
            "Grid must not be empty, got {}x{}",
            config.width, config.height
        )));
    }
    log::info!("Using a {}x{} grid", config.width, config.height);
    Ok(Box::new(GridSlotTopology::new(config.width, config.height)))
}

fn load_tileset(config: &AppConfig) -> anyhow::Result<Tileset> {
    log::info!("Loading tileset from: {:?}", config.tileset);
    let tileset = load_from_file(&config.tileset)
        .with_context(|| format!("Failed to load tileset {:?}", config.tileset))?;
    log::info!(
        "Tileset loaded: {} tile types, {} edge types",
        tileset.tile_types.len(),
        tileset.edge_types.len()
    );
    Ok(tileset)
}

/// Runs the mode selected by `config`.
///
/// # Errors
///
/// Returns any error of the selected mode.
pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let tileset = load_tileset(config)?;
    let topology = build_topology(config).context("Failed to build slot topology")?;
    log::debug!("Loaded Config: {:?}", config);

    if config.experiment {
        run_experiment_mode(config, &tileset, topology.as_ref())
    } else {
        run_standard_mode(config, tileset, topology.as_ref())
    }
}

/// Tiles once, adding suggested tiles as needed, and saves the assignments.
///
/// # Errors
///
/// Fails when suggesting or saving fails.
pub fn run_standard_mode(config: &AppConfig, tileset: Tileset, topology: &dyn SlotTopology) -> anyhow::Result<()> {
    log::info!("Running standard mode with {} suggestions", config.strategy);
    let mut controller = TilesetController::new(tileset);
    let mut suggester = TileSuggester::new(config.strategy);
    if let Some(path) = &config.suggestion_debug_path {
        suggester = suggester.with_debug_path(path);
    }

    let outcome = solve_with_suggestions(
        &mut controller,
        topology,
        config.solver_options(),
        &suggester,
        config.max_suggestions,
    )?;

    if outcome.solved {
        log::info!(
            "Tiling completed successfully with {} suggested tile(s).",
            outcome.suggested.len()
        );
    } else {
        log::warn!("No tiling found after {} suggested tile(s)", outcome.suggested.len());
    }
    output::save_assignments(&outcome.assignments, &outcome.ruleset, &config.output_path)?;
    output::print_tiling_summary(&outcome);
    Ok(())
}

/// Compares the configured strategies and writes the reports.
///
/// # Errors
///
/// Fails when a report cannot be written.
pub fn run_experiment_mode(
    config: &AppConfig,
    tileset: &Tileset,
    topology: &(dyn SlotTopology + Sync),
) -> anyhow::Result<()> {
    let strategies = config.experiment_strategies();
    log::info!(
        "Running experiment: {} strategies, {} iterations each",
        strategies.len(),
        config.iterations
    );

    let options = config.solver_options();
    let reports = strategies
        .iter()
        .map(|&strategy| {
            run_strategy(
                tileset,
                topology,
                options,
                strategy,
                config.iterations,
                config.max_suggestions,
            )
        })
        .collect();
    let report = ExperimentReport {
        tileset: config.tileset.clone(),
        slot_count: topology.slot_count(),
        base_seed: options.random_seed,
        strategies: reports,
    };

    output::print_experiment_summary(&report);
    if let Some(path) = &config.report {
        output::write_report_json(&report, path)?;
    }
    if let Some(path) = &config.report_csv {
        if let Err(e) = output::write_report_csv(&report, path) {
            log::error!("Failed to write experiment summary to CSV: {}", e);
        }
    }
    Ok(())
}
