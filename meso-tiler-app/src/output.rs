//! Writes slot assignments and experiment reports.

use crate::execution::TilingOutcome;
use crate::experiment::{ExperimentReport, StrategyReport};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tiling_core::tiling_rules::{TileOrientation, TileTransform};
use tiling_core::WangRuleset;

/// Short code of a transform: `id`, or the flips and rotation joined by `+`,
/// e.g. `fx+r90`.
pub fn transform_code(transform: TileTransform) -> String {
    let mut parts = Vec::new();
    if transform.flip_x {
        parts.push("fx".to_string());
    }
    if transform.flip_y {
        parts.push("fy".to_string());
    }
    if transform.orientation != TileOrientation::Deg0 {
        parts.push(format!("r{}", transform.orientation.quarter_turns() * 90));
    }
    if parts.is_empty() {
        "id".to_string()
    } else {
        parts.join("+")
    }
}

/// Saves one `slot variant tile transform` line per slot. Undetermined slots
/// get `-` in every column after the slot.
///
/// # Errors
///
/// Fails if the file cannot be created or written.
pub fn save_assignments(assignments: &[Option<usize>], ruleset: &WangRuleset, path: &Path) -> Result<()> {
    log::info!("Saving slot assignments to {:?}...", path);
    let file = File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    let variants = ruleset.table().variants();

    for (slot, assignment) in assignments.iter().enumerate() {
        match assignment.and_then(|v| variants.variant_to_tile(v).map(|tile| (v, tile))) {
            Some((variant, tile)) => {
                log::trace!("Slot {slot}: {}", variants.variant_repr(variant));
                writeln!(
                    writer,
                    "{slot} {variant} {} {}",
                    tile.tile.0,
                    transform_code(tile.transform)
                )?;
            }
            None => writeln!(writer, "{slot} - - -")?,
        }
    }
    writer.flush().context("Failed to flush output file")?;
    log::info!("Slot assignments saved successfully.");
    Ok(())
}

/// Writes the full report as pretty JSON.
///
/// # Errors
///
/// Fails if the file cannot be created or serialized into.
pub fn write_report_json(report: &ExperimentReport, path: &Path) -> Result<()> {
    log::info!("Writing experiment report to {:?}", path);
    let file = File::create(path).with_context(|| format!("Failed to create report file: {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report).context("Failed to serialize experiment report")?;
    Ok(())
}

fn format_optional(value: Option<f64>, precision: usize, missing: &str) -> String {
    value.map_or_else(|| missing.to_string(), |v| format!("{v:.precision$}"))
}

/// Writes one CSV row per strategy.
///
/// # Errors
///
/// Fails if the file cannot be created or written.
pub fn write_report_csv(report: &ExperimentReport, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "Strategy",
        "Iterations",
        "Successful",
        "Failed",
        "Mean Tiles",
        "Std Dev Tiles",
        "Trivial",
        "Avg Suggestion Time (ms)",
    ])?;

    for strategy in &report.strategies {
        wtr.write_record([
            strategy.strategy.to_string(),
            strategy.iterations.to_string(),
            strategy.success_count.to_string(),
            (strategy.iterations - strategy.success_count).to_string(),
            format_optional(strategy.mean_generated_tiles, 6, ""),
            format_optional(strategy.stddev_generated_tiles, 6, ""),
            strategy.trivial.to_string(),
            format_optional(strategy.average_suggestion_time_ms, 6, ""),
        ])?;
    }

    wtr.flush()?;
    log::info!("Experiment summary written to {:?}", path);
    Ok(())
}

fn success_cell(strategy: &StrategyReport) -> String {
    let cell = format!("{:<7}", format!("{}/{}", strategy.success_count, strategy.iterations));
    if strategy.success_count == strategy.iterations {
        cell.green().to_string()
    } else if strategy.success_count == 0 {
        cell.red().to_string()
    } else {
        cell.yellow().to_string()
    }
}

/// Prints the per-strategy table on stdout.
pub fn print_experiment_summary(report: &ExperimentReport) {
    println!("\n{}", "--- Suggestion Strategy Comparison ---".bold());
    println!("Tileset: {:?} ({} slots, base seed {})", report.tileset, report.slot_count, report.base_seed);
    println!("---------------------------------------------------------------------------------------------");
    println!("Strategy                   | Success | Mean Tiles | Std Dev | Avg Suggest (ms) | Notes");
    println!("---------------------------|---------|------------|---------|------------------|------");

    for strategy in &report.strategies {
        let notes = if strategy.trivial { "trivial" } else { "" };
        println!(
            "{:<26} | {} | {:<10} | {:<7} | {:<16} | {}",
            strategy.strategy.to_string(),
            success_cell(strategy),
            format_optional(strategy.mean_generated_tiles, 2, "N/A"),
            format_optional(strategy.stddev_generated_tiles, 2, "N/A"),
            format_optional(strategy.average_suggestion_time_ms, 3, "N/A"),
            notes,
        );
    }
    println!("---------------------------------------------------------------------------------------------");
}

/// Prints the result of a single tiling run on stdout.
pub fn print_tiling_summary(outcome: &TilingOutcome) {
    let status = if outcome.solved {
        "solved".green().bold()
    } else {
        "unsolved".red().bold()
    };
    println!(
        "Tiling {status}: {} suggested tile(s) in {:.3} ms",
        outcome.suggested.len(),
        outcome.suggestion_time.as_secs_f64() * 1000.0
    );
    for (index, tile) in outcome.suggested.iter().enumerate() {
        println!("  #{} {}", index + 1, tile);
    }
}
