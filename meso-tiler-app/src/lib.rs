//! Command line front end of the tiler: loads a tileset and a slot topology,
//! tiles it while suggesting new tiles on failure, and compares suggestion
//! strategies in experiment mode.

pub mod config;
pub mod error;
pub mod execution;
pub mod experiment;
pub mod logging;
pub mod mesh_input;
pub mod output;

pub use config::AppConfig;
pub use error::AppError;

use clap::Parser;

/// Parses the command line, sets up logging and runs the selected mode.
///
/// # Errors
///
/// Returns the error of the selected mode.
pub fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    logging::init_logger(&config);
    execution::run(&config)
}
