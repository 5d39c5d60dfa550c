use thiserror::Error;
use tiling_core::tiling_rules::LoadError;
use tiling_core::{SuggestionError, TopologyError};

/// Errors raised by the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Inconsistent command line options.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Reading or writing a file failed.
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// The tileset file could not be loaded.
    #[error("Tileset Error: {0}")]
    Load(#[from] LoadError),

    /// The mesh file is not a usable OBJ quad mesh.
    #[error("Mesh Error at line {line}: {message}")]
    MeshInput {
        /// 1-based line number.
        line: usize,
        /// What is wrong with it.
        message: String,
    },

    /// The mesh faces do not form a valid topology.
    #[error("Topology Error: {0}")]
    Topology(#[from] TopologyError),

    /// No tile could be suggested.
    #[error("Suggestion Error: {0}")]
    Suggestion(#[from] SuggestionError),
}
