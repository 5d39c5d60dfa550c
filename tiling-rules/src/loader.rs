use crate::formats::json_format::JsonFormatParser;
use crate::formats::ron_format::RonFormatParser;
use crate::formats::FormatParser;
use crate::{LoadError, Tileset};
use std::path::Path;

/// Picks a parser from the file extension. Unknown or missing extensions fall back to RON.
fn parser_for(path: &Path) -> Box<dyn FormatParser> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => Box::new(JsonFormatParser::new()),
        _ => Box::new(RonFormatParser::new()),
    }
}

/// Loads a tileset from a file.
///
/// # Arguments
///
/// * `path` - The path to the tileset definition (`.ron` or `.json`).
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, or the parser's error
/// if its content is invalid.
pub fn load_from_file(path: &Path) -> Result<Tileset, LoadError> {
    let content = std::fs::read_to_string(path)?;
    let parser = parser_for(path);
    log::debug!(
        "Loading tileset from {} as {}",
        path.display(),
        parser.format_name()
    );
    let tileset = parser.parse(&content)?;
    log::info!(
        "Loaded {} tile types and {} edge types from {}",
        tileset.tile_types.len(),
        tileset.edge_types.len(),
        path.display()
    );
    Ok(tileset)
}
