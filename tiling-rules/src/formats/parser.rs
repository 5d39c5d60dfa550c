use crate::{LoadError, Tileset};

/// Trait defining the interface for format-specific tileset parsers.
///
/// Implementors turn the textual content of a tileset file into a [`Tileset`]
/// whose tile edges reference edge types by index.
pub trait FormatParser {
    /// Parses file content into a tileset.
    ///
    /// # Arguments
    ///
    /// * `content` - The full text of the tileset file
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ParseError`] on malformed syntax and
    /// [`LoadError::InvalidData`] when names do not resolve.
    fn parse(&self, content: &str) -> Result<Tileset, LoadError>;

    /// Returns a descriptive name for this parser format, used in logs and error messages.
    fn format_name(&self) -> &'static str;
}
