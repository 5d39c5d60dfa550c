use crate::formats::FormatParser;
#[cfg(feature = "serde")]
use crate::formats::schema::TilesetFile;
use crate::{LoadError, Tileset};

/// Parser for tilesets written in RON (Rusty Object Notation).
///
/// ```text
/// (
///     edge_types: [(name: "wall"), (name: "rim", border_only: true)],
///     tiles: [
///         (
///             name: Some("corner"),
///             edges: [
///                 (edge: Some("wall")),
///                 (edge: Some("rim")),
///                 (edge: Some("wall"), flipped: true),
///                 (edge: None),
///             ],
///         ),
///     ],
/// )
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct RonFormatParser;

impl RonFormatParser {
    /// Creates a new RON format parser.
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for RonFormatParser {
    fn format_name(&self) -> &'static str {
        "Rusty Object Notation (RON)"
    }

    #[cfg(feature = "serde")]
    fn parse(&self, content: &str) -> Result<Tileset, LoadError> {
        let file: TilesetFile = ron::from_str(content)
            .map_err(|e| LoadError::ParseError(format!("RON deserialization failed: {e}")))?;
        file.into_tileset()
    }

    /// Stub implementation when the `serde` feature is not enabled.
    #[cfg(not(feature = "serde"))]
    fn parse(&self, _content: &str) -> Result<Tileset, LoadError> {
        Err(LoadError::FeatureNotEnabled(
            "serde (required for RON parsing)".to_owned(),
        ))
    }
}
