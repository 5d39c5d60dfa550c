use crate::formats::FormatParser;
#[cfg(feature = "serde")]
use crate::formats::schema::TilesetFile;
use crate::{LoadError, Tileset};

/// Parser for tilesets written in JSON, with the same layout as the RON format.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatParser;

impl JsonFormatParser {
    /// Creates a new JSON format parser.
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for JsonFormatParser {
    fn format_name(&self) -> &'static str {
        "JSON"
    }

    #[cfg(feature = "serde")]
    fn parse(&self, content: &str) -> Result<Tileset, LoadError> {
        let file: TilesetFile = serde_json::from_str(content)
            .map_err(|e| LoadError::ParseError(format!("JSON deserialization failed: {e}")))?;
        file.into_tileset()
    }

    #[cfg(not(feature = "serde"))]
    fn parse(&self, _content: &str) -> Result<Tileset, LoadError> {
        Err(LoadError::FeatureNotEnabled(
            "serde (required for JSON parsing)".to_owned(),
        ))
    }
}
