//! Parsers for the tileset file formats.

pub mod parser;
pub use parser::FormatParser;

#[cfg(feature = "serde")]
mod schema;

pub mod json_format;
pub mod ron_format;
