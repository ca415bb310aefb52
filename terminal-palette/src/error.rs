//! Error types for color-scheme import.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    #[error("No GNOME Terminal palette found")]
    NoPalette,

    #[error("Unsupported palette format")]
    UnsupportedPaletteFormat,

    #[error("Empty palette list")]
    EmptyPaletteList,

    #[error("Expected 16 palette colors, got {got}")]
    WrongColorCount { got: usize },

    #[error("Empty color")]
    EmptyColor,

    #[error("Unsupported color format: {0}")]
    UnsupportedColor(String),

    #[error("Not an iTerm2 plist")]
    NotPlist,

    #[error("Invalid plist: {0}")]
    InvalidPlist(String),

    #[error("No ANSI colors found in plist")]
    NoAnsiColors,

    #[error("Missing ANSI colors: {0:?}")]
    MissingAnsiColors(Vec<usize>),
}
