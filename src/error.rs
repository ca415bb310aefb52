use thiserror::Error;

use crate::config::ConfigError;
use terminal_palette::PaletteError;

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Palette import failed: {0}")]
    Palette(#[from] PaletteError),

    #[error("Snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TerminalError>;
