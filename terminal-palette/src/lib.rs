//! Terminal Palette - color-scheme text to a 16-color ARGB palette
//!
//! Two import families are understood:
//! - GNOME Terminal exports (`dconf dump`, `gsettings get`) and Gogh theme
//!   scripts, see [`gnome`]
//! - iTerm2 `.itermcolors` property lists, see [`iterm`]
//!
//! Colors are packed as `0xAARRGGBB`.

mod color;
mod error;
pub mod gnome;
pub mod iterm;

pub use color::parse_color;
pub use error::PaletteError;

/// Number of ANSI palette entries
pub const ANSI_COLORS: usize = 16;

/// xterm's default ANSI colors
pub const DEFAULT_ANSI: [u32; ANSI_COLORS] = [
    0xFF000000, 0xFFCD0000, 0xFF00CD00, 0xFFCDCD00, 0xFF0000EE, 0xFFCD00CD, 0xFF00CDCD, 0xFFE5E5E5,
    0xFF7F7F7F, 0xFFFF0000, 0xFF00FF00, 0xFFFFFF00, 0xFF5C5CFF, 0xFFFF00FF, 0xFF00FFFF, 0xFFFFFFFF,
];

/// Sixteen ANSI colors plus optional default foreground and background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub ansi: [u32; ANSI_COLORS],
    pub foreground: Option<u32>,
    pub background: Option<u32>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ansi: DEFAULT_ANSI,
            foreground: None,
            background: None,
        }
    }
}

impl Palette {
    pub fn new(ansi: [u32; ANSI_COLORS]) -> Self {
        Self {
            ansi,
            ..Self::default()
        }
    }

    /// Build from a parsed list, which must hold exactly 16 colors.
    pub fn from_colors(colors: &[u32]) -> Result<Self, PaletteError> {
        let ansi: [u32; ANSI_COLORS] = colors
            .try_into()
            .map_err(|_| PaletteError::WrongColorCount { got: colors.len() })?;
        Ok(Self::new(ansi))
    }

    /// Default foreground, falling back to ANSI white (7)
    pub fn foreground_or_default(&self) -> u32 {
        self.foreground.unwrap_or(self.ansi[7])
    }

    /// Default background, falling back to ANSI black (0)
    pub fn background_or_default(&self) -> u32 {
        self.background.unwrap_or(self.ansi[0])
    }
}

/// Parse a scheme file of either family, picking by content.
pub fn parse_any(text: &str) -> Result<Palette, PaletteError> {
    if text.contains("<plist") {
        log::debug!("parsing color scheme as iTerm2 plist");
        iterm::parse(text)
    } else if gnome::looks_like_scheme(text) {
        log::debug!("parsing color scheme as GNOME Terminal/Gogh");
        gnome::parse(text)
    } else {
        Err(PaletteError::NoPalette)
    }
}
