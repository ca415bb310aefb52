//! Cell colors
//!
//! Indices 0-15 are resolved through the active 16-color palette; the
//! 6x6x6 cube and the grayscale ramp (16-255) use the fixed xterm values.
//! Resolved colors are packed as `0xAARRGGBB`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// The palette's default foreground or background
    #[default]
    Default,
    /// 0-7 standard, 8-15 bright, 16-231 color cube, 232-255 grayscale
    Indexed(u8),
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    pub fn indexed(index: u8) -> Self {
        Color::Indexed(index)
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Resolve to an opaque `0xAARRGGBB` value. `ansi` supplies colors
    /// 0-15 and `default` is used for [`Color::Default`].
    pub fn to_argb(&self, ansi: &[u32; 16], default: u32) -> u32 {
        match *self {
            Color::Default => default,
            Color::Indexed(idx) if idx < 16 => ansi[idx as usize],
            Color::Indexed(idx) => {
                let (r, g, b) = extended_to_rgb(idx);
                pack(r, g, b)
            }
            Color::Rgb { r, g, b } => pack(r, g, b),
        }
    }
}

fn pack(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// RGB for indices 16-255.
fn extended_to_rgb(index: u8) -> (u8, u8, u8) {
    match index {
        16..=231 => {
            let idx = index - 16;
            let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            (level(idx / 36), level((idx % 36) / 6), level(idx % 6))
        }
        232..=255 => {
            let gray = 8 + (index - 232) * 10;
            (gray, gray, gray)
        }
        _ => (0, 0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ansi() -> [u32; 16] {
        let mut table = [0u32; 16];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = 0xFF00_0000 | i as u32;
        }
        table
    }

    #[test]
    fn test_color_default() {
        assert_eq!(Color::default(), Color::Default);
        assert_eq!(Color::Default.to_argb(&ansi(), 0xFF12_3456), 0xFF12_3456);
    }

    #[test]
    fn test_indexed_uses_palette() {
        assert_eq!(Color::indexed(1).to_argb(&ansi(), 0), 0xFF00_0001);
        assert_eq!(Color::indexed(15).to_argb(&ansi(), 0), 0xFF00_000F);
    }

    #[test]
    fn test_rgb_is_opaque() {
        assert_eq!(Color::rgb(255, 128, 64).to_argb(&ansi(), 0), 0xFFFF_8040);
    }

    #[test]
    fn test_color_cube() {
        assert_eq!(Color::Indexed(16).to_argb(&ansi(), 0), 0xFF00_0000);
        assert_eq!(Color::Indexed(196).to_argb(&ansi(), 0), 0xFFFF_0000);
    }

    #[test]
    fn test_grayscale() {
        assert_eq!(Color::Indexed(232).to_argb(&ansi(), 0), 0xFF08_0808);
        assert_eq!(Color::Indexed(255).to_argb(&ansi(), 0), 0xFFEE_EEEE);
    }
}
