//! Single color tokens
//!
//! Accepted forms:
//! - `rgb(r, g, b)` and `rgba(r, g, b, a)`, components either in `[0, 1]`
//!   or in `[0, 255]`
//! - hex with 3, 4, 6 or 8 digits, optionally prefixed by `#` or `0x`
//!
//! An 8-digit value is read as `AARRGGBB` when it starts with `ff` or `00`
//! and as `RRGGBBAA` otherwise. This is a best-effort guess: a value such
//! as `80ff0080` is ambiguous and will be read as `RRGGBBAA`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::PaletteError;

static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^rgba?\(\s*([0-9.]+)\s*,\s*([0-9.]+)\s*,\s*([0-9.]+)\s*(?:,\s*([0-9.]+)\s*)?\)$",
    )
    .expect("rgb regex is valid")
});

/// Parse one color token into `0xAARRGGBB`. Surrounding quotes are
/// ignored.
pub fn parse_color(value: &str) -> Result<u32, PaletteError> {
    let cleaned = strip_quotes(value.trim()).trim();
    if cleaned.is_empty() {
        return Err(PaletteError::EmptyColor);
    }

    if let Some(caps) = RGB_RE.captures(cleaned) {
        let component = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().parse::<f64>().unwrap_or(f64::NAN))
        };
        let channel = |i: usize| unit(component(i).unwrap_or(0.0), 0.0);
        let alpha = component(4).map_or(1.0, |a| unit(a, 1.0));
        return Ok(pack(alpha, channel(1), channel(2), channel(3)));
    }

    parse_hex(cleaned).ok_or_else(|| PaletteError::UnsupportedColor(cleaned.to_owned()))
}

/// Map a component given either as a fraction or as 0..=255 onto `[0, 1]`.
/// `nan` maps to `if_nan`.
pub(crate) fn unit(value: f64, if_nan: f64) -> f64 {
    if value.is_nan() {
        if_nan
    } else if value <= 0.0 {
        0.0
    } else if value <= 1.0 {
        value
    } else if value <= 255.0 {
        value / 255.0
    } else {
        1.0
    }
}

/// Pack `[0, 1]` channels into ARGB.
pub(crate) fn pack(a: f64, r: f64, g: f64, b: f64) -> u32 {
    let byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u32;
    (byte(a) << 24) | (byte(r) << 16) | (byte(g) << 8) | byte(b)
}

fn parse_hex(value: &str) -> Option<u32> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    let hex = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex)
        .to_ascii_lowercase();
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        _ => hex,
    };
    let byte = |i: usize| u32::from_str_radix(&expanded[i..i + 2], 16).ok();

    match expanded.len() {
        6 => Some(0xFF00_0000 | (byte(0)? << 16) | (byte(2)? << 8) | byte(4)?),
        8 if expanded.starts_with("ff") || expanded.starts_with("00") => {
            Some((byte(0)? << 24) | (byte(2)? << 16) | (byte(4)? << 8) | byte(6)?)
        }
        8 => Some((byte(6)? << 24) | (byte(0)? << 16) | (byte(2)? << 8) | byte(4)?),
        _ => None,
    }
}

pub(crate) fn strip_quotes(value: &str) -> &str {
    let trimmed = value.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}
