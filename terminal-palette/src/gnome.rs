//! GNOME Terminal exports and Gogh theme scripts
//!
//! Recognized inputs:
//! - `dconf dump` / `gsettings get` entries: `palette=['rgb(...)', ...]`,
//!   `foreground-color='rgb(...)'`, `background-color='rgb(...)'`
//! - Gogh scripts: `PALETTE="#RRGGBB:#RRGGBB:..."` (16 entries),
//!   `FOREGROUND_COLOR="#RRGGBB"`, `BACKGROUND_COLOR="#RRGGBB"`
//!
//! Lines are `KEY=value`, optionally prefixed by `export`. Keys compare
//! case-insensitively with `-` and `_` equivalent. Lines starting with `#`
//! or `;` are comments. With no `palette` assignment, the first bracketed
//! 16-color list or colon-separated hex list anywhere in the text is used.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::color::{parse_color, strip_quotes};
use crate::error::PaletteError;
use crate::Palette;

static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+)?([A-Za-z0-9_-]+)\s*=\s*(.*?)\s*$")
        .expect("assignment regex is valid")
});

static BRACKET_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[[^\]]+\]").expect("bracket list regex is valid"));

static COLON_HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#[0-9a-f]{6}(?::#[0-9a-f]{6}){15}").expect("colon palette regex is valid")
});

static QUOTED_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("quoted token regex is valid"));

/// Cheap check for whether `text` is worth handing to [`parse`].
pub fn looks_like_scheme(text: &str) -> bool {
    text.to_ascii_lowercase().contains("palette") || COLON_HEX_RE.is_match(text)
}

pub fn parse(text: &str) -> Result<Palette, PaletteError> {
    let assignments = parse_assignments(text);

    let ansi = match assignments.get("palette") {
        Some(value) => parse_palette_value(value)?,
        None => palette_fallback(text).ok_or(PaletteError::NoPalette)?,
    };
    let mut palette = Palette::from_colors(&ansi)?;

    palette.foreground = color_for(&assignments, &["foreground_color", "fg_color"])?;
    palette.background = color_for(&assignments, &["background_color", "bg_color"])?;
    Ok(palette)
}

fn color_for(
    assignments: &HashMap<String, String>,
    keys: &[&str],
) -> Result<Option<u32>, PaletteError> {
    keys.iter()
        .find_map(|key| assignments.get(*key))
        .map(|value| parse_color(value))
        .transpose()
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('-', "_")
}

/// Later assignments of the same key win.
fn parse_assignments(text: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }
        if let Some(caps) = ASSIGNMENT_RE.captures(line) {
            out.insert(normalize_key(&caps[1]), caps[2].trim().to_owned());
        }
    }
    out
}

fn parse_palette_value(value: &str) -> Result<Vec<u32>, PaletteError> {
    let unwrapped = strip_quotes(value.trim()).trim();
    let unwrapped = unwrapped.strip_suffix(';').unwrap_or(unwrapped).trim();
    if unwrapped.starts_with('[') {
        parse_delimited_list(unwrapped, '[', ']')
    } else if unwrapped.starts_with('(') {
        parse_delimited_list(unwrapped, '(', ')')
    } else if unwrapped.contains(':') {
        parse_colon_list(unwrapped)
    } else {
        Err(PaletteError::UnsupportedPaletteFormat)
    }
}

fn palette_fallback(text: &str) -> Option<Vec<u32>> {
    for found in BRACKET_LIST_RE.find_iter(text) {
        match parse_delimited_list(found.as_str(), '[', ']') {
            Ok(colors) => return Some(colors),
            Err(err) => log::trace!("skipping bracket list: {err}"),
        }
    }
    let colon = COLON_HEX_RE.find(text)?;
    parse_colon_list(colon.as_str()).ok()
}

/// `[...]` entries are comma separated and `(...)` entries whitespace
/// separated; quoted tokens take precedence in both.
fn parse_delimited_list(list: &str, open: char, close: char) -> Result<Vec<u32>, PaletteError> {
    let trimmed = list.trim();
    let inner = trimmed
        .strip_prefix(open)
        .and_then(|s| s.strip_suffix(close))
        .unwrap_or(trimmed)
        .trim();
    if inner.is_empty() {
        return Err(PaletteError::EmptyPaletteList);
    }

    let quoted: Vec<&str> = QUOTED_TOKEN_RE
        .captures_iter(inner)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    let tokens: Vec<&str> = if !quoted.is_empty() {
        quoted
    } else if open == '[' {
        inner.split(',').map(str::trim).filter(|t| !t.is_empty()).collect()
    } else {
        inner.split_whitespace().collect()
    };

    let colors = tokens
        .into_iter()
        .map(parse_color)
        .collect::<Result<Vec<_>, _>>()?;
    expect_sixteen(colors)
}

fn parse_colon_list(value: &str) -> Result<Vec<u32>, PaletteError> {
    let unwrapped = strip_quotes(value.trim()).trim();
    let parts: Vec<&str> = unwrapped
        .split(':')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 16 {
        return Err(PaletteError::WrongColorCount { got: parts.len() });
    }
    parts.into_iter().map(parse_color).collect()
}

fn expect_sixteen(colors: Vec<u32>) -> Result<Vec<u32>, PaletteError> {
    if colors.len() != 16 {
        return Err(PaletteError::WrongColorCount { got: colors.len() });
    }
    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: [&str; 16] = [
        "#000000", "#cc0000", "#4e9a06", "#c4a000", "#3465a4", "#75507b", "#06989a", "#d3d7cf",
        "#555753", "#ef2929", "#8ae234", "#fce94f", "#729fcf", "#ad7fa8", "#34e2e2", "#eeeeec",
    ];

    fn rgb_list() -> String {
        HEX.iter()
            .map(|h| {
                let v = u32::from_str_radix(&h[1..], 16).unwrap();
                format!("'rgb({},{},{})'", v >> 16, (v >> 8) & 0xFF, v & 0xFF)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[test]
    fn test_dconf_and_gogh_agree() {
        let dconf = format!(
            "[/]\nvisible-name='Tango'\npalette=[{}]\nforeground-color='rgb(211,215,207)'\n\
             background-color='rgb(46,52,54)'\n",
            rgb_list()
        );
        let gogh = format!(
            "#!/usr/bin/env bash\nexport PALETTE=\"{}\"\nexport FOREGROUND_COLOR=\"#d3d7cf\"\n\
             export BACKGROUND_COLOR=\"#2e3436\"\n",
            HEX.join(":")
        );

        let a = parse(&dconf).unwrap();
        let b = parse(&gogh).unwrap();
        assert_eq!(a.ansi, b.ansi);
        assert_eq!(a.ansi[1], 0xFFCC0000);
        assert_eq!(a.foreground, Some(0xFFD3D7CF));
        assert_eq!(a.foreground, b.foreground);
        assert_eq!(a.background, b.background);
    }

    #[test]
    fn test_gsettings_fallback_list() {
        let text = format!("[{}]", rgb_list());
        let palette = parse(&text).unwrap();
        assert_eq!(palette.ansi[15], 0xFFEEEEEC);
        assert_eq!(palette.foreground, None);
    }

    #[test]
    fn test_colon_fallback_without_key() {
        let text = format!("colors: {}", HEX.join(":"));
        assert!(looks_like_scheme(&text));
        let palette = parse(&text).unwrap();
        assert_eq!(palette.ansi[2], 0xFF4E9A06);
    }

    #[test]
    fn test_paren_list() {
        let text = format!(
            "palette=({})",
            HEX.iter().map(|h| format!("\"{h}\"")).collect::<Vec<_>>().join(" ")
        );
        assert_eq!(parse(&text).unwrap().ansi[4], 0xFF3465A4);
    }

    #[test]
    fn test_wrong_count() {
        let text = format!("palette='{}'", HEX[..15].join(":"));
        assert_eq!(parse(&text), Err(PaletteError::WrongColorCount { got: 15 }));
    }

    #[test]
    fn test_bad_color() {
        let mut hex = HEX.to_vec();
        hex[5] = "purple";
        let text = format!("PALETTE=\"{}\"", hex.join(":"));
        assert_eq!(
            parse(&text),
            Err(PaletteError::UnsupportedColor("purple".into()))
        );
    }

    #[test]
    fn test_no_palette() {
        assert_eq!(parse("foreground-color='#ffffff'"), Err(PaletteError::NoPalette));
        assert_eq!(
            parse("palette=nothing"),
            Err(PaletteError::UnsupportedPaletteFormat)
        );
    }

    #[test]
    fn test_comments_ignored() {
        let text = format!("# palette=broken\n; note\nPalette = '{}'", HEX.join(":"));
        assert_eq!(parse(&text).unwrap().ansi[9], 0xFFEF2929);
    }
}
