//! iTerm2 `.itermcolors` schemes
//!
//! The ANSI colors live under `Ansi 0 Color` .. `Ansi 15 Color` in the top
//! level dict, each a dict of `Red/Green/Blue/Alpha Component` numbers.
//! `Foreground Color` and `Background Color` are picked up when present.

use std::sync::LazyLock;

use regex::Regex;

use plist::{Dictionary, Value};

use crate::color::{pack, unit};
use crate::error::PaletteError;
use crate::{Palette, ANSI_COLORS};

static ANSI_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Ansi (\d+) Color$").expect("ANSI key regex is valid"));

/// Parse an iTerm2 plist. Every one of the 16 ANSI entries must be
/// present; the error lists the missing indices.
pub fn parse(xml: &str) -> Result<Palette, PaletteError> {
    let trimmed = xml.trim_start();
    if !trimmed.starts_with('<') || !trimmed.contains("<plist") {
        return Err(PaletteError::NotPlist);
    }

    let root = Value::from_reader_xml(xml.as_bytes())
        .map_err(|e| PaletteError::InvalidPlist(e.to_string()))?;
    let dict = root
        .as_dictionary()
        .ok_or_else(|| PaletteError::InvalidPlist("missing plist dict".into()))?;

    let mut palette = Palette::default();
    let mut found = [false; ANSI_COLORS];

    for (key, value) in dict {
        if let Some(caps) = ANSI_KEY_RE.captures(key) {
            let index = caps[1].parse::<usize>().ok().filter(|i| *i < ANSI_COLORS);
            match index {
                Some(i) => {
                    palette.ansi[i] = parse_color_dict(key, value)?;
                    found[i] = true;
                }
                None => log::debug!("ignoring out-of-range key {key:?}"),
            }
        } else if key == "Foreground Color" {
            palette.foreground = Some(parse_color_dict(key, value)?);
        } else if key == "Background Color" {
            palette.background = Some(parse_color_dict(key, value)?);
        }
    }

    if !found.iter().any(|f| *f) {
        return Err(PaletteError::NoAnsiColors);
    }
    let missing: Vec<usize> = (0..ANSI_COLORS).filter(|i| !found[*i]).collect();
    if !missing.is_empty() {
        return Err(PaletteError::MissingAnsiColors(missing));
    }
    Ok(palette)
}

fn parse_color_dict(key: &str, value: &Value) -> Result<u32, PaletteError> {
    let dict = value
        .as_dictionary()
        .ok_or_else(|| PaletteError::InvalidPlist(format!("{key} is not a dict")))?;
    let r = component(dict, "Red Component", 0.0);
    let g = component(dict, "Green Component", 0.0);
    let b = component(dict, "Blue Component", 0.0);
    let a = component(dict, "Alpha Component", 1.0);
    Ok(pack(unit(a, 0.0), unit(r, 0.0), unit(g, 0.0), unit(b, 0.0)))
}

fn component(dict: &Dictionary, name: &str, default: f64) -> f64 {
    match dict.get(name) {
        Some(Value::Real(n)) => *n,
        Some(Value::Integer(n)) => n.as_signed().map_or(default, |n| n as f64),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color_dict(r: f64, g: f64, b: f64) -> String {
        format!(
            "<dict>\
             <key>Color Space</key><string>sRGB</string>\
             <key>Red Component</key><real>{r}</real>\
             <key>Green Component</key><real>{g}</real>\
             <key>Blue Component</key><real>{b}</real>\
             </dict>"
        )
    }

    fn scheme(skip: &[usize]) -> String {
        let mut body = String::new();
        for i in 0..16 {
            if skip.contains(&i) {
                continue;
            }
            body.push_str(&format!("<key>Ansi {i} Color</key>"));
            body.push_str(&color_dict(i as f64 / 15.0, 0.0, 1.0));
        }
        body.push_str("<key>Foreground Color</key>");
        body.push_str(&color_dict(1.0, 1.0, 1.0));
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \
             \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
             <plist version=\"1.0\"><dict>{body}</dict></plist>"
        )
    }

    #[test]
    fn test_parse_complete_scheme() {
        let palette = parse(&scheme(&[])).unwrap();
        assert_eq!(palette.ansi[0], 0xFF0000FF);
        assert_eq!(palette.ansi[15], 0xFFFF00FF);
        assert_eq!(palette.foreground, Some(0xFFFFFFFF));
        assert_eq!(palette.background, None);
    }

    #[test]
    fn test_missing_index_is_named() {
        let err = parse(&scheme(&[3])).unwrap_err();
        assert_eq!(err, PaletteError::MissingAnsiColors(vec![3]));
        assert_eq!(err.to_string(), "Missing ANSI colors: [3]");
    }

    #[test]
    fn test_no_ansi_colors() {
        let all: Vec<usize> = (0..16).collect();
        assert_eq!(parse(&scheme(&all)), Err(PaletteError::NoAnsiColors));
    }

    #[test]
    fn test_not_a_plist() {
        assert_eq!(parse("palette=['#000000']"), Err(PaletteError::NotPlist));
    }

    #[test]
    fn test_character_references_in_keys() {
        let xml = scheme(&[]).replace(
            "<key>Foreground Color</key>",
            "<key>Foreground&#32;Color</key>",
        );
        let palette = parse(&xml).unwrap();
        assert_eq!(palette.foreground, Some(0xFFFFFFFF));
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse("<plist><dict><key>Ansi 0 Color</key></plist>").unwrap_err();
        assert!(matches!(err, PaletteError::InvalidPlist(_)));
    }

    #[test]
    fn test_integer_components() {
        let xml = scheme(&[]).replace(
            "<key>Red Component</key><real>1</real>",
            "<key>Red Component</key><integer>1</integer>",
        );
        let palette = parse(&xml).unwrap();
        assert_eq!(palette.ansi[15], 0xFFFF00FF);
    }

    #[test]
    fn test_components_in_byte_range() {
        let xml = format!(
            "<plist><dict>{}</dict></plist>",
            (0..16)
                .map(|i| format!("<key>Ansi {i} Color</key>{}", color_dict(255.0, 128.0, 0.0)))
                .collect::<String>()
        );
        let palette = parse(&xml).unwrap();
        assert!(palette.ansi.iter().all(|c| *c == 0xFFFF8000));
    }
}
