//! Terminal cell representation
//!
//! A cell holds one displayed character (plus any zero-width marks that
//! combine with it), its SGR attributes and an optional hyperlink.
//! Wide characters take two cells; the right half is a continuation cell
//! with width 0.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Attributes that affect how a cell is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellAttributes {
    pub fg: Color,
    pub bg: Color,
    /// SGR 1
    pub bold: bool,
    /// SGR 2
    pub faint: bool,
    /// SGR 3
    pub italic: bool,
    /// SGR 4
    pub underline: bool,
    /// SGR 5
    pub blink: bool,
    /// SGR 7
    pub inverse: bool,
    /// SGR 8
    pub hidden: bool,
    /// SGR 9
    pub strikethrough: bool,
}

impl CellAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Foreground after applying inverse video
    pub fn effective_fg(&self) -> Color {
        if self.inverse {
            self.bg
        } else {
            self.fg
        }
    }

    /// Background after applying inverse video
    pub fn effective_bg(&self) -> Color {
        if self.inverse {
            self.fg
        } else {
            self.bg
        }
    }

    /// True when nothing differs from the default rendition.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Base character; a space for blank cells
    c: char,
    /// Zero-width characters attached to `c`
    combining: Option<Box<str>>,
    pub attrs: CellAttributes,
    /// 1 for normal, 2 for the left half of a wide character, 0 for its right half
    width: u8,
    /// Index into the hyperlink registry, 0 for none
    pub hyperlink_id: u32,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

impl Cell {
    /// A blank cell with default attributes
    pub fn new() -> Self {
        Self {
            c: ' ',
            combining: None,
            attrs: CellAttributes::default(),
            width: 1,
            hyperlink_id: 0,
        }
    }

    pub fn with_char(c: char) -> Self {
        let mut cell = Self::new();
        cell.set_char(c);
        cell
    }

    /// A blank cell carrying `attrs`, as left behind by erase operations
    pub fn blank(attrs: CellAttributes) -> Self {
        Self {
            attrs,
            ..Self::new()
        }
    }

    pub fn set_char(&mut self, c: char) {
        self.c = c;
        self.combining = None;
        self.width = char_width(c).max(1) as u8;
    }

    /// Attach a zero-width character (combining mark, ZWJ, variation selector).
    pub fn push_combining(&mut self, c: char) {
        let mut extra = self.combining.take().map(String::from).unwrap_or_default();
        extra.push(c);
        self.combining = Some(extra.into_boxed_str());
    }

    pub fn char(&self) -> char {
        self.c
    }

    /// Append this cell's text to `out`. Continuation cells contribute nothing.
    pub fn write_text(&self, out: &mut String) {
        if self.is_continuation() {
            return;
        }
        out.push(self.c);
        if let Some(extra) = &self.combining {
            out.push_str(extra);
        }
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    /// A cell is empty when it shows a plain space and has no link.
    /// Attributes are ignored so that erased-with-background cells still
    /// count as blank for trimming.
    pub fn is_empty(&self) -> bool {
        self.c == ' ' && self.combining.is_none() && self.width == 1 && self.hyperlink_id == 0
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn is_wide(&self) -> bool {
        self.width == 2
    }

    /// Turn this cell into the right half of a wide character.
    pub fn set_continuation(&mut self, attrs: CellAttributes, hyperlink_id: u32) {
        self.c = ' ';
        self.combining = None;
        self.width = 0;
        self.attrs = attrs;
        self.hyperlink_id = hyperlink_id;
    }

    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }

    pub fn clear(&mut self, attrs: CellAttributes) {
        *self = Self::blank(attrs);
    }
}

/// Column width of `c`: 0 for combining and other zero-width characters,
/// 2 for East Asian wide and emoji, 1 otherwise.
pub fn char_width(c: char) -> usize {
    if c.is_ascii() {
        return 1;
    }
    unicode_width::UnicodeWidthChar::width(c).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_new() {
        let cell = Cell::new();
        assert!(cell.is_empty());
        assert_eq!(cell.char(), ' ');
        assert_eq!(cell.width(), 1);
    }

    #[test]
    fn test_cell_with_char() {
        let cell = Cell::with_char('A');
        assert!(!cell.is_empty());
        assert_eq!(cell.text(), "A");
    }

    #[test]
    fn test_cell_wide_char() {
        let cell = Cell::with_char('中');
        assert_eq!(cell.width(), 2);
        assert!(cell.is_wide());
    }

    #[test]
    fn test_cell_continuation() {
        let mut cell = Cell::new();
        cell.set_continuation(CellAttributes::default(), 0);
        assert!(cell.is_continuation());
        assert_eq!(cell.text(), "");
    }

    #[test]
    fn test_cell_combining() {
        let mut cell = Cell::with_char('e');
        cell.push_combining('\u{0301}');
        assert_eq!(cell.text(), "e\u{0301}");
        assert_eq!(cell.width(), 1);

        cell.set_char('x');
        assert_eq!(cell.text(), "x");
    }

    #[test]
    fn test_cell_blank_keeps_background() {
        let attrs = CellAttributes {
            bg: Color::Indexed(4),
            ..Default::default()
        };
        let cell = Cell::blank(attrs);
        assert!(cell.is_empty());
        assert_eq!(cell.attrs.bg, Color::Indexed(4));
    }

    #[test]
    fn test_attributes_inverse() {
        let attrs = CellAttributes {
            fg: Color::Indexed(1),
            bg: Color::Indexed(2),
            inverse: true,
            ..Default::default()
        };
        assert_eq!(attrs.effective_fg(), Color::Indexed(2));
        assert_eq!(attrs.effective_bg(), Color::Indexed(1));
        assert!(!attrs.is_default());
    }

    #[test]
    fn test_char_width() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('中'), 2);
        assert_eq!(char_width('\u{0301}'), 0);
    }
}
