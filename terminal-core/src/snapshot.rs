//! Immutable point-in-time views of the screen
//!
//! A [`Snapshot`] shares rows with the screen by `Arc`, so taking one is
//! cheap and later writes never show through. The viewport is the last
//! `scroll_offset` rows of scrollback followed by the top rows of the live
//! grid. Absolute row `a` is scrollback row `a` when `a < scrollback_len`
//! and live row `a - scrollback_len` otherwise.
//!
//! [`SnapshotDump`] is the serializable text-and-attributes form used by
//! the replay tool and tests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cell::CellAttributes;
use crate::color::Color;
use crate::hyperlink::{lookup, HyperlinkTable};
use crate::line::Line;
use crate::scrollback::HistoryRows;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCursor {
    pub row: usize,
    pub col: usize,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    /// Scrollback, oldest first
    pub(crate) history: HistoryRows,
    /// Live grid, top first
    pub(crate) screen: Arc<Vec<Arc<Line>>>,
    pub(crate) scroll_offset: usize,
    pub(crate) cursor: SnapshotCursor,
    pub(crate) alternate_screen: bool,
    pub(crate) title: String,
    pub(crate) hyperlinks: HyperlinkTable,
}

impl Snapshot {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn scrollback_len(&self) -> usize {
        self.history.len()
    }

    /// Scrollback plus live rows
    pub fn total_rows(&self) -> usize {
        self.history.len() + self.screen.len()
    }

    pub fn cursor(&self) -> SnapshotCursor {
        self.cursor
    }

    pub fn is_alternate_screen(&self) -> bool {
        self.alternate_screen
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The same content viewed at another offset (clamped).
    pub fn with_scroll_offset(&self, scroll_offset: usize) -> Snapshot {
        Snapshot {
            scroll_offset: scroll_offset.min(self.history.len()),
            ..self.clone()
        }
    }

    /// Absolute row shown at `viewport_row`.
    pub fn absolute_row(&self, viewport_row: usize) -> usize {
        self.history.len() - self.scroll_offset + viewport_row
    }

    /// Viewport row showing absolute row `abs`, if it is on screen.
    pub fn viewport_row(&self, abs: usize) -> Option<usize> {
        let first = self.history.len() - self.scroll_offset;
        abs.checked_sub(first).filter(|&v| v < self.rows)
    }

    /// Row at an absolute position.
    pub fn absolute_line(&self, abs: usize) -> Option<&Line> {
        match abs.checked_sub(self.history.len()) {
            None => self.history.get(abs),
            Some(live) => self.screen.get(live).map(|l| l.as_ref()),
        }
    }

    /// Row shown at `viewport_row`.
    pub fn line(&self, viewport_row: usize) -> Option<&Line> {
        if viewport_row >= self.rows {
            return None;
        }
        self.absolute_line(self.absolute_row(viewport_row))
    }

    pub fn visible_lines(&self) -> impl Iterator<Item = &Line> {
        (0..self.rows).filter_map(move |row| self.line(row))
    }

    /// Text of one visible row without trailing blanks.
    pub fn row_text(&self, viewport_row: usize) -> String {
        self.line(viewport_row).map(Line::text).unwrap_or_default()
    }

    /// All visible rows joined with newlines.
    pub fn text(&self) -> String {
        self.visible_lines()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Target of a hyperlink id stored in a cell.
    pub fn hyperlink(&self, id: u32) -> Option<&str> {
        lookup(&self.hyperlinks, id)
    }

    /// Serializable form of the visible rows.
    pub fn dump(&self) -> SnapshotDump {
        SnapshotDump {
            rows: self.rows,
            cols: self.cols,
            scroll_offset: self.scroll_offset,
            scrollback_len: self.history.len(),
            cursor: self.cursor,
            alternate_screen: self.alternate_screen,
            title: (!self.title.is_empty()).then(|| self.title.clone()),
            lines: self
                .visible_lines()
                .map(|line| SnapshotLine {
                    text: line.text(),
                    wrapped: line.wrapped,
                    attrs: attr_spans(line),
                    links: link_spans(line, &self.hyperlinks),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.dump().to_json()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDump {
    pub rows: usize,
    pub cols: usize,
    pub scroll_offset: usize,
    pub scrollback_len: usize,
    pub cursor: SnapshotCursor,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub alternate_screen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub lines: Vec<SnapshotLine>,
}

impl SnapshotDump {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn screen_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLine {
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub wrapped: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<SnapshotAttrSpan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<SnapshotLinkSpan>,
}

/// Columns `start..end` share a non-default rendition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotAttrSpan {
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub faint: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inverse: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strikethrough: bool,
}

impl SnapshotAttrSpan {
    fn new(start: usize, attrs: &CellAttributes) -> Self {
        Self {
            start,
            end: start,
            fg: color_name(attrs.fg),
            bg: color_name(attrs.bg),
            bold: attrs.bold,
            faint: attrs.faint,
            italic: attrs.italic,
            underline: attrs.underline,
            inverse: attrs.inverse,
            strikethrough: attrs.strikethrough,
        }
    }
}

/// Columns `start..end` carry an OSC 8 link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLinkSpan {
    pub start: usize,
    pub end: usize,
    pub url: String,
}

fn color_name(color: Color) -> Option<String> {
    match color {
        Color::Default => None,
        Color::Indexed(idx) => Some(format!("idx:{idx}")),
        Color::Rgb { r, g, b } => Some(format!("#{r:02x}{g:02x}{b:02x}")),
    }
}

fn attr_spans(line: &Line) -> Vec<SnapshotAttrSpan> {
    let mut spans = Vec::new();
    let mut current: Option<(CellAttributes, SnapshotAttrSpan)> = None;

    for (col, cell) in line.iter().enumerate() {
        if cell.is_continuation() {
            continue;
        }
        if let Some((attrs, mut span)) = current.take() {
            if attrs == cell.attrs {
                current = Some((attrs, span));
                continue;
            }
            span.end = col;
            spans.push(span);
        }
        if !cell.attrs.is_default() {
            current = Some((cell.attrs, SnapshotAttrSpan::new(col, &cell.attrs)));
        }
    }
    if let Some((_, mut span)) = current {
        span.end = line.cols();
        spans.push(span);
    }
    spans
}

fn link_spans(line: &Line, table: &HyperlinkTable) -> Vec<SnapshotLinkSpan> {
    let mut spans: Vec<SnapshotLinkSpan> = Vec::new();
    let mut current: Option<(u32, usize)> = None;

    let ids = line.iter().map(|c| c.hyperlink_id).chain(std::iter::once(0));
    for (col, id) in ids.enumerate() {
        match current {
            Some((open, _)) if open == id => continue,
            Some((open, start)) => {
                if let Some(url) = lookup(table, open) {
                    spans.push(SnapshotLinkSpan {
                        start,
                        end: col,
                        url: url.to_owned(),
                    });
                }
                current = None;
            }
            None => {}
        }
        if id != 0 {
            current = Some((id, col));
        }
    }
    spans
}
