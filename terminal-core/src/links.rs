//! Hyperlink lookup for a tapped cell
//!
//! Explicit OSC 8 links win. Otherwise, when heuristic detection is on,
//! the logical line under the cell (rows joined along soft wraps) is
//! scanned for URL-like text.

use std::sync::LazyLock;

use regex::Regex;

use crate::line::Line;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    /// Tagged by an OSC 8 sequence
    Explicit,
    /// Found by scanning the row text
    Heuristic,
}

/// A link span within one viewport row. Columns are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub source: LinkSource,
    pub row: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl Link {
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.row == row && (self.start_col..=self.end_col).contains(&col)
    }
}

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:(?:https?|ftp|file|ssh)://|mailto:|www\.)[^\s<>"'`{}|\\^]+"#)
        .expect("URL regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDetector {
    heuristic: bool,
}

impl Default for LinkDetector {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LinkDetector {
    pub fn new(heuristic: bool) -> Self {
        Self { heuristic }
    }

    pub fn heuristic(&self) -> bool {
        self.heuristic
    }

    pub fn set_heuristic(&mut self, enabled: bool) {
        self.heuristic = enabled;
    }

    /// Link covering a viewport cell, if any.
    pub fn resolve(&self, snapshot: &Snapshot, viewport_row: usize, col: usize) -> Option<Link> {
        if let Some(link) = explicit_link_at(snapshot, viewport_row, col) {
            return Some(link);
        }
        if !self.heuristic {
            return None;
        }
        self.heuristic_spans(snapshot, viewport_row)
            .into_iter()
            .find(|link| link.contains(viewport_row, col))
    }

    /// Every OSC 8 span in a viewport row.
    pub fn explicit_spans(&self, snapshot: &Snapshot, viewport_row: usize) -> Vec<Link> {
        let Some(line) = snapshot.line(viewport_row) else {
            return Vec::new();
        };
        let mut spans = Vec::new();
        let mut col = 0;
        while col < line.cols() {
            match explicit_link_at(snapshot, viewport_row, col) {
                Some(link) => {
                    col = link.end_col + 1;
                    spans.push(link);
                }
                None => col += 1,
            }
        }
        spans
    }

    /// URL-like text touching a viewport row. A URL that continues onto
    /// neighbouring rows through soft wraps is reported with its full
    /// target and only the columns on this row.
    pub fn heuristic_spans(&self, snapshot: &Snapshot, viewport_row: usize) -> Vec<Link> {
        if snapshot.line(viewport_row).is_none() {
            return Vec::new();
        }
        let abs = snapshot.absolute_row(viewport_row);
        let (first, last) = logical_line(snapshot, abs);
        let text = LogicalText::collect(snapshot, first, last);

        let mut links = Vec::new();
        for found in URL_RE.find_iter(&text.text) {
            let url = trim_url(found.as_str());
            if !has_target(url) {
                continue;
            }
            let end = found.start() + url.len();
            let mut cols = text
                .chars
                .iter()
                .filter(|c| c.byte >= found.start() && c.byte < end);
            if cols.clone().any(|c| c.linked) {
                continue;
            }
            let on_row: Vec<&CharPos> = cols.by_ref().filter(|c| c.row == abs).collect();
            let (Some(first_char), Some(last_char)) = (on_row.first(), on_row.last()) else {
                continue;
            };
            links.push(Link {
                url: normalize(url),
                source: LinkSource::Heuristic,
                row: viewport_row,
                start_col: first_char.col,
                end_col: last_char.col + last_char.width.saturating_sub(1),
            });
        }
        links
    }
}

fn explicit_link_at(snapshot: &Snapshot, viewport_row: usize, col: usize) -> Option<Link> {
    let line = snapshot.line(viewport_row)?;
    let id = line.get(col)?.hyperlink_id;
    if id == 0 {
        return None;
    }
    let url = snapshot.hyperlink(id)?;
    let same = |c: usize| line.get(c).is_some_and(|cell| cell.hyperlink_id == id);
    let mut start = col;
    while start > 0 && same(start - 1) {
        start -= 1;
    }
    let mut end = col;
    while same(end + 1) {
        end += 1;
    }
    Some(Link {
        url: url.to_owned(),
        source: LinkSource::Explicit,
        row: viewport_row,
        start_col: start,
        end_col: end,
    })
}

/// Absolute rows of the soft-wrapped line containing `abs`.
fn logical_line(snapshot: &Snapshot, abs: usize) -> (usize, usize) {
    let wrapped = |row: usize| snapshot.absolute_line(row).is_some_and(|l: &Line| l.wrapped);
    let mut first = abs;
    while first > 0 && wrapped(first - 1) {
        first -= 1;
    }
    let mut last = abs;
    while wrapped(last) && last + 1 < snapshot.total_rows() {
        last += 1;
    }
    (first, last)
}

struct CharPos {
    byte: usize,
    row: usize,
    col: usize,
    width: usize,
    linked: bool,
}

/// Text of a run of rows with the cell each character came from.
struct LogicalText {
    text: String,
    chars: Vec<CharPos>,
}

impl LogicalText {
    fn collect(snapshot: &Snapshot, first: usize, last: usize) -> Self {
        let mut text = String::new();
        let mut chars = Vec::new();
        for row in first..=last {
            let Some(line) = snapshot.absolute_line(row) else {
                continue;
            };
            for (col, cell) in line.iter().enumerate() {
                let start = text.len();
                cell.write_text(&mut text);
                for (offset, _) in text[start..].char_indices() {
                    chars.push(CharPos {
                        byte: start + offset,
                        row,
                        col,
                        width: cell.width(),
                        linked: cell.hyperlink_id != 0,
                    });
                }
            }
        }
        Self { text, chars }
    }
}

/// Drop trailing punctuation and closing brackets that have no opening
/// partner inside the URL.
fn trim_url(url: &str) -> &str {
    let mut s = url;
    loop {
        let before = s;
        s = s.trim_end_matches(['.', ',', ';', ':', '!', '?', '\'', '"']);
        for (open, close) in [('(', ')'), ('[', ']')] {
            if let Some(stripped) = s.strip_suffix(close) {
                let opens = s.matches(open).count();
                let closes = s.matches(close).count();
                if closes > opens {
                    s = stripped;
                }
            }
        }
        if s == before {
            return s;
        }
    }
}

fn has_target(url: &str) -> bool {
    let rest = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .or_else(|| url.strip_prefix("mailto:"))
        .or_else(|| url.strip_prefix("www."));
    rest.is_some_and(|r| !r.is_empty())
}

fn normalize(url: &str) -> String {
    if url.starts_with("www.") {
        format!("http://{url}")
    } else {
        url.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dimensions, Screen};

    fn screen_with(text: &str, cols: usize, rows: usize) -> Screen {
        let mut screen = Screen::new(Dimensions::new(cols, rows), 100);
        text.chars().for_each(|c| screen.print(c));
        screen
    }

    #[test]
    fn test_resolve_heuristic_url() {
        let screen = screen_with("see https://example.com/a?b=1 now", 60, 2);
        let snap = screen.snapshot(0);
        let detector = LinkDetector::new(true);

        let link = detector.resolve(&snap, 0, 10).unwrap();
        assert_eq!(link.url, "https://example.com/a?b=1");
        assert_eq!(link.source, LinkSource::Heuristic);
        assert_eq!((link.start_col, link.end_col), (4, 28));

        assert!(detector.resolve(&snap, 0, 1).is_none());
        assert!(detector.resolve(&snap, 0, 30).is_none());
    }

    #[test]
    fn test_resolve_heuristic_disabled() {
        let screen = screen_with("https://example.com", 40, 1);
        let snap = screen.snapshot(0);
        assert!(LinkDetector::new(false).resolve(&snap, 0, 3).is_none());
    }

    #[test]
    fn test_resolve_explicit_even_when_heuristic_disabled() {
        let mut screen = Screen::new(Dimensions::new(40, 1), 100);
        "go ".chars().for_each(|c| screen.print(c));
        screen.open_hyperlink(None, "https://target.test/");
        "here".chars().for_each(|c| screen.print(c));
        screen.close_hyperlink();
        let snap = screen.snapshot(0);

        let link = LinkDetector::new(false).resolve(&snap, 0, 4).unwrap();
        assert_eq!(link.url, "https://target.test/");
        assert_eq!(link.source, LinkSource::Explicit);
        assert_eq!((link.start_col, link.end_col), (3, 6));
        assert!(LinkDetector::new(false).resolve(&snap, 0, 2).is_none());
    }

    #[test]
    fn test_trailing_punctuation_trimmed() {
        let screen = screen_with("(see https://a.test/x_(y)). Done", 60, 1);
        let snap = screen.snapshot(0);
        let spans = LinkDetector::new(true).heuristic_spans(&snap, 0);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].url, "https://a.test/x_(y)");
    }

    #[test]
    fn test_www_and_mailto() {
        let screen = screen_with("www.rust-lang.org mailto:me@x.test", 60, 1);
        let snap = screen.snapshot(0);
        let urls: Vec<String> = LinkDetector::new(true)
            .heuristic_spans(&snap, 0)
            .into_iter()
            .map(|l| l.url)
            .collect();
        assert_eq!(urls, vec!["http://www.rust-lang.org", "mailto:me@x.test"]);
    }

    #[test]
    fn test_bare_scheme_is_not_a_link() {
        let screen = screen_with("http:// nothing", 40, 1);
        let snap = screen.snapshot(0);
        assert!(LinkDetector::new(true).heuristic_spans(&snap, 0).is_empty());
    }

    #[test]
    fn test_url_across_soft_wrap() {
        let screen = screen_with("xx https://wrap.test/long", 10, 3);
        let snap = screen.snapshot(0);
        let detector = LinkDetector::new(true);

        let first = detector.resolve(&snap, 0, 5).unwrap();
        assert_eq!(first.url, "https://wrap.test/long");
        assert_eq!((first.start_col, first.end_col), (3, 9));

        let second = detector.resolve(&snap, 2, 1).unwrap();
        assert_eq!(second.url, "https://wrap.test/long");
        assert_eq!(second.row, 2);
    }

    #[test]
    fn test_explicit_spans() {
        let mut screen = Screen::new(Dimensions::new(20, 1), 100);
        screen.open_hyperlink(None, "https://a.test");
        "ab".chars().for_each(|c| screen.print(c));
        screen.close_hyperlink();
        screen.print(' ');
        screen.open_hyperlink(None, "https://b.test");
        "cd".chars().for_each(|c| screen.print(c));
        screen.close_hyperlink();
        let snap = screen.snapshot(0);

        let spans = LinkDetector::default().explicit_spans(&snap, 0);
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start_col, spans[0].end_col), (0, 1));
        assert_eq!(spans[1].url, "https://b.test");
    }

    #[test]
    fn test_trim_url() {
        assert_eq!(trim_url("https://a.test/."), "https://a.test/");
        assert_eq!(trim_url("https://a.test/)"), "https://a.test/");
        assert_eq!(trim_url("https://a.test/(x)"), "https://a.test/(x)");
        assert_eq!(trim_url("https://a.test/]'\","), "https://a.test/");
    }
}
