//! Text selection over scrollback and the live screen
//!
//! Endpoints are stored as absolute buffer positions (see
//! [`Snapshot::absolute_row`]) so a selection survives scrolling the view.
//! Every query resolves against the snapshot it is given.

use crate::cell::Cell;
use crate::line::Line;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    None,
    /// Exact cell range
    Char,
    /// Whole words around both ends
    Word,
    /// Whole rows
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPhase {
    #[default]
    Idle,
    /// Pointer is down and dragging the head
    Selecting,
    Selected,
}

/// Absolute buffer position: scrollback rows first, then live rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct BufferPoint {
    pub row: usize,
    pub col: usize,
}

impl BufferPoint {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Characters that belong to a word besides letters and digits, so that
/// paths, URLs and e-mail addresses select as one word.
const WORD_PUNCTUATION: &str = "_-./~:@%+=?&#";

pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || WORD_PUNCTUATION.contains(c)
}

#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    mode: SelectionMode,
    phase: SelectionPhase,
    anchor: BufferPoint,
    head: BufferPoint,
    /// Word containing the anchor, Word mode only
    anchor_word: (BufferPoint, BufferPoint),
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.mode != SelectionMode::None
    }

    /// Begin a selection at a viewport position. `SelectionMode::None`
    /// clears instead.
    pub fn start(&mut self, snapshot: &Snapshot, viewport_row: usize, col: usize, mode: SelectionMode) {
        if mode == SelectionMode::None {
            self.clear();
            return;
        }
        let point = resolve(snapshot, viewport_row, col);
        self.mode = mode;
        self.phase = SelectionPhase::Selecting;
        self.anchor = point;
        self.head = point;
        self.anchor_word = word_bounds(snapshot, point);
    }

    /// Move the head to a viewport position.
    pub fn update(&mut self, snapshot: &Snapshot, viewport_row: usize, col: usize) {
        if self.phase == SelectionPhase::Idle {
            return;
        }
        self.head = resolve(snapshot, viewport_row, col);
    }

    /// Freeze the head.
    pub fn end(&mut self) {
        if self.phase == SelectionPhase::Selecting {
            self.phase = SelectionPhase::Selected;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// `n` rows were dropped from the front of scrollback. Endpoints shift
    /// up with the content; a selection that lay entirely in the dropped
    /// rows is cleared, one that straddled them is clamped to row 0.
    pub fn on_lines_evicted(&mut self, n: usize) {
        if n == 0 || !self.is_active() {
            return;
        }
        if self.anchor.row.max(self.head.row) < n {
            log::debug!("selection evicted with scrollback");
            self.clear();
            return;
        }
        for point in [
            &mut self.anchor,
            &mut self.head,
            &mut self.anchor_word.0,
            &mut self.anchor_word.1,
        ] {
            if point.row < n {
                *point = BufferPoint::new(0, 0);
            } else {
                point.row -= n;
            }
        }
    }

    /// Ordered inclusive endpoints after mode expansion.
    pub fn range(&self, snapshot: &Snapshot) -> Option<(BufferPoint, BufferPoint)> {
        match self.mode {
            SelectionMode::None => None,
            SelectionMode::Char => Some(ordered(self.anchor, self.head)),
            SelectionMode::Word => {
                let head_word = word_bounds(snapshot, self.head);
                if self.head >= self.anchor {
                    Some((self.anchor_word.0, head_word.1.max(self.anchor_word.1)))
                } else {
                    Some((head_word.0, self.anchor_word.1))
                }
            }
            SelectionMode::Line => {
                let (start, end) = ordered(self.anchor, self.head);
                let last_col = snapshot.cols().saturating_sub(1);
                Some((BufferPoint::new(start.row, 0), BufferPoint::new(end.row, last_col)))
            }
        }
    }

    /// Whether the cell at a viewport position is selected, for rendering.
    pub fn is_selected(&self, snapshot: &Snapshot, viewport_row: usize, col: usize) -> bool {
        let point = BufferPoint::new(snapshot.absolute_row(viewport_row), col);
        self.range(snapshot)
            .is_some_and(|(start, end)| start <= point && point <= end)
    }

    /// Selected text. Rows are joined with `\n` unless soft-wrapped, and
    /// trailing blanks of each row are dropped. Rows no longer present in
    /// the snapshot are skipped.
    pub fn copy(&self, snapshot: &Snapshot) -> Option<String> {
        let (start, end) = self.range(snapshot)?;
        let mut text = String::new();

        for row in start.row..=end.row {
            let Some(line) = snapshot.absolute_line(row) else {
                continue;
            };
            let from = if row == start.row {
                wide_start(line, start.col)
            } else {
                0
            };
            let to = if row == end.row {
                end.col.saturating_add(1)
            } else {
                line.cols()
            };
            // Blanks before a soft wrap are content; elsewhere only the
            // never-written tail of the row is dropped.
            let to = if line.wrapped && row != end.row {
                to - usize::from(pads_wide_wrap(line, snapshot.absolute_line(row + 1)))
            } else {
                to.min(line.content_len())
            };
            text.push_str(&line.cell_text(from, to));
            if row != end.row && !line.wrapped {
                text.push('\n');
            }
        }
        Some(text)
    }
}

fn ordered(a: BufferPoint, b: BufferPoint) -> (BufferPoint, BufferPoint) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Absolute position of a viewport cell, clamped into the snapshot.
fn resolve(snapshot: &Snapshot, viewport_row: usize, col: usize) -> BufferPoint {
    let row = viewport_row.min(snapshot.rows().saturating_sub(1));
    BufferPoint::new(
        snapshot.absolute_row(row),
        col.min(snapshot.cols().saturating_sub(1)),
    )
}

/// Step back onto the left half when `col` is a wide character's right half.
fn wide_start(line: &Line, col: usize) -> usize {
    match line.get(col) {
        Some(cell) if cell.is_continuation() => col.saturating_sub(1),
        _ => col,
    }
}

/// Whether the last cell of `line` is the blank left behind when a wide
/// character did not fit and moved to `next`.
fn pads_wide_wrap(line: &Line, next: Option<&Line>) -> bool {
    let last = line.cols().checked_sub(1).and_then(|c| line.get(c));
    last.is_some_and(Cell::is_empty)
        && next.and_then(|n| n.get(0)).is_some_and(Cell::is_wide)
}

fn cell_is_word(line: &Line, col: usize) -> bool {
    let cell = match line.get(col) {
        Some(cell) if cell.is_continuation() => col.checked_sub(1).and_then(|c| line.get(c)),
        other => other,
    };
    cell.map(Cell::char).is_some_and(is_word_char)
}

/// Inclusive bounds of the word at `point`, or the point itself when it is
/// not on a word character.
fn word_bounds(snapshot: &Snapshot, point: BufferPoint) -> (BufferPoint, BufferPoint) {
    let Some(line) = snapshot.absolute_line(point.row) else {
        return (point, point);
    };
    if !cell_is_word(line, point.col) {
        return (point, point);
    }
    let mut start = point.col;
    while start > 0 && cell_is_word(line, start - 1) {
        start -= 1;
    }
    let mut end = point.col;
    while end + 1 < line.cols() && cell_is_word(line, end + 1) {
        end += 1;
    }
    (
        BufferPoint::new(point.row, start),
        BufferPoint::new(point.row, end),
    )
}
