//! Cursor position and the state saved by DECSC

use crate::cell::CellAttributes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub col: usize,
    pub row: usize,
    /// Rendition applied to newly printed characters
    pub attrs: CellAttributes,
    /// The last column was written; the next printable wraps first
    pub pending_wrap: bool,
    /// Hyperlink attached to newly printed characters, 0 for none
    pub hyperlink_id: u32,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            col: 0,
            row: 0,
            attrs: CellAttributes::default(),
            pending_wrap: false,
            hyperlink_id: 0,
        }
    }

    /// Move to (`col`, `row`) clamped to a `cols` x `rows` screen.
    pub fn move_to(&mut self, col: usize, row: usize, cols: usize, rows: usize) {
        self.col = col.min(cols.saturating_sub(1));
        self.row = row.min(rows.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Move up, stopping at `min_row`.
    pub fn move_up(&mut self, n: usize, min_row: usize) {
        self.row = self.row.saturating_sub(n).max(min_row.min(self.row));
        self.pending_wrap = false;
    }

    /// Move down, stopping at `max_row`.
    pub fn move_down(&mut self, n: usize, max_row: usize) {
        self.row = self.row.saturating_add(n).min(max_row.max(self.row));
        self.pending_wrap = false;
    }

    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
        self.pending_wrap = false;
    }

    pub fn move_right(&mut self, n: usize, cols: usize) {
        self.col = self.col.saturating_add(n).min(cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.pending_wrap = false;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// State stored by DECSC / `CSI s` and restored by DECRC / `CSI u`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SavedCursor {
    pub col: usize,
    pub row: usize,
    pub attrs: CellAttributes,
    pub origin_mode: bool,
    pub pending_wrap: bool,
}

impl SavedCursor {
    pub fn save(cursor: &Cursor, origin_mode: bool) -> Self {
        Self {
            col: cursor.col,
            row: cursor.row,
            attrs: cursor.attrs,
            origin_mode,
            pending_wrap: cursor.pending_wrap,
        }
    }

    /// Restore into `cursor`, clamped to the current screen size.
    /// Returns the saved origin mode.
    pub fn restore(&self, cursor: &mut Cursor, cols: usize, rows: usize) -> bool {
        cursor.move_to(self.col, self.row, cols, rows);
        cursor.attrs = self.attrs;
        cursor.pending_wrap = self.pending_wrap && cursor.col == self.col;
        self.origin_mode
    }
}
