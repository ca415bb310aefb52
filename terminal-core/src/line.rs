//! One row of cells
//!
//! `wrapped` marks a row whose text ran past the right margin and carries
//! on in the next row. Copy and reflow join such rows without a newline.

use crate::cell::{Cell, CellAttributes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    cells: Vec<Cell>,
    /// Soft-wrapped into the following row
    pub wrapped: bool,
}

impl Line {
    pub fn new(cols: usize) -> Self {
        Self::with_attrs(cols, CellAttributes::default())
    }

    pub fn with_attrs(cols: usize, attrs: CellAttributes) -> Self {
        Self {
            cells: vec![Cell::blank(attrs); cols],
            wrapped: false,
        }
    }

    pub(crate) fn from_cells(cells: Vec<Cell>, wrapped: bool) -> Self {
        Self { cells, wrapped }
    }

    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    pub fn get_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn clear(&mut self, attrs: CellAttributes) {
        for cell in &mut self.cells {
            cell.clear(attrs);
        }
        self.wrapped = false;
    }

    /// Clear from `col` to the end of the line.
    pub fn clear_from(&mut self, col: usize, attrs: CellAttributes) {
        for cell in self.cells.iter_mut().skip(col) {
            cell.clear(attrs);
        }
        self.wrapped = false;
        self.repair_wide(attrs);
    }

    /// Clear from the start of the line through `col` inclusive.
    pub fn clear_to(&mut self, col: usize, attrs: CellAttributes) {
        for cell in self.cells.iter_mut().take(col.saturating_add(1)) {
            cell.clear(attrs);
        }
        self.repair_wide(attrs);
    }

    /// Truncate or extend with blanks. Does not rewrap.
    pub fn resize(&mut self, cols: usize, attrs: CellAttributes) {
        self.cells.resize(cols, Cell::blank(attrs));
        self.repair_wide(attrs);
    }

    /// Insert `n` blanks at `col`; cells pushed past the margin are lost.
    pub fn insert_cells(&mut self, col: usize, n: usize, attrs: CellAttributes) {
        let len = self.cells.len();
        if col >= len {
            return;
        }
        let n = n.min(len - col);
        self.cells.truncate(len - n);
        self.cells
            .splice(col..col, std::iter::repeat(Cell::blank(attrs)).take(n));
        self.repair_wide(attrs);
    }

    /// Delete `n` cells at `col`, pulling the rest left and filling the
    /// right margin with blanks.
    pub fn delete_cells(&mut self, col: usize, n: usize, attrs: CellAttributes) {
        let len = self.cells.len();
        if col >= len {
            return;
        }
        let n = n.min(len - col);
        self.cells.drain(col..col + n);
        self.cells.resize(len, Cell::blank(attrs));
        self.repair_wide(attrs);
    }

    /// Blank `n` cells from `col` without shifting.
    pub fn erase_cells(&mut self, col: usize, n: usize, attrs: CellAttributes) {
        let end = col.saturating_add(n).min(self.cells.len());
        for cell in self.cells.iter_mut().take(end).skip(col) {
            cell.clear(attrs);
        }
        self.repair_wide(attrs);
    }

    /// Blank any half of a wide character whose other half is gone.
    pub(crate) fn repair_wide(&mut self, attrs: CellAttributes) {
        let len = self.cells.len();
        for col in 0..len {
            let orphan = if self.cells[col].is_continuation() {
                col == 0 || !self.cells[col - 1].is_wide()
            } else if self.cells[col].is_wide() {
                col + 1 >= len || !self.cells[col + 1].is_continuation()
            } else {
                false
            };
            if orphan {
                self.cells[col].clear(attrs);
            }
        }
    }

    /// Blank the other half of a wide character at `col` before the cell
    /// is overwritten.
    pub(crate) fn clear_wide_pair(&mut self, col: usize) {
        let Some(cell) = self.cells.get(col) else {
            return;
        };
        let partner = if cell.is_continuation() {
            col.checked_sub(1)
        } else if cell.is_wide() {
            Some(col + 1)
        } else {
            None
        };
        if let Some(other) = partner.and_then(|c| self.cells.get_mut(c)) {
            let attrs = other.attrs;
            other.clear(attrs);
        }
    }

    /// Number of columns up to and including the last non-blank cell.
    pub fn content_len(&self) -> usize {
        self.cells
            .iter()
            .rposition(|c| !c.is_empty() || !c.attrs.is_default())
            .map_or(0, |i| i + 1)
    }

    /// Text of the whole row with trailing blanks removed.
    pub fn text(&self) -> String {
        self.text_range(0, self.cells.len())
    }

    /// Text of columns `start..end` with trailing blanks removed.
    pub fn text_range(&self, start: usize, end: usize) -> String {
        let mut out = self.cell_text(start, end);
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out
    }

    /// Text of columns `start..end`, blanks included.
    pub fn cell_text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.cells.len());
        let mut out = String::new();
        if start < end {
            for cell in &self.cells[start..end] {
                cell.write_text(&mut out);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }
}
