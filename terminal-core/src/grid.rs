//! The live rows of a screen buffer
//!
//! Rows are reference counted so a snapshot can share them; a row is only
//! copied when it is written while a snapshot still holds it.

use std::sync::Arc;

use crate::cell::CellAttributes;
use crate::line::Line;
use crate::Dimensions;

#[derive(Debug, Clone)]
pub struct Grid {
    /// Row 0 is the top of the screen
    lines: Vec<Arc<Line>>,
    cols: usize,
}

impl Grid {
    pub fn new(dims: Dimensions) -> Self {
        Self {
            lines: (0..dims.rows).map(|_| Arc::new(Line::new(dims.cols))).collect(),
            cols: dims.cols,
        }
    }

    pub(crate) fn from_lines(lines: Vec<Arc<Line>>, cols: usize) -> Self {
        Self { lines, cols }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.cols, self.lines.len())
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.lines.len()
    }

    /// Panics if `row` is out of bounds.
    pub fn line(&self, row: usize) -> &Line {
        &self.lines[row]
    }

    /// Panics if `row` is out of bounds.
    pub fn line_mut(&mut self, row: usize) -> &mut Line {
        Arc::make_mut(&mut self.lines[row])
    }

    pub fn get_line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row).map(|l| l.as_ref())
    }

    /// Shared handles to every row, top to bottom.
    pub fn shared_lines(&self) -> Vec<Arc<Line>> {
        self.lines.clone()
    }

    pub fn clear(&mut self, attrs: CellAttributes) {
        for line in &mut self.lines {
            *line = Arc::new(Line::with_attrs(self.cols, attrs));
        }
    }

    /// ED 0: from (`row`, `col`) to the end of the screen.
    pub fn clear_below(&mut self, row: usize, col: usize, attrs: CellAttributes) {
        if row >= self.rows() {
            return;
        }
        self.line_mut(row).clear_from(col, attrs);
        for line in self.lines.iter_mut().skip(row + 1) {
            *line = Arc::new(Line::with_attrs(self.cols, attrs));
        }
    }

    /// ED 1: from the top of the screen through (`row`, `col`).
    pub fn clear_above(&mut self, row: usize, col: usize, attrs: CellAttributes) {
        if row >= self.rows() {
            return;
        }
        for line in self.lines.iter_mut().take(row) {
            *line = Arc::new(Line::with_attrs(self.cols, attrs));
        }
        self.line_mut(row).clear_to(col, attrs);
    }

    /// Scroll rows `top..=bottom` up by `n`, filling the bottom with blanks.
    /// Returns the rows that left the region, oldest first.
    pub fn scroll_up(
        &mut self,
        top: usize,
        bottom: usize,
        n: usize,
        attrs: CellAttributes,
    ) -> Vec<Arc<Line>> {
        if top > bottom || bottom >= self.rows() {
            return Vec::new();
        }
        let n = n.min(bottom - top + 1);
        let region = &mut self.lines[top..=bottom];
        region.rotate_left(n);
        let start = region.len() - n;
        region[start..]
            .iter_mut()
            .map(|slot| std::mem::replace(slot, Arc::new(Line::with_attrs(self.cols, attrs))))
            .collect()
    }

    /// Scroll rows `top..=bottom` down by `n`, filling the top with blanks.
    pub fn scroll_down(&mut self, top: usize, bottom: usize, n: usize, attrs: CellAttributes) {
        if top > bottom || bottom >= self.rows() {
            return;
        }
        let n = n.min(bottom - top + 1);
        let region = &mut self.lines[top..=bottom];
        region.rotate_right(n);
        for slot in &mut region[..n] {
            *slot = Arc::new(Line::with_attrs(self.cols, attrs));
        }
    }

    /// IL: open `n` blank rows at `row`; rows pushed below `bottom` are lost.
    pub fn insert_lines(&mut self, row: usize, n: usize, bottom: usize, attrs: CellAttributes) {
        self.scroll_down(row, bottom, n, attrs);
    }

    /// DL: remove `n` rows at `row`; blanks appear at `bottom`.
    pub fn delete_lines(&mut self, row: usize, n: usize, bottom: usize, attrs: CellAttributes) {
        self.scroll_up(row, bottom, n, attrs);
    }

    /// Truncate or pad rows and columns without rewrapping.
    pub fn resize(&mut self, dims: Dimensions, attrs: CellAttributes) {
        if dims.cols != self.cols {
            for line in &mut self.lines {
                Arc::make_mut(line).resize(dims.cols, attrs);
            }
        }
        self.lines
            .resize_with(dims.rows, || Arc::new(Line::with_attrs(dims.cols, attrs)));
        self.cols = dims.cols;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().map(|l| l.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_rows(rows: usize) -> Grid {
        let mut grid = Grid::new(Dimensions::new(10, rows));
        for row in 0..rows {
            let c = char::from(b'A' + row as u8);
            grid.line_mut(row).get_mut(0).map(|cell| cell.set_char(c));
        }
        grid
    }

    fn first_chars(grid: &Grid) -> String {
        grid.iter()
            .map(|l| l.get(0).map_or(' ', |c| c.char()))
            .collect()
    }

    #[test]
    fn test_grid_new() {
        let grid = Grid::new(Dimensions::new(80, 24));
        assert_eq!(grid.cols(), 80);
        assert_eq!(grid.rows(), 24);
    }

    #[test]
    fn test_grid_scroll_up() {
        let mut grid = grid_with_rows(5);
        let out = grid.scroll_up(0, 4, 2, CellAttributes::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text(), "A");
        assert_eq!(out[1].text(), "B");
        assert_eq!(first_chars(&grid), "CDE  ");
    }

    #[test]
    fn test_grid_scroll_up_region() {
        let mut grid = grid_with_rows(5);
        let out = grid.scroll_up(1, 3, 1, CellAttributes::default());
        assert_eq!(out[0].text(), "B");
        assert_eq!(first_chars(&grid), "ACD E");
    }

    #[test]
    fn test_grid_scroll_down() {
        let mut grid = grid_with_rows(5);
        grid.scroll_down(0, 4, 2, CellAttributes::default());
        assert_eq!(first_chars(&grid), "  ABC");
    }

    #[test]
    fn test_grid_insert_delete_lines() {
        let mut grid = grid_with_rows(5);
        grid.insert_lines(1, 1, 4, CellAttributes::default());
        assert_eq!(first_chars(&grid), "A BCD");

        grid.delete_lines(1, 2, 4, CellAttributes::default());
        assert_eq!(first_chars(&grid), "ACD  ");
    }

    #[test]
    fn test_grid_clear_below_above() {
        let mut grid = grid_with_rows(5);
        grid.clear_below(2, 0, CellAttributes::default());
        assert_eq!(first_chars(&grid), "AB   ");

        let mut grid = grid_with_rows(5);
        grid.clear_above(2, 0, CellAttributes::default());
        assert_eq!(first_chars(&grid), "   DE");
    }

    #[test]
    fn test_grid_resize() {
        let mut grid = grid_with_rows(3);
        grid.resize(Dimensions::new(4, 5), CellAttributes::default());
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.cols(), 4);
        assert!(grid.iter().all(|l| l.cols() == 4));
        assert_eq!(first_chars(&grid), "ABC  ");
    }

    #[test]
    fn test_grid_copy_on_write() {
        let mut grid = grid_with_rows(2);
        let shared = grid.shared_lines();
        grid.line_mut(0).get_mut(0).map(|cell| cell.set_char('Z'));
        assert_eq!(shared[0].text(), "A");
        assert_eq!(grid.line(0).text(), "Z");
    }
}
