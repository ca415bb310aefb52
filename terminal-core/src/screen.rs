//! Terminal screen - the state every parsed operation is applied to
//!
//! Ties together the primary and alternate grids, cursor, modes, scroll
//! region, tab stops, scrollback and hyperlink registry. Positions taken
//! by the public movement methods are 1-indexed as in the VT protocol;
//! everything stored is 0-indexed.

use std::sync::Arc;

use crate::cell::{char_width, Cell, CellAttributes};
use crate::cursor::{Cursor, SavedCursor};
use crate::grid::Grid;
use crate::hyperlink::HyperlinkRegistry;
use crate::line::Line;
use crate::modes::Modes;
use crate::scrollback::Scrollback;
use crate::snapshot::{Snapshot, SnapshotCursor};
use crate::Dimensions;

const TAB_WIDTH: usize = 8;

/// Titles longer than this are truncated.
const MAX_TITLE_CHARS: usize = 4096;

#[derive(Debug, Clone)]
pub struct Screen {
    primary: Grid,
    alternate: Grid,
    using_alternate: bool,
    /// History of the primary screen only
    scrollback: Scrollback,
    cursor: Cursor,
    /// DECSC / DECRC slot
    saved_cursor: SavedCursor,
    /// Primary cursor while the alternate screen is shown
    primary_cursor: SavedCursor,
    modes: Modes,
    /// Inclusive (top, bottom); `None` is the whole screen
    scroll_region: Option<(usize, usize)>,
    tab_stops: Vec<bool>,
    title: String,
    hyperlinks: HyperlinkRegistry,
}

impl Screen {
    pub fn new(dims: Dimensions, scrollback_lines: usize) -> Self {
        let dims = Dimensions::new(dims.cols.max(1), dims.rows.max(1));
        Self {
            primary: Grid::new(dims),
            alternate: Grid::new(dims),
            using_alternate: false,
            scrollback: Scrollback::new(scrollback_lines),
            cursor: Cursor::new(),
            saved_cursor: SavedCursor::default(),
            primary_cursor: SavedCursor::default(),
            modes: Modes::new(),
            scroll_region: None,
            tab_stops: default_tab_stops(dims.cols),
            title: String::new(),
            hyperlinks: HyperlinkRegistry::new(),
        }
    }

    /// The grid currently being written (primary or alternate)
    pub fn grid(&self) -> &Grid {
        if self.using_alternate {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn grid_mut(&mut self) -> &mut Grid {
        if self.using_alternate {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    fn cursor_line(&mut self) -> &mut Line {
        let row = self.cursor.row;
        self.grid_mut().line_mut(row)
    }

    pub fn dimensions(&self) -> Dimensions {
        self.grid().dimensions()
    }

    pub fn cols(&self) -> usize {
        self.grid().cols()
    }

    pub fn rows(&self) -> usize {
        self.grid().rows()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut Modes {
        &mut self.modes
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn set_scrollback_limit(&mut self, max_lines: usize) {
        self.scrollback.set_max_lines(max_lines);
    }

    pub fn is_alternate_screen(&self) -> bool {
        self.using_alternate
    }

    pub fn line(&self, row: usize) -> &Line {
        self.grid().line(row)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.chars().take(MAX_TITLE_CHARS).collect();
    }

    pub fn hyperlinks(&self) -> &HyperlinkRegistry {
        &self.hyperlinks
    }

    /// OSC 8 open: characters printed from now on link to `uri`.
    pub fn open_hyperlink(&mut self, id: Option<&str>, uri: &str) {
        self.cursor.hyperlink_id = self.hyperlinks.register(id, uri);
    }

    /// OSC 8 close
    pub fn close_hyperlink(&mut self) {
        self.cursor.hyperlink_id = 0;
    }

    /// Scroll region bounds, 0-indexed and inclusive
    pub fn scroll_region(&self) -> (usize, usize) {
        self.scroll_region
            .unwrap_or((0, self.rows().saturating_sub(1)))
    }

    /// DECSTBM with 1-indexed margins. An empty or inverted region is
    /// ignored. The cursor goes home either way.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let last = self.rows().saturating_sub(1);
        let top = top.saturating_sub(1).min(last);
        let bottom = bottom.saturating_sub(1).min(last);

        if top < bottom {
            self.scroll_region = if top == 0 && bottom == last {
                None
            } else {
                Some((top, bottom))
            };
        } else {
            log::debug!("ignoring scroll region {}..{}", top + 1, bottom + 1);
        }
        self.move_cursor_to(1, 1);
    }

    /// Write a character at the cursor and advance it.
    pub fn print(&mut self, c: char) {
        let width = char_width(c);
        if width == 0 {
            self.attach_combining(c);
            return;
        }

        let cols = self.cols();
        if self.cursor.pending_wrap && self.modes.auto_wrap {
            self.wrap_to_next_row();
        }
        self.cursor.pending_wrap = false;

        if width == 2 && self.cursor.col + 1 >= cols {
            if cols < 2 {
                log::debug!("dropping wide character {c:?} on a {cols}-column screen");
                return;
            }
            if self.modes.auto_wrap {
                self.wrap_to_next_row();
            } else {
                self.cursor.col = cols - 2;
            }
        }

        let col = self.cursor.col;
        let attrs = self.cursor.attrs;
        let link = self.cursor.hyperlink_id;
        let insert = self.modes.insert_mode;
        let line = self.cursor_line();
        if insert {
            line.insert_cells(col, width, attrs);
        }
        line.clear_wide_pair(col);
        if width == 2 {
            line.clear_wide_pair(col + 1);
        }
        if let Some(cell) = line.get_mut(col) {
            cell.set_char(c);
            cell.attrs = attrs;
            cell.hyperlink_id = link;
        }
        if width == 2 {
            if let Some(cell) = line.get_mut(col + 1) {
                cell.set_continuation(attrs, link);
            }
        }

        let next = col + width;
        if next >= cols {
            self.cursor.col = cols - 1;
            self.cursor.pending_wrap = self.modes.auto_wrap;
        } else {
            self.cursor.col = next;
        }
    }

    /// Mark the cursor row as soft-wrapped and continue on the next row.
    fn wrap_to_next_row(&mut self) {
        self.cursor_line().wrapped = true;
        self.cursor.col = 0;
        self.cursor.pending_wrap = false;
        self.index();
    }

    /// Attach a zero-width character to the previously printed cell.
    fn attach_combining(&mut self, c: char) {
        let mut col = if self.cursor.pending_wrap {
            self.cursor.col
        } else if let Some(prev) = self.cursor.col.checked_sub(1) {
            prev
        } else {
            return;
        };
        let line = self.cursor_line();
        if col > 0 && line.get(col).is_some_and(Cell::is_continuation) {
            col -= 1;
        }
        if let Some(cell) = line.get_mut(col) {
            cell.push_combining(c);
        }
    }

    /// BS
    pub fn backspace(&mut self) {
        self.cursor.move_left(1);
    }

    /// HT: advance to the next tab stop, or the last column.
    pub fn tab(&mut self) {
        let cols = self.cols();
        let next = (self.cursor.col + 1..cols)
            .find(|&c| self.tab_stops.get(c).copied().unwrap_or(false))
            .unwrap_or(cols - 1);
        self.cursor.col = next;
        self.cursor.pending_wrap = false;
    }

    /// CR
    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    /// LF, VT and FF: index, plus carriage return in LNM mode.
    pub fn linefeed(&mut self) {
        self.index();
        if self.modes.linefeed_mode {
            self.cursor.carriage_return();
        }
    }

    /// IND: down one row, scrolling the region at its bottom margin.
    pub fn index(&mut self) {
        let (_, bottom) = self.scroll_region();
        if self.cursor.row == bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.rows() {
            self.cursor.row += 1;
        }
        self.cursor.pending_wrap = false;
    }

    /// RI: up one row, scrolling the region at its top margin.
    pub fn reverse_index(&mut self) {
        let (top, _) = self.scroll_region();
        if self.cursor.row == top {
            self.scroll_down(1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
        self.cursor.pending_wrap = false;
    }

    /// NEL
    pub fn next_line(&mut self) {
        self.index();
        self.cursor.carriage_return();
    }

    /// SU and scrolling at the bottom margin. Rows leaving the top of the
    /// primary screen go to scrollback when the region starts at row 0.
    pub fn scroll_up(&mut self, n: usize) {
        let (top, bottom) = self.scroll_region();
        let attrs = self.cursor.attrs;
        let scrolled = self.grid_mut().scroll_up(top, bottom, n, attrs);
        if !self.using_alternate && top == 0 {
            self.scrollback.push_lines(scrolled);
        }
    }

    /// SD
    pub fn scroll_down(&mut self, n: usize) {
        let (top, bottom) = self.scroll_region();
        let attrs = self.cursor.attrs;
        self.grid_mut().scroll_down(top, bottom, n, attrs);
    }

    /// CUP / HVP, 1-indexed. Relative to the scroll region in origin mode.
    pub fn move_cursor_to(&mut self, row: usize, col: usize) {
        let (cols, rows) = (self.cols(), self.rows());
        let row = row.saturating_sub(1);
        let col = col.saturating_sub(1);
        if self.modes.origin_mode {
            let (top, bottom) = self.scroll_region();
            self.cursor.move_to(col, (top + row).min(bottom), cols, rows);
        } else {
            self.cursor.move_to(col, row, cols, rows);
        }
    }

    /// CUU. Stops at the top margin when starting inside the region.
    pub fn move_cursor_up(&mut self, n: usize) {
        let (top, _) = self.scroll_region();
        let limit = if self.cursor.row >= top { top } else { 0 };
        self.cursor.move_up(n, limit);
    }

    /// CUD. Stops at the bottom margin when starting inside the region.
    pub fn move_cursor_down(&mut self, n: usize) {
        let (_, bottom) = self.scroll_region();
        let limit = if self.cursor.row <= bottom {
            bottom
        } else {
            self.rows() - 1
        };
        self.cursor.move_down(n, limit);
    }

    /// CUB
    pub fn move_cursor_left(&mut self, n: usize) {
        self.cursor.move_left(n);
    }

    /// CUF
    pub fn move_cursor_right(&mut self, n: usize) {
        let cols = self.cols();
        self.cursor.move_right(n, cols);
    }

    /// CHA, 1-indexed
    pub fn set_cursor_col(&mut self, col: usize) {
        let cols = self.cols();
        let row = self.cursor.row;
        self.cursor
            .move_to(col.saturating_sub(1), row, cols, self.rows());
    }

    /// VPA, 1-indexed
    pub fn set_cursor_row(&mut self, row: usize) {
        let col = self.cursor.col + 1;
        self.move_cursor_to(row, col);
    }

    /// DECSC
    pub fn save_cursor(&mut self) {
        self.saved_cursor = SavedCursor::save(&self.cursor, self.modes.origin_mode);
    }

    /// DECRC
    pub fn restore_cursor(&mut self) {
        let (cols, rows) = (self.cols(), self.rows());
        self.modes.origin_mode = self.saved_cursor.restore(&mut self.cursor, cols, rows);
    }

    /// ED. Never touches scrollback.
    pub fn erase_display(&mut self, mode: u16) {
        let attrs = self.cursor.attrs;
        let (row, col) = (self.cursor.row, self.cursor.col);
        match mode {
            0 => self.grid_mut().clear_below(row, col, attrs),
            1 => self.grid_mut().clear_above(row, col, attrs),
            2 => self.grid_mut().clear(attrs),
            3 => log::debug!("ED 3 (erase saved lines) ignored"),
            _ => log::debug!("unknown ED mode {mode}"),
        }
    }

    /// EL
    pub fn erase_line(&mut self, mode: u16) {
        let attrs = self.cursor.attrs;
        let col = self.cursor.col;
        match mode {
            0 => self.cursor_line().clear_from(col, attrs),
            1 => self.cursor_line().clear_to(col, attrs),
            2 => self.cursor_line().clear(attrs),
            _ => log::debug!("unknown EL mode {mode}"),
        }
    }

    /// ECH
    pub fn erase_chars(&mut self, n: usize) {
        let attrs = self.cursor.attrs;
        let col = self.cursor.col;
        self.cursor_line().erase_cells(col, n, attrs);
    }

    /// IL. No effect outside the scroll region.
    pub fn insert_lines(&mut self, n: usize) {
        let (top, bottom) = self.scroll_region();
        let row = self.cursor.row;
        if row < top || row > bottom {
            return;
        }
        let attrs = self.cursor.attrs;
        self.grid_mut().insert_lines(row, n, bottom, attrs);
        self.cursor.carriage_return();
    }

    /// DL. No effect outside the scroll region.
    pub fn delete_lines(&mut self, n: usize) {
        let (top, bottom) = self.scroll_region();
        let row = self.cursor.row;
        if row < top || row > bottom {
            return;
        }
        let attrs = self.cursor.attrs;
        self.grid_mut().delete_lines(row, n, bottom, attrs);
        self.cursor.carriage_return();
    }

    /// ICH
    pub fn insert_chars(&mut self, n: usize) {
        let attrs = self.cursor.attrs;
        let col = self.cursor.col;
        self.cursor.pending_wrap = false;
        self.cursor_line().insert_cells(col, n, attrs);
    }

    /// DCH
    pub fn delete_chars(&mut self, n: usize) {
        let attrs = self.cursor.attrs;
        let col = self.cursor.col;
        self.cursor.pending_wrap = false;
        self.cursor_line().delete_cells(col, n, attrs);
    }

    /// HTS
    pub fn set_tab_stop(&mut self) {
        if let Some(stop) = self.tab_stops.get_mut(self.cursor.col) {
            *stop = true;
        }
    }

    /// TBC: 0 clears the stop at the cursor, 3 clears all stops.
    pub fn clear_tab_stop(&mut self, mode: u16) {
        match mode {
            0 => {
                if let Some(stop) = self.tab_stops.get_mut(self.cursor.col) {
                    *stop = false;
                }
            }
            3 => self.tab_stops.iter_mut().for_each(|stop| *stop = false),
            _ => {}
        }
    }

    /// Switch to a cleared alternate screen, remembering the primary cursor.
    pub fn enter_alternate_screen(&mut self) {
        if self.using_alternate {
            return;
        }
        self.primary_cursor = SavedCursor::save(&self.cursor, self.modes.origin_mode);
        self.using_alternate = true;
        self.modes.alternate_screen = true;
        self.alternate.clear(CellAttributes::default());
        self.cursor.move_to(0, 0, self.cols(), self.rows());
    }

    /// Return to the primary screen and its cursor.
    pub fn exit_alternate_screen(&mut self) {
        if !self.using_alternate {
            return;
        }
        self.using_alternate = false;
        self.modes.alternate_screen = false;
        let (cols, rows) = (self.cols(), self.rows());
        self.primary_cursor.restore(&mut self.cursor, cols, rows);
    }

    /// DECALN: fill the screen with `E`, reset margins, home the cursor.
    pub fn alignment_test(&mut self) {
        for row in 0..self.rows() {
            let line = self.grid_mut().line_mut(row);
            line.clear(CellAttributes::default());
            line.iter_mut().for_each(|cell| cell.set_char('E'));
        }
        self.scroll_region = None;
        self.modes.origin_mode = false;
        self.move_cursor_to(1, 1);
    }

    /// RIS. Scrollback and the hyperlink registry survive.
    pub fn reset(&mut self) {
        let dims = self.dimensions();
        let attrs = CellAttributes::default();
        self.primary.clear(attrs);
        self.alternate.clear(attrs);
        self.using_alternate = false;
        self.cursor = Cursor::new();
        self.saved_cursor = SavedCursor::default();
        self.primary_cursor = SavedCursor::default();
        self.modes.reset();
        self.scroll_region = None;
        self.tab_stops = default_tab_stops(dims.cols);
        self.title.clear();
    }

    /// Resize both screens. The primary screen is rewrapped along its soft
    /// wraps; rows that no longer fit above the cursor move to scrollback
    /// and growing pulls them back.
    pub fn resize(&mut self, dims: Dimensions) {
        let dims = Dimensions::new(dims.cols.max(1), dims.rows.max(1));
        if dims == self.dimensions() {
            return;
        }

        if self.using_alternate {
            let old_rows = self.primary.rows();
            let saved = (self.primary_cursor.row, self.primary_cursor.col);
            let (row, col) = self.reflow_primary(dims, saved, old_rows);
            self.primary_cursor.row = row;
            self.primary_cursor.col = col;
            self.primary_cursor.pending_wrap = false;
            self.alternate.resize(dims, CellAttributes::default());
            let pending = self.cursor.pending_wrap;
            self.cursor.move_to(self.cursor.col, self.cursor.row, dims.cols, dims.rows);
            self.cursor.pending_wrap = pending && self.cursor.col + 1 == dims.cols;
        } else {
            let old_rows = self.primary.rows();
            let (row, col) =
                self.reflow_primary(dims, (self.cursor.row, self.cursor.col), old_rows);
            self.alternate.resize(dims, CellAttributes::default());
            self.cursor.move_to(col, row, dims.cols, dims.rows);
        }

        self.saved_cursor.row = self.saved_cursor.row.min(dims.rows - 1);
        self.saved_cursor.col = self.saved_cursor.col.min(dims.cols - 1);
        self.tab_stops = default_tab_stops(dims.cols);
        self.scroll_region = None;
    }

    /// Rewrap scrollback plus the used part of the primary grid into
    /// `dims`. Returns the new grid position of `cursor`.
    fn reflow_primary(
        &mut self,
        dims: Dimensions,
        cursor: (usize, usize),
        old_rows: usize,
    ) -> (usize, usize) {
        let used = (0..old_rows)
            .rev()
            .find(|&r| {
                let line = self.primary.line(r);
                line.wrapped || line.content_len() > 0
            })
            .map_or(0, |r| r + 1)
            .max(cursor.0 + 1)
            .min(old_rows);

        let mut source = self.scrollback.drain_all();
        let history_len = source.len();
        let cursor_source_row = history_len + cursor.0;
        source.extend(self.primary.shared_lines().into_iter().take(used));

        let mut out: Vec<Line> = Vec::with_capacity(source.len());
        let mut new_cursor = (0, 0);
        let mut first_live = 0;
        let mut logical: Vec<Cell> = Vec::new();
        let mut cursor_offset = None;
        let last = source.len().saturating_sub(1);
        for (i, line) in source.iter().enumerate() {
            if i == history_len {
                first_live = out.len();
            }
            if i == cursor_source_row {
                cursor_offset = Some(logical.len() + cursor.1);
            }
            let take = if line.wrapped {
                line.cols()
            } else {
                line.content_len()
            };
            logical.extend_from_slice(&line.cells()[..take]);
            if !line.wrapped || i == last {
                let first = out.len();
                if let Some((row, col)) =
                    rewrap(&logical, cursor_offset.take(), dims.cols, &mut out)
                {
                    new_cursor = (first + row, col);
                }
                logical.clear();
            }
        }

        // Keep the old top row in place, pull history in when growing and
        // push rows out when the cursor would fall off the bottom.
        let (cursor_line, cursor_col) = new_cursor;
        let mut top = first_live.saturating_sub(dims.rows.saturating_sub(old_rows));
        if cursor_line - top >= dims.rows {
            top = cursor_line + 1 - dims.rows;
        }
        if out.len() - top > dims.rows {
            top = (out.len() - dims.rows).min(cursor_line);
        }

        let mut lines: Vec<Arc<Line>> = out.into_iter().map(Arc::new).collect();
        let mut live = lines.split_off(top);
        self.scrollback.push_lines(lines);
        live.truncate(dims.rows);
        live.resize_with(dims.rows, || Arc::new(Line::new(dims.cols)));
        self.primary = Grid::from_lines(live, dims.cols);

        (cursor_line - top, cursor_col.min(dims.cols - 1))
    }

    /// Immutable view of the buffer scrolled back by `scroll_offset` rows
    /// (clamped to the scrollback length).
    pub fn snapshot(&self, scroll_offset: usize) -> Snapshot {
        let history = self.scrollback.share();
        let scroll_offset = scroll_offset.min(history.len());
        Snapshot {
            rows: self.rows(),
            cols: self.cols(),
            history,
            screen: Arc::new(self.grid().shared_lines()),
            scroll_offset,
            cursor: SnapshotCursor {
                row: self.cursor.row,
                col: self.cursor.col,
                visible: self.modes.cursor_visible,
            },
            alternate_screen: self.using_alternate,
            title: self.title.clone(),
            hyperlinks: self.hyperlinks.table(),
        }
    }
}

fn default_tab_stops(cols: usize) -> Vec<bool> {
    (0..cols).map(|c| c % TAB_WIDTH == 0).collect()
}

/// Split one logical line into rows of `cols` cells, appending them to
/// `out`. Returns where the cell at offset `cursor` landed, relative to
/// the first appended row; a cursor past the content keeps its distance
/// from the end, clamped to the last column.
fn rewrap(
    cells: &[Cell],
    cursor: Option<usize>,
    cols: usize,
    out: &mut Vec<Line>,
) -> Option<(usize, usize)> {
    let first = out.len();
    let mut row: Vec<Cell> = Vec::with_capacity(cols);
    let mut found = None;

    for (i, cell) in cells.iter().enumerate() {
        if cell.is_continuation() {
            if cursor == Some(i) {
                found = Some((out.len() - first, row.len().saturating_sub(1)));
            }
            continue;
        }
        let width = if cols < 2 { 1 } else { cell.width() };
        if row.len() + width > cols {
            finish_row(&mut row, cols, true, out);
        }
        if cursor == Some(i) {
            found = Some((out.len() - first, row.len()));
        }
        if cell.is_wide() && cols < 2 {
            row.push(Cell::blank(cell.attrs));
        } else {
            row.push(cell.clone());
            if cell.is_wide() {
                let mut half = Cell::new();
                half.set_continuation(cell.attrs, cell.hyperlink_id);
                row.push(half);
            }
        }
    }

    if found.is_none() {
        if let Some(offset) = cursor {
            let col = row.len() + offset.saturating_sub(cells.len());
            found = Some((out.len() - first, col.min(cols - 1)));
        }
    }
    finish_row(&mut row, cols, false, out);
    found
}

fn finish_row(row: &mut Vec<Cell>, cols: usize, wrapped: bool, out: &mut Vec<Line>) {
    let mut cells = std::mem::take(row);
    cells.resize(cols, Cell::new());
    out.push(Line::from_cells(cells, wrapped));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(cols: usize, rows: usize) -> Screen {
        Screen::new(Dimensions::new(cols, rows), 100)
    }

    fn write(screen: &mut Screen, text: &str) {
        for c in text.chars() {
            match c {
                '\n' => {
                    screen.carriage_return();
                    screen.linefeed();
                }
                c => screen.print(c),
            }
        }
    }

    fn rows_text(screen: &Screen) -> Vec<String> {
        screen.grid().iter().map(Line::text).collect()
    }

    fn history_text(screen: &Screen) -> Vec<String> {
        screen.scrollback().iter().map(Line::text).collect()
    }

    #[test]
    fn test_screen_new() {
        let screen = screen(80, 24);
        assert_eq!(screen.cols(), 80);
        assert_eq!(screen.rows(), 24);
        assert_eq!((screen.cursor().row, screen.cursor().col), (0, 0));
    }

    #[test]
    fn test_screen_print() {
        let mut screen = screen(80, 24);
        write(&mut screen, "Hi");
        assert_eq!(screen.cursor().col, 2);
        assert_eq!(screen.line(0).text(), "Hi");
    }

    #[test]
    fn test_screen_wrap_sets_flag() {
        let mut screen = screen(5, 3);
        write(&mut screen, "Hello World");
        assert_eq!(rows_text(&screen), vec!["Hello", " Worl", "d"]);
        assert!(screen.line(0).wrapped);
        assert!(screen.line(1).wrapped);
        assert!(!screen.line(2).wrapped);
    }

    #[test]
    fn test_screen_pending_wrap() {
        let mut screen = screen(5, 3);
        write(&mut screen, "Hello");
        assert_eq!(screen.cursor().col, 4);
        assert!(screen.cursor().pending_wrap);
        screen.carriage_return();
        assert!(!screen.cursor().pending_wrap);
        write(&mut screen, "J");
        assert_eq!(screen.line(0).text(), "Jello");
        assert!(!screen.line(0).wrapped);
    }

    #[test]
    fn test_screen_no_auto_wrap() {
        let mut screen = screen(5, 3);
        screen.modes_mut().auto_wrap = false;
        write(&mut screen, "Hello World");
        assert_eq!(screen.line(0).text(), "Helld");
        assert_eq!(screen.cursor().row, 0);
    }

    #[test]
    fn test_screen_wide_char() {
        let mut screen = screen(10, 2);
        write(&mut screen, "a中b");
        assert_eq!(screen.line(0).text(), "a中b");
        assert_eq!(screen.cursor().col, 4);
        assert!(screen.line(0).get(2).is_some_and(Cell::is_continuation));
    }

    #[test]
    fn test_screen_wide_char_at_margin_wraps() {
        let mut screen = screen(4, 2);
        write(&mut screen, "abc中");
        assert_eq!(screen.line(0).text(), "abc");
        assert!(screen.line(0).wrapped);
        assert_eq!(screen.line(1).text(), "中");
    }

    #[test]
    fn test_screen_overwrite_half_of_wide_char() {
        let mut screen = screen(10, 2);
        write(&mut screen, "中");
        screen.move_cursor_to(1, 2);
        write(&mut screen, "x");
        assert_eq!(screen.line(0).text(), " x");
    }

    #[test]
    fn test_screen_combining_char() {
        let mut screen = screen(10, 2);
        write(&mut screen, "e\u{0301}x");
        assert_eq!(screen.line(0).text(), "e\u{0301}x");
        assert_eq!(screen.cursor().col, 2);
    }

    #[test]
    fn test_screen_linefeed_scrolls_into_scrollback() {
        let mut screen = screen(10, 3);
        write(&mut screen, "A\nB\nC\nD");
        assert_eq!(rows_text(&screen), vec!["B", "C", "D"]);
        assert_eq!(history_text(&screen), vec!["A"]);
    }

    #[test]
    fn test_screen_scroll_region_keeps_scrollback() {
        let mut screen = screen(10, 5);
        write(&mut screen, "A\nB\nC\nD\nE");
        screen.set_scroll_region(2, 4);
        screen.move_cursor_to(4, 1);
        screen.linefeed();

        assert_eq!(rows_text(&screen), vec!["A", "C", "D", "", "E"]);
        assert!(screen.scrollback().is_empty());
    }

    #[test]
    fn test_screen_region_at_top_feeds_scrollback() {
        let mut screen = screen(10, 5);
        write(&mut screen, "A\nB\nC");
        screen.set_scroll_region(1, 3);
        screen.move_cursor_to(3, 1);
        screen.linefeed();
        assert_eq!(history_text(&screen), vec!["A"]);
        assert_eq!(rows_text(&screen), vec!["B", "C", "", "", ""]);
    }

    #[test]
    fn test_screen_linefeed_below_region() {
        let mut screen = screen(10, 5);
        screen.set_scroll_region(1, 3);
        screen.move_cursor_to(5, 1);
        screen.linefeed();
        assert_eq!(screen.cursor().row, 4);
    }

    #[test]
    fn test_screen_reverse_index_scrolls() {
        let mut screen = screen(10, 3);
        write(&mut screen, "A\nB\nC");
        screen.move_cursor_to(1, 1);
        screen.reverse_index();
        assert_eq!(rows_text(&screen), vec!["", "A", "B"]);
    }

    #[test]
    fn test_screen_linefeed_mode() {
        let mut screen = screen(10, 3);
        write(&mut screen, "abc");
        screen.linefeed();
        assert_eq!(screen.cursor().col, 3);
        screen.modes_mut().linefeed_mode = true;
        screen.linefeed();
        assert_eq!(screen.cursor().col, 0);
    }

    #[test]
    fn test_screen_cursor_movement() {
        let mut screen = screen(80, 24);
        screen.move_cursor_to(5, 10);
        assert_eq!((screen.cursor().row, screen.cursor().col), (4, 9));
        screen.move_cursor_up(2);
        assert_eq!(screen.cursor().row, 2);
        screen.move_cursor_down(5);
        assert_eq!(screen.cursor().row, 7);
        screen.move_cursor_left(3);
        assert_eq!(screen.cursor().col, 6);
        screen.move_cursor_right(10);
        assert_eq!(screen.cursor().col, 16);
        screen.set_cursor_col(1);
        assert_eq!(screen.cursor().col, 0);
        screen.set_cursor_row(30);
        assert_eq!(screen.cursor().row, 23);
    }

    #[test]
    fn test_screen_cursor_clamps() {
        let mut screen = screen(10, 5);
        screen.move_cursor_to(100, 100);
        assert_eq!((screen.cursor().row, screen.cursor().col), (4, 9));
        screen.move_cursor_up(1000);
        screen.move_cursor_left(1000);
        assert_eq!((screen.cursor().row, screen.cursor().col), (0, 0));
    }

    #[test]
    fn test_screen_origin_mode() {
        let mut screen = screen(10, 10);
        screen.set_scroll_region(3, 6);
        screen.modes_mut().origin_mode = true;
        screen.move_cursor_to(1, 1);
        assert_eq!(screen.cursor().row, 2);
        screen.move_cursor_to(20, 1);
        assert_eq!(screen.cursor().row, 5);
        screen.move_cursor_up(10);
        assert_eq!(screen.cursor().row, 2);
    }

    #[test]
    fn test_screen_erase_display() {
        let mut screen = screen(10, 3);
        write(&mut screen, "XXXXXXXXXX\nXXXXXXXXXX\nXXXXXXXXXX");
        screen.move_cursor_to(2, 5);
        screen.erase_display(0);
        assert_eq!(rows_text(&screen), vec!["XXXXXXXXXX", "XXXX", ""]);

        screen.erase_display(1);
        assert_eq!(rows_text(&screen), vec!["", "", ""]);
    }

    #[test]
    fn test_screen_erase_display_never_touches_scrollback() {
        let mut screen = screen(10, 2);
        write(&mut screen, "A\nB\nC");
        assert_eq!(history_text(&screen), vec!["A"]);
        screen.erase_display(2);
        screen.erase_display(3);
        assert_eq!(history_text(&screen), vec!["A"]);
        assert_eq!(rows_text(&screen), vec!["", ""]);
    }

    #[test]
    fn test_screen_erase_line_and_chars() {
        let mut screen = screen(10, 1);
        write(&mut screen, "abcdefghij");
        screen.move_cursor_to(1, 3);
        screen.erase_chars(2);
        assert_eq!(screen.line(0).text(), "ab  efghij");
        screen.erase_line(0);
        assert_eq!(screen.line(0).text(), "ab");
        screen.erase_line(2);
        assert_eq!(screen.line(0).text(), "");
    }

    #[test]
    fn test_screen_insert_delete_lines() {
        let mut screen = screen(10, 5);
        write(&mut screen, "A\nB\nC\nD\nE");
        screen.move_cursor_to(2, 3);
        screen.insert_lines(2);
        assert_eq!(rows_text(&screen), vec!["A", "", "", "B", "C"]);
        assert_eq!(screen.cursor().col, 0);

        screen.delete_lines(3);
        assert_eq!(rows_text(&screen), vec!["A", "C", "", "", ""]);
        assert!(screen.scrollback().is_empty());
    }

    #[test]
    fn test_screen_insert_delete_chars() {
        let mut screen = screen(6, 1);
        write(&mut screen, "abcdef");
        screen.move_cursor_to(1, 2);
        screen.insert_chars(2);
        assert_eq!(screen.line(0).text(), "a  bcd");
        screen.delete_chars(3);
        assert_eq!(screen.line(0).text(), "acd");
    }

    #[test]
    fn test_screen_insert_mode() {
        let mut screen = screen(6, 1);
        write(&mut screen, "abc");
        screen.move_cursor_to(1, 1);
        screen.modes_mut().insert_mode = true;
        write(&mut screen, "X");
        assert_eq!(screen.line(0).text(), "Xabc");
    }

    #[test]
    fn test_screen_tabs() {
        let mut screen = screen(20, 1);
        write(&mut screen, "A");
        screen.tab();
        assert_eq!(screen.cursor().col, 8);
        screen.tab();
        assert_eq!(screen.cursor().col, 16);
        screen.tab();
        assert_eq!(screen.cursor().col, 19);

        screen.move_cursor_to(1, 4);
        screen.set_tab_stop();
        screen.move_cursor_to(1, 1);
        screen.tab();
        assert_eq!(screen.cursor().col, 3);

        screen.clear_tab_stop(3);
        screen.move_cursor_to(1, 1);
        screen.tab();
        assert_eq!(screen.cursor().col, 19);
    }

    #[test]
    fn test_screen_save_restore_cursor() {
        let mut screen = screen(80, 24);
        screen.move_cursor_to(10, 20);
        screen.cursor_mut().attrs.bold = true;
        screen.save_cursor();

        screen.move_cursor_to(1, 1);
        screen.cursor_mut().attrs.bold = false;
        screen.restore_cursor();

        assert_eq!((screen.cursor().row, screen.cursor().col), (9, 19));
        assert!(screen.cursor().attrs.bold);
    }

    #[test]
    fn test_screen_alternate() {
        let mut screen = screen(10, 2);
        write(&mut screen, "A");
        screen.enter_alternate_screen();
        assert!(screen.modes().alternate_screen);
        assert_eq!(screen.line(0).text(), "");
        assert_eq!(screen.cursor().col, 0);

        write(&mut screen, "B\nC\nD\nE");
        assert!(screen.scrollback().is_empty());

        screen.exit_alternate_screen();
        assert!(!screen.modes().alternate_screen);
        assert_eq!(screen.line(0).text(), "A");
        assert_eq!(screen.cursor().col, 1);
    }

    #[test]
    fn test_screen_alignment_test() {
        let mut screen = screen(3, 2);
        screen.set_scroll_region(1, 2);
        screen.alignment_test();
        assert_eq!(rows_text(&screen), vec!["EEE", "EEE"]);
        assert_eq!(screen.scroll_region(), (0, 1));
    }

    #[test]
    fn test_screen_reset_keeps_scrollback() {
        let mut screen = screen(10, 2);
        write(&mut screen, "A\nB\nC");
        screen.set_title("t");
        screen.reset();
        assert_eq!(rows_text(&screen), vec!["", ""]);
        assert_eq!(history_text(&screen), vec!["A"]);
        assert_eq!(screen.title(), "");
    }

    #[test]
    fn test_screen_hyperlink_tags_cells() {
        let mut screen = screen(20, 1);
        write(&mut screen, "a");
        screen.open_hyperlink(None, "https://example.com");
        write(&mut screen, "bc");
        screen.close_hyperlink();
        write(&mut screen, "d");

        let ids: Vec<u32> = screen.line(0).iter().take(4).map(|c| c.hyperlink_id).collect();
        assert_eq!(ids, vec![0, 1, 1, 0]);
        assert_eq!(screen.hyperlinks().get(1), Some("https://example.com"));
    }

    #[test]
    fn test_screen_resize_narrower_rewraps() {
        let mut screen = screen(10, 3);
        write(&mut screen, "abcdefgh\nxy");
        screen.resize(Dimensions::new(4, 3));

        assert_eq!(rows_text(&screen), vec!["abcd", "efgh", "xy"]);
        assert!(screen.line(0).wrapped);
        assert!(!screen.line(1).wrapped);
        assert_eq!((screen.cursor().row, screen.cursor().col), (2, 2));

        screen.resize(Dimensions::new(3, 3));
        assert_eq!(history_text(&screen), vec!["abc"]);
        assert_eq!(rows_text(&screen), vec!["def", "gh", "xy"]);
        assert_eq!((screen.cursor().row, screen.cursor().col), (1, 2));
    }

    #[test]
    fn test_screen_resize_wider_joins() {
        let mut screen = screen(4, 3);
        write(&mut screen, "abcdefgh");
        assert_eq!(rows_text(&screen), vec!["abcd", "efgh", ""]);
        screen.resize(Dimensions::new(10, 3));
        assert_eq!(rows_text(&screen), vec!["abcdefgh", "", ""]);
        assert!(!screen.line(0).wrapped);
        assert_eq!(screen.cursor().row, 0);
    }

    #[test]
    fn test_screen_resize_rows_pulls_from_scrollback() {
        let mut screen = screen(10, 2);
        write(&mut screen, "A\nB\nC\nD");
        assert_eq!(history_text(&screen), vec!["A", "B"]);

        screen.resize(Dimensions::new(10, 4));
        assert_eq!(rows_text(&screen), vec!["A", "B", "C", "D"]);
        assert!(screen.scrollback().is_empty());
        assert_eq!(screen.cursor().row, 3);

        screen.resize(Dimensions::new(10, 2));
        assert_eq!(rows_text(&screen), vec!["C", "D"]);
        assert_eq!(history_text(&screen), vec!["A", "B"]);
        assert_eq!(screen.cursor().row, 1);
    }

    #[test]
    fn test_screen_resize_keeps_cursor_row_after_clear() {
        let mut screen = screen(10, 3);
        write(&mut screen, "A\nB\nC\nD");
        screen.erase_display(2);
        screen.move_cursor_to(1, 1);
        screen.resize(Dimensions::new(8, 3));
        assert_eq!(screen.cursor().row, 0);
        assert_eq!(rows_text(&screen), vec!["", "", ""]);
    }

    #[test]
    fn test_screen_resize_alternate_is_truncated() {
        let mut screen = screen(10, 3);
        write(&mut screen, "abcdefgh");
        screen.enter_alternate_screen();
        write(&mut screen, "0123456789");
        screen.resize(Dimensions::new(5, 3));
        assert_eq!(screen.line(0).text(), "01234");

        screen.exit_alternate_screen();
        assert_eq!(rows_text(&screen), vec!["abcde", "fgh", ""]);
        assert_eq!((screen.cursor().row, screen.cursor().col), (1, 3));
    }

    #[test]
    fn test_screen_every_row_has_cols_cells_after_resize() {
        let mut screen = screen(7, 4);
        write(&mut screen, "中文字符 wide text\nmore");
        for (cols, rows) in [(3, 2), (11, 6), (2, 1), (7, 4)] {
            screen.resize(Dimensions::new(cols, rows));
            assert!(screen.grid().iter().all(|l| l.cols() == cols));
            assert!(screen.scrollback().iter().all(|l| l.cols() == cols));
            assert!(screen.cursor().row < rows && screen.cursor().col < cols);
        }
    }
}
