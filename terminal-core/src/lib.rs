//! Terminal Core - Platform-independent terminal screen model
//!
//! This crate holds the state a terminal engine mutates:
//! - Screen grid of cells with characters, attributes and hyperlinks
//! - Cursor and mode state
//! - Scrollback with eviction accounting
//! - Immutable snapshots for readers, selection and link lookup on top of them
//!
//! Everything here is deterministic: the same sequence of operations always
//! produces the same screen state.

mod cell;
mod color;
mod cursor;
mod grid;
mod hyperlink;
mod line;
pub mod links;
mod modes;
mod screen;
mod scrollback;
pub mod selection;
mod snapshot;

pub use cell::{char_width, Cell, CellAttributes};
pub use color::Color;
pub use cursor::{Cursor, SavedCursor};
pub use grid::Grid;
pub use hyperlink::{HyperlinkRegistry, HyperlinkTable};
pub use line::Line;
pub use links::{Link, LinkDetector, LinkSource};
pub use modes::Modes;
pub use screen::Screen;
pub use scrollback::{Scrollback, DEFAULT_SCROLLBACK_SIZE};
pub use selection::{BufferPoint, SelectionManager, SelectionMode, SelectionPhase};
pub use snapshot::{
    Snapshot, SnapshotAttrSpan, SnapshotCursor, SnapshotDump, SnapshotLine, SnapshotLinkSpan,
};

/// Terminal dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub cols: usize,
    pub rows: usize,
}

impl Dimensions {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_default() {
        let dims = Dimensions::default();
        assert_eq!(dims.cols, 80);
        assert_eq!(dims.rows, 24);
    }
}
