//! Terminal facade
//!
//! Owns the parser and the screen (the only writer), publishes an
//! immutable [`Snapshot`] after every batch of input, and routes the side
//! effects of parsing and of user input through [`TerminalEvents`].

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use terminal_core::{
    BufferPoint, Color, Dimensions, Link, LinkDetector, Screen, SelectionManager, SelectionMode,
    Snapshot,
};
use terminal_input::{Key, KeyEncoder, ModifierTracker, Modifiers};
use terminal_palette::Palette;
use terminal_parser::Parser;
use tracing::{debug, trace};

use crate::config::{TerminalConfig, MAX_DIMENSION};
use crate::error::Result;
use crate::performer::Performer;

const BRACKETED_PASTE_START: &[u8] = b"\x1b[200~";
const BRACKETED_PASTE_END: &[u8] = b"\x1b[201~";

/// Side-channel notifications. Every method defaults to doing nothing.
pub trait TerminalEvents: Send {
    /// Bytes to deliver to the remote end, in event order.
    fn on_keyboard_input(&mut self, _bytes: &[u8]) {}

    fn on_bell(&mut self) {}

    fn on_resize(&mut self, _rows: usize, _cols: usize) {}

    fn on_clipboard_copy(&mut self, _text: &str) {}

    fn on_hyperlink_click(&mut self, _url: &str) {}

    fn on_title_changed(&mut self, _title: &str) {}
}

/// Event sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl TerminalEvents for NoopEvents {}

/// What a tap on the viewport resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// A link was hit and reported through `on_hyperlink_click`
    Hyperlink(String),
    /// Plain tap for the terminal itself
    Terminal,
}

/// Read handle on the latest published snapshot, usable from other threads
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotHandle {
    pub fn load(&self) -> Arc<Snapshot> {
        Arc::clone(&self.inner.read())
    }
}

pub struct Terminal {
    parser: Parser,
    screen: Screen,
    performer: Performer,
    published: Arc<RwLock<Arc<Snapshot>>>,
    scroll_offset: usize,
    /// Scrollback lines pushed and evicted, as of the last publish
    pushed: u64,
    evicted: u64,
    selection: SelectionManager,
    links: LinkDetector,
    detect_links: bool,
    encoder: KeyEncoder,
    modifiers: ModifierTracker,
    palette: Palette,
    events: Box<dyn TerminalEvents>,
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("dimensions", &self.screen.dimensions())
            .field("scroll_offset", &self.scroll_offset)
            .field("parser", &self.parser.state())
            .finish_non_exhaustive()
    }
}

impl Terminal {
    /// Create a terminal from `config`. The config's palette path is not
    /// read here; see [`Terminal::load_palette_file`].
    pub fn new(config: &TerminalConfig, events: Box<dyn TerminalEvents>) -> Self {
        let dims = clamp_dimensions(config.rows, config.cols);
        let screen = Screen::new(dims, config.scrollback_lines);
        let snapshot = Arc::new(screen.snapshot(0));
        let encoder = KeyEncoder {
            shifted_numbers_are_fkeys: config.shifted_numbers_are_fkeys,
            control_numbers_are_fkeys: config.control_numbers_are_fkeys,
            ..KeyEncoder::default()
        };

        Self {
            parser: Parser::new(),
            screen,
            performer: Performer::new(),
            published: Arc::new(RwLock::new(snapshot)),
            scroll_offset: 0,
            pushed: 0,
            evicted: 0,
            selection: SelectionManager::new(),
            links: LinkDetector::new(config.detect_links),
            detect_links: config.detect_links,
            encoder,
            modifiers: ModifierTracker::new(config.sticky_modifiers),
            palette: Palette::default(),
            events,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Feed bytes from the remote end. Everything they describe is applied
    /// before this returns, then a new snapshot is published.
    pub fn write_input(&mut self, data: &[u8]) {
        let Self {
            parser,
            screen,
            performer,
            ..
        } = self;
        parser.parse(data, |action| performer.perform(screen, action));

        for response in self.performer.take_responses() {
            trace!("device response {:?}", String::from_utf8_lossy(&response));
            self.events.on_keyboard_input(&response);
        }
        for _ in 0..self.performer.take_bells() {
            self.events.on_bell();
        }
        if self.performer.take_title_changed() {
            self.events.on_title_changed(self.screen.title());
        }

        self.sync_scrollback(true);
        self.publish();
    }

    /// Account for scrollback growth and eviction since the last publish.
    /// With `follow` set, a view scrolled into history keeps showing the
    /// same content while new lines arrive.
    fn sync_scrollback(&mut self, follow: bool) {
        let scrollback = self.screen.scrollback();
        let evicted = scrollback.evicted();
        let pushed = scrollback.len() as u64 + evicted;

        let newly_evicted = evicted.saturating_sub(self.evicted);
        if newly_evicted > 0 {
            self.selection.on_lines_evicted(newly_evicted as usize);
        }
        if follow && self.scroll_offset > 0 {
            let grown = pushed.saturating_sub(self.pushed) as usize;
            self.scroll_offset = self.scroll_offset.saturating_add(grown);
        }
        self.scroll_offset = self.scroll_offset.min(scrollback.len());

        self.evicted = evicted;
        self.pushed = pushed;
    }

    fn publish(&mut self) {
        let snapshot = Arc::new(self.screen.snapshot(self.scroll_offset));
        *self.published.write() = snapshot;
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.published.read())
    }

    pub fn snapshot_handle(&self) -> SnapshotHandle {
        SnapshotHandle {
            inner: Arc::clone(&self.published),
        }
    }

    /// Text of a visible row, `None` past the last row.
    pub fn visible_line(&self, viewport_row: usize) -> Option<String> {
        self.snapshot().line(viewport_row).map(|line| line.text())
    }

    pub fn title(&self) -> String {
        self.screen.title().to_owned()
    }

    // Keyboard

    /// Encode a key press and send it. `mods` are the modifiers reported
    /// with the event; held and sticky modifiers are added. Returns whether
    /// anything was sent.
    pub fn send_key(&mut self, key: Key, mods: Modifiers) -> bool {
        let mods = self.modifiers.effective(mods);
        self.encoder.application_cursor = self.screen.modes().cursor_keys_application;
        let sent = match self.encoder.encode(key, mods) {
            Some(bytes) => {
                self.send(&bytes);
                true
            }
            None => {
                debug!("no encoding for {:?} with {:?}", key, mods);
                false
            }
        };
        self.modifiers.consume();
        sent
    }

    /// Input method asked to delete `before` characters left of the cursor.
    pub fn ime_delete_surrounding(&mut self, before: usize) {
        let bytes = self.encoder.ime_delete(before);
        if !bytes.is_empty() {
            self.send(&bytes);
        }
    }

    pub fn ime_commit(&mut self, text: &str) {
        if !text.is_empty() {
            let bytes = self.encoder.ime_commit(text);
            self.send(&bytes);
        }
    }

    /// Paste text, bracketed when the remote program asked for it.
    pub fn paste(&mut self, text: &str) {
        if self.screen.modes().bracketed_paste {
            let mut bytes = Vec::with_capacity(text.len() + 12);
            bytes.extend_from_slice(BRACKETED_PASTE_START);
            bytes.extend_from_slice(text.as_bytes());
            bytes.extend_from_slice(BRACKETED_PASTE_END);
            self.send(&bytes);
        } else {
            self.send(text.as_bytes());
        }
    }

    fn send(&mut self, bytes: &[u8]) {
        if self.scroll_offset != 0 {
            self.set_scroll_offset(0);
        }
        self.events.on_keyboard_input(bytes);
    }

    pub fn press_modifier(&mut self, mods: Modifiers) {
        self.modifiers.press(mods);
    }

    pub fn release_modifier(&mut self, mods: Modifiers) {
        self.modifiers.release(mods);
    }

    /// Sticky meta key press: next key only, then locked, then off.
    pub fn meta_press(&mut self, mods: Modifiers) -> bool {
        self.modifiers.meta_press(mods)
    }

    pub fn modifiers(&self) -> &ModifierTracker {
        &self.modifiers
    }

    // Geometry and scrolling

    pub fn resize(&mut self, rows: usize, cols: usize) {
        let dims = clamp_dimensions(rows, cols);
        if dims == self.screen.dimensions() {
            return;
        }
        debug!("resize to {}x{}", dims.cols, dims.rows);
        self.selection.clear();
        self.screen.resize(dims);
        self.sync_scrollback(false);
        self.publish();
        self.events.on_resize(dims.rows, dims.cols);
    }

    /// Scroll the view; positive `delta` moves back into history.
    pub fn scroll_view(&mut self, delta: isize) {
        let target = self.scroll_offset.saturating_add_signed(delta);
        self.set_scroll_offset(target);
    }

    /// Set the scroll offset, clamped to the scrollback length.
    pub fn set_scroll_offset(&mut self, offset: usize) {
        let snapshot = self.snapshot().with_scroll_offset(offset);
        self.scroll_offset = snapshot.scroll_offset();
        *self.published.write() = Arc::new(snapshot);
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn scrollback_len(&self) -> usize {
        self.screen.scrollback().len()
    }

    // Selection

    pub fn start_selection(&mut self, viewport_row: usize, col: usize, mode: SelectionMode) {
        let snapshot = self.snapshot();
        self.selection.start(&snapshot, viewport_row, col, mode);
    }

    pub fn update_selection(&mut self, viewport_row: usize, col: usize) {
        let snapshot = self.snapshot();
        self.selection.update(&snapshot, viewport_row, col);
    }

    pub fn end_selection(&mut self) {
        self.selection.end();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection.mode()
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selection_range(&self) -> Option<(BufferPoint, BufferPoint)> {
        self.selection.range(&self.snapshot())
    }

    pub fn is_selected(&self, viewport_row: usize, col: usize) -> bool {
        self.selection.is_selected(&self.snapshot(), viewport_row, col)
    }

    /// Selected text against the latest snapshot, also handed to
    /// `on_clipboard_copy`.
    pub fn copy_selection(&mut self) -> Option<String> {
        let text = self.selection.copy(&self.snapshot())?;
        self.events.on_clipboard_copy(&text);
        Some(text)
    }

    // Links

    /// Link under a viewport cell. OSC 8 spans always resolve; bare URLs
    /// only with link detection on.
    pub fn link_at(&self, viewport_row: usize, col: usize) -> Option<Link> {
        self.links.resolve(&self.snapshot(), viewport_row, col)
    }

    pub fn set_detect_links(&mut self, enabled: bool) {
        self.detect_links = enabled;
        self.links.set_heuristic(enabled);
    }

    pub fn detect_links(&self) -> bool {
        self.detect_links
    }

    /// Resolve a tap. With link detection on and a link under the cell,
    /// `on_hyperlink_click` fires; everything else is a plain tap.
    pub fn tap(&mut self, viewport_row: usize, col: usize) -> TapOutcome {
        if !self.detect_links {
            return TapOutcome::Terminal;
        }
        match self.link_at(viewport_row, col) {
            Some(link) => {
                debug!("tap hit {:?} link {}", link.source, link.url);
                self.events.on_hyperlink_click(&link.url);
                TapOutcome::Hyperlink(link.url)
            }
            None => TapOutcome::Terminal,
        }
    }

    // Colors

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Replace the palette from color-scheme text of either supported
    /// family. The current palette is kept on error.
    pub fn load_palette(&mut self, text: &str) -> Result<()> {
        self.palette = terminal_palette::parse_any(text)?;
        Ok(())
    }

    pub fn load_palette_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        self.load_palette(&text)
    }

    /// ARGB for a cell color; [`Color::Default`] maps to the palette's
    /// foreground or background.
    pub fn resolve_color(&self, color: Color, foreground: bool) -> u32 {
        let default = if foreground {
            self.palette.foreground_or_default()
        } else {
            self.palette.background_or_default()
        };
        color.to_argb(&self.palette.ansi, default)
    }
}

fn clamp_dimensions(rows: usize, cols: usize) -> Dimensions {
    Dimensions::new(cols.clamp(2, MAX_DIMENSION), rows.clamp(1, MAX_DIMENSION))
}
