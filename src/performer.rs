//! Terminal Performer
//!
//! Applies parsed terminal actions to the screen model and collects the
//! side effects the facade forwards: device responses, bells and title
//! changes.

use terminal_core::{CellAttributes, Color, Screen};
use terminal_parser::{Action, CsiAction, EscAction, OscAction, Params};
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub(crate) struct Performer {
    /// Bytes owed to the remote end (DSR, DA)
    responses: Vec<Vec<u8>>,
    bells: usize,
    title_changed: bool,
}

impl Performer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_responses(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.responses)
    }

    /// Number of BELs since the last call
    pub fn take_bells(&mut self) -> usize {
        std::mem::take(&mut self.bells)
    }

    pub fn take_title_changed(&mut self) -> bool {
        std::mem::take(&mut self.title_changed)
    }

    pub fn perform(&mut self, screen: &mut Screen, action: Action) {
        match action {
            Action::Print(c) => screen.print(c),
            Action::Control(byte) => self.execute(screen, byte),
            Action::Esc(esc) => self.esc_dispatch(screen, esc),
            Action::Csi(csi) => self.csi_dispatch(screen, &csi),
            Action::Osc(osc) => self.osc_dispatch(screen, osc),
        }
    }

    fn execute(&mut self, screen: &mut Screen, byte: u8) {
        match byte {
            0x07 => self.bells += 1,
            0x08 => screen.backspace(),
            0x09 => screen.tab(),
            0x0A..=0x0C => screen.linefeed(),
            0x0D => screen.carriage_return(),
            _ => trace!("ignoring C0 control {byte:#04x}"),
        }
    }

    fn esc_dispatch(&mut self, screen: &mut Screen, esc: EscAction) {
        match esc {
            EscAction::SaveCursor => screen.save_cursor(),
            EscAction::RestoreCursor => screen.restore_cursor(),
            EscAction::Index => screen.index(),
            EscAction::ReverseIndex => screen.reverse_index(),
            EscAction::NextLine => screen.next_line(),
            EscAction::HorizontalTabSet => screen.set_tab_stop(),
            EscAction::FullReset => {
                screen.reset();
                self.title_changed = true;
            }
            EscAction::AlignmentTest => screen.alignment_test(),
        }
    }

    fn csi_dispatch(&mut self, screen: &mut Screen, csi: &CsiAction) {
        if csi.marker == Some(b'?') && csi.intermediates.is_empty() {
            self.csi_private(screen, csi);
            return;
        }
        if csi.marker.is_some() || !csi.intermediates.is_empty() {
            debug!(
                "unhandled CSI {:?} {:?} {:?} {}",
                csi.marker.map(char::from),
                csi.intermediates,
                csi.params,
                csi.final_byte as char
            );
            return;
        }

        let n = csi.param(0, 1) as usize;
        match csi.final_byte {
            b'@' => screen.insert_chars(n),
            b'A' => screen.move_cursor_up(n),
            b'B' => screen.move_cursor_down(n),
            b'C' => screen.move_cursor_right(n),
            b'D' => screen.move_cursor_left(n),
            b'E' => {
                screen.move_cursor_down(n);
                screen.carriage_return();
            }
            b'F' => {
                screen.move_cursor_up(n);
                screen.carriage_return();
            }
            b'G' => screen.set_cursor_col(n),
            b'H' | b'f' => screen.move_cursor_to(n, csi.param(1, 1) as usize),
            b'J' => screen.erase_display(csi.params.raw(0)),
            b'K' => screen.erase_line(csi.params.raw(0)),
            b'L' => screen.insert_lines(n),
            b'M' => screen.delete_lines(n),
            b'P' => screen.delete_chars(n),
            b'S' => screen.scroll_up(n),
            b'T' => screen.scroll_down(n),
            b'X' => screen.erase_chars(n),
            b'd' => screen.set_cursor_row(n),
            b'g' => screen.clear_tab_stop(csi.params.raw(0)),
            b'h' | b'l' => {
                let value = csi.final_byte == b'h';
                for mode in csi.params.iter() {
                    if !screen.modes_mut().set_ansi_mode(mode, value) {
                        debug!("unsupported ANSI mode {mode}");
                    }
                }
            }
            b'm' => sgr(&mut screen.cursor_mut().attrs, &csi.params),
            b'n' => self.device_status(screen, csi.params.raw(0)),
            b'c' => self.device_attributes(csi.params.raw(0)),
            b'r' => {
                let bottom = csi.param(1, screen.rows() as u16) as usize;
                screen.set_scroll_region(n, bottom);
            }
            b's' => screen.save_cursor(),
            b'u' => screen.restore_cursor(),
            _ => debug!("unhandled CSI {:?} {}", csi.params, csi.final_byte as char),
        }
    }

    fn csi_private(&mut self, screen: &mut Screen, csi: &CsiAction) {
        match csi.final_byte {
            b'h' | b'l' => {
                let value = csi.final_byte == b'h';
                for mode in csi.params.iter() {
                    set_dec_mode(screen, mode, value);
                }
            }
            _ => debug!("unhandled private CSI ?{:?}{}", csi.params, csi.final_byte as char),
        }
    }

    fn device_status(&mut self, screen: &Screen, mode: u16) {
        match mode {
            5 => self.responses.push(b"\x1b[0n".to_vec()),
            6 => {
                let cursor = screen.cursor();
                let (top, _) = screen.scroll_region();
                let row = if screen.modes().origin_mode {
                    cursor.row.saturating_sub(top)
                } else {
                    cursor.row
                };
                self.responses
                    .push(format!("\x1b[{};{}R", row + 1, cursor.col + 1).into_bytes());
            }
            _ => debug!("unknown DSR request {mode}"),
        }
    }

    fn device_attributes(&mut self, which: u16) {
        if which == 0 {
            // VT100 with advanced video option
            self.responses.push(b"\x1b[?1;2c".to_vec());
        }
    }

    fn osc_dispatch(&mut self, screen: &mut Screen, osc: OscAction) {
        match osc {
            OscAction::SetTitle(title) => {
                screen.set_title(&title);
                self.title_changed = true;
            }
            OscAction::SetIconName(name) => trace!("icon name {name:?} ignored"),
            OscAction::HyperlinkOpen { id, uri } => screen.open_hyperlink(id.as_deref(), &uri),
            OscAction::HyperlinkClose => screen.close_hyperlink(),
        }
    }
}

fn set_dec_mode(screen: &mut Screen, mode: u16, value: bool) {
    match mode {
        1 => screen.modes_mut().cursor_keys_application = value,
        6 => {
            screen.modes_mut().origin_mode = value;
            screen.move_cursor_to(1, 1);
        }
        7 => screen.modes_mut().auto_wrap = value,
        25 => screen.modes_mut().cursor_visible = value,
        47 | 1047 | 1049 => {
            if value {
                screen.enter_alternate_screen();
            } else {
                screen.exit_alternate_screen();
            }
        }
        2004 => screen.modes_mut().bracketed_paste = value,
        _ => debug!("unsupported DEC mode {mode}"),
    }
}

/// SGR. Extended colors are accepted in both the `38;5;n` and the
/// `38:5:n` forms.
fn sgr(attrs: &mut CellAttributes, params: &Params) {
    if params.is_empty() {
        attrs.reset();
        return;
    }

    let values: Vec<u16> = params.iter().collect();
    let mut i = 0;
    while i < values.len() {
        let param = values[i];
        match param {
            0 => attrs.reset(),
            1 => attrs.bold = true,
            2 => attrs.faint = true,
            3 => attrs.italic = true,
            4 => attrs.underline = true,
            5 | 6 => attrs.blink = true,
            7 => attrs.inverse = true,
            8 => attrs.hidden = true,
            9 => attrs.strikethrough = true,
            21 => attrs.bold = false,
            22 => {
                attrs.bold = false;
                attrs.faint = false;
            }
            23 => attrs.italic = false,
            24 => attrs.underline = false,
            25 => attrs.blink = false,
            27 => attrs.inverse = false,
            28 => attrs.hidden = false,
            29 => attrs.strikethrough = false,
            30..=37 => attrs.fg = Color::Indexed((param - 30) as u8),
            38 | 48 => {
                let sub = params.subparams(i);
                let color = if sub.is_empty() {
                    let (color, used) = extended_color(&values[i + 1..]);
                    i += used;
                    color
                } else {
                    extended_color_colon(sub)
                };
                if let Some(color) = color {
                    if param == 38 {
                        attrs.fg = color;
                    } else {
                        attrs.bg = color;
                    }
                }
            }
            39 => attrs.fg = Color::Default,
            40..=47 => attrs.bg = Color::Indexed((param - 40) as u8),
            49 => attrs.bg = Color::Default,
            90..=97 => attrs.fg = Color::Indexed((param - 90 + 8) as u8),
            100..=107 => attrs.bg = Color::Indexed((param - 100 + 8) as u8),
            _ => debug!("unknown SGR parameter {param}"),
        }
        i += 1;
    }
}

/// `5;n` or `2;r;g;b` following a 38/48. Returns the color and how many
/// parameters it consumed. Out-of-range values leave the color unchanged.
fn extended_color(rest: &[u16]) -> (Option<Color>, usize) {
    match rest {
        [5, n, ..] => (indexed(*n), 2),
        [2, r, g, b, ..] => (rgb(*r, *g, *b), 4),
        [5] | [2, ..] => (None, rest.len()),
        _ => (None, 0),
    }
}

/// Colon form: `5:n`, `2:r:g:b` or `2:colorspace:r:g:b`.
fn extended_color_colon(sub: &[u16]) -> Option<Color> {
    match sub {
        [5, n, ..] => indexed(*n),
        [2, _, r, g, b, ..] => rgb(*r, *g, *b),
        [2, r, g, b] => rgb(*r, *g, *b),
        _ => None,
    }
}

fn indexed(n: u16) -> Option<Color> {
    u8::try_from(n).ok().map(Color::Indexed)
}

fn rgb(r: u16, g: u16, b: u16) -> Option<Color> {
    Some(Color::rgb(
        u8::try_from(r).ok()?,
        u8::try_from(g).ok()?,
        u8::try_from(b).ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use terminal_core::Dimensions;
    use terminal_parser::Parser;

    fn run(screen: &mut Screen, performer: &mut Performer, bytes: &[u8]) {
        let mut parser = Parser::new();
        for action in parser.parse_collect(bytes) {
            performer.perform(screen, action);
        }
    }

    fn setup(cols: usize, rows: usize) -> (Screen, Performer) {
        (Screen::new(Dimensions::new(cols, rows), 100), Performer::new())
    }

    #[test]
    fn test_print_and_cursor_position() {
        let (mut screen, mut perf) = setup(80, 24);
        run(&mut screen, &mut perf, b"Hello\x1b[10;20H");
        assert_eq!(screen.line(0).text(), "Hello");
        assert_eq!((screen.cursor().row, screen.cursor().col), (9, 19));
    }

    #[test]
    fn test_sgr_colors() {
        let (mut screen, mut perf) = setup(80, 24);
        run(&mut screen, &mut perf, b"\x1b[1;31m");
        assert!(screen.cursor().attrs.bold);
        assert_eq!(screen.cursor().attrs.fg, Color::Indexed(1));

        run(&mut screen, &mut perf, b"\x1b[38;5;200;48;2;1;2;3m");
        assert_eq!(screen.cursor().attrs.fg, Color::Indexed(200));
        assert_eq!(screen.cursor().attrs.bg, Color::rgb(1, 2, 3));

        run(&mut screen, &mut perf, b"\x1b[38:2::10:20:30m\x1b[94m");
        assert_eq!(screen.cursor().attrs.fg, Color::Indexed(12));

        run(&mut screen, &mut perf, b"\x1b[38:2::10:20:30m");
        assert_eq!(screen.cursor().attrs.fg, Color::rgb(10, 20, 30));

        run(&mut screen, &mut perf, b"\x1b[m");
        assert_eq!(screen.cursor().attrs, CellAttributes::default());
    }

    #[test]
    fn test_sgr_out_of_range_color_is_ignored() {
        let (mut screen, mut perf) = setup(80, 24);
        run(&mut screen, &mut perf, b"\x1b[38;5;196;48;2;1;2;3m");

        run(&mut screen, &mut perf, b"\x1b[38;5;300;1m");
        assert_eq!(screen.cursor().attrs.fg, Color::Indexed(196));
        assert!(screen.cursor().attrs.bold);

        run(&mut screen, &mut perf, b"\x1b[48;2;10;20;999;3m");
        assert_eq!(screen.cursor().attrs.bg, Color::rgb(1, 2, 3));
        assert!(screen.cursor().attrs.italic);

        run(&mut screen, &mut perf, b"\x1b[38:5:256m\x1b[48:2::0:256:0m");
        assert_eq!(screen.cursor().attrs.fg, Color::Indexed(196));
        assert_eq!(screen.cursor().attrs.bg, Color::rgb(1, 2, 3));
    }

    #[test]
    fn test_device_responses() {
        let (mut screen, mut perf) = setup(80, 24);
        run(&mut screen, &mut perf, b"\x1b[5;7H\x1b[6n\x1b[5n\x1b[c");
        assert_eq!(
            perf.take_responses(),
            vec![b"\x1b[5;7R".to_vec(), b"\x1b[0n".to_vec(), b"\x1b[?1;2c".to_vec()]
        );
        assert!(perf.take_responses().is_empty());
    }

    #[test]
    fn test_bells_counted() {
        let (mut screen, mut perf) = setup(10, 2);
        run(&mut screen, &mut perf, b"a\x07b\x07\x07");
        assert_eq!(perf.take_bells(), 3);
        assert_eq!(perf.take_bells(), 0);
    }

    #[test]
    fn test_title() {
        let (mut screen, mut perf) = setup(10, 2);
        run(&mut screen, &mut perf, b"\x1b]2;build\x07");
        assert_eq!(screen.title(), "build");
        assert!(perf.take_title_changed());
        assert!(!perf.take_title_changed());
    }

    #[test]
    fn test_alternate_screen_roundtrip() {
        let (mut screen, mut perf) = setup(20, 4);
        run(&mut screen, &mut perf, b"Primary\x1b[?1049h");
        assert!(screen.is_alternate_screen());
        assert!(screen.line(0).is_empty());

        run(&mut screen, &mut perf, b"Alternate\x1b[?1049l");
        assert!(!screen.is_alternate_screen());
        assert_eq!(screen.line(0).text(), "Primary");
        assert_eq!(screen.cursor().col, 7);
    }

    #[test]
    fn test_modes() {
        let (mut screen, mut perf) = setup(20, 4);
        run(&mut screen, &mut perf, b"\x1b[?1h\x1b[?25l\x1b[?2004h\x1b[4h");
        assert!(screen.modes().cursor_keys_application);
        assert!(!screen.modes().cursor_visible);
        assert!(screen.modes().bracketed_paste);
        assert!(screen.modes().insert_mode);

        run(&mut screen, &mut perf, b"\x1b[?1l\x1b[4l");
        assert!(!screen.modes().cursor_keys_application);
        assert!(!screen.modes().insert_mode);
    }

    #[test]
    fn test_erase_in_line() {
        let (mut screen, mut perf) = setup(10, 3);
        run(&mut screen, &mut perf, b"AAAAAAAAAA\x1b[1;5H\x1b[K");
        assert_eq!(screen.line(0).text(), "AAAA");
    }

    #[test]
    fn test_scroll_region_linefeed() {
        let (mut screen, mut perf) = setup(10, 5);
        run(&mut screen, &mut perf, b"A\r\nB\r\nC\r\nD\r\nE");
        run(&mut screen, &mut perf, b"\x1b[2;4r\x1b[4;1H\n");
        assert_eq!(screen.line(0).text(), "A");
        assert_eq!(screen.line(1).text(), "C");
        assert_eq!(screen.line(2).text(), "D");
        assert_eq!(screen.line(3).text(), "");
        assert_eq!(screen.line(4).text(), "E");
        assert_eq!(screen.scrollback().len(), 0);
    }

    #[test]
    fn test_hyperlink_osc8() {
        let (mut screen, mut perf) = setup(20, 2);
        run(
            &mut screen,
            &mut perf,
            b"\x1b]8;;https://example.com\x1b\\link\x1b]8;;\x1b\\ plain",
        );
        let id = screen.line(0).get(0).unwrap().hyperlink_id;
        assert_ne!(id, 0);
        assert_eq!(screen.hyperlinks().get(id), Some("https://example.com"));
        assert_eq!(screen.line(0).get(5).unwrap().hyperlink_id, 0);
    }

    #[test]
    fn test_alignment_test() {
        let (mut screen, mut perf) = setup(3, 2);
        run(&mut screen, &mut perf, b"\x1b#8");
        assert_eq!(screen.line(0).text(), "EEE");
        assert_eq!(screen.line(1).text(), "EEE");
    }
}
