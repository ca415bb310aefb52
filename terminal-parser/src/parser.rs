//! Terminal escape sequence parser
//!
//! A state machine after the VT500 series parser model
//! (<https://vt100.net/emu/dec_ansi_parser>). Every byte goes through
//! [`Parser::advance`], which matches on the current state and the byte and
//! either emits an [`Action`], collects the byte, or moves to another state.
//!
//! Sequences the parser does not understand are consumed and dropped. No
//! input can make the parser fail or leave it stuck outside `Ground` for
//! longer than the sequence it is reading.

use crate::action::{Action, CsiAction, EscAction, OscAction};
use crate::params::Params;
use crate::utf8::{is_continuation, Utf8Decoder, Utf8Result, REPLACEMENT_CHAR};

/// OSC payload bytes beyond this are dropped.
pub const MAX_OSC_LEN: usize = 65536;
const MAX_PARAM_BYTES: usize = 256;
const MAX_INTERMEDIATES: usize = 4;

const BEL: u8 = 0x07;
const CAN: u8 = 0x18;
const SUB: u8 = 0x1A;
const ESC: u8 = 0x1B;
const DEL: u8 = 0x7F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Normal text
    Ground,
    /// Inside a multi-byte UTF-8 character
    Utf8,
    /// After ESC
    Escape,
    /// ESC followed by one or more intermediate bytes
    EscapeIntermediate,
    /// After ESC [
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    /// Malformed CSI, skipping to its final byte
    CsiIgnore,
    /// After ESC ]
    OscString,
    /// After ESC P, consumed until ST
    DcsString,
    /// SOS, PM or APC, consumed until ST
    IgnoredString,
}

#[derive(Debug, Clone)]
pub struct Parser {
    state: ParserState,
    utf8: Utf8Decoder,
    params: Vec<u8>,
    intermediates: Vec<u8>,
    marker: Option<u8>,
    osc: Vec<u8>,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Ground,
            utf8: Utf8Decoder::new(),
            params: Vec::with_capacity(32),
            intermediates: Vec::with_capacity(MAX_INTERMEDIATES),
            marker: None,
            osc: Vec::with_capacity(256),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Drop any partial sequence and return to `Ground`.
    pub fn reset(&mut self) {
        self.state = ParserState::Ground;
        self.utf8.reset();
        self.clear_sequence();
        self.osc.clear();
    }

    /// Parse a chunk of bytes, calling `callback` for each action in order.
    ///
    /// Chunks may split sequences and characters anywhere; state carries
    /// over to the next call.
    pub fn parse<F>(&mut self, data: &[u8], mut callback: F)
    where
        F: FnMut(Action),
    {
        for &byte in data {
            self.advance(byte, &mut callback);
        }
    }

    pub fn parse_collect(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::new();
        self.parse(data, |action| actions.push(action));
        actions
    }

    /// The transition function.
    fn advance<F>(&mut self, byte: u8, emit: &mut F)
    where
        F: FnMut(Action),
    {
        use ParserState::*;

        match (self.state, byte) {
            (Utf8, b) if is_continuation(b) => match self.utf8.continue_with(b) {
                Utf8Result::Pending => {}
                Utf8Result::Char(c) => {
                    emit(Action::Print(c));
                    self.state = Ground;
                }
                Utf8Result::Invalid => {
                    emit(Action::Print(REPLACEMENT_CHAR));
                    self.state = Ground;
                }
            },
            (Utf8, _) => {
                // truncated character; the interrupting byte still counts
                self.utf8.reset();
                emit(Action::Print(REPLACEMENT_CHAR));
                self.state = Ground;
                self.advance(byte, emit);
            }

            (OscString, BEL) => {
                self.finish_osc(emit);
                self.state = Ground;
            }
            (OscString | DcsString | IgnoredString, ESC) => {
                // ESC \ is the string terminator; the backslash is then
                // swallowed by the Escape state
                if self.state == OscString {
                    self.finish_osc(emit);
                }
                self.osc.clear();
                self.enter_escape();
            }
            (OscString | DcsString | IgnoredString, CAN | SUB) => {
                log::debug!("string sequence cancelled");
                self.osc.clear();
                self.state = Ground;
            }
            (OscString, b) => {
                if self.osc.len() < MAX_OSC_LEN {
                    self.osc.push(b);
                }
            }
            (DcsString | IgnoredString, _) => {}

            (_, CAN | SUB) => {
                self.clear_sequence();
                self.state = Ground;
            }
            (_, ESC) => self.enter_escape(),
            (_, 0x00..=0x1F) => execute(byte, emit),

            (Ground, 0x20..=0x7E) => emit(Action::Print(byte as char)),
            (Ground, DEL) => {}
            (Ground, _) => match self.utf8.start(byte) {
                Utf8Result::Pending => self.state = Utf8,
                Utf8Result::Char(c) => emit(Action::Print(c)),
                Utf8Result::Invalid => emit(Action::Print(REPLACEMENT_CHAR)),
            },

            (_, DEL) => {}
            (_, 0x80..=0xFF) => {
                // non-ASCII inside a sequence: abandon it and treat the
                // byte as text
                log::debug!("sequence interrupted by byte {:#04x}", byte);
                self.clear_sequence();
                self.state = Ground;
                self.advance(byte, emit);
            }

            (Escape, b) => self.escape(b, emit),
            (EscapeIntermediate, 0x20..=0x2F) => self.collect_intermediate(byte),
            (EscapeIntermediate, b) => {
                if self.intermediates.as_slice() == [b'#'] && b == b'8' {
                    emit(Action::Esc(EscAction::AlignmentTest));
                } else {
                    log::debug!(
                        "ignoring ESC {:?} {:?}",
                        String::from_utf8_lossy(&self.intermediates),
                        b as char
                    );
                }
                self.state = Ground;
            }

            (CsiEntry, b'<'..=b'?') => {
                self.marker = Some(byte);
                self.state = CsiParam;
            }
            (CsiEntry | CsiParam, b'0'..=b'9' | b';' | b':') => {
                if self.params.len() < MAX_PARAM_BYTES {
                    self.params.push(byte);
                    self.state = CsiParam;
                } else {
                    self.state = CsiIgnore;
                }
            }
            (CsiEntry | CsiParam | CsiIntermediate, 0x20..=0x2F) => {
                if self.intermediates.len() < MAX_INTERMEDIATES {
                    self.intermediates.push(byte);
                    self.state = CsiIntermediate;
                } else {
                    self.state = CsiIgnore;
                }
            }
            (CsiEntry | CsiParam | CsiIntermediate, 0x40..=0x7E) => {
                self.dispatch_csi(byte, emit);
                self.state = Ground;
            }
            (CsiEntry | CsiParam | CsiIntermediate, _) => self.state = CsiIgnore,
            (CsiIgnore, 0x40..=0x7E) => {
                log::debug!("dropping malformed CSI ending in {:?}", byte as char);
                self.clear_sequence();
                self.state = Ground;
            }
            (CsiIgnore, _) => {}
        }
    }

    fn enter_escape(&mut self) {
        self.clear_sequence();
        self.state = ParserState::Escape;
    }

    fn escape<F>(&mut self, byte: u8, emit: &mut F)
    where
        F: FnMut(Action),
    {
        let next = match byte {
            b'[' => ParserState::CsiEntry,
            b']' => {
                self.osc.clear();
                ParserState::OscString
            }
            b'P' => ParserState::DcsString,
            b'X' | b'^' | b'_' => ParserState::IgnoredString,
            0x20..=0x2F => {
                self.collect_intermediate(byte);
                ParserState::EscapeIntermediate
            }
            _ => {
                let action = match byte {
                    b'7' => Some(EscAction::SaveCursor),
                    b'8' => Some(EscAction::RestoreCursor),
                    b'D' => Some(EscAction::Index),
                    b'M' => Some(EscAction::ReverseIndex),
                    b'E' => Some(EscAction::NextLine),
                    b'H' => Some(EscAction::HorizontalTabSet),
                    b'c' => Some(EscAction::FullReset),
                    // ST outside a string, keypad modes and the rest
                    _ => None,
                };
                match action {
                    Some(action) => emit(Action::Esc(action)),
                    None => log::trace!("ignoring ESC {:?}", byte as char),
                }
                ParserState::Ground
            }
        };
        self.state = next;
    }

    fn collect_intermediate(&mut self, byte: u8) {
        if self.intermediates.len() < MAX_INTERMEDIATES {
            self.intermediates.push(byte);
        }
    }

    fn clear_sequence(&mut self) {
        self.params.clear();
        self.intermediates.clear();
        self.marker = None;
    }

    fn dispatch_csi<F>(&mut self, final_byte: u8, emit: &mut F)
    where
        F: FnMut(Action),
    {
        let action = CsiAction {
            params: Params::parse(&self.params),
            intermediates: std::mem::take(&mut self.intermediates),
            final_byte,
            marker: self.marker.take(),
        };
        self.params.clear();
        emit(Action::Csi(action));
    }

    fn finish_osc<F>(&mut self, emit: &mut F)
    where
        F: FnMut(Action),
    {
        let data = String::from_utf8_lossy(&self.osc).into_owned();
        self.osc.clear();

        let (command, payload) = match data.split_once(';') {
            Some((command, payload)) => (command, payload),
            None => (data.as_str(), ""),
        };
        let Ok(command) = command.parse::<u16>() else {
            log::debug!("dropping OSC with non-numeric command {:?}", command);
            return;
        };

        let action = match command {
            0 | 2 => OscAction::SetTitle(payload.to_string()),
            1 => OscAction::SetIconName(payload.to_string()),
            8 => match parse_hyperlink(payload) {
                Some(action) => action,
                None => {
                    log::debug!("dropping malformed OSC 8 {:?}", payload);
                    return;
                }
            },
            _ => {
                log::debug!("ignoring OSC {}", command);
                return;
            }
        };
        emit(Action::Osc(action));
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn execute<F>(byte: u8, emit: &mut F)
where
    F: FnMut(Action),
{
    match byte {
        // BEL, BS, HT, LF, VT, FF, CR
        0x07..=0x0D => emit(Action::Control(byte)),
        _ => log::trace!("ignoring C0 {:#04x}", byte),
    }
}

/// `params;uri` where params is a `:`-separated list of `key=value`.
fn parse_hyperlink(payload: &str) -> Option<OscAction> {
    let (params, uri) = payload.split_once(';')?;
    if uri.is_empty() {
        return Some(OscAction::HyperlinkClose);
    }
    let id = params
        .split(':')
        .filter_map(|kv| kv.split_once('='))
        .find(|(key, _)| *key == "id")
        .map(|(_, value)| value.to_string());
    Some(OscAction::HyperlinkOpen {
        id,
        uri: uri.to_string(),
    })
}
