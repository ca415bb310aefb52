//! Terminal Parser - VT/xterm escape sequence parser
//!
//! Converts a raw byte stream from a remote shell into an ordered stream of
//! [`Action`]s. The parser is streaming (sequences and UTF-8 characters may
//! be split across calls), deterministic, and never fails: unknown or
//! malformed input is dropped and the parser returns to ground state.
//!
//! Reference: https://www.x.org/docs/xterm/ctlseqs.pdf

mod action;
mod params;
mod parser;
mod utf8;

pub use action::{Action, CsiAction, EscAction, OscAction};
pub use params::{Params, MAX_PARAMS};
pub use parser::{Parser, ParserState, MAX_OSC_LEN};
pub use utf8::REPLACEMENT_CHAR;
