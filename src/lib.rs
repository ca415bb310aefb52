//! Terminal Engine
//!
//! A headless terminal emulation engine: remote bytes go in, immutable
//! screen snapshots come out, and user input is turned back into bytes for
//! the remote end.
//!
//! - `parser`: VT/xterm escape sequence parser
//! - `core`: screen model, scrollback, snapshots, selection, link detection
//! - `input`: key encoding and modifier tracking
//! - `palette`: GNOME/Gogh and iTerm2 color scheme import
//!
//! [`Terminal`] ties them together behind the [`TerminalEvents`] sink.

pub mod config;
mod error;
mod performer;
pub mod terminal;

pub use terminal_core as core;
pub use terminal_input as input;
pub use terminal_palette as palette;
pub use terminal_parser as parser;

pub use config::{CliArgs, ConfigError, TerminalConfig};
pub use error::{Result, TerminalError};
pub use terminal::{NoopEvents, SnapshotHandle, TapOutcome, Terminal, TerminalEvents};
