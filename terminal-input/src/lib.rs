//! Terminal Input - key events to the bytes a remote program expects
//!
//! - [`KeyEncoder`] maps a key plus modifier set to xterm byte sequences
//! - [`ModifierTracker`] merges modifiers that arrive as their own key
//!   events (held or sticky) with modifiers reported on the key event
//!
//! Encoding is a pure function of key, modifiers and the cursor-key mode.

mod encoder;
mod key;
mod tracker;

pub use encoder::{digit_function_key, KeyEncoder};
pub use key::{Key, Modifiers};
pub use tracker::{ModifierTracker, StickyModifiers};
