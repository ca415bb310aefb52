//! Key encoding
//!
//! Legacy xterm encoding: control characters for Ctrl+key, an ESC prefix
//! for Alt, `CSI 1 ; m X` for modified cursor keys and `CSI n ; m ~` for
//! the editing keypad and F5 and up.

use crate::key::{Key, Modifiers};

const ESC: u8 = 0x1B;
const DEL: u8 = 0x7F;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyEncoder {
    /// DECCKM: unmodified cursor keys send `ESC O X`
    pub application_cursor: bool,
    /// Shift+digit sends F1..F10
    pub shifted_numbers_are_fkeys: bool,
    /// Ctrl+digit sends F1..F10
    pub control_numbers_are_fkeys: bool,
}

impl KeyEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a key press. `None` when the key has no byte encoding.
    pub fn encode(&self, key: Key, mods: Modifiers) -> Option<Vec<u8>> {
        if let Key::Char(c) = key {
            let as_fkey = (mods.shift() && self.shifted_numbers_are_fkeys)
                || (mods.ctrl() && self.control_numbers_are_fkeys);
            if as_fkey {
                if let Some(fkey) = digit_function_key(c) {
                    return self.encode(fkey, Modifiers::empty());
                }
            }
        }

        let bytes = match key {
            Key::Char(c) => encode_char(c, mods),
            Key::Enter => alt_prefixed(mods, &[b'\r']),
            Key::Tab if mods.shift() => b"\x1b[Z".to_vec(),
            Key::Tab => alt_prefixed(mods, &[b'\t']),
            Key::Backspace if mods.ctrl() => alt_prefixed(mods, &[0x08]),
            Key::Backspace => alt_prefixed(mods, &[DEL]),
            Key::Escape => alt_prefixed(mods, &[ESC]),
            Key::Up => self.cursor_key(b'A', mods),
            Key::Down => self.cursor_key(b'B', mods),
            Key::Right => self.cursor_key(b'C', mods),
            Key::Left => self.cursor_key(b'D', mods),
            Key::Home => self.cursor_key(b'H', mods),
            Key::End => self.cursor_key(b'F', mods),
            Key::Insert => tilde_key(2, mods),
            Key::Delete => tilde_key(3, mods),
            Key::PageUp => tilde_key(5, mods),
            Key::PageDown => tilde_key(6, mods),
            Key::F(n) => return function_key(n, mods),
        };
        Some(bytes)
    }

    /// Bytes for an IME request to delete `count` characters before the
    /// cursor: one backspace keystroke per character, back to back.
    pub fn ime_delete(&self, count: usize) -> Vec<u8> {
        self.encode(Key::Backspace, Modifiers::empty())
            .unwrap_or_default()
            .repeat(count)
    }

    /// Bytes for text committed by an input method.
    pub fn ime_commit(&self, text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    fn cursor_key(&self, final_byte: u8, mods: Modifiers) -> Vec<u8> {
        if !mods.is_empty() {
            format!("\x1b[1;{}{}", mods.xterm_param(), final_byte as char).into_bytes()
        } else if self.application_cursor {
            vec![ESC, b'O', final_byte]
        } else {
            vec![ESC, b'[', final_byte]
        }
    }
}

/// F-key for a digit: `1`..`9` are F1..F9 and `0` is F10.
pub fn digit_function_key(c: char) -> Option<Key> {
    match c {
        '1'..='9' => Some(Key::F(c as u8 - b'0')),
        '0' => Some(Key::F(10)),
        _ => None,
    }
}

fn encode_char(c: char, mods: Modifiers) -> Vec<u8> {
    if mods.ctrl() {
        if let Some(byte) = control_byte(c) {
            return alt_prefixed(mods, &[byte]);
        }
    }

    let c = if mods.shift() && !mods.ctrl() && c.is_ascii_lowercase() {
        c.to_ascii_uppercase()
    } else {
        c
    };
    let mut buf = [0u8; 4];
    alt_prefixed(mods, c.encode_utf8(&mut buf).as_bytes())
}

/// C0 byte produced by Ctrl with `c`.
fn control_byte(c: char) -> Option<u8> {
    match c {
        'a'..='z' => Some(c as u8 - b'a' + 1),
        'A'..='Z' => Some(c as u8 - b'A' + 1),
        ' ' | '@' => Some(0x00),
        '[' => Some(0x1B),
        '\\' => Some(0x1C),
        ']' => Some(0x1D),
        '^' => Some(0x1E),
        '_' => Some(0x1F),
        '?' => Some(DEL),
        _ => None,
    }
}

fn alt_prefixed(mods: Modifiers, bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 1);
    if mods.alt() {
        out.push(ESC);
    }
    out.extend_from_slice(bytes);
    out
}

fn tilde_key(code: u8, mods: Modifiers) -> Vec<u8> {
    if mods.is_empty() {
        format!("\x1b[{code}~").into_bytes()
    } else {
        format!("\x1b[{code};{}~", mods.xterm_param()).into_bytes()
    }
}

fn function_key(n: u8, mods: Modifiers) -> Option<Vec<u8>> {
    let ss3_final = match n {
        1 => Some(b'P'),
        2 => Some(b'Q'),
        3 => Some(b'R'),
        4 => Some(b'S'),
        _ => None,
    };
    if let Some(final_byte) = ss3_final {
        return Some(if mods.is_empty() {
            vec![ESC, b'O', final_byte]
        } else {
            format!("\x1b[1;{}{}", mods.xterm_param(), final_byte as char).into_bytes()
        });
    }

    let code = match n {
        5 => 15,
        6 => 17,
        7 => 18,
        8 => 19,
        9 => 20,
        10 => 21,
        11 => 23,
        12 => 24,
        _ => {
            log::debug!("no encoding for F{n}");
            return None;
        }
    };
    Some(tilde_key(code, mods))
}
