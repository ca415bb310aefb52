//! Streaming UTF-8 reassembly
//!
//! Multi-byte characters may be split across `Parser::parse` calls, so the
//! decoder keeps the partial sequence between bytes instead of between
//! buffers.

pub const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Accumulates the bytes of one multi-byte character.
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    buffer: [u8; 4],
    len: usize,
    expected: usize,
}

/// Outcome of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Result {
    /// More continuation bytes are needed
    Pending,
    /// A complete scalar value
    Char(char),
    /// The bytes so far can never form a valid character
    Invalid,
}

/// True for `10xxxxxx`.
pub fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.len = 0;
        self.expected = 0;
    }

    /// True while a lead byte has been seen but the character is incomplete.
    pub fn is_pending(&self) -> bool {
        self.len > 0
    }

    /// Start a new sequence with a lead byte (>= 0x80).
    pub fn start(&mut self, byte: u8) -> Utf8Result {
        self.reset();
        let expected = match byte {
            // 0xC0/0xC1 can only produce overlong encodings
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Utf8Result::Invalid,
        };
        self.buffer[0] = byte;
        self.len = 1;
        self.expected = expected;
        Utf8Result::Pending
    }

    /// Add a continuation byte to the pending sequence.
    ///
    /// Callers check [`is_continuation`] first; a non-continuation byte ends
    /// the pending sequence as invalid and must be reprocessed on its own.
    pub fn continue_with(&mut self, byte: u8) -> Utf8Result {
        if !self.is_pending() || !is_continuation(byte) {
            self.reset();
            return Utf8Result::Invalid;
        }

        self.buffer[self.len] = byte;
        self.len += 1;
        if self.len < self.expected {
            return Utf8Result::Pending;
        }

        let result = self.decode();
        self.reset();
        result
    }

    fn decode(&self) -> Utf8Result {
        let b = &self.buffer;
        let (cp, min) = match self.expected {
            2 => (((b[0] & 0x1F) as u32) << 6 | (b[1] & 0x3F) as u32, 0x80),
            3 => (
                ((b[0] & 0x0F) as u32) << 12 | ((b[1] & 0x3F) as u32) << 6 | (b[2] & 0x3F) as u32,
                0x800,
            ),
            4 => (
                ((b[0] & 0x07) as u32) << 18
                    | ((b[1] & 0x3F) as u32) << 12
                    | ((b[2] & 0x3F) as u32) << 6
                    | (b[3] & 0x3F) as u32,
                0x10000,
            ),
            _ => return Utf8Result::Invalid,
        };
        if cp < min {
            return Utf8Result::Invalid;
        }
        // from_u32 rejects surrogates and values past U+10FFFF
        char::from_u32(cp)
            .map(Utf8Result::Char)
            .unwrap_or(Utf8Result::Invalid)
    }
}
