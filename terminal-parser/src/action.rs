//! Terminal operations produced by the parser
//!
//! Only sequences the parser recognises become an `Action`; everything else
//! is dropped inside the parser.

use crate::params::Params;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Write a character at the cursor
    Print(char),

    /// Execute a C0 control: BEL, BS, HT, LF, VT, FF or CR
    Control(u8),

    /// ESC sequence (non-CSI)
    Esc(EscAction),

    /// CSI (Control Sequence Introducer) sequence
    Csi(CsiAction),

    /// OSC (Operating System Command) sequence
    Osc(OscAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscAction {
    /// ESC 7 (DECSC)
    SaveCursor,
    /// ESC 8 (DECRC)
    RestoreCursor,
    /// ESC D (IND)
    Index,
    /// ESC M (RI)
    ReverseIndex,
    /// ESC E (NEL)
    NextLine,
    /// ESC H (HTS)
    HorizontalTabSet,
    /// ESC c (RIS)
    FullReset,
    /// ESC # 8 (DECALN)
    AlignmentTest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsiAction {
    pub params: Params,
    /// Intermediate bytes (0x20-0x2F)
    pub intermediates: Vec<u8>,
    /// Final byte (0x40-0x7E)
    pub final_byte: u8,
    /// Leading `?`, `>`, `<` or `=`
    pub marker: Option<u8>,
}

impl CsiAction {
    /// Parameter at `index`, or `default` when absent or zero.
    pub fn param(&self, index: usize, default: u16) -> u16 {
        self.params.get_or(index, default)
    }

    /// Plain sequence with this final byte and no marker or intermediates.
    pub fn is(&self, final_byte: u8) -> bool {
        self.final_byte == final_byte && self.intermediates.is_empty() && self.marker.is_none()
    }

    /// DEC private (`?`) sequence with this final byte.
    pub fn is_private(&self, final_byte: u8) -> bool {
        self.final_byte == final_byte
            && self.intermediates.is_empty()
            && self.marker == Some(b'?')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OscAction {
    /// OSC 0 / OSC 2
    SetTitle(String),
    /// OSC 1
    SetIconName(String),
    /// OSC 8 with a target: characters written until the matching close
    /// belong to `uri`
    HyperlinkOpen { id: Option<String>, uri: String },
    /// OSC 8 with an empty target
    HyperlinkClose,
}
