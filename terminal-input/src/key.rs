//! Key identities and modifier sets

use bitflags::bitflags;

/// Keyboard key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// Function key, F1 through F12
    F(u8),
}

bitflags! {
    /// Keyboard modifiers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const ALT   = 0b010;
        const CTRL  = 0b100;
    }
}

impl Modifiers {
    /// xterm modifier parameter: 1 for none, 2 shift, 3 alt, 5 ctrl, and
    /// sums of those above 1 for combinations.
    pub fn xterm_param(self) -> u8 {
        1 + self.bits()
    }

    pub fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }

    pub fn alt(self) -> bool {
        self.contains(Self::ALT)
    }

    pub fn ctrl(self) -> bool {
        self.contains(Self::CTRL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xterm_param() {
        assert_eq!(Modifiers::empty().xterm_param(), 1);
        assert_eq!(Modifiers::SHIFT.xterm_param(), 2);
        assert_eq!(Modifiers::ALT.xterm_param(), 3);
        assert_eq!((Modifiers::SHIFT | Modifiers::ALT).xterm_param(), 4);
        assert_eq!(Modifiers::CTRL.xterm_param(), 5);
        assert_eq!(Modifiers::all().xterm_param(), 8);
    }
}
