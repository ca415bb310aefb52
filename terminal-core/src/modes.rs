//! Terminal mode flags set by SM/RM and DECSET/DECRST

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modes {
    /// IRM (4): printing shifts the rest of the line right
    pub insert_mode: bool,
    /// LNM (20): LF, VT and FF also return the carriage
    pub linefeed_mode: bool,
    /// DECCKM (?1): arrow keys send SS3 sequences
    pub cursor_keys_application: bool,
    /// DECOM (?6): cursor addressing is relative to the scroll region
    pub origin_mode: bool,
    /// DECAWM (?7)
    pub auto_wrap: bool,
    /// DECTCEM (?25)
    pub cursor_visible: bool,
    /// ?47 / ?1047 / ?1049
    pub alternate_screen: bool,
    /// ?2004
    pub bracketed_paste: bool,
}

impl Modes {
    pub fn new() -> Self {
        Self {
            insert_mode: false,
            linefeed_mode: false,
            cursor_keys_application: false,
            origin_mode: false,
            auto_wrap: true,
            cursor_visible: true,
            alternate_screen: false,
            bracketed_paste: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Apply SM (`value = true`) or RM for an ANSI mode number. Returns
    /// false for modes this terminal does not implement.
    pub fn set_ansi_mode(&mut self, mode: u16, value: bool) -> bool {
        match mode {
            4 => self.insert_mode = value,
            20 => self.linefeed_mode = value,
            _ => return false,
        }
        true
    }
}

impl Default for Modes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_default() {
        let modes = Modes::new();
        assert!(modes.auto_wrap);
        assert!(modes.cursor_visible);
        assert!(!modes.insert_mode);
        assert!(!modes.alternate_screen);
    }

    #[test]
    fn test_ansi_modes() {
        let mut modes = Modes::new();
        assert!(modes.set_ansi_mode(4, true));
        assert!(modes.insert_mode);
        assert!(modes.set_ansi_mode(20, true));
        assert!(modes.linefeed_mode);
        assert!(!modes.set_ansi_mode(12, true));
    }

    #[test]
    fn test_modes_reset() {
        let mut modes = Modes::new();
        modes.auto_wrap = false;
        modes.bracketed_paste = true;
        modes.reset();
        assert_eq!(modes, Modes::new());
    }
}
