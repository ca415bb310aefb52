//! Modifier state across key events
//!
//! Modifiers reach the terminal two ways: reported on the key event itself,
//! or as separate presses of a modifier key. Separate presses are either
//! held (down until released) or sticky. A sticky modifier cycles on each
//! press: the first applies it to the next key only, the second locks it on,
//! the third turns it off.

use serde::{Deserialize, Serialize};

use crate::key::Modifiers;

/// Which modifiers take part in the sticky press cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickyModifiers {
    #[default]
    None,
    Alt,
    All,
}

impl StickyModifiers {
    pub fn mask(self) -> Modifiers {
        match self {
            Self::None => Modifiers::empty(),
            Self::Alt => Modifiers::ALT,
            Self::All => Modifiers::all(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierTracker {
    sticky: StickyModifiers,
    /// Modifier keys currently down
    held: Modifiers,
    /// Applies to the next key, then clears
    transient: Modifiers,
    locked: Modifiers,
}

impl ModifierTracker {
    pub fn new(sticky: StickyModifiers) -> Self {
        Self {
            sticky,
            ..Self::default()
        }
    }

    pub fn sticky(&self) -> StickyModifiers {
        self.sticky
    }

    pub fn set_sticky(&mut self, sticky: StickyModifiers) {
        self.sticky = sticky;
        let keep = sticky.mask();
        self.transient &= keep;
        self.locked &= keep;
    }

    /// Modifier key went down.
    pub fn press(&mut self, mods: Modifiers) {
        self.held |= mods;
    }

    /// Modifier key went up.
    pub fn release(&mut self, mods: Modifiers) {
        self.held.remove(mods);
    }

    /// Advance the sticky cycle for `mods`. Modifiers not configured as
    /// sticky are ignored. Returns whether any state changed.
    pub fn meta_press(&mut self, mods: Modifiers) -> bool {
        self.cycle(mods & self.sticky.mask())
    }

    /// Advance the sticky cycle regardless of configuration, as for an
    /// on-screen Ctrl button.
    pub fn meta_press_forced(&mut self, mods: Modifiers) -> bool {
        self.cycle(mods)
    }

    fn cycle(&mut self, mods: Modifiers) -> bool {
        if mods.is_empty() {
            return false;
        }
        for flag in mods.iter() {
            if self.locked.contains(flag) {
                self.locked.remove(flag);
            } else if self.transient.contains(flag) {
                self.transient.remove(flag);
                self.locked.insert(flag);
            } else {
                self.transient.insert(flag);
            }
        }
        log::trace!(
            "sticky modifiers: transient {:?}, locked {:?}",
            self.transient,
            self.locked
        );
        true
    }

    /// Modifiers to encode a key with: held, sticky and whatever the event
    /// itself reports.
    pub fn effective(&self, event: Modifiers) -> Modifiers {
        self.held | self.transient | self.locked | event
    }

    /// A key was sent; one-shot modifiers are spent.
    pub fn consume(&mut self) {
        self.transient = Modifiers::empty();
    }

    pub fn transient(&self) -> Modifiers {
        self.transient
    }

    pub fn locked(&self) -> Modifiers {
        self.locked
    }

    pub fn held(&self) -> Modifiers {
        self.held
    }

    pub fn reset(&mut self) {
        self.held = Modifiers::empty();
        self.transient = Modifiers::empty();
        self.locked = Modifiers::empty();
    }
}
