//! Keypad sampling, debouncing and key-to-command mapping.

mod debounce;
mod mock;

pub use debounce::{DEFAULT_LONG_PRESS_TICKS, KeyDebouncer};
pub use mock::ScriptedKeys;

/// Keypad scan code.
pub type KeyCode = u16;

/// One raw keypad sample, taken once per tick.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeySample {
    pub pressed: bool,
    pub code: KeyCode,
}

impl KeySample {
    pub const IDLE: Self = Self::released(0);

    pub const fn pressed(code: KeyCode) -> Self {
        Self {
            pressed: true,
            code,
        }
    }

    pub const fn released(code: KeyCode) -> Self {
        Self {
            pressed: false,
            code,
        }
    }
}

/// Polled keypad.
pub trait KeySource {
    type Error;

    fn poll_key(&mut self) -> Result<KeySample, Self::Error>;
}

/// Debounced phase of one key press.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyPhase {
    Trigger,
    LongPress,
    Release,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub phase: KeyPhase,
}

/// Receives debounced key events. Every hook returns `false` to end the
/// session.
pub trait KeyHandler {
    fn on_trigger(&mut self, _code: KeyCode) -> bool {
        true
    }

    fn on_long_press(&mut self, _code: KeyCode) -> bool {
        true
    }

    fn on_release(&mut self, code: KeyCode) -> bool;

    fn on_key(&mut self, event: KeyEvent) -> bool {
        match event.phase {
            KeyPhase::Trigger => self.on_trigger(event.code),
            KeyPhase::LongPress => self.on_long_press(event.code),
            KeyPhase::Release => self.on_release(event.code),
        }
    }
}

/// Viewer actions bound to keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Exit,
    PrevPage,
    NextPage,
    PrevHalfPage,
    NextHalfPage,
}

/// Scan codes for each [`Command`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Keymap {
    pub exit: KeyCode,
    pub prev_page: KeyCode,
    pub next_page: KeyCode,
    pub prev_half_page: KeyCode,
    pub next_half_page: KeyCode,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            exit: 0x01,
            prev_page: 0x02,
            next_page: 0x03,
            prev_half_page: 0x04,
            next_half_page: 0x05,
        }
    }
}

impl Keymap {
    pub fn command(&self, code: KeyCode) -> Option<Command> {
        if code == self.exit {
            Some(Command::Exit)
        } else if code == self.prev_page {
            Some(Command::PrevPage)
        } else if code == self.next_page {
            Some(Command::NextPage)
        } else if code == self.prev_half_page {
            Some(Command::PrevHalfPage)
        } else if code == self.next_half_page {
            Some(Command::NextHalfPage)
        } else {
            None
        }
    }
}
