use super::{KeyCode, KeyEvent, KeyPhase, KeySample};

/// Ticks between repeated long-press events.
pub const DEFAULT_LONG_PRESS_TICKS: u32 = 5;

/// Turns one key sample per tick into Trigger / LongPress / Release events.
///
/// The first pressed tick triggers; after that a long press repeats every
/// `long_press_ticks` ticks once the hold exceeds that period. The first
/// released tick after a press emits one release for the key that was held.
#[derive(Clone, Copy, Debug)]
pub struct KeyDebouncer {
    long_press_ticks: u32,
    held_ticks: u32,
    held_code: Option<KeyCode>,
}

impl Default for KeyDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_PRESS_TICKS)
    }
}

impl KeyDebouncer {
    pub const fn new(long_press_ticks: u32) -> Self {
        Self {
            long_press_ticks: if long_press_ticks == 0 {
                1
            } else {
                long_press_ticks
            },
            held_ticks: 0,
            held_code: None,
        }
    }

    /// Ticks the current key has been held, `0` when idle.
    pub const fn held_ticks(&self) -> u32 {
        self.held_ticks
    }

    pub fn update(&mut self, sample: KeySample) -> Option<KeyEvent> {
        if !sample.pressed {
            self.held_ticks = 0;
            return self.held_code.take().map(|code| KeyEvent {
                code,
                phase: KeyPhase::Release,
            });
        }

        self.held_ticks = self.held_ticks.saturating_add(1);
        self.held_code = Some(sample.code);

        let phase = if self.held_ticks == 1 {
            KeyPhase::Trigger
        } else if self.held_ticks > self.long_press_ticks
            && self.held_ticks % self.long_press_ticks == 0
        {
            KeyPhase::LongPress
        } else {
            return None;
        };

        Some(KeyEvent {
            code: sample.code,
            phase,
        })
    }
}
