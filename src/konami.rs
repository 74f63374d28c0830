//! Konami code detection (↑ ↑ ↓ ↓ ← → ← → b a).
//!
//! Fed every key event; completing the sequence reports true and resets.
//! Any key outside the expected next step resets progress.

use crossterm::event::KeyCode;

const SEQUENCE: [KeyCode; 10] = [
    KeyCode::Up,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Char('b'),
    KeyCode::Char('a'),
];

#[derive(Debug, Clone, Default)]
pub struct KonamiDetector {
    index: usize,
}

impl KonamiDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key. Returns true exactly when the final key of the
    /// sequence lands.
    pub fn feed(&mut self, key: KeyCode) -> bool {
        let key = match key {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };

        if key == SEQUENCE[self.index] {
            self.index += 1;
            if self.index == SEQUENCE.len() {
                self.index = 0;
                return true;
            }
        } else {
            self.index = 0;
        }
        false
    }
}
