//! # Key Definitions
//!
//! Device key codes and their meaning to the game.
//!
//! The keyboard delivers one character code per poll. Printable keys arrive
//! as their ASCII value; a handful of control codes stand for the special
//! keys.

use serde::{Deserialize, Serialize};

/// Control codes produced by the device keyboard.
pub mod codes {
    pub const NONE: u8 = 0;
    pub const BACKSPACE: u8 = 8;
    pub const CLEAR: u8 = 12;
    pub const ENTER: u8 = 13;
    pub const SHIFT: u8 = 17;
    pub const FN: u8 = 18;
    pub const LEFT: u8 = 19;
    pub const RIGHT: u8 = 21;
    pub const DELETE: u8 = 127;
}

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Confirm,
    /// Any of the three "back" codes
    Back,
    Left,
    Right,
    Shift,
    Fn,
    /// A printable character, case preserved
    Char(char),
    /// A code with no meaning to the game
    Other(u8),
}

impl Key {
    /// Decodes a device code. Code 0 means no key was pressed.
    ///
    /// # Examples
    ///
    /// ```
    /// use descent::Key;
    ///
    /// assert_eq!(Key::from_code(0), None);
    /// assert_eq!(Key::from_code(127), Some(Key::Back));
    /// assert_eq!(Key::from_code(b'3'), Some(Key::Char('3')));
    /// ```
    pub fn from_code(code: u8) -> Option<Key> {
        let key = match code {
            codes::NONE => return None,
            codes::ENTER => Key::Confirm,
            codes::BACKSPACE | codes::CLEAR | codes::DELETE => Key::Back,
            codes::LEFT => Key::Left,
            codes::RIGHT => Key::Right,
            codes::SHIFT => Key::Shift,
            codes::FN => Key::Fn,
            32..=126 => Key::Char(code as char),
            other => Key::Other(other),
        };
        Some(key)
    }

    /// Value of a digit key from `1` to `9`.
    pub fn menu_digit(self) -> Option<u8> {
        match self {
            Key::Char(c @ '1'..='9') => Some(c as u8 - b'0'),
            _ => None,
        }
    }

    /// Returns true for the letter `letter` in either case.
    pub fn is_letter(self, letter: char) -> bool {
        matches!(self, Key::Char(c) if c.eq_ignore_ascii_case(&letter))
    }
}

/// Modifier state of the device keyboard, toggled by shift and fn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyboardMode {
    #[default]
    Normal,
    Shift,
    Func,
    FnShift,
}

impl KeyboardMode {
    /// Mode after pressing shift.
    pub fn after_shift(self) -> Self {
        match self {
            KeyboardMode::Shift | KeyboardMode::FnShift => KeyboardMode::Normal,
            KeyboardMode::Func => KeyboardMode::FnShift,
            KeyboardMode::Normal => KeyboardMode::Shift,
        }
    }

    /// Mode after pressing fn.
    pub fn after_fn(self) -> Self {
        match self {
            KeyboardMode::Func | KeyboardMode::FnShift => KeyboardMode::Normal,
            KeyboardMode::Shift => KeyboardMode::FnShift,
            KeyboardMode::Normal => KeyboardMode::Func,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_codes() {
        for code in [8, 12, 127] {
            assert_eq!(Key::from_code(code), Some(Key::Back));
        }
        assert_eq!(Key::from_code(200), Some(Key::Other(200)));
    }

    #[test]
    fn test_menu_digits() {
        assert_eq!(Key::Char('1').menu_digit(), Some(1));
        assert_eq!(Key::Char('9').menu_digit(), Some(9));
        assert_eq!(Key::Char('0').menu_digit(), None);
        assert!(Key::Char('F').is_letter('f'));
    }

    #[test]
    fn test_keyboard_mode_cycle() {
        let mode = KeyboardMode::Normal.after_shift();
        assert_eq!(mode, KeyboardMode::Shift);
        assert_eq!(mode.after_fn(), KeyboardMode::FnShift);
        assert_eq!(KeyboardMode::FnShift.after_shift(), KeyboardMode::Normal);
        assert_eq!(KeyboardMode::Func.after_fn(), KeyboardMode::Normal);
    }
}
