//! # Input Module
//!
//! Keyboard polling for the macroquad host and key decoding for the engine.

pub mod commands;

pub use commands::*;

use macroquad::prelude::*;

/// Reads the host keyboard and reports device key codes.
///
/// Special keys map onto the device control codes; printable characters are
/// passed through as ASCII.
pub struct InputHandler {
    /// Treat the Escape key as "back"
    pub escape_is_back: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    pub fn new() -> Self {
        Self {
            escape_is_back: true,
        }
    }

    /// Returns the code of a key pressed this frame, if any.
    pub fn poll(&self) -> Option<u8> {
        let code = self.special_key_code().or_else(|| {
            std::iter::from_fn(get_char_pressed)
                .find(|c| c.is_ascii_graphic() || *c == ' ')
                .map(|c| c as u8)
        });

        // Drop queued characters so a special key is not also read as text.
        while get_char_pressed().is_some() {}
        code
    }

    fn special_key_code(&self) -> Option<u8> {
        if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter) {
            return Some(codes::ENTER);
        }
        if is_key_pressed(KeyCode::Backspace) || is_key_pressed(KeyCode::Delete) {
            return Some(codes::BACKSPACE);
        }
        if self.escape_is_back && is_key_pressed(KeyCode::Escape) {
            return Some(codes::BACKSPACE);
        }
        if is_key_pressed(KeyCode::Left) {
            return Some(codes::LEFT);
        }
        if is_key_pressed(KeyCode::Right) {
            return Some(codes::RIGHT);
        }
        if is_key_pressed(KeyCode::LeftShift) || is_key_pressed(KeyCode::RightShift) {
            return Some(codes::SHIFT);
        }
        if is_key_pressed(KeyCode::Tab) {
            return Some(codes::FN);
        }
        None
    }
}
