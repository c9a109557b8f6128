//! # Rendering Module
//!
//! The renderer collaborator and the screen painter.
//!
//! Screens are laid out on a 320x240 monochrome canvas. The engine paints
//! through the [`Surface`] trait and finishes each frame with a single
//! [`Surface::commit`], choosing a fast partial refresh or a slow full one.

pub mod display;
pub mod ui;

pub use display::*;
pub use ui::*;

use serde::{Deserialize, Serialize};

/// Canvas width in pixels.
pub const SCREEN_WIDTH: i32 = 320;

/// Canvas height in pixels.
pub const SCREEN_HEIGHT: i32 = 240;

/// Ink of a monochrome panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ink {
    Black,
    White,
}

/// Font selector for text drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontSize {
    /// Status bar and dense lists
    Small,
    /// Body text
    Regular,
    /// Screen headings
    Heading,
    /// The title screen banner
    Banner,
}

impl FontSize {
    /// Approximate glyph advance in canvas pixels.
    pub fn char_width(self) -> i32 {
        match self {
            FontSize::Small => 6,
            FontSize::Regular => 11,
            FontSize::Heading => 14,
            FontSize::Banner => 21,
        }
    }

    /// Line height in canvas pixels.
    pub fn line_height(self) -> i32 {
        match self {
            FontSize::Small => 10,
            FontSize::Regular => 18,
            FontSize::Heading => 24,
            FontSize::Banner => 36,
        }
    }
}

/// How the finished frame reaches the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefreshMode {
    /// Partial update; quick but may leave ghosting
    Fast,
    /// Full waveform refresh
    Full,
}

/// The renderer collaborator. Coordinates are canvas pixels; text is
/// positioned by its baseline.
pub trait Surface {
    /// Blanks the canvas to white.
    fn clear(&mut self);

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, ink: Ink);

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, ink: Ink);

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, ink: Ink);

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, ink: Ink);

    fn draw_text(&mut self, x: i32, y: i32, text: &str, font: FontSize);

    fn draw_pixel(&mut self, x: i32, y: i32, ink: Ink);

    /// Pushes the canvas to the physical display.
    fn commit(&mut self, mode: RefreshMode);
}

/// A drawing call captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Clear,
    FillRect { x: i32, y: i32, w: i32, h: i32, ink: Ink },
    DrawRect { x: i32, y: i32, w: i32, h: i32, ink: Ink },
    Line { x0: i32, y0: i32, x1: i32, y1: i32, ink: Ink },
    Circle { cx: i32, cy: i32, radius: i32, ink: Ink },
    Text { x: i32, y: i32, text: String, font: FontSize },
    Pixel { x: i32, y: i32, ink: Ink },
}

/// Surface that records drawing calls instead of drawing.
///
/// # Examples
///
/// ```
/// use descent::{FontSize, RecordingSurface, RefreshMode, Surface};
///
/// let mut surface = RecordingSurface::new();
/// surface.draw_text(10, 20, "Hello", FontSize::Regular);
/// surface.commit(RefreshMode::Full);
/// assert!(surface.contains_text("Hello"));
/// assert_eq!(surface.commits, vec![RefreshMode::Full]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    /// Calls since the last commit
    pub ops: Vec<DrawOp>,
    /// Refresh modes of every commit so far
    pub commits: Vec<RefreshMode>,
    /// Operations of the most recent committed frame
    pub last_frame: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text drawn in the current frame, or in the last committed one when
    /// nothing has been drawn since.
    pub fn texts(&self) -> Vec<&str> {
        let frame = if self.ops.is_empty() {
            &self.last_frame
        } else {
            &self.ops
        };
        frame
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns true if any drawn text contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|text| text.contains(needle))
    }

    pub fn frame_count(&self) -> usize {
        self.commits.len()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, ink: Ink) {
        self.ops.push(DrawOp::FillRect { x, y, w, h, ink });
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, ink: Ink) {
        self.ops.push(DrawOp::DrawRect { x, y, w, h, ink });
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, ink: Ink) {
        self.ops.push(DrawOp::Line { x0, y0, x1, y1, ink });
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, ink: Ink) {
        self.ops.push(DrawOp::Circle { cx, cy, radius, ink });
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, font: FontSize) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font,
        });
    }

    fn draw_pixel(&mut self, x: i32, y: i32, ink: Ink) {
        self.ops.push(DrawOp::Pixel { x, y, ink });
    }

    fn commit(&mut self, mode: RefreshMode) {
        self.last_frame = std::mem::take(&mut self.ops);
        self.commits.push(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_moves_ops_to_last_frame() {
        let mut surface = RecordingSurface::new();
        surface.clear();
        surface.draw_text(0, 10, "TOWN", FontSize::Heading);
        surface.commit(RefreshMode::Fast);

        assert!(surface.ops.is_empty());
        assert_eq!(surface.last_frame.len(), 2);
        assert_eq!(surface.texts(), vec!["TOWN"]);
        assert_eq!(surface.frame_count(), 1);
    }

    #[test]
    fn test_font_metrics_grow_with_size() {
        assert!(FontSize::Small.char_width() < FontSize::Regular.char_width());
        assert!(FontSize::Heading.line_height() < FontSize::Banner.line_height());
    }
}
