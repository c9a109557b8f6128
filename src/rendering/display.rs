//! # Display Management
//!
//! A macroquad window standing in for the handheld's e-ink panel.
//!
//! Macroquad redraws every frame while the panel keeps its image, so the
//! display buffers drawing calls and replays the last committed frame,
//! scaled to the window, on every [`MacroquadDisplay::present`].

use crate::rendering::{DrawOp, FontSize, Ink, RefreshMode, Surface, SCREEN_HEIGHT, SCREEN_WIDTH};
use log::debug;
use macroquad::prelude::*;

/// Frames a full refresh shows the inverted "flash" before the new image.
const FULL_REFRESH_FLASH_FRAMES: u32 = 3;

/// Paper tone used for white ink.
const PAPER: Color = Color::new(0.93, 0.92, 0.88, 1.0);

/// Macroquad display manager for the game.
pub struct MacroquadDisplay {
    /// Drawing calls of the frame being built
    pending: Vec<DrawOp>,
    /// The image currently "on the panel"
    frame: Vec<DrawOp>,
    /// Remaining flash frames of a full refresh
    flash_frames: u32,
    /// Number of commits so far
    pub commits: u64,
}

impl Default for MacroquadDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroquadDisplay {
    /// Creates a display with a blank panel.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            frame: vec![DrawOp::Clear],
            flash_frames: 0,
            commits: 0,
        }
    }

    /// Window pixels per canvas pixel and the letterbox offset.
    fn layout(&self) -> (f32, f32, f32) {
        let scale = (screen_width() / SCREEN_WIDTH as f32)
            .min(screen_height() / SCREEN_HEIGHT as f32)
            .max(0.1);
        let offset_x = (screen_width() - SCREEN_WIDTH as f32 * scale) / 2.0;
        let offset_y = (screen_height() - SCREEN_HEIGHT as f32 * scale) / 2.0;
        (scale, offset_x, offset_y)
    }

    fn color(ink: Ink) -> Color {
        match ink {
            Ink::Black => BLACK,
            Ink::White => PAPER,
        }
    }

    /// Draws the panel image into the window. Call once per host frame.
    pub fn present(&mut self) {
        clear_background(DARKGRAY);
        let (scale, ox, oy) = self.layout();
        let panel_w = SCREEN_WIDTH as f32 * scale;
        let panel_h = SCREEN_HEIGHT as f32 * scale;

        if self.flash_frames > 0 {
            self.flash_frames -= 1;
            draw_rectangle(ox, oy, panel_w, panel_h, BLACK);
            return;
        }

        let px = |x: i32| ox + x as f32 * scale;
        let py = |y: i32| oy + y as f32 * scale;

        for op in &self.frame {
            match op {
                DrawOp::Clear => draw_rectangle(ox, oy, panel_w, panel_h, PAPER),
                DrawOp::FillRect { x, y, w, h, ink } => draw_rectangle(
                    px(*x),
                    py(*y),
                    *w as f32 * scale,
                    *h as f32 * scale,
                    Self::color(*ink),
                ),
                DrawOp::DrawRect { x, y, w, h, ink } => draw_rectangle_lines(
                    px(*x),
                    py(*y),
                    *w as f32 * scale,
                    *h as f32 * scale,
                    scale.max(1.0),
                    Self::color(*ink),
                ),
                DrawOp::Line {
                    x0,
                    y0,
                    x1,
                    y1,
                    ink,
                } => draw_line(
                    px(*x0),
                    py(*y0),
                    px(*x1),
                    py(*y1),
                    scale.max(1.0),
                    Self::color(*ink),
                ),
                DrawOp::Circle {
                    cx,
                    cy,
                    radius,
                    ink,
                } => draw_circle(px(*cx), py(*cy), *radius as f32 * scale, Self::color(*ink)),
                DrawOp::Text { x, y, text, font } => {
                    let size = Self::font_pixels(*font) * scale;
                    draw_text(text, px(*x), py(*y), size, BLACK);
                }
                DrawOp::Pixel { x, y, ink } => {
                    draw_rectangle(px(*x), py(*y), scale, scale, Self::color(*ink))
                }
            }
        }
    }

    fn font_pixels(font: FontSize) -> f32 {
        font.line_height() as f32 * 1.1
    }
}

impl Surface for MacroquadDisplay {
    fn clear(&mut self) {
        self.pending.clear();
        self.pending.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, ink: Ink) {
        self.pending.push(DrawOp::FillRect { x, y, w, h, ink });
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, ink: Ink) {
        self.pending.push(DrawOp::DrawRect { x, y, w, h, ink });
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, ink: Ink) {
        self.pending.push(DrawOp::Line { x0, y0, x1, y1, ink });
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, ink: Ink) {
        self.pending.push(DrawOp::Circle { cx, cy, radius, ink });
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, font: FontSize) {
        self.pending.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font,
        });
    }

    fn draw_pixel(&mut self, x: i32, y: i32, ink: Ink) {
        self.pending.push(DrawOp::Pixel { x, y, ink });
    }

    fn commit(&mut self, mode: RefreshMode) {
        self.frame = std::mem::take(&mut self.pending);
        self.commits += 1;
        if mode == RefreshMode::Full {
            self.flash_frames = FULL_REFRESH_FLASH_FRAMES;
        }
        debug!(
            "commit #{} ({:?}, {} ops)",
            self.commits,
            mode,
            self.frame.len()
        );
    }
}
