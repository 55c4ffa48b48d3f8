// src/renderer.rs
//! Rendering backend interface.
//!
//! The engine never rasterises anything itself. Components issue primitive draw calls
//! and text measurements through [`Renderer`]; a window backend implements it on top of
//! its GPU/2D library. [`RecordingRenderer`] is the headless implementation used by the
//! demo binary and the tests.

use std::collections::HashMap;

use glam::Vec2;

use crate::geometry::{Color, Rect};
use crate::{Error, Result};

/// Backend handle of a loaded font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

pub trait Renderer {
    fn draw_rectangle(&mut self, rect: Rect, color: Color);
    fn draw_rectangle_rounded(&mut self, rect: Rect, roundness: f32, segments: u32, color: Color);
    fn draw_rectangle_rounded_lines(
        &mut self,
        rect: Rect,
        roundness: f32,
        segments: u32,
        thickness: f32,
        color: Color,
    );
    fn draw_rectangle_lines(&mut self, rect: Rect, thickness: f32, color: Color);
    fn draw_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color);
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn draw_text(
        &mut self,
        font: FontId,
        text: &str,
        origin: Vec2,
        size: f32,
        spacing: f32,
        color: Color,
    );

    /// Pixel extent of `text`. Only meaningful while `font` is loaded.
    fn measure_text(&self, font: FontId, text: &str, size: f32, spacing: f32) -> Vec2;

    fn load_font(&mut self, path: &str) -> Result<FontId>;
    fn unload_font(&mut self, font: FontId);
}

// ============================================================================
// Headless backend
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Rectangle { rect: Rect, color: Color },
    RectangleRounded { rect: Rect, roundness: f32, segments: u32, color: Color },
    RectangleRoundedLines { rect: Rect, roundness: f32, thickness: f32, color: Color },
    RectangleLines { rect: Rect, thickness: f32, color: Color },
    Ellipse { center: Vec2, radii: Vec2, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    Text { font: FontId, text: String, origin: Vec2, size: f32, color: Color },
}

/// Records every draw call and measures text with a fixed per-glyph advance of
/// `size * advance_ratio` (+ letter spacing between glyphs).
#[derive(Debug)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
    pub advance_ratio: f32,
    fonts: HashMap<FontId, String>,
    missing: Vec<String>,
    next_font: u32,
    pub loads: usize,
    pub unloads: usize,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            advance_ratio: 0.5,
            fonts: HashMap::new(),
            missing: Vec::new(),
            next_font: 1,
            loads: 0,
            unloads: 0,
        }
    }
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `load_font(path)` fail from now on.
    pub fn mark_missing(&mut self, path: &str) {
        self.missing.push(path.to_owned());
    }

    pub fn is_loaded(&self, font: FontId) -> bool {
        self.fonts.contains_key(&font)
    }

    pub fn loaded_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn draw_rectangle(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::Rectangle { rect, color });
    }

    fn draw_rectangle_rounded(&mut self, rect: Rect, roundness: f32, segments: u32, color: Color) {
        self.calls.push(DrawCall::RectangleRounded { rect, roundness, segments, color });
    }

    fn draw_rectangle_rounded_lines(
        &mut self,
        rect: Rect,
        roundness: f32,
        _segments: u32,
        thickness: f32,
        color: Color,
    ) {
        self.calls.push(DrawCall::RectangleRoundedLines { rect, roundness, thickness, color });
    }

    fn draw_rectangle_lines(&mut self, rect: Rect, thickness: f32, color: Color) {
        self.calls.push(DrawCall::RectangleLines { rect, thickness, color });
    }

    fn draw_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        self.calls.push(DrawCall::Ellipse { center, radii, color });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.calls.push(DrawCall::Circle { center, radius, color });
    }

    fn draw_text(
        &mut self,
        font: FontId,
        text: &str,
        origin: Vec2,
        size: f32,
        _spacing: f32,
        color: Color,
    ) {
        self.calls.push(DrawCall::Text {
            font,
            text: text.to_owned(),
            origin,
            size,
            color,
        });
    }

    fn measure_text(&self, font: FontId, text: &str, size: f32, spacing: f32) -> Vec2 {
        if !self.fonts.contains_key(&font) {
            log::warn!("measuring with unloaded font {:?}", font);
            return Vec2::ZERO;
        }
        let glyphs = text.chars().count() as f32;
        let gaps = (glyphs - 1.0).max(0.0);
        Vec2::new(glyphs * size * self.advance_ratio + gaps * spacing, size)
    }

    fn load_font(&mut self, path: &str) -> Result<FontId> {
        if self.missing.iter().any(|m| m == path) {
            return Err(Error::Resource {
                path: path.to_owned(),
                reason: "file not found".into(),
            });
        }
        let id = FontId(self.next_font);
        self.next_font += 1;
        self.fonts.insert(id, path.to_owned());
        self.loads += 1;
        Ok(id)
    }

    fn unload_font(&mut self, font: FontId) {
        if self.fonts.remove(&font).is_some() {
            self.unloads += 1;
        }
    }
}
