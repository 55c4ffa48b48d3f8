//! Text component: live string, greedy word wrap and block alignment.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use glam::Vec2;
use parking_lot::RwLock;

use super::{Component, ComponentKind, LocalGeometry, Owner, Placement};
use crate::engine::FrameCtx;
use crate::geometry::Color;
use crate::gui::DebugUi;
use crate::item::Item;
use crate::renderer::Renderer;
use crate::resource_manager::{FontMaterial, FontScope, Material, SharedMaterial};
use crate::Result;

// ============================================================================
// RefObj
// ============================================================================

/// Shared mutable value. Cloning yields another handle to the same value, so game
/// logic can keep one and rewrite the text between frames (from any thread).
#[derive(Debug, Default)]
pub struct RefObj<T>(Arc<RwLock<T>>);

impl<T> Clone for RefObj<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> RefObj<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    pub fn set(&self, value: T) {
        *self.0.write() = value;
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.read())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.write())
    }
}

impl<T: Clone> RefObj<T> {
    pub fn get(&self) -> T {
        self.0.read().clone()
    }
}

impl From<&str> for RefObj<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_owned())
    }
}

impl From<String> for RefObj<String> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Left / top.
    #[default]
    Negative,
    Center,
    /// Right / bottom.
    Positive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextSettings {
    pub wrap: bool,
    pub align_x: TextAlign,
    pub align_y: TextAlign,
    pub letter_spacing: f32,
    pub line_spacing: f32,
}

impl TextSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn align_x(mut self, align: TextAlign) -> Self {
        self.align_x = align;
        self
    }

    pub fn align_y(mut self, align: TextAlign) -> Self {
        self.align_y = align;
        self
    }

    pub fn letter_spacing(mut self, spacing: f32) -> Self {
        self.letter_spacing = spacing;
        self
    }

    pub fn line_spacing(mut self, spacing: f32) -> Self {
        self.line_spacing = spacing;
        self
    }
}

// ============================================================================
// Wrapping
// ============================================================================

/// Greedy word wrap on single spaces.
///
/// A word is appended while `measure(line + word)` stays below `max_width`; otherwise
/// the line is closed and the word opens the next one. Every line keeps its trailing
/// space. A word wider than the box gets a line of its own.
pub fn wrap_greedy(
    text: &str,
    max_width: f32,
    mut measure: impl FnMut(&str) -> f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split(' ') {
        let provisional = format!("{line}{word}");
        if measure(&provisional) >= max_width {
            lines.push(std::mem::take(&mut line));
            line = format!("{word} ");
        } else {
            line = provisional + " ";
        }
    }
    lines.push(line);

    if lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    lines
}

fn align_offset(align: TextAlign, available: f32, used: f32) -> f32 {
    match align {
        TextAlign::Negative => 0.0,
        TextAlign::Center => (available - used) / 2.0,
        TextAlign::Positive => available - used,
    }
}

// ============================================================================
// Text
// ============================================================================

pub struct Text {
    text: RefObj<String>,
    font: Rc<RefCell<FontMaterial>>,
    pub font_size: f32,
    pub color: Color,
    pub settings: TextSettings,
    lines: Vec<String>,
    glyph: Vec2,
    newline_warned: bool,
    owner: Owner,
    placement: Option<Placement>,
    local: LocalGeometry,
}

impl Text {
    pub fn new(
        text: impl Into<RefObj<String>>,
        font: Rc<RefCell<FontMaterial>>,
        font_size: f32,
        color: Color,
    ) -> Self {
        Self {
            text: text.into(),
            font,
            font_size,
            color,
            settings: TextSettings::default(),
            lines: Vec::new(),
            glyph: Vec2::ZERO,
            newline_warned: false,
            owner: Owner::default(),
            placement: None,
            local: LocalGeometry::default(),
        }
    }

    pub fn with_settings(mut self, settings: TextSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_local(mut self, position: Vec2, size: Vec2) -> Self {
        self.local = LocalGeometry::with_offset(position, size);
        self
    }

    /// Another handle to the rendered string.
    pub fn text(&self) -> RefObj<String> {
        self.text.clone()
    }

    /// Lines laid out by the last `update`.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Extent of "A", measured at init.
    pub fn glyph_size(&self) -> Vec2 {
        self.glyph
    }

    #[inline]
    pub fn local(&self) -> &LocalGeometry {
        &self.local
    }

    #[inline]
    pub fn local_mut(&mut self) -> &mut LocalGeometry {
        &mut self.local
    }

    /// Runs `f` with the font resident, loading it for the call if nobody holds it.
    fn with_font<R>(
        &self,
        renderer: &mut dyn Renderer,
        f: impl FnOnce(&mut FontScope<'_>) -> R,
    ) -> Result<R> {
        let font = self.font.borrow();
        let mut scope = FontScope::acquire(&font, renderer)?;
        Ok(f(&mut scope))
    }

    fn block_height(&self) -> f32 {
        let n = self.lines.len() as f32;
        n * (self.glyph.y + self.settings.line_spacing) - self.settings.line_spacing
    }
}

impl Component for Text {
    fn type_name(&self) -> &'static str {
        "Text"
    }

    fn init(&mut self, item: &Item, ctx: &mut FrameCtx<'_>) {
        self.owner = Owner::bind(item, self.type_name());

        let (size, spacing) = (self.font_size, self.settings.letter_spacing);
        match self.with_font(&mut *ctx.renderer, |scope| scope.measure("A", size, spacing)) {
            Ok(glyph) => self.glyph = glyph,
            Err(err) => ctx.diagnostics.error(self.owner.label(), err.to_string()),
        }

        self.placement = Some(Placement::require(item, ctx, &self.owner));

        if self.settings.wrap && self.settings.align_x != TextAlign::Negative {
            ctx.diagnostics.warning(
                self.owner.label(),
                "X alignment changed while wrapping is on. Wrapped lines may overflow the box.",
            );
        }

        let material: SharedMaterial = self.font.clone();
        item.add_material(material);
        item.register_late_local_init(ComponentKind::Text);
    }

    fn late_local_init(&mut self, _ctx: &mut FrameCtx<'_>) {
        self.local.finalize();
    }

    fn update(&mut self, ctx: &mut FrameCtx<'_>) {
        let text = self.text.get();
        if !self.settings.wrap {
            self.lines = text.split('\n').map(str::to_owned).collect();
            return;
        }

        if text.contains('\n') && !self.newline_warned {
            ctx.diagnostics.warning(
                self.owner.label(),
                "'\\n' used with wrapping turned on. Lines may render incorrectly.",
            );
            self.newline_warned = true;
        }

        let Some(placement) = &self.placement else {
            return;
        };
        let available = placement.size().x + self.local.size().x - self.local.position().x;
        let (size, spacing) = (self.font_size, self.settings.letter_spacing);
        let wrapped = self.with_font(&mut *ctx.renderer, |scope| {
            wrap_greedy(&text, available, |s| scope.measure(s, size, spacing).x)
        });
        match wrapped {
            Ok(lines) => self.lines = lines,
            Err(err) => ctx.diagnostics.error(self.owner.label(), err.to_string()),
        }
    }

    fn draw(&mut self, ctx: &mut FrameCtx<'_>) {
        let Some(placement) = &self.placement else {
            return;
        };
        let rect = placement.rect(&self.local);
        let block_height = self.block_height();
        let settings = self.settings;
        let (size, color) = (self.font_size, self.color);
        let step = self.glyph.y + settings.line_spacing;
        let lines = &self.lines;

        let drawn = self.with_font(&mut *ctx.renderer, |scope| {
            let offset_x = if settings.align_x == TextAlign::Negative {
                0.0
            } else {
                let widest = lines
                    .iter()
                    .map(|l| scope.measure(l, size, settings.letter_spacing).x)
                    .fold(0.0, f32::max);
                align_offset(settings.align_x, rect.size.x, widest)
            };
            let offset_y = align_offset(settings.align_y, rect.size.y, block_height);

            let mut y = 0.0;
            for line in lines {
                let origin = rect.origin + Vec2::new(offset_x, y + offset_y);
                scope.draw_text(line, origin, size, settings.letter_spacing, color);
                y += step;
            }
        });
        if let Err(err) = drawn {
            ctx.diagnostics.error(self.owner.label(), err.to_string());
        }
    }

    fn debug_draw(&mut self, ctx: &mut FrameCtx<'_>) {
        if let Some(placement) = &self.placement {
            let rect = placement.rect(&self.local);
            ctx.renderer
                .draw_rectangle_lines(rect, 1.0, ctx.config.debug_text_color);
        }
    }

    fn debugger_info(&self, ui: &mut dyn DebugUi) {
        self.text.with(|t| ui.key_value("Text", t));
        ui.key_value("Font", self.font.borrow().path());
        ui.key_value("Font size", &format!("{:.1}", self.font_size));
        ui.key_value("Wrap", &self.settings.wrap.to_string());
        ui.key_value(
            "Align",
            &format!("{:?} / {:?}", self.settings.align_x, self.settings.align_y),
        );
        ui.key_value("Lines", &self.lines.len().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Position, Size};
    use crate::diagnostics::Severity;
    use crate::engine::testing::Harness;
    use crate::renderer::DrawCall;

    // Headless metrics: size 20 at ratio 0.5 gives 10px per glyph.
    fn text_item(
        text: &str,
        width: f32,
        settings: TextSettings,
    ) -> (Rc<Item>, Rc<RefCell<FontMaterial>>) {
        let font = FontMaterial::shared("fonts/mono.ttf");
        let item = Item::new("Label")
            .with(Position::new(0.0, 0.0))
            .with(Size::new(width, 100.0))
            .with(Text::new(text, font.clone(), 20.0, Color::WHITE).with_settings(settings));
        (item, font)
    }

    #[test]
    fn test_wrap_two_words_per_line() {
        let lines = wrap_greedy("aa bb cc", 65.0, |s| s.chars().count() as f32 * 10.0);
        assert_eq!(lines, vec!["aa bb ", "cc "]);
        for line in &lines {
            assert!(line.trim_end().chars().count() as f32 * 10.0 <= 65.0);
        }
    }

    #[test]
    fn test_wrap_long_first_word_drops_empty_line() {
        let lines = wrap_greedy("unbreakable x", 30.0, |s| s.chars().count() as f32 * 10.0);
        assert_eq!(lines, vec!["unbreakable ", "x "]);
    }

    #[test]
    fn test_no_wrap_splits_newlines() {
        let mut h = Harness::new();
        let (item, _) = text_item("first\nsecond", 65.0, TextSettings::new());
        item.init(&mut h.ctx()).unwrap();
        item.update(&mut h.ctx());

        let text = item.get::<Text>().unwrap();
        assert_eq!(text.borrow().lines(), ["first", "second"]);
    }

    #[test]
    fn test_wrap_through_component() {
        let mut h = Harness::new();
        let (item, font) = text_item("aa bb cc", 65.0, TextSettings::new().wrap(true));
        item.init(&mut h.ctx()).unwrap();
        item.update(&mut h.ctx());

        let text = item.get::<Text>().unwrap();
        assert_eq!(text.borrow().lines(), ["aa bb ", "cc "]);
        assert_eq!(text.borrow().glyph_size(), Vec2::new(10.0, 20.0));
        // measured with a scoped load; nothing stays resident
        assert!(!font.borrow().ready());
        assert_eq!(h.renderer.loaded_count(), 0);
    }

    #[test]
    fn test_live_text_is_picked_up() {
        let mut h = Harness::new();
        let (item, _) = text_item("one", 200.0, TextSettings::new());
        item.init(&mut h.ctx()).unwrap();

        let handle = item.get::<Text>().unwrap().borrow().text();
        handle.set("two\nthree".to_owned());
        item.update(&mut h.ctx());
        assert_eq!(item.get::<Text>().unwrap().borrow().lines().len(), 2);
    }

    #[test]
    fn test_newline_with_wrap_warns_once() {
        let mut h = Harness::new();
        let (item, _) = text_item("a\nb", 65.0, TextSettings::new().wrap(true));
        item.init(&mut h.ctx()).unwrap();
        item.update(&mut h.ctx());
        item.update(&mut h.ctx());
        assert_eq!(h.diagnostics.count(Severity::Warning), 1);
    }

    #[test]
    fn test_wrap_with_alignment_warns_at_init() {
        let mut h = Harness::new();
        let settings = TextSettings::new().wrap(true).align_x(TextAlign::Center);
        let (item, _) = text_item("hi", 65.0, settings);
        item.init(&mut h.ctx()).unwrap();
        assert_eq!(h.diagnostics.count(Severity::Warning), 1);
    }

    #[test]
    fn test_font_registered_and_loaded_on_enter() {
        let mut h = Harness::new();
        let (item, font) = text_item("hi", 65.0, TextSettings::new());
        item.init(&mut h.ctx()).unwrap();
        assert_eq!(item.material_count(), 1);

        item.enter(&mut h.ctx());
        assert!(font.borrow().ready());
        item.leave(&mut h.ctx());
        assert!(!font.borrow().ready());
    }

    #[test]
    fn test_centered_block_offsets() {
        let mut h = Harness::new();
        let settings = TextSettings::new()
            .align_x(TextAlign::Center)
            .align_y(TextAlign::Positive)
            .line_spacing(4.0);
        let (item, _) = text_item("ab\nabcd", 100.0, settings);
        item.init(&mut h.ctx()).unwrap();
        item.update(&mut h.ctx());
        item.draw(&mut h.ctx());

        // widest line 40px, block height 2 * (20 + 4) - 4 = 44
        let origins: Vec<Vec2> = h
            .renderer
            .take_calls()
            .into_iter()
            .filter_map(|c| match c {
                DrawCall::Text { origin, .. } => Some(origin),
                _ => None,
            })
            .collect();
        assert_eq!(origins, vec![Vec2::new(30.0, 56.0), Vec2::new(30.0, 80.0)]);
    }

    #[test]
    fn test_ref_obj_handles_share_value() {
        let a: RefObj<String> = "x".into();
        let b = a.clone();
        b.set("y".to_owned());
        assert_eq!(a.get(), "y");
        a.update(|s| s.push('z'));
        assert_eq!(b.with(|s| s.len()), 2);
    }
}
