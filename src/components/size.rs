//! Absolute size of an item.

use glam::Vec2;

use super::{Component, Owner};
use crate::engine::FrameCtx;
use crate::gui::DebugUi;
use crate::item::Item;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub value: Vec2,
    /// Created without dimensions: takes the configured default size in `init`.
    unset: bool,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            value: Vec2::ZERO,
            unset: true,
        }
    }
}

impl Size {
    #[inline]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            value: Vec2::new(width, height),
            unset: false,
        }
    }

    #[inline]
    pub fn square(side: f32) -> Self {
        Self::new(side, side)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.value.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.value.y
    }

    #[inline]
    pub fn vec2(&self) -> Vec2 {
        self.value
    }

    pub fn set(&mut self, width: f32, height: f32) {
        self.value = Vec2::new(width, height);
        self.unset = false;
    }

    pub fn add(&mut self, delta: Vec2) {
        self.value += delta;
    }
}

impl Component for Size {
    fn type_name(&self) -> &'static str {
        "Size"
    }

    fn init(&mut self, item: &Item, ctx: &mut FrameCtx<'_>) {
        if !self.unset {
            return;
        }
        let [w, h] = ctx.config.default_size;
        self.set(w, h);
        let owner = Owner::bind(item, self.type_name());
        ctx.diagnostics.information(
            owner.label(),
            format!("No dimensions given. Using default size {w}x{h}."),
        );
    }

    fn debugger_info(&self, ui: &mut dyn DebugUi) {
        ui.key_value("Size", &format!("{:.1} x {:.1}", self.value.x, self.value.y));
    }
}
