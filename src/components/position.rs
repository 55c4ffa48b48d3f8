//! Absolute position of an item.

use glam::Vec2;

use super::Component;
use crate::gui::DebugUi;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub value: Vec2,
}

impl Position {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { value: Vec2::new(x, y) }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.value.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.value.y
    }

    #[inline]
    pub fn vec2(&self) -> Vec2 {
        self.value
    }

    pub fn set(&mut self, x: f32, y: f32) {
        self.value = Vec2::new(x, y);
    }

    pub fn add(&mut self, delta: Vec2) {
        self.value += delta;
    }
}

impl From<Vec2> for Position {
    fn from(value: Vec2) -> Self {
        Self { value }
    }
}

impl Component for Position {
    fn type_name(&self) -> &'static str {
        "Position"
    }

    fn debugger_info(&self, ui: &mut dyn DebugUi) {
        ui.key_value("Position", &format!("{:.1}, {:.1}", self.value.x, self.value.y));
    }
}
