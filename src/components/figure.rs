//! Shape of an item. Drives both drawing and hit testing.

use super::Component;
use crate::gui::DebugUi;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FigureKind {
    #[default]
    Rectangle,
    Rounded,
    Circle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Figure {
    pub kind: FigureKind,
    /// Corner roundness in `0.0..=1.0`, only used by `Rounded`.
    pub roundness: f32,
}

impl Figure {
    pub fn new(kind: FigureKind, roundness: f32) -> Self {
        Self {
            kind,
            roundness: roundness.clamp(0.0, 1.0),
        }
    }

    pub fn rectangle() -> Self {
        Self::new(FigureKind::Rectangle, 0.0)
    }

    pub fn rounded(roundness: f32) -> Self {
        Self::new(FigureKind::Rounded, roundness)
    }

    pub fn circle() -> Self {
        Self::new(FigureKind::Circle, 0.0)
    }

    #[inline]
    pub fn is_rounded(&self) -> bool {
        self.kind == FigureKind::Rounded
    }
}

impl Component for Figure {
    fn type_name(&self) -> &'static str {
        "Figure"
    }

    fn debugger_info(&self, ui: &mut dyn DebugUi) {
        ui.key_value("Figure", &format!("{:?}", self.kind));
        if self.is_rounded() {
            ui.key_value("Roundness", &format!("{:.2}", self.roundness));
        }
    }
}
