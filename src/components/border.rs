//! Outline of a rounded figure.
//!
//! A border only draws on a `Rounded` figure. [`Border::junk`] builds the zero-thickness
//! placeholder handed out when no real border applies; it is never initialised or drawn.

use glam::Vec2;

use super::{require_figure, Component, Figure, LocalGeometry, Owner, Placement, Shared};
use crate::engine::FrameCtx;
use crate::geometry::Color;
use crate::gui::DebugUi;
use crate::item::Item;

#[derive(Clone)]
pub struct Border {
    pub thickness: f32,
    pub color: Color,
    junk: bool,
    owner: Owner,
    placement: Option<Placement>,
    figure: Option<Shared<Figure>>,
    local: LocalGeometry,
}

impl Default for Border {
    fn default() -> Self {
        Self::new(1.0, Color::BLACK)
    }
}

impl Border {
    pub fn new(thickness: f32, color: Color) -> Self {
        Self {
            thickness: thickness.max(0.0),
            color,
            junk: false,
            owner: Owner::default(),
            placement: None,
            figure: None,
            local: LocalGeometry::default(),
        }
    }

    pub fn junk() -> Self {
        Self {
            thickness: 0.0,
            junk: true,
            ..Self::new(0.0, Color::TRANSPARENT)
        }
    }

    /// Local offset, applied once the item finishes initialising.
    pub fn with_local(mut self, position: Vec2, size: Vec2) -> Self {
        self.local = LocalGeometry::with_offset(position, size);
        self
    }

    #[inline]
    pub fn is_junk(&self) -> bool {
        self.junk
    }

    #[inline]
    pub fn local(&self) -> &LocalGeometry {
        &self.local
    }

    #[inline]
    pub fn local_mut(&mut self) -> &mut LocalGeometry {
        &mut self.local
    }

    fn drawable(&self) -> Option<(&Placement, Figure)> {
        if self.junk {
            return None;
        }
        let figure = *self.figure.as_ref()?.borrow();
        figure.is_rounded().then_some((self.placement.as_ref()?, figure))
    }
}

impl Component for Border {
    fn type_name(&self) -> &'static str {
        "Border"
    }

    fn init(&mut self, item: &Item, ctx: &mut FrameCtx<'_>) {
        if self.junk {
            return;
        }
        self.owner = Owner::bind(item, self.type_name());
        self.placement = Some(Placement::require(item, ctx, &self.owner));
        let figure = require_figure(item, ctx, &self.owner);
        if !figure.borrow().is_rounded() {
            ctx.diagnostics.warning(
                self.owner.label(),
                "Border is only drawn around rounded figures. It will be ignored.",
            );
        }
        self.figure = Some(figure);
        item.register_late_local_init(super::ComponentKind::Border);
    }

    fn late_local_init(&mut self, _ctx: &mut FrameCtx<'_>) {
        self.local.finalize();
    }

    fn draw(&mut self, ctx: &mut FrameCtx<'_>) {
        let Some((placement, figure)) = self.drawable() else {
            return;
        };
        let rect = placement.rect(&self.local).expand(self.thickness);
        ctx.renderer.draw_rectangle_rounded_lines(
            rect,
            figure.roundness,
            ctx.config.rounded_segments,
            self.thickness,
            self.color,
        );
    }

    fn debugger_info(&self, ui: &mut dyn DebugUi) {
        if self.junk {
            ui.text("Junk border");
            return;
        }
        ui.key_value("Thickness", &format!("{:.1}", self.thickness));
        ui.key_value("Color", &format!("{:?}", self.color));
        ui.key_value("Local position", &format!("{:?}", self.local.position()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Position, Size};
    use crate::diagnostics::Severity;
    use crate::engine::testing::Harness;
    use crate::geometry::Rect;
    use crate::renderer::DrawCall;

    #[test]
    fn test_draws_outside_rounded_box() {
        let mut h = Harness::new();
        let item = Item::new("Button")
            .with(Position::new(10.0, 10.0))
            .with(Size::new(50.0, 20.0))
            .with(Figure::rounded(0.5))
            .with(Border::new(2.0, Color::BLUE));
        item.init(&mut h.ctx()).unwrap();
        item.draw(&mut h.ctx());

        assert_eq!(
            h.renderer.take_calls(),
            vec![DrawCall::RectangleRoundedLines {
                rect: Rect::new(Vec2::new(8.0, 8.0), Vec2::new(54.0, 24.0)),
                roundness: 0.5,
                thickness: 2.0,
                color: Color::BLUE,
            }]
        );
    }

    #[test]
    fn test_ignored_on_plain_rectangle() {
        let mut h = Harness::new();
        let item = Item::new("Panel")
            .with(Position::new(0.0, 0.0))
            .with(Size::new(50.0, 20.0))
            .with(Figure::rectangle())
            .with(Border::new(2.0, Color::BLUE));
        item.init(&mut h.ctx()).unwrap();
        item.draw(&mut h.ctx());

        assert!(h.renderer.calls.is_empty());
        assert_eq!(h.diagnostics.count(Severity::Warning), 1);
    }

    #[test]
    fn test_junk_border() {
        let junk = Border::junk();
        assert!(junk.is_junk());
        assert_eq!(junk.thickness, 0.0);
    }
}
