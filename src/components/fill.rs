//! Solid fill of an item's figure.

use glam::Vec2;

use super::{
    require_figure, Component, ComponentKind, Figure, FigureKind, LocalGeometry, Owner, Placement,
    Shared,
};
use crate::engine::FrameCtx;
use crate::geometry::Color;
use crate::gui::DebugUi;
use crate::item::Item;

#[derive(Clone)]
pub struct Fill {
    pub color: Color,
    owner: Owner,
    placement: Option<Placement>,
    figure: Option<Shared<Figure>>,
    local: LocalGeometry,
}

impl Default for Fill {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

impl Fill {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            owner: Owner::default(),
            placement: None,
            figure: None,
            local: LocalGeometry::default(),
        }
    }

    pub fn with_local(mut self, position: Vec2, size: Vec2) -> Self {
        self.local = LocalGeometry::with_offset(position, size);
        self
    }

    #[inline]
    pub fn local(&self) -> &LocalGeometry {
        &self.local
    }

    #[inline]
    pub fn local_mut(&mut self) -> &mut LocalGeometry {
        &mut self.local
    }
}

impl Component for Fill {
    fn type_name(&self) -> &'static str {
        "Fill"
    }

    fn init(&mut self, item: &Item, ctx: &mut FrameCtx<'_>) {
        self.owner = Owner::bind(item, self.type_name());
        self.placement = Some(Placement::require(item, ctx, &self.owner));
        self.figure = Some(require_figure(item, ctx, &self.owner));
        item.register_late_local_init(ComponentKind::Fill);
    }

    fn late_local_init(&mut self, _ctx: &mut FrameCtx<'_>) {
        self.local.finalize();
    }

    fn draw(&mut self, ctx: &mut FrameCtx<'_>) {
        let (Some(placement), Some(figure)) = (&self.placement, &self.figure) else {
            return;
        };
        let figure = *figure.borrow();
        let rect = placement.rect(&self.local);
        match figure.kind {
            FigureKind::Rectangle => ctx.renderer.draw_rectangle(rect, self.color),
            FigureKind::Rounded => ctx.renderer.draw_rectangle_rounded(
                rect,
                figure.roundness,
                ctx.config.rounded_segments,
                self.color,
            ),
            FigureKind::Circle => ctx.renderer.draw_ellipse(rect.center(), rect.size, self.color),
        }
    }

    fn debug_draw(&mut self, ctx: &mut FrameCtx<'_>) {
        if let Some(placement) = &self.placement {
            let rect = placement.rect(&self.local);
            ctx.renderer
                .draw_rectangle_lines(rect, 1.0, ctx.config.debug_fill_color);
        }
    }

    fn debugger_info(&self, ui: &mut dyn DebugUi) {
        ui.key_value("Color", &format!("{:?}", self.color));
        ui.key_value("Local position", &format!("{:?}", self.local.position()));
        ui.key_value("Local size", &format!("{:?}", self.local.size()));
    }
}
