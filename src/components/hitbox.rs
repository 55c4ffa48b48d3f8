//! Mouse hitbox: per-button press/click/release/down/hold/drag flags plus hover.
//!
//! Flags are recomputed every `update` from the input snapshot and the current
//! geometry. `drag` latches on a click inside the shape and holds until the button goes
//! up, wherever the cursor is.

use glam::Vec2;

use super::{
    require_figure, Border, Component, ComponentKind, Figure, FigureKind, LocalGeometry, Owner,
    Placement, Shared,
};
use crate::engine::FrameCtx;
use crate::geometry::{circle_contains, Color, Rect};
use crate::gui::DebugUi;
use crate::input_system::{InputSource, MouseButton};
use crate::item::Item;

/// State of one mouse button relative to a hitbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonFlags {
    /// Went down this frame, anywhere.
    pub press: bool,
    /// Went down this frame over the hitbox.
    pub click: bool,
    /// Went up this frame.
    pub release: bool,
    /// Held, anywhere.
    pub down: bool,
    /// Held over the hitbox.
    pub hold: bool,
    /// Held since a click on the hitbox.
    pub drag: bool,
}

impl ButtonFlags {
    fn sample(&mut self, input: &dyn InputSource, button: MouseButton, hover: bool) {
        self.press = input.is_button_pressed(button);
        self.click = self.press && hover;
        self.release = input.is_button_released(button);
        self.down = input.is_button_down(button);
        self.hold = self.down && hover;
        if !self.drag && self.click {
            self.drag = true;
        }
        if self.drag && !self.down {
            self.drag = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum HitArea {
    Box(Rect),
    Circle { center: Vec2, radius: f32 },
}

impl HitArea {
    fn contains(&self, point: Vec2) -> bool {
        match *self {
            HitArea::Box(rect) => rect.contains(point),
            HitArea::Circle { center, radius } => circle_contains(center, radius, point),
        }
    }
}

#[derive(Clone, Default)]
pub struct MouseHitbox {
    hover: bool,
    buttons: [ButtonFlags; 3],
    debug_color: Option<Color>,
    owner: Owner,
    placement: Option<Placement>,
    figure: Option<Shared<Figure>>,
    border: Option<Shared<Border>>,
    local: LocalGeometry,
}

impl MouseHitbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the configured debug colour.
    pub fn with_debug_color(mut self, color: Color) -> Self {
        self.debug_color = Some(color);
        self
    }

    pub fn with_local(mut self, position: Vec2, size: Vec2) -> Self {
        self.local = LocalGeometry::with_offset(position, size);
        self
    }

    #[inline]
    pub fn hover(&self) -> bool {
        self.hover
    }

    #[inline]
    pub fn button(&self, button: MouseButton) -> ButtonFlags {
        self.buttons[button.index()]
    }

    pub fn press(&self, button: MouseButton) -> bool {
        self.button(button).press
    }

    pub fn click(&self, button: MouseButton) -> bool {
        self.button(button).click
    }

    pub fn release(&self, button: MouseButton) -> bool {
        self.button(button).release
    }

    pub fn down(&self, button: MouseButton) -> bool {
        self.button(button).down
    }

    pub fn hold(&self, button: MouseButton) -> bool {
        self.button(button).hold
    }

    pub fn drag(&self, button: MouseButton) -> bool {
        self.button(button).drag
    }

    /// Circle on a non-square Size: the width is used on both axes. Follows the
    /// current Size, so a later resize to a square clears it.
    pub fn is_stretched(&self) -> bool {
        let is_circle = self
            .figure
            .as_ref()
            .is_some_and(|f| f.borrow().kind == FigureKind::Circle);
        let size = self.placement.as_ref().map_or(Vec2::ZERO, Placement::size);
        is_circle && size.x != size.y
    }

    #[inline]
    pub fn local(&self) -> &LocalGeometry {
        &self.local
    }

    #[inline]
    pub fn local_mut(&mut self) -> &mut LocalGeometry {
        &mut self.local
    }

    fn reset(&mut self) {
        self.hover = false;
        self.buttons = [ButtonFlags::default(); 3];
    }

    fn area(&self) -> Option<HitArea> {
        let placement = self.placement.as_ref()?;
        let figure = self.figure.as_ref()?.borrow().kind;
        let mut rect = placement.rect(&self.local);
        if self.is_stretched() {
            rect.size.y = rect.size.x;
        }
        Some(match figure {
            FigureKind::Rectangle => HitArea::Box(rect),
            FigureKind::Rounded => {
                let thickness = self.border.as_ref().map_or(0.0, |b| b.borrow().thickness);
                HitArea::Box(rect.expand(thickness))
            }
            FigureKind::Circle => HitArea::Circle {
                center: rect.center(),
                radius: rect.size.x.max(rect.size.y),
            },
        })
    }

    fn probe_border(
        &self,
        item: &Item,
        figure: &Figure,
        ctx: &mut FrameCtx<'_>,
    ) -> Shared<Border> {
        let junk = || super::shared(Border::junk());
        match item.get::<Border>() {
            Some(border) if figure.is_rounded() => border,
            _ if !figure.is_rounded() => {
                ctx.diagnostics.information(
                    self.owner.label(),
                    "Figure is not rounded. Using junk border.",
                );
                junk()
            }
            _ => {
                ctx.diagnostics.warning(
                    self.owner.label(),
                    "Item has no border component. Initialising junk border.",
                );
                junk()
            }
        }
    }
}

impl Component for MouseHitbox {
    fn type_name(&self) -> &'static str {
        "MouseHitbox"
    }

    fn init(&mut self, item: &Item, ctx: &mut FrameCtx<'_>) {
        self.owner = Owner::bind(item, self.type_name());
        self.placement = Some(Placement::require(item, ctx, &self.owner));
        let figure = require_figure(item, ctx, &self.owner);
        let snapshot = *figure.borrow();
        self.border = Some(self.probe_border(item, &snapshot, ctx));
        self.figure = Some(figure);
        item.register_late_local_init(ComponentKind::Hitbox);

        if snapshot.is_rounded() {
            ctx.diagnostics.warning(
                self.owner.label(),
                "Hitbox on rounded figure works the same as rectangle ones. \
                 Be careful with corners!",
            );
        }
    }

    fn late_local_init(&mut self, ctx: &mut FrameCtx<'_>) {
        self.local.finalize();

        if self.is_stretched() {
            ctx.diagnostics.error(
                self.owner.label(),
                "Item's size is not square. Hitbox is now stretched to circle. Be careful!",
            );
        }
    }

    fn enter(&mut self, _ctx: &mut FrameCtx<'_>) {
        self.reset();
    }

    fn update(&mut self, ctx: &mut FrameCtx<'_>) {
        if ctx.debug.captures_input() {
            self.reset();
            return;
        }
        let Some(area) = self.area() else {
            return;
        };
        self.hover = area.contains(ctx.input.mouse_position());
        for button in MouseButton::ALL {
            self.buttons[button.index()].sample(ctx.input, button, self.hover);
        }
    }

    fn debug_draw(&mut self, ctx: &mut FrameCtx<'_>) {
        let color = self.debug_color.unwrap_or(ctx.config.debug_hitbox_color);
        match self.area() {
            Some(HitArea::Box(rect)) => ctx.renderer.draw_rectangle(rect, color),
            Some(HitArea::Circle { center, radius }) => {
                ctx.renderer.draw_circle(center, radius, color)
            }
            None => {}
        }
    }

    fn debugger_info(&self, ui: &mut dyn DebugUi) {
        ui.key_value("Hover", &self.hover.to_string());
        for button in MouseButton::ALL {
            let flags = self.button(button);
            ui.key_value(
                &format!("{:?}", button),
                &format!(
                    "press={} click={} release={} down={} hold={} drag={}",
                    flags.press, flags.click, flags.release, flags.down, flags.hold, flags.drag
                ),
            );
        }
        ui.separator();
        match &self.border {
            Some(border) if !border.borrow().is_junk() => {
                ui.key_value("Border", &format!("{:.1}", border.borrow().thickness))
            }
            _ => ui.key_value("Border", "junk"),
        }
        if self.is_stretched() {
            ui.text("Stretched to circle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Position, Size};
    use crate::diagnostics::Severity;
    use crate::engine::testing::Harness;
    use crate::input_system::ButtonAction;
    use crate::renderer::DrawCall;
    use std::rc::Rc;

    fn hitbox_item(figure: Figure, size: Size) -> Rc<Item> {
        Item::new("Target")
            .with(Position::new(0.0, 0.0))
            .with(size)
            .with(figure)
            .with(MouseHitbox::new())
    }

    fn step(h: &mut Harness, item: &Item) -> MouseHitbox {
        h.input.update();
        item.update(&mut h.ctx());
        let hitbox = item.get::<MouseHitbox>().unwrap();
        let snapshot = hitbox.borrow().clone();
        snapshot
    }

    #[test]
    fn test_rectangle_hover_and_click() {
        let mut h = Harness::new();
        let item = hitbox_item(Figure::rectangle(), Size::new(10.0, 10.0));
        item.init(&mut h.ctx()).unwrap();

        h.input.raw_pointer_move(5.0, 5.0);
        h.input.raw_mouse_event(MouseButton::Left, ButtonAction::Pressed);
        let hb = step(&mut h, &item);
        assert!(hb.hover());
        assert!(hb.press(MouseButton::Left) && hb.click(MouseButton::Left));
        assert!(hb.down(MouseButton::Left) && hb.hold(MouseButton::Left));
        assert!(!hb.click(MouseButton::Right));

        h.input.raw_pointer_move(50.0, 50.0);
        let hb = step(&mut h, &item);
        assert!(!hb.hover());
        assert!(!hb.press(MouseButton::Left));
        assert!(hb.down(MouseButton::Left) && !hb.hold(MouseButton::Left));
    }

    #[test]
    fn test_press_outside_is_not_click() {
        let mut h = Harness::new();
        let item = hitbox_item(Figure::rectangle(), Size::new(10.0, 10.0));
        item.init(&mut h.ctx()).unwrap();

        h.input.raw_pointer_move(50.0, 50.0);
        h.input.raw_mouse_event(MouseButton::Right, ButtonAction::Pressed);
        let hb = step(&mut h, &item);
        assert!(hb.press(MouseButton::Right));
        assert!(!hb.click(MouseButton::Right));
        assert!(!hb.drag(MouseButton::Right));
    }

    #[test]
    fn test_drag_survives_leaving_until_release() {
        let mut h = Harness::new();
        let item = hitbox_item(Figure::rectangle(), Size::new(10.0, 10.0));
        item.init(&mut h.ctx()).unwrap();

        h.input.raw_pointer_move(2.0, 2.0);
        h.input.raw_mouse_event(MouseButton::Left, ButtonAction::Pressed);
        assert!(step(&mut h, &item).drag(MouseButton::Left));

        h.input.raw_pointer_move(300.0, 300.0);
        let hb = step(&mut h, &item);
        assert!(!hb.hover());
        assert!(hb.drag(MouseButton::Left));

        h.input.raw_mouse_event(MouseButton::Left, ButtonAction::Released);
        let hb = step(&mut h, &item);
        assert!(hb.release(MouseButton::Left));
        assert!(!hb.drag(MouseButton::Left));
    }

    #[test]
    fn test_enter_resets_flags() {
        let mut h = Harness::new();
        let item = hitbox_item(Figure::rectangle(), Size::new(10.0, 10.0));
        item.init(&mut h.ctx()).unwrap();

        h.input.raw_pointer_move(2.0, 2.0);
        h.input.raw_mouse_event(MouseButton::Middle, ButtonAction::Pressed);
        assert!(step(&mut h, &item).drag(MouseButton::Middle));

        item.enter(&mut h.ctx());
        let hitbox = item.get::<MouseHitbox>().unwrap();
        let hb = hitbox.borrow();
        assert!(!hb.hover());
        for button in MouseButton::ALL {
            assert_eq!(hb.button(button), ButtonFlags::default());
        }
    }

    #[test]
    fn test_debug_overlay_swallows_input() {
        let mut h = Harness::new();
        let item = hitbox_item(Figure::rectangle(), Size::new(10.0, 10.0));
        item.init(&mut h.ctx()).unwrap();
        h.debug.turned_on = true;
        h.debug.overlay_showing = true;

        h.input.raw_pointer_move(2.0, 2.0);
        h.input.raw_mouse_event(MouseButton::Left, ButtonAction::Pressed);
        let hb = step(&mut h, &item);
        assert!(!hb.hover());
        assert!(!hb.click(MouseButton::Left));
    }

    #[test]
    fn test_circle_hit_test() {
        let mut h = Harness::new();
        let item = hitbox_item(Figure::circle(), Size::new(10.0, 10.0));
        item.init(&mut h.ctx()).unwrap();

        h.input.raw_pointer_move(5.0, 5.0);
        assert!(step(&mut h, &item).hover());
        h.input.raw_pointer_move(20.0, 20.0);
        assert!(!step(&mut h, &item).hover());
    }

    #[test]
    fn test_non_square_circle_is_stretched() {
        let mut h = Harness::new();
        let item = hitbox_item(Figure::circle(), Size::new(10.0, 40.0));
        item.init(&mut h.ctx()).unwrap();

        assert_eq!(h.diagnostics.count(Severity::Error), 1);
        let hitbox = item.get::<MouseHitbox>().unwrap();
        assert!(hitbox.borrow().is_stretched());
        assert_eq!(
            hitbox.borrow().area(),
            Some(HitArea::Circle { center: Vec2::new(5.0, 5.0), radius: 10.0 })
        );
    }

    #[test]
    fn test_stretch_follows_resize() {
        let mut h = Harness::new();
        let item = hitbox_item(Figure::circle(), Size::new(10.0, 40.0));
        item.init(&mut h.ctx()).unwrap();
        let hitbox = item.get::<MouseHitbox>().unwrap();
        assert!(hitbox.borrow().is_stretched());

        item.get::<Size>().unwrap().borrow_mut().set(40.0, 40.0);
        assert!(!hitbox.borrow().is_stretched());
        assert_eq!(
            hitbox.borrow().area(),
            Some(HitArea::Circle { center: Vec2::splat(20.0), radius: 40.0 })
        );
        assert_eq!(h.diagnostics.count(Severity::Error), 1);
    }

    #[test]
    fn test_local_offsets_move_the_box() {
        let mut h = Harness::new();
        let item = Item::new("Offset")
            .with(Position::new(0.0, 0.0))
            .with(Size::new(10.0, 10.0))
            .with(Figure::rectangle())
            .with(MouseHitbox::new().with_local(Vec2::new(20.0, 0.0), Vec2::new(5.0, 0.0)));
        item.init(&mut h.ctx()).unwrap();

        // box is (20,0)..(35,10)
        h.input.raw_pointer_move(32.0, 5.0);
        assert!(step(&mut h, &item).hover());
        h.input.raw_pointer_move(5.0, 5.0);
        assert!(!step(&mut h, &item).hover());
    }

    #[test]
    fn test_border_expands_offset_box() {
        let mut h = Harness::new();
        let item = Item::new("Offset")
            .with(Position::new(0.0, 0.0))
            .with(Size::new(10.0, 10.0))
            .with(Figure::rounded(0.2))
            .with(Border::new(2.0, Color::BLACK))
            .with(MouseHitbox::new().with_local(Vec2::new(20.0, 20.0), Vec2::ZERO));
        item.init(&mut h.ctx()).unwrap();

        // (20,20)..(30,30) grown by 2 on every side
        h.input.raw_pointer_move(18.5, 18.5);
        assert!(step(&mut h, &item).hover());
        h.input.raw_pointer_move(31.0, 31.0);
        assert!(step(&mut h, &item).hover());
        h.input.raw_pointer_move(17.0, 25.0);
        assert!(!step(&mut h, &item).hover());
    }

    #[test]
    fn test_stretched_circle_uses_local_width() {
        let mut h = Harness::new();
        let item = Item::new("Wide")
            .with(Position::new(0.0, 0.0))
            .with(Size::new(10.0, 40.0))
            .with(Figure::circle())
            .with(MouseHitbox::new().with_local(Vec2::ZERO, Vec2::new(6.0, 0.0)));
        item.init(&mut h.ctx()).unwrap();

        let hitbox = item.get::<MouseHitbox>().unwrap();
        assert!(hitbox.borrow().is_stretched());
        // diameter 10 + 6 on both axes
        assert_eq!(
            hitbox.borrow().area(),
            Some(HitArea::Circle { center: Vec2::splat(8.0), radius: 16.0 })
        );
        h.input.raw_pointer_move(20.0, 8.0);
        assert!(step(&mut h, &item).hover());
        h.input.raw_pointer_move(8.0, 26.0);
        assert!(!step(&mut h, &item).hover());
    }

    #[test]
    fn test_rounded_border_probe() {
        let mut h = Harness::new();
        let bordered = hitbox_item(Figure::rounded(0.4), Size::new(10.0, 10.0))
            .with(Border::new(3.0, Color::BLACK));
        bordered.init(&mut h.ctx()).unwrap();
        // rounded-figure caveat only
        assert_eq!(h.diagnostics.count(Severity::Warning), 1);

        h.input.raw_pointer_move(-2.0, -2.0);
        assert!(step(&mut h, &bordered).hover(), "border widens the hit box");

        let mut h = Harness::new();
        let bare = hitbox_item(Figure::rounded(0.4), Size::new(10.0, 10.0));
        bare.init(&mut h.ctx()).unwrap();
        assert_eq!(h.diagnostics.count(Severity::Warning), 2);
    }

    #[test]
    fn test_plain_figure_gets_junk_border_quietly() {
        let mut h = Harness::new();
        let item = hitbox_item(Figure::rectangle(), Size::new(10.0, 10.0))
            .with(Border::new(3.0, Color::BLACK));
        item.init(&mut h.ctx()).unwrap();

        assert_eq!(h.diagnostics.count(Severity::Information), 1);
        let hitbox = item.get::<MouseHitbox>().unwrap();
        assert!(hitbox.borrow().border.as_ref().unwrap().borrow().is_junk());
    }

    #[test]
    fn test_debug_draw_uses_configured_colour() {
        let mut h = Harness::new();
        let item = hitbox_item(Figure::rectangle(), Size::new(10.0, 10.0));
        item.init(&mut h.ctx()).unwrap();
        item.debug_draw(&mut h.ctx());

        assert_eq!(
            h.renderer.take_calls(),
            vec![DrawCall::Rectangle {
                rect: Rect::new(Vec2::ZERO, Vec2::splat(10.0)),
                color: h.config.debug_hitbox_color,
            }]
        );
    }
}
