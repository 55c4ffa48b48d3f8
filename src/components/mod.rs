//! Core component system root.
//!
//! A component is a unit of behaviour/data attached to exactly one [`Item`]. Built-in
//! kinds form a closed set (`ComponentKind`), each stored in its own `ComponentSlot`
//! variant, so sibling lookup is a typed match instead of a runtime downcast. User
//! behaviours register under `ComponentKind::Custom(name)`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use glam::Vec2;

use crate::engine::FrameCtx;
use crate::geometry::Rect;
use crate::gui::DebugUi;
use crate::item::Item;
use crate::{Error, Result};

// Submodules
pub mod border;
pub mod figure;
pub mod fill;
pub mod hitbox;
pub mod position;
pub mod size;
pub mod text;

// Re-exports
pub use border::Border;
pub use figure::{Figure, FigureKind};
pub use fill::Fill;
pub use hitbox::{ButtonFlags, MouseHitbox};
pub use position::Position;
pub use size::Size;
pub use text::{wrap_greedy, RefObj, Text, TextAlign, TextSettings};

pub type Shared<T> = Rc<RefCell<T>>;

#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Lifecycle capability set. Every hook defaults to a no-op.
pub trait Component: 'static {
    fn type_name(&self) -> &'static str;

    /// Phase 1: resolve siblings. Runs at most once per instance (the registry guards it).
    fn init(&mut self, _item: &Item, _ctx: &mut FrameCtx<'_>) {}

    /// Phase 2: runs once after every sibling finished phase 1, if the component
    /// queued itself with [`Item::register_late_local_init`].
    fn late_local_init(&mut self, _ctx: &mut FrameCtx<'_>) {}

    fn enter(&mut self, _ctx: &mut FrameCtx<'_>) {}
    fn leave(&mut self, _ctx: &mut FrameCtx<'_>) {}
    fn early_update(&mut self, _ctx: &mut FrameCtx<'_>) {}
    fn update(&mut self, _ctx: &mut FrameCtx<'_>) {}
    fn late_update(&mut self, _ctx: &mut FrameCtx<'_>) {}
    fn draw(&mut self, _ctx: &mut FrameCtx<'_>) {}
    fn debug_draw(&mut self, _ctx: &mut FrameCtx<'_>) {}

    fn debugger_info(&self, _ui: &mut dyn DebugUi) {}
}

/// Built-in component types know their kind and their slot.
pub trait Kind: Component + Sized {
    const KIND: ComponentKind;

    fn into_slot(this: Shared<Self>) -> ComponentSlot;
    fn from_slot(slot: &ComponentSlot) -> Option<Shared<Self>>;
}

macro_rules! component_slots {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ComponentKind {
            $($variant,)*
            Custom(&'static str),
        }

        #[derive(Clone)]
        pub enum ComponentSlot {
            $($variant(Shared<$ty>),)*
            Custom(&'static str, Shared<dyn Component>),
        }

        impl ComponentSlot {
            pub fn kind(&self) -> ComponentKind {
                match self {
                    $(ComponentSlot::$variant(_) => ComponentKind::$variant,)*
                    ComponentSlot::Custom(name, _) => ComponentKind::Custom(name),
                }
            }

            pub fn as_dyn(&self) -> Shared<dyn Component> {
                match self {
                    $(ComponentSlot::$variant(c) => c.clone() as Shared<dyn Component>,)*
                    ComponentSlot::Custom(_, c) => c.clone(),
                }
            }
        }

        $(
            impl Kind for $ty {
                const KIND: ComponentKind = ComponentKind::$variant;

                #[inline]
                fn into_slot(this: Shared<Self>) -> ComponentSlot {
                    ComponentSlot::$variant(this)
                }

                #[inline]
                fn from_slot(slot: &ComponentSlot) -> Option<Shared<Self>> {
                    match slot {
                        ComponentSlot::$variant(c) => Some(c.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

component_slots! {
    Position => Position,
    Size => Size,
    Figure => Figure,
    Border => Border,
    Fill => Fill,
    Hitbox => MouseHitbox,
    Text => Text,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Custom(name) => f.write_str(name),
            other => write!(f, "{:?}", other),
        }
    }
}

// ============================================================================
// Owner back-reference
// ============================================================================

/// Non-owning link from a component to its item, plus the `item/Component` label used
/// for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Owner {
    item: Weak<Item>,
    label: String,
}

impl Owner {
    pub fn bind(item: &Item, component: &str) -> Self {
        Self {
            item: item.downgrade(),
            label: format!("{}/{}", item.name(), component),
        }
    }

    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            "<unbound>"
        } else {
            &self.label
        }
    }

    pub fn item(&self) -> Option<Rc<Item>> {
        self.item.upgrade()
    }
}

// ============================================================================
// Sibling geometry
// ============================================================================

/// The item's absolute Position and Size, resolved (or defaulted) in `init`.
#[derive(Clone)]
pub struct Placement {
    position: Shared<Position>,
    size: Shared<Size>,
}

impl Placement {
    pub fn require(item: &Item, ctx: &mut FrameCtx<'_>, owner: &Owner) -> Self {
        let position = item.require_or_default(
            ctx,
            owner.label(),
            Position::default,
            "Item has no position component. Initialising default position.",
        );
        let size = item.require_or_default(
            ctx,
            owner.label(),
            Size::default,
            "Item has no size component. Initialising default size.",
        );
        Self { position, size }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position.borrow().vec2()
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size.borrow().vec2()
    }

    /// Absolute box with `local` applied.
    pub fn rect(&self, local: &LocalGeometry) -> Rect {
        local.apply(self.position(), self.size())
    }
}

pub fn require_figure(item: &Item, ctx: &mut FrameCtx<'_>, owner: &Owner) -> Shared<Figure> {
    item.require_or_default(
        ctx,
        owner.label(),
        Figure::default,
        "Item has no figure component. Initialising default figure.",
    )
}

// ============================================================================
// Local geometry
// ============================================================================

/// Additive offset applied on top of the item's absolute Position/Size at draw and
/// hit-test time. Reads as zero until finalised in phase 2; offsets given at
/// construction are copied in then.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalGeometry {
    pending_position: Vec2,
    pending_size: Vec2,
    position: Vec2,
    size: Vec2,
    finalized: bool,
}

impl LocalGeometry {
    pub fn with_offset(position: Vec2, size: Vec2) -> Self {
        Self {
            pending_position: position,
            pending_size: size,
            ..Self::default()
        }
    }

    pub fn finalize(&mut self) {
        self.position = self.pending_position;
        self.size = self.pending_size;
        self.finalized = true;
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    fn ready(&self) -> Result<()> {
        crate::ensure!(self.finalized, Error::not_initialized("local geometry"));
        Ok(())
    }

    pub fn set_position(&mut self, position: Vec2) -> Result<()> {
        self.ready()?;
        self.position = position;
        Ok(())
    }

    pub fn add_position(&mut self, delta: Vec2) -> Result<()> {
        self.ready()?;
        self.position += delta;
        Ok(())
    }

    pub fn set_size(&mut self, size: Vec2) -> Result<()> {
        self.ready()?;
        self.size = size;
        Ok(())
    }

    pub fn add_size(&mut self, delta: Vec2) -> Result<()> {
        self.ready()?;
        self.size += delta;
        Ok(())
    }

    /// Absolute rect with the local offset applied.
    #[inline]
    pub fn apply(&self, position: Vec2, size: Vec2) -> Rect {
        Rect::new(position + self.position, size + self.size)
    }
}
