// src/item.rs
//! Items: named bags of components.
//!
//! An item owns a typed component registry (one instance per kind, insertion ordered),
//! the late-init queue that implements the second initialisation phase, and the list
//! of materials its components render with.
//!
//! Initialisation runs in two phases per item:
//! 1. every component's `init` runs once, in insertion order. Components resolve their
//!    siblings with [`Item::require_or_default`], which may append and immediately
//!    initialise defaults, and queue themselves with
//!    [`Item::register_late_local_init`].
//! 2. once all of phase 1 is done the queue is drained exactly once: queued components
//!    finalise their local geometry, then user closures from [`Item::add_late_init`] run.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::components::{shared, Component, ComponentKind, ComponentSlot, Kind, Shared};
use crate::engine::FrameCtx;
use crate::gui::DebugUi;
use crate::resource_manager::SharedMaterial;
use crate::{Error, Result};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u64);

impl ItemId {
    fn next() -> Self {
        ItemId(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Entry {
    slot: ComponentSlot,
    initialized: Cell<bool>,
}

#[derive(Default)]
struct Registry {
    entries: Vec<Rc<Entry>>,
    index: HashMap<ComponentKind, usize>,
}

type LateInitFn = Box<dyn FnOnce(&Item) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitPhase {
    Pending,
    Wiring,
    Ready,
    Failed,
}

pub struct Item {
    id: ItemId,
    name: String,
    me: Weak<Item>,
    components: RefCell<Registry>,
    late_local: RefCell<Vec<ComponentKind>>,
    late_user: RefCell<Vec<LateInitFn>>,
    materials: RefCell<Vec<SharedMaterial>>,
    phase: Cell<InitPhase>,
    entered: Cell<bool>,
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("components", &self.kinds())
            .field("phase", &self.phase.get())
            .finish()
    }
}

impl Item {
    pub fn new(name: impl Into<String>) -> Rc<Item> {
        let name = name.into();
        Rc::new_cyclic(|me| Item {
            id: ItemId::next(),
            name,
            me: me.clone(),
            components: RefCell::new(Registry::default()),
            late_local: RefCell::new(Vec::new()),
            late_user: RefCell::new(Vec::new()),
            materials: RefCell::new(Vec::new()),
            phase: Cell::new(InitPhase::Pending),
            entered: Cell::new(false),
        })
    }

    /// Builder form of [`Item::add`]; a duplicate kind is logged and dropped.
    pub fn with<T: Kind>(self: Rc<Self>, component: T) -> Rc<Self> {
        if let Err(err) = self.add(component) {
            log::warn!("{}", err);
        }
        self
    }

    /// Builder form of [`Item::add_custom`].
    pub fn with_custom<C: Component>(self: Rc<Self>, name: &'static str, component: C) -> Rc<Self> {
        if let Err(err) = self.add_custom(name, component) {
            log::warn!("{}", err);
        }
        self
    }

    /// Builder form of [`Item::add_late_init`].
    pub fn with_late_init<F>(self: Rc<Self>, f: F) -> Rc<Self>
    where
        F: FnOnce(&Item) -> Result<()> + 'static,
    {
        self.add_late_init(f);
        self
    }

    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn downgrade(&self) -> Weak<Item> {
        self.me.clone()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.phase.get() == InitPhase::Ready
    }

    // ---------------- Registry ----------------

    fn insert(&self, slot: ComponentSlot) -> Result<Rc<Entry>> {
        let mut reg = self.components.borrow_mut();
        let kind = slot.kind();
        if reg.index.contains_key(&kind) {
            return Err(Error::DuplicateComponent {
                item: self.name.clone(),
                kind,
            });
        }
        let entry = Rc::new(Entry {
            slot,
            initialized: Cell::new(false),
        });
        let at = reg.entries.len();
        reg.entries.push(entry.clone());
        reg.index.insert(kind, at);
        Ok(entry)
    }

    fn entry_at(&self, i: usize) -> Option<Rc<Entry>> {
        self.components.borrow().entries.get(i).cloned()
    }

    fn entry_of(&self, kind: ComponentKind) -> Option<Rc<Entry>> {
        let reg = self.components.borrow();
        reg.index.get(&kind).map(|&i| reg.entries[i].clone())
    }

    /// Appends a component. Legal at any time; it is not initialised here (see
    /// [`Item::attach`] for components added after the item went live).
    pub fn add<T: Kind>(&self, component: T) -> Result<Shared<T>> {
        let handle = shared(component);
        self.insert(T::into_slot(handle.clone()))?;
        Ok(handle)
    }

    pub fn add_custom<C: Component>(
        &self,
        name: &'static str,
        component: C,
    ) -> Result<Shared<dyn Component>> {
        let handle: Shared<dyn Component> = shared(component);
        self.insert(ComponentSlot::Custom(name, handle.clone()))?;
        Ok(handle)
    }

    /// The component of kind `T`, if any.
    pub fn get<T: Kind>(&self) -> Option<Shared<T>> {
        self.entry_of(T::KIND).and_then(|e| T::from_slot(&e.slot))
    }

    pub fn get_custom(&self, name: &'static str) -> Option<Shared<dyn Component>> {
        self.entry_of(ComponentKind::Custom(name)).map(|e| e.slot.as_dyn())
    }

    #[inline]
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.borrow().index.contains_key(&kind)
    }

    /// Component kinds in insertion order.
    pub fn kinds(&self) -> Vec<ComponentKind> {
        self.components.borrow().entries.iter().map(|e| e.slot.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.components.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the sibling of kind `T`; when it is missing, builds one with `fallback`,
    /// registers and initialises it, and reports `warning` on behalf of `source`.
    pub fn require_or_default<T, F>(
        &self,
        ctx: &mut FrameCtx<'_>,
        source: &str,
        fallback: F,
        warning: &str,
    ) -> Shared<T>
    where
        T: Kind,
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.get::<T>() {
            return existing;
        }
        ctx.diagnostics.warning(source, warning);
        let handle = shared(fallback());
        match self.insert(T::into_slot(handle.clone())) {
            Ok(entry) => self.init_entry(&entry, ctx),
            Err(err) => ctx.diagnostics.error(source, err.to_string()),
        }
        handle
    }

    /// Adds a component and, if this item is already initialised, runs both phases
    /// for it right away.
    pub fn attach<T: Kind>(&self, component: T, ctx: &mut FrameCtx<'_>) -> Result<Shared<T>> {
        let handle = shared(component);
        let entry = self.insert(T::into_slot(handle.clone()))?;
        if self.is_initialized() {
            self.init_entry(&entry, ctx);
            self.drain_late(ctx)?;
        }
        Ok(handle)
    }

    // ---------------- Late init ----------------

    /// Queues the component of `kind` for local-geometry finalisation. Call from `init`.
    pub fn register_late_local_init(&self, kind: ComponentKind) {
        let mut queue = self.late_local.borrow_mut();
        if !queue.contains(&kind) {
            queue.push(kind);
        }
    }

    /// Runs after every queued component finalised its local geometry.
    pub fn add_late_init<F>(&self, f: F)
    where
        F: FnOnce(&Item) -> Result<()> + 'static,
    {
        self.late_user.borrow_mut().push(Box::new(f));
    }

    pub fn add_material(&self, material: SharedMaterial) {
        let mut materials = self.materials.borrow_mut();
        if !materials.iter().any(|m| Rc::ptr_eq(m, &material)) {
            materials.push(material);
        }
    }

    pub fn material_count(&self) -> usize {
        self.materials.borrow().len()
    }

    // ---------------- Initialisation ----------------

    fn init_entry(&self, entry: &Entry, ctx: &mut FrameCtx<'_>) {
        if entry.initialized.replace(true) {
            return;
        }
        let component = entry.slot.as_dyn();
        let Ok(mut component) = component.try_borrow_mut() else {
            ctx.diagnostics.error(
                &self.name,
                format!("{} is borrowed during init; skipped", entry.slot.kind()),
            );
            return;
        };
        component.init(self, ctx);
    }

    fn drain_late(&self, ctx: &mut FrameCtx<'_>) -> Result<()> {
        let queued = std::mem::take(&mut *self.late_local.borrow_mut());
        for kind in queued {
            let Some(entry) = self.entry_of(kind) else {
                continue;
            };
            let component = entry.slot.as_dyn();
            let Ok(mut component) = component.try_borrow_mut() else {
                ctx.diagnostics.error(
                    &self.name,
                    format!("{} is borrowed during late init; skipped", kind),
                );
                continue;
            };
            component.late_local_init(ctx);
        }

        let user = std::mem::take(&mut *self.late_user.borrow_mut());
        for f in user {
            f(self).map_err(|e| e.context(format!("late init of '{}'", self.name)))?;
        }
        Ok(())
    }

    /// Both initialisation phases. Re-entry after success is a no-op; an item whose
    /// late init failed stays failed and reports `NotInitialized` on every later call.
    pub fn init(&self, ctx: &mut FrameCtx<'_>) -> Result<()> {
        match self.phase.get() {
            InitPhase::Pending => {}
            InitPhase::Ready => return Ok(()),
            InitPhase::Wiring | InitPhase::Failed => {
                return Err(Error::not_initialized(format!(
                    "item '{}' did not finish initialisation",
                    self.name
                )));
            }
        }
        self.phase.set(InitPhase::Wiring);

        let mut i = 0;
        while let Some(entry) = self.entry_at(i) {
            self.init_entry(&entry, ctx);
            i += 1;
        }

        if let Err(err) = self.drain_late(ctx) {
            self.phase.set(InitPhase::Failed);
            return Err(err);
        }
        self.phase.set(InitPhase::Ready);
        log::debug!("Initialised item '{}' {} ({} components)", self.name, self.id, self.len());
        Ok(())
    }

    // ---------------- Lifecycle fan-out ----------------

    fn each<F>(&self, ctx: &mut FrameCtx<'_>, mut hook: F)
    where
        F: FnMut(&mut dyn Component, &mut FrameCtx<'_>),
    {
        let mut i = 0;
        while let Some(entry) = self.entry_at(i) {
            i += 1;
            let component = entry.slot.as_dyn();
            let Ok(mut component) = component.try_borrow_mut() else {
                ctx.diagnostics.error(
                    &self.name,
                    format!("{} is borrowed elsewhere; skipped this call", entry.slot.kind()),
                );
                continue;
            };
            hook(&mut *component, ctx);
        }
    }

    /// Loads materials on the first Enter after a Leave; repeated Enters (persistent
    /// folders on every scene switch) keep the holds they already have.
    pub fn enter(&self, ctx: &mut FrameCtx<'_>) {
        if self.entered.replace(true) {
            self.each(ctx, |c, ctx| c.enter(ctx));
            return;
        }
        for material in self.materials.borrow().iter() {
            let mut material = material.borrow_mut();
            if let Err(err) = material.load(&mut *ctx.renderer) {
                ctx.diagnostics.error(&self.name, err.to_string());
            }
        }
        self.each(ctx, |c, ctx| c.enter(ctx));
    }

    pub fn leave(&self, ctx: &mut FrameCtx<'_>) {
        self.each(ctx, |c, ctx| c.leave(ctx));
        if !self.entered.replace(false) {
            return;
        }
        for material in self.materials.borrow().iter() {
            material.borrow_mut().unload(&mut *ctx.renderer);
        }
    }

    pub fn early_update(&self, ctx: &mut FrameCtx<'_>) {
        self.each(ctx, |c, ctx| c.early_update(ctx));
    }

    pub fn update(&self, ctx: &mut FrameCtx<'_>) {
        self.each(ctx, |c, ctx| c.update(ctx));
    }

    pub fn late_update(&self, ctx: &mut FrameCtx<'_>) {
        self.each(ctx, |c, ctx| c.late_update(ctx));
    }

    pub fn draw(&self, ctx: &mut FrameCtx<'_>) {
        self.each(ctx, |c, ctx| c.draw(ctx));
    }

    pub fn debug_draw(&self, ctx: &mut FrameCtx<'_>) {
        self.each(ctx, |c, ctx| c.debug_draw(ctx));
    }

    pub fn debugger_tree(&self, ui: &mut dyn DebugUi) {
        if !ui.tree_node(&format!("{} {}", self.name, self.id)) {
            return;
        }
        let mut i = 0;
        while let Some(entry) = self.entry_at(i) {
            i += 1;
            let component = entry.slot.as_dyn();
            let Ok(component) = component.try_borrow() else {
                ui.text(&format!("{} (busy)", entry.slot.kind()));
                continue;
            };
            if ui.tree_node(component.type_name()) {
                component.debugger_info(ui);
                ui.tree_pop();
            }
        }
        ui.tree_pop();
    }
}
