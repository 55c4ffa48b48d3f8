// src/resource_manager.rs
//! Resource Manager
//! - Materials behind one capability contract (`init` / `load` / `unload` / `ready`)
//! - Deduplication by path
//! - Holder counting so two items sharing a font don't unload it under each other
//! - `FontScope`: scoped load/unload around measurements of fonts nobody holds

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use glam::Vec2;

use crate::diagnostics::Diagnostics;
use crate::geometry::Color;
use crate::renderer::{FontId, Renderer};
use crate::Result;

pub type SharedMaterial = Rc<RefCell<dyn Material>>;

pub trait Material {
    fn path(&self) -> &str;

    /// One-time validation at engine start.
    fn init(&mut self, _diagnostics: &mut Diagnostics) {}

    fn load(&mut self, renderer: &mut dyn Renderer) -> Result<()>;
    fn unload(&mut self, renderer: &mut dyn Renderer);
    fn ready(&self) -> bool;
}

// ---------- Fonts ----------

#[derive(Debug)]
pub struct FontMaterial {
    path: String,
    handle: Option<FontId>,
    holders: u32,
}

impl FontMaterial {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            handle: None,
            holders: 0,
        }
    }

    pub fn shared(path: impl Into<String>) -> Rc<RefCell<FontMaterial>> {
        Rc::new(RefCell::new(Self::new(path)))
    }

    #[inline]
    pub fn handle(&self) -> Option<FontId> {
        self.handle
    }

    #[inline]
    pub fn holders(&self) -> u32 {
        self.holders
    }
}

impl Material for FontMaterial {
    fn path(&self) -> &str {
        &self.path
    }

    fn init(&mut self, diagnostics: &mut Diagnostics) {
        let ext = Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("ttf" | "otf" | "fnt") => {}
            _ => diagnostics.warning(
                "ResourceManager",
                format!("'{}' does not look like a font file", self.path),
            ),
        }
    }

    fn load(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        if self.handle.is_none() {
            self.handle = Some(renderer.load_font(&self.path)?);
            log::debug!("Loaded font '{}'", self.path);
        }
        self.holders += 1;
        Ok(())
    }

    fn unload(&mut self, renderer: &mut dyn Renderer) {
        self.holders = self.holders.saturating_sub(1);
        if self.holders == 0 {
            if let Some(id) = self.handle.take() {
                renderer.unload_font(id);
                log::debug!("Unloaded font '{}'", self.path);
            }
        }
    }

    fn ready(&self) -> bool {
        self.handle.is_some()
    }
}

/// Borrowed access to a loaded font. If the font was not resident when the scope was
/// acquired, it is loaded for the scope only and unloaded on drop.
pub struct FontScope<'r> {
    renderer: &'r mut dyn Renderer,
    font: FontId,
    transient: bool,
}

impl<'r> FontScope<'r> {
    pub fn acquire(material: &FontMaterial, renderer: &'r mut dyn Renderer) -> Result<Self> {
        let (font, transient) = match material.handle {
            Some(id) => (id, false),
            None => (renderer.load_font(&material.path)?, true),
        };
        Ok(Self { renderer, font, transient })
    }

    #[inline]
    pub fn is_transient(&self) -> bool {
        self.transient
    }

    #[inline]
    pub fn measure(&self, text: &str, size: f32, spacing: f32) -> Vec2 {
        self.renderer.measure_text(self.font, text, size, spacing)
    }

    #[inline]
    pub fn draw_text(&mut self, text: &str, origin: Vec2, size: f32, spacing: f32, color: Color) {
        self.renderer.draw_text(self.font, text, origin, size, spacing, color);
    }
}

impl Drop for FontScope<'_> {
    fn drop(&mut self) {
        if self.transient {
            self.renderer.unload_font(self.font);
        }
    }
}

// ---------- ResourceManager ----------

#[derive(Default)]
pub struct ResourceManager {
    all: Vec<SharedMaterial>,
    fonts: HashMap<String, Rc<RefCell<FontMaterial>>>,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the font registered under `path`, creating it on first use.
    pub fn font(&mut self, path: &str) -> Rc<RefCell<FontMaterial>> {
        if let Some(font) = self.fonts.get(path) {
            return font.clone();
        }
        let font = FontMaterial::shared(path);
        self.fonts.insert(path.to_owned(), font.clone());
        self.all.push(font.clone());
        font
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn init_all(&self, diagnostics: &mut Diagnostics) {
        for material in &self.all {
            material.borrow_mut().init(diagnostics);
        }
    }

    pub fn ready_count(&self) -> usize {
        self.all.iter().filter(|m| m.borrow().ready()).count()
    }

    /// Force-unloads everything, whatever the holder counts say.
    pub fn unload_all(&self, renderer: &mut dyn Renderer) {
        for material in &self.all {
            let mut material = material.borrow_mut();
            while material.ready() {
                material.unload(renderer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::renderer::RecordingRenderer;

    #[test]
    fn test_font_dedup_by_path() {
        let mut res = ResourceManager::new();
        let a = res.font("fonts/mono.ttf");
        let b = res.font("fonts/mono.ttf");
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(res.len(), 1);
    }

    #[test]
    fn test_holder_counting() {
        let mut r = RecordingRenderer::new();
        let mut font = FontMaterial::new("fonts/mono.ttf");
        font.load(&mut r).unwrap();
        font.load(&mut r).unwrap();
        assert_eq!(r.loads, 1);

        font.unload(&mut r);
        assert!(font.ready());
        font.unload(&mut r);
        assert!(!font.ready());
        assert_eq!(r.unloads, 1);
    }

    #[test]
    fn test_scope_loads_transiently() {
        let mut r = RecordingRenderer::new();
        let font = FontMaterial::new("fonts/mono.ttf");
        {
            let scope = FontScope::acquire(&font, &mut r).unwrap();
            assert!(scope.is_transient());
            assert_eq!(scope.measure("abc", 10.0, 0.0), Vec2::new(15.0, 10.0));
        }
        assert_eq!(r.loaded_count(), 0);
        assert_eq!((r.loads, r.unloads), (1, 1));
    }

    #[test]
    fn test_scope_reuses_resident_font() {
        let mut r = RecordingRenderer::new();
        let mut font = FontMaterial::new("fonts/mono.ttf");
        font.load(&mut r).unwrap();
        {
            let scope = FontScope::acquire(&font, &mut r).unwrap();
            assert!(!scope.is_transient());
        }
        assert!(font.ready());
        assert_eq!(r.loaded_count(), 1);
    }

    #[test]
    fn test_init_warns_on_odd_extension() {
        let mut res = ResourceManager::new();
        res.font("fonts/mono.ttf");
        res.font("images/logo.png");
        let mut diag = Diagnostics::default();
        res.init_all(&mut diag);
        assert_eq!(diag.count(Severity::Warning), 1);
    }

    #[test]
    fn test_unload_all() {
        let mut r = RecordingRenderer::new();
        let mut res = ResourceManager::new();
        let font = res.font("fonts/mono.ttf");
        font.borrow_mut().load(&mut r).unwrap();
        font.borrow_mut().load(&mut r).unwrap();
        assert_eq!(res.ready_count(), 1);
        res.unload_all(&mut r);
        assert_eq!(res.ready_count(), 0);
        assert_eq!(r.loaded_count(), 0);
    }
}
