// src/engine.rs
//! The frame driver.
//!
//! `Engine` owns the configuration, the debug switches, the diagnostics channel, the
//! resource registry and the scene `Root`. The platform layer owns the window, the
//! `Renderer` and the `InputSource`, and lends them to `init` / `frame` each call.
//!
//! Per frame: keybinds, then `EarlyUpdate → Update → LateUpdate → Draw`, then
//! `DebugDraw` while debug mode is on.

use crate::config::{DebugState, EngineConfig};
use crate::diagnostics::{Diagnostics, Severity};
use crate::gui::DebugUi;
use crate::input_system::{InputSource, Key};
use crate::renderer::Renderer;
use crate::resource_manager::ResourceManager;
use crate::scene::{Root, SceneTarget};
use crate::{Error, Result};

/// Everything a lifecycle call may touch besides its own component.
pub struct FrameCtx<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub input: &'a dyn InputSource,
    pub diagnostics: &'a mut Diagnostics,
    pub debug: &'a DebugState,
    pub config: &'a EngineConfig,
}

const ENGINE: &str = "Engine";

pub struct Engine {
    config: EngineConfig,
    debug: DebugState,
    diagnostics: Diagnostics,
    resources: ResourceManager,
    root: Root,
    initialized: bool,
    frames: u64,
}

impl Engine {
    pub fn new(config: EngineConfig, root: Root) -> Self {
        Self {
            debug: DebugState::new(config.debug_mode),
            diagnostics: Diagnostics::with_capacity(config.diagnostics_capacity),
            config,
            resources: ResourceManager::new(),
            root,
            initialized: false,
            frames: 0,
        }
    }

    /// Uses `resources` (fonts created ahead of the scene graph) instead of an empty registry.
    pub fn with_resources(mut self, resources: ResourceManager) -> Self {
        self.resources = resources;
        self
    }

    fn with_root<R>(
        &mut self,
        renderer: &mut dyn Renderer,
        input: &dyn InputSource,
        f: impl FnOnce(&mut Root, &mut FrameCtx<'_>) -> R,
    ) -> R {
        let mut ctx = FrameCtx {
            renderer,
            input,
            diagnostics: &mut self.diagnostics,
            debug: &self.debug,
            config: &self.config,
        };
        f(&mut self.root, &mut ctx)
    }

    // ---------------- Lifecycle ----------------

    /// Validates resources, initialises the whole scene graph and enters the startup set.
    pub fn init(&mut self, renderer: &mut dyn Renderer, input: &dyn InputSource) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        if let Some(name) = self.config.startup_scene.clone() {
            if let Err(err) = self.root.select_startup(&name) {
                self.diagnostics.error(ENGINE, format!("startup scene ignored: {}", err));
            }
        }

        self.resources.init_all(&mut self.diagnostics);
        self.with_root(renderer, input, |root, ctx| -> Result<()> {
            root.init(ctx)?;
            root.enter(ctx);
            Ok(())
        })?;

        self.initialized = true;
        log::info!(
            "Engine initialised; active: [{}]",
            self.root.active_names().join(", ")
        );
        Ok(())
    }

    /// Runs one frame. Fails with `NotInitialized` before [`Engine::init`].
    pub fn frame(&mut self, renderer: &mut dyn Renderer, input: &dyn InputSource) -> Result<()> {
        crate::ensure!(self.initialized, Error::not_initialized(ENGINE));
        self.root.check_init_correct()?;

        self.handle_keybinds(renderer, input);

        let debug_on = self.debug.turned_on;
        self.with_root(renderer, input, |root, ctx| {
            root.early_update(ctx);
            root.update(ctx);
            root.late_update(ctx);
            root.draw(ctx);
            if debug_on {
                root.debug_draw(ctx);
            }
        });

        self.debug.changed = false;
        self.frames += 1;
        Ok(())
    }

    /// Leaves the active scene and force-unloads every registered resource.
    pub fn shutdown(&mut self, renderer: &mut dyn Renderer, input: &dyn InputSource) {
        if !self.initialized {
            return;
        }
        self.with_root(renderer, input, |root, ctx| root.leave(ctx));
        self.resources.unload_all(renderer);
        self.initialized = false;
        log::info!("Engine shut down after {} frames", self.frames);
    }

    fn handle_keybinds(&mut self, renderer: &mut dyn Renderer, input: &dyn InputSource) {
        let binds = self.config.keybinds.clone();
        let pressed = |key: Option<Key>| key.is_some_and(|k| input.is_key_pressed(k));

        if pressed(binds.toggle_debug) {
            self.toggle_debug();
        }
        // refusals are already reported as diagnostics
        if pressed(binds.next_scene) {
            if let Err(err) = self.next_scene(renderer, input) {
                log::debug!("next scene keybind: {}", err);
            }
        }
        if pressed(binds.previous_scene) {
            if let Err(err) = self.previous_scene(renderer, input) {
                log::debug!("previous scene keybind: {}", err);
            }
        }
    }

    // ---------------- Scene selection ----------------

    pub fn change_scene<'t>(
        &mut self,
        target: impl Into<SceneTarget<'t>>,
        renderer: &mut dyn Renderer,
        input: &dyn InputSource,
    ) -> Result<()> {
        let target = target.into();
        self.with_root(renderer, input, |root, ctx| root.change_scene(target, ctx))
    }

    pub fn next_scene(
        &mut self,
        renderer: &mut dyn Renderer,
        input: &dyn InputSource,
    ) -> Result<()> {
        self.with_root(renderer, input, |root, ctx| root.next_scene(ctx))
    }

    pub fn previous_scene(
        &mut self,
        renderer: &mut dyn Renderer,
        input: &dyn InputSource,
    ) -> Result<()> {
        self.with_root(renderer, input, |root, ctx| root.previous_scene(ctx))
    }

    // ---------------- Debug ----------------

    pub fn toggle_debug(&mut self) {
        self.debug.toggle();
        log::info!("Debug mode {}", if self.debug.turned_on { "on" } else { "off" });
    }

    /// Reported by whatever draws the debug UI; hitboxes ignore the mouse while it shows.
    pub fn set_overlay_showing(&mut self, showing: bool) {
        self.debug.overlay_showing = showing;
    }

    pub fn debug_ui(&self, ui: &mut dyn DebugUi) {
        if ui.tree_node(ENGINE) {
            ui.key_value("Frames", &self.frames.to_string());
            ui.key_value("Debug", &self.debug.turned_on.to_string());
            ui.key_value(
                "Resources",
                &format!("{} ({} ready)", self.resources.len(), self.resources.ready_count()),
            );
            for severity in Severity::ALL {
                ui.key_value(&severity.to_string(), &self.diagnostics.count(severity).to_string());
            }
            ui.tree_pop();
        }
        self.root.debugger_tree(ui);
    }

    // ---------------- Accessors ----------------

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn debug(&self) -> &DebugState {
        &self.debug
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    pub fn root(&self) -> &Root {
        &self.root
    }
}
