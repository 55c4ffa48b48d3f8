// src/lib.rs
//! slop_scene: an entity/component scene engine.
//!
//! Items are bags of components (position, size, figure, fill, border, text, mouse
//! hitbox) wired together in a two-phase init. Items live in folders under a scene
//! `Root` that keeps exactly one scene active next to any number of persistent folders,
//! and an `Engine` drives the active set through a fixed per-frame phase order.
//!
//! Rendering and input are backend traits ([`renderer::Renderer`],
//! [`input_system::InputSource`]); the crate ships a headless recording renderer and a
//! frame-edge input manager.

pub mod components;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gui;
pub mod input_system;
pub mod item;
pub mod renderer;
pub mod resource_manager;
pub mod scene;

pub use components::{
    Border, ButtonFlags, Component, ComponentKind, Figure, FigureKind, Fill, MouseHitbox,
    Position, RefObj, Size, Text, TextAlign, TextSettings,
};
pub use config::{DebugState, EngineConfig, Keybinds};
pub use context::{Context, OptionContext};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use engine::{Engine, FrameCtx};
pub use error::{Error, Result};
pub use geometry::{Color, Rect};
pub use item::{Item, ItemId};
pub use scene::{Folder, FolderKind, Node, Root, SceneTarget};
