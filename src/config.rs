// src/config.rs
//! Engine configuration and the debug toggle state.
//!
//! `EngineConfig` is built once (defaults or JSON) and handed to the `Engine`; components
//! see it read-only through the frame context. `DebugState` is the only mutable switch
//! and is owned by the engine as well.

use std::path::Path;

use serde::Deserialize;

use crate::context::Context;
use crate::geometry::Color;
use crate::input_system::Key;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Keybinds {
    pub toggle_debug: Option<Key>,
    pub next_scene: Option<Key>,
    pub previous_scene: Option<Key>,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            toggle_debug: Some(Key::F3),
            next_scene: Some(Key::PageDown),
            previous_scene: Some(Key::PageUp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Debug mode at startup.
    pub debug_mode: bool,
    /// Segments used for rounded rectangles.
    pub rounded_segments: u32,
    /// Size given to a `Size` component created without dimensions.
    pub default_size: [f32; 2],
    pub debug_hitbox_color: Color,
    pub debug_fill_color: Color,
    pub debug_text_color: Color,
    /// Overrides the startup scene picked by the root.
    pub startup_scene: Option<String>,
    pub diagnostics_capacity: usize,
    pub keybinds: Keybinds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            rounded_segments: 16,
            default_size: [100.0, 100.0],
            debug_hitbox_color: Color::rgba(230, 41, 55, 100),
            debug_fill_color: Color::WHITE,
            debug_text_color: Color::GREEN,
            startup_scene: None,
            diagnostics_capacity: 256,
            keybinds: Keybinds::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing engine config")
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json_str(&raw)
    }
}

/// Debug overlay switches. `overlay_showing` is set by whatever drives the debug UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugState {
    pub turned_on: bool,
    pub changed: bool,
    pub overlay_showing: bool,
}

impl DebugState {
    pub fn new(turned_on: bool) -> Self {
        Self {
            turned_on,
            changed: true,
            overlay_showing: false,
        }
    }

    pub fn toggle(&mut self) {
        self.turned_on = !self.turned_on;
        self.changed = true;
    }

    /// True while the overlay is on screen and owns the mouse.
    #[inline]
    pub fn captures_input(&self) -> bool {
        self.turned_on && self.overlay_showing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "debug_mode": true,
            "default_size": [32, 16],
            "keybinds": { "next_scene": "Tab" }
        }"#;
        let cfg = EngineConfig::from_json_str(json).unwrap();
        assert!(cfg.debug_mode);
        assert_eq!(cfg.default_size, [32.0, 16.0]);
        assert_eq!(cfg.rounded_segments, 16);
        assert_eq!(cfg.keybinds.next_scene, Some(Key::Tab));
        assert_eq!(cfg.keybinds.toggle_debug, Some(Key::F3));
    }

    #[test]
    fn test_bad_json_is_reported_with_context() {
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(err.to_string().starts_with("parsing engine config: JSON error"));
    }

    #[test]
    fn test_missing_file() {
        assert!(EngineConfig::from_json_file("/definitely/not/here.json").is_err());
    }

    #[test]
    fn test_debug_toggle() {
        let mut debug = DebugState::new(false);
        debug.changed = false;
        debug.overlay_showing = true;
        assert!(!debug.captures_input());
        debug.toggle();
        assert!(debug.turned_on && debug.changed);
        assert!(debug.captures_input());
    }
}
