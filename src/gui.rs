// src/gui.rs
//! Immediate-mode debug UI interface.
//!
//! The scene graph describes itself (tree + per-component inspector) through
//! [`DebugUi`]; an egui/imgui backend implements the trait. [`TextDebugUi`] renders the
//! same calls into indented text lines.

pub trait DebugUi {
    /// Opens a collapsible node; children follow until `tree_pop` when it returns true.
    fn tree_node(&mut self, label: &str) -> bool;
    fn tree_pop(&mut self);
    fn text(&mut self, text: &str);
    fn key_value(&mut self, key: &str, value: &str);
    fn separator(&mut self);
}

/// Text rendition of the debug UI; every node is expanded.
#[derive(Debug, Default)]
pub struct TextDebugUi {
    pub lines: Vec<String>,
    depth: usize,
}

impl TextDebugUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, line: String) {
        self.lines.push(format!("{}{}", "  ".repeat(self.depth), line));
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl DebugUi for TextDebugUi {
    fn tree_node(&mut self, label: &str) -> bool {
        self.push(format!("> {label}"));
        self.depth += 1;
        true
    }

    fn tree_pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn text(&mut self, text: &str) {
        self.push(text.to_owned());
    }

    fn key_value(&mut self, key: &str, value: &str) {
        self.push(format!("{key}: {value}"));
    }

    fn separator(&mut self) {
        self.push("---".to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_follows_tree() {
        let mut ui = TextDebugUi::new();
        if ui.tree_node("Root") {
            ui.key_value("Scenes", "2");
            if ui.tree_node("Menu") {
                ui.text("Button");
                ui.tree_pop();
            }
            ui.tree_pop();
        }
        ui.separator();
        assert_eq!(ui.render(), "> Root\n  Scenes: 2\n  > Menu\n    Button\n---");
    }
}
