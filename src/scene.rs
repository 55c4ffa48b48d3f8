// src/scene.rs
//! Scene graph: a `Root` of top-level folders, each holding items and sub-folders.
//!
//! Scene folders are mutually exclusive: exactly one of them is active at a time.
//! Persistent folders are always active. Phase calls only reach the active set
//! (`active_children`); inactive scenes are frozen until switched to.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::FrameCtx;
use crate::gui::DebugUi;
use crate::item::Item;
use crate::{Error, Result};

static NEXT_FOLDER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FolderKind {
    Scene,
    Persistent,
}

pub enum Node {
    Folder(Folder),
    Item(Rc<Item>),
}

// ============================================================================
// Folder
// ============================================================================

pub struct Folder {
    id: u64,
    name: String,
    kind: FolderKind,
    active: bool,
    startup: bool,
    children: Vec<Node>,
    initialized: bool,
}

impl fmt::Debug for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Folder")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("active", &self.active)
            .field("children", &self.children.len())
            .finish()
    }
}

impl Folder {
    fn new(name: impl Into<String>, kind: FolderKind) -> Self {
        Self {
            id: NEXT_FOLDER_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            kind,
            active: kind == FolderKind::Persistent,
            startup: false,
            children: Vec::new(),
            initialized: false,
        }
    }

    pub fn scene(name: impl Into<String>) -> Self {
        Self::new(name, FolderKind::Scene)
    }

    pub fn persistent(name: impl Into<String>) -> Self {
        Self::new(name, FolderKind::Persistent)
    }

    /// Marks this scene as the one active at startup.
    pub fn startup(mut self) -> Self {
        self.startup = true;
        self
    }

    pub fn with_item(mut self, item: Rc<Item>) -> Self {
        self.children.push(Node::Item(item));
        self
    }

    pub fn with_folder(mut self, folder: Folder) -> Self {
        self.children.push(Node::Folder(folder));
        self
    }

    pub fn push_item(&mut self, item: Rc<Item>) {
        self.children.push(Node::Item(item));
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> FolderKind {
        self.kind
    }

    #[inline]
    pub fn is_scene(&self) -> bool {
        self.kind == FolderKind::Scene
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Depth-first search by item name.
    pub fn find_item(&self, name: &str) -> Option<Rc<Item>> {
        self.children.iter().find_map(|child| match child {
            Node::Item(item) if item.name() == name => Some(item.clone()),
            Node::Item(_) => None,
            Node::Folder(folder) => folder.find_item(name),
        })
    }

    fn for_each_item(&self, f: &mut dyn FnMut(&Item)) {
        for child in &self.children {
            match child {
                Node::Folder(folder) => folder.for_each_item(f),
                Node::Item(item) => f(item),
            }
        }
    }

    pub fn init(&mut self, ctx: &mut FrameCtx<'_>) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        for child in &mut self.children {
            match child {
                Node::Folder(folder) => folder.init(ctx)?,
                Node::Item(item) => item
                    .init(ctx)
                    .map_err(|e| e.context(format!("folder '{}'", self.name)))?,
            }
        }
        self.initialized = true;
        Ok(())
    }

    pub fn enter(&self, ctx: &mut FrameCtx<'_>) {
        log::debug!("Entering folder '{}'", self.name);
        self.for_each_item(&mut |item| item.enter(ctx));
    }

    pub fn leave(&self, ctx: &mut FrameCtx<'_>) {
        log::debug!("Leaving folder '{}'", self.name);
        self.for_each_item(&mut |item| item.leave(ctx));
    }

    pub fn early_update(&self, ctx: &mut FrameCtx<'_>) {
        self.for_each_item(&mut |item| item.early_update(ctx));
    }

    pub fn update(&self, ctx: &mut FrameCtx<'_>) {
        self.for_each_item(&mut |item| item.update(ctx));
    }

    pub fn late_update(&self, ctx: &mut FrameCtx<'_>) {
        self.for_each_item(&mut |item| item.late_update(ctx));
    }

    pub fn draw(&self, ctx: &mut FrameCtx<'_>) {
        self.for_each_item(&mut |item| item.draw(ctx));
    }

    pub fn debug_draw(&self, ctx: &mut FrameCtx<'_>) {
        self.for_each_item(&mut |item| item.debug_draw(ctx));
    }

    pub fn debugger_tree(&self, ui: &mut dyn DebugUi) {
        let state = if self.active { "active" } else { "inactive" };
        if !ui.tree_node(&format!("{} [{:?}, {}]", self.name, self.kind, state)) {
            return;
        }
        for child in &self.children {
            match child {
                Node::Folder(folder) => folder.debugger_tree(ui),
                Node::Item(item) => item.debugger_tree(ui),
            }
        }
        ui.tree_pop();
    }
}

// ============================================================================
// Root
// ============================================================================

/// Scene switch target: a top-level folder name, or its index among the root's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneTarget<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for SceneTarget<'a> {
    fn from(name: &'a str) -> Self {
        SceneTarget::Name(name)
    }
}

impl From<usize> for SceneTarget<'_> {
    fn from(index: usize) -> Self {
        SceneTarget::Index(index)
    }
}

impl fmt::Display for SceneTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneTarget::Name(name) => write!(f, "'{}'", name),
            SceneTarget::Index(i) => write!(f, "#{}", i),
        }
    }
}

const ROOT: &str = "Root";

pub struct Root {
    children: Vec<Folder>,
    /// Indices of scene folders in `children`, in declaration order.
    scenes: Vec<usize>,
    current_scene: Option<usize>,
    active_children: Vec<usize>,
    initialized: bool,
}

impl Root {
    /// Activates the scene flagged `startup` (else the first scene) and every
    /// persistent folder.
    pub fn new(children: Vec<Folder>) -> Self {
        let scenes: Vec<usize> = children
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_scene())
            .map(|(i, _)| i)
            .collect();
        let startup = scenes
            .iter()
            .copied()
            .find(|&i| children[i].startup)
            .or_else(|| scenes.first().copied());

        let mut root = Self {
            children,
            scenes,
            current_scene: None,
            active_children: Vec::new(),
            initialized: false,
        };
        if let Some(i) = startup {
            root.activate(i);
        }
        root.active_children = root.compute_active();
        root
    }

    fn activate(&mut self, index: usize) {
        for &s in &self.scenes {
            self.children[s].active = false;
        }
        self.children[index].active = true;
        self.current_scene = Some(index);
    }

    /// Active scene first, then every persistent folder.
    fn compute_active(&self) -> Vec<usize> {
        let scenes = self.scenes.iter().copied().filter(|&i| self.children[i].active);
        let persistent = (0..self.children.len()).filter(|&i| !self.children[i].is_scene());
        scenes.chain(persistent).collect()
    }

    fn resolve(&self, target: SceneTarget<'_>) -> Option<usize> {
        match target {
            SceneTarget::Name(name) => self.children.iter().position(|f| f.name == name),
            SceneTarget::Index(i) => (i < self.children.len()).then_some(i),
        }
    }

    /// Replaces the startup scene before the first `enter`.
    pub fn select_startup(&mut self, name: &str) -> Result<()> {
        crate::ensure!(
            !self.initialized,
            Error::invalid_operation("startup scene can only be chosen before init")
        );
        match self.resolve(SceneTarget::Name(name)) {
            Some(i) if self.children[i].is_scene() => {
                self.activate(i);
                self.active_children = self.compute_active();
                Ok(())
            }
            _ => Err(Error::invalid_operation(format!("'{}' is not a scene", name))),
        }
    }

    // ---------------- Accessors ----------------

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn children(&self) -> &[Folder] {
        &self.children
    }

    pub fn folder(&self, name: &str) -> Option<&Folder> {
        self.children.iter().find(|f| f.name == name)
    }

    pub fn current_scene(&self) -> Option<&Folder> {
        self.current_scene.map(|i| &self.children[i])
    }

    pub fn current_scene_name(&self) -> Option<&str> {
        self.current_scene().map(Folder::name)
    }

    pub fn scenes(&self) -> impl Iterator<Item = &Folder> + '_ {
        self.scenes.iter().map(move |&i| &self.children[i])
    }

    pub fn active_children(&self) -> impl Iterator<Item = &Folder> + '_ {
        self.active_children.iter().map(move |&i| &self.children[i])
    }

    pub fn active_names(&self) -> Vec<&str> {
        self.active_children().map(Folder::name).collect()
    }

    pub fn find_item(&self, name: &str) -> Option<Rc<Item>> {
        self.children.iter().find_map(|f| f.find_item(name))
    }

    // ---------------- Lifecycle ----------------

    /// Initialises every folder, active or not, once.
    pub fn init(&mut self, ctx: &mut FrameCtx<'_>) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        for folder in &mut self.children {
            folder.init(ctx)?;
        }
        self.initialized = true;
        log::info!(
            "Scene graph ready: {} folders, {} scenes, startup '{}'",
            self.children.len(),
            self.scenes.len(),
            self.current_scene_name().unwrap_or("<none>")
        );
        Ok(())
    }

    pub fn check_init_correct(&self) -> Result<()> {
        crate::ensure!(self.initialized, Error::not_initialized(ROOT));
        Ok(())
    }

    pub fn enter(&self, ctx: &mut FrameCtx<'_>) {
        for folder in self.active_children() {
            folder.enter(ctx);
        }
    }

    /// Leaves the active scenes. Persistent folders are never left.
    pub fn leave(&self, ctx: &mut FrameCtx<'_>) {
        for folder in self.active_children().filter(|f| f.is_scene()) {
            folder.leave(ctx);
        }
    }

    pub fn early_update(&self, ctx: &mut FrameCtx<'_>) {
        for folder in self.active_children() {
            folder.early_update(ctx);
        }
    }

    pub fn update(&self, ctx: &mut FrameCtx<'_>) {
        for folder in self.active_children() {
            folder.update(ctx);
        }
    }

    pub fn late_update(&self, ctx: &mut FrameCtx<'_>) {
        for folder in self.active_children() {
            folder.late_update(ctx);
        }
    }

    pub fn draw(&self, ctx: &mut FrameCtx<'_>) {
        for folder in self.active_children() {
            folder.draw(ctx);
        }
    }

    pub fn debug_draw(&self, ctx: &mut FrameCtx<'_>) {
        for folder in self.active_children() {
            folder.debug_draw(ctx);
        }
    }

    // ---------------- Scene switching ----------------

    /// Switches to the scene folder named or indexed by `target`.
    ///
    /// A target that is missing or not a scene is refused with a Critical diagnostic and
    /// leaves the graph untouched.
    pub fn change_scene<'t>(
        &mut self,
        target: impl Into<SceneTarget<'t>>,
        ctx: &mut FrameCtx<'_>,
    ) -> Result<()> {
        let target = target.into();
        let index = match self.resolve(target) {
            Some(i) if self.children[i].is_scene() => i,
            Some(i) => {
                let message = format!(
                    "Expected a folder of kind Scene, got {:?} ('{}')",
                    self.children[i].kind, self.children[i].name
                );
                ctx.diagnostics.critical(ROOT, message.clone());
                return Err(Error::invalid_operation(message));
            }
            None => {
                let message = format!("No top-level folder matches {}", target);
                ctx.diagnostics.critical(ROOT, message.clone());
                return Err(Error::invalid_operation(message));
            }
        };

        let old = self
            .active_children()
            .find(|f| f.is_scene())
            .map(|f| f.name.clone());
        if let Some(old) = &old {
            log::info!("Leaving '{}' scene...", old);
        }

        self.activate(index);
        self.leave(ctx);
        self.active_children = self.compute_active();
        self.enter(ctx);

        log::info!("Entered '{}' scene", self.children[index].name);
        Ok(())
    }

    fn step_scene(&mut self, forward: bool, ctx: &mut FrameCtx<'_>) -> Result<()> {
        let len = self.scenes.len();
        if len <= 1 {
            let message = if forward {
                "Only one scene, can't go forward!"
            } else {
                "Only one scene, can't go back!"
            };
            ctx.diagnostics.error(ROOT, message);
            return Err(Error::invalid_operation(message));
        }
        let at = self
            .current_scene
            .and_then(|c| self.scenes.iter().position(|&s| s == c))
            .unwrap_or(0);
        let next = if forward { (at + 1) % len } else { (at + len - 1) % len };
        self.change_scene(SceneTarget::Index(self.scenes[next]), ctx)
    }

    pub fn next_scene(&mut self, ctx: &mut FrameCtx<'_>) -> Result<()> {
        self.step_scene(true, ctx)
    }

    pub fn previous_scene(&mut self, ctx: &mut FrameCtx<'_>) -> Result<()> {
        self.step_scene(false, ctx)
    }

    pub fn debugger_tree(&self, ui: &mut dyn DebugUi) {
        if !ui.tree_node(ROOT) {
            return;
        }
        ui.key_value("Current scene", self.current_scene_name().unwrap_or("<none>"));
        ui.key_value("Active", &self.active_names().join(", "));
        ui.separator();
        for folder in &self.children {
            folder.debugger_tree(ui);
        }
        ui.tree_pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Component, Shared};
    use crate::diagnostics::Severity;
    use crate::engine::testing::Harness;
    use std::cell::RefCell;

    /// Appends "<item>:<event>" to a shared journal.
    struct Probe {
        tag: String,
        journal: Shared<Vec<String>>,
    }

    impl Component for Probe {
        fn type_name(&self) -> &'static str {
            "Probe"
        }

        fn enter(&mut self, _ctx: &mut FrameCtx<'_>) {
            self.journal.borrow_mut().push(format!("{}:enter", self.tag));
        }

        fn leave(&mut self, _ctx: &mut FrameCtx<'_>) {
            self.journal.borrow_mut().push(format!("{}:leave", self.tag));
        }

        fn update(&mut self, _ctx: &mut FrameCtx<'_>) {
            self.journal.borrow_mut().push(format!("{}:update", self.tag));
        }
    }

    fn probed(tag: &str, journal: &Shared<Vec<String>>) -> Rc<Item> {
        Item::new(tag).with_custom(
            "Probe",
            Probe {
                tag: tag.to_owned(),
                journal: journal.clone(),
            },
        )
    }

    fn three_scenes(journal: &Shared<Vec<String>>) -> Root {
        Root::new(vec![
            Folder::scene("A").with_item(probed("a", journal)),
            Folder::persistent("Hud").with_item(probed("hud", journal)),
            Folder::scene("B").with_folder(Folder::scene("Nested").with_item(probed("b", journal))),
            Folder::scene("C").with_item(probed("c", journal)),
        ])
    }

    fn journal() -> Shared<Vec<String>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_first_scene_starts_unless_flagged() {
        let root = Root::new(vec![Folder::scene("Menu"), Folder::scene("Game")]);
        assert_eq!(root.current_scene_name(), Some("Menu"));

        let root = Root::new(vec![Folder::scene("Menu"), Folder::scene("Game").startup()]);
        assert_eq!(root.current_scene_name(), Some("Game"));
        assert!(!root.folder("Menu").unwrap().is_active());
    }

    #[test]
    fn test_active_children_are_scene_plus_persistent() {
        let j = journal();
        let root = three_scenes(&j);
        assert_eq!(root.active_names(), vec!["A", "Hud"]);
        assert_eq!(root.scenes().count(), 3);
    }

    #[test]
    fn test_init_reaches_inactive_scenes() {
        let mut h = Harness::new();
        let j = journal();
        let mut root = three_scenes(&j);
        assert!(root.check_init_correct().unwrap_err().is_not_initialized());

        root.init(&mut h.ctx()).unwrap();
        root.check_init_correct().unwrap();
        assert!(root.children().iter().all(Folder::is_initialized));
        assert!(root.find_item("c").unwrap().is_initialized());
    }

    #[test]
    fn test_inactive_scenes_are_frozen() {
        let mut h = Harness::new();
        let j = journal();
        let mut root = three_scenes(&j);
        root.init(&mut h.ctx()).unwrap();
        root.update(&mut h.ctx());
        assert_eq!(*j.borrow(), vec!["a:update", "hud:update"]);
    }

    #[test]
    fn test_change_scene_protocol() {
        let mut h = Harness::new();
        let j = journal();
        let mut root = three_scenes(&j);
        root.init(&mut h.ctx()).unwrap();

        root.change_scene("B", &mut h.ctx()).unwrap();
        assert_eq!(root.current_scene_name(), Some("B"));
        assert_eq!(root.active_names(), vec!["B", "Hud"]);
        assert_eq!(root.scenes().filter(|s| s.is_active()).count(), 1);
        // old scene left, persistent kept and re-entered
        assert_eq!(*j.borrow(), vec!["a:leave", "b:enter", "hud:enter"]);
    }

    #[test]
    fn test_non_scene_target_is_critical() {
        let mut h = Harness::new();
        let j = journal();
        let mut root = three_scenes(&j);
        root.init(&mut h.ctx()).unwrap();

        let err = root.change_scene("Hud", &mut h.ctx()).unwrap_err();
        assert!(err.is_invalid_operation());
        assert_eq!(root.current_scene_name(), Some("A"));
        assert_eq!(h.diagnostics.count(Severity::Critical), 1);
        assert!(j.borrow().is_empty());

        assert!(root.change_scene(SceneTarget::Index(42), &mut h.ctx()).is_err());
        assert!(root.change_scene("Missing", &mut h.ctx()).is_err());
        assert_eq!(h.diagnostics.count(Severity::Critical), 3);
    }

    #[test]
    fn test_cyclic_navigation() {
        let mut h = Harness::new();
        let j = journal();
        let mut root = three_scenes(&j);
        root.init(&mut h.ctx()).unwrap();

        root.change_scene("C", &mut h.ctx()).unwrap();
        root.next_scene(&mut h.ctx()).unwrap();
        assert_eq!(root.current_scene_name(), Some("A"));
        root.previous_scene(&mut h.ctx()).unwrap();
        assert_eq!(root.current_scene_name(), Some("C"));
        root.next_scene(&mut h.ctx()).unwrap();
        root.next_scene(&mut h.ctx()).unwrap();
        assert_eq!(root.current_scene_name(), Some("B"));
    }

    #[test]
    fn test_single_scene_navigation_is_refused() {
        let mut h = Harness::new();
        let mut root = Root::new(vec![Folder::scene("Only"), Folder::persistent("Hud")]);
        root.init(&mut h.ctx()).unwrap();

        assert!(root.next_scene(&mut h.ctx()).unwrap_err().is_invalid_operation());
        assert!(root.previous_scene(&mut h.ctx()).is_err());
        assert_eq!(h.diagnostics.count(Severity::Error), 2);
        assert_eq!(root.current_scene_name(), Some("Only"));
    }

    #[test]
    fn test_select_startup() {
        let mut root = Root::new(vec![Folder::scene("Menu"), Folder::scene("Game")]);
        root.select_startup("Game").unwrap();
        assert_eq!(root.active_names(), vec!["Game"]);
        assert!(root.select_startup("Nope").is_err());
    }

    #[test]
    fn test_debugger_tree_lists_folders() {
        let j = journal();
        let root = three_scenes(&j);
        let mut ui = crate::gui::TextDebugUi::new();
        root.debugger_tree(&mut ui);
        let text = ui.render();
        assert!(text.starts_with("> Root\n  Current scene: A"));
        assert!(text.contains("> Hud [Persistent, active]"));
        assert!(text.contains("> C [Scene, inactive]"));
    }
}
